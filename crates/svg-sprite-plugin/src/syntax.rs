//! Syntax check for emitted JavaScript.

use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;

/// A generated module failed to parse.
#[derive(Debug, thiserror::Error)]
#[error("Generated module {id} does not parse: {message}")]
pub struct SyntaxError {
    pub id: String,
    pub message: String,
}

/// Parse `code` as an ES module and report the first errors, if any.
pub fn check_module(id: &str, code: &str) -> Result<(), SyntaxError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, code, SourceType::mjs()).parse();

    if ret.panicked || !ret.errors.is_empty() {
        let message = ret
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(SyntaxError {
            id: id.to_string(),
            message: if message.is_empty() {
                "parser aborted".to_string()
            } else {
                message
            },
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use svg_sprite_adapters::ExportType;
    use svg_sprite_runtime::script::{register_module, REGISTER_MODULE};

    #[test]
    fn accepts_valid_module() {
        assert!(check_module("ok.js", "export const a = 1;\nif (import.meta.hot) {}\n").is_ok());
    }

    #[test]
    fn rejects_invalid_module() {
        let err = check_module("bad.js", "export const = ;").unwrap_err();
        assert_eq!(err.id, "bad.js");
        assert!(!err.message.is_empty());
    }

    #[test]
    fn runtime_modules_parse() {
        check_module("register.js", REGISTER_MODULE).unwrap();
        check_module("register.js", &register_module(Some(r#"div[data-x="y"]"#))).unwrap();
        for export_type in ExportType::ALL {
            let adapter = export_type.adapter();
            check_module(adapter.name(), adapter.runtime_module()).unwrap();
        }
    }
}
