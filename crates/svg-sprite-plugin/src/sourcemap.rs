//! Line-to-line source maps for generated modules.

use serde::{Deserialize, Serialize};

/// A version 3 source map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u8,
    pub file: String,
    pub sources: Vec<String>,
    pub sources_content: Vec<String>,
    pub names: Vec<String>,
    pub mappings: String,
}

impl SourceMap {
    /// Map every line of `code` to the same line of `file`, column 0.
    ///
    /// The module is its own source: `sourcesContent` holds `code`.
    pub fn line_to_line(code: &str, file: &str) -> Self {
        let lines = code.split('\n').count();
        let mut mappings = String::from("AAAA");
        for _ in 1..lines {
            mappings.push_str(";AACA");
        }

        Self {
            version: 3,
            file: file.to_string(),
            sources: vec![file.to_string()],
            sources_content: vec![code.to_string()],
            names: Vec::new(),
            mappings,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn one_segment_per_line() {
        assert_eq!(SourceMap::line_to_line("a", "m.js").mappings, "AAAA");
        assert_eq!(
            SourceMap::line_to_line("a\nb\nc", "m.js").mappings,
            "AAAA;AACA;AACA"
        );
        assert_eq!(SourceMap::line_to_line("a\n", "m.js").mappings, "AAAA;AACA");
    }

    #[test]
    fn serializes_v3_fields() {
        let map = SourceMap::line_to_line("x", "/src/home.svg.js");
        let json: serde_json::Value = serde_json::from_str(&map.to_json().unwrap()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "version": 3,
                "file": "/src/home.svg.js",
                "sources": ["/src/home.svg.js"],
                "sourcesContent": ["x"],
                "names": [],
                "mappings": "AAAA",
            })
        );
    }
}
