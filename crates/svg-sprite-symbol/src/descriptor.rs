//! Data handed from the build step to generated modules.

use serde::{Deserialize, Serialize};

/// Sizing attributes lifted off the source `<svg>` root.
///
/// Serializes with the DOM attribute names (`viewBox`) and omits absent keys, so
/// the JSON form can be embedded directly as the module's `attributes` export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,

    #[serde(
        default,
        rename = "viewBox",
        skip_serializing_if = "Option::is_none"
    )]
    pub view_box: Option<String>,
}

impl SymbolAttributes {
    /// Attribute pairs in DOM naming, skipping absent values.
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("width", self.width.as_deref()),
            ("height", self.height.as_deref()),
            ("viewBox", self.view_box.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }
}

/// Everything a generated module embeds for one source SVG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Global id of the `<symbol>` inside the sprite (e.g. "icon-home")
    pub symbol_id: String,

    /// Human readable name (e.g. "Home")
    pub display_name: String,

    /// Serialized `<symbol>` element
    pub symbol_xml: String,

    /// Sizing attributes from the source root
    pub attributes: SymbolAttributes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_only_present_attributes() {
        let attrs = SymbolAttributes {
            view_box: Some("0 0 10 10".to_string()),
            ..Default::default()
        };

        let json = serde_json::to_string(&attrs).unwrap();
        assert_eq!(json, r#"{"viewBox":"0 0 10 10"}"#);
    }

    #[test]
    fn lists_attribute_pairs() {
        let attrs = SymbolAttributes {
            width: Some("24".to_string()),
            height: None,
            view_box: Some("0 0 24 24".to_string()),
        };

        assert_eq!(attrs.pairs(), vec![("width", "24"), ("viewBox", "0 0 24 24")]);
    }
}
