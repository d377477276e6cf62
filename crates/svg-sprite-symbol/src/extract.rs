//! Conversion of a standalone SVG document into a sprite `<symbol>`.

use crate::descriptor::SymbolAttributes;
use crate::hash::content_hash;
use crate::optimize::{prefix_references, PrefixIds};
use crate::xml::{escape_attr, Document, Element, XmlError};

/// Root attributes that never make it onto the `<symbol>`.
///
/// Sizing moves into [`SymbolAttributes`]; namespace declarations are
/// inherited from the sprite root.
const DROPPED_ROOT_ATTRS: &[&str] = &[
    "id",
    "width",
    "height",
    "x",
    "y",
    "viewBox",
    "version",
    "xml:space",
];

/// Result of extracting a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Serialized `<symbol>` element
    pub symbol_xml: String,

    /// Sizing attributes lifted off the root
    pub attributes: SymbolAttributes,
}

/// Options for symbol extraction.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Prefix internal ids with the content hash of the input.
    ///
    /// Disable when the markup already went through an optimizer pass that
    /// prefixed ids.
    pub prefix_ids: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self { prefix_ids: true }
    }
}

/// Errors that can occur during extraction.
#[derive(Debug, thiserror::Error)]
pub enum SymbolError {
    #[error("invalid svg: {0}")]
    Malformed(#[from] XmlError),

    #[error("invalid svg: root element is <{0}>, expected <svg>")]
    NotSvg(String),
}

/// Extract a symbol, prefixing internal ids with the input's content hash.
pub fn extract_symbol(svg: &str, symbol_id: &str) -> Result<Symbol, SymbolError> {
    extract_symbol_with(svg, symbol_id, &ExtractOptions::default())
}

/// Extract a symbol with explicit options.
pub fn extract_symbol_with(
    svg: &str,
    symbol_id: &str,
    options: &ExtractOptions,
) -> Result<Symbol, SymbolError> {
    let mut root = Document::parse(svg)?.into_root();

    if root.local_name() != "svg" {
        return Err(SymbolError::NotSvg(root.name));
    }

    if options.prefix_ids {
        let hash = content_hash(svg);
        prefix_references(&mut root, &hash, &PrefixIds::with_prefix(hash.clone()));
    }

    let attributes = SymbolAttributes {
        width: root.attr("width").map(str::to_string),
        height: root.attr("height").map(str::to_string),
        view_box: root.attr("viewBox").map(str::to_string),
    };

    let mut symbol = Element::new("symbol");
    symbol.set_attr("id", escape_attr(symbol_id));
    if let Some(view_box) = &attributes.view_box {
        symbol.set_attr("viewBox", view_box.clone());
    }

    symbol.attributes.extend(
        root.attributes
            .into_iter()
            .filter(|(name, _)| !is_dropped_root_attr(name)),
    );
    symbol.children = root.children;

    Ok(Symbol {
        symbol_xml: symbol.to_markup(),
        attributes,
    })
}

fn is_dropped_root_attr(name: &str) -> bool {
    DROPPED_ROOT_ATTRS.contains(&name) || name == "xmlns" || name.starts_with("xmlns:")
}
