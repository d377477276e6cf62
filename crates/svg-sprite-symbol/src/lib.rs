//! SVG optimization and symbol extraction.
//!
//! This crate turns a standalone SVG document into a `<symbol>` fragment that can
//! live inside a shared sprite sheet. Internal ids and references are prefixed
//! with a content hash so symbols from different files never collide.

pub mod descriptor;
pub mod extract;
pub mod hash;
pub mod optimize;
pub mod xml;

pub use descriptor::{ModuleDescriptor, SymbolAttributes};
pub use extract::{extract_symbol, extract_symbol_with, ExtractOptions, Symbol, SymbolError};
pub use hash::{content_hash, HASH_LEN};
pub use optimize::{OptimizeConfig, OptimizeError, Optimizer, Plugin, PluginEntry, PrefixIds};
pub use xml::{Document, Element, Node, XmlError};
