//! Build-time transform for SVG imports.
//!
//! [`SpritePlugin`] follows the resolve/transform hook contract of JavaScript
//! bundlers: matching `.svg` ids are resolved to virtual `.svg.js` modules,
//! and transforming one reads the SVG, optimizes it, extracts a `<symbol>`,
//! and generates a module that registers the symbol with the sprite runtime
//! and exports a framework component referencing it.

mod error;
pub mod generator;
pub mod options;
pub mod plugin;
pub mod sourcemap;
pub mod syntax;

pub use error::{ConfigError, PluginError};
pub use generator::{display_name, file_stem, symbol_id, GeneratedModule, ModuleGenerator};
pub use options::{Include, SpriteOptions};
pub use plugin::{is_svg_path, ModuleMeta, ResolvedId, RuntimeFile, SpritePlugin, TransformOutput};
pub use sourcemap::SourceMap;
pub use syntax::{check_module, SyntaxError};
