use svg_sprite_adapters::AdapterError;
use svg_sprite_symbol::OptimizeError;

/// Errors raised while building a plugin from options.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    ExportType(#[from] AdapterError),

    #[error("Invalid svgo options: {0}")]
    Optimizer(#[from] OptimizeError),

    #[error("Invalid include pattern {pattern}: {message}")]
    InvalidGlob { pattern: String, message: String },

    #[error("Failed to load module template: {0}")]
    Template(String),
}

/// Errors raised while transforming a module.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("Invalid svg file: {path}")]
    InvalidSvg { path: String, reason: String },

    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to render module: {0}")]
    Render(String),
}
