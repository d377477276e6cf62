//! Plugin options.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use svg_sprite_symbol::OptimizeConfig;

use crate::error::ConfigError;

/// One glob or a list of globs selecting the ids to transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Include {
    One(String),
    Many(Vec<String>),
}

impl Default for Include {
    fn default() -> Self {
        Include::One("**/*.svg".to_string())
    }
}

impl Include {
    pub fn patterns(&self) -> Vec<&str> {
        match self {
            Include::One(pattern) => vec![pattern.as_str()],
            Include::Many(patterns) => patterns.iter().map(String::as_str).collect(),
        }
    }

    /// Compile to a matcher. `*` does not cross path separators and dotfiles
    /// match like any other name.
    pub fn compile(&self) -> Result<GlobSet, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in self.patterns() {
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|e| ConfigError::InvalidGlob {
                    pattern: pattern.to_string(),
                    message: e.to_string(),
                })?;
            builder.add(glob);
        }
        builder.build().map_err(|e| ConfigError::InvalidGlob {
            pattern: self.patterns().join(", "),
            message: e.to_string(),
        })
    }
}

/// Options accepted by [`crate::SpritePlugin`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteOptions {
    /// Ids to transform
    pub include: Include,

    /// Symbol id template; `[name]` is the file stem, `[hash]` the content hash
    pub symbol_id: String,

    /// Optimizer configuration, run after the mandatory id prefixing step
    pub svgo: OptimizeConfig,

    /// One of `vanilla`, `react`, `preact`, `vue`
    pub export_type: String,

    /// Side-effect flag reported for generated modules
    pub module_side_effects: bool,

    /// CSS selector of the element hosting the sprite container
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_selector: Option<String>,

    /// Import prefix of the runtime modules
    pub runtime_base: String,

    /// Emit hot-update wiring
    pub hot: bool,
}

impl Default for SpriteOptions {
    fn default() -> Self {
        Self {
            include: Include::default(),
            symbol_id: "icon-[name]".to_string(),
            svgo: OptimizeConfig::default(),
            export_type: "vanilla".to_string(),
            module_side_effects: true,
            container_selector: None,
            runtime_base: "svg-sprite/runtime".to_string(),
            hot: true,
        }
    }
}
