//! `sprite.toml` loading.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use svg_sprite_plugin::SpriteOptions;

/// Configuration file structure (sprite.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub sprite: SpriteSection,

    /// Transform options, passed to the plugin as is
    #[serde(default)]
    pub plugin: SpriteOptions,
}

#[derive(Debug, Deserialize)]
pub struct SpriteSection {
    /// Directory scanned for SVG files
    #[serde(default = "default_input")]
    pub input: PathBuf,

    /// Directory receiving generated modules
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Write runtime modules under `<output>/runtime`
    #[serde(default = "default_true")]
    pub emit_runtime: bool,

    /// Write a static `sprite.svg` with every symbol
    #[serde(default = "default_true")]
    pub sheet: bool,

    /// Parse every generated module before writing it
    #[serde(default = "default_true")]
    pub check: bool,
}

impl Default for SpriteSection {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
            emit_runtime: true,
            sheet: true,
            check: true,
        }
    }
}

fn default_input() -> PathBuf {
    PathBuf::from("icons")
}
fn default_output() -> PathBuf {
    PathBuf::from("dist/icons")
}
fn default_true() -> bool {
    true
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        tracing::debug!("No {} found, using defaults", path.display());
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use svg_sprite_plugin::Include;
    use svg_sprite_symbol::PluginEntry;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempdir().unwrap();
        let config = load_config(&temp.path().join("sprite.toml")).unwrap();

        assert_eq!(config.sprite.input, PathBuf::from("icons"));
        assert_eq!(config.sprite.output, PathBuf::from("dist/icons"));
        assert!(config.sprite.emit_runtime);
        assert_eq!(config.plugin, SpriteOptions::default());
    }

    #[test]
    fn parses_plugin_section() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("sprite.toml");
        fs::write(
            &path,
            r##"
[sprite]
input = "assets/svg"
sheet = false

[plugin]
include = ["**/*.svg", "extra/*.svg"]
symbol_id = "i-[hash]-[name]"
export_type = "react"
container_selector = "#app"

[plugin.svgo]
multipass = true
plugins = ["removeComments", { name = "removeAttrs", params = { attrs = ["fill"] } }]
"##,
        )
        .unwrap();

        let config = load_config(&path).unwrap();

        assert_eq!(config.sprite.input, PathBuf::from("assets/svg"));
        assert_eq!(config.sprite.output, PathBuf::from("dist/icons"));
        assert!(!config.sprite.sheet);
        assert_eq!(
            config.plugin.include,
            Include::Many(vec!["**/*.svg".to_string(), "extra/*.svg".to_string()])
        );
        assert_eq!(config.plugin.symbol_id, "i-[hash]-[name]");
        assert_eq!(config.plugin.container_selector.as_deref(), Some("#app"));
        assert!(config.plugin.svgo.multipass);
        assert_eq!(config.plugin.svgo.plugins.len(), 2);
        assert_eq!(
            config.plugin.svgo.plugins[0],
            PluginEntry::Name("removeComments".to_string())
        );
        assert_eq!(config.plugin.svgo.plugins[1].name(), "removeAttrs");
    }

    #[test]
    fn malformed_file_is_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("sprite.toml");
        fs::write(&path, "[sprite\ninput = 3").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse"));
    }
}
