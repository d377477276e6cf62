//! Sprite build command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use svg_sprite_plugin::SpritePlugin;

use crate::builder::{BuildConfig, Builder};
use crate::config::load_config;

/// Build configuration and plugin from `sprite.toml` plus CLI overrides.
pub fn resolve(
    config_path: &Path,
    output: Option<PathBuf>,
    export_type: Option<String>,
) -> Result<(BuildConfig, SpritePlugin)> {
    let file_config = load_config(config_path)?;

    let mut options = file_config.plugin;
    if let Some(export_type) = export_type {
        options.export_type = export_type;
    }
    let plugin = SpritePlugin::new(options).context("Invalid plugin options")?;

    let config = BuildConfig {
        input_dir: file_config.sprite.input,
        output_dir: output.unwrap_or(file_config.sprite.output),
        emit_runtime: file_config.sprite.emit_runtime,
        sheet: file_config.sprite.sheet,
        check: file_config.sprite.check,
    };

    Ok((config, plugin))
}

/// Run the build command.
pub async fn run(
    config_path: &Path,
    output: Option<PathBuf>,
    export_type: Option<String>,
) -> Result<()> {
    tracing::info!("Building sprite...");

    let (config, plugin) = resolve(config_path, output, export_type)?;
    let result = Builder::new(config, plugin).build()?;

    tracing::info!(
        "Built {} icon modules and {} runtime files in {}ms",
        result.modules,
        result.runtime_files,
        result.duration_ms
    );

    if !result.duplicates.is_empty() {
        tracing::warn!(
            "{} duplicate symbol ids: {}",
            result.duplicates.len(),
            result.duplicates.join(", ")
        );
    }

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use svg_sprite_adapters::ExportType;
    use tempfile::tempdir;

    #[test]
    fn cli_flags_override_config() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("sprite.toml");
        std::fs::write(&path, "[sprite]\noutput = \"out\"\n\n[plugin]\nexport_type = \"vue\"\n").unwrap();

        let (config, plugin) = resolve(&path, None, None).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(plugin.export_type(), ExportType::Vue);

        let (config, plugin) =
            resolve(&path, Some(PathBuf::from("elsewhere")), Some("react".to_string())).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("elsewhere"));
        assert_eq!(plugin.export_type(), ExportType::React);
    }

    #[test]
    fn invalid_export_type_is_rejected() {
        let temp = tempdir().unwrap();
        let err = resolve(&temp.path().join("sprite.toml"), None, Some("svelte".to_string()))
            .unwrap_err();

        assert_eq!(err.to_string(), "Invalid plugin options");
        assert_eq!(err.root_cause().to_string(), "invalid export type: svelte");
    }
}
