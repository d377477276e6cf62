//! Single-file transform command.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use svg_sprite_plugin::SpritePlugin;

use crate::config::load_config;

/// Run the transform command, printing the generated module to stdout.
pub async fn run(config_path: &Path, file: &Path, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let plugin = SpritePlugin::new(config.plugin).context("Invalid plugin options")?;

    let raw = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let module = plugin.transform_svg(&format!("{}.js", file.display()), &raw)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&module.descriptor)?);
    } else {
        print!("{}", module.code);
    }

    Ok(())
}
