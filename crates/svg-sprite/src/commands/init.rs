//! Initialize svg-sprite in a project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing svg-sprite...");

    if !scaffold(config_path, yes)? {
        return Ok(());
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'svg-sprite build' to generate icon modules.");

    Ok(())
}

/// Write the config and an example icon next to it. Returns false when the
/// config already exists and `yes` is not set.
fn scaffold(config_path: &Path, yes: bool) -> Result<bool> {
    if config_path.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
        return Ok(false);
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    tracing::info!("Created {}", config_path.display());

    let root = config_path.parent().unwrap_or(Path::new(""));
    let icons_dir = root.join("icons");
    if !icons_dir.exists() {
        fs::create_dir_all(&icons_dir).context("Failed to create icons directory")?;
    }

    let example_path = icons_dir.join("example.svg");
    if !example_path.exists() || yes {
        fs::write(&example_path, EXAMPLE_ICON).context("Failed to write example.svg")?;
        tracing::info!("Created {}", example_path.display());
    }

    Ok(true)
}

const DEFAULT_CONFIG: &str = r##"# svg-sprite configuration

[sprite]
# Directory scanned for SVG files
input = "icons"

# Output directory for generated modules
output = "dist/icons"

# Write runtime modules to <output>/runtime and import them relatively
emit_runtime = true

# Write a static sprite sheet to <output>/sprite.svg
sheet = true

# Parse generated modules before writing them
check = true

[plugin]
# Glob (or list of globs) selecting files to transform
include = "**/*.svg"

# Symbol id template: [name] is the file name, [hash] the content hash
symbol_id = "icon-[name]"

# vanilla, react, preact or vue
export_type = "vanilla"

# Report generated modules as having side effects
module_side_effects = true

# Import prefix of the runtime modules when emit_runtime is off
runtime_base = "svg-sprite/runtime"

# Emit hot-update wiring
hot = true

# Insert the sprite into the first element matching this selector
# container_selector = "#app"

[plugin.svgo]
multipass = false
plugins = ["removeComments", "removeMetadata", "removeTitle", "removeDesc"]
"##;

const EXAMPLE_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2">
  <title>Example</title>
  <circle cx="12" cy="12" r="10"/>
  <path d="M12 8v8M8 12h8"/>
</svg>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use svg_sprite_plugin::SpritePlugin;
    use tempfile::tempdir;

    #[test]
    fn writes_loadable_config_and_example() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("sprite.toml");

        assert!(scaffold(&path, false).unwrap());

        let config = load_config(&path).unwrap();
        assert_eq!(config.sprite.input, PathBuf::from("icons"));
        assert_eq!(config.plugin.svgo.plugins.len(), 4);
        assert!(temp.path().join("icons/example.svg").exists());

        let plugin = SpritePlugin::new(config.plugin).unwrap();
        let module = plugin
            .transform_svg("example.svg.js", EXAMPLE_ICON)
            .unwrap();
        assert_eq!(module.descriptor.symbol_id, "icon-example");
        assert!(!module.descriptor.symbol_xml.contains("<title>"));
    }

    #[test]
    fn keeps_existing_config_without_yes() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("sprite.toml");
        fs::write(&path, "# mine\n").unwrap();

        assert!(!scaffold(&path, false).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "# mine\n");

        assert!(scaffold(&path, true).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}
