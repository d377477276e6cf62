//! Watch command: incremental rebuilds with hot disposal in the sprite sheet.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::Builder;
use crate::commands::build::resolve;
use crate::sheet::SpriteSheet;
use crate::watcher::{FileWatcher, WatchEvent};

/// Run the watch command.
pub async fn run(config_path: &Path, output: Option<PathBuf>) -> Result<()> {
    let (mut config, plugin) = resolve(config_path, output, None)?;
    config.input_dir = config
        .input_dir
        .canonicalize()
        .with_context(|| format!("Input directory not found: {}", config.input_dir.display()))?;
    let builder = Builder::new(config, plugin);

    let mut sheet = initial_build(&builder)?;

    let (_watcher, mut rx) = FileWatcher::new(&builder.config().input_dir)
        .context("Failed to start file watcher")?;
    tracing::info!(
        "Watching {} for changes",
        builder.config().input_dir.display()
    );

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break };
                if let Err(e) = handle_event(&builder, &mut sheet, event) {
                    tracing::error!("{:#}", e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopping watcher");
                break;
            }
        }
    }

    Ok(())
}

/// Build every source, logging invalid files instead of failing.
fn initial_build(builder: &Builder) -> Result<SpriteSheet> {
    let mut sheet = SpriteSheet::new(builder.plugin().export_type());

    for source in builder.discover()? {
        match builder.build_module(&source) {
            Ok(built) => {
                builder.write_module(&built)?;
                sheet.upsert(&built.source.relative, &built.module.descriptor);
            }
            Err(e) => tracing::error!("{}", e),
        }
    }

    if builder.config().emit_runtime {
        builder.write_runtime()?;
    }
    if builder.config().sheet {
        builder.write_sheet(&sheet)?;
    }

    tracing::info!("Built {} icon modules", sheet.len());
    Ok(sheet)
}

fn handle_event(builder: &Builder, sheet: &mut SpriteSheet, event: WatchEvent) -> Result<()> {
    match event {
        WatchEvent::Changed(path) => {
            let Some(source) = builder.source_for(&path) else {
                return Ok(());
            };
            let built = builder.build_module(&source)?;
            builder.write_module(&built)?;

            if sheet.upsert(&source.relative, &built.module.descriptor) {
                tracing::info!("Updated {}", source.relative);
            } else {
                tracing::info!("Added {}", source.relative);
            }
        }
        WatchEvent::Removed(path) => {
            let Some(source) = builder.source_for(&path) else {
                return Ok(());
            };
            builder.remove_module(&source.relative)?;
            if sheet.remove(&source.relative) {
                tracing::info!("Removed {}", source.relative);
            }
        }
    }

    if builder.config().sheet {
        builder.write_sheet(sheet)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::BuildConfig;
    use pretty_assertions::assert_eq;
    use std::fs;
    use svg_sprite_plugin::{SpriteOptions, SpritePlugin};
    use tempfile::tempdir;

    fn builder(root: &Path) -> Builder {
        Builder::new(
            BuildConfig {
                input_dir: root.join("icons"),
                output_dir: root.join("dist"),
                emit_runtime: true,
                sheet: true,
                check: true,
            },
            SpritePlugin::new(SpriteOptions::default()).unwrap(),
        )
    }

    #[test]
    fn edits_replace_symbols_without_ghosts() {
        let temp = tempdir().unwrap();
        let icons = temp.path().join("icons");
        fs::create_dir_all(&icons).unwrap();
        fs::write(icons.join("home.svg"), r#"<svg viewBox="0 0 1 1"><path d="M0 0"/></svg>"#).unwrap();
        let builder = builder(temp.path());
        let mut sheet = initial_build(&builder).unwrap();

        fs::write(icons.join("home.svg"), r#"<svg viewBox="0 0 1 1"><path d="M9 9"/></svg>"#).unwrap();
        handle_event(&builder, &mut sheet, WatchEvent::Changed(icons.join("home.svg"))).unwrap();

        let sprite = fs::read_to_string(temp.path().join("dist/sprite.svg")).unwrap();
        assert_eq!(sprite.matches("<symbol").count(), 1);
        assert!(sprite.contains("M9 9"));
        assert!(sheet.duplicates().is_empty());
    }

    #[test]
    fn new_and_deleted_files_update_outputs() {
        let temp = tempdir().unwrap();
        let icons = temp.path().join("icons");
        fs::create_dir_all(&icons).unwrap();
        let builder = builder(temp.path());
        let mut sheet = initial_build(&builder).unwrap();
        assert_eq!(sheet.len(), 0);

        fs::write(icons.join("star.svg"), "<svg><path d=\"M1 1\"/></svg>").unwrap();
        handle_event(&builder, &mut sheet, WatchEvent::Changed(icons.join("star.svg"))).unwrap();
        assert_eq!(sheet.symbol_ids(), vec!["icon-star"]);
        assert!(temp.path().join("dist/star.svg.js").exists());

        fs::remove_file(icons.join("star.svg")).unwrap();
        handle_event(&builder, &mut sheet, WatchEvent::Removed(icons.join("star.svg"))).unwrap();
        assert!(sheet.symbol_ids().is_empty());
        assert!(!temp.path().join("dist/star.svg.js").exists());
        let sprite = fs::read_to_string(temp.path().join("dist/sprite.svg")).unwrap();
        assert!(!sprite.contains("<symbol"));
    }

    #[test]
    fn invalid_edit_keeps_previous_symbol() {
        let temp = tempdir().unwrap();
        let icons = temp.path().join("icons");
        fs::create_dir_all(&icons).unwrap();
        fs::write(icons.join("home.svg"), "<svg><path d=\"M0 0\"/></svg>").unwrap();
        let builder = builder(temp.path());
        let mut sheet = initial_build(&builder).unwrap();

        fs::write(icons.join("home.svg"), "<svg><g></svg>").unwrap();
        let err = handle_event(&builder, &mut sheet, WatchEvent::Changed(icons.join("home.svg")));

        assert!(err.is_err());
        assert_eq!(sheet.symbol_ids(), vec!["icon-home"]);
    }
}
