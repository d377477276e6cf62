//! Batch build: icon modules, runtime files, and the sprite sheet.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use walkdir::WalkDir;

use svg_sprite_plugin::{check_module, is_svg_path, GeneratedModule, SourceMap, SpritePlugin};

use crate::sheet::SpriteSheet;

/// Configuration for one build.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory scanned for SVG files
    pub input_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Emit runtime modules and import them relatively
    pub emit_runtime: bool,

    /// Emit `sprite.svg`
    pub sheet: bool,

    /// Parse generated modules before writing them
    pub check: bool,
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of icon modules generated
    pub modules: usize,

    /// Number of runtime files written
    pub runtime_files: usize,

    /// Symbol ids that collided in the sprite sheet
    pub duplicates: Vec<String>,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read input: {0}")]
    ReadError(String),

    #[error(transparent)]
    Transform(#[from] svg_sprite_plugin::PluginError),

    #[error(transparent)]
    Syntax(#[from] svg_sprite_plugin::SyntaxError),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

/// An SVG file found under the input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,

    /// Path relative to the input directory, `/`-separated
    pub relative: String,
}

/// A generated module ready to be written.
#[derive(Debug)]
pub struct BuiltModule {
    pub source: SourceFile,
    pub module: GeneratedModule,
}

/// Sprite builder.
pub struct Builder {
    config: BuildConfig,
    plugin: SpritePlugin,
}

impl Builder {
    pub fn new(config: BuildConfig, plugin: SpritePlugin) -> Self {
        Self { config, plugin }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn plugin(&self) -> &SpritePlugin {
        &self.plugin
    }

    /// Build everything.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let sources = self.discover()?;

        // Transform and write modules in parallel
        let mut modules = sources
            .par_iter()
            .map(|source| -> Result<BuiltModule, BuildError> {
                let built = self.build_module(source)?;
                self.write_module(&built)?;
                Ok(built)
            })
            .collect::<Result<Vec<_>, _>>()?;
        modules.sort_by(|a, b| a.source.relative.cmp(&b.source.relative));

        let runtime_files = if self.config.emit_runtime {
            self.write_runtime()?
        } else {
            0
        };

        let mut duplicates = Vec::new();
        if self.config.sheet {
            let sheet = self.sheet_for(&modules);
            self.write_sheet(&sheet)?;
            duplicates = sheet.duplicates();
        }

        Ok(BuildResult {
            modules: modules.len(),
            runtime_files,
            duplicates,
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Find every SVG under the input directory selected by the include globs.
    pub fn discover(&self) -> Result<Vec<SourceFile>, BuildError> {
        if !self.config.input_dir.exists() {
            return Err(BuildError::ReadError(format!(
                "Input directory not found: {}",
                self.config.input_dir.display()
            )));
        }

        let mut sources: Vec<SourceFile> = WalkDir::new(&self.config.input_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| self.source_for(e.path()))
            .collect();
        sources.sort_by(|a, b| a.relative.cmp(&b.relative));

        tracing::debug!("Found {} svg files", sources.len());
        Ok(sources)
    }

    /// Source entry for `path`, if it is an included SVG under the input directory.
    pub fn source_for(&self, path: &Path) -> Option<SourceFile> {
        if !is_svg_path(path) {
            return None;
        }
        let relative = relative_id(path.strip_prefix(&self.config.input_dir).ok()?);
        self.plugin.matches(&relative).then(|| SourceFile {
            path: path.to_path_buf(),
            relative,
        })
    }

    /// Generate the module for one source.
    pub fn build_module(&self, source: &SourceFile) -> Result<BuiltModule, BuildError> {
        let raw = fs::read_to_string(&source.path)
            .map_err(|e| BuildError::ReadError(format!("{}: {}", source.path.display(), e)))?;
        let id = format!("{}.js", source.path.display());

        let module = if self.config.emit_runtime {
            let base = runtime_base_for(&source.relative);
            self.plugin.transform_svg_with_base(&id, &raw, &base)?
        } else {
            self.plugin.transform_svg(&id, &raw)?
        };

        if self.config.check {
            check_module(&id, &module.code)?;
        }

        Ok(BuiltModule {
            source: source.clone(),
            module,
        })
    }

    /// Write `<relative>.js` and its source map.
    pub fn write_module(&self, built: &BuiltModule) -> Result<(), BuildError> {
        let js_path = self.module_path(&built.source.relative);
        let file_name = js_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let map = SourceMap::line_to_line(&built.module.code, &file_name);
        let map_json = map
            .to_json()
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        write_file(&js_path, &built.module.code)?;
        write_file(&js_path.with_file_name(format!("{file_name}.map")), &map_json)?;

        tracing::debug!("Wrote {}", js_path.display());
        Ok(())
    }

    /// Delete the outputs of a source that no longer exists.
    pub fn remove_module(&self, relative: &str) -> Result<(), BuildError> {
        let js_path = self.module_path(relative);
        let map_path = PathBuf::from(format!("{}.map", js_path.display()));
        for path in [js_path, map_path] {
            if path.exists() {
                fs::remove_file(&path)
                    .map_err(|e| BuildError::WriteError(format!("{}: {}", path.display(), e)))?;
            }
        }
        Ok(())
    }

    /// Write runtime modules under `<output>/runtime`.
    pub fn write_runtime(&self) -> Result<usize, BuildError> {
        let runtime_dir = self.config.output_dir.join("runtime");
        let files = self.plugin.runtime_files();
        for file in &files {
            write_file(&runtime_dir.join(&file.path), &file.contents)?;
        }
        Ok(files.len())
    }

    /// Assemble a sprite sheet from built modules.
    pub fn sheet_for(&self, modules: &[BuiltModule]) -> SpriteSheet {
        let mut sheet = SpriteSheet::new(self.plugin.export_type());
        for built in modules {
            sheet.upsert(&built.source.relative, &built.module.descriptor);
        }
        sheet
    }

    pub fn write_sheet(&self, sheet: &SpriteSheet) -> Result<(), BuildError> {
        let path = self.config.output_dir.join("sprite.svg");
        write_file(&path, &sheet.to_markup())?;
        tracing::debug!(
            "Wrote {} with symbols: {}",
            path.display(),
            sheet.symbol_ids().join(", ")
        );
        Ok(())
    }

    fn module_path(&self, relative: &str) -> PathBuf {
        self.config.output_dir.join(format!("{relative}.js"))
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| BuildError::WriteError(format!("{}: {}", parent.display(), e)))?;
    }
    fs::write(path, contents)
        .map_err(|e| BuildError::WriteError(format!("{}: {}", path.display(), e)))
}

/// `/`-joined path components.
fn relative_id(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Runtime import prefix for a module emitted at `relative`.
fn runtime_base_for(relative: &str) -> String {
    let depth = relative.matches('/').count();
    if depth == 0 {
        "./runtime".to_string()
    } else {
        format!("{}runtime", "../".repeat(depth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use svg_sprite_plugin::{Include, SpriteOptions};
    use tempfile::{tempdir, TempDir};

    const HOME: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><path d="M0 0"/></svg>"#;
    const STAR: &str = r#"<svg viewBox="0 0 10 10"><path d="M5 0"/></svg>"#;

    fn builder(temp: &TempDir, options: SpriteOptions) -> Builder {
        Builder::new(
            BuildConfig {
                input_dir: temp.path().join("icons"),
                output_dir: temp.path().join("dist"),
                emit_runtime: true,
                sheet: true,
                check: true,
            },
            SpritePlugin::new(options).unwrap(),
        )
    }

    fn write_icons(temp: &TempDir, files: &[(&str, &str)]) {
        for (name, contents) in files {
            let path = temp.path().join("icons").join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }
    }

    #[test]
    fn builds_modules_runtime_and_sheet() {
        let temp = tempdir().unwrap();
        write_icons(&temp, &[("home.svg", HOME), ("nav/star.svg", STAR), ("notes.txt", "x")]);

        let result = builder(&temp, SpriteOptions::default()).build().unwrap();

        assert_eq!(result.modules, 2);
        assert_eq!(result.runtime_files, 3);
        assert!(result.duplicates.is_empty());

        let dist = temp.path().join("dist");
        let home = fs::read_to_string(dist.join("home.svg.js")).unwrap();
        assert!(home.contains(r#"from "./runtime/register.js""#));
        let star = fs::read_to_string(dist.join("nav/star.svg.js")).unwrap();
        assert!(star.contains(r#"from "../runtime/adapters/vanilla.js""#));
        assert!(dist.join("nav/star.svg.js.map").exists());
        assert!(dist.join("runtime/register.js").exists());
        assert!(dist.join("runtime/svg.d.ts").exists());

        let sheet = fs::read_to_string(dist.join("sprite.svg")).unwrap();
        assert!(sheet.contains(r#"<symbol id="icon-home" viewBox="0 0 24 24">"#));
        assert!(sheet.contains(r#"<symbol id="icon-star" viewBox="0 0 10 10">"#));
    }

    #[test]
    fn source_map_names_the_emitted_file() {
        let temp = tempdir().unwrap();
        write_icons(&temp, &[("home.svg", HOME)]);
        builder(&temp, SpriteOptions::default()).build().unwrap();

        let map: SourceMap = serde_json::from_str(
            &fs::read_to_string(temp.path().join("dist/home.svg.js.map")).unwrap(),
        )
        .unwrap();

        assert_eq!(map.file, "home.svg.js");
        assert_eq!(map.version, 3);
    }

    #[test]
    fn configured_runtime_base_is_kept_without_emitted_runtime() {
        let temp = tempdir().unwrap();
        write_icons(&temp, &[("home.svg", HOME)]);
        let mut builder = builder(&temp, SpriteOptions::default());
        builder.config.emit_runtime = false;

        let result = builder.build().unwrap();

        assert_eq!(result.runtime_files, 0);
        let home = fs::read_to_string(temp.path().join("dist/home.svg.js")).unwrap();
        assert!(home.contains(r#"from "svg-sprite/runtime/register.js""#));
        assert!(!temp.path().join("dist/runtime").exists());
    }

    #[test]
    fn reports_duplicate_symbol_ids() {
        let temp = tempdir().unwrap();
        write_icons(&temp, &[("a/home.svg", HOME), ("b/home.svg", STAR)]);

        let result = builder(&temp, SpriteOptions::default()).build().unwrap();

        assert_eq!(result.modules, 2);
        assert_eq!(result.duplicates, vec!["icon-home"]);
    }

    #[test]
    fn include_globs_filter_sources() {
        let temp = tempdir().unwrap();
        write_icons(&temp, &[("home.svg", HOME), ("nav/star.svg", STAR)]);
        let builder = builder(
            &temp,
            SpriteOptions {
                include: Include::One("nav/*.svg".to_string()),
                ..Default::default()
            },
        );

        let sources = builder.discover().unwrap();

        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].relative, "nav/star.svg");
    }

    #[test]
    fn invalid_svg_fails_the_build() {
        let temp = tempdir().unwrap();
        write_icons(&temp, &[("home.svg", HOME), ("broken.svg", "<svg><g></svg>")]);

        let err = builder(&temp, SpriteOptions::default()).build().unwrap_err();

        assert!(err.to_string().starts_with("Invalid svg file:"));
        assert!(err.to_string().ends_with("broken.svg"));
    }

    #[test]
    fn missing_input_dir_is_read_error() {
        let temp = tempdir().unwrap();
        let err = builder(&temp, SpriteOptions::default()).build().unwrap_err();
        assert!(matches!(err, BuildError::ReadError(_)));
    }

    #[test]
    fn removes_outputs_of_deleted_sources() {
        let temp = tempdir().unwrap();
        write_icons(&temp, &[("home.svg", HOME)]);
        let builder = builder(&temp, SpriteOptions::default());
        builder.build().unwrap();

        builder.remove_module("home.svg").unwrap();

        assert!(!temp.path().join("dist/home.svg.js").exists());
        assert!(!temp.path().join("dist/home.svg.js.map").exists());
    }

    #[test]
    fn runtime_base_climbs_to_output_root() {
        assert_eq!(runtime_base_for("home.svg"), "./runtime");
        assert_eq!(runtime_base_for("a/home.svg"), "../runtime");
        assert_eq!(runtime_base_for("a/b/home.svg"), "../../runtime");
    }
}
