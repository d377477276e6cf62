//! Resolve and transform hooks.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use globset::GlobSet;
use regex::Regex;
use serde::{Deserialize, Serialize};

use svg_sprite_adapters::ExportType;
use svg_sprite_runtime::script::{register_module, rewrite_container};
use svg_sprite_symbol::{
    content_hash, extract_symbol_with, ExtractOptions, ModuleDescriptor, Optimizer, Plugin,
    PrefixIds,
};

use crate::error::{ConfigError, PluginError};
use crate::generator::{display_name, file_stem, symbol_id, GeneratedModule, ModuleGenerator};
use crate::options::SpriteOptions;
use crate::sourcemap::SourceMap;

/// Ids of the registry runtime module whose container host can be rewritten.
static REGISTER_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/svg-sprite/.+/register\.js").expect("Invalid register module regex")
});

/// Per-module metadata attached at resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleMeta {
    pub svg_sprite: bool,
}

/// A resolved virtual module id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedId {
    pub id: String,
    pub meta: ModuleMeta,
}

/// Result of the transform hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutput {
    pub code: String,
    /// Set for generated icon modules only
    pub module_side_effects: Option<bool>,
    pub map: SourceMap,
}

/// A runtime file to emit next to generated modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeFile {
    /// Path relative to the runtime directory
    pub path: String,
    pub contents: String,
}

/// The SVG sprite transform.
pub struct SpritePlugin {
    options: SpriteOptions,
    export_type: ExportType,
    include: GlobSet,
    optimizer: Optimizer,
    generator: ModuleGenerator,
}

impl SpritePlugin {
    pub const NAME: &'static str = "svg-sprite";

    /// Validate options and build the plugin.
    pub fn new(options: SpriteOptions) -> Result<Self, ConfigError> {
        let export_type: ExportType = options.export_type.parse()?;
        let include = options.include.compile()?;
        let optimizer = Optimizer::from_config(&options.svgo)?;
        let generator = ModuleGenerator::new(&options.runtime_base, export_type, options.hot)?;

        tracing::debug!(
            export_type = %export_type,
            include = ?options.include.patterns(),
            plugins = optimizer.plugins().len(),
            "svg-sprite plugin configured"
        );

        Ok(Self {
            options,
            export_type,
            include,
            optimizer,
            generator,
        })
    }

    pub fn options(&self) -> &SpriteOptions {
        &self.options
    }

    pub fn export_type(&self) -> ExportType {
        self.export_type
    }

    pub fn generator(&self) -> &ModuleGenerator {
        &self.generator
    }

    /// Whether `id` is selected by the include globs.
    pub fn matches(&self, id: &str) -> bool {
        self.include.is_match(id)
    }

    /// Mark a matching import as a virtual `.js` module.
    pub fn resolve_id(&self, id: &str) -> Option<ResolvedId> {
        if !self.matches(id) {
            return None;
        }
        Some(ResolvedId {
            id: format!("{id}.js"),
            meta: ModuleMeta { svg_sprite: true },
        })
    }

    /// Transform a module. Returns `None` for modules this plugin does not own.
    ///
    /// Icon modules are read from disk at `id` minus the `.js` suffix added by
    /// [`SpritePlugin::resolve_id`]; `code` is ignored for them.
    pub fn transform(
        &self,
        code: &str,
        id: &str,
        meta: Option<&ModuleMeta>,
    ) -> Result<Option<TransformOutput>, PluginError> {
        if let Some(selector) = &self.options.container_selector {
            if REGISTER_ID_RE.is_match(id) {
                tracing::debug!(id, selector = %selector, "rewriting sprite container host");
                return Ok(Some(TransformOutput {
                    code: rewrite_container(code, selector),
                    module_side_effects: None,
                    map: SourceMap::line_to_line(code, id),
                }));
            }
        }

        if !meta.is_some_and(|m| m.svg_sprite) {
            return Ok(None);
        }

        let path = id.strip_suffix(".js").unwrap_or(id);
        let raw = fs::read_to_string(path).map_err(|e| PluginError::Read {
            path: path.to_string(),
            message: e.to_string(),
        })?;

        let module = self.transform_svg(id, &raw)?;
        Ok(Some(self.output(id, module.code)))
    }

    /// Generate the module for raw SVG text. `id` only feeds naming and errors.
    pub fn transform_svg(&self, id: &str, raw: &str) -> Result<GeneratedModule, PluginError> {
        self.generate(id, raw, None)
    }

    /// Like [`SpritePlugin::transform_svg`], importing the runtime from
    /// `runtime_base`.
    pub fn transform_svg_with_base(
        &self,
        id: &str,
        raw: &str,
        runtime_base: &str,
    ) -> Result<GeneratedModule, PluginError> {
        self.generate(id, raw, Some(runtime_base))
    }

    fn generate(
        &self,
        id: &str,
        raw: &str,
        runtime_base: Option<&str>,
    ) -> Result<GeneratedModule, PluginError> {
        let path = id.strip_suffix(".js").unwrap_or(id);
        let invalid = |reason: String| PluginError::InvalidSvg {
            path: path.to_string(),
            reason,
        };

        let name = file_stem(id);
        if name.is_empty() {
            return Err(invalid("file name has no stem".to_string()));
        }
        let hash = content_hash(raw);
        let symbol_id = symbol_id(&self.options.symbol_id, &hash, name);

        let optimized = self
            .optimizer_for(&hash)
            .optimize(raw)
            .map_err(|e| invalid(e.to_string()))?;
        let symbol = extract_symbol_with(
            &optimized,
            &symbol_id,
            &ExtractOptions { prefix_ids: false },
        )
        .map_err(|e| invalid(e.to_string()))?;

        let descriptor = ModuleDescriptor {
            symbol_id,
            display_name: display_name(name),
            symbol_xml: symbol.symbol_xml,
            attributes: symbol.attributes,
        };
        let code = match runtime_base {
            Some(base) => self.generator.render_with_base(&descriptor, base)?,
            None => self.generator.render(&descriptor)?,
        };

        tracing::debug!(id, symbol = %descriptor.symbol_id, hash = %hash, "generated icon module");

        Ok(GeneratedModule {
            code,
            descriptor,
            hash,
        })
    }

    /// Wrap generated code in a transform result.
    pub fn output(&self, id: &str, code: String) -> TransformOutput {
        let map = SourceMap::line_to_line(&code, id);
        TransformOutput {
            code,
            module_side_effects: Some(self.options.module_side_effects),
            map,
        }
    }

    /// Runtime modules the generated code imports, relative to the runtime base.
    pub fn runtime_files(&self) -> Vec<RuntimeFile> {
        let adapter = self.export_type.adapter();
        vec![
            RuntimeFile {
                path: "register.js".to_string(),
                contents: register_module(self.options.container_selector.as_deref()),
            },
            RuntimeFile {
                path: format!("adapters/{}.js", self.export_type),
                contents: adapter.runtime_module().to_string(),
            },
            RuntimeFile {
                path: "svg.d.ts".to_string(),
                contents: adapter.type_declarations(),
            },
        ]
    }

    /// The configured pipeline behind the mandatory id prefixing step.
    fn optimizer_for(&self, hash: &str) -> Optimizer {
        let mut plugins = Vec::with_capacity(self.optimizer.plugins().len() + 1);
        plugins.push(Plugin::PrefixIds(PrefixIds::with_prefix(hash)));
        plugins.extend(self.optimizer.plugins().iter().cloned());
        Optimizer::new(plugins, self.optimizer.multipass())
    }
}

impl std::fmt::Debug for SpritePlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpritePlugin")
            .field("options", &self.options)
            .field("export_type", &self.export_type)
            .finish()
    }
}

/// Whether `path` looks like an SVG file by extension.
pub fn is_svg_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"))
}
