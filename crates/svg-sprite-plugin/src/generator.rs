//! Module generation: naming, id templating, and the emitted JavaScript.

use minijinja::{context, Environment};
use svg_sprite_adapters::ExportType;
use svg_sprite_symbol::ModuleDescriptor;

use crate::error::{ConfigError, PluginError};

const MODULE_TEMPLATE_NAME: &str = "icon-module";

/// Emitted module. Values are JSON-encoded before rendering, so the template
/// never escapes.
const MODULE_TEMPLATE: &str = r#"import { registerSymbol } from {{ register_path }};
import { adapter } from {{ adapter_path }};

const id = {{ id }};
const name = {{ name }};
const symbolXml = {{ symbol_xml }};
const { mount, unmount } = registerSymbol(symbolXml, id);

export default adapter(id, name, mount);
export const attributes = {{ attributes }};
{% if hot %}

if (import.meta.hot) {
  import.meta.hot.dispose(unmount);
  import.meta.hot.accept();
}
{% endif %}
"#;

/// Output of transforming one SVG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedModule {
    pub code: String,
    pub descriptor: ModuleDescriptor,
    /// Content hash of the raw SVG
    pub hash: String,
}

/// Renders icon modules for one export type.
pub struct ModuleGenerator {
    env: Environment<'static>,
    runtime_base: String,
    export_type: ExportType,
    hot: bool,
}

impl ModuleGenerator {
    pub fn new(runtime_base: &str, export_type: ExportType, hot: bool) -> Result<Self, ConfigError> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.add_template_owned(MODULE_TEMPLATE_NAME.to_string(), MODULE_TEMPLATE.to_string())
            .map_err(|e| ConfigError::Template(e.to_string()))?;

        Ok(Self {
            env,
            runtime_base: runtime_base.trim_end_matches('/').to_string(),
            export_type,
            hot,
        })
    }

    pub fn runtime_base(&self) -> &str {
        &self.runtime_base
    }

    /// Import specifier of the registry runtime.
    pub fn register_path(&self) -> String {
        format!("{}/register.js", self.runtime_base)
    }

    /// Import specifier of the adapter runtime for this export type.
    pub fn adapter_path(&self) -> String {
        format!("{}/adapters/{}.js", self.runtime_base, self.export_type)
    }

    pub fn render(&self, descriptor: &ModuleDescriptor) -> Result<String, PluginError> {
        self.render_with_base(descriptor, &self.runtime_base)
    }

    /// Render importing the runtime from `runtime_base` instead of the
    /// configured one.
    pub fn render_with_base(
        &self,
        descriptor: &ModuleDescriptor,
        runtime_base: &str,
    ) -> Result<String, PluginError> {
        let runtime_base = runtime_base.trim_end_matches('/');
        let tmpl = self
            .env
            .get_template(MODULE_TEMPLATE_NAME)
            .map_err(|e| PluginError::Render(e.to_string()))?;
        let attributes = serde_json::to_string(&descriptor.attributes)
            .map_err(|e| PluginError::Render(e.to_string()))?;

        tmpl.render(context! {
            register_path => js_string(&format!("{runtime_base}/register.js")),
            adapter_path => js_string(&format!("{runtime_base}/adapters/{}.js", self.export_type)),
            id => js_string(&descriptor.symbol_id),
            name => js_string(&descriptor.display_name),
            symbol_xml => js_string(&descriptor.symbol_xml),
            attributes => attributes,
            hot => self.hot,
        })
        .map_err(|e| PluginError::Render(e.to_string()))
    }
}

/// JSON string literal, which is also a valid JavaScript string literal.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// File name of a module id without directories, without a trailing `.js`
/// added by resolution, and without its own extension. A file named only
/// `.svg` has an empty stem.
pub fn file_stem(id: &str) -> &str {
    let file = id.rsplit(['/', '\\']).next().unwrap_or(id);
    let file = file.strip_suffix(".js").unwrap_or(file);
    match file.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => file,
    }
}

/// Expand a symbol id template.
pub fn symbol_id(template: &str, hash: &str, name: &str) -> String {
    template.replace("[hash]", hash).replace("[name]", name)
}

/// PascalCase a file stem: `arrow-left` becomes `ArrowLeft`.
pub fn display_name(stem: &str) -> String {
    stem.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
