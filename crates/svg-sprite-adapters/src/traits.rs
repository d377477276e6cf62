//! Trait definitions for framework adapters.

use std::rc::Rc;

use crate::component::IconComponent;
use crate::export::ExportType;

/// Callback inserting a symbol into the sprite. Must be idempotent.
pub type Mount = Rc<dyn Fn()>;

/// Errors that can occur when selecting an adapter.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("invalid export type: {0}")]
    InvalidExportType(String),
}

/// Trait for framework-specific adapters.
pub trait FrameworkAdapter: Send + Sync {
    /// Export type this adapter implements
    fn export_type(&self) -> ExportType;

    /// Framework identifier (e.g., "react", "vue")
    fn name(&self) -> &'static str {
        self.export_type().as_str()
    }

    /// Source of the `adapters/<name>.js` runtime module.
    fn runtime_module(&self) -> &'static str;

    /// TypeScript declarations for `*.svg` imports under this adapter.
    fn type_declarations(&self) -> String;

    /// Wrap a symbol into a renderable icon.
    ///
    /// # Arguments
    /// * `id` - Symbol id inside the sprite
    /// * `display_name` - Name used for debugging (`Icon` is prepended)
    /// * `mount` - Callback inserting the symbol, invoked on every render
    fn component(&self, id: &str, display_name: &str, mount: Mount) -> IconComponent;
}

/// Declaration of the `attributes` named export shared by every adapter.
pub(crate) const ATTRIBUTES_DECLARATION: &str = r#"  export const attributes: {
    width?: string;
    height?: string;
    viewBox?: string;
  };
"#;

/// Wrap a default-export declaration into a `declare module '*.svg'` block.
pub(crate) fn declare_svg_module(imports: &str, default_export: &str) -> String {
    format!(
        "declare module '*.svg' {{\n{imports}{default_export}  export default Component;\n{ATTRIBUTES_DECLARATION}}}\n"
    )
}
