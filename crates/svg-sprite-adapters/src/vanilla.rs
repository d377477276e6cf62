//! Framework-free adapter producing DOM elements.

use crate::component::IconComponent;
use crate::export::ExportType;
use crate::traits::{declare_svg_module, FrameworkAdapter, Mount};

/// Adapter for plain DOM usage: the default export is a function returning
/// a fresh `<svg>` element.
#[derive(Debug, Default, Clone, Copy)]
pub struct VanillaAdapter;

impl FrameworkAdapter for VanillaAdapter {
    fn export_type(&self) -> ExportType {
        ExportType::Vanilla
    }

    fn runtime_module(&self) -> &'static str {
        RUNTIME_MODULE
    }

    fn type_declarations(&self) -> String {
        declare_svg_module(
            "",
            "  const Component: ((attrs?: Record<string, string>) => SVGSVGElement) & {\n    readonly displayName: string;\n  };\n",
        )
    }

    fn component(&self, id: &str, display_name: &str, mount: Mount) -> IconComponent {
        IconComponent::new(id, display_name, mount, "href", false)
    }
}

const RUNTIME_MODULE: &str = r#"const SVG_NS = 'http://www.w3.org/2000/svg';

export const adapter = (id, name, mount) => {
  function Icon(attrs = {}) {
    mount();
    const svg = document.createElementNS(SVG_NS, 'svg');
    svg.setAttribute('width', '1em');
    svg.setAttribute('height', '1em');
    for (const [key, value] of Object.entries(attrs)) {
      svg.setAttribute(key, String(value));
    }
    const use = document.createElementNS(SVG_NS, 'use');
    use.setAttribute('href', `#${id}`);
    svg.appendChild(use);
    return svg;
  }

  Object.defineProperty(Icon, 'displayName', { value: `Icon${name}` });

  return Icon;
};
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn renders_plain_href() {
        let icon = VanillaAdapter.component("icon-home", "Home", Rc::new(|| {}));
        let tree = icon.render(&[]);

        assert_eq!(tree.children[0].attr("href"), Some("#icon-home"));
        assert!(!icon.is_memoized());
    }

    #[test]
    fn runtime_module_builds_dom_nodes() {
        let js = VanillaAdapter.runtime_module();
        assert!(js.contains("export const adapter"));
        assert!(js.contains("createElementNS"));
        assert!(js.contains("mount();"));
    }
}
