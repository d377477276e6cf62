//! Preact adapter.

use crate::component::IconComponent;
use crate::export::ExportType;
use crate::traits::{declare_svg_module, FrameworkAdapter, Mount};

#[derive(Debug, Default, Clone, Copy)]
pub struct PreactAdapter;

impl FrameworkAdapter for PreactAdapter {
    fn export_type(&self) -> ExportType {
        ExportType::Preact
    }

    fn runtime_module(&self) -> &'static str {
        RUNTIME_MODULE
    }

    fn type_declarations(&self) -> String {
        declare_svg_module(
            "  import { ComponentClass, JSX } from 'preact';\n\n",
            "  const Component: ComponentClass<JSX.SVGAttributes>;\n",
        )
    }

    fn component(&self, id: &str, display_name: &str, mount: Mount) -> IconComponent {
        IconComponent::new(id, display_name, mount, "xlink:href", true)
    }
}

const RUNTIME_MODULE: &str = r#"import { createElement } from 'preact';
import { memo } from 'preact/compat';

export const adapter = (id, name, mount) => {
  const Icon = memo((props) => {
    mount();
    return createElement(
      'svg',
      {
        width: '1em',
        height: '1em',
        ...props,
      },
      createElement('use', { xlinkHref: `#${id}` }),
    );
  });

  Icon.displayName = `Icon${name}`;

  return Icon;
};
"#;
