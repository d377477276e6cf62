//! React adapter.

use crate::component::IconComponent;
use crate::export::ExportType;
use crate::traits::{declare_svg_module, FrameworkAdapter, Mount};

/// Adapter exporting a memoized React function component.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReactAdapter;

impl FrameworkAdapter for ReactAdapter {
    fn export_type(&self) -> ExportType {
        ExportType::React
    }

    fn runtime_module(&self) -> &'static str {
        RUNTIME_MODULE
    }

    fn type_declarations(&self) -> String {
        declare_svg_module(
            "  import { FunctionComponent, SVGProps } from 'react';\n\n",
            "  const Component: FunctionComponent<SVGProps<SVGSVGElement>>;\n",
        )
    }

    fn component(&self, id: &str, display_name: &str, mount: Mount) -> IconComponent {
        // React serializes `xlinkHref` as `xlink:href`
        IconComponent::new(id, display_name, mount, "xlink:href", true)
    }
}

const RUNTIME_MODULE: &str = r#"import { createElement, memo } from 'react';

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
