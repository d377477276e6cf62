//! Vue adapter.

use crate::component::IconComponent;
use crate::export::ExportType;
use crate::traits::{declare_svg_module, FrameworkAdapter, Mount};

/// Adapter exporting a Vue component defined with `defineComponent`.
///
/// Attributes fall through via `attrs` rather than declared props.
#[derive(Debug, Default, Clone, Copy)]
pub struct VueAdapter;

impl FrameworkAdapter for VueAdapter {
    fn export_type(&self) -> ExportType {
        ExportType::Vue
    }

    fn runtime_module(&self) -> &'static str {
        RUNTIME_MODULE
    }

    fn type_declarations(&self) -> String {
        declare_svg_module(
            "  import { DefineComponent } from 'vue';\n\n",
            "  const Component: DefineComponent<{}>;\n",
        )
    }

    fn component(&self, id: &str, display_name: &str, mount: Mount) -> IconComponent {
        IconComponent::new(id, display_name, mount, "xlink:href", false)
    }
}

const RUNTIME_MODULE: &str = r#"import { defineComponent, h } from 'vue';

export const adapter = (id, name, mount) =>
  defineComponent({
    name: `Icon${name}`,
    setup(_props, { attrs }) {
      mount();
      return () => {
        mount();
        return h(
          'svg',
          {
            width: '1em',
            height: '1em',
            ...attrs,
          },
          [h('use', { 'xlink:href': `#${id}` })],
        );
      };
    },
  });
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn mounts_on_each_render() {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let icon = VueAdapter.component(
            "icon-home",
            "Home",
            Rc::new(move || counter.set(counter.get() + 1)),
        );

        icon.render(&[]);
        icon.render(&[]);

        assert_eq!(count.get(), 2);
        assert!(!icon.is_memoized());
    }

    #[test]
    fn runtime_module_names_component() {
        let js = VueAdapter.runtime_module();
        assert!(js.contains("defineComponent"));
        assert!(js.contains("name: `Icon${name}`"));
        assert!(js.contains("'xlink:href'"));
    }
}
