//! Evaluation of a generated icon module against a registry.

use svg_sprite_adapters::{FrameworkAdapter, IconComponent};
use svg_sprite_symbol::{ModuleDescriptor, SymbolAttributes};

use crate::dom::Document;
use crate::hot::HotContext;
use crate::registry::{SpriteRegistry, SymbolHandle};

/// The exports of one icon module: the component (default export) and the
/// sizing attributes (named `attributes` export).
#[derive(Debug)]
pub struct IconModule<D: Document> {
    pub component: IconComponent,
    pub attributes: SymbolAttributes,
    handle: SymbolHandle<D>,
}

impl<D: Document + 'static> IconModule<D> {
    /// Do what the emitted JavaScript does at import time: register the
    /// symbol, bind the component's mount hook, and, when hot updates are
    /// enabled, unmount on dispose and accept replacement.
    pub fn instantiate(
        registry: &SpriteRegistry<D>,
        descriptor: &ModuleDescriptor,
        adapter: &dyn FrameworkAdapter,
        hot: Option<&dyn HotContext>,
    ) -> Self {
        let handle = registry.register_symbol(&descriptor.symbol_xml, &descriptor.symbol_id);
        let component = adapter.component(
            &descriptor.symbol_id,
            &descriptor.display_name,
            handle.mount_fn(),
        );

        if let Some(hot) = hot {
            hot.dispose(handle.unmount_fn());
            hot.accept();
        }

        tracing::trace!(
            id = %descriptor.symbol_id,
            adapter = adapter.name(),
            "instantiated icon module"
        );

        Self {
            component,
            attributes: descriptor.attributes.clone(),
            handle,
        }
    }

    pub fn handle(&self) -> &SymbolHandle<D> {
        &self.handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hot::HotSlot;
    use crate::memory::MemoryDocument;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;
    use svg_sprite_adapters::ExportType;

    fn descriptor(id: &str) -> ModuleDescriptor {
        ModuleDescriptor {
            symbol_id: id.to_string(),
            display_name: "Home".to_string(),
            symbol_xml: format!(r#"<symbol id="{id}" viewBox="0 0 24 24"><path d="M0 0"/></symbol>"#),
            attributes: SymbolAttributes {
                width: Some("24".to_string()),
                height: Some("24".to_string()),
                view_box: Some("0 0 24 24".to_string()),
            },
        }
    }

    #[test]
    fn rendering_mounts_symbol() {
        let doc = Rc::new(MemoryDocument::new());
        let registry = SpriteRegistry::new(Rc::clone(&doc));
        let module = IconModule::instantiate(
            &registry,
            &descriptor("icon-home"),
            ExportType::React.adapter(),
            None,
        );
        assert!(!module.handle().is_mounted());

        let tree = module.component.render(&[]);

        assert!(module.handle().is_mounted());
        assert_eq!(tree.children[0].attr("xlink:href"), Some("#icon-home"));
        assert_eq!(module.component.display_name(), "IconHome");
        assert_eq!(module.attributes.width.as_deref(), Some("24"));
    }

    #[test]
    fn hot_replacement_unmounts_previous_instance() {
        let doc = Rc::new(MemoryDocument::new());
        let registry = SpriteRegistry::new(Rc::clone(&doc));
        let slot = HotSlot::new();
        let adapter = ExportType::Vanilla.adapter();

        let first = IconModule::instantiate(&registry, &descriptor("icon-home"), adapter, Some(&slot));
        first.component.render(&[]);
        assert!(slot.is_accepted());

        assert_eq!(slot.replace(), 1);
        assert!(!first.handle().is_mounted());
        assert_eq!(registry.live_count("icon-home"), 0);

        let second = IconModule::instantiate(&registry, &descriptor("icon-home"), adapter, Some(&slot));
        second.component.render(&[]);

        let container = registry.container().unwrap();
        assert_eq!(doc.children(container).len(), 1);
        assert_eq!(registry.live_count("icon-home"), 1);
    }

    #[test]
    fn without_hot_context_nothing_is_registered_for_disposal() {
        let registry: SpriteRegistry<MemoryDocument> = SpriteRegistry::without_document();
        let module = IconModule::instantiate(
            &registry,
            &descriptor("icon-home"),
            ExportType::Vue.adapter(),
            None,
        );

        module.component.render(&[]);
        assert!(!module.handle().is_mounted());
    }
}
