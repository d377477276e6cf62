//! Static sprite sheet assembled by the sprite registry.
//!
//! Every generated module is instantiated against an in-memory document and
//! rendered once, which mounts its symbol into the shared container. The
//! container's contents become `sprite.svg`. Re-inserting a module disposes
//! the previous instance through its hot slot first, so watch mode never
//! leaves stale symbols behind.

use std::collections::BTreeMap;
use std::rc::Rc;

use svg_sprite_adapters::{ExportType, FrameworkAdapter};
use svg_sprite_runtime::{
    HotSlot, IconModule, MemoryDocument, RecordingDiagnostics, RegistryOptions, SpriteRegistry,
};
use svg_sprite_symbol::ModuleDescriptor;

const SHEET_OPEN: &str =
    r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">"#;

struct SheetEntry {
    slot: HotSlot,
    module: IconModule<MemoryDocument>,
}

pub struct SpriteSheet {
    doc: Rc<MemoryDocument>,
    registry: SpriteRegistry<MemoryDocument>,
    diagnostics: RecordingDiagnostics,
    adapter: &'static dyn FrameworkAdapter,
    entries: BTreeMap<String, SheetEntry>,
}

impl SpriteSheet {
    pub fn new(export_type: ExportType) -> Self {
        let doc = Rc::new(MemoryDocument::new());
        let diagnostics = RecordingDiagnostics::new();
        let registry = SpriteRegistry::with_options(
            Rc::clone(&doc),
            RegistryOptions {
                diagnostics: Box::new(diagnostics.clone()),
                ..Default::default()
            },
        );

        Self {
            doc,
            registry,
            diagnostics,
            adapter: export_type.adapter(),
            entries: BTreeMap::new(),
        }
    }

    /// Add or replace the module registered under `key`. Returns true when a
    /// previous instance was replaced.
    pub fn upsert(&mut self, key: &str, descriptor: &ModuleDescriptor) -> bool {
        let previous = self.entries.remove(key);
        let replaced = previous.is_some();
        let slot = match previous {
            Some(previous) => {
                previous.slot.replace();
                previous.slot
            }
            None => HotSlot::new(),
        };

        let module = IconModule::instantiate(&self.registry, descriptor, self.adapter, Some(&slot));
        module.component.render(&[]);

        self.entries
            .insert(key.to_string(), SheetEntry { slot, module });
        replaced
    }

    /// Dispose the module registered under `key`.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                entry.slot.replace();
                true
            }
            None => false,
        }
    }

    /// Number of modules whose symbol is mounted.
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.module.handle().is_mounted())
            .count()
    }

    /// Symbol ids reported as duplicates so far.
    pub fn duplicates(&self) -> Vec<String> {
        self.diagnostics.duplicates()
    }

    /// Ids of the mounted symbols, in sheet order.
    pub fn symbol_ids(&self) -> Vec<String> {
        match self.registry.container() {
            Some(container) => self
                .doc
                .children(container)
                .into_iter()
                .filter_map(|node| self.doc.attr(node, "id"))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Standalone sprite document.
    pub fn to_markup(&self) -> String {
        let symbols = self
            .registry
            .container()
            .map(|container| self.doc.inner_html(container))
            .unwrap_or_default();
        format!("{SHEET_OPEN}{symbols}</svg>\n")
    }
}
