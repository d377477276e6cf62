//! Sprite registry: one hidden container, many mountable symbols.
//!
//! Each registered symbol carries its markup and id. Mounting inserts the
//! markup into the container; unmounting removes it. The live fragments kept
//! per id detect symbols that are mounted more than once at the same time,
//! and a document lookup catches ids that collide with markup the registry
//! does not own. Both cases are reported through [`Diagnostics`] and the
//! insertion still happens.
//!
//! The container is created lazily on the first mount. While the document is
//! still loading, both the host lookup and the insertion wait for
//! DOMContentLoaded. When something outside the registry detaches the
//! container (a framework replacing the body, say), the next mount builds a
//! fresh container and forgets the old live fragments.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use svg_sprite_adapters::Mount;

use crate::dom::{ContainerTarget, Document, ReadyState};

/// Inline style that keeps the container out of layout.
pub const CONTAINER_STYLE: &str = "position:absolute;width:0;height:0;overflow:hidden";

/// Receiver for registry warnings.
///
/// Implementations must not call back into the registry.
pub trait Diagnostics {
    /// A symbol id is about to be inserted while another element with that id
    /// is already present.
    fn duplicate_symbol(&self, id: &str);
}

/// Reports diagnostics as `tracing` warnings.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn duplicate_symbol(&self, id: &str) {
        tracing::warn!(
            "Icon #{} was repeatedly registered. It must be globally unique.",
            id
        );
    }
}

/// Logs like [`TracingDiagnostics`] and keeps every duplicate id it saw.
#[derive(Debug, Default, Clone)]
pub struct RecordingDiagnostics {
    duplicates: Rc<RefCell<Vec<String>>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Duplicate ids in the order they were reported.
    pub fn duplicates(&self) -> Vec<String> {
        self.duplicates.borrow().clone()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn duplicate_symbol(&self, id: &str) {
        TracingDiagnostics.duplicate_symbol(id);
        self.duplicates.borrow_mut().push(id.to_string());
    }
}

/// Registry construction options.
pub struct RegistryOptions {
    pub target: ContainerTarget,
    pub diagnostics: Box<dyn Diagnostics>,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            target: ContainerTarget::Body,
            diagnostics: Box::new(TracingDiagnostics),
        }
    }
}

/// Process-wide sprite registry bound to one document.
///
/// Cloning is cheap and shares state. A registry built with
/// [`SpriteRegistry::without_document`] hands out handles whose operations
/// do nothing, for environments with no DOM.
pub struct SpriteRegistry<D: Document> {
    inner: Option<Rc<RegistryInner<D>>>,
}

struct RegistryInner<D: Document> {
    doc: Rc<D>,
    target: ContainerTarget,
    diagnostics: Box<dyn Diagnostics>,
    state: RefCell<SpriteState<D::Node>>,
}

struct SpriteState<N> {
    container: Option<SpriteContainer<N>>,
    /// Bumped whenever a new container replaces the old one
    generation: u64,
    /// Fragments inserted into the current container, by symbol id
    live_ids: HashMap<String, Vec<N>>,
}

struct SpriteContainer<N> {
    root: N,
    /// Id lookup scope: the document, or the host's shadow root. Settled
    /// once the host is resolved.
    scope: Rc<RefCell<N>>,
    /// Host lookup and insertion deferred until the document finishes loading
    pending: Rc<Cell<bool>>,
}

struct SymbolEntry<N> {
    id: String,
    markup: String,
    fragment: Option<N>,
}

impl<D: Document> Clone for SpriteRegistry<D> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<D: Document> fmt::Debug for SpriteRegistry<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("SpriteRegistry");
        match &self.inner {
            Some(inner) => {
                let state = inner.state.borrow();
                s.field("target", &inner.target)
                    .field("generation", &state.generation)
                    .field("live_ids", &state.live_ids)
            }
            None => s.field("document", &"none"),
        };
        s.finish()
    }
}

impl<D: Document + 'static> SpriteRegistry<D> {
    /// Registry inserting its container at the start of `<body>`.
    pub fn new(doc: Rc<D>) -> Self {
        Self::with_options(doc, RegistryOptions::default())
    }

    pub fn with_options(doc: Rc<D>, options: RegistryOptions) -> Self {
        Self {
            inner: Some(Rc::new(RegistryInner {
                doc,
                target: options.target,
                diagnostics: options.diagnostics,
                state: RefCell::new(SpriteState {
                    container: None,
                    generation: 0,
                    live_ids: HashMap::new(),
                }),
            })),
        }
    }

    /// Registry for an environment without a document.
    pub fn without_document() -> Self {
        Self { inner: None }
    }

    pub fn has_document(&self) -> bool {
        self.inner.is_some()
    }

    /// Create a handle for one symbol. Nothing touches the document until
    /// the handle is mounted.
    pub fn register_symbol(&self, markup: &str, id: &str) -> SymbolHandle<D> {
        SymbolHandle {
            registry: self.inner.clone(),
            entry: Rc::new(RefCell::new(SymbolEntry {
                id: id.to_string(),
                markup: markup.to_string(),
                fragment: None,
            })),
        }
    }

    /// Register and mount in one step, returning the matching dispose callback.
    pub fn add_symbol(&self, markup: &str, id: &str) -> Box<dyn FnOnce()> {
        let handle = self.register_symbol(markup, id);
        handle.mount();
        handle.unmount_fn()
    }

    /// Number of fragments with this id still attached to the current
    /// container.
    pub fn live_count(&self, id: &str) -> usize {
        let Some(inner) = self.inner.as_ref() else {
            return 0;
        };
        let state = inner.state.borrow();
        match (&state.container, state.live_ids.get(id)) {
            (Some(container), Some(fragments)) => fragments
                .iter()
                .filter(|f| inner.doc.parent(f).as_ref() == Some(&container.root))
                .count(),
            _ => 0,
        }
    }

    /// Root element of the current container, if one was created.
    pub fn container(&self) -> Option<D::Node> {
        let inner = self.inner.as_ref()?;
        let state = inner.state.borrow();
        state.container.as_ref().map(|c| c.root.clone())
    }
}

impl<D: Document + 'static> RegistryInner<D> {
    /// Current container, replacing it when it was detached. Returns the
    /// container root and id scope.
    fn ensure_container(&self, state: &mut SpriteState<D::Node>) -> Option<(D::Node, D::Node)> {
        if let Some(container) = &state.container {
            if container.pending.get() || self.doc.is_connected(&container.root) {
                let scope = container.scope.borrow().clone();
                return Some((container.root.clone(), scope));
            }
            tracing::debug!(container = %self.target, "sprite container detached, recreating");
        }

        let container = self.create_container()?;
        let scope = container.scope.borrow().clone();
        let current = (container.root.clone(), scope);
        state.container = Some(container);
        state.generation += 1;
        state.live_ids.clear();
        Some(current)
    }

    fn create_container(&self) -> Option<SpriteContainer<D::Node>> {
        let root = self.doc.create_svg_element("svg");
        self.doc.set_attribute(&root, "style", CONTAINER_STYLE);
        self.doc.set_attribute(&root, "aria-hidden", "true");

        if self.doc.ready_state() == ReadyState::Loading {
            tracing::debug!(
                container = %self.target,
                "document loading, deferring sprite insertion"
            );
            let scope = Rc::new(RefCell::new(self.doc.root()));
            let pending = Rc::new(Cell::new(true));
            let target = self.target.clone();
            let (deferred_root, deferred_scope, deferred_pending) =
                (root.clone(), Rc::clone(&scope), Rc::clone(&pending));
            self.doc.on_content_loaded(Box::new(move |doc: &D| {
                deferred_pending.set(false);
                if let Some((scope, parent)) = resolve_host(doc, &target) {
                    *deferred_scope.borrow_mut() = scope;
                    doc.insert_first_child(&parent, &deferred_root);
                }
            }));
            return Some(SpriteContainer {
                root,
                scope,
                pending,
            });
        }

        let (scope, parent) = resolve_host(self.doc.as_ref(), &self.target)?;
        self.doc.insert_first_child(&parent, &root);
        Some(SpriteContainer {
            root,
            scope: Rc::new(RefCell::new(scope)),
            pending: Rc::new(Cell::new(false)),
        })
    }

    fn mount(&self, entry: &RefCell<SymbolEntry<D::Node>>) {
        let mut state = self.state.borrow_mut();
        let Some((root, scope)) = self.ensure_container(&mut state) else {
            return;
        };
        let mut entry = entry.borrow_mut();

        if let Some(fragment) = entry.fragment.take() {
            if self.doc.parent(&fragment).as_ref() == Some(&root) {
                entry.fragment = Some(fragment);
                return;
            }
            // Stale: left in a replaced container or pulled out from under us
            self.doc.remove(&fragment);
            release(&mut state.live_ids, &entry.id, &fragment);
        }

        // Fragments removed by outside code no longer count as live
        let live = match state.live_ids.get_mut(&entry.id) {
            Some(fragments) => {
                fragments.retain(|f| self.doc.parent(f).as_ref() == Some(&root));
                !fragments.is_empty()
            }
            None => false,
        };
        if live || self.doc.get_element_by_id(&scope, &entry.id).is_some() {
            self.diagnostics.duplicate_symbol(&entry.id);
        }

        match self.doc.append_markup(&root, &entry.markup) {
            Some(fragment) => {
                state
                    .live_ids
                    .entry(entry.id.clone())
                    .or_default()
                    .push(fragment.clone());
                entry.fragment = Some(fragment);
            }
            None => tracing::warn!(id = %entry.id, "symbol markup produced no node"),
        }
    }

    fn unmount(&self, entry: &RefCell<SymbolEntry<D::Node>>) {
        let mut state = self.state.borrow_mut();
        let mut entry = entry.borrow_mut();
        let Some(fragment) = entry.fragment.take() else {
            return;
        };

        self.doc.remove(&fragment);
        release(&mut state.live_ids, &entry.id, &fragment);
    }
}

/// Host element for the container: the id lookup scope and the insertion
/// parent. A shadow host scopes lookups to its shadow root.
fn resolve_host<D: Document>(doc: &D, target: &ContainerTarget) -> Option<(D::Node, D::Node)> {
    let host = match target {
        ContainerTarget::Body => doc.body(),
        ContainerTarget::Selector(selector) => doc.query_selector(&doc.root(), selector),
    };
    let Some(host) = host else {
        tracing::warn!(container = %target, "sprite container host not found");
        return None;
    };

    match doc.shadow_root(&host) {
        Some(shadow) => {
            let parent = doc
                .query_selector(&shadow, "body")
                .unwrap_or_else(|| shadow.clone());
            Some((shadow, parent))
        }
        None => Some((doc.root(), host)),
    }
}

/// Forget one inserted fragment. Fragments from a replaced container were
/// already dropped with the old live set.
fn release<N: PartialEq>(live_ids: &mut HashMap<String, Vec<N>>, id: &str, fragment: &N) {
    if let Some(fragments) = live_ids.get_mut(id) {
        fragments.retain(|f| f != fragment);
        if fragments.is_empty() {
            live_ids.remove(id);
        }
    }
}

/// Mount/unmount controls for one registered symbol.
///
/// Clones share the same fragment. Operations on a handle from a registry
/// without a document are no-ops.
pub struct SymbolHandle<D: Document> {
    registry: Option<Rc<RegistryInner<D>>>,
    entry: Rc<RefCell<SymbolEntry<D::Node>>>,
}

impl<D: Document> Clone for SymbolHandle<D> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            entry: Rc::clone(&self.entry),
        }
    }
}

impl<D: Document> fmt::Debug for SymbolHandle<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entry = self.entry.borrow();
        f.debug_struct("SymbolHandle")
            .field("id", &entry.id)
            .field("fragment", &entry.fragment)
            .finish()
    }
}

impl<D: Document + 'static> SymbolHandle<D> {
    pub fn id(&self) -> String {
        self.entry.borrow().id.clone()
    }

    /// Insert the symbol into the container. Idempotent while the fragment
    /// sits in the current container.
    pub fn mount(&self) {
        if let Some(registry) = &self.registry {
            registry.mount(&self.entry);
        }
    }

    /// Remove the symbol. Does nothing if it is not mounted.
    pub fn unmount(&self) {
        if let Some(registry) = &self.registry {
            registry.unmount(&self.entry);
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.entry.borrow().fragment.is_some()
    }

    /// The inserted node, while mounted.
    pub fn fragment(&self) -> Option<D::Node> {
        self.entry.borrow().fragment.clone()
    }

    /// `mount` as a shareable callback for framework components.
    pub fn mount_fn(&self) -> Mount {
        let handle = self.clone();
        Rc::new(move || handle.mount())
    }

    /// `unmount` as a one-shot callback for hot disposal.
    pub fn unmount_fn(&self) -> Box<dyn FnOnce()> {
        let handle = self.clone();
        Box::new(move || handle.unmount())
    }
}
