//! The slice of the DOM the registry depends on.

use std::fmt;

/// Document loading state, as in `document.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

/// Where the sprite container is inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ContainerTarget {
    /// The document body
    #[default]
    Body,
    /// First element matching a CSS selector
    Selector(String),
}

impl ContainerTarget {
    pub fn from_selector(selector: Option<String>) -> Self {
        selector.map_or(ContainerTarget::Body, ContainerTarget::Selector)
    }
}

impl fmt::Display for ContainerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerTarget::Body => f.write_str("body"),
            ContainerTarget::Selector(selector) => f.write_str(selector),
        }
    }
}

/// DOM operations used by the sprite registry.
///
/// All methods take `&self`; implementations use interior mutability and are
/// only ever driven from a single thread.
pub trait Document {
    /// Handle to a node. Handles compare equal when they refer to the same node.
    type Node: Clone + PartialEq + fmt::Debug + 'static;

    fn ready_state(&self) -> ReadyState;

    /// Run `callback` once when the document leaves the `Loading` state.
    fn on_content_loaded(&self, callback: Box<dyn FnOnce(&Self)>);

    /// The document node itself.
    fn root(&self) -> Self::Node;

    fn body(&self) -> Option<Self::Node>;

    /// First descendant of `scope` matching `selector`.
    fn query_selector(&self, scope: &Self::Node, selector: &str) -> Option<Self::Node>;

    /// Open shadow root attached to `host`, if any.
    fn shadow_root(&self, host: &Self::Node) -> Option<Self::Node>;

    /// Descendant of `scope` (document or shadow root) with the given id.
    fn get_element_by_id(&self, scope: &Self::Node, id: &str) -> Option<Self::Node>;

    /// Create a detached element in the SVG namespace.
    fn create_svg_element(&self, tag: &str) -> Self::Node;

    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);

    fn insert_first_child(&self, parent: &Self::Node, child: &Self::Node);

    /// Parse `markup` and append it to `parent` (`insertAdjacentHTML('beforeend')`),
    /// returning the parent's new last child.
    fn append_markup(&self, parent: &Self::Node, markup: &str) -> Option<Self::Node>;

    /// Detach `node` from its parent. Detached nodes are left untouched.
    fn remove(&self, node: &Self::Node);

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Whether `node` is reachable from the document, through shadow hosts.
    fn is_connected(&self, node: &Self::Node) -> bool;
}
