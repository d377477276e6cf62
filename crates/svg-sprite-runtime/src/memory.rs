//! In-memory document used for static sprite assembly and tests.

use std::cell::{Cell, RefCell};
use std::fmt;

use svg_sprite_symbol::xml::{parse_fragment, Node};

use crate::dom::{Document, ReadyState};

/// Handle to a node in a [`MemoryDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
enum NodeKind {
    Document,
    ShadowRoot { host: NodeId },
    Element { tag: String, attributes: Vec<(String, String)> },
    Text(String),
    Comment(String),
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    shadow_root: Option<NodeId>,
}

/// A minimal arena-backed DOM.
///
/// Supports the operations the sprite registry needs plus a few helpers for
/// building pages and inspecting results. Selectors are limited to a single
/// compound selector (`tag`, `#id`, `.class` and combinations).
pub struct MemoryDocument {
    nodes: RefCell<Vec<NodeData>>,
    ready_state: Cell<ReadyState>,
    listeners: RefCell<Vec<Box<dyn FnOnce(&MemoryDocument)>>>,
}

const DOCUMENT: NodeId = NodeId(0);

impl MemoryDocument {
    /// A fully loaded `<html><head/><body/></html>` document.
    pub fn new() -> Self {
        let doc = Self {
            nodes: RefCell::new(vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
                shadow_root: None,
            }]),
            ready_state: Cell::new(ReadyState::Complete),
            listeners: RefCell::new(Vec::new()),
        };

        let html = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        doc.append_child(DOCUMENT, html);
        doc.append_child(html, head);
        doc.append_child(html, body);
        doc
    }

    /// Same as [`MemoryDocument::new`], but still in the `Loading` state.
    pub fn loading() -> Self {
        let doc = Self::new();
        doc.ready_state.set(ReadyState::Loading);
        doc
    }

    /// Leave the `Loading` state and fire content-loaded listeners in
    /// subscription order.
    pub fn finish_loading(&self) {
        if self.ready_state.get() != ReadyState::Loading {
            return;
        }
        self.ready_state.set(ReadyState::Interactive);

        let listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        tracing::trace!(count = listeners.len(), "firing content-loaded listeners");
        for listener in listeners {
            listener(self);
        }
    }

    pub fn create_element(&self, tag: &str) -> NodeId {
        self.push(NodeKind::Element {
            tag: tag.to_string(),
            attributes: Vec::new(),
        })
    }

    /// Append `child`, detaching it from any previous parent.
    pub fn append_child(&self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let mut nodes = self.nodes.borrow_mut();
        nodes[child.0].parent = Some(parent);
        nodes[parent.0].children.push(child);
    }

    /// Attach an open shadow root to `host`, returning the existing one if present.
    pub fn attach_shadow(&self, host: NodeId) -> NodeId {
        if let Some(existing) = self.nodes.borrow()[host.0].shadow_root {
            return existing;
        }
        let shadow = self.push(NodeKind::ShadowRoot { host });
        self.nodes.borrow_mut()[host.0].shadow_root = Some(shadow);
        shadow
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        match &self.nodes.borrow()[node.0].kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone()),
            _ => None,
        }
    }

    pub fn tag_name(&self, node: NodeId) -> Option<String> {
        match &self.nodes.borrow()[node.0].kind {
            NodeKind::Element { tag, .. } => Some(tag.clone()),
            _ => None,
        }
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes.borrow()[node.0].children.clone()
    }

    /// All descendant elements of `scope` matching `selector`, in document order.
    pub fn query_selector_all(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        let selector = SimpleSelector::parse(selector);
        let mut found = Vec::new();
        self.descendants(scope, &mut |id, data| {
            if selector.matches(&data.kind) {
                found.push(id);
            }
            false
        });
        found
    }

    /// Serialize a node and its subtree.
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.serialize(node, &mut out);
        out
    }

    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            self.serialize(child, &mut out);
        }
        out
    }

    fn push(&self, kind: NodeKind) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
            shadow_root: None,
        });
        NodeId(nodes.len() - 1)
    }

    fn detach(&self, node: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(parent) = nodes[node.0].parent.take() {
            nodes[parent.0].children.retain(|&c| c != node);
        }
    }

    /// Pre-order walk below `scope`, not entering shadow trees. Stops when
    /// `visit` returns true and yields that node.
    fn descendants(
        &self,
        scope: NodeId,
        visit: &mut impl FnMut(NodeId, &NodeData) -> bool,
    ) -> Option<NodeId> {
        let nodes = self.nodes.borrow();
        let mut stack: Vec<NodeId> = nodes[scope.0].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let data = &nodes[id.0];
            if visit(id, data) {
                return Some(id);
            }
            stack.extend(data.children.iter().rev().copied());
        }
        None
    }

    fn build(&self, node: &Node) -> Option<NodeId> {
        let kind = match node {
            Node::Element(el) => NodeKind::Element {
                tag: el.name.clone(),
                attributes: el.attributes.clone(),
            },
            Node::Text(text) => NodeKind::Text(text.clone()),
            Node::CData(data) => NodeKind::Text(format!("<![CDATA[{data}]]>")),
            Node::Comment(text) => NodeKind::Comment(text.clone()),
            Node::Declaration(_) | Node::ProcessingInstruction(_) | Node::DocType(_) => {
                return None
            }
        };
        let id = self.push(kind);

        if let Node::Element(el) = node {
            for child in &el.children {
                if let Some(child_id) = self.build(child) {
                    self.append_child(id, child_id);
                }
            }
        }
        Some(id)
    }

    fn serialize(&self, node: NodeId, out: &mut String) {
        let (kind_markup, children) = {
            let nodes = self.nodes.borrow();
            let data = &nodes[node.0];
            let markup = match &data.kind {
                NodeKind::Document | NodeKind::ShadowRoot { .. } => None,
                NodeKind::Element { tag, attributes } => {
                    let mut open = format!("<{tag}");
                    for (name, value) in attributes {
                        let quote = if value.contains('"') { '\'' } else { '"' };
                        open.push_str(&format!(" {name}={quote}{value}{quote}"));
                    }
                    open.push('>');
                    Some((open, format!("</{tag}>")))
                }
                NodeKind::Text(text) => Some((text.clone(), String::new())),
                NodeKind::Comment(text) => Some((format!("<!--{text}-->"), String::new())),
            };
            (markup, data.children.clone())
        };

        match kind_markup {
            Some((open, close)) => {
                out.push_str(&open);
                for child in children {
                    self.serialize(child, out);
                }
                out.push_str(&close);
            }
            None => {
                for child in children {
                    self.serialize(child, out);
                }
            }
        }
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDocument")
            .field("ready_state", &self.ready_state.get())
            .field("nodes", &self.nodes.borrow().len())
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

impl Document for MemoryDocument {
    type Node = NodeId;

    fn ready_state(&self) -> ReadyState {
        self.ready_state.get()
    }

    fn on_content_loaded(&self, callback: Box<dyn FnOnce(&Self)>) {
        if self.ready_state.get() == ReadyState::Loading {
            self.listeners.borrow_mut().push(callback);
        } else {
            callback(self);
        }
    }

    fn root(&self) -> NodeId {
        DOCUMENT
    }

    fn body(&self) -> Option<NodeId> {
        let html = self.query_selector(&DOCUMENT, "html")?;
        self.children(html)
            .into_iter()
            .find(|&c| self.tag_name(c).as_deref() == Some("body"))
    }

    fn query_selector(&self, scope: &NodeId, selector: &str) -> Option<NodeId> {
        let selector = SimpleSelector::parse(selector);
        self.descendants(*scope, &mut |_, data| selector.matches(&data.kind))
    }

    fn shadow_root(&self, host: &NodeId) -> Option<NodeId> {
        self.nodes.borrow()[host.0].shadow_root
    }

    fn get_element_by_id(&self, scope: &NodeId, id: &str) -> Option<NodeId> {
        self.descendants(*scope, &mut |_, data| match &data.kind {
            NodeKind::Element { attributes, .. } => {
                attributes.iter().any(|(k, v)| k == "id" && v == id)
            }
            _ => false,
        })
    }

    fn create_svg_element(&self, tag: &str) -> NodeId {
        self.create_element(tag)
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) {
        if let NodeKind::Element { attributes, .. } = &mut self.nodes.borrow_mut()[node.0].kind {
            match attributes.iter_mut().find(|(k, _)| k == name) {
                Some((_, existing)) => *existing = value.to_string(),
                None => attributes.push((name.to_string(), value.to_string())),
            }
        }
    }

    fn insert_first_child(&self, parent: &NodeId, child: &NodeId) {
        self.detach(*child);
        let mut nodes = self.nodes.borrow_mut();
        nodes[child.0].parent = Some(*parent);
        nodes[parent.0].children.insert(0, *child);
    }

    fn append_markup(&self, parent: &NodeId, markup: &str) -> Option<NodeId> {
        let fragment = match parse_fragment(markup) {
            Ok(nodes) => nodes,
            Err(err) => {
                tracing::warn!(error = %err, "could not parse symbol markup");
                return None;
            }
        };

        for node in &fragment {
            if let Some(id) = self.build(node) {
                self.append_child(*parent, id);
            }
        }
        self.nodes.borrow()[parent.0].children.last().copied()
    }

    fn remove(&self, node: &NodeId) {
        self.detach(*node);
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes.borrow()[node.0].parent
    }

    fn is_connected(&self, node: &NodeId) -> bool {
        let nodes = self.nodes.borrow();
        let mut current = *node;
        loop {
            let data = &nodes[current.0];
            current = match (&data.kind, data.parent) {
                (NodeKind::Document, _) => return true,
                (NodeKind::ShadowRoot { host }, _) => *host,
                (_, Some(parent)) => parent,
                (_, None) => return false,
            };
        }
    }
}

/// A single compound selector: optional tag, then `#id` and `.class` parts.
#[derive(Debug, Default, PartialEq)]
struct SimpleSelector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl SimpleSelector {
    fn parse(selector: &str) -> Self {
        let mut parsed = SimpleSelector::default();
        let selector = selector.trim();

        let tag_end = selector.find(['#', '.']).unwrap_or(selector.len());
        if tag_end > 0 && &selector[..tag_end] != "*" {
            parsed.tag = Some(selector[..tag_end].to_ascii_lowercase());
        }

        let mut rest = &selector[tag_end..];
        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(['#', '.']).unwrap_or(body.len());
            let name = body[..end].to_string();
            match marker {
                '#' => parsed.id = Some(name),
                _ => parsed.classes.push(name),
            }
            rest = &body[end..];
        }
        parsed
    }

    fn matches(&self, kind: &NodeKind) -> bool {
        let NodeKind::Element { tag, attributes } = kind else {
            return false;
        };
        let attr = |name: &str| {
            attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        };

        if let Some(expected) = &self.tag {
            if !tag.eq_ignore_ascii_case(expected) {
                return false;
            }
        }
        if let Some(expected) = &self.id {
            if attr("id") != Some(expected.as_str()) {
                return false;
            }
        }
        let class_list = attr("class").unwrap_or_default();
        self.classes
            .iter()
            .all(|class| class_list.split_whitespace().any(|c| c == class))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_document_has_body() {
        let doc = MemoryDocument::new();
        let body = doc.body().unwrap();

        assert_eq!(doc.tag_name(body).as_deref(), Some("body"));
        assert!(doc.is_connected(&body));
        assert_eq!(doc.ready_state(), ReadyState::Complete);
    }

    #[test]
    fn append_markup_returns_last_child() {
        let doc = MemoryDocument::new();
        let body = doc.body().unwrap();

        let node = doc
            .append_markup(&body, r#"<symbol id="a"><path d="M0 0"/></symbol>"#)
            .unwrap();

        assert_eq!(doc.attr(node, "id").as_deref(), Some("a"));
        assert_eq!(
            doc.inner_html(body),
            r#"<symbol id="a"><path d="M0 0"></path></symbol>"#
        );
    }

    #[test]
    fn append_markup_rejects_malformed_input() {
        let doc = MemoryDocument::new();
        let body = doc.body().unwrap();

        assert_eq!(doc.append_markup(&body, "<symbol>"), None);
        assert!(doc.children(body).is_empty());
    }

    #[test]
    fn selectors_match_tag_id_and_class() {
        let doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        doc.append_markup(&body, r#"<div id="app" class="shell main"><span class="main"/></div>"#);

        let root = doc.root();
        assert!(doc.query_selector(&root, "#app").is_some());
        assert!(doc.query_selector(&root, "div.shell").is_some());
        assert!(doc.query_selector(&root, "div.main.shell#app").is_some());
        assert!(doc.query_selector(&root, "span.shell").is_none());
        assert_eq!(doc.query_selector_all(root, ".main").len(), 2);
    }

    #[test]
    fn removed_nodes_are_disconnected() {
        let doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let div = doc.create_element("div");
        assert!(!doc.is_connected(&div));

        doc.append_child(body, div);
        assert!(doc.is_connected(&div));

        doc.remove(&div);
        assert!(!doc.is_connected(&div));
        assert_eq!(doc.parent(&div), None);
    }

    #[test]
    fn shadow_trees_are_separate_scopes() {
        let doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let host = doc.create_element("my-widget");
        doc.append_child(body, host);
        let shadow = doc.attach_shadow(host);
        doc.append_markup(&shadow, r#"<p id="inner"/>"#);

        assert_eq!(doc.shadow_root(&host), Some(shadow));
        assert!(doc.get_element_by_id(&doc.root(), "inner").is_none());
        let inner = doc.get_element_by_id(&shadow, "inner").unwrap();
        assert!(doc.is_connected(&inner));

        doc.remove(&host);
        assert!(!doc.is_connected(&inner));
    }

    #[test]
    fn content_loaded_listeners_fire_once_in_order() {
        let doc = MemoryDocument::loading();
        let log = std::rc::Rc::new(RefCell::new(Vec::new()));

        for n in 0..2 {
            let log = std::rc::Rc::clone(&log);
            doc.on_content_loaded(Box::new(move |_: &MemoryDocument| log.borrow_mut().push(n)));
        }
        assert!(log.borrow().is_empty());

        doc.finish_loading();
        doc.finish_loading();
        assert_eq!(*log.borrow(), vec![0, 1]);
        assert_eq!(doc.ready_state(), ReadyState::Interactive);
    }

    #[test]
    fn insert_first_child_prepends() {
        let doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        doc.append_markup(&body, "<main/>");
        let svg = doc.create_svg_element("svg");

        doc.insert_first_child(&body, &svg);

        assert_eq!(doc.children(body)[0], svg);
        assert_eq!(doc.inner_html(body), "<svg></svg><main></main>");
    }
}
