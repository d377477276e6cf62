//! Minimal XML tree for SVG documents and fragments.
//!
//! Text and attribute values are kept exactly as they appear in the source
//! (still escaped), so a parse/serialize cycle never changes entity encoding.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// A node in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Raw (escaped) character data
    Text(String),
    CData(String),
    Comment(String),
    /// `<?xml ...?>` declaration content
    Declaration(String),
    ProcessingInstruction(String),
    DocType(String),
}

impl Node {
    /// Serialize this node as markup.
    pub fn write_to(&self, out: &mut String) {
        match self {
            Node::Element(el) => el.write_to(out),
            Node::Text(text) => out.push_str(text),
            Node::CData(data) => {
                out.push_str("<![CDATA[");
                out.push_str(data);
                out.push_str("]]>");
            }
            Node::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            Node::Declaration(decl) => {
                out.push_str("<?");
                out.push_str(decl);
                out.push_str("?>");
            }
            Node::ProcessingInstruction(pi) => {
                out.push_str("<?");
                out.push_str(pi);
                out.push_str("?>");
            }
            Node::DocType(doctype) => {
                out.push_str("<!DOCTYPE ");
                out.push_str(doctype);
                out.push('>');
            }
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }
}

/// An element with ordered attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Qualified name (e.g. "svg", "xlink:href" style prefixes preserved)
    pub name: String,

    /// Attributes in source order, values raw
    pub attributes: Vec<(String, String)>,

    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Name without namespace prefix.
    pub fn local_name(&self) -> &str {
        self.name
            .rsplit_once(':')
            .map(|(_, local)| local)
            .unwrap_or(&self.name)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(k, _)| k == name)?;
        Some(self.attributes.remove(index).1)
    }

    /// Child elements, skipping text and comments.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Visit this element and every descendant element, parents first.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        f(self);
        for child in &mut self.children {
            if let Node::Element(el) = child {
                el.walk_mut(f);
            }
        }
    }

    /// Visit this element and every descendant element, parents first.
    pub fn walk(&self, f: &mut impl FnMut(&Element)) {
        f(self);
        for el in self.child_elements() {
            el.walk(f);
        }
    }

    /// Drop child nodes (recursively) for which `keep` returns false.
    pub fn retain_nodes(&mut self, keep: &mut impl FnMut(&Node) -> bool) {
        self.children.retain(|node| keep(node));
        for child in &mut self.children {
            if let Node::Element(el) = child {
                el.retain_nodes(keep);
            }
        }
    }

    pub fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            // Raw values may carry a literal double quote when the source used single quotes
            let quote = if value.contains('"') { '\'' } else { '"' };
            out.push('=');
            out.push(quote);
            out.push_str(value);
            out.push(quote);
        }

        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        for child in &self.children {
            child.write_to(out);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }

    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }
}

/// A parsed document: top-level nodes with exactly one root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Parse a complete document.
    pub fn parse(source: &str) -> Result<Self, XmlError> {
        let nodes = parse_fragment(source)?;

        match nodes.iter().filter(|n| matches!(n, Node::Element(_))).count() {
            0 => Err(XmlError::MissingRoot),
            1 => Ok(Self { nodes }),
            _ => Err(XmlError::MultipleRoots),
        }
    }

    /// Top-level nodes, root element included.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Drop top-level non-element nodes (declarations, comments, doctypes).
    /// The root element is always kept.
    pub fn retain_prolog(&mut self, mut keep: impl FnMut(&Node) -> bool) {
        self.nodes
            .retain(|node| matches!(node, Node::Element(_)) || keep(node));
    }

    pub fn root(&self) -> &Element {
        self.nodes
            .iter()
            .find_map(Node::as_element)
            .expect("document always has a root element")
    }

    pub fn root_mut(&mut self) -> &mut Element {
        self.nodes
            .iter_mut()
            .find_map(|n| match n {
                Node::Element(el) => Some(el),
                _ => None,
            })
            .expect("document always has a root element")
    }

    pub fn into_root(self) -> Element {
        self.nodes
            .into_iter()
            .find_map(|n| match n {
                Node::Element(el) => Some(el),
                _ => None,
            })
            .expect("document always has a root element")
    }

    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.write_to(&mut out);
        }
        out
    }
}

/// Errors that can occur while parsing XML.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error("XML syntax error at byte {position}: {message}")]
    Syntax { position: u64, message: String },

    #[error("Invalid attribute: {0}")]
    Attribute(String),

    #[error("Unclosed element <{0}>")]
    Unclosed(String),

    #[error("Closing tag without matching opening tag")]
    UnexpectedEnd,

    #[error("Document has no root element")]
    MissingRoot,

    #[error("Document has more than one root element")]
    MultipleRoots,

    #[error("Input is not valid UTF-8")]
    Encoding,
}

/// Parse markup into a list of top-level nodes.
///
/// Accepts fragments with several sibling elements, as produced by serialized
/// `<symbol>` markup.
pub fn parse_fragment(source: &str) -> Result<Vec<Node>, XmlError> {
    let mut reader = Reader::from_str(source);
    let mut stack: Vec<Element> = Vec::new();
    let mut top: Vec<Node> = Vec::new();

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(XmlError::Syntax {
                    position: reader.error_position() as u64,
                    message: e.to_string(),
                })
            }
        };

        match event {
            Event::Start(start) => stack.push(element_from(&start)?),
            Event::Empty(start) => {
                let el = element_from(&start)?;
                push_node(&mut stack, &mut top, Node::Element(el));
            }
            Event::End(_) => {
                let el = stack.pop().ok_or(XmlError::UnexpectedEnd)?;
                push_node(&mut stack, &mut top, Node::Element(el));
            }
            Event::Text(text) => push_text(&mut stack, &mut top, utf8(&text)?),
            Event::GeneralRef(entity) => {
                let entity = format!("&{};", utf8(&entity)?);
                push_text(&mut stack, &mut top, &entity);
            }
            Event::CData(data) => {
                push_node(&mut stack, &mut top, Node::CData(utf8(&data)?.to_string()))
            }
            Event::Comment(text) => {
                push_node(&mut stack, &mut top, Node::Comment(utf8(&text)?.to_string()))
            }
            Event::Decl(decl) => push_node(
                &mut stack,
                &mut top,
                Node::Declaration(utf8(&decl)?.to_string()),
            ),
            Event::PI(pi) => push_node(
                &mut stack,
                &mut top,
                Node::ProcessingInstruction(utf8(&pi)?.to_string()),
            ),
            Event::DocType(doctype) => push_node(
                &mut stack,
                &mut top,
                Node::DocType(utf8(&doctype)?.trim().to_string()),
            ),
            Event::Eof => break,
        }
    }

    if let Some(open) = stack.last() {
        return Err(XmlError::Unclosed(open.name.clone()));
    }

    Ok(top)
}

fn element_from(start: &BytesStart<'_>) -> Result<Element, XmlError> {
    let mut el = Element::new(utf8(start.name().as_ref())?);

    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::Attribute(e.to_string()))?;
        let key = utf8(attr.key.as_ref())?.to_string();
        let value = utf8(&attr.value)?.to_string();
        el.attributes.push((key, value));
    }

    Ok(el)
}

fn push_node(stack: &mut [Element], top: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => top.push(node),
    }
}

/// Append text, merging with a preceding text node so entity references stay inline.
fn push_text(stack: &mut [Element], top: &mut Vec<Node>, text: &str) {
    let siblings = match stack.last_mut() {
        Some(parent) => &mut parent.children,
        None => top,
    };

    match siblings.last_mut() {
        Some(Node::Text(existing)) => existing.push_str(text),
        _ => siblings.push(Node::Text(text.to_string())),
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, XmlError> {
    std::str::from_utf8(bytes).map_err(|_| XmlError::Encoding)
}

/// Escape a value for use inside a double-quoted attribute.
pub fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;")
}
