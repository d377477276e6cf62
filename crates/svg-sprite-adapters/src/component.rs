//! Render model for sprite icons.

use std::cell::RefCell;
use std::fmt;

use crate::traits::Mount;

/// A rendered element tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgElement {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<SvgElement>,
}

impl SvgElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute; later values override earlier ones, like an object spread.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self
                .attributes
                .push((name.to_string(), value.to_string())),
        }
    }

    /// Serialize as HTML/SVG markup.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            out.push_str(&format!(r#" {}="{}""#, name, html_escape(value)));
        }
        out.push('>');
        for child in &self.children {
            child.write_to(out);
        }
        out.push_str(&format!("</{}>", self.tag));
    }
}

/// A framework icon bound to one sprite symbol.
///
/// Rendering always calls `mount` first so the symbol is present before the
/// `<use>` reference resolves. Memoized components reuse the previous tree
/// when props are unchanged.
pub struct IconComponent {
    symbol_id: String,
    display_name: String,
    mount: Mount,
    href_attr: &'static str,
    memo: Option<RefCell<Option<(Vec<(String, String)>, SvgElement)>>>,
}

impl IconComponent {
    pub(crate) fn new(
        symbol_id: &str,
        display_name: &str,
        mount: Mount,
        href_attr: &'static str,
        memoized: bool,
    ) -> Self {
        Self {
            symbol_id: symbol_id.to_string(),
            display_name: format!("Icon{display_name}"),
            mount,
            href_attr,
            memo: memoized.then(|| RefCell::new(None)),
        }
    }

    /// Debug name, `Icon` + the module's display name.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn symbol_id(&self) -> &str {
        &self.symbol_id
    }

    pub fn is_memoized(&self) -> bool {
        self.memo.is_some()
    }

    /// Render with caller attributes spread over the `1em` defaults.
    pub fn render(&self, props: &[(&str, &str)]) -> SvgElement {
        (self.mount)();

        let key: Vec<(String, String)> = props
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        if let Some(memo) = &self.memo {
            if let Some((cached_props, tree)) = memo.borrow().as_ref() {
                if *cached_props == key {
                    return tree.clone();
                }
            }
        }

        let tree = self.build_tree(props);

        if let Some(memo) = &self.memo {
            *memo.borrow_mut() = Some((key, tree.clone()));
        }

        tree
    }

    fn build_tree(&self, props: &[(&str, &str)]) -> SvgElement {
        let mut svg = SvgElement::new("svg");
        svg.set_attr("width", "1em");
        svg.set_attr("height", "1em");
        for (name, value) in props {
            svg.set_attr(name, value);
        }

        let mut use_el = SvgElement::new("use");
        use_el.set_attr(self.href_attr, &format!("#{}", self.symbol_id));
        svg.children.push(use_el);

        svg
    }
}

impl fmt::Debug for IconComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IconComponent")
            .field("symbol_id", &self.symbol_id)
            .field("display_name", &self.display_name)
            .field("href_attr", &self.href_attr)
            .field("memoized", &self.is_memoized())
            .finish()
    }
}

/// Escape HTML special characters in attribute values.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting_mount() -> (Mount, Rc<Cell<usize>>) {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        (Rc::new(move || counter.set(counter.get() + 1)), count)
    }

    #[test]
    fn renders_sized_use_reference() {
        let (mount, _) = counting_mount();
        let icon = IconComponent::new("icon-home", "Home", mount, "href", false);

        assert_eq!(
            icon.render(&[]).to_markup(),
            r##"<svg width="1em" height="1em"><use href="#icon-home"></use></svg>"##
        );
    }

    #[test]
    fn props_override_defaults() {
        let (mount, _) = counting_mount();
        let icon = IconComponent::new("icon-home", "Home", mount, "href", false);
        let tree = icon.render(&[("width", "2em"), ("class", "big")]);

        assert_eq!(tree.attr("width"), Some("2em"));
        assert_eq!(tree.attr("height"), Some("1em"));
        assert_eq!(tree.attr("class"), Some("big"));
    }

    #[test]
    fn mounts_on_every_render() {
        let (mount, count) = counting_mount();
        let icon = IconComponent::new("icon-home", "Home", mount, "href", true);

        icon.render(&[]);
        icon.render(&[]);
        icon.render(&[("class", "x")]);

        assert_eq!(count.get(), 3);
    }

    #[test]
    fn memoized_render_reuses_tree_for_equal_props() {
        let (mount, _) = counting_mount();
        let icon = IconComponent::new("icon-home", "Home", mount, "xlink:href", true);

        let first = icon.render(&[("class", "a")]);
        let second = icon.render(&[("class", "a")]);
        let third = icon.render(&[("class", "b")]);

        assert_eq!(first, second);
        assert_ne!(first, third);
    }

    #[test]
    fn display_name_is_prefixed() {
        let (mount, _) = counting_mount();
        let icon = IconComponent::new("icon-arrow-left", "ArrowLeft", mount, "href", false);

        assert_eq!(icon.display_name(), "IconArrowLeft");
        assert_eq!(icon.symbol_id(), "icon-arrow-left");
    }

    #[test]
    fn escapes_attribute_values() {
        let mut el = SvgElement::new("svg");
        el.set_attr("aria-label", r#"a "quoted" <label>"#);

        assert_eq!(
            el.to_markup(),
            r#"<svg aria-label="a &quot;quoted&quot; &lt;label&gt;"></svg>"#
        );
    }
}
