//! SVG optimizer accepting an svgo-style plugin list.
//!
//! Only the subset of svgo plugins that matters for sprite symbols is
//! implemented. Configuration uses svgo's shape: each plugin is either a bare
//! name or `{ name, params }`.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::hash::content_hash;
use crate::xml::{Document, Element, Node, XmlError};

/// Passes run at most in multipass mode.
const MAX_PASSES: usize = 10;

/// User-facing optimizer configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizeConfig {
    /// Plugins run in order
    #[serde(default)]
    pub plugins: Vec<PluginEntry>,

    /// Repeat the pipeline until the output stops changing
    #[serde(default)]
    pub multipass: bool,
}

/// A plugin as written in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginEntry {
    /// `"removeComments"`
    Name(String),
    /// `{ name = "removeAttrs", params = { attrs = ["fill"] } }`
    Configured {
        name: String,
        #[serde(default)]
        params: Option<serde_json::Value>,
    },
}

impl PluginEntry {
    pub fn name(&self) -> &str {
        match self {
            PluginEntry::Name(name) => name,
            PluginEntry::Configured { name, .. } => name,
        }
    }

    fn params(&self) -> Option<&serde_json::Value> {
        match self {
            PluginEntry::Name(_) => None,
            PluginEntry::Configured { params, .. } => params.as_ref(),
        }
    }
}

/// Parameters of the id prefixing step.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefixIds {
    /// Prefix; defaults to the content hash of the document being optimized
    #[serde(default)]
    pub prefix: Option<String>,

    #[serde(default = "default_delim")]
    pub delim: String,

    /// Rewrite `id` attributes and references to them
    #[serde(default = "default_true")]
    pub prefix_ids: bool,

    /// Rewrite `class` attributes and class selectors in `<style>`
    #[serde(default = "default_true")]
    pub prefix_class_names: bool,
}

fn default_delim() -> String {
    "__".to_string()
}

fn default_true() -> bool {
    true
}

impl PrefixIds {
    /// Prefix ids and class names with a fixed prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            delim: default_delim(),
            prefix_ids: true,
            prefix_class_names: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RemoveAttrsParams {
    #[serde(default)]
    attrs: Vec<String>,
}

/// A resolved optimization step.
#[derive(Debug, Clone)]
pub enum Plugin {
    PrefixIds(PrefixIds),
    RemoveComments,
    RemoveMetadata,
    RemoveTitle,
    RemoveDesc,
    RemoveXmlProcInst,
    RemoveDoctype,
    RemoveDimensions,
    /// Remove attributes whose name fully matches any pattern
    RemoveAttrs(Vec<Regex>),
    CleanupAttrs,
}

impl Plugin {
    /// Resolve a configuration entry, rejecting unknown plugins.
    pub fn from_entry(entry: &PluginEntry) -> Result<Self, OptimizeError> {
        let name = entry.name();
        let plugin = match name {
            "prefixIds" => Plugin::PrefixIds(parse_params(name, entry.params())?),
            "removeComments" => Plugin::RemoveComments,
            "removeMetadata" => Plugin::RemoveMetadata,
            "removeTitle" => Plugin::RemoveTitle,
            "removeDesc" => Plugin::RemoveDesc,
            "removeXMLProcInst" => Plugin::RemoveXmlProcInst,
            "removeDoctype" => Plugin::RemoveDoctype,
            "removeDimensions" => Plugin::RemoveDimensions,
            "cleanupAttrs" => Plugin::CleanupAttrs,
            "removeAttrs" => {
                let params: RemoveAttrsParams = parse_params(name, entry.params())?;
                let patterns = params
                    .attrs
                    .iter()
                    .map(|pattern| {
                        Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
                            OptimizeError::InvalidParams {
                                plugin: name.to_string(),
                                message: e.to_string(),
                            }
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Plugin::RemoveAttrs(patterns)
            }
            other => return Err(OptimizeError::UnknownPlugin(other.to_string())),
        };
        Ok(plugin)
    }

    fn apply(&self, doc: &mut Document, source: &str) {
        match self {
            Plugin::PrefixIds(params) => {
                let prefix = params
                    .prefix
                    .clone()
                    .unwrap_or_else(|| content_hash(source));
                prefix_references(doc.root_mut(), &prefix, params);
            }
            Plugin::RemoveComments => {
                // Comments starting with `!` are legal notices and stay
                let mut keep = |node: &Node| !is_droppable_comment(node);
                doc.retain_prolog(&mut keep);
                doc.root_mut().retain_nodes(&mut keep);
            }
            Plugin::RemoveMetadata => remove_elements(doc.root_mut(), "metadata"),
            Plugin::RemoveTitle => remove_elements(doc.root_mut(), "title"),
            Plugin::RemoveDesc => remove_elements(doc.root_mut(), "desc"),
            Plugin::RemoveXmlProcInst => {
                doc.retain_prolog(|node| !matches!(node, Node::Declaration(_)))
            }
            Plugin::RemoveDoctype => doc.retain_prolog(|node| !matches!(node, Node::DocType(_))),
            Plugin::RemoveDimensions => remove_dimensions(doc.root_mut()),
            Plugin::RemoveAttrs(patterns) => doc.root_mut().walk_mut(&mut |el| {
                el.attributes
                    .retain(|(name, _)| !patterns.iter().any(|p| p.is_match(name)));
            }),
            Plugin::CleanupAttrs => doc.root_mut().walk_mut(&mut |el| {
                for (_, value) in &mut el.attributes {
                    *value = value.split_whitespace().collect::<Vec<_>>().join(" ");
                }
            }),
        }
    }
}

fn parse_params<T>(plugin: &str, params: Option<&serde_json::Value>) -> Result<T, OptimizeError>
where
    T: for<'de> Deserialize<'de>,
{
    let value = params
        .cloned()
        .unwrap_or_else(|| serde_json::Value::Object(Default::default()));

    serde_json::from_value(value).map_err(|e| OptimizeError::InvalidParams {
        plugin: plugin.to_string(),
        message: e.to_string(),
    })
}

/// Errors that can occur during optimization.
#[derive(Debug, thiserror::Error)]
pub enum OptimizeError {
    #[error(transparent)]
    Xml(#[from] XmlError),

    #[error("Unknown optimizer plugin: {0}")]
    UnknownPlugin(String),

    #[error("Invalid params for plugin {plugin}: {message}")]
    InvalidParams { plugin: String, message: String },
}

/// An ordered optimization pipeline.
#[derive(Debug, Clone, Default)]
pub struct Optimizer {
    plugins: Vec<Plugin>,
    multipass: bool,
}

impl Optimizer {
    /// Build from user configuration.
    pub fn from_config(config: &OptimizeConfig) -> Result<Self, OptimizeError> {
        let plugins = config
            .plugins
            .iter()
            .map(Plugin::from_entry)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            plugins,
            multipass: config.multipass,
        })
    }

    pub fn new(plugins: Vec<Plugin>, multipass: bool) -> Self {
        Self { plugins, multipass }
    }

    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    pub fn multipass(&self) -> bool {
        self.multipass
    }

    /// Run the pipeline over `source` and return the optimized markup.
    pub fn optimize(&self, source: &str) -> Result<String, OptimizeError> {
        let mut doc = Document::parse(source)?;
        let passes = if self.multipass { MAX_PASSES } else { 1 };
        let mut output = String::new();

        for pass in 0..passes {
            for plugin in &self.plugins {
                plugin.apply(&mut doc, source);
            }

            let markup = doc.to_markup();
            if markup == output {
                tracing::debug!("optimizer converged after {} passes", pass);
                break;
            }
            output = markup;
        }

        Ok(output)
    }
}

static URL_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*(['"]?)#([^)'"\s]+)(['"]?)\s*\)"#).expect("Invalid url reference regex")
});

static STYLE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([A-Za-z_][\w-]*)").expect("Invalid style id regex"));

static STYLE_CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.([A-Za-z_][\w-]*)").expect("Invalid style class regex"));

/// Prefix declared ids, references to them, and class names.
///
/// Only ids declared somewhere in the tree are rewritten, so references to
/// external documents or undeclared fragments are left alone. Values already
/// carrying the prefix are skipped, which keeps multipass runs stable.
pub(crate) fn prefix_references(root: &mut Element, prefix: &str, params: &PrefixIds) {
    let marker = format!("{prefix}{}", params.delim);
    let mut ids = HashSet::new();
    let mut classes = HashSet::new();

    root.walk(&mut |el| {
        if let Some(id) = el.attr("id") {
            ids.insert(id.to_string());
        }
        if let Some(class) = el.attr("class") {
            classes.extend(class.split_whitespace().map(str::to_string));
        }
    });

    let prefixed = |name: &str| -> String {
        if name.starts_with(&marker) {
            name.to_string()
        } else {
            format!("{marker}{name}")
        }
    };

    let rewrite_id_ref = |name: &str| -> Option<String> {
        (params.prefix_ids && ids.contains(name)).then(|| prefixed(name))
    };

    root.walk_mut(&mut |el| {
        for (name, value) in &mut el.attributes {
            match name.as_str() {
                "id" if params.prefix_ids => *value = prefixed(value.as_str()),
                "class" if params.prefix_class_names => {
                    *value = value
                        .split_whitespace()
                        .map(&prefixed)
                        .collect::<Vec<_>>()
                        .join(" ");
                }
                "href" | "xlink:href" => {
                    if let Some(target) = value.strip_prefix('#') {
                        if let Some(new) = rewrite_id_ref(target) {
                            *value = format!("#{new}");
                        }
                    }
                }
                _ => {
                    if value.contains("url(") {
                        *value = rewrite_urls(value, &rewrite_id_ref);
                    }
                }
            }
        }

        if el.local_name() == "style" {
            for child in &mut el.children {
                if let Node::Text(css) | Node::CData(css) = child {
                    let css_out = rewrite_urls(css, &rewrite_id_ref);
                    *css = rewrite_selectors(&css_out, |selector| {
                        let out = STYLE_ID_RE.replace_all(selector, |caps: &regex::Captures| {
                            match rewrite_id_ref(&caps[1]) {
                                Some(new) => format!("#{new}"),
                                None => caps[0].to_string(),
                            }
                        });
                        STYLE_CLASS_RE
                            .replace_all(&out, |caps: &regex::Captures| {
                                if params.prefix_class_names && classes.contains(&caps[1]) {
                                    format!(".{}", prefixed(&caps[1]))
                                } else {
                                    caps[0].to_string()
                                }
                            })
                            .into_owned()
                    });
                }
            }
        }
    });
}

/// Apply `rewrite` to rule preludes only, the text right before each `{`.
///
/// Declarations end in `;` or `}` and pass through untouched, so values such
/// as `fill:#abc` are never mistaken for id selectors.
fn rewrite_selectors(css: &str, rewrite: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(css.len());
    let mut start = 0;

    for (i, c) in css.char_indices() {
        if matches!(c, '{' | '}' | ';') {
            let segment = &css[start..i];
            if c == '{' {
                out.push_str(&rewrite(segment));
            } else {
                out.push_str(segment);
            }
            out.push(c);
            start = i + 1;
        }
    }
    out.push_str(&css[start..]);
    out
}

fn rewrite_urls(value: &str, rewrite: &impl Fn(&str) -> Option<String>) -> String {
    URL_REF_RE
        .replace_all(value, |caps: &regex::Captures| match rewrite(&caps[2]) {
            Some(new) => format!("url({}#{}{})", &caps[1], new, &caps[3]),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn is_droppable_comment(node: &Node) -> bool {
    matches!(node, Node::Comment(text) if !text.starts_with('!'))
}

fn remove_elements(root: &mut Element, local_name: &str) {
    root.retain_nodes(&mut |node| match node {
        Node::Element(el) => el.local_name() != local_name,
        _ => true,
    });
}

/// Drop width/height from the root, synthesizing a viewBox when possible.
fn remove_dimensions(root: &mut Element) {
    if root.attr("viewBox").is_none() {
        let width = root.attr("width").and_then(|w| w.parse::<f64>().ok());
        let height = root.attr("height").and_then(|h| h.parse::<f64>().ok());
        match (width, height) {
            (Some(w), Some(h)) => root.set_attr("viewBox", format!("0 0 {w} {h}")),
            // Without a viewBox the dimensions carry the only sizing information
            _ => return,
        }
    }
    root.remove_attr("width");
    root.remove_attr("height");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(plugins: Vec<Plugin>, source: &str) -> String {
        Optimizer::new(plugins, false).optimize(source).unwrap()
    }

    #[test]
    fn prefixes_ids_and_references() {
        let source = r##"<svg><defs><linearGradient id="g"/></defs><path id="p" fill="url(#g)"/><use href="#p"/><use xlink:href="#p"/></svg>"##;
        let output = run(vec![Plugin::PrefixIds(PrefixIds::with_prefix("abc"))], source);

        assert_eq!(
            output,
            r##"<svg><defs><linearGradient id="abc__g"/></defs><path id="abc__p" fill="url(#abc__g)"/><use href="#abc__p"/><use xlink:href="#abc__p"/></svg>"##
        );
    }

    #[test]
    fn leaves_undeclared_references_alone() {
        let source = r##"<svg><use href="#elsewhere"/><path fill="url(#missing)"/></svg>"##;
        let output = run(vec![Plugin::PrefixIds(PrefixIds::with_prefix("abc"))], source);

        assert_eq!(output, source);
    }

    #[test]
    fn prefixes_style_selectors() {
        let source = r##"<svg><style>.a{fill:#fff}#p{stroke:url(#g)}</style><g id="g"/><path id="p" class="a"/></svg>"##;
        let output = run(vec![Plugin::PrefixIds(PrefixIds::with_prefix("h"))], source);

        assert!(output.contains(".h__a{fill:#fff}"));
        assert!(output.contains("#h__p{stroke:url(#h__g)}"));
        assert!(output.contains(r#"class="h__a""#));
    }

    #[test]
    fn declaration_values_are_not_selectors() {
        let source = r##"<svg><style>.x{fill:#abc;stroke:#abc}@media print{#abc{fill:#abc}}</style><path id="abc" class="x"/></svg>"##;
        let output = run(vec![Plugin::PrefixIds(PrefixIds::with_prefix("h"))], source);

        assert!(output.contains(".h__x{fill:#abc;stroke:#abc}"));
        assert!(output.contains("@media print{#h__abc{fill:#abc}}"));
        assert!(output.contains(r#"id="h__abc""#));
    }

    #[test]
    fn multipass_does_not_double_prefix() {
        let source = r##"<svg><path id="p"/><use href="#p"/></svg>"##;
        let optimizer = Optimizer::new(vec![Plugin::PrefixIds(PrefixIds::with_prefix("x"))], true);
        let output = optimizer.optimize(source).unwrap();

        assert_eq!(output, r##"<svg><path id="x__p"/><use href="#x__p"/></svg>"##);
    }

    #[test]
    fn default_prefix_is_content_hash() {
        let source = r#"<svg><path id="p"/></svg>"#;
        let params = PrefixIds {
            prefix: None,
            ..PrefixIds::with_prefix("")
        };
        let output = run(vec![Plugin::PrefixIds(params)], source);

        assert!(output.contains(&format!(r#"id="{}__p""#, content_hash(source))));
    }

    #[test]
    fn removes_comments_metadata_and_prolog() {
        let source = r#"<?xml version="1.0"?><!DOCTYPE svg><!-- drop --><svg><!--! keep --><metadata>m</metadata><title>t</title><desc>d</desc><path/></svg>"#;
        let output = run(
            vec![
                Plugin::RemoveXmlProcInst,
                Plugin::RemoveDoctype,
                Plugin::RemoveComments,
                Plugin::RemoveMetadata,
                Plugin::RemoveTitle,
                Plugin::RemoveDesc,
            ],
            source,
        );

        assert_eq!(output, "<svg><!--! keep --><path/></svg>");
    }

    #[test]
    fn remove_dimensions_synthesizes_view_box() {
        let output = run(
            vec![Plugin::RemoveDimensions],
            r#"<svg width="24" height="16"><path/></svg>"#,
        );
        assert_eq!(output, r#"<svg viewBox="0 0 24 16"><path/></svg>"#);

        let output = run(
            vec![Plugin::RemoveDimensions],
            r#"<svg width="1em" height="1em"><path/></svg>"#,
        );
        assert_eq!(output, r#"<svg width="1em" height="1em"><path/></svg>"#);
    }

    #[test]
    fn resolves_configured_plugins() {
        let config: OptimizeConfig = serde_json::from_str(
            r#"{ "plugins": ["removeComments", { "name": "removeAttrs", "params": { "attrs": ["fill", "data-.*"] } }] }"#,
        )
        .unwrap();

        let optimizer = Optimizer::from_config(&config).unwrap();
        assert_eq!(optimizer.plugins().len(), 2);

        let output = optimizer
            .optimize(r#"<svg fill="red"><path data-name="x" d="M0 0" fill="blue"/></svg>"#)
            .unwrap();
        assert_eq!(output, r#"<svg><path d="M0 0"/></svg>"#);
    }

    #[test]
    fn rejects_unknown_plugins() {
        let config = OptimizeConfig {
            plugins: vec![PluginEntry::Name("convertShapeToPath".to_string())],
            multipass: false,
        };

        assert!(matches!(
            Optimizer::from_config(&config),
            Err(OptimizeError::UnknownPlugin(name)) if name == "convertShapeToPath"
        ));
    }

    #[test]
    fn cleans_up_attribute_whitespace() {
        let output = run(
            vec![Plugin::CleanupAttrs],
            "<svg><path d=\"M0 0\n   L1 1 \"/></svg>",
        );
        assert_eq!(output, r#"<svg><path d="M0 0 L1 1"/></svg>"#);
    }
}
