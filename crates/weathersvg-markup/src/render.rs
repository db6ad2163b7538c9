//! Single-pass serialization of a node tree to SVG/HTML text.

use crate::escape::{escape_comment, escape_html, escape_text};
use crate::node::{Child, Element, Node, PropValue, Tag};

/// Pseudo-tag for a literal `<!-- … -->`. Its `content` attribute is the
/// comment body; children are ignored.
pub const COMMENT_TAG: &str = "htmlComment";

/// Elements whose text content is laid out verbatim. Inside them no
/// structural newlines are added and text newlines are kept as-is.
pub const WHITESPACE_SENSITIVE_TAGS: [&str; 5] = ["text", "tspan", "textPath", "title", "desc"];

/// Attribute names used only while building the tree.
const RESERVED_ATTRS: [&str; 2] = ["key", "ref"];

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Invalid tag name: {0:?}")]
    InvalidTagName(String),
    #[error("Comment without content")]
    MissingCommentContent,
}

/// How malformed trees are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Malformed subtrees render as nothing.
    #[default]
    Lenient,
    /// Malformed subtrees abort the render with a [`RenderError`].
    Strict,
}

/// Whether the text is a valid tag or attribute name (`^[a-z][a-z0-9-]*$`,
/// case-insensitive).
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Whitespace {
    Formatted,
    Preserved,
}

/// Serializer. Holds no state between calls, so one instance may be shared
/// by any number of concurrent renders.
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    mode: RenderMode,
}

impl Renderer {
    pub fn new(mode: RenderMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Serialize `node`.
    ///
    /// # Errors
    ///
    /// Only in [`RenderMode::Strict`], on an invalid tag name or a comment
    /// without content.
    pub fn render(&self, node: &Node) -> Result<String, RenderError> {
        self.render_node(node, Whitespace::Formatted)
    }

    /// Report a malformed subtree: an error in strict mode, nothing otherwise.
    fn reject(&self, error: RenderError) -> Result<String, RenderError> {
        match self.mode {
            RenderMode::Strict => Err(error),
            RenderMode::Lenient => {
                tracing::debug!("Skipping malformed markup: {}", error);
                Ok(String::new())
            }
        }
    }

    fn render_node(&self, node: &Node, ws: Whitespace) -> Result<String, RenderError> {
        match node {
            Node::Element(element) => self.render_element(element, ws),
            Node::Fragment(fragment) => {
                let rendered = self.render_children(fragment.children(), ws)?;
                Ok(match ws {
                    Whitespace::Formatted => rendered.trim().to_string(),
                    Whitespace::Preserved => rendered,
                })
            }
        }
    }

    fn render_element(&self, element: &Element, ws: Whitespace) -> Result<String, RenderError> {
        let name = match element.tag() {
            Tag::Name(name) => name,
            Tag::Component(component) => {
                return self.render_node(&(component.as_ref())(element.props()), ws);
            }
        };

        if !is_valid_name(name) {
            return self.reject(RenderError::InvalidTagName(name.clone()));
        }

        if name == COMMENT_TAG {
            return match element.attrs().get("content").and_then(PropValue::printable) {
                Some(content) => Ok(format!("<!--{}-->", escape_comment(&content))),
                None => self.reject(RenderError::MissingCommentContent).map(|_| "<!---->".to_string()),
            };
        }

        let mut out = format!("<{}", name);
        for (key, value) in element.attrs().iter() {
            if RESERVED_ATTRS.contains(&key) || !is_valid_name(key) {
                continue;
            }
            if let Some(text) = value.printable() {
                out.push_str(&format!(" {}=\"{}\"", key, escape_html(&text)));
            }
        }

        if !element.children().iter().any(Child::is_renderable) {
            out.push_str(" />");
            return Ok(out);
        }

        let ws = if WHITESPACE_SENSITIVE_TAGS.contains(&name.as_str()) {
            Whitespace::Preserved
        } else {
            ws
        };
        out.push('>');
        out.push_str(&self.render_children(element.children(), ws)?);
        out.push_str(&format!("</{}>", name));
        Ok(out)
    }

    fn render_children(&self, children: &[Child], ws: Whitespace) -> Result<String, RenderError> {
        let mut out = String::new();
        for child in children {
            let part = self.render_child(child, ws)?;
            out.push_str(&part);
            if ws == Whitespace::Formatted && part.ends_with('>') {
                out.push('\n');
            }
        }

        if ws == Whitespace::Formatted && out.contains('\n') {
            Ok(format!("\n{}\n", out.trim_end()))
        } else {
            Ok(out)
        }
    }

    fn render_child(&self, child: &Child, ws: Whitespace) -> Result<String, RenderError> {
        match child {
            Child::Node(node) => self.render_node(node, ws),
            Child::Value(value) => Ok(value
                .printable()
                .map(|text| match ws {
                    Whitespace::Formatted => escape_html(&text),
                    Whitespace::Preserved => escape_text(&text),
                })
                .unwrap_or_default()),
        }
    }
}

/// Serialize `node` leniently. Never fails; malformed subtrees are dropped.
pub fn render(node: &Node) -> String {
    Renderer::new(RenderMode::Lenient)
        .render(node)
        .unwrap_or_default()
}
