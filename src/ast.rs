//! Output tree handed to a rendering collaborator.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::expander::ExpandError;

/// Structural kind of an output element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tag {
    /// Block-level container (environments, headings, fractions).
    Block,
    /// Inline span.
    Inline,
    /// Link to a label.
    Anchor,
    /// Paragraph inside a paragraph environment.
    Paragraph,
    /// List container.
    List,
    /// One list entry.
    ListItem,
    Table,
    TableRow,
    TableCell,
    /// Horizontal rule, as between numerator and denominator.
    Rule,
    /// Forced line break.
    LineBreak,
    Subscript,
    Superscript,
    /// Inline annotation for a recoverable structural error.
    Error,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Block => "block",
            Self::Inline => "inline",
            Self::Anchor => "anchor",
            Self::Paragraph => "paragraph",
            Self::List => "list",
            Self::ListItem => "list-item",
            Self::Table => "table",
            Self::TableRow => "table-row",
            Self::TableCell => "table-cell",
            Self::Rule => "rule",
            Self::LineBreak => "line-break",
            Self::Subscript => "subscript",
            Self::Superscript => "superscript",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// A node of the output tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Element(Element),
    Text { content: String },
}

impl Node {
    /// Shorthand for a text node.
    #[must_use]
    pub fn text(content: &str) -> Self {
        Self::Text {
            content: content.to_string(),
        }
    }

    /// The element, if this node is one.
    #[must_use]
    pub const fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            Self::Text { .. } => None,
        }
    }

    /// The text, if this node is a text node.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { content } => Some(content),
            Self::Element(_) => None,
        }
    }
}

/// An element with a structural tag and a semantic class name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    pub tag: Tag,
    /// Environment or command name, used for styling.
    pub class: String,
    /// Identifier assigned by `\label`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Target of an anchor produced by `\ref`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    pub children: Vec<Node>,
}

impl Element {
    /// Append literal text, merging with a trailing text node.
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Node::Text { content }) = self.children.last_mut() {
            content.push_str(text);
        } else {
            self.children.push(Node::text(text));
        }
    }

    /// Append an element child.
    pub fn push_element(&mut self, el: Self) {
        self.children.push(Node::Element(el));
    }

    /// Returns `true` when the element holds nothing but spacing.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.children.iter().all(|child| match child {
            Node::Text { content } => content.trim().is_empty(),
            Node::Element(_) => false,
        })
    }

    /// Element children only.
    pub fn elements(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Depth-first search over descendants, `self` excluded.
    #[must_use]
    pub fn descendants(&self) -> Vec<&Self> {
        let mut out = Vec::new();
        collect_descendants(self, &mut out);
        out
    }

    /// Descendants carrying the given class name.
    #[must_use]
    pub fn find_class(&self, class: &str) -> Vec<&Self> {
        self.descendants()
            .into_iter()
            .filter(|el| el.class == class)
            .collect()
    }

    /// Descendants with the given structural tag.
    #[must_use]
    pub fn find_tag(&self, tag: Tag) -> Vec<&Self> {
        self.descendants()
            .into_iter()
            .filter(|el| el.tag == tag)
            .collect()
    }
}

fn collect_descendants<'a>(el: &'a Element, out: &mut Vec<&'a Element>) {
    for child in el.elements() {
        out.push(child);
        collect_descendants(child, out);
    }
}

/// Result of one full-document parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    /// The `root` paragraph environment.
    pub root: Element,
    /// Identifiers assigned by `\label`.
    pub labels: BTreeSet<String>,
    /// Structural errors, in document order. Each also appears inline.
    pub diagnostics: Vec<ExpandError>,
    /// Macro trace lines, when tracing is enabled.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<String>,
}

impl Document {
    /// Returns `true` if expansion reported no structural errors.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_text_merges() {
        let mut el = Element::inline("x");
        el.push_text("a");
        el.push_text("b");
        assert_eq!(el.children, vec![Node::text("ab")]);
    }

    #[test]
    fn push_text_after_element_starts_new_node() {
        let mut el = Element::inline("x");
        el.push_text("a");
        el.push_element(Element::inline("y"));
        el.push_text("b");
        assert_eq!(el.children.len(), 3);
    }

    #[test]
    fn blank_detection() {
        let mut el = Element::paragraph();
        el.push_text(" \n ");
        assert!(el.is_blank());
        el.push_element(Element::inline("label"));
        assert!(!el.is_blank());
    }

    #[test]
    fn find_class_walks_depth_first() {
        let tree = Element::block("root").with_child(
            Element::block("quote").with_child(Element::block("quote").with_text("deep")),
        );
        let quotes = tree.find_class("quote");
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[1].children, vec![Node::text("deep")]);
    }

    #[test]
    fn tag_display() {
        assert_eq!(Tag::ListItem.to_string(), "list-item");
    }
}
