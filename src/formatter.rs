//! Serializes an output tree to HTML or plain text.

use crate::ast::{Document, Element, Node, Tag};

/// Render a document as an HTML fragment rooted at `<div class="root">`.
///
/// Every element carries its class; labels carry their `id` and
/// references an `href`. Text is escaped.
#[must_use]
pub fn to_html(document: &Document) -> String {
    let mut out = String::new();
    format_element(&mut out, &document.root);
    out.push('\n');
    out
}

/// HTML element name for a structural tag.
#[must_use]
pub const fn html_name(tag: Tag) -> &'static str {
    match tag {
        Tag::Block => "div",
        Tag::Inline | Tag::Error => "span",
        Tag::Anchor => "a",
        Tag::Paragraph => "p",
        Tag::List => "ul",
        Tag::ListItem => "li",
        Tag::Table => "table",
        Tag::TableRow => "tr",
        Tag::TableCell => "td",
        Tag::Rule => "hr",
        Tag::LineBreak => "br",
        Tag::Subscript => "sub",
        Tag::Superscript => "sup",
    }
}

const fn is_void(tag: Tag) -> bool {
    matches!(tag, Tag::Rule | Tag::LineBreak)
}

fn format_element(out: &mut String, el: &Element) {
    let name = html_name(el.tag);
    out.push('<');
    out.push_str(name);
    push_attribute(out, "class", &el.class);
    if let Some(id) = &el.id {
        push_attribute(out, "id", id);
    }
    if let Some(href) = &el.href {
        push_attribute(out, "href", href);
    }
    out.push('>');

    if is_void(el.tag) {
        return;
    }

    for child in &el.children {
        match child {
            Node::Element(inner) => format_element(out, inner),
            Node::Text { content } => escape_into(out, content),
        }
    }

    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn push_attribute(out: &mut String, key: &str, value: &str) {
    out.push(' ');
    out.push_str(key);
    out.push_str("=\"");
    escape_into(out, value);
    out.push('"');
}

fn escape_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

/// Literal text of a subtree.
///
/// Paragraphs are separated by a blank line. Error annotations and kept
/// comments are not part of the text.
#[must_use]
pub fn text_content(el: &Element) -> String {
    let mut out = String::new();
    collect_text(&mut out, el);
    out
}

fn collect_text(out: &mut String, el: &Element) {
    for child in &el.children {
        match child {
            Node::Text { content } => out.push_str(content),
            Node::Element(inner) => match inner.tag {
                Tag::Error => {}
                Tag::Inline if inner.class == "comment" => {}
                Tag::Paragraph => {
                    if !out.is_empty() {
                        out.push_str("\n\n");
                    }
                    collect_text(out, inner);
                }
                _ => collect_text(out, inner),
            },
        }
    }
}
