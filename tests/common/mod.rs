#![allow(dead_code)]

use draftex::{Document, Element, Node, Options, Tag, parse_str, parse_with};

pub fn parse(input: &str) -> Document {
    parse_str(input).unwrap_or_else(|e| panic!("failed to parse: {e}\n--- input ---\n{input}"))
}

pub fn parse_opts(input: &str, options: &Options) -> Document {
    parse_with(input, options)
        .unwrap_or_else(|e| panic!("failed to parse: {e}\n--- input ---\n{input}"))
}

/// Direct text children of `el`, concatenated.
pub fn own_text(el: &Element) -> String {
    el.children.iter().filter_map(Node::as_text).collect()
}

/// Top-level paragraphs of the document.
pub fn paragraphs(doc: &Document) -> Vec<&Element> {
    doc.root
        .elements()
        .filter(|el| el.tag == Tag::Paragraph)
        .collect()
}

/// Class names of the element children of `el`.
pub fn classes(el: &Element) -> Vec<&str> {
    el.elements().map(|child| child.class.as_str()).collect()
}

/// Rendered messages of every structural error.
pub fn messages(doc: &Document) -> Vec<String> {
    doc.diagnostics.iter().map(ToString::to_string).collect()
}

/// Assert that expansion reported nothing.
pub fn assert_clean(doc: &Document) {
    assert!(
        doc.is_clean(),
        "unexpected diagnostics: {:?}",
        messages(doc)
    );
}
