use crate::ast::{Element, Tag};

impl Element {
    /// Create an empty element.
    #[must_use]
    pub fn new(tag: Tag, class: &str) -> Self {
        Self {
            tag,
            class: class.to_string(),
            id: None,
            href: None,
            children: Vec::new(),
        }
    }

    /// Block container named `class`.
    #[must_use]
    pub fn block(class: &str) -> Self {
        Self::new(Tag::Block, class)
    }

    /// Inline span named `class`.
    #[must_use]
    pub fn inline(class: &str) -> Self {
        Self::new(Tag::Inline, class)
    }

    /// Paragraph.
    #[must_use]
    pub fn paragraph() -> Self {
        Self::new(Tag::Paragraph, "paragraph")
    }

    /// Anchor pointing at `#target`.
    #[must_use]
    pub fn anchor(class: &str, target: &str) -> Self {
        let mut el = Self::new(Tag::Anchor, class);
        el.href = Some(format!("#{target}"));
        el
    }

    /// Table cell with a column alignment class.
    #[must_use]
    pub fn cell(align: &str) -> Self {
        Self::new(Tag::TableCell, align)
    }

    /// Line break.
    #[must_use]
    pub fn line_break() -> Self {
        Self::new(Tag::LineBreak, "br")
    }

    /// Inline error annotation carrying `message`.
    #[must_use]
    pub fn error(message: &str) -> Self {
        Self::new(Tag::Error, "error").with_text(message)
    }

    /// Set the identifier.
    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// Add a child element.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.push_element(child);
        self
    }

    /// Add text.
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.push_text(text);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node;

    #[test]
    fn anchor_has_fragment_href() {
        let a = Element::anchor("ref", "sec:intro").with_text("sec:intro");
        assert_eq!(a.tag, Tag::Anchor);
        assert_eq!(a.href.as_deref(), Some("#sec:intro"));
    }

    #[test]
    fn chained_text_is_merged() {
        let el = Element::inline("emph").with_text("a").with_text("b");
        assert_eq!(el.children, vec![Node::text("ab")]);
    }

    #[test]
    fn error_carries_message() {
        let el = Element::error("boom");
        assert_eq!(el.tag, Tag::Error);
        assert_eq!(el.children, vec![Node::text("boom")]);
    }

    #[test]
    fn label_with_id() {
        let el = Element::inline("label").with_id("eq:1");
        assert_eq!(el.id.as_deref(), Some("eq:1"));
    }
}
