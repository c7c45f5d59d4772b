//! Math mode: toggles, scripts, delimiters and letter styles.

mod common;

use common::{assert_clean, own_text, paragraphs, parse};
use draftex::{ExpandErrorKind, Tag, text_content};

#[test]
fn inline_math_span() {
    let doc = parse("where $x$ holds");
    assert_clean(&doc);
    let math = doc.root.find_class("short-math");
    assert_eq!(math.len(), 1);
    assert_eq!(own_text(math[0]), "x");
}

#[test]
fn display_math_block() {
    let doc = parse(r"\[ a+b \]");
    assert_clean(&doc);
    let math = doc.root.find_class("short-displaymath")[0];
    assert_eq!(math.tag, Tag::Block);
    assert_eq!(own_text(math).trim(), "a+b");
}

#[test]
fn unterminated_inline_math() {
    let doc = parse("$x");
    assert_eq!(
        doc.diagnostics[0].kind,
        ExpandErrorKind::UnterminatedMath {
            delimiter: "$".to_string()
        }
    );
}

#[test]
fn stray_display_end() {
    let doc = parse(r"text \]");
    assert_eq!(
        doc.diagnostics[0].kind,
        ExpandErrorKind::UnmatchedDisplayMathEnd
    );
}

#[test]
fn superscript_single_character() {
    let doc = parse("$x^23$");
    assert_clean(&doc);
    let sup = doc.root.find_tag(Tag::Superscript)[0];
    assert_eq!(own_text(sup), "2");
    let math = doc.root.find_class("short-math")[0];
    assert_eq!(math.children.len(), 3);
}

#[test]
fn subscript_group_is_unwrapped() {
    let doc = parse("$a_{ij}$");
    let sub = doc.root.find_tag(Tag::Subscript)[0];
    assert_eq!(own_text(sub), "ij");
    assert!(sub.find_class("curly").is_empty());
}

#[test]
fn superscript_command_is_dispatched_into_node() {
    let doc = parse(r"$e^\pi$");
    let sup = doc.root.find_tag(Tag::Superscript)[0];
    assert_eq!(own_text(sup), "\u{3c0}");
}

#[test]
fn script_outside_math() {
    let doc = parse("x^2");
    assert_eq!(
        doc.diagnostics[0].kind,
        ExpandErrorKind::OutsideMathMode {
            what: "superscript".to_string()
        }
    );
}

#[test]
fn script_without_argument() {
    let doc = parse("$x^$");
    assert_eq!(
        doc.diagnostics[0].kind,
        ExpandErrorKind::MissingArgument {
            command: "^".to_string()
        }
    );
}

#[test]
fn math_environment_sets_math_mode() {
    let doc = parse(r"\begin{equation}x_1\end{equation}");
    assert_clean(&doc);
    assert_eq!(doc.root.find_tag(Tag::Subscript).len(), 1);
}

#[test]
fn cases_inside_display_math() {
    let doc = parse(r"\[ f = \begin{cases}0 & x<0\\1 & x \geq 0\end{cases} \]");
    assert_clean(&doc);
    let table = doc.root.find_tag(Tag::Table)[0];
    assert_eq!(table.class, "cases");
    assert_eq!(table.elements().count(), 2);
}

#[test]
fn left_right_span() {
    let doc = parse(r"$\left( a \right)$");
    assert_clean(&doc);
    let span = doc.root.find_class("mathspan")[0];
    assert_eq!(own_text(span), "( a ");
    let math = doc.root.find_class("short-math")[0];
    assert_eq!(math.children.last().and_then(|n| n.as_text()), Some(")"));
}

#[test]
fn left_outside_math() {
    let doc = parse(r"\left(");
    assert_eq!(
        doc.diagnostics[0].kind,
        ExpandErrorKind::OutsideMathMode {
            what: r"\left".to_string()
        }
    );
}

#[test]
fn left_without_right() {
    let doc = parse(r"$\left( a$");
    assert_eq!(doc.diagnostics[0].kind, ExpandErrorKind::UnclosedLeft);
}

#[test]
fn fraction_in_display_math() {
    let doc = parse(r"\[\frac{a}{b}\]");
    assert_clean(&doc);
    let frac = doc.root.find_class("frac")[0];
    assert_eq!(own_text(frac.find_class("numerator")[0]), "a");
    assert_eq!(own_text(frac.find_class("denominator")[0]), "b");
    assert_eq!(frac.find_tag(Tag::Rule).len(), 1);
}

#[test]
fn blackboard_and_calligraphic() {
    let doc = parse(r"$\mathbb{NZ} \mathcal{L}$");
    assert_eq!(
        own_text(doc.root.find_class("mathbb")[0]),
        "\u{2115}\u{2124}"
    );
    assert_eq!(own_text(doc.root.find_class("mathcal")[0]), "\u{2112}");
}

#[test]
fn display_end_closes_through_open_left() {
    let doc = parse("\\[\\left( a\\]\n\nafter text");
    assert_eq!(doc.diagnostics.len(), 1);
    assert_eq!(doc.diagnostics[0].kind, ExpandErrorKind::UnclosedLeft);

    let math = doc.root.find_class("short-displaymath")[0];
    assert!(!text_content(math).contains("after"));
    let paragraphs = paragraphs(&doc);
    assert_eq!(paragraphs.len(), 2);
    assert_eq!(own_text(paragraphs[1]).trim(), "after text");
}

#[test]
fn right_does_not_cross_a_group() {
    let doc = parse(r"$\left( {a \right)}$ b");
    let kinds: Vec<_> = doc.diagnostics.iter().map(|d| d.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![ExpandErrorKind::UnmatchedRight, ExpandErrorKind::UnclosedLeft]
    );
    assert_eq!(doc.root.find_class("short-math").len(), 1);
    assert_eq!(own_text(paragraphs(&doc)[0]), " b");
}
