//! Top-level entry points and options.

mod common;

use common::{own_text, paragraphs, parse, parse_opts};
use draftex::{
    Element, Error, ExpandErrorKind, Expander, Options, Signal, Tag, Tokens, expand, parse_with,
    tokenize,
};
use rstest::rstest;

#[test]
fn strict_mode_turns_first_diagnostic_into_error() {
    let options = Options::default().strict(true);
    let err = parse_with(r"ok \item \end{x}", &options).unwrap_err();
    let Error::Expand(expand_error) = err else {
        panic!("expected expansion error, got {err:?}");
    };
    assert_eq!(expand_error.kind, ExpandErrorKind::ItemOutsideList);
}

#[test]
fn strict_mode_accepts_clean_input() {
    let options = Options::default().strict(true);
    assert!(parse_with(r"\emph{fine}", &options).is_ok());
}

#[test]
fn lenient_mode_collects_every_diagnostic() {
    let doc = parse(r"\item \end{x} $a");
    assert_eq!(doc.diagnostics.len(), 3);
    assert_eq!(doc.root.find_tag(Tag::Error).len(), 3);
}

#[test]
fn unknown_commands_are_inert() {
    let doc = parse(r"\frobnicate{x}");
    assert!(doc.is_clean());
    let paragraph = paragraphs(&doc)[0];
    let command = paragraph.elements().next().expect("command span");
    assert_eq!(command.class, "command");
    assert_eq!(own_text(command), "frobnicate");
    assert_eq!(paragraph.find_class("curly").len(), 1);
}

#[test]
fn labels_are_collected() {
    let doc = parse(r"\label{a} \label{b} \ref{c}");
    let labels: Vec<&str> = doc.labels.iter().map(String::as_str).collect();
    assert_eq!(labels, vec!["a", "b"]);
}

#[rstest]
#[case(r"\ref{sec:a}", "ref")]
#[case(r"\autoref{sec:a}", "autoref")]
fn references_become_anchors(#[case] input: &str, #[case] class: &str) {
    let doc = parse(input);
    assert!(doc.is_clean());
    let anchor = doc.root.find_tag(Tag::Anchor)[0];
    assert_eq!(anchor.class, class);
    assert_eq!(anchor.href.as_deref(), Some("#sec:a"));
    assert_eq!(own_text(anchor), "sec:a");
    assert!(doc.labels.is_empty());
}

#[test]
fn options_defaults() {
    let options = Options::default();
    assert_eq!(options.max_depth, 256);
    assert_eq!(options.max_expansions, 10_000);
    assert_eq!(options.max_expansion_size, 1_000_000);
    assert!(options.keep_comments);
    assert!(!options.strict);
    assert!(!options.trace_macros);
}

#[test]
fn deep_groups_hit_depth_limit() {
    let input = format!("{}x{}", "{".repeat(20), "}".repeat(20));
    let doc = parse_opts(&input, &Options::default().max_depth(10));
    assert!(matches!(
        doc.diagnostics[0].kind,
        ExpandErrorKind::DepthExceeded { limit: 10 }
    ));
}

#[test]
fn expander_can_be_driven_directly() {
    let mut expander = Expander::new(Options::default());
    let mut out = Element::inline("host");
    let mut tokens = Tokens::from(tokenize(r"a\alpha b\end{x}rest").expect("tokenize"));

    let signal = expander.expand(&mut out, &mut tokens);

    assert_eq!(signal, Signal::Done);
    assert_eq!(own_text(&out), "a\u{3b1}brest");
    assert_eq!(out.find_tag(Tag::Error).len(), 1);
}

#[test]
fn expand_takes_a_token_tree() {
    let tree = tokenize("hello").expect("tokenize");
    let doc = expand(tree, &Options::default());
    assert_eq!(own_text(paragraphs(&doc)[0]), "hello");
}
