//! Macro definition, substitution and invocation.

mod common;

use common::{assert_clean, own_text, paragraphs, parse, parse_opts};
use draftex::{ExpandErrorKind, Options, Tag, text_content};

#[test]
fn greet_substitutes_by_position() {
    let doc = parse(r"\newcommand{\greet}[2]{Hello, #1 and #2!}\greet{Alice}{Bob}");
    assert_clean(&doc);
    assert_eq!(own_text(paragraphs(&doc)[0]), "Hello, Alice and Bob!");
}

#[test]
fn unbraced_name_and_single_char_arguments() {
    let doc = parse(r"\newcommand\pair[2]{(#1,#2)}\pair xy");
    assert_clean(&doc);
    assert_eq!(own_text(paragraphs(&doc)[0]), "(x,y)");
}

#[test]
fn arguments_may_repeat_and_reorder() {
    let doc = parse(r"\newcommand{\swap}[2]{#2#1#2}\swap{a}{b}");
    assert_eq!(own_text(paragraphs(&doc)[0]), "bab");
}

#[test]
fn fewer_arguments_is_recoverable() {
    let doc = parse(r"\newcommand{\three}[3]{#1#2#3}\three{a}{b}");
    assert_eq!(
        doc.diagnostics[0].kind,
        ExpandErrorKind::MissingMacroArgument {
            name: "three".to_string(),
            index: 3,
        }
    );
    assert_eq!(doc.root.find_tag(Tag::Error).len(), 1);
}

#[test]
fn macros_call_macros() {
    let doc = parse(
        r"\newcommand{\inner}[1]{<#1>}\newcommand{\outer}[1]{[\inner{#1}]}\outer{x}",
    );
    assert_clean(&doc);
    assert_eq!(own_text(paragraphs(&doc)[0]), "[<x>]");
}

#[test]
fn body_commands_are_expanded() {
    let doc = parse(r"\newcommand{\e}[1]{\emph{#1}}\e{word}");
    assert_clean(&doc);
    let emph = doc.root.find_class("emph");
    assert_eq!(emph.len(), 1);
    assert_eq!(own_text(emph[0]), "word");
}

#[test]
fn body_may_open_and_close_environments() {
    let doc = parse(r"\newcommand{\q}[1]{\begin{quote}#1\end{quote}}\q{cited}");
    assert_clean(&doc);
    let quote = doc.root.find_class("quote")[0];
    assert_eq!(text_content(quote), "cited");
}

#[test]
fn definition_is_scoped_to_one_parse() {
    let _ = parse(r"\newcommand{\only}{here}");
    let doc = parse(r"\only");
    assert_eq!(doc.root.find_class("command").len(), 1);
}

#[test]
fn macro_shadows_builtin() {
    let doc = parse(r"\renewcommand{\emph}[1]{*#1*}\emph{x}");
    assert_clean(&doc);
    assert!(doc.root.find_class("emph").is_empty());
    assert_eq!(own_text(paragraphs(&doc)[0]), "*x*");
}

#[test]
fn macro_as_superscript_stays_inside() {
    let doc = parse(r"\newcommand{\sq}{2}$x^\sq y$");
    assert_clean(&doc);
    let sup = doc.root.find_tag(Tag::Superscript)[0];
    assert_eq!(own_text(sup), "2");
}

#[test]
fn self_recursion_is_cut_off() {
    let options = Options::default().max_expansions(100);
    let doc = parse_opts(r"\newcommand{\again}{x\again}\again", &options);
    assert_eq!(
        doc.diagnostics[0].kind,
        ExpandErrorKind::ExpansionLimit { limit: 100 }
    );
    assert_eq!(own_text(paragraphs(&doc)[0]).len(), 100);
}

#[test]
fn doubling_argument_is_cut_off_by_size() {
    let doc = parse(r"\newcommand{\x}[1]{\x{#1#1}}\x{a}");
    let limit = Options::default().max_expansion_size;
    assert_eq!(
        doc.diagnostics[0].kind,
        ExpandErrorKind::ExpansionSize { limit }
    );
    assert_eq!(doc.diagnostics.len(), 1);
    assert!(text_content(&doc.root).is_empty());
}

#[test]
fn size_budget_spans_the_whole_parse() {
    let options = Options::default().max_expansion_size(10);
    let doc = parse_opts(r"\newcommand{\w}{word}\w \w \w", &options);
    assert_eq!(
        doc.diagnostics[0].kind,
        ExpandErrorKind::ExpansionSize { limit: 10 }
    );
    assert!(own_text(paragraphs(&doc)[0]).starts_with("word word"));
}

#[test]
fn trace_records_definition_and_call() {
    let options = Options::default().trace_macros(true);
    let doc = parse_opts(
        r"\newcommand{\greet}[2]{Hello, #1 and #2!}\greet{Alice}{Bob}",
        &options,
    );
    assert_eq!(
        doc.trace,
        vec![
            r"\greet#2 -> Hello, #1 and #2!".to_string(),
            r"\greet <- {Alice}{Bob}".to_string(),
        ]
    );
}

#[test]
fn trace_is_off_by_default() {
    let doc = parse(r"\newcommand{\x}{y}\x");
    assert!(doc.trace.is_empty());
}
