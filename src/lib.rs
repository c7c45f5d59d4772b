//! Tokenizer and macro expander for a LaTeX-flavored draft markup.
//!
//! Source text is turned into a token tree by [`tokenize`], then walked by
//! the [`Expander`] against a table of built-in commands and user macros
//! to produce an output tree of tagged elements. Structural mistakes
//! (an `\end` that closes the wrong environment, a missing argument)
//! never abort a parse; they show up inline as error elements and on
//! [`Document::diagnostics`].
//!
//! # Quick start
//!
//! ```
//! use draftex::{parse_str, text_content};
//!
//! let input = r"\newcommand{\greet}[2]{Hello, #1 and #2!}\greet{Alice}{Bob}";
//! let doc = parse_str(input).unwrap();
//! assert_eq!(text_content(&doc.root), "Hello, Alice and Bob!");
//! ```
//!
//! ## Render HTML
//!
//! ```
//! use draftex::{parse_str, to_html};
//!
//! let doc = parse_str(r"\emph{hi}").unwrap();
//! assert!(to_html(&doc).contains("<span class=\"emph\">hi</span>"));
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod argument;
pub mod ast;
pub mod builder;
pub mod builtins;
pub mod command;
pub mod expander;
pub mod formatter;
pub mod lexer;
pub mod macros;
pub mod symbols;
pub mod token;

pub use ast::{Document, Element, Node, Tag};
pub use command::{Command, CommandTable};
pub use expander::{ExpandError, ExpandErrorKind, Expander, Options, Signal, expand};
pub use formatter::{text_content, to_html};
pub use lexer::{LexError, LexErrorKind, tokenize};
pub use macros::Macro;
pub use token::{Group, GroupKind, Span, Special, Token, Tokens};

/// Unified error type covering both phases.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Malformed source; nothing was expanded.
    #[error("{0}")]
    Lex(#[from] LexError),
    /// First structural error of a strict parse.
    #[error("{0}")]
    Expand(#[from] ExpandError),
}

/// Tokenize and expand a source string with default options.
pub fn parse_str(input: &str) -> Result<Document, Error> {
    parse_with(input, &Options::default())
}

/// Tokenize and expand a source string.
///
/// With [`Options::strict`] set, the first structural error is returned
/// instead of the document.
pub fn parse_with(input: &str, options: &Options) -> Result<Document, Error> {
    let tree = tokenize(input)?;
    let document = expand(tree, options);
    if options.strict {
        if let Some(error) = document.diagnostics.first() {
            return Err(error.clone().into());
        }
    }
    Ok(document)
}
