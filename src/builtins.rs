//! Built-in command handlers.
//!
//! Each handler has the [`Builtin`](crate::command::Builtin) shape and pulls
//! its own arguments.

use crate::argument::{flatten_text, skip_star};
use crate::ast::{Element, Tag};
use crate::expander::{
    DISPLAY_END, ExpandErrorKind, Expander, Frame, ITEM, PAR, RIGHT, ROW, Scope, Signal,
};
use crate::symbols::LetterStyle;
use crate::token::{Token, Tokens};

/// Headings that leave the surrounding paragraph.
pub const SECTIONING: [&str; 3] = ["section", "subsection", "subsubsection"];

/// Commands that relabel their single argument.
pub const STYLED: [&str; 18] = [
    "title",
    "author",
    "emph",
    "caption",
    "cite",
    "footnote",
    "mbox",
    "text",
    "textrm",
    "textbf",
    "textit",
    "texttt",
    "underline",
    "overline",
    "mathbf",
    "mathrm",
    "boldsymbol",
    "operatorname",
];

/// Environment name without a trailing star.
#[must_use]
pub fn destar(name: &str) -> &str {
    name.strip_suffix('*').unwrap_or(name)
}

/// How an environment lays out its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    scope: Scope,
    tag: Tag,
    math: bool,
}

impl Layout {
    fn of(name: &str) -> Self {
        let (scope, tag, math) = match destar(name) {
            "align" | "cases" => (Scope::Table, Tag::Table, true),
            "tabular" | "array" => (Scope::Table, Tag::Table, false),
            "itemize" | "enumerate" => (Scope::List, Tag::List, false),
            "math" | "displaymath" | "equation" => (Scope::Plain, Tag::Block, true),
            _ => (Scope::Paragraphs, Tag::Block, false),
        };
        Self { scope, tag, math }
    }
}

/// `\begin{name}`: open an environment and expand its body until a close
/// signal comes back.
pub fn begin(ex: &mut Expander, command: &str, out: &mut Element, tokens: &mut Tokens) -> Signal {
    let Some(argument) = ex.require_argument(command, out, tokens) else {
        return Signal::Done;
    };
    let name = flatten_text(&argument);
    let layout = Layout::of(&name);
    let math = layout.math || ex.in_math();
    let mut env = Element::new(layout.tag, destar(&name));
    let first_align = if destar(&name) == "align" {
        "right"
    } else {
        "left"
    };

    let frame = Frame::environment(&name, layout.scope, math);
    let Some(signal) = ex.nested(frame, out, |ex, _| match layout.scope {
        Scope::Paragraphs => ex.expand_paragraphs(&mut env, tokens),
        Scope::Table => ex.expand_table(&mut env, tokens, first_align),
        _ => ex.expand_plain(&mut env, tokens),
    }) else {
        return Signal::Done;
    };

    if layout.scope == Scope::List {
        env.children
            .retain(|child| child.as_text().is_none_or(|text| !text.trim().is_empty()));
    }

    let signal = match signal {
        Signal::ClosedBy(closer) if closer == name => Signal::Done,
        Signal::ClosedBy(closer) if ex.is_open(&closer) => {
            ex.fail(&mut env, ExpandErrorKind::UnclosedEnvironment { name });
            Signal::ClosedBy(closer)
        }
        Signal::ClosedBy(closer) => {
            let kind = ExpandErrorKind::EnvironmentMismatch {
                open: name,
                close: closer,
            };
            ex.fail(&mut env, kind)
        }
        Signal::Done => ex.fail(&mut env, ExpandErrorKind::UnclosedEnvironment { name }),
    };
    out.push_element(env);
    signal
}

/// `\end{name}`: hand a close signal to whoever opened `name`.
pub fn end(ex: &mut Expander, command: &str, out: &mut Element, tokens: &mut Tokens) -> Signal {
    let Some(argument) = ex.require_argument(command, out, tokens) else {
        return Signal::Done;
    };
    if ex.scope() == Some(Scope::Item) {
        // close the item first, then let the list see the \end again
        tokens.push_front(Token::Group(argument));
        tokens.push_front(Token::command(command));
        return Signal::closed_by(ITEM);
    }
    let name = flatten_text(&argument);
    if ex.any_environment_open() {
        Signal::ClosedBy(name)
    } else {
        ex.fail(out, ExpandErrorKind::UnmatchedEnd { name })
    }
}

/// `\item`: start a list entry, ending the previous one.
pub fn item(ex: &mut Expander, command: &str, out: &mut Element, tokens: &mut Tokens) -> Signal {
    match ex.scope() {
        Some(Scope::Item) => {
            tokens.push_front(Token::command(command));
            Signal::closed_by(ITEM)
        }
        Some(Scope::List) => {
            let mut entry = Element::new(Tag::ListItem, ITEM);
            let frame = Frame::new(ITEM, Scope::Item, ex.in_math());
            let Some(signal) =
                ex.nested(frame, out, |ex, _| ex.expand_plain(&mut entry, tokens))
            else {
                return Signal::Done;
            };
            out.push_element(entry);
            if signal.closes(ITEM) {
                Signal::Done
            } else {
                signal
            }
        }
        _ => ex.fail(out, ExpandErrorKind::ItemOutsideList),
    }
}

/// Paragraph break.
pub fn par(_: &mut Expander, _: &str, _: &mut Element, _: &mut Tokens) -> Signal {
    Signal::closed_by(PAR)
}

/// `\\`: row separator in tables, line break elsewhere.
pub fn row(_: &mut Expander, _: &str, _: &mut Element, _: &mut Tokens) -> Signal {
    Signal::closed_by(ROW)
}

/// `\[`
pub fn display_math(ex: &mut Expander, _: &str, out: &mut Element, tokens: &mut Tokens) -> Signal {
    let mut math = Element::block("short-displaymath");
    let frame = Frame::new("short-displaymath", Scope::DisplayMath, true);
    let Some(signal) = ex.nested(frame, out, |ex, _| ex.expand_plain(&mut math, tokens)) else {
        return Signal::Done;
    };
    let unterminated = ExpandErrorKind::UnterminatedMath {
        delimiter: "\\]".to_string(),
    };
    ex.close_span(out, math, signal, DISPLAY_END, unterminated)
}

/// `\]`, also when a `\left` inside the display is still open.
pub fn display_math_end(ex: &mut Expander, _: &str, out: &mut Element, _: &mut Tokens) -> Signal {
    if ex.closes_math(Scope::DisplayMath) {
        Signal::closed_by(DISPLAY_END)
    } else {
        ex.fail(out, ExpandErrorKind::UnmatchedDisplayMathEnd)
    }
}

/// `\left`: wrap everything up to the matching `\right`.
pub fn left(ex: &mut Expander, command: &str, out: &mut Element, tokens: &mut Tokens) -> Signal {
    if !ex.in_math() {
        let what = format!("\\{command}");
        return ex.fail(out, ExpandErrorKind::OutsideMathMode { what });
    }
    let mut span = Element::inline("mathspan");
    let frame = Frame::new("mathspan", Scope::MathSpan, true);
    let Some(signal) = ex.nested(frame, out, |ex, _| ex.expand_plain(&mut span, tokens)) else {
        return Signal::Done;
    };
    ex.close_span(out, span, signal, RIGHT, ExpandErrorKind::UnclosedLeft)
}

/// `\right`
pub fn right(ex: &mut Expander, _: &str, out: &mut Element, _: &mut Tokens) -> Signal {
    if ex.scope() == Some(Scope::MathSpan) {
        Signal::closed_by(RIGHT)
    } else {
        ex.fail(out, ExpandErrorKind::UnmatchedRight)
    }
}

/// `\label{id}`
pub fn label(ex: &mut Expander, command: &str, out: &mut Element, tokens: &mut Tokens) -> Signal {
    let Some(argument) = ex.require_argument(command, out, tokens) else {
        return Signal::Done;
    };
    let id = flatten_text(&argument);
    out.push_element(Element::inline(command).with_id(&id).with_text(&id));
    ex.labels.insert(id);
    Signal::Done
}

/// `\ref{id}` and `\autoref{id}`. The target is not checked.
pub fn reference(
    ex: &mut Expander,
    command: &str,
    out: &mut Element,
    tokens: &mut Tokens,
) -> Signal {
    let Some(argument) = ex.require_argument(command, out, tokens) else {
        return Signal::Done;
    };
    let id = flatten_text(&argument);
    out.push_element(Element::anchor(command, &id).with_text(&id));
    Signal::Done
}

/// `\frac{num}{den}`
pub fn frac(ex: &mut Expander, command: &str, out: &mut Element, tokens: &mut Tokens) -> Signal {
    let Some(numerator) = ex.require_argument(command, out, tokens) else {
        return Signal::Done;
    };
    let Some(denominator) = ex.require_argument(command, out, tokens) else {
        return Signal::Done;
    };

    let mut top = Element::inline("numerator");
    ex.expand_isolated(&mut top, Tokens::from(numerator));
    let mut bottom = Element::inline("denominator");
    ex.expand_isolated(&mut bottom, Tokens::from(denominator));

    out.push_element(
        Element::block(command)
            .with_child(top)
            .with_child(Element::new(Tag::Rule, "rule"))
            .with_child(bottom),
    );
    Signal::Done
}

/// `\mathbb` and `\mathcal`
pub fn letter_style(
    ex: &mut Expander,
    command: &str,
    out: &mut Element,
    tokens: &mut Tokens,
) -> Signal {
    let Some(argument) = ex.require_argument(command, out, tokens) else {
        return Signal::Done;
    };
    let text = flatten_text(&argument);
    let styled = match LetterStyle::from_command(command) {
        Some(style) => style.apply(&text),
        None => text,
    };
    out.push_element(Element::inline(command).with_text(&styled));
    Signal::Done
}

/// Relabel the argument as a span named after the command.
pub fn styled(ex: &mut Expander, command: &str, out: &mut Element, tokens: &mut Tokens) -> Signal {
    skip_star(tokens);
    let Some(argument) = ex.require_argument(command, out, tokens) else {
        return Signal::Done;
    };
    let mut span = Element::inline(command);
    ex.expand_isolated(&mut span, Tokens::from(argument));
    out.push_element(span);
    Signal::Done
}

/// Sectioning heading. Directly inside a paragraph environment it ends
/// the current paragraph and is placed after it.
pub fn section(ex: &mut Expander, command: &str, out: &mut Element, tokens: &mut Tokens) -> Signal {
    skip_star(tokens);
    let Some(argument) = ex.require_argument(command, out, tokens) else {
        return Signal::Done;
    };
    let mut heading = Element::block(command);
    ex.expand_isolated(&mut heading, Tokens::from(argument));
    if ex.scope() == Some(Scope::Paragraphs) {
        ex.detached.push(heading);
        return Signal::closed_by(PAR);
    }
    out.push_element(heading);
    Signal::Done
}
