//! User macros: `\newcommand` registration and `#n` substitution.
//!
//! An invocation takes its arguments from the caller's token stream,
//! substitutes them into a copy of the body and splices the result back
//! in front of the stream, so the body is expanded in the caller's
//! context and its paragraph breaks, separators and `\end`s behave as if
//! written inline.

use std::rc::Rc;

use crate::argument::{take_argument, take_bracket};
use crate::ast::Element;
use crate::command::Command;
use crate::expander::{ExpandErrorKind, Expander, Signal};
use crate::token::{Group, Token, Tokens, push_token};

/// A user-defined command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
    pub name: String,
    /// Number of arguments, 0 to 9.
    pub arity: usize,
    /// Body with `Placeholder` tokens for the arguments.
    pub body: Group,
}

impl Macro {
    /// The body with every placeholder replaced by its argument.
    pub fn apply(&self, arguments: &[Group]) -> Result<Vec<Token>, ExpandErrorKind> {
        substitute(&self.body.children, arguments).map_err(|index| {
            ExpandErrorKind::UndefinedBackReference {
                name: self.name.clone(),
                index,
            }
        })
    }

    /// Take `arity` arguments off the front of `tokens`.
    pub fn take_arguments(&self, tokens: &mut Tokens) -> Result<Vec<Group>, ExpandErrorKind> {
        (1..=self.arity)
            .map(|index| {
                take_argument(tokens).ok_or_else(|| ExpandErrorKind::MissingMacroArgument {
                    name: self.name.clone(),
                    index,
                })
            })
            .collect()
    }
}

/// Replace placeholders in `body`, recursing into groups. Fails with the
/// offending index when a placeholder has no argument.
fn substitute(body: &[Token], arguments: &[Group]) -> Result<Vec<Token>, u8> {
    let mut out = Vec::with_capacity(body.len());
    for token in body {
        match token {
            Token::Placeholder(index) => {
                let argument = usize::from(*index)
                    .checked_sub(1)
                    .and_then(|i| arguments.get(i))
                    .ok_or(*index)?;
                for child in &argument.children {
                    push_token(&mut out, child.clone());
                }
            }
            Token::Group(group) => {
                let children = substitute(&group.children, arguments)?;
                push_token(
                    &mut out,
                    Token::Group(Group {
                        kind: group.kind,
                        children,
                    }),
                );
            }
            Token::Text(text) if text.is_empty() => {}
            other => push_token(&mut out, other.clone()),
        }
    }
    Ok(out)
}

/// Size of `body` once its placeholders are replaced: text bytes plus one
/// per other token.
fn substituted_size(body: &[Token], arguments: &[Group]) -> usize {
    body.iter()
        .map(|token| match token {
            Token::Text(text) => text.len(),
            Token::Group(group) => 1 + substituted_size(&group.children, arguments),
            Token::Placeholder(index) => usize::from(*index)
                .checked_sub(1)
                .and_then(|i| arguments.get(i))
                .map_or(1, |argument| substituted_size(&argument.children, &[])),
            _ => 1,
        })
        .sum()
}

/// `\newcommand{\name}[n]{body}` and `\renewcommand`. Emits nothing.
pub fn define(ex: &mut Expander, command: &str, out: &mut Element, tokens: &mut Tokens) -> Signal {
    let Some(target) = ex.require_argument(command, out, tokens) else {
        return Signal::Done;
    };
    let Some(name) = macro_name(&target) else {
        let command = command.to_string();
        return ex.fail(out, ExpandErrorKind::InvalidMacroName { command });
    };
    let arity = match take_bracket(tokens) {
        None => 0,
        Some(value) => match value.as_bytes() {
            [digit @ b'0'..=b'9'] => usize::from(digit - b'0'),
            _ => return ex.fail(out, ExpandErrorKind::InvalidArity { value }),
        },
    };
    let Some(body) = ex.require_argument(command, out, tokens) else {
        return Signal::Done;
    };

    ex.trace(|| format!("\\{name}#{arity} -> {}", body_source(&body)));
    let definition = Macro {
        name: name.clone(),
        arity,
        body,
    };
    ex.commands.define(&name, Command::Macro(Rc::new(definition)));
    Signal::Done
}

/// Expand an invocation by splicing its substituted body into `tokens`.
pub fn invoke(
    ex: &mut Expander,
    definition: &Macro,
    out: &mut Element,
    tokens: &mut Tokens,
) -> Signal {
    match instantiate(ex, definition, tokens) {
        Ok(body) => tokens.prepend(body),
        Err(kind) => {
            ex.fail(out, kind);
        }
    }
    Signal::Done
}

/// Count the expansion and its size against the budgets, then substitute.
pub fn instantiate(
    ex: &mut Expander,
    definition: &Macro,
    tokens: &mut Tokens,
) -> Result<Vec<Token>, ExpandErrorKind> {
    ex.expansions += 1;
    if ex.expansions > ex.options.max_expansions {
        let limit = ex.options.max_expansions;
        return Err(ExpandErrorKind::ExpansionLimit { limit });
    }
    let arguments = definition.take_arguments(tokens)?;
    let size = substituted_size(&definition.body.children, &arguments);
    ex.spliced = ex.spliced.saturating_add(size);
    if ex.spliced > ex.options.max_expansion_size {
        let limit = ex.options.max_expansion_size;
        return Err(ExpandErrorKind::ExpansionSize { limit });
    }
    ex.trace(|| {
        let shown: String = arguments.iter().map(ToString::to_string).collect();
        format!("\\{} <- {shown}", definition.name)
    });
    definition.apply(&arguments)
}

/// The single command named by the first argument of `\newcommand`.
fn macro_name(target: &Group) -> Option<String> {
    let mut names = target.children.iter().filter(|token| !is_blank(token));
    match (names.next(), names.next()) {
        (Some(Token::Command(name)), None) => Some(name.clone()),
        _ => None,
    }
}

fn is_blank(token: &Token) -> bool {
    match token {
        Token::Text(text) => text.trim().is_empty(),
        Token::Comment(_) => true,
        token => token.is_whitespace(),
    }
}

fn body_source(body: &Group) -> String {
    body.children.iter().map(ToString::to_string).collect()
}
