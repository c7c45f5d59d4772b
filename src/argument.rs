//! Pulls single arguments off the front of a token sequence.
//!
//! Every handler requests its own arity by calling [`take_argument`] as
//! many times as it needs, so no per-command grammar exists.

use crate::token::{Group, Token, Tokens};

/// Remove one argument from the front of `tokens`.
///
/// Leading spacing is skipped. A curly group is returned as is; a single
/// command or the first character of a text run is wrapped in a
/// synthetic curly group. Anything else yields `None` and consumes
/// nothing but the skipped spacing.
pub fn take_argument(tokens: &mut Tokens) -> Option<Group> {
    tokens.skip_spacing();
    match tokens.peek()? {
        Token::Group(_) | Token::Command(_) => {}
        Token::Text(_) => return Some(Group::curly(vec![split_first_char(tokens)?])),
        Token::Comment(_) | Token::Placeholder(_) | Token::Special(_) => return None,
    }
    match tokens.next_token()? {
        Token::Group(group) => Some(group),
        command => Some(Group::curly(vec![command])),
    }
}

/// Detach the first character of a leading text token.
fn split_first_char(tokens: &mut Tokens) -> Option<Token> {
    let Some(Token::Text(text)) = tokens.peek_mut() else {
        return None;
    };
    let first = text.chars().next()?;
    let rest = text.split_off(first.len_utf8());
    if rest.is_empty() {
        tokens.next_token();
    } else {
        *text = rest;
    }
    Some(Token::Text(first.to_string()))
}

/// Concatenate the literal text of a group, for arguments used as names
/// or identifiers. Commands contribute their name.
#[must_use]
pub fn flatten_text(group: &Group) -> String {
    let mut out = String::new();
    flatten_into(&group.children, &mut out);
    out.trim().to_string()
}

fn flatten_into(tokens: &[Token], out: &mut String) {
    for token in tokens {
        match token {
            Token::Text(s) => out.push_str(s),
            Token::Command(name) => out.push_str(name),
            Token::Group(group) => flatten_into(&group.children, out),
            Token::Special(special) => out.push(special.as_char()),
            Token::Comment(_) | Token::Placeholder(_) => {}
        }
    }
}

/// Drop a `*` directly following a command name.
pub fn skip_star(tokens: &mut Tokens) {
    skip_char(tokens, '*');
}

/// Drop `ch` if the next token is text starting with it.
pub fn skip_char(tokens: &mut Tokens, ch: char) {
    let Some(Token::Text(text)) = tokens.peek_mut() else {
        return;
    };
    match text.strip_prefix(ch) {
        Some("") => {
            tokens.next_token();
        }
        Some(rest) => *text = rest.to_string(),
        None => {}
    }
}

/// Read an optional `[...]` argument from the front of a text run.
///
/// Returns `None` when the next token does not open a bracket, or when
/// the bracket is not closed within the same text run; in that case
/// nothing is consumed.
pub fn take_bracket(tokens: &mut Tokens) -> Option<String> {
    tokens.skip_spacing();
    let Some(Token::Text(text)) = tokens.peek_mut() else {
        return None;
    };
    let inner = text.strip_prefix('[')?;
    let close = inner.find(']')?;
    let value = inner[..close].trim().to_string();
    let rest = inner[close + 1..].to_string();
    if rest.is_empty() {
        tokens.next_token();
    } else {
        *text = rest;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::token::Special;

    fn tokens(input: &str) -> Tokens {
        Tokens::from(tokenize(input).expect("should tokenize"))
    }

    #[test]
    fn curly_group_is_returned_directly() {
        let mut t = tokens("{ab}c");
        let arg = take_argument(&mut t).expect("argument");
        assert_eq!(arg.children, vec![Token::text("ab")]);
        assert_eq!(t.peek(), Some(&Token::text("c")));
    }

    #[test]
    fn command_is_wrapped() {
        let mut t = tokens(r"\alpha x");
        let arg = take_argument(&mut t).expect("argument");
        assert_eq!(arg.children, vec![Token::command("alpha")]);
    }

    #[test]
    fn text_yields_first_char() {
        let mut t = tokens("12");
        assert_eq!(
            take_argument(&mut t).map(|g| g.children),
            Some(vec![Token::text("1")])
        );
        assert_eq!(
            take_argument(&mut t).map(|g| g.children),
            Some(vec![Token::text("2")])
        );
        assert_eq!(t.next_token(), None);
    }

    #[test]
    fn leading_spacing_is_skipped() {
        let mut t = tokens("  \n {x}");
        let arg = take_argument(&mut t).expect("argument");
        assert_eq!(arg.children, vec![Token::text("x")]);
    }

    #[test]
    fn special_is_not_an_argument() {
        let mut t = tokens("^x");
        assert!(take_argument(&mut t).is_none());
        assert_eq!(t.next_token(), Some(Token::Special(Special::Superscript)));
        assert_eq!(t.next_token(), Some(Token::text("x")));
        assert_eq!(t.next_token(), None);
    }

    #[test]
    fn empty_sequence_has_no_argument() {
        let mut t = tokens("");
        assert!(take_argument(&mut t).is_none());
    }

    #[test]
    fn bracket_is_read_from_text() {
        let mut t = tokens("[2]{body}");
        assert_eq!(take_bracket(&mut t).as_deref(), Some("2"));
        assert!(matches!(t.peek(), Some(Token::Group(_))));
    }

    #[test]
    fn bracket_leaves_trailing_text() {
        let mut t = tokens("[opt] rest");
        assert_eq!(take_bracket(&mut t).as_deref(), Some("opt"));
        assert_eq!(t.peek(), Some(&Token::text(" rest")));
    }

    #[test]
    fn unclosed_bracket_consumes_nothing() {
        let mut t = tokens("[oops");
        assert!(take_bracket(&mut t).is_none());
        assert_eq!(t.peek(), Some(&Token::text("[oops")));
    }

    #[test]
    fn star_is_dropped() {
        let mut t = tokens("*{x}");
        skip_star(&mut t);
        assert!(matches!(t.peek(), Some(Token::Group(_))));
    }

    #[test]
    fn flatten_nested_text() {
        let group = tokenize("sec:{intro}").expect("should tokenize");
        assert_eq!(flatten_text(&group), "sec:intro");
    }
}
