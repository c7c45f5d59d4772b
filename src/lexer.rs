use std::fmt;

use crate::token::{Group, Span, Special, Token, push_token};

/// Deepest brace nesting the lexer accepts.
pub const MAX_NESTING: usize = 256;

/// Classifies a lexer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// `}` with no open group at this level.
    UnmatchedCloseBrace,
    /// `{` whose matching `}` never appears.
    UnterminatedGroup,
    /// `%` comment running into the end of input.
    UnterminatedComment,
    /// Braces nested deeper than [`MAX_NESTING`].
    NestingTooDeep,
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmatchedCloseBrace => write!(f, "unmatched '}}'"),
            Self::UnterminatedGroup => write!(f, "unterminated group, expected '}}'"),
            Self::UnterminatedComment => {
                write!(f, "unterminated comment, expected end of line")
            }
            Self::NestingTooDeep => {
                write!(f, "groups nested deeper than {MAX_NESTING} levels")
            }
        }
    }
}

/// Error produced during tokenization. Always fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {}, column {}", span.line, span.column)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

/// Tokenize markup source into a token tree rooted at an implicit group.
///
/// # Errors
///
/// Returns `LexError` on unbalanced braces, a comment that is not
/// terminated by a newline, or excessive nesting.
pub fn tokenize(input: &str) -> Result<Group, LexError> {
    Lexer::new(input).tokenize()
}

/// Whitespace tracker, one per nesting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Spacing {
    /// A newline was just folded or emitted.
    LineStart,
    /// Spacing was just seen, or nothing has been seen yet.
    AfterSpace,
    /// The last thing seen was content.
    InText,
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    col: usize,
    depth: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);
        Self {
            input,
            pos: 0,
            line: 1,
            col: 1,
            depth: 0,
        }
    }

    fn tokenize(mut self) -> Result<Group, LexError> {
        let children = self.read_sequence(None)?;
        Ok(Group::curly(children))
    }

    const fn span(&self) -> Span {
        Span {
            line: self.line,
            column: self.col,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    /// Read one nesting level. `open` is where the enclosing `{` sits,
    /// `None` at top level.
    fn read_sequence(&mut self, open: Option<Span>) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        let mut state = Spacing::AfterSpace;

        while let Some(ch) = self.peek() {
            match ch {
                '%' => {
                    tokens.push(self.read_comment()?);
                    state = Spacing::LineStart;
                }
                '\\' => {
                    push_token(&mut tokens, self.read_command());
                    state = Spacing::InText;
                }
                '\r' => {
                    self.advance();
                }
                '\n' => {
                    self.advance();
                    match state {
                        Spacing::InText => push_token(&mut tokens, Token::text("\n")),
                        Spacing::LineStart => tokens.push(Token::command("par")),
                        Spacing::AfterSpace => {
                            push_token(&mut tokens, Token::Group(Group::whitespace("\n")));
                        }
                    }
                    state = Spacing::LineStart;
                }
                '#' => {
                    self.advance();
                    match self.peek().and_then(|c| c.to_digit(10)) {
                        Some(digit) => {
                            self.advance();
                            // to_digit(10) is always below 10
                            #[allow(clippy::cast_possible_truncation)]
                            tokens.push(Token::Placeholder(digit as u8));
                        }
                        None => push_token(&mut tokens, Token::text("#")),
                    }
                    state = Spacing::InText;
                }
                '{' => {
                    let span = self.span();
                    if self.depth >= MAX_NESTING {
                        return Err(LexError {
                            kind: LexErrorKind::NestingTooDeep,
                            span,
                        });
                    }
                    self.advance();
                    self.depth += 1;
                    let children = self.read_sequence(Some(span))?;
                    self.depth -= 1;
                    tokens.push(Token::Group(Group::curly(children)));
                    state = Spacing::InText;
                }
                '}' => {
                    if open.is_none() {
                        return Err(LexError {
                            kind: LexErrorKind::UnmatchedCloseBrace,
                            span: self.span(),
                        });
                    }
                    self.advance();
                    return Ok(tokens);
                }
                ' ' | '\t' => {
                    self.advance();
                    if state == Spacing::InText {
                        push_token(&mut tokens, Token::Text(ch.to_string()));
                        state = Spacing::AfterSpace;
                    } else {
                        push_token(&mut tokens, Token::Group(Group::whitespace(&ch.to_string())));
                    }
                }
                _ => {
                    self.advance();
                    match Special::from_char(ch) {
                        Some(special) => tokens.push(Token::Special(special)),
                        None => push_token(&mut tokens, Token::Text(ch.to_string())),
                    }
                    state = Spacing::InText;
                }
            }
        }

        match open {
            Some(span) => Err(LexError {
                kind: LexErrorKind::UnterminatedGroup,
                span,
            }),
            None => Ok(tokens),
        }
    }

    fn read_comment(&mut self) -> Result<Token, LexError> {
        let span = self.span();
        self.advance(); // skip %
        let start = self.pos;

        loop {
            match self.peek() {
                None => {
                    return Err(LexError {
                        kind: LexErrorKind::UnterminatedComment,
                        span,
                    });
                }
                Some('\n') => break,
                Some(_) => {
                    self.advance();
                }
            }
        }

        let text = self.input[start..self.pos]
            .trim_end_matches('\r')
            .to_string();
        self.advance(); // newline belongs to the comment
        Ok(Token::Comment(text))
    }

    fn read_command(&mut self) -> Token {
        self.advance(); // skip backslash
        match self.peek() {
            None => Token::text("\\"),
            Some(c) if c.is_ascii_alphabetic() => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
                    self.advance();
                }
                Token::Command(self.input[start..self.pos].to_string())
            }
            Some(c) => {
                self.advance();
                Token::Command(c.to_string())
            }
        }
    }
}
