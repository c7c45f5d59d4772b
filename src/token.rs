use std::collections::VecDeque;
use std::fmt;

/// Source location for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

/// Bracket kind of a token group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// Group delimited by `{` and `}`.
    Curly,
    /// Run of spacing that carries no text.
    Whitespace,
}

/// Characters with a structural role of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Special {
    /// `$`, toggles inline math.
    MathShift,
    /// `&`, separates table cells.
    AlignTab,
    /// `_`
    Subscript,
    /// `^`
    Superscript,
}

impl Special {
    /// Classify a character, if it is special.
    #[must_use]
    pub const fn from_char(ch: char) -> Option<Self> {
        match ch {
            '$' => Some(Self::MathShift),
            '&' => Some(Self::AlignTab),
            '_' => Some(Self::Subscript),
            '^' => Some(Self::Superscript),
            _ => None,
        }
    }

    /// The source character for this token.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::MathShift => '$',
            Self::AlignTab => '&',
            Self::Subscript => '_',
            Self::Superscript => '^',
        }
    }
}

/// A node of the token tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Run of literal characters.
    Text(String),
    /// `\name` or `\c`; the marker is not part of the name.
    Command(String),
    /// Bracket-delimited child sequence.
    Group(Group),
    /// `% ...` up to the end of the line, marker and newline excluded.
    Comment(String),
    /// `#1` .. `#9` inside a macro body.
    Placeholder(u8),
    /// One of `$ & _ ^`.
    Special(Special),
}

impl Token {
    /// Shorthand for a text token.
    #[must_use]
    pub fn text(s: &str) -> Self {
        Self::Text(s.to_string())
    }

    /// Shorthand for a command token.
    #[must_use]
    pub fn command(name: &str) -> Self {
        Self::Command(name.to_string())
    }

    /// Returns `true` for ignored-whitespace groups.
    #[must_use]
    pub const fn is_whitespace(&self) -> bool {
        matches!(
            self,
            Self::Group(Group {
                kind: GroupKind::Whitespace,
                ..
            })
        )
    }
}

/// A bracket-delimited token sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub kind: GroupKind,
    pub children: Vec<Token>,
}

impl Group {
    /// Create a curly group holding `children`.
    #[must_use]
    pub const fn curly(children: Vec<Token>) -> Self {
        Self {
            kind: GroupKind::Curly,
            children,
        }
    }

    /// Create an ignored-whitespace group holding `spacing`.
    #[must_use]
    pub fn whitespace(spacing: &str) -> Self {
        Self {
            kind: GroupKind::Whitespace,
            children: vec![Token::text(spacing)],
        }
    }
}

/// Append `token` to `tokens`, merging adjacent text and adjacent
/// whitespace groups.
pub fn push_token(tokens: &mut Vec<Token>, token: Token) {
    match (tokens.last_mut(), token) {
        (Some(Token::Text(prev)), Token::Text(next)) => prev.push_str(&next),
        (
            Some(Token::Group(Group {
                kind: GroupKind::Whitespace,
                children: prev,
            })),
            Token::Group(Group {
                kind: GroupKind::Whitespace,
                children: next,
            }),
        ) => {
            for child in next {
                push_token(prev, child);
            }
        }
        (_, token) => tokens.push(token),
    }
}

/// Consuming cursor over a sibling token sequence.
///
/// Tokens are removed from the front as they are interpreted. A handler
/// that looks one token too far can hand it back with [`Tokens::push_front`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    queue: VecDeque<Token>,
}

impl Tokens {
    /// Wrap a sibling sequence.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            queue: tokens.into(),
        }
    }

    /// Remove and return the next token.
    pub fn next_token(&mut self) -> Option<Token> {
        self.queue.pop_front()
    }

    /// Look at the next token without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<&Token> {
        self.queue.front()
    }

    /// Mutable access to the next token, for splitting text.
    pub fn peek_mut(&mut self) -> Option<&mut Token> {
        self.queue.front_mut()
    }

    /// Return a token to the front of the sequence.
    pub fn push_front(&mut self, token: Token) {
        self.queue.push_front(token);
    }

    /// Splice `tokens` in front of the sequence, merging a trailing text
    /// token with leading text.
    pub fn prepend(&mut self, tokens: Vec<Token>) {
        for token in tokens.into_iter().rev() {
            if let Token::Text(text) = &token {
                if let Some(Token::Text(front)) = self.queue.front_mut() {
                    front.insert_str(0, text);
                    continue;
                }
            }
            self.queue.push_front(token);
        }
    }

    /// Drop leading ignored-whitespace groups and comments.
    pub fn skip_ignorable(&mut self) {
        while matches!(self.peek(), Some(t) if t.is_whitespace() || matches!(t, Token::Comment(_)))
        {
            self.queue.pop_front();
        }
    }

    /// Drop leading spacing, including blanks at the start of a text
    /// token.
    pub fn skip_spacing(&mut self) {
        loop {
            self.skip_ignorable();
            let Some(Token::Text(text)) = self.queue.front_mut() else {
                return;
            };
            let trimmed = text.trim_start_matches([' ', '\t', '\n', '\r']);
            if trimmed.len() == text.len() {
                return;
            }
            if trimmed.is_empty() {
                self.queue.pop_front();
            } else {
                *text = trimmed.to_string();
                return;
            }
        }
    }
}

impl From<Group> for Tokens {
    fn from(group: Group) -> Self {
        Self::new(group.children)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Command(name) => write!(f, "\\{name}"),
            Self::Group(group) => write!(f, "{group}"),
            Self::Comment(s) => writeln!(f, "%{s}"),
            Self::Placeholder(n) => write!(f, "#{n}"),
            Self::Special(s) => write!(f, "{}", s.as_char()),
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == GroupKind::Curly {
            f.write_str("{")?;
        }
        for child in &self.children {
            write!(f, "{child}")?;
        }
        if self.kind == GroupKind::Curly {
            f.write_str("}")?;
        }
        Ok(())
    }
}
