//! Walks a token tree against the command table and builds the output
//! tree.
//!
//! Begin/end matching needs no explicit stack of open structures: every
//! handler returns a [`Signal`], and a close signal travels back up the
//! ordinary call chain until the call that opened the named structure
//! sees it. The same channel carries paragraph breaks (`par`), row
//! separators (`\\`), cell separators (`&`) and list-item boundaries, so
//! each structure only reacts to the separators it owns.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::argument::{skip_char, take_argument};
use crate::ast::{Document, Element, Tag};
use crate::command::{Command, CommandTable};
use crate::macros;
use crate::symbols;
use crate::token::{Group, GroupKind, Special, Token, Tokens};

/// Signal name for a paragraph break.
pub const PAR: &str = "par";
/// Signal name for a row separator (`\\`).
pub const ROW: &str = "\\";
/// Signal name for a cell separator (`&`).
pub const CELL: &str = "&";
/// Signal name for the end of a list item.
pub const ITEM: &str = "item";
/// Signal name closing inline math.
pub const MATH_SHIFT: &str = "$";
/// Signal name closing display math (`\]`).
pub const DISPLAY_END: &str = "]";
/// Signal name closing a `\left` span.
pub const RIGHT: &str = "right";

/// What a handler hands back to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// Keep going.
    Done,
    /// A structure with this name was just closed; stop consuming and let
    /// the caller decide.
    ClosedBy(String),
}

impl Signal {
    /// Close signal for `name`.
    #[must_use]
    pub fn closed_by(name: &str) -> Self {
        Self::ClosedBy(name.to_string())
    }

    /// Returns `true` if this closes `name`.
    #[must_use]
    pub fn closes(&self, name: &str) -> bool {
        matches!(self, Self::ClosedBy(n) if n == name)
    }
}

/// Classifies a structural error. These never abort a parse; each one is
/// rendered inline where it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ExpandErrorKind {
    /// `\begin{open}` closed by `\end{close}`.
    EnvironmentMismatch { open: String, close: String },
    /// `\begin{name}` never closed.
    UnclosedEnvironment { name: String },
    /// `\end{name}` with nothing open.
    UnmatchedEnd { name: String },
    /// A built-in ran out of arguments.
    MissingArgument { command: String },
    /// A macro was invoked with fewer arguments than declared.
    MissingMacroArgument { name: String, index: usize },
    /// A macro body refers to an argument it does not declare.
    UndefinedBackReference { name: String, index: u8 },
    /// `\newcommand` whose first argument is not a command.
    InvalidMacroName { command: String },
    /// `\newcommand` with an arity that is not a digit.
    InvalidArity { value: String },
    /// Math-only construct in text mode.
    OutsideMathMode { what: String },
    /// `\item` outside `itemize`/`enumerate`.
    ItemOutsideList,
    /// `\right` without `\left`.
    UnmatchedRight,
    /// `\left` without `\right`.
    UnclosedLeft,
    /// `\]` without `\[`.
    UnmatchedDisplayMathEnd,
    /// Math toggle never closed.
    UnterminatedMath { delimiter: String },
    /// `&` outside a table.
    MisplacedAlignment,
    /// Nesting deeper than `Options::max_depth`.
    DepthExceeded { limit: usize },
    /// More macro expansions than `Options::max_expansions`.
    ExpansionLimit { limit: usize },
    /// Macro bodies grew past `Options::max_expansion_size`.
    ExpansionSize { limit: usize },
}

impl fmt::Display for ExpandErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnvironmentMismatch { open, close } => write!(
                f,
                "begin/end mismatch: \\begin{{{open}}} closed by \\end{{{close}}}"
            ),
            Self::UnclosedEnvironment { name } => write!(f, "missing \\end{{{name}}}"),
            Self::UnmatchedEnd { name } => {
                write!(f, "\\end{{{name}}} without matching \\begin{{{name}}}")
            }
            Self::MissingArgument { command } => {
                write!(f, "missing argument for \\{command}")
            }
            Self::MissingMacroArgument { name, index } => {
                write!(f, "missing argument #{index} for macro \\{name}")
            }
            Self::UndefinedBackReference { name, index } => {
                write!(f, "macro \\{name} has no argument #{index}")
            }
            Self::InvalidMacroName { command } => {
                write!(f, "first argument to \\{command} must be a command")
            }
            Self::InvalidArity { value } => write!(f, "invalid argument count [{value}]"),
            Self::OutsideMathMode { what } => write!(f, "{what} outside math mode"),
            Self::ItemOutsideList => write!(f, "\\item outside a list"),
            Self::UnmatchedRight => write!(f, "\\right without matching \\left"),
            Self::UnclosedLeft => write!(f, "\\left without matching \\right"),
            Self::UnmatchedDisplayMathEnd => write!(f, "\\] without matching \\["),
            Self::UnterminatedMath { delimiter } => {
                write!(f, "unterminated math, expected {delimiter}")
            }
            Self::MisplacedAlignment => write!(f, "alignment tab '&' outside a table"),
            Self::DepthExceeded { limit } => {
                write!(f, "structures nested deeper than {limit} levels")
            }
            Self::ExpansionLimit { limit } => {
                write!(f, "more than {limit} macro expansions")
            }
            Self::ExpansionSize { limit } => {
                write!(f, "macro expansions produced more than {limit} bytes")
            }
        }
    }
}

/// A recoverable structural error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{kind}")]
pub struct ExpandError {
    #[serde(flatten)]
    pub kind: ExpandErrorKind,
}

/// Knobs for one parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Deepest nesting of environments, groups and math spans.
    pub max_depth: usize,
    /// Total macro expansions allowed in one parse.
    pub max_expansions: usize,
    /// Total size of substituted macro bodies allowed in one parse, in
    /// text bytes plus one per other token.
    pub max_expansion_size: usize,
    /// Keep `%` comments as inert `comment` spans.
    pub keep_comments: bool,
    /// Treat the first structural error as fatal.
    pub strict: bool,
    /// Record macro definitions and invocations on `Document::trace`.
    pub trace_macros: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_depth: 256,
            max_expansions: 10_000,
            max_expansion_size: 1_000_000,
            keep_comments: true,
            strict: false,
            trace_macros: false,
        }
    }
}

impl Options {
    #[must_use]
    pub const fn max_depth(mut self, limit: usize) -> Self {
        self.max_depth = limit;
        self
    }

    #[must_use]
    pub const fn max_expansions(mut self, limit: usize) -> Self {
        self.max_expansions = limit;
        self
    }

    #[must_use]
    pub const fn max_expansion_size(mut self, limit: usize) -> Self {
        self.max_expansion_size = limit;
        self
    }

    #[must_use]
    pub const fn keep_comments(mut self, keep: bool) -> Self {
        self.keep_comments = keep;
        self
    }

    #[must_use]
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[must_use]
    pub const fn trace_macros(mut self, trace: bool) -> Self {
        self.trace_macros = trace;
        self
    }
}

/// How a scope treats the separators that reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Splits its content into paragraphs.
    Paragraphs,
    /// Rows and cells.
    Table,
    /// Holds list items; paragraph breaks are suppressed.
    List,
    /// One list item.
    Item,
    /// Environment without inner structure.
    Plain,
    /// Curly group or command argument; close signals do not cross it.
    Group,
    /// `$...$`
    InlineMath,
    /// `\[...\]`
    DisplayMath,
    /// `\left...\right`
    MathSpan,
}

/// One level of the expansion call chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub name: String,
    pub scope: Scope,
    /// Math mode is active inside this frame.
    pub math: bool,
    /// Opened by `\begin`, so `\end` may close it.
    pub environment: bool,
}

impl Frame {
    #[must_use]
    pub fn new(name: &str, scope: Scope, math: bool) -> Self {
        Self {
            name: name.to_string(),
            scope,
            math,
            environment: false,
        }
    }

    #[must_use]
    pub fn environment(name: &str, scope: Scope, math: bool) -> Self {
        Self {
            environment: true,
            ..Self::new(name, scope, math)
        }
    }
}

/// Expansion state for one full-document parse.
pub struct Expander {
    pub(crate) commands: CommandTable,
    pub(crate) options: Options,
    pub(crate) labels: BTreeSet<String>,
    pub(crate) expansions: usize,
    /// Size of every macro body spliced so far.
    pub(crate) spliced: usize,
    /// Blocks waiting to be placed between paragraphs.
    pub(crate) detached: Vec<Element>,
    frames: Vec<Frame>,
    diagnostics: Vec<ExpandError>,
    trace: Vec<String>,
}

/// Expand a token tree into a document.
#[must_use]
pub fn expand(tree: Group, options: &Options) -> Document {
    Expander::new(options.clone()).expand_document(tree)
}

impl Expander {
    /// Fresh state with only the built-in commands.
    #[must_use]
    pub fn new(options: Options) -> Self {
        Self {
            commands: CommandTable::new(),
            options,
            labels: BTreeSet::new(),
            expansions: 0,
            spliced: 0,
            detached: Vec::new(),
            frames: Vec::new(),
            diagnostics: Vec::new(),
            trace: Vec::new(),
        }
    }

    /// Expand a whole document into a `root` paragraph environment.
    #[must_use]
    pub fn expand_document(mut self, tree: Group) -> Document {
        let mut root = Element::block("root");
        let mut tokens = Tokens::from(tree);
        self.frames.push(Frame::new("root", Scope::Paragraphs, false));

        while let Signal::ClosedBy(name) = self.expand_paragraphs(&mut root, &mut tokens) {
            self.fail(&mut root, ExpandErrorKind::UnmatchedEnd { name });
        }

        self.frames.pop();
        Document {
            root,
            labels: self.labels,
            diagnostics: self.diagnostics,
            trace: self.trace,
        }
    }

    /// Consume `tokens` left to right, appending to `out`, until they run
    /// out or a handler returns a close signal.
    pub fn expand(&mut self, out: &mut Element, tokens: &mut Tokens) -> Signal {
        while let Some(token) = tokens.next_token() {
            let signal = match token {
                Token::Text(text) => {
                    out.push_text(&text);
                    Signal::Done
                }
                Token::Comment(text) => {
                    if self.options.keep_comments {
                        out.push_element(Element::inline("comment").with_text(&text));
                    }
                    Signal::Done
                }
                Token::Group(group) => {
                    if group.kind == GroupKind::Curly {
                        let mut span = Element::inline("curly");
                        self.expand_isolated(&mut span, Tokens::from(group));
                        out.push_element(span);
                    }
                    Signal::Done
                }
                Token::Placeholder(index) => {
                    out.push_text(&format!("#{index}"));
                    Signal::Done
                }
                Token::Command(name) => self.dispatch(&name, out, tokens),
                Token::Special(special) => self.expand_special(special, out, tokens),
            };
            if let Signal::ClosedBy(_) = signal {
                return signal;
            }
        }
        Signal::Done
    }

    /// Run the handler registered under `name`.
    ///
    /// Lookup goes through the command table first and the symbol table
    /// second. Anything else passes through as an inert `command` span.
    pub fn dispatch(&mut self, name: &str, out: &mut Element, tokens: &mut Tokens) -> Signal {
        match self.commands.get(name) {
            Some(Command::Builtin(handler)) => handler(self, name, out, tokens),
            Some(Command::Macro(definition)) => macros::invoke(self, &definition, out, tokens),
            None => {
                if let Some(replacement) = symbols::lookup(name) {
                    out.push_text(replacement);
                    if name.starts_with(|c: char| c.is_ascii_alphabetic()) {
                        skip_char(tokens, ' ');
                    }
                } else {
                    out.push_element(Element::inline("command").with_text(name));
                }
                Signal::Done
            }
        }
    }

    /// Expand a self-contained sequence. Separators and close signals
    /// cannot escape it.
    pub fn expand_isolated(&mut self, out: &mut Element, mut tokens: Tokens) {
        let math = self.in_math();
        self.nested(Frame::new("curly", Scope::Group, math), out, |ex, out| {
            while let Signal::ClosedBy(name) = ex.expand_plain(out, &mut tokens) {
                ex.fail(out, ExpandErrorKind::UnmatchedEnd { name });
            }
            Signal::Done
        });
    }

    /// Expand without inner structure: paragraph breaks vanish, `\\`
    /// becomes a line break, `&` is an error. Other signals are returned.
    pub fn expand_plain(&mut self, out: &mut Element, tokens: &mut Tokens) -> Signal {
        loop {
            match self.expand(out, tokens) {
                Signal::ClosedBy(name) if name == PAR => {}
                Signal::ClosedBy(name) if name == ROW => out.push_element(Element::line_break()),
                Signal::ClosedBy(name) if name == CELL => {
                    self.fail(out, ExpandErrorKind::MisplacedAlignment);
                }
                signal => return signal,
            }
        }
    }

    /// Expand into a sequence of paragraphs appended to `env`.
    pub fn expand_paragraphs(&mut self, env: &mut Element, tokens: &mut Tokens) -> Signal {
        let mut paragraph = Element::paragraph();
        loop {
            match self.expand(&mut paragraph, tokens) {
                Signal::ClosedBy(name) if name == PAR => {
                    let full = std::mem::replace(&mut paragraph, Element::paragraph());
                    self.flush_paragraph(env, full);
                }
                Signal::ClosedBy(name) if name == ROW => {
                    paragraph.push_element(Element::line_break());
                }
                Signal::ClosedBy(name) if name == CELL => {
                    self.fail(&mut paragraph, ExpandErrorKind::MisplacedAlignment);
                }
                signal => {
                    self.flush_paragraph(env, paragraph);
                    return signal;
                }
            }
        }
    }

    fn flush_paragraph(&mut self, env: &mut Element, paragraph: Element) {
        if !paragraph.is_blank() {
            env.push_element(paragraph);
        }
        for block in self.detached.drain(..) {
            env.push_element(block);
        }
    }

    /// Expand a table body: `&` opens a cell, `\\` opens a row.
    pub fn expand_table(
        &mut self,
        table: &mut Element,
        tokens: &mut Tokens,
        first_align: &str,
    ) -> Signal {
        let mut row = Element::new(Tag::TableRow, "row");
        let mut cell = Element::cell(first_align);
        loop {
            match self.expand(&mut cell, tokens) {
                Signal::ClosedBy(name) if name == CELL => {
                    row.push_element(std::mem::replace(&mut cell, Element::cell("left")));
                }
                Signal::ClosedBy(name) if name == ROW => {
                    row.push_element(std::mem::replace(&mut cell, Element::cell(first_align)));
                    table.push_element(std::mem::replace(
                        &mut row,
                        Element::new(Tag::TableRow, "row"),
                    ));
                }
                Signal::ClosedBy(name) if name == PAR => {}
                signal => {
                    // a trailing \\ leaves one empty row behind
                    let trailing = row.children.is_empty() && cell.is_blank();
                    if !trailing || table.children.is_empty() {
                        row.push_element(cell);
                        table.push_element(row);
                    }
                    return signal;
                }
            }
        }
    }

    /// Run `body` inside `frame`. Returns `None`, after annotating `out`,
    /// when nesting is already at the limit.
    pub fn nested<F>(&mut self, frame: Frame, out: &mut Element, body: F) -> Option<Signal>
    where
        F: FnOnce(&mut Self, &mut Element) -> Signal,
    {
        if self.frames.len() >= self.options.max_depth {
            let limit = self.options.max_depth;
            self.fail(out, ExpandErrorKind::DepthExceeded { limit });
            return None;
        }
        self.frames.push(frame);
        let signal = body(self, out);
        self.frames.pop();
        Some(signal)
    }

    /// The innermost frame.
    #[must_use]
    pub fn current(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Scope of the innermost frame.
    #[must_use]
    pub fn scope(&self) -> Option<Scope> {
        self.current().map(|frame| frame.scope)
    }

    /// Math mode flag of the innermost frame.
    #[must_use]
    pub fn in_math(&self) -> bool {
        self.current().is_some_and(|frame| frame.math)
    }

    /// Returns `true` if an environment called `name` is open.
    #[must_use]
    pub fn is_open(&self, name: &str) -> bool {
        self.frames
            .iter()
            .any(|frame| frame.environment && frame.name == name)
    }

    /// Returns `true` if any `\begin` environment is open.
    #[must_use]
    pub fn any_environment_open(&self) -> bool {
        self.frames.iter().any(|frame| frame.environment)
    }

    /// Record a structural error and annotate it at `out`.
    pub fn fail(&mut self, out: &mut Element, kind: ExpandErrorKind) -> Signal {
        let error = ExpandError { kind };
        out.push_element(Element::error(&error.to_string()));
        self.diagnostics.push(error);
        Signal::Done
    }

    /// Append a trace line when macro tracing is on.
    pub fn trace(&mut self, line: impl FnOnce() -> String) {
        if self.options.trace_macros {
            self.trace.push(line());
        }
    }

    fn expand_special(
        &mut self,
        special: Special,
        out: &mut Element,
        tokens: &mut Tokens,
    ) -> Signal {
        match special {
            Special::AlignTab => Signal::closed_by(CELL),
            Special::MathShift => {
                if self.closes_math(Scope::InlineMath) {
                    return Signal::closed_by(MATH_SHIFT);
                }
                let mut math = Element::inline("short-math");
                let frame = Frame::new("short-math", Scope::InlineMath, true);
                let Some(signal) =
                    self.nested(frame, out, |ex, _| ex.expand_plain(&mut math, tokens))
                else {
                    return Signal::Done;
                };
                let unterminated = ExpandErrorKind::UnterminatedMath {
                    delimiter: MATH_SHIFT.to_string(),
                };
                self.close_span(out, math, signal, MATH_SHIFT, unterminated)
            }
            Special::Subscript | Special::Superscript => self.expand_script(special, out, tokens),
        }
    }

    /// Returns `true` if the innermost frame, looking through `\left`
    /// spans, has `scope`. A math closer in that position ends the math
    /// and any open span reports itself unclosed.
    #[must_use]
    pub fn closes_math(&self, scope: Scope) -> bool {
        self.frames
            .iter()
            .rev()
            .find(|frame| frame.scope != Scope::MathSpan)
            .is_some_and(|frame| frame.scope == scope)
    }

    /// Attach a finished delimited span and interpret how it ended:
    /// `closer` is absorbed; running out of input or being cut short by
    /// another close signal is `unterminated`, and that signal passes on.
    pub fn close_span(
        &mut self,
        out: &mut Element,
        mut span: Element,
        signal: Signal,
        closer: &str,
        unterminated: ExpandErrorKind,
    ) -> Signal {
        match signal {
            Signal::ClosedBy(name) if name == closer => {
                out.push_element(span);
                Signal::Done
            }
            signal => {
                self.fail(&mut span, unterminated);
                out.push_element(span);
                signal
            }
        }
    }

    fn expand_script(
        &mut self,
        special: Special,
        out: &mut Element,
        tokens: &mut Tokens,
    ) -> Signal {
        let (tag, what) = if special == Special::Subscript {
            (Tag::Subscript, "subscript")
        } else {
            (Tag::Superscript, "superscript")
        };
        if !self.in_math() {
            let what = what.to_string();
            return self.fail(out, ExpandErrorKind::OutsideMathMode { what });
        }

        let mut script = Element::new(tag, what);
        tokens.skip_spacing();
        let signal = match tokens.next_token() {
            Some(Token::Group(group)) => {
                self.expand_isolated(&mut script, Tokens::from(group));
                Signal::Done
            }
            Some(Token::Command(name)) => self.dispatch_argument(&name, &mut script, tokens),
            Some(Token::Text(text)) => {
                let mut chars = text.chars();
                if let Some(first) = chars.next() {
                    script.push_text(&first.to_string());
                }
                let rest = chars.as_str();
                if !rest.is_empty() {
                    tokens.push_front(Token::text(rest));
                }
                Signal::Done
            }
            other => {
                if let Some(token) = other {
                    tokens.push_front(token);
                }
                let command = special.as_char().to_string();
                return self.fail(out, ExpandErrorKind::MissingArgument { command });
            }
        };
        out.push_element(script);
        signal
    }

    /// Dispatch a command used as a single-token argument. Macro bodies
    /// stay inside `out` instead of joining the surrounding stream.
    fn dispatch_argument(&mut self, name: &str, out: &mut Element, tokens: &mut Tokens) -> Signal {
        if let Some(Command::Macro(definition)) = self.commands.get(name) {
            match macros::instantiate(self, &definition, tokens) {
                Ok(body) => self.expand_isolated(out, Tokens::new(body)),
                Err(kind) => {
                    self.fail(out, kind);
                }
            }
            return Signal::Done;
        }
        self.dispatch(name, out, tokens)
    }

    /// Take one argument or report it missing for `command`.
    pub fn require_argument(
        &mut self,
        command: &str,
        out: &mut Element,
        tokens: &mut Tokens,
    ) -> Option<Group> {
        let argument = take_argument(tokens);
        if argument.is_none() {
            let command = command.to_string();
            self.fail(out, ExpandErrorKind::MissingArgument { command });
        }
        argument
    }
}
