//! Command table: built-in handlers plus user macros.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::LazyLock;

use crate::ast::Element;
use crate::builtins;
use crate::expander::{Expander, Signal};
use crate::macros::{self, Macro};
use crate::token::Tokens;

/// A built-in handler. Receives the command name it was invoked under,
/// the current append point and the remaining sibling tokens.
pub type Builtin = fn(&mut Expander, &str, &mut Element, &mut Tokens) -> Signal;

/// What a command name resolves to.
#[derive(Debug, Clone)]
pub enum Command {
    Builtin(Builtin),
    Macro(Rc<Macro>),
}

static BUILTINS: LazyLock<HashMap<&'static str, Builtin>> = LazyLock::new(|| {
    let mut table: HashMap<&'static str, Builtin> = HashMap::new();

    table.insert("begin", builtins::begin);
    table.insert("end", builtins::end);
    table.insert("item", builtins::item);
    table.insert("par", builtins::par);
    table.insert("\\", builtins::row);
    table.insert("[", builtins::display_math);
    table.insert("]", builtins::display_math_end);
    table.insert("left", builtins::left);
    table.insert("right", builtins::right);
    table.insert("label", builtins::label);
    table.insert("ref", builtins::reference);
    table.insert("autoref", builtins::reference);
    table.insert("frac", builtins::frac);
    table.insert("mathbb", builtins::letter_style);
    table.insert("mathcal", builtins::letter_style);
    table.insert("newcommand", macros::define);
    table.insert("renewcommand", macros::define);

    for name in builtins::SECTIONING {
        table.insert(name, builtins::section);
    }
    for name in builtins::STYLED {
        table.insert(name, builtins::styled);
    }

    table
});

/// Per-parse command table. User definitions shadow built-ins and live
/// only as long as the parse that made them.
#[derive(Debug, Default)]
pub struct CommandTable {
    defined: HashMap<String, Command>,
}

impl CommandTable {
    /// A table holding only the built-ins.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `name`, user definitions first.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Command> {
        self.defined
            .get(name)
            .cloned()
            .or_else(|| BUILTINS.get(name).map(|&handler| Command::Builtin(handler)))
    }

    /// Define or replace `name`.
    pub fn define(&mut self, name: &str, command: Command) {
        self.defined.insert(name.to_string(), command);
    }
}
