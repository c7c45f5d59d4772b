//! Literal replacements for symbol commands and the blackboard and
//! calligraphic letter styles.

/// Commands replaced by a literal string.
const SYMBOLS: &[(&str, &str)] = &[
    ("alpha", "\u{3b1}"),
    ("beta", "\u{3b2}"),
    ("gamma", "\u{3b3}"),
    ("Gamma", "\u{393}"),
    ("delta", "\u{3b4}"),
    ("Delta", "\u{394}"),
    ("epsilon", "\u{3f5}"),
    ("varepsilon", "\u{3b5}"),
    ("zeta", "\u{3b6}"),
    ("eta", "\u{3b7}"),
    ("theta", "\u{3b8}"),
    ("Theta", "\u{398}"),
    ("iota", "\u{3b9}"),
    ("kappa", "\u{3ba}"),
    ("lambda", "\u{3bb}"),
    ("Lambda", "\u{39b}"),
    ("mu", "\u{3bc}"),
    ("nu", "\u{3bd}"),
    ("xi", "\u{3be}"),
    ("Xi", "\u{39e}"),
    ("pi", "\u{3c0}"),
    ("Pi", "\u{3a0}"),
    ("rho", "\u{3c1}"),
    ("sigma", "\u{3c3}"),
    ("Sigma", "\u{3a3}"),
    ("tau", "\u{3c4}"),
    ("upsilon", "\u{3c5}"),
    ("phi", "\u{3d5}"),
    ("varphi", "\u{3c6}"),
    ("Phi", "\u{3a6}"),
    ("chi", "\u{3c7}"),
    ("psi", "\u{3c8}"),
    ("Psi", "\u{3a8}"),
    ("omega", "\u{3c9}"),
    ("Omega", "\u{3a9}"),
    ("sum", "\u{3a3}"),
    ("prod", "\u{220f}"),
    ("int", "\u{222b}"),
    ("infty", "\u{221e}"),
    ("partial", "\u{2202}"),
    ("nabla", "\u{2207}"),
    ("times", "\u{d7}"),
    ("cdot", "\u{22c5}"),
    ("pm", "\u{b1}"),
    ("in", "\u{2208}"),
    ("notin", "\u{2209}"),
    ("subset", "\u{2282}"),
    ("subseteq", "\u{2286}"),
    ("cup", "\u{222a}"),
    ("cap", "\u{2229}"),
    ("emptyset", "\u{2205}"),
    ("forall", "\u{2200}"),
    ("exists", "\u{2203}"),
    ("neg", "\u{ac}"),
    ("wedge", "\u{2227}"),
    ("vee", "\u{2228}"),
    ("leq", "\u{2264}"),
    ("geq", "\u{2265}"),
    ("neq", "\u{2260}"),
    ("approx", "\u{2248}"),
    ("equiv", "\u{2261}"),
    ("prec", "\u{227a}"),
    ("succ", "\u{227b}"),
    ("sim", "~"),
    ("rightarrow", "\u{2192}"),
    ("leftarrow", "\u{2190}"),
    ("Rightarrow", "\u{21d2}"),
    ("Leftarrow", "\u{21d0}"),
    ("leftrightarrow", "\u{2194}"),
    ("mapsto", "\u{21a6}"),
    ("to", "\u{2192}"),
    ("ldots", "\u{2026}"),
    ("cdots", "\u{22ef}"),
    ("lbrace", "{"),
    ("rbrace", "}"),
    ("langle", "\u{27e8}"),
    ("rangle", "\u{27e9}"),
    ("quad", "\u{2003}"),
    ("qquad", "\u{2003}\u{2003}"),
    (" ", " "),
    (",", "\u{2009}"),
    ("{", "{"),
    ("}", "}"),
    ("%", "%"),
    ("$", "$"),
    ("&", "&"),
    ("#", "#"),
    ("_", "_"),
];

/// Replacement text for a symbol command.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static str> {
    SYMBOLS
        .iter()
        .find_map(|&(key, value)| (key == name).then_some(value))
}

/// A letter style with holes in its Unicode block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LetterStyle {
    /// `\mathbb`
    DoubleStruck,
    /// `\mathcal`
    Script,
}

impl LetterStyle {
    /// Style for a command name.
    #[must_use]
    pub fn from_command(name: &str) -> Option<Self> {
        match name {
            "mathbb" => Some(Self::DoubleStruck),
            "mathcal" => Some(Self::Script),
            _ => None,
        }
    }

    /// Letters that live outside the Mathematical Alphanumeric block.
    const fn exceptions(self) -> &'static [(char, char)] {
        match self {
            Self::DoubleStruck => &[
                ('C', '\u{2102}'),
                ('H', '\u{210d}'),
                ('N', '\u{2115}'),
                ('P', '\u{2119}'),
                ('Q', '\u{211a}'),
                ('R', '\u{211d}'),
                ('Z', '\u{2124}'),
            ],
            Self::Script => &[
                ('B', '\u{212c}'),
                ('E', '\u{2130}'),
                ('F', '\u{2131}'),
                ('H', '\u{210b}'),
                ('I', '\u{2110}'),
                ('L', '\u{2112}'),
                ('M', '\u{2133}'),
                ('R', '\u{211b}'),
                ('e', '\u{212f}'),
                ('g', '\u{210a}'),
                ('o', '\u{2134}'),
            ],
        }
    }

    /// Code point of capital A in this style.
    const fn base(self) -> u32 {
        match self {
            Self::DoubleStruck => 0x1d538,
            Self::Script => 0x1d49c,
        }
    }

    /// Map one character; anything but an ASCII letter is kept.
    #[must_use]
    pub fn map_char(self, ch: char) -> char {
        if let Some(&(_, mapped)) = self.exceptions().iter().find(|(from, _)| *from == ch) {
            return mapped;
        }
        let offset = match ch {
            'A'..='Z' => u32::from(ch) - u32::from('A'),
            'a'..='z' => 26 + u32::from(ch) - u32::from('a'),
            _ => return ch,
        };
        char::from_u32(self.base() + offset).unwrap_or(ch)
    }

    /// Map a whole string.
    #[must_use]
    pub fn apply(self, text: &str) -> String {
        text.chars().map(|ch| self.map_char(ch)).collect()
    }
}
