use std::fmt::Formatter;
use std::ops::Not;
use std::path::PathBuf;

use derive_more::Display;
use kslice_syntax::ast::{Expr, SymbolType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Kind {
    #[display("bool")]
    Bool,
    #[display("tristate")]
    Tristate,
    #[display("string")]
    String,
    #[display("int")]
    Int,
    #[display("hex")]
    Hex,
    /// Placeholder for a symbol that is referenced but never declared
    #[display("unknown")]
    Unknown,
}

impl Kind {
    /// Bool and tristate options carry a tristate value; everything else carries a literal.
    pub fn is_tristate_like(&self) -> bool {
        matches!(self, Kind::Bool | Kind::Tristate)
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Kind::String | Kind::Int | Kind::Hex)
    }
}

impl From<SymbolType> for Kind {
    fn from(t: SymbolType) -> Self {
        match t {
            SymbolType::Bool => Kind::Bool,
            SymbolType::Tristate => Kind::Tristate,
            SymbolType::String => Kind::String,
            SymbolType::Int => Kind::Int,
            SymbolType::Hex => Kind::Hex,
        }
    }
}

/// `n < m < y`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub enum Tristate {
    #[display("n")]
    N,
    #[display("m")]
    M,
    #[display("y")]
    Y,
}

impl Tristate {
    pub fn parse(text: &str) -> Option<Tristate> {
        match text {
            "n" => Some(Tristate::N),
            "m" => Some(Tristate::M),
            "y" => Some(Tristate::Y),
            _ => None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        *self != Tristate::N
    }

    /// Booleans have no module state; `m` rounds up.
    pub fn for_kind(self, kind: Kind) -> Tristate {
        match (kind, self) {
            (Kind::Bool, Tristate::M) => Tristate::Y,
            _ => self,
        }
    }
}

impl Not for Tristate {
    type Output = Tristate;

    fn not(self) -> Tristate {
        match self {
            Tristate::N => Tristate::Y,
            Tristate::M => Tristate::M,
            Tristate::Y => Tristate::N,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Tristate(Tristate),
    Literal(String),
}

impl Value {
    pub fn literal<S: Into<String>>(s: S) -> Value {
        Value::Literal(s.into())
    }

    /// Truth of the value in a boolean context. Literals are on once assigned.
    pub fn as_tristate(&self) -> Tristate {
        match self {
            Value::Tristate(t) => *t,
            Value::Literal(_) => Tristate::Y,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Tristate(t) => write!(f, "{t}"),
            Value::Literal(s) => f.write_str(s),
        }
    }
}

impl From<Tristate> for Value {
    fn from(t: Tristate) -> Self {
        Value::Tristate(t)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display("{}:{line}", file.display())]
pub struct Location {
    pub file: PathBuf,
    pub line: usize,
}

/// `select`/`imply` edge with its guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub target: String,
    pub guard: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultValue {
    pub value: Expr,
    pub guard: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    pub low: Expr,
    pub high: Expr,
    pub guard: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub guard: Option<Expr>,
}

/// One configuration symbol, merged across all of its definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigOption {
    pub name: String,
    pub kind: Kind,
    /// `None` means always satisfiable
    pub depends_on: Option<Expr>,
    pub selects: Vec<Activation>,
    pub implies: Vec<Activation>,
    pub defaults: Vec<DefaultValue>,
    pub ranges: Vec<Range>,
    pub prompt: Option<Prompt>,
    /// Index into [`crate::graph::Graph::choices`]
    pub choice: Option<usize>,
    pub locations: Vec<Location>,
}

impl ConfigOption {
    pub(crate) fn placeholder<S: Into<String>>(name: S) -> ConfigOption {
        ConfigOption {
            name: name.into(),
            kind: Kind::Unknown,
            depends_on: None,
            selects: vec![],
            implies: vec![],
            defaults: vec![],
            ranges: vec![],
            prompt: None,
            choice: None,
            locations: vec![],
        }
    }

    pub fn prompt_visible(&self) -> bool {
        self.prompt.is_some()
    }

    /// Every option name this option's expressions and activations refer to.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        let exprs = self
            .depends_on
            .iter()
            .chain(self.selects.iter().chain(&self.implies).filter_map(|a| a.guard.as_ref()))
            .chain(
                self.defaults
                    .iter()
                    .flat_map(|d| std::iter::once(&d.value).chain(&d.guard)),
            )
            .chain(self.ranges.iter().flat_map(|r| {
                [&r.low, &r.high].into_iter().chain(&r.guard)
            }))
            .chain(self.prompt.iter().filter_map(|p| p.guard.as_ref()));

        self.selects
            .iter()
            .chain(&self.implies)
            .map(|a| a.target.as_str())
            .chain(exprs.flat_map(|e| e.symbols()))
    }
}

#[cfg(test)]
mod tests {
    use super::{Kind, Tristate};

    #[test]
    fn tristate_algebra() {
        assert!(Tristate::N < Tristate::M && Tristate::M < Tristate::Y);
        assert_eq!(!Tristate::Y, Tristate::N);
        assert_eq!(!Tristate::N, Tristate::Y);
        assert_eq!(!Tristate::M, Tristate::M);
        assert_eq!(Tristate::M.min(Tristate::Y), Tristate::M);
        assert_eq!(Tristate::M.max(Tristate::N), Tristate::M);
    }

    #[test]
    fn booleans_round_modules_up() {
        assert_eq!(Tristate::M.for_kind(Kind::Bool), Tristate::Y);
        assert_eq!(Tristate::M.for_kind(Kind::Tristate), Tristate::M);
        assert_eq!(Tristate::N.for_kind(Kind::Bool), Tristate::N);
    }
}
