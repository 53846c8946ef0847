use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl CompareOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Equal => "=",
            CompareOp::NotEqual => "!=",
            CompareOp::Less => "<",
            CompareOp::LessEqual => "<=",
            CompareOp::Greater => ">",
            CompareOp::GreaterEqual => ">=",
        }
    }
}

/// Dependency, guard and default expressions. Never evaluated by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// Reference to another option by name
    Symbol(String),
    /// `y`/`m`/`n`, numbers, quoted strings and opaque `$(...)` references
    Const(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Compare(CompareOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn symbol<S: Into<String>>(name: S) -> Expr {
        Expr::Symbol(name.into())
    }

    pub fn constant<S: Into<String>>(value: S) -> Expr {
        Expr::Const(value.into())
    }

    pub fn yes() -> Expr {
        Expr::Const(String::from("y"))
    }

    pub fn and(self, other: Expr) -> Expr {
        Expr::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Expr) -> Expr {
        Expr::Or(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Expr {
        Expr::Not(Box::new(self))
    }

    /// Left-nested `&&` of every expression, or `None` for an empty input.
    pub fn conjunction<I: IntoIterator<Item = Expr>>(exprs: I) -> Option<Expr> {
        exprs.into_iter().reduce(Expr::and)
    }

    /// ANDs `extra` onto an optional expression.
    pub fn and_optional(base: Option<Expr>, extra: Option<&Expr>) -> Option<Expr> {
        match (base, extra) {
            (Some(base), Some(extra)) => Some(base.and(extra.clone())),
            (None, Some(extra)) => Some(extra.clone()),
            (base, None) => base,
        }
    }

    /// Every option name referenced anywhere in the expression.
    pub fn symbols(&self) -> BTreeSet<&str> {
        let mut ret = BTreeSet::new();
        self.visit_symbols(true, &mut |name, _| {
            ret.insert(name);
        });
        ret
    }

    /// Option names that appear outside of any negation or comparison. Turning one of these on
    /// can only make the expression stronger.
    pub fn positive_symbols(&self) -> BTreeSet<&str> {
        let mut ret = BTreeSet::new();
        self.visit_symbols(true, &mut |name, positive| {
            if positive {
                ret.insert(name);
            }
        });
        ret
    }

    fn visit_symbols<'a, F: FnMut(&'a str, bool)>(&'a self, positive: bool, f: &mut F) {
        match self {
            Expr::Symbol(name) => f(name, positive),
            Expr::Const(_) => {}
            Expr::Not(inner) => inner.visit_symbols(!positive, f),
            Expr::And(l, r) | Expr::Or(l, r) => {
                l.visit_symbols(positive, f);
                r.visit_symbols(positive, f);
            }
            Expr::Compare(_, l, r) => {
                l.visit_symbols(false, f);
                r.visit_symbols(false, f);
            }
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Or(..) => 1,
            Expr::And(..) => 2,
            Expr::Not(_) => 3,
            Expr::Compare(..) => 4,
            Expr::Symbol(_) | Expr::Const(_) => 5,
        }
    }

    fn fmt_child(&self, child: &Expr, f: &mut Formatter<'_>) -> std::fmt::Result {
        if child.precedence() < self.precedence() {
            write!(f, "({child})")
        } else {
            write!(f, "{child}")
        }
    }
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Symbol(name) => f.write_str(name),
            Expr::Const(value) if value.starts_with("$(") => f.write_str(value),
            Expr::Const(value) if needs_quotes(value) => write!(f, "\"{value}\""),
            Expr::Const(value) => f.write_str(value),
            Expr::Not(inner) => {
                f.write_str("!")?;
                self.fmt_child(inner, f)
            }
            Expr::And(l, r) => {
                self.fmt_child(l, f)?;
                f.write_str(" && ")?;
                self.fmt_child(r, f)
            }
            Expr::Or(l, r) => {
                self.fmt_child(l, f)?;
                f.write_str(" || ")?;
                self.fmt_child(r, f)
            }
            Expr::Compare(op, l, r) => write!(f, "{l}{}{r}", op.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolType {
    Bool,
    Tristate,
    String,
    Int,
    Hex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub condition: Option<Expr>,
}

/// `select`/`imply` target with its optional `if` guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseDependency {
    pub target: String,
    pub condition: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultValue {
    pub value: Expr,
    pub condition: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    pub low: Expr,
    pub high: Expr,
    pub condition: Option<Expr>,
}

/// Attribute lines shared by `config`, `menuconfig` and `choice` entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    pub symbol_type: Option<SymbolType>,
    pub prompt: Option<Prompt>,
    pub depends: Vec<Expr>,
    pub selects: Vec<ReverseDependency>,
    pub implies: Vec<ReverseDependency>,
    pub defaults: Vec<DefaultValue>,
    pub ranges: Vec<Range>,
    pub has_help: bool,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub name: String,
    pub line: usize,
    pub is_menuconfig: bool,
    pub properties: Properties,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// `source`: path relative to the tree root
    Source,
    /// `rsource`: path relative to the including file
    Relative,
    /// `osource`: like `source`, silently skipped when missing
    Optional,
    /// `orsource`
    OptionalRelative,
}

impl SourceKind {
    pub fn is_relative(&self) -> bool {
        matches!(self, SourceKind::Relative | SourceKind::OptionalRelative)
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, SourceKind::Optional | SourceKind::OptionalRelative)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentOp {
    /// `:=`, expanded immediately
    Immediate,
    /// `=`, expanded on use
    Recursive,
    /// `+=`
    Append,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Config(ConfigEntry),
    Choice {
        name: Option<String>,
        line: usize,
        properties: Properties,
        items: Vec<Item>,
    },
    Menu {
        title: String,
        line: usize,
        depends: Vec<Expr>,
        visible: Vec<Expr>,
        items: Vec<Item>,
    },
    If {
        condition: Expr,
        line: usize,
        items: Vec<Item>,
    },
    Source {
        kind: SourceKind,
        path: String,
        line: usize,
    },
    Comment {
        text: String,
        line: usize,
        depends: Vec<Expr>,
    },
    MainMenu {
        title: String,
        line: usize,
    },
    /// Preprocessor variable definition, e.g. `SRCARCH := x86`
    Assignment {
        name: String,
        op: AssignmentOp,
        value: String,
        line: usize,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Root {
    pub items: Vec<Item>,
}

#[cfg(test)]
mod tests {
    use super::{CompareOp, Expr};
    use pretty_assertions::assert_eq;

    #[test]
    fn display_adds_only_needed_parentheses() {
        let e = Expr::symbol("A")
            .or(Expr::symbol("B"))
            .and(Expr::symbol("C").negate());
        assert_eq!(e.to_string(), "(A || B) && !C");

        let e = Expr::symbol("A").and(Expr::symbol("B")).or(Expr::symbol("C"));
        assert_eq!(e.to_string(), "A && B || C");

        let e = Expr::Compare(
            CompareOp::NotEqual,
            Box::new(Expr::symbol("ARCH")),
            Box::new(Expr::constant("x86 64")),
        )
        .negate();
        assert_eq!(e.to_string(), "!ARCH!=\"x86 64\"");
    }

    #[test]
    fn positive_symbols_skip_negations_and_comparisons() {
        let e = Expr::symbol("A")
            .and(Expr::symbol("B").negate())
            .and(Expr::symbol("C").negate().negate())
            .or(Expr::Compare(
                CompareOp::Equal,
                Box::new(Expr::symbol("D")),
                Box::new(Expr::constant("y")),
            ));

        assert_eq!(
            e.positive_symbols().into_iter().collect::<Vec<_>>(),
            vec!["A", "C"]
        );
        assert_eq!(
            e.symbols().into_iter().collect::<Vec<_>>(),
            vec!["A", "B", "C", "D"]
        );
    }

    #[test]
    fn conjunction_of_nothing_is_none() {
        assert_eq!(Expr::conjunction(Vec::<Expr>::new()), None);
        assert_eq!(
            Expr::conjunction(vec![Expr::symbol("A"), Expr::symbol("B")]),
            Some(Expr::symbol("A").and(Expr::symbol("B")))
        );
    }
}
