use std::cell::RefCell;
use std::cmp::Ordering;

use fxhash::FxHashMap;
use indexmap::IndexSet;
use kslice_syntax::ast::{CompareOp, Expr};
use kslice_syntax::parser::is_numeric_literal;
use scopeguard::defer;

use crate::graph::Graph;
use crate::option::{ConfigOption, Kind, Tristate};
use crate::resolve::Assignment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// What the option would get with no user input
    Natural,
    /// What the option could be raised to if the resolver were asked for it
    Enableable,
}

/// Evaluates expressions against a partial assignment. Values of unassigned options are
/// computed on demand and memoized for the lifetime of the evaluator, so an evaluator must not
/// outlive a change to the assignment.
pub struct Evaluator<'a> {
    graph: &'a Graph,
    assignment: &'a Assignment,
    prefer_modules: bool,
    visiting: RefCell<Vec<String>>,
    memo: RefCell<FxHashMap<(String, Mode), Tristate>>,
    literal_memo: RefCell<FxHashMap<String, String>>,
    cycles: RefCell<IndexSet<String>>,
}

fn parse_number(text: &str) -> Option<i128> {
    if !is_numeric_literal(text) {
        return None;
    }
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let value = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i128::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<i128>().ok()?,
    };
    Some(if negative { -value } else { value })
}

fn compare(op: CompareOp, lhs: &str, rhs: &str) -> bool {
    let ordering = match (parse_number(lhs), parse_number(rhs)) {
        (Some(l), Some(r)) => l.cmp(&r),
        _ => lhs.cmp(rhs),
    };

    match op {
        CompareOp::Equal => ordering == Ordering::Equal,
        CompareOp::NotEqual => ordering != Ordering::Equal,
        CompareOp::Less => ordering == Ordering::Less,
        CompareOp::LessEqual => ordering != Ordering::Greater,
        CompareOp::Greater => ordering == Ordering::Greater,
        CompareOp::GreaterEqual => ordering != Ordering::Less,
    }
}

impl<'a> Evaluator<'a> {
    pub fn new(graph: &'a Graph, assignment: &'a Assignment, prefer_modules: bool) -> Self {
        Evaluator {
            graph,
            assignment,
            prefer_modules,
            visiting: RefCell::new(vec![]),
            memo: RefCell::new(FxHashMap::default()),
            literal_memo: RefCell::new(FxHashMap::default()),
            cycles: RefCell::new(IndexSet::new()),
        }
    }

    /// Options found to depend on themselves so far, in discovery order.
    pub fn take_cycles(&self) -> IndexSet<String> {
        std::mem::take(&mut *self.cycles.borrow_mut())
    }

    /// Evaluates `expr` in a boolean context. In [`Mode::Enableable`] only atoms under an even
    /// number of negations use their enableable value; negated atoms and comparison operands
    /// always use the natural one.
    pub fn eval(&self, expr: &Expr, mode: Mode) -> Tristate {
        self.eval_polarity(expr, mode, true)
    }

    /// `None` conditions are always satisfied.
    pub fn eval_condition(&self, expr: Option<&Expr>, mode: Mode) -> Tristate {
        expr.map_or(Tristate::Y, |e| self.eval(e, mode))
    }

    fn eval_polarity(&self, expr: &Expr, mode: Mode, positive: bool) -> Tristate {
        match expr {
            Expr::Symbol(name) => {
                let atom_mode = if positive { mode } else { Mode::Natural };
                self.symbol_value(name, atom_mode)
            }
            Expr::Const(value) => Tristate::parse(value).unwrap_or(Tristate::N),
            Expr::Not(inner) => !self.eval_polarity(inner, mode, !positive),
            Expr::And(l, r) => self
                .eval_polarity(l, mode, positive)
                .min(self.eval_polarity(r, mode, positive)),
            Expr::Or(l, r) => self
                .eval_polarity(l, mode, positive)
                .max(self.eval_polarity(r, mode, positive)),
            Expr::Compare(op, l, r) => {
                if compare(*op, &self.operand(l), &self.operand(r)) {
                    Tristate::Y
                } else {
                    Tristate::N
                }
            }
        }
    }

    /// String form of a comparison operand.
    fn operand(&self, expr: &Expr) -> String {
        match expr {
            Expr::Const(value) => value.clone(),
            Expr::Symbol(name) => match self.graph.get(name) {
                Some(option) if option.kind.is_literal() => self.literal_value(option),
                _ => self.symbol_value(name, Mode::Natural).to_string(),
            },
            _ => self.eval(expr, Mode::Natural).to_string(),
        }
    }

    /// Runs `f` with `name` pushed on the in-progress stack. Re-entering an option already on
    /// the stack records a cycle and yields `None`.
    fn with_visiting<T, F: FnOnce() -> T>(&self, name: &str, f: F) -> Option<T> {
        if self.visiting.borrow().iter().any(|v| v == name) {
            tracing::trace!(option = name, "cycle while evaluating");
            self.cycles.borrow_mut().insert(name.to_string());
            return None;
        }

        self.visiting.borrow_mut().push(name.to_string());
        defer! {
            self.visiting.borrow_mut().pop();
        }

        Some(f())
    }

    pub fn symbol_value(&self, name: &str, mode: Mode) -> Tristate {
        let Some(option) = self.graph.get(name) else {
            return Tristate::N;
        };
        if !option.kind.is_tristate_like() {
            return Tristate::N;
        }
        if let Some(value) = self.assignment.get(name) {
            return value.as_tristate();
        }

        let key = (name.to_string(), mode);
        if let Some(value) = self.memo.borrow().get(&key) {
            return *value;
        }

        let value = self
            .with_visiting(name, || match mode {
                Mode::Natural => self.natural_value(option),
                Mode::Enableable => self.enableable_value(option),
            })
            .unwrap_or(Tristate::N);

        self.memo.borrow_mut().insert(key, value);
        value
    }

    /// Value of an unassigned bool/tristate option with no user input. Selects count from
    /// selectors that are assigned or naturally on.
    pub fn natural_value(&self, option: &ConfigOption) -> Tristate {
        let dep = self.eval_condition(option.depends_on.as_ref(), Mode::Natural);
        if dep == Tristate::N {
            return Tristate::N;
        }

        let from_default = option
            .defaults
            .iter()
            .find_map(|d| {
                let guard = self.eval_condition(d.guard.as_ref(), Mode::Natural);
                guard
                    .is_enabled()
                    .then(|| self.eval(&d.value, Mode::Natural).min(guard))
            })
            .unwrap_or(Tristate::N)
            .min(dep);

        let from_selects = self
            .graph
            .selectors_of(&option.name)
            .filter_map(|selector| {
                let value = self.symbol_value(selector, Mode::Natural);
                if value == Tristate::N {
                    return None;
                }
                let guard = self
                    .graph
                    .get(selector)?
                    .selects
                    .iter()
                    .filter(|s| s.target == option.name)
                    .map(|s| self.eval_condition(s.guard.as_ref(), Mode::Natural))
                    .max()?;
                Some(value.min(guard))
            })
            .max()
            .unwrap_or(Tristate::N);

        from_default.max(from_selects).for_kind(option.kind)
    }

    /// What the resolver would assign if asked. Hidden options can't be raised above their
    /// natural value.
    pub fn enableable_value(&self, option: &ConfigOption) -> Tristate {
        let natural = self.natural_value(option);
        if !option.prompt_visible() {
            return natural;
        }

        let dep = self.eval_condition(option.depends_on.as_ref(), Mode::Enableable);
        natural.max(self.preferred_value(option.kind, dep))
    }

    /// Value the resolver assigns to an option whose dependencies evaluate to `dep`.
    pub fn preferred_value(&self, kind: Kind, dep: Tristate) -> Tristate {
        let preferred = if kind == Kind::Tristate && self.prefer_modules {
            Tristate::M
        } else {
            Tristate::Y
        };
        preferred.min(dep).for_kind(kind)
    }

    /// Current literal of a string/int/hex option: its assignment if any, otherwise its first
    /// satisfied default when its dependencies hold, otherwise its zero value.
    pub fn literal_value(&self, option: &ConfigOption) -> String {
        if let Some(value) = self.assignment.get(&option.name) {
            return value.to_string();
        }
        if let Some(value) = self.literal_memo.borrow().get(&option.name) {
            return value.clone();
        }

        let value = self
            .with_visiting(&option.name, || {
                let dep = self.eval_condition(option.depends_on.as_ref(), Mode::Natural);
                if dep.is_enabled() {
                    self.default_literal(option)
                } else {
                    self.zero_literal(option)
                }
            })
            .unwrap_or_else(|| self.zero_literal(option));

        self.literal_memo
            .borrow_mut()
            .insert(option.name.clone(), value.clone());
        value
    }

    /// First satisfied default of a string/int/hex option, else its zero value.
    pub fn default_literal(&self, option: &ConfigOption) -> String {
        option
            .defaults
            .iter()
            .find(|d| {
                self.eval_condition(d.guard.as_ref(), Mode::Natural)
                    .is_enabled()
            })
            .map(|d| self.operand(&d.value))
            .unwrap_or_else(|| self.zero_literal(option))
    }

    /// `""` for strings; the low bound of the first active range, else `0`/`0x0`, for numbers.
    pub fn zero_literal(&self, option: &ConfigOption) -> String {
        let range_low = option
            .ranges
            .iter()
            .find(|r| {
                self.eval_condition(r.guard.as_ref(), Mode::Natural)
                    .is_enabled()
            })
            .map(|r| self.operand(&r.low));

        match option.kind {
            Kind::Int => range_low.unwrap_or_else(|| String::from("0")),
            Kind::Hex => range_low.unwrap_or_else(|| String::from("0x0")),
            _ => String::new(),
        }
    }

    /// Unassigned options that `expr` relies on to be enabled. Conjunctions need every side;
    /// disjunctions need the sides that already hold, or failing that the first side that could
    /// be enabled.
    pub fn support(&self, expr: &Expr) -> Vec<String> {
        let mut ret = vec![];
        self.collect_support(expr, &mut ret);
        ret
    }

    fn collect_support(&self, expr: &Expr, out: &mut Vec<String>) {
        match expr {
            Expr::Symbol(name) => {
                if !self.assignment.contains_key(name)
                    && self.symbol_value(name, Mode::Enableable).is_enabled()
                    && !out.contains(name)
                {
                    out.push(name.clone());
                }
            }
            Expr::And(l, r) => {
                self.collect_support(l, out);
                self.collect_support(r, out);
            }
            Expr::Or(l, r) => {
                let l_holds = self.eval(l, Mode::Natural).is_enabled();
                let r_holds = self.eval(r, Mode::Natural).is_enabled();
                if l_holds || r_holds {
                    if l_holds {
                        self.collect_support(l, out);
                    }
                    if r_holds {
                        self.collect_support(r, out);
                    }
                } else if self.eval(l, Mode::Enableable).is_enabled() {
                    self.collect_support(l, out);
                } else {
                    self.collect_support(r, out);
                }
            }
            Expr::Const(_) | Expr::Not(_) | Expr::Compare(..) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use kslice_syntax::ast::{CompareOp, Expr};
    use maplit::btreemap;
    use pretty_assertions::assert_eq;

    use super::{compare, Evaluator, Mode};
    use crate::builder::{build_graph, BuildOptions, MemorySourceProvider};
    use crate::graph::Graph;
    use crate::option::{Tristate, Value};
    use crate::resolve::Assignment;

    fn graph(kconfig: &str) -> Graph {
        let provider = MemorySourceProvider::new().with_file("Kconfig", kconfig);
        build_graph(&provider, "Kconfig", &BuildOptions::default()).unwrap()
    }

    fn sym(name: &str) -> Expr {
        Expr::symbol(name)
    }

    const OPTIONS: &str = r#"
config ON
	bool
	default y

config OFF
	bool "off by default"

config MOD
	tristate "module"
	default m

config HIDDEN
	bool

config NEEDS_OFF
	tristate "needs off"
	depends on OFF

config COUNT
	int "count"
	range 2 8

config NAME
	string "name"
	default "linux"
"#;

    #[test]
    fn tristate_logic() {
        let g = graph(OPTIONS);
        let a = Assignment::new();
        let ev = Evaluator::new(&g, &a, true);

        assert_eq!(ev.eval(&sym("ON"), Mode::Natural), Tristate::Y);
        assert_eq!(ev.eval(&sym("MOD"), Mode::Natural), Tristate::M);
        assert_eq!(ev.eval(&sym("ON").and(sym("MOD")), Mode::Natural), Tristate::M);
        assert_eq!(ev.eval(&sym("OFF").or(sym("MOD")), Mode::Natural), Tristate::M);
        assert_eq!(ev.eval(&sym("MOD").negate(), Mode::Natural), Tristate::M);
        assert_eq!(ev.eval(&sym("OFF").negate(), Mode::Natural), Tristate::Y);
        assert_eq!(ev.eval(&Expr::constant("m"), Mode::Natural), Tristate::M);
        assert_eq!(ev.eval(&Expr::constant("0x10"), Mode::Natural), Tristate::N);
        // Literal options are n in a boolean context
        assert_eq!(ev.eval(&sym("NAME"), Mode::Natural), Tristate::N);
    }

    #[test]
    fn enableable_values_follow_polarity() {
        let g = graph(OPTIONS);
        let a = Assignment::new();
        let ev = Evaluator::new(&g, &a, true);

        assert_eq!(ev.eval(&sym("OFF"), Mode::Enableable), Tristate::Y);
        assert_eq!(ev.eval(&sym("HIDDEN"), Mode::Enableable), Tristate::N);
        // Negated atoms keep their natural value
        assert_eq!(ev.eval(&sym("OFF").negate(), Mode::Enableable), Tristate::Y);
        assert_eq!(
            ev.eval(&sym("OFF").negate().negate(), Mode::Enableable),
            Tristate::Y
        );
        // Tristates are raised to m when modules are preferred, clamped by their dependency
        assert_eq!(ev.eval(&sym("NEEDS_OFF"), Mode::Enableable), Tristate::M);
        assert_eq!(ev.eval(&sym("NEEDS_OFF"), Mode::Natural), Tristate::N);

        let ev = Evaluator::new(&g, &a, false);
        assert_eq!(ev.eval(&sym("NEEDS_OFF"), Mode::Enableable), Tristate::Y);
    }

    #[test]
    fn assignments_take_precedence() {
        let g = graph(OPTIONS);
        let a = btreemap! {
            String::from("OFF") => Value::Tristate(Tristate::Y),
            String::from("ON") => Value::Tristate(Tristate::M),
            String::from("COUNT") => Value::literal("4"),
        };
        let ev = Evaluator::new(&g, &a, true);

        assert_eq!(ev.eval(&sym("OFF"), Mode::Natural), Tristate::Y);
        assert_eq!(ev.eval(&sym("ON"), Mode::Natural), Tristate::M);
        assert_eq!(ev.eval(&sym("NEEDS_OFF"), Mode::Natural), Tristate::N);
        assert_eq!(ev.eval(&sym("NEEDS_OFF"), Mode::Enableable), Tristate::M);

        let count_is_4 = Expr::Compare(
            CompareOp::Equal,
            Box::new(sym("COUNT")),
            Box::new(Expr::constant("4")),
        );
        assert_eq!(ev.eval(&count_is_4, Mode::Natural), Tristate::Y);
    }

    #[test]
    fn literal_defaults_and_zero_values() {
        let g = graph(OPTIONS);
        let a = Assignment::new();
        let ev = Evaluator::new(&g, &a, true);

        assert_eq!(ev.literal_value(g.get("NAME").unwrap()), "linux");
        assert_eq!(ev.literal_value(g.get("COUNT").unwrap()), "2");
    }

    #[test]
    fn comparisons() {
        assert!(compare(CompareOp::Equal, "0x10", "16"));
        assert!(compare(CompareOp::Less, "9", "10"));
        assert!(compare(CompareOp::Greater, "abc", "abb"));
        assert!(compare(CompareOp::GreaterEqual, "-1", "-0x1"));
        assert!(compare(CompareOp::NotEqual, "y", "m"));
        // "9" > "10" lexically, but both are numbers
        assert!(!compare(CompareOp::Greater, "9", "10"));
    }

    #[test]
    fn cycles_evaluate_to_n() {
        let g = graph(
            r#"
config A
	bool
	default B

config B
	bool
	default A
"#,
        );
        let a = Assignment::new();
        let ev = Evaluator::new(&g, &a, true);

        assert_eq!(ev.eval(&sym("A"), Mode::Natural), Tristate::N);
        assert_eq!(
            ev.take_cycles().into_iter().collect::<Vec<_>>(),
            vec![String::from("A")]
        );
    }

    #[test]
    fn support_prefers_satisfied_disjunctions() {
        let g = graph(OPTIONS);
        let a = Assignment::new();
        let ev = Evaluator::new(&g, &a, true);

        assert_eq!(ev.support(&sym("ON").or(sym("OFF"))), vec!["ON"]);
        assert_eq!(ev.support(&sym("ON").or(sym("MOD"))), vec!["ON", "MOD"]);
        assert_eq!(ev.support(&sym("HIDDEN").or(sym("OFF"))), vec!["OFF"]);
        assert_eq!(
            ev.support(&sym("OFF").and(sym("NEEDS_OFF"))),
            vec!["OFF", "NEEDS_OFF"]
        );
        assert!(ev.support(&sym("OFF").negate()).is_empty());
    }
}
