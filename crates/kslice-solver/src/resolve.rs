use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use derive_builder::Builder;
use fxhash::FxHashSet;
use indexmap::IndexSet;
use kslice_syntax::ast::Expr;
use kslice_util::fifo_heap::FifoHeap;
use tracing::{debug, trace};

use crate::diagnostics::Diagnostic;
use crate::errors::ResolveError;
use crate::evaluate::{Evaluator, Mode};
use crate::graph::Graph;
use crate::option::{ConfigOption, Kind, Tristate, Value};

/// Resolved values by option name. Options resolved to `n` are never present.
pub type Assignment = BTreeMap<String, Value>;

#[derive(Debug, Clone, Builder)]
#[builder(default)]
pub struct ResolveOptions {
    /// Enable tristates the resolver turns on by itself as `m` rather than `y`
    pub prefer_modules: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions {
            prefer_modules: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub assignment: Assignment,
    /// Seeds whose dependencies could not be met
    pub blocked: BTreeSet<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Resolution {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.assignment.get(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskKind {
    Seed,
    /// Pinning a symbol an assigned option relies on
    Dependency,
    Imply,
    /// Forced; bypasses the target's own dependencies
    Select,
}

#[derive(Debug, Clone)]
struct Task {
    name: String,
    kind: TaskKind,
    /// Minimum value a `Select` task demands
    required: Tristate,
    origin: Option<String>,
}

impl Task {
    fn new(name: &str, kind: TaskKind, required: Tristate, origin: Option<&str>) -> Task {
        Task {
            name: name.to_string(),
            kind,
            required,
            origin: origin.map(str::to_string),
        }
    }
}

// Tasks are popped by name; the queue breaks ties in insertion order.
impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Task {}

impl PartialOrd for Task {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Task {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

fn describe(expr: Option<&Expr>) -> String {
    expr.map_or_else(|| String::from("y"), ToString::to_string)
}

struct Resolver<'g> {
    graph: &'g Graph,
    options: &'g ResolveOptions,
    assignment: Assignment,
    blocked: BTreeSet<String>,
    /// Non-seed options found blocked; retried by the rescan once their dependencies hold
    refused: FxHashSet<String>,
    diagnostics: IndexSet<Diagnostic>,
    queue: FifoHeap<Task>,
}

impl<'g> Resolver<'g> {
    fn new(graph: &'g Graph, options: &'g ResolveOptions) -> Self {
        Resolver {
            graph,
            options,
            assignment: Assignment::new(),
            blocked: BTreeSet::new(),
            refused: FxHashSet::default(),
            diagnostics: IndexSet::new(),
            queue: FifoHeap::new(),
        }
    }

    fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(self.graph, &self.assignment, self.options.prefer_modules)
    }

    fn note_cycles(&mut self, cycles: IndexSet<String>) {
        for option in cycles {
            self.diagnostics.insert(Diagnostic::CycleDetected { option });
        }
    }

    fn run(mut self, seeds: BTreeSet<String>) -> Result<Resolution, ResolveError> {
        let limit = self.graph.len() * 4 + seeds.len() + 16;

        for name in &seeds {
            if self.graph.contains(name) {
                self.queue
                    .push(Task::new(name, TaskKind::Seed, Tristate::Y, None));
            } else {
                self.diagnostics
                    .insert(Diagnostic::UnknownSeed { name: name.clone() });
            }
        }

        // Only pops that change the assignment count towards the limit
        let mut steps = 0usize;
        let mut rescanned = false;
        loop {
            let before = steps;
            while let Some(task) = self.queue.pop() {
                if self.process(task) {
                    steps += 1;
                    if steps > limit {
                        return Err(ResolveError::IterationLimit { limit });
                    }
                }
            }
            if rescanned && steps == before {
                break;
            }

            // Guards and dependencies that only became true after something else was assigned
            if !self.rescan() {
                break;
            }
            rescanned = true;
        }

        self.check_choices();

        debug!(
            seeds = seeds.len(),
            assigned = self.assignment.len(),
            blocked = self.blocked.len(),
            steps,
            "resolution finished"
        );

        Ok(Resolution {
            assignment: self.assignment,
            blocked: self.blocked,
            diagnostics: self.diagnostics.into_iter().collect(),
        })
    }

    /// Returns whether the assignment changed.
    fn process(&mut self, task: Task) -> bool {
        let graph = self.graph;
        let Some(option) = graph.get(&task.name) else {
            return false;
        };
        let current = self.assignment.get(&task.name).map(Value::as_tristate);
        trace!(option = %task.name, kind = ?task.kind, ?current, "task");

        if option.kind == Kind::Unknown {
            self.block(&task, "undeclared symbol");
            return false;
        }

        match task.kind {
            TaskKind::Select => {
                if current.is_some_and(|c| c >= task.required) {
                    return false;
                }

                let (dep, value, cycles) = {
                    let ev = self.evaluator();
                    let dep = ev.eval_condition(option.depends_on.as_ref(), Mode::Enableable);
                    let value = if option.kind.is_tristate_like() {
                        let natural = match current {
                            Some(_) => Tristate::N,
                            None => ev.natural_value(option),
                        };
                        Value::Tristate(task.required.max(natural).for_kind(option.kind))
                    } else {
                        Value::Literal(ev.default_literal(option))
                    };
                    (dep, value, ev.take_cycles())
                };
                self.note_cycles(cycles);

                if dep == Tristate::N {
                    self.diagnostics.insert(Diagnostic::UnmetDependency {
                        option: option.name.clone(),
                        expression: describe(option.depends_on.as_ref()),
                        selected_by: task.origin.clone().unwrap_or_default(),
                    });
                }
                self.assign(option, value)
            }
            TaskKind::Seed | TaskKind::Dependency | TaskKind::Imply => {
                if current.is_some() {
                    return false;
                }

                let (value, cycles) = {
                    let ev = self.evaluator();
                    let dep = ev.eval_condition(option.depends_on.as_ref(), Mode::Enableable);
                    let value = if !dep.is_enabled() {
                        None
                    } else if option.kind.is_tristate_like() {
                        let preferred = ev.preferred_value(option.kind, dep);
                        Some(Value::Tristate(preferred.max(ev.natural_value(option))))
                    } else {
                        Some(Value::Literal(ev.default_literal(option)))
                    };
                    (value, ev.take_cycles())
                };
                self.note_cycles(cycles);

                match value {
                    Some(value) => {
                        self.unblock(&option.name);
                        self.assign(option, value)
                    }
                    None => {
                        self.block(&task, &describe(option.depends_on.as_ref()));
                        false
                    }
                }
            }
        }
    }

    fn block(&mut self, task: &Task, expression: &str) {
        debug!(option = %task.name, expression, "blocked");
        let option = task.name.clone();
        let expression = expression.to_string();
        match (task.kind, &task.origin) {
            (TaskKind::Seed, _) => {
                self.blocked.insert(option.clone());
                self.diagnostics
                    .insert(Diagnostic::BlockedSeed { option, expression });
            }
            (TaskKind::Select, Some(origin)) => {
                self.diagnostics.insert(Diagnostic::UnmetDependency {
                    option,
                    expression,
                    selected_by: origin.clone(),
                });
            }
            (_, origin) => {
                self.refused.insert(option.clone());
                self.diagnostics.insert(Diagnostic::Blocked {
                    option,
                    expression,
                    required_by: origin.clone().unwrap_or_default(),
                });
            }
        }
    }

    /// Forgets an earlier failure to enable `name` once its dependencies have been met.
    fn unblock(&mut self, name: &str) {
        let was_seed = self.blocked.remove(name);
        let was_refused = self.refused.remove(name);
        if !was_seed && !was_refused {
            return;
        }

        debug!(option = name, "dependencies met on retry");
        self.diagnostics.retain(|d| match d {
            Diagnostic::BlockedSeed { option, .. } | Diagnostic::Blocked { option, .. } => {
                option != name
            }
            _ => true,
        });
    }

    /// Records `value` unless the option already holds something at least as strong, and
    /// queues whatever the new value pulls in. Returns whether anything was recorded.
    fn assign(&mut self, option: &ConfigOption, value: Value) -> bool {
        let changed = match (self.assignment.get(&option.name), &value) {
            (None, _) => true,
            (Some(Value::Tristate(old)), Value::Tristate(new)) => new > old,
            _ => false,
        };
        if !changed {
            return false;
        }

        debug!(option = %option.name, %value, "assigned");
        self.assignment.insert(option.name.clone(), value);
        self.propagate(option);
        true
    }

    fn propagate(&mut self, option: &ConfigOption) {
        let origin = Some(option.name.as_str());
        let mut tasks = vec![];

        let cycles = {
            let ev = self.evaluator();
            let own = self
                .assignment
                .get(&option.name)
                .map_or(Tristate::N, Value::as_tristate);

            let pin = |expr: Option<&Expr>, tasks: &mut Vec<Task>| {
                for name in expr.map(|e| ev.support(e)).unwrap_or_default() {
                    tasks.push(Task::new(&name, TaskKind::Dependency, Tristate::Y, origin));
                }
            };

            pin(option.depends_on.as_ref(), &mut tasks);

            for select in &option.selects {
                let guard = ev.eval_condition(select.guard.as_ref(), Mode::Natural);
                if guard.is_enabled() {
                    tasks.push(Task::new(
                        &select.target,
                        TaskKind::Select,
                        own.min(guard),
                        origin,
                    ));
                    pin(select.guard.as_ref(), &mut tasks);
                }
            }

            for imply in &option.implies {
                let guard = ev.eval_condition(imply.guard.as_ref(), Mode::Natural);
                if guard.is_enabled() {
                    tasks.push(Task::new(&imply.target, TaskKind::Imply, guard, origin));
                    pin(imply.guard.as_ref(), &mut tasks);
                }
            }

            ev.take_cycles()
        };

        self.note_cycles(cycles);
        self.queue.extend(tasks);
    }

    /// Re-checks every assigned option's selects and implies, and every blocked option's
    /// dependencies, against the current assignment. Returns whether anything new was queued.
    fn rescan(&mut self) -> bool {
        let graph = self.graph;
        let mut tasks = vec![];

        let cycles = {
            let ev = self.evaluator();

            let retries = self
                .blocked
                .iter()
                .map(|name| (name, TaskKind::Seed))
                .chain(self.refused.iter().map(|name| (name, TaskKind::Dependency)));
            for (name, kind) in retries {
                let Some(option) = graph.get(name) else {
                    continue;
                };
                if option.kind == Kind::Unknown || self.assignment.contains_key(name) {
                    continue;
                }
                let dep = ev.eval_condition(option.depends_on.as_ref(), Mode::Enableable);
                if dep.is_enabled() {
                    tasks.push(Task::new(name, kind, Tristate::Y, None));
                }
            }

            for (name, value) in &self.assignment {
                let Some(option) = graph.get(name) else {
                    continue;
                };
                let own = value.as_tristate();

                for select in &option.selects {
                    let Some(target) = graph.get(&select.target) else {
                        continue;
                    };
                    if target.kind == Kind::Unknown {
                        continue;
                    }
                    let guard = ev.eval_condition(select.guard.as_ref(), Mode::Natural);
                    let required = own.min(guard).for_kind(target.kind);
                    let current = self.assignment.get(&target.name).map(Value::as_tristate);
                    if required.is_enabled() && current.map_or(true, |c| c < required) {
                        tasks.push(Task::new(
                            &target.name,
                            TaskKind::Select,
                            required,
                            Some(name.as_str()),
                        ));
                    }
                }

                for imply in &option.implies {
                    let Some(target) = graph.get(&imply.target) else {
                        continue;
                    };
                    if self.assignment.contains_key(&target.name)
                        || self.refused.contains(&target.name)
                        || target.kind == Kind::Unknown
                    {
                        continue;
                    }
                    let guard = ev.eval_condition(imply.guard.as_ref(), Mode::Natural);
                    let dep = ev.eval_condition(target.depends_on.as_ref(), Mode::Enableable);
                    if guard.is_enabled() && dep.is_enabled() {
                        tasks.push(Task::new(
                            &target.name,
                            TaskKind::Imply,
                            guard,
                            Some(name.as_str()),
                        ));
                    }
                }
            }
            ev.take_cycles()
        };

        self.note_cycles(cycles);
        let pushed = !tasks.is_empty();
        self.queue.extend(tasks);
        pushed
    }

    fn check_choices(&mut self) {
        let graph = self.graph;
        for group in graph.choices() {
            let members: Vec<String> = group
                .members
                .iter()
                .filter(|m| {
                    self.assignment
                        .get(m.as_str())
                        .is_some_and(|v| v.as_tristate().is_enabled())
                })
                .cloned()
                .collect();
            if members.len() > 1 {
                self.diagnostics.insert(Diagnostic::ChoiceConflict {
                    choice: group.display_name(),
                    members,
                });
            }
        }
    }
}

/// Computes the closure of `seed` over `graph`: every option that must be set for the seeds to
/// be enabled, and the value each one gets. Seed order does not matter; a `CONFIG_` prefix on
/// seed names is ignored.
pub fn resolve<I, S>(
    seed: I,
    graph: &Graph,
    options: &ResolveOptions,
) -> Result<Resolution, ResolveError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let seeds: BTreeSet<String> = seed
        .into_iter()
        .map(|s| {
            let s = s.as_ref().trim();
            s.strip_prefix("CONFIG_").unwrap_or(s).to_string()
        })
        .filter(|s| !s.is_empty())
        .collect();

    Resolver::new(graph, options).run(seeds)
}
