use fxhash::FxHashMap;
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
pub use petgraph::Direction;

use crate::diagnostics::Diagnostic;
use crate::option::{ConfigOption, Location};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// option -> symbol referenced by its `depends on`
    Depends,
    /// selector -> selected
    Selects,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceGroup {
    pub name: Option<String>,
    pub location: Location,
    pub members: Vec<String>,
}

impl ChoiceGroup {
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("<choice at {}>", self.location),
        }
    }
}

/// The complete option table. Built once, immutable afterwards.
#[derive(Debug, Clone)]
pub struct Graph {
    options: IndexMap<String, ConfigOption>,
    choices: Vec<ChoiceGroup>,
    edges: DiGraph<String, EdgeKind>,
    nodes: FxHashMap<String, NodeIndex>,
    selected_by: FxHashMap<String, IndexSet<String>>,
    warnings: Vec<Diagnostic>,
}

impl Graph {
    pub(crate) fn new(
        options: IndexMap<String, ConfigOption>,
        choices: Vec<ChoiceGroup>,
        warnings: Vec<Diagnostic>,
    ) -> Graph {
        let mut edges = DiGraph::new();
        let mut nodes = FxHashMap::default();
        for name in options.keys() {
            nodes.insert(name.clone(), edges.add_node(name.clone()));
        }

        let mut selected_by: FxHashMap<String, IndexSet<String>> = FxHashMap::default();
        for option in options.values() {
            let from = nodes[&option.name];
            if let Some(depends_on) = &option.depends_on {
                for symbol in depends_on.symbols() {
                    if let Some(&to) = nodes.get(symbol) {
                        edges.update_edge(from, to, EdgeKind::Depends);
                    }
                }
            }
            for select in &option.selects {
                if let Some(&to) = nodes.get(&select.target) {
                    edges.add_edge(from, to, EdgeKind::Selects);
                }
                selected_by
                    .entry(select.target.clone())
                    .or_default()
                    .insert(option.name.clone());
            }
        }

        Graph {
            options,
            choices,
            edges,
            nodes,
            selected_by,
            warnings,
        }
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ConfigOption> {
        self.options.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    /// Options in declaration order.
    pub fn options(&self) -> impl Iterator<Item = &ConfigOption> {
        self.options.values()
    }

    pub fn choices(&self) -> &[ChoiceGroup] {
        &self.choices
    }

    /// `UndefinedSymbol` findings from a lenient build.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Options that `select` `name`, in declaration order.
    pub fn selectors_of(&self, name: &str) -> impl Iterator<Item = &str> {
        self.selected_by
            .get(name)
            .into_iter()
            .flat_map(|s| s.iter().map(String::as_str))
    }

    /// Neighbours of `name` along edges of one kind. `Direction::Incoming` gives the options
    /// that depend on or select `name`.
    pub fn neighbors(&self, name: &str, kind: EdgeKind, direction: Direction) -> Vec<&str> {
        let Some(&idx) = self.nodes.get(name) else {
            return vec![];
        };

        self.edges
            .edges_directed(idx, direction)
            .filter(|e| *e.weight() == kind)
            .map(|e| match direction {
                Direction::Outgoing => e.target(),
                Direction::Incoming => e.source(),
            })
            .map(|n| self.edges[n].as_str())
            .sorted()
            .dedup()
            .collect()
    }

    /// Groups of options whose `depends on` expressions reach each other, each sorted by name.
    pub fn dependency_cycles(&self) -> Vec<Vec<String>> {
        let depends = self.edges.filter_map(
            |_, name| Some(name.clone()),
            |_, kind| (*kind == EdgeKind::Depends).then_some(()),
        );

        tarjan_scc(&depends)
            .into_iter()
            .filter(|scc| scc.len() > 1 || depends.contains_edge(scc[0], scc[0]))
            .map(|scc| scc.into_iter().map(|n| depends[n].clone()).sorted().collect())
            .sorted()
            .collect()
    }
}
