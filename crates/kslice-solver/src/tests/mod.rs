
use crate::builder::{build_graph, BuildOptions, MemorySourceProvider};
use crate::graph::Graph;
use crate::resolve::{resolve, Resolution, ResolveOptions};

pub(crate) fn graph(kconfig: &str) -> Graph {
    let provider = MemorySourceProvider::new().with_file("Kconfig", kconfig);
    build_graph(&provider, "Kconfig", &BuildOptions::default()).unwrap()
}

pub(crate) fn resolved(g: &Graph, seeds: &[&str]) -> Resolution {
    resolve(seeds, g, &ResolveOptions::default()).unwrap()
}

/// `NAME=value` for every assigned option, sorted by name.
pub(crate) fn values(r: &Resolution) -> Vec<String> {
    r.assignment
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect()
}
