use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use itertools::Itertools;
use kslice::{fragment, kbuild};
use kslice_solver::{
    build_graph, entry_file, resolve, BuildOptionsBuilder, Direction, EdgeKind, FsSourceProvider,
    Graph, ResolveOptionsBuilder,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Minimal Kconfig fragments that build a chosen set of source directories
#[derive(Parser)]
#[command(version)]
struct Opts {
    /// Log at debug level; RUST_LOG takes precedence
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    subcmd: SubCommand,
}

#[derive(Subcommand)]
enum SubCommand {
    Resolve(ResolveCmd),
    Seeds(SeedsCmd),
    Graph(GraphCmd),
}

#[derive(Args)]
struct TreeArgs {
    /// Root of the source tree
    #[arg(long)]
    root: PathBuf,

    /// Entry Kconfig file relative to the root; defaults to arch/<SRCARCH>/Kconfig, then Kconfig
    #[arg(long)]
    kconfig: Option<PathBuf>,

    /// Target architecture
    #[arg(long, default_value = "x86_64")]
    arch: String,

    /// Treat undeclared symbols as always-n instead of failing
    #[arg(long)]
    allow_undefined: bool,
}

/// Resolve seeds into a configuration fragment
#[derive(Args)]
struct ResolveCmd {
    #[command(flatten)]
    tree: TreeArgs,

    /// Seed symbol, with or without the CONFIG_ prefix
    #[arg(long)]
    seed: Vec<String>,

    /// Directory (relative to the root) whose build rules supply seeds
    #[arg(long)]
    target_dir: Vec<PathBuf>,

    /// Write the fragment here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable tristates as y instead of m
    #[arg(long)]
    prefer_builtin: bool,
}

/// Print the seed symbols extracted from build rules
#[derive(Args)]
struct SeedsCmd {
    /// Root of the source tree
    #[arg(long)]
    root: PathBuf,

    /// Directory (relative to the root) to scan
    #[arg(long, required = true)]
    target_dir: Vec<PathBuf>,
}

/// Summarize the option graph
#[derive(Args)]
struct GraphCmd {
    #[command(flatten)]
    tree: TreeArgs,

    /// Show the edges of one option
    #[arg(long)]
    option: Option<String>,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_graph(tree: &TreeArgs) -> anyhow::Result<Graph> {
    if !tree.root.is_dir() {
        bail!("{} is not a directory", tree.root.display());
    }

    let provider = FsSourceProvider::new(&tree.root);
    let entry = match &tree.kconfig {
        Some(kconfig) => kconfig.clone(),
        None => entry_file(&provider, Some(tree.arch.as_str())),
    };
    let options = BuildOptionsBuilder::default()
        .arch(tree.arch.clone())
        .allow_undefined(tree.allow_undefined)
        .build()?;

    info!(entry = %entry.display(), arch = %tree.arch, "reading Kconfig");
    let graph = build_graph(&provider, &entry, &options)
        .with_context(|| format!("failed to build the option graph from {}", entry.display()))?;

    for warning in graph.warnings() {
        warn!("{warning}");
    }
    info!(
        options = graph.len(),
        choices = graph.choices().len(),
        "option graph ready"
    );
    Ok(graph)
}

fn run_resolve(cmd: ResolveCmd) -> anyhow::Result<()> {
    let graph = load_graph(&cmd.tree)?;

    let mut seeds: BTreeSet<String> = cmd.seed.into_iter().collect();
    if !cmd.target_dir.is_empty() {
        seeds.extend(kbuild::scan_directories(&cmd.tree.root, &cmd.target_dir)?);
    }
    if seeds.is_empty() {
        bail!("nothing to resolve: pass --seed or --target-dir");
    }
    info!(seeds = seeds.len(), "resolving");

    let options = ResolveOptionsBuilder::default()
        .prefer_modules(!cmd.prefer_builtin)
        .build()?;
    let resolution = resolve(&seeds, &graph, &options)?;

    for diagnostic in &resolution.diagnostics {
        warn!("{diagnostic}");
    }
    if !resolution.blocked.is_empty() {
        warn!(
            "{} seed(s) cannot be enabled: {}",
            resolution.blocked.len(),
            resolution.blocked.iter().join(", ")
        );
    }

    let text = fragment::render(&graph, &resolution.assignment);
    match &cmd.output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
            info!(
                path = %path.display(),
                assigned = resolution.assignment.len(),
                "wrote fragment"
            );
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn run_seeds(cmd: SeedsCmd) -> anyhow::Result<()> {
    let seeds = kbuild::scan_directories(&cmd.root, &cmd.target_dir)?;
    for seed in seeds {
        println!("CONFIG_{seed}");
    }
    Ok(())
}

fn run_graph(cmd: GraphCmd) -> anyhow::Result<()> {
    let graph = load_graph(&cmd.tree)?;

    println!(
        "{} options, {} choice groups",
        graph.len(),
        graph.choices().len()
    );
    for cycle in graph.dependency_cycles() {
        println!("recursive dependency: {}", cycle.join(" <-> "));
    }

    let Some(name) = &cmd.option else {
        return Ok(());
    };
    let name = name.strip_prefix("CONFIG_").unwrap_or(name);
    let Some(option) = graph.get(name) else {
        bail!("{name} is not a known option");
    };

    println!("{} ({})", option.name, option.kind);
    for location in &option.locations {
        println!("  defined at {location}");
    }
    if let Some(depends_on) = &option.depends_on {
        println!("  depends on {depends_on}");
    }
    let edges = [
        ("uses", EdgeKind::Depends, Direction::Outgoing),
        ("used by", EdgeKind::Depends, Direction::Incoming),
        ("selects", EdgeKind::Selects, Direction::Outgoing),
        ("selected by", EdgeKind::Selects, Direction::Incoming),
    ];
    for (label, kind, direction) in edges {
        let neighbors = graph.neighbors(name, kind, direction);
        if !neighbors.is_empty() {
            println!("  {label}: {}", neighbors.join(", "));
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    init_logging(opts.verbose);

    match opts.subcmd {
        SubCommand::Resolve(cmd) => run_resolve(cmd),
        SubCommand::Seeds(cmd) => run_seeds(cmd),
        SubCommand::Graph(cmd) => run_graph(cmd),
    }
}
