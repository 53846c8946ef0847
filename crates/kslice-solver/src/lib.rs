//! Kconfig option graph and dependency resolver.
//!
//! [`build_graph`] reads a Kconfig tree into a [`Graph`]: one [`ConfigOption`] per symbol, merged
//! across all of its definitions, with `if`/`menu`/`choice` conditions folded into each option's
//! `depends on`. [`resolve`] takes a set of seed symbols and computes every option that has to be
//! set for the seeds to be enabled, along with the value each one needs.
//!
//! ```text
//! config FOO
//!     tristate "foo"
//!     depends on BAR
//!
//! config BAR
//!     bool
//!     default y
//! ```
//!
//! Seeding `FOO` gives `FOO=m` (tristates prefer modules unless asked otherwise) and `BAR=y`.
//! `BAR` is pinned even though it would be `y` anyway, so the emitted fragment carries every
//! symbol the result relied on.
//!
//! Nothing the resolver finds is only logged: blocked seeds, recursive dependencies, selects
//! that bypass unmet dependencies and so on all come back as [`Diagnostic`]s in the
//! [`Resolution`].
pub mod builder;
pub mod diagnostics;
pub mod errors;
pub mod evaluate;
pub mod graph;
pub mod option;
pub mod resolve;

#[cfg(test)]
mod tests;

pub use builder::{
    build_graph, entry_file, BuildOptions, BuildOptionsBuilder, FsSourceProvider,
    MemorySourceProvider, SourceProvider,
};
pub use diagnostics::Diagnostic;
pub use errors::{BuildError, BuildResult, ResolveError};
pub use graph::{ChoiceGroup, Direction, EdgeKind, Graph};
pub use option::{ConfigOption, Kind, Tristate, Value};
pub use resolve::{resolve, Assignment, Resolution, ResolveOptions, ResolveOptionsBuilder};
