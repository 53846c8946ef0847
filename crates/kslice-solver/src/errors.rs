use std::path::PathBuf;

use kslice_syntax::ParseError;
use thiserror::Error;

use crate::option::{Kind, Location};

/// Fatal problems found while assembling the option graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("{}:{}", file.display(), source)]
    Parse {
        file: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("{}:{line}: included file `{}` does not exist", from.display(), path.display())]
    MissingInclude {
        path: PathBuf,
        from: PathBuf,
        line: usize,
    },

    #[error("{}:{line}: included file `{path}` is outside the source tree", from.display())]
    OutsideRoot {
        path: String,
        from: PathBuf,
        line: usize,
    },

    #[error("{}:{line}: `{}` includes itself", from.display(), path.display())]
    RecursiveInclude {
        path: PathBuf,
        from: PathBuf,
        line: usize,
    },

    #[error("{at}: `{name}` redefined as {second}, previously declared {first}")]
    KindConflict {
        name: String,
        first: Kind,
        second: Kind,
        at: Location,
    },

    #[error("{at}: `{name}` has no type on any of its definitions")]
    MissingKind { name: String, at: Location },

    #[error("`{symbol}` is referenced by `{referenced_by}` but never declared")]
    Reference {
        symbol: String,
        referenced_by: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("resolution did not converge within {limit} steps")]
    IterationLimit { limit: usize },
}

pub type BuildResult<T> = anyhow::Result<T>;
