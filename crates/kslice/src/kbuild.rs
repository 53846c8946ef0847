//! Seed extraction from Kbuild makefiles.
//!
//! A directory is built when the `CONFIG_*` symbols guarding its object rules are enabled:
//!
//! ```text
//! obj-$(CONFIG_INET)      += ipv4/
//! tcp-$(CONFIG_TCP_MD5)   += tcp_md5.o
//! ```
//!
//! Scanning a target directory collects every symbol guarding a rule in it or below it, plus the
//! symbols its parent directories use to descend into it.
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path};

use anyhow::{bail, Context};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::KsliceResult;

static CONDITIONAL_RULE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[A-Za-z0-9_.-]+-\$\(CONFIG_([A-Za-z0-9_]+)\)\s*[:+]?=(.*)$").unwrap()
});

const BUILD_FILES: [&str; 2] = ["Kbuild", "Makefile"];

/// `<goal>-$(CONFIG_<symbol>) += <objects>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRule {
    pub symbol: String,
    pub objects: Vec<String>,
}

impl ObjectRule {
    /// Whether the rule descends into subdirectory `name`.
    pub fn descends_into(&self, name: &str) -> bool {
        self.objects
            .iter()
            .any(|o| o.strip_suffix('/') == Some(name))
    }
}

fn is_build_file(name: &OsStr) -> bool {
    BUILD_FILES.iter().any(|b| name == *b)
}

/// Every conditional object rule in a makefile. Continuation lines are joined and comments
/// dropped first.
pub fn parse_rules(text: &str) -> Vec<ObjectRule> {
    let joined = text.replace("\\\r\n", " ").replace("\\\n", " ");

    joined
        .lines()
        .filter_map(|line| {
            let line = line.split('#').next().unwrap_or_default();
            let captures = CONDITIONAL_RULE.captures(line)?;
            Some(ObjectRule {
                symbol: captures[1].to_string(),
                objects: captures[2].split_whitespace().map(str::to_string).collect(),
            })
        })
        .collect()
}

fn read_rules(path: &Path) -> KsliceResult<Vec<ObjectRule>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let rules = parse_rules(&text);
    trace!(file = %path.display(), rules = rules.len(), "scanned build file");
    Ok(rules)
}

/// Symbols guarding any rule in `dir` or its subdirectories.
fn symbols_below(dir: &Path) -> KsliceResult<BTreeSet<String>> {
    let mut ret = BTreeSet::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", dir.display()))?;
        if entry.file_type().is_file() && is_build_file(entry.file_name()) {
            ret.extend(read_rules(entry.path())?.into_iter().map(|r| r.symbol));
        }
    }
    Ok(ret)
}

/// Symbols the ancestors of `dir` (relative to `root`) use to descend into it.
fn symbols_above(root: &Path, dir: &Path) -> KsliceResult<BTreeSet<String>> {
    let mut ret = BTreeSet::new();
    let mut parent = root.to_path_buf();
    for component in dir.components() {
        let Component::Normal(child) = component else {
            continue;
        };
        let child = child.to_string_lossy();

        for name in BUILD_FILES {
            let path = parent.join(name);
            if !path.is_file() {
                continue;
            }
            ret.extend(
                read_rules(&path)?
                    .into_iter()
                    .filter(|r| r.descends_into(&child))
                    .map(|r| r.symbol),
            );
        }
        parent.push(&*child);
    }
    Ok(ret)
}

/// Seed symbols, without the `CONFIG_` prefix, needed to build every directory in `dirs`.
/// Directories are relative to `root`.
pub fn scan_directories<P: AsRef<Path>>(
    root: &Path,
    dirs: &[P],
) -> KsliceResult<BTreeSet<String>> {
    let mut seeds = BTreeSet::new();
    for dir in dirs {
        let dir = dir.as_ref();
        if dir.is_absolute() || dir.components().any(|c| c == Component::ParentDir) {
            bail!("target directory {} is outside the source tree", dir.display());
        }
        let full = root.join(dir);
        if !full.is_dir() {
            bail!("target directory {} does not exist", full.display());
        }

        let below = symbols_below(&full)?;
        let above = symbols_above(root, dir)?;
        debug!(
            dir = %dir.display(),
            below = below.len(),
            above = above.len(),
            "collected seeds"
        );
        seeds.extend(below);
        seeds.extend(above);
    }
    Ok(seeds)
}
