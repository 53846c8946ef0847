use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context};
use derive_builder::Builder;
use indexmap::IndexMap;
use kslice_syntax::ast::{AssignmentOp, Expr, Item, Properties, SourceKind};
use kslice_syntax::parse_kconfig_from_str;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, trace, warn};

use crate::diagnostics::Diagnostic;
use crate::errors::{BuildError, BuildResult};
use crate::graph::{ChoiceGroup, Graph};
use crate::option::{Activation, ConfigOption, DefaultValue, Kind, Location, Prompt, Range};

static VARIABLE_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\(([A-Za-z_][A-Za-z0-9_]*)\)").unwrap());

/// Read access to the files of a source tree. Paths are relative to the tree root.
pub trait SourceProvider {
    fn exists(&self, path: &Path) -> bool;
    fn read(&self, path: &Path) -> anyhow::Result<String>;

    /// Whether `path` still lies inside the tree once links are followed.
    fn contains(&self, _path: &Path) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
pub struct FsSourceProvider {
    root: PathBuf,
}

impl FsSourceProvider {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        FsSourceProvider { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SourceProvider for FsSourceProvider {
    fn exists(&self, path: &Path) -> bool {
        self.root.join(path).is_file()
    }

    fn read(&self, path: &Path) -> anyhow::Result<String> {
        let full = self.root.join(path);
        if !self.contains(path) {
            bail!("{} resolves outside {}", full.display(), self.root.display());
        }
        std::fs::read_to_string(&full).with_context(|| format!("failed to read {}", full.display()))
    }

    fn contains(&self, path: &Path) -> bool {
        match (self.root.canonicalize(), self.root.join(path).canonicalize()) {
            (Ok(root), Ok(full)) => full.starts_with(root),
            _ => false,
        }
    }
}

/// In-memory tree, mostly for tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySourceProvider {
    files: IndexMap<PathBuf, String>,
}

impl MemorySourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file<P: Into<PathBuf>, S: Into<String>>(mut self, path: P, contents: S) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn insert<P: Into<PathBuf>, S: Into<String>>(&mut self, path: P, contents: S) {
        self.files.insert(path.into(), contents.into());
    }
}

impl SourceProvider for MemorySourceProvider {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn read(&self, path: &Path) -> anyhow::Result<String> {
        self.files
            .get(path)
            .cloned()
            .with_context(|| format!("no such file: {}", path.display()))
    }
}

#[derive(Debug, Clone, Default, Builder)]
#[builder(default, setter(into))]
pub struct BuildOptions {
    /// Target architecture; provides `$(ARCH)` and `$(SRCARCH)`
    #[builder(setter(into, strip_option))]
    pub arch: Option<String>,
    /// Turn undeclared references into always-`n` placeholders instead of failing
    pub allow_undefined: bool,
    /// Extra preprocessor variables
    pub vars: IndexMap<String, String>,
}

/// Directory under `arch/` holding the sources for `arch`.
pub fn srcarch_for(arch: &str) -> &str {
    match arch {
        "i386" | "x86_64" => "x86",
        "sparc32" | "sparc64" => "sparc",
        "parisc64" => "parisc",
        "sh64" => "sh",
        other => other,
    }
}

/// `arch/<SRCARCH>/Kconfig` when it exists, else the top-level `Kconfig`.
pub fn entry_file<P: SourceProvider + ?Sized>(provider: &P, arch: Option<&str>) -> PathBuf {
    if let Some(arch) = arch {
        let candidate = Path::new("arch").join(srcarch_for(arch)).join("Kconfig");
        if provider.exists(&candidate) {
            return candidate;
        }
        debug!(arch, "no architecture Kconfig, using the top-level one");
    }
    PathBuf::from("Kconfig")
}

/// Lexically resolves `.` and `..`. `None` if the path is absolute or climbs above the root.
fn normalize(path: &Path) -> Option<PathBuf> {
    let mut parts = vec![];
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(parts.iter().collect())
}

struct Definition {
    kind: Option<Kind>,
    /// Enclosing block conditions ANDed with the definition's own `depends on` lines
    condition: Option<Expr>,
    properties: Properties,
    location: Location,
    choice: Option<usize>,
}

struct GraphBuilder<'a, P: SourceProvider + ?Sized> {
    provider: &'a P,
    options: &'a BuildOptions,
    vars: IndexMap<String, String>,
    include_stack: Vec<PathBuf>,
    definitions: IndexMap<String, Vec<Definition>>,
    choices: Vec<ChoiceGroup>,
    files_read: usize,
}

impl<'a, P: SourceProvider + ?Sized> GraphBuilder<'a, P> {
    fn new(provider: &'a P, options: &'a BuildOptions) -> Self {
        let mut vars = options.vars.clone();
        if let Some(arch) = &options.arch {
            vars.entry(String::from("ARCH"))
                .or_insert_with(|| arch.clone());
            vars.entry(String::from("SRCARCH"))
                .or_insert_with(|| srcarch_for(arch).to_string());
        }

        GraphBuilder {
            provider,
            options,
            vars,
            include_stack: vec![],
            definitions: IndexMap::new(),
            choices: vec![],
            files_read: 0,
        }
    }

    /// Substitutes `$(NAME)` references to known variables. Unknown ones are left in place.
    fn expand(&self, text: &str) -> String {
        let mut current = text.to_string();
        // Recursively-expanded variables may themselves contain references
        for _ in 0..8 {
            let next = VARIABLE_REFERENCE
                .replace_all(&current, |caps: &Captures| {
                    self.vars
                        .get(&caps[1])
                        .cloned()
                        .unwrap_or_else(|| caps[0].to_string())
                })
                .into_owned();
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn load_file(
        &mut self,
        path: &Path,
        condition: Option<&Expr>,
        choice: Option<usize>,
    ) -> BuildResult<()> {
        trace!(file = %path.display(), "parsing");
        let text = self.provider.read(path)?;
        let root = parse_kconfig_from_str(&text).map_err(|source| BuildError::Parse {
            file: path.to_path_buf(),
            source,
        })?;
        self.files_read += 1;

        self.include_stack.push(path.to_path_buf());
        let ret = self.walk(&root.items, path, condition, choice);
        self.include_stack.pop();
        ret
    }

    fn walk(
        &mut self,
        items: &[Item],
        file: &Path,
        condition: Option<&Expr>,
        choice: Option<usize>,
    ) -> BuildResult<()> {
        for item in items {
            match item {
                Item::Config(entry) => {
                    let location = Location {
                        file: file.to_path_buf(),
                        line: entry.line,
                    };
                    self.define(&entry.name, &entry.properties, condition, choice, location);
                }
                Item::Choice {
                    name,
                    line,
                    properties,
                    items,
                } => {
                    let index = self.choices.len();
                    self.choices.push(ChoiceGroup {
                        name: name.clone(),
                        location: Location {
                            file: file.to_path_buf(),
                            line: *line,
                        },
                        members: vec![],
                    });
                    let inner = Expr::and_optional(
                        condition.cloned(),
                        Expr::conjunction(properties.depends.iter().cloned()).as_ref(),
                    );
                    self.walk(items, file, inner.as_ref(), Some(index))?;
                }
                Item::Menu { depends, items, .. } => {
                    let inner = Expr::and_optional(
                        condition.cloned(),
                        Expr::conjunction(depends.iter().cloned()).as_ref(),
                    );
                    self.walk(items, file, inner.as_ref(), choice)?;
                }
                Item::If {
                    condition: block_condition,
                    items,
                    ..
                } => {
                    let inner = Expr::and_optional(condition.cloned(), Some(block_condition));
                    self.walk(items, file, inner.as_ref(), choice)?;
                }
                Item::Source { kind, path, line } => {
                    self.include(*kind, path, file, *line, condition, choice)?;
                }
                Item::Assignment {
                    name, op, value, ..
                } => self.assign_variable(name, *op, value),
                Item::Comment { .. } | Item::MainMenu { .. } => {}
            }
        }

        Ok(())
    }

    fn include(
        &mut self,
        kind: SourceKind,
        raw_path: &str,
        from: &Path,
        line: usize,
        condition: Option<&Expr>,
        choice: Option<usize>,
    ) -> BuildResult<()> {
        let expanded = self.expand(raw_path);
        let candidate = match (kind.is_relative(), from.parent()) {
            (true, Some(dir)) => dir.join(&expanded),
            _ => PathBuf::from(&expanded),
        };

        let Some(path) = normalize(&candidate) else {
            return Err(BuildError::OutsideRoot {
                path: expanded,
                from: from.to_path_buf(),
                line,
            }
            .into());
        };

        if !self.provider.exists(&path) {
            if kind.is_optional() {
                debug!(path = %path.display(), "skipping missing optional include");
                return Ok(());
            }
            return Err(BuildError::MissingInclude {
                path,
                from: from.to_path_buf(),
                line,
            }
            .into());
        }

        if !self.provider.contains(&path) {
            return Err(BuildError::OutsideRoot {
                path: expanded,
                from: from.to_path_buf(),
                line,
            }
            .into());
        }

        if self.include_stack.contains(&path) {
            return Err(BuildError::RecursiveInclude {
                path,
                from: from.to_path_buf(),
                line,
            }
            .into());
        }

        self.load_file(&path, condition, choice)
    }

    fn assign_variable(&mut self, name: &str, op: AssignmentOp, value: &str) {
        let value = match op {
            AssignmentOp::Immediate => self.expand(value),
            AssignmentOp::Recursive => value.to_string(),
            AssignmentOp::Append => match self.vars.get(name) {
                Some(existing) if !existing.is_empty() => format!("{existing} {value}"),
                _ => value.to_string(),
            },
        };
        trace!(name, value, "preprocessor variable");
        self.vars.insert(name.to_string(), value);
    }

    fn define(
        &mut self,
        name: &str,
        properties: &Properties,
        condition: Option<&Expr>,
        choice: Option<usize>,
        location: Location,
    ) {
        let own = Expr::conjunction(properties.depends.iter().cloned());
        let condition = Expr::and_optional(condition.cloned(), own.as_ref());

        if let Some(group) = choice.and_then(|c| self.choices.get_mut(c)) {
            if !group.members.iter().any(|m| m == name) {
                group.members.push(name.to_string());
            }
        }

        self.definitions
            .entry(name.to_string())
            .or_default()
            .push(Definition {
                kind: properties.symbol_type.map(Kind::from),
                condition,
                properties: properties.clone(),
                location,
                choice,
            });
    }

    fn finish(self) -> BuildResult<Graph> {
        let mut options = IndexMap::with_capacity(self.definitions.len());
        for (name, definitions) in &self.definitions {
            options.insert(name.clone(), merge(name, definitions)?);
        }

        let warnings = validate_references(&mut options, self.options.allow_undefined)?;

        debug!(
            files = self.files_read,
            options = options.len(),
            choices = self.choices.len(),
            "built option graph"
        );

        Ok(Graph::new(options, self.choices, warnings))
    }
}

/// Folds every definition of one symbol into a single option. With more than one definition,
/// each definition's condition guards the selects, implies and defaults it contributed, and the
/// option depends on any one of the conditions holding.
fn merge(name: &str, definitions: &[Definition]) -> Result<ConfigOption, BuildError> {
    let mut kind: Option<Kind> = None;
    for definition in definitions {
        match (kind, definition.kind) {
            (Some(first), Some(second)) if first != second => {
                return Err(BuildError::KindConflict {
                    name: name.to_string(),
                    first,
                    second,
                    at: definition.location.clone(),
                });
            }
            (None, Some(k)) => kind = Some(k),
            _ => {}
        }
    }

    let Some(kind) = kind else {
        return Err(BuildError::MissingKind {
            name: name.to_string(),
            at: definitions
                .first()
                .map(|d| d.location.clone())
                .unwrap_or_else(|| Location {
                    file: PathBuf::new(),
                    line: 0,
                }),
        });
    };

    let single = definitions.len() == 1;
    let depends_on = if definitions.iter().any(|d| d.condition.is_none()) {
        None
    } else {
        definitions
            .iter()
            .filter_map(|d| d.condition.clone())
            .reduce(Expr::or)
    };

    let mut option = ConfigOption::placeholder(name);
    option.kind = kind;
    option.depends_on = depends_on;

    for definition in definitions {
        let guard = |g: &Option<Expr>| {
            if single {
                g.clone()
            } else {
                Expr::and_optional(definition.condition.clone(), g.as_ref())
            }
        };
        let props = &definition.properties;

        option
            .selects
            .extend(props.selects.iter().map(|s| Activation {
                target: s.target.clone(),
                guard: guard(&s.condition),
            }));
        option
            .implies
            .extend(props.implies.iter().map(|s| Activation {
                target: s.target.clone(),
                guard: guard(&s.condition),
            }));
        option
            .defaults
            .extend(props.defaults.iter().map(|d| DefaultValue {
                value: d.value.clone(),
                guard: guard(&d.condition),
            }));
        option.ranges.extend(props.ranges.iter().map(|r| Range {
            low: r.low.clone(),
            high: r.high.clone(),
            guard: guard(&r.condition),
        }));

        if option.prompt.is_none() {
            option.prompt = props.prompt.as_ref().map(|p| Prompt {
                text: p.text.clone(),
                guard: p.condition.clone(),
            });
        }
        option.choice = option.choice.or(definition.choice);
        option.locations.push(definition.location.clone());
    }

    Ok(option)
}

/// Every referenced symbol must be declared. In lenient mode undeclared ones become
/// placeholders, reported once each.
fn validate_references(
    options: &mut IndexMap<String, ConfigOption>,
    allow_undefined: bool,
) -> Result<Vec<Diagnostic>, BuildError> {
    let mut missing: IndexMap<String, String> = IndexMap::new();
    for option in options.values() {
        for symbol in option.references() {
            if options.contains_key(symbol) || missing.contains_key(symbol) {
                continue;
            }
            if !allow_undefined {
                return Err(BuildError::Reference {
                    symbol: symbol.to_string(),
                    referenced_by: option.name.clone(),
                });
            }
            missing.insert(symbol.to_string(), option.name.clone());
        }
    }

    let mut warnings = Vec::with_capacity(missing.len());
    for (symbol, referenced_by) in missing {
        warn!(symbol, referenced_by, "undeclared symbol treated as n");
        options.insert(symbol.clone(), ConfigOption::placeholder(symbol.clone()));
        warnings.push(Diagnostic::UndefinedSymbol {
            symbol,
            referenced_by,
        });
    }

    Ok(warnings)
}

/// Reads `root_file` and everything it includes, and builds the option graph.
pub fn build_graph<P: SourceProvider + ?Sized, F: AsRef<Path>>(
    provider: &P,
    root_file: F,
    options: &BuildOptions,
) -> BuildResult<Graph> {
    let root_file = root_file.as_ref();
    let Some(path) = normalize(root_file) else {
        bail!("entry file {} is outside the source tree", root_file.display());
    };
    if !provider.exists(&path) {
        bail!("entry file {} does not exist", path.display());
    }
    if !provider.contains(&path) {
        bail!("entry file {} is outside the source tree", root_file.display());
    }

    let mut builder = GraphBuilder::new(provider, options);
    builder.load_file(&path, None, None)?;
    builder.finish()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use kslice_syntax::ast::Expr;
    use pretty_assertions::assert_eq;

    use super::{
        build_graph, entry_file, normalize, BuildOptions, BuildOptionsBuilder,
        MemorySourceProvider,
    };
    use crate::diagnostics::Diagnostic;
    use crate::errors::BuildError;
    use crate::graph::Graph;
    use crate::option::Kind;

    fn build(provider: &MemorySourceProvider) -> Result<Graph, BuildError> {
        build_with(provider, &BuildOptions::default())
    }

    fn build_with(
        provider: &MemorySourceProvider,
        options: &BuildOptions,
    ) -> Result<Graph, BuildError> {
        build_graph(provider, "Kconfig", options).map_err(|e| {
            e.downcast::<BuildError>()
                .unwrap_or_else(|e| panic!("unexpected error: {e:?}"))
        })
    }

    fn sym(name: &str) -> Expr {
        Expr::symbol(name)
    }

    #[test]
    fn normalize_paths() {
        assert_eq!(
            normalize("a/./b/../c".as_ref()),
            Some(PathBuf::from("a/c"))
        );
        assert_eq!(normalize("../x".as_ref()), None);
        assert_eq!(normalize("/etc/passwd".as_ref()), None);
    }

    #[test]
    fn if_conditions_reach_sourced_files() {
        let provider = MemorySourceProvider::new()
            .with_file(
                "Kconfig",
                "config NET\n\tbool\n\nif NET\nsource \"net/Kconfig\"\nendif\n",
            )
            .with_file(
                "net/Kconfig",
                "menu \"Net\"\n\tdepends on !EMBEDDED\n\nconfig INET\n\tbool \"inet\"\n\tdepends on PROC\n\nendmenu\n\nconfig EMBEDDED\n\tbool\n\nconfig PROC\n\tbool\n",
            );

        let g = build(&provider).unwrap();
        let inet = g.get("INET").unwrap();
        assert_eq!(
            inet.depends_on,
            Some(sym("NET").and(sym("EMBEDDED").negate()).and(sym("PROC")))
        );
        assert_eq!(inet.locations[0].file, PathBuf::from("net/Kconfig"));
        assert_eq!(inet.locations[0].line, 4);
        assert_eq!(g.get("EMBEDDED").unwrap().depends_on, Some(sym("NET")));
    }

    #[test]
    fn relative_and_optional_includes() {
        let provider = MemorySourceProvider::new()
            .with_file("Kconfig", "source \"drivers/Kconfig\"\nosource \"missing/Kconfig\"\n")
            .with_file("drivers/Kconfig", "rsource \"net/Kconfig\"\norsource \"nope\"\n")
            .with_file("drivers/net/Kconfig", "config E1000\n\ttristate \"e1000\"\n");

        let g = build(&provider).unwrap();
        assert_eq!(g.get("E1000").unwrap().kind, Kind::Tristate);
    }

    #[test]
    fn include_errors() {
        let provider = MemorySourceProvider::new().with_file("Kconfig", "\nsource \"gone/Kconfig\"\n");
        assert_eq!(
            build(&provider).unwrap_err(),
            BuildError::MissingInclude {
                path: PathBuf::from("gone/Kconfig"),
                from: PathBuf::from("Kconfig"),
                line: 2,
            }
        );

        let provider = MemorySourceProvider::new().with_file("Kconfig", "rsource \"../Kconfig\"\n");
        assert!(matches!(
            build(&provider).unwrap_err(),
            BuildError::OutsideRoot { .. }
        ));

        let provider = MemorySourceProvider::new()
            .with_file("Kconfig", "source \"a/Kconfig\"\n")
            .with_file("a/Kconfig", "source \"Kconfig\"\n");
        assert_eq!(
            build(&provider).unwrap_err(),
            BuildError::RecursiveInclude {
                path: PathBuf::from("Kconfig"),
                from: PathBuf::from("a/Kconfig"),
                line: 1,
            }
        );
    }

    #[test]
    fn parse_errors_name_the_file() {
        let provider = MemorySourceProvider::new()
            .with_file("Kconfig", "source \"bad/Kconfig\"\n")
            .with_file("bad/Kconfig", "config A\n\tbool\nendif\n");
        match build(&provider).unwrap_err() {
            BuildError::Parse { file, source } => {
                assert_eq!(file, PathBuf::from("bad/Kconfig"));
                assert_eq!(source.line, 3);
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn arch_variables_in_paths() {
        let provider = MemorySourceProvider::new()
            .with_file("Kconfig", "source \"arch/$(SRCARCH)/Kconfig\"\n")
            .with_file(
                "arch/x86/Kconfig",
                "config X86\n\tdef_bool y\n\nconfig ARCH_NAME\n\tstring\n\tdefault \"$(ARCH)\"\n",
            );

        let options = BuildOptionsBuilder::default()
            .arch("x86_64")
            .build()
            .unwrap();
        let g = build_with(&provider, &options).unwrap();
        assert!(g.contains("X86"));
        assert_eq!(
            g.get("ARCH_NAME").unwrap().defaults[0].value,
            Expr::constant("$(ARCH)")
        );

        assert_eq!(
            entry_file(&provider, Some("x86_64")),
            PathBuf::from("arch/x86/Kconfig")
        );
        assert_eq!(entry_file(&provider, Some("arm64")), PathBuf::from("Kconfig"));
        assert_eq!(entry_file(&provider, None), PathBuf::from("Kconfig"));
    }

    #[test]
    fn preprocessor_variables_in_paths() {
        let provider = MemorySourceProvider::new()
            .with_file(
                "Kconfig",
                "BASE := sub\nDIR = $(BASE)/dir\nsource \"$(DIR)/Kconfig\"\n",
            )
            .with_file("sub/dir/Kconfig", "config FOUND\n\tbool\n");

        assert!(build(&provider).unwrap().contains("FOUND"));
    }

    #[test]
    fn redefinitions_merge() {
        let provider = MemorySourceProvider::new().with_file(
            "Kconfig",
            r#"
config A
	bool "a"
	depends on X
	select S

config A
	depends on Y
	select T if Z
	default y

config X
	bool
config Y
	bool
config Z
	bool
config S
	bool
config T
	bool
"#,
        );

        let g = build(&provider).unwrap();
        let a = g.get("A").unwrap();
        assert_eq!(a.kind, Kind::Bool);
        assert_eq!(a.depends_on, Some(sym("X").or(sym("Y"))));
        assert_eq!(a.selects[0].guard, Some(sym("X")));
        assert_eq!(a.selects[1].guard, Some(sym("Y").and(sym("Z"))));
        assert_eq!(a.defaults[0].guard, Some(sym("Y")));
        assert_eq!(a.locations.len(), 2);
        assert_eq!(a.prompt.as_ref().unwrap().text, "a");
    }

    #[test]
    fn kind_conflicts_and_missing_kinds() {
        let provider = MemorySourceProvider::new()
            .with_file("Kconfig", "config A\n\tbool\n\nconfig A\n\ttristate\n");
        assert!(matches!(
            build(&provider).unwrap_err(),
            BuildError::KindConflict {
                first: Kind::Bool,
                second: Kind::Tristate,
                ..
            }
        ));

        let provider = MemorySourceProvider::new()
            .with_file("Kconfig", "config A\n\tprompt \"a\"\n");
        assert!(matches!(
            build(&provider).unwrap_err(),
            BuildError::MissingKind { .. }
        ));
    }

    #[test]
    fn undefined_references() {
        let provider = MemorySourceProvider::new().with_file(
            "Kconfig",
            "config FOO\n\ttristate\n\tdepends on BAZ\n\tselect QUUX\n",
        );

        assert_eq!(
            build(&provider).unwrap_err(),
            BuildError::Reference {
                symbol: String::from("QUUX"),
                referenced_by: String::from("FOO"),
            }
        );

        let options = BuildOptionsBuilder::default()
            .allow_undefined(true)
            .build()
            .unwrap();
        let g = build_with(&provider, &options).unwrap();
        assert_eq!(g.get("BAZ").unwrap().kind, Kind::Unknown);
        assert_eq!(
            g.warnings(),
            &[
                Diagnostic::UndefinedSymbol {
                    symbol: String::from("QUUX"),
                    referenced_by: String::from("FOO"),
                },
                Diagnostic::UndefinedSymbol {
                    symbol: String::from("BAZ"),
                    referenced_by: String::from("FOO"),
                },
            ]
        );
    }

    #[test]
    fn choice_groups() {
        let provider = MemorySourceProvider::new().with_file(
            "Kconfig",
            r#"
choice
	prompt "Preemption"
	depends on SMP

config PREEMPT_NONE
	bool "none"

config PREEMPT
	bool "full"

endchoice

config SMP
	bool
"#,
        );

        let g = build(&provider).unwrap();
        assert_eq!(g.choices().len(), 1);
        assert_eq!(g.choices()[0].members, vec!["PREEMPT_NONE", "PREEMPT"]);
        assert_eq!(g.get("PREEMPT").unwrap().choice, Some(0));
        assert_eq!(g.get("PREEMPT").unwrap().depends_on, Some(sym("SMP")));
    }
}
