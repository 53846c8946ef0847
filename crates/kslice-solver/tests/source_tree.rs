use std::fs;
use std::path::{Path, PathBuf};

use kslice_solver::{
    build_graph, entry_file, resolve, BuildError, BuildOptionsBuilder, Diagnostic,
    FsSourceProvider, ResolveOptions, SourceProvider,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write(root: &Path, path: &str, contents: &str) {
    let path = root.join(path);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn tree() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    write(
        root,
        "arch/x86/Kconfig",
        "config X86\n\tdef_bool y\n\tselect HAVE_NET\n\nsource \"Kconfig\"\n",
    );
    write(
        root,
        "Kconfig",
        "mainmenu \"Test kernel\"\n\nsource \"net/Kconfig\"\nosource \"missing/Kconfig\"\n",
    );
    write(
        root,
        "net/Kconfig",
        r#"
config HAVE_NET
	bool

menuconfig NET
	bool "networking"
	depends on HAVE_NET

if NET
rsource "ipv4/Kconfig"
endif
"#,
    );
    write(
        root,
        "net/ipv4/Kconfig",
        "config INET\n\ttristate \"tcp/ip\"\n\thelp\n\t  The protocol.\n",
    );

    dir
}

#[test]
fn resolves_an_on_disk_tree() {
    let dir = tree();
    let provider = FsSourceProvider::new(dir.path());
    let entry = entry_file(&provider, Some("x86_64"));
    assert_eq!(entry, PathBuf::from("arch/x86/Kconfig"));

    let options = BuildOptionsBuilder::default()
        .arch("x86_64")
        .build()
        .unwrap();
    let g = build_graph(&provider, &entry, &options).unwrap();
    assert_eq!(g.len(), 4);
    assert!(g.warnings().is_empty());

    let r = resolve(["CONFIG_INET"], &g, &ResolveOptions::default()).unwrap();
    let values: Vec<String> = r
        .assignment
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect();
    assert_eq!(values, ["HAVE_NET=y", "INET=m", "NET=y"]);
    assert!(r.diagnostics.is_empty());
}

#[test]
fn unknown_arch_falls_back_to_top_level() {
    let dir = tree();
    let provider = FsSourceProvider::new(dir.path());
    assert_eq!(
        entry_file(&provider, Some("riscv")),
        PathBuf::from("Kconfig")
    );

    // Without the architecture file nothing declares X86, so HAVE_NET is never on
    let g = build_graph(&provider, "Kconfig", &Default::default()).unwrap();
    let r = resolve(["INET"], &g, &ResolveOptions::default()).unwrap();
    assert!(r.assignment.is_empty());
    assert_eq!(
        r.diagnostics,
        vec![Diagnostic::BlockedSeed {
            option: String::from("INET"),
            expression: String::from("NET"),
        }]
    );
}

#[test]
fn missing_and_escaping_includes() {
    let dir = tree();
    let provider = FsSourceProvider::new(dir.path());

    write(dir.path(), "Kconfig", "source \"drivers/Kconfig\"\n");
    let err = build_graph(&provider, "Kconfig", &Default::default()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingInclude { path, line: 1, .. }) if path == Path::new("drivers/Kconfig")
    ));

    write(dir.path(), "Kconfig", "\nsource \"../Kconfig\"\n");
    let err = build_graph(&provider, "Kconfig", &Default::default()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::OutsideRoot { line: 2, .. })
    ));
}

#[cfg(unix)]
#[test]
fn links_out_of_the_tree_are_rejected() {
    let dir = tree();
    let outside = tempfile::tempdir().unwrap();
    write(outside.path(), "Kconfig", "config LEAKED\n\tbool\n");
    std::os::unix::fs::symlink(outside.path(), dir.path().join("vendor")).unwrap();
    std::os::unix::fs::symlink(dir.path().join("net"), dir.path().join("network")).unwrap();
    let provider = FsSourceProvider::new(dir.path());

    write(dir.path(), "Kconfig", "source \"vendor/Kconfig\"\n");
    let err = build_graph(&provider, "Kconfig", &Default::default()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::OutsideRoot { path, line: 1, .. }) if path == "vendor/Kconfig"
    ));
    assert!(provider.read(Path::new("vendor/Kconfig")).is_err());

    // Links that stay inside the tree are fine
    write(dir.path(), "Kconfig", "config HAVE_NET\n\tbool\n\nsource \"network/ipv4/Kconfig\"\n");
    let g = build_graph(&provider, "Kconfig", &Default::default()).unwrap();
    assert!(g.contains("INET"));
}
