//! Configuration fragment output: a fixed header, then one `CONFIG_<NAME>=<value>` line per
//! assigned option, sorted by name.
use kslice_solver::{Assignment, Graph, Kind, Tristate, Value};

pub const HEADER: &str = "\
#
# Configuration fragment generated by kslice.
# Merge it over a base configuration with scripts/kconfig/merge_config.sh.
#
";

fn quote(value: &str) -> String {
    let mut ret = String::with_capacity(value.len() + 2);
    ret.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            ret.push('\\');
        }
        ret.push(c);
    }
    ret.push('"');
    ret
}

/// Right-hand side of a fragment line; `None` for options that are off.
pub fn format_value(kind: Kind, value: &Value) -> Option<String> {
    match value {
        Value::Tristate(Tristate::N) => None,
        Value::Tristate(t) => Some(t.to_string()),
        Value::Literal(s) if kind == Kind::String => Some(quote(s)),
        Value::Literal(s) => Some(s.clone()),
    }
}

pub fn render(graph: &Graph, assignment: &Assignment) -> String {
    let lines = assignment.iter().filter_map(|(name, value)| {
        let kind = graph.get(name).map_or(Kind::Unknown, |o| o.kind);
        format_value(kind, value).map(|value| format!("CONFIG_{name}={value}\n"))
    });

    std::iter::once(HEADER.to_string()).chain(lines).collect()
}

#[cfg(test)]
mod tests {
    use kslice_solver::{build_graph, BuildOptions, MemorySourceProvider, Tristate, Value};
    use maplit::btreemap;
    use pretty_assertions::assert_eq;

    use super::{render, HEADER};

    #[test]
    fn sorted_lines_after_header() {
        let provider = MemorySourceProvider::new().with_file(
            "Kconfig",
            r#"
config NET
	bool "net"

config INET
	tristate "inet"

config HOSTNAME
	string "hostname"

config LOG_BUF_SHIFT
	int "log buffer shift"

config PHYS_START
	hex "physical start"

config OFF
	bool "off"
"#,
        );
        let graph = build_graph(&provider, "Kconfig", &BuildOptions::default()).unwrap();

        let assignment = btreemap! {
            String::from("NET") => Value::Tristate(Tristate::Y),
            String::from("INET") => Value::Tristate(Tristate::M),
            String::from("HOSTNAME") => Value::literal(r#"my "box""#),
            String::from("LOG_BUF_SHIFT") => Value::literal("17"),
            String::from("PHYS_START") => Value::literal("0x1000000"),
            String::from("OFF") => Value::Tristate(Tristate::N),
        };

        let expected = format!(
            "{HEADER}{}",
            r#"CONFIG_HOSTNAME="my \"box\""
CONFIG_INET=m
CONFIG_LOG_BUF_SHIFT=17
CONFIG_NET=y
CONFIG_PHYS_START=0x1000000
"#
        );
        assert_eq!(render(&graph, &assignment), expected);
    }
}
