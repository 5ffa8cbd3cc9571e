use std::collections::HashMap;
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::Context;

use depgraph::graph::{AnalysisOutput, DependencyTree};

/// ANSI styling, enabled only when stdout is a terminal.
#[derive(Debug, Clone, Copy)]
pub struct Style {
    color: bool,
}

impl Style {
    pub fn detect() -> Self {
        Self {
            color: std::io::stdout().is_terminal(),
        }
    }

    #[cfg(test)]
    pub fn plain() -> Self {
        Self { color: false }
    }

    fn paint(&self, code: &str, s: &str) -> String {
        if self.color {
            format!("\x1b[{code}m{s}\x1b[0m")
        } else {
            s.to_owned()
        }
    }

    pub fn bold(&self, s: &str) -> String {
        self.paint("1", s)
    }

    fn dim(&self, s: &str) -> String {
        self.paint("2", s)
    }

    fn yellow(&self, s: &str) -> String {
        self.paint("93", s)
    }

    fn cyan(&self, s: &str) -> String {
        self.paint("96", s)
    }

    fn green(&self, s: &str) -> String {
        self.paint("1;32", s)
    }

    fn red(&self, s: &str) -> String {
        self.paint("1;31", s)
    }
}

/// Width needed to print every index in `0..count`.
fn index_width(count: usize) -> usize {
    count.saturating_sub(1).to_string().len()
}

/// Render the dependency tree depth-first from each entry.
///
/// Every distinct module gets a number on first sight; later visits print
/// the number dimmed and are not expanded again. Ignored modules and
/// unresolved requests are highlighted and never expanded.
pub fn render_tree(tree: &DependencyTree, entries: &[PathBuf], style: Style) -> String {
    let digits = index_width(tree.len());
    let mut ids: HashMap<PathBuf, usize> = HashMap::new();
    let mut lines = Vec::new();

    // (module, depth), popped in pre-order.
    let mut stack: Vec<(PathBuf, usize)> = entries.iter().rev().map(|e| (e.clone(), 0)).collect();
    while let Some((item, depth)) = stack.pop() {
        let next_id = ids.len();
        let (id, is_new) = match ids.get(&item) {
            Some(&id) => (id, false),
            None => {
                ids.insert(item.clone(), next_id);
                (next_id, true)
            }
        };

        let indent = "    ".repeat(depth);
        let label = style.dim(&format!("  {indent}- {id:0digits$}) "));
        let name = item.display().to_string();

        match tree.get(&item) {
            _ if !is_new => lines.push(format!("{label}{}", style.dim(&name))),
            Some(Some(deps)) => {
                lines.push(format!("{label}{}", style.bold(&name)));
                for dep in deps.iter().rev() {
                    let child = dep.id.clone().unwrap_or_else(|| PathBuf::from(&dep.request));
                    stack.push((child, depth + 1));
                }
            }
            _ => lines.push(format!("{label}{}", style.yellow(&name))),
        }
    }

    lines.join("\n")
}

/// Number each cycle from 1: `  1) a -> b -> c`.
pub fn render_cycles(cycles: &[Vec<PathBuf>], style: Style) -> String {
    let digits = cycles.len().to_string().len();
    cycles
        .iter()
        .enumerate()
        .map(|(i, cycle)| {
            let chain: Vec<String> = cycle.iter().map(|p| style.cyan(&p.display().to_string())).collect();
            format!(
                "{}{}",
                style.dim(&format!("  {:0digits$}) ", i + 1)),
                chain.join(&style.dim(" -> "))
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Number each warning from 1.
pub fn render_warnings(warnings: &[String], style: Style) -> String {
    let digits = warnings.len().to_string().len();
    warnings
        .iter()
        .enumerate()
        .map(|(i, w)| {
            format!(
                "{}{}",
                style.dim(&format!("  {:0digits$}) ", i + 1)),
                style.yellow(w)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The plain-text report, one section per enabled flag.
pub struct Report<'a> {
    pub analysis: &'a AnalysisOutput,
    pub warnings: &'a [String],
    pub unused: Option<&'a [PathBuf]>,
    pub show_tree: bool,
    pub show_cycles: bool,
    pub show_warnings: bool,
}

impl Report<'_> {
    pub fn render(&self, style: Style) -> String {
        let mut out = String::new();

        if self.show_tree {
            out.push_str(&style.bold("• Dependencies Tree"));
            out.push('\n');
            out.push_str(&render_tree(&self.analysis.tree, &self.analysis.entries, style));
            out.push_str("\n\n");
        }

        if self.show_cycles {
            let cycles = &self.analysis.cycles;
            if cycles.is_empty() {
                out.push_str(&style.green("• Circular Dependencies"));
                out.push('\n');
                out.push_str(&style.green("  ✅ Congratulations, no circular dependency was found in your project."));
            } else {
                out.push_str(&style.red("• Circular Dependencies"));
                out.push('\n');
                out.push_str(&render_cycles(cycles, style));
            }
            out.push_str("\n\n");
        }

        if self.show_warnings {
            out.push_str(&style.yellow(&style.bold("• Warnings")));
            out.push('\n');
            out.push_str(&render_warnings(self.warnings, style));
            out.push_str("\n\n");
        }

        if let Some(unused) = self.unused {
            out.push_str(&style.cyan(&style.bold("• Unused files")));
            out.push('\n');
            if unused.is_empty() {
                out.push_str(&style.green(&format!(
                    "  ✅ Congratulations, no unused file was found in your project. (used: {})",
                    self.analysis.tree.len()
                )));
            } else {
                let digits = index_width(unused.len());
                let lines: Vec<String> = unused
                    .iter()
                    .enumerate()
                    .map(|(i, f)| format!("{i:0digits$}) {}", f.display()))
                    .collect();
                out.push_str(&lines.join("\n"));
            }
            out.push('\n');
        }

        out
    }
}

/// Write the analysis as pretty JSON, creating parent directories as needed.
pub fn write_json(path: &Path, analysis: &AnalysisOutput) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(analysis).context("failed to serialize analysis")?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use depgraph::graph::edge::{Dependency, DependencyKind};

    fn dep(issuer: &str, request: &str, id: Option<&str>) -> Dependency {
        Dependency {
            issuer: PathBuf::from(issuer),
            request: request.to_owned(),
            kind: DependencyKind::StaticImport,
            id: id.map(PathBuf::from),
        }
    }

    fn sample_tree() -> DependencyTree {
        let mut tree = DependencyTree::new();
        tree.insert(
            PathBuf::from("a.ts"),
            Some(vec![
                dep("a.ts", "./b", Some("b.ts")),
                dep("a.ts", "./gone", None),
                dep("a.ts", "./c", Some("c.js")),
            ]),
        );
        tree.insert(PathBuf::from("b.ts"), Some(vec![dep("b.ts", "./a", Some("a.ts"))]));
        tree.insert(PathBuf::from("c.js"), None);
        tree
    }

    #[test]
    fn test_render_tree_numbers_and_abbreviates_repeats() {
        let rendered = render_tree(&sample_tree(), &[PathBuf::from("a.ts")], Style::plain());
        assert_eq!(
            rendered,
            [
                "  - 0) a.ts",
                "      - 1) b.ts",
                "          - 0) a.ts",
                "      - 2) ./gone",
                "      - 3) c.js",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_render_cycles() {
        let cycles = vec![
            vec![PathBuf::from("a.ts"), PathBuf::from("b.ts")],
            vec![PathBuf::from("x.ts")],
        ];
        assert_eq!(
            render_cycles(&cycles, Style::plain()),
            "  1) a.ts -> b.ts\n  2) x.ts"
        );
    }

    #[test]
    fn test_report_sections() {
        let analysis = AnalysisOutput {
            entries: vec![PathBuf::from("a.ts")],
            tree: sample_tree(),
            cycles: vec![],
        };
        let warnings = vec![r#"miss "./gone" in "a.ts""#.to_owned()];
        let unused = vec![PathBuf::from("old.ts")];
        let report = Report {
            analysis: &analysis,
            warnings: &warnings,
            unused: Some(&unused),
            show_tree: false,
            show_cycles: true,
            show_warnings: true,
        };
        let text = report.render(Style::plain());
        assert!(!text.contains("Dependencies Tree"));
        assert!(text.contains("no circular dependency was found"));
        assert!(text.contains(r#"  1) miss "./gone" in "a.ts""#));
        assert!(text.contains("• Unused files\n0) old.ts"));
    }

    #[test]
    fn test_write_json_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/deps.json");
        let analysis = AnalysisOutput {
            entries: vec![PathBuf::from("a.ts")],
            tree: sample_tree(),
            cycles: vec![vec![PathBuf::from("a.ts"), PathBuf::from("b.ts")]],
        };
        write_json(&path, &analysis).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["entries"][0], "a.ts");
        assert_eq!(value["tree"]["c.js"], serde_json::Value::Null);
        assert_eq!(value["tree"]["a.ts"][1]["id"], serde_json::Value::Null);
        assert_eq!(value["tree"]["a.ts"][0]["kind"], "StaticImport");
        assert_eq!(value["cycles"][0][1], "b.ts");
    }
}
