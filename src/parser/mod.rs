pub mod imports;
pub mod languages;
pub mod transform;

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::Path;

use tree_sitter::{Node, Parser, Tree};

use crate::error::FileError;
use crate::graph::edge::RawDependency;

use imports::extract_dependencies;
use languages::Grammar;
use transform::type_only_statements;

// One parser per language per rayon worker thread.
// Grammar setup only fails on an ABI mismatch between tree-sitter and the grammar crate.
thread_local! {
    static PARSER_TS: RefCell<Parser> = RefCell::new({
        let mut p = Parser::new();
        p.set_language(&Grammar::TypeScript.language()).expect("typescript grammar ABI");
        p
    });
    static PARSER_TSX: RefCell<Parser> = RefCell::new({
        let mut p = Parser::new();
        p.set_language(&Grammar::Tsx.language()).expect("tsx grammar ABI");
        p
    });
    static PARSER_JS: RefCell<Parser> = RefCell::new({
        let mut p = Parser::new();
        p.set_language(&Grammar::JavaScript.language()).expect("javascript grammar ABI");
        p
    });
}

/// Extraction switches, copied out of the build options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Do not record `import(...)` calls.
    pub skip_dynamic_imports: bool,
    /// Elide type-only dependencies of typed files before extraction.
    pub transform: bool,
}

/// The parse service used by the graph builder: source text in, raw
/// dependency declarations out.
pub trait ModuleParser: Send + Sync {
    fn parse_dependencies(
        &self,
        path: &Path,
        source: &[u8],
        options: ExtractOptions,
    ) -> Result<Vec<RawDependency>, FileError>;
}

/// Default [`ModuleParser`] backed by tree-sitter.
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeSitterParser;

impl ModuleParser for TreeSitterParser {
    fn parse_dependencies(
        &self,
        path: &Path,
        source: &[u8],
        options: ExtractOptions,
    ) -> Result<Vec<RawDependency>, FileError> {
        parse_file(path, source, options)
    }
}

/// Parse a file with the thread-local parser for its grammar and extract its
/// dependencies in source order.
///
/// tree-sitter recovers from syntax errors, so a file with `ERROR` nodes is
/// still extracted; the first error position is logged. Only a parse that
/// yields no tree at all is a failure.
pub fn parse_file(
    path: &Path,
    source: &[u8],
    options: ExtractOptions,
) -> Result<Vec<RawDependency>, FileError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let grammar = Grammar::for_extension(ext);

    let tree = match grammar {
        Grammar::TypeScript => PARSER_TS.with(|p| p.borrow_mut().parse(source, None)),
        Grammar::Tsx => PARSER_TSX.with(|p| p.borrow_mut().parse(source, None)),
        Grammar::JavaScript => PARSER_JS.with(|p| p.borrow_mut().parse(source, None)),
    };
    let tree = tree.ok_or_else(|| FileError::Syntax {
        path: path.to_path_buf(),
        line: 1,
        column: 1,
    })?;

    if let Some(err) = first_error(&tree) {
        let pos = err.start_position();
        tracing::warn!(
            "{}:{}:{}: syntax error, extracting what parsed",
            path.display(),
            pos.row + 1,
            pos.column + 1
        );
    }

    let elided = if options.transform && grammar.is_typed() {
        type_only_statements(&tree, source)
    } else {
        HashSet::new()
    };

    Ok(extract_dependencies(
        &tree,
        source,
        options.skip_dynamic_imports,
        &elided,
    ))
}

/// The first `ERROR` or missing node in document order.
fn first_error(tree: &Tree) -> Option<Node<'_>> {
    let root = tree.root_node();
    if !root.has_error() {
        return None;
    }
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        let mut cursor = node.walk();
        let children: Vec<Node> = node
            .children(&mut cursor)
            .filter(|c| c.has_error())
            .collect();
        stack.extend(children.into_iter().rev());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::edge::DependencyKind;

    #[test]
    fn test_parse_file_picks_grammar_by_extension() {
        // Angle-bracket assertion only parses cleanly with the TypeScript grammar.
        let src = b"import { a } from './a';\nconst x = <number>a;";
        let deps = parse_file(Path::new("/p/x.ts"), src, ExtractOptions::default()).unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].request, "./a");
    }

    #[test]
    fn test_parse_file_recovers_from_syntax_errors() {
        let src = b"import a from './a';\nconst = ;\nrequire('./b');";
        let deps = parse_file(Path::new("/p/x.js"), src, ExtractOptions::default()).unwrap();
        let requests: Vec<_> = deps.iter().map(|d| d.request.as_str()).collect();
        assert!(requests.contains(&"./a"));
    }

    #[test]
    fn test_transform_only_applies_to_typed_files() {
        let src = b"import { T } from './types';";
        let opts = ExtractOptions {
            transform: true,
            ..Default::default()
        };
        let ts = parse_file(Path::new("/p/x.ts"), src, opts).unwrap();
        assert!(ts.is_empty(), "unused import elided in .ts");
        let js = parse_file(Path::new("/p/x.js"), src, opts).unwrap();
        assert_eq!(js.len(), 1, "plain JS is never transformed");
        assert_eq!(js[0].kind, DependencyKind::StaticImport);
    }
}
