use std::collections::HashSet;

use tree_sitter::{Node, Tree};

/// Node kinds that reference a binding in value position.
///
/// Type positions use `type_identifier` in the TypeScript grammars, so an
/// import only used in annotations never shows up here.
const VALUE_IDENTIFIER_KINDS: &[&str] = &["identifier", "shorthand_property_identifier"];

fn node_text<'a>(node: Node<'a>, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// `true` if `node` has an anonymous `type` keyword child
/// (`import type ...`, `export type ...`, `{ type Foo }`).
fn has_type_keyword(node: Node) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .any(|c| !c.is_named() && c.kind() == "type")
}

fn find_child_of_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|c| c.kind() == kind)
}

/// Local names bound by an `import_clause` that can carry a runtime value.
/// `type`-qualified named specifiers are left out.
fn value_bindings<'a>(clause: Node<'a>, source: &'a [u8]) -> Vec<&'a str> {
    let mut names = Vec::new();
    let mut cursor = clause.walk();
    for child in clause.children(&mut cursor) {
        match child.kind() {
            // Default import: `import React from ...`
            "identifier" => names.push(node_text(child, source)),
            "namespace_import" => {
                if let Some(id) = find_child_of_kind(child, "identifier") {
                    names.push(node_text(id, source));
                }
            }
            "named_imports" => {
                let mut inner = child.walk();
                for spec in child.children(&mut inner) {
                    if spec.kind() != "import_specifier" || has_type_keyword(spec) {
                        continue;
                    }
                    let local = spec
                        .child_by_field_name("alias")
                        .or_else(|| spec.child_by_field_name("name"));
                    if let Some(local) = local {
                        names.push(node_text(local, source));
                    }
                }
            }
            _ => {}
        }
    }
    names
}

/// Every identifier used in value position outside import statements.
fn value_references<'a>(root: Node<'a>, source: &'a [u8]) -> HashSet<&'a str> {
    let mut refs = HashSet::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.kind() == "import_statement" {
            continue;
        }
        if VALUE_IDENTIFIER_KINDS.contains(&node.kind()) {
            refs.insert(node_text(node, source));
        }
        let mut cursor = node.walk();
        stack.extend(node.children(&mut cursor));
    }
    refs
}

/// Ids of top-level statements whose dependency only carries types, and so
/// would disappear when the module is transpiled to plain JavaScript.
///
/// Elided:
/// - `import type ... from 'x'` and `export type { ... } from 'x'`
/// - imports whose every named binding is `type`-qualified
/// - imports none of whose bindings is referenced as a value
///
/// Side-effect imports (`import 'x'`) and `import x = require('x')` are kept.
pub fn type_only_statements(tree: &Tree, source: &[u8]) -> HashSet<usize> {
    let root = tree.root_node();
    let refs = value_references(root, source);
    let mut elided = HashSet::new();

    let mut cursor = root.walk();
    for stmt in root.children(&mut cursor) {
        match stmt.kind() {
            "import_statement" => {
                if has_type_keyword(stmt) {
                    elided.insert(stmt.id());
                    continue;
                }
                let Some(clause) = find_child_of_kind(stmt, "import_clause") else {
                    continue;
                };
                let bindings = value_bindings(clause, source);
                if !bindings.iter().any(|b| refs.contains(b)) {
                    elided.insert(stmt.id());
                }
            }
            "export_statement" => {
                if stmt.child_by_field_name("source").is_some() && has_type_keyword(stmt) {
                    elided.insert(stmt.id());
                }
            }
            _ => {}
        }
    }

    elided
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::imports::extract_dependencies;
    use crate::parser::languages::Grammar;

    fn surviving(source: &str) -> Vec<String> {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&Grammar::TypeScript.language()).unwrap();
        let tree = parser.parse(source.as_bytes(), None).unwrap();
        let elided = type_only_statements(&tree, source.as_bytes());
        extract_dependencies(&tree, source.as_bytes(), false, &elided)
            .into_iter()
            .map(|d| d.request)
            .collect()
    }

    #[test]
    fn test_import_type_is_elided() {
        let src = "import type { User } from './user';\nexport function f(u: User) { return u; }";
        assert!(surviving(src).is_empty());
    }

    #[test]
    fn test_import_used_only_in_annotations_is_elided() {
        let src = "import { User } from './user';\nexport function f(u: User): User { return u; }";
        assert!(surviving(src).is_empty());
    }

    #[test]
    fn test_import_used_as_value_is_kept() {
        let src = "import { make } from './factory';\nexport const x = make();";
        assert_eq!(surviving(src), vec!["./factory"]);
    }

    #[test]
    fn test_all_type_specifiers_elided() {
        let src = "import { type A, type B } from './types';\nlet a: A;";
        assert!(surviving(src).is_empty());
    }

    #[test]
    fn test_side_effect_import_is_kept() {
        assert_eq!(surviving("import './polyfill';"), vec!["./polyfill"]);
    }

    #[test]
    fn test_export_type_from_is_elided() {
        let src = "export type { A } from './a';\nexport * from './b';";
        assert_eq!(surviving(src), vec!["./b"]);
    }
}
