use std::collections::HashSet;

use tree_sitter::{Node, Tree};

use crate::graph::edge::{DependencyKind, RawDependency};

/// The conventional CommonJS loader name.
const REQUIRE_FN: &str = "require";

// ---------------------------------------------------------------------------
// Helper utilities
// ---------------------------------------------------------------------------

fn node_text<'a>(node: Node<'a>, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// Append the character an escape sequence stands for. Sequences that do
/// not name a valid scalar value (lone surrogates) are kept as written.
fn push_escape(seq: &str, out: &mut String) {
    let body = seq.strip_prefix('\\').unwrap_or(seq);
    let mut chars = body.chars();
    let decoded = match chars.next() {
        Some('n') => Some('\n'),
        Some('t') => Some('\t'),
        Some('r') => Some('\r'),
        Some('b') => Some('\u{8}'),
        Some('f') => Some('\u{c}'),
        Some('v') => Some('\u{b}'),
        Some('0') if body.len() == 1 => Some('\0'),
        Some('x' | 'u') => {
            let hex = chars.as_str().trim_start_matches('{').trim_end_matches('}');
            u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
        }
        // Line continuation.
        Some('\n' | '\r' | '\u{2028}' | '\u{2029}') => return,
        Some(c) => Some(c),
        None => None,
    };
    match decoded {
        Some(c) => out.push(c),
        None => out.push_str(seq),
    }
}

/// The value of a `string` literal node, without its quotes and with escape
/// sequences decoded.
pub(crate) fn string_literal_value(node: Node, source: &[u8]) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }
    let mut value = String::new();
    let mut cursor = node.walk();
    for part in node.named_children(&mut cursor) {
        match part.kind() {
            "escape_sequence" => push_escape(node_text(part, source), &mut value),
            _ => value.push_str(node_text(part, source)),
        }
    }
    Some(value)
}

/// The single string literal argument of a call, or `None` when the call
/// has zero, several, or non-literal arguments.
fn single_string_argument(args: Node, source: &[u8]) -> Option<String> {
    let mut cursor = args.walk();
    let mut named = args
        .named_children(&mut cursor)
        .filter(|c| c.kind() != "comment");
    let first = named.next()?;
    if named.next().is_some() {
        return None;
    }
    string_literal_value(first, source)
}

// ---------------------------------------------------------------------------
// Pattern matching
// ---------------------------------------------------------------------------

/// `import ... from 'x'`, `import 'x'`, and TypeScript's `import x = require('x')`.
fn match_import_statement(node: Node, source: &[u8]) -> Option<RawDependency> {
    if let Some(src) = node.child_by_field_name("source") {
        return string_literal_value(src, source).map(|request| RawDependency {
            request,
            kind: DependencyKind::StaticImport,
        });
    }
    let mut cursor = node.walk();
    let clause = node
        .children(&mut cursor)
        .find(|c| c.kind() == "import_require_clause")?;
    let src = clause.child_by_field_name("source")?;
    string_literal_value(src, source).map(|request| RawDependency {
        request,
        kind: DependencyKind::CommonJsRequire,
    })
}

/// `import('x')` (unless suppressed) or `require('x')`.
fn match_call(node: Node, source: &[u8], skip_dynamic: bool) -> Option<RawDependency> {
    let function = node.child_by_field_name("function")?;
    let args = node.child_by_field_name("arguments")?;

    let kind = match function.kind() {
        "import" if !skip_dynamic => DependencyKind::DynamicImport,
        "identifier" if node_text(function, source) == REQUIRE_FN => {
            DependencyKind::CommonJsRequire
        }
        _ => return None,
    };

    single_string_argument(args, source).map(|request| RawDependency { request, kind })
}

/// `export { X } from 'x'`, `export * from 'x'`.
fn match_reexport(node: Node, source: &[u8]) -> Option<RawDependency> {
    let src = node.child_by_field_name("source")?;
    string_literal_value(src, source).map(|request| RawDependency {
        request,
        kind: DependencyKind::StaticReExport,
    })
}

fn match_dependency(node: Node, source: &[u8], skip_dynamic: bool) -> Option<RawDependency> {
    match node.kind() {
        "import_statement" => match_import_statement(node, source),
        "call_expression" => match_call(node, source, skip_dynamic),
        "export_statement" => match_reexport(node, source),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extract every dependency declaration from a parsed syntax tree, in source order.
///
/// A node that matches one of the four dependency shapes is recorded and not
/// descended into. Every other node has its children visited, so a `require`
/// nested inside a conditional or a function body is still found.
///
/// `elided` holds ids of statements to drop entirely (see
/// [`super::transform::type_only_statements`]).
pub fn extract_dependencies(
    tree: &Tree,
    source: &[u8],
    skip_dynamic: bool,
    elided: &HashSet<usize>,
) -> Vec<RawDependency> {
    let mut deps = Vec::new();
    let mut stack = vec![tree.root_node()];

    while let Some(node) = stack.pop() {
        if elided.contains(&node.id()) {
            continue;
        }
        if let Some(dep) = match_dependency(node, source, skip_dynamic) {
            deps.push(dep);
            continue;
        }
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        // Reversed so the first child is popped first.
        stack.extend(children.into_iter().rev());
    }

    deps
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
