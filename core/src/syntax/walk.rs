//! # Traversal
//!
//! Pre-order depth-first walk over a syntax tree where the visitor decides,
//! node by node, whether the walk descends into the children.

use crate::error::{AppError, AppResult};
use tree_sitter::Node;

/// What the walk should do after visiting a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Visit the node's children next.
    Descend,
    /// Skip the node's children; siblings are still visited.
    Skip,
}

/// Callback invoked for every node reached by [`walk`].
pub trait SyntaxVisitor<'t> {
    /// Visits `node`. An error stops the walk and is returned by [`walk`].
    fn visit(&mut self, node: Node<'t>) -> AppResult<Visit>;
}

impl<'t, F> SyntaxVisitor<'t> for F
where
    F: FnMut(Node<'t>) -> AppResult<Visit>,
{
    fn visit(&mut self, node: Node<'t>) -> AppResult<Visit> {
        self(node)
    }
}

/// Walks every node reachable from `root`, parents before children.
///
/// Fails with [`AppError::MissingInput`] when there is no root to start from.
///
/// # Examples
/// ```
/// use tagsmith_core::syntax::{parse_source, walk, Visit};
///
/// let unit = parse_source("a.go", "package a\ntype A struct{ X int }\n".to_string()).unwrap();
/// let mut kinds = Vec::new();
/// walk(Some(unit.tree().root_node()), &mut |node: tree_sitter::Node| {
///     kinds.push(node.kind());
///     Ok(Visit::Descend)
/// })
/// .unwrap();
/// assert_eq!(kinds[0], "source_file");
/// assert!(kinds.contains(&"field_declaration"));
/// ```
pub fn walk<'t, V>(root: Option<Node<'t>>, visitor: &mut V) -> AppResult<()>
where
    V: SyntaxVisitor<'t> + ?Sized,
{
    let root = root.ok_or_else(|| AppError::MissingInput("syntax tree".into()))?;

    // The cursor cannot leave the subtree it was created on.
    let mut cursor = root.walk();
    loop {
        let decision = visitor.visit(cursor.node())?;
        if decision == Visit::Descend && cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return Ok(());
            }
        }
    }
}
