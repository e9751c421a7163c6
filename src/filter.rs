//! Non-destructive query filtering (SPEC_FULL.md §4.7).
//!
//! Grounded on `cv_filter`/`confctl_var_filter`, with one deliberate change:
//! the original unconditionally overwrites each node's `filtered_out` flag
//! per chain it applies, so a later chain that misses a node can re-hide
//! something an earlier chain revealed. Here every chain only ever *un*hides,
//! starting from "everything hidden" — so applying several filter
//! expressions together yields their union, not whichever was applied last.

use crate::error::FilterError;
use crate::node::{NodeId, Tree};
use crate::path::PathExpr;

/// Marks nodes hidden/visible for query output: everything starts hidden,
/// then each path in `paths` that matches a real node unhides that node,
/// every ancestor on the way to it, and its whole subtree.
pub fn apply(tree: &mut Tree, paths: &[PathExpr]) -> Result<(), FilterError> {
    for p in paths {
        p.require_no_value()?;
    }

    tree.hide_all();

    for p in paths {
        let mut current = tree.root();
        let mut matched = true;
        for seg in &p.segments {
            match find_child(tree, current, seg.as_bytes()) {
                Some(c) => current = c,
                None => {
                    matched = false;
                    break;
                }
            }
        }
        if matched {
            unhide_ancestors(tree, current);
            unhide_subtree(tree, current);
        }
    }

    Ok(())
}

fn find_child(tree: &Tree, parent: NodeId, name: &[u8]) -> Option<NodeId> {
    tree.children(parent)
        .iter()
        .copied()
        .find(|&c| tree.name_bytes(c) == name)
}

fn unhide_ancestors(tree: &mut Tree, id: NodeId) {
    let mut current = Some(id);
    while let Some(n) = current {
        tree.get_mut(n).hidden = false;
        current = tree.get(n).parent;
    }
}

fn unhide_subtree(tree: &mut Tree, id: NodeId) {
    tree.get_mut(id).hidden = false;
    let children: Vec<NodeId> = tree.children(id).to_vec();
    for child in children {
        unhide_subtree(tree, child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer;

    fn path(expr: &str) -> PathExpr {
        crate::path::parse(expr).unwrap()
    }

    fn sample() -> Tree {
        let cfg = crate::config::SyntaxConfig::default();
        crate::lexer::parse(b"a { x 1\ny 2 }\nb { z 3 }\n", &cfg).unwrap()
    }

    #[test]
    fn single_filter_hides_everything_else() {
        let mut tree = sample();
        apply(&mut tree, &[path("a")]).unwrap();
        let out = String::from_utf8(writer::emit_lines_to_vec(&tree)).unwrap();
        assert_eq!(out, "a.x=1\na.y=2\n");
    }

    #[test]
    fn multiple_filters_union_rather_than_overwrite() {
        let mut tree = sample();
        apply(&mut tree, &[path("a.x"), path("b")]).unwrap();
        let out = String::from_utf8(writer::emit_lines_to_vec(&tree)).unwrap();
        assert_eq!(out, "a.x=1\nb.z=3\n");
    }

    #[test]
    fn filter_rejects_value_specified_path() {
        let mut tree = sample();
        assert!(matches!(
            apply(&mut tree, &[path("a=1")]),
            Err(FilterError::ValueSpecified { .. })
        ));
    }
}
