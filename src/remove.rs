//! Removing a path expression from the tree (SPEC_FULL.md §4.6).
//!
//! Grounded on `confctl_var_remove`/`cc_var_remove`/`cv_delete` in
//! `libconfctl.c`: like merge, removal walks the *whole* set of
//! same-named children at each level (not just the first), matching the
//! original's "visit every child, recurse if the name matches" structure —
//! duplicate siblings (`1 { foo }\n1 { bar }\n`) both get visited when
//! removing `1.foo`, even though only the one actually containing `foo`
//! has anything to delete. Deleting a node can leave its parent a childless
//! synthetic container from a case-3 implicit-nesting parse (SPEC_FULL.md
//! §4.2) — that container only existed to hold what it held, so removal
//! cascades upward through any run of now-empty `implicit_container`
//! ancestors, checked at each level as the recursion unwinds (mirroring the
//! original's `cv_delete_when_empty` check running after every level's
//! children have been processed, not just the deepest one).

use crate::buffer::ByteBuf;
use crate::error::RemoveError;
use crate::node::{NodeId, Tree};
use crate::path::PathExpr;

/// Removes every subtree addressed by `path`, cascading through now-empty
/// implicit containers left behind. Returns whether anything was removed —
/// a path matching nothing is a no-op, not an error.
pub fn remove(tree: &mut Tree, path: &PathExpr) -> Result<bool, RemoveError> {
    path.require_no_value()?;

    if path.segments.is_empty() {
        return Ok(false);
    }

    let mut removed = false;
    remove_rec(tree, tree.root(), &path.segments, 0, &mut removed);
    Ok(removed)
}

fn remove_rec(tree: &mut Tree, parent: NodeId, segments: &[ByteBuf], depth: usize, removed: &mut bool) {
    let seg = &segments[depth];
    let matching: Vec<NodeId> = tree
        .children(parent)
        .iter()
        .copied()
        .filter(|&c| tree.name_bytes(c) == seg.as_bytes())
        .collect();

    for child in matching {
        if depth + 1 == segments.len() {
            tree.delete(child);
            *removed = true;
            continue;
        }
        remove_rec(tree, child, segments, depth + 1, removed);
        if tree.get(child).implicit_container && tree.children(child).is_empty() {
            tree.delete(child);
        }
    }
}
