//! Merging a path expression into the tree (SPEC_FULL.md §4.4).
//!
//! Two passes, mirroring `cv_merge_existing`/`cv_merge_new`: first follow as
//! much of the path as already exists, then attach whatever suffix didn't
//! already exist as brand new nodes. When a segment has same-named siblings
//! (`1 { foo }\n1 { bar }\n`), the first one whose subtree can actually
//! absorb the rest of the chain wins, not just the first by source order —
//! `can_absorb` does a read-only trial descent so the mutating `place` pass
//! never needs to undo a wrong guess. When *none* of them can (the one
//! candidate that exists is a leaf and the path wants to continue past it),
//! a fresh duplicate is created to carry the remainder instead of rejecting
//! the merge outright (SPEC_FULL.md §4.5 tie-break) — the one exception is
//! the terminal case of assigning a value straight onto an already-populated
//! container, which pass 1 always rejects regardless of how many duplicates
//! exist.

use crate::buffer::ByteBuf;
use crate::error::MergeError;
use crate::node::{NodeId, Tree};
use crate::path::PathExpr;

/// Applies `path` to `tree`: ensures every segment's container chain exists,
/// creating new nodes as needed, and sets the final value if `path` carries
/// one.
pub fn merge(tree: &mut Tree, path: &PathExpr) -> Result<(), MergeError> {
    let root = tree.root();
    place(tree, root, &path.segments, 0, path.value.as_ref())
}

/// Read-only: can `node` (already matched through `idx`) absorb
/// `segments[idx..]` plus `has_value`, without mutating anything?
fn can_absorb(tree: &Tree, node: NodeId, segments: &[ByteBuf], idx: usize, has_value: bool) -> bool {
    if idx == segments.len() {
        return !has_value || !(tree.get(node).is_container() && !tree.get(node).children.is_empty());
    }
    if tree.get(node).is_leaf() {
        return false;
    }
    let seg = &segments[idx];
    let candidates: Vec<NodeId> = tree
        .children(node)
        .iter()
        .copied()
        .filter(|&c| tree.name_bytes(c) == seg.as_bytes())
        .collect();
    if candidates.is_empty() {
        return true; // the rest of the chain would be created fresh
    }
    candidates
        .iter()
        .any(|&c| can_absorb(tree, c, segments, idx + 1, has_value))
}

/// Mutating descent, assuming (via `can_absorb`) that a legal placement
/// exists somewhere under `node`.
fn place(
    tree: &mut Tree,
    node: NodeId,
    segments: &[ByteBuf],
    idx: usize,
    value: Option<&ByteBuf>,
) -> Result<(), MergeError> {
    if idx == segments.len() {
        if let Some(v) = value {
            if tree.get(node).is_container() && !tree.get(node).children.is_empty() {
                return Err(MergeError::TypeConflict {
                    name: name_string(tree, node),
                });
            }
            tree.get_mut(node).value = Some(v.clone());
            tree.get_mut(node).needs_reindent = true;
        }
        return Ok(());
    }
    if tree.get(node).is_leaf() {
        return Err(MergeError::TypeConflict {
            name: name_string(tree, node),
        });
    }

    let seg = &segments[idx];
    let candidates: Vec<NodeId> = tree
        .children(node)
        .iter()
        .copied()
        .filter(|&c| tree.name_bytes(c) == seg.as_bytes())
        .collect();

    if candidates.is_empty() {
        log::trace!(
            "merge: attaching {} new segment(s) under `{}`",
            segments.len() - idx,
            name_string(tree, node)
        );
        let mut current = node;
        for s in &segments[idx..] {
            let child = tree.new_child(current, s.clone());
            tree.get_mut(child).needs_reindent = true;
            current = child;
        }
        if let Some(v) = value {
            tree.get_mut(current).value = Some(v.clone());
        }
        return Ok(());
    }

    for &cand in &candidates {
        if can_absorb(tree, cand, segments, idx + 1, value.is_some()) {
            return place(tree, cand, segments, idx + 1, value);
        }
    }

    if idx + 1 == segments.len() {
        // `seg` was the last segment: every candidate failed the same
        // terminal check (assigning a value onto an already-populated
        // container), which pass 1 always rejects — there is no fresh node
        // to fall back to creating, since the conflict is with the value
        // assignment itself, not with finding the right existing node.
        return Err(MergeError::TypeConflict {
            name: name_string(tree, candidates[0]),
        });
    }
    // The path continues past `seg`, but every existing node named `seg` is a
    // leaf (or otherwise blocks further descent): a brand new duplicate of
    // `seg` is created as a new last child of `node` to carry the remainder,
    // stably ordered after the existing duplicates, rather than erroring out
    // or forcing it under a node that can't structurally hold it
    // (SPEC_FULL.md §4.5 tie-break).
    log::trace!(
        "merge: no duplicate of `{}` absorbs the rest of the path, creating a new duplicate",
        name_string(tree, candidates[0])
    );
    let mut current = node;
    for s in &segments[idx..] {
        let child = tree.new_child(current, s.clone());
        tree.get_mut(child).needs_reindent = true;
        current = child;
    }
    if let Some(v) = value {
        tree.get_mut(current).value = Some(v.clone());
    }
    Ok(())
}

fn name_string(tree: &Tree, id: NodeId) -> String {
    String::from_utf8_lossy(tree.name_bytes(id)).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::ByteBuf;

    fn path(expr: &str) -> PathExpr {
        crate::path::parse(expr).unwrap()
    }

    #[test]
    fn merge_creates_full_chain_when_nothing_exists() {
        let mut tree = Tree::new();
        merge(&mut tree, &path("a.b.c=1")).unwrap();
        let root = tree.root();
        let a = tree.children(root)[0];
        let b = tree.children(a)[0];
        let c = tree.children(b)[0];
        assert_eq!(tree.get(c).value.as_ref().unwrap().as_bytes(), b"1");
    }

    #[test]
    fn merge_reuses_existing_prefix() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = tree.new_child(root, ByteBuf::from_str("a"));
        merge(&mut tree, &path("a.b=1")).unwrap();
        assert_eq!(tree.children(root), &[a]);
        assert_eq!(tree.children(a).len(), 1);
    }

    #[test]
    fn merge_updates_existing_leaf_value() {
        let mut tree = Tree::new();
        merge(&mut tree, &path("a=1")).unwrap();
        merge(&mut tree, &path("a=2")).unwrap();
        let root = tree.root();
        let a = tree.children(root)[0];
        assert_eq!(tree.get(a).value.as_ref().unwrap().as_bytes(), b"2");
        assert_eq!(tree.children(root).len(), 1);
    }

    #[test]
    fn merge_leaves_duplicate_siblings_untouched() {
        let mut tree = Tree::new();
        merge(&mut tree, &path("a.x=1")).unwrap();
        merge(&mut tree, &path("a.y=2")).unwrap();
        let root = tree.root();
        assert_eq!(tree.children(root).len(), 1);
        let a = tree.children(root)[0];
        assert_eq!(tree.children(a).len(), 2);
    }

    #[test]
    fn merge_rejects_value_under_existing_populated_container() {
        let mut tree = Tree::new();
        merge(&mut tree, &path("a.b=1")).unwrap();
        assert!(matches!(
            merge(&mut tree, &path("a=2")),
            Err(MergeError::TypeConflict { .. })
        ));
    }

    #[test]
    fn merge_creates_a_duplicate_when_the_only_existing_name_is_a_leaf() {
        // "a" already exists as a leaf; the path wants to descend into it, so
        // a second "a" is created alongside it to hold the new child instead
        // of rejecting the merge (SPEC_FULL.md §4.5 tie-break).
        let mut tree = Tree::new();
        merge(&mut tree, &path("a=1")).unwrap();
        merge(&mut tree, &path("a.b=2")).unwrap();
        let root = tree.root();
        assert_eq!(tree.children(root).len(), 2);
        let first_a = tree.children(root)[0];
        let second_a = tree.children(root)[1];
        assert_eq!(tree.get(first_a).value.as_ref().unwrap().as_bytes(), b"1");
        assert_eq!(tree.children(second_a).len(), 1);
    }

    #[test]
    fn merge_skips_leaf_duplicate_to_absorb_into_container_duplicate() {
        // First `1` is a leaf, second `1` is a container: `1.baz=yes` can't
        // land on the leaf, so it must fall through to the container one
        // instead of failing outright.
        let mut tree = Tree::new();
        merge(&mut tree, &path("1=2")).unwrap();
        merge(&mut tree, &path("1.bar=yes")).unwrap();
        let root = tree.root();
        assert_eq!(tree.children(root).len(), 2);
        let second_one = tree.children(root)[1];

        merge(&mut tree, &path("1.baz=yes")).unwrap();
        assert_eq!(tree.children(root).len(), 2);
        assert_eq!(tree.children(second_one).len(), 2);
    }
}
