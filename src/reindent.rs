//! Synthesizing trivia for freshly created nodes (SPEC_FULL.md §4.8).
//!
//! Grounded on `buf_get_indent`/`cv_reindent`: a node created by merge has no
//! `before`/`middle`/`after` of its own, so before the tree can be written
//! back out something has to invent plausible ones. `before` imitates the
//! previous sibling's indentation (or the parent's, plus one tab) when there
//! is one to imitate, falling back to depth-based tabs only when nothing
//! useful precedes it — so a file indented with spaces keeps getting spaces.
//!
//! The line break between two entries always lives in the *following*
//! entry's `before` (or, for the last child of a container, in that
//! container's own `after`) — never in a leaf's own `after`, which is
//! reserved for same-line trailing trivia. Each synthesized `before`/`after`
//! checks whether whatever precedes it already ends in a newline before
//! deciding to add one, so two synthesized nodes never end up separated by a
//! blank line.

use crate::buffer::ByteBuf;
use crate::config::SyntaxConfig;
use crate::node::{NodeId, Tree};

/// Walks the whole tree and fills in trivia for every node still flagged
/// `needs_reindent`, clearing the flag as it goes. Safe to call repeatedly;
/// a node that already has synthesized trivia is left alone.
pub fn materialize(tree: &mut Tree, cfg: &SyntaxConfig) {
    let root = tree.root();
    reindent_children(tree, root, cfg);
    ensure_trailing_newline(tree);
}

fn reindent_children(tree: &mut Tree, parent: NodeId, cfg: &SyntaxConfig) {
    let children: Vec<NodeId> = tree.children(parent).to_vec();
    for (pos, &child) in children.iter().enumerate() {
        // Recurse first: if `child` is a dirty container, its own after
        // depends on its last child's (now finalized) trivia.
        reindent_children(tree, child, cfg);
        if tree.get(child).needs_reindent {
            synthesize_trivia(tree, parent, child, pos, &children, cfg);
            tree.get_mut(child).needs_reindent = false;
        }
    }
}

fn depth_of(tree: &Tree, id: NodeId) -> usize {
    let mut depth = 0;
    let mut current = tree.get(id).parent;
    while let Some(p) = current {
        if p == tree.root() {
            break;
        }
        depth += 1;
        current = tree.get(p).parent;
    }
    depth
}

fn ends_with_newline(bytes: &[u8]) -> bool {
    matches!(bytes.last(), Some(b'\n') | Some(b'\r'))
}

/// Drops a single leading `\n`/`\r`, leaving just the indentation run that
/// follows it (used to reuse a computed `before` as a closing-brace prefix).
fn strip_leading_newline(bytes: &[u8]) -> &[u8] {
    match bytes.first() {
        Some(b'\n') | Some(b'\r') => &bytes[1..],
        _ => bytes,
    }
}

/// Derives `before` for a freshly reindented node: imitate the previous
/// sibling's indentation if one exists and carries a newline-prefixed
/// suffix, else the parent's (plus one tab, unless the parent is the root),
/// falling back to depth-based tabs when neither has anything to imitate
/// (SPEC_FULL.md §4.8).
fn compute_before(tree: &Tree, parent: NodeId, id: NodeId, pos: usize, siblings: &[NodeId]) -> Vec<u8> {
    if pos > 0 {
        let prev = siblings[pos - 1];
        if let Some(suffix) = tree.get(prev).before.trailing_indent() {
            return suffix.to_vec();
        }
        let mut v = vec![b'\n'];
        v.extend(std::iter::repeat_n(b'\t', depth_of(tree, id)));
        return v;
    }
    if parent != tree.root() {
        if let Some(suffix) = tree.get(parent).before.trailing_indent() {
            let mut v = suffix.to_vec();
            v.push(b'\t');
            return v;
        }
        let mut v = vec![b'\n'];
        v.extend(std::iter::repeat_n(b'\t', depth_of(tree, id)));
        return v;
    }
    // First top-level entry in the file: nothing to imitate, nothing above
    // to separate from, so no leading blank line.
    Vec::new()
}

fn synthesize_trivia(
    tree: &mut Tree,
    parent: NodeId,
    id: NodeId,
    pos: usize,
    siblings: &[NodeId],
    cfg: &SyntaxConfig,
) {
    let before = compute_before(tree, parent, id, pos, siblings);
    let indent = strip_leading_newline(&before).to_vec();
    tree.get_mut(id).before = ByteBuf::from_bytes(before);

    if tree.get(id).is_container() {
        tree.get_mut(id).middle = ByteBuf::from_str(" {");
        let kids = tree.children(id).to_vec();
        let last_ends_newline = kids
            .last()
            .map(|&k| ends_with_newline(tree.get(k).after.as_bytes()))
            .unwrap_or(false);
        let mut after = Vec::new();
        if !last_ends_newline {
            after.push(b'\n');
        }
        after.extend_from_slice(&indent);
        after.push(b'}');
        after.push(b'\n');
        tree.get_mut(id).after = ByteBuf::from_bytes(after);
    } else {
        if tree.get(id).middle.is_empty() {
            tree.get_mut(id).middle = if cfg.equals_sign {
                ByteBuf::from_str(" = ")
            } else {
                ByteBuf::from_str(" ")
            };
        }
        if tree.get(id).after.is_empty() {
            tree.get_mut(id).after = if cfg.semicolon {
                ByteBuf::from_str(";")
            } else {
                ByteBuf::new()
            };
        }
    }
}

/// If the tree's trailing bytes are still empty (a brand new tree, or a
/// parsed file whose last top-level entry didn't end in a newline of its
/// own) but at least one top-level entry now exists, make sure the file
/// still ends in a newline.
fn ensure_trailing_newline(tree: &mut Tree) {
    let root = tree.root();
    if !tree.get(root).after.is_empty() {
        return;
    }
    if let Some(&last) = tree.children(root).last() {
        if !ends_with_newline(tree.get(last).after.as_bytes()) {
            tree.get_mut(root).after = ByteBuf::from_str("\n");
        }
    }
}
