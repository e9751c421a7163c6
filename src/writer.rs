//! Tree-to-bytes emission: the full format-preserving render and the
//! query-mode line renderer (SPEC_FULL.md §4.3, §6.2).
//!
//! Grounded on the original's `cv_print_c`/`confctl_print_c` (full render)
//! and `cv_print_lines`/`confctl_print_lines` (query mode).

use std::io::{self, Write};

use crate::escape;
use crate::node::{NodeId, Tree};

/// Writes the whole tree byte-for-byte: each node's `before`, `name`,
/// `middle`, then either its children or its `value`, then its `after`.
/// The synthetic root is never itself printed, only its trailing `after`
/// (the trivia, if any, following the last top-level node) at the very end.
pub fn emit<W: Write>(tree: &Tree, sink: &mut W) -> io::Result<()> {
    let root = tree.root();
    for &child in tree.children(root) {
        emit_node(tree, child, sink)?;
    }
    tree.get(root).after.write_to(sink)
}

fn emit_node<W: Write>(tree: &Tree, id: NodeId, sink: &mut W) -> io::Result<()> {
    let node = tree.get(id);
    node.before.write_to(sink)?;
    node.name.write_to(sink)?;
    node.middle.write_to(sink)?;

    if node.is_container() {
        for &child in &node.children {
            emit_node(tree, child, sink)?;
        }
        // The container's own `after` (its closing brace and anything
        // trailing it on the same line) was captured when the scan of its
        // last child's sibling slot hit that `}`.
        tree.get(id).after.write_to(sink)?;
    } else {
        if let Some(value) = &node.value {
            value.write_to(sink)?;
        }
        node.after.write_to(sink)?;
    }
    Ok(())
}

/// Convenience wrapper over [`emit`] for callers (and tests) that just want
/// the bytes.
pub fn emit_to_vec(tree: &Tree) -> Vec<u8> {
    let mut out = Vec::new();
    emit(tree, &mut out).expect("writing to a Vec<u8> cannot fail");
    out
}

/// Renders every visible (non-hidden, no hidden ancestor) leaf as one
/// `dotted.path=value` line, in tree order. Containers contribute only to
/// the path prefix; a hidden container hides its whole subtree.
pub fn emit_lines<W: Write>(tree: &Tree, sink: &mut W) -> io::Result<()> {
    let root = tree.root();
    let mut path = Vec::new();
    for &child in tree.children(root) {
        emit_lines_node(tree, child, &mut path, sink)?;
    }
    Ok(())
}

pub fn emit_lines_to_vec(tree: &Tree) -> Vec<u8> {
    let mut out = Vec::new();
    emit_lines(tree, &mut out).expect("writing to a Vec<u8> cannot fail");
    out
}

/// Like [`emit_lines`] but renders just the value, one per visible leaf, for
/// the `-n` CLI flag (SPEC_FULL.md §6.3).
pub fn emit_values<W: Write>(tree: &Tree, sink: &mut W) -> io::Result<()> {
    let root = tree.root();
    for &child in tree.children(root) {
        emit_values_node(tree, child, sink)?;
    }
    Ok(())
}

pub fn emit_values_to_vec(tree: &Tree) -> Vec<u8> {
    let mut out = Vec::new();
    emit_values(tree, &mut out).expect("writing to a Vec<u8> cannot fail");
    out
}

fn emit_values_node<W: Write>(tree: &Tree, id: NodeId, sink: &mut W) -> io::Result<()> {
    let node = tree.get(id);
    if node.hidden {
        return Ok(());
    }
    if let Some(value) = &node.value {
        sink.write_all(&escape::escape_value(value.as_bytes()))?;
        sink.write_all(b"\n")?;
    } else {
        for &child in &node.children {
            emit_values_node(tree, child, sink)?;
        }
    }
    Ok(())
}

fn emit_lines_node<W: Write>(
    tree: &Tree,
    id: NodeId,
    path: &mut Vec<NodeId>,
    sink: &mut W,
) -> io::Result<()> {
    let node = tree.get(id);
    if node.hidden {
        return Ok(());
    }

    path.push(id);
    if let Some(value) = &node.value {
        write_path(tree, path, sink)?;
        sink.write_all(b"=")?;
        sink.write_all(&escape::escape_value(value.as_bytes()))?;
        sink.write_all(b"\n")?;
    } else {
        for &child in &node.children {
            emit_lines_node(tree, child, path, sink)?;
        }
    }
    path.pop();
    Ok(())
}

fn write_path<W: Write>(tree: &Tree, path: &[NodeId], sink: &mut W) -> io::Result<()> {
    for (i, &id) in path.iter().enumerate() {
        if i > 0 {
            sink.write_all(b".")?;
        }
        sink.write_all(&escape::escape_name_segment(tree.name_bytes(id)))?;
    }
    Ok(())
}
