//! The tree arena: [`Node`], [`NodeId`], and [`Tree`] (SPEC_FULL.md §3, §9).
//!
//! Child/parent links are handles into a `Vec<Node>`, not owning references,
//! so merge/remove can restructure the tree freely without fighting the
//! borrow checker. A node removed from its parent's child list becomes
//! unreachable from the root but its arena slot is not reclaimed; nothing
//! ever holds a stale handle to it afterwards since the only owners of
//! `NodeId`s are parent/child links and local traversal variables, and both
//! are updated (or dropped) by the same operation that does the removal.

use crate::buffer::ByteBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: ByteBuf,
    pub value: Option<ByteBuf>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,

    pub before: ByteBuf,
    pub middle: ByteBuf,
    pub after: ByteBuf,

    /// True when the source wrote `a b { … }`: this node is the synthetic
    /// outer container whose sole initial child absorbed what looked like
    /// its value (SPEC_FULL.md §4.2 case 3).
    pub implicit_container: bool,
    /// True when this node's trivia must be (re)synthesized before emission.
    pub needs_reindent: bool,
    /// True when this node is hidden from query ("line") output by a filter.
    pub hidden: bool,
}

impl Node {
    fn new_root() -> Self {
        Self {
            name: ByteBuf::new(),
            value: None,
            children: Vec::new(),
            parent: None,
            before: ByteBuf::new(),
            middle: ByteBuf::new(),
            after: ByteBuf::new(),
            implicit_container: false,
            needs_reindent: false,
            hidden: false,
        }
    }

    fn new_child(name: ByteBuf, parent: NodeId) -> Self {
        Self {
            name,
            value: None,
            children: Vec::new(),
            parent: Some(parent),
            before: ByteBuf::new(),
            middle: ByteBuf::new(),
            after: ByteBuf::new(),
            implicit_container: false,
            needs_reindent: false,
            hidden: false,
        }
    }

    pub fn is_container(&self) -> bool {
        self.value.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.value.is_some()
    }
}

/// An arena of nodes rooted at a synthetic, unprinted root (empty name, no
/// trivia). Used both for real parsed files and for the degenerate chains
/// the path parser builds for merge/remove/filter payloads — both share the
/// same root-sentinel convention so matching code can treat them uniformly.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub const ROOT: NodeId = NodeId(0);

    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new_root()],
        }
    }

    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// Allocates a new node named `name` and appends it as the last child of
    /// `parent`.
    pub fn new_child(&mut self, parent: NodeId, name: ByteBuf) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new_child(name, parent));
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// Unlinks `id` from its parent's child list and recursively marks the
    /// whole subtree unreachable. The arena slots are not reclaimed (see
    /// module docs); nothing may reference `id` or any of its descendants
    /// after this call returns.
    pub fn delete(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.index()].parent {
            self.nodes[parent.index()].children.retain(|&c| c != id);
        }
        // Snapshot children before recursing: we are about to mutate the
        // same Vec this slice would otherwise still be borrowing (SPEC_FULL
        // §9 "destructive vs. non-destructive traversal").
        let children: Vec<NodeId> = self.nodes[id.index()].children.clone();
        for child in children {
            self.delete_subtree_only(child);
        }
    }

    /// Like [`delete`](Self::delete) but does not touch the parent's child
    /// list; used internally once the top-level caller has already done so.
    fn delete_subtree_only(&mut self, id: NodeId) {
        let children: Vec<NodeId> = self.nodes[id.index()].children.clone();
        for child in children {
            self.delete_subtree_only(child);
        }
    }

    pub fn name_bytes(&self, id: NodeId) -> &[u8] {
        self.nodes[id.index()].name.as_bytes()
    }

    /// Marks every node in the arena hidden. Used by [`crate::filter`] to
    /// establish the "everything hidden unless a filter chain says
    /// otherwise" starting point.
    pub fn hide_all(&mut self) {
        for node in &mut self.nodes {
            node.hidden = true;
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}
