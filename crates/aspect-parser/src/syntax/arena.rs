//! Node storage.
//!
//! The arena is append-only: nodes are immutable once allocated, and tree
//! rewrites allocate new nodes while untouched subtrees keep their indexes.
//! The one exception is comment attachment during the construction phase
//! (`attach_trailing_comments`), which the parser uses while a node is still
//! being built into its parent.

use aspect_common::comments::CommentId;
use aspect_common::span::Span;
use serde::{Deserialize, Serialize};

use super::node::{Node, NodeData, NodeKind};

/// Handle to a node in a [`NodeArena`]. `NodeIndex::NONE` encodes an absent
/// optional child.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    pub fn is_none(self) -> bool {
        self == NodeIndex::NONE
    }

    pub fn is_some(self) -> bool {
        self != NodeIndex::NONE
    }
}

/// An ordered child list.
pub type NodeList = Vec<NodeIndex>;

#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    pub fn with_capacity(capacity: usize) -> NodeArena {
        NodeArena {
            nodes: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a node.
    pub fn add(&mut self, data: NodeData, span: Span) -> NodeIndex {
        self.add_with_comments(data, span, Vec::new(), Vec::new())
    }

    pub fn add_with_comments(
        &mut self,
        data: NodeData,
        span: Span,
        leading_comments: Vec<CommentId>,
        trailing_comments: Vec<CommentId>,
    ) -> NodeIndex {
        let index = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind: data.kind(),
            span,
            leading_comments,
            trailing_comments,
            data,
        });
        index
    }

    #[inline]
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get(index.0 as usize)
        }
    }

    pub fn kind(&self, index: NodeIndex) -> Option<NodeKind> {
        self.get(index).map(|n| n.kind)
    }

    pub fn span(&self, index: NodeIndex) -> Span {
        self.get(index).map_or(Span::SYNTHETIC, |n| n.span)
    }

    /// Append trailing comment ids to a node under construction. Used by the
    /// parser only, before the node is reachable from a finished tree.
    pub fn attach_trailing_comments(&mut self, index: NodeIndex, comments: &[CommentId]) {
        if let Some(node) = self.node_mut(index) {
            node.trailing_comments.extend_from_slice(comments);
        }
    }

    /// Prepend leading comment ids to a node under construction.
    pub fn attach_leading_comments(&mut self, index: NodeIndex, comments: &[CommentId]) {
        if let Some(node) = self.node_mut(index) {
            let mut merged = comments.to_vec();
            merged.extend_from_slice(&node.leading_comments);
            node.leading_comments = merged;
        }
    }

    fn node_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get_mut(index.0 as usize)
        }
    }

    /// Re-allocate `index` with different comment lists, sharing its payload.
    /// Used by the rewrite engine to carry comments over to a replacement.
    pub fn clone_with_comments(
        &mut self,
        index: NodeIndex,
        leading: Vec<CommentId>,
        trailing: Vec<CommentId>,
    ) -> NodeIndex {
        match self.get(index) {
            Some(node) => {
                let data = node.data.clone();
                let span = node.span;
                self.add_with_comments(data, span, leading, trailing)
            }
            None => index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_index_resolves_to_nothing() {
        let arena = NodeArena::new();
        assert!(arena.get(NodeIndex::NONE).is_none());
        assert_eq!(arena.span(NodeIndex::NONE), Span::SYNTHETIC);
    }

    #[test]
    fn kind_is_stamped_from_payload() {
        let mut arena = NodeArena::new();
        let idx = arena.add(
            NodeData::Identifier {
                name: "x".to_string(),
            },
            Span::new(0, 1),
        );
        assert_eq!(arena.kind(idx), Some(NodeKind::Identifier));
    }
}
