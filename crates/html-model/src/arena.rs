//! Arena-based tree storage.
//!
//! All nodes live in a single `Vec<HtmlNode>` and refer to each other
//! through `NodeId` indices. This eliminates Rc/Arc overhead and the
//! ownership cycles a parent pointer would otherwise create: the parent
//! link is just another index.
//!
//! Structural edits go through `append_child`/`detach`/`clear_children`,
//! which keep two invariants:
//! - a node never appears in its own subtree (self-append and any append
//!   that would close a cycle are rejected)
//! - every child's `parent_id` matches the parent that lists it

use crate::error::{DomError, Result};
use crate::types::{HtmlNode, NodeId};
use smallvec::SmallVec;
use tracing::debug;

/// Arena allocator for HTML nodes.
#[derive(Debug, Default, Clone, serde::Serialize, serde::Deserialize)]
pub struct DomArena {
    nodes: Vec<HtmlNode>,
}

impl DomArena {
    /// Create a new empty arena.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Create an arena with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Add a node to the arena, returns its ID.
    pub fn add_node(&mut self, mut node: HtmlNode) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        node.node_id = node_id;
        self.nodes.push(node);
        node_id
    }

    /// Get node by ID (immutable).
    pub fn get(&self, node_id: NodeId) -> Result<&HtmlNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable).
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut HtmlNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterator over all nodes.
    pub fn iter(&self) -> impl Iterator<Item = &HtmlNode> {
        self.nodes.iter()
    }

    /// Iterator over all node IDs.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| i as NodeId)
    }

    /// Clear arena (reuse allocation).
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Append `child_id` as the last child of `parent_id`.
    ///
    /// Rejects when either node is missing, the parent is not an
    /// element, or the edit would create a cycle (including
    /// self-append). A child that already has a parent is detached from
    /// it first, so a node has at most one position in the tree.
    pub fn append_child(&mut self, parent_id: NodeId, child_id: NodeId) -> bool {
        if parent_id == child_id {
            debug!(parent_id, "rejected self-append");
            return false;
        }
        let parent_is_element = match self.get(parent_id) {
            Ok(parent) => parent.is_element(),
            Err(_) => return false,
        };
        if !parent_is_element || self.get(child_id).is_err() {
            return false;
        }

        if self.is_self_or_ancestor(child_id, parent_id) {
            debug!(parent_id, child_id, "rejected append, would create cycle");
            return false;
        }

        if let Some(old_parent) = self.get(child_id).ok().and_then(|n| n.parent_id) {
            self.detach(old_parent, child_id);
        }
        if let Ok(child) = self.get_mut(child_id) {
            child.parent_id = Some(parent_id);
        }
        if let Ok(parent) = self.get_mut(parent_id) {
            parent.children_ids.push(child_id);
        }
        true
    }

    /// True when `candidate` is `node_id` itself or an ancestor of it.
    /// Containers use this to reject an insertion before synthesizing a
    /// wrapper node, so a doomed insertion never re-parents anything.
    pub fn is_self_or_ancestor(&self, candidate: NodeId, node_id: NodeId) -> bool {
        if candidate == node_id {
            return true;
        }
        let mut cursor = self.get(node_id).ok().and_then(|n| n.parent_id);
        while let Some(ancestor_id) = cursor {
            if ancestor_id == candidate {
                return true;
            }
            cursor = self.get(ancestor_id).ok().and_then(|n| n.parent_id);
        }
        false
    }

    /// Remove `child_id` from the children of `parent_id`. Returns true
    /// if the child was present.
    pub fn detach(&mut self, parent_id: NodeId, child_id: NodeId) -> bool {
        let Ok(parent) = self.get_mut(parent_id) else {
            return false;
        };
        let Some(pos) = parent.children_ids.iter().position(|&c| c == child_id) else {
            return false;
        };
        parent.children_ids.remove(pos);
        if let Ok(child) = self.get_mut(child_id) {
            child.parent_id = None;
        }
        true
    }

    /// Check child membership by identity.
    pub fn has_child(&self, parent_id: NodeId, child_id: NodeId) -> bool {
        self.get(parent_id)
            .map(|p| p.children_ids.contains(&child_id))
            .unwrap_or(false)
    }

    /// Remove all children of a node, resetting their parent links.
    pub fn clear_children(&mut self, parent_id: NodeId) {
        let Ok(parent) = self.get_mut(parent_id) else {
            return;
        };
        let children: SmallVec<[NodeId; 4]> = std::mem::take(&mut parent.children_ids);
        for child_id in children {
            if let Ok(child) = self.get_mut(child_id) {
                child.parent_id = None;
            }
        }
    }

    /// Number of children of a node (0 if the node does not exist).
    pub fn child_count(&self, node_id: NodeId) -> usize {
        self.get(node_id)
            .map(|n| n.children_ids.len())
            .unwrap_or(0)
    }

    /// Get children of a node.
    pub fn children(&self, node_id: NodeId) -> Result<Vec<&HtmlNode>> {
        let node = self.get(node_id)?;
        node.children_ids
            .iter()
            .map(|&child_id| self.get(child_id))
            .collect()
    }

    /// Get parent of a node.
    pub fn parent(&self, node_id: NodeId) -> Result<Option<&HtmlNode>> {
        let node = self.get(node_id)?;
        match node.parent_id {
            Some(parent_id) => Ok(Some(self.get(parent_id)?)),
            None => Ok(None),
        }
    }

    /// Traverse subtree depth-first (iterative, no recursion).
    pub fn traverse_df<F>(&self, start_id: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&HtmlNode) -> Result<()>,
    {
        let mut stack = vec![start_id];

        while let Some(node_id) = stack.pop() {
            let node = self.get(node_id)?;
            visit(node)?;

            // Push children in reverse order (so they're visited left-to-right)
            for &child_id in node.children_ids.iter().rev() {
                stack.push(child_id);
            }
        }

        Ok(())
    }

    /// Find nodes matching predicate.
    pub fn find<F>(&self, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&HtmlNode) -> bool,
    {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(idx, node)| {
                if predicate(node) {
                    Some(idx as NodeId)
                } else {
                    None
                }
            })
            .collect()
    }

    /// Find first node matching predicate.
    pub fn find_one<F>(&self, predicate: F) -> Option<NodeId>
    where
        F: Fn(&HtmlNode) -> bool,
    {
        self.nodes.iter().enumerate().find_map(|(idx, node)| {
            if predicate(node) {
                Some(idx as NodeId)
            } else {
                None
            }
        })
    }

    /// Find all elements by tag name, case-insensitively.
    pub fn find_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.find(|node| node.is_tag(tag))
    }

    /// Find element by its `id` attribute.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_one(|node| node.is_element() && node.attr("id") == Some(id))
    }

    /// Concatenated text of all text nodes in a subtree, trimmed.
    pub fn text_content(&self, node_id: NodeId) -> Result<String> {
        let mut text = String::new();

        self.traverse_df(node_id, |node| {
            if node.is_text() {
                text.push_str(&node.text);
            }
            Ok(())
        })?;

        Ok(text.trim().to_string())
    }
}
