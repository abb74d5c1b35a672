//! Ordered/unordered list container.
//!
//! The list owns its `li` wrapper nodes exclusively: whatever a caller
//! inserts, the child stored in the list node is always an `li`. A node
//! that already is an `li` passes through, any other node becomes the
//! single child of a fresh wrapper, and text becomes the wrapper's text
//! content.

use crate::arena::DomArena;
use crate::types::{Content, HtmlNode, NodeId};
use crate::utils::escape_entities;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    pub fn tag(self) -> &'static str {
        match self {
            ListKind::Unordered => "ul",
            ListKind::Ordered => "ol",
        }
    }
}

/// Typed handle for a `ul`/`ol` element.
#[derive(Debug, Clone, Copy)]
pub struct HtmlList {
    id: NodeId,
    kind: ListKind,
}

impl HtmlList {
    pub fn new(arena: &mut DomArena, kind: ListKind) -> Self {
        let id = arena.add_node(HtmlNode::new_element(kind.tag()));
        Self { id, kind }
    }

    /// Create a list and add the given items.
    pub fn with_items(
        arena: &mut DomArena,
        kind: ListKind,
        items: Vec<Content>,
        escape: bool,
    ) -> Self {
        let list = Self::new(arena, kind);
        list.add_items(arena, items, escape);
        list
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> ListKind {
        self.kind
    }

    /// Add one item. Returns false (and changes nothing) only when the
    /// given node id is invalid or the insertion would break the tree
    /// structure.
    pub fn add_item(&self, arena: &mut DomArena, content: impl Into<Content>, escape: bool) -> bool {
        match content.into() {
            Content::Node(node_id) => {
                let Ok(node) = arena.get(node_id) else {
                    debug!(node_id, "list item refers to missing node");
                    return false;
                };
                if node.is_tag("li") {
                    return arena.append_child(self.id, node_id);
                }
                // Reject before synthesizing the wrapper: wrapping first
                // would re-parent the content even though the final
                // append is doomed to fail the cycle check.
                if arena.is_self_or_ancestor(node_id, self.id) {
                    debug!(node_id, "rejected list item, would create cycle");
                    return false;
                }
                trace!(node_id, "wrapping node in list item");
                let wrapper = arena.add_node(HtmlNode::new_element("li"));
                if !arena.append_child(wrapper, node_id) {
                    return false;
                }
                arena.append_child(self.id, wrapper)
            }
            Content::Text(text) => {
                let text = if escape { escape_entities(&text) } else { text };
                let wrapper = arena.add_node(HtmlNode::new_element("li"));
                let text_id = arena.add_node(HtmlNode::new_text(&text));
                arena.append_child(wrapper, text_id);
                arena.append_child(self.id, wrapper)
            }
        }
    }

    /// Add several items. Returns true only if every item was added.
    pub fn add_items(&self, arena: &mut DomArena, items: Vec<Content>, escape: bool) -> bool {
        let mut all_added = true;
        for item in items {
            all_added &= self.add_item(arena, item, escape);
        }
        all_added
    }

    /// Add another list as a nested sub-list, wrapped in an `li`.
    pub fn add_sub_list(&self, arena: &mut DomArena, sub: &HtmlList) -> bool {
        if arena.is_self_or_ancestor(sub.id(), self.id) {
            debug!(sub_id = sub.id(), "rejected sub-list, would create cycle");
            return false;
        }
        let wrapper = arena.add_node(HtmlNode::new_element("li"));
        if !arena.append_child(wrapper, sub.id()) {
            return false;
        }
        arena.append_child(self.id, wrapper)
    }

    /// Item wrapper by position. `None` when out of range or, for a
    /// tree edited outside this handle, when the child is not an `li`.
    pub fn item(&self, arena: &DomArena, index: usize) -> Option<NodeId> {
        let node = arena.get(self.id).ok()?;
        let child_id = *node.children_ids.get(index)?;
        arena.get(child_id).ok()?.is_tag("li").then_some(child_id)
    }

    pub fn len(&self, arena: &DomArena) -> usize {
        arena.child_count(self.id)
    }

    pub fn is_empty(&self, arena: &DomArena) -> bool {
        self.len(arena) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_form_adds_one_wrapper() {
        let mut arena = DomArena::new();
        let list = HtmlList::new(&mut arena, ListKind::Unordered);

        assert!(list.add_item(&mut arena, "plain text", false));
        assert_eq!(list.len(&arena), 1);

        let anchor = arena.add_node(HtmlNode::new_element("a"));
        assert!(list.add_item(&mut arena, anchor, false));
        assert_eq!(list.len(&arena), 2);

        let prebuilt = arena.add_node(HtmlNode::new_element("li"));
        assert!(list.add_item(&mut arena, prebuilt, false));
        assert_eq!(list.len(&arena), 3);

        for child in arena.children(list.id()).unwrap() {
            assert!(child.is_tag("li"));
        }
    }

    #[test]
    fn test_generic_node_becomes_single_child() {
        let mut arena = DomArena::new();
        let list = HtmlList::new(&mut arena, ListKind::Unordered);

        let anchor = arena.add_node(HtmlNode::new_element("a"));
        list.add_item(&mut arena, anchor, false);

        let wrapper = list.item(&arena, 0).unwrap();
        let children = arena.children(wrapper).unwrap();
        assert_eq!(children.len(), 1);
        assert!(children[0].is_tag("a"));
    }

    #[test]
    fn test_text_escaping() {
        let mut arena = DomArena::new();
        let list = HtmlList::new(&mut arena, ListKind::Unordered);

        list.add_item(&mut arena, "<b>bold</b>", true);
        list.add_item(&mut arena, "<i>raw</i>", false);

        let escaped = list.item(&arena, 0).unwrap();
        assert_eq!(
            arena.text_content(escaped).unwrap(),
            "&lt;b&gt;bold&lt;/b&gt;"
        );
        let raw = list.item(&arena, 1).unwrap();
        assert_eq!(arena.text_content(raw).unwrap(), "<i>raw</i>");
    }

    #[test]
    fn test_with_items_and_kind() {
        let mut arena = DomArena::new();
        let list = HtmlList::with_items(
            &mut arena,
            ListKind::Ordered,
            vec!["one".into(), "two".into(), "three".into()],
            true,
        );

        assert_eq!(arena.get(list.id()).unwrap().tag_name, "ol");
        assert_eq!(list.len(&arena), 3);
        assert_eq!(
            arena.text_content(list.item(&arena, 1).unwrap()).unwrap(),
            "two"
        );
    }

    #[test]
    fn test_sub_list_is_wrapped() {
        let mut arena = DomArena::new();
        let outer = HtmlList::new(&mut arena, ListKind::Unordered);
        let inner = HtmlList::with_items(
            &mut arena,
            ListKind::Unordered,
            vec!["nested".into()],
            true,
        );

        assert!(outer.add_sub_list(&mut arena, &inner));
        let wrapper = outer.item(&arena, 0).unwrap();
        let children = arena.children(wrapper).unwrap();
        assert_eq!(children.len(), 1);
        assert!(children[0].is_tag("ul"));
    }

    #[test]
    fn test_missing_node_rejected() {
        let mut arena = DomArena::new();
        let list = HtmlList::new(&mut arena, ListKind::Unordered);

        assert!(!list.add_item(&mut arena, 999u32, false));
        assert!(list.is_empty(&arena));
    }

    #[test]
    fn test_self_insert_rejected_without_side_effects() {
        let mut arena = DomArena::new();
        let list = HtmlList::new(&mut arena, ListKind::Unordered);
        let node_count = arena.len();

        assert!(!list.add_item(&mut arena, list.id(), false));

        assert!(list.is_empty(&arena));
        assert_eq!(arena.get(list.id()).unwrap().parent_id, None);
        // no dangling wrapper was synthesized
        assert_eq!(arena.len(), node_count);
    }

    #[test]
    fn test_ancestor_insert_rejected_without_side_effects() {
        let mut arena = DomArena::new();
        let outer = HtmlList::new(&mut arena, ListKind::Unordered);
        let inner = HtmlList::new(&mut arena, ListKind::Unordered);
        assert!(outer.add_sub_list(&mut arena, &inner));
        let wrapper = outer.item(&arena, 0).unwrap();
        let node_count = arena.len();

        // outer sits above inner; inserting it into inner would close a cycle
        assert!(!inner.add_item(&mut arena, outer.id(), false));
        assert!(!inner.add_sub_list(&mut arena, &outer));

        assert!(inner.is_empty(&arena));
        assert_eq!(arena.len(), node_count);
        // inner is still where it was, outer still a root
        assert!(arena.has_child(wrapper, inner.id()));
        assert_eq!(arena.get(inner.id()).unwrap().parent_id, Some(wrapper));
        assert_eq!(arena.get(outer.id()).unwrap().parent_id, None);
    }

    #[test]
    fn test_item_out_of_range() {
        let mut arena = DomArena::new();
        let list = HtmlList::new(&mut arena, ListKind::Unordered);
        assert_eq!(list.item(&arena, 0), None);
    }
}
