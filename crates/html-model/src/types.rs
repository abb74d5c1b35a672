//! Core node types for the HTML object model.
//!
//! Key design principles:
//! 1. Use u32 indices for node references (no Rc/Arc ownership cycles)
//! 2. Use SmallVec for child lists (most nodes have few children)
//! 3. Attributes kept in declaration order, names unique case-insensitively
//! 4. The parent link is a weak back-reference, used only for read-time
//!    lookups such as a row querying its owning table

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Node identifier (index into the arena).
pub type NodeId = u32;

/// Node kinds the builder model produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Element,
    Text,
    Comment,
}

/// Single attribute entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Polymorphic content accepted by the wrapper-inserting containers
/// (list items, table cells): an existing node or plain text.
#[derive(Debug, Clone)]
pub enum Content {
    Node(NodeId),
    Text(String),
}

impl From<NodeId> for Content {
    fn from(id: NodeId) -> Self {
        Content::Node(id)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

/// The main tree node structure.
///
/// Navigation goes through indices; the arena owns every node. Only
/// element nodes carry a tag name and attributes, only text/comment
/// nodes carry text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HtmlNode {
    pub node_id: NodeId,
    pub node_type: NodeType,

    pub tag_name: String,
    pub text: String,
    pub attributes: Vec<Attribute>,

    pub parent_id: Option<NodeId>,
    pub children_ids: SmallVec<[NodeId; 4]>,

    /// Declared column count. Set only on table element nodes; queried
    /// by managed rows through `TableRow::parent_column_count`.
    pub col_count: Option<u32>,
}

impl HtmlNode {
    fn empty(node_type: NodeType) -> Self {
        Self {
            node_id: 0,
            node_type,
            tag_name: String::new(),
            text: String::new(),
            attributes: Vec::new(),
            parent_id: None,
            children_ids: SmallVec::new(),
            col_count: None,
        }
    }

    /// Create an element node. The tag is trimmed and lowercased.
    pub fn new_element(tag: &str) -> Self {
        let mut node = Self::empty(NodeType::Element);
        node.tag_name = tag.trim().to_ascii_lowercase();
        node
    }

    /// Create a text node.
    pub fn new_text(text: &str) -> Self {
        let mut node = Self::empty(NodeType::Text);
        node.text = text.to_string();
        node
    }

    /// Create a comment node.
    pub fn new_comment(text: &str) -> Self {
        let mut node = Self::empty(NodeType::Comment);
        node.text = text.to_string();
        node
    }

    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    pub fn is_comment(&self) -> bool {
        self.node_type == NodeType::Comment
    }

    /// Check tag name, case-insensitively. False for non-elements.
    pub fn is_tag(&self, tag: &str) -> bool {
        self.is_element() && self.tag_name.eq_ignore_ascii_case(tag)
    }

    /// Get attribute value by case-insensitive name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set an attribute. Names are unique case-insensitively: setting an
    /// existing name overwrites its value in place, preserving order.
    /// Blank names are ignored.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return;
        }
        if let Some(existing) = self
            .attributes
            .iter_mut()
            .find(|a| a.name.eq_ignore_ascii_case(trimmed))
        {
            existing.value = value.to_string();
        } else {
            self.attributes.push(Attribute {
                name: trimmed.to_string(),
                value: value.to_string(),
            });
        }
    }

    /// Remove an attribute by case-insensitive name. Returns true if an
    /// attribute was removed.
    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attributes.len();
        self.attributes
            .retain(|a| !a.name.eq_ignore_ascii_case(name));
        self.attributes.len() != before
    }
}

/// Tags a head container accepts as free-form children.
pub const HEAD_ALLOWED_CHILDREN: &[&str] =
    &["base", "title", "meta", "link", "script", "noscript"];

/// Content of the viewport meta every head starts with.
pub const DEFAULT_VIEWPORT_CONTENT: &str =
    "width=device-width, initial-scale=1.0, maximum-scale=1.0, user-scalable=no";

/// Title text used when a head is constructed without one.
pub const DEFAULT_TITLE: &str = "Default";
