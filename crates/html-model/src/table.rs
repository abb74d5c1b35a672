//! Table and table-row containers.
//!
//! A row stores only `td`/`th` wrapper cells, with the same wrapping
//! contract as the list container. A row attached to a table is
//! "managed": `set_data` normalizes its width to the table's declared
//! column count, padding with a centered `-` placeholder and silently
//! dropping surplus data.

use crate::arena::DomArena;
use crate::types::{Content, HtmlNode, NodeId};
use crate::utils::escape_entities;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Data,
    Header,
}

impl CellKind {
    pub fn tag(self) -> &'static str {
        match self {
            CellKind::Data => "td",
            CellKind::Header => "th",
        }
    }
}

/// Typed handle for a `table` element with a declared column count.
#[derive(Debug, Clone, Copy)]
pub struct HtmlTable {
    id: NodeId,
    cols: u32,
}

impl HtmlTable {
    pub fn new(arena: &mut DomArena, cols: u32) -> Self {
        let mut node = HtmlNode::new_element("table");
        node.col_count = Some(cols);
        let id = arena.add_node(node);
        Self { id, cols }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Declared column count.
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Attach a row. Rows created through `TableRow` are always `tr`
    /// nodes; anything else is rejected.
    pub fn add_row(&self, arena: &mut DomArena, row: &TableRow) -> bool {
        self.add_child(arena, row.id())
    }

    /// Attach an existing node as a row; only `tr` elements pass.
    pub fn add_child(&self, arena: &mut DomArena, child_id: NodeId) -> bool {
        let Ok(node) = arena.get(child_id) else {
            return false;
        };
        if !node.is_tag("tr") {
            debug!(child_id, "table rejected non-row child");
            return false;
        }
        arena.append_child(self.id, child_id)
    }

    pub fn row(&self, arena: &DomArena, index: usize) -> Option<NodeId> {
        let node = arena.get(self.id).ok()?;
        node.children_ids.get(index).copied()
    }

    pub fn row_count(&self, arena: &DomArena) -> usize {
        arena.child_count(self.id)
    }
}

/// Typed handle for a `tr` element.
#[derive(Debug, Clone, Copy)]
pub struct TableRow {
    id: NodeId,
}

impl TableRow {
    pub fn new(arena: &mut DomArena) -> Self {
        let id = arena.add_node(HtmlNode::new_element("tr"));
        Self { id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Add one cell. A `td`/`th` node passes through with the extra
    /// attributes applied; any other node becomes the single child of a
    /// fresh cell of the given kind; text becomes the cell's (optionally
    /// escaped) text content.
    pub fn add_cell(
        &self,
        arena: &mut DomArena,
        content: impl Into<Content>,
        kind: CellKind,
        escape: bool,
        extra_attrs: &[(&str, &str)],
    ) -> bool {
        match content.into() {
            Content::Node(node_id) => {
                let Ok(node) = arena.get(node_id) else {
                    debug!(node_id, "cell refers to missing node");
                    return false;
                };
                // Reject up front: wrapping (or even applying attributes
                // to a pass-through cell) must not happen when the final
                // append would fail the cycle check.
                if arena.is_self_or_ancestor(node_id, self.id) {
                    debug!(node_id, "rejected cell, would create cycle");
                    return false;
                }
                if node.is_tag("td") || node.is_tag("th") {
                    if let Ok(cell) = arena.get_mut(node_id) {
                        apply_attrs(cell, extra_attrs);
                    }
                    return arena.append_child(self.id, node_id);
                }
                trace!(node_id, "wrapping node in table cell");
                let mut cell = HtmlNode::new_element(kind.tag());
                apply_attrs(&mut cell, extra_attrs);
                let cell_id = arena.add_node(cell);
                if !arena.append_child(cell_id, node_id) {
                    return false;
                }
                arena.append_child(self.id, cell_id)
            }
            Content::Text(text) => {
                let text = if escape { escape_entities(&text) } else { text };
                let mut cell = HtmlNode::new_element(kind.tag());
                apply_attrs(&mut cell, extra_attrs);
                let cell_id = arena.add_node(cell);
                let text_id = arena.add_node(HtmlNode::new_text(&text));
                arena.append_child(cell_id, text_id);
                arena.append_child(self.id, cell_id)
            }
        }
    }

    /// Attach an existing node as a cell; only `td`/`th` elements pass.
    pub fn add_child(&self, arena: &mut DomArena, child_id: NodeId) -> bool {
        let Ok(node) = arena.get(child_id) else {
            return false;
        };
        if !node.is_tag("td") && !node.is_tag("th") {
            debug!(child_id, "row rejected non-cell child");
            return false;
        }
        arena.append_child(self.id, child_id)
    }

    pub fn cell(&self, arena: &DomArena, index: usize) -> Option<NodeId> {
        let node = arena.get(self.id).ok()?;
        node.children_ids.get(index).copied()
    }

    pub fn cell_count(&self, arena: &DomArena) -> usize {
        arena.child_count(self.id)
    }

    /// Declared column count of the owning table, if the row's parent
    /// is a table element. Read-only capability lookup through the
    /// parent back-reference.
    pub fn parent_column_count(&self, arena: &DomArena) -> Option<u32> {
        let node = arena.get(self.id).ok()?;
        let parent = arena.get(node.parent_id?).ok()?;
        if parent.is_tag("table") {
            parent.col_count
        } else {
            None
        }
    }

    /// Replace the row's cells with the given data.
    ///
    /// Managed mode (parent is a table): the row is filled until its
    /// cell count equals the table's declared column count, consuming
    /// data elements in order and padding with a centered `-`
    /// placeholder once data runs out; surplus elements are dropped.
    /// Unmanaged mode: one cell per data element.
    pub fn set_data(&self, arena: &mut DomArena, data: Vec<Content>, header: bool) {
        let kind = if header { CellKind::Header } else { CellKind::Data };
        arena.clear_children(self.id);

        match self.parent_column_count(arena) {
            Some(cols) => {
                let mut data = data.into_iter();
                while (arena.child_count(self.id) as u32) < cols {
                    match data.next() {
                        Some(content) => {
                            self.add_cell(arena, content, kind, false, &[]);
                        }
                        None => {
                            if !self.add_cell(
                                arena,
                                "-",
                                kind,
                                true,
                                &[("style", "text-align:center")],
                            ) {
                                break;
                            }
                        }
                    }
                }
            }
            None => {
                for content in data {
                    self.add_cell(arena, content, kind, false, &[]);
                }
            }
        }
    }
}

fn apply_attrs(node: &mut HtmlNode, extra_attrs: &[(&str, &str)]) {
    for (name, value) in extra_attrs {
        node.set_attr(name, value);
    }
}
