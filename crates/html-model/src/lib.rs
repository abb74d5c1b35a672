//! In-memory object model for building HTML documents.
//!
//! A generic arena-backed node tree plus typed containers that enforce
//! tag-specific containment rules on top of it:
//!
//! - [`DomArena`] / [`HtmlNode`]: index-based tree storage. Nodes refer
//!   to each other through `NodeId`; the parent link is a weak
//!   back-reference used only for lookups.
//! - [`HeadNode`]: the `head` container. Singleton slots (title, base,
//!   charset meta, canonical link) with replace semantics, a whitelist
//!   policy for free-form children, and filtered views over them.
//! - [`HtmlList`]: `ul`/`ol` whose children are always `li` wrappers.
//! - [`HtmlTable`] / [`TableRow`]: rows store only `td`/`th` cells; a
//!   row attached to a table keeps its width in sync with the table's
//!   declared column count.
//!
//! Every mutating container operation returns `bool`: invalid input is
//! a no-op that leaves prior state untouched, so a construction
//! pipeline never aborts mid-way.

pub mod arena;
pub mod error;
pub mod head;
pub mod list;
pub mod table;
pub mod types;
pub mod utils;

pub use arena::DomArena;
pub use error::{DomError, Result};
pub use head::HeadNode;
pub use list::{HtmlList, ListKind};
pub use table::{CellKind, HtmlTable, TableRow};
pub use types::{Attribute, Content, HtmlNode, NodeId, NodeType};
