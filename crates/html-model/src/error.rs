//! Error types for arena operations.
//!
//! Simple, flat error hierarchy. Container mutations never use it; they
//! report success through `bool` returns and leave prior state untouched
//! on invalid input.

use crate::types::NodeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),
}
