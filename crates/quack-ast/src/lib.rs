//! # Quack AST
//!
//! The tagged tree shared by every stage of the Quack compiler.
//!
//! A [`Node`] is a tag drawn from the closed [`NodeKind`] set plus either a
//! literal payload (leaves) or children grouped by tag (interior nodes). Each
//! interior kind declares which child tags it accepts, and unknown tags are
//! rejected when a tree is decoded rather than when it is queried.

use serde::{Deserialize, Serialize};

// =============================================================================
// Core Types
// =============================================================================

/// Source location information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

// =============================================================================
// Module Declarations
// =============================================================================

pub mod build;
pub mod dump;
mod error;
mod kind;
mod node;
mod wire;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::TreeError;
pub use kind::{NodeKind, PayloadKind};
pub use node::{Node, Payload};

// =============================================================================
// Tests
// =============================================================================
