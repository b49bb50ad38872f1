//! Tree construction errors

use thiserror::Error;

use crate::{NodeKind, PayloadKind};

/// Rejected attempt to build a node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("unknown node tag `{0}`")]
    UnknownTag(String),

    #[error("{kind} is an interior node and cannot carry a payload")]
    PayloadOnInterior { kind: NodeKind },

    #[error("{kind} leaf requires a {expected:?} payload")]
    BadPayload { kind: NodeKind, expected: PayloadKind },

    #[error("{parent} leaf cannot hold children (got {child})")]
    ChildOfLeaf { parent: NodeKind, child: NodeKind },

    #[error("{parent} node does not permit a {child} child")]
    UnexpectedChild { parent: NodeKind, child: NodeKind },
}
