//! Errors produced while generating layouts and method bodies.

use std::fmt;

use quack_ast::{Node, NodeKind, Span, TreeError};
use thiserror::Error;

/// Stage of the back end that detected the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Layout,
    Lowering,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Layout => write!(f, "layout"),
            Phase::Lowering => write!(f, "lowering"),
        }
    }
}

/// Generation failure. The first one aborts the pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenError {
    /// A node shape the generator does not accept.
    #[error("{phase}: malformed `{kind}`: {message}")]
    Structural {
        phase: Phase,
        kind: NodeKind,
        message: String,
        span: Option<Span>,
    },

    /// A required child, class, method, field or variable is missing.
    #[error("{phase}: unresolved {what} `{name}`")]
    UnresolvedSymbol {
        phase: Phase,
        what: String,
        name: String,
        span: Option<Span>,
    },

    /// Recognized, but not implemented by this back end.
    #[error("{phase}: unsupported `{kind}`: {message}")]
    UnsupportedConstruct {
        phase: Phase,
        kind: NodeKind,
        message: String,
        span: Option<Span>,
    },

    /// A synthesized tree violated the shape table.
    #[error("{phase}: could not build synthesized tree: {source}")]
    Synthesis {
        phase: Phase,
        #[source]
        source: TreeError,
    },
}

impl GenError {
    pub fn structural(node: &Node, message: impl Into<String>) -> Self {
        GenError::Structural {
            phase: Phase::Lowering,
            kind: node.kind(),
            message: message.into(),
            span: node.span,
        }
    }

    pub fn unsupported(node: &Node, message: impl Into<String>) -> Self {
        GenError::UnsupportedConstruct {
            phase: Phase::Lowering,
            kind: node.kind(),
            message: message.into(),
            span: node.span,
        }
    }

    pub fn unresolved(what: &str, name: impl Into<String>, span: Option<Span>) -> Self {
        GenError::UnresolvedSymbol {
            phase: Phase::Lowering,
            what: what.to_string(),
            name: name.into(),
            span,
        }
    }

    /// A query-by-tag on `parent` found nothing where `role` was required.
    pub fn missing(role: &str, parent: &Node) -> Self {
        GenError::UnresolvedSymbol {
            phase: Phase::Lowering,
            what: format!("{} of", role),
            name: parent.kind().to_string(),
            span: parent.span,
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            GenError::Structural { phase, .. }
            | GenError::UnresolvedSymbol { phase, .. }
            | GenError::UnsupportedConstruct { phase, .. }
            | GenError::Synthesis { phase, .. } => *phase,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            GenError::Structural { span, .. }
            | GenError::UnresolvedSymbol { span, .. }
            | GenError::UnsupportedConstruct { span, .. } => *span,
            GenError::Synthesis { .. } => None,
        }
    }

    pub(crate) fn in_phase(mut self, new_phase: Phase) -> Self {
        match &mut self {
            GenError::Structural { phase, .. }
            | GenError::UnresolvedSymbol { phase, .. }
            | GenError::UnsupportedConstruct { phase, .. }
            | GenError::Synthesis { phase, .. } => *phase = new_phase,
        }
        self
    }
}

impl From<TreeError> for GenError {
    fn from(source: TreeError) -> Self {
        GenError::Synthesis {
            phase: Phase::Lowering,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_phase_and_node() {
        let node = Node::new(NodeKind::Dot).unwrap().with_span(Span::new(1, 5));
        let err = GenError::missing("receiver", &node);
        assert_eq!(err.to_string(), "lowering: unresolved receiver of `dot`");
        assert_eq!(err.span(), Some(Span::new(1, 5)));

        let err = GenError::unsupported(&node, "nope").in_phase(Phase::Layout);
        assert_eq!(err.phase(), Phase::Layout);
        assert_eq!(err.to_string(), "layout: unsupported `dot`: nope");
    }
}
