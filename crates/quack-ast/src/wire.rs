//! Interchange form of the tree.
//!
//! A node travels as `{"kind": .., "value": .., "children": [..], "span": ..}`
//! and is rebuilt through [`Node::insert`], so every tag and shape rule is
//! enforced while decoding.

use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Node, NodeKind, Payload, Span, TreeError};

#[derive(Debug, Serialize, Deserialize)]
struct RawNode {
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Payload>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<RawNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    span: Option<Span>,
}

impl TryFrom<RawNode> for Node {
    type Error = TreeError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        let kind = NodeKind::from_str(&raw.kind).map_err(|_| TreeError::UnknownTag(raw.kind))?;

        let mut node = match raw.value {
            Some(payload) => Node::leaf(kind, payload)?,
            None => Node::new(kind)?,
        };
        for child in raw.children {
            node.insert(Node::try_from(child)?)?;
        }
        if let Some(span) = raw.span {
            node = node.with_span(span);
        }
        Ok(node)
    }
}

impl From<&Node> for RawNode {
    fn from(node: &Node) -> Self {
        RawNode {
            kind: node.kind().to_string(),
            value: node.payload().cloned(),
            children: node.children().map(RawNode::from).collect(),
            span: node.span,
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RawNode::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawNode::deserialize(deserializer)?;
        Node::try_from(raw).map_err(D::Error::custom)
    }
}
