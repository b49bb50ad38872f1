//! The tagged node container.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{NodeKind, PayloadKind, Span, TreeError};

/// Literal payload of a leaf node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Int(i64),
    Text(String),
}

impl Payload {
    fn kind(&self) -> PayloadKind {
        match self {
            Payload::Int(_) => PayloadKind::Int,
            Payload::Text(_) => PayloadKind::Text,
        }
    }
}

/// A tree node: a tag plus either a payload (leaf) or tag-keyed children.
///
/// Children are grouped by tag. Within a tag, order is insertion order. Across
/// tags, traversal follows the order in which each tag was first inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: NodeKind,
    payload: Option<Payload>,
    children: HashMap<NodeKind, Vec<Node>>,
    /// Tags in first-seen order
    order: Vec<NodeKind>,
    pub span: Option<Span>,
}

impl Node {
    /// Creates an empty interior node.
    pub fn new(kind: NodeKind) -> Result<Self, TreeError> {
        if let Some(expected) = kind.payload_kind() {
            return Err(TreeError::BadPayload { kind, expected });
        }
        Ok(Self::bare(kind, None))
    }

    /// Creates a leaf node, checking the payload against the kind.
    pub fn leaf(kind: NodeKind, payload: Payload) -> Result<Self, TreeError> {
        match kind.payload_kind() {
            None => Err(TreeError::PayloadOnInterior { kind }),
            Some(expected) if expected != payload.kind() => {
                Err(TreeError::BadPayload { kind, expected })
            }
            Some(_) => Ok(Self::bare(kind, Some(payload))),
        }
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Self::bare(NodeKind::Ident, Some(Payload::Text(name.into())))
    }

    pub fn int(value: i64) -> Self {
        Self::bare(NodeKind::IntConst, Some(Payload::Int(value)))
    }

    pub fn string(text: impl Into<String>) -> Self {
        Self::bare(NodeKind::StrConst, Some(Payload::Text(text.into())))
    }

    fn bare(kind: NodeKind, payload: Option<Payload>) -> Self {
        Self {
            kind,
            payload,
            children: HashMap::new(),
            order: Vec::new(),
            span: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Appends `child` to the sequence for its tag.
    pub fn insert(&mut self, child: Node) -> Result<(), TreeError> {
        if self.kind.is_leaf() {
            return Err(TreeError::ChildOfLeaf {
                parent: self.kind,
                child: child.kind,
            });
        }
        if !self.kind.permits(child.kind) {
            return Err(TreeError::UnexpectedChild {
                parent: self.kind,
                child: child.kind,
            });
        }

        let tag = child.kind;
        self.children.entry(tag).or_default().push(child);
        if !self.order.contains(&tag) {
            self.order.push(tag);
        }
        Ok(())
    }

    /// Builder form of [`Node::insert`].
    pub fn with_child(mut self, child: Node) -> Result<Self, TreeError> {
        self.insert(child)?;
        Ok(self)
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    pub fn is_leaf(&self) -> bool {
        self.payload.is_some()
    }

    /// Text payload of an `ident` or `str_const` leaf.
    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            Some(Payload::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Integer payload of an `int_const` leaf.
    pub fn int_value(&self) -> Option<i64> {
        match self.payload {
            Some(Payload::Int(value)) => Some(value),
            _ => None,
        }
    }

    /// First-inserted child with the given tag.
    pub fn get(&self, kind: NodeKind) -> Option<&Node> {
        self.children.get(&kind).and_then(|seq| seq.first())
    }

    /// Every child with the given tag, in insertion order.
    pub fn get_all(&self, kind: NodeKind) -> &[Node] {
        self.children.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Distinct child tags in first-seen order.
    pub fn tags(&self) -> &[NodeKind] {
        &self.order
    }

    /// All children, tag groups in first-seen order.
    pub fn children(&self) -> impl Iterator<Item = &Node> + '_ {
        self.order.iter().flat_map(move |tag| self.get_all(*tag))
    }

    pub fn child_count(&self) -> usize {
        self.children.values().map(Vec::len).sum()
    }

    /// First child in expression position.
    pub fn expr_child(&self) -> Option<&Node> {
        self.children().find(|child| child.kind.is_expr())
    }

    /// Name carried by the first `ident` child.
    pub fn ident_name(&self) -> Option<&str> {
        self.get(NodeKind::Ident).and_then(Node::text)
    }

    /// Returns true for a `load` of exactly `name`.
    pub fn is_load_of(&self, name: &str) -> bool {
        self.kind == NodeKind::Load && self.ident_name() == Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmt(inner: Node) -> Node {
        Node::new(NodeKind::Stmt).unwrap().with_child(inner).unwrap()
    }

    fn load(name: &str) -> Node {
        Node::new(NodeKind::Load)
            .unwrap()
            .with_child(Node::ident(name))
            .unwrap()
    }

    #[test]
    fn test_get_all_preserves_insertion_order_per_tag() {
        let mut class = Node::new(NodeKind::Class).unwrap();
        class.insert(Node::ident("Pt")).unwrap();
        class.insert(Node::new(NodeKind::Block).unwrap()).unwrap();
        class.insert(Node::ident("Obj")).unwrap();

        let names: Vec<_> = class
            .get_all(NodeKind::Ident)
            .iter()
            .map(|n| n.text().unwrap())
            .collect();
        assert_eq!(names, vec!["Pt", "Obj"]);
        assert_eq!(class.get_all(NodeKind::Block).len(), 1);
        assert_eq!(class.child_count(), 3);
    }

    #[test]
    fn test_get_returns_first_or_absence() {
        let mut dot = Node::new(NodeKind::Dot).unwrap();
        assert!(dot.get(NodeKind::Ident).is_none());
        assert!(dot.get_all(NodeKind::Ident).is_empty());

        dot.insert(load("this")).unwrap();
        dot.insert(Node::ident("x")).unwrap();
        assert_eq!(dot.ident_name(), Some("x"));
        assert!(dot.expr_child().unwrap().is_load_of("this"));
    }

    #[test]
    fn test_ledger_follows_first_seen_tag() {
        let mut args = Node::new(NodeKind::Call).unwrap();
        args.insert(Node::new(NodeKind::ActualArgs).unwrap()).unwrap();
        args.insert(Node::new(NodeKind::Dot).unwrap()).unwrap();
        args.insert(Node::new(NodeKind::ActualArgs).unwrap()).unwrap();

        assert_eq!(args.tags(), &[NodeKind::ActualArgs, NodeKind::Dot]);
        let kinds: Vec<_> = args.children().map(Node::kind).collect();
        assert_eq!(
            kinds,
            vec![NodeKind::ActualArgs, NodeKind::ActualArgs, NodeKind::Dot]
        );
    }

    #[test]
    fn test_leaf_rejects_children() {
        let mut leaf = Node::int(3);
        let err = leaf.insert(Node::ident("x")).unwrap_err();
        assert_eq!(
            err,
            TreeError::ChildOfLeaf {
                parent: NodeKind::IntConst,
                child: NodeKind::Ident
            }
        );
    }

    #[test]
    fn test_shape_table_rejects_misplaced_child() {
        let mut block = Node::new(NodeKind::Block).unwrap();
        let err = block.insert(Node::int(1)).unwrap_err();
        assert!(matches!(err, TreeError::UnexpectedChild { .. }));
        block.insert(stmt(Node::int(1))).unwrap();
        assert_eq!(block.get_all(NodeKind::Stmt).len(), 1);
    }

    #[test]
    fn test_payload_validation() {
        assert!(Node::new(NodeKind::Ident).is_err());
        assert!(Node::leaf(NodeKind::Block, Payload::Int(1)).is_err());
        assert!(Node::leaf(NodeKind::IntConst, Payload::Text("1".into())).is_err());
        let leaf = Node::leaf(NodeKind::StrConst, Payload::Text("hi".into())).unwrap();
        assert_eq!(leaf.text(), Some("hi"));
        assert_eq!(Node::int(7).int_value(), Some(7));
    }
}
