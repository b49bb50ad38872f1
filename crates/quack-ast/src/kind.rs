//! The closed set of node tags and the shapes they permit.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Tag of a tree node.
///
/// Leaf kinds (`Ident`, `IntConst`, `StrConst`) carry a payload and never have
/// children; every other kind is interior.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NodeKind {
    // Declarations
    Program,
    Classes,
    Class,
    Methods,
    Method,
    FormalArgs,
    Formal,

    // Statements
    Block,
    Stmt,
    Assign,
    LExpr,
    RExpr,
    Return,
    If,
    While,
    Cond,

    // Expressions
    Call,
    Constructor,
    ActualArgs,
    Arg,
    Dot,
    Load,
    BinOp,
    Operand,
    And,
    Or,
    Not,

    // Leaves
    Ident,
    IntConst,
    StrConst,
}

/// Which payload a leaf kind carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Int,
    Text,
}

impl NodeKind {
    /// Returns true for kinds that carry a payload instead of children.
    pub fn is_leaf(self) -> bool {
        self.payload_kind().is_some()
    }

    pub fn payload_kind(self) -> Option<PayloadKind> {
        match self {
            NodeKind::Ident | NodeKind::StrConst => Some(PayloadKind::Text),
            NodeKind::IntConst => Some(PayloadKind::Int),
            _ => None,
        }
    }

    /// Returns true for kinds that may appear in expression position.
    pub fn is_expr(self) -> bool {
        matches!(
            self,
            NodeKind::Call
                | NodeKind::Constructor
                | NodeKind::Dot
                | NodeKind::Load
                | NodeKind::IntConst
                | NodeKind::StrConst
                | NodeKind::BinOp
                | NodeKind::And
                | NodeKind::Or
                | NodeKind::Not
        )
    }

    /// Returns true for kinds that are statements in their own right.
    pub fn is_stmt(self) -> bool {
        matches!(
            self,
            NodeKind::Assign | NodeKind::Return | NodeKind::If | NodeKind::While
        )
    }

    /// Whether a node of this kind may hold a child tagged `child`.
    pub fn permits(self, child: NodeKind) -> bool {
        use NodeKind::*;
        match self {
            Program => matches!(child, Classes | Block),
            Classes => child == Class,
            Class => matches!(child, Ident | FormalArgs | Block | Methods),
            Methods => child == Method,
            Method => matches!(child, Ident | FormalArgs | Block),
            FormalArgs => child == Formal,
            Formal => child == Ident,
            Block => child == Stmt,
            Stmt => child.is_stmt() || child.is_expr(),
            Assign => matches!(child, LExpr | RExpr),
            LExpr => matches!(child, Ident | Dot),
            RExpr | Cond | Arg | Operand | Return => child.is_expr(),
            If | While => matches!(child, Cond | Block),
            Call => matches!(child, Dot | ActualArgs),
            Constructor => matches!(child, Ident | ActualArgs),
            ActualArgs => child == Arg,
            Dot => child == Ident || child.is_expr(),
            Load => child == Ident,
            BinOp => matches!(child, Ident | Operand),
            And | Or | Not => child == Operand,
            Ident | IntConst | StrConst => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_tag_names_round_trip() {
        for kind in NodeKind::iter() {
            let name = kind.to_string();
            assert_eq!(NodeKind::from_str(&name).unwrap(), kind);
        }
        assert_eq!(NodeKind::IntConst.to_string(), "int_const");
        assert!(NodeKind::from_str("typecase").is_err());
    }

    #[test]
    fn test_leaves_permit_nothing() {
        for kind in NodeKind::iter().filter(|k| k.is_leaf()) {
            assert!(NodeKind::iter().all(|child| !kind.permits(child)));
        }
    }

    #[test]
    fn test_ident_is_not_an_expression() {
        assert!(!NodeKind::Ident.is_expr());
        assert!(NodeKind::Load.is_expr());
        assert!(NodeKind::Dot.permits(NodeKind::Dot));
        assert!(!NodeKind::Block.permits(NodeKind::Assign));
    }
}
