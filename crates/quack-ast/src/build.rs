//! Shorthand constructors for common tree shapes.
//!
//! Used by the back end to synthesize bodies (default constructors) and by
//! tests. Every helper goes through [`Node::insert`], so the shape table still
//! applies.

use crate::{Node, NodeKind, TreeError};

type Built = Result<Node, TreeError>;

fn wrap(kind: NodeKind, inner: Node) -> Built {
    Node::new(kind)?.with_child(inner)
}

/// `name` used as a value.
pub fn load(name: &str) -> Built {
    wrap(NodeKind::Load, Node::ident(name))
}

/// `receiver.member`
pub fn dot(receiver: Node, member: &str) -> Built {
    Node::new(NodeKind::Dot)?
        .with_child(receiver)?
        .with_child(Node::ident(member))
}

fn actual_args(args: Vec<Node>) -> Built {
    let mut list = Node::new(NodeKind::ActualArgs)?;
    for arg in args {
        list.insert(wrap(NodeKind::Arg, arg)?)?;
    }
    Ok(list)
}

/// `receiver.method(args..)`
pub fn call(receiver: Node, method: &str, args: Vec<Node>) -> Built {
    Node::new(NodeKind::Call)?
        .with_child(dot(receiver, method)?)?
        .with_child(actual_args(args)?)
}

/// `Class(args..)`
pub fn construct(class: &str, args: Vec<Node>) -> Built {
    Node::new(NodeKind::Constructor)?
        .with_child(Node::ident(class))?
        .with_child(actual_args(args)?)
}

/// `left <op> right`, where `op` names the operator method.
pub fn bin_op(op: &str, left: Node, right: Node) -> Built {
    Node::new(NodeKind::BinOp)?
        .with_child(Node::ident(op))?
        .with_child(wrap(NodeKind::Operand, left)?)?
        .with_child(wrap(NodeKind::Operand, right)?)
}

/// `target = value;` where `target` is an `ident` or a `dot`.
pub fn assign(target: Node, value: Node) -> Built {
    let stmt = Node::new(NodeKind::Assign)?
        .with_child(wrap(NodeKind::LExpr, target)?)?
        .with_child(wrap(NodeKind::RExpr, value)?)?;
    wrap(NodeKind::Stmt, stmt)
}

/// `name = value;`
pub fn assign_local(name: &str, value: Node) -> Built {
    assign(Node::ident(name), value)
}

/// `this.field = value;`
pub fn assign_field(field: &str, value: Node) -> Built {
    assign(dot(load("this")?, field)?, value)
}

/// `return value;` or bare `return;`
pub fn ret(value: Option<Node>) -> Built {
    let mut stmt = Node::new(NodeKind::Return)?;
    if let Some(value) = value {
        stmt.insert(value)?;
    }
    wrap(NodeKind::Stmt, stmt)
}

/// An expression evaluated for effect.
pub fn expr_stmt(expr: Node) -> Built {
    wrap(NodeKind::Stmt, expr)
}

/// `{ stmts.. }`
pub fn block(stmts: Vec<Node>) -> Built {
    let mut block = Node::new(NodeKind::Block)?;
    for stmt in stmts {
        block.insert(stmt)?;
    }
    Ok(block)
}

/// `if (cond) { then } else { otherwise }`
pub fn if_else(cond: Node, then: Vec<Node>, otherwise: Option<Vec<Node>>) -> Built {
    let mut stmt = Node::new(NodeKind::If)?
        .with_child(wrap(NodeKind::Cond, cond)?)?
        .with_child(block(then)?)?;
    if let Some(otherwise) = otherwise {
        stmt.insert(block(otherwise)?)?;
    }
    wrap(NodeKind::Stmt, stmt)
}

/// `while (cond) { body }`
pub fn while_loop(cond: Node, body: Vec<Node>) -> Built {
    let stmt = Node::new(NodeKind::While)?
        .with_child(wrap(NodeKind::Cond, cond)?)?
        .with_child(block(body)?)?;
    wrap(NodeKind::Stmt, stmt)
}
