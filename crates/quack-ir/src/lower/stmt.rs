//! Statement lowering.

use quack_ast::{Node, NodeKind};

use super::{FuncCtx, Lowerer, MethodScope};
use crate::error::GenError;
use crate::function::BodyKind;
use crate::instruction::{Instruction, Terminator};
use crate::value::{Handle, Place, RValue};
use crate::{Label, LabelKind};

impl<'a> Lowerer<'a> {
    pub(super) fn lower_block(
        &mut self,
        ctx: &mut FuncCtx,
        scope: &MethodScope,
        block: &Node,
    ) -> Result<(), GenError> {
        for stmt in block.get_all(NodeKind::Stmt) {
            // Code after a return or jump still gets a block of its own.
            if ctx.is_terminated() {
                ctx.start_block(None);
            }
            self.lower_stmt(ctx, scope, stmt)?;
        }
        Ok(())
    }

    fn lower_stmt(
        &mut self,
        ctx: &mut FuncCtx,
        scope: &MethodScope,
        stmt: &Node,
    ) -> Result<(), GenError> {
        if stmt.child_count() > 1 {
            return Err(GenError::structural(stmt, "a statement holds exactly one node"));
        }
        let inner = stmt
            .children()
            .next()
            .ok_or_else(|| GenError::missing("statement", stmt))?;

        match inner.kind() {
            NodeKind::Assign => self.lower_assign(ctx, scope, inner),
            NodeKind::Return => self.lower_return(ctx, scope, inner),
            NodeKind::If => self.lower_if(ctx, scope, inner),
            NodeKind::While => self.lower_while(ctx, scope, inner),
            NodeKind::Call => self.lower_call(ctx, scope, inner, false).map(|_| ()),
            NodeKind::BinOp => self.lower_bin_op(ctx, scope, inner, false).map(|_| ()),
            kind if kind.is_expr() => self.lower_expr(ctx, scope, inner).map(|_| ()),
            other => Err(GenError::structural(
                inner,
                format!("`{}` is not a statement", other),
            )),
        }
    }

    fn lower_assign(
        &mut self,
        ctx: &mut FuncCtx,
        scope: &MethodScope,
        node: &Node,
    ) -> Result<(), GenError> {
        let target = node
            .get(NodeKind::LExpr)
            .and_then(|lhs| lhs.children().next())
            .ok_or_else(|| GenError::missing("assignment target", node))?;
        let value_node = node
            .get(NodeKind::RExpr)
            .and_then(Node::expr_child)
            .ok_or_else(|| GenError::missing("assigned value", node))?;

        match target.kind() {
            NodeKind::Ident => {
                let name = target
                    .text()
                    .ok_or_else(|| GenError::structural(target, "identifier without a name"))?;
                if matches!(name, "this" | "true" | "false" | "none") {
                    return Err(GenError::unsupported(
                        target,
                        format!("cannot assign to `{}`", name),
                    ));
                }
                let declared = scope
                    .type_of(name)
                    .ok_or_else(|| GenError::unresolved("declared type for", name, target.span))?;

                let value = self.lower_expr(ctx, scope, value_node)?;
                let value = self.coerce(ctx, scope, value, declared, value_node)?;
                ctx.emit(Instruction::Assign {
                    dest: Place::Local(name.to_string()),
                    value,
                });
                Ok(())
            }
            NodeKind::Dot => {
                let receiver = target
                    .expr_child()
                    .ok_or_else(|| GenError::missing("receiver", target))?;
                if !receiver.is_load_of("this") {
                    return Err(GenError::unsupported(
                        target,
                        "fields can only be written through `this`",
                    ));
                }
                let class = self.this_class(scope, receiver)?;
                let field = target
                    .ident_name()
                    .ok_or_else(|| GenError::missing("member name", target))?;
                let ty = self.layout_of(class, target)?.field_type(field).ok_or_else(|| {
                    GenError::unresolved("field", format!("{}.{}", class, field), target.span)
                })?;

                let value = self.lower_expr(ctx, scope, value_node)?;
                let value = self.coerce(ctx, scope, value, ty, value_node)?;
                ctx.emit(Instruction::Assign {
                    dest: Place::Field {
                        object: Handle::This,
                        field: field.to_string(),
                    },
                    value,
                });
                Ok(())
            }
            other => Err(GenError::structural(
                target,
                format!("`{}` cannot be assigned to", other),
            )),
        }
    }

    fn lower_return(
        &mut self,
        ctx: &mut FuncCtx,
        scope: &MethodScope,
        node: &Node,
    ) -> Result<(), GenError> {
        let ret = match (scope.kind, scope.return_type) {
            (BodyKind::Method, Some(ret)) => ret,
            (BodyKind::Constructor, _) => {
                return Err(GenError::unsupported(node, "return inside a constructor"))
            }
            _ => return Err(GenError::unsupported(node, "return at top level")),
        };
        let value = match node.expr_child() {
            Some(expr) => self.lower_expr(ctx, scope, expr)?,
            None => Handle::Nothing,
        };
        ctx.set_terminator(Terminator::Return(Some(RValue::cast(value, ret))));
        Ok(())
    }

    /// Lowers the condition of an `if` or `while` into a branch.
    fn lower_condition(
        &mut self,
        ctx: &mut FuncCtx,
        scope: &MethodScope,
        node: &Node,
        then_label: Label,
        else_label: Label,
    ) -> Result<(), GenError> {
        let cond = node
            .get(NodeKind::Cond)
            .and_then(Node::expr_child)
            .ok_or_else(|| GenError::missing("condition", node))?;
        let value = self.lower_expr(ctx, scope, cond)?;
        let flag = self.fresh_flag(ctx);
        ctx.emit(Instruction::TestTrue { dest: flag, value });
        ctx.set_terminator(Terminator::Branch {
            cond: flag,
            then_label,
            else_label,
        });
        Ok(())
    }

    fn lower_if(
        &mut self,
        ctx: &mut FuncCtx,
        scope: &MethodScope,
        node: &Node,
    ) -> Result<(), GenError> {
        let (then_branch, else_branch) = match node.get_all(NodeKind::Block) {
            [then_branch] => (then_branch, None),
            [then_branch, else_branch] => (then_branch, Some(else_branch)),
            branches => {
                return Err(GenError::structural(
                    node,
                    format!("expected 1 or 2 branches, found {}", branches.len()),
                ))
            }
        };

        let then_label = self.fresh_label(LabelKind::Then);
        let else_label = self.fresh_label(LabelKind::Else);
        let end_label = self.fresh_label(LabelKind::EndIf);

        self.lower_condition(ctx, scope, node, then_label, else_label)?;

        ctx.start_block(Some(then_label));
        self.lower_block(ctx, scope, then_branch)?;
        if !ctx.is_terminated() {
            ctx.set_terminator(Terminator::Jump(end_label));
        }

        ctx.start_block(Some(else_label));
        if let Some(else_branch) = else_branch {
            self.lower_block(ctx, scope, else_branch)?;
        }

        ctx.start_block(Some(end_label));
        Ok(())
    }

    fn lower_while(
        &mut self,
        ctx: &mut FuncCtx,
        scope: &MethodScope,
        node: &Node,
    ) -> Result<(), GenError> {
        let body = node
            .get(NodeKind::Block)
            .ok_or_else(|| GenError::missing("loop body", node))?;

        let head_label = self.fresh_label(LabelKind::Loop);
        let body_label = self.fresh_label(LabelKind::Body);
        let exit_label = self.fresh_label(LabelKind::EndLoop);

        ctx.start_block(Some(head_label));
        self.lower_condition(ctx, scope, node, body_label, exit_label)?;

        ctx.start_block(Some(body_label));
        self.lower_block(ctx, scope, body)?;
        if !ctx.is_terminated() {
            ctx.set_terminator(Terminator::Jump(head_label));
        }

        ctx.start_block(Some(exit_label));
        Ok(())
    }
}
