//! Expression lowering.
//!
//! Each expression reduces to a [`Handle`]. Whatever instructions compute it
//! are appended to the current block before the handle is returned.

use quack_ast::{Node, NodeKind};

use super::{FuncCtx, Lowerer, MethodScope};
use crate::builtins;
use crate::error::GenError;
use crate::instruction::Instruction;
use crate::value::{Handle, Place, RValue};

impl<'a> Lowerer<'a> {
    pub(super) fn lower_expr(
        &mut self,
        ctx: &mut FuncCtx,
        scope: &MethodScope,
        node: &Node,
    ) -> Result<Handle, GenError> {
        match node.kind() {
            NodeKind::IntConst => {
                let value = node
                    .int_value()
                    .ok_or_else(|| GenError::structural(node, "integer literal without a value"))?;
                let value = i32::try_from(value).map_err(|_| {
                    GenError::structural(
                        node,
                        format!("integer literal {} does not fit in a C `int`", value),
                    )
                })?;
                Ok(self.box_literal(ctx, builtins::INT, RValue::IntLiteral(value)))
            }
            NodeKind::StrConst => {
                let text = node
                    .text()
                    .ok_or_else(|| GenError::structural(node, "string literal without text"))?;
                Ok(self.box_literal(ctx, builtins::STRING, RValue::StrLiteral(text.to_string())))
            }
            NodeKind::Load => self.lower_load(scope, node),
            NodeKind::Dot => self.lower_field_read(ctx, scope, node),
            NodeKind::Call => {
                let result = self.lower_call(ctx, scope, node, true)?;
                Ok(result.unwrap_or(Handle::Nothing))
            }
            NodeKind::BinOp => {
                let result = self.lower_bin_op(ctx, scope, node, true)?;
                Ok(result.unwrap_or(Handle::Nothing))
            }
            NodeKind::Constructor => self.lower_construct(ctx, scope, node),
            NodeKind::And | NodeKind::Or | NodeKind::Not => Err(GenError::unsupported(
                node,
                "boolean connectives are not implemented",
            )),
            other => Err(GenError::structural(
                node,
                format!("`{}` cannot appear in expression position", other),
            )),
        }
    }

    /// Literals always get a temporary of their own.
    fn box_literal(&mut self, ctx: &mut FuncCtx, class: &str, value: RValue) -> Handle {
        let temp = self.fresh_temp(ctx, class);
        ctx.emit(Instruction::Assign {
            dest: Place::Temp(temp),
            value,
        });
        Handle::Temp(temp)
    }

    fn lower_load(&self, scope: &MethodScope, node: &Node) -> Result<Handle, GenError> {
        let name = node
            .ident_name()
            .ok_or_else(|| GenError::missing("name", node))?;
        match name {
            "this" => {
                self.this_class(scope, node)?;
                Ok(Handle::This)
            }
            "true" => Ok(Handle::True),
            "false" => Ok(Handle::False),
            "none" => Ok(Handle::Nothing),
            _ if scope.type_of(name).is_some() => Ok(Handle::Local(name.to_string())),
            _ => Err(GenError::unresolved("variable", name, node.span)),
        }
    }

    pub(super) fn this_class<'s>(
        &self,
        scope: &MethodScope<'s>,
        node: &Node,
    ) -> Result<&'s str, GenError> {
        scope
            .this_class
            .ok_or_else(|| GenError::unsupported(node, "`this` is not available at top level"))
    }

    /// Static class of the object a handle names.
    pub(super) fn handle_type(
        &self,
        ctx: &FuncCtx,
        scope: &MethodScope,
        handle: &Handle,
        node: &Node,
    ) -> Result<String, GenError> {
        let ty = match handle {
            Handle::Temp(id) => ctx
                .func
                .temp_type(*id)
                .ok_or_else(|| GenError::unresolved("temporary", id.to_string(), node.span))?,
            Handle::Local(name) => scope
                .type_of(name)
                .ok_or_else(|| GenError::unresolved("variable", name, node.span))?,
            Handle::This => self.this_class(scope, node)?,
            Handle::True | Handle::False => builtins::BOOLEAN,
            Handle::Nothing => builtins::NOTHING,
        };
        Ok(ty.to_string())
    }

    /// `handle` as a value of class `to`.
    pub(super) fn coerce(
        &self,
        ctx: &FuncCtx,
        scope: &MethodScope,
        handle: Handle,
        to: &str,
        node: &Node,
    ) -> Result<RValue, GenError> {
        let from = self.handle_type(ctx, scope, &handle, node)?;
        Ok(RValue::coerce(handle, &from, to))
    }

    /// Field read, materialized into a temporary of the field's type.
    fn lower_field_read(
        &mut self,
        ctx: &mut FuncCtx,
        scope: &MethodScope,
        node: &Node,
    ) -> Result<Handle, GenError> {
        let field = node
            .ident_name()
            .ok_or_else(|| GenError::missing("member name", node))?;
        let receiver = node
            .expr_child()
            .ok_or_else(|| GenError::missing("receiver", node))?;

        let (object, class) = if receiver.is_load_of("this") {
            (Handle::This, self.this_class(scope, receiver)?.to_string())
        } else {
            let object = self.lower_expr(ctx, scope, receiver)?;
            let class = self.handle_type(ctx, scope, &object, receiver)?;
            (object, class)
        };

        let layout = self.layout_of(&class, node)?;
        let ty = layout.field_type(field).ok_or_else(|| {
            GenError::unresolved("field", format!("{}.{}", class, field), node.span)
        })?;
        let temp = self.fresh_temp(ctx, ty);
        ctx.emit(Instruction::Assign {
            dest: Place::Temp(temp),
            value: RValue::Field {
                object,
                field: field.to_string(),
            },
        });
        Ok(Handle::Temp(temp))
    }

    /// Argument expressions of an `actual_args` child, in order.
    fn actual_args<'n>(&self, node: &'n Node) -> Result<Vec<&'n Node>, GenError> {
        let Some(list) = node.get(NodeKind::ActualArgs) else {
            return Ok(Vec::new());
        };
        list.get_all(NodeKind::Arg)
            .iter()
            .map(|arg| arg.expr_child().ok_or_else(|| GenError::missing("expression", arg)))
            .collect()
    }

    fn lower_args(
        &mut self,
        ctx: &mut FuncCtx,
        scope: &MethodScope,
        args: &[&Node],
    ) -> Result<Vec<Handle>, GenError> {
        let mut handles = Vec::with_capacity(args.len());
        for arg in args {
            handles.push(self.lower_expr(ctx, scope, arg)?);
        }
        Ok(handles)
    }

    /// `receiver.method(args..)`. The result is bound only when `want_result`.
    pub(super) fn lower_call(
        &mut self,
        ctx: &mut FuncCtx,
        scope: &MethodScope,
        node: &Node,
        want_result: bool,
    ) -> Result<Option<Handle>, GenError> {
        let target = node
            .get(NodeKind::Dot)
            .ok_or_else(|| GenError::missing("method target", node))?;
        let method = target
            .ident_name()
            .ok_or_else(|| GenError::missing("method name", target))?;
        let receiver_node = target
            .expr_child()
            .ok_or_else(|| GenError::missing("receiver", target))?;

        let receiver = self.lower_expr(ctx, scope, receiver_node)?;
        let arg_nodes = self.actual_args(node)?;
        let args = self.lower_args(ctx, scope, &arg_nodes)?;
        self.dispatch(ctx, scope, node, receiver, method, args, want_result)
    }

    /// `left op right` dispatches `op` on the left operand.
    pub(super) fn lower_bin_op(
        &mut self,
        ctx: &mut FuncCtx,
        scope: &MethodScope,
        node: &Node,
        want_result: bool,
    ) -> Result<Option<Handle>, GenError> {
        let op = node
            .ident_name()
            .ok_or_else(|| GenError::missing("operator", node))?;
        let operands = node.get_all(NodeKind::Operand);
        if operands.len() != 2 {
            return Err(GenError::structural(
                node,
                format!("expected 2 operands, found {}", operands.len()),
            ));
        }
        let left_node = operands[0]
            .expr_child()
            .ok_or_else(|| GenError::missing("expression", &operands[0]))?;
        let right_node = operands[1]
            .expr_child()
            .ok_or_else(|| GenError::missing("expression", &operands[1]))?;

        let left = self.lower_expr(ctx, scope, left_node)?;
        let right = self.lower_expr(ctx, scope, right_node)?;
        self.dispatch(ctx, scope, node, left, op, vec![right], want_result)
    }

    #[allow(clippy::too_many_arguments)]
    fn dispatch(
        &mut self,
        ctx: &mut FuncCtx,
        scope: &MethodScope,
        node: &Node,
        receiver: Handle,
        method: &str,
        args: Vec<Handle>,
        want_result: bool,
    ) -> Result<Option<Handle>, GenError> {
        let class = self.handle_type(ctx, scope, &receiver, node)?;
        let layout = self.layout_of(&class, node)?;
        let (slot_index, slot) = layout.slot(method).ok_or_else(|| {
            GenError::unresolved("method", format!("{}.{}", class, method), node.span)
        })?;
        if slot.params.len() != args.len() {
            return Err(GenError::structural(
                node,
                format!(
                    "`{}.{}` takes {} argument(s), {} given",
                    class,
                    method,
                    slot.params.len(),
                    args.len()
                ),
            ));
        }

        let this_arg = self.coerce(ctx, scope, receiver.clone(), &slot.implementor, node)?;
        let mut cast_args = Vec::with_capacity(args.len());
        for (arg, param) in args.into_iter().zip(&slot.params) {
            cast_args.push(self.coerce(ctx, scope, arg, param, node)?);
        }

        let dest = if want_result {
            Some(self.fresh_temp(ctx, &slot.returns))
        } else {
            None
        };
        ctx.emit(Instruction::Dispatch {
            dest,
            receiver,
            method: method.to_string(),
            slot: slot_index,
            this_arg,
            args: cast_args,
        });
        Ok(dest.map(Handle::Temp))
    }

    /// `Class(args..)` through the class's allocator.
    fn lower_construct(
        &mut self,
        ctx: &mut FuncCtx,
        scope: &MethodScope,
        node: &Node,
    ) -> Result<Handle, GenError> {
        let class = node
            .ident_name()
            .ok_or_else(|| GenError::missing("class name", node))?;
        let layout = self.layout_of(class, node)?;
        if layout.builtin {
            return Err(GenError::unsupported(
                node,
                format!("runtime class `{}` cannot be constructed directly", class),
            ));
        }

        let arg_nodes = self.actual_args(node)?;
        if arg_nodes.len() != layout.constructor.len() {
            return Err(GenError::structural(
                node,
                format!(
                    "`{}` takes {} argument(s), {} given",
                    class,
                    layout.constructor.len(),
                    arg_nodes.len()
                ),
            ));
        }
        let args = self.lower_args(ctx, scope, &arg_nodes)?;
        let cast_args = args
            .into_iter()
            .zip(&layout.constructor)
            .map(|(arg, formal)| RValue::cast(arg, &formal.ty))
            .collect();

        let dest = self.fresh_temp(ctx, class);
        ctx.emit(Instruction::Construct {
            dest,
            class: class.to_string(),
            args: cast_args,
        });
        Ok(Handle::Temp(dest))
    }
}
