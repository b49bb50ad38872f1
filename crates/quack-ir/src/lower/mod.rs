//! Tree → IR Lowering
//!
//! Translates a [`CheckedProgram`] into an [`IrProgram`]: one [`ClassUnit`]
//! per declared class and a synthesized entry point for the top-level
//! statements. The descriptors are trusted; the pass checks only what it
//! needs to emit correct code, and stops at the first error.

mod expr;
mod stmt;

use quack_ast::{build, Node, NodeKind};

use crate::descriptor::{
    CheckedProgram, ClassDescriptor, ClassTable, Formal, MainDescriptor, SymbolTable,
};
use crate::error::GenError;
use crate::function::{BodyKind, MethodBody};
use crate::instruction::{Instruction, Terminator};
use crate::layout::{ClassLayout, Layouts};
use crate::module::{ClassUnit, IrProgram};
use crate::value::{Handle, RValue};
use crate::{GeneratorContext, Label, LabelKind, TempId};

/// Lowers the whole program in one pass.
pub fn lower_program(program: &CheckedProgram) -> Result<IrProgram, GenError> {
    let table = ClassTable::new(&program.classes);
    let layouts = Layouts::generate(&table)?;
    let mut lowerer = Lowerer::new(&layouts);

    let mut classes = Vec::new();
    for layout in layouts.user_classes() {
        let class = table
            .get(&layout.name)
            .ok_or_else(|| GenError::unresolved("class", &layout.name, None))?;
        classes.push(lowerer.lower_class(class, layout)?);
    }
    let entry = lowerer.lower_entry(&program.main)?;
    Ok(IrProgram { classes, entry })
}

/// Main lowering context.
pub struct Lowerer<'a> {
    layouts: &'a Layouts,
    gen: GeneratorContext,
}

/// Names visible while lowering one body.
struct MethodScope<'s> {
    kind: BodyKind,
    /// `None` in the no-`this` context of the entry point
    this_class: Option<&'s str>,
    formals: &'s [Formal],
    locals: &'s SymbolTable,
    return_type: Option<&'s str>,
}

impl MethodScope<'_> {
    fn type_of(&self, name: &str) -> Option<&str> {
        self.formals
            .iter()
            .find(|formal| formal.name == name)
            .map(|formal| formal.ty.as_str())
            .or_else(|| self.locals.get(name).map(String::as_str))
    }
}

/// Context for lowering a single body.
struct FuncCtx<'f> {
    func: &'f mut MethodBody,
    current_block: usize,
}

impl<'f> FuncCtx<'f> {
    fn new(func: &'f mut MethodBody) -> Self {
        let current_block = func.new_block(None);
        Self {
            func,
            current_block,
        }
    }

    fn emit(&mut self, instr: Instruction) {
        self.func.block_mut(self.current_block).push_instruction(instr);
    }

    fn set_terminator(&mut self, term: Terminator) {
        self.func.block_mut(self.current_block).set_terminator(term);
    }

    fn is_terminated(&self) -> bool {
        self.func.blocks[self.current_block].is_terminated()
    }

    /// Opens the next block in layout order and makes it current.
    fn start_block(&mut self, label: Option<Label>) {
        self.current_block = self.func.new_block(label);
    }
}

impl<'a> Lowerer<'a> {
    pub fn new(layouts: &'a Layouts) -> Self {
        Self {
            layouts,
            gen: GeneratorContext::new(),
        }
    }

    /// Counter state, mostly for inspection in tests.
    pub fn context(&self) -> &GeneratorContext {
        &self.gen
    }

    fn layout_of(&self, class: &str, node: &Node) -> Result<&'a ClassLayout, GenError> {
        let layouts: &'a Layouts = self.layouts;
        layouts
            .get(class)
            .ok_or_else(|| GenError::unresolved("class", class, node.span))
    }

    fn fresh_temp(&mut self, ctx: &mut FuncCtx, ty: &str) -> TempId {
        let id = self.gen.fresh_temp();
        ctx.func.add_temp(id, ty);
        id
    }

    fn fresh_flag(&mut self, ctx: &mut FuncCtx) -> TempId {
        let id = self.gen.fresh_temp();
        ctx.func.add_flag(id);
        id
    }

    fn fresh_label(&mut self, kind: LabelKind) -> Label {
        self.gen.fresh_label(kind)
    }

    pub fn lower_class(
        &mut self,
        class: &ClassDescriptor,
        layout: &ClassLayout,
    ) -> Result<ClassUnit, GenError> {
        let constructor = match &class.constructor {
            Some(ctor) => {
                let scope = MethodScope {
                    kind: BodyKind::Constructor,
                    this_class: Some(&class.name),
                    formals: &ctor.formals,
                    locals: &ctor.locals,
                    return_type: None,
                };
                self.lower_body(&scope, &ctor.body)?
            }
            None => {
                let body = synthesized_constructor(layout)?;
                let locals = SymbolTable::new();
                let scope = MethodScope {
                    kind: BodyKind::Constructor,
                    this_class: Some(&class.name),
                    formals: &layout.constructor,
                    locals: &locals,
                    return_type: None,
                };
                self.lower_body(&scope, &body)?
            }
        };

        let mut methods = Vec::new();
        for method in &class.methods {
            let scope = MethodScope {
                kind: BodyKind::Method,
                this_class: Some(&class.name),
                formals: &method.formals,
                locals: &method.locals,
                return_type: Some(&method.returns),
            };
            let mut body = self.lower_body(&scope, &method.body)?;
            body.name.clone_from(&method.name);
            methods.push(body);
        }

        Ok(ClassUnit {
            layout: layout.clone(),
            constructor,
            methods,
        })
    }

    /// Top-level statements, lowered in the no-`this` context.
    pub fn lower_entry(&mut self, main: &MainDescriptor) -> Result<MethodBody, GenError> {
        let scope = MethodScope {
            kind: BodyKind::Entry,
            this_class: None,
            formals: &[],
            locals: &main.locals,
            return_type: None,
        };
        self.lower_body(&scope, &main.body)
    }

    fn lower_body(&mut self, scope: &MethodScope, body: &Node) -> Result<MethodBody, GenError> {
        if body.kind() != NodeKind::Block {
            return Err(GenError::structural(body, "a body must be a block"));
        }
        let name = match scope.kind {
            BodyKind::Constructor => "constructor",
            BodyKind::Method => "",
            BodyKind::Entry => "main",
        };
        let mut func = MethodBody::new(
            scope.kind,
            scope.this_class.map(str::to_string),
            name,
            scope.formals.to_vec(),
            scope.return_type.map(str::to_string),
        );
        for (local, ty) in scope.locals {
            let is_formal = scope.formals.iter().any(|f| &f.name == local);
            if local != "this" && !is_formal {
                func.add_local(local, ty);
            }
        }

        let mut ctx = FuncCtx::new(&mut func);
        if let (BodyKind::Constructor, Some(class)) = (scope.kind, scope.this_class) {
            ctx.emit(Instruction::Allocate {
                class: class.to_string(),
            });
        }
        self.lower_block(&mut ctx, scope, body)?;

        if !ctx.is_terminated() {
            let value = match (scope.kind, scope.return_type) {
                (BodyKind::Constructor, _) => Some(RValue::Use(Handle::This)),
                (BodyKind::Method, Some(ret)) => Some(RValue::cast(Handle::Nothing, ret)),
                _ => None,
            };
            ctx.set_terminator(Terminator::Return(value));
        }
        Ok(func)
    }
}

/// `this.f = f;` for every field, in layout order.
fn synthesized_constructor(layout: &ClassLayout) -> Result<Node, GenError> {
    let mut stmts = Vec::new();
    for field in &layout.fields {
        stmts.push(build::assign_field(&field.name, build::load(&field.name)?)?);
    }
    Ok(build::block(stmts)?)
}
