//! IR method body → C function
//!
//! Declarations come first (receiver, locals, temporaries), then each block in
//! layout order: its label, its instructions and its terminator. Fallthrough
//! emits nothing because the next block follows directly.

use std::collections::HashSet;
use std::fmt::Write;

use quack_ir::{BodyKind, Instruction, MethodBody, Place, RValue, Terminator};

use crate::error::CodegenError;
use crate::runtime::{
    c_string, class_singleton, constructor_symbol, handle, method_symbol, obj_struct, obj_type,
    user_ident,
};

const INDENT: &str = "  ";

/// Translates one [`MethodBody`] into C source appended to `out`.
pub(crate) struct FunctionTranslator<'a> {
    body: &'a MethodBody,
    out: &'a mut String,
}

impl<'a> FunctionTranslator<'a> {
    pub(crate) fn new(body: &'a MethodBody, out: &'a mut String) -> Self {
        Self { body, out }
    }

    /// C symbol of the function a body compiles to.
    pub(crate) fn symbol(body: &MethodBody) -> String {
        let class = body.class.as_deref().unwrap_or_default();
        match body.kind {
            BodyKind::Constructor => constructor_symbol(class),
            BodyKind::Method => method_symbol(class, &body.name),
            BodyKind::Entry => "main".to_string(),
        }
    }

    /// Full C signature, without a trailing `;` or `{`.
    pub(crate) fn signature(body: &MethodBody) -> String {
        let class = body.class.as_deref().unwrap_or_default();
        let mut params: Vec<String> = Vec::new();
        let returns = match body.kind {
            BodyKind::Entry => return "int main(int argc, char *argv[])".to_string(),
            BodyKind::Constructor => obj_type(class),
            BodyKind::Method => {
                params.push(format!("{} this", obj_type(class)));
                obj_type(body.return_type.as_deref().unwrap_or(class))
            }
        };
        params.extend(
            body.params
                .iter()
                .map(|formal| format!("{} {}", obj_type(&formal.ty), user_ident(&formal.name))),
        );
        let params = if params.is_empty() {
            "void".to_string()
        } else {
            params.join(", ")
        };
        format!("{} {}({})", returns, Self::symbol(body), params)
    }

    fn function_name(&self) -> String {
        match &self.body.class {
            Some(class) => format!("{}.{}", class, self.body.name),
            None => self.body.name.clone(),
        }
    }

    /// Every jump must land on a label defined exactly once in this body.
    fn check_labels(&self) -> Result<(), CodegenError> {
        let mut defined = HashSet::new();
        for label in self.body.labels() {
            if !defined.insert(label) {
                return Err(CodegenError::DuplicateLabel {
                    function: self.function_name(),
                    label: label.to_string(),
                });
            }
        }
        for block in &self.body.blocks {
            if let Some(label) = block.jump_targets().into_iter().find(|l| !defined.contains(l)) {
                return Err(CodegenError::UndefinedLabel {
                    function: self.function_name(),
                    label: label.to_string(),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn translate(mut self) -> Result<(), CodegenError> {
        self.check_labels()?;
        let body = self.body;
        writeln!(self.out, "{} {{", Self::signature(body))?;
        self.declarations()?;
        for block in &body.blocks {
            if let Some(label) = block.label {
                writeln!(self.out, "{}:;", label)?;
            }
            for inst in &block.instructions {
                self.instruction(inst)?;
            }
            self.terminator(&block.terminator)?;
        }
        writeln!(self.out, "}}")?;
        writeln!(self.out)?;
        Ok(())
    }

    fn declarations(&mut self) -> Result<(), CodegenError> {
        let body = self.body;
        let mut any = false;
        if let (BodyKind::Constructor, Some(class)) = (body.kind, &body.class) {
            writeln!(self.out, "{}{} this;", INDENT, obj_type(class))?;
            any = true;
        }
        for local in &body.locals {
            writeln!(
                self.out,
                "{}{} {};",
                INDENT,
                obj_type(&local.ty),
                user_ident(&local.name)
            )?;
            any = true;
        }
        for (temp, ty) in &body.temps {
            writeln!(self.out, "{}{} {};", INDENT, obj_type(ty), temp)?;
            any = true;
        }
        for flag in &body.flags {
            writeln!(self.out, "{}int {};", INDENT, flag)?;
            any = true;
        }
        if any {
            writeln!(self.out)?;
        }
        Ok(())
    }

    fn instruction(&mut self, inst: &Instruction) -> Result<(), CodegenError> {
        match inst {
            Instruction::Assign { dest, value } => {
                let dest = match dest {
                    Place::Local(name) => user_ident(name),
                    Place::Temp(temp) => temp.to_string(),
                    Place::Field { object, field } => {
                        format!("{}->{}", handle(object), user_ident(field))
                    }
                };
                writeln!(self.out, "{}{} = {};", INDENT, dest, rvalue(value))?;
            }
            Instruction::Dispatch {
                dest,
                receiver,
                method,
                this_arg,
                args,
                ..
            } => {
                let mut actuals = vec![rvalue(this_arg)];
                actuals.extend(args.iter().map(rvalue));
                let call = format!(
                    "{}->clazz->{}({})",
                    handle(receiver),
                    method,
                    actuals.join(", ")
                );
                match dest {
                    Some(dest) => writeln!(self.out, "{}{} = {};", INDENT, dest, call)?,
                    None => writeln!(self.out, "{}{};", INDENT, call)?,
                }
            }
            Instruction::Construct { dest, class, args } => {
                let actuals: Vec<_> = args.iter().map(rvalue).collect();
                writeln!(
                    self.out,
                    "{}{} = {}->constructor({});",
                    INDENT,
                    dest,
                    class_singleton(class),
                    actuals.join(", ")
                )?;
            }
            Instruction::Allocate { class } => {
                writeln!(
                    self.out,
                    "{}this = ({}) malloc(sizeof(struct {}));",
                    INDENT,
                    obj_type(class),
                    obj_struct(class)
                )?;
                writeln!(self.out, "{}this->clazz = {};", INDENT, class_singleton(class))?;
            }
            Instruction::TestTrue { dest, value } => {
                writeln!(
                    self.out,
                    "{}{} = ((obj_Obj) {} == (obj_Obj) lit_true);",
                    INDENT,
                    dest,
                    handle(value)
                )?;
            }
        }
        Ok(())
    }

    fn terminator(&mut self, term: &Terminator) -> Result<(), CodegenError> {
        match term {
            Terminator::Fallthrough => {}
            Terminator::Jump(target) => writeln!(self.out, "{}goto {};", INDENT, target)?,
            Terminator::Branch {
                cond,
                then_label,
                else_label,
            } => {
                writeln!(self.out, "{}if ({}) goto {};", INDENT, cond, then_label)?;
                writeln!(self.out, "{}goto {};", INDENT, else_label)?;
            }
            Terminator::Return(Some(value)) => {
                writeln!(self.out, "{}return {};", INDENT, rvalue(value))?
            }
            Terminator::Return(None) => match self.body.kind {
                BodyKind::Entry => writeln!(self.out, "{}return 0;", INDENT)?,
                _ => {
                    return Err(CodegenError::MissingReturnValue {
                        function: self.function_name(),
                    })
                }
            },
        }
        Ok(())
    }
}

fn rvalue(value: &RValue) -> String {
    match value {
        RValue::Use(value) => handle(value),
        RValue::Cast { value, ty } => format!("({}) {}", obj_type(ty), handle(value)),
        RValue::IntLiteral(n) => format!("int_literal({})", n),
        RValue::StrLiteral(text) => format!("str_literal({})", c_string(text)),
        RValue::Field { object, field } => format!("{}->{}", handle(object), user_ident(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quack_ir::{Block, Formal, Handle, Label, LabelKind, TempId};

    fn entry() -> MethodBody {
        MethodBody::new(BodyKind::Entry, None, "main", vec![], None)
    }

    #[test]
    fn test_signatures() {
        let ctor = MethodBody::new(
            BodyKind::Constructor,
            Some("Pt".into()),
            "constructor",
            vec![Formal::new("x", "Int")],
            None,
        );
        assert_eq!(FunctionTranslator::signature(&ctor), "obj_Pt new_Pt(obj_Int q_x)");

        let method = MethodBody::new(
            BodyKind::Method,
            Some("Pt".into()),
            "SUM",
            vec![Formal::new("other", "Pt")],
            Some("Pt".into()),
        );
        assert_eq!(
            FunctionTranslator::signature(&method),
            "obj_Pt Pt_method_SUM(obj_Pt this, obj_Pt q_other)"
        );

        let empty = MethodBody::new(
            BodyKind::Constructor,
            Some("E".into()),
            "constructor",
            vec![],
            None,
        );
        assert_eq!(FunctionTranslator::signature(&empty), "obj_E new_E(void)");
    }

    #[test]
    fn test_branch_and_labels() {
        let then_label = Label {
            kind: LabelKind::Then,
            id: 2,
        };
        let else_label = Label {
            kind: LabelKind::Else,
            id: 3,
        };
        let mut body = entry();
        body.add_flag(TempId(1));
        let mut first = Block::new(None);
        first.push_instruction(Instruction::TestTrue {
            dest: TempId(1),
            value: Handle::True,
        });
        first.set_terminator(Terminator::Branch {
            cond: TempId(1),
            then_label,
            else_label,
        });
        body.blocks.push(first);
        body.blocks.push(Block::new(Some(then_label)));
        let mut last = Block::new(Some(else_label));
        last.set_terminator(Terminator::Return(None));
        body.blocks.push(last);

        let mut out = String::new();
        FunctionTranslator::new(&body, &mut out).translate().unwrap();
        let expected = "\
int main(int argc, char *argv[]) {
  int tmp_1;

  tmp_1 = ((obj_Obj) lit_true == (obj_Obj) lit_true);
  if (tmp_1) goto then_2;
  goto else_3;
then_2:;
else_3:;
  return 0;
}

";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_undefined_label_rejected() {
        let mut body = entry();
        let mut block = Block::new(None);
        block.set_terminator(Terminator::Jump(Label {
            kind: LabelKind::EndIf,
            id: 9,
        }));
        body.blocks.push(block);

        let mut out = String::new();
        let err = FunctionTranslator::new(&body, &mut out).translate().unwrap_err();
        assert!(matches!(
            err,
            CodegenError::UndefinedLabel { ref label, .. } if label == "endif_9"
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_method_must_return_a_value() {
        let mut body = MethodBody::new(
            BodyKind::Method,
            Some("A".into()),
            "F",
            vec![],
            Some("Obj".into()),
        );
        let mut block = Block::new(None);
        block.set_terminator(Terminator::Return(None));
        body.blocks.push(block);

        let mut out = String::new();
        let err = FunctionTranslator::new(&body, &mut out).translate().unwrap_err();
        assert_eq!(
            err,
            CodegenError::MissingReturnValue {
                function: "A.F".into()
            }
        );
    }

    #[test]
    fn test_rvalues() {
        assert_eq!(rvalue(&RValue::IntLiteral(-4)), "int_literal(-4)");
        assert_eq!(rvalue(&RValue::StrLiteral("a\"b".into())), "str_literal(\"a\\\"b\")");
        assert_eq!(
            rvalue(&RValue::Cast {
                value: Handle::Temp(TempId(7)),
                ty: "Obj".into()
            }),
            "(obj_Obj) tmp_7"
        );
        assert_eq!(
            rvalue(&RValue::Field {
                object: Handle::Local("other".into()),
                field: "x".into()
            }),
            "q_other->q_x"
        );
    }
}
