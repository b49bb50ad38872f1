//! Quack C Code Generator
//!
//! Renders a lowered [`IrProgram`] as one C translation unit written against
//! the runtime header (`Builtins.h`). The whole unit is built in memory, so a
//! failure never leaves partial output behind.

mod error;
mod runtime;
mod translator;

pub use error::CodegenError;

use std::fmt::Write;

use quack_ir::{ClassLayout, ClassUnit, IrProgram};

use crate::runtime::{
    class_singleton, class_struct, class_type, constructor_symbol, method_symbol, obj_struct,
    obj_type, param_types, user_ident,
};
use crate::translator::FunctionTranslator;

/// Output settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Path placed in the `#include` for the runtime
    pub runtime_header: String,
    /// Emit a comment banner before each section
    pub banners: bool,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            runtime_header: "Builtins.h".to_string(),
            banners: true,
        }
    }
}

/// Main code generator that translates Quack IR to C source
pub struct CodeGenerator {
    options: CodegenOptions,
    out: String,
}

impl CodeGenerator {
    pub fn new(options: CodegenOptions) -> Self {
        Self {
            options,
            out: String::new(),
        }
    }

    /// Generate the translation unit for `program`.
    pub fn compile_program(mut self, program: &IrProgram) -> Result<String, CodegenError> {
        writeln!(self.out, "#include <stdio.h>")?;
        writeln!(self.out, "#include <stdlib.h>")?;
        writeln!(self.out, "#include \"{}\"", self.options.runtime_header)?;
        writeln!(self.out)?;

        self.banner("Typedefs")?;
        for class in &program.classes {
            self.typedefs(&class.layout)?;
        }

        self.banner("Forward Declarations")?;
        for class in &program.classes {
            self.forward_decls(class)?;
        }

        self.banner("Structs")?;
        for class in &program.classes {
            self.structs(&class.layout)?;
        }

        self.banner("Methods")?;
        for class in &program.classes {
            FunctionTranslator::new(&class.constructor, &mut self.out).translate()?;
            for method in &class.methods {
                FunctionTranslator::new(method, &mut self.out).translate()?;
            }
        }

        self.banner("Singletons")?;
        for class in &program.classes {
            self.singleton(&class.layout)?;
        }

        self.banner("Main")?;
        FunctionTranslator::new(&program.entry, &mut self.out).translate()?;
        Ok(self.out)
    }

    fn banner(&mut self, title: &str) -> Result<(), CodegenError> {
        if self.options.banners {
            writeln!(self.out, "// -~-~-~-~- {} -~-~-~-~-", title)?;
            writeln!(self.out)?;
        }
        Ok(())
    }

    fn typedefs(&mut self, layout: &ClassLayout) -> Result<(), CodegenError> {
        let name = &layout.name;
        writeln!(self.out, "struct {};", class_struct(name))?;
        writeln!(
            self.out,
            "typedef struct {}* {};",
            class_struct(name),
            class_type(name)
        )?;
        writeln!(self.out, "struct {};", obj_struct(name))?;
        writeln!(self.out, "typedef struct {}* {};", obj_struct(name), obj_type(name))?;
        writeln!(self.out)?;
        Ok(())
    }

    fn forward_decls(&mut self, class: &ClassUnit) -> Result<(), CodegenError> {
        writeln!(self.out, "{};", FunctionTranslator::signature(&class.constructor))?;
        for method in &class.methods {
            writeln!(self.out, "{};", FunctionTranslator::signature(method))?;
        }
        writeln!(
            self.out,
            "extern {} {};",
            class_type(&class.layout.name),
            class_singleton(&class.layout.name)
        )?;
        writeln!(self.out)?;
        Ok(())
    }

    fn structs(&mut self, layout: &ClassLayout) -> Result<(), CodegenError> {
        let name = &layout.name;
        writeln!(self.out, "struct {} {{", obj_struct(name))?;
        writeln!(self.out, "  {} clazz;", class_type(name))?;
        for field in &layout.fields {
            writeln!(self.out, "  {} {};", obj_type(&field.ty), user_ident(&field.name))?;
        }
        writeln!(self.out, "}};")?;
        writeln!(self.out)?;

        writeln!(self.out, "struct {} {{", class_struct(name))?;
        writeln!(
            self.out,
            "  {} (*constructor) ({});",
            obj_type(name),
            param_types(layout.constructor.iter().map(|f| f.ty.as_str()))
        )?;
        for slot in &layout.methods {
            let params = std::iter::once(slot.implementor.as_str())
                .chain(slot.params.iter().map(String::as_str));
            writeln!(
                self.out,
                "  {} (*{}) ({});",
                obj_type(&slot.returns),
                slot.name,
                param_types(params)
            )?;
        }
        writeln!(self.out, "}};")?;
        writeln!(self.out)?;
        Ok(())
    }

    /// The statically allocated method table, slot 0 first.
    fn singleton(&mut self, layout: &ClassLayout) -> Result<(), CodegenError> {
        let name = &layout.name;
        writeln!(
            self.out,
            "struct {} {}_struct = {{",
            class_struct(name),
            class_singleton(name)
        )?;
        let mut entries = vec![constructor_symbol(name)];
        entries.extend(
            layout
                .methods
                .iter()
                .map(|slot| method_symbol(&slot.implementor, &slot.name)),
        );
        writeln!(self.out, "  {}", entries.join(",\n  "))?;
        writeln!(self.out, "}};")?;
        writeln!(
            self.out,
            "{} {} = &{}_struct;",
            class_type(name),
            class_singleton(name),
            class_singleton(name)
        )?;
        writeln!(self.out)?;
        Ok(())
    }
}

/// Generate C for `program` with the given options.
pub fn generate(program: &IrProgram, options: &CodegenOptions) -> Result<String, CodegenError> {
    CodeGenerator::new(options.clone()).compile_program(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quack_ast::{build, Node};
    use quack_ir::{
        lower_program, CheckedProgram, ClassDescriptor, Formal, MainDescriptor, MethodDescriptor,
    };

    fn point_program() -> CheckedProgram {
        let sum = MethodDescriptor {
            name: "SUM".into(),
            formals: vec![Formal::new("other", "Pt")],
            returns: "Pt".into(),
            locals: Default::default(),
            body: build::block(vec![build::ret(Some(
                build::construct(
                    "Pt",
                    vec![
                        build::bin_op(
                            "PLUS",
                            build::dot(build::load("this").unwrap(), "x").unwrap(),
                            build::dot(build::load("other").unwrap(), "x").unwrap(),
                        )
                        .unwrap(),
                        build::bin_op(
                            "PLUS",
                            build::dot(build::load("this").unwrap(), "y").unwrap(),
                            build::dot(build::load("other").unwrap(), "y").unwrap(),
                        )
                        .unwrap(),
                    ],
                )
                .unwrap(),
            ))
            .unwrap()])
            .unwrap(),
        };
        let pt = ClassDescriptor {
            name: "Pt".into(),
            superclass: "Obj".into(),
            fields: vec![Formal::new("x", "Int"), Formal::new("y", "Int")],
            constructor: None,
            methods: vec![sum],
        };
        let main = MainDescriptor {
            locals: [("p".to_string(), "Pt".to_string())].into_iter().collect(),
            body: build::block(vec![
                build::assign_local(
                    "p",
                    build::construct("Pt", vec![Node::int(1), Node::int(2)]).unwrap(),
                )
                .unwrap(),
                build::expr_stmt(
                    build::call(build::load("p").unwrap(), "PRINT", vec![]).unwrap(),
                )
                .unwrap(),
            ])
            .unwrap(),
        };
        CheckedProgram {
            source: None,
            classes: vec![pt],
            main,
        }
    }

    fn compile(options: CodegenOptions) -> String {
        let ir = lower_program(&point_program()).unwrap();
        generate(&ir, &options).unwrap()
    }

    #[test]
    fn test_sections_in_order() {
        let c = compile(CodegenOptions::default());
        let order = [
            "#include \"Builtins.h\"",
            "typedef struct class_Pt_struct* class_Pt;",
            "obj_Pt new_Pt(obj_Int q_x, obj_Int q_y);",
            "extern class_Pt the_class_Pt;",
            "struct obj_Pt_struct {",
            "struct class_Pt_struct {",
            "obj_Pt new_Pt(obj_Int q_x, obj_Int q_y) {",
            "obj_Pt Pt_method_SUM(obj_Pt this, obj_Pt q_other) {",
            "struct class_Pt_struct the_class_Pt_struct = {",
            "class_Pt the_class_Pt = &the_class_Pt_struct;",
            "int main(int argc, char *argv[]) {",
        ];
        let mut from = 0;
        for line in order {
            let at = c[from..]
                .find(line)
                .unwrap_or_else(|| panic!("`{}` missing or out of order in:\n{}", line, c));
            from += at + line.len();
        }
    }

    #[test]
    fn test_method_table_struct_and_singleton() {
        let c = compile(CodegenOptions::default());
        assert!(c.contains(
            "struct class_Pt_struct {
  obj_Pt (*constructor) (obj_Int, obj_Int);
  obj_String (*STRING) (obj_Obj);
  obj_Obj (*PRINT) (obj_Obj);
  obj_Boolean (*EQUALS) (obj_Obj, obj_Obj);
  obj_Pt (*SUM) (obj_Pt, obj_Pt);
};"
        ));
        assert!(c.contains(
            "struct class_Pt_struct the_class_Pt_struct = {
  new_Pt,
  Obj_method_STRING,
  Obj_method_PRINT,
  Obj_method_EQUALS,
  Pt_method_SUM
};"
        ));
        assert!(c.contains(
            "struct obj_Pt_struct {
  class_Pt clazz;
  obj_Int q_x;
  obj_Int q_y;
};"
        ));
    }

    #[test]
    fn test_constructor_body() {
        let c = compile(CodegenOptions::default());
        assert!(c.contains(
            "obj_Pt new_Pt(obj_Int q_x, obj_Int q_y) {
  obj_Pt this;

  this = (obj_Pt) malloc(sizeof(struct obj_Pt_struct));
  this->clazz = the_class_Pt;
  this->q_x = q_x;
  this->q_y = q_y;
  return this;
}"
        ));
    }

    #[test]
    fn test_entry_point() {
        let c = compile(CodegenOptions::default());
        assert!(c.contains("= the_class_Pt->constructor((obj_Int) tmp_"));
        assert!(c.contains("q_p->clazz->PRINT((obj_Obj) q_p);"));
        assert!(c.trim_end().ends_with("return 0;\n}"));
    }

    #[test]
    fn test_quack_names_cannot_capture_runtime_names() {
        let locals = [("lit_true", "Boolean"), ("tmp_1", "String"), ("int", "Int")];
        let main = MainDescriptor {
            locals: locals
                .iter()
                .map(|(name, ty)| (name.to_string(), ty.to_string()))
                .collect(),
            body: build::block(vec![
                build::assign_local("lit_true", build::load("false").unwrap()).unwrap(),
                build::assign_local("tmp_1", Node::string("s")).unwrap(),
                build::assign_local("int", Node::int(1)).unwrap(),
                build::if_else(
                    build::call(
                        build::load("int").unwrap(),
                        "EQUALS",
                        vec![build::load("int").unwrap()],
                    )
                    .unwrap(),
                    vec![],
                    None,
                )
                .unwrap(),
            ])
            .unwrap(),
        };
        let program = CheckedProgram {
            source: None,
            classes: vec![],
            main,
        };
        let c = generate(&lower_program(&program).unwrap(), &CodegenOptions::default()).unwrap();

        assert!(c.contains("  obj_Boolean q_lit_true;\n  obj_String q_tmp_1;\n  obj_Int q_int;\n"));
        assert!(c.contains("  obj_String tmp_1;\n"));
        assert!(c.contains("  q_lit_true = lit_false;\n  tmp_1 = str_literal(\"s\");\n"));
        assert!(c.contains("  q_tmp_1 = tmp_1;\n"));
        assert!(c.contains("q_int->clazz->EQUALS(q_int, (obj_Obj) q_int);"));
        assert!(c.contains("== (obj_Obj) lit_true);"));
        assert!(!c.contains(" lit_true;"));
        assert!(!c.contains(" int;"));
    }

    #[test]
    fn test_options() {
        let c = compile(CodegenOptions {
            runtime_header: "src/Builtins.h".into(),
            banners: false,
        });
        assert!(c.contains("#include \"src/Builtins.h\""));
        assert!(!c.contains("-~-~-~-~-"));

        let c = compile(CodegenOptions::default());
        assert!(c.contains("// -~-~-~-~- Singletons -~-~-~-~-"));
    }
}
