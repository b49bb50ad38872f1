//! A whole lowered program.

use crate::function::MethodBody;
use crate::layout::ClassLayout;

/// A declared class: its layout and the bodies filling its table.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassUnit {
    pub layout: ClassLayout,
    pub constructor: MethodBody,
    /// Methods the class itself implements, in declaration order
    pub methods: Vec<MethodBody>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrProgram {
    /// Parents before children
    pub classes: Vec<ClassUnit>,
    pub entry: MethodBody,
}

impl IrProgram {
    pub fn class(&self, name: &str) -> Option<&ClassUnit> {
        self.classes.iter().find(|unit| unit.layout.name == name)
    }
}

impl ClassUnit {
    pub fn method(&self, name: &str) -> Option<&MethodBody> {
        self.methods.iter().find(|body| body.name == name)
    }
}
