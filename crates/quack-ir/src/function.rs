//! Lowered method bodies.

use crate::descriptor::Formal;
use crate::instruction::Block;
use crate::{Label, TempId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Constructor,
    Method,
    /// The synthesized top-level routine
    Entry,
}

/// One constructor, method or entry point as an ordered block list.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodBody {
    pub kind: BodyKind,
    /// Owning class, `None` for the entry point
    pub class: Option<String>,
    pub name: String,
    pub params: Vec<Formal>,
    /// `None` for constructors (they return the class) and the entry point
    pub return_type: Option<String>,
    pub locals: Vec<Formal>,
    /// Object temporaries with their static class
    pub temps: Vec<(TempId, String)>,
    /// Temporaries holding a C truth value
    pub flags: Vec<TempId>,
    /// Blocks in layout order
    pub blocks: Vec<Block>,
}

impl MethodBody {
    pub fn new(
        kind: BodyKind,
        class: Option<String>,
        name: impl Into<String>,
        params: Vec<Formal>,
        return_type: Option<String>,
    ) -> Self {
        Self {
            kind,
            class,
            name: name.into(),
            params,
            return_type,
            locals: Vec::new(),
            temps: Vec::new(),
            flags: Vec::new(),
            blocks: Vec::new(),
        }
    }

    pub fn add_local(&mut self, name: impl Into<String>, ty: impl Into<String>) {
        self.locals.push(Formal::new(name, ty));
    }

    pub fn add_temp(&mut self, id: TempId, ty: impl Into<String>) {
        self.temps.push((id, ty.into()));
    }

    pub fn add_flag(&mut self, id: TempId) {
        self.flags.push(id);
    }

    pub fn temp_type(&self, id: TempId) -> Option<&str> {
        self.temps
            .iter()
            .find(|(temp, _)| *temp == id)
            .map(|(_, ty)| ty.as_str())
    }

    /// Appends a block and returns its index.
    pub fn new_block(&mut self, label: Option<Label>) -> usize {
        self.blocks.push(Block::new(label));
        self.blocks.len() - 1
    }

    pub fn block_mut(&mut self, index: usize) -> &mut Block {
        &mut self.blocks[index]
    }

    /// Every label defined by a block of this body, in layout order.
    pub fn labels(&self) -> Vec<Label> {
        self.blocks.iter().filter_map(|block| block.label).collect()
    }
}
