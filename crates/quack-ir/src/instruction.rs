//! Instructions, terminators and basic blocks.

use crate::value::{Handle, Place, RValue};
use crate::{Label, TempId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// dest = value
    Assign { dest: Place, value: RValue },

    /// dest = receiver->clazz->method(this_arg, args..)
    Dispatch {
        dest: Option<TempId>,
        receiver: Handle,
        method: String,
        /// Method-table index, constructor at 0
        slot: usize,
        this_arg: RValue,
        args: Vec<RValue>,
    },

    /// dest = the_class_C->constructor(args..)
    Construct {
        dest: TempId,
        class: String,
        args: Vec<RValue>,
    },

    /// Allocates the object a constructor initializes and binds it to `this`.
    Allocate { class: String },

    /// dest = (value == lit_true)
    TestTrue { dest: TempId, value: Handle },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Terminator {
    /// Control continues with the next block in layout order
    #[default]
    Fallthrough,
    Jump(Label),
    /// if (cond) goto then_label; goto else_label;
    Branch {
        cond: TempId,
        then_label: Label,
        else_label: Label,
    },
    Return(Option<RValue>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub label: Option<Label>,
    pub instructions: Vec<Instruction>,
    pub terminator: Terminator,
}

impl Block {
    pub fn new(label: Option<Label>) -> Self {
        Self {
            label,
            instructions: Vec::new(),
            terminator: Terminator::Fallthrough,
        }
    }

    pub fn push_instruction(&mut self, inst: Instruction) {
        self.instructions.push(inst);
    }

    pub fn set_terminator(&mut self, term: Terminator) {
        self.terminator = term;
    }

    /// Returns true once the block ends in anything other than fallthrough.
    pub fn is_terminated(&self) -> bool {
        !matches!(self.terminator, Terminator::Fallthrough)
    }

    /// Labels this block jumps to explicitly.
    pub fn jump_targets(&self) -> Vec<Label> {
        match &self.terminator {
            Terminator::Jump(target) => vec![*target],
            Terminator::Branch {
                then_label,
                else_label,
                ..
            } => vec![*then_label, *else_label],
            Terminator::Fallthrough | Terminator::Return(_) => vec![],
        }
    }
}
