//! Intermediate Representation (IR) for the Quack back end
//!
//! Sits between the checked tagged tree and the C emitter. Every class gets a
//! [`ClassLayout`] (object fields plus method-table slots) and every method
//! body becomes a [`MethodBody`]: an ordered list of basic blocks whose
//! instructions name boxed values through [`Handle`]s and whose terminators
//! are explicit jumps, conditional jumps, fallthrough or return.

pub mod builtins;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod function;
pub mod instruction;
pub mod layout;
pub mod lower;
pub mod module;
pub mod value;

// ============================================================================
// ID Types (using newtype pattern for type safety)
// ============================================================================

/// Identifier of a compiler-introduced temporary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TempId(pub usize);

/// Role of a jump target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKind {
    Then,
    Else,
    EndIf,
    Loop,
    Body,
    EndLoop,
}

/// A jump target. The id alone is unique within a generation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label {
    pub kind: LabelKind,
    pub id: usize,
}

// ============================================================================
// Display Implementations for ID types
// ============================================================================

impl std::fmt::Display for TempId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tmp_{}", self.0)
    }
}

impl std::fmt::Display for LabelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LabelKind::Then => "then",
            LabelKind::Else => "else",
            LabelKind::EndIf => "endif",
            LabelKind::Loop => "loop",
            LabelKind::Body => "body",
            LabelKind::EndLoop => "endloop",
        };
        write!(f, "{}", s)
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.kind, self.id)
    }
}

// ============================================================================
// Re-exports (public API)
// ============================================================================

pub use context::GeneratorContext;
pub use descriptor::*;
pub use error::{GenError, Phase};
pub use function::*;
pub use instruction::*;
pub use layout::{ClassLayout, Layouts, Slot};
pub use lower::lower_program;
pub use module::*;
pub use value::*;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(TempId(3).to_string(), "tmp_3");
        let label = Label {
            kind: LabelKind::EndIf,
            id: 9,
        };
        assert_eq!(label.to_string(), "endif_9");
    }

    #[test]
    fn test_block_jump_targets() {
        let then_label = Label {
            kind: LabelKind::Then,
            id: 1,
        };
        let else_label = Label {
            kind: LabelKind::Else,
            id: 2,
        };
        let mut block = Block::new(None);
        assert!(!block.is_terminated());
        assert!(block.jump_targets().is_empty());

        block.set_terminator(Terminator::Jump(then_label));
        assert_eq!(block.jump_targets(), vec![then_label]);

        block.set_terminator(Terminator::Branch {
            cond: TempId(0),
            then_label,
            else_label,
        });
        assert_eq!(block.jump_targets(), vec![then_label, else_label]);

        block.set_terminator(Terminator::Return(None));
        assert!(block.is_terminated());
        assert!(block.jump_targets().is_empty());
    }

    #[test]
    fn test_temp_registration() {
        let mut body = MethodBody::new(BodyKind::Entry, None, "main", vec![], None);
        body.add_temp(TempId(4), "Int");
        body.add_flag(TempId(5));
        assert_eq!(body.temp_type(TempId(4)), Some("Int"));
        assert_eq!(body.temp_type(TempId(5)), None);
        assert!(body.flags.contains(&TempId(5)));
    }
}
