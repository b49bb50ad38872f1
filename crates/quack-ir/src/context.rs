//! Counter state owned by one generation pass.

use crate::{Label, LabelKind, TempId};

/// Mints temporaries and labels from a single increasing counter.
#[derive(Debug)]
pub struct GeneratorContext {
    next: usize,
}

impl GeneratorContext {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    fn bump(&mut self) -> usize {
        let id = self.next;
        self.next += 1;
        id
    }

    pub fn fresh_temp(&mut self) -> TempId {
        TempId(self.bump())
    }

    pub fn fresh_label(&mut self, kind: LabelKind) -> Label {
        Label {
            kind,
            id: self.bump(),
        }
    }

    /// How many ids have been handed out.
    pub fn issued(&self) -> usize {
        self.next - 1
    }
}

impl Default for GeneratorContext {
    fn default() -> Self {
        Self::new()
    }
}
