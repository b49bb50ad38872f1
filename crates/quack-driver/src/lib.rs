//! Quack Compiler Driver Library
//!
//! Pipeline steps shared by the `qkc` binary and its tests: load a checked
//! program (JSON interchange form), lower it, emit C, and write the result.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use quack_ast::{dump, Span, TreeError};
use quack_codegen::{CodegenError, CodegenOptions};
use quack_ir::{CheckedProgram, GenError, IrProgram};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("cannot read `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write `{}`: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid checked program: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Gen(#[from] GenError),

    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

impl DriverError {
    /// Diagnostic code shown in reports.
    pub fn code(&self) -> &'static str {
        match self {
            DriverError::Read { .. } | DriverError::Write { .. } => "E0001",
            DriverError::Decode(_) | DriverError::Tree(_) => "E0002",
            DriverError::Gen(GenError::Structural { .. }) => "E0101",
            DriverError::Gen(GenError::UnresolvedSymbol { .. }) => "E0102",
            DriverError::Gen(GenError::UnsupportedConstruct { .. }) => "E0103",
            DriverError::Gen(GenError::Synthesis { .. }) => "E0104",
            DriverError::Codegen(_) => "E0201",
        }
    }

    /// Source span of the offending node, when the input carried one.
    pub fn span(&self) -> Option<Span> {
        match self {
            DriverError::Gen(err) => err.span(),
            _ => None,
        }
    }
}

pub fn parse_program(json: &str) -> Result<CheckedProgram, DriverError> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_program(path: &Path) -> Result<CheckedProgram, DriverError> {
    let json = fs::read_to_string(path).map_err(|source| DriverError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_program(&json)
}

/// Structural dump of the whole program tree.
pub fn dump_tree(program: &CheckedProgram) -> Result<String, DriverError> {
    let tree = program.to_tree()?;
    Ok(dump::to_pretty_string(&tree))
}

pub fn lower(program: &CheckedProgram) -> Result<IrProgram, DriverError> {
    Ok(quack_ir::lower_program(program)?)
}

pub fn emit(program: &IrProgram, options: &CodegenOptions) -> Result<String, DriverError> {
    Ok(quack_codegen::generate(program, options)?)
}

/// Lower and emit in one step.
pub fn compile(program: &CheckedProgram, options: &CodegenOptions) -> Result<String, DriverError> {
    emit(&lower(program)?, options)
}

/// Writes `text` to `path` through a temporary file in the same directory,
/// so the destination only ever holds a complete unit.
pub fn write_output(path: &Path, text: &str) -> Result<(), DriverError> {
    let write_err = |source| DriverError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    file.write_all(text.as_bytes()).map_err(write_err)?;
    file.persist(path).map_err(|err| write_err(err.error))?;
    Ok(())
}
