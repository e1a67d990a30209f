mod codegen;
mod frame;
mod instruction;
mod label;

pub use codegen::*;
pub use frame::*;
pub use instruction::*;
pub use label::*;

use crate::error::{Error, Result};

pub const PRINT: &str = "print";
pub const INIT: &str = "init";
pub const NEW: &str = "new";
pub const DELETE: &str = "delete";

/// Routines supplied by the runtime and imported by every program.
pub const EXTERNAL_ROUTINES: [&str; 4] = [PRINT, INIT, NEW, DELETE];

/// Label of the entry procedure.
pub const ENTRY_LABEL: &str = "main";

/// Runtime value of `NULL`. Odd, so dereferencing it faults on an aligned machine.
pub const NULL_VALUE: i32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Options {
    /// Bytes per machine word; scales pointer arithmetic and frame offsets.
    pub cell_size: i32,
}

impl Options {
    /// Offsets and pointer scaling need a cell of at least one byte.
    pub fn validate(&self) -> Result<()> {
        if self.cell_size < 1 {
            return Err(Error::CellSize(self.cell_size));
        }
        Ok(())
    }
}

impl Default for Options {
    fn default() -> Self {
        Self { cell_size: 4 }
    }
}
