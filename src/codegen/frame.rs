use std::collections::HashMap;

use tracing::trace;

use crate::analyzer::{literal_value, Variable};
use crate::error::{ResolutionError, Result};
use crate::grammar::Symbol;
use crate::parser::Node;

use super::NULL_VALUE;

/// Frame-pointer-relative offsets of one procedure's variables.
///
/// Parameters sit above the frame pointer, first parameter highest. Locals
/// are pushed after the frame pointer is set, so the first declared local is
/// at offset 0 and each later one a cell lower.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    offsets: HashMap<String, i32>,
    initializers: Vec<i32>,
    slots: usize,
}

impl Frame {
    pub fn new(procedure: &Node, cell_size: i32) -> Result<Self> {
        let entry = procedure.label() == Symbol::Main;

        let params = if entry {
            vec![
                procedure.expect_child(Symbol::Dcl, 1)?,
                procedure.expect_child(Symbol::Dcl, 2)?,
            ]
        } else {
            procedure
                .expect_child(Symbol::Params, 1)?
                .child(Symbol::Paramlist, 1)
                .map(|list| list.list_items(Symbol::Dcl))
                .unwrap_or_default()
        };

        let mut offsets = HashMap::new();
        let mut offset = cell_size * params.len() as i32;
        for param in params.iter() {
            offsets.insert(Variable::from_dcl(param)?.name, offset);
            offset -= cell_size;
        }

        let mut locals = vec![];
        let mut dcls = procedure.child(Symbol::Dcls, 1);
        while let Some(node) = dcls {
            if let Some(dcl) = node.child(Symbol::Dcl, 1) {
                let value = match node.child(Symbol::Num, 1) {
                    Some(num) => literal_value(num.lexeme()?)?,
                    None => NULL_VALUE,
                };
                locals.push((dcl, value));
            }
            dcls = node.child(Symbol::Dcls, 1);
        }
        locals.reverse();

        let mut initializers = vec![];
        for (dcl, value) in locals {
            offsets.insert(Variable::from_dcl(dcl)?.name, offset);
            offset -= cell_size;
            initializers.push(value);
        }

        let slots = initializers.len() + if entry { params.len() } else { 0 };
        trace!(?offsets, slots, "frame layout");

        Ok(Self {
            offsets,
            initializers,
            slots,
        })
    }

    pub fn offset(&self, name: &str) -> Result<i32> {
        self.offsets
            .get(name)
            .copied()
            .ok_or_else(|| ResolutionError::UndeclaredVariable(name.to_string()).into())
    }

    /// Initial values of the locals, in declaration order.
    pub fn initializers(&self) -> &[i32] {
        &self.initializers
    }

    /// Cells this procedure pushes itself and must pop before returning.
    pub fn slots(&self) -> usize {
        self.slots
    }
}
