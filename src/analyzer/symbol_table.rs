use std::collections::HashMap;
use std::fmt;

use tracing::trace;

use crate::error::{DeclarationError, Error, ResolutionError, Result, TypeError};
use crate::grammar::Symbol;
use crate::parser::Node;

use super::{literal_value, Type};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub ty: Type,
}

impl Variable {
    /// Reads a `dcl type ID` node.
    pub fn from_dcl(dcl: &Node) -> Result<Self> {
        let ty = Type::from_node(dcl.expect_child(Symbol::Type, 1)?)?;
        let name = dcl.expect_child(Symbol::Id, 1)?.lexeme()?.to_string();
        Ok(Self { name, ty })
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ty, self.name)
    }
}

/// One procedure's variables. Parameters and locals share the namespace.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SymbolTable {
    table: HashMap<String, Variable>,
    order: Vec<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, variable: Variable) -> Result<()> {
        if self.table.contains_key(&variable.name) {
            return Err(DeclarationError::DuplicateVariable(variable.name).into());
        }
        self.order.push(variable.name.clone());
        self.table.insert(variable.name.clone(), variable);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Variable> {
        self.table
            .get(name)
            .ok_or_else(|| ResolutionError::UndeclaredVariable(name.to_string()).into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Variables in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.order.iter().filter_map(|name| self.table.get(name))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Procedure {
    pub name: String,
    pub signature: Vec<Type>,
    pub symbols: SymbolTable,
    pub entry: bool,
}

impl Procedure {
    /// Builds the signature and symbol table of a `procedure` or `main` node.
    pub fn from_node(node: &Node) -> Result<Self> {
        let entry = node.label() == Symbol::Main;
        let locals = declarations(node.expect_child(Symbol::Dcls, 1)?)?;

        let params = if entry {
            let first = node.expect_child(Symbol::Dcl, 1)?;
            let second = node.expect_child(Symbol::Dcl, 2)?;
            let ty = Variable::from_dcl(second)?.ty;
            if ty != Type::Int {
                return Err(TypeError::EntryParameter(ty).into());
            }
            vec![first, second]
        } else {
            declarations(node.expect_child(Symbol::Params, 1)?)?
        };

        let mut symbols = SymbolTable::new();
        let mut signature = vec![];
        for param in params {
            let variable = Variable::from_dcl(param)?;
            signature.push(variable.ty);
            symbols.add(variable)?;
        }
        for local in locals {
            symbols.add(Variable::from_dcl(local)?)?;
        }

        Ok(Self {
            name: procedure_name(node)?.to_string(),
            signature,
            symbols,
            entry,
        })
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, ty) in self.signature.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", ty)?;
        }
        writeln!(f, ")")?;
        for variable in self.symbols.iter() {
            writeln!(f, "  {}", variable)?;
        }
        Ok(())
    }
}

/// Every procedure of the program, keyed by name, kept in source order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    procedures: HashMap<String, Procedure>,
    order: Vec<String>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, procedure: Procedure) -> Result<()> {
        if self.procedures.contains_key(&procedure.name) {
            return Err(DeclarationError::DuplicateProcedure(procedure.name).into());
        }
        self.order.push(procedure.name.clone());
        self.procedures.insert(procedure.name.clone(), procedure);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Procedure> {
        self.procedures
            .get(name)
            .ok_or_else(|| ResolutionError::UndeclaredProcedure(name.to_string()).into())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Procedure> {
        self.order.iter().filter_map(|name| self.procedures.get(name))
    }

    pub fn entry(&self) -> Option<&Procedure> {
        self.iter().find(|procedure| procedure.entry)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for procedure in self.iter() {
            write!(f, "{}", procedure)?;
        }
        Ok(())
    }
}

/// Source name of a `procedure` (its ID) or `main` (`wain`) node.
pub fn procedure_name(node: &Node) -> Result<&str> {
    node.children()
        .get(1)
        .ok_or(Error::Malformed(node.label()))?
        .lexeme()
}

/// Harvests `dcl` nodes below `node`. Along a `dcls` spine the newest
/// declaration comes first, and each one's initializer must agree with its
/// declared type.
pub fn declarations(node: &Node) -> Result<Vec<&Node>> {
    let mut found = vec![];

    match node.label() {
        Symbol::Dcls => {
            let mut dcls = node;
            while !dcls.rhs().is_empty() {
                let dcl = dcls.expect_child(Symbol::Dcl, 1)?;
                check_initializer(dcls, dcl)?;
                found.push(dcl);
                dcls = dcls.expect_child(Symbol::Dcls, 1)?;
            }
        }
        Symbol::Dcl => found.push(node),
        _ => {
            for child in node.children() {
                found.extend(declarations(child)?);
            }
        }
    }

    Ok(found)
}

fn check_initializer(dcls: &Node, dcl: &Node) -> Result<()> {
    let variable = Variable::from_dcl(dcl)?;
    let initializer = dcls
        .rhs()
        .get(3)
        .copied()
        .ok_or(Error::Malformed(Symbol::Dcls))?;
    trace!(variable = %variable, %initializer, "declaration");

    match (variable.ty, initializer) {
        (Type::Int, Symbol::Num) => {
            literal_value(dcls.expect_child(Symbol::Num, 1)?.lexeme()?)?;
            Ok(())
        }
        (Type::IntPtr, Symbol::Null) => Ok(()),
        (ty, _) => Err(DeclarationError::Initializer {
            name: variable.name,
            ty,
        }
        .into()),
    }
}
