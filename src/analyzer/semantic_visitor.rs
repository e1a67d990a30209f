use tracing::debug;

use crate::error::{ResolutionError, Result, TypeError};
use crate::grammar::{Rule, Symbol};
use crate::parser::{Node, NodeKind};

use super::{literal_value, procedure_name, Procedure, Program, SymbolTable, Type};

/// Registers every procedure, then annotates and checks each body.
#[derive(Debug, Default)]
pub struct SemanticVisitor {
    program: Program,
}

impl SemanticVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visit_program(mut self, root: &mut Node) -> Result<Program> {
        let mut procedures = root.procedures_mut();

        for node in procedures.iter() {
            let procedure = Procedure::from_node(node)?;
            debug!(
                name = %procedure.name,
                params = procedure.signature.len(),
                variables = procedure.symbols.len(),
                "registered procedure"
            );
            self.program.add(procedure)?;
        }

        for node in procedures.iter_mut() {
            self.visit_procedure(node)?;
        }

        Ok(self.program)
    }

    fn visit_procedure(&self, node: &mut Node) -> Result<()> {
        let name = procedure_name(node)?.to_string();
        let procedure = self.program.get(&name)?;

        let annotator = Annotator {
            symbols: &procedure.symbols,
            program: &self.program,
        };
        annotator.annotate(node)?;
        check_statements(node)?;

        let found = node.expect_child(Symbol::Expr, 1)?.expect_type()?;
        if found != Type::Int {
            return Err(TypeError::Return {
                procedure: name,
                found,
            }
            .into());
        }
        Ok(())
    }
}

/// Bottom-up type annotation of one procedure body.
struct Annotator<'a> {
    symbols: &'a SymbolTable,
    program: &'a Program,
}

impl Annotator<'_> {
    fn annotate(&self, node: &mut Node) -> Result<()> {
        match node.label() {
            // No expressions below a declaration list.
            Symbol::Dcls => return Ok(()),
            Symbol::Statements => {
                let mut statements = node.list_items_mut(Symbol::Statement);
                statements.reverse();
                for statement in statements {
                    self.annotate(statement)?;
                }
                return Ok(());
            }
            _ => (),
        }

        for child in node.children_mut() {
            self.annotate(child)?;
        }

        let ty = match &node.kind {
            NodeKind::Interior { rule, children } => self.type_of(rule, children)?,
            NodeKind::Leaf(_) => None,
        };
        node.ty = ty;
        Ok(())
    }

    fn type_of(&self, rule: &Rule, children: &[Node]) -> Result<Option<Type>> {
        use Symbol::{
            Amp, Arglist, Expr, Factor, Id, Int, Lbrack, Lparen, Lvalue, New, Null, Num, Rbrack,
            Rparen, Star, Term,
        };

        let child = |i: usize| children[i].expect_type();

        let ty = match (rule.lhs, rule.rhs.as_slice()) {
            (Expr, [Term]) | (Term, [Factor]) => child(0)?,
            (Expr, [Expr, op, Term]) => additive(*op, child(0)?, child(2)?)?,
            (Term, [Term, op, Factor]) => match (child(0)?, child(2)?) {
                (Type::Int, Type::Int) => Type::Int,
                (left, right) => {
                    return Err(TypeError::Multiplicative {
                        op: *op,
                        left,
                        right,
                    }
                    .into())
                }
            },
            (Factor | Lvalue, [Id]) => self.symbols.get(children[0].lexeme()?)?.ty,
            (Factor, [Num]) => {
                literal_value(children[0].lexeme()?)?;
                Type::Int
            }
            (Factor, [Null]) => Type::IntPtr,
            (Factor, [Amp, Lvalue]) => match child(1)? {
                Type::Int => Type::IntPtr,
                found => return Err(TypeError::AddressOf(found).into()),
            },
            (Factor | Lvalue, [Star, Factor]) => match child(1)? {
                Type::IntPtr => Type::Int,
                found => return Err(TypeError::Dereference(found).into()),
            },
            (Factor, [Lparen, Expr, Rparen]) | (Lvalue, [Lparen, Lvalue, Rparen]) => child(1)?,
            (Factor, [Id, Lparen, Rparen]) => self.call(children[0].lexeme()?, &[])?,
            (Factor, [Id, Lparen, Arglist, Rparen]) => {
                let args = children[2]
                    .list_items(Expr)
                    .into_iter()
                    .map(Node::expect_type)
                    .collect::<Result<Vec<_>>>()?;
                self.call(children[0].lexeme()?, &args)?
            }
            (Factor, [New, Int, Lbrack, Expr, Rbrack]) => match child(3)? {
                Type::Int => Type::IntPtr,
                found => return Err(TypeError::Allocation(found).into()),
            },
            _ => return Ok(None),
        };

        Ok(Some(ty))
    }

    fn call(&self, callee: &str, args: &[Type]) -> Result<Type> {
        if self.symbols.contains(callee) {
            return Err(ResolutionError::CallOnVariable(callee.to_string()).into());
        }

        let procedure = self.program.get(callee)?;
        if procedure.signature.len() != args.len() {
            return Err(TypeError::ArgumentCount {
                callee: callee.to_string(),
                expected: procedure.signature.len(),
                found: args.len(),
            }
            .into());
        }

        for (i, (&expected, &found)) in procedure.signature.iter().zip(args).enumerate() {
            if expected != found {
                return Err(TypeError::ArgumentType {
                    callee: callee.to_string(),
                    position: i + 1,
                    expected,
                    found,
                }
                .into());
            }
        }

        Ok(Type::Int)
    }
}

fn additive(op: Symbol, left: Type, right: Type) -> Result<Type> {
    use Type::*;

    match (op, left, right) {
        (Symbol::Plus | Symbol::Minus, Int, Int) => Ok(Int),
        (Symbol::Plus | Symbol::Minus, IntPtr, Int) => Ok(IntPtr),
        (Symbol::Plus, Int, IntPtr) => Ok(IntPtr),
        (Symbol::Minus, IntPtr, IntPtr) => Ok(Int),
        _ => Err(TypeError::Additive { op, left, right }.into()),
    }
}

/// Statement- and test-level agreement over an annotated tree.
fn check_statements(node: &Node) -> Result<()> {
    use Symbol::{
        Becomes, Delete, Expr, Lbrack, Lparen, Lvalue, Println, Rbrack, Rparen, Semi, Statement,
        Test,
    };

    let children = node.children();
    let ty = |i: usize| children[i].expect_type();

    match (node.label(), node.rhs()) {
        (Symbol::Dcls, _) => return Ok(()),
        (Symbol::Statements, _) => {
            for statement in node.list_items(Statement).into_iter().rev() {
                check_statements(statement)?;
            }
            return Ok(());
        }
        (Statement, [Lvalue, Becomes, Expr, Semi]) => {
            let (left, right) = (ty(0)?, ty(2)?);
            if left != right {
                return Err(TypeError::Assignment { left, right }.into());
            }
        }
        (Statement, [Println, Lparen, Expr, Rparen, Semi]) => {
            let found = ty(2)?;
            if found != Type::Int {
                return Err(TypeError::Println(found).into());
            }
        }
        (Statement, [Delete, Lbrack, Rbrack, Expr, Semi]) => {
            let found = ty(3)?;
            if found != Type::IntPtr {
                return Err(TypeError::Delete(found).into());
            }
        }
        (Test, [Expr, op, Expr]) => {
            let (left, right) = (ty(0)?, ty(2)?);
            if left != right {
                return Err(TypeError::Test {
                    op: *op,
                    left,
                    right,
                }
                .into());
            }
        }
        _ => (),
    }

    for child in children {
        check_statements(child)?;
    }
    Ok(())
}
