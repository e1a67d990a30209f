use std::collections::HashMap;

use tracing::debug;

use crate::analyzer::{literal_value, procedure_name, Program, Type};
use crate::error::{Error, ResolutionError, Result, TypeError};
use crate::grammar::Symbol;
use crate::parser::Node;

use super::{
    instruction::{
        Assembly, Instruction, Reg, ARG1, ARG2, CELL, FRAME, LINK, RESULT, SCRATCH, STACK, ZERO,
    },
    Frame, Labels, Options, DELETE, ENTRY_LABEL, EXTERNAL_ROUTINES, INIT, NEW, NULL_VALUE, PRINT,
};

use Instruction::*;

pub struct Codegen<'a> {
    program: &'a Program,
    options: Options,
    labels: Labels,
    procedure_labels: HashMap<String, String>,
    frame: Frame,
    code: Vec<Instruction>,
}

fn strip_parens(mut lvalue: &Node) -> Result<&Node> {
    while let [Symbol::Lparen, Symbol::Lvalue, Symbol::Rparen] = lvalue.rhs() {
        lvalue = lvalue.expect_child(Symbol::Lvalue, 1)?;
    }
    Ok(lvalue)
}

impl<'a> Codegen<'a> {
    pub fn new(program: &'a Program, options: Options, labels: Labels) -> Self {
        Self {
            program,
            options,
            labels,
            procedure_labels: HashMap::new(),
            frame: Frame::default(),
            code: vec![],
        }
    }

    pub fn generate(mut self, root: &Node) -> Result<Assembly> {
        self.options.validate()?;

        for routine in EXTERNAL_ROUTINES {
            self.emit(Import(routine.to_string()));
        }
        self.load_immediate(CELL, self.options.cell_size);
        self.emit(Beq(ZERO, ZERO, ENTRY_LABEL.to_string()));

        self.assign_procedure_labels();
        for procedure in root.procedures() {
            self.gen_procedure(procedure)?;
        }

        debug!(instructions = self.code.len(), "code generation finished");
        Ok(Assembly(self.code))
    }

    /// Procedures keep their source name as label unless it is taken.
    fn assign_procedure_labels(&mut self) {
        let program = self.program;
        for procedure in program.iter() {
            let label = if procedure.entry {
                ENTRY_LABEL.to_string()
            } else if self.labels.claim(&procedure.name) {
                procedure.name.clone()
            } else {
                self.labels.fresh()
            };
            debug!(procedure = %procedure.name, %label, "procedure label");
            self.procedure_labels.insert(procedure.name.clone(), label);
        }
    }

    fn procedure_label(&self, name: &str) -> Result<String> {
        self.procedure_labels
            .get(name)
            .cloned()
            .ok_or_else(|| ResolutionError::UndeclaredProcedure(name.to_string()).into())
    }

    fn emit(&mut self, instruction: Instruction) {
        self.code.push(instruction);
    }

    fn load_immediate(&mut self, reg: Reg, value: i32) {
        self.emit(Lis(reg));
        self.emit(Word(value));
    }

    fn push(&mut self, reg: Reg) {
        self.emit(Sw(reg, -self.options.cell_size, STACK));
        self.emit(Sub(STACK, STACK, CELL));
    }

    fn pop(&mut self, reg: Reg) {
        self.emit(Add(STACK, STACK, CELL));
        self.emit(Lw(reg, -self.options.cell_size, STACK));
    }

    fn discard(&mut self) {
        self.emit(Add(STACK, STACK, CELL));
    }

    /// Calls one of the imported routines; arguments are already in place.
    fn call_routine(&mut self, routine: &str) {
        self.push(LINK);
        self.emit(Lis(LINK));
        self.emit(WordLabel(routine.to_string()));
        self.emit(Jalr(LINK));
        self.pop(LINK);
    }

    fn gen_procedure(&mut self, node: &Node) -> Result<()> {
        let name = procedure_name(node)?;
        let label = self.procedure_label(name)?;
        self.frame = Frame::new(node, self.options.cell_size)?;
        debug!(procedure = name, %label, slots = self.frame.slots(), "emitting procedure");

        self.emit(Label(label));
        if node.label() == Symbol::Main {
            let first = self.program.get(name)?.signature.first().copied();
            self.gen_init(first.unwrap_or(Type::Int));
            self.push(ARG1);
            self.push(ARG2);
        }
        self.emit(Sub(FRAME, STACK, CELL));

        let initializers = self.frame.initializers().to_vec();
        for value in initializers {
            self.load_immediate(RESULT, value);
            self.push(RESULT);
        }

        self.gen_statements(node.expect_child(Symbol::Statements, 1)?)?;
        self.gen_expr(node.expect_child(Symbol::Expr, 1)?)?;

        for _ in 0..self.frame.slots() {
            self.discard();
        }
        self.emit(Jr(LINK));
        Ok(())
    }

    /// An `int*` first parameter means `$2` already holds the array length.
    fn gen_init(&mut self, first: Type) {
        match first {
            Type::IntPtr => self.call_routine(INIT),
            Type::Int => {
                self.push(ARG2);
                self.load_immediate(ARG2, 0);
                self.call_routine(INIT);
                self.pop(ARG2);
            }
        }
    }

    fn gen_statements(&mut self, statements: &Node) -> Result<()> {
        for statement in statements.list_items(Symbol::Statement).into_iter().rev() {
            self.gen_statement(statement)?;
        }
        Ok(())
    }

    fn gen_statement(&mut self, statement: &Node) -> Result<()> {
        use Symbol::{Becomes, Delete, Expr, If, Lvalue, Println, Semi, While};

        match statement.rhs() {
            [Lvalue, Becomes, Expr, Semi] => self.gen_assignment(
                statement.expect_child(Lvalue, 1)?,
                statement.expect_child(Expr, 1)?,
            ),
            [If, ..] => self.gen_if(statement),
            [While, ..] => self.gen_while(statement),
            [Println, ..] => {
                self.gen_expr(statement.expect_child(Expr, 1)?)?;
                self.push(ARG1);
                self.emit(Add(ARG1, RESULT, ZERO));
                self.call_routine(PRINT);
                self.pop(ARG1);
                Ok(())
            }
            [Delete, ..] => self.gen_delete(statement.expect_child(Expr, 1)?),
            _ => Err(Error::Malformed(Symbol::Statement)),
        }
    }

    fn gen_assignment(&mut self, lvalue: &Node, expr: &Node) -> Result<()> {
        let target = strip_parens(lvalue)?;

        match target.rhs() {
            [Symbol::Id] => {
                let offset = self.frame.offset(target.expect_child(Symbol::Id, 1)?.lexeme()?)?;
                self.gen_expr(expr)?;
                self.emit(Sw(RESULT, offset, FRAME));
            }
            [Symbol::Star, Symbol::Factor] => {
                self.push(SCRATCH);
                self.gen_expr(target.expect_child(Symbol::Factor, 1)?)?;
                self.push(RESULT);
                self.gen_expr(expr)?;
                self.pop(SCRATCH);
                self.emit(Sw(RESULT, 0, SCRATCH));
                self.pop(SCRATCH);
            }
            _ => return Err(Error::Malformed(Symbol::Lvalue)),
        }
        Ok(())
    }

    fn gen_if(&mut self, statement: &Node) -> Result<()> {
        let else_label = self.labels.fresh();
        let end_label = self.labels.fresh();

        self.gen_test(statement.expect_child(Symbol::Test, 1)?)?;
        self.emit(Beq(RESULT, ZERO, else_label.clone()));
        self.gen_statements(statement.expect_child(Symbol::Statements, 1)?)?;
        self.emit(Beq(ZERO, ZERO, end_label.clone()));
        self.emit(Label(else_label));
        self.gen_statements(statement.expect_child(Symbol::Statements, 2)?)?;
        self.emit(Label(end_label));
        Ok(())
    }

    fn gen_while(&mut self, statement: &Node) -> Result<()> {
        let begin_label = self.labels.fresh();
        let end_label = self.labels.fresh();

        self.emit(Label(begin_label.clone()));
        self.gen_test(statement.expect_child(Symbol::Test, 1)?)?;
        self.emit(Beq(RESULT, ZERO, end_label.clone()));
        self.gen_statements(statement.expect_child(Symbol::Statements, 1)?)?;
        self.emit(Beq(ZERO, ZERO, begin_label));
        self.emit(Label(end_label));
        Ok(())
    }

    /// Deleting the null pointer is a no-op.
    fn gen_delete(&mut self, expr: &Node) -> Result<()> {
        self.gen_expr(expr)?;
        let skip_label = self.labels.fresh();
        self.push(ARG1);
        self.load_immediate(ARG1, NULL_VALUE);
        self.emit(Beq(RESULT, ARG1, skip_label.clone()));
        self.emit(Add(ARG1, RESULT, ZERO));
        self.call_routine(DELETE);
        self.emit(Label(skip_label));
        self.pop(ARG1);
        Ok(())
    }

    /// Leaves the left operand in `$5` and the right one in `$3`. The caller
    /// restores `$5` once it has combined them.
    fn gen_operands(&mut self, left: &Node, right: &Node) -> Result<()> {
        self.push(SCRATCH);
        self.gen_expr(left)?;
        self.push(RESULT);
        self.gen_expr(right)?;
        self.pop(SCRATCH);
        Ok(())
    }

    fn gen_test(&mut self, test: &Node) -> Result<()> {
        let left = test.expect_child(Symbol::Expr, 1)?;
        let right = test.expect_child(Symbol::Expr, 2)?;
        let op = *test.rhs().get(1).ok_or(Error::Malformed(Symbol::Test))?;
        let signed = !left.expect_type()?.is_pointer();

        self.gen_operands(left, right)?;
        match op {
            Symbol::Eq | Symbol::Ne => {
                let true_label = self.labels.fresh();
                let false_label = self.labels.fresh();
                if op == Symbol::Eq {
                    self.emit(Bne(RESULT, SCRATCH, false_label.clone()));
                } else {
                    self.emit(Beq(RESULT, SCRATCH, false_label.clone()));
                }
                self.load_immediate(RESULT, 1);
                self.emit(Beq(ZERO, ZERO, true_label.clone()));
                self.emit(Label(false_label));
                self.emit(Add(RESULT, ZERO, ZERO));
                self.emit(Label(true_label));
            }
            Symbol::Lt => self.set_less(signed, SCRATCH, RESULT),
            Symbol::Gt => self.set_less(signed, RESULT, SCRATCH),
            Symbol::Le => {
                self.set_less(signed, RESULT, SCRATCH);
                self.negate();
            }
            Symbol::Ge => {
                self.set_less(signed, SCRATCH, RESULT);
                self.negate();
            }
            _ => return Err(Error::Malformed(Symbol::Test)),
        }
        self.pop(SCRATCH);
        Ok(())
    }

    /// `$3 = s < t`, unsigned for pointers.
    fn set_less(&mut self, signed: bool, s: Reg, t: Reg) {
        if signed {
            self.emit(Slt(RESULT, s, t));
        } else {
            self.emit(Sltu(RESULT, s, t));
        }
    }

    /// `$3 = !$3` for a 0/1 value; clobbers `$5`.
    fn negate(&mut self) {
        self.load_immediate(SCRATCH, 1);
        self.emit(Slt(RESULT, RESULT, SCRATCH));
    }

    fn gen_expr(&mut self, node: &Node) -> Result<()> {
        use Symbol::{
            Amp, Arglist, Expr, Factor, Id, Int, Lbrack, Lparen, Lvalue, New, Null, Num, Rbrack,
            Rparen, Star, Term,
        };

        let children = node.children();
        match (node.label(), node.rhs()) {
            (Expr, [Term]) | (Term, [Factor]) => self.gen_expr(&children[0])?,
            (Expr, [Expr, op, Term]) => self.gen_additive(*op, &children[0], &children[2])?,
            (Term, [Term, op, Factor]) => {
                self.gen_operands(&children[0], &children[2])?;
                match op {
                    Symbol::Star => {
                        self.emit(Mult(SCRATCH, RESULT));
                        self.emit(Mflo(RESULT));
                    }
                    Symbol::Slash => {
                        self.emit(Div(SCRATCH, RESULT));
                        self.emit(Mflo(RESULT));
                    }
                    Symbol::Pct => {
                        self.emit(Div(SCRATCH, RESULT));
                        self.emit(Mfhi(RESULT));
                    }
                    _ => return Err(Error::Malformed(Term)),
                }
                self.pop(SCRATCH);
            }
            (Factor, [Id]) => {
                let offset = self.frame.offset(children[0].lexeme()?)?;
                self.emit(Lw(RESULT, offset, FRAME));
            }
            (Factor, [Num]) => self.load_immediate(RESULT, literal_value(children[0].lexeme()?)?),
            (Factor, [Null]) => self.load_immediate(RESULT, NULL_VALUE),
            (Factor, [Lparen, Expr, Rparen]) => self.gen_expr(&children[1])?,
            (Factor, [Amp, Lvalue]) => self.gen_address(&children[1])?,
            (Factor, [Star, Factor]) => {
                self.gen_expr(&children[1])?;
                self.emit(Lw(RESULT, 0, RESULT));
            }
            (Factor, [Id, Lparen, Rparen]) => self.gen_call(children[0].lexeme()?, &[])?,
            (Factor, [Id, Lparen, Arglist, Rparen]) => {
                let args = children[2].list_items(Expr);
                self.gen_call(children[0].lexeme()?, &args)?;
            }
            (Factor, [New, Int, Lbrack, Expr, Rbrack]) => self.gen_new(&children[3])?,
            (label, _) => return Err(Error::Malformed(label)),
        }
        Ok(())
    }

    /// Pointer operands scale the integer side by the cell size; a pointer
    /// difference is divided back down to cells.
    fn gen_additive(&mut self, op: Symbol, left: &Node, right: &Node) -> Result<()> {
        let (left_ty, right_ty) = (left.expect_type()?, right.expect_type()?);
        self.gen_operands(left, right)?;

        match (op, left_ty, right_ty) {
            (Symbol::Plus, Type::Int, Type::Int) => self.emit(Add(RESULT, SCRATCH, RESULT)),
            (Symbol::Minus, Type::Int, Type::Int) => self.emit(Sub(RESULT, SCRATCH, RESULT)),
            (Symbol::Plus, Type::IntPtr, Type::Int) => {
                self.emit(Mult(RESULT, CELL));
                self.emit(Mflo(RESULT));
                self.emit(Add(RESULT, SCRATCH, RESULT));
            }
            (Symbol::Minus, Type::IntPtr, Type::Int) => {
                self.emit(Mult(RESULT, CELL));
                self.emit(Mflo(RESULT));
                self.emit(Sub(RESULT, SCRATCH, RESULT));
            }
            (Symbol::Plus, Type::Int, Type::IntPtr) => {
                self.emit(Mult(SCRATCH, CELL));
                self.emit(Mflo(SCRATCH));
                self.emit(Add(RESULT, SCRATCH, RESULT));
            }
            (Symbol::Minus, Type::IntPtr, Type::IntPtr) => {
                self.emit(Sub(RESULT, SCRATCH, RESULT));
                self.emit(Div(RESULT, CELL));
                self.emit(Mflo(RESULT));
            }
            _ => {
                return Err(TypeError::Additive {
                    op,
                    left: left_ty,
                    right: right_ty,
                }
                .into())
            }
        }

        self.pop(SCRATCH);
        Ok(())
    }

    /// `&x` is frame-pointer arithmetic; `&*p` is just `p`.
    fn gen_address(&mut self, lvalue: &Node) -> Result<()> {
        let target = strip_parens(lvalue)?;

        match target.rhs() {
            [Symbol::Id] => {
                let offset = self.frame.offset(target.expect_child(Symbol::Id, 1)?.lexeme()?)?;
                self.load_immediate(RESULT, offset);
                self.emit(Add(RESULT, FRAME, RESULT));
            }
            [Symbol::Star, Symbol::Factor] => {
                self.gen_expr(target.expect_child(Symbol::Factor, 1)?)?;
            }
            _ => return Err(Error::Malformed(Symbol::Lvalue)),
        }
        Ok(())
    }

    /// Saves `$29` and `$31`, pushes each argument as it is evaluated, and
    /// pops everything again after the callee returns.
    fn gen_call(&mut self, callee: &str, args: &[&Node]) -> Result<()> {
        let label = self.procedure_label(callee)?;

        self.push(FRAME);
        self.push(LINK);
        for arg in args {
            self.gen_expr(arg)?;
            self.push(RESULT);
        }
        self.emit(Lis(LINK));
        self.emit(WordLabel(label));
        self.emit(Jalr(LINK));
        for _ in args {
            self.discard();
        }
        self.pop(LINK);
        self.pop(FRAME);
        Ok(())
    }

    /// A zero result from `new` becomes the null pointer.
    fn gen_new(&mut self, size: &Node) -> Result<()> {
        self.gen_expr(size)?;
        let end_label = self.labels.fresh();
        self.push(ARG1);
        self.emit(Add(ARG1, RESULT, ZERO));
        self.call_routine(NEW);
        self.pop(ARG1);
        self.emit(Bne(RESULT, ZERO, end_label.clone()));
        self.load_immediate(RESULT, NULL_VALUE);
        self.emit(Label(end_label));
        Ok(())
    }
}
