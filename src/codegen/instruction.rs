use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reg(pub u8);

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

pub const ZERO: Reg = Reg(0);
pub const ARG1: Reg = Reg(1);
pub const ARG2: Reg = Reg(2);
pub const RESULT: Reg = Reg(3);
/// Holds the cell size for the whole run.
pub const CELL: Reg = Reg(4);
pub const SCRATCH: Reg = Reg(5);
pub const FRAME: Reg = Reg(29);
pub const STACK: Reg = Reg(30);
pub const LINK: Reg = Reg(31);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    Import(String),
    Add(Reg, Reg, Reg),
    Sub(Reg, Reg, Reg),
    Mult(Reg, Reg),
    Div(Reg, Reg),
    Mfhi(Reg),
    Mflo(Reg),
    Lis(Reg),
    Slt(Reg, Reg, Reg),
    Sltu(Reg, Reg, Reg),
    Jr(Reg),
    Jalr(Reg),
    Beq(Reg, Reg, String),
    Bne(Reg, Reg, String),
    /// `lw t, offset(s)`
    Lw(Reg, i32, Reg),
    /// `sw t, offset(s)`
    Sw(Reg, i32, Reg),
    Word(i32),
    WordLabel(String),
    Label(String),
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Import(name) => write!(f, ".import {name}"),
            Instruction::Add(d, s, t) => write!(f, "add {d}, {s}, {t}"),
            Instruction::Sub(d, s, t) => write!(f, "sub {d}, {s}, {t}"),
            Instruction::Mult(s, t) => write!(f, "mult {s}, {t}"),
            Instruction::Div(s, t) => write!(f, "div {s}, {t}"),
            Instruction::Mfhi(d) => write!(f, "mfhi {d}"),
            Instruction::Mflo(d) => write!(f, "mflo {d}"),
            Instruction::Lis(d) => write!(f, "lis {d}"),
            Instruction::Slt(d, s, t) => write!(f, "slt {d}, {s}, {t}"),
            Instruction::Sltu(d, s, t) => write!(f, "sltu {d}, {s}, {t}"),
            Instruction::Jr(s) => write!(f, "jr {s}"),
            Instruction::Jalr(s) => write!(f, "jalr {s}"),
            Instruction::Beq(s, t, label) => write!(f, "beq {s}, {t}, {label}"),
            Instruction::Bne(s, t, label) => write!(f, "bne {s}, {t}, {label}"),
            Instruction::Lw(t, offset, s) => write!(f, "lw {t}, {offset}({s})"),
            Instruction::Sw(t, offset, s) => write!(f, "sw {t}, {offset}({s})"),
            Instruction::Word(value) => write!(f, ".word {value}"),
            Instruction::WordLabel(label) => write!(f, ".word {label}"),
            Instruction::Label(label) => write!(f, "{label}:"),
        }
    }
}

/// A complete listing, one instruction per line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Assembly(pub Vec<Instruction>);

impl Assembly {
    pub fn instructions(&self) -> &[Instruction] {
        &self.0
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|instruction| match instruction {
            Instruction::Label(label) => Some(label.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for Assembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in &self.0 {
            writeln!(f, "{}", instruction)?;
        }
        Ok(())
    }
}
