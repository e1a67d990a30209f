use std::fmt;

use phf::phf_map;

static SYMBOLS: phf::Map<&'static str, Symbol> = phf_map! {
    "BOF" => Symbol::Bof,
    "EOF" => Symbol::Eof,
    "ID" => Symbol::Id,
    "NUM" => Symbol::Num,
    "LPAREN" => Symbol::Lparen,
    "RPAREN" => Symbol::Rparen,
    "LBRACE" => Symbol::Lbrace,
    "RBRACE" => Symbol::Rbrace,
    "LBRACK" => Symbol::Lbrack,
    "RBRACK" => Symbol::Rbrack,
    "RETURN" => Symbol::Return,
    "IF" => Symbol::If,
    "ELSE" => Symbol::Else,
    "WHILE" => Symbol::While,
    "PRINTLN" => Symbol::Println,
    "WAIN" => Symbol::Wain,
    "BECOMES" => Symbol::Becomes,
    "INT" => Symbol::Int,
    "EQ" => Symbol::Eq,
    "NE" => Symbol::Ne,
    "LT" => Symbol::Lt,
    "GT" => Symbol::Gt,
    "LE" => Symbol::Le,
    "GE" => Symbol::Ge,
    "PLUS" => Symbol::Plus,
    "MINUS" => Symbol::Minus,
    "STAR" => Symbol::Star,
    "SLASH" => Symbol::Slash,
    "PCT" => Symbol::Pct,
    "COMMA" => Symbol::Comma,
    "SEMI" => Symbol::Semi,
    "NEW" => Symbol::New,
    "DELETE" => Symbol::Delete,
    "AMP" => Symbol::Amp,
    "NULL" => Symbol::Null,

    "start" => Symbol::Start,
    "procedures" => Symbol::Procedures,
    "procedure" => Symbol::Procedure,
    "main" => Symbol::Main,
    "params" => Symbol::Params,
    "paramlist" => Symbol::Paramlist,
    "type" => Symbol::Type,
    "dcls" => Symbol::Dcls,
    "dcl" => Symbol::Dcl,
    "statements" => Symbol::Statements,
    "statement" => Symbol::Statement,
    "test" => Symbol::Test,
    "expr" => Symbol::Expr,
    "term" => Symbol::Term,
    "factor" => Symbol::Factor,
    "arglist" => Symbol::Arglist,
    "lvalue" => Symbol::Lvalue,
};

/// Every terminal and nonterminal of the language grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Bof,
    Eof,
    Id,
    Num,
    Lparen,
    Rparen,
    Lbrace,
    Rbrace,
    Lbrack,
    Rbrack,
    Return,
    If,
    Else,
    While,
    Println,
    Wain,
    Becomes,
    Int,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Pct,
    Comma,
    Semi,
    New,
    Delete,
    Amp,
    Null,

    Start,
    Procedures,
    Procedure,
    Main,
    Params,
    Paramlist,
    Type,
    Dcls,
    Dcl,
    Statements,
    Statement,
    Test,
    Expr,
    Term,
    Factor,
    Arglist,
    Lvalue,
}

impl Symbol {
    pub fn from_name(name: &str) -> Option<Symbol> {
        SYMBOLS.get(name).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Symbol::Bof => "BOF",
            Symbol::Eof => "EOF",
            Symbol::Id => "ID",
            Symbol::Num => "NUM",
            Symbol::Lparen => "LPAREN",
            Symbol::Rparen => "RPAREN",
            Symbol::Lbrace => "LBRACE",
            Symbol::Rbrace => "RBRACE",
            Symbol::Lbrack => "LBRACK",
            Symbol::Rbrack => "RBRACK",
            Symbol::Return => "RETURN",
            Symbol::If => "IF",
            Symbol::Else => "ELSE",
            Symbol::While => "WHILE",
            Symbol::Println => "PRINTLN",
            Symbol::Wain => "WAIN",
            Symbol::Becomes => "BECOMES",
            Symbol::Int => "INT",
            Symbol::Eq => "EQ",
            Symbol::Ne => "NE",
            Symbol::Lt => "LT",
            Symbol::Gt => "GT",
            Symbol::Le => "LE",
            Symbol::Ge => "GE",
            Symbol::Plus => "PLUS",
            Symbol::Minus => "MINUS",
            Symbol::Star => "STAR",
            Symbol::Slash => "SLASH",
            Symbol::Pct => "PCT",
            Symbol::Comma => "COMMA",
            Symbol::Semi => "SEMI",
            Symbol::New => "NEW",
            Symbol::Delete => "DELETE",
            Symbol::Amp => "AMP",
            Symbol::Null => "NULL",
            Symbol::Start => "start",
            Symbol::Procedures => "procedures",
            Symbol::Procedure => "procedure",
            Symbol::Main => "main",
            Symbol::Params => "params",
            Symbol::Paramlist => "paramlist",
            Symbol::Type => "type",
            Symbol::Dcls => "dcls",
            Symbol::Dcl => "dcl",
            Symbol::Statements => "statements",
            Symbol::Statement => "statement",
            Symbol::Test => "test",
            Symbol::Expr => "expr",
            Symbol::Term => "term",
            Symbol::Factor => "factor",
            Symbol::Arglist => "arglist",
            Symbol::Lvalue => "lvalue",
        }
    }

    pub fn is_terminal(self) -> bool {
        self < Symbol::Start
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
