#![allow(dead_code)]

use phf::phf_map;

use wlp4c::analyzer::Program;
use wlp4c::codegen::{Assembly, Labels, SequentialLabels};
use wlp4c::grammar::{Grammar, Symbol};
use wlp4c::parser::Node;
use wlp4c::token::Token;
use wlp4c::{CompileError, Options};

static KEYWORDS: phf::Map<&'static str, Symbol> = phf_map! {
    "int" => Symbol::Int,
    "wain" => Symbol::Wain,
    "if" => Symbol::If,
    "else" => Symbol::Else,
    "while" => Symbol::While,
    "println" => Symbol::Println,
    "return" => Symbol::Return,
    "new" => Symbol::New,
    "delete" => Symbol::Delete,
    "NULL" => Symbol::Null,
};

/// Just enough of a scanner to write test programs as source text.
pub fn tokens(source: &str) -> Vec<Token> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = vec![];
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_alphanumeric() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_alphanumeric() {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            let kind = if c.is_ascii_digit() {
                Symbol::Num
            } else {
                KEYWORDS.get(word.as_str()).copied().unwrap_or(Symbol::Id)
            };
            tokens.push(Token::new(kind, word));
            continue;
        }

        let next = chars.get(i + 1).copied();
        let (kind, len) = match (c, next) {
            ('=', Some('=')) => (Symbol::Eq, 2),
            ('!', Some('=')) => (Symbol::Ne, 2),
            ('<', Some('=')) => (Symbol::Le, 2),
            ('>', Some('=')) => (Symbol::Ge, 2),
            ('=', _) => (Symbol::Becomes, 1),
            ('<', _) => (Symbol::Lt, 1),
            ('>', _) => (Symbol::Gt, 1),
            ('+', _) => (Symbol::Plus, 1),
            ('-', _) => (Symbol::Minus, 1),
            ('*', _) => (Symbol::Star, 1),
            ('/', _) => (Symbol::Slash, 1),
            ('%', _) => (Symbol::Pct, 1),
            (',', _) => (Symbol::Comma, 1),
            (';', _) => (Symbol::Semi, 1),
            ('(', _) => (Symbol::Lparen, 1),
            (')', _) => (Symbol::Rparen, 1),
            ('{', _) => (Symbol::Lbrace, 1),
            ('}', _) => (Symbol::Rbrace, 1),
            ('[', _) => (Symbol::Lbrack, 1),
            (']', _) => (Symbol::Rbrack, 1),
            ('&', _) => (Symbol::Amp, 1),
            _ => panic!("unexpected character {c:?} in test source"),
        };
        tokens.push(Token::new(kind, chars[i..i + len].iter().collect::<String>()));
        i += len;
    }

    tokens
}

pub fn grammar() -> Grammar {
    Grammar::builtin().unwrap()
}

/// An entry procedure `int wain(int a, int b)` around `body`, returning 0.
pub fn wain(body: &str) -> String {
    format!("int wain(int a, int b) {{ {body} return 0; }}")
}

pub fn analyze(source: &str) -> Result<(Node, Program), CompileError> {
    wlp4c::analyze(&grammar(), tokens(source))
}

pub fn try_compile(source: &str) -> Result<Assembly, CompileError> {
    wlp4c::compile_with_labels(
        &grammar(),
        tokens(source),
        Options::default(),
        Labels::new(SequentialLabels::new()),
    )
}

pub fn compile(source: &str) -> Assembly {
    try_compile(source).unwrap()
}

pub fn lines(assembly: &Assembly) -> Vec<String> {
    assembly
        .instructions()
        .iter()
        .map(|instruction| instruction.to_string())
        .collect()
}

/// Whether `needle` appears as a contiguous run of lines in `haystack`.
pub fn contains_run(haystack: &[String], needle: &[&str]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window.iter().zip(needle).all(|(a, b)| a == b))
}

/// Lines between the label `name:` and the next `jr $31`, inclusive.
pub fn procedure_body(assembly: &Assembly, name: &str) -> Vec<String> {
    let all = lines(assembly);
    let start = all
        .iter()
        .position(|line| *line == format!("{name}:"))
        .unwrap_or_else(|| panic!("no label {name}"));
    let end = start
        + all[start..]
            .iter()
            .position(|line| line == "jr $31")
            .unwrap();
    all[start..=end].to_vec()
}
