pub mod analyzer;
pub mod codegen;
pub mod error;
pub mod grammar;
pub mod parser;
pub mod token;

use tracing::debug;

use analyzer::{Program, SemanticVisitor};
use codegen::{Assembly, Codegen, Labels, RandomLabels};
use grammar::Grammar;
use parser::{Node, Parser};
use token::Token;

pub use codegen::Options;
pub use error::{CompileError, Error, ErrorKind, Stage};

/// Parses and type-checks a token stream. The returned tree carries the
/// type of every expression node.
pub fn analyze(grammar: &Grammar, tokens: Vec<Token>) -> Result<(Node, Program), CompileError> {
    let mut parser = Parser::new(grammar, tokens);
    parser
        .run()
        .map_err(|e| CompileError::new(Stage::Setup, e))?;

    let mut root = parser
        .finish()
        .map_err(|e| CompileError::new(Stage::Processing, e))?;
    debug!("parse finished");

    let program = SemanticVisitor::new()
        .visit_program(&mut root)
        .map_err(|e| CompileError::new(Stage::Processing, e))?;
    debug!(procedures = program.len(), "semantic analysis finished");

    Ok((root, program))
}

/// Lowers an analyzed tree. `program` must come from the same `analyze` call.
pub fn generate(
    root: &Node,
    program: &Program,
    options: Options,
    labels: Labels,
) -> Result<Assembly, CompileError> {
    Codegen::new(program, options, labels)
        .generate(root)
        .map_err(|e| CompileError::new(Stage::CodeGeneration, e))
}

pub fn compile_with_labels(
    grammar: &Grammar,
    tokens: Vec<Token>,
    options: Options,
    labels: Labels,
) -> Result<Assembly, CompileError> {
    let (root, program) = analyze(grammar, tokens)?;
    generate(&root, &program, options, labels)
}

/// Compiles a token stream to an assembly listing with random labels.
pub fn compile(grammar: &Grammar, tokens: Vec<Token>, options: Options) -> Result<String, CompileError> {
    let labels = Labels::new(RandomLabels::new());
    compile_with_labels(grammar, tokens, options, labels).map(|assembly| assembly.to_string())
}
