use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser, ValueEnum};
use clap_stdin::FileOrStdin;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use wlp4c::codegen::{Labels, RandomLabels};
use wlp4c::error::{CompileError, Stage};
use wlp4c::grammar::Grammar;
use wlp4c::token::read_tokens;
use wlp4c::{analyze, generate, Options};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Emit {
    /// Assembly listing
    Asm,
    /// Annotated tree, one node per line in pre-order
    Tree,
    /// Annotated tree drawn with guides
    Pretty,
    /// Procedure and variable tables
    Symbols,
}

/// Compiles a WLP4 token stream to MIPS assembly.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Token stream, one `KIND lexeme` pair per line; `-` reads stdin
    #[arg(default_value = "-")]
    input: FileOrStdin,

    /// Production list to use instead of the built-in grammar
    #[arg(long, requires_all = ["transitions", "reductions"])]
    rules: Option<PathBuf>,

    #[arg(long, requires_all = ["rules", "reductions"])]
    transitions: Option<PathBuf>,

    #[arg(long, requires_all = ["rules", "transitions"])]
    reductions: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Emit::Asm)]
    emit: Emit,

    /// Bytes per cell
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(i32).range(1..))]
    cell_size: i32,

    /// Seed for generated labels
    #[arg(long)]
    seed: Option<u64>,

    /// Write output here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// -v for debug logs, -vv for trace
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_grammar(cli: &Cli) -> anyhow::Result<Grammar> {
    let (Some(rules), Some(transitions), Some(reductions)) =
        (&cli.rules, &cli.transitions, &cli.reductions)
    else {
        return Grammar::builtin().map_err(|e| CompileError::new(Stage::Setup, e).into());
    };

    let read = |path: &PathBuf| {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    };
    Grammar::load(&read(rules)?, &read(transitions)?, &read(reductions)?)
        .map_err(|e| CompileError::new(Stage::Setup, e).into())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let grammar = load_grammar(&cli)?;
    let text = cli.input.contents().context("reading token stream")?;
    let tokens = read_tokens(&text).map_err(|e| CompileError::new(Stage::Setup, e))?;
    debug!(tokens = tokens.len(), "read token stream");

    let (root, program) = analyze(&grammar, tokens)?;

    let output = match cli.emit {
        Emit::Asm => {
            let options = Options {
                cell_size: cli.cell_size,
            };
            let source = match cli.seed {
                Some(seed) => RandomLabels::seeded(seed),
                None => RandomLabels::new(),
            };
            generate(&root, &program, options, Labels::new(source))?.to_string()
        }
        Emit::Tree => root.to_string(),
        Emit::Pretty => root.pretty(),
        Emit::Symbols => program.to_string(),
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, output).with_context(|| format!("writing {}", path.display()))?
        }
        None => print!("{output}"),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<CompileError>() {
                Some(error) => eprintln!("{error}"),
                None => eprintln!("ERROR: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_size_must_be_positive() {
        for arg in ["--cell-size=0", "--cell-size=-4"] {
            assert!(Cli::try_parse_from(["wlp4c", "prog.tokens", arg]).is_err());
        }

        let cli = Cli::try_parse_from(["wlp4c", "prog.tokens", "--cell-size=8"]).unwrap();
        assert_eq!(cli.cell_size, 8);
        let cli = Cli::try_parse_from(["wlp4c", "prog.tokens"]).unwrap();
        assert_eq!(cli.cell_size, 4);
    }
}
