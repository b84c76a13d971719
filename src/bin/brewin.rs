//! Run a Brewin program from a file
//!
//! With `--ast` the parsed program is printed as JSON instead of being executed.

use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use brewin::{parse_program, Evaluator, EvaluatorConfig, StdConsole};
use clap::Parser;

/// Brewin - run a program starting from `main()`
#[derive(Parser, Debug)]
#[command(name = "brewin")]
#[command(about = "Run a Brewin program", long_about = None)]
struct Args {
    /// Print the parsed program as JSON instead of running it
    #[arg(long)]
    ast: bool,

    /// Maximum number of nested function calls, `main` included
    #[arg(long, default_value_t = EvaluatorConfig::default().max_call_depth)]
    max_call_depth: usize,

    /// Program source file
    program: PathBuf,
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let path = args.program.display();
    let code = fs::read_to_string(&args.program)
        .with_context(|| format!("reading file '{}'", path))?;
    let program = parse_program(&code).with_context(|| format!("parsing '{}'", path))?;

    if args.ast {
        println!("{}", serde_json::to_string_pretty(&program)?);
        return Ok(());
    }

    let config = EvaluatorConfig {
        max_call_depth: args.max_call_depth,
        ..EvaluatorConfig::default()
    };
    Evaluator::with_config(StdConsole::new(), config)
        .run(&program)
        .with_context(|| format!("running '{}'", path))?;
    Ok(())
}
