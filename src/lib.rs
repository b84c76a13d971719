//! # Brewin - a small imperative language interpreter
//!
//! A tree-walking interpreter for Brewin: top-level functions overloaded by arity,
//! block-scoped variables, `if`/`else` and `for` control flow, early `return` from any
//! depth, and four primitive value kinds (integers, strings, booleans and `nil`).
//!
//! ## Quick Start
//!
//! ```rust
//! use brewin::{BufferedConsole, Evaluator, Parser, Scanner};
//!
//! # fn main() -> brewin::Result<()> {
//! let code = r#"
//!     func f(a, b) { return a + b; }
//!     func main() { print(f(2, 3)); }
//! "#;
//!
//! // Tokenize (scan)
//! let mut scanner = Scanner::new(code);
//! let tokens = scanner.scan_tokens()?;
//!
//! // Parse into AST
//! let mut parser = Parser::new(tokens);
//! let program = parser.parse()?;
//!
//! // Execute, capturing output in memory
//! let mut evaluator = Evaluator::new(BufferedConsole::new());
//! evaluator.run(&program)?;
//!
//! assert_eq!(evaluator.console().outputs(), ["5".to_string()]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Language Overview
//!
//! - **Functions**: `func name(a, b) { ... }`; `main()` is the entry point. Functions with
//!   the same name but a different number of parameters are distinct overloads.
//! - **Variables**: `var x;` declares `x` (initially `0`) in the current block; `x = expr;`
//!   assigns to the nearest visible declaration. A block may shadow outer variables, and a
//!   function never sees its caller's variables.
//! - **Control flow**: `if (cond) { ... } else { ... }`,
//!   `for (i = 0; i < n; i = i + 1) { ... }`, `return expr;`. Conditions must be booleans.
//! - **Operators**: `+ - * /` on integers, `+` on strings, `&& || !` on booleans (no short
//!   circuit), `== != < <= > >=`. Values of different kinds are never equal.
//! - **Built-ins**: `print(...)`, `inputi(prompt?)`, `inputs(prompt?)`.
//!
//! ## Architecture
//!
//! ```text
//! Source Code → Scanner → Tokens → Parser → AST → Evaluator → Console
//! ```
//!
//! - [`Scanner`] - Tokenizes source code into tokens
//! - [`Parser`] - Parses tokens into an Abstract Syntax Tree (AST)
//! - [`Evaluator`] - Executes the AST starting from `main`
//! - [`Environment`] - Call frames of nested block scopes
//! - [`Value`] - Runtime value representation
//! - [`Console`] - Output/input collaborator used by the built-ins
//!
//! ## Error Handling
//!
//! Every error aborts the run. [`Error::kind`] tells name errors (unknown variables or
//! functions) from type errors (mismatched operands or conditions):
//!
//! ```rust
//! use brewin::{run_source, BufferedConsole, ErrorKind};
//!
//! let mut console = BufferedConsole::new();
//! let err = run_source("func main() { print(1 + \"a\"); }", &mut console).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Type);
//! ```

// Allow specific clippy warnings that are intentional
#![allow(clippy::module_inception)]

/// Version of the Brewin interpreter
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod lexer;
pub mod parser;
pub mod runtime;
mod stack;

// Re-export main types
pub use error::{Error, ErrorKind, Result};
pub use lexer::{Scanner, Token, TokenKind};
pub use parser::{
    Assignment, BinaryOp, Expression, FunctionDef, Parser, Program, Statement, UnaryOp,
};
pub use runtime::{
    BufferedConsole, Console, Environment, Evaluator, EvaluatorConfig, Flow, FunctionKey,
    FunctionTable, Kind, StdConsole, Value,
};

/// Scans and parses Brewin source text into a [`Program`]
pub fn parse_program(source: &str) -> Result<Program> {
    let tokens = Scanner::new(source).scan_tokens()?;
    Parser::new(tokens).parse()
}

/// Parses and runs Brewin source text on the given console, returning `main`'s value
pub fn run_source<C: Console>(source: &str, console: C) -> Result<Value> {
    let program = parse_program(source)?;
    Evaluator::new(console).run(&program)
}
