//! Brewin Parser Module
//!
//! Parses the token stream into an Abstract Syntax Tree (AST).

mod ast;
#[allow(clippy::module_inception)]
mod parser;

pub use ast::{
    Assignment, BinaryOp, Expression, FunctionDef, Precedence, Program, Statement, UnaryOp,
};
pub use parser::Parser;
