//! Runtime execution for Brewin programs

mod console;
mod environment;
mod evaluator;
mod functions;
pub mod operators;
mod value;

pub use console::{BufferedConsole, Console, StdConsole};
pub use environment::Environment;
pub use evaluator::{Evaluator, EvaluatorConfig, Flow, ENTRY_POINT};
pub use functions::{FunctionKey, FunctionTable, PRIMITIVES};
pub use value::{Kind, Value};
