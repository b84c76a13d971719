//! Error types for the Brewin interpreter

use thiserror::Error;

/// Brewin interpreter errors
///
/// Every error is fatal to the current run: the evaluator stops at the point the error is
/// raised and the driver is responsible for reporting it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Front-end errors
    /// Syntax error encountered while scanning or parsing
    ///
    /// **Triggered by:** Invalid Brewin syntax (missing `;`, unbalanced braces, stray characters)
    /// **Example:** `func main() { var x }` (missing semicolon)
    #[error("Syntax error at line {line}, column {col}: {message}")]
    SyntaxError {
        /// Line number where error occurred
        line: usize,
        /// Column number where error occurred
        col: usize,
        /// Error description
        message: String,
    },

    // Name errors
    /// Reference to, or assignment of, a variable not visible in the current frame
    ///
    /// **Triggered by:** Using a variable before `var` declared it, or using a caller's variable
    /// **Example:** `func main() { x = 1; }`
    #[error("Undefined variable: {name}")]
    UndefinedVariable {
        /// Variable name
        name: String,
    },

    /// Variable declared twice in the same block
    ///
    /// **Example:** `var x; var x;`
    /// **Prevention:** Declare the second variable inside a nested block to shadow instead
    #[error("Duplicate definition for variable {name}")]
    DuplicateVariable {
        /// Variable name
        name: String,
    },

    /// No function matches the called name and argument count
    #[error("Function {name} taking {arity} argument(s) not found")]
    UndefinedFunction {
        /// Function name
        name: String,
        /// Number of arguments supplied at the call site
        arity: usize,
    },

    /// Invalid arguments provided to a built-in primitive
    #[error("Invalid arguments for {function}: {reason}")]
    InvalidArguments {
        /// Primitive name
        function: String,
        /// Reason for invalidity
        reason: String,
    },

    // Type errors
    /// Type mismatch error
    ///
    /// **Triggered by:** A condition or unary operand of the wrong kind
    /// **Example:** `if (1) { ... }`, `!5`, `-"text"`
    #[error("Type error: expected {expected}, got {got}")]
    TypeError {
        /// Expected type
        expected: String,
        /// Actual type
        got: String,
    },

    /// Invalid binary operation for the given operand kinds
    ///
    /// **Triggered by:** An operator missing from the left kind's row, or mixed kinds
    /// **Example:** `1 + "a"`, `"a" - "b"`, `nil < nil`
    #[error("Invalid operation: {op} on types {left_type} and {right_type}")]
    InvalidOperation {
        /// Operator symbol
        op: String,
        /// Left operand type
        left_type: String,
        /// Right operand type
        right_type: String,
    },

    /// Line read by `inputi` is not an integer
    #[error("Invalid integer input: {input:?}")]
    InvalidInput {
        /// Raw input line
        input: String,
    },

    // Faults
    /// Division by zero error
    #[error("Division by zero")]
    DivisionByZero,

    /// Integer arithmetic left the 64-bit range
    #[error("Integer overflow in {op}")]
    IntegerOverflow {
        /// Operator symbol
        op: String,
    },

    /// Too many nested calls
    #[error("Call depth exceeded (limit: {limit} frames)")]
    CallDepthExceeded {
        /// Maximum allowed frames
        limit: usize,
    },

    /// Console input reached end of stream
    #[error("No more input available")]
    InputExhausted,

    /// Console I/O failure
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal runtime fault (environment stack misuse)
    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Source text could not be scanned or parsed
    Syntax,
    /// Unknown or duplicate variable, unresolvable function
    Name,
    /// Operand or condition of the wrong kind
    Type,
    /// Arithmetic, resource or internal failure
    Fault,
}

impl Error {
    /// Create a runtime error with a message
    pub fn runtime(msg: impl Into<String>) -> Self {
        Error::RuntimeError(msg.into())
    }

    /// Create a syntax error at the given position
    pub fn syntax(line: usize, col: usize, msg: impl Into<String>) -> Self {
        Error::SyntaxError {
            line,
            col,
            message: msg.into(),
        }
    }

    /// Create a type error from expected and actual type names
    pub fn type_mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Error::TypeError {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Classify error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::SyntaxError { .. } => ErrorKind::Syntax,

            Error::UndefinedVariable { .. }
            | Error::DuplicateVariable { .. }
            | Error::UndefinedFunction { .. }
            | Error::InvalidArguments { .. } => ErrorKind::Name,

            Error::TypeError { .. } | Error::InvalidOperation { .. } | Error::InvalidInput { .. } => {
                ErrorKind::Type
            }

            Error::DivisionByZero
            | Error::IntegerOverflow { .. }
            | Error::CallDepthExceeded { .. }
            | Error::InputExhausted
            | Error::Io(_)
            | Error::RuntimeError(_) => ErrorKind::Fault,
        }
    }

    /// True for name-class errors
    pub fn is_name_error(&self) -> bool {
        self.kind() == ErrorKind::Name
    }

    /// True for type-class errors
    pub fn is_type_error(&self) -> bool {
        self.kind() == ErrorKind::Type
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

/// Result type for Brewin operations
pub type Result<T> = std::result::Result<T, Error>;
