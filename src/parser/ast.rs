use serde::{Deserialize, Serialize};
use std::fmt;

/// Complete Brewin program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Top-level function definitions, in source order
    pub functions: Vec<FunctionDef>,
}

/// Function definition: `func name(params) { statements }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    /// Function name
    pub name: String,
    /// Ordered parameter names
    pub params: Vec<String>,
    /// Function body
    pub statements: Vec<Statement>,
}

impl FunctionDef {
    /// Number of declared parameters
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Assignment `name = expression`
///
/// Kept as its own type so `for` loops can only carry plain assignments in their
/// `init` and `update` slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Name of the variable to assign to
    pub name: String,
    /// Expression value to assign
    pub expression: Expression,
}

/// Statements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// Function call whose value is discarded: `f(a, b);`
    Call {
        /// Name of the function to call
        name: String,
        /// Argument expressions, in order
        args: Vec<Expression>,
    },

    /// Variable assignment: `x = expr;`
    Assign(Assignment),

    /// Variable declaration: `var x;`
    VarDef {
        /// Name of the variable being declared
        name: String,
    },

    /// If statement
    If {
        /// Condition expression to evaluate
        condition: Expression,
        /// Statements to execute if condition is true
        statements: Vec<Statement>,
        /// Statements to execute if condition is false; `None` when there is no `else`
        else_statements: Option<Vec<Statement>>,
    },

    /// For loop: `for (init; condition; update) { statements }`
    For {
        /// Assignment run once before the loop
        init: Assignment,
        /// Loop condition expression
        condition: Expression,
        /// Assignment run after each completed iteration
        update: Assignment,
        /// Statements to execute in loop body
        statements: Vec<Statement>,
    },

    /// Return statement
    Return {
        /// Optional value to return
        expression: Option<Expression>,
    },
}

/// Expressions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    // Literals
    /// Integer literal expression
    IntLiteral(i64),
    /// String literal expression
    StringLiteral(String),
    /// Boolean literal expression
    BoolLiteral(bool),
    /// Nil literal expression
    NilLiteral,

    /// Variable reference expression
    Variable(String),

    /// Function call used as a value
    Call {
        /// Name of the function to call
        name: String,
        /// Argument expressions, in order
        args: Vec<Expression>,
    },

    /// Unary operation expression
    Unary {
        /// Unary operator to apply
        op: UnaryOp,
        /// Operand expression
        operand: Box<Expression>,
    },

    /// Binary operation expression
    Binary {
        /// Binary operator to apply
        op: BinaryOp,
        /// Left operand expression
        left: Box<Expression>,
        /// Right operand expression
        right: Box<Expression>,
    },
}

impl Expression {
    /// Builds a binary expression node
    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Builds a unary expression node
    pub fn unary(op: UnaryOp, operand: Expression) -> Self {
        Expression::Unary {
            op,
            operand: Box::new(operand),
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    // Arithmetic
    /// Addition or string concatenation (+)
    Add,
    /// Subtraction operator (-)
    Sub,
    /// Multiplication operator (*)
    Mul,
    /// Integer division operator (/)
    Div,

    // Comparison
    /// Equality operator (==)
    Eq,
    /// Inequality operator (!=)
    NotEq,
    /// Less than operator (<)
    Lt,
    /// Greater than operator (>)
    Gt,
    /// Less than or equal operator (<=)
    LtEq,
    /// Greater than or equal operator (>=)
    GtEq,

    // Logical
    /// Logical AND operator (&&), both sides always evaluated
    And,
    /// Logical OR operator (||), both sides always evaluated
    Or,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Negation operator (-x)
    Neg,
    /// Logical NOT operator (!x)
    Not,
}

/// Operator precedence levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    /// Logical OR operator
    Or,
    /// Logical AND operator
    And,
    /// Equality operators (==, !=)
    Equality,
    /// Comparison operators (<, >, <=, >=)
    Comparison,
    /// Addition and subtraction (+, -)
    Term,
    /// Multiplication and division (*, /)
    Factor,
    /// Unary operators (!, -)
    Unary,
}

impl Precedence {
    /// The next-tighter level, used to parse left-associative right operands
    pub fn next(self) -> Precedence {
        match self {
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::Equality,
            Precedence::Equality => Precedence::Comparison,
            Precedence::Comparison => Precedence::Term,
            Precedence::Term => Precedence::Factor,
            Precedence::Factor => Precedence::Unary,
            Precedence::Unary => Precedence::Unary,
        }
    }
}

impl BinaryOp {
    /// Returns the precedence level of this binary operator
    pub fn precedence(&self) -> Precedence {
        match self {
            BinaryOp::Or => Precedence::Or,
            BinaryOp::And => Precedence::And,
            BinaryOp::Eq | BinaryOp::NotEq => Precedence::Equality,
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::LtEq | BinaryOp::GtEq => Precedence::Comparison,
            BinaryOp::Add | BinaryOp::Sub => Precedence::Term,
            BinaryOp::Mul | BinaryOp::Div => Precedence::Factor,
        }
    }

    /// True for `==` and `!=`, which accept operands of differing kinds
    pub fn is_equality(&self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::NotEq)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
            BinaryOp::Eq => write!(f, "=="),
            BinaryOp::NotEq => write!(f, "!="),
            BinaryOp::Lt => write!(f, "<"),
            BinaryOp::Gt => write!(f, ">"),
            BinaryOp::LtEq => write!(f, "<="),
            BinaryOp::GtEq => write!(f, ">="),
            BinaryOp::And => write!(f, "&&"),
            BinaryOp::Or => write!(f, "||"),
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Not => write!(f, "!"),
        }
    }
}
