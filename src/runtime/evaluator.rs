use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::parser::{Assignment, Expression, FunctionDef, Program, Statement};
use crate::runtime::console::{Console, StdConsole};
use crate::runtime::functions::FunctionTable;
use crate::runtime::operators::{apply_binary, apply_unary};
use crate::runtime::{Environment, Value};
use crate::stack::ensure_sufficient_stack;

/// Name of the entry function, always called with zero arguments
pub const ENTRY_POINT: &str = "main";

/// Evaluator configuration
#[derive(Clone, Debug)]
pub struct EvaluatorConfig {
    /// Emit a `trace` event for every statement executed
    pub trace_statements: bool,
    /// Maximum number of simultaneously active call frames, `main` included
    pub max_call_depth: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        EvaluatorConfig {
            trace_statements: false,
            max_call_depth: 256,
        }
    }
}

/// Outcome of executing a statement or statement list
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Ran to completion without reaching `return`
    Completed,
    /// A `return` was reached, carrying the returned value
    Returned(Value),
}

impl Flow {
    /// True if a `return` was reached
    pub fn is_returned(&self) -> bool {
        matches!(self, Flow::Returned(_))
    }

    /// The returned value, or nil when no `return` was reached
    pub fn into_value(self) -> Value {
        match self {
            Flow::Completed => Value::Nil,
            Flow::Returned(value) => value,
        }
    }
}

/// Tree-walking evaluator for Brewin programs
///
/// Owns the function table, the environment and the console used by the
/// built-in primitives:
/// - `print(args...)` - renders and concatenates its arguments on one output line
/// - `inputi(prompt?)` - reads one line and parses it as an integer
/// - `inputs(prompt?)` - reads one line as a string
pub struct Evaluator<C: Console = StdConsole> {
    /// Variable environment
    env: Environment,
    /// Functions of the program being run
    functions: FunctionTable,
    /// Console used by the primitives
    console: C,
    /// Evaluator configuration
    config: EvaluatorConfig,
}

impl Evaluator<StdConsole> {
    /// Creates an evaluator printing to stdout and reading from stdin
    pub fn stdio() -> Self {
        Evaluator::new(StdConsole::new())
    }
}

impl<C: Console> Evaluator<C> {
    /// Creates a new evaluator over the given console
    pub fn new(console: C) -> Self {
        Self::with_config(console, EvaluatorConfig::default())
    }

    /// Creates a new evaluator with custom configuration
    pub fn with_config(console: C, config: EvaluatorConfig) -> Self {
        Evaluator {
            env: Environment::new(),
            functions: FunctionTable::default(),
            console,
            config,
        }
    }

    /// The console used by the primitives
    pub fn console(&self) -> &C {
        &self.console
    }

    /// Consumes the evaluator and returns its console
    pub fn into_console(self) -> C {
        self.console
    }

    /// The environment; empty between runs
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Runs `main` with zero arguments to completion
    ///
    /// Returns the value `main` returned, or nil if it fell off the end.
    pub fn run(&mut self, program: &Program) -> Result<Value> {
        self.functions = FunctionTable::build(program);
        self.env = Environment::new();
        debug!(functions = self.functions.len(), "function table built");

        let main = self
            .functions
            .get(ENTRY_POINT, 0)
            .ok_or_else(|| Error::UndefinedFunction {
                name: ENTRY_POINT.to_string(),
                arity: 0,
            })?;

        self.invoke(&main, Vec::new())
    }

    /// Calls a function by name with unevaluated argument expressions
    fn call(&mut self, name: &str, args: &[Expression]) -> Result<Value> {
        match name {
            "print" => return self.call_print(args),
            "inputi" | "inputs" => return self.call_input(name, args),
            _ => {}
        }

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.evaluate_expression(arg)?);
        }

        let Some(function) = self.functions.get(name, values.len()) else {
            debug!(
                function = %name,
                arity = values.len(),
                defined = ?self.functions.arities(name),
                "no overload with this arity"
            );
            return Err(Error::UndefinedFunction {
                name: name.to_string(),
                arity: values.len(),
            });
        };

        self.invoke(&function, values)
    }

    /// Runs a user function in a fresh frame
    ///
    /// The frame is popped whether the body returns, falls through or fails.
    fn invoke(&mut self, function: &FunctionDef, args: Vec<Value>) -> Result<Value> {
        if self.env.call_depth() >= self.config.max_call_depth {
            return Err(Error::CallDepthExceeded {
                limit: self.config.max_call_depth,
            });
        }

        debug!(
            function = %function.name,
            arity = function.arity(),
            depth = self.env.call_depth() + 1,
            "entering function"
        );

        self.env.enter_call();
        let outcome = ensure_sufficient_stack(|| self.bind_and_run(function, args));
        self.env.exit_call()?;

        let value = outcome?.into_value();
        debug!(function = %function.name, result = %value, "leaving function");
        Ok(value)
    }

    fn bind_and_run(&mut self, function: &FunctionDef, args: Vec<Value>) -> Result<Flow> {
        for (param, value) in function.params.iter().zip(args) {
            self.env.declare(param, value)?;
        }
        self.run_statements(&function.statements)
    }

    fn call_print(&mut self, args: &[Expression]) -> Result<Value> {
        let mut output = String::new();
        for arg in args {
            let value = self.evaluate_expression(arg)?;
            output.push_str(&value.to_string());
        }
        self.console.output(&output)?;
        Ok(Value::Nil)
    }

    fn call_input(&mut self, name: &str, args: &[Expression]) -> Result<Value> {
        match args {
            [] => {}
            [prompt] => {
                let prompt = self.evaluate_expression(prompt)?;
                self.console.output(&prompt.to_string())?;
            }
            _ => {
                return Err(Error::InvalidArguments {
                    function: name.to_string(),
                    reason: format!("expected at most 1 argument, got {}", args.len()),
                })
            }
        }

        let line = self.console.get_input()?;
        if name == "inputi" {
            line.trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| Error::InvalidInput { input: line })
        } else {
            Ok(Value::String(line))
        }
    }

    /// Executes statements in order, stopping at the first `return`
    fn run_statements(&mut self, statements: &[Statement]) -> Result<Flow> {
        for statement in statements {
            let flow = self.execute_statement(statement)?;
            if flow.is_returned() {
                return Ok(flow);
            }
        }
        Ok(Flow::Completed)
    }

    /// Executes statements inside a fresh block scope, popped on every exit path
    fn run_block(&mut self, statements: &[Statement]) -> Result<Flow> {
        self.env.enter_block()?;
        let flow = self.run_statements(statements);
        self.env.exit_block()?;
        flow
    }

    fn execute_statement(&mut self, statement: &Statement) -> Result<Flow> {
        if self.config.trace_statements {
            trace!(?statement, "executing statement");
        }

        match statement {
            Statement::Call { name, args } => {
                self.call(name, args)?;
                Ok(Flow::Completed)
            }

            Statement::Assign(assignment) => {
                self.assign(assignment)?;
                Ok(Flow::Completed)
            }

            Statement::VarDef { name } => {
                self.env.declare(name, Value::Int(0))?;
                Ok(Flow::Completed)
            }

            Statement::If {
                condition,
                statements,
                else_statements,
            } => {
                let branch = if self.evaluate_condition(condition, "if")? {
                    Some(statements)
                } else {
                    else_statements.as_ref()
                };

                match branch {
                    Some(branch) => self.run_block(branch),
                    None => Ok(Flow::Completed),
                }
            }

            Statement::For {
                init,
                condition,
                update,
                statements,
            } => self.execute_for(init, condition, update, statements),

            Statement::Return { expression } => {
                let value = match expression {
                    Some(expr) => self.evaluate_expression(expr)?,
                    None => Value::Nil,
                };
                Ok(Flow::Returned(value))
            }
        }
    }

    fn execute_for(
        &mut self,
        init: &Assignment,
        condition: &Expression,
        update: &Assignment,
        statements: &[Statement],
    ) -> Result<Flow> {
        self.assign(init)?;

        loop {
            self.env.enter_block()?;
            let step = self.run_iteration(condition, update, statements);
            self.env.exit_block()?;

            if let Some(flow) = step? {
                return Ok(flow);
            }
        }
    }

    /// One loop iteration; `Some` ends the loop with that outcome
    fn run_iteration(
        &mut self,
        condition: &Expression,
        update: &Assignment,
        statements: &[Statement],
    ) -> Result<Option<Flow>> {
        if !self.evaluate_condition(condition, "for")? {
            return Ok(Some(Flow::Completed));
        }

        let flow = self.run_statements(statements)?;
        if flow.is_returned() {
            return Ok(Some(flow));
        }

        self.assign(update)?;
        Ok(None)
    }

    fn assign(&mut self, assignment: &Assignment) -> Result<()> {
        let value = self.evaluate_expression(&assignment.expression)?;
        self.env.assign(&assignment.name, value)
    }

    fn evaluate_condition(&mut self, condition: &Expression, context: &str) -> Result<bool> {
        match self.evaluate_expression(condition)? {
            Value::Bool(b) => Ok(b),
            other => Err(Error::type_mismatch(
                format!("bool condition in {}", context),
                other.type_name(),
            )),
        }
    }

    /// Evaluates an expression to a value
    pub fn evaluate_expression(&mut self, expr: &Expression) -> Result<Value> {
        ensure_sufficient_stack(|| self.evaluate_inner(expr))
    }

    fn evaluate_inner(&mut self, expr: &Expression) -> Result<Value> {
        match expr {
            Expression::IntLiteral(n) => Ok(Value::Int(*n)),
            Expression::StringLiteral(s) => Ok(Value::String(s.clone())),
            Expression::BoolLiteral(b) => Ok(Value::Bool(*b)),
            Expression::NilLiteral => Ok(Value::Nil),

            Expression::Variable(name) => self.env.lookup(name),

            Expression::Call { name, args } => self.call(name, args),

            Expression::Unary { op, operand } => {
                let value = self.evaluate_expression(operand)?;
                apply_unary(*op, &value)
            }

            Expression::Binary { op, left, right } => {
                let left = self.evaluate_expression(left)?;
                let right = self.evaluate_expression(right)?;
                apply_binary(*op, &left, &right)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::BinaryOp;
    use crate::runtime::BufferedConsole;

    fn var(name: &str) -> Expression {
        Expression::Variable(name.to_string())
    }

    fn assign(name: &str, expression: Expression) -> Assignment {
        Assignment {
            name: name.to_string(),
            expression,
        }
    }

    fn main_with(statements: Vec<Statement>) -> Program {
        Program {
            functions: vec![FunctionDef {
                name: "main".to_string(),
                params: vec![],
                statements,
            }],
        }
    }

    fn run(program: &Program) -> (Result<Value>, Vec<String>) {
        let mut evaluator = Evaluator::new(BufferedConsole::new());
        let result = evaluator.run(program);
        assert_eq!(evaluator.environment().call_depth(), 0);
        (result, evaluator.into_console().take_outputs())
    }

    #[test]
    fn test_missing_main() {
        let program = Program { functions: vec![] };
        let (result, _) = run(&program);
        assert_eq!(
            result,
            Err(Error::UndefinedFunction {
                name: "main".to_string(),
                arity: 0
            })
        );
    }

    #[test]
    fn test_main_return_value() {
        let program = main_with(vec![Statement::Return {
            expression: Some(Expression::binary(
                BinaryOp::Mul,
                Expression::IntLiteral(6),
                Expression::IntLiteral(7),
            )),
        }]);
        assert_eq!(run(&program).0, Ok(Value::Int(42)));
    }

    #[test]
    fn test_var_defaults_to_zero() {
        let program = main_with(vec![
            Statement::VarDef {
                name: "x".to_string(),
            },
            Statement::Return {
                expression: Some(var("x")),
            },
        ]);
        assert_eq!(run(&program).0, Ok(Value::Int(0)));
    }

    #[test]
    fn test_bare_return_yields_nil() {
        let program = main_with(vec![
            Statement::Return { expression: None },
            Statement::Call {
                name: "print".to_string(),
                args: vec![Expression::StringLiteral("unreachable".to_string())],
            },
        ]);
        let (result, outputs) = run(&program);
        assert_eq!(result, Ok(Value::Nil));
        assert!(outputs.is_empty());
    }

    #[test]
    fn test_for_loop_skips_update_on_return() {
        // var i; for (i = 0; i < 10; i = i + 1) { if (i == 2) { return i; } }
        let program = main_with(vec![
            Statement::VarDef {
                name: "i".to_string(),
            },
            Statement::For {
                init: assign("i", Expression::IntLiteral(0)),
                condition: Expression::binary(BinaryOp::Lt, var("i"), Expression::IntLiteral(10)),
                update: assign(
                    "i",
                    Expression::binary(BinaryOp::Add, var("i"), Expression::IntLiteral(1)),
                ),
                statements: vec![Statement::If {
                    condition: Expression::binary(
                        BinaryOp::Eq,
                        var("i"),
                        Expression::IntLiteral(2),
                    ),
                    statements: vec![Statement::Return {
                        expression: Some(var("i")),
                    }],
                    else_statements: None,
                }],
            },
        ]);
        assert_eq!(run(&program).0, Ok(Value::Int(2)));
    }

    #[test]
    fn test_non_boolean_condition() {
        let program = main_with(vec![Statement::If {
            condition: Expression::IntLiteral(1),
            statements: vec![],
            else_statements: None,
        }]);
        let err = run(&program).0.unwrap_err();
        assert!(err.is_type_error());
    }

    #[test]
    fn test_call_depth_limit() {
        let program = Program {
            functions: vec![FunctionDef {
                name: "main".to_string(),
                params: vec![],
                statements: vec![Statement::Call {
                    name: "main".to_string(),
                    args: vec![],
                }],
            }],
        };
        let config = EvaluatorConfig {
            max_call_depth: 16,
            ..EvaluatorConfig::default()
        };
        let mut evaluator = Evaluator::with_config(BufferedConsole::new(), config);
        assert_eq!(
            evaluator.run(&program),
            Err(Error::CallDepthExceeded { limit: 16 })
        );
        assert_eq!(evaluator.environment().call_depth(), 0);
    }

    #[test]
    fn test_default_depth_limit_holds_on_spawned_thread() {
        // f(n) recurses without a base case
        let program = Program {
            functions: vec![
                FunctionDef {
                    name: "f".to_string(),
                    params: vec!["n".to_string()],
                    statements: vec![Statement::Return {
                        expression: Some(Expression::binary(
                            BinaryOp::Add,
                            Expression::Call {
                                name: "f".to_string(),
                                args: vec![Expression::binary(
                                    BinaryOp::Add,
                                    var("n"),
                                    Expression::IntLiteral(1),
                                )],
                            },
                            Expression::IntLiteral(1),
                        )),
                    }],
                },
                FunctionDef {
                    name: "main".to_string(),
                    params: vec![],
                    statements: vec![Statement::Return {
                        expression: Some(Expression::Call {
                            name: "f".to_string(),
                            args: vec![Expression::IntLiteral(0)],
                        }),
                    }],
                },
            ],
        };

        let result = std::thread::spawn(move || run(&program).0).join().unwrap();
        assert_eq!(
            result,
            Err(Error::CallDepthExceeded {
                limit: EvaluatorConfig::default().max_call_depth
            })
        );
    }

    /// Evaluator with one active frame holding `i` and `x`
    fn evaluator_in_frame() -> Evaluator<BufferedConsole> {
        let mut evaluator = Evaluator::new(BufferedConsole::new());
        evaluator.env.enter_call();
        evaluator.env.declare("i", Value::Int(0)).unwrap();
        evaluator.env.declare("x", Value::Int(0)).unwrap();
        evaluator
    }

    fn counting_loop(bound: i64, statements: Vec<Statement>) -> Statement {
        Statement::For {
            init: assign("i", Expression::IntLiteral(0)),
            condition: Expression::binary(BinaryOp::Lt, var("i"), Expression::IntLiteral(bound)),
            update: assign(
                "i",
                Expression::binary(BinaryOp::Add, var("i"), Expression::IntLiteral(1)),
            ),
            statements,
        }
    }

    fn when(condition: Expression, statements: Vec<Statement>) -> Statement {
        Statement::If {
            condition,
            statements,
            else_statements: None,
        }
    }

    #[test]
    fn test_return_through_nested_blocks_restores_scopes() {
        let mut evaluator = evaluator_in_frame();
        let before = evaluator.env.block_depth();

        // for (...) { if (i > 1) { if (i == 3) { var t; return i; } } }
        let nest = counting_loop(
            10,
            vec![when(
                Expression::binary(BinaryOp::Gt, var("i"), Expression::IntLiteral(1)),
                vec![when(
                    Expression::binary(BinaryOp::Eq, var("i"), Expression::IntLiteral(3)),
                    vec![
                        Statement::VarDef {
                            name: "t".to_string(),
                        },
                        Statement::Return {
                            expression: Some(var("i")),
                        },
                    ],
                )],
            )],
        );

        let flow = evaluator.execute_statement(&nest).unwrap();
        assert_eq!(flow, Flow::Returned(Value::Int(3)));
        assert_eq!(evaluator.env.block_depth(), before);
        assert!(evaluator.env.lookup("t").is_err());
    }

    #[test]
    fn test_loop_exit_on_false_condition_restores_scopes() {
        let mut evaluator = evaluator_in_frame();
        let before = evaluator.env.block_depth();

        let body = vec![Statement::VarDef {
            name: "t".to_string(),
        }];
        let flow = evaluator.execute_statement(&counting_loop(4, body)).unwrap();
        assert_eq!(flow, Flow::Completed);
        assert_eq!(evaluator.env.block_depth(), before);

        // Condition false on entry: no iteration at all
        let flow = evaluator.execute_statement(&counting_loop(0, vec![])).unwrap();
        assert!(!flow.is_returned());
        assert_eq!(evaluator.env.block_depth(), before);
    }

    #[test]
    fn test_error_mid_block_restores_scopes() {
        let mut evaluator = evaluator_in_frame();
        let before = evaluator.env.block_depth();

        // x = 1 + "a"; raised two blocks deep inside the loop body
        let failing = assign(
            "x",
            Expression::binary(
                BinaryOp::Add,
                Expression::IntLiteral(1),
                Expression::StringLiteral("a".to_string()),
            ),
        );
        let nest = counting_loop(
            5,
            vec![when(
                Expression::BoolLiteral(true),
                vec![
                    Statement::VarDef {
                        name: "t".to_string(),
                    },
                    Statement::Assign(failing),
                ],
            )],
        );

        let err = evaluator.execute_statement(&nest).unwrap_err();
        assert!(err.is_type_error());
        assert_eq!(evaluator.env.block_depth(), before);

        // Non-boolean loop condition fails inside the iteration scope
        let bad_condition = Statement::For {
            init: assign("i", Expression::IntLiteral(0)),
            condition: var("i"),
            update: assign("i", var("i")),
            statements: vec![],
        };
        assert!(evaluator.execute_statement(&bad_condition).is_err());
        assert_eq!(evaluator.env.block_depth(), before);
    }

    #[test]
    fn test_flow_helpers() {
        assert!(Flow::Returned(Value::Nil).is_returned());
        assert!(!Flow::Completed.is_returned());
        assert_eq!(Flow::Completed.into_value(), Value::Nil);
        assert_eq!(Flow::Returned(Value::Int(3)).into_value(), Value::Int(3));
    }
}
