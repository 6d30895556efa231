use std::{fmt, mem, rc::Rc};

use thiserror::Error;

use crate::{
    ast::{
        AssignExpr, BinaryExpr, BlockStmt, Expr, ExprVisitor, ExpressionStmt, GroupingExpr,
        LiteralExpr, PrintStmt, Stmt, StmtVisitor, UnaryExpr, VarStmt, VariableExpr,
    },
    environment::Environment,
    token::{LiteralValue, Token, TokenType},
};

/// A runtime value. Closed tagged union; every operator branches on the
/// tag explicitly, there is no implicit coercion anywhere.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(Rc<String>),
}

impl Value {
    /// Nil is falsy, a Bool is itself, everything else is truthy —
    /// including `0` and the empty string.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(value) => *value,
            _ => true,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Value::*;
        match self {
            Nil => write!(f, "nil"),
            Bool(value) => write!(f, "{}", value),
            Number(value) => write!(f, "{}", value),
            String(value) => write!(f, "{}", value),
        }
    }
}

/// A dynamic evaluation failure. Carries the offending token so the driver
/// can attribute the error to a source line. The first of these aborts the
/// rest of the current `interpret` run.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct RuntimeError {
    pub message: String,
    pub token: Token,
}

/// Where `print` output goes. The buffer variant exists so tests and
/// embedders can capture program output instead of claiming stdout.
pub enum OutputSink {
    Stdout,
    Buffer(String),
}

impl OutputSink {
    fn println(&mut self, message: &str) {
        match self {
            OutputSink::Stdout => println!("{}", message),
            OutputSink::Buffer(buffer) => {
                buffer.push_str(message);
                buffer.push('\n');
            }
        }
    }
}

pub struct Interpreter {
    environment: Box<Environment>,
    output: OutputSink,
}

impl Interpreter {
    pub fn new() -> Interpreter {
        Interpreter::with_output(OutputSink::Stdout)
    }

    pub fn with_output(output: OutputSink) -> Interpreter {
        Interpreter {
            environment: Box::new(Environment::new()),
            output,
        }
    }

    /// Captured output so far; empty when printing straight to stdout.
    pub fn output(&self) -> &str {
        match &self.output {
            OutputSink::Stdout => "",
            OutputSink::Buffer(buffer) => buffer,
        }
    }

    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        for statement in statements {
            self.execute(statement)?;
        }

        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        stmt.accept(self)
    }

    fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Box<Environment>,
    ) -> Result<(), RuntimeError> {
        let enclosing = mem::replace(&mut self.environment, environment);
        self.environment.set_enclosing(enclosing);

        let mut result = Ok(());

        for statement in statements {
            if let Err(err) = self.execute(statement) {
                result = Err(err);
                break;
            }
        }

        // Restore on every exit path; a propagating error must not leave
        // the block's scope installed.
        self.environment = self.environment.take_enclosing();

        result
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        expr.accept(self)
    }

    fn evaluate_optional(&mut self, expr: &Option<Expr>) -> Result<Value, RuntimeError> {
        match expr {
            None => Ok(Value::Nil),
            Some(expr) => self.evaluate(expr),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

impl StmtVisitor<Result<(), RuntimeError>> for Interpreter {
    fn visit_expression_stmt(&mut self, stmt: &ExpressionStmt) -> Result<(), RuntimeError> {
        self.evaluate(&stmt.expression).map(|_| ())
    }

    fn visit_print_stmt(&mut self, stmt: &PrintStmt) -> Result<(), RuntimeError> {
        let value = self.evaluate(&stmt.expression)?;
        self.output.println(&value.to_string());
        Ok(())
    }

    fn visit_var_stmt(&mut self, stmt: &VarStmt) -> Result<(), RuntimeError> {
        let value = self.evaluate_optional(&stmt.initializer)?;
        self.environment.define(&stmt.name.lexeme, value);
        Ok(())
    }

    fn visit_block_stmt(&mut self, stmt: &BlockStmt) -> Result<(), RuntimeError> {
        self.execute_block(&stmt.statements, Box::new(Environment::new()))
    }
}

impl ExprVisitor<Result<Value, RuntimeError>> for Interpreter {
    fn visit_literal_expr(&mut self, expr: &LiteralExpr) -> Result<Value, RuntimeError> {
        use LiteralValue::*;
        Ok(match &expr.value {
            Nil => Value::Nil,
            Bool(value) => Value::Bool(*value),
            Number(value) => Value::Number(*value),
            String(value) => Value::String(Rc::new(value.clone())),
        })
    }

    fn visit_grouping_expr(&mut self, expr: &GroupingExpr) -> Result<Value, RuntimeError> {
        self.evaluate(&expr.expression)
    }

    fn visit_unary_expr(&mut self, expr: &UnaryExpr) -> Result<Value, RuntimeError> {
        let operand = self.evaluate(&expr.expression)?;
        Ok(match expr.operator.token_type {
            TokenType::Bang => Value::Bool(!operand.is_truthy()),
            TokenType::Minus => {
                let operand = check_numeric_operand(&expr.operator, &operand)?;
                Value::Number(-operand)
            }
            _ => unreachable!(),
        })
    }

    fn visit_binary_expr(&mut self, expr: &BinaryExpr) -> Result<Value, RuntimeError> {
        let left = self.evaluate(&expr.left)?;
        let right = self.evaluate(&expr.right)?;

        Ok(match expr.operator.token_type {
            TokenType::Plus => match (&left, &right) {
                (Value::Number(left), Value::Number(right)) => Value::Number(left + right),
                (Value::String(left), Value::String(right)) => {
                    Value::String(Rc::new(format!("{}{}", left, right)))
                }
                _ => {
                    return Err(RuntimeError {
                        message: "Operands must be two numbers or two strings.".to_string(),
                        token: expr.operator.clone(),
                    });
                }
            },
            TokenType::Minus => {
                let (left, right) = check_numeric_operands(&expr.operator, &left, &right)?;
                Value::Number(left - right)
            }
            TokenType::Slash => {
                let (left, right) = check_numeric_operands(&expr.operator, &left, &right)?;
                Value::Number(left / right)
            }
            TokenType::Star => {
                let (left, right) = check_numeric_operands(&expr.operator, &left, &right)?;
                Value::Number(left * right)
            }
            TokenType::EqualEqual => Value::Bool(left == right),
            TokenType::BangEqual => Value::Bool(left != right),
            TokenType::Less => {
                let (left, right) = check_numeric_operands(&expr.operator, &left, &right)?;
                Value::Bool(left < right)
            }
            TokenType::LessEqual => {
                let (left, right) = check_numeric_operands(&expr.operator, &left, &right)?;
                Value::Bool(left <= right)
            }
            TokenType::Greater => {
                let (left, right) = check_numeric_operands(&expr.operator, &left, &right)?;
                Value::Bool(left > right)
            }
            TokenType::GreaterEqual => {
                let (left, right) = check_numeric_operands(&expr.operator, &left, &right)?;
                Value::Bool(left >= right)
            }
            _ => unreachable!(),
        })
    }

    fn visit_variable_expr(&mut self, expr: &VariableExpr) -> Result<Value, RuntimeError> {
        self.environment.get(&expr.name)
    }

    fn visit_assign_expr(&mut self, expr: &AssignExpr) -> Result<Value, RuntimeError> {
        let value = self.evaluate(&expr.value)?;
        self.environment.assign(&expr.name, value.clone())?;
        // Assignment is an expression; it evaluates to the assigned value.
        Ok(value)
    }
}

fn check_numeric_operand(operator: &Token, operand: &Value) -> Result<f64, RuntimeError> {
    if let Value::Number(value) = *operand {
        return Ok(value);
    }

    Err(RuntimeError {
        message: "Operand must be a number.".to_string(),
        token: operator.clone(),
    })
}

fn check_numeric_operands(
    operator: &Token,
    left_operand: &Value,
    right_operand: &Value,
) -> Result<(f64, f64), RuntimeError> {
    if let Value::Number(left_value) = *left_operand {
        if let Value::Number(right_value) = *right_operand {
            return Ok((left_value, right_value));
        }
    }

    Err(RuntimeError {
        message: "Operands must be numbers.".to_string(),
        token: operator.clone(),
    })
}
