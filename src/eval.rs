//! Tree-walking evaluator.

use std::io;
use std::io::prelude::*;
use std::rc::Rc;

use thiserror::Error;

use crate::ast::{Expr, Stmt};
use crate::ctx::Symbol;
use crate::diag::Position;
use crate::env::Env;
use crate::value::Value;

/// An error that aborts evaluation of the current program.
///
/// `Display` renders the runtime diagnostic format: the message on one
/// line, the offending line number on the next.
#[derive(Debug, Error)]
#[error("{kind}\n[line {pos}]")]
pub struct RuntimeError {
    pub pos: Position,
    pub kind: RuntimeErrorKind,
}

impl RuntimeError {
    fn new(pos: Position, kind: RuntimeErrorKind) -> RuntimeError {
        RuntimeError { pos, kind }
    }
}

#[derive(Debug, Error)]
pub enum RuntimeErrorKind {
    #[error("Operand must be a number.")]
    OperandNotNumber,
    #[error("Operands must be numbers.")]
    OperandsNotNumbers,
    #[error("Operands must be two numbers or two strings.")]
    OperandsNotAddable,
    #[error("Undefined variable '{0}'.")]
    UndefinedVariable(Symbol),
    #[error("I/O error: {0}")]
    Io(io::Error),
}

/// Evaluates statements against a scope chain rooted at the globals.
///
/// The evaluator owns the global environment, so variables persist across
/// [`Evaluator::eval_program`] calls; printed values go to the output sink.
#[derive(Debug)]
pub struct Evaluator<'t, W: Write> {
    output: &'t mut W,
    globals: Rc<Env>,
}

impl<'t, W: Write> Evaluator<'t, W> {
    pub fn new(output: &'t mut W) -> Evaluator<'t, W> {
        Evaluator {
            output,
            globals: Env::new(),
        }
    }

    /// Runs `stmts` in source order in the global scope, stopping at the
    /// first runtime error.
    pub fn eval_program(&mut self, stmts: &[Stmt]) -> Result<(), RuntimeError> {
        self.eval_stmts(stmts, self.globals.clone())
    }

    fn eval_stmts(&mut self, stmts: &[Stmt], env: Rc<Env>) -> Result<(), RuntimeError> {
        for stmt in stmts {
            self.eval_stmt(stmt, env.clone())?;
        }
        Ok(())
    }

    fn eval_stmt(&mut self, stmt: &Stmt, env: Rc<Env>) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::Expr(e) => {
                self.eval_expr(e, env)?;
            }
            Stmt::Print(pos, e) => {
                let v = self.eval_expr(e, env)?;
                writeln!(self.output, "{}", v)
                    .map_err(|e| RuntimeError::new(*pos, RuntimeErrorKind::Io(e)))?;
            }
            Stmt::VarDecl(sym, init) => {
                let val = self.eval_expr(init, env.clone())?;
                env.define(sym, val);
            }
            // The block body runs in a fresh child environment.  Passing the
            // child down by argument restores the enclosing scope on every
            // exit path, error propagation included.
            Stmt::Block(stmts) => {
                self.eval_stmts(stmts, Env::with_parent(Some(env)))?;
            }
        };
        Ok(())
    }

    fn eval_expr(&mut self, expr: &Expr, env: Rc<Env>) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Nil => Ok(Value::Nil),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Var(pos, sym) => env.get(sym).ok_or_else(|| {
                RuntimeError::new(*pos, RuntimeErrorKind::UndefinedVariable(sym.clone()))
            }),
            Expr::Assign(pos, sym, rhs) => {
                let val = self.eval_expr(rhs, env.clone())?;
                env.assign(sym, val.clone()).map_err(|()| {
                    RuntimeError::new(*pos, RuntimeErrorKind::UndefinedVariable(sym.clone()))
                })?;
                Ok(val)
            }
            Expr::Not(e) => Ok(Value::Bool(!self.eval_expr(e, env)?.is_truthy())),
            Expr::UnaryMinus(pos, e) => match self.eval_expr(e, env)? {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(RuntimeError::new(*pos, RuntimeErrorKind::OperandNotNumber)),
            },
            Expr::Add(pos, lhs, rhs) => {
                let l = self.eval_expr(lhs, env.clone())?;
                let r = self.eval_expr(rhs, env)?;
                match (l, r) {
                    (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
                    (Value::Str(l), Value::Str(r)) => Ok(Value::Str(l + &r)),
                    _ => Err(RuntimeError::new(*pos, RuntimeErrorKind::OperandsNotAddable)),
                }
            }
            Expr::Sub(pos, lhs, rhs) => {
                let (l, r) = self.numeric_operands(*pos, lhs, rhs, env)?;
                Ok(Value::Number(l - r))
            }
            Expr::Mul(pos, lhs, rhs) => {
                let (l, r) = self.numeric_operands(*pos, lhs, rhs, env)?;
                Ok(Value::Number(l * r))
            }
            Expr::Div(pos, lhs, rhs) => {
                // IEEE semantics: dividing by zero yields an infinity.
                let (l, r) = self.numeric_operands(*pos, lhs, rhs, env)?;
                Ok(Value::Number(l / r))
            }
            Expr::Equal(lhs, rhs) => {
                let l = self.eval_expr(lhs, env.clone())?;
                let r = self.eval_expr(rhs, env)?;
                Ok(Value::Bool(l == r))
            }
            Expr::NotEqual(lhs, rhs) => {
                let l = self.eval_expr(lhs, env.clone())?;
                let r = self.eval_expr(rhs, env)?;
                Ok(Value::Bool(l != r))
            }
            Expr::Less(pos, lhs, rhs) => {
                let (l, r) = self.numeric_operands(*pos, lhs, rhs, env)?;
                Ok(Value::Bool(l < r))
            }
            Expr::LessEqual(pos, lhs, rhs) => {
                let (l, r) = self.numeric_operands(*pos, lhs, rhs, env)?;
                Ok(Value::Bool(l <= r))
            }
            Expr::Greater(pos, lhs, rhs) => {
                let (l, r) = self.numeric_operands(*pos, lhs, rhs, env)?;
                Ok(Value::Bool(l > r))
            }
            Expr::GreaterEqual(pos, lhs, rhs) => {
                let (l, r) = self.numeric_operands(*pos, lhs, rhs, env)?;
                Ok(Value::Bool(l >= r))
            }
            Expr::Group(e) => self.eval_expr(e, env),
        }
    }

    /// Evaluates both operands, left before right, and requires numbers.
    fn numeric_operands(
        &mut self,
        pos: Position,
        lhs: &Expr,
        rhs: &Expr,
        env: Rc<Env>,
    ) -> Result<(f64, f64), RuntimeError> {
        let l = self.eval_expr(lhs, env.clone())?;
        let r = self.eval_expr(rhs, env)?;
        match (l, r) {
            (Value::Number(l), Value::Number(r)) => Ok((l, r)),
            _ => Err(RuntimeError::new(pos, RuntimeErrorKind::OperandsNotNumbers)),
        }
    }
}
