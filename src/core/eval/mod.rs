//! Constant expression evaluator.
//!
//! [`Evaluator::evaluate`] reduces an expression to a [`Value`] when it is a
//! compile-time constant and returns `Ok(None)` otherwise. Non-constancy is
//! the normal outcome for most runtime text and is never an error; only an
//! operator that cannot interpret operands it claims to support yields
//! [`EvalError::InternalConsistency`].
//!
//! Dispatch goes through a table keyed by [`ExprKind`]. Kinds without a
//! handler evaluate to "not constant", so new node kinds can be supported by
//! registering a handler without touching the traversal.
//!
//! ```ignore
//! let evaluator = Evaluator::new();
//! // "Hello, " + "world"
//! assert_eq!(evaluator.evaluate(&expr)?, Some(Value::Text("Hello, world".into())));
//! ```

mod numeric;
mod value;

use std::collections::HashMap;

use thiserror::Error;

use crate::core::ast::{CastType, Expr, ExprKind, ExprNode, IntLiteral, Literal};

pub use numeric::{apply_binary, apply_unary};
pub use value::{IntValue, IntWidth, Value};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EvalError {
    /// An operator accepted its operand types but could not interpret them.
    #[error("internal evaluator inconsistency: {0}")]
    InternalConsistency(String),
}

/// `Ok(None)` means the expression is not a compile-time constant.
pub type EvalResult = Result<Option<Value>, EvalError>;

/// Per-kind evaluation handler.
pub type Handler = fn(&Evaluator, &Expr) -> EvalResult;

pub struct Evaluator {
    handlers: HashMap<ExprKind, Handler>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    /// Evaluator with handlers for literals, operators, conditionals and casts.
    pub fn new() -> Self {
        let mut evaluator = Self::empty();
        evaluator.register(ExprKind::Literal, eval_literal);
        evaluator.register(ExprKind::Binary, eval_binary);
        evaluator.register(ExprKind::Unary, eval_unary);
        evaluator.register(ExprKind::Conditional, eval_conditional);
        evaluator.register(ExprKind::Cast, eval_cast);
        evaluator
    }

    /// Evaluator with no handlers; every expression is non-constant.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Install or replace the handler for a node kind.
    pub fn register(&mut self, kind: ExprKind, handler: Handler) {
        self.handlers.insert(kind, handler);
    }

    pub fn with_handler(mut self, kind: ExprKind, handler: Handler) -> Self {
        self.register(kind, handler);
        self
    }

    pub fn evaluate(&self, expr: &Expr) -> EvalResult {
        match self.handlers.get(&expr.kind()) {
            Some(handler) => handler(self, expr),
            None => Ok(None),
        }
    }

    /// Evaluate and keep only text results.
    pub fn evaluate_text(&self, expr: &Expr) -> Result<Option<String>, EvalError> {
        Ok(self.evaluate(expr)?.and_then(Value::into_text))
    }
}

fn eval_literal(_: &Evaluator, expr: &Expr) -> EvalResult {
    let ExprNode::Literal(literal) = &expr.node else {
        return Ok(None);
    };
    Ok(match literal {
        Literal::Text(text) => Some(Value::Text(text.clone())),
        Literal::Char(c) => Some(Value::Char(*c)),
        Literal::Bool(b) => Some(Value::Bool(*b)),
        Literal::Int(IntLiteral::Int(v)) => Some(Value::Int(IntValue::int(*v))),
        Literal::Int(IntLiteral::Long(v)) => Some(Value::Int(IntValue::long(*v))),
        Literal::Float(_) | Literal::Null => None,
    })
}

fn eval_binary(evaluator: &Evaluator, expr: &Expr) -> EvalResult {
    let ExprNode::Binary { op, lhs, rhs } = &expr.node else {
        return Ok(None);
    };
    let Some(lhs) = evaluator.evaluate(lhs)? else {
        return Ok(None);
    };
    let Some(rhs) = evaluator.evaluate(rhs)? else {
        return Ok(None);
    };
    apply_binary(*op, &lhs, &rhs)
}

fn eval_unary(evaluator: &Evaluator, expr: &Expr) -> EvalResult {
    let ExprNode::Unary { op, operand } = &expr.node else {
        return Ok(None);
    };
    match evaluator.evaluate(operand)? {
        Some(value) => apply_unary(*op, &value),
        None => Ok(None),
    }
}

/// Only a constant boolean condition resolves; the untaken branch is never evaluated.
fn eval_conditional(evaluator: &Evaluator, expr: &Expr) -> EvalResult {
    let ExprNode::Conditional {
        condition,
        then_branch,
        else_branch,
    } = &expr.node
    else {
        return Ok(None);
    };
    match evaluator.evaluate(condition)? {
        Some(Value::Bool(true)) => evaluator.evaluate(then_branch),
        Some(Value::Bool(false)) => evaluator.evaluate(else_branch),
        _ => Ok(None),
    }
}

fn eval_cast(evaluator: &Evaluator, expr: &Expr) -> EvalResult {
    let ExprNode::Cast { target, operand } = &expr.node else {
        return Ok(None);
    };
    let Some(value) = evaluator.evaluate(operand)? else {
        return Ok(None);
    };
    let width = match target {
        CastType::String => return Ok(value.as_text().map(|_| value.clone())),
        CastType::Char => {
            return Ok(value.as_int().map(|v| Value::Char(v.get() as u16)));
        }
        CastType::Byte => IntWidth::W8,
        CastType::Short => IntWidth::W16,
        CastType::Int => IntWidth::W32,
        CastType::Long => IntWidth::W64,
        CastType::Other(_) => return Ok(None),
    };
    Ok(value.as_int().map(|v| Value::Int(v.cast(width))))
}
