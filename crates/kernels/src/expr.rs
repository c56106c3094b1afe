//! Expression Trees
//!
//! A small AST over slice operands. Evaluation walks the tree bottom-up and
//! runs each node through the dispatched slice kernel, so an expression uses
//! whichever variants the running processor selected.
//!
//! # Example
//! ```
//! use multiver_kernels::Expr;
//!
//! // (x0 + x1) * 0.5
//! let mean = (Expr::input(0) + Expr::input(1)) * Expr::splat(0.5);
//! let out = mean.evaluate(&[&[1.0, 2.0], &[3.0, 6.0]]).unwrap();
//! assert_eq!(out, vec![2.0, 4.0]);
//! ```

use std::fmt;

use thiserror::Error;

use crate::{approx, ops};

/// Single-operand node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Abs,
    Sqrt,
    /// Approximate reciprocal, see [`approx`](crate::approx).
    Rcp,
    /// Approximate reciprocal square root.
    Rsqrt,
}

/// Two-operand node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Max,
}

impl UnaryOp {
    /// Run the dispatched kernel for this node kind.
    pub fn apply(self, input: &[f32], output: &mut [f32]) {
        match self {
            UnaryOp::Neg => ops::neg_f32(input, output),
            UnaryOp::Abs => ops::abs_f32(input, output),
            UnaryOp::Sqrt => ops::sqrt_f32(input, output),
            UnaryOp::Rcp => approx::rcp_f32(input, output),
            UnaryOp::Rsqrt => approx::rsqrt_f32(input, output),
        }
    }

    fn name(self) -> &'static str {
        match self {
            UnaryOp::Neg => "neg",
            UnaryOp::Abs => "abs",
            UnaryOp::Sqrt => "sqrt",
            UnaryOp::Rcp => "rcp",
            UnaryOp::Rsqrt => "rsqrt",
        }
    }
}

impl BinaryOp {
    /// Run the dispatched kernel for this node kind.
    pub fn apply(self, a: &[f32], b: &[f32], output: &mut [f32]) {
        match self {
            BinaryOp::Add => ops::add_f32(a, b, output),
            BinaryOp::Sub => ops::sub_f32(a, b, output),
            BinaryOp::Mul => ops::mul_f32(a, b, output),
            BinaryOp::Div => ops::div_f32(a, b, output),
            BinaryOp::Min => ops::min_f32(a, b, output),
            BinaryOp::Max => ops::max_f32(a, b, output),
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Min => "min",
            BinaryOp::Max => "max",
        }
    }
}

/// Expression evaluation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("expression reads input {index}, but only {available} inputs were given")]
    InputOutOfRange { index: usize, available: usize },

    #[error("input {index} has {len} elements, expected {expected}")]
    LengthMismatch {
        index: usize,
        len: usize,
        expected: usize,
    },

    #[error("at least one input is needed to fix the evaluation length")]
    NoInputs,
}

/// Element-wise expression over `f32` slices.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// The input slice at this index.
    Input(usize),
    /// A constant broadcast to every element.
    Splat(f32),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn input(index: usize) -> Self {
        Expr::Input(index)
    }

    pub fn splat(value: f32) -> Self {
        Expr::Splat(value)
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary(op, Box::new(operand))
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn abs(self) -> Self {
        Self::unary(UnaryOp::Abs, self)
    }

    pub fn sqrt(self) -> Self {
        Self::unary(UnaryOp::Sqrt, self)
    }

    pub fn rcp(self) -> Self {
        Self::unary(UnaryOp::Rcp, self)
    }

    pub fn rsqrt(self) -> Self {
        Self::unary(UnaryOp::Rsqrt, self)
    }

    pub fn min(self, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Min, self, rhs)
    }

    pub fn max(self, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Max, self, rhs)
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        match self {
            Expr::Input(_) | Expr::Splat(_) => 1,
            Expr::Unary(_, operand) => 1 + operand.node_count(),
            Expr::Binary(_, lhs, rhs) => 1 + lhs.node_count() + rhs.node_count(),
        }
    }

    /// Evaluate over `inputs`, which must all have the same length.
    pub fn evaluate(&self, inputs: &[&[f32]]) -> Result<Vec<f32>, ExprError> {
        let len = inputs.first().ok_or(ExprError::NoInputs)?.len();
        if let Some((index, input)) = inputs.iter().enumerate().find(|(_, i)| i.len() != len) {
            return Err(ExprError::LengthMismatch {
                index,
                len: input.len(),
                expected: len,
            });
        }
        self.eval_node(inputs, len)
    }

    fn eval_node(&self, inputs: &[&[f32]], len: usize) -> Result<Vec<f32>, ExprError> {
        match self {
            Expr::Input(index) => inputs
                .get(*index)
                .map(|input| input.to_vec())
                .ok_or(ExprError::InputOutOfRange {
                    index: *index,
                    available: inputs.len(),
                }),
            Expr::Splat(value) => Ok(vec![*value; len]),
            Expr::Unary(op, operand) => {
                let x = operand.eval_node(inputs, len)?;
                let mut out = vec![0.0; len];
                op.apply(&x, &mut out);
                Ok(out)
            }
            Expr::Binary(op, lhs, rhs) => {
                let a = lhs.eval_node(inputs, len)?;
                let b = rhs.eval_node(inputs, len)?;
                let mut out = vec![0.0; len];
                op.apply(&a, &b, &mut out);
                Ok(out)
            }
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Add, self, rhs)
    }
}

impl std::ops::Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Sub, self, rhs)
    }
}

impl std::ops::Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Mul, self, rhs)
    }
}

impl std::ops::Div for Expr {
    type Output = Expr;

    fn div(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Div, self, rhs)
    }
}

impl std::ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::unary(UnaryOp::Neg, self)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Input(index) => write!(f, "x{index}"),
            Expr::Splat(value) => write!(f, "{value}"),
            Expr::Unary(op, operand) => write!(f, "{}({operand})", op.name()),
            Expr::Binary(op @ (BinaryOp::Min | BinaryOp::Max), lhs, rhs) => {
                write!(f, "{}({lhs}, {rhs})", op.symbol())
            }
            Expr::Binary(op, lhs, rhs) => write!(f, "({lhs} {} {rhs})", op.symbol()),
        }
    }
}
