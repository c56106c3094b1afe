//! # multiver-kernels
//!
//! Reference kernels built on `multiver-dispatch`.
//!
//! - [`ops`]: element-wise slice kernels (arithmetic, integer, bitwise,
//!   comparison), written once and compiled per profile
//! - [`lane_ops`]: the same operations on a single [`Vector`]
//! - [`approx`]: hand-written approximate `rcp`/`rsqrt` whose variants differ
//!   within a documented ULP bound
//! - [`expr`]: small expression trees evaluated with the dispatched kernels
//! - [`consistency`]: checks every supported variant against the baseline
//! - [`catalog`]: every dispatched operation, for diagnostics
//!
//! ## Example
//!
//! ```
//! use multiver_kernels::ops;
//!
//! let mut out = [0.0; 4];
//! ops::add_f32(&[1.0, 2.0, 3.0, 4.0], &[4.0, 3.0, 2.0, 1.0], &mut out);
//! assert_eq!(out, [5.0; 4]);
//! ```

pub mod accuracy;
pub mod approx;
pub mod catalog;
pub mod consistency;
pub mod expr;
pub mod lane_ops;
pub mod lanes;
pub mod ops;

mod helpers;

pub use accuracy::{max_ulp_error, ulp_distance};
pub use catalog::operations;
pub use consistency::{check_all, VariantCheck};
pub use expr::{BinaryOp, Expr, ExprError, UnaryOp};
pub use lanes::{F32x4, F32x8, I32x4, U32x4, Vector};
