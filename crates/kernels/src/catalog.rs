//! Every dispatched operation in the crate, for diagnostics.

use multiver_dispatch::OperationInfo;

use crate::{approx, lane_ops, ops};

static OPERATIONS: [&dyn OperationInfo; 30] = [
    &ops::add_f32::DISPATCHER,
    &ops::sub_f32::DISPATCHER,
    &ops::mul_f32::DISPATCHER,
    &ops::div_f32::DISPATCHER,
    &ops::fma_f32::DISPATCHER,
    &ops::min_f32::DISPATCHER,
    &ops::max_f32::DISPATCHER,
    &ops::sqrt_f32::DISPATCHER,
    &ops::abs_f32::DISPATCHER,
    &ops::neg_f32::DISPATCHER,
    &ops::add_i32::DISPATCHER,
    &ops::sub_i32::DISPATCHER,
    &ops::and_u32::DISPATCHER,
    &ops::or_u32::DISPATCHER,
    &ops::xor_u32::DISPATCHER,
    &ops::not_u32::DISPATCHER,
    &ops::cmp_lt_f32::DISPATCHER,
    &ops::cmp_eq_f32::DISPATCHER,
    &lane_ops::add_f32x4::DISPATCHER,
    &lane_ops::sub_f32x4::DISPATCHER,
    &lane_ops::mul_f32x4::DISPATCHER,
    &lane_ops::min_f32x4::DISPATCHER,
    &lane_ops::max_f32x4::DISPATCHER,
    &lane_ops::add_i32x4::DISPATCHER,
    &lane_ops::and_u32x4::DISPATCHER,
    &lane_ops::or_u32x4::DISPATCHER,
    &lane_ops::xor_u32x4::DISPATCHER,
    &lane_ops::not_u32x4::DISPATCHER,
    &approx::RCP,
    &approx::RSQRT,
];

/// All operations, in a stable order: slice kernels, lane kernels,
/// approximate kernels.
pub fn operations() -> &'static [&'static dyn OperationInfo] {
    &OPERATIONS
}

/// Look up an operation by name.
pub fn find(name: &str) -> Option<&'static dyn OperationInfo> {
    operations().iter().copied().find(|op| op.operation() == name)
}

/// Resolve every operation now instead of on first call.
pub fn warm_all() {
    for op in operations() {
        op.resolved_summary();
    }
}
