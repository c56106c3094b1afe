//! Cross-variant consistency checks.
//!
//! Runs every variant the running processor supports against the baseline
//! on deterministic data. Exact operations must match the baseline bit for
//! bit; approximate operations must stay within their documented ULP bound.

use multiver_dispatch::{CapabilitySet, Dispatcher};

use crate::accuracy::max_ulp_error;
use crate::approx::{self, MAX_MAGNITUDE, MIN_MAGNITUDE};
use crate::lanes::{F32x4, I32x4, U32x4};
use crate::{lane_ops, ops};

/// Elements per generated input. Not a multiple of any lane count, so the
/// scalar remainder paths run too.
pub const CHECK_LEN: usize = 1027;

/// Outcome for one (operation, variant) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantCheck {
    pub operation: &'static str,
    pub variant: &'static str,
    pub required: CapabilitySet,
    /// Largest deviation from the baseline in ULPs; `u32::MAX` for any bit
    /// difference in an exact operation.
    pub max_ulp: u32,
    pub bound: u32,
}

impl VariantCheck {
    pub fn passed(&self) -> bool {
        self.max_ulp <= self.bound
    }
}

enum Output {
    /// Compared bit for bit.
    Exact(Vec<u32>),
    /// Compared in ULPs.
    Approx(Vec<f32>),
}

impl Output {
    fn exact_f32(values: &[f32]) -> Self {
        Output::Exact(values.iter().map(|v| v.to_bits()).collect())
    }

    fn deviation_from(&self, reference: &Output) -> u32 {
        match (self, reference) {
            (Output::Exact(got), Output::Exact(want)) if got == want => 0,
            (Output::Approx(got), Output::Approx(want)) => max_ulp_error(got, want),
            _ => u32::MAX,
        }
    }
}

/// Deterministic xorshift generator for check inputs.
struct Xorshift(u32);

impl Xorshift {
    fn next_u32(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }

    /// Uniform in `[-range, range)`.
    fn uniform(&mut self, range: f32) -> f32 {
        let unit = (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32;
        (unit * 2.0 - 1.0) * range
    }

    /// Log-uniform magnitude in `[MIN_MAGNITUDE, MAX_MAGNITUDE)`.
    fn magnitude(&mut self) -> f32 {
        let exponent = (self.next_u32() % 120) as i32 - 60;
        let mantissa = 1.0 + (self.next_u32() >> 9) as f32 / (1u32 << 23) as f32;
        let x = mantissa * 2f32.powi(exponent);
        x.clamp(MIN_MAGNITUDE, MAX_MAGNITUDE)
    }
}

struct Inputs {
    a: Vec<f32>,
    b: Vec<f32>,
    c: Vec<f32>,
    positive: Vec<f32>,
    ints_a: Vec<i32>,
    ints_b: Vec<i32>,
    bits_a: Vec<u32>,
    bits_b: Vec<u32>,
    approx_signed: Vec<f32>,
    approx_positive: Vec<f32>,
}

impl Inputs {
    fn generate() -> Self {
        let mut rng = Xorshift(0x9E37_79B9);
        let mut floats = |range: f32| (0..CHECK_LEN).map(|_| rng.uniform(range)).collect::<Vec<_>>();
        let a = floats(1000.0);
        let mut b = floats(1000.0);
        let c = floats(10.0);
        let positive = floats(1.0e6).into_iter().map(f32::abs).collect();
        // Equal lanes give the comparison kernels both outcomes.
        for i in (0..CHECK_LEN).step_by(7) {
            b[i] = a[i];
        }

        let mut rng = Xorshift(0x85EB_CA6B);
        let bits_a: Vec<u32> = (0..CHECK_LEN).map(|_| rng.next_u32()).collect();
        let bits_b: Vec<u32> = (0..CHECK_LEN).map(|_| rng.next_u32()).collect();
        let ints_a = bits_a.iter().map(|&x| x as i32).collect();
        let ints_b = bits_b.iter().map(|&x| x as i32).collect();

        let mut rng = Xorshift(0xC2B2_AE35);
        let approx_positive: Vec<f32> = (0..CHECK_LEN).map(|_| rng.magnitude()).collect();
        let approx_signed = approx_positive
            .iter()
            .enumerate()
            .map(|(i, &x)| if i % 2 == 0 { x } else { -x })
            .collect();

        Self {
            a,
            b,
            c,
            positive,
            ints_a,
            ints_b,
            bits_a,
            bits_b,
            approx_signed,
            approx_positive,
        }
    }
}

/// Run every supported variant of `dispatcher` through `run` and compare
/// against the baseline's output.
fn compare<F: Copy + 'static>(
    dispatcher: &'static Dispatcher<F>,
    bound: impl Fn(&str) -> u32,
    run: impl Fn(F) -> Output,
) -> Vec<VariantCheck> {
    let registry = dispatcher.resolution().registry();
    // SAFETY: the baseline has the empty requirement.
    let reference = run(unsafe { registry.baseline().func_unchecked() });

    let mut checks = Vec::new();
    for variant in registry.variants() {
        let Some(func) = variant.func_if_supported() else {
            continue;
        };
        let check = VariantCheck {
            operation: dispatcher.operation(),
            variant: variant.name(),
            required: variant.required(),
            max_ulp: run(func).deviation_from(&reference),
            bound: bound(variant.name()),
        };
        if check.passed() {
            tracing::debug!(operation = check.operation, variant = check.variant, max_ulp = check.max_ulp, "variant consistent");
        } else {
            tracing::warn!(
                operation = check.operation,
                variant = check.variant,
                max_ulp = check.max_ulp,
                bound = check.bound,
                "variant deviates from baseline"
            );
        }
        checks.push(check);
    }
    checks
}

fn exact(_variant: &str) -> u32 {
    0
}

type BinaryF32 = fn(&[f32], &[f32], &mut [f32]);
type UnaryF32 = fn(&[f32], &mut [f32]);
type CompareF32 = fn(&[f32], &[f32], &mut [u32]);
type BinaryI32 = fn(&[i32], &[i32], &mut [i32]);
type BinaryU32 = fn(&[u32], &[u32], &mut [u32]);
type UnaryU32 = fn(&[u32], &mut [u32]);

fn binary_f32(d: &'static Dispatcher<BinaryF32>, a: &[f32], b: &[f32]) -> Vec<VariantCheck> {
    compare(d, exact, |f| {
        let mut out = vec![0.0; a.len()];
        f(a, b, &mut out);
        Output::exact_f32(&out)
    })
}

fn unary_f32(d: &'static Dispatcher<UnaryF32>, input: &[f32]) -> Vec<VariantCheck> {
    compare(d, exact, |f| {
        let mut out = vec![0.0; input.len()];
        f(input, &mut out);
        Output::exact_f32(&out)
    })
}

fn approx_f32(d: &'static Dispatcher<UnaryF32>, input: &[f32]) -> Vec<VariantCheck> {
    compare(d, approx::max_ulp_for, |f| {
        let mut out = vec![0.0; input.len()];
        f(input, &mut out);
        Output::Approx(out)
    })
}

fn compare_f32(d: &'static Dispatcher<CompareF32>, a: &[f32], b: &[f32]) -> Vec<VariantCheck> {
    compare(d, exact, |f| {
        let mut out = vec![0; a.len()];
        f(a, b, &mut out);
        Output::Exact(out)
    })
}

fn binary_i32(d: &'static Dispatcher<BinaryI32>, a: &[i32], b: &[i32]) -> Vec<VariantCheck> {
    compare(d, exact, |f| {
        let mut out = vec![0; a.len()];
        f(a, b, &mut out);
        Output::Exact(out.into_iter().map(|x| x as u32).collect())
    })
}

fn binary_u32(d: &'static Dispatcher<BinaryU32>, a: &[u32], b: &[u32]) -> Vec<VariantCheck> {
    compare(d, exact, |f| {
        let mut out = vec![0; a.len()];
        f(a, b, &mut out);
        Output::Exact(out)
    })
}

fn unary_u32(d: &'static Dispatcher<UnaryU32>, input: &[u32]) -> Vec<VariantCheck> {
    compare(d, exact, |f| {
        let mut out = vec![0; input.len()];
        f(input, &mut out);
        Output::Exact(out)
    })
}

/// Apply a lane kernel across whole slices, four lanes at a time.
fn lanes<T: Copy, const N: usize>(
    a: &[T],
    b: &[T],
    f: impl Fn(crate::Vector<T, N>, crate::Vector<T, N>) -> crate::Vector<T, N>,
) -> Vec<T> {
    a.chunks_exact(N)
        .zip(b.chunks_exact(N))
        .flat_map(|(x, y)| f(crate::Vector::from_slice(x), crate::Vector::from_slice(y)).to_array())
        .collect()
}

/// Check every supported variant of every catalogued operation.
pub fn check_all() -> Vec<VariantCheck> {
    let inputs = Inputs::generate();
    let (a, b, c) = (&inputs.a, &inputs.b, &inputs.c);
    let mut checks = Vec::new();

    checks.extend(binary_f32(&ops::add_f32::DISPATCHER, a, b));
    checks.extend(binary_f32(&ops::sub_f32::DISPATCHER, a, b));
    checks.extend(binary_f32(&ops::mul_f32::DISPATCHER, a, b));
    checks.extend(binary_f32(&ops::div_f32::DISPATCHER, a, b));
    checks.extend(binary_f32(&ops::min_f32::DISPATCHER, a, b));
    checks.extend(binary_f32(&ops::max_f32::DISPATCHER, a, b));
    checks.extend(compare(&ops::fma_f32::DISPATCHER, exact, |f| {
        let mut out = vec![0.0; a.len()];
        f(a, b, c, &mut out);
        Output::exact_f32(&out)
    }));
    checks.extend(unary_f32(&ops::sqrt_f32::DISPATCHER, &inputs.positive));
    checks.extend(unary_f32(&ops::abs_f32::DISPATCHER, a));
    checks.extend(unary_f32(&ops::neg_f32::DISPATCHER, a));
    checks.extend(binary_i32(&ops::add_i32::DISPATCHER, &inputs.ints_a, &inputs.ints_b));
    checks.extend(binary_i32(&ops::sub_i32::DISPATCHER, &inputs.ints_a, &inputs.ints_b));
    checks.extend(binary_u32(&ops::and_u32::DISPATCHER, &inputs.bits_a, &inputs.bits_b));
    checks.extend(binary_u32(&ops::or_u32::DISPATCHER, &inputs.bits_a, &inputs.bits_b));
    checks.extend(binary_u32(&ops::xor_u32::DISPATCHER, &inputs.bits_a, &inputs.bits_b));
    checks.extend(unary_u32(&ops::not_u32::DISPATCHER, &inputs.bits_a));
    checks.extend(compare_f32(&ops::cmp_lt_f32::DISPATCHER, a, b));
    checks.extend(compare_f32(&ops::cmp_eq_f32::DISPATCHER, a, b));

    let f32_lanes = |d: &'static Dispatcher<fn(F32x4, F32x4) -> F32x4>| {
        compare(d, exact, |f| Output::exact_f32(&lanes(a, b, f)))
    };
    checks.extend(f32_lanes(&lane_ops::add_f32x4::DISPATCHER));
    checks.extend(f32_lanes(&lane_ops::sub_f32x4::DISPATCHER));
    checks.extend(f32_lanes(&lane_ops::mul_f32x4::DISPATCHER));
    checks.extend(f32_lanes(&lane_ops::min_f32x4::DISPATCHER));
    checks.extend(f32_lanes(&lane_ops::max_f32x4::DISPATCHER));

    checks.extend(compare(&lane_ops::add_i32x4::DISPATCHER, exact, |f: fn(I32x4, I32x4) -> I32x4| {
        let out = lanes(&inputs.ints_a, &inputs.ints_b, f);
        Output::Exact(out.into_iter().map(|x| x as u32).collect())
    }));

    let u32_lanes = |d: &'static Dispatcher<fn(U32x4, U32x4) -> U32x4>| {
        compare(d, exact, |f| Output::Exact(lanes(&inputs.bits_a, &inputs.bits_b, f)))
    };
    checks.extend(u32_lanes(&lane_ops::and_u32x4::DISPATCHER));
    checks.extend(u32_lanes(&lane_ops::or_u32x4::DISPATCHER));
    checks.extend(u32_lanes(&lane_ops::xor_u32x4::DISPATCHER));
    checks.extend(compare(&lane_ops::not_u32x4::DISPATCHER, exact, |f: fn(U32x4) -> U32x4| {
        let out = lanes(&inputs.bits_a, &inputs.bits_a, |x, _| f(x));
        Output::Exact(out)
    }));

    checks.extend(approx_f32(&approx::RCP, &inputs.approx_signed));
    checks.extend(approx_f32(&approx::RSQRT, &inputs.approx_positive));

    checks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_magnitudes_stay_in_range() {
        let mut rng = Xorshift(1);
        for _ in 0..10_000 {
            let x = rng.magnitude();
            assert!((MIN_MAGNITUDE..=MAX_MAGNITUDE).contains(&x), "{x}");
        }
    }

    #[test]
    fn test_exact_output_rejects_any_bit_difference() {
        let reference = Output::exact_f32(&[0.0, 1.0]);
        assert_eq!(Output::exact_f32(&[0.0, 1.0]).deviation_from(&reference), 0);
        assert_eq!(Output::exact_f32(&[-0.0, 1.0]).deviation_from(&reference), u32::MAX);
    }

    #[test]
    fn test_baseline_always_checked() {
        let checks = check_all();
        for op in crate::catalog::operations() {
            assert!(
                checks
                    .iter()
                    .any(|c| c.operation == op.operation() && c.variant == "baseline"),
                "{} was not checked",
                op.operation()
            );
        }
    }
}
