//! Slice-processing helpers shared by the kernels.
//!
//! The hand-written approximate kernels go through [`process_unary`], which
//! splits a slice into full lane blocks and finishes the remainder with a
//! scalar fallback.

/// Panic unless every slice has the same length.
#[inline(always)]
#[track_caller]
pub(crate) fn assert_same_len(lens: &[usize]) {
    if let Some((&first, rest)) = lens.split_first() {
        for &len in rest {
            assert_eq!(first, len, "input and output slices must have the same length");
        }
    }
}

/// One register's worth of f32 lanes for a specific instruction set.
pub(crate) trait LaneBlock: Copy {
    const LANES: usize;

    /// # Safety
    /// `slice.len() >= Self::LANES`, and the processor has the block's
    /// instruction set.
    unsafe fn load(slice: &[f32]) -> Self;

    /// # Safety
    /// As for [`load`](Self::load).
    unsafe fn store(self, slice: &mut [f32]);
}

/// Apply a block kernel to `input`, writing `output`.
///
/// Full blocks go through `kernel`; the remaining `len % LANES` elements go
/// through `scalar_fallback`.
///
/// # Safety
/// The processor must have the instruction set of `V`.
///
/// # Panics
/// If `input` and `output` differ in length.
#[inline(always)]
pub(crate) unsafe fn process_unary<V, K>(
    input: &[f32],
    output: &mut [f32],
    kernel: K,
    scalar_fallback: fn(f32) -> f32,
) where
    V: LaneBlock,
    K: Fn(V) -> V,
{
    assert_same_len(&[input.len(), output.len()]);

    let mut src = input.chunks_exact(V::LANES);
    let mut dst = output.chunks_exact_mut(V::LANES);
    for (s, d) in (&mut src).zip(&mut dst) {
        // SAFETY: chunks_exact yields exactly LANES elements; the caller
        // guarantees the instruction set.
        unsafe { kernel(V::load(s)).store(d) };
    }

    for (o, &x) in dst.into_remainder().iter_mut().zip(src.remainder()) {
        *o = scalar_fallback(x);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two-lane block over plain arrays, so the driver can be checked
    /// without intrinsics.
    #[derive(Clone, Copy)]
    struct Pair([f32; 2]);

    impl LaneBlock for Pair {
        const LANES: usize = 2;

        unsafe fn load(slice: &[f32]) -> Self {
            Pair([slice[0], slice[1]])
        }

        unsafe fn store(self, slice: &mut [f32]) {
            slice[..2].copy_from_slice(&self.0);
        }
    }

    #[test]
    fn test_blocks_and_remainder() {
        let input = [1.0, 2.0, 3.0, 4.0, 5.0];
        let mut output = [0.0; 5];
        unsafe {
            process_unary::<Pair, _>(&input, &mut output, |p| Pair([p.0[0] * 10.0, p.0[1] * 10.0]), |x| -x)
        };
        assert_eq!(output, [10.0, 20.0, 30.0, 40.0, -5.0]);
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn test_length_mismatch_panics() {
        assert_same_len(&[3, 3, 4]);
    }
}
