//! Fixed-width lane container.
//!
//! `Vector<T, N>` is a plain array wrapper. It carries no intrinsic type, so
//! one definition serves every profile; the per-profile copies produced by
//! `multiversion!` let the compiler pick the instructions.

use std::ops::{Index, IndexMut};

/// `N` lanes of `T`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(transparent)]
pub struct Vector<T, const N: usize>(pub [T; N]);

/// 4 lanes of f32 (128-bit)
pub type F32x4 = Vector<f32, 4>;
/// 8 lanes of f32 (256-bit)
pub type F32x8 = Vector<f32, 8>;
/// 4 lanes of i32 (128-bit)
pub type I32x4 = Vector<i32, 4>;
/// 4 lanes of u32 (128-bit)
pub type U32x4 = Vector<u32, 4>;

impl<T: Copy, const N: usize> Vector<T, N> {
    pub const LANES: usize = N;

    /// All lanes set to `value`.
    #[inline(always)]
    pub fn splat(value: T) -> Self {
        Self([value; N])
    }

    #[inline(always)]
    pub fn from_array(lanes: [T; N]) -> Self {
        Self(lanes)
    }

    /// Load the first `N` elements of `slice`.
    ///
    /// # Panics
    /// If `slice` is shorter than `N`.
    #[inline(always)]
    pub fn from_slice(slice: &[T]) -> Self {
        assert!(slice.len() >= N, "slice has {} elements, need {N}", slice.len());
        Self(std::array::from_fn(|i| slice[i]))
    }

    /// Store into the first `N` elements of `slice`.
    ///
    /// # Panics
    /// If `slice` is shorter than `N`.
    #[inline(always)]
    pub fn write_to_slice(self, slice: &mut [T]) {
        slice[..N].copy_from_slice(&self.0);
    }

    #[inline(always)]
    pub fn to_array(self) -> [T; N] {
        self.0
    }

    /// Apply `f` lane by lane.
    #[inline(always)]
    pub fn map(self, f: impl Fn(T) -> T) -> Self {
        Self(std::array::from_fn(|i| f(self.0[i])))
    }

    /// Combine two vectors lane by lane.
    #[inline(always)]
    pub fn zip_map(self, other: Self, f: impl Fn(T, T) -> T) -> Self {
        Self(std::array::from_fn(|i| f(self.0[i], other.0[i])))
    }
}

impl<T: Copy + Default, const N: usize> Default for Vector<T, N> {
    fn default() -> Self {
        Self::splat(T::default())
    }
}

impl<T, const N: usize> From<[T; N]> for Vector<T, N> {
    fn from(lanes: [T; N]) -> Self {
        Self(lanes)
    }
}

impl<T, const N: usize> Index<usize> for Vector<T, N> {
    type Output = T;

    #[inline(always)]
    fn index(&self, lane: usize) -> &T {
        &self.0[lane]
    }
}

impl<T, const N: usize> IndexMut<usize> for Vector<T, N> {
    #[inline(always)]
    fn index_mut(&mut self, lane: usize) -> &mut T {
        &mut self.0[lane]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splat_and_index() {
        let mut v = F32x4::splat(1.5);
        v[2] = 3.0;
        assert_eq!(v.to_array(), [1.5, 1.5, 3.0, 1.5]);
        assert_eq!(F32x8::LANES, 8);
    }

    #[test]
    fn test_slice_round_trip() {
        let data = [1, 2, 3, 4, 5];
        let v = I32x4::from_slice(&data);
        let mut out = [0; 6];
        v.write_to_slice(&mut out);
        assert_eq!(out, [1, 2, 3, 4, 0, 0]);
    }

    #[test]
    #[should_panic]
    fn test_short_slice_panics() {
        let _ = U32x4::from_slice(&[1, 2, 3]);
    }

    #[test]
    fn test_zip_map() {
        let a = U32x4::from([1, 2, 3, 4]);
        let b = U32x4::splat(10);
        assert_eq!(a.zip_map(b, |x, y| x * y), U32x4::from([10, 20, 30, 40]));
        assert_eq!(U32x4::default(), U32x4::splat(0));
    }
}
