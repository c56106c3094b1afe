//! Declaration surface for multiversioned functions.

/// Compile a function once per profile and dispatch to the best variant.
///
/// For every function in the block the macro emits:
///
/// - the function itself, a forwarding stub with the same signature
/// - a hidden public module of the same name holding one copy of the body per
///   [`Profile`](crate::Profile) of the target architecture (each compiled
///   with that profile's `#[target_feature]` list), the baseline copy, the
///   registry, and the `DISPATCHER` static
///
/// The body is written once and is plain safe Rust; the compiler is free to
/// auto-vectorize each copy for its profile.
///
/// Use the macro at module level. The body sees the enclosing module's items
/// through `use super::*`, so anything it names must be reachable from
/// there.
///
/// # Example
/// ```
/// multiver_dispatch::multiversion! {
///     /// Sum of squares.
///     pub fn sum_sq(xs: &[f32]) -> f32 {
///         xs.iter().map(|x| x * x).sum()
///     }
/// }
///
/// assert_eq!(sum_sq(&[1.0, 2.0, 2.0]), 9.0);
/// assert!(sum_sq::DISPATCHER.resolved().is_supported_by(multiver_dispatch::detected()));
/// ```
#[macro_export]
macro_rules! multiversion {
    ($(
        $(#[$meta:meta])*
        $vis:vis fn $name:ident($($arg:ident : $ty:ty),* $(,)?) $(-> $ret:ty)? $body:block
    )*) => {$(
        $(#[$meta])*
        #[inline]
        $vis fn $name($($arg: $ty),*) $(-> $ret)? {
            ($name::DISPATCHER.get())($($arg),*)
        }

        #[doc(hidden)]
        #[allow(non_snake_case, dead_code, unused_imports, private_interfaces)]
        pub mod $name {
            use super::*;

            pub type Signature = fn($($ty),*) $(-> $ret)?;

            pub static DISPATCHER: $crate::Dispatcher<Signature> =
                $crate::Dispatcher::new(stringify!($name), registry);

            #[inline(always)]
            fn body($($arg: $ty),*) $(-> $ret)? $body

            fn baseline($($arg: $ty),*) $(-> $ret)? {
                body($($arg),*)
            }

            $crate::__multiversion_profiles!(($($arg: $ty),*) ($($ret)?));

            fn registry() -> ::core::result::Result<
                $crate::VariantRegistry<Signature>,
                $crate::RegistrationError,
            > {
                let builder = $crate::VariantRegistry::<Signature>::builder(stringify!($name))
                    .baseline(baseline as Signature);

                // SAFETY: every entry below was compiled with exactly the
                // target features of the profile it is registered under.
                #[cfg(target_arch = "x86")]
                let builder = unsafe { builder.profile(&$crate::Profile::X86_SSE2, sse2 as Signature) };

                // SAFETY: as above.
                #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
                let builder = unsafe {
                    builder
                        .profile(&$crate::Profile::X86_SSE3, sse3 as Signature)
                        .profile(&$crate::Profile::X86_SSSE3, ssse3 as Signature)
                        .profile(&$crate::Profile::X86_SSE4_1, sse4_1 as Signature)
                        .profile(&$crate::Profile::X86_AVX, avx as Signature)
                        .profile(&$crate::Profile::X86_AVX2, avx2 as Signature)
                        .profile(&$crate::Profile::X86_AVX2_FMA, avx2_fma as Signature)
                        .profile(&$crate::Profile::X86_AVX512F, avx512f as Signature)
                };

                // SAFETY: as above.
                #[cfg(target_arch = "aarch64")]
                let builder = unsafe { builder.profile(&$crate::Profile::ARM_NEON, neon as Signature) };

                builder.build()
            }
        }
    )*};
}

/// Per-profile copies of `body` for [`multiversion!`]. Not public API.
///
/// The target-feature strings here must match
/// [`Profile::target_features`](crate::Profile::target_features), and the
/// `cfg` of each line must match [`compiled_profiles`](crate::compiled_profiles).
///
/// The registry stores the safe `$entry` wrapper, since a `#[target_feature]`
/// function does not coerce to a safe function pointer. The wrapper only
/// forwards its arguments, so optimized builds emit it as a tail jump into
/// `$imp` and no extra frame stays on the stack.
#[doc(hidden)]
#[macro_export]
macro_rules! __multiversion_profiles {
    (($($arg:ident : $ty:ty),*) ($($ret:ty)?)) => {
        $crate::__multiversion_profiles!(@cfg(target_arch = "x86") sse2, sse2_impl, "sse2", ($($arg: $ty),*) ($($ret)?));
        $crate::__multiversion_profiles!(@cfg(any(target_arch = "x86", target_arch = "x86_64")) sse3, sse3_impl, "sse2,sse3", ($($arg: $ty),*) ($($ret)?));
        $crate::__multiversion_profiles!(@cfg(any(target_arch = "x86", target_arch = "x86_64")) ssse3, ssse3_impl, "sse2,sse3,ssse3", ($($arg: $ty),*) ($($ret)?));
        $crate::__multiversion_profiles!(@cfg(any(target_arch = "x86", target_arch = "x86_64")) sse4_1, sse4_1_impl, "sse2,sse3,ssse3,sse4.1", ($($arg: $ty),*) ($($ret)?));
        $crate::__multiversion_profiles!(@cfg(any(target_arch = "x86", target_arch = "x86_64")) avx, avx_impl, "sse2,sse3,ssse3,sse4.1,avx", ($($arg: $ty),*) ($($ret)?));
        $crate::__multiversion_profiles!(@cfg(any(target_arch = "x86", target_arch = "x86_64")) avx2, avx2_impl, "sse2,sse3,ssse3,sse4.1,avx,avx2", ($($arg: $ty),*) ($($ret)?));
        $crate::__multiversion_profiles!(@cfg(any(target_arch = "x86", target_arch = "x86_64")) avx2_fma, avx2_fma_impl, "sse2,sse3,ssse3,sse4.1,avx,avx2,fma", ($($arg: $ty),*) ($($ret)?));
        $crate::__multiversion_profiles!(@cfg(any(target_arch = "x86", target_arch = "x86_64")) avx512f, avx512f_impl, "sse2,sse3,ssse3,sse4.1,avx,avx2,fma,avx512f", ($($arg: $ty),*) ($($ret)?));
        $crate::__multiversion_profiles!(@cfg(target_arch = "aarch64") neon, neon_impl, "neon", ($($arg: $ty),*) ($($ret)?));
    };

    (@cfg($cfg:meta) $entry:ident, $imp:ident, $features:tt, ($($arg:ident : $ty:ty),*) ($($ret:ty)?)) => {
        #[cfg($cfg)]
        #[target_feature(enable = $features)]
        unsafe fn $imp($($arg: $ty),*) $(-> $ret)? {
            body($($arg),*)
        }

        #[cfg($cfg)]
        fn $entry($($arg: $ty),*) $(-> $ret)? {
            // SAFETY: only reachable through the registry, which hands this
            // entry out when the detected set covers the profile.
            unsafe { $imp($($arg),*) }
        }
    };
}
