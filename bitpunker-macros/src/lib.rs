use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemFn, parse_macro_input};

/// Compiles a hot loop once per supported CPU feature set and dispatches
/// at runtime.
///
/// Expands to `#[multiversion::multiversion(targets(...))]`, so the calling
/// crate must depend on `multiversion`. Functions marked with it are plain
/// scalar loops written so the compiler can auto-vectorize them (energy
/// field updates, ordered threshold rows).
///
/// # Example
///
/// ```ignore
/// use bitpunker_macros::simd_targets;
///
/// #[simd_targets]
/// fn halve(values: &mut [f64]) {
///     values.iter_mut().for_each(|v| *v *= 0.5);
/// }
/// ```
#[proc_macro_attribute]
pub fn simd_targets(_attr: TokenStream, input: TokenStream) -> TokenStream {
    let func = parse_macro_input!(input as ItemFn);

    // debug builds only carry the baseline targets to keep compile times down
    #[cfg(debug_assertions)]
    let expanded = quote! {
        #[multiversion::multiversion(targets(
            "x86_64+sse2",
            "aarch64+neon",
        ))]
        #func
    };

    #[cfg(not(debug_assertions))]
    let expanded = quote! {
        #[multiversion::multiversion(targets(
            "x86_64+avx512f+avx512bw+avx512cd+avx512dq+avx512vl",
            "x86_64+avx2+fma",
            "x86_64+sse4.2",
            "x86_64+sse2",
            "aarch64+neon",
        ))]
        #func
    };

    TokenStream::from(expanded)
}
