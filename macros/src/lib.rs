//! Proc macros for stylescope: `styleset!` compile-time declaration blocks.
//!
//! This crate is not meant to be used directly; enable the `macros` feature on `stylescope`.

use proc_macro::TokenStream;

mod styleset_macro;

/// Compile-time styleset macro.
///
/// Parses property declarations at compile time and produces a
/// `stylescope::css::Styleset`.
///
/// # Syntax
///
/// ```ignore
/// let style = styleset! {
///     color: red;
///     background: #1a1a2e;
///     padding: 4px 8px;
///     font-family: "Inter", sans-serif;
///     display: none !important;
///     --accent: teal;
///     ":hover" {
///         color: white;
///     }
/// };
/// ```
///
/// - Property names are kebab-case; `--name` declares a custom property.
/// - Space-separated values become a list, comma-separated groups a comma list.
/// - Integer and float literals carry their unit as a suffix (`4px`, `1.5rem`)
///   or are followed by `%`.
/// - A string literal followed by a braced block adds a nested block keyed
///   by that selector suffix or `&` template.
#[proc_macro]
pub fn styleset(input: TokenStream) -> TokenStream {
    styleset_macro::styleset_impl(input.into())
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
