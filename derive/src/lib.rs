//! Derive macro for `flagfig` configuration shapes.
//!
//! `#[derive(Flags)]` turns a struct with named fields into a flagfig shape:
//! a static `Shape` describing each field plus a `Record` impl giving the
//! loader indexed write access.

use proc_macro::TokenStream;

mod flags;

/// Derives `flagfig::Flags` and `flagfig::Record`.
///
/// ```ignore
/// #[derive(Flags, Serialize, Deserialize, Default)]
/// struct Config {
///     /// Address to bind.
///     #[serde(rename = "listen")]
///     addr: String,
///
///     #[flag(nested)]
///     database: Option<Database>,
/// }
/// ```
///
/// # Field attributes
///
/// * `#[flag(name = "...")]` - option name; falls back to the document key.
///   Only the option is renamed, the document key stays serde's.
/// * `#[flag(nested)]` - the field is a record (`T`, `Box<T>`, `Option<T>`,
///   `Option<Box<T>>`) whose options are prefixed with `name.`
/// * `#[flag(flatten)]` - like `nested`, without the prefix. Also implied by
///   `#[serde(flatten)]` on a nested field.
/// * `#[flag(skip)]` - never expose the field as an option
///
/// # Supported leaf types
///
/// * `String` → text
/// * `f32`, `f64` → float
/// * signed and unsigned integers → integer
/// * `Option<_>` of any of the above
///
/// Fields of any other type are kept in the shape as unsupported and never
/// become options.
///
/// # Document keys
///
/// A field is read from the key serde would read it from: `#[serde(rename)]`
/// (or `rename(deserialize = "...")`), else the identifier under the
/// container's `#[serde(rename_all = "...")]`, else the plain identifier.
/// `#[serde(flatten)]` fields read their keys from the enclosing object and
/// `#[serde(skip)]` fields are never read. Every other field type must
/// implement `serde::Deserialize`.
#[proc_macro_derive(Flags, attributes(flag))]
pub fn derive_flags(input: TokenStream) -> TokenStream {
    flags::derive_flags(input)
}
