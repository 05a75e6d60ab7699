//! Typed configuration from a JSON document and auto-derived command-line
//! flags. Define a struct, derive [`Flags`], and load.
//!
//! ```ignore
//! let mut config = AppConfig::default();
//! Flagfig::builder()
//!     .use_flags()
//!     .with_file_flag("config")
//!     .load(&mut config)?;
//! ```
//!
//! That single call registers `--config <PATH>` plus one option per config
//! field (`--listen`, `--database.url`, ...), parses the process arguments,
//! decodes the named JSON file onto `config`, and finally overwrites every
//! field whose option was typed on the command line.
//!
//! # Design: struct as source of truth
//!
//! Your config struct is the schema for everything:
//!
//! - **Document keys** are the names serde reads: `#[serde(rename = "...")]`,
//!   else the container's `#[serde(rename_all = "...")]` applied to the
//!   identifier, else the identifier itself.
//! - **Option names** default to the document key. `#[flag(name = "...")]`
//!   renames only the option; the document key stays what serde reads.
//! - **`///` doc comments** become the options' `--help` text.
//! - **`#[flag(nested)]`** models hierarchical config. A nested field
//!   `database` holding a `url` becomes the option `--database.url` and the
//!   document key `{"database": {"url": ...}}`.
//!   Objects under a nested field merge into it; a field without
//!   `#[flag(nested)]` is replaced as a whole by its document value.
//! - **`#[flag(flatten)]`** embeds a record: its options carry no prefix.
//!   Pair it with `#[serde(flatten)]` to read its keys from the parent
//!   object as well.
//! - **Leaf types** are `String`, floats and integers, or `Option` of them.
//!   Other types (bools, collections, enums) stay document-only. Every
//!   field serde reads must implement `Deserialize`.
//!
//! ```ignore
//! use flagfig::Flags;
//! use serde::Deserialize;
//!
//! #[derive(Flags, Deserialize, Default)]
//! #[serde(default)]
//! struct AppConfig {
//!     /// Address to bind.
//!     listen: String,
//!     port: u16,
//!     #[flag(nested)]
//!     database: Option<Database>,
//! }
//!
//! #[derive(Flags, Deserialize, Default)]
//! #[serde(default)]
//! struct Database {
//!     url: String,
//!     pool_size: u32,
//! }
//! ```
//!
//! # Precedence
//!
//! ```text
//! Value before the call   whatever the caller put in `config`
//!        ↑ overridden by
//! JSON document           only the keys present in the document
//!        ↑ overridden by
//! Command-line flags      only the options actually typed
//! ```
//!
//! An option typed with its zero value (`--port 0`) still counts as typed.
//! An option left out never touches the field, so a document value is never
//! clobbered by a flag default. Optional nested records are allocated with
//! `Default` only when a document or a typed option writes into them.
//!
//! # Single-dash options
//!
//! Registered options accept both `--name value` and `-name value` (and the
//! `=value` forms). Negative numbers parse as values: `-offset -5`.
//!
//! # Sharing a command with the application
//!
//! [`FlagfigBuilder::use_flags_with`] registers the config options on a
//! caller-built `clap::Command`. The application's own arguments parse in
//! the same pass and come back from [`FlagfigBuilder::load_matches`].
//! Option names that collide with the command's arguments, with each other,
//! or with `--help` are reported as [`ConfigError::NameCollision`].
//!
//! # Strict mode
//!
//! By default, document keys that match no field are ignored. With
//! `.strict(true)` they are reported as [`ConfigError::UnknownKeys`].

extern crate self as flagfig;

pub mod error;
pub mod types;

mod apply;
mod builder;
mod cli;
mod decode;
mod meta;
mod schema;
mod synth;

#[cfg(test)]
mod fixtures;

pub use builder::{Flagfig, FlagfigBuilder, parse, parse_bytes};
pub use cli::{ParsedFlags, Registry};
pub use error::ConfigError;
pub use flagfig_derive::Flags;
pub use meta::{Decode, Field, FieldKind, Flags, Key, Primitive, Record, Shape, Slot};
pub use schema::{Descriptor, DescriptorKind, Schema, extract};
pub use synth::synthesize;
pub use types::{FlagValue, Kind, Source};
