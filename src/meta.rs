//! Static description of a configuration shape.
//!
//! `#[derive(Flags)]` emits a [`Shape`] constant for the struct plus a
//! [`Record`] impl giving indexed mutable access to its fields. Everything
//! else in the crate works against these two: the schema extractor reads the
//! shape, the flag applier writes through [`Record::slot`] and the document
//! decoder through [`Record::slot`] and [`Record::field`].
//!
//! Both can be written by hand for types the derive cannot handle; the
//! applier reports [`ConfigError::ShapeMismatch`](crate::ConfigError) when the
//! two disagree.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::types::{FlagValue, Kind};

/// Declared fields of one record type, in declaration order.
#[derive(Debug, Clone, Copy)]
pub struct Shape {
    /// Type name, used in error messages.
    pub name: &'static str,
    pub fields: &'static [Field],
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    /// External option name, already resolved from the field's attributes.
    pub name: &'static str,
    /// Where the field lives in the JSON document.
    pub key: Key,
    /// Doc comment of the field, shown as the option's help text.
    pub help: &'static str,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// A primitive settable from the command line.
    Leaf(Kind),
    /// A sub-record. Embedded records contribute their options without a
    /// name prefix.
    Nested {
        shape: &'static Shape,
        embedded: bool,
    },
    /// Any other field. Never registered, never written.
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Read from this key of the enclosing object.
    Named(&'static str),
    /// Read from the enclosing object's own keys (`#[serde(flatten)]`).
    Flattened,
    /// Never read from the document.
    Skipped,
}

/// A configuration type with a statically known shape.
pub trait Flags: Record {
    const SHAPE: Shape;
}

/// Indexed mutable access to the fields of a record.
pub trait Record {
    /// Accessor for the field at position `index` of the type's [`Shape`].
    ///
    /// Optional records and optional primitives are allocated here, so this
    /// must only be called for fields about to be written.
    fn slot(&mut self, index: usize) -> Option<Slot<'_>>;

    /// The whole field at position `index`, for replacing it with a
    /// document value. `None` for fields the document never reaches.
    fn field(&mut self, index: usize) -> Option<&mut dyn Decode>;
}

pub enum Slot<'a> {
    Leaf(&'a mut dyn Primitive),
    Record(&'a mut dyn Record),
}

/// A field type that can be assigned from a [`FlagValue`].
pub trait Primitive {
    fn assign(&mut self, value: &FlagValue) -> Result<(), String>;
}

/// A field that can be replaced by deserializing a JSON value.
pub trait Decode {
    /// Replace `self` with `value`. Keys the field type ignores are reported
    /// to `ignored` by their path below the field. On error `self` is left
    /// as it was.
    fn decode(
        &mut self,
        value: Value,
        ignored: &mut dyn FnMut(String),
    ) -> Result<(), serde_json::Error>;
}

impl<T: DeserializeOwned> Decode for T {
    fn decode(
        &mut self,
        value: Value,
        ignored: &mut dyn FnMut(String),
    ) -> Result<(), serde_json::Error> {
        *self = serde_ignored::deserialize(value, |path| ignored(path.to_string()))?;
        Ok(())
    }
}

fn mismatch(expected: Kind, value: &FlagValue) -> String {
    format!("expected {expected}, got {}", value.kind())
}

impl Primitive for String {
    fn assign(&mut self, value: &FlagValue) -> Result<(), String> {
        match value {
            FlagValue::Text(s) => {
                self.clone_from(s);
                Ok(())
            }
            other => Err(mismatch(Kind::Text, other)),
        }
    }
}

impl Primitive for f64 {
    fn assign(&mut self, value: &FlagValue) -> Result<(), String> {
        match value {
            FlagValue::Float(v) => {
                *self = *v;
                Ok(())
            }
            other => Err(mismatch(Kind::Float, other)),
        }
    }
}

impl Primitive for f32 {
    fn assign(&mut self, value: &FlagValue) -> Result<(), String> {
        match value {
            FlagValue::Float(v) => {
                *self = *v as f32;
                Ok(())
            }
            other => Err(mismatch(Kind::Float, other)),
        }
    }
}

macro_rules! integer_primitive {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Primitive for $ty {
                fn assign(&mut self, value: &FlagValue) -> Result<(), String> {
                    match value {
                        FlagValue::Integer(v) => {
                            *self = <$ty>::try_from(*v).map_err(|_| {
                                format!("{v} is out of range for {}", stringify!($ty))
                            })?;
                            Ok(())
                        }
                        other => Err(mismatch(Kind::Integer, other)),
                    }
                }
            }
        )*
    };
}

integer_primitive!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl<P: Primitive + Default> Primitive for Option<P> {
    fn assign(&mut self, value: &FlagValue) -> Result<(), String> {
        match self {
            Some(inner) => inner.assign(value),
            None => {
                let mut inner = P::default();
                inner.assign(value)?;
                *self = Some(inner);
                Ok(())
            }
        }
    }
}
