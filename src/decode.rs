//! Document decoding: merge a JSON document onto a live config value.
//!
//! The document is walked against the [`Schema`], the same way the flag
//! applier walks it. A key the document holds replaces the field it names;
//! a field the document does not mention is never read, serialized or
//! rewritten, so it keeps whatever value it had. Objects under a nested
//! record merge into that record instead of replacing it, allocating an
//! unset optional record first. Flattened records read their keys from the
//! enclosing object and are only entered (and allocated) when the object
//! holds at least one of their keys.
//!
//! Fields decode one at a time. On error, fields decoded before the failing
//! one keep their new value; the failing field keeps its old one.
//!
//! Keys no field claims are collected with their dotted path. In strict mode
//! they are an error, otherwise they are logged and dropped. Unknown keys
//! inside a field's own value are found with `serde_ignored`.

use std::fs::File;
use std::io::Read;

use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::meta::{Key, Record, Slot};
use crate::schema::{Descriptor, DescriptorKind, Schema};
use crate::types::Source;

impl Source<'_> {
    /// Read the whole document. Opening a missing file is an
    /// [`IoError`](ConfigError::IoError) carrying the path.
    pub fn read_to_string(self) -> Result<String, ConfigError> {
        let mut content = String::new();
        match self {
            Source::File(path) => {
                let mut file = File::open(&path).map_err(|e| ConfigError::IoError {
                    path: path.clone(),
                    source: e,
                })?;
                file.read_to_string(&mut content)
                    .map_err(|e| ConfigError::IoError { path, source: e })?;
            }
            Source::Bytes(data) => {
                content = String::from_utf8(data)
                    .map_err(|e| ConfigError::Read(std::io::Error::other(e)))?;
            }
            Source::Reader(mut reader) => {
                reader
                    .read_to_string(&mut content)
                    .map_err(ConfigError::Read)?;
            }
        }
        Ok(content)
    }
}

/// Merge the JSON document in `content` onto `record`.
///
/// An empty, whitespace-only or `null` document leaves `record` untouched.
/// Any other document must be an object.
pub fn decode_into(
    content: &str,
    record: &mut dyn Record,
    schema: &Schema,
    strict: bool,
) -> Result<(), ConfigError> {
    if content.trim().is_empty() {
        tracing::debug!("config document is empty, nothing to decode");
        return Ok(());
    }

    let mut object = match serde_json::from_str::<Value>(content)? {
        Value::Null => {
            tracing::debug!("config document is null, nothing to decode");
            return Ok(());
        }
        document => serde_json::from_value::<Map<String, Value>>(document)?,
    };

    let mut unknown = Vec::new();
    merge_object(record, schema, &mut object, "", &mut unknown)?;

    if strict && !unknown.is_empty() {
        return Err(ConfigError::UnknownKeys(unknown));
    }
    for key in &unknown {
        tracing::debug!(key = %key, "ignoring unknown key in config document");
    }
    Ok(())
}

fn merge_object(
    record: &mut dyn Record,
    schema: &Schema,
    object: &mut Map<String, Value>,
    path: &str,
    unknown: &mut Vec<String>,
) -> Result<(), ConfigError> {
    decode_fields(record, schema, object, path, unknown)?;
    unknown.extend(object.keys().map(|key| join(path, key)));
    Ok(())
}

/// Decode every key of `object` that `schema` claims, removing it.
fn decode_fields(
    record: &mut dyn Record,
    schema: &Schema,
    object: &mut Map<String, Value>,
    path: &str,
    unknown: &mut Vec<String>,
) -> Result<(), ConfigError> {
    for field in &schema.fields {
        if let Key::Named(key) = field.key
            && let Some(value) = object.remove(key)
        {
            decode_field(record, schema, field, value, &join(path, key), unknown)?;
        }
    }

    let mut catch_all = None;
    for field in schema.fields.iter().filter(|f| f.key == Key::Flattened) {
        match &field.kind {
            DescriptorKind::Nested { children, .. } => {
                if !claims(children, object) {
                    continue;
                }
                let Some(Slot::Record(inner)) = record.slot(field.index) else {
                    return Err(schema.mismatch(field.name, "record"));
                };
                decode_fields(inner, children, object, path, unknown)?;
            }
            _ => catch_all = Some(field),
        }
    }

    if let Some(field) = catch_all
        && !object.is_empty()
    {
        let rest = Value::Object(std::mem::take(object));
        decode_whole(record, schema, field, rest, path, unknown)?;
    }
    Ok(())
}

fn decode_field(
    record: &mut dyn Record,
    schema: &Schema,
    field: &Descriptor,
    value: Value,
    path: &str,
    unknown: &mut Vec<String>,
) -> Result<(), ConfigError> {
    match (&field.kind, value) {
        (DescriptorKind::Nested { children, .. }, Value::Object(mut object)) => {
            let Some(Slot::Record(inner)) = record.slot(field.index) else {
                return Err(schema.mismatch(field.name, "record"));
            };
            merge_object(inner, children, &mut object, path, unknown)
        }
        (_, value) => decode_whole(record, schema, field, value, path, unknown),
    }
}

fn decode_whole(
    record: &mut dyn Record,
    schema: &Schema,
    field: &Descriptor,
    value: Value,
    path: &str,
    unknown: &mut Vec<String>,
) -> Result<(), ConfigError> {
    let Some(target) = record.field(field.index) else {
        return Err(schema.mismatch(field.name, "document field"));
    };
    target.decode(value, &mut |ignored: String| unknown.push(join(path, &ignored)))?;
    tracing::trace!(key = path, "decoded document value");
    Ok(())
}

/// Whether `object` holds a key belonging to `schema`.
fn claims(schema: &Schema, object: &Map<String, Value>) -> bool {
    schema.fields.iter().any(|field| match (field.key, &field.kind) {
        (Key::Named(key), _) => object.contains_key(key),
        (Key::Flattened, DescriptorKind::Nested { children, .. }) => claims(children, object),
        _ => false,
    })
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}
