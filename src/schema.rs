//! Schema extraction: turn a static [`Shape`] into an owned descriptor tree.
//!
//! The tree mirrors the shape one level per nesting level. It is rebuilt on
//! every load, so option handles recorded on it by the synthesizer never
//! leak between independent loads.

use crate::error::ConfigError;
use crate::meta::{FieldKind, Key, Shape};
use crate::types::Kind;

/// Descriptor tree for one record shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub shape: &'static str,
    pub fields: Vec<Descriptor>,
}

/// One declared field.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    /// Position within the owning shape; the index passed to
    /// [`Record::slot`](crate::Record::slot).
    pub index: usize,
    pub name: &'static str,
    pub key: Key,
    pub help: &'static str,
    pub kind: DescriptorKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DescriptorKind {
    Leaf {
        kind: Kind,
        /// Dotted option name, set once the option has been registered.
        option: Option<String>,
    },
    Nested {
        embedded: bool,
        children: Schema,
    },
    Unsupported,
}

impl Schema {
    /// Error for a record whose accessors disagree with this schema.
    pub(crate) fn mismatch(&self, field: &str, expected: &'static str) -> ConfigError {
        ConfigError::ShapeMismatch {
            field: format!("{}.{field}", self.shape),
            expected,
        }
    }
}

impl Descriptor {
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, DescriptorKind::Leaf { .. })
    }
}

/// Build the descriptor tree for `shape`, recursing into nested shapes.
///
/// Fails when a field that becomes an option (or an option prefix) has an
/// empty name.
pub fn extract(shape: &Shape) -> Result<Schema, ConfigError> {
    let mut fields = Vec::with_capacity(shape.fields.len());

    for (index, field) in shape.fields.iter().enumerate() {
        let kind = match field.kind {
            FieldKind::Leaf(kind) => DescriptorKind::Leaf { kind, option: None },
            FieldKind::Nested {
                shape: nested,
                embedded,
            } => DescriptorKind::Nested {
                embedded,
                children: extract(nested)?,
            },
            FieldKind::Unsupported => DescriptorKind::Unsupported,
        };

        let named = match &kind {
            DescriptorKind::Leaf { .. } => true,
            DescriptorKind::Nested { embedded, .. } => !embedded,
            DescriptorKind::Unsupported => false,
        };
        if named && field.name.is_empty() {
            return Err(ConfigError::EmptyName {
                shape: shape.name,
                index,
            });
        }

        fields.push(Descriptor {
            index,
            name: field.name,
            key: field.key,
            help: field.help,
            kind,
        });
    }

    Ok(Schema {
        shape: shape.name,
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Flags;
    use crate::fixtures::test::{Embedding, Scalars, Server, Wrapper};
    use crate::meta::Field;

    #[test]
    fn leaves_in_declaration_order() {
        let schema = extract(&Scalars::SHAPE).unwrap();
        assert_eq!(schema.shape, "Scalars");
        let names: Vec<_> = schema.fields.iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["string", "float", "int"]);
        assert_eq!(
            schema.fields[1].kind,
            DescriptorKind::Leaf {
                kind: Kind::Float,
                option: None
            }
        );
        assert!(schema.fields.iter().enumerate().all(|(i, d)| d.index == i));
    }

    #[test]
    fn nested_pointer_is_walked_structurally() {
        let schema = extract(&Wrapper::SHAPE).unwrap();
        let DescriptorKind::Nested { embedded, children } = &schema.fields[0].kind else {
            panic!("expected nested descriptor");
        };
        assert!(!embedded);
        assert_eq!(children.fields.len(), 1);
        assert_eq!(children.fields[0].name, "foo");
    }

    #[test]
    fn embedded_record_is_marked() {
        let schema = extract(&Embedding::SHAPE).unwrap();
        assert!(matches!(
            schema.fields[0].kind,
            DescriptorKind::Nested { embedded: true, .. }
        ));
        assert!(schema.fields[1].is_leaf());
    }

    #[test]
    fn unsupported_fields_keep_their_index() {
        let schema = extract(&Server::SHAPE).unwrap();
        let debug = schema.fields.iter().find(|d| d.name == "debug").unwrap();
        assert_eq!(debug.kind, DescriptorKind::Unsupported);
        let tags = schema.fields.iter().find(|d| d.name == "tags").unwrap();
        assert_eq!(tags.kind, DescriptorKind::Unsupported);
        assert!(schema.fields.iter().enumerate().all(|(i, d)| d.index == i));
    }

    #[test]
    fn explicit_name_and_doc_help() {
        let schema = extract(&Server::SHAPE).unwrap();
        let listen = &schema.fields[0];
        assert_eq!(listen.name, "listen");
        assert_eq!(listen.help, "Address to bind.");
    }

    #[test]
    fn empty_leaf_name_is_rejected() {
        static SHAPE: Shape = Shape {
            name: "Broken",
            fields: &[
                Field {
                    name: "ok",
                    key: Key::Named("ok"),
                    help: "",
                    kind: FieldKind::Leaf(Kind::Text),
                },
                Field {
                    name: "",
                    key: Key::Skipped,
                    help: "",
                    kind: FieldKind::Leaf(Kind::Integer),
                },
            ],
        };
        let err = extract(&SHAPE).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::EmptyName {
                shape: "Broken",
                index: 1
            }
        ));
    }

    #[test]
    fn empty_name_allowed_when_unused() {
        static INNER: Shape = Shape {
            name: "Inner",
            fields: &[Field {
                name: "x",
                key: Key::Named("x"),
                help: "",
                kind: FieldKind::Leaf(Kind::Text),
            }],
        };
        static SHAPE: Shape = Shape {
            name: "Outer",
            fields: &[
                Field {
                    name: "",
                    key: Key::Skipped,
                    help: "",
                    kind: FieldKind::Nested {
                        shape: &INNER,
                        embedded: true,
                    },
                },
                Field {
                    name: "",
                    key: Key::Skipped,
                    help: "",
                    kind: FieldKind::Unsupported,
                },
            ],
        };
        assert!(extract(&SHAPE).is_ok());
    }
}
