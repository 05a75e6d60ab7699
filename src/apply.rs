//! Flag application: copy supplied option values into a live config value.
//!
//! The applier walks the synthesized [`Schema`] in lock-step with the value.
//! A leaf is overwritten only when its option was supplied on the command
//! line; everything else keeps whatever the document (or the caller) put
//! there. Nested records are entered only when at least one option below
//! them was supplied, which is also the only time an unset optional record
//! gets allocated.

use crate::cli::ParsedFlags;
use crate::error::ConfigError;
use crate::meta::{Record, Slot};
use crate::schema::{DescriptorKind, Schema};

/// Apply every supplied option of `schema` to `record`.
pub fn apply(
    record: &mut dyn Record,
    schema: &Schema,
    flags: &ParsedFlags,
) -> Result<(), ConfigError> {
    for field in &schema.fields {
        match &field.kind {
            DescriptorKind::Leaf {
                option: Some(option),
                ..
            } => {
                if !flags.is_supplied(option) {
                    continue;
                }
                let Some(value) = flags.value(option) else {
                    continue;
                };
                let Some(Slot::Leaf(slot)) = record.slot(field.index) else {
                    return Err(schema.mismatch(field.name, "primitive"));
                };
                slot.assign(value).map_err(|reason| ConfigError::InvalidValue {
                    key: option.clone(),
                    reason,
                })?;
                tracing::trace!(option = %option, %value, "applied flag");
            }
            DescriptorKind::Nested { children, .. } => {
                if !any_supplied(children, flags) {
                    continue;
                }
                let Some(Slot::Record(nested)) = record.slot(field.index) else {
                    return Err(schema.mismatch(field.name, "record"));
                };
                apply(nested, children, flags)?;
            }
            // Unregistered leaves and unsupported fields are inert.
            DescriptorKind::Leaf { option: None, .. } | DescriptorKind::Unsupported => {}
        }
    }
    Ok(())
}

/// Whether any option at or below `schema` was supplied.
fn any_supplied(schema: &Schema, flags: &ParsedFlags) -> bool {
    schema.fields.iter().any(|field| match &field.kind {
        DescriptorKind::Leaf {
            option: Some(option),
            ..
        } => flags.is_supplied(option),
        DescriptorKind::Nested { children, .. } => any_supplied(children, flags),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Registry;
    use crate::fixtures::test::{Embedding, Scalars, Server, Wrapper};
    use crate::meta::{Decode, Field, FieldKind, Flags, Key, Shape};
    use crate::schema::extract;
    use crate::synth::synthesize;
    use crate::types::Kind;

    fn run<C: Flags>(config: &mut C, args: &[&str]) -> Result<(), ConfigError> {
        let mut schema = extract(&C::SHAPE)?;
        let mut registry = Registry::new();
        synthesize(&mut schema, &mut registry)?;
        let flags = registry.parse(args.iter().copied())?;
        apply(config, &schema, &flags)
    }

    #[test]
    fn supplied_leaves_overwrite() {
        let mut config = Scalars {
            text: "foo".into(),
            ratio: 1.23,
            count: 123,
        };
        run(&mut config, &["-string", "bar"]).unwrap();
        assert_eq!(
            config,
            Scalars {
                text: "bar".into(),
                ratio: 1.23,
                count: 123,
            }
        );
    }

    #[test]
    fn supplied_zero_still_overwrites() {
        let mut config = Scalars {
            text: "foo".into(),
            ratio: 1.23,
            count: 123,
        };
        run(&mut config, &["-int", "0", "-string", ""]).unwrap();
        assert_eq!(config.count, 0);
        assert_eq!(config.text, "");
        assert_eq!(config.ratio, 1.23);
    }

    #[test]
    fn unset_optional_record_is_allocated() {
        let mut config = Wrapper::default();
        run(&mut config, &["-foo.foo", "bar"]).unwrap();
        assert_eq!(config.foo.unwrap().foo, "bar");
    }

    #[test]
    fn untouched_optional_record_stays_unset() {
        let mut config = Wrapper::default();
        run(&mut config, &[]).unwrap();
        assert!(config.foo.is_none());
    }

    #[test]
    fn embedded_leaves_apply_to_inner_record() {
        let mut config = Embedding::default();
        run(&mut config, &["-int", "7", "-foo", "x"]).unwrap();
        assert_eq!(config.base.count, 7);
        assert_eq!(config.foo, "x");
    }

    #[test]
    fn unsupported_fields_are_inert() {
        let mut config = Server {
            debug: true,
            tags: vec!["a".into()],
            ..Server::default()
        };
        run(&mut config, &["-port", "8080", "-database.url", "pg://db"]).unwrap();
        assert!(config.debug);
        assert_eq!(config.tags, vec!["a".to_string()]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.database.url.as_deref(), Some("pg://db"));
        assert_eq!(config.database.pool_size, 0);
    }

    #[test]
    fn out_of_range_integer_is_invalid() {
        let mut config = Server::default();
        let err = run(&mut config, &["-port", "70000"]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, .. } if key == "port"
        ));
        assert_eq!(config.port, 0);
    }

    struct Lying {
        value: String,
    }

    impl Flags for Lying {
        const SHAPE: Shape = Shape {
            name: "Lying",
            fields: &[Field {
                name: "inner",
                key: Key::Named("inner"),
                help: "",
                kind: FieldKind::Nested {
                    shape: &Scalars::SHAPE,
                    embedded: false,
                },
            }],
        };
    }

    impl Record for Lying {
        fn slot(&mut self, index: usize) -> Option<Slot<'_>> {
            match index {
                0 => Some(Slot::Leaf(&mut self.value)),
                _ => None,
            }
        }

        fn field(&mut self, _: usize) -> Option<&mut dyn Decode> {
            None
        }
    }

    #[test]
    fn disagreeing_record_is_a_shape_mismatch() {
        let mut config = Lying {
            value: String::new(),
        };
        let err = run(&mut config, &["-inner.int", "1"]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ShapeMismatch { ref field, expected: "record" } if field == "Lying.inner"
        ));
    }

    #[test]
    fn missing_slot_is_a_shape_mismatch() {
        struct Empty;
        impl Flags for Empty {
            const SHAPE: Shape = Shape {
                name: "Empty",
                fields: &[Field {
                    name: "n",
                    key: Key::Named("n"),
                    help: "",
                    kind: FieldKind::Leaf(Kind::Integer),
                }],
            };
        }
        impl Record for Empty {
            fn slot(&mut self, _: usize) -> Option<Slot<'_>> {
                None
            }

            fn field(&mut self, _: usize) -> Option<&mut dyn Decode> {
                None
            }
        }
        let err = run(&mut Empty, &["-n", "1"]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ShapeMismatch {
                expected: "primitive",
                ..
            }
        ));
    }
}
