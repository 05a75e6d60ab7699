//! Flag synthesis: register one command-line option per leaf of a schema.
//!
//! Nested records extend the dotted prefix with their name; embedded records
//! keep their parent's prefix. `Server { db: Db { url } }` registers
//! `--db.url`, never `--url` or `--Db.url`.

use crate::cli::Registry;
use crate::error::ConfigError;
use crate::schema::{DescriptorKind, Schema};

/// Register every leaf of `schema` in `registry`, recording the option name
/// on each leaf descriptor.
pub fn synthesize(schema: &mut Schema, registry: &mut Registry) -> Result<(), ConfigError> {
    synthesize_prefixed(schema, "", registry)
}

fn synthesize_prefixed(
    schema: &mut Schema,
    prefix: &str,
    registry: &mut Registry,
) -> Result<(), ConfigError> {
    for field in &mut schema.fields {
        let dotted = if prefix.is_empty() {
            field.name.to_string()
        } else {
            format!("{prefix}.{}", field.name)
        };
        match &mut field.kind {
            DescriptorKind::Leaf { kind, option } => {
                registry.register(&dotted, *kind, field.help)?;
                *option = Some(dotted);
            }
            DescriptorKind::Nested { embedded, children } => {
                let next = if *embedded { prefix } else { dotted.as_str() };
                synthesize_prefixed(children, next, registry)?;
            }
            DescriptorKind::Unsupported => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Flags;
    use crate::fixtures::test::{Clash, EmbeddedClash, Embedding, Scalars, Server, Wrapper};
    use crate::schema::extract;
    use crate::types::Kind;

    fn synthesized<C: Flags>() -> (Schema, Registry) {
        let mut schema = extract(&C::SHAPE).unwrap();
        let mut registry = Registry::new();
        synthesize(&mut schema, &mut registry).unwrap();
        (schema, registry)
    }

    #[test]
    fn root_leaves_are_unprefixed() {
        let (schema, registry) = synthesized::<Scalars>();
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["float", "int", "string"]
        );
        assert_eq!(registry.kind("int"), Some(Kind::Integer));
        assert_eq!(
            schema.fields[0].kind,
            DescriptorKind::Leaf {
                kind: Kind::Text,
                option: Some("string".into())
            }
        );
    }

    #[test]
    fn nested_leaves_are_dotted() {
        let (schema, registry) = synthesized::<Wrapper>();
        assert!(registry.contains("foo.foo"));
        assert!(!registry.contains("foo"));
        let DescriptorKind::Nested { children, .. } = &schema.fields[0].kind else {
            panic!("expected nested descriptor");
        };
        assert_eq!(
            children.fields[0].kind,
            DescriptorKind::Leaf {
                kind: Kind::Text,
                option: Some("foo.foo".into())
            }
        );
    }

    #[test]
    fn embedded_leaves_keep_parent_prefix() {
        let (_, registry) = synthesized::<Embedding>();
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["float", "foo", "int", "string"]
        );
    }

    #[test]
    fn unsupported_fields_register_nothing() {
        let (_, registry) = synthesized::<Server>();
        assert!(!registry.contains("debug"));
        assert!(!registry.contains("tags"));
        assert!(registry.contains("listen"));
        assert!(registry.contains("port"));
        assert!(registry.contains("database.url"));
        assert!(registry.contains("database.pool_size"));
    }

    #[test]
    fn sibling_collision_is_an_error() {
        let mut schema = extract(&Clash::SHAPE).unwrap();
        let mut registry = Registry::new();
        let err = synthesize(&mut schema, &mut registry).unwrap_err();
        assert!(matches!(err, ConfigError::NameCollision(name) if name == "port"));
    }

    #[test]
    fn embedded_collision_is_an_error() {
        let mut schema = extract(&EmbeddedClash::SHAPE).unwrap();
        let mut registry = Registry::new();
        let err = synthesize(&mut schema, &mut registry).unwrap_err();
        assert!(matches!(err, ConfigError::NameCollision(name) if name == "string"));
    }
}
