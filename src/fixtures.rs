#[cfg(test)]
pub mod test {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Serialize};

    use crate::Flags;

    /// One field per supported kind, named through serde.
    #[derive(Flags, Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    #[serde(default)]
    pub struct Scalars {
        #[serde(rename = "string")]
        pub text: String,
        #[serde(rename = "float")]
        pub ratio: f64,
        #[serde(rename = "int")]
        pub count: i64,
    }

    #[derive(Flags, Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    #[serde(default)]
    pub struct Leaf {
        pub foo: String,
    }

    /// An optional boxed record under the same name as its only leaf.
    #[derive(Flags, Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    #[serde(default)]
    pub struct Wrapper {
        #[flag(nested)]
        pub foo: Option<Box<Leaf>>,
    }

    #[derive(Flags, Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    #[serde(default)]
    pub struct Embedding {
        #[flag(flatten)]
        #[serde(flatten)]
        pub base: Scalars,
        pub foo: String,
    }

    #[derive(Flags, Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    #[serde(default)]
    pub struct Server {
        /// Address to bind.
        #[flag(name = "listen")]
        #[serde(rename = "addr")]
        pub address: String,

        /// Port to listen on.
        pub port: u16,

        pub debug: bool,

        pub tags: Vec<String>,

        /// Database settings.
        #[flag(nested)]
        pub database: Database,
    }

    #[derive(Flags, Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    #[serde(default)]
    pub struct Database {
        /// Connection string URL.
        pub url: Option<String>,

        /// Connection pool size.
        pub pool_size: u32,
    }

    #[derive(Flags, Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    #[serde(default)]
    pub struct Clash {
        pub port: u16,
        #[flag(name = "port")]
        pub admin_port: u16,
    }

    #[derive(Flags, Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    #[serde(default)]
    pub struct EmbeddedClash {
        #[flag(flatten)]
        pub base: Scalars,
        #[flag(name = "string")]
        pub label: String,
    }

    /// Nested optional record renamed through serde, next to a plain leaf.
    #[derive(Flags, Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    #[serde(default)]
    pub struct E {
        #[flag(nested)]
        #[serde(rename = "foo")]
        pub a: Option<Box<Scalars>>,
        pub bar: String,
    }

    /// An optional record embedded without a prefix, in the document too.
    #[derive(Flags, Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    #[serde(default)]
    pub struct EmbeddedPointer {
        #[flag(flatten)]
        #[serde(flatten)]
        pub a: Option<Box<Scalars>>,
        pub foo: String,
    }

    /// Values a JSON round trip cannot carry, plus a field serde never reads.
    #[derive(Flags, Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    #[serde(default)]
    pub struct Limits {
        pub name: String,
        pub timeout: f64,
        pub ceiling: u128,
        #[serde(skip)]
        pub cache: Vec<u8>,
    }

    #[derive(Flags, Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    #[serde(default, rename_all = "kebab-case")]
    pub struct Kebab {
        pub pool_size: i64,
        #[flag(nested)]
        pub read_replica: Option<Database>,
    }

    /// Catches every document key no other field claims.
    #[derive(Flags, Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    #[serde(default)]
    pub struct Extras {
        pub port: u16,
        #[serde(flatten)]
        pub rest: BTreeMap<String, serde_json::Value>,
    }
}
