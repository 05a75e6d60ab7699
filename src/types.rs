use std::fmt;
use std::io::Read;
use std::path::PathBuf;

/// The closed set of primitive kinds a config field can be set from the
/// command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Text,
    Float,
    Integer,
}

impl Kind {
    /// Placeholder shown in `--help` output, e.g. `--server.port <INT>`.
    pub fn value_name(self) -> &'static str {
        match self {
            Kind::Text => "TEXT",
            Kind::Float => "FLOAT",
            Kind::Integer => "INT",
        }
    }

    /// The value an option of this kind holds when it was not supplied.
    pub fn zero(self) -> FlagValue {
        match self {
            Kind::Text => FlagValue::Text(String::new()),
            Kind::Float => FlagValue::Float(0.0),
            Kind::Integer => FlagValue::Integer(0),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Text => write!(f, "text"),
            Kind::Float => write!(f, "float"),
            Kind::Integer => write!(f, "integer"),
        }
    }
}

/// A resolved option value, tagged with its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagValue {
    Text(String),
    Float(f64),
    Integer(i64),
}

impl FlagValue {
    pub fn kind(&self) -> Kind {
        match self {
            FlagValue::Text(_) => Kind::Text,
            FlagValue::Float(_) => Kind::Float,
            FlagValue::Integer(_) => Kind::Integer,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Text(s) => write!(f, "{s}"),
            FlagValue::Float(v) => write!(f, "{v}"),
            FlagValue::Integer(v) => write!(f, "{v}"),
        }
    }
}

/// Where the config document is read from.
pub enum Source<'a> {
    /// A file on disk, opened when the loader runs.
    File(PathBuf),
    /// An in-memory document.
    Bytes(Vec<u8>),
    /// Any byte stream.
    Reader(Box<dyn Read + 'a>),
}

impl fmt::Debug for Source<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::File(path) => f.debug_tuple("File").field(path).finish(),
            Source::Bytes(data) => f.debug_tuple("Bytes").field(&data.len()).finish(),
            Source::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}
