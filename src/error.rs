use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[cfg_attr(feature = "rich-errors", derive(miette::Diagnostic))]
pub enum ConfigError {
    #[error("Field '{field}' does not match its declared shape (expected {expected})")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagfig::shape)))]
    ShapeMismatch {
        field: String,
        expected: &'static str,
    },

    #[error("Field {index} of {shape} resolves to an empty option name")]
    #[cfg_attr(
        feature = "rich-errors",
        diagnostic(
            code(flagfig::empty_name),
            help("give the field a non-empty #[flag(name = \"...\")]")
        )
    )]
    EmptyName { shape: &'static str, index: usize },

    #[error("Option '{0}' is defined more than once")]
    #[cfg_attr(
        feature = "rich-errors",
        diagnostic(
            code(flagfig::name_collision),
            help("rename one of the fields with #[flag(name = \"...\")]")
        )
    )]
    NameCollision(String),

    #[error("{0}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagfig::args)))]
    Args(#[from] clap::Error),

    #[error("Failed to decode config document: {0}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagfig::document)))]
    Document(#[from] serde_json::Error),

    #[error("Unknown keys in config document: {}", .0.join(", "))]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagfig::unknown_keys)))]
    UnknownKeys(Vec<String>),

    #[error("Failed to read {path}: {source}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagfig::io)))]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read config document: {0}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagfig::read)))]
    Read(#[source] std::io::Error),

    #[error("Invalid value for '{key}': {reason}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagfig::invalid_value)))]
    InvalidValue { key: String, reason: String },
}
