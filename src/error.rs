//! Error types for protokolo operations.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while loading metadata or compiling sections.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML in '{}': {source}", .path.display())]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("could not find '{}'", .path.display())]
    MetadataNotFound { path: PathBuf },

    #[error("'{}' is a directory, expected a file", .path.display())]
    MetadataIsADirectory { path: PathBuf },

    /// A metadata value has the wrong type.
    #[error("{}'{key}' does not have the correct type; expected {expected}, got {got}", path_prefix(.path))]
    WrongType {
        /// Dotted path of keys leading to the offending value.
        key: String,
        expected: &'static str,
        /// The offending value, rendered as TOML.
        got: String,
        /// The file the value came from, when known.
        path: Option<PathBuf>,
    },

    /// A metadata list contains something other than a table.
    #[error("{}'{key}' is a list that contains a non-table element: {got}", path_prefix(.path))]
    WrongTypeInList {
        key: String,
        got: String,
        path: Option<PathBuf>,
    },

    #[error("'{key}' must be a positive integer, got {value}")]
    AttributeNotPositive { key: &'static str, value: i64 },

    #[error("cannot format a header with level {0}, level must be positive")]
    NonPositiveLevel(i64),

    #[error("cannot format a header with an empty title")]
    EmptyTitle,

    #[error("{markup} does not support headers deeper than level {max}, got {level}")]
    LevelTooDeep {
        markup: &'static str,
        level: i64,
        max: i64,
    },

    #[error("unsupported markup language: {0}")]
    UnsupportedMarkup(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Attach the originating file path to a validation error that was raised
    /// without one. The deepest known path wins; already-annotated errors are
    /// returned unchanged.
    pub(crate) fn with_path(mut self, origin: &Path) -> Self {
        match &mut self {
            Error::WrongType { path, .. } | Error::WrongTypeInList { path, .. } => {
                if path.is_none() {
                    *path = Some(origin.to_path_buf());
                }
            }
            _ => {}
        }
        self
    }
}

fn path_prefix(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!("{}: ", p.display()),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_type_message_without_path() {
        let err = Error::WrongType {
            key: "level".to_string(),
            expected: "integer",
            got: "\"foo\"".to_string(),
            path: None,
        };
        assert_eq!(
            err.to_string(),
            "'level' does not have the correct type; expected integer, got \"foo\""
        );
    }

    #[test]
    fn wrong_type_message_with_path() {
        let err = Error::WrongType {
            key: "level".to_string(),
            expected: "integer",
            got: "\"foo\"".to_string(),
            path: None,
        }
        .with_path(Path::new("changelog.d/.protokolo.toml"));
        assert!(err.to_string().starts_with("changelog.d/.protokolo.toml: "));
    }

    #[test]
    fn with_path_keeps_existing_annotation() {
        let err = Error::WrongType {
            key: "title".to_string(),
            expected: "string",
            got: "1".to_string(),
            path: Some(PathBuf::from("deep/.protokolo.toml")),
        }
        .with_path(Path::new("shallow/.protokolo.toml"));
        match err {
            Error::WrongType { path, .. } => {
                assert_eq!(path.as_deref(), Some(Path::new("deep/.protokolo.toml")));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
