//! Global project configuration.
//!
//! A project can set defaults for the CLI in a `.protokolo.toml` at the
//! project root (table `[protokolo]`) or in `pyproject.toml` (table
//! `[tool.protokolo]`). `.protokolo.toml` wins when both exist.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use toml::value::Table;

use crate::error::{Error, Result};

/// Config file names in order of precedence, with the table path that holds
/// the protokolo settings in each.
const CONFIG_FILES: [(&str, &[&str]); 2] = [
    (".protokolo.toml", &["protokolo"]),
    ("pyproject.toml", &["tool", "protokolo"]),
];

/// Project-level defaults for the CLI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Path to the CHANGELOG file to splice into.
    pub changelog: Option<PathBuf>,
    /// Markup language identifier.
    pub markup: Option<String>,
    /// Directory containing the change log entries.
    pub directory: Option<PathBuf>,
}

impl GlobalConfig {
    /// Find the config file in *directory*, if any.
    pub fn find_config(directory: impl AsRef<Path>) -> Option<PathBuf> {
        let directory = directory.as_ref();
        CONFIG_FILES
            .iter()
            .map(|(name, _)| directory.join(name))
            .find(|candidate| candidate.is_file())
    }

    /// Load configuration from *path*. Which table is read depends on the
    /// file name; unknown file names read `[protokolo]`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let table_path: &[&str] = CONFIG_FILES
            .iter()
            .find(|(name, _)| path.file_name().is_some_and(|f| f == *name))
            .map(|(_, table_path)| *table_path)
            .unwrap_or(&["protokolo"]);

        let raw = fs::read_to_string(path)?;
        let document: Table = toml::from_str(&raw).map_err(|source| Error::TomlParse {
            path: path.to_path_buf(),
            source,
        })?;

        let mut value = toml::Value::Table(document);
        for key in table_path {
            match value.get(*key) {
                Some(nested) => value = nested.clone(),
                // No protokolo table at all: everything defaults.
                None => return Ok(Self::default()),
            }
        }
        value.try_into().map_err(|source| Error::TomlParse {
            path: path.to_path_buf(),
            source,
        })
    }
}
