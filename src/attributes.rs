//! Validated per-section metadata.
//!
//! Every change log directory carries a `.protokolo.toml` whose
//! `[protokolo.section]` table describes the section: a title, a header
//! level, an optional sort order, and any number of free-form keys usable as
//! `$key` placeholders in the title.

use toml::Value;
use toml::value::Table;

use crate::error::{Error, Result};

/// Title used when a section does not define one.
pub const DEFAULT_TITLE: &str = "TODO: No section title defined";

/// Metadata for one [`Section`](crate::Section).
///
/// `title`, `level` and `order` are typed and validated; everything else from
/// the metadata table lands in `extra` and is available for title placeholder
/// substitution.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionAttributes {
    pub title: String,
    /// Header depth, 1 is top-level. Must be positive.
    pub level: i64,
    /// Explicit sort priority among siblings. Must be positive when present;
    /// absent means "sort after all ordered siblings, by title".
    pub order: Option<i64>,
    /// Free-form metadata, used as substitution values in the title.
    pub extra: Table,
}

impl Default for SectionAttributes {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            level: 1,
            order: None,
            extra: Table::new(),
        }
    }
}

impl SectionAttributes {
    /// Create attributes with a title and level, validating the level.
    pub fn new(title: impl Into<String>, level: i64) -> Result<Self> {
        let attrs = Self {
            title: title.into(),
            level,
            ..Self::default()
        };
        attrs.validate()?;
        Ok(attrs)
    }

    /// Set an explicit sort order, validating it.
    pub fn with_order(mut self, order: i64) -> Result<Self> {
        self.order = Some(order);
        self.validate()?;
        Ok(self)
    }

    /// Build attributes from a parsed `[protokolo.section]` table.
    pub fn from_table(table: &Table) -> Result<Self> {
        Self::from_table_with_level(table, 1)
    }

    /// Like [`from_table`](Self::from_table), but a table that does not set
    /// `level` inherits *default_level* (the depth the directory walk has
    /// reached) instead of 1.
    pub fn from_table_with_level(table: &Table, default_level: i64) -> Result<Self> {
        let mut attrs = Self {
            level: default_level,
            ..Self::default()
        };
        for (key, value) in table {
            match key.as_str() {
                "title" => match value {
                    Value::String(title) => attrs.title = title.clone(),
                    other => return Err(wrong_type(key, "string", other)),
                },
                "level" => match value {
                    Value::Integer(level) => attrs.level = *level,
                    other => return Err(wrong_type(key, "integer", other)),
                },
                "order" => match value {
                    Value::Integer(order) => attrs.order = Some(*order),
                    other => return Err(wrong_type(key, "integer", other)),
                },
                _ => {
                    validate_extra(key, value)?;
                    attrs.extra.insert(key.clone(), value.clone());
                }
            }
        }
        attrs.validate()?;
        Ok(attrs)
    }

    /// Check the positive-integer constraints on `level` and `order`.
    pub fn validate(&self) -> Result<()> {
        if self.level <= 0 {
            return Err(Error::AttributeNotPositive {
                key: "level",
                value: self.level,
            });
        }
        if let Some(order) = self.order {
            if order <= 0 {
                return Err(Error::AttributeNotPositive {
                    key: "order",
                    value: order,
                });
            }
        }
        Ok(())
    }

    /// The title with `$key`/`${key}` placeholders substituted from `extra`.
    ///
    /// `$$` is a literal dollar sign, and `date` defaults to today when the
    /// metadata does not define it. Unknown placeholders are left untouched.
    pub fn resolved_title(&self) -> String {
        substitute(&self.title, &self.extra)
    }
}

fn wrong_type(key: &str, expected: &'static str, got: &Value) -> Error {
    Error::WrongType {
        key: key.to_string(),
        expected,
        got: got.to_string(),
        path: None,
    }
}

/// Recursively validate a free-form metadata value. Scalars and tables are
/// fine at any depth; a list may contain only tables.
fn validate_extra(key_path: &str, value: &Value) -> Result<()> {
    match value {
        Value::Table(table) => {
            for (key, nested) in table {
                validate_extra(&format!("{key_path}.{key}"), nested)?;
            }
            Ok(())
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Table(table) => {
                        for (key, nested) in table {
                            validate_extra(&format!("{key_path}.{key}"), nested)?;
                        }
                    }
                    other => {
                        return Err(Error::WrongTypeInList {
                            key: key_path.to_string(),
                            got: other.to_string(),
                            path: None,
                        });
                    }
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Substitute `$key` and `${key}` placeholders in *template*.
fn substitute(template: &str, values: &Table) -> String {
    let mut result = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }
        match chars.peek() {
            Some('$') => {
                chars.next();
                result.push('$');
            }
            Some('{') => {
                chars.next();
                let mut name = String::new();
                let mut closed = false;
                while let Some(&c) = chars.peek() {
                    chars.next();
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                match lookup(&name, values) {
                    Some(value) if closed => result.push_str(&value),
                    _ => {
                        // Unknown or unterminated placeholder stays literal.
                        result.push_str("${");
                        result.push_str(&name);
                        if closed {
                            result.push('}');
                        }
                    }
                }
            }
            Some(&c) if c.is_ascii_alphanumeric() || c == '_' => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match lookup(&name, values) {
                    Some(value) => result.push_str(&value),
                    None => {
                        result.push('$');
                        result.push_str(&name);
                    }
                }
            }
            _ => result.push('$'),
        }
    }
    result
}

/// Resolve one placeholder name. Scalars render plainly (strings without
/// quotes); tables and lists are not substitutable.
fn lookup(name: &str, values: &Table) -> Option<String> {
    match values.get(name) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Integer(i)) => Some(i.to_string()),
        Some(Value::Float(f)) => Some(f.to_string()),
        Some(Value::Boolean(b)) => Some(b.to_string()),
        Some(Value::Datetime(dt)) => Some(dt.to_string()),
        Some(Value::Table(_)) | Some(Value::Array(_)) => None,
        None if name == "date" => Some(chrono::Local::now().date_naive().to_string()),
        None => None,
    }
}
