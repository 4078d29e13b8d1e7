//! Markup-specific header rendering.
//!
//! Each supported markup language knows how to render a section header from a
//! title and a level, and which file extensions mark a file as a change log
//! entry. The rendering is pure string assembly; no I/O happens here.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::attributes::SectionAttributes;
use crate::error::{Error, Result};

/// Deepest header level reStructuredText supports.
const RESTRUCTUREDTEXT_MAX_LEVEL: i64 = 6;

/// Underline characters per reStructuredText header level. Levels 1 and 2
/// share `=`; level 1 additionally gets an overline.
const RESTRUCTUREDTEXT_MARKERS: [char; 6] = ['=', '=', '-', '~', '^', '\''];

/// A supported markup language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Markup {
    Markdown,
    Restructuredtext,
}

impl Markup {
    /// All supported markup languages.
    pub const ALL: [Markup; 2] = [Markup::Markdown, Markup::Restructuredtext];

    /// The identifier used in configuration files and on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Markup::Markdown => "markdown",
            Markup::Restructuredtext => "restructuredtext",
        }
    }

    /// File extensions recognised as change log entries for this markup.
    ///
    /// The empty string means files without an extension; Markdown treats
    /// those as entries too.
    pub const fn extensions(self) -> &'static [&'static str] {
        match self {
            Markup::Markdown => &["md", "markdown", ""],
            Markup::Restructuredtext => &["rst"],
        }
    }

    /// Whether *path* has an extension recognised for this markup.
    pub fn matches_extension(self, path: &Path) -> bool {
        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
        self.extensions().contains(&extension)
    }

    /// Render a section header from *attrs*.
    ///
    /// Title placeholders are resolved first. Fails if the level is not
    /// positive, the title is empty, or the level is deeper than this markup
    /// supports.
    pub fn format_section(self, attrs: &SectionAttributes) -> Result<String> {
        let title = attrs.resolved_title();
        let level = attrs.level;
        if level <= 0 {
            return Err(Error::NonPositiveLevel(level));
        }
        if title.is_empty() {
            return Err(Error::EmptyTitle);
        }
        match self {
            Markup::Markdown => {
                let pound_signs = "#".repeat(level as usize);
                Ok(format!("{pound_signs} {title}"))
            }
            Markup::Restructuredtext => {
                if level > RESTRUCTUREDTEXT_MAX_LEVEL {
                    return Err(Error::LevelTooDeep {
                        markup: self.name(),
                        level,
                        max: RESTRUCTUREDTEXT_MAX_LEVEL,
                    });
                }
                let marker = RESTRUCTUREDTEXT_MARKERS[level as usize - 1];
                let line: String = marker.to_string().repeat(title.chars().count());
                if level == 1 {
                    Ok(format!("{line}\n{title}\n{line}"))
                } else {
                    Ok(format!("{title}\n{line}"))
                }
            }
        }
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Markup {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Markup::ALL
            .into_iter()
            .find(|markup| markup.name() == s)
            .ok_or_else(|| Error::UnsupportedMarkup(s.to_string()))
    }
}
