//! The section/entry tree and its compilation.
//!
//! A change log directory maps onto a [`Section`]: its `.protokolo.toml`
//! provides the section's attributes, files with a matching markup extension
//! become [`Entry`] values, and subdirectories become subsections. Compiling
//! a section renders the header, then the entries, then the non-empty
//! subsections, all in a deterministic order that does not depend on how the
//! tree was built.

use std::cmp::Ordering;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use toml::value::Table;

use crate::attributes::SectionAttributes;
use crate::error::{Error, Result};
use crate::format::Markup;

/// Name of the per-directory metadata file.
pub const METADATA_FILENAME: &str = ".protokolo.toml";

/// One change log fragment, analogous to a file.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Raw file contents.
    pub text: String,
    /// The file the text came from; absent for programmatic entries.
    pub source: Option<PathBuf>,
}

impl Entry {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: None,
        }
    }

    pub fn with_source(text: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            text: text.into(),
            source: Some(source.into()),
        }
    }

    /// The entry text with surrounding newline characters stripped. Other
    /// whitespace is preserved.
    pub fn compile(&self) -> &str {
        self.text.trim_matches('\n')
    }
}

/// A section, analogous to a directory.
#[derive(Debug, Clone, Default)]
pub struct Section {
    pub attrs: SectionAttributes,
    /// The directory this section was loaded from, if any.
    pub source: Option<PathBuf>,
    pub entries: Vec<Entry>,
    pub subsections: Vec<Section>,
}

impl Section {
    pub fn new(attrs: SectionAttributes) -> Self {
        Self {
            attrs,
            ..Self::default()
        }
    }

    /// Recursively build a section tree from *directory*.
    ///
    /// Every directory must contain a `.protokolo.toml`; its
    /// `[protokolo.section]` table provides the attributes. A subdirectory's
    /// level defaults to one deeper than its parent unless the metadata sets
    /// one explicitly. Files whose extension matches *markup* become entries.
    pub fn from_directory(directory: impl AsRef<Path>, markup: Markup) -> Result<Self> {
        Self::load_directory(directory.as_ref(), markup, 1)
    }

    fn load_directory(directory: &Path, markup: Markup, level: i64) -> Result<Self> {
        let metadata_path = directory.join(METADATA_FILENAME);
        if !metadata_path.exists() {
            return Err(Error::MetadataNotFound {
                path: metadata_path,
            });
        }
        if metadata_path.is_dir() {
            return Err(Error::MetadataIsADirectory {
                path: metadata_path,
            });
        }
        let attrs = Self::load_attributes(&metadata_path, level)?;

        let mut section = Section {
            attrs,
            source: Some(directory.to_path_buf()),
            entries: Vec::new(),
            subsections: Vec::new(),
        };
        for dir_entry in fs::read_dir(directory)? {
            let dir_entry = dir_entry?;
            let path = dir_entry.path();
            let file_type = dir_entry.file_type()?;
            if file_type.is_dir() {
                section
                    .subsections
                    .push(Self::load_directory(&path, markup, level + 1)?);
            } else if file_type.is_file()
                && path.file_name() != Some(OsStr::new(METADATA_FILENAME))
                && markup.matches_extension(&path)
            {
                let text = fs::read_to_string(&path)?;
                section.entries.push(Entry::with_source(text, path));
            }
        }
        Ok(section)
    }

    /// Parse a `.protokolo.toml` and extract attributes from its
    /// `[protokolo.section]` table. A missing table yields default attributes
    /// at the inherited level.
    fn load_attributes(metadata_path: &Path, level: i64) -> Result<SectionAttributes> {
        let raw = fs::read_to_string(metadata_path)?;
        let document: Table = toml::from_str(&raw).map_err(|source| Error::TomlParse {
            path: metadata_path.to_path_buf(),
            source,
        })?;
        let section_table = document
            .get("protokolo")
            .and_then(|value| value.get("section"))
            .and_then(|value| value.as_table());
        match section_table {
            Some(table) => SectionAttributes::from_table_with_level(table, level)
                .map_err(|err| err.with_path(metadata_path)),
            None => Ok(SectionAttributes {
                level,
                ..SectionAttributes::default()
            }),
        }
    }

    /// Whether this section would render nothing: no entries, and every
    /// subsection recursively empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.subsections.iter().all(Section::is_empty)
    }

    /// Render the section tree to text.
    ///
    /// An empty section compiles to the empty string. Otherwise the header
    /// comes first, then each entry, then each non-empty subsection, with
    /// blank lines between blocks.
    pub fn compile(&self, markup: Markup) -> Result<String> {
        if self.is_empty() {
            return Ok(String::new());
        }
        let mut output = markup.format_section(&self.attrs)?;
        for entry in self.sorted_entries() {
            output.push_str("\n\n");
            output.push_str(entry.compile());
        }
        for subsection in self.sorted_subsections() {
            if subsection.is_empty() {
                continue;
            }
            output.push_str("\n\n");
            output.push_str(&subsection.compile(markup)?);
        }
        Ok(output)
    }

    /// Entries in render order: sourced entries first, by file name, then
    /// sourceless entries by text.
    fn sorted_entries(&self) -> Vec<&Entry> {
        let mut entries: Vec<&Entry> = self.entries.iter().collect();
        entries.sort_by(|a, b| match (&a.source, &b.source) {
            (Some(a_source), Some(b_source)) => a_source.file_name().cmp(&b_source.file_name()),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.text.cmp(&b.text),
        });
        entries
    }

    /// Subsections in render order: explicitly ordered ones first, by
    /// (order, title), then the rest by title.
    fn sorted_subsections(&self) -> Vec<&Section> {
        let mut subsections: Vec<&Section> = self.subsections.iter().collect();
        subsections.sort_by(|a, b| match (a.attrs.order, b.attrs.order) {
            (Some(a_order), Some(b_order)) => a_order
                .cmp(&b_order)
                .then_with(|| a.attrs.title.cmp(&b.attrs.title)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.attrs.title.cmp(&b.attrs.title),
        });
        subsections
    }

    /// Paths of all entry files in this tree, recursively. These are the
    /// files a compile run consumes.
    pub fn sources(&self) -> Vec<&Path> {
        let mut sources = Vec::new();
        self.collect_sources(&mut sources);
        sources
    }

    fn collect_sources<'a>(&'a self, sources: &mut Vec<&'a Path>) {
        for entry in &self.entries {
            if let Some(source) = &entry.source {
                sources.push(source);
            }
        }
        for subsection in &self.subsections {
            subsection.collect_sources(sources);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(title: &str, level: i64) -> Section {
        Section::new(SectionAttributes::new(title, level).unwrap())
    }

    fn ordered_section(title: &str, level: i64, order: i64) -> Section {
        Section::new(
            SectionAttributes::new(title, level)
                .unwrap()
                .with_order(order)
                .unwrap(),
        )
    }

    #[test]
    fn compile_simple() {
        let mut subsection = section("Subsection", 2);
        subsection.entries.push(Entry::new("- world"));
        let mut root = section("Section", 1);
        root.entries.push(Entry::new("- hello"));
        root.subsections.push(subsection);

        assert_eq!(
            root.compile(Markup::Markdown).unwrap(),
            "# Section\n\n- hello\n\n## Subsection\n\n- world"
        );
    }

    #[test]
    fn compile_empty() {
        let root = Section::default();
        assert_eq!(root.compile(Markup::Markdown).unwrap(), "");
    }

    #[test]
    fn compile_restructuredtext() {
        let mut subsection = section("Subsection", 2);
        subsection.entries.push(Entry::new("- world"));
        let mut root = section("Section", 1);
        root.entries.push(Entry::new("- hello"));
        root.subsections.push(subsection);

        assert_eq!(
            root.compile(Markup::Restructuredtext).unwrap(),
            "=======\nSection\n=======\n\n- hello\n\nSubsection\n==========\n\n- world"
        );
    }

    #[test]
    fn compile_is_idempotent() {
        let mut root = section("Section", 1);
        root.entries.push(Entry::new("- hello"));
        let first = root.compile(Markup::Markdown).unwrap();
        let second = root.compile(Markup::Markdown).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_subsection_not_rendered() {
        let mut root = section("Section", 1);
        root.entries.push(Entry::new("- hello"));
        root.subsections.push(section("Empty", 2));

        // No trailing separator for the pruned subsection.
        assert_eq!(
            root.compile(Markup::Markdown).unwrap(),
            "# Section\n\n- hello"
        );
    }

    #[test]
    fn emptiness_propagates() {
        let mut middle = section("Middle", 2);
        middle.subsections.push(section("Inner", 3));
        let mut root = section("Section", 1);
        root.subsections.push(middle);

        assert!(root.is_empty());
        assert_eq!(root.compile(Markup::Markdown).unwrap(), "");
    }

    #[test]
    fn entry_deep_down_makes_tree_non_empty() {
        let mut inner = section("Inner", 3);
        inner.entries.push(Entry::new("- deep"));
        let mut middle = section("Middle", 2);
        middle.subsections.push(inner);
        let mut root = section("Section", 1);
        root.subsections.push(middle);

        assert!(!root.is_empty());
        assert_eq!(
            root.compile(Markup::Markdown).unwrap(),
            "# Section\n\n## Middle\n\n### Inner\n\n- deep"
        );
    }

    #[test]
    fn subsections_order_specified() {
        let mut root = section("Section", 1);
        root.subsections.push(ordered_section("Subsection Bar", 2, 2));
        root.subsections.push(ordered_section("Subsection Foo", 2, 1));
        root.subsections[0].entries.push(Entry::new("- bar"));
        root.subsections[1].entries.push(Entry::new("- foo"));

        assert_eq!(
            root.compile(Markup::Markdown).unwrap(),
            "# Section\n\n## Subsection Foo\n\n- foo\n\n## Subsection Bar\n\n- bar"
        );
    }

    #[test]
    fn subsections_order_alphabetic() {
        let mut root = section("Section", 1);
        root.subsections.push(section("Subsection Foo", 2));
        root.subsections.push(section("Subsection Bar", 2));
        for subsection in &mut root.subsections {
            subsection.entries.push(Entry::new("- x"));
        }

        assert_eq!(
            root.compile(Markup::Markdown).unwrap(),
            "# Section\n\n## Subsection Bar\n\n- x\n\n## Subsection Foo\n\n- x"
        );
    }

    #[test]
    fn subsections_ordered_before_unordered() {
        // {Foo: 1, Bar: 2, Baz: none, Quz: none} renders Foo, Bar, Baz, Quz.
        let mut root = section("Section", 1);
        for sub in [
            section("Quz", 2),
            ordered_section("Bar", 2, 2),
            section("Baz", 2),
            ordered_section("Foo", 2, 1),
        ] {
            root.subsections.push(sub);
        }
        for subsection in &mut root.subsections {
            subsection.entries.push(Entry::new("- x"));
        }

        let output = root.compile(Markup::Markdown).unwrap();
        let headers: Vec<usize> = ["## Foo", "## Bar", "## Baz", "## Quz"]
            .iter()
            .map(|header| output.find(header).unwrap())
            .collect();
        assert!(headers.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn subsections_equal_order_breaks_tie_by_title() {
        let mut root = section("Section", 1);
        root.subsections.push(ordered_section("Zulu", 2, 1));
        root.subsections.push(ordered_section("Alpha", 2, 1));
        for subsection in &mut root.subsections {
            subsection.entries.push(Entry::new("- x"));
        }

        let output = root.compile(Markup::Markdown).unwrap();
        assert!(output.find("## Alpha").unwrap() < output.find("## Zulu").unwrap());
    }

    #[test]
    fn entries_sorted_by_source_file_name() {
        let mut root = section("Section", 1);
        // Insert in descending order; output must ascend by file name.
        for i in (0..10).rev() {
            root.entries.push(Entry::with_source(
                format!("- entry {i}"),
                format!("changelog.d/{i:02}_entry.md"),
            ));
        }

        let expected: Vec<String> = (0..10).map(|i| format!("- entry {i}")).collect();
        assert_eq!(
            root.compile(Markup::Markdown).unwrap(),
            format!("# Section\n\n{}", expected.join("\n\n"))
        );
    }

    #[test]
    fn sourceless_entries_sort_after_sourced() {
        let mut root = section("Section", 1);
        root.entries.push(Entry::new("- aaa sourceless"));
        root.entries
            .push(Entry::with_source("- zzz sourced", "zzz.md"));

        assert_eq!(
            root.compile(Markup::Markdown).unwrap(),
            "# Section\n\n- zzz sourced\n\n- aaa sourceless"
        );
    }

    #[test]
    fn duplicate_sourceless_entries_kept() {
        let mut root = section("Section", 1);
        root.entries.push(Entry::new("- same"));
        root.entries.push(Entry::new("- same"));

        assert_eq!(
            root.compile(Markup::Markdown).unwrap(),
            "# Section\n\n- same\n\n- same"
        );
    }

    #[test]
    fn entry_strips_surrounding_newlines_only() {
        let entry = Entry::new("\n\n- hello\n");
        assert_eq!(entry.compile(), "- hello");

        // Inner newlines and other whitespace stay.
        let entry = Entry::new("\n  - indented\nsecond line  \n\n");
        assert_eq!(entry.compile(), "  - indented\nsecond line  ");
    }

    #[test]
    fn compile_propagates_formatter_errors() {
        let mut root = section("Section", 1);
        root.attrs.level = 7;
        root.entries.push(Entry::new("- hello"));
        assert!(matches!(
            root.compile(Markup::Restructuredtext),
            Err(Error::LevelTooDeep { level: 7, .. })
        ));
    }

    #[test]
    fn sources_collects_recursively() {
        let mut subsection = section("Subsection", 2);
        subsection
            .entries
            .push(Entry::with_source("- b", "dir/sub/b.md"));
        let mut root = section("Section", 1);
        root.entries.push(Entry::with_source("- a", "dir/a.md"));
        root.entries.push(Entry::new("- programmatic"));
        root.subsections.push(subsection);

        let sources = root.sources();
        assert_eq!(sources.len(), 2);
        assert!(sources.contains(&Path::new("dir/a.md")));
        assert!(sources.contains(&Path::new("dir/sub/b.md")));
    }
}
