//! # protokolo
//!
//! A change log generator. Change log entries live as individual files in a
//! directory tree; each directory carries a `.protokolo.toml` describing a
//! section (title, header level, sort order). Compiling walks the tree and
//! produces a single formatted text block, ready to be spliced into an
//! existing CHANGELOG after a `protokolo-section-tag` marker line.
//!
//! ## Quick Start
//!
//! ```no_run
//! use protokolo::{Markup, Section};
//!
//! let section = Section::from_directory("changelog.d", Markup::Markdown).unwrap();
//! let block = section.compile(Markup::Markdown).unwrap();
//! println!("{block}");
//! ```
//!
//! ## Building trees by hand
//!
//! ```
//! use protokolo::{Entry, Markup, Section, SectionAttributes};
//!
//! let mut section = Section::new(SectionAttributes::new("1.0.0", 2).unwrap());
//! section.entries.push(Entry::new("- Added a thing."));
//! assert_eq!(
//!     section.compile(Markup::Markdown).unwrap(),
//!     "## 1.0.0\n\n- Added a thing."
//! );
//! ```

pub mod attributes;
pub mod config;
pub mod error;
pub mod format;
pub mod replace;
pub mod section;

pub use attributes::{DEFAULT_TITLE, SectionAttributes};
pub use config::GlobalConfig;
pub use error::{Error, Result};
pub use format::Markup;
pub use replace::{find_first_occurrence, insert_into_str};
pub use section::{Entry, METADATA_FILENAME, Section};
