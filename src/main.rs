//! protokolo - change log generator

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use protokolo::{GlobalConfig, Markup, Section, find_first_occurrence, insert_into_str};

/// Lines containing this marker are where compiled sections get spliced in.
const SECTION_TAG: &str = "protokolo-section-tag";

#[derive(Parser)]
#[command(name = "protokolo")]
#[command(version, about = "Change log generator", long_about = None)]
#[command(after_help = "EXAMPLES:
    protokolo compile changelog.d            Compile entries into the configured changelog
    protokolo compile --dry-run changelog.d  Print the compiled block without writing")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a directory of change log entries into a CHANGELOG file.
    ///
    /// Directories map to sections, files to entries. The compiled block is
    /// inserted after the line containing 'protokolo-section-tag', and the
    /// consumed entry files are deleted.
    Compile {
        /// File into which to compile
        #[arg(long, value_name = "FILE")]
        changelog: Option<PathBuf>,

        /// Markup language (markdown, restructuredtext)
        #[arg(long, value_name = "LANG")]
        markup: Option<String>,

        /// Print the compiled block to stdout instead of writing; keep entry files
        #[arg(long)]
        dry_run: bool,

        /// Suppress output messages
        #[arg(short, long)]
        quiet: bool,

        /// Directory of change log entries
        #[arg(value_name = "DIRECTORY")]
        directory: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Compile {
            changelog,
            markup,
            dry_run,
            quiet,
            directory,
        } => match compile(changelog, markup, directory, dry_run, quiet) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        },
    }
}

fn compile(
    changelog: Option<PathBuf>,
    markup: Option<String>,
    directory: Option<PathBuf>,
    dry_run: bool,
    quiet: bool,
) -> Result<(), String> {
    let config = load_config()?;

    let changelog = changelog
        .or(config.changelog)
        .ok_or("no changelog file specified; pass --changelog or set it in .protokolo.toml")?;
    let directory = directory
        .or(config.directory)
        .ok_or("no entry directory specified; pass DIRECTORY or set it in .protokolo.toml")?;
    let markup: Markup = markup
        .or(config.markup)
        .as_deref()
        .unwrap_or("markdown")
        .parse()
        .map_err(|e| format!("{e}"))?;

    let section = Section::from_directory(&directory, markup).map_err(|e| e.to_string())?;
    let block = section.compile(markup).map_err(|e| e.to_string())?;

    if dry_run {
        println!("{block}");
        return Ok(());
    }
    if block.is_empty() {
        if !quiet {
            println!("There are no change log entries to compile.");
        }
        return Ok(());
    }

    let contents = fs::read_to_string(&changelog)
        .map_err(|e| format!("could not read '{}': {e}", changelog.display()))?;
    let lineno = find_first_occurrence(SECTION_TAG, &contents).ok_or_else(|| {
        format!(
            "no '{SECTION_TAG}' marker found in '{}'",
            changelog.display()
        )
    })?;
    let new_contents = insert_into_str(&format!("\n{block}"), &contents, lineno);
    fs::write(&changelog, new_contents)
        .map_err(|e| format!("could not write '{}': {e}", changelog.display()))?;

    let sources = section.sources();
    for source in &sources {
        fs::remove_file(source)
            .map_err(|e| format!("could not remove '{}': {e}", source.display()))?;
    }

    if !quiet {
        println!("Compiled to '{}'.", changelog.display());
        println!("Removed {} change log entries.", sources.len());
    }
    Ok(())
}

/// Load defaults from the config file in the working directory, if present.
fn load_config() -> Result<GlobalConfig, String> {
    match GlobalConfig::find_config(Path::new(".")) {
        Some(path) => GlobalConfig::from_file(path).map_err(|e| e.to_string()),
        None => Ok(GlobalConfig::default()),
    }
}
