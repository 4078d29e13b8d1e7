//! Find-and-insert in an existing CHANGELOG.
//!
//! The CLI looks for a marker line in the changelog and splices the newly
//! compiled section block right after it. These are pure string functions;
//! file handling stays with the caller.

/// Return the 1-indexed line number of the first line of *source* that
/// contains *text*, or `None` if no line does.
pub fn find_first_occurrence(text: &str, source: &str) -> Option<usize> {
    source
        .lines()
        .position(|line| line.contains(text))
        .map(|index| index + 1)
}

/// Insert *text* into *target* after line *lineno* (1-indexed; 0 inserts at
/// the very start). A newline is appended after *text*.
pub fn insert_into_str(text: &str, target: &str, lineno: usize) -> String {
    let target_lines: Vec<&str> = target.split_inclusive('\n').collect();
    let mut text_lines: Vec<&str> = text.split_inclusive('\n').collect();
    if !text_lines.is_empty() {
        text_lines.push("\n");
    }
    // Corner case for inserting at the end when the last character is not a
    // newline.
    if lineno == target_lines.len()
        && target_lines.last().is_some_and(|line| !line.ends_with('\n'))
    {
        text_lines.insert(0, "\n");
    }

    let mut result = String::with_capacity(target.len() + text.len() + 2);
    for line in &target_lines[..lineno] {
        result.push_str(line);
    }
    for line in &text_lines {
        result.push_str(line);
    }
    for line in &target_lines[lineno..] {
        result.push_str(line);
    }
    result
}
