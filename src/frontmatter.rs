//! Parsing for the optional `---`-delimited metadata block at the top of a
//! post source file.
//!
//! The block is deliberately not treated as full YAML: each line between the
//! delimiters is split on its first colon, values are trimmed, and one pair
//! of matching surrounding quotes is dropped. Anything malformed degrades to
//! "no front matter" rather than an error, so a plain Markdown file (or one
//! with a stray `---` ruler) always passes through untouched.

use std::collections::HashMap;

const DELIMITER: &str = "---";

/// Splits a document into its front-matter metadata and the remaining text.
///
/// Returns the parsed `key: value` pairs and the document with the delimited
/// block removed. If the document ends with a newline, so does the nonempty
/// remainder. Documents without an opening `---` line, or with an opening
/// line but no closing one, are returned unchanged with an empty map.
pub fn parse(text: &str) -> (HashMap<String, String>, String) {
    if !text.starts_with("---\n") && !text.starts_with("---\r\n") {
        return (HashMap::new(), text.to_owned());
    }

    let lines: Vec<&str> = text.lines().collect();
    for idx in 1..lines.len() {
        if lines[idx].trim() != DELIMITER {
            continue;
        }

        let mut metadata = HashMap::new();
        for line in &lines[1..idx] {
            if let Some((key, value)) = line.split_once(':') {
                metadata.insert(key.trim().to_owned(), unquote(value.trim()).to_owned());
            }
        }

        let mut rest = lines[idx + 1..].join("\n");
        if text.ends_with('\n') && !rest.is_empty() && !rest.ends_with('\n') {
            rest.push('\n');
        }
        return (metadata, rest);
    }

    // Opening delimiter without a closing one: intentional silent
    // pass-through, not an error.
    (HashMap::new(), text.to_owned())
}

/// Drops one pair of matching surrounding quotes, if present.
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
