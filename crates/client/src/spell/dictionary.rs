//! Frequency dictionary loading.
//!
//! The format is one `word count` pair per line, whitespace separated. Blank
//! lines and lines starting with `#` are skipped. Words are lowercased; a word
//! listed twice keeps the larger count.

use std::collections::HashMap;
use std::path::Path;

/// English frequency list compiled into the binary.
pub const BUNDLED_DICTIONARY: &str = include_str!("../../data/frequency_dictionary_en.txt");

/// Errors from loading a frequency dictionary.
#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("failed to read dictionary {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("dictionary has no entries")]
    Empty,
}

/// Parse `word count` lines into a word -> count map.
pub fn parse_frequency_list(text: &str) -> Result<HashMap<String, u64>, DictionaryError> {
    let mut words = HashMap::new();

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split_whitespace();
        let (Some(word), Some(count), None) = (fields.next(), fields.next(), fields.next()) else {
            return Err(DictionaryError::Parse { line: idx + 1, reason: "expected `word count`".into() });
        };

        let count: u64 = count
            .parse()
            .map_err(|_| DictionaryError::Parse { line: idx + 1, reason: format!("invalid count {count:?}") })?;

        let entry = words.entry(word.to_lowercase()).or_insert(0);
        *entry = (*entry).max(count);
    }

    if words.is_empty() {
        return Err(DictionaryError::Empty);
    }

    Ok(words)
}

/// Read and parse a frequency list from disk.
pub fn read_frequency_file(path: &Path) -> Result<HashMap<String, u64>, DictionaryError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| DictionaryError::Io { path: path.display().to_string(), source })?;
    parse_frequency_list(&text)
}
