//! Compound spelling correction over a word frequency dictionary.
//!
//! Single terms are matched with symmetric-delete lookup: every dictionary
//! word is indexed under the strings reachable by deleting up to
//! `max_edit_distance` characters from its first seven characters, and a query
//! term generates the same deletes to find candidates, which are then verified
//! with [`edit_distance`]. Across a phrase, adjacent terms may be merged
//! (`ein stein` -> `einstein`) and single terms may be split
//! (`alberteinstein` -> `albert einstein`).

pub mod dictionary;
pub mod distance;

pub use dictionary::{BUNDLED_DICTIONARY, DictionaryError};
pub use distance::edit_distance;

use std::cmp::{Ordering, Reverse};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Characters of each word that take part in the delete index.
const PREFIX_LENGTH: usize = 7;

/// A dictionary word close to a looked-up term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub term: String,
    pub distance: usize,
    pub count: u64,
}

impl Suggestion {
    /// Smaller distance wins, then higher frequency, then alphabetical order.
    fn ranks_before(&self, other: &Suggestion) -> bool {
        (self.distance, Reverse(self.count), &self.term) < (other.distance, Reverse(other.count), &other.term)
    }
}

/// One output term of a phrase correction.
struct Part {
    text: String,
    /// The input this part replaces, space-joined when terms were merged.
    origin: String,
    distance: usize,
    count: u64,
    mergeable: bool,
}

impl Part {
    fn verbatim(term: String, distance: usize) -> Self {
        Self { text: term.clone(), origin: term, distance, count: 0, mergeable: false }
    }
}

/// Read-only spelling corrector, built once and shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct SpellCorrector {
    words: HashMap<String, u64>,
    deletes: HashMap<String, Vec<String>>,
    max_edit_distance: usize,
    prefix_length: usize,
    max_word_len: usize,
}

impl SpellCorrector {
    /// Build from `(word, count)` pairs. Words are lowercased.
    pub fn from_entries<I, S>(entries: I, max_edit_distance: usize) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let mut corrector = Self {
            words: HashMap::new(),
            deletes: HashMap::new(),
            max_edit_distance,
            prefix_length: PREFIX_LENGTH,
            max_word_len: 0,
        };

        for (word, count) in entries {
            corrector.insert(word.into().to_lowercase(), count);
        }

        corrector
    }

    /// Build from `word count` lines.
    pub fn from_frequency_text(text: &str, max_edit_distance: usize) -> Result<Self, DictionaryError> {
        let words = dictionary::parse_frequency_list(text)?;
        Ok(Self::from_entries(words, max_edit_distance))
    }

    /// Build from the English dictionary compiled into the binary.
    pub fn bundled(max_edit_distance: usize) -> Result<Self, DictionaryError> {
        Self::from_frequency_text(BUNDLED_DICTIONARY, max_edit_distance)
    }

    /// Build from a `word count` file on disk.
    pub fn from_file(path: &Path, max_edit_distance: usize) -> Result<Self, DictionaryError> {
        let words = dictionary::read_frequency_file(path)?;
        Ok(Self::from_entries(words, max_edit_distance))
    }

    fn insert(&mut self, word: String, count: u64) {
        if let Some(existing) = self.words.get_mut(&word) {
            *existing = (*existing).max(count);
            return;
        }

        self.max_word_len = self.max_word_len.max(word.chars().count());
        for variant in deletes(&prefix(&word, self.prefix_length), self.max_edit_distance) {
            self.deletes.entry(variant).or_default().push(word.clone());
        }
        self.words.insert(word, count);
    }

    /// Number of dictionary words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Closest dictionary word within `max_edit_distance`, if any.
    pub fn lookup(&self, term: &str) -> Option<Suggestion> {
        let term = term.to_lowercase();
        if let Some(&count) = self.words.get(&term) {
            return Some(Suggestion { term, distance: 0, count });
        }

        let len = term.chars().count();
        if len > self.max_word_len + self.max_edit_distance {
            return None;
        }

        let mut best: Option<Suggestion> = None;
        let mut seen = HashSet::new();

        for variant in deletes(&prefix(&term, self.prefix_length), self.max_edit_distance) {
            let Some(candidates) = self.deletes.get(&variant) else {
                continue;
            };

            for word in candidates {
                if !seen.insert(word.as_str()) || word.chars().count().abs_diff(len) > self.max_edit_distance {
                    continue;
                }

                let distance = edit_distance(&term, word);
                if distance > self.max_edit_distance {
                    continue;
                }

                let count = self.words.get(word).copied().unwrap_or(0);
                let suggestion = Suggestion { term: word.clone(), distance, count };
                if best.as_ref().is_none_or(|current| suggestion.ranks_before(current)) {
                    best = Some(suggestion);
                }
            }
        }

        best
    }

    /// Correct a whole phrase.
    ///
    /// Terms are split on whitespace and underscores and lowercased. Terms
    /// containing anything other than letters pass through untouched, as do
    /// terms with no suggestion in range. When no term changes, `query` is
    /// returned exactly as given; otherwise the corrected terms are joined with
    /// single spaces.
    pub fn correct(&self, query: &str) -> String {
        let terms = query
            .split(|c: char| c.is_whitespace() || c == '_')
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);

        let mut parts: Vec<Part> = Vec::new();

        for term in terms {
            if !term.chars().all(char::is_alphabetic) {
                parts.push(Part::verbatim(term, 0));
                continue;
            }

            let single = self.lookup(&term);

            if let Some(merged) = self.merge(parts.last(), &term, single.as_ref()) {
                tracing::trace!(from = %merged.origin, to = %merged.text, "merged terms");
                parts.pop();
                parts.push(merged);
                continue;
            }

            parts.push(self.best_for_term(term, single));
        }

        if parts.iter().all(|part| part.text == part.origin) {
            return query.to_string();
        }

        parts.iter().map(|part| part.text.as_str()).collect::<Vec<_>>().join(" ")
    }

    fn unknown_distance(&self) -> usize {
        self.max_edit_distance + 1
    }

    /// Longest term that can still have a suggestion.
    fn max_term_len(&self) -> usize {
        self.max_word_len + self.max_edit_distance
    }

    /// Merge `term` into the previous part when the joined word beats the pair
    /// by more than the removed space. On a tie the more frequent reading wins.
    fn merge(&self, prev: Option<&Part>, term: &str, single: Option<&Suggestion>) -> Option<Part> {
        let prev = prev.filter(|part| part.mergeable)?;
        let joined = format!("{}{}", prev.origin.replace(' ', ""), term);
        let combined = self.lookup(&joined)?;

        let separate = prev.distance + single.map_or(self.unknown_distance(), |s| s.distance);
        let pair_count = prev.count.min(single.map_or(0, |s| s.count));
        let wins = match (combined.distance + 1).cmp(&separate) {
            Ordering::Less => true,
            Ordering::Equal => combined.count > pair_count,
            Ordering::Greater => false,
        };

        wins.then(|| Part {
            text: combined.term,
            origin: format!("{} {}", prev.origin, term),
            distance: combined.distance,
            count: combined.count,
            mergeable: true,
        })
    }

    /// The single-word suggestion, or a two-word split when that is closer (or
    /// as close and more frequent). The inserted space counts as one edit.
    ///
    /// Only split points where both halves fit within [`Self::max_term_len`]
    /// are tried, so the cost stays linear in the term length.
    fn best_for_term(&self, term: String, single: Option<Suggestion>) -> Part {
        if let Some(found) = &single
            && found.distance == 0
        {
            return Part { text: term.clone(), origin: term, distance: 0, count: found.count, mergeable: true };
        }

        let single_distance = single.as_ref().map_or(self.unknown_distance(), |s| s.distance);
        let single_count = single.as_ref().map_or(0, |s| s.count);
        let mut split: Option<Suggestion> = None;

        let chars: Vec<char> = term.chars().collect();
        let bound = self.max_term_len();
        let first = chars.len().saturating_sub(bound).max(1);
        let last = bound.min(chars.len().saturating_sub(1));
        for i in first..=last {
            let head: String = chars[..i].iter().collect();
            let tail: String = chars[i..].iter().collect();

            let (Some(head), Some(tail)) = (self.lookup(&head), self.lookup(&tail)) else {
                continue;
            };

            let text = format!("{} {}", head.term, tail.term);
            let distance = edit_distance(&term, &text);
            let count = head.count.min(tail.count);
            if distance > self.max_edit_distance
                || distance > single_distance
                || (distance == single_distance && count <= single_count)
            {
                continue;
            }

            let candidate = Suggestion { term: text, distance, count };
            if split.as_ref().is_none_or(|current| candidate.ranks_before(current)) {
                split = Some(candidate);
            }
        }

        match (split, single) {
            (Some(split), _) => {
                tracing::trace!(from = %term, to = %split.term, "split term");
                Part { text: split.term, origin: term, distance: split.distance, count: split.count, mergeable: false }
            }
            (None, Some(found)) => {
                Part { text: found.term, origin: term, distance: found.distance, count: found.count, mergeable: true }
            }
            (None, None) => {
                let distance = self.unknown_distance();
                Part { mergeable: true, ..Part::verbatim(term, distance) }
            }
        }
    }
}

fn prefix(word: &str, len: usize) -> String {
    word.chars().take(len).collect()
}

/// All strings reachable from `word` by deleting up to `max_distance` chars,
/// including `word` itself.
fn deletes(word: &str, max_distance: usize) -> HashSet<String> {
    let mut out = HashSet::from([word.to_string()]);
    let mut frontier = vec![word.to_string()];

    for _ in 0..max_distance {
        let mut next = Vec::new();
        for candidate in &frontier {
            let chars: Vec<char> = candidate.chars().collect();
            for skip in 0..chars.len() {
                let deleted: String =
                    chars.iter().enumerate().filter(|(i, _)| *i != skip).map(|(_, c)| *c).collect();
                if out.insert(deleted.clone()) {
                    next.push(deleted);
                }
            }
        }
        frontier = next;
    }

    out
}
