//! Query normalization into canonical cache keys.
//!
//! The same key is used for the cache lookup and as the path segment sent to the
//! summary API, so both sides always agree on how a query is spelled.

use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};

/// Bytes left unencoded in a canonical term: ASCII alphanumerics plus `_ . - ~`.
const TERM_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'_').remove(b'.').remove(b'-').remove(b'~');

/// A normalized, percent-encoded query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalTerm(String);

impl CanonicalTerm {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the term back into readable text, with underscores as spaces.
    pub fn plain_text(&self) -> String {
        percent_decode_str(&self.0).decode_utf8_lossy().replace('_', " ")
    }
}

impl fmt::Display for CanonicalTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalTerm {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalize a raw query into its canonical term.
///
/// Steps:
/// 1. Lowercase the whole string
/// 2. Replace each space with `_`
/// 3. Title-case: a letter following a non-letter (or at the start) is uppercased
/// 4. Percent-encode everything outside `[A-Za-z0-9_.~-]`
pub fn normalize(query: &str) -> CanonicalTerm {
    let underscored = query.to_lowercase().replace(' ', "_");
    let titled = title_case(&underscored);
    CanonicalTerm(utf8_percent_encode(&titled, TERM_ENCODE_SET).to_string())
}

// Word boundaries follow `char::is_alphabetic`, so uncased scripts such as CJK
// pass through unchanged and digraphs like `ǆ` take their uppercase form `Ǆ`,
// not the titlecase `ǅ`.
fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_is_letter = false;

    for c in input.chars() {
        if c.is_alphabetic() {
            let mut upper = c.to_uppercase();
            match (prev_is_letter, upper.len()) {
                (false, 1) => out.extend(upper.next()),
                // no single-char title form (e.g. `ß`), leave it lowercase
                (false, _) => out.push(c),
                (true, _) => out.extend(c.to_lowercase()),
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize("albert einstein").as_str(), "Albert_Einstein");
    }

    #[test]
    fn test_normalize_mixed_case() {
        assert_eq!(normalize("aLBeRT EINSTEIN").as_str(), "Albert_Einstein");
    }

    #[test]
    fn test_normalize_keeps_existing_underscores() {
        assert_eq!(normalize("albert_einstein").as_str(), "Albert_Einstein");
    }

    #[test]
    fn test_normalize_title_case_after_punctuation() {
        assert_eq!(normalize("o'neil").as_str(), "O%27Neil");
        assert_eq!(normalize("jean-paul sartre").as_str(), "Jean-Paul_Sartre");
    }

    #[test]
    fn test_normalize_digits_break_words() {
        assert_eq!(normalize("1984 novel").as_str(), "1984_Novel");
        assert_eq!(normalize("c3po").as_str(), "C3Po");
    }

    #[test]
    fn test_normalize_encodes_reserved() {
        assert_eq!(normalize("ac/dc").as_str(), "Ac%2FDc");
        assert_eq!(normalize("r&b").as_str(), "R%26B");
        assert_eq!(normalize("c++").as_str(), "C%2B%2B");
    }

    #[test]
    fn test_normalize_non_ascii() {
        assert_eq!(normalize("éclair").as_str(), "%C3%89clair");
        assert_eq!(normalize("ǆemal").as_str(), "%C7%84emal");
        assert_eq!(normalize("東京 tower").as_str(), "%E6%9D%B1%E4%BA%AC_Tower");
    }

    #[test]
    fn test_normalize_sharp_s_stays_lowercase() {
        assert_eq!(normalize("ßtraße").as_str(), "%C3%9Ftra%C3%9Fe");
    }

    #[test]
    fn test_normalize_deterministic() {
        assert_eq!(normalize("isaac newton"), normalize("isaac newton"));
    }

    #[test]
    fn test_plain_text_roundtrip() {
        let term = normalize("ac/dc live");
        assert_eq!(term.plain_text(), "Ac/Dc Live");
        assert_eq!(normalize(&term.plain_text()), term);
    }

    #[test]
    fn test_serializes_as_string() {
        let term = normalize("rust");
        assert_eq!(serde_json::to_string(&term).unwrap(), "\"Rust\"");
    }

    proptest! {
        #[test]
        fn normalize_is_stable_under_renormalization(s in "[a-zA-Z0-9 _'&/+%éüßÖ-]{0,40}") {
            let once = normalize(&s);
            let twice = normalize(&once.plain_text());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn normalized_term_has_no_spaces(s in "[a-zA-Z ]{0,40}") {
            prop_assert!(!normalize(&s).as_str().contains(' '));
        }
    }
}
