//! Pasted-text keyword parsing and the batch size gate.

use std::sync::LazyLock;

use regex::Regex;

use super::model::KeywordInput;
use crate::error::{Result, SiteplanError};

/// Largest batch handed to the classifier in one call.
pub const MAX_KEYWORDS: usize = 100;

/// Bundled sample list (spreadsheet copy/paste layout, one keyword per line).
const SAMPLE_INPUT: &str = include_str!("../../data/sample_keywords.tsv");

static FIELD_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\t,]+").expect("valid separator regex"));
static NON_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9]").expect("valid digit regex"));

/// Parse pasted text into keyword inputs.
///
/// Each line is split on runs of tabs or commas. The first field is the term;
/// the second, stripped of every non-digit, is the volume. Lines without a
/// term are dropped. Duplicates are kept.
pub fn parse_input(text: &str) -> Vec<KeywordInput> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    text.split('\n').filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<KeywordInput> {
    let mut parts = FIELD_SEPARATOR.split(line);
    let term = parts.next().unwrap_or("").trim();
    if term.is_empty() {
        return None;
    }

    let volume = parts
        .next()
        .map(|raw| NON_DIGIT.replace_all(raw, ""))
        .filter(|digits| !digits.is_empty())
        .and_then(|digits| digits.parse::<u64>().ok())
        .unwrap_or(0);

    Some(KeywordInput::new(term, volume))
}

/// Reject batches that are empty or larger than `max`. Runs before any
/// classifier call.
pub fn validate_batch(inputs: &[KeywordInput], max: usize) -> Result<()> {
    if inputs.is_empty() {
        return Err(SiteplanError::EmptyInput);
    }
    if inputs.len() > max {
        return Err(SiteplanError::TooManyKeywords {
            count: inputs.len(),
            limit: max,
        });
    }
    Ok(())
}

/// The bundled sample keyword list, unparsed.
pub fn sample_input() -> &'static str {
    SAMPLE_INPUT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tab_and_comma_lines() {
        let inputs = parse_input("fake flowers\t18100\nfaux flowers,6600\n");
        assert_eq!(
            inputs,
            vec![
                KeywordInput::new("fake flowers", 18100),
                KeywordInput::new("faux flowers", 6600),
            ]
        );
    }

    #[test]
    fn volume_strips_non_digits() {
        let inputs = parse_input("artificial rose\t~390 /mo");
        assert_eq!(inputs[0].volume, 390);
    }

    #[test]
    fn missing_volume_defaults_to_zero() {
        let inputs = parse_input("How to clean artificial flowers 500\nartificial lily\t");
        assert_eq!(inputs[0].term, "How to clean artificial flowers 500");
        assert_eq!(inputs[0].volume, 0);
        assert_eq!(inputs[1].volume, 0);
    }

    #[test]
    fn blank_lines_and_blank_terms_dropped() {
        let inputs = parse_input("a\t1\n\n   \n\t42\nb");
        let terms: Vec<&str> = inputs.iter().map(|k| k.term.as_str()).collect();
        assert_eq!(terms, vec!["a", "b"]);
    }

    #[test]
    fn duplicates_are_kept() {
        let inputs = parse_input("fake flowers\t18100\nFake Flowers\t9000");
        assert_eq!(inputs.len(), 2);
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(parse_input("").is_empty());
        assert!(parse_input(" \n\t ").is_empty());
    }

    #[test]
    fn validate_rejects_empty_and_oversized() {
        assert!(matches!(
            validate_batch(&[], MAX_KEYWORDS),
            Err(SiteplanError::EmptyInput)
        ));

        let hundred: Vec<KeywordInput> = (0..100)
            .map(|i| KeywordInput::new(format!("kw {i}"), 1))
            .collect();
        assert!(validate_batch(&hundred, MAX_KEYWORDS).is_ok());

        let mut too_many = hundred.clone();
        too_many.push(KeywordInput::new("one more", 1));
        assert!(matches!(
            validate_batch(&too_many, MAX_KEYWORDS),
            Err(SiteplanError::TooManyKeywords { count: 101, limit: 100 })
        ));
    }

    #[test]
    fn sample_input_parses() {
        let inputs = parse_input(sample_input());
        assert_eq!(inputs.len(), 24);
        assert!(inputs.iter().any(|k| k.term == "fake flowers" && k.volume == 18100));
    }
}
