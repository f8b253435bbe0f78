//! Volume reattachment: carry each input keyword's search volume over to the
//! classifier's records.
//!
//! The classifier never supplies volume. A returned keyword is matched back
//! to the input list by whitespace-trimmed term:
//!
//! 1. an exact (case-sensitive) match wins, first in input order;
//! 2. otherwise a case-insensitive match, first in input order;
//! 3. otherwise the volume is 0.
//!
//! Synonyms never inherit a sibling's volume. Reattachment must run before
//! any grouping or ordering, since both depend on volume.

use std::collections::HashMap;

use super::model::{ClassifiedKeyword, KeywordInput};

/// Lookup table from input term to volume.
pub struct VolumeIndex<'a> {
    exact: HashMap<&'a str, u64>,
    folded: HashMap<String, u64>,
}

impl<'a> VolumeIndex<'a> {
    pub fn new(inputs: &'a [KeywordInput]) -> Self {
        let mut exact = HashMap::with_capacity(inputs.len());
        let mut folded = HashMap::with_capacity(inputs.len());
        for input in inputs {
            let term = input.term.trim();
            exact.entry(term).or_insert(input.volume);
            folded.entry(term.to_lowercase()).or_insert(input.volume);
        }
        Self { exact, folded }
    }

    /// Volume for a classifier keyword, or `None` when no input term matches.
    pub fn lookup(&self, keyword: &str) -> Option<u64> {
        let keyword = keyword.trim();
        self.exact
            .get(keyword)
            .or_else(|| self.folded.get(&keyword.to_lowercase()))
            .copied()
    }
}

/// Overwrite every record's volume with the matching input volume (0 when
/// unmatched).
pub fn reattach_volumes(
    inputs: &[KeywordInput],
    mut records: Vec<ClassifiedKeyword>,
) -> Vec<ClassifiedKeyword> {
    let index = VolumeIndex::new(inputs);
    for record in &mut records {
        record.volume = match index.lookup(&record.keyword) {
            Some(volume) => volume,
            None => {
                tracing::debug!(keyword = %record.keyword, "no input term matches; volume set to 0");
                0
            }
        };
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classified(keyword: &str, claimed_volume: u64) -> ClassifiedKeyword {
        let mut rec = ClassifiedKeyword::new(keyword);
        rec.volume = claimed_volume;
        rec.primary_variant = "fake flowers".into();
        rec
    }

    #[test]
    fn case_colliding_inputs_keep_their_own_volumes() {
        let inputs = vec![
            KeywordInput::new("fake flowers", 18100),
            KeywordInput::new("Fake Flowers", 9000),
        ];
        let out = reattach_volumes(
            &inputs,
            vec![classified("fake flowers", 0), classified("Fake Flowers", 0)],
        );
        assert_eq!(out[0].volume, 18100);
        assert_eq!(out[1].volume, 9000);
    }

    #[test]
    fn case_insensitive_match_takes_first_in_input_order() {
        let inputs = vec![
            KeywordInput::new("fake flowers", 18100),
            KeywordInput::new("Fake Flowers", 9000),
        ];
        let out = reattach_volumes(&inputs, vec![classified("FAKE FLOWERS", 0)]);
        assert_eq!(out[0].volume, 18100);
    }

    #[test]
    fn match_ignores_surrounding_whitespace() {
        let inputs = vec![KeywordInput::new(" artificial rose ", 390)];
        let out = reattach_volumes(&inputs, vec![classified("Artificial Rose  ", 0)]);
        assert_eq!(out[0].volume, 390);
    }

    #[test]
    fn unmatched_keyword_gets_zero_not_classifier_value() {
        let inputs = vec![KeywordInput::new("fake flowers", 18100)];
        let out = reattach_volumes(&inputs, vec![classified("silk flowers", 5000)]);
        assert_eq!(out[0].volume, 0);
    }

    #[test]
    fn synonym_does_not_inherit_sibling_volume() {
        let inputs = vec![KeywordInput::new("fake flowers", 18100)];
        let out = reattach_volumes(
            &inputs,
            vec![classified("fake flowers", 0), classified("faux flowers", 0)],
        );
        assert_eq!(out[0].volume, 18100);
        assert_eq!(out[1].volume, 0);
    }

    #[test]
    fn lookup_reports_misses() {
        let inputs = vec![KeywordInput::new("a", 1)];
        let index = VolumeIndex::new(&inputs);
        assert_eq!(index.lookup("A"), Some(1));
        assert_eq!(index.lookup("b"), None);
    }
}
