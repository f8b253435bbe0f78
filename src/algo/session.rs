//! One planning session: the current result set and the analyze pipeline that
//! replaces it.
//!
//! `analyze` runs validate → classify (once) → reattach, and only swaps in the
//! new records when every step succeeds. A failed analysis leaves the
//! previous results untouched.

use super::classifier::Classifier;
use super::config::Config;
use super::hierarchy::{self, Hierarchy};
use super::input::validate_batch;
use super::model::{ClassifiedKeyword, IntentFilter, KeywordInput};
use super::reattach::reattach_volumes;
use crate::error::Result;

#[derive(Debug, Clone, Default)]
pub struct Session {
    config: Config,
    results: Option<Vec<ClassifiedKeyword>>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            results: None,
        }
    }

    /// Resume with a previously stored result set.
    pub fn with_results(config: Config, results: Vec<ClassifiedKeyword>) -> Self {
        Self {
            config,
            results: Some(results),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn analyze(
        &mut self,
        classifier: &dyn Classifier,
        inputs: &[KeywordInput],
    ) -> Result<&[ClassifiedKeyword]> {
        if let Err(e) = validate_batch(inputs, self.config.limits.max_keywords) {
            tracing::warn!(error = %e, "analysis rejected");
            return Err(e);
        }

        let classified = match classifier.classify(inputs) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "classification failed; keeping previous results");
                return Err(e);
            }
        };

        let records = reattach_volumes(inputs, classified);
        tracing::info!(
            keywords = inputs.len(),
            records = records.len(),
            "analysis complete"
        );
        Ok(self.results.insert(records).as_slice())
    }

    /// Current records; empty before the first successful analysis.
    pub fn results(&self) -> &[ClassifiedKeyword] {
        self.results.as_deref().unwrap_or(&[])
    }

    pub fn tree(&self, filter: IntentFilter) -> Hierarchy<'_> {
        hierarchy::build_with_fallback(
            self.results(),
            filter,
            &self.config.hierarchy.fallback_label,
        )
    }
}
