//! Cluster health: a qualitative strength label for a theme, derived from how
//! many distinct pages (distinct page keys) it contains.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::model::ClassifiedKeyword;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    /// Authoritative cluster, structurally complete.
    Strong,
    /// Growing cluster with room to expand.
    Medium,
    /// Thin content; a merge candidate.
    Weak,
}

impl Health {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Medium => "medium",
            Self::Weak => "weak",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Strong => "authoritative cluster, structurally complete",
            Self::Medium => "growing cluster, expandable",
            Self::Weak => "thin content, consider merging",
        }
    }
}

/// Minimum distinct page counts for each label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthThresholds {
    pub strong_min_pages: usize,
    pub medium_min_pages: usize,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            strong_min_pages: 5,
            medium_min_pages: 3,
        }
    }
}

impl HealthThresholds {
    /// Map a distinct page count to a label. Total over all counts.
    pub fn classify(&self, page_count: usize) -> Health {
        if page_count >= self.strong_min_pages {
            Health::Strong
        } else if page_count >= self.medium_min_pages {
            Health::Medium
        } else {
            Health::Weak
        }
    }
}

/// Number of distinct page keys among the records.
pub fn distinct_pages<'a>(records: impl IntoIterator<Item = &'a ClassifiedKeyword>) -> usize {
    records
        .into_iter()
        .map(|r| r.page_key())
        .collect::<HashSet<&str>>()
        .len()
}

/// Health of one theme's records under the default thresholds.
pub fn health<'a>(theme_records: impl IntoIterator<Item = &'a ClassifiedKeyword>) -> Health {
    HealthThresholds::default().classify(distinct_pages(theme_records))
}
