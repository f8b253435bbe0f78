//! Flat keyword table: intent filter plus a stable single-key sort.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::model::{ClassifiedKeyword, IntentFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Keyword,
    Volume,
    ConfidenceScore,
}

impl SortKey {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "keyword" => Some(Self::Keyword),
            "volume" => Some(Self::Volume),
            "confidence" | "confidencescore" | "confidence_score" | "confidence-score" => {
                Some(Self::ConfidenceScore)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Volume => "volume",
            Self::ConfidenceScore => "confidenceScore",
        }
    }

    fn compare(&self, a: &ClassifiedKeyword, b: &ClassifiedKeyword) -> Ordering {
        match self {
            Self::Keyword => a.keyword.cmp(&b.keyword),
            Self::Volume => a.volume.cmp(&b.volume),
            Self::ConfidenceScore => a.confidence_score.cmp(&b.confidence_score),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Asc),
            "desc" | "descending" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Current sort column and direction of a table view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: SortKey,
    pub direction: Direction,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            key: SortKey::Volume,
            direction: Direction::Desc,
        }
    }
}

impl SortState {
    /// Selecting the active key flips the direction; a new key starts
    /// descending.
    pub fn toggle(self, key: SortKey) -> Self {
        let direction = if key == self.key && self.direction == Direction::Desc {
            Direction::Asc
        } else {
            Direction::Desc
        };
        Self { key, direction }
    }
}

/// Filter by intent, then stable-sort by `key` in `direction`.
pub fn sort_and_filter<'a>(
    records: &'a [ClassifiedKeyword],
    filter: IntentFilter,
    key: SortKey,
    direction: Direction,
) -> Vec<&'a ClassifiedKeyword> {
    let mut rows: Vec<&ClassifiedKeyword> =
        records.iter().filter(|r| filter.matches(r.intent)).collect();
    rows.sort_by(|a, b| {
        let ord = key.compare(a, b);
        match direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        }
    });
    rows
}
