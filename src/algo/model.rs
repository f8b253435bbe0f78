//! Record types shared by every stage: raw keyword input, classified keyword
//! records, and the closed intent/relation vocabularies.
//!
//! Classifier responses are decoded leniently through [`decode_records`]:
//! field names may be camelCase or snake_case, enum labels may be English or
//! the provider's own labels, and records without a keyword are dropped.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One keyword line from the user, before classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordInput {
    pub term: String,
    #[serde(default)]
    pub volume: u64,
}

impl KeywordInput {
    pub fn new(term: impl Into<String>, volume: u64) -> Self {
        Self {
            term: term.into(),
            volume,
        }
    }
}

/// Search intent the classifier assigned to a keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Intent {
    Product,
    Collection,
    Article,
    #[default]
    Unknown,
}

impl Intent {
    /// Every intent, in display order.
    pub const ALL: [Intent; 4] = [
        Intent::Product,
        Intent::Collection,
        Intent::Article,
        Intent::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Collection => "collection",
            Self::Article => "article",
            Self::Unknown => "unknown",
        }
    }

    /// Strict label lookup. Accepts the English names (case-insensitive,
    /// optional " page" suffix) and the provider's native labels.
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "product" | "product page" | "产品页" => Some(Self::Product),
            "collection" | "collection page" | "集合页" => Some(Self::Collection),
            "article" | "article page" | "文章页" => Some(Self::Article),
            "unknown" | "未知" => Some(Self::Unknown),
            _ => None,
        }
    }
}

impl From<String> for Intent {
    fn from(s: String) -> Self {
        Intent::from_label(&s).unwrap_or(Intent::Unknown)
    }
}

/// Role of a keyword inside its page group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum Relation {
    Primary,
    Synonym,
    LongTail,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Synonym => "synonym",
            Self::LongTail => "long-tail",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "primary" | "核心大词" => Some(Self::Primary),
            "synonym" | "同义词" => Some(Self::Synonym),
            "long-tail" | "long_tail" | "longtail" | "long tail" | "长尾词" => {
                Some(Self::LongTail)
            }
            _ => None,
        }
    }
}

impl TryFrom<String> for Relation {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Relation::from_label(&s).ok_or_else(|| format!("unknown relation '{s}'"))
    }
}

/// A keyword after classification, with its volume reattached from input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedKeyword {
    pub keyword: String,
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub volume: u64,
    #[serde(default)]
    pub intent: Intent,
    /// Theme id (level 1).
    #[serde(default)]
    pub parent_topic: String,
    /// Pillar id (level 2). Blank means the fallback label.
    #[serde(default)]
    pub pillar: String,
    /// Canonical page id (level 3). Blank means the keyword is its own page.
    #[serde(default)]
    pub primary_variant: String,
    /// `None` when the classifier omitted or garbled the flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<Relation>,
    #[serde(default)]
    pub content_strategy: String,
    /// Percentage in 0..=100.
    #[serde(default)]
    pub confidence_score: u8,
}

impl ClassifiedKeyword {
    /// Minimal record, mostly for tests and fixtures.
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            translation: String::new(),
            volume: 0,
            intent: Intent::Unknown,
            parent_topic: String::new(),
            pillar: String::new(),
            primary_variant: String::new(),
            relation: None,
            content_strategy: String::new(),
            confidence_score: 0,
        }
    }

    /// Key of the page this record belongs to: `primaryVariant`, or the
    /// keyword itself when the classifier left it blank.
    pub fn page_key(&self) -> &str {
        if self.primary_variant.trim().is_empty() {
            &self.keyword
        } else {
            &self.primary_variant
        }
    }

    pub fn is_flagged_primary(&self) -> bool {
        self.relation == Some(Relation::Primary)
    }
}

/// Which intents a view keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntentFilter {
    #[default]
    All,
    Only(Intent),
}

impl IntentFilter {
    pub fn from_str(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Some(Self::All);
        }
        Intent::from_label(s).map(Self::Only)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(intent) => intent.as_str(),
        }
    }

    pub fn matches(&self, intent: Intent) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == intent,
        }
    }
}

/// Return `raw` unless it is blank, in which case return `fallback`.
pub fn label_or<'a>(raw: &'a str, fallback: &'a str) -> &'a str {
    if raw.trim().is_empty() {
        fallback
    } else {
        raw
    }
}

// ── Lenient decoding ────────────────────────────────────────────────────────

fn text_field(row: &Value, names: &[&str]) -> String {
    names
        .iter()
        .find_map(|name| row.get(*name).and_then(|v| v.as_str()))
        .unwrap_or("")
        .to_string()
}

fn number_field(row: &Value, names: &[&str]) -> Option<f64> {
    names
        .iter()
        .find_map(|name| row.get(*name).and_then(|v| v.as_f64()))
}

/// Decode one classifier record. Returns `None` when the keyword is missing
/// or blank; such a record has no usable grouping key.
pub fn decode_record(row: &Value) -> Option<ClassifiedKeyword> {
    let keyword = text_field(row, &["keyword"]).trim().to_string();
    if keyword.is_empty() {
        return None;
    }

    let raw_confidence = number_field(row, &["confidenceScore", "confidence_score"]).unwrap_or(0.0);
    let confidence = raw_confidence.clamp(0.0, 100.0).round() as u8;
    if raw_confidence != f64::from(confidence) {
        tracing::debug!(%keyword, raw_confidence, "confidence score clamped into 0..=100");
    }

    let relation_label = text_field(row, &["relation"]);
    let relation = Relation::from_label(&relation_label);
    if relation.is_none() && !relation_label.is_empty() {
        tracing::debug!(%keyword, relation = %relation_label, "unrecognized relation label");
    }

    Some(ClassifiedKeyword {
        translation: text_field(row, &["translation", "reasoning"]),
        volume: number_field(row, &["volume"])
            .map(|v| v.max(0.0) as u64)
            .unwrap_or(0),
        intent: Intent::from(text_field(row, &["intent"])),
        parent_topic: text_field(row, &["parentTopic", "parent_topic", "theme"]),
        pillar: text_field(row, &["pillar"]),
        primary_variant: text_field(row, &["primaryVariant", "primary_variant", "page"]),
        relation,
        content_strategy: text_field(row, &["contentStrategy", "content_strategy", "strategy"]),
        confidence_score: confidence,
        keyword,
    })
}

/// Decode a batch of classifier records, skipping and logging the ones
/// without a keyword.
pub fn decode_records(rows: &[Value]) -> Vec<ClassifiedKeyword> {
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let decoded = decode_record(row);
            if decoded.is_none() {
                tracing::warn!(index, "skipping classified record without a keyword");
            }
            decoded
        })
        .collect()
}

/// Decode keyword inputs from `{term, volume}` objects or bare strings.
/// Blank terms are dropped.
pub fn decode_inputs(rows: &[Value]) -> Vec<KeywordInput> {
    rows.iter()
        .filter_map(|row| {
            let (term, volume) = match row {
                Value::String(s) => (s.trim().to_string(), 0),
                other => (
                    text_field(other, &["term", "keyword"]).trim().to_string(),
                    number_field(other, &["volume"])
                        .map(|v| v.max(0.0) as u64)
                        .unwrap_or(0),
                ),
            };
            (!term.is_empty()).then(|| KeywordInput::new(term, volume))
        })
        .collect()
}
