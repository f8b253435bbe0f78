//! Shared operation wrappers for all interfaces (CLI, MCP, LSP, plugin).
//!
//! Each `op_*` function is a synchronous wrapper around one or more `algo`
//! modules. Input and output are `serde_json::Value`, with no dependency on
//! rmcp, tower-lsp, clap, or nu-plugin.
//!
//! Classified records travel between calls as JSON arrays and are decoded
//! leniently on the way in, so the output of `op_analyze` can be fed straight
//! back into `op_tree`, `op_table`, `op_summary`, and `op_export_csv`.
//!
//! When the `cache` feature is enabled, `op_analyze` accepts an optional
//! `store_path`. A successful analysis then replaces the stored result set.

use serde_json::{json, Value};

use crate::algo::classifier::{Classifier, CommandClassifier, StaticClassifier};
use crate::algo::config::Config;
use crate::algo::export;
use crate::algo::health::distinct_pages;
use crate::algo::hierarchy::{Page, Theme};
use crate::algo::input;
use crate::algo::model::{decode_inputs, decode_records, ClassifiedKeyword, IntentFilter};
use crate::algo::reattach::reattach_volumes;
use crate::algo::session::Session;
use crate::algo::slug::page_path;
use crate::algo::summary;
use crate::algo::view::{self, Direction, SortKey, SortState};
use crate::error::{Result, SiteplanError};

#[cfg(feature = "cache")]
use crate::algo::{cache, storage};

// ── Argument parsing ─────────────────────────────────────────────────────────

pub fn parse_filter(filter: &str) -> Result<IntentFilter> {
    IntentFilter::from_str(filter).ok_or_else(|| {
        SiteplanError::invalid(format!(
            "unknown intent filter '{filter}'. Use: all, product, collection, article, unknown"
        ))
    })
}

pub fn parse_sort_key(key: &str) -> Result<SortKey> {
    SortKey::from_str(key).ok_or_else(|| {
        SiteplanError::invalid(format!(
            "unknown sort key '{key}'. Use: keyword, volume, confidenceScore"
        ))
    })
}

pub fn parse_direction(direction: &str) -> Result<Direction> {
    Direction::from_str(direction).ok_or_else(|| {
        SiteplanError::invalid(format!("unknown sort direction '{direction}'. Use: asc, desc"))
    })
}

fn records_value<'a>(records: impl IntoIterator<Item = &'a ClassifiedKeyword>) -> Result<Value> {
    let rows = records
        .into_iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<Vec<Value>, _>>()?;
    Ok(Value::Array(rows))
}

// ── Operations ───────────────────────────────────────────────────────────────

/// Parse pasted keyword text into `{term, volume}` rows.
pub fn op_parse(text: &str) -> Value {
    let inputs = input::parse_input(text);
    Value::Array(
        inputs
            .iter()
            .map(|i| json!({"term": i.term, "volume": i.volume}))
            .collect(),
    )
}

/// The bundled sample keyword list, parsed.
pub fn op_sample() -> Value {
    op_parse(input::sample_input())
}

/// Where classifier output comes from.
pub enum ClassifierSource<'a> {
    /// Spawn this command line per analysis.
    Command(&'a str),
    /// Use an already-produced classifier response.
    Precomputed(&'a [Value]),
}

/// Validate, classify once, and reattach volumes.
///
/// `inputs` are `{term, volume}` objects or bare strings. Fails without
/// contacting the classifier when the batch is empty or over the limit.
pub fn op_analyze(
    inputs: &[Value],
    source: ClassifierSource<'_>,
    config: &Config,
    store_path: Option<&str>,
) -> Result<Value> {
    let inputs = decode_inputs(inputs);
    let classifier: Box<dyn Classifier> = match source {
        ClassifierSource::Command(line) => Box::new(CommandClassifier::from_command_line(line)?),
        ClassifierSource::Precomputed(rows) => Box::new(StaticClassifier::from_values(rows)),
    };

    let mut session = Session::new(config.clone());
    let records = session.analyze(classifier.as_ref(), &inputs)?;

    #[cfg(feature = "cache")]
    if let Some(path) = store_path {
        let mut store = storage::ResultStore::open_or_create(path)?;
        let meta = cache::StoredMeta::new(&inputs, records.len());
        store.save(&meta, records)?;
    }
    #[cfg(not(feature = "cache"))]
    let _ = store_path;

    records_value(records)
}

/// Overwrite classifier-reported volumes with the input volumes.
pub fn op_reattach(inputs: &[Value], records: &[Value]) -> Result<Value> {
    let inputs = decode_inputs(inputs);
    let records = reattach_volumes(&inputs, decode_records(records));
    records_value(&records)
}

fn page_value(theme: &str, pillar: &str, page: &Page<'_>) -> Result<Value> {
    Ok(json!({
        "key": page.key,
        "path": page_path(theme, pillar, page.key),
        "volume": page.volume(),
        "primary": serde_json::to_value(page.primary)?,
        "synonyms": records_value(page.synonyms.iter().copied())?,
    }))
}

fn theme_value(theme: &Theme<'_>, config: &Config) -> Result<Value> {
    let health_pages = distinct_pages(theme.records());
    let health = config.health.classify(health_pages);
    let pillars = theme
        .pillars
        .iter()
        .map(|pillar| -> Result<Value> {
            let pages = pillar
                .pages
                .iter()
                .map(|page| page_value(theme.name, pillar.name, page))
                .collect::<Result<Vec<Value>>>()?;
            Ok(json!({
                "name": pillar.name,
                "volume": pillar.volume(),
                "pages": pages,
            }))
        })
        .collect::<Result<Vec<Value>>>()?;

    Ok(json!({
        "name": theme.name,
        "volume": theme.volume,
        "page_count": theme.page_count(),
        "health_pages": health_pages,
        "health": health.as_str(),
        "health_description": health.description(),
        "pillars": pillars,
    }))
}

/// Build the Theme → Pillar → Page tree for the records under `filter`.
///
/// `page_count` is the number of page nodes in the theme, summed over its
/// pillars, so one `primaryVariant` used under two pillars counts twice.
/// `health_pages` is the number of distinct `primaryVariant` keys across the
/// whole theme, and is what `health` is derived from.
pub fn op_tree(records: &[Value], filter: &str, config: &Config) -> Result<Value> {
    let filter = parse_filter(filter)?;
    let session = Session::with_results(config.clone(), decode_records(records));
    let tree = session.tree(filter);
    let themes = tree
        .themes
        .iter()
        .map(|theme| theme_value(theme, config))
        .collect::<Result<Vec<Value>>>()?;
    Ok(json!({
        "filter": filter.as_str(),
        "theme_count": themes.len(),
        "themes": themes,
    }))
}

/// Health label per theme, in tree order.
pub fn op_health(records: &[Value], filter: &str, config: &Config) -> Result<Value> {
    let filter = parse_filter(filter)?;
    let session = Session::with_results(config.clone(), decode_records(records));
    let tree = session.tree(filter);
    let rows = tree
        .themes
        .iter()
        .map(|theme| {
            let pages = distinct_pages(theme.records());
            let health = config.health.classify(pages);
            json!({
                "theme": theme.name,
                "pages": pages,
                "health": health.as_str(),
                "description": health.description(),
            })
        })
        .collect();
    Ok(Value::Array(rows))
}

/// Flat view: filter by intent, then stable-sort by one key.
pub fn op_table(records: &[Value], filter: &str, sort: &str, direction: &str) -> Result<Value> {
    let filter = parse_filter(filter)?;
    let key = parse_sort_key(sort)?;
    let direction = parse_direction(direction)?;
    let records = decode_records(records);
    records_value(view::sort_and_filter(&records, filter, key, direction))
}

/// Next sort state after the user selects `key`.
pub fn op_sort_toggle(current_key: &str, current_direction: &str, key: &str) -> Result<Value> {
    let state = SortState {
        key: parse_sort_key(current_key)?,
        direction: parse_direction(current_direction)?,
    };
    let next = state.toggle(parse_sort_key(key)?);
    Ok(json!({"key": next.key.as_str(), "direction": next.direction.as_str()}))
}

/// Overview counters and the intent distribution.
pub fn op_summary(records: &[Value], config: &Config) -> Result<Value> {
    let records = decode_records(records);
    let summary = summary::summarize(&records, &config.hierarchy.fallback_label);
    let distribution: Vec<Value> = summary::intent_distribution(&records)
        .iter()
        .map(|share| json!({"intent": share.intent.as_str(), "count": share.count}))
        .collect();
    let mut value = serde_json::to_value(summary)?;
    if let Some(obj) = value.as_object_mut() {
        obj.insert("intents".into(), Value::Array(distribution));
    }
    Ok(value)
}

/// CSV text for the records, header row first.
pub fn op_export_csv(records: &[Value]) -> String {
    export::export_csv(&decode_records(records))
}

// ── Result store ─────────────────────────────────────────────────────────────

/// Stored result set with its metadata, or `null` when the store is empty.
#[cfg(feature = "cache")]
pub fn op_results(store_path: &str) -> Result<Value> {
    let store = storage::ResultStore::open_or_create(store_path)?;
    match store.load()? {
        Some((meta, records)) => Ok(json!({
            "meta": serde_json::to_value(meta)?,
            "records": records_value(&records)?,
        })),
        None => Ok(Value::Null),
    }
}

/// Metadata of the stored result set without its records, or `null`.
#[cfg(feature = "cache")]
pub fn op_info(store_path: &str) -> Result<Value> {
    let store = storage::ResultStore::open_or_create(store_path)?;
    match store.info()? {
        Some(meta) => Ok(serde_json::to_value(meta)?),
        None => Ok(Value::Null),
    }
}

#[cfg(feature = "cache")]
pub fn op_clear(store_path: &str) -> Result<Value> {
    let store = storage::ResultStore::open_or_create(store_path)?;
    let cleared = store.clear()?;
    Ok(json!({"cleared": cleared}))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classified() -> Vec<Value> {
        vec![
            json!({"keyword": "fake plants", "intent": "collection", "parentTopic": "Plants",
                   "pillar": "Core", "primaryVariant": "fake plants", "relation": "primary",
                   "confidenceScore": 90}),
            json!({"keyword": "faux plants", "intent": "collection", "parentTopic": "Plants",
                   "pillar": "Core", "primaryVariant": "fake plants", "relation": "synonym",
                   "confidenceScore": 80}),
            json!({"keyword": "artificial rose", "intent": "product", "parentTopic": "Flowers",
                   "pillar": "Roses", "primaryVariant": "artificial rose", "relation": "primary",
                   "confidenceScore": 70}),
        ]
    }

    fn inputs() -> Vec<Value> {
        vec![
            json!({"term": "fake plants", "volume": 18100}),
            json!({"term": "faux plants", "volume": 6600}),
            json!({"term": "artificial rose", "volume": 390}),
        ]
    }

    #[test]
    fn analyze_precomputed_reattaches_volumes() {
        let rows = classified();
        let out = op_analyze(
            &inputs(),
            ClassifierSource::Precomputed(&rows),
            &Config::default(),
            None,
        )
        .unwrap();
        let volumes: Vec<u64> = out
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["volume"].as_u64().unwrap())
            .collect();
        assert_eq!(volumes, vec![18100, 6600, 390]);
    }

    #[test]
    fn tree_nests_synonyms_under_primary() {
        let records = op_reattach(&inputs(), &classified()).unwrap();
        let tree = op_tree(records.as_array().unwrap(), "all", &Config::default()).unwrap();
        let themes = tree["themes"].as_array().unwrap();
        assert_eq!(themes[0]["name"], "Plants");
        assert_eq!(themes[0]["volume"], 24700);
        let page = &themes[0]["pillars"][0]["pages"][0];
        assert_eq!(page["primary"]["keyword"], "fake plants");
        assert_eq!(page["synonyms"][0]["keyword"], "faux plants");
        assert_eq!(page["path"], "/plants/core/fake-plants");
        assert_eq!(themes[0]["health"], "weak");
    }

    #[test]
    fn page_nodes_and_health_pages_are_reported_separately() {
        let records: Vec<Value> = ["Core", "Types", "Care"]
            .iter()
            .enumerate()
            .map(|(i, pillar)| {
                json!({"keyword": format!("kw {i}"), "parentTopic": "T", "pillar": pillar,
                       "primaryVariant": "x", "relation": "primary"})
            })
            .collect();
        let tree = op_tree(&records, "all", &Config::default()).unwrap();
        let theme = &tree["themes"][0];
        assert_eq!(theme["page_count"], 3);
        assert_eq!(theme["health_pages"], 1);
        assert_eq!(theme["health"], "weak");
    }

    #[test]
    fn unknown_filter_is_invalid_argument() {
        let err = op_tree(&classified(), "blog", &Config::default()).unwrap_err();
        assert!(matches!(err, SiteplanError::InvalidArgument { .. }));
    }

    #[test]
    fn sort_toggle_flips_and_resets() {
        let flipped = op_sort_toggle("volume", "desc", "volume").unwrap();
        assert_eq!(flipped["direction"], "asc");
        let reset = op_sort_toggle("volume", "asc", "keyword").unwrap();
        assert_eq!(reset, json!({"key": "keyword", "direction": "desc"}));
    }

    #[test]
    fn summary_includes_intents() {
        let s = op_summary(&classified(), &Config::default()).unwrap();
        assert_eq!(s["themes"], 2);
        assert_eq!(s["pages"], 2);
        assert_eq!(s["hubs"], 1);
        assert_eq!(s["intents"][0], json!({"intent": "product", "count": 1}));
    }
}
