//! CSV export: a flat projection of classified records, one row each.

use super::model::ClassifiedKeyword;

pub const CSV_HEADERS: [&str; 10] = [
    "keyword",
    "translation",
    "volume",
    "theme",
    "pillar",
    "page",
    "relation",
    "intent",
    "strategy",
    "confidence",
];

/// Quote a text cell, doubling embedded quotes.
fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn csv_row(r: &ClassifiedKeyword) -> String {
    [
        quote(&r.keyword),
        quote(&r.translation),
        r.volume.to_string(),
        quote(&r.parent_topic),
        quote(&r.pillar),
        quote(&r.primary_variant),
        quote(r.relation.map(|rel| rel.as_str()).unwrap_or("")),
        quote(r.intent.as_str()),
        quote(&r.content_strategy),
        r.confidence_score.to_string(),
    ]
    .join(",")
}

/// Render the records as CSV with a header row. Rows are `\n`-separated with
/// no trailing newline.
pub fn export_csv(records: &[ClassifiedKeyword]) -> String {
    std::iter::once(CSV_HEADERS.join(","))
        .chain(records.iter().map(csv_row))
        .collect::<Vec<String>>()
        .join("\n")
}
