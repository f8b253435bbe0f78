//! Architecture overview counters and the intent distribution.

use std::collections::HashSet;

use serde::Serialize;

use super::model::{label_or, ClassifiedKeyword, Intent, Relation};

/// Headline numbers for a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    pub keywords: usize,
    pub total_volume: u64,
    pub themes: usize,
    /// Distinct (theme, pillar) pairs.
    pub pillars: usize,
    /// Distinct (theme, pillar, page key) triples; matches the tree's page count.
    pub pages: usize,
    /// Collection-intent primaries: the hub pages.
    pub hubs: usize,
}

/// Count themes, pillars, pages and hubs, using `fallback` for blank labels.
pub fn summarize(records: &[ClassifiedKeyword], fallback: &str) -> Summary {
    let mut themes = HashSet::new();
    let mut pillars = HashSet::new();
    let mut pages = HashSet::new();
    let mut hubs = 0;
    let mut total_volume = 0;

    for r in records {
        let theme = label_or(&r.parent_topic, fallback);
        let pillar = label_or(&r.pillar, fallback);
        themes.insert(theme);
        pillars.insert((theme, pillar));
        pages.insert((theme, pillar, r.page_key()));
        total_volume += r.volume;
        if r.intent == Intent::Collection && r.relation == Some(Relation::Primary) {
            hubs += 1;
        }
    }

    Summary {
        keywords: records.len(),
        total_volume,
        themes: themes.len(),
        pillars: pillars.len(),
        pages: pages.len(),
        hubs,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntentShare {
    pub intent: Intent,
    pub count: usize,
}

/// Keyword count per intent in display order, omitting intents with no
/// keywords.
pub fn intent_distribution(records: &[ClassifiedKeyword]) -> Vec<IntentShare> {
    Intent::ALL
        .iter()
        .map(|&intent| IntentShare {
            intent,
            count: records.iter().filter(|r| r.intent == intent).count(),
        })
        .filter(|share| share.count > 0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(keyword: &str, theme: &str, pillar: &str, page: &str, intent: Intent) -> ClassifiedKeyword {
        let mut r = ClassifiedKeyword::new(keyword);
        r.parent_topic = theme.into();
        r.pillar = pillar.into();
        r.primary_variant = page.into();
        r.intent = intent;
        r.volume = 10;
        r
    }

    #[test]
    fn counts_scoped_levels() {
        let mut hub = rec("fake flowers", "Flowers", "Core", "fake flowers", Intent::Collection);
        hub.relation = Some(Relation::Primary);
        let records = vec![
            hub,
            rec("faux flowers", "Flowers", "Core", "fake flowers", Intent::Collection),
            rec("artificial rose", "Flowers", "Types", "artificial rose", Intent::Product),
            rec("fake plants", "Plants", "Core", "fake plants", Intent::Collection),
            rec("hanging plants", "Plants", "", "", Intent::Product),
        ];
        let s = summarize(&records, "General");
        assert_eq!(s.keywords, 5);
        assert_eq!(s.total_volume, 50);
        assert_eq!(s.themes, 2);
        assert_eq!(s.pillars, 4);
        assert_eq!(s.pages, 4);
        assert_eq!(s.hubs, 1);
    }

    #[test]
    fn empty_summary() {
        assert_eq!(summarize(&[], "General"), Summary::default());
    }

    #[test]
    fn distribution_omits_zero_counts() {
        let records = vec![
            rec("a", "T", "P", "a", Intent::Product),
            rec("b", "T", "P", "b", Intent::Product),
            rec("c", "T", "P", "c", Intent::Article),
        ];
        let dist = intent_distribution(&records);
        assert_eq!(
            dist,
            vec![
                IntentShare { intent: Intent::Product, count: 2 },
                IntentShare { intent: Intent::Article, count: 1 },
            ]
        );
    }
}
