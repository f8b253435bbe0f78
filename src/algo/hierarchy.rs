//! Theme → Pillar → Page projection over a flat list of classified keywords.
//!
//! The tree is a borrowed view: it holds references into the record slice,
//! owns no state, and is rebuilt whenever the records or the filter change.
//!
//! Build steps:
//!
//! 1. keep records whose intent matches the filter;
//! 2. group by theme (`parentTopic`, exact string match);
//! 3. order themes by total volume, descending, ties in first-seen order;
//! 4. group each theme by pillar, blank pillar → fallback label;
//! 5. group each pillar by page key (`primaryVariant`, else the keyword);
//! 6. pick each page's primary: the first record flagged `Primary` or whose
//!    keyword equals the page key, else the first record of the group;
//! 7. order pages by their primary's volume, descending, ties in first-seen
//!    order.
//!
//! Pillars keep first-seen order. Pillar names are scoped to their theme.

use std::collections::HashMap;

use serde::Serialize;

use super::model::{label_or, ClassifiedKeyword, IntentFilter};

/// Label used for a blank theme or pillar.
pub const DEFAULT_FALLBACK_LABEL: &str = "General";

/// One canonical page and the keywords folded into it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<'a> {
    pub key: &'a str,
    pub primary: &'a ClassifiedKeyword,
    pub synonyms: Vec<&'a ClassifiedKeyword>,
}

impl<'a> Page<'a> {
    /// Records in this page: the primary followed by its synonyms.
    pub fn records(&self) -> impl Iterator<Item = &'a ClassifiedKeyword> + '_ {
        std::iter::once(self.primary).chain(self.synonyms.iter().copied())
    }

    /// Summed volume of the primary and every synonym.
    pub fn volume(&self) -> u64 {
        self.records().map(|r| r.volume).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pillar<'a> {
    pub name: &'a str,
    pub pages: Vec<Page<'a>>,
}

impl<'a> Pillar<'a> {
    pub fn volume(&self) -> u64 {
        self.pages.iter().map(|p| p.volume()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Theme<'a> {
    pub name: &'a str,
    pub volume: u64,
    pub pillars: Vec<Pillar<'a>>,
}

impl<'a> Theme<'a> {
    /// Every record in the theme, in tree order.
    pub fn records(&self) -> impl Iterator<Item = &'a ClassifiedKeyword> + '_ {
        self.pillars
            .iter()
            .flat_map(|pillar| pillar.pages.iter())
            .flat_map(|page| page.records())
    }

    pub fn page_count(&self) -> usize {
        self.pillars.iter().map(|p| p.pages.len()).sum()
    }
}

/// The ordered site tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Hierarchy<'a> {
    pub themes: Vec<Theme<'a>>,
}

impl<'a> Hierarchy<'a> {
    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    /// Every leaf record, in tree order.
    pub fn records(&self) -> impl Iterator<Item = &'a ClassifiedKeyword> + '_ {
        self.themes.iter().flat_map(|theme| theme.records())
    }
}

/// Build the tree with the default fallback label.
pub fn build<'a>(records: &'a [ClassifiedKeyword], filter: IntentFilter) -> Hierarchy<'a> {
    build_with_fallback(records, filter, DEFAULT_FALLBACK_LABEL)
}

/// Build the tree, labelling blank themes and pillars with `fallback`.
pub fn build_with_fallback<'a>(
    records: &'a [ClassifiedKeyword],
    filter: IntentFilter,
    fallback: &'a str,
) -> Hierarchy<'a> {
    let filtered = records.iter().filter(|r| filter.matches(r.intent));
    let by_theme = group_ordered(filtered, |r| label_or(&r.parent_topic, fallback));

    let mut themes: Vec<Theme<'a>> = by_theme
        .into_iter()
        .map(|(name, members)| {
            let volume = members.iter().map(|r| r.volume).sum();
            let by_pillar = group_ordered(members, |r| label_or(&r.pillar, fallback));
            let pillars = by_pillar
                .into_iter()
                .map(|(pillar_name, pillar_members)| Pillar {
                    name: pillar_name,
                    pages: build_pages(pillar_members),
                })
                .collect();
            Theme {
                name,
                volume,
                pillars,
            }
        })
        .collect();

    // `sort_by` is stable, so equal volumes keep first-seen order.
    themes.sort_by(|a, b| b.volume.cmp(&a.volume));
    Hierarchy { themes }
}

fn build_pages<'a>(members: Vec<&'a ClassifiedKeyword>) -> Vec<Page<'a>> {
    let by_page = group_ordered(members, |r| r.page_key());
    let mut pages: Vec<Page<'a>> = by_page
        .into_iter()
        .filter_map(|(key, group)| resolve_page(key, group))
        .collect();
    pages.sort_by(|a, b| b.primary.volume.cmp(&a.primary.volume));
    pages
}

/// Split a page group into one primary and its synonyms. An empty group has
/// no page.
fn resolve_page<'a>(key: &'a str, mut group: Vec<&'a ClassifiedKeyword>) -> Option<Page<'a>> {
    if group.is_empty() {
        return None;
    }
    let primary_at = group
        .iter()
        .position(|r| r.is_flagged_primary() || r.keyword == key)
        .unwrap_or(0);
    let primary = group.remove(primary_at);
    Some(Page {
        key,
        primary,
        synonyms: group,
    })
}

/// Group items by a borrowed key, preserving first-seen key order and the
/// input order inside each group.
fn group_ordered<'a, I, F>(items: I, key: F) -> Vec<(&'a str, Vec<&'a ClassifiedKeyword>)>
where
    I: IntoIterator<Item = &'a ClassifiedKeyword>,
    F: Fn(&'a ClassifiedKeyword) -> &'a str,
{
    let mut slots: HashMap<&'a str, usize> = HashMap::new();
    let mut groups: Vec<(&'a str, Vec<&'a ClassifiedKeyword>)> = Vec::new();
    for item in items {
        let k = key(item);
        let slot = *slots.entry(k).or_insert_with(|| {
            groups.push((k, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(item);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::model::{Intent, Relation};

    fn kw(
        keyword: &str,
        volume: u64,
        theme: &str,
        pillar: &str,
        page: &str,
        relation: Option<Relation>,
    ) -> ClassifiedKeyword {
        let mut rec = ClassifiedKeyword::new(keyword);
        rec.volume = volume;
        rec.parent_topic = theme.into();
        rec.pillar = pillar.into();
        rec.primary_variant = page.into();
        rec.relation = relation;
        rec.intent = Intent::Collection;
        rec
    }

    fn fixture() -> Vec<ClassifiedKeyword> {
        vec![
            kw("Artificial flowers", 14800, "Flowers", "Core", "fake flowers", Some(Relation::Synonym)),
            kw("fake flowers", 18100, "Flowers", "Core", "fake flowers", Some(Relation::Primary)),
            kw("faux flowers", 6600, "Flowers", "Core", "fake flowers", Some(Relation::Synonym)),
            kw("Artificial Rose", 390, "Flowers", "Types", "Artificial Rose", Some(Relation::Primary)),
            kw("fake plants", 18100, "Plants", "Core", "fake plants", Some(Relation::Primary)),
            kw("Artificial plants", 9900, "Plants", "Core", "fake plants", Some(Relation::Synonym)),
            kw("artificial hanging plants", 2400, "Plants", "", "artificial hanging plants", None),
        ]
    }

    #[test]
    fn empty_input_gives_empty_tree() {
        let tree = build(&[], IntentFilter::All);
        assert!(tree.is_empty());
    }

    #[test]
    fn themes_ordered_by_total_volume() {
        let records = fixture();
        let tree = build(&records, IntentFilter::All);
        let names: Vec<&str> = tree.themes.iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Flowers", "Plants"]);
        assert_eq!(tree.themes[0].volume, 14800 + 18100 + 6600 + 390);
        assert_eq!(tree.themes[1].volume, 18100 + 9900 + 2400);
    }

    #[test]
    fn tied_themes_keep_first_seen_order() {
        let records = vec![
            kw("b", 10, "Beta", "P", "b", None),
            kw("a", 10, "Alpha", "P", "a", None),
        ];
        let tree = build(&records, IntentFilter::All);
        let names: Vec<&str> = tree.themes.iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Beta", "Alpha"]);
    }

    #[test]
    fn theme_keys_are_case_sensitive() {
        let records = vec![
            kw("a", 1, "Flowers", "P", "a", None),
            kw("b", 1, "flowers", "P", "b", None),
        ];
        let tree = build(&records, IntentFilter::All);
        assert_eq!(tree.themes.len(), 2);
    }

    #[test]
    fn blank_pillar_becomes_general() {
        let records = fixture();
        let tree = build(&records, IntentFilter::All);
        let plants = tree.themes.iter().find(|t| t.name == "Plants").unwrap();
        let pillar_names: Vec<&str> = plants.pillars.iter().map(|p| p.name).collect();
        assert_eq!(pillar_names, vec!["Core", "General"]);
    }

    #[test]
    fn custom_fallback_label() {
        let records = vec![kw("a", 1, "", "", "a", None)];
        let tree = build_with_fallback(&records, IntentFilter::All, "Misc");
        assert_eq!(tree.themes[0].name, "Misc");
        assert_eq!(tree.themes[0].pillars[0].name, "Misc");
    }

    #[test]
    fn flagged_primary_wins_over_position() {
        let records = fixture();
        let tree = build(&records, IntentFilter::All);
        let core = &tree.themes[0].pillars[0];
        let page = &core.pages[0];
        assert_eq!(page.key, "fake flowers");
        assert_eq!(page.primary.keyword, "fake flowers");
        let synonyms: Vec<&str> = page.synonyms.iter().map(|r| r.keyword.as_str()).collect();
        assert_eq!(synonyms, vec!["Artificial flowers", "faux flowers"]);
    }

    #[test]
    fn keyword_equal_to_page_key_is_primary_without_flag() {
        let records = vec![
            kw("silk flowers", 50, "T", "P", "fake flowers", None),
            kw("fake flowers", 100, "T", "P", "fake flowers", None),
        ];
        let tree = build(&records, IntentFilter::All);
        let page = &tree.themes[0].pillars[0].pages[0];
        assert_eq!(page.primary.keyword, "fake flowers");
        assert_eq!(page.synonyms.len(), 1);
    }

    #[test]
    fn first_record_promoted_when_nothing_qualifies() {
        let records = vec![
            kw("silk flowers", 50, "T", "P", "fake flowers", Some(Relation::Synonym)),
            kw("faux flowers", 100, "T", "P", "fake flowers", Some(Relation::LongTail)),
        ];
        let tree = build(&records, IntentFilter::All);
        let page = &tree.themes[0].pillars[0].pages[0];
        assert_eq!(page.key, "fake flowers");
        assert_eq!(page.primary.keyword, "silk flowers");
        assert_eq!(page.synonyms.len(), 1);
        assert_eq!(page.synonyms[0].keyword, "faux flowers");
    }

    #[test]
    fn first_qualifying_record_wins_when_several_claim_primary() {
        let records = vec![
            kw("fake flowers", 10, "T", "P", "fake flowers", None),
            kw("faux flowers", 20, "T", "P", "fake flowers", Some(Relation::Primary)),
        ];
        let tree = build(&records, IntentFilter::All);
        let page = &tree.themes[0].pillars[0].pages[0];
        assert_eq!(page.primary.keyword, "fake flowers");
        assert_eq!(page.synonyms.len(), 1);
        assert_eq!(page.synonyms[0].keyword, "faux flowers");
    }

    #[test]
    fn missing_primary_variant_uses_keyword_as_page() {
        let records = vec![kw("artificial lily", 30, "T", "P", "", None)];
        let tree = build(&records, IntentFilter::All);
        let page = &tree.themes[0].pillars[0].pages[0];
        assert_eq!(page.key, "artificial lily");
        assert_eq!(page.primary.keyword, "artificial lily");
    }

    #[test]
    fn pages_ordered_by_primary_volume() {
        let records = vec![
            kw("small", 10, "T", "P", "small", None),
            kw("big synonym", 1000, "T", "P", "small", None),
            kw("medium", 50, "T", "P", "medium", None),
        ];
        let tree = build(&records, IntentFilter::All);
        let keys: Vec<&str> = tree.themes[0].pillars[0].pages.iter().map(|p| p.key).collect();
        assert_eq!(keys, vec!["medium", "small"]);
    }

    #[test]
    fn same_pillar_name_under_two_themes_stays_separate() {
        let records = vec![
            kw("a", 1, "Flowers", "Core", "a", None),
            kw("b", 1, "Plants", "Core", "b", None),
        ];
        let tree = build(&records, IntentFilter::All);
        assert_eq!(tree.themes.len(), 2);
        assert_eq!(tree.themes[0].pillars[0].pages.len(), 1);
        assert_eq!(tree.themes[1].pillars[0].pages.len(), 1);
    }

    #[test]
    fn filter_drops_other_intents() {
        let mut records = fixture();
        records[4].intent = Intent::Product;
        let tree = build(&records, IntentFilter::Only(Intent::Product));
        assert_eq!(tree.themes.len(), 1);
        assert_eq!(tree.themes[0].name, "Plants");
        assert_eq!(tree.records().count(), 1);
    }

    #[test]
    fn volume_is_conserved() {
        let records = fixture();
        let tree = build(&records, IntentFilter::All);
        let leaf_total: u64 = tree.records().map(|r| r.volume).sum();
        let input_total: u64 = records.iter().map(|r| r.volume).sum();
        assert_eq!(leaf_total, input_total);
        assert_eq!(tree.records().count(), records.len());
    }

    #[test]
    fn filtered_build_conserves_matching_volume_only() {
        let mut records = fixture();
        records[0].intent = Intent::Product;
        records[3].intent = Intent::Product;
        records[5].intent = Intent::Product;
        records[6].intent = Intent::Article;
        let tree = build(&records, IntentFilter::Only(Intent::Product));

        let products: Vec<&ClassifiedKeyword> = records
            .iter()
            .filter(|r| r.intent == Intent::Product)
            .collect();
        let leaf_total: u64 = tree.records().map(|r| r.volume).sum();
        let product_total: u64 = products.iter().map(|r| r.volume).sum();
        assert_eq!(leaf_total, 14800 + 390 + 9900);
        assert_eq!(leaf_total, product_total);
        assert_eq!(tree.records().count(), products.len());
        assert!(tree.records().all(|r| r.intent == Intent::Product));
    }

    #[test]
    fn adjacent_themes_never_increase_in_volume() {
        let records = vec![
            kw("a1", 40, "Alpha", "P", "a1", None),
            kw("b1", 900, "Beta", "P", "b1", None),
            kw("c1", 300, "Gamma", "P", "c1", None),
            kw("a2", 260, "Alpha", "Q", "a2", None),
            kw("d1", 5, "Delta", "P", "d1", None),
            kw("c2", 300, "Gamma", "Q", "c2", None),
            kw("e1", 300, "Epsilon", "P", "e1", None),
        ];
        let tree = build(&records, IntentFilter::All);
        assert_eq!(tree.themes.len(), 5);
        for pair in tree.themes.windows(2) {
            assert!(
                pair[0].volume >= pair[1].volume,
                "{} ({}) before {} ({})",
                pair[0].name,
                pair[0].volume,
                pair[1].name,
                pair[1].volume
            );
        }
        let names: Vec<&str> = tree.themes.iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Beta", "Gamma", "Alpha", "Epsilon", "Delta"]);
    }

    #[test]
    fn building_twice_is_identical() {
        let records = fixture();
        assert_eq!(
            build(&records, IntentFilter::All),
            build(&records, IntentFilter::All)
        );
    }

    #[test]
    fn every_page_has_exactly_one_primary() {
        let records = fixture();
        let tree = build(&records, IntentFilter::All);
        for theme in &tree.themes {
            for pillar in &theme.pillars {
                for page in &pillar.pages {
                    assert_eq!(page.records().count(), 1 + page.synonyms.len());
                    assert!(!page.synonyms.iter().any(|s| std::ptr::eq(*s, page.primary)));
                }
            }
        }
    }
}
