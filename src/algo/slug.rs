//! URL slugs for the pages of the site tree.

/// Lowercase, map non-alphanumerics to `-`, collapse runs, trim dashes.
pub fn slugify(s: &str) -> String {
    let mut slug = String::with_capacity(s.len());
    let mut gap = false;
    for c in s.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if gap && !slug.is_empty() {
                slug.push('-');
            }
            gap = false;
            slug.push(c);
        } else {
            gap = true;
        }
    }
    slug
}

/// `/theme/pillar/page` path for a page. Segments that slugify to nothing
/// are left out.
pub fn page_path(theme: &str, pillar: &str, page: &str) -> String {
    let segments: Vec<String> = [theme, pillar, page]
        .iter()
        .map(|s| slugify(s))
        .filter(|s| !s.is_empty())
        .collect();
    format!("/{}", segments.join("/"))
}
