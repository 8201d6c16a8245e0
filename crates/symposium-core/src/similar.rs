//! Tag-overlap similarity between projects.
//!
//! Results keep the caller's enumeration order; there is no ranking by
//! overlap count. That is a documented simplification, not a "best match"
//! guarantee.

/// Parses a comma-separated tag string into lowercase, trimmed, non-empty
/// tokens.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Finds records sharing at least one tag token with `target_tags`.
///
/// `others` must not contain the target itself; the caller excludes it by
/// identity. An empty or whitespace-only target tag string yields an empty
/// result. Output order follows `others`, truncated to `limit`.
pub fn find_similar<'a, T>(
    target_tags: Option<&str>,
    others: &'a [T],
    tags_of: impl Fn(&T) -> Option<&str>,
    limit: usize,
) -> Vec<&'a T> {
    let target = parse_tags(target_tags.unwrap_or(""));
    if target.is_empty() {
        return Vec::new();
    }

    let mut matches = Vec::new();
    for other in others {
        if matches.len() == limit {
            break;
        }
        let other_tags = match tags_of(other) {
            Some(raw) => parse_tags(raw),
            None => continue,
        };
        if other_tags.iter().any(|tag| target.contains(tag)) {
            matches.push(other);
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item {
        name: &'static str,
        tags: Option<&'static str>,
    }

    fn items() -> Vec<Item> {
        vec![
            Item { name: "alpha", tags: Some("mobile, ui design, user experience") },
            Item { name: "beta", tags: Some("UI Design, accessibility") },
            Item { name: "gamma", tags: Some("virtual reality, education") },
            Item { name: "delta", tags: None },
            Item { name: "epsilon", tags: Some("ui design") },
            Item { name: "zeta", tags: Some("interface, ui design") },
        ]
    }

    #[test]
    fn test_parse_tags_trims_and_lowercases() {
        assert_eq!(
            parse_tags(" Mobile,  UI Design ,, user experience,"),
            ["mobile", "ui design", "user experience"]
        );
    }

    #[test]
    fn test_parse_tags_empty_and_whitespace() {
        assert!(parse_tags("").is_empty());
        assert!(parse_tags("  ,  , ").is_empty());
    }

    #[test]
    fn test_case_insensitive_overlap() {
        let items = items();
        let similar = find_similar(Some("mobile, ui design"), &items, |i| i.tags, 10);
        let names: Vec<_> = similar.iter().map(|i| i.name).collect();
        // "beta" matches via "UI Design" despite differing case.
        assert_eq!(names, ["alpha", "beta", "epsilon", "zeta"]);
    }

    #[test]
    fn test_limit_is_respected_in_input_order() {
        let items = items();
        let similar = find_similar(Some("ui design"), &items, |i| i.tags, 3);
        let names: Vec<_> = similar.iter().map(|i| i.name).collect();
        assert_eq!(names, ["alpha", "beta", "epsilon"]);
    }

    #[test]
    fn test_empty_target_tags_yield_nothing() {
        let items = items();
        assert!(find_similar(None, &items, |i| i.tags, 3).is_empty());
        assert!(find_similar(Some("   "), &items, |i| i.tags, 3).is_empty());
        assert!(find_similar(Some(" , "), &items, |i| i.tags, 3).is_empty());
    }

    #[test]
    fn test_untagged_candidates_are_skipped() {
        let items = items();
        let similar = find_similar(Some("education"), &items, |i| i.tags, 3);
        let names: Vec<_> = similar.iter().map(|i| i.name).collect();
        assert_eq!(names, ["gamma"]);
    }

    #[test]
    fn test_no_overlap_yields_nothing() {
        let items = items();
        assert!(find_similar(Some("databases"), &items, |i| i.tags, 3).is_empty());
    }
}
