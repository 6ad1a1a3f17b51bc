use wildmatch::WildMatch;

use crate::model::base_filename;

/// A pattern made only of `*` and `?` would match every non-empty blob name
pub fn is_wildcard_only(pattern: &str) -> bool {
    pattern.chars().all(|c| matches!(c, '*' | '?'))
}

/// First blob matched by the earliest pattern that matches anything, along
/// with that pattern's position.
///
/// Matching is a case-insensitive shell glob (`*`, `?`) against the base
/// filename; every other character is literal, so punctuation from names
/// cannot make a pattern invalid.
///
/// Pattern order dominates blob order: a later pattern is only tried once
/// every blob has failed the earlier ones.
pub fn find_first_match_indexed<'a, P, N>(patterns: &[P], names: &'a [N]) -> Option<(usize, &'a N)>
where
    P: AsRef<str>,
    N: AsRef<str>,
{
    patterns
        .iter()
        .enumerate()
        .filter(|(_, pattern)| !is_wildcard_only(pattern.as_ref()))
        .find_map(|(idx, pattern)| {
            let matcher = WildMatch::new_case_insensitive(pattern.as_ref());
            names
                .iter()
                .find(|name| matcher.matches(base_filename(name.as_ref())))
                .map(|name| (idx, name))
        })
}

pub fn find_first_match<'a, P, N>(patterns: &[P], names: &'a [N]) -> Option<&'a N>
where
    P: AsRef<str>,
    N: AsRef<str>,
{
    find_first_match_indexed(patterns, names).map(|(_, name)| name)
}

/// Every blob matched by a single pattern, in listing order
pub fn find_matches<'a, N>(pattern: &str, names: &'a [N]) -> impl Iterator<Item = &'a N> + 'a
where
    N: AsRef<str>,
{
    let matcher = (!is_wildcard_only(pattern)).then(|| WildMatch::new_case_insensitive(pattern));
    names.iter().filter(move |name| {
        matcher
            .as_ref()
            .map_or(false, |m| m.matches(base_filename(name.as_ref())))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_order_beats_blob_order() {
        let blobs = ["bob.jpg", "alice.jpg"];
        assert_eq!(find_first_match(&["*alice*", "*bob*"], &blobs), Some(&"alice.jpg"));
        assert_eq!(find_first_match(&["*bob*", "*alice*"], &blobs), Some(&"bob.jpg"));
    }

    #[test]
    fn test_blob_order_breaks_ties_within_a_pattern() {
        let blobs = ["students/ali_2.jpg", "students/ali_1.jpg"];
        assert_eq!(
            find_first_match_indexed(&["*ali*"], &blobs),
            Some((0, &"students/ali_2.jpg"))
        );
    }

    #[test]
    fn test_matches_base_filename_only_and_ignores_case() {
        let blobs = ["students/alice/photo.jpg", "students/ALICE.PNG"];
        assert_eq!(find_first_match(&["*alice*"], &blobs), Some(&"students/ALICE.PNG"));
        assert_eq!(find_first_match(&["*.jpg"], &["a/b/c.JPG"]), Some(&"a/b/c.JPG"));
        assert_eq!(find_first_match(&["b*"], &["b/c.jpg"]), None);
    }

    #[test]
    fn test_no_match() {
        let blobs = ["carol.jpg"];
        assert_eq!(find_first_match(&["*alice*", "*bob*"], &blobs), None);
        let empty: [&str; 0] = [];
        assert_eq!(find_first_match(&["*alice*"], &empty), None);
    }

    #[test]
    fn test_glob_special_punctuation_does_not_fail() {
        let blobs = ["o[brien].jpg", "d'souza (1).png"];
        assert_eq!(find_first_match(&["*o[brien]*"], &blobs), Some(&"o[brien].jpg"));
        assert_eq!(find_first_match(&["*d'souza (1)*"], &blobs), Some(&"d'souza (1).png"));
        assert_eq!(find_first_match(&["*[a-z*"], &blobs), None);
    }

    #[test]
    fn test_wildcard_only_patterns_never_match() {
        let blobs = ["anything.jpg"];
        assert_eq!(find_first_match(&["**", "*", "?", "*?*", "???"], &blobs), None);
        assert_eq!(find_matches("*", &blobs).count(), 0);
        assert_eq!(find_matches("*?*", &blobs).count(), 0);
        assert!(is_wildcard_only("?"));
        assert!(is_wildcard_only("*?*"));
        assert!(!is_wildcard_only("*?_khan*"));
    }

    #[test]
    fn test_find_matches_keeps_listing_order() {
        let blobs = ["p/smart_b.jpg", "p/other.jpg", "p/smart_a.jpg"];
        let hits: Vec<_> = find_matches("*smart*.jpg", &blobs).collect();
        assert_eq!(hits, vec![&"p/smart_b.jpg", &"p/smart_a.jpg"]);
    }
}
