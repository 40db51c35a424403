use crate::reddit::models::Post;

/// Query parameters consumed by the feed itself rather than forwarded upstream.
const FILTER_KEYS: [&str; 3] = ["safe", "scoreLimit", "flair"];

/// Post filters from the feed URL's query string. All present filters must pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedFilters {
    /// Drop over-18 posts and posts flaired "nsfw".
    pub safe: bool,
    /// Drop posts scoring below this.
    pub score_limit: Option<i64>,
    /// Keep only posts with exactly this flair.
    pub flair: Option<String>,
}

impl FeedFilters {
    /// Build filters from decoded query pairs. The first value of a key wins.
    ///
    /// A `scoreLimit` that is not an integer is ignored, as is an empty `flair`.
    #[must_use]
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let first = |name: &str| {
            pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        };

        Self {
            safe: first("safe").is_some_and(|v| v.eq_ignore_ascii_case("true")),
            score_limit: first("scoreLimit").and_then(|v| v.trim().parse().ok()),
            flair: first("flair").filter(|v| !v.is_empty()).map(ToString::to_string),
        }
    }

    #[must_use]
    pub fn is_filter_key(key: &str) -> bool {
        FILTER_KEYS.contains(&key)
    }

    #[must_use]
    pub fn allows(&self, post: &Post) -> bool {
        if self.safe && (post.over_18 || post.flair().eq_ignore_ascii_case("nsfw")) {
            return false;
        }
        if self.score_limit.is_some_and(|limit| post.score < limit) {
            return false;
        }
        if let Some(flair) = &self.flair {
            if post.flair() != flair {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(query: &str) -> Vec<(String, String)> {
        url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn post(score: i64, over_18: bool, flair: Option<&str>) -> Post {
        Post {
            score,
            over_18,
            link_flair_text: flair.map(ToString::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_pairs() {
        let filters = FeedFilters::from_pairs(&pairs("safe=TRUE&scoreLimit=10&flair=Meta%20Post"));
        assert_eq!(
            filters,
            FeedFilters {
                safe: true,
                score_limit: Some(10),
                flair: Some("Meta Post".to_string()),
            }
        );
    }

    #[test]
    fn test_invalid_score_limit_ignored() {
        let filters = FeedFilters::from_pairs(&pairs("scoreLimit=lots"));
        assert_eq!(filters.score_limit, None);
        assert!(filters.allows(&post(-5, false, None)));
    }

    #[test]
    fn test_first_value_wins() {
        let filters = FeedFilters::from_pairs(&pairs("scoreLimit=3&scoreLimit=100"));
        assert_eq!(filters.score_limit, Some(3));
    }

    #[test]
    fn test_safe_excludes_nsfw() {
        let filters = FeedFilters::from_pairs(&pairs("safe=true"));
        assert!(!filters.allows(&post(1, true, None)));
        assert!(!filters.allows(&post(1, false, Some("NSFW"))));
        assert!(filters.allows(&post(1, false, Some("News"))));

        let unsafe_filters = FeedFilters::from_pairs(&pairs("safe=false"));
        assert!(unsafe_filters.allows(&post(1, true, None)));
    }

    #[test]
    fn test_score_limit_is_inclusive() {
        let filters = FeedFilters::from_pairs(&pairs("scoreLimit=10"));
        let kept: Vec<i64> = [1, 5, 10, 15, 20]
            .into_iter()
            .map(|s| post(s, false, None))
            .filter(|p| filters.allows(p))
            .map(|p| p.score)
            .collect();
        assert_eq!(kept, vec![10, 15, 20]);
    }

    #[test]
    fn test_flair_must_match_exactly() {
        let filters = FeedFilters::from_pairs(&pairs("flair=News"));
        assert!(filters.allows(&post(1, false, Some("News"))));
        assert!(!filters.allows(&post(1, false, Some("news"))));
        assert!(!filters.allows(&post(1, false, None)));

        let empty = FeedFilters::from_pairs(&pairs("flair="));
        assert!(empty.allows(&post(1, false, None)));
    }

    #[test]
    fn test_filters_combine() {
        let filters = FeedFilters::from_pairs(&pairs("safe=true&scoreLimit=5&flair=News"));
        assert!(filters.allows(&post(5, false, Some("News"))));
        assert!(!filters.allows(&post(4, false, Some("News"))));
        assert!(!filters.allows(&post(5, true, Some("News"))));
        assert!(!filters.allows(&post(5, false, Some("Other"))));
    }

    #[test]
    fn test_is_filter_key() {
        assert!(FeedFilters::is_filter_key("scoreLimit"));
        assert!(!FeedFilters::is_filter_key("t"));
    }
}
