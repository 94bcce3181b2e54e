use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Characters with special meaning in the CMS query language.
const SEARCH_RESERVED: [char; 3] = ['*', '"', '\''];

/// Query string exactly as received. Every field is optional and untyped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RawListingParams {
    pub(crate) page: Option<String>,
    pub(crate) category: Option<String>,
    pub(crate) search: Option<String>,
    pub(crate) sort: Option<String>,
    pub(crate) order: Option<String>,
    pub(crate) limit: Option<String>,
}

impl From<&HashMap<String, String>> for RawListingParams {
    fn from(query: &HashMap<String, String>) -> Self {
        let get = |key: &str| query.get(key).cloned();
        Self {
            page: get("page"),
            category: get("category"),
            search: get("search"),
            sort: get("sort"),
            order: get("order"),
            limit: get("limit"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SortKey {
    #[default]
    Latest,
    Popular,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortKey {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            SortKey::Latest => "latest",
            SortKey::Popular => "popular",
        }
    }
}

impl SortOrder {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Page size bounds for one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageSizePolicy {
    pub(crate) default: u32,
    pub(crate) max: u32,
}

impl Default for PageSizePolicy {
    fn default() -> Self {
        Self { default: 9, max: 50 }
    }
}

/// Fully defaulted listing parameters. `None` filters mean "no filter".
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QueryParameters {
    pub(crate) page: u32,
    pub(crate) category: Option<String>,
    pub(crate) search: Option<String>,
    pub(crate) sort: SortKey,
    pub(crate) order: SortOrder,
    pub(crate) page_size: u32,
}

impl QueryParameters {
    /// Never fails: anything malformed silently falls back to its default.
    pub(crate) fn normalize(raw: &RawListingParams, policy: PageSizePolicy) -> Self {
        Self {
            page: parse_positive(raw.page.as_deref()).unwrap_or(1),
            category: non_empty(raw.category.as_deref().map(str::trim)),
            search: non_empty(raw.search.as_deref().map(sanitize_search).as_deref()),
            sort: parse_sort(raw.sort.as_deref()),
            order: parse_order(raw.order.as_deref()),
            page_size: parse_positive(raw.limit.as_deref())
                .filter(|limit| *limit <= policy.max)
                .unwrap_or(policy.default),
        }
    }

    /// Query pairs that differ from the defaults, in a stable order.
    pub(crate) fn link_pairs(&self, page: u32, default_page_size: u32) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if page > 1 {
            pairs.push(("page", page.to_string()));
        }
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if self.sort != SortKey::default() {
            pairs.push(("sort", self.sort.as_str().to_string()));
        }
        if self.order != SortOrder::default() {
            pairs.push(("order", self.order.as_str().to_string()));
        }
        if self.page_size != default_page_size {
            pairs.push(("limit", self.page_size.to_string()));
        }
        pairs
    }
}

pub(crate) fn sanitize_search(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !SEARCH_RESERVED.contains(ch))
        .collect::<String>()
        .trim()
        .to_string()
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    let raw = raw?.trim();
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u32>().ok().filter(|value| *value > 0)
}

fn parse_sort(raw: Option<&str>) -> SortKey {
    match raw.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
        Some("popular") => SortKey::Popular,
        _ => SortKey::Latest,
    }
}

fn parse_order(raw: Option<&str>) -> SortOrder {
    match raw.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
        Some("asc") => SortOrder::Asc,
        _ => SortOrder::Desc,
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(page: Option<&str>) -> RawListingParams {
        RawListingParams {
            page: page.map(str::to_string),
            ..RawListingParams::default()
        }
    }

    #[test]
    fn malformed_page_defaults_to_one() {
        for value in [None, Some(""), Some("abc"), Some("-3"), Some("0"), Some("2.5"), Some("+4"), Some("99999999999")] {
            let params = QueryParameters::normalize(&raw(value), PageSizePolicy::default());
            assert_eq!(params.page, 1, "page {value:?}");
        }
    }

    #[test]
    fn valid_page_is_kept() {
        let params = QueryParameters::normalize(&raw(Some(" 7 ")), PageSizePolicy::default());
        assert_eq!(params.page, 7);
    }

    #[test]
    fn unknown_sort_falls_back_to_latest() {
        for value in ["", "oldest", "random", "POPULAR "] {
            let params = QueryParameters::normalize(
                &RawListingParams {
                    sort: Some(value.to_string()),
                    ..RawListingParams::default()
                },
                PageSizePolicy::default(),
            );
            let expected = if value.trim().eq_ignore_ascii_case("popular") {
                SortKey::Popular
            } else {
                SortKey::Latest
            };
            assert_eq!(params.sort, expected, "sort {value:?}");
        }
    }

    #[test]
    fn order_defaults_to_desc() {
        let params = QueryParameters::normalize(&RawListingParams::default(), PageSizePolicy::default());
        assert_eq!(params.order, SortOrder::Desc);

        let params = QueryParameters::normalize(
            &RawListingParams {
                order: Some("asc".to_string()),
                ..RawListingParams::default()
            },
            PageSizePolicy::default(),
        );
        assert_eq!(params.order, SortOrder::Asc);
    }

    #[test]
    fn search_is_stripped_of_reserved_characters() {
        for input in ["*", "\"quoted\"", "it's", "a*b\"c'd", "  *spaces*  "] {
            let cleaned = sanitize_search(input);
            assert!(!cleaned.contains(['*', '"', '\'']), "{input:?} -> {cleaned:?}");
        }
        assert_eq!(sanitize_search("a*b\"c'd"), "abcd");
    }

    #[test]
    fn empty_filters_become_none() {
        let params = QueryParameters::normalize(
            &RawListingParams {
                category: Some("   ".to_string()),
                search: Some("**".to_string()),
                ..RawListingParams::default()
            },
            PageSizePolicy::default(),
        );
        assert_eq!(params.category, None);
        assert_eq!(params.search, None);
    }

    #[test]
    fn limit_respects_policy() {
        let policy = PageSizePolicy { default: 9, max: 20 };
        let with_limit = |limit: &str| {
            QueryParameters::normalize(
                &RawListingParams {
                    limit: Some(limit.to_string()),
                    ..RawListingParams::default()
                },
                policy,
            )
            .page_size
        };
        assert_eq!(with_limit("12"), 12);
        assert_eq!(with_limit("21"), 9);
        assert_eq!(with_limit("0"), 9);
        assert_eq!(with_limit("x"), 9);
    }

    #[test]
    fn link_pairs_skip_defaults() {
        let params = QueryParameters {
            page: 3,
            category: Some("branding".to_string()),
            search: None,
            sort: SortKey::Popular,
            order: SortOrder::Desc,
            page_size: 9,
        };
        assert_eq!(
            params.link_pairs(2, 9),
            vec![
                ("page", "2".to_string()),
                ("category", "branding".to_string()),
                ("sort", "popular".to_string()),
            ]
        );
        assert_eq!(params.link_pairs(1, 9).len(), 2);
    }

    #[test]
    fn builds_from_query_map() {
        let mut map = HashMap::new();
        map.insert("page".to_string(), "2".to_string());
        map.insert("category".to_string(), "branding".to_string());
        let raw = RawListingParams::from(&map);
        assert_eq!(raw.page.as_deref(), Some("2"));
        assert_eq!(raw.category.as_deref(), Some("branding"));
        assert_eq!(raw.search, None);
    }
}
