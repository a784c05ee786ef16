use catalog_core::{DomainError, DomainResult, FieldError};

use crate::product_store::{ProductFilter, Window};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_LIMIT: u32 = 250;

/// Hard ceiling on page size; larger requests are clamped.
pub const MAX_PAGE_LIMIT: u32 = 250;

/// Category value that means "no category filter".
const ALL_CATEGORIES: &str = "all";

/// A validated listing request.
///
/// `page` and `limit` are only set through `parse`, so both are always `>= 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    page: u32,
    limit: u32,
    pub filter: ProductFilter,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
            filter: ProductFilter::default(),
        }
    }
}

impl ProductQuery {
    /// Parse raw query-string values.
    ///
    /// Empty strings count as absent. `page` and `limit` must be integers
    /// `>= 1`; `limit` is clamped to `MAX_PAGE_LIMIT`. `category=all` and an
    /// empty `search` do not filter.
    pub fn parse(
        page: Option<&str>,
        limit: Option<&str>,
        category: Option<&str>,
        search: Option<&str>,
    ) -> DomainResult<Self> {
        let mut errors = Vec::new();

        let page = match parse_positive(page) {
            Ok(p) => p.unwrap_or(1),
            Err(message) => {
                errors.push(FieldError::new("page", message));
                1
            }
        };
        let limit = match parse_positive(limit) {
            Ok(l) => l.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT),
            Err(message) => {
                errors.push(FieldError::new("limit", message));
                DEFAULT_PAGE_LIMIT
            }
        };
        DomainError::check_fields(errors)?;

        let category = non_empty(category)
            .filter(|c| *c != ALL_CATEGORIES)
            .map(str::to_string);
        let search = non_empty(search).map(str::to_string);

        Ok(Self {
            page,
            limit,
            filter: ProductFilter { category, search },
        })
    }

    /// 1-based page number.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Page size, `1..=MAX_PAGE_LIMIT`.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Skip/limit window for this page.
    pub fn window(&self) -> Window {
        Window {
            skip: u64::from(self.page - 1) * u64::from(self.limit),
            limit: self.limit,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_positive(value: Option<&str>) -> Result<Option<u32>, String> {
    let Some(raw) = non_empty(value) else {
        return Ok(None);
    };
    match raw.trim().parse::<u32>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(v) => Ok(Some(v)),
        Err(_) => Err("must be a positive integer".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_nothing_is_given() {
        let q = ProductQuery::parse(None, None, None, None).unwrap();
        assert_eq!(q, ProductQuery::default());
        assert_eq!(q.window(), Window { skip: 0, limit: 250 });
    }

    #[test]
    fn window_skips_previous_pages() {
        let q = ProductQuery::parse(Some("3"), Some("20"), None, None).unwrap();
        assert_eq!(q.window(), Window { skip: 40, limit: 20 });
    }

    #[test]
    fn limit_is_clamped_to_ceiling() {
        let q = ProductQuery::parse(None, Some("10000"), None, None).unwrap();
        assert_eq!(q.limit(), MAX_PAGE_LIMIT);
    }

    #[test]
    fn parsed_queries_never_hold_zero() {
        for raw in [None, Some(""), Some("1"), Some("999")] {
            let q = ProductQuery::parse(raw, raw, None, None).unwrap();
            assert!(q.page() >= 1 && q.limit() >= 1);
        }
        assert!(ProductQuery::parse(None, Some("0"), None, None).is_err());
    }

    #[test]
    fn malformed_numbers_are_rejected_together() {
        let err = ProductQuery::parse(Some("zero"), Some("-5"), None, None).unwrap_err();
        match err {
            DomainError::Validation(errors) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["page", "limit"]);
            }
            other => panic!("Expected Validation error, got {other:?}"),
        }
        assert!(ProductQuery::parse(Some("0"), None, None, None).is_err());
    }

    #[test]
    fn all_category_and_blank_values_do_not_filter() {
        let q = ProductQuery::parse(Some(""), Some(""), Some("all"), Some("  ")).unwrap();
        assert_eq!(q.filter, ProductFilter::default());

        let q = ProductQuery::parse(None, None, Some("tools"), Some("ham")).unwrap();
        assert_eq!(q.filter.category.as_deref(), Some("tools"));
        assert_eq!(q.filter.search.as_deref(), Some("ham"));
    }
}
