//! Filter and window types shared by every store implementation.

use catalog_products::Product;

/// Filter criteria for product reads. `None` fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Exact category match.
    pub category: Option<String>,
    /// Case-insensitive literal substring, matched against name OR description.
    pub search: Option<String>,
}

impl ProductFilter {
    /// Reference semantics of the filter; SQL stores must agree with this.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category {
            if product.category != *category {
                return false;
            }
        }

        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let hit = product.name.to_lowercase().contains(&needle)
                || product.description.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }

        true
    }
}

/// Skip/limit window over an id-ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub skip: u64,
    pub limit: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_products::{normalize_on_create, ProductFields};
    use serde_json::json;

    fn product(name: &str, description: &str, category: &str) -> Product {
        let fields: ProductFields = serde_json::from_value(json!({
            "id": 1,
            "name": name,
            "description": description,
            "price": 1,
            "category": category,
            "images": "http://x/a.png"
        }))
        .unwrap();
        normalize_on_create(&fields).unwrap()
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(ProductFilter::default().matches(&product("Hammer", "", "tools")));
    }

    #[test]
    fn category_is_exact() {
        let filter = ProductFilter {
            category: Some("tools".into()),
            search: None,
        };
        assert!(filter.matches(&product("Hammer", "", "tools")));
        assert!(!filter.matches(&product("Hammer", "", "Tools")));
        assert!(!filter.matches(&product("Hammer", "", "garden")));
    }

    #[test]
    fn search_hits_name_or_description_case_insensitively() {
        let filter = ProductFilter {
            category: None,
            search: Some("foo".into()),
        };
        assert!(filter.matches(&product("FOOtball", "", "sports")));
        assert!(filter.matches(&product("Ball", "Great for Foosball", "sports")));
        assert!(!filter.matches(&product("Ball", "round", "sports")));
    }

    #[test]
    fn search_is_literal_not_a_pattern() {
        let filter = ProductFilter {
            category: None,
            search: Some("a.c".into()),
        };
        assert!(filter.matches(&product("a.c adapter", "", "x")));
        assert!(!filter.matches(&product("abc adapter", "", "x")));
    }
}
