//! Wire representation of products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::product_store::StoredProduct;

use super::query::ProductQuery;

/// A product as it leaves the service: storage-only fields removed,
/// decimals as JSON numbers, `images` always a list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub bulk_price: Decimal,
    pub bulk_qty: u32,
    pub category: String,
    pub in_stock: bool,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StoredProduct> for ProductView {
    fn from(stored: StoredProduct) -> Self {
        let p = stored.product;
        Self {
            id: p.id.value(),
            name: p.name,
            description: p.description,
            price: p.price,
            bulk_price: p.bulk_price,
            bulk_qty: p.bulk_qty,
            category: p.category,
            in_stock: p.in_stock,
            images: p.images,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }
}

/// One page of a product listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPage {
    /// Number of products in `data`.
    pub count: usize,
    /// Products matching the filter across all pages.
    pub total: u64,
    pub page: u32,
    pub pages: u64,
    pub data: Vec<ProductView>,
}

impl ProductPage {
    pub fn new(query: &ProductQuery, total: u64, rows: Vec<StoredProduct>) -> Self {
        let data: Vec<ProductView> = rows.into_iter().map(ProductView::from).collect();
        Self {
            count: data.len(),
            total,
            page: query.page(),
            pages: total.div_ceil(u64::from(query.limit())),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_products::{normalize_on_create, ProductFields};
    use serde_json::json;

    fn stored() -> StoredProduct {
        let fields: ProductFields = serde_json::from_value(json!({
            "id": 1,
            "name": "Widget",
            "price": 9.999,
            "category": "tools",
            "images": "http://e/a.jpg"
        }))
        .unwrap();
        StoredProduct {
            product: normalize_on_create(&fields).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            revision: 3,
        }
    }

    #[test]
    fn view_uses_camel_case_numbers_and_hides_revision() {
        let json = serde_json::to_value(ProductView::from(stored())).unwrap();

        assert_eq!(json["price"], json!(10.0));
        assert_eq!(json["bulkPrice"], json!(10.0));
        assert_eq!(json["bulkQty"], json!(1));
        assert_eq!(json["inStock"], json!(true));
        assert_eq!(json["images"], json!(["http://e/a.jpg"]));
        assert!(json.get("revision").is_none());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn pages_round_up() {
        let query = ProductQuery::parse(None, Some("20"), None, None).unwrap();
        assert_eq!(ProductPage::new(&query, 0, vec![]).pages, 0);
        assert_eq!(ProductPage::new(&query, 20, vec![]).pages, 1);
        assert_eq!(ProductPage::new(&query, 21, vec![]).pages, 2);
    }
}
