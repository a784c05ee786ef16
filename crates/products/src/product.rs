use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use serde_json::Value;

use catalog_core::{DomainError, DomainResult, FieldError, ProductId};

use crate::coerce::{self, Flag, Integer, Numeric, Text};
use crate::images::coerce_images;

/// Maximum product name length, in characters.
pub const NAME_MAX_LEN: usize = 100;

/// Maximum product description length, in characters.
pub const DESCRIPTION_MAX_LEN: usize = 1000;

/// Largest storable price: twelve digits, two of them after the point.
pub const PRICE_MAX: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Canonical, normalized product record.
///
/// Only `normalize_on_create` and `normalize_on_update` produce values that are
/// guaranteed to satisfy the catalog invariants; stores rehydrate trusted rows
/// directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Always rounded to 2 decimal places.
    pub price: Decimal,
    /// Always rounded to 2 decimal places.
    pub bulk_price: Decimal,
    pub bulk_qty: u32,
    pub category: String,
    pub in_stock: bool,
    /// Never empty; every entry is an http(s) URL.
    pub images: Vec<String>,
}

/// Raw product fields as sent by a client, for both creation and partial updates.
///
/// Every field is optional and loosely typed so that all problems can be
/// reported together instead of failing on the first mistyped value. `null` is
/// read as absent. `image` is accepted as a legacy alias of `images`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFields {
    pub id: Option<Value>,
    pub name: Option<Value>,
    pub description: Option<Value>,
    pub price: Option<Value>,
    pub bulk_price: Option<Value>,
    pub bulk_qty: Option<Value>,
    pub category: Option<Value>,
    pub in_stock: Option<Value>,
    #[serde(alias = "image")]
    pub images: Option<Value>,
}

impl ProductFields {
    /// Fields present in `patch` replace ours; absent ones are kept.
    pub fn overlay(self, patch: ProductFields) -> Self {
        Self {
            id: patch.id.or(self.id),
            name: patch.name.or(self.name),
            description: patch.description.or(self.description),
            price: patch.price.or(self.price),
            bulk_price: patch.bulk_price.or(self.bulk_price),
            bulk_qty: patch.bulk_qty.or(self.bulk_qty),
            category: patch.category.or(self.category),
            in_stock: patch.in_stock.or(self.in_stock),
            images: patch.images.or(self.images),
        }
    }
}

impl From<&Product> for ProductFields {
    fn from(p: &Product) -> Self {
        // Decimals go out as strings so re-reading them is exact.
        Self {
            id: Some(Value::from(p.id.value())),
            name: Some(Value::String(p.name.clone())),
            description: Some(Value::String(p.description.clone())),
            price: Some(Value::String(p.price.to_string())),
            bulk_price: Some(Value::String(p.bulk_price.to_string())),
            bulk_qty: Some(Value::from(p.bulk_qty)),
            category: Some(Value::String(p.category.clone())),
            in_stock: Some(Value::Bool(p.in_stock)),
            images: Some(Value::from(p.images.clone())),
        }
    }
}

/// Round a monetary amount to cents, halves away from zero.
pub fn round_price(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Validate and normalize the input of a create operation.
///
/// `id`, `name`, `price`, `category` and `images` are mandatory. `bulkPrice`
/// falls back to `price` and `bulkQty` to 1 when absent or not a number.
/// Every violated field is listed in the returned `Validation` error.
pub fn normalize_on_create(fields: &ProductFields) -> DomainResult<Product> {
    let mut errors = Vec::new();

    let id = collect(&mut errors, "id", parse_id(fields.id.as_ref()));
    let name = collect(
        &mut errors,
        "name",
        parse_required_text(fields.name.as_ref(), Some(NAME_MAX_LEN)),
    );
    let description = collect(
        &mut errors,
        "description",
        parse_description(fields.description.as_ref()),
    );
    let price = collect(&mut errors, "price", parse_price(fields.price.as_ref()));
    let bulk_price = collect(
        &mut errors,
        "bulkPrice",
        parse_bulk_price(fields.bulk_price.as_ref(), price),
    )
    .flatten();
    let bulk_qty = collect(&mut errors, "bulkQty", parse_bulk_qty(fields.bulk_qty.as_ref()));
    let category = collect(
        &mut errors,
        "category",
        parse_required_text(fields.category.as_ref(), None),
    );
    let in_stock = collect(&mut errors, "inStock", parse_in_stock(fields.in_stock.as_ref()));
    let images = match coerce_images(fields.images.as_ref()) {
        Ok(images) => Some(images),
        Err(mut image_errors) => {
            errors.append(&mut image_errors);
            None
        }
    };

    let (
        Some(id),
        Some(name),
        Some(description),
        Some(price),
        Some(bulk_price),
        Some(bulk_qty),
        Some(category),
        Some(in_stock),
        Some(images),
    ) = (id, name, description, price, bulk_price, bulk_qty, category, in_stock, images)
    else {
        return Err(DomainError::Validation(errors));
    };
    DomainError::check_fields(errors)?;

    Ok(Product {
        id,
        name,
        description,
        price,
        bulk_price,
        bulk_qty,
        category,
        in_stock,
        images,
    })
}

/// Apply a partial update to an existing product.
///
/// Only fields present in `patch` change; the merged record then goes through
/// the same rules as a create, so a patch can never leave it invalid. `id` is
/// immutable: a patch may repeat it but not change it.
pub fn normalize_on_update(existing: &Product, patch: &ProductFields) -> DomainResult<Product> {
    if let Some(raw) = patch.id.as_ref() {
        match coerce::integer(Some(raw)) {
            Integer::Value(v) if v == existing.id.value() => {}
            Integer::Missing => {}
            _ => return Err(DomainError::validation("id", "is immutable")),
        }
    }

    let patch = ProductFields {
        id: None,
        ..patch.clone()
    };
    normalize_on_create(&ProductFields::from(existing).overlay(patch))
}

fn collect<T>(errors: &mut Vec<FieldError>, field: &str, parsed: Result<T, String>) -> Option<T> {
    match parsed {
        Ok(v) => Some(v),
        Err(message) => {
            errors.push(FieldError::new(field, message));
            None
        }
    }
}

fn parse_id(value: Option<&Value>) -> Result<ProductId, String> {
    match coerce::integer(value) {
        Integer::Missing => Err("is required".to_string()),
        Integer::Value(v) => ProductId::new(v).map_err(|_| "must be a positive integer".to_string()),
        Integer::OutOfRange => Err("is too large".to_string()),
        Integer::Invalid | Integer::Fractional => Err("must be a positive integer".to_string()),
    }
}

fn parse_required_text(value: Option<&Value>, max_len: Option<usize>) -> Result<String, String> {
    match coerce::text(value) {
        Text::Missing => Err("is required".to_string()),
        Text::NotString => Err("must be a string".to_string()),
        Text::Value(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Err("must not be empty".to_string());
            }
            if let Some(max) = max_len {
                if s.chars().count() > max {
                    return Err(format!("must be at most {max} characters"));
                }
            }
            Ok(s.to_string())
        }
    }
}

fn parse_description(value: Option<&Value>) -> Result<String, String> {
    match coerce::text(value) {
        Text::Missing => Ok(String::new()),
        Text::NotString => Err("must be a string".to_string()),
        Text::Value(s) if s.chars().count() > DESCRIPTION_MAX_LEN => Err(format!(
            "must be at most {DESCRIPTION_MAX_LEN} characters"
        )),
        Text::Value(s) => Ok(s.to_string()),
    }
}

fn parse_price(value: Option<&Value>) -> Result<Decimal, String> {
    match coerce::decimal(value) {
        Numeric::Missing => Err("is required".to_string()),
        Numeric::Invalid => Err("must be a number".to_string()),
        Numeric::OutOfRange => Err(too_large()),
        Numeric::Value(d) => bounded_price(d),
    }
}

fn bounded_price(amount: Decimal) -> Result<Decimal, String> {
    if amount < Decimal::ZERO {
        return Err("must not be negative".to_string());
    }
    let rounded = round_price(amount);
    if rounded > PRICE_MAX {
        return Err(too_large());
    }
    Ok(rounded)
}

fn too_large() -> String {
    format!("is too large (at most {PRICE_MAX})")
}

/// `Ok(None)` only when `price` itself was unusable; that error is already recorded.
fn parse_bulk_price(value: Option<&Value>, price: Option<Decimal>) -> Result<Option<Decimal>, String> {
    match coerce::decimal(value) {
        Numeric::Missing | Numeric::Invalid => Ok(price),
        Numeric::OutOfRange => Err(too_large()),
        Numeric::Value(d) => bounded_price(d).map(Some),
    }
}

fn parse_bulk_qty(value: Option<&Value>) -> Result<u32, String> {
    match coerce::integer(value) {
        Integer::Missing | Integer::Invalid => Ok(1),
        Integer::Fractional => Err("must be a whole number".to_string()),
        Integer::OutOfRange => Err("is too large".to_string()),
        Integer::Value(v) if v < 1 => Err("must be at least 1".to_string()),
        Integer::Value(v) => u32::try_from(v).map_err(|_| "is too large".to_string()),
    }
}

fn parse_in_stock(value: Option<&Value>) -> Result<bool, String> {
    match coerce::flag(value) {
        Flag::Missing => Ok(true),
        Flag::Invalid => Err("must be a boolean".to_string()),
        Flag::Value(b) => Ok(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> ProductFields {
        serde_json::from_value(value).unwrap()
    }

    fn widget() -> ProductFields {
        fields(json!({
            "id": 1,
            "name": "Widget",
            "price": 9.999,
            "category": "tools",
            "images": ["http://e/a.jpg"]
        }))
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn field_names(err: DomainError) -> Vec<String> {
        match err {
            DomainError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn create_applies_defaults_and_rounding() {
        let product = normalize_on_create(&widget()).unwrap();

        assert_eq!(product.id.value(), 1);
        assert_eq!(product.name, "Widget");
        assert_eq!(product.description, "");
        assert_eq!(product.price, dec("10.00"));
        assert_eq!(product.bulk_price, dec("10.00"));
        assert_eq!(product.bulk_qty, 1);
        assert!(product.in_stock);
        assert_eq!(product.images, vec!["http://e/a.jpg".to_string()]);
    }

    #[test]
    fn omitted_bulk_price_equals_price() {
        let mut input = widget();
        input.price = Some(json!(4.2));
        let product = normalize_on_create(&input).unwrap();
        assert_eq!(product.bulk_price, product.price);
    }

    #[test]
    fn non_numeric_bulk_fields_fall_back_to_defaults() {
        let mut input = widget();
        input.bulk_price = Some(json!("not a number"));
        input.bulk_qty = Some(json!("lots"));
        let product = normalize_on_create(&input).unwrap();
        assert_eq!(product.bulk_price, product.price);
        assert_eq!(product.bulk_qty, 1);
    }

    #[test]
    fn explicit_bulk_fields_are_kept_and_rounded() {
        let mut input = widget();
        input.bulk_price = Some(json!(8.005));
        input.bulk_qty = Some(json!(12));
        let product = normalize_on_create(&input).unwrap();
        assert_eq!(product.bulk_price, dec("8.01"));
        assert_eq!(product.bulk_qty, 12);
    }

    #[test]
    fn bare_image_string_becomes_single_entry() {
        let mut input = widget();
        input.images = Some(json!("http://x/a.png"));
        let product = normalize_on_create(&input).unwrap();
        assert_eq!(product.images, vec!["http://x/a.png".to_string()]);
    }

    #[test]
    fn legacy_image_field_name_is_accepted() {
        let input = fields(json!({
            "id": 3,
            "name": "Legacy",
            "price": 1,
            "category": "misc",
            "image": "https://cdn.example.com/legacy.png"
        }));
        let product = normalize_on_create(&input).unwrap();
        assert_eq!(product.images, vec!["https://cdn.example.com/legacy.png".to_string()]);
    }

    #[test]
    fn empty_images_are_rejected() {
        let mut input = widget();
        input.images = Some(json!([]));
        assert_eq!(field_names(normalize_on_create(&input).unwrap_err()), vec!["images"]);
    }

    #[test]
    fn every_missing_required_field_is_reported() {
        let err = normalize_on_create(&ProductFields::default()).unwrap_err();
        assert_eq!(
            field_names(err),
            vec!["id", "name", "price", "category", "images"]
        );
    }

    #[test]
    fn negative_numbers_and_small_bulk_qty_are_rejected() {
        let mut input = widget();
        input.price = Some(json!(-1));
        input.bulk_price = Some(json!(-2));
        input.bulk_qty = Some(json!(0));
        assert_eq!(
            field_names(normalize_on_create(&input).unwrap_err()),
            vec!["price", "bulkPrice", "bulkQty"]
        );
    }

    #[test]
    fn out_of_range_bulk_fields_are_reported_not_defaulted() {
        for huge in [json!(u64::MAX), json!(1e28), json!("1e30")] {
            let mut input = widget();
            input.bulk_price = Some(huge.clone());
            input.bulk_qty = Some(huge);
            assert_eq!(
                field_names(normalize_on_create(&input).unwrap_err()),
                vec!["bulkPrice", "bulkQty"]
            );
        }
    }

    #[test]
    fn price_above_storable_maximum_is_too_large() {
        let mut input = widget();
        input.price = Some(json!("9999999999.99"));
        assert_eq!(normalize_on_create(&input).unwrap().price, PRICE_MAX);

        input.price = Some(json!("9999999999.995"));
        assert_eq!(field_names(normalize_on_create(&input).unwrap_err()), vec!["price"]);

        input.price = Some(json!(1e30));
        assert_eq!(field_names(normalize_on_create(&input).unwrap_err()), vec!["price"]);
    }

    #[test]
    fn tiny_prices_round_to_zero() {
        let mut input = widget();
        input.price = Some(json!("1e-30"));
        input.bulk_price = Some(json!(1e-30));
        let product = normalize_on_create(&input).unwrap();
        assert_eq!(product.price, Decimal::ZERO);
        assert_eq!(product.bulk_price, Decimal::ZERO);
    }

    #[test]
    fn fractional_bulk_qty_is_rejected() {
        let mut input = widget();
        input.bulk_qty = Some(json!(2.5));
        assert_eq!(field_names(normalize_on_create(&input).unwrap_err()), vec!["bulkQty"]);
    }

    #[test]
    fn name_and_description_lengths_are_bounded() {
        let mut input = widget();
        input.name = Some(json!("n".repeat(NAME_MAX_LEN + 1)));
        input.description = Some(json!("d".repeat(DESCRIPTION_MAX_LEN + 1)));
        assert_eq!(
            field_names(normalize_on_create(&input).unwrap_err()),
            vec!["name", "description"]
        );

        let mut input = widget();
        input.name = Some(json!("n".repeat(NAME_MAX_LEN)));
        input.description = Some(json!("d".repeat(DESCRIPTION_MAX_LEN)));
        assert!(normalize_on_create(&input).is_ok());
    }

    #[test]
    fn blank_name_and_mistyped_fields_are_rejected() {
        let mut input = widget();
        input.name = Some(json!("   "));
        input.category = Some(json!(5));
        input.in_stock = Some(json!("sometimes"));
        assert_eq!(
            field_names(normalize_on_create(&input).unwrap_err()),
            vec!["name", "category", "inStock"]
        );
    }

    #[test]
    fn id_must_be_a_positive_integer() {
        for bad in [json!(0), json!(-4), json!(1.5), json!("abc")] {
            let mut input = widget();
            input.id = Some(bad);
            assert_eq!(field_names(normalize_on_create(&input).unwrap_err()), vec!["id"]);
        }

        let mut input = widget();
        input.id = Some(json!("17"));
        assert_eq!(normalize_on_create(&input).unwrap().id.value(), 17);
    }

    #[test]
    fn update_rounds_price_and_keeps_other_fields() {
        let existing = normalize_on_create(&widget()).unwrap();
        let updated = normalize_on_update(&existing, &fields(json!({"price": 12.345}))).unwrap();

        assert_eq!(updated.price, dec("12.35"));
        assert_eq!(updated.bulk_price, existing.bulk_price);
        assert_eq!(updated.name, existing.name);
        assert_eq!(updated.images, existing.images);
        assert_eq!(updated.bulk_qty, existing.bulk_qty);
    }

    #[test]
    fn update_only_touches_supplied_fields() {
        let existing = normalize_on_create(&widget()).unwrap();
        let updated = normalize_on_update(&existing, &fields(json!({"inStock": false}))).unwrap();
        assert_eq!(
            updated,
            Product {
                in_stock: false,
                ..existing
            }
        );
    }

    #[test]
    fn update_recoerces_images_and_bulk_fields() {
        let existing = normalize_on_create(&widget()).unwrap();
        let updated = normalize_on_update(
            &existing,
            &fields(json!({"images": "https://x/b.png", "bulkPrice": "oops", "price": 3})),
        )
        .unwrap();
        assert_eq!(updated.images, vec!["https://x/b.png".to_string()]);
        assert_eq!(updated.bulk_price, dec("3"));
    }

    #[test]
    fn update_cannot_leave_record_invalid() {
        let existing = normalize_on_create(&widget()).unwrap();
        let err = normalize_on_update(&existing, &fields(json!({"images": [], "name": ""}))).unwrap_err();
        assert_eq!(field_names(err), vec!["name", "images"]);
    }

    #[test]
    fn update_rejects_id_change_but_allows_repeating_it() {
        let existing = normalize_on_create(&widget()).unwrap();
        assert!(normalize_on_update(&existing, &fields(json!({"id": 1, "name": "Renamed"}))).is_ok());

        let err = normalize_on_update(&existing, &fields(json!({"id": 2}))).unwrap_err();
        assert_eq!(err, DomainError::validation("id", "is immutable"));
    }

    #[test]
    fn empty_patch_is_identity() {
        let existing = normalize_on_create(&widget()).unwrap();
        assert_eq!(normalize_on_update(&existing, &ProductFields::default()).unwrap(), existing);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 200,
                ..ProptestConfig::default()
            })]

            #[test]
            fn price_is_rounded_to_cents(mantissa in 0i64..1_000_000_000, scale in 0u32..6) {
                let raw = Decimal::new(mantissa, scale);
                let mut input = widget();
                input.price = Some(json!(raw.to_string()));

                let product = normalize_on_create(&input).unwrap();
                prop_assert!(product.price.scale() <= 2);
                prop_assert!((product.price - raw).abs() <= Decimal::new(5, 3));
                prop_assert_eq!(round_price(product.price), product.price);
                prop_assert_eq!(product.bulk_price, product.price);
            }

            #[test]
            fn update_with_own_fields_is_identity(
                mantissa in 0i64..10_000_000,
                qty in 1u32..10_000,
                in_stock in any::<bool>(),
            ) {
                let mut input = widget();
                input.price = Some(json!(Decimal::new(mantissa, 2).to_string()));
                input.bulk_qty = Some(json!(qty));
                input.in_stock = Some(json!(in_stock));
                let product = normalize_on_create(&input).unwrap();

                let again = normalize_on_update(&product, &ProductFields::from(&product)).unwrap();
                prop_assert_eq!(again, product);
            }
        }
    }
}
