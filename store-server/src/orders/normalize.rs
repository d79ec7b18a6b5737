//! Line-item normalization
//!
//! Carts reach the server from several storefront generations, so item
//! payloads carry legacy key aliases (`id`/`_id` for the product id,
//! `qty` for the quantity, `price` for the unit price, `img` for the image).
//! All coercion happens here, in one step, so the lenient-ingestion policy
//! stays auditable and can be tightened without touching pricing:
//!
//! - missing unit price defaults to `0`, missing quantity to `1`;
//! - present-but-invalid values (negative price, non-positive or fractional
//!   quantity, over-cap price/quantity, non-object entries) are rejected.

use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use crate::orders::model::LineItem;
use crate::utils::money::{self, MAX_QUANTITY, MAX_UNIT_PRICE_CENTS};
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN};
use crate::utils::{AppError, AppResult};

/// Normalize a raw item array into canonical line items.
///
/// Fails with a validation error when the list is empty or any entry is
/// malformed beyond what the defaulting policy covers.
pub fn normalize_items(raw: &[Value]) -> AppResult<Vec<LineItem>> {
    if raw.is_empty() {
        return Err(AppError::validation("Order items are required"));
    }

    raw.iter()
        .enumerate()
        .map(|(idx, value)| normalize_item(idx, value))
        .collect()
}

fn normalize_item(idx: usize, value: &Value) -> AppResult<LineItem> {
    let obj = value
        .as_object()
        .ok_or_else(|| AppError::validation(format!("items[{idx}] must be an object")))?;

    let product_id = first_of(obj, &["productId", "id", "_id"])
        .map(id_string)
        .unwrap_or_default();

    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();
    if name.len() > MAX_NAME_LEN {
        return Err(AppError::validation(format!(
            "items[{idx}].name is too long (max {MAX_NAME_LEN})"
        )));
    }

    let unit_price = match first_of(obj, &["unitPrice", "price"]) {
        None | Some(Value::Null) => 0,
        Some(value) => {
            let cents = parse_amount(value).ok_or_else(|| {
                AppError::validation(format!("items[{idx}].price is not a valid amount"))
            })?;
            if cents < 0 {
                return Err(AppError::validation(format!(
                    "items[{idx}].price must be non-negative"
                )));
            }
            if cents > MAX_UNIT_PRICE_CENTS {
                return Err(AppError::validation(format!(
                    "items[{idx}].price exceeds the maximum allowed"
                )));
            }
            cents
        }
    };

    let quantity = match first_of(obj, &["quantity", "qty"]) {
        None | Some(Value::Null) => 1,
        Some(value) => {
            let qty = parse_quantity(value).ok_or_else(|| {
                AppError::validation(format!("items[{idx}].quantity must be an integer"))
            })?;
            if qty <= 0 {
                return Err(AppError::validation(format!(
                    "items[{idx}].quantity must be positive"
                )));
            }
            if qty > MAX_QUANTITY {
                return Err(AppError::validation(format!(
                    "items[{idx}].quantity exceeds the maximum allowed ({MAX_QUANTITY})"
                )));
            }
            qty
        }
    };

    let description = optional_text(obj, "description", MAX_NOTE_LEN, idx)?;
    let image = match first_of(obj, &["image", "img"]) {
        Some(Value::String(s)) if !s.is_empty() => {
            if s.len() > MAX_URL_LEN {
                return Err(AppError::validation(format!(
                    "items[{idx}].image is too long (max {MAX_URL_LEN})"
                )));
            }
            Some(s.clone())
        }
        _ => None,
    };

    Ok(LineItem {
        product_id,
        name,
        unit_price,
        quantity,
        description,
        image,
    })
}

/// First present value among the given key aliases
fn first_of<'a>(
    obj: &'a serde_json::Map<String, Value>,
    keys: &[&str],
) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k))
}

/// Product ids arrive as strings or numbers depending on the cart generation
fn id_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Parse a currency amount from a JSON number or numeric string into cents
fn parse_amount(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_f64().and_then(money::f64_to_cents),
        Value::String(s) => Decimal::from_str(s.trim())
            .ok()
            .and_then(money::decimal_to_cents),
        _ => None,
    }
}

/// Parse an integral quantity from a JSON number or numeric string
fn parse_quantity(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i)
            } else {
                // Fractional quantities are malformed, not defaultable
                let f = n.as_f64()?;
                (f.fract() == 0.0).then_some(f as i64)
            }
        }
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn optional_text(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    max_len: usize,
    idx: usize,
) -> AppResult<Option<String>> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.is_empty() => {
            if s.len() > max_len {
                return Err(AppError::validation(format!(
                    "items[{idx}].{key} is too long (max {max_len})"
                )));
            }
            Ok(Some(s.clone()))
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_item() {
        let items = normalize_items(&[json!({
            "productId": "watch-1",
            "name": "Chronograph",
            "unitPrice": 199.99,
            "quantity": 2,
            "description": "steel band",
            "image": "/img/watch-1.webp",
        })])
        .unwrap();

        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.product_id, "watch-1");
        assert_eq!(item.unit_price, 19_999);
        assert_eq!(item.quantity, 2);
        assert_eq!(item.description.as_deref(), Some("steel band"));
    }

    #[test]
    fn test_legacy_aliases() {
        let items = normalize_items(&[json!({
            "_id": 42,
            "name": "Diver",
            "price": "89.50",
            "qty": "3",
            "img": "/img/diver.webp",
        })])
        .unwrap();

        let item = &items[0];
        assert_eq!(item.product_id, "42");
        assert_eq!(item.unit_price, 8_950);
        assert_eq!(item.quantity, 3);
        assert_eq!(item.image.as_deref(), Some("/img/diver.webp"));
    }

    #[test]
    fn test_alias_priority() {
        // Canonical key wins over legacy aliases when both are present
        let items = normalize_items(&[json!({
            "productId": "canonical",
            "id": "legacy",
            "name": "x",
            "price": 1.0,
        })])
        .unwrap();
        assert_eq!(items[0].product_id, "canonical");
    }

    #[test]
    fn test_missing_numeric_fields_default() {
        let items = normalize_items(&[json!({ "name": "Mystery" })]).unwrap();
        assert_eq!(items[0].unit_price, 0);
        assert_eq!(items[0].quantity, 1);
        assert_eq!(items[0].product_id, "");
    }

    #[test]
    fn test_rejects_negative_price() {
        let err = normalize_items(&[json!({ "name": "x", "price": -1.0 })]).unwrap_err();
        assert!(err.to_string().contains("non-negative"));
    }

    #[test]
    fn test_rejects_bad_quantities() {
        assert!(normalize_items(&[json!({ "name": "x", "qty": 0 })]).is_err());
        assert!(normalize_items(&[json!({ "name": "x", "qty": -2 })]).is_err());
        assert!(normalize_items(&[json!({ "name": "x", "qty": 1.5 })]).is_err());
        assert!(normalize_items(&[json!({ "name": "x", "qty": 10_000 })]).is_err());
    }

    #[test]
    fn test_rejects_empty_and_non_object() {
        assert!(normalize_items(&[]).is_err());
        assert!(normalize_items(&[json!("not an item")]).is_err());
    }

    #[test]
    fn test_sub_cent_price_rounds_once() {
        let items = normalize_items(&[json!({ "name": "x", "price": 10.995 })]).unwrap();
        assert_eq!(items[0].unit_price, 1_100);
    }
}
