//! Money conversion utilities
//!
//! All monetary amounts are held and computed as integer minor currency units
//! (cents, `i64`). `rust_decimal` is used only at the boundary: parsing
//! decimal amounts out of client JSON and rendering 2-decimal-place amounts
//! back into responses. This keeps arithmetic drift-free regardless of how
//! many line items accumulate.

use rust_decimal::prelude::*;

/// Rounding for boundary conversions (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed unit price (1,000,000.00 in cents)
pub const MAX_UNIT_PRICE_CENTS: i64 = 100_000_000;
/// Maximum allowed quantity per line item
pub const MAX_QUANTITY: i64 = 9_999;

/// Convert a decimal currency amount to cents, rounding half-up to 2dp.
///
/// Returns `None` for values outside the `i64` cent range.
pub fn decimal_to_cents(value: Decimal) -> Option<i64> {
    let cents = (value * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    cents.to_i64()
}

/// Convert an `f64` currency amount (client JSON number) to cents.
///
/// Non-finite input yields `None`; callers decide whether that is a
/// default-to-zero case or a validation error.
pub fn f64_to_cents(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value).and_then(decimal_to_cents)
}

/// Convert cents back to an `f64` currency amount for serialization.
pub fn cents_to_f64(cents: i64) -> f64 {
    // SAFETY: any i64 cent amount divided by 100 is representable as f64
    // within 2dp display precision
    Decimal::new(cents, DECIMAL_PLACES)
        .to_f64()
        .expect("cent amount is always representable as f64")
}

/// Serde adapter: `i64` cents on the inside, 2dp decimal number on the wire.
///
/// Usage: `#[serde(with = "crate::utils::money::cents")]`
pub mod cents {
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(cents: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(cents_to_f64(*cents))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let value = f64::deserialize(deserializer)?;
        f64_to_cents(value)
            .ok_or_else(|| serde::de::Error::custom(format!("amount out of range: {value}")))
    }
}
