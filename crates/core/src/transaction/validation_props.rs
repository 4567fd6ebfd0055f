//! Property-based tests for transaction input normalization.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::types::AmountInput;
use super::validation::{normalize_date, parse_value};

/// Any valid calendar date between 1970 and 2100.
fn calendar_date() -> impl Strategy<Value = NaiveDate> {
    (1970i32..2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every accepted spelling of a date normalizes to the same calendar date.
    #[test]
    fn prop_date_spellings_agree(
        date in calendar_date(),
        hour in 0u32..24,
        offset in -12i32..=14,
    ) {
        let iso = date.format("%Y-%m-%d").to_string();
        let br = date.format("%d/%m/%Y").to_string();
        let sign = if offset < 0 { '-' } else { '+' };
        let rfc3339 = format!("{iso}T{hour:02}:15:00{sign}{:02}:00", offset.abs());

        prop_assert_eq!(normalize_date(&iso).unwrap(), date);
        prop_assert_eq!(normalize_date(&br).unwrap(), date);
        prop_assert_eq!(normalize_date(&rfc3339).unwrap(), date);
    }

    /// Non-negative amounts in cents parse to the same decimal, as text or number.
    #[test]
    fn prop_non_negative_amounts_round_trip(cents in 0i64..10_000_000_000) {
        let expected = Decimal::new(cents, 2);

        let text = AmountInput::Text(expected.to_string());
        prop_assert_eq!(parse_value(&text).unwrap(), expected);

        let comma = AmountInput::Text(expected.to_string().replace('.', ","));
        prop_assert_eq!(parse_value(&comma).unwrap(), expected);
    }

    /// Negative amounts are always rejected.
    #[test]
    fn prop_negative_amounts_rejected(cents in 1i64..10_000_000_000) {
        let text = AmountInput::Text(Decimal::new(-cents, 2).to_string());
        prop_assert!(parse_value(&text).is_err());

        let number = AmountInput::Number(serde_json::Number::from(-cents));
        prop_assert!(parse_value(&number).is_err());
    }
}
