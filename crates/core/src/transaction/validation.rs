//! Input normalization for proposed transactions.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::TransactionError;
use super::types::{AmountInput, NewTransaction, TransactionDraft, TransactionFilter, TransactionKind};

/// Longest accepted category label.
pub const MAX_CATEGORY_LEN: usize = 100;

/// Longest accepted description.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Normalizes a date to a calendar date.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps, `YYYY-MM-DDTHH:MM:SS` without an
/// offset, and `DD/MM/YYYY`. Timestamps keep the calendar date as written; no
/// timezone conversion is applied.
pub fn normalize_date(input: &str) -> Result<NaiveDate, TransactionError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(TransactionError::Validation("date is required".to_string()));
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(input) {
        return Ok(timestamp.date_naive());
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(timestamp.date());
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%d/%m/%Y") {
        return Ok(date);
    }

    Err(TransactionError::Validation(format!("invalid date: {input}")))
}

/// Parses a monetary value into a non-negative decimal.
///
/// Strings may use a comma as decimal separator (`"1.234,56"`). When a comma is
/// present, dots may only group the integer part in threes. Mixed orders such
/// as `"1,234.56"` and a lone comma before exactly three digits (`"1,000"`) are
/// ambiguous and rejected.
pub fn parse_value(input: &AmountInput) -> Result<Decimal, TransactionError> {
    let text = match input {
        AmountInput::Number(number) => number.to_string(),
        AmountInput::Text(text) => {
            let text = text.trim();
            if text.contains(',') {
                comma_decimal(text)?
            } else {
                text.to_string()
            }
        }
    };

    if text.is_empty() {
        return Err(TransactionError::Validation("value is required".to_string()));
    }

    let value = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| TransactionError::Validation(format!("invalid value: {text}")))?;

    if value.is_sign_negative() && !value.is_zero() {
        return Err(TransactionError::Validation(
            "value must not be negative".to_string(),
        ));
    }

    Ok(value.abs())
}

/// Rewrites a comma-decimal amount (`"1.234,56"`) into `"1234.56"`.
fn comma_decimal(text: &str) -> Result<String, TransactionError> {
    let invalid = || TransactionError::Validation(format!("invalid value: {text}"));

    let (integer, fraction) = text.split_once(',').ok_or_else(invalid)?;
    if fraction.is_empty() || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let (sign, integer) = match integer.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", integer),
    };
    let groups: Vec<&str> = integer.split('.').collect();
    if groups.len() == 1 && fraction.len() == 3 {
        return Err(invalid());
    }
    let well_grouped = groups.iter().enumerate().all(|(i, group)| {
        let digits = group.chars().all(|c| c.is_ascii_digit());
        let width = if i == 0 {
            !group.is_empty() && (groups.len() == 1 || group.len() <= 3)
        } else {
            group.len() == 3
        };
        digits && width
    });
    if !well_grouped {
        return Err(invalid());
    }

    Ok(format!("{sign}{}.{fraction}", groups.concat()))
}

/// Parses a transaction type.
pub fn parse_kind(input: &str) -> Result<TransactionKind, TransactionError> {
    TransactionKind::from_str(input).map_err(TransactionError::Validation)
}

/// Validates a proposed transaction and stamps `owner` on it.
///
/// Any owner claimed by the input is discarded.
pub fn validate(owner: Uuid, input: &NewTransaction) -> Result<TransactionDraft, TransactionError> {
    let date = normalize_date(&input.date)?;
    let value = parse_value(&input.value)?;
    let kind = parse_kind(&input.kind)?;

    let category = input.category.trim();
    if category.is_empty() {
        return Err(TransactionError::Validation(
            "category is required".to_string(),
        ));
    }
    if category.chars().count() > MAX_CATEGORY_LEN {
        return Err(TransactionError::Validation(format!(
            "category must be at most {MAX_CATEGORY_LEN} characters"
        )));
    }

    let description = input
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);
    if description
        .as_ref()
        .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LEN)
    {
        return Err(TransactionError::Validation(format!(
            "description must be at most {MAX_DESCRIPTION_LEN} characters"
        )));
    }

    Ok(TransactionDraft {
        user_id: owner,
        date,
        value,
        category: category.to_string(),
        description,
        kind,
    })
}

/// Rejects filters that name an impossible month or a month without a year.
pub fn validate_filter(filter: &TransactionFilter) -> Result<(), TransactionError> {
    match (filter.month, filter.year) {
        (Some(month), _) if !(1..=12).contains(&month) => Err(TransactionError::Validation(
            format!("month must be between 1 and 12, got {month}"),
        )),
        (Some(_), None) => Err(TransactionError::Validation(
            "month filter requires a year".to_string(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn input(date: &str, value: &str, category: &str, kind: &str) -> NewTransaction {
        NewTransaction {
            date: date.to_string(),
            value: AmountInput::from(value),
            category: category.to_string(),
            kind: kind.to_string(),
            description: None,
            user_id: None,
        }
    }

    #[rstest]
    #[case("2024-03-15")]
    #[case("2024-03-15T23:30:00Z")]
    #[case("2024-03-15T23:30:00-03:00")]
    #[case("2024-03-15T00:10:00+09:00")]
    #[case("2024-03-15T08:00:00")]
    #[case("15/03/2024")]
    #[case(" 2024-03-15 ")]
    fn test_normalize_date_keeps_calendar_date(#[case] raw: &str) {
        assert_eq!(
            normalize_date(raw).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
    }

    #[rstest]
    #[case("")]
    #[case("2024-13-01")]
    #[case("2024-02-30")]
    #[case("yesterday")]
    #[case("31/02/2024")]
    fn test_normalize_date_rejects(#[case] raw: &str) {
        assert!(matches!(
            normalize_date(raw),
            Err(TransactionError::Validation(_))
        ));
    }

    #[rstest]
    #[case(AmountInput::from("150.00"), dec!(150.00))]
    #[case(AmountInput::from("150,00"), dec!(150.00))]
    #[case(AmountInput::from("1.234,56"), dec!(1234.56))]
    #[case(AmountInput::from("1.234.567,89"), dec!(1234567.89))]
    #[case(AmountInput::from("1234,5"), dec!(1234.5))]
    #[case(AmountInput::from("0"), dec!(0))]
    #[case(AmountInput::Number(serde_json::Number::from(42)), dec!(42))]
    #[case(AmountInput::Number(serde_json::Number::from_f64(19.9).unwrap()), dec!(19.9))]
    fn test_parse_value(#[case] raw: AmountInput, #[case] expected: Decimal) {
        assert_eq!(parse_value(&raw).unwrap(), expected);
    }

    #[rstest]
    #[case(AmountInput::from("-1"))]
    #[case(AmountInput::from("abc"))]
    #[case(AmountInput::from("  "))]
    #[case(AmountInput::from("1,234.56"))]
    #[case(AmountInput::from("1,000"))]
    #[case(AmountInput::from("12.34,5"))]
    #[case(AmountInput::from("1,2,3"))]
    #[case(AmountInput::from("10,"))]
    #[case(AmountInput::from("-1.234,56"))]
    #[case(AmountInput::Number(serde_json::Number::from(-5)))]
    fn test_parse_value_rejects(#[case] raw: AmountInput) {
        assert!(matches!(
            parse_value(&raw),
            Err(TransactionError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_stamps_owner_and_ignores_claimed_owner() {
        let owner = Uuid::new_v4();
        let mut proposed = input("2024-03-15", "150.00", " Vendas ", "income");
        proposed.user_id = Some(Uuid::new_v4());
        proposed.description = Some("   ".to_string());

        let draft = validate(owner, &proposed).unwrap();

        assert_eq!(draft.user_id, owner);
        assert_eq!(draft.category, "Vendas");
        assert_eq!(draft.description, None);
        assert_eq!(draft.kind, TransactionKind::Income);
        assert_eq!(draft.value, dec!(150.00));
    }

    #[rstest]
    #[case(input("2024-03-15", "10", "", "income"))]
    #[case(input("2024-03-15", "10", "Vendas", "transfer"))]
    #[case(input("2024-03-15", "10", &"x".repeat(MAX_CATEGORY_LEN + 1), "expense"))]
    fn test_validate_rejects(#[case] proposed: NewTransaction) {
        assert!(matches!(
            validate(Uuid::new_v4(), &proposed),
            Err(TransactionError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_filter() {
        assert!(validate_filter(&TransactionFilter::default()).is_ok());
        assert!(
            validate_filter(&TransactionFilter {
                month: Some(3),
                year: Some(2024),
                kind: None
            })
            .is_ok()
        );
        assert!(
            validate_filter(&TransactionFilter {
                month: Some(13),
                year: Some(2024),
                kind: None
            })
            .is_err()
        );
        assert!(
            validate_filter(&TransactionFilter {
                month: Some(3),
                year: None,
                kind: None
            })
            .is_err()
        );
    }
}
