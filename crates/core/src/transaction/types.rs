//! Transaction domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a transaction.
///
/// The API speaks `income`/`expense`; the store persists `entrada`/`saida`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money in (`entrada`).
    Income,
    /// Money out (`saida`).
    Expense,
}

impl TransactionKind {
    /// Returns the API name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Returns the persisted name.
    #[must_use]
    pub const fn as_stored(self) -> &'static str {
        match self {
            Self::Income => "entrada",
            Self::Expense => "saida",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    /// Accepts both the API and the persisted names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "entrada" => Ok(Self::Income),
            "expense" | "saida" | "saída" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {s}")),
        }
    }
}

/// A persisted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    /// Server-assigned ID.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Calendar date of the transaction.
    pub date: NaiveDate,
    /// Non-negative magnitude.
    pub value: Decimal,
    /// Category label.
    pub category: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Income or expense.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Server-assigned creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A monetary value as clients send it: a JSON number or a decimal string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    /// JSON number, kept in its textual form to avoid float rounding.
    Number(serde_json::Number),
    /// Decimal string such as `"150.00"` or `"150,00"`.
    Text(String),
}

impl From<&str> for AmountInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A proposed transaction, as received from the presentation layer.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTransaction {
    /// Date in `YYYY-MM-DD`, RFC 3339 or `DD/MM/YYYY` form.
    pub date: String,
    /// Monetary value.
    pub value: AmountInput,
    /// Category label.
    pub category: String,
    /// `income`, `expense`, `entrada` or `saida`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Optional free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Owner claimed by the client. Never used: the owner comes from the identity.
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

/// A validated transaction ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    /// Owning user, taken from the authenticated identity.
    pub user_id: Uuid,
    /// Normalized calendar date.
    pub date: NaiveDate,
    /// Non-negative magnitude.
    pub value: Decimal,
    /// Trimmed category label.
    pub category: String,
    /// Trimmed description, `None` when blank.
    pub description: Option<String>,
    /// Income or expense.
    pub kind: TransactionKind,
}

/// Filter for listing a user's transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Calendar month, requires `year`.
    pub month: Option<u32>,
    /// Calendar year.
    pub year: Option<i32>,
    /// Only this direction.
    pub kind: Option<TransactionKind>,
}

impl TransactionFilter {
    /// Half-open date range `[start, end)` selected by `month`/`year`.
    ///
    /// Returns `None` when no date filter applies or the combination is invalid;
    /// call [`crate::transaction::validation::validate_filter`] first.
    #[must_use]
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let year = self.year?;
        match self.month {
            Some(month) => {
                let start = NaiveDate::from_ymd_opt(year, month, 1)?;
                let end = if month == 12 {
                    NaiveDate::from_ymd_opt(year + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(year, month + 1, 1)?
                };
                Some((start, end))
            }
            None => Some((
                NaiveDate::from_ymd_opt(year, 1, 1)?,
                NaiveDate::from_ymd_opt(year + 1, 1, 1)?,
            )),
        }
    }

    /// Returns true if `transaction` passes the filter.
    #[must_use]
    pub fn matches(&self, transaction: &Transaction) -> bool {
        let in_range = self
            .date_range()
            .is_none_or(|(start, end)| transaction.date >= start && transaction.date < end);
        let kind_ok = self.kind.is_none_or(|kind| kind == transaction.kind);
        in_range && kind_ok
    }
}
