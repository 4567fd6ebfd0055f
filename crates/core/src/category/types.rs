//! Category types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::transaction::TransactionKind;

/// Longest accepted category name.
pub const MAX_NAME_LEN: usize = 60;

/// A user's category label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    /// Category ID.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Display name.
    pub name: String,
    /// Which transactions the label applies to.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A proposed category.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    /// Display name.
    pub name: String,
    /// `income`, `expense`, `entrada` or `saida`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// A validated category ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    /// Owning user.
    pub user_id: Uuid,
    /// Trimmed display name.
    pub name: String,
    /// Transaction direction.
    pub kind: TransactionKind,
}

impl CategoryDraft {
    /// Key under which names must be unique for one user and kind.
    #[must_use]
    pub fn unique_key(&self) -> (Uuid, TransactionKind, String) {
        (self.user_id, self.kind, self.name.to_lowercase())
    }
}
