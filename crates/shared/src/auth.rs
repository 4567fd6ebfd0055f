//! Authentication types for tokens issued by the auth provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims carried by access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// User email, when the provider includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Audience.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// Provider role (e.g. `authenticated`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(
        user_id: Uuid,
        email: Option<&str>,
        audience: &str,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            email: email.map(str::to_string),
            aud: Some(audience.to_string()),
            role: Some("authenticated".to_string()),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }
}

/// The authenticated caller of a workflow.
///
/// Built from verified token claims and passed explicitly into every workflow;
/// the owning user of anything written is always taken from here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Authenticated user ID.
    pub user_id: Uuid,
    /// Email from the token, if any.
    pub email: Option<String>,
    /// When the underlying session stops being valid.
    pub expires_at: DateTime<Utc>,
}

impl Identity {
    /// Creates an identity.
    #[must_use]
    pub const fn new(user_id: Uuid, email: Option<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            email,
            expires_at,
        }
    }

    /// Returns true if the session is still valid at `now`.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.user_id.is_nil() && self.expires_at > now
    }
}

impl From<&Claims> for Identity {
    fn from(claims: &Claims) -> Self {
        let expires_at =
            DateTime::from_timestamp(claims.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self {
            user_id: claims.sub,
            email: claims.email.clone(),
            expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_new_sets_correct_fields() {
        let user_id = Uuid::new_v4();
        let expires_at = Utc::now() + Duration::hours(1);

        let claims = Claims::new(user_id, Some("ana@example.com"), "authenticated", expires_at);

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.email.as_deref(), Some("ana@example.com"));
        assert_eq!(claims.aud.as_deref(), Some("authenticated"));
        assert!(claims.iat <= Utc::now().timestamp());
        assert_eq!(claims.exp, expires_at.timestamp());
    }

    #[test]
    fn test_identity_from_claims() {
        let user_id = Uuid::new_v4();
        let expires_at = Utc::now() + Duration::hours(1);
        let claims = Claims::new(user_id, None, "authenticated", expires_at);

        let identity = Identity::from(&claims);

        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.email, None);
        assert_eq!(identity.expires_at.timestamp(), expires_at.timestamp());
    }

    #[test]
    fn test_identity_activity_window() {
        let now = Utc::now();
        let identity = Identity::new(Uuid::new_v4(), None, now + Duration::minutes(5));

        assert!(identity.is_active_at(now));
        assert!(!identity.is_active_at(now + Duration::minutes(5)));
        assert!(!identity.is_active_at(now + Duration::hours(1)));
    }

    #[test]
    fn test_nil_user_is_never_active() {
        let now = Utc::now();
        let identity = Identity::new(Uuid::nil(), None, now + Duration::hours(1));

        assert!(!identity.is_active_at(now));
    }
}
