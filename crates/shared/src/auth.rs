//! Authentication types for JWT and tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Distinguishes short-lived access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Sent with every API request.
    Access,
    /// Exchanged for a new access token.
    Refresh,
}

/// JWT claims carried by both token kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Username at issue time.
    pub username: String,
    /// Whether the user was an administrator at issue time.
    pub is_admin: bool,
    /// Unique token id, the key for revocation.
    pub jti: Uuid,
    /// Access or refresh.
    pub token_type: TokenType,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user with a fresh `jti`.
    #[must_use]
    pub fn new(
        user_id: Uuid,
        username: &str,
        is_admin: bool,
        token_type: TokenType,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            username: username.to_string(),
            is_admin,
            jti: Uuid::new_v4(),
            token_type,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the expiry as a timestamp.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Token pair returned after successful authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token (short-lived).
    pub access_token: String,
    /// Refresh token (long-lived).
    pub refresh_token: String,
    /// Access token expiration in seconds.
    pub expires_in: i64,
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Registration request payload (admin only).
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// Unique username, at least 3 characters.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Plain-text password.
    pub password: String,
    /// Optional first name.
    pub first_name: Option<String>,
    /// Optional last name.
    pub last_name: Option<String>,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Grant administrator rights.
    #[serde(default)]
    pub is_admin: bool,
}

/// Login response payload.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Authenticated user info.
    pub user: UserInfo,
    /// Access token.
    pub access_token: String,
    /// Refresh token.
    pub refresh_token: String,
    /// Token expiration in seconds.
    pub expires_in: i64,
}

/// User info returned in auth responses. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    /// User ID.
    pub id: Uuid,
    /// Username.
    pub username: String,
    /// Email.
    pub email: String,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Phone.
    pub phone: Option<String>,
    /// Administrator flag.
    pub is_admin: bool,
    /// Active flag.
    pub is_active: bool,
    /// Last successful login.
    pub last_login: Option<DateTime<Utc>>,
}

/// Refresh token request.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    /// The refresh token.
    pub refresh_token: String,
}

/// Change password request.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    /// The password currently on record.
    pub current_password: String,
    /// The replacement password.
    pub new_password: String,
}

/// Profile update request. Absent fields are cleared.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateProfileRequest {
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
}

/// An administrator's changes to another account. Absent fields are kept;
/// `null` clears the optional profile fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    /// New username.
    pub username: Option<String>,
    /// New email address.
    pub email: Option<String>,
    /// New first name.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub first_name: Option<Option<String>>,
    /// New last name.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub last_name: Option<Option<String>>,
    /// New phone number.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub phone: Option<Option<String>>,
    /// Grant or revoke administrator rights.
    pub is_admin: Option<bool>,
    /// Enable or disable the account.
    pub is_active: Option<bool>,
    /// New plain-text password. Empty means unchanged.
    pub password: Option<String>,
}

/// Accounts visible to an administrator.
#[derive(Debug, Clone, Serialize)]
pub struct UsersResponse {
    /// Active users by username.
    pub users: Vec<UserInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_new_sets_fields() {
        let user_id = Uuid::new_v4();
        let expires_at = Utc::now() + Duration::hours(1);

        let claims = Claims::new(user_id, "admin", true, TokenType::Access, expires_at);

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.username, "admin");
        assert!(claims.is_admin);
        assert_eq!(claims.token_type, TokenType::Access);
        assert!(claims.iat <= Utc::now().timestamp());
        assert_eq!(claims.exp, expires_at.timestamp());
        assert_eq!(claims.expires_at().timestamp(), expires_at.timestamp());
    }

    #[test]
    fn test_claims_have_distinct_jti() {
        let user_id = Uuid::new_v4();
        let expires_at = Utc::now() + Duration::hours(1);

        let a = Claims::new(user_id, "u", false, TokenType::Access, expires_at);
        let b = Claims::new(user_id, "u", false, TokenType::Access, expires_at);

        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_token_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TokenType::Refresh).unwrap(),
            "\"refresh\""
        );
    }

    #[test]
    fn test_update_user_request_tells_null_from_absent() {
        let request: UpdateUserRequest =
            serde_json::from_str(r#"{"phone": null, "is_active": false}"#).unwrap();

        assert_eq!(request.phone, Some(None));
        assert_eq!(request.first_name, None);
        assert_eq!(request.is_active, Some(false));
        assert_eq!(request.username, None);
    }
}
