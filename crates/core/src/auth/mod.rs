//! Authentication and password hashing.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - Password verification
//! - Registration rules for new users
//! - The authentication error type

mod password;

pub use password::{PasswordError, hash_password, verify_password};

use thiserror::Error;
use uuid::Uuid;

/// Minimum username length.
pub const MIN_USERNAME_LEN: usize = 3;
/// Minimum password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Errors raised by login, registration and token handling.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username or wrong password. Deliberately does not say which.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The account exists but has been deactivated.
    #[error("Account is disabled")]
    AccountDisabled,

    /// Token missing, malformed, expired or revoked.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// The user behind a token no longer exists.
    #[error("User not found")]
    UserNotFound,

    /// An administrator asked for a user that does not exist.
    #[error("User {0} not found")]
    NoSuchUser(Uuid),

    /// Registration field problems.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Username or email already registered.
    #[error("{0} already exists")]
    AlreadyExists(&'static str),

    /// Operation restricted to administrators.
    #[error("Admin access required")]
    AdminRequired,

    /// Hashing failed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl AuthError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidCredentials | Self::AccountDisabled | Self::InvalidToken(_) | Self::UserNotFound => 401,
            Self::Validation(_) => 400,
            Self::AdminRequired => 403,
            Self::NoSuchUser(_) => 404,
            Self::AlreadyExists(_) => 409,
            Self::Password(_) | Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountDisabled => "ACCOUNT_DISABLED",
            Self::InvalidToken(_) => "INVALID_TOKEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::NoSuchUser(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::AdminRequired => "FORBIDDEN",
            Self::Password(_) => "PASSWORD_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

/// Checks a registration before uniqueness is looked up in storage.
#[must_use]
pub fn validate_registration(username: &str, email: &str, password: &str) -> Vec<String> {
    let mut errors = Vec::new();
    check_username(&mut errors, username);
    check_email(&mut errors, email);
    errors.extend(validate_password(password));
    errors
}

/// Checks the fields an administrator is changing on an existing user.
/// `None` means the field is left as it is.
#[must_use]
pub fn validate_user_update(
    username: Option<&str>,
    email: Option<&str>,
    password: Option<&str>,
) -> Vec<String> {
    let mut errors = Vec::new();
    if let Some(username) = username {
        check_username(&mut errors, username);
    }
    if let Some(email) = email {
        check_email(&mut errors, email);
    }
    if let Some(password) = password {
        errors.extend(validate_password(password));
    }
    errors
}

fn check_username(errors: &mut Vec<String>, username: &str) {
    let username = username.trim();
    if username.is_empty() {
        errors.push("Username is required".to_string());
    } else if username.chars().count() < MIN_USERNAME_LEN {
        errors.push("Username must be at least 3 characters".to_string());
    }
}

fn check_email(errors: &mut Vec<String>, email: &str) {
    let email = email.trim();
    if email.is_empty() {
        errors.push("Email is required".to_string());
    } else if !email.contains('@') {
        errors.push("Invalid email format".to_string());
    }
}

/// Checks a new password.
#[must_use]
pub fn validate_password(password: &str) -> Vec<String> {
    if password.is_empty() {
        vec!["Password is required".to_string()]
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        vec!["Password must be at least 6 characters".to_string()]
    } else {
        Vec::new()
    }
}
