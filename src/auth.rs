/**
 * Auth Gate
 * Admin credential check against the stored profile and shared secret, and
 * the email-only reader gate. No tokens, no expiry: a session is a value.
 */
use regex::Regex;
use thiserror::Error;

use crate::store::models::User;

/// The secret a password reset reverts to.
pub const DEFAULT_ADMIN_PASSWORD: &str = "password123";

pub const MIN_PASSWORD_LEN: usize = 8;

lazy_static::lazy_static! {
    /// Something@something.tld, no whitespace
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Incorrect Profile ID or password.")]
    InvalidCredentials,
    #[error("The provided Profile ID or Notification Email is incorrect.")]
    ResetMismatch,
    #[error("Current password is incorrect.")]
    WrongCurrentPassword,
    #[error("New passwords do not match.")]
    PasswordMismatch,
    #[error("Password must be at least 8 characters long.")]
    PasswordTooShort,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Admin login required")]
    AdminRequired,
    #[error("Please sign in to continue")]
    LoginRequired,
}

/// Default admin profile, overridable from the environment.
pub fn default_admin_profile() -> User {
    let var = |name: &str, fallback: &str| {
        std::env::var(name).unwrap_or_else(|_| fallback.to_string())
    };
    User {
        id: var("ADMIN_ID", "author_admin"),
        email: var("ADMIN_EMAIL", "author@example.com"),
        notification_email: var("ADMIN_NOTIFICATION_EMAIL", "notifications@example.com"),
        username: var("ADMIN_USERNAME", "The Author"),
        avatar: var("ADMIN_AVATAR", "https://i.pravatar.cc/150?u=author-admin"),
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Lightweight identity for a gated reader, used to attribute comments.
pub fn reader_user(email: &str) -> User {
    let email = email.trim();
    let username = email.split('@').next().unwrap_or(email).to_string();
    User {
        id: format!("reader:{}", email),
        email: email.to_string(),
        notification_email: email.to_string(),
        username,
        avatar: format!("https://i.pravatar.cc/150?u={}", email),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    Admin(User),
    Reader(User),
}

impl Session {
    pub fn user(&self) -> Option<&User> {
        match self {
            Session::Anonymous => None,
            Session::Admin(user) | Session::Reader(user) => Some(user),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Session::Admin(_))
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Session::Anonymous)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Session::Anonymous => "anonymous",
            Session::Admin(_) => "admin",
            Session::Reader(_) => "reader",
        }
    }
}

/// Login succeeds only when both the id and the secret match.
pub fn check_login(
    profile: &User,
    secret: &str,
    profile_id: &str,
    password: &str,
) -> Result<(), AuthError> {
    if profile_id == profile.id && password == secret {
        Ok(())
    } else {
        Err(AuthError::InvalidCredentials)
    }
}

/// Self-service reset: id and notification email must both match.
pub fn check_reset(
    profile: &User,
    profile_id: &str,
    notification_email: &str,
) -> Result<(), AuthError> {
    if profile_id == profile.id && notification_email == profile.notification_email {
        Ok(())
    } else {
        Err(AuthError::ResetMismatch)
    }
}

pub fn check_password_change(
    secret: &str,
    current: &str,
    new: &str,
    confirm: &str,
) -> Result<(), AuthError> {
    if new != confirm {
        return Err(AuthError::PasswordMismatch);
    }
    if new.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::PasswordTooShort);
    }
    if current != secret {
        return Err(AuthError::WrongCurrentPassword);
    }
    Ok(())
}

pub fn check_reader_email(email: &str) -> Result<User, AuthError> {
    let email = email.trim();
    if is_valid_email(email) {
        Ok(reader_user(email))
    } else {
        Err(AuthError::InvalidEmail)
    }
}
