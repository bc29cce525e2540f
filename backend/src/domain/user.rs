//! User identity data model.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors returned by user value-type constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Identifier was zero or negative.
    #[error("user id must be a positive integer")]
    InvalidId,
    /// Email was empty after trimming.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Email did not contain an `@` separator.
    #[error("email must contain an '@'")]
    MalformedEmail,
    /// Email exceeded the stored column width.
    #[error("email must be at most {max} characters")]
    EmailTooLong { max: usize },
    /// Display name was empty after trimming.
    #[error("name must not be empty")]
    EmptyName,
}

/// Stable user identifier backed by the `users.id` bigserial column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Validate and construct a [`UserId`] from a raw database value.
    pub fn new(raw: i64) -> Result<Self, UserValidationError> {
        if raw <= 0 {
            return Err(UserValidationError::InvalidId);
        }
        Ok(Self(raw))
    }

    /// Access the raw integer value.
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated email address.
///
/// Validation is intentionally shallow (non-empty, contains `@`, fits the
/// column): the SMTP relay is the authority on deliverability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

const EMAIL_MAX_LEN: usize = 255;

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !trimmed.contains('@') {
            return Err(UserValidationError::MalformedEmail);
        }
        if trimmed.len() > EMAIL_MAX_LEN {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX_LEN });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the address as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Primary key.
    pub id: UserId,
    /// Unique login and notification address.
    pub email: EmailAddress,
    /// Display name used in reminder messages.
    pub name: String,
    /// Argon2 PHC-format password hash.
    pub password_hash: String,
}

/// Payload for creating a user; the id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Unique login and notification address.
    pub email: EmailAddress,
    /// Display name used in reminder messages.
    pub name: String,
    /// Argon2 PHC-format password hash.
    pub password_hash: String,
}

impl NewUser {
    /// Validate and construct a [`NewUser`].
    pub fn new(
        email: EmailAddress,
        name: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Result<Self, UserValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        Ok(Self {
            email,
            name,
            password_hash: password_hash.into(),
        })
    }
}
