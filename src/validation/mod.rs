//! Payload shape checks that run before any handler logic.
//!
//! Every validator is a pure function returning the validated value on success.
//! Checks within one validator run in a fixed order (email first) so the reported
//! rule is reproducible for a given input.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

pub const MIN_NAME_LENGTH: usize = 2;
pub const MIN_PASSWORD_LENGTH: usize = 6;

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

/// The rule a payload failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("A valid email address is required")]
    InvalidEmail,

    #[error("Name must be at least 2 characters")]
    NameTooShort,

    #[error("Password must be at least 6 characters")]
    PasswordTooShort,

    #[error("A valid user ID is required")]
    InvalidId,
}

impl ValidationError {
    /// Name of the offending input field
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::InvalidEmail => "email",
            ValidationError::NameTooShort => "name",
            ValidationError::PasswordTooShort => "password",
            ValidationError::InvalidId => "id",
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Raw `POST /users` body. Email and name of the wrong JSON type read as absent.
///
/// `password` keeps its raw value: absent or `null` means "use the default",
/// anything else must be a long enough string.
#[derive(Debug, Default, Deserialize)]
pub struct RegistrationBody {
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default)]
    pub password: Option<Value>,
}

/// Raw `POST /login` body.
#[derive(Debug, Default, Deserialize)]
pub struct LoginBody {
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub name: String,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

pub fn validate_registration(body: RegistrationBody) -> ValidationResult<Registration> {
    let email = check_email(body.email)?;

    let name = body
        .name
        .filter(|name| name.chars().count() >= MIN_NAME_LENGTH)
        .ok_or(ValidationError::NameTooShort)?;

    // Optional; when supplied it must meet the same rule as login
    let password = match body.password {
        None | Some(Value::Null) => None,
        Some(Value::String(password)) => Some(check_password(Some(password))?),
        Some(_) => return Err(ValidationError::PasswordTooShort),
    };

    Ok(Registration {
        email,
        name,
        password,
    })
}

pub fn validate_login(body: LoginBody) -> ValidationResult<LoginCredentials> {
    let email = check_email(body.email)?;
    let password = check_password(body.password)?;

    Ok(LoginCredentials { email, password })
}

/// Parse a path identifier into a positive integer.
pub fn validate_identifier(raw: &str) -> ValidationResult<i64> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::InvalidId),
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

fn check_email(email: Option<String>) -> ValidationResult<String> {
    email
        .filter(|email| is_valid_email(email))
        .ok_or(ValidationError::InvalidEmail)
}

fn check_password(password: Option<String>) -> ValidationResult<String> {
    password
        .filter(|password| password.chars().count() >= MIN_PASSWORD_LENGTH)
        .ok_or(ValidationError::PasswordTooShort)
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}
