//! Checks run before a form is submitted to the backend.

use crate::constants::{MIN_PASSWORD_LEN, PASSWORD_SPECIAL_CHARS};
use crate::error::ValidationError;
use crate::types::RegisterProfile;

fn required(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

/// Length first, then character classes: at least one lowercase letter,
/// one uppercase letter, one digit and one of `@$!%*?&`.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }

    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c));

    if has_lower && has_upper && has_digit && has_special {
        Ok(())
    } else {
        Err(ValidationError::PasswordTooWeak)
    }
}

pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationError> {
    required(email, "email")?;
    required(password, "password")
}

/// Last name is optional; every other field is required.
pub fn validate_registration(profile: &RegisterProfile) -> Result<(), ValidationError> {
    required(&profile.first_name, "first_name")?;
    required(&profile.email, "email")?;
    required(&profile.password, "password")?;
    required(&profile.confirm_password, "confirm_password")?;

    if profile.password != profile.confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }

    validate_password(&profile.password)
}

pub fn validate_password_reset(
    token: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), ValidationError> {
    required(token, "token")?;
    required(password, "password")?;
    if password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    validate_password(password)
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    required(email, "email")
}
