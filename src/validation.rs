//! Credential validators for the login and signup forms.
//!
//! All functions here are pure: no I/O, no errors, no panics. Form validators
//! evaluate every field and report at most one message per field, the first
//! rule that field fails.

#[cfg(test)]
#[path = "validation_test.rs"]
mod validation_test;

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const STRONG_PASSWORD_LEN: usize = 8;
pub const MIN_FULL_NAME_LEN: usize = 3;
pub const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*";

pub const EMAIL_REQUIRED: &str = "Email is required";
pub const EMAIL_INVALID: &str = "Invalid email";
pub const PASSWORD_REQUIRED: &str = "Password is required";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";
pub const PASSWORD_NEEDS_UPPERCASE: &str = "Add an uppercase letter";
pub const PASSWORD_NEEDS_DIGIT: &str = "Add a number";
pub const PASSWORD_NEEDS_SPECIAL: &str = "Add a special character (!@#$%^&*)";
pub const NAME_REQUIRED: &str = "Name is required";
pub const NAME_TOO_SHORT: &str = "Name must be at least 3 characters";
pub const CONFIRM_REQUIRED: &str = "Password confirmation is required";
pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match";

/// Characters that may not appear in any part of an address: `@` and the
/// ECMAScript whitespace set. That set differs from Unicode `White_Space`,
/// which `\s` matches: it adds U+FEFF and leaves out U+0085.
const EMAIL_EXCLUDED: &str = r"@\t\n\x0B\x0C\r \x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}";

// Validators never panic, so a pattern that fails to compile rejects every
// email instead. `email_pattern_compiles` keeps that branch dead.
static EMAIL_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    let part = format!("[^{EMAIL_EXCLUDED}]+");
    Regex::new(&format!(r"^{part}@{part}\.{part}$")).ok()
});

// =============================================================================
// FIELD CHECKS
// =============================================================================

/// `local@domain.tld` shape check. No DNS lookup, no IDN handling.
#[must_use]
pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(email))
}

/// Coarse length-based classification, reported next to validity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

impl PasswordStrength {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Weak => "weak",
            Self::Medium => "medium",
            Self::Strong => "strong",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordReport {
    pub is_valid: bool,
    pub strength: PasswordStrength,
    /// Unmet rules, in check order: length, uppercase, digit, special.
    pub feedback: Vec<&'static str>,
}

/// Check a password against the signup rules.
///
/// `strength` only looks at length, so a long password that misses a
/// character class reports `Strong` while `is_valid` is false.
#[must_use]
pub fn validate_password(password: &str) -> PasswordReport {
    let len = password.chars().count();
    let mut feedback = Vec::new();

    let strength = if len < MIN_PASSWORD_LEN {
        feedback.push(PASSWORD_TOO_SHORT);
        PasswordStrength::Weak
    } else if len < STRONG_PASSWORD_LEN {
        PasswordStrength::Medium
    } else {
        PasswordStrength::Strong
    };

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        feedback.push(PASSWORD_NEEDS_UPPERCASE);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        feedback.push(PASSWORD_NEEDS_DIGIT);
    }
    if !password.chars().any(is_special) {
        feedback.push(PASSWORD_NEEDS_SPECIAL);
    }

    PasswordReport { is_valid: feedback.is_empty(), strength, feedback }
}

/// Meter value in `[0, 1]`: one point each for length >= 6, length >= 8,
/// mixed case, a digit and a special character.
#[must_use]
pub fn password_score(password: &str) -> f32 {
    let len = password.chars().count();
    let checks = [
        len >= MIN_PASSWORD_LEN,
        len >= STRONG_PASSWORD_LEN,
        password.chars().any(|c| c.is_ascii_lowercase()) && password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(is_special),
    ];
    let points = checks.iter().filter(|passed| **passed).count();
    #[allow(clippy::cast_precision_loss)]
    let score = points as f32 / checks.len() as f32;
    score.min(1.0)
}

fn is_special(c: char) -> bool {
    PASSWORD_SPECIAL_CHARS.contains(c)
}

#[must_use]
pub fn validate_full_name(name: &str) -> bool {
    name.trim().chars().count() >= MIN_FULL_NAME_LEN
}

#[must_use]
pub fn validate_password_match(password: &str, confirm: &str) -> bool {
    !password.is_empty() && password == confirm
}

// =============================================================================
// FORM AGGREGATES
// =============================================================================

/// Form field a validation message belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FullName,
    Email,
    Password,
    ConfirmPassword,
}

impl Field {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-field outcome of a form check.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: BTreeMap<Field, &'static str>,
}

impl ValidationResult {
    #[must_use]
    pub fn from_errors(errors: BTreeMap<Field, &'static str>) -> Self {
        Self { is_valid: errors.is_empty(), errors }
    }

    #[must_use]
    pub fn error(&self, field: Field) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }
}

impl std::fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

#[must_use]
pub fn validate_login_form(email: &str, password: &str) -> ValidationResult {
    let mut errors = BTreeMap::new();

    if let Some(message) = email_error(email) {
        errors.insert(Field::Email, message);
    }

    if password.is_empty() {
        errors.insert(Field::Password, PASSWORD_REQUIRED);
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.insert(Field::Password, PASSWORD_TOO_SHORT);
    }

    ValidationResult::from_errors(errors)
}

#[must_use]
pub fn validate_signup_form(full_name: &str, email: &str, password: &str, confirm: &str) -> ValidationResult {
    let mut errors = BTreeMap::new();

    if full_name.trim().is_empty() {
        errors.insert(Field::FullName, NAME_REQUIRED);
    } else if !validate_full_name(full_name) {
        errors.insert(Field::FullName, NAME_TOO_SHORT);
    }

    if let Some(message) = email_error(email) {
        errors.insert(Field::Email, message);
    }

    if password.is_empty() {
        errors.insert(Field::Password, PASSWORD_REQUIRED);
    } else if let Some(first) = validate_password(password).feedback.first() {
        errors.insert(Field::Password, *first);
    }

    if confirm.is_empty() {
        errors.insert(Field::ConfirmPassword, CONFIRM_REQUIRED);
    } else if !validate_password_match(password, confirm) {
        errors.insert(Field::ConfirmPassword, PASSWORDS_DO_NOT_MATCH);
    }

    ValidationResult::from_errors(errors)
}

/// Session-level precondition: fields present and email well-formed.
///
/// Narrower than the form validators; password rules stay with the form.
pub(crate) fn check_credentials(full_name: Option<&str>, email: &str, password: &str) -> ValidationResult {
    let mut errors = BTreeMap::new();
    if let Some(name) = full_name {
        if name.trim().is_empty() {
            errors.insert(Field::FullName, NAME_REQUIRED);
        }
    }
    if let Some(message) = email_error(email) {
        errors.insert(Field::Email, message);
    }
    if password.is_empty() {
        errors.insert(Field::Password, PASSWORD_REQUIRED);
    }
    ValidationResult::from_errors(errors)
}

fn email_error(email: &str) -> Option<&'static str> {
    if email.is_empty() {
        Some(EMAIL_REQUIRED)
    } else if !validate_email(email) {
        Some(EMAIL_INVALID)
    } else {
        None
    }
}
