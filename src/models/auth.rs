use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const MIN_PASSWORD_LEN: usize = 8;

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap());

// Local part may not start with '.' or contain "..", checked separately below.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .unwrap()
});

#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl SignUpRequest {
    /// Trim every field and check it, reporting all failures at once.
    pub fn validate(self) -> Result<Self, AppError> {
        let request = Self {
            email: self.email.trim().to_string(),
            username: self.username.trim().to_string(),
            password: self.password.trim().to_string(),
        };

        let mut problems = Vec::new();

        if request.email.is_empty() {
            problems.push("Email is required");
        } else if !is_valid_email(&request.email) {
            problems.push("Invalid email address");
        }

        if request.username.is_empty() {
            problems.push("Username is required");
        } else if !USERNAME_RE.is_match(&request.username) {
            problems.push("Only letters, numbers, _ and - allowed");
        }

        if request.password.chars().count() < MIN_PASSWORD_LEN {
            problems.push("Password must be at least 8 characters");
        }

        into_result(request, problems)
    }
}

impl LoginRequest {
    pub fn validate(self) -> Result<Self, AppError> {
        let request = Self {
            username: self.username.trim().to_string(),
            password: self.password.trim().to_string(),
        };

        let mut problems = Vec::new();

        if request.username.is_empty() {
            problems.push("Username is required");
        }
        if request.password.chars().count() < MIN_PASSWORD_LEN {
            problems.push("Must be at least 8 characters");
        }

        into_result(request, problems)
    }
}

fn is_valid_email(email: &str) -> bool {
    !email.starts_with('.') && !email.contains("..") && EMAIL_RE.is_match(email)
}

fn into_result<T>(value: T, problems: Vec<&str>) -> Result<T, AppError> {
    if problems.is_empty() {
        Ok(value)
    } else {
        Err(AppError::Validation(problems.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(email: &str, username: &str, password: &str) -> SignUpRequest {
        SignUpRequest {
            email: email.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    fn message(err: AppError) -> String {
        match err {
            AppError::Validation(msg) => msg,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_signup_is_trimmed() {
        let request = signup("  ada@example.com ", " ada_l-1 ", " hunter22 ").validate().unwrap();

        assert_eq!(request.email, "ada@example.com");
        assert_eq!(request.username, "ada_l-1");
        assert_eq!(request.password, "hunter22");
    }

    #[test]
    fn blank_fields_are_required() {
        let msg = message(signup("   ", "  ", "").validate().unwrap_err());

        assert!(msg.contains("Email is required"));
        assert!(msg.contains("Username is required"));
        assert!(msg.contains("Password must be at least 8 characters"));
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for email in ["ada", "ada@", "@example.com", ".ada@example.com", "a..b@example.com", "ada@example.c"] {
            let msg = message(signup(email, "ada", "hunter22").validate().unwrap_err());
            assert_eq!(msg, "Invalid email address", "accepted {email:?}");
        }
    }

    #[test]
    fn username_charset_is_restricted() {
        let msg = message(signup("ada@example.com", "ada lovelace", "hunter22").validate().unwrap_err());
        assert_eq!(msg, "Only letters, numbers, _ and - allowed");

        let msg = message(signup("ada@example.com", "ada!", "hunter22").validate().unwrap_err());
        assert_eq!(msg, "Only letters, numbers, _ and - allowed");
    }

    #[test]
    fn password_length_is_measured_after_trimming() {
        let msg = message(signup("ada@example.com", "ada", "  short7  ").validate().unwrap_err());
        assert_eq!(msg, "Password must be at least 8 characters");
    }

    #[test]
    fn login_requires_username_and_long_password() {
        let login = LoginRequest {
            username: " ".to_string(),
            password: "1234567".to_string(),
        };
        let msg = message(login.validate().unwrap_err());

        assert_eq!(msg, "Username is required; Must be at least 8 characters");
    }

    #[test]
    fn login_does_not_restrict_username_charset() {
        let login = LoginRequest {
            username: "ada lovelace".to_string(),
            password: "hunter22".to_string(),
        };
        assert!(login.validate().is_ok());
    }
}
