use chrono::{DateTime, Utc};

use crate::error::{NotebridgeError, Result};

/// Longest accepted bio, lesson description and message body
pub const MAX_TEXT_LEN: usize = 1000;
/// Longest accepted chat subject
pub const MAX_SUBJECT_LEN: usize = 200;

fn invalid(msg: impl Into<String>) -> NotebridgeError {
    NotebridgeError::Validation(msg.into())
}

fn has_line_breaks(value: &str) -> bool {
    value.contains('\0') || value.contains('\r') || value.contains('\n')
}

/// Validation utilities for input sanitization and edge case handling
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Validate username
    pub fn validate_username(username: &str) -> Result<()> {
        if username.trim().is_empty() {
            return Err(invalid("Username is required"));
        }

        let len = username.chars().count();
        if !(3..=50).contains(&len) {
            return Err(invalid("Username must be between 3 and 50 characters"));
        }

        if username.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(invalid("Username contains invalid characters"));
        }

        Ok(())
    }

    /// Validate a plain-text password before hashing
    pub fn validate_password(password: &str) -> Result<()> {
        if password.trim().is_empty() {
            return Err(invalid("Password is required"));
        }

        if password.chars().count() < 6 {
            return Err(invalid("Password must be at least 6 characters"));
        }

        // Argon2 accepts longer input, but nothing legitimate needs it
        if password.len() > 1024 {
            return Err(invalid("Password too long (max 1024 bytes)"));
        }

        Ok(())
    }

    /// Validate email format
    pub fn validate_email(email: &str) -> Result<()> {
        if email.trim().is_empty() {
            return Err(invalid("Email is required"));
        }

        if email.len() > 254 {
            return Err(invalid("Email too long (max 254 characters)"));
        }

        if !email.contains('@') {
            return Err(invalid("Email should be valid"));
        }

        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() != 2 {
            return Err(invalid("Email must have exactly one @ symbol"));
        }

        let local_part = parts[0];
        let domain_part = parts[1];

        if local_part.is_empty() || local_part.len() > 64 {
            return Err(invalid("Email local part invalid"));
        }

        if domain_part.is_empty()
            || !domain_part.contains('.')
            || domain_part.starts_with('.')
            || domain_part.ends_with('.')
        {
            return Err(invalid("Email domain invalid"));
        }

        if email.chars().any(char::is_whitespace) {
            return Err(invalid("Email should be valid"));
        }

        Ok(())
    }

    /// Validate phone number format
    pub fn validate_phone(phone: &str) -> Result<()> {
        if phone.trim().is_empty() {
            return Err(invalid("Phone number cannot be empty"));
        }

        // Remove common formatting characters
        let cleaned = phone
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+' || *c == '-' || *c == '(' || *c == ')' || *c == ' ')
            .collect::<String>();

        if cleaned.len() != phone.len() {
            return Err(invalid("Phone number contains invalid characters"));
        }

        let digits_only = cleaned.chars().filter(char::is_ascii_digit).count();
        if !(7..=15).contains(&digits_only) {
            return Err(invalid("Phone number must be between 7 and 15 digits"));
        }

        if cleaned.chars().skip(1).any(|c| c == '+') {
            return Err(invalid("Phone number may only start with +"));
        }

        Ok(())
    }

    /// Validate a first or last name
    pub fn validate_name(field: &str, name: &str) -> Result<()> {
        if name.chars().count() > 100 {
            return Err(invalid(format!("{field} too long (max 100 characters)")));
        }

        if has_line_breaks(name) {
            return Err(invalid(format!("{field} contains invalid characters")));
        }

        Ok(())
    }

    /// Validate the instrument label on a profile
    pub fn validate_instrument(instrument: &str) -> Result<()> {
        if instrument.chars().count() > 100 {
            return Err(invalid("Instrument too long (max 100 characters)"));
        }
        Ok(())
    }

    /// Validate profile bio
    pub fn validate_bio(bio: &str) -> Result<()> {
        if bio.chars().count() > MAX_TEXT_LEN {
            return Err(invalid("Bio cannot exceed 1000 characters"));
        }
        Ok(())
    }

    /// Validate chat subject
    pub fn validate_subject(subject: &str) -> Result<()> {
        if subject.trim().is_empty() {
            return Err(invalid("Subject is required"));
        }

        if subject.chars().count() > MAX_SUBJECT_LEN {
            return Err(invalid("Subject cannot exceed 200 characters"));
        }

        Ok(())
    }

    /// Validate message body
    pub fn validate_message_content(content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(invalid("Message content is required"));
        }

        if content.chars().count() > MAX_TEXT_LEN {
            return Err(invalid("Message cannot exceed 1000 characters"));
        }

        Ok(())
    }

    /// Validate lesson description
    pub fn validate_description(description: &str) -> Result<()> {
        if description.chars().count() > MAX_TEXT_LEN {
            return Err(invalid("Description cannot exceed 1000 characters"));
        }
        Ok(())
    }

    /// Validate a lesson time window.
    ///
    /// `now` is only checked when given, so updates can keep a lesson that
    /// already started.
    pub fn validate_lesson_window(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: Option<DateTime<Utc>>,
    ) -> Result<()> {
        if start >= end {
            return Err(invalid("Start time must be before end time"));
        }

        if let Some(now) = now {
            if start < now {
                return Err(invalid("Start time cannot be in the past"));
            }
        }

        Ok(())
    }

    /// Validate page query parameters and apply defaults
    pub fn validate_page(page: Option<u32>, size: Option<u32>, default_size: u32, max_size: u32) -> Result<(u32, u32)> {
        let size = size.unwrap_or(default_size);
        if size == 0 || size > max_size {
            return Err(invalid(format!("Page size must be between 1 and {max_size}")));
        }
        Ok((page.unwrap_or(0), size))
    }

    /// Sanitize text input
    #[must_use]
    pub fn sanitize_text(text: &str) -> String {
        text.chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t' || *c == '\r')
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// Reduce a client-supplied filename to a safe object key suffix.
    ///
    /// Directory components are dropped and anything outside
    /// `[A-Za-z0-9._-]` becomes `_`. Returns `None` when nothing usable is
    /// left.
    #[must_use]
    pub fn sanitize_file_name(name: &str) -> Option<String> {
        let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
        let cleaned: String = base
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .take(200)
            .collect();

        let cleaned = cleaned.trim_matches('.').to_string();
        if cleaned.is_empty() || cleaned.contains("..") {
            None
        } else {
            Some(cleaned)
        }
    }
}
