//! Unit tests for validation.rs module

use chrono::{Duration, Utc};
use notebridge::validation::InputValidator;
use proptest::prelude::*;

#[test]
fn test_validate_username_valid() {
    assert!(InputValidator::validate_username("alice").is_ok());
    assert!(InputValidator::validate_username("abc").is_ok());
    assert!(InputValidator::validate_username(&"a".repeat(50)).is_ok());
}

#[test]
fn test_validate_username_invalid() {
    assert!(InputValidator::validate_username("").is_err());
    assert!(InputValidator::validate_username("   ").is_err());
    assert!(InputValidator::validate_username("ab").is_err());
    assert!(InputValidator::validate_username(&"a".repeat(51)).is_err());
    assert!(InputValidator::validate_username("al\nice").is_err());
}

#[test]
fn test_validate_password() {
    assert!(InputValidator::validate_password("secret").is_ok());
    assert!(InputValidator::validate_password("short").is_err());
    assert!(InputValidator::validate_password("      ").is_err());
}

#[test]
fn test_validate_email_valid() {
    assert!(InputValidator::validate_email("teacher@example.com").is_ok());
    assert!(InputValidator::validate_email("a.b+c@school.co.uk").is_ok());
}

#[test]
fn test_validate_email_invalid() {
    assert!(InputValidator::validate_email("").is_err());
    assert!(InputValidator::validate_email("no-at-sign").is_err());
    assert!(InputValidator::validate_email("two@@example.com").is_err());
    assert!(InputValidator::validate_email("@example.com").is_err());
    assert!(InputValidator::validate_email("user@localhost").is_err());
    assert!(InputValidator::validate_email("user@.com").is_err());
    assert!(InputValidator::validate_email("us er@example.com").is_err());
}

#[test]
fn test_validate_phone() {
    assert!(InputValidator::validate_phone("+1 (555) 123-4567").is_ok());
    assert!(InputValidator::validate_phone("5551234").is_ok());
    assert!(InputValidator::validate_phone("123").is_err());
    assert!(InputValidator::validate_phone("555-CALL-NOW").is_err());
    assert!(InputValidator::validate_phone("555+1234567").is_err());
}

#[test]
fn test_validate_bio_limit() {
    assert!(InputValidator::validate_bio(&"x".repeat(1000)).is_ok());
    assert!(InputValidator::validate_bio(&"x".repeat(1001)).is_err());
}

#[test]
fn test_validate_subject() {
    assert!(InputValidator::validate_subject("Piano basics").is_ok());
    assert!(InputValidator::validate_subject("").is_err());
    assert!(InputValidator::validate_subject("   ").is_err());
    assert!(InputValidator::validate_subject(&"s".repeat(200)).is_ok());
    assert!(InputValidator::validate_subject(&"s".repeat(201)).is_err());
}

#[test]
fn test_validate_message_content() {
    assert!(InputValidator::validate_message_content("See you Tuesday").is_ok());
    assert!(InputValidator::validate_message_content(" ").is_err());
    assert!(InputValidator::validate_message_content(&"m".repeat(1001)).is_err());
}

#[test]
fn test_validate_lesson_window_rejects_past_start() {
    let now = Utc::now();
    let start = now - Duration::minutes(5);
    assert!(InputValidator::validate_lesson_window(start, start + Duration::hours(1), Some(now)).is_err());
}

#[test]
fn test_validate_lesson_window_rejects_equal_bounds() {
    let start = Utc::now() + Duration::days(1);
    assert!(InputValidator::validate_lesson_window(start, start, None).is_err());
}

#[test]
fn test_sanitize_text() {
    assert_eq!(InputValidator::sanitize_text("  hello\u{0007} "), "hello");
    assert_eq!(InputValidator::sanitize_text("line1\nline2"), "line1\nline2");
}

#[test]
fn test_sanitize_file_name_keeps_extension() {
    assert_eq!(
        InputValidator::sanitize_file_name("lesson plan.pdf").as_deref(),
        Some("lesson_plan.pdf")
    );
}

proptest! {
    #[test]
    fn prop_sanitized_file_names_are_safe_keys(name in ".{0,300}") {
        if let Some(clean) = InputValidator::sanitize_file_name(&name) {
            prop_assert!(!clean.is_empty());
            prop_assert!(clean.len() <= 200);
            prop_assert!(!clean.contains('/'));
            prop_assert!(!clean.contains('\\'));
            prop_assert!(!clean.contains(".."));
            prop_assert!(clean.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_'));
        }
    }

    #[test]
    fn prop_username_length_bounds(name in "[a-z]{0,60}") {
        let ok = InputValidator::validate_username(&name).is_ok();
        prop_assert_eq!(ok, (3..=50).contains(&name.len()));
    }

    #[test]
    fn prop_window_requires_start_before_end(offset_a in -10_000i64..10_000, offset_b in -10_000i64..10_000) {
        let base = Utc::now();
        let start = base + Duration::minutes(offset_a);
        let end = base + Duration::minutes(offset_b);
        let ok = InputValidator::validate_lesson_window(start, end, None).is_ok();
        prop_assert_eq!(ok, start < end);
    }

    #[test]
    fn prop_page_size_bounds(size in 0u32..300) {
        let result = InputValidator::validate_page(None, Some(size), 20, 100);
        prop_assert_eq!(result.is_ok(), (1..=100).contains(&size));
    }
}
