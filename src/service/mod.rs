//! Business rules on top of the repositories.
//!
//! Each service owns the authorization checks for its resource and receives
//! the authenticated caller as a `&User`.

mod chat;
mod file;
mod lesson;
mod user;

pub use chat::ChatService;
pub use file::FileService;
pub use lesson::LessonService;
pub use user::UserService;

use crate::validation::InputValidator;

/// Sanitize an optional free-text field, treating blank input as absent
pub(crate) fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| InputValidator::sanitize_text(&v))
        .filter(|v| !v.is_empty())
}
