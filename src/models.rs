//! Data models for accounts, lessons, chats and stored files
//!
//! This module contains the row types returned by the database layer, the
//! insert payloads passed into it, and the request bodies accepted over HTTP.
//! JSON uses camelCase field names; enums use their upper-case names.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a stored enum column holds an unknown value
#[derive(Debug, Error)]
#[error("unknown {kind} value: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Books lessons and chats with teachers
    #[default]
    Student,
    /// Owns lessons
    Teacher,
    /// Can act on any resource
    Admin,
}

impl Role {
    /// Value stored in the `role` column
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "STUDENT",
            Self::Teacher => "TEACHER",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "STUDENT" => Ok(Self::Student),
            "TEACHER" => Ok(Self::Teacher),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(ParseEnumError {
                kind: "role",
                value: s.to_string(),
            }),
        }
    }
}

/// Where a lesson takes place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationType {
    /// Video call, see `meeting_link`
    Online,
    /// See `physical_address`
    InPerson,
    /// Both
    Hybrid,
}

impl LocationType {
    /// Value stored in the `location` column
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "ONLINE",
            Self::InPerson => "IN_PERSON",
            Self::Hybrid => "HYBRID",
        }
    }
}

impl FromStr for LocationType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ONLINE" => Ok(Self::Online),
            "IN_PERSON" => Ok(Self::InPerson),
            "HYBRID" => Ok(Self::Hybrid),
            _ => Err(ParseEnumError {
                kind: "location",
                value: s.to_string(),
            }),
        }
    }
}

macro_rules! text_enum_sql {
    ($ty:ty) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: ParseEnumError| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

text_enum_sql!(Role);
text_enum_sql!(LocationType);

/// A persisted account
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Database primary key
    pub id: i64,
    /// Unique login name
    pub username: String,
    /// Argon2 PHC string, never serialized
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Unique email address
    pub email: String,
    /// Account role
    pub role: Role,
    /// Instrument taught or studied
    pub instrument: Option<String>,
    /// Free-form profile text
    pub bio: Option<String>,
    /// Given name
    pub first_name: Option<String>,
    /// Family name
    pub last_name: Option<String>,
    /// Contact phone number
    pub phone_number: Option<String>,
    /// Registration timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// True for admin accounts
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// True for accounts allowed to own lessons, plus admins
    #[must_use]
    pub fn can_manage_lessons(&self) -> bool {
        matches!(self.role, Role::Teacher | Role::Admin)
    }

    /// Same-user-or-admin check used by the user and file endpoints
    #[must_use]
    pub fn is_self_or_admin(&self, user_id: i64) -> bool {
        self.id == user_id || self.is_admin()
    }
}

/// Data for creating a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Unique login name
    pub username: String,
    /// Already-hashed password
    pub password_hash: String,
    /// Unique email address
    pub email: String,
    /// Account role
    pub role: Role,
    /// Instrument taught or studied
    pub instrument: Option<String>,
    /// Free-form profile text
    pub bio: Option<String>,
    /// Given name
    pub first_name: Option<String>,
    /// Family name
    pub last_name: Option<String>,
    /// Contact phone number
    pub phone_number: Option<String>,
}

/// Body of `POST /api/users` and `POST /api/users/register`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    /// Required, unique
    pub username: Option<String>,
    /// Required, stored only as an argon2 hash
    pub password: Option<String>,
    /// Required, unique
    pub email: Option<String>,
    /// Defaults to STUDENT
    pub role: Option<Role>,
    /// Instrument taught or studied
    pub instrument: Option<String>,
    /// Free-text profile
    pub bio: Option<String>,
    /// Given name
    pub first_name: Option<String>,
    /// Family name
    pub last_name: Option<String>,
    /// Contact number
    pub phone_number: Option<String>,
}

/// Body of `PATCH /api/users/{id}`; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    /// New email, must stay unique
    pub email: Option<String>,
    /// New password, rehashed
    pub password: Option<String>,
    /// Blank clears
    pub instrument: Option<String>,
    /// Blank clears
    pub bio: Option<String>,
    /// Blank clears
    pub first_name: Option<String>,
    /// Blank clears
    pub last_name: Option<String>,
    /// Blank clears
    pub phone_number: Option<String>,
}

/// A scheduled lesson
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    /// Database primary key
    pub id: i64,
    /// Owning teacher
    pub teacher_id: i64,
    /// Lesson description
    pub description: Option<String>,
    /// Where the lesson takes place
    pub location: LocationType,
    /// Start of the lesson
    pub start_time: DateTime<Utc>,
    /// End of the lesson
    pub end_time: DateTime<Utc>,
    /// Video call link for online lessons
    pub meeting_link: Option<String>,
    /// Address for in-person lessons
    pub physical_address: Option<String>,
    /// Cancelled lessons are hidden from the public listings
    pub is_cancelled: bool,
}

/// Data for creating a new lesson
#[derive(Debug, Clone)]
pub struct NewLesson {
    /// Owning teacher
    pub teacher_id: i64,
    /// Free text shown to students
    pub description: Option<String>,
    /// Where the lesson happens
    pub location: LocationType,
    /// Lesson start
    pub start_time: DateTime<Utc>,
    /// Lesson end
    pub end_time: DateTime<Utc>,
    /// Link for online lessons
    pub meeting_link: Option<String>,
    /// Address for in-person lessons
    pub physical_address: Option<String>,
}

/// Body of `POST /api/lessons`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLessonRequest {
    /// Required when an admin creates the lesson, ignored for teachers
    pub teacher_id: Option<i64>,
    /// Free text shown to students
    pub description: Option<String>,
    /// Required
    pub location: Option<LocationType>,
    /// Required, must not be in the past
    pub start_time: Option<DateTime<Utc>>,
    /// Required, strictly after `start_time`
    pub end_time: Option<DateTime<Utc>>,
    /// Link for online or hybrid lessons
    pub meeting_link: Option<String>,
    /// Address for in-person or hybrid lessons
    pub physical_address: Option<String>,
}

/// Body of `PUT /api/lessons/{id}`; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLessonRequest {
    /// New description
    pub description: Option<String>,
    /// New location type
    pub location: Option<LocationType>,
    /// New start, checked against the resulting end
    pub start_time: Option<DateTime<Utc>>,
    /// New end, checked against the resulting start
    pub end_time: Option<DateTime<Utc>>,
    /// New meeting link
    pub meeting_link: Option<String>,
    /// New physical address
    pub physical_address: Option<String>,
}

/// Filter for lesson listings
#[derive(Debug, Default, Clone)]
pub struct LessonQuery {
    /// Only lessons owned by this teacher
    pub teacher_id: Option<i64>,
    /// Include cancelled lessons
    pub include_cancelled: bool,
    /// Only lessons starting strictly after this instant
    pub starts_after: Option<DateTime<Utc>>,
}

impl LessonQuery {
    /// Active lessons only, no other filter
    #[must_use]
    pub fn active() -> Self {
        Self::default()
    }

    /// Every lesson, cancelled included
    #[must_use]
    pub fn all() -> Self {
        Self {
            include_cancelled: true,
            ..Self::default()
        }
    }

    /// Restrict to one teacher
    #[must_use]
    pub const fn teacher(mut self, teacher_id: i64) -> Self {
        self.teacher_id = Some(teacher_id);
        self
    }

    /// Restrict to lessons starting after `instant`
    #[must_use]
    pub const fn starting_after(mut self, instant: DateTime<Utc>) -> Self {
        self.starts_after = Some(instant);
        self
    }
}

/// A conversation between one teacher and one student
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    /// Database primary key
    pub id: i64,
    /// The chat's teacher
    pub teacher_id: i64,
    /// The chat's student
    pub student_id: i64,
    /// Topic, replaced when the pair reopens the chat with a new one
    pub subject: String,
    /// When the pair first opened the chat
    pub created_at: DateTime<Utc>,
    /// Bumped on every message send
    pub last_message_at: DateTime<Utc>,
    /// Inactive chats are hidden from listings
    pub is_active: bool,
}

impl Chat {
    /// A participant is the chat's teacher or its student
    #[must_use]
    pub const fn is_participant(&self, user_id: i64) -> bool {
        self.teacher_id == user_id || self.student_id == user_id
    }
}

/// A chat as listed for one of its participants
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    /// The chat row itself
    #[serde(flatten)]
    pub chat: Chat,
    /// Messages from the other participant not yet marked as read
    pub unread_count: u64,
}

/// A message within a chat
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Database primary key
    pub id: i64,
    /// Owning chat
    pub chat_id: i64,
    /// Participant who wrote it
    pub sender_id: i64,
    /// Sanitized message text
    pub content: String,
    /// Send timestamp
    pub sent_at: DateTime<Utc>,
    /// Set once the other participant marks the chat read
    pub is_read: bool,
}

/// Body of `POST /api/chats`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatRequest {
    /// Must be a TEACHER
    pub teacher_id: Option<i64>,
    /// Must be a STUDENT
    pub student_id: Option<i64>,
    /// Chat topic
    pub subject: Option<String>,
}

/// Body of `POST /api/chats/{id}/messages`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendMessageRequest {
    /// Message text
    pub content: Option<String>,
}

/// `?page=&size=` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageRequest {
    /// Zero-based page index
    pub page: Option<u32>,
    /// Page size
    pub size: Option<u32>,
}

/// One page of results, newest first
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Rows on this page
    pub content: Vec<T>,
    /// Zero-based page index
    pub page: u32,
    /// Requested page size
    pub size: u32,
    /// Rows across all pages
    pub total_elements: u64,
    /// Number of pages at this size
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Assemble a page from its rows and the unpaged row count
    #[must_use]
    pub fn new(content: Vec<T>, page: u32, size: u32, total_elements: u64) -> Self {
        let total_pages = if size == 0 {
            0
        } else {
            u32::try_from(total_elements.div_ceil(u64::from(size))).unwrap_or(u32::MAX)
        };
        Self {
            content,
            page,
            size,
            total_elements,
            total_pages,
        }
    }
}

/// What a stored file is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOwner {
    /// Free-standing upload
    Unowned,
    /// Profile picture of a user
    User(i64),
    /// Picture attached to a lesson
    Lesson(i64),
}

impl FileOwner {
    /// Label used in logs and metrics
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unowned => "file",
            Self::User(_) => "profile",
            Self::Lesson(_) => "lesson_pic",
        }
    }
}

/// Metadata row linking a public file handle to its blob key
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// Database primary key
    pub id: i64,
    /// Public handle
    pub unique_id: String,
    /// Key in the object store
    pub object_name: String,
    /// Upload timestamp
    pub upload_date: DateTime<Utc>,
    /// Set for profile pictures
    pub user_id: Option<i64>,
    /// Set for lesson pictures, nulled when the lesson is deleted
    pub lesson_id: Option<i64>,
}

/// Data for creating a new metadata row
#[derive(Debug, Clone)]
pub struct NewFileMetadata {
    /// Public handle
    pub unique_id: String,
    /// Key in the object store
    pub object_name: String,
    /// Upload timestamp
    pub upload_date: DateTime<Utc>,
    /// What the file is attached to
    pub owner: FileOwner,
}

/// An uploaded file as received from the client
#[derive(Debug, Clone, Default)]
pub struct FileUpload {
    /// Original filename, if the client sent one
    pub file_name: Option<String>,
    /// Declared MIME type
    pub content_type: Option<String>,
    /// Raw bytes
    pub data: Vec<u8>,
}

/// A file fetched back from the object store
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Object key, including the original filename suffix
    pub file_name: String,
    /// Raw bytes from the object store
    pub content: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_text() {
        for role in [Role::Student, Role::Teacher, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("janitor".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_json_is_upper_case() {
        assert_eq!(serde_json::to_string(&Role::Teacher).unwrap(), "\"TEACHER\"");
        let loc: LocationType = serde_json::from_str("\"IN_PERSON\"").unwrap();
        assert_eq!(loc, LocationType::InPerson);
    }

    #[test]
    fn test_page_counts() {
        let page = Page::new(vec![1, 2], 0, 2, 5);
        assert_eq!(page.total_pages, 3);
        let empty: Page<i32> = Page::new(vec![], 0, 20, 0);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_participant_check() {
        let now = Utc::now();
        let chat = Chat {
            id: 1,
            teacher_id: 10,
            student_id: 20,
            subject: "Piano".into(),
            created_at: now,
            last_message_at: now,
            is_active: true,
        };
        assert!(chat.is_participant(10));
        assert!(chat.is_participant(20));
        assert!(!chat.is_participant(30));
    }

    #[test]
    fn test_user_json_hides_password() {
        let user = User {
            id: 1,
            username: "alice".into(),
            password_hash: "$argon2id$secret".into(),
            email: "alice@example.com".into(),
            role: Role::Student,
            instrument: None,
            bio: None,
            first_name: None,
            last_name: None,
            phone_number: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "STUDENT");
    }
}
