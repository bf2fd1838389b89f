//! Database schema definitions
//!
//! This module provides constants for table and column names used with rusqlite.
//! The tables themselves are created by the SQL files under `migrations/`.

/// Users table schema
pub mod users {
    /// Table name
    pub const TABLE: &str = "users";
    /// Primary key column
    pub const ID: &str = "id";
    /// Unique login name column
    pub const USERNAME: &str = "username";
    /// Argon2 password hash column
    pub const PASSWORD_HASH: &str = "password_hash";
    /// Unique email address column
    pub const EMAIL: &str = "email";
    /// Role column (STUDENT, TEACHER, ADMIN)
    pub const ROLE: &str = "role";
    /// Instrument column
    pub const INSTRUMENT: &str = "instrument";
    /// Biography column
    pub const BIO: &str = "bio";
    /// Given name column
    pub const FIRST_NAME: &str = "first_name";
    /// Family name column
    pub const LAST_NAME: &str = "last_name";
    /// Phone number column
    pub const PHONE_NUMBER: &str = "phone_number";
    /// Registration timestamp column
    pub const CREATED_AT: &str = "created_at";
}

/// Lessons table schema
pub mod lessons {
    /// Table name
    pub const TABLE: &str = "lessons";
    /// Primary key column
    pub const ID: &str = "id";
    /// Foreign key to users table
    pub const TEACHER_ID: &str = "teacher_id";
    /// Description column
    pub const DESCRIPTION: &str = "description";
    /// Location type column (ONLINE, IN_PERSON, HYBRID)
    pub const LOCATION: &str = "location";
    /// Start timestamp column
    pub const START_TIME: &str = "start_time";
    /// End timestamp column
    pub const END_TIME: &str = "end_time";
    /// Video call link column
    pub const MEETING_LINK: &str = "meeting_link";
    /// Street address column
    pub const PHYSICAL_ADDRESS: &str = "physical_address";
    /// Cancellation flag column
    pub const IS_CANCELLED: &str = "is_cancelled";
}

/// Chats table schema
pub mod chats {
    /// Table name
    pub const TABLE: &str = "chats";
    /// Primary key column
    pub const ID: &str = "id";
    /// Foreign key to users table (teacher side)
    pub const TEACHER_ID: &str = "teacher_id";
    /// Foreign key to users table (student side)
    pub const STUDENT_ID: &str = "student_id";
    /// Subject column
    pub const SUBJECT: &str = "subject";
    /// Creation timestamp column
    pub const CREATED_AT: &str = "created_at";
    /// Timestamp of the latest message
    pub const LAST_MESSAGE_AT: &str = "last_message_at";
    /// Active flag column
    pub const IS_ACTIVE: &str = "is_active";
}

/// Messages table schema
pub mod messages {
    /// Table name
    pub const TABLE: &str = "messages";
    /// Primary key column
    pub const ID: &str = "id";
    /// Foreign key to chats table
    pub const CHAT_ID: &str = "chat_id";
    /// Foreign key to users table
    pub const SENDER_ID: &str = "sender_id";
    /// Message text content column
    pub const CONTENT: &str = "content";
    /// Send timestamp column
    pub const SENT_AT: &str = "sent_at";
    /// Read flag column
    pub const IS_READ: &str = "is_read";
}

/// File metadata table schema
pub mod files {
    /// Table name
    pub const TABLE: &str = "files";
    /// Primary key column
    pub const ID: &str = "id";
    /// Public file handle column
    pub const UNIQUE_ID: &str = "unique_id";
    /// Object store key column
    pub const OBJECT_NAME: &str = "object_name";
    /// Upload timestamp column
    pub const UPLOAD_DATE: &str = "upload_date";
    /// Optional foreign key to users table
    pub const USER_ID: &str = "user_id";
    /// Optional foreign key to lessons table
    pub const LESSON_ID: &str = "lesson_id";
}
