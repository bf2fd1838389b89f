//! Notebridge - Tutoring Platform Backend
//!
//! A Rust library and HTTP service for a music tutoring platform.
//!
//! # Features
//!
//! - Accounts with student, teacher and admin roles
//! - Lesson scheduling with cancel/reactivate
//! - Teacher-student chat with read tracking
//! - File uploads to an S3-compatible object store, with cleanup of
//!   orphaned blobs when the metadata write fails

/// Configuration management
pub mod config;
/// Database operations and connection pooling
pub mod db;
/// Error types
pub mod error;
/// HTTP routes and extractors
pub mod http;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Password hashing
pub mod password;
/// Repository pattern for data access
pub mod repository;
/// Database schema definitions
pub mod schema;
/// Business logic
pub mod service;
/// Remote object storage
pub mod storage;
/// Input validation and sanitization
pub mod validation;

// Re-export key components for easier access
pub use db::Database;
pub use error::{NotebridgeError, Result};
pub use http::{router, AppState};
pub use models::{Chat, Lesson, Message, Role, User};
