use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::Database;
use crate::error::{is_constraint_violation, NotebridgeError, Result};
use crate::models::{NewUser, User};
use crate::schema::users;

impl Database {
    /// Map a database row to a User
    fn map_user(row: &Row) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(users::ID)?,
            username: row.get(users::USERNAME)?,
            password_hash: row.get(users::PASSWORD_HASH)?,
            email: row.get(users::EMAIL)?,
            role: row.get(users::ROLE)?,
            instrument: row.get(users::INSTRUMENT)?,
            bio: row.get(users::BIO)?,
            first_name: row.get(users::FIRST_NAME)?,
            last_name: row.get(users::LAST_NAME)?,
            phone_number: row.get(users::PHONE_NUMBER)?,
            created_at: row.get(users::CREATED_AT)?,
        })
    }

    /// Insert a new user.
    ///
    /// Callers pre-check username/email; the UNIQUE constraints catch the race.
    pub fn insert_user(&self, new_user: &NewUser) -> Result<User> {
        let conn = self.get_connection()?;
        let created_at = Utc::now();

        let inserted = conn.execute(
            &format!(
                "INSERT INTO {} ({}, {}, {}, {}, {}, {}, {}, {}, {}, {}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                users::TABLE,
                users::USERNAME,
                users::PASSWORD_HASH,
                users::EMAIL,
                users::ROLE,
                users::INSTRUMENT,
                users::BIO,
                users::FIRST_NAME,
                users::LAST_NAME,
                users::PHONE_NUMBER,
                users::CREATED_AT
            ),
            params![
                new_user.username,
                new_user.password_hash,
                new_user.email,
                new_user.role,
                new_user.instrument,
                new_user.bio,
                new_user.first_name,
                new_user.last_name,
                new_user.phone_number,
                created_at
            ],
        );

        match inserted {
            Ok(_) => {}
            Err(e) if is_constraint_violation(&e) => {
                return Err(NotebridgeError::validation("Username or email already exists"));
            }
            Err(e) => return Err(e.into()),
        }

        Ok(User {
            id: conn.last_insert_rowid(),
            username: new_user.username.clone(),
            password_hash: new_user.password_hash.clone(),
            email: new_user.email.clone(),
            role: new_user.role,
            instrument: new_user.instrument.clone(),
            bio: new_user.bio.clone(),
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            phone_number: new_user.phone_number.clone(),
            created_at,
        })
    }

    /// Get a user by ID
    pub fn find_user(&self, user_id: i64) -> Result<Option<User>> {
        let conn = self.get_connection()?;
        let user = conn
            .query_row(
                &format!("SELECT * FROM {} WHERE {} = ?", users::TABLE, users::ID),
                params![user_id],
                Self::map_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Get a user by username
    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.get_connection()?;
        let user = conn
            .query_row(
                &format!("SELECT * FROM {} WHERE {} = ?", users::TABLE, users::USERNAME),
                params![username],
                Self::map_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Get a user by email
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.get_connection()?;
        let user = conn
            .query_row(
                &format!("SELECT * FROM {} WHERE {} = ?", users::TABLE, users::EMAIL),
                params![email],
                Self::map_user,
            )
            .optional()?;
        Ok(user)
    }

    /// All users, oldest first
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(&format!("SELECT * FROM {} ORDER BY {} ASC", users::TABLE, users::ID))?;
        let rows = stmt.query_map([], Self::map_user)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Write back every mutable column of `user`
    pub fn update_user(&self, user: &User) -> Result<User> {
        let conn = self.get_connection()?;
        let updated = conn.execute(
            &format!(
                "UPDATE {} SET {} = ?, {} = ?, {} = ?, {} = ?, {} = ?, {} = ?, {} = ?, {} = ? WHERE {} = ?",
                users::TABLE,
                users::PASSWORD_HASH,
                users::EMAIL,
                users::ROLE,
                users::INSTRUMENT,
                users::BIO,
                users::FIRST_NAME,
                users::LAST_NAME,
                users::PHONE_NUMBER,
                users::ID
            ),
            params![
                user.password_hash,
                user.email,
                user.role,
                user.instrument,
                user.bio,
                user.first_name,
                user.last_name,
                user.phone_number,
                user.id
            ],
        );

        match updated {
            Ok(0) => Err(NotebridgeError::not_found(format!("User not found with ID: {}", user.id))),
            Ok(_) => Ok(user.clone()),
            Err(e) if is_constraint_violation(&e) => Err(NotebridgeError::validation("Email already exists")),
            Err(e) => Err(e.into()),
        }
    }
}
