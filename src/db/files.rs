use rusqlite::{params, OptionalExtension, Row};

use super::Database;
use crate::error::Result;
use crate::models::{FileMetadata, FileOwner, NewFileMetadata};
use crate::schema::{files, lessons, users};

impl Database {
    /// Map a database row to a FileMetadata
    fn map_file(row: &Row) -> rusqlite::Result<FileMetadata> {
        Ok(FileMetadata {
            id: row.get(files::ID)?,
            unique_id: row.get(files::UNIQUE_ID)?,
            object_name: row.get(files::OBJECT_NAME)?,
            upload_date: row.get(files::UPLOAD_DATE)?,
            user_id: row.get(files::USER_ID)?,
            lesson_id: row.get(files::LESSON_ID)?,
        })
    }

    /// Insert a metadata row for a blob that has already been written
    pub fn insert_file_metadata(&self, new_file: &NewFileMetadata) -> Result<FileMetadata> {
        let conn = self.get_connection()?;

        let (user_id, lesson_id) = match new_file.owner {
            FileOwner::Unowned => (None, None),
            FileOwner::User(id) => (Some(id), None),
            FileOwner::Lesson(id) => (None, Some(id)),
        };

        conn.execute(
            &format!(
                "INSERT INTO {} ({}, {}, {}, {}, {}) VALUES (?, ?, ?, ?, ?)",
                files::TABLE,
                files::UNIQUE_ID,
                files::OBJECT_NAME,
                files::UPLOAD_DATE,
                files::USER_ID,
                files::LESSON_ID
            ),
            params![
                new_file.unique_id,
                new_file.object_name,
                new_file.upload_date,
                user_id,
                lesson_id
            ],
        )?;

        Ok(FileMetadata {
            id: conn.last_insert_rowid(),
            unique_id: new_file.unique_id.clone(),
            object_name: new_file.object_name.clone(),
            upload_date: new_file.upload_date,
            user_id,
            lesson_id,
        })
    }

    /// Look up a file by its public handle
    pub fn find_file_metadata(&self, unique_id: &str) -> Result<Option<FileMetadata>> {
        let conn = self.get_connection()?;
        let file = conn
            .query_row(
                &format!("SELECT * FROM {} WHERE {} = ?", files::TABLE, files::UNIQUE_ID),
                params![unique_id],
                Self::map_file,
            )
            .optional()?;
        Ok(file)
    }

    /// Delete a file row by its public handle. Returns the number of rows removed.
    pub fn delete_file_metadata(&self, unique_id: &str) -> Result<usize> {
        let conn = self.get_connection()?;
        let deleted = conn.execute(
            &format!("DELETE FROM {} WHERE {} = ?", files::TABLE, files::UNIQUE_ID),
            params![unique_id],
        )?;
        Ok(deleted)
    }

    /// Check whether the owner a file is about to be attached to exists
    pub fn file_owner_exists(&self, owner: FileOwner) -> Result<bool> {
        let (table, id_column, id) = match owner {
            FileOwner::Unowned => return Ok(true),
            FileOwner::User(id) => (users::TABLE, users::ID, id),
            FileOwner::Lesson(id) => (lessons::TABLE, lessons::ID, id),
        };

        let conn = self.get_connection()?;
        let exists: bool = conn.query_row(
            &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE {id_column} = ?)"),
            params![id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}
