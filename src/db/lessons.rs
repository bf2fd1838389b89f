use rusqlite::{params, OptionalExtension, Row};

use super::Database;
use crate::error::{NotebridgeError, Result};
use crate::models::{Lesson, LessonQuery, NewLesson};
use crate::schema::lessons;

impl Database {
    /// Map a database row to a Lesson
    fn map_lesson(row: &Row) -> rusqlite::Result<Lesson> {
        Ok(Lesson {
            id: row.get(lessons::ID)?,
            teacher_id: row.get(lessons::TEACHER_ID)?,
            description: row.get(lessons::DESCRIPTION)?,
            location: row.get(lessons::LOCATION)?,
            start_time: row.get(lessons::START_TIME)?,
            end_time: row.get(lessons::END_TIME)?,
            meeting_link: row.get(lessons::MEETING_LINK)?,
            physical_address: row.get(lessons::PHYSICAL_ADDRESS)?,
            is_cancelled: row.get(lessons::IS_CANCELLED)?,
        })
    }

    /// Insert a new, active lesson
    pub fn insert_lesson(&self, new_lesson: &NewLesson) -> Result<Lesson> {
        let conn = self.get_connection()?;

        conn.execute(
            &format!(
                "INSERT INTO {} ({}, {}, {}, {}, {}, {}, {}, {}) VALUES (?, ?, ?, ?, ?, ?, ?, 0)",
                lessons::TABLE,
                lessons::TEACHER_ID,
                lessons::DESCRIPTION,
                lessons::LOCATION,
                lessons::START_TIME,
                lessons::END_TIME,
                lessons::MEETING_LINK,
                lessons::PHYSICAL_ADDRESS,
                lessons::IS_CANCELLED
            ),
            params![
                new_lesson.teacher_id,
                new_lesson.description,
                new_lesson.location,
                new_lesson.start_time,
                new_lesson.end_time,
                new_lesson.meeting_link,
                new_lesson.physical_address
            ],
        )?;

        Ok(Lesson {
            id: conn.last_insert_rowid(),
            teacher_id: new_lesson.teacher_id,
            description: new_lesson.description.clone(),
            location: new_lesson.location,
            start_time: new_lesson.start_time,
            end_time: new_lesson.end_time,
            meeting_link: new_lesson.meeting_link.clone(),
            physical_address: new_lesson.physical_address.clone(),
            is_cancelled: false,
        })
    }

    /// Get a lesson by ID, cancelled or not
    pub fn find_lesson(&self, lesson_id: i64) -> Result<Option<Lesson>> {
        let conn = self.get_connection()?;
        let lesson = conn
            .query_row(
                &format!("SELECT * FROM {} WHERE {} = ?", lessons::TABLE, lessons::ID),
                params![lesson_id],
                Self::map_lesson,
            )
            .optional()?;
        Ok(lesson)
    }

    /// List lessons matching `query`, ordered by start time
    pub fn list_lessons(&self, query: &LessonQuery) -> Result<Vec<Lesson>> {
        let conn = self.get_connection()?;

        let mut sql = format!("SELECT * FROM {} WHERE 1 = 1", lessons::TABLE);
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(teacher_id) = query.teacher_id {
            sql.push_str(&format!(" AND {} = ?", lessons::TEACHER_ID));
            params.push(Box::new(teacher_id));
        }

        if !query.include_cancelled {
            sql.push_str(&format!(" AND {} = 0", lessons::IS_CANCELLED));
        }

        if let Some(after) = query.starts_after {
            sql.push_str(&format!(" AND {} > ?", lessons::START_TIME));
            params.push(Box::new(after));
        }

        sql.push_str(&format!(" ORDER BY {} ASC, {} ASC", lessons::START_TIME, lessons::ID));

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params.iter()), Self::map_lesson)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Write back every mutable column of `lesson`
    pub fn save_lesson(&self, lesson: &Lesson) -> Result<Lesson> {
        let conn = self.get_connection()?;
        let updated = conn.execute(
            &format!(
                "UPDATE {} SET {} = ?, {} = ?, {} = ?, {} = ?, {} = ?, {} = ?, {} = ? WHERE {} = ?",
                lessons::TABLE,
                lessons::DESCRIPTION,
                lessons::LOCATION,
                lessons::START_TIME,
                lessons::END_TIME,
                lessons::MEETING_LINK,
                lessons::PHYSICAL_ADDRESS,
                lessons::IS_CANCELLED,
                lessons::ID
            ),
            params![
                lesson.description,
                lesson.location,
                lesson.start_time,
                lesson.end_time,
                lesson.meeting_link,
                lesson.physical_address,
                lesson.is_cancelled,
                lesson.id
            ],
        )?;

        if updated == 0 {
            return Err(NotebridgeError::not_found(format!("Lesson not found with ID: {}", lesson.id)));
        }
        Ok(lesson.clone())
    }

    /// Permanently delete a lesson. Returns the number of rows removed.
    pub fn delete_lesson(&self, lesson_id: i64) -> Result<usize> {
        let conn = self.get_connection()?;
        let deleted = conn.execute(
            &format!("DELETE FROM {} WHERE {} = ?", lessons::TABLE, lessons::ID),
            params![lesson_id],
        )?;
        Ok(deleted)
    }
}
