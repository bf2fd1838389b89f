use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::Database;
use crate::error::{NotebridgeError, Result};
use crate::models::{Chat, Message};
use crate::schema::{chats, messages};

impl Database {
    /// Map a database row to a Chat
    fn map_chat(row: &Row) -> rusqlite::Result<Chat> {
        Ok(Chat {
            id: row.get(chats::ID)?,
            teacher_id: row.get(chats::TEACHER_ID)?,
            student_id: row.get(chats::STUDENT_ID)?,
            subject: row.get(chats::SUBJECT)?,
            created_at: row.get(chats::CREATED_AT)?,
            last_message_at: row.get(chats::LAST_MESSAGE_AT)?,
            is_active: row.get(chats::IS_ACTIVE)?,
        })
    }

    /// Map a database row to a Message
    fn map_message(row: &Row) -> rusqlite::Result<Message> {
        Ok(Message {
            id: row.get(messages::ID)?,
            chat_id: row.get(messages::CHAT_ID)?,
            sender_id: row.get(messages::SENDER_ID)?,
            content: row.get(messages::CONTENT)?,
            sent_at: row.get(messages::SENT_AT)?,
            is_read: row.get(messages::IS_READ)?,
        })
    }

    /// Get a chat by ID
    pub fn find_chat(&self, chat_id: i64) -> Result<Option<Chat>> {
        let conn = self.get_connection()?;
        let chat = conn
            .query_row(
                &format!("SELECT * FROM {} WHERE {} = ?", chats::TABLE, chats::ID),
                params![chat_id],
                Self::map_chat,
            )
            .optional()?;
        Ok(chat)
    }

    /// Get the chat between a specific teacher and student
    pub fn find_chat_by_pair(&self, teacher_id: i64, student_id: i64) -> Result<Option<Chat>> {
        let conn = self.get_connection()?;
        let chat = conn
            .query_row(
                &format!(
                    "SELECT * FROM {} WHERE {} = ? AND {} = ?",
                    chats::TABLE,
                    chats::TEACHER_ID,
                    chats::STUDENT_ID
                ),
                params![teacher_id, student_id],
                Self::map_chat,
            )
            .optional()?;
        Ok(chat)
    }

    /// Insert the chat for a (teacher, student) pair, or return the one that
    /// already exists with `subject` written over the stored one. Creation and
    /// recency timestamps of an existing row are kept.
    pub fn insert_chat(&self, teacher_id: i64, student_id: i64, subject: &str, now: DateTime<Utc>) -> Result<Chat> {
        let mut conn = self.get_connection()?;
        let tx = conn.transaction()?;

        tx.execute(
            &format!(
                "INSERT INTO {} ({}, {}, {}, {}, {}, {}) VALUES (?, ?, ?, ?, ?, 1) \
                 ON CONFLICT ({}, {}) DO UPDATE SET {} = excluded.{}",
                chats::TABLE,
                chats::TEACHER_ID,
                chats::STUDENT_ID,
                chats::SUBJECT,
                chats::CREATED_AT,
                chats::LAST_MESSAGE_AT,
                chats::IS_ACTIVE,
                chats::TEACHER_ID,
                chats::STUDENT_ID,
                chats::SUBJECT,
                chats::SUBJECT
            ),
            params![teacher_id, student_id, subject, now, now],
        )?;

        let chat = tx.query_row(
            &format!(
                "SELECT * FROM {} WHERE {} = ? AND {} = ?",
                chats::TABLE,
                chats::TEACHER_ID,
                chats::STUDENT_ID
            ),
            params![teacher_id, student_id],
            Self::map_chat,
        )?;
        tx.commit()?;

        Ok(chat)
    }

    /// Change a chat's subject
    pub fn update_chat_subject(&self, chat_id: i64, subject: &str) -> Result<()> {
        let conn = self.get_connection()?;
        let updated = conn.execute(
            &format!("UPDATE {} SET {} = ? WHERE {} = ?", chats::TABLE, chats::SUBJECT, chats::ID),
            params![subject, chat_id],
        )?;
        if updated == 0 {
            return Err(NotebridgeError::not_found("Chat not found"));
        }
        Ok(())
    }

    /// Active chats where the user is teacher or student, most recent first
    pub fn list_active_chats_for_user(&self, user_id: i64) -> Result<Vec<Chat>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT * FROM {} WHERE ({} = ?1 OR {} = ?1) AND {} = 1 ORDER BY {} DESC, {} DESC",
            chats::TABLE,
            chats::TEACHER_ID,
            chats::STUDENT_ID,
            chats::IS_ACTIVE,
            chats::LAST_MESSAGE_AT,
            chats::ID
        ))?;
        let rows = stmt.query_map(params![user_id], Self::map_chat)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Append a message and bump the chat's `last_message_at` to `sent_at`,
    /// in one transaction
    pub fn insert_message(&self, chat_id: i64, sender_id: i64, content: &str, sent_at: DateTime<Utc>) -> Result<Message> {
        let mut conn = self.get_connection()?;
        let tx = conn.transaction()?;

        tx.execute(
            &format!(
                "INSERT INTO {} ({}, {}, {}, {}, {}) VALUES (?, ?, ?, ?, 0)",
                messages::TABLE,
                messages::CHAT_ID,
                messages::SENDER_ID,
                messages::CONTENT,
                messages::SENT_AT,
                messages::IS_READ
            ),
            params![chat_id, sender_id, content, sent_at],
        )?;
        let id = tx.last_insert_rowid();

        tx.execute(
            &format!(
                "UPDATE {} SET {} = ? WHERE {} = ?",
                chats::TABLE,
                chats::LAST_MESSAGE_AT,
                chats::ID
            ),
            params![sent_at, chat_id],
        )?;
        tx.commit()?;

        Ok(Message {
            id,
            chat_id,
            sender_id,
            content: content.to_string(),
            sent_at,
            is_read: false,
        })
    }

    /// One page of a chat's messages, newest first, plus the total count
    pub fn list_messages_page(&self, chat_id: i64, page: u32, size: u32) -> Result<(Vec<Message>, u64)> {
        let conn = self.get_connection()?;

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE {} = ?", messages::TABLE, messages::CHAT_ID),
            params![chat_id],
            |row| row.get(0),
        )?;

        let offset = i64::from(page) * i64::from(size);
        let mut stmt = conn.prepare(&format!(
            "SELECT * FROM {} WHERE {} = ? ORDER BY {} DESC, {} DESC LIMIT ? OFFSET ?",
            messages::TABLE,
            messages::CHAT_ID,
            messages::SENT_AT,
            messages::ID
        ))?;
        let rows = stmt.query_map(params![chat_id, i64::from(size), offset], Self::map_message)?;
        let content = rows.collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((content, u64::try_from(total).unwrap_or_default()))
    }

    /// Flip `is_read` on every unread message in the chat not sent by `reader_id`.
    /// Returns the number of messages marked.
    pub fn mark_messages_read(&self, chat_id: i64, reader_id: i64) -> Result<usize> {
        let conn = self.get_connection()?;
        let updated = conn.execute(
            &format!(
                "UPDATE {} SET {} = 1 WHERE {} = ? AND {} != ? AND {} = 0",
                messages::TABLE,
                messages::IS_READ,
                messages::CHAT_ID,
                messages::SENDER_ID,
                messages::IS_READ
            ),
            params![chat_id, reader_id],
        )?;
        Ok(updated)
    }

    /// Unread messages addressed to `user_id` in one chat
    pub fn count_unread_in_chat(&self, chat_id: i64, user_id: i64) -> Result<u64> {
        let conn = self.get_connection()?;
        let count: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE {} = ? AND {} != ? AND {} = 0",
                messages::TABLE,
                messages::CHAT_ID,
                messages::SENDER_ID,
                messages::IS_READ
            ),
            params![chat_id, user_id],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Unread messages addressed to `user_id` across all of their chats
    pub fn count_unread_for_user(&self, user_id: i64) -> Result<u64> {
        let conn = self.get_connection()?;
        let count: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {m} JOIN {c} ON {m}.{m_chat} = {c}.{c_id} \
                 WHERE ({c}.{c_teacher} = ?1 OR {c}.{c_student} = ?1) \
                 AND {m}.{m_sender} != ?1 AND {m}.{m_read} = 0",
                m = messages::TABLE,
                c = chats::TABLE,
                m_chat = messages::CHAT_ID,
                c_id = chats::ID,
                c_teacher = chats::TEACHER_ID,
                c_student = chats::STUDENT_ID,
                m_sender = messages::SENDER_ID,
                m_read = messages::IS_READ
            ),
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}
