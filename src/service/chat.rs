use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::ChatConfig;
use crate::db::Database;
use crate::error::{NotebridgeError, Result};
use crate::metrics::MetricsCollector;
use crate::models::{Chat, ChatSummary, CreateChatRequest, Message, Page, PageRequest, Role, User};
use crate::validation::InputValidator;

/// Teacher-student chats and their messages
#[derive(Clone)]
pub struct ChatService {
    db: Database,
    metrics: MetricsCollector,
    default_page_size: u32,
    max_page_size: u32,
}

impl ChatService {
    #[must_use]
    pub fn new(db: Database, config: &ChatConfig) -> Self {
        Self {
            db,
            metrics: MetricsCollector::default(),
            default_page_size: config.default_page_size,
            max_page_size: config.max_page_size,
        }
    }

    /// Open a chat on behalf of `caller`, who must be one of the two parties
    pub fn open_chat(&self, caller: &User, request: CreateChatRequest, now: DateTime<Utc>) -> Result<Chat> {
        let teacher_id = request
            .teacher_id
            .ok_or_else(|| NotebridgeError::validation("teacherId is required"))?;
        let student_id = request
            .student_id
            .ok_or_else(|| NotebridgeError::validation("studentId is required"))?;
        if caller.id != teacher_id && caller.id != student_id {
            return Err(NotebridgeError::forbidden("You can only open chats you take part in"));
        }

        let subject = request.subject.unwrap_or_default();
        self.create_or_get_chat(teacher_id, student_id, &subject, now)
    }

    /// Return the chat for a (teacher, student) pair, creating it on first
    /// contact. A different subject replaces the stored one.
    pub fn create_or_get_chat(&self, teacher_id: i64, student_id: i64, subject: &str, now: DateTime<Utc>) -> Result<Chat> {
        let subject = InputValidator::sanitize_text(subject);
        InputValidator::validate_subject(&subject)?;

        self.require_role(teacher_id, Role::Teacher, "Teacher")?;
        self.require_role(student_id, Role::Student, "Student")?;

        if let Some(mut chat) = self.db.find_chat_by_pair(teacher_id, student_id)? {
            if chat.subject != subject {
                self.db.update_chat_subject(chat.id, &subject)?;
                debug!(chat_id = chat.id, "Updated chat subject");
                chat.subject = subject;
            }
            return Ok(chat);
        }

        let chat = self.db.insert_chat(teacher_id, student_id, &subject, now)?;
        self.metrics.record_chat_created();
        info!(chat_id = chat.id, teacher_id, student_id, "Created chat");
        Ok(chat)
    }

    /// Append a message from `sender` and bump the chat's recency
    pub fn send_message(&self, sender: &User, chat_id: i64, content: &str, now: DateTime<Utc>) -> Result<Message> {
        let content = InputValidator::sanitize_text(content);
        InputValidator::validate_message_content(&content)?;

        self.participant_chat(sender, chat_id)?;
        let message = self.db.insert_message(chat_id, sender.id, &content, now)?;

        self.metrics.record_message_sent();
        debug!(chat_id, message_id = message.id, sender_id = sender.id, "Message sent");
        Ok(message)
    }

    /// The caller's active chats, most recent first, with unread counts
    pub fn list_chats(&self, caller: &User) -> Result<Vec<ChatSummary>> {
        self.db
            .list_active_chats_for_user(caller.id)?
            .into_iter()
            .map(|chat| {
                let unread_count = self.db.count_unread_in_chat(chat.id, caller.id)?;
                Ok(ChatSummary { chat, unread_count })
            })
            .collect()
    }

    /// One page of a chat's messages, newest first
    pub fn get_messages(&self, caller: &User, chat_id: i64, page_request: PageRequest) -> Result<Page<Message>> {
        let (page, size) = InputValidator::validate_page(
            page_request.page,
            page_request.size,
            self.default_page_size,
            self.max_page_size,
        )?;
        self.participant_chat(caller, chat_id)?;

        let (content, total) = self.db.list_messages_page(chat_id, page, size)?;
        Ok(Page::new(content, page, size, total))
    }

    /// Mark everything the other participant sent as read
    pub fn mark_as_read(&self, caller: &User, chat_id: i64) -> Result<usize> {
        self.participant_chat(caller, chat_id)?;
        let updated = self.db.mark_messages_read(chat_id, caller.id)?;
        self.metrics.record_messages_read(updated);
        debug!(chat_id, reader_id = caller.id, updated, "Marked messages as read");
        Ok(updated)
    }

    /// Unread messages addressed to `caller` across all of their chats
    pub fn unread_count(&self, caller: &User) -> Result<u64> {
        self.db.count_unread_for_user(caller.id)
    }

    fn participant_chat(&self, user: &User, chat_id: i64) -> Result<Chat> {
        let chat = self
            .db
            .find_chat(chat_id)?
            .ok_or_else(|| NotebridgeError::not_found(format!("Chat not found with ID: {chat_id}")))?;
        if !chat.is_participant(user.id) {
            return Err(NotebridgeError::forbidden("You are not a participant in this chat"));
        }
        Ok(chat)
    }

    fn require_role(&self, user_id: i64, role: Role, label: &str) -> Result<User> {
        let user = self
            .db
            .find_user(user_id)?
            .ok_or_else(|| NotebridgeError::not_found(format!("{label} not found with ID: {user_id}")))?;
        if user.role != role {
            return Err(NotebridgeError::validation(format!(
                "User {user_id} is not a {}",
                label.to_lowercase()
            )));
        }
        Ok(user)
    }
}
