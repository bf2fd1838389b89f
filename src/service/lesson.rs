use chrono::{DateTime, Utc};
use tracing::info;

use super::clean_optional;
use crate::db::Database;
use crate::error::{NotebridgeError, Result};
use crate::metrics::MetricsCollector;
use crate::models::{CreateLessonRequest, Lesson, LessonQuery, NewLesson, Role, UpdateLessonRequest, User};
use crate::validation::InputValidator;

/// Lesson scheduling, the active/cancelled lifecycle and ownership checks
#[derive(Clone)]
pub struct LessonService {
    db: Database,
    metrics: MetricsCollector,
}

impl LessonService {
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self {
            db,
            metrics: MetricsCollector::default(),
        }
    }

    /// All active lessons
    pub fn list_active(&self) -> Result<Vec<Lesson>> {
        self.db.list_lessons(&LessonQuery::active())
    }

    /// One active lesson. Cancelled lessons are reported as missing.
    pub fn get_active(&self, lesson_id: i64) -> Result<Lesson> {
        self.db
            .find_lesson(lesson_id)?
            .filter(|lesson| !lesson.is_cancelled)
            .ok_or_else(|| lesson_not_found(lesson_id))
    }

    /// Active lessons of one teacher
    pub fn list_by_teacher(&self, teacher_id: i64) -> Result<Vec<Lesson>> {
        let teacher = self
            .db
            .find_user(teacher_id)?
            .ok_or_else(|| NotebridgeError::not_found(format!("Teacher not found with ID: {teacher_id}")))?;
        if teacher.role != Role::Teacher {
            return Err(NotebridgeError::validation("User is not a teacher"));
        }
        self.db.list_lessons(&LessonQuery::active().teacher(teacher_id))
    }

    /// Active lessons starting after `now`
    pub fn list_upcoming(&self, now: DateTime<Utc>) -> Result<Vec<Lesson>> {
        self.db.list_lessons(&LessonQuery::active().starting_after(now))
    }

    /// A teacher's own lessons, cancelled included. Admins see everything.
    pub fn my_lessons(&self, caller: &User) -> Result<Vec<Lesson>> {
        match caller.role {
            Role::Admin => self.db.list_lessons(&LessonQuery::all()),
            Role::Teacher => self.db.list_lessons(&LessonQuery::all().teacher(caller.id)),
            Role::Student => Err(NotebridgeError::forbidden("Only teachers and admins have lessons")),
        }
    }

    /// Every lesson including cancelled ones, admin only
    pub fn list_all(&self, caller: &User) -> Result<Vec<Lesson>> {
        if !caller.is_admin() {
            return Err(NotebridgeError::forbidden("Admin access required"));
        }
        self.db.list_lessons(&LessonQuery::all())
    }

    /// Schedule a lesson.
    ///
    /// Teachers always create for themselves. Admins must name a
    /// `teacherId` that belongs to a teacher.
    pub fn create_lesson(&self, caller: &User, request: CreateLessonRequest, now: DateTime<Utc>) -> Result<Lesson> {
        let teacher_id = match caller.role {
            Role::Teacher => caller.id,
            Role::Admin => {
                let teacher_id = request
                    .teacher_id
                    .ok_or_else(|| NotebridgeError::validation("teacherId is required"))?;
                let teacher = self
                    .db
                    .find_user(teacher_id)?
                    .ok_or_else(|| NotebridgeError::not_found(format!("Teacher not found with ID: {teacher_id}")))?;
                if teacher.role != Role::Teacher {
                    return Err(NotebridgeError::validation("User is not a teacher"));
                }
                teacher_id
            }
            Role::Student => return Err(NotebridgeError::forbidden("Only teachers and admins can create lessons")),
        };

        let location = request
            .location
            .ok_or_else(|| NotebridgeError::validation("Location is required"))?;
        let start_time = request
            .start_time
            .ok_or_else(|| NotebridgeError::validation("Start time is required"))?;
        let end_time = request
            .end_time
            .ok_or_else(|| NotebridgeError::validation("End time is required"))?;
        InputValidator::validate_lesson_window(start_time, end_time, Some(now))?;

        let description = clean_optional(request.description);
        if let Some(description) = &description {
            InputValidator::validate_description(description)?;
        }

        let lesson = self.db.insert_lesson(&NewLesson {
            teacher_id,
            description,
            location,
            start_time,
            end_time,
            meeting_link: clean_optional(request.meeting_link),
            physical_address: clean_optional(request.physical_address),
        })?;

        self.metrics.record_lesson_transition("created");
        info!(lesson_id = lesson.id, teacher_id, created_by = caller.id, "Created lesson");
        Ok(lesson)
    }

    /// Partial update; only fields present in `request` change
    pub fn update_lesson(&self, caller: &User, lesson_id: i64, request: UpdateLessonRequest) -> Result<Lesson> {
        let mut lesson = self.load_for_mutation(caller, lesson_id)?;

        if request.description.is_some() {
            lesson.description = clean_optional(request.description);
            if let Some(description) = &lesson.description {
                InputValidator::validate_description(description)?;
            }
        }
        if let Some(location) = request.location {
            lesson.location = location;
        }
        if let Some(start_time) = request.start_time {
            lesson.start_time = start_time;
        }
        if let Some(end_time) = request.end_time {
            lesson.end_time = end_time;
        }
        if request.meeting_link.is_some() {
            lesson.meeting_link = clean_optional(request.meeting_link);
        }
        if request.physical_address.is_some() {
            lesson.physical_address = clean_optional(request.physical_address);
        }
        InputValidator::validate_lesson_window(lesson.start_time, lesson.end_time, None)?;

        let lesson = self.db.save_lesson(&lesson)?;
        self.metrics.record_lesson_transition("updated");
        info!(lesson_id, updated_by = caller.id, "Updated lesson");
        Ok(lesson)
    }

    /// Move an active lesson to cancelled
    pub fn cancel_lesson(&self, caller: &User, lesson_id: i64) -> Result<Lesson> {
        let mut lesson = self.load_for_mutation(caller, lesson_id)?;
        if lesson.is_cancelled {
            return Err(NotebridgeError::validation("Lesson is already cancelled"));
        }

        lesson.is_cancelled = true;
        let lesson = self.db.save_lesson(&lesson)?;
        self.metrics.record_lesson_transition("cancelled");
        info!(lesson_id, cancelled_by = caller.id, "Cancelled lesson");
        Ok(lesson)
    }

    /// Move a cancelled lesson back to active
    pub fn reactivate_lesson(&self, caller: &User, lesson_id: i64) -> Result<Lesson> {
        let mut lesson = self.load_for_mutation(caller, lesson_id)?;
        if !lesson.is_cancelled {
            return Err(NotebridgeError::validation("Lesson is already active"));
        }

        lesson.is_cancelled = false;
        let lesson = self.db.save_lesson(&lesson)?;
        self.metrics.record_lesson_transition("reactivated");
        info!(lesson_id, reactivated_by = caller.id, "Reactivated lesson");
        Ok(lesson)
    }

    /// Hard delete, admin only
    pub fn delete_lesson(&self, caller: &User, lesson_id: i64) -> Result<()> {
        if !caller.is_admin() {
            return Err(NotebridgeError::forbidden("Only admins can delete lessons"));
        }
        if self.db.delete_lesson(lesson_id)? == 0 {
            return Err(lesson_not_found(lesson_id));
        }

        self.metrics.record_lesson_transition("deleted");
        info!(lesson_id, deleted_by = caller.id, "Deleted lesson");
        Ok(())
    }

    /// Whether `caller` may attach files to the lesson
    pub fn ensure_can_modify(&self, caller: &User, lesson_id: i64) -> Result<()> {
        self.load_for_mutation(caller, lesson_id).map(|_| ())
    }

    fn load_for_mutation(&self, caller: &User, lesson_id: i64) -> Result<Lesson> {
        if !caller.can_manage_lessons() {
            return Err(NotebridgeError::forbidden("Only teachers and admins can modify lessons"));
        }

        let lesson = self.db.find_lesson(lesson_id)?.ok_or_else(|| lesson_not_found(lesson_id))?;
        if lesson.teacher_id != caller.id && !caller.is_admin() {
            return Err(NotebridgeError::forbidden("You can only modify your own lessons"));
        }
        Ok(lesson)
    }
}

fn lesson_not_found(lesson_id: i64) -> NotebridgeError {
    NotebridgeError::not_found(format!("Lesson not found with ID: {lesson_id}"))
}
