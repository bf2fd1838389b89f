use metrics::{counter, histogram};
use std::time::Duration;

/// Metric names emitted by the services.
///
/// Recording goes through the `metrics` facade; with no recorder installed
/// every call is a no-op.
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    // File storage metrics
    pub uploads_total: &'static str,
    pub upload_duration: &'static str,
    pub upload_size_bytes: &'static str,
    pub upload_compensations_total: &'static str,
    pub retrievals_total: &'static str,

    // Chat metrics
    pub chats_created_total: &'static str,
    pub messages_sent_total: &'static str,
    pub messages_read_total: &'static str,

    // Lesson metrics
    pub lesson_transitions_total: &'static str,

    // Error metrics
    pub errors_total: &'static str,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self {
            uploads_total: "notebridge_uploads_total",
            upload_duration: "notebridge_upload_duration_seconds",
            upload_size_bytes: "notebridge_upload_size_bytes",
            upload_compensations_total: "notebridge_upload_compensations_total",
            retrievals_total: "notebridge_file_retrievals_total",

            chats_created_total: "notebridge_chats_created_total",
            messages_sent_total: "notebridge_messages_sent_total",
            messages_read_total: "notebridge_messages_read_total",

            lesson_transitions_total: "notebridge_lesson_transitions_total",

            errors_total: "notebridge_errors_total",
        }
    }
}

const fn status(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "error"
    }
}

impl MetricsCollector {
    /// Record one upload attempt of the given owner kind
    pub fn record_upload(&self, kind: &'static str, size_bytes: usize, duration: Duration, success: bool) {
        counter!(self.uploads_total, "kind" => kind, "status" => status(success)).increment(1);
        histogram!(self.upload_duration, "kind" => kind).record(duration.as_secs_f64());
        if success {
            histogram!(self.upload_size_bytes, "kind" => kind).record(size_bytes as f64);
        }
    }

    /// Record the outcome of each cleanup step after a failed metadata write
    pub fn record_compensation(&self, blob_deleted: bool, row_deleted: bool) {
        counter!(self.upload_compensations_total, "step" => "blob", "status" => status(blob_deleted)).increment(1);
        counter!(self.upload_compensations_total, "step" => "metadata", "status" => status(row_deleted)).increment(1);
    }

    /// Record a file retrieval
    pub fn record_retrieval(&self, success: bool) {
        counter!(self.retrievals_total, "status" => status(success)).increment(1);
    }

    /// Record a newly created chat
    pub fn record_chat_created(&self) {
        counter!(self.chats_created_total).increment(1);
    }

    /// Record a message append
    pub fn record_message_sent(&self) {
        counter!(self.messages_sent_total).increment(1);
    }

    /// Record messages flipped to read
    pub fn record_messages_read(&self, count: usize) {
        counter!(self.messages_read_total).increment(count as u64);
    }

    /// Record a lesson state change (`created`, `cancelled`, `reactivated`, ...)
    pub fn record_lesson_transition(&self, action: &'static str) {
        counter!(self.lesson_transitions_total, "action" => action).increment(1);
    }

    /// Record a server-side error reported to a client
    pub fn record_error(&self, kind: &'static str) {
        counter!(self.errors_total, "kind" => kind).increment(1);
    }
}
