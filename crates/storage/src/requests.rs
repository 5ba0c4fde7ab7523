#![forbid(unsafe_code)]

use fo_core::status::{EstimateStatus, InvoiceStatus, JobPriority, JobStatus, JobType};

#[derive(Clone, Debug)]
pub struct JobCreateRequest {
    pub title: String,
    pub description: Option<String>,
    pub priority: JobPriority,
    pub job_type: Option<JobType>,
    pub property_id: String,
    pub customer_id: Option<String>,
    pub assigned_to: Option<String>,
    pub scheduled_start_ms: Option<i64>,
    pub scheduled_end_ms: Option<i64>,
    pub total_amount_cents: i64,
    pub notes: Option<String>,
    pub created_by: String,
}

/// Partial update; `None` fields are left untouched.
#[derive(Clone, Debug, Default)]
pub struct JobUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<JobPriority>,
    pub job_type: Option<JobType>,
    pub assigned_to: Option<String>,
    pub scheduled_start_ms: Option<i64>,
    pub scheduled_end_ms: Option<i64>,
    pub total_amount_cents: Option<i64>,
    pub notes: Option<String>,
}

impl JobUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.job_type.is_none()
            && self.assigned_to.is_none()
            && self.scheduled_start_ms.is_none()
            && self.scheduled_end_ms.is_none()
            && self.total_amount_cents.is_none()
            && self.notes.is_none()
    }
}

/// Status write with its side effects. The decision to allow the transition
/// was already made by the validator; this only persists it.
#[derive(Clone, Debug)]
pub struct JobSetStatusRequest {
    pub status: JobStatus,
    /// Schedule supplied in the same request (counts toward scheduling
    /// preconditions and is persisted together with the status).
    pub scheduled_start_ms: Option<i64>,
    pub scheduled_end_ms: Option<i64>,
    /// Cancellation reason; appended to the job's notes.
    pub reason: Option<String>,
    pub actor_id: String,
}

#[derive(Clone, Debug)]
pub struct InvoiceAddRequest {
    pub job_id: String,
    pub status: InvoiceStatus,
    pub total_amount_cents: i64,
}

#[derive(Clone, Debug)]
pub struct EstimateAddRequest {
    pub job_id: String,
    pub status: EstimateStatus,
}

#[derive(Clone, Debug)]
pub struct TeamAssignmentAddRequest {
    pub job_id: String,
    pub user_id: String,
    pub role: String,
}
