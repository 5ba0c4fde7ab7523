#![forbid(unsafe_code)]

use serde::Deserialize;

/// Inbound job creation. Enum-like fields arrive as strings from the wire
/// and are parsed at the service boundary.
#[derive(Clone, Debug, Deserialize)]
pub struct CreateJobPayload {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
    pub property_id: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub scheduled_start_ms: Option<i64>,
    #[serde(default)]
    pub scheduled_end_ms: Option<i64>,
    #[serde(default)]
    pub total_amount_cents: i64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub recurrence: Option<RecurrencePayload>,
}

/// Recurrence settings on a create request. An unrecognized interval is
/// treated as monthly rather than rejected.
#[derive(Clone, Debug, Deserialize)]
pub struct RecurrencePayload {
    pub interval: String,
    #[serde(default)]
    pub end_date_ms: Option<i64>,
    #[serde(default)]
    pub count: Option<u32>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChangeStatusPayload {
    pub status: String,
    /// Schedule supplied together with the status change; counts toward the
    /// scheduling preconditions before it is persisted.
    #[serde(default)]
    pub scheduled_start_ms: Option<i64>,
    #[serde(default)]
    pub scheduled_end_ms: Option<i64>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateJobPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub scheduled_start_ms: Option<i64>,
    #[serde(default)]
    pub scheduled_end_ms: Option<i64>,
    #[serde(default)]
    pub total_amount_cents: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl UpdateJobPayload {
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
