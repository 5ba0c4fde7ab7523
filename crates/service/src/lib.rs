#![forbid(unsafe_code)]

mod error;
mod lifecycle;
mod notify;
mod payloads;
mod view;

pub use error::ServiceError;
pub use lifecycle::{CreateJobOutcome, JobLifecycle, RECURRENCE_BATCH, StatusChangeOutcome};
pub use notify::{JobAssignedNotice, NotificationSink, NotifyError, NullSink};
pub use payloads::{
    ChangeStatusPayload, CreateJobPayload, RecurrencePayload, UpdateJobPayload,
};
pub use view::{decision_json, job_json, status_change_json};
