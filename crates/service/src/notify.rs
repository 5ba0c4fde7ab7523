#![forbid(unsafe_code)]

/// Emitted after a job is assigned to a user. Borrowed because sinks only
/// read it; implementations that queue must copy what they keep.
#[derive(Clone, Copy, Debug)]
pub struct JobAssignedNotice<'a> {
    pub job_id: &'a str,
    pub number: &'a str,
    pub title: &'a str,
    pub assigned_to: &'a str,
}

#[derive(Debug)]
pub struct NotifyError {
    pub message: String,
}

impl std::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "notification failed: {}", self.message)
    }
}

impl std::error::Error for NotifyError {}

/// Delivery boundary for assignment notifications. A failing sink never
/// fails the job operation that triggered it; the lifecycle logs and moves
/// on.
pub trait NotificationSink {
    fn job_assigned(&self, notice: &JobAssignedNotice<'_>) -> Result<(), NotifyError>;
}

/// Discards every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn job_assigned(&self, _notice: &JobAssignedNotice<'_>) -> Result<(), NotifyError> {
        Ok(())
    }
}
