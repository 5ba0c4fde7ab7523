#![forbid(unsafe_code)]

/// Lifecycle status of a job. Exactly one at a time; transitions go through
/// the validator in [`crate::transition`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Quoted,
    Scheduled,
    InProgress,
    OnHold,
    Completed,
    Invoiced,
    Paid,
    Cancelled,
}

pub const ALL_JOB_STATUSES: &[JobStatus] = &[
    JobStatus::Quoted,
    JobStatus::Scheduled,
    JobStatus::InProgress,
    JobStatus::OnHold,
    JobStatus::Completed,
    JobStatus::Invoiced,
    JobStatus::Paid,
    JobStatus::Cancelled,
];

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Quoted => "quoted",
            JobStatus::Scheduled => "scheduled",
            JobStatus::InProgress => "in_progress",
            JobStatus::OnHold => "on_hold",
            JobStatus::Completed => "completed",
            JobStatus::Invoiced => "invoiced",
            JobStatus::Paid => "paid",
            JobStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Result<Self, StatusParseError> {
        match value.trim() {
            "quoted" => Ok(JobStatus::Quoted),
            "scheduled" => Ok(JobStatus::Scheduled),
            "in_progress" => Ok(JobStatus::InProgress),
            "on_hold" => Ok(JobStatus::OnHold),
            "completed" => Ok(JobStatus::Completed),
            "invoiced" => Ok(JobStatus::Invoiced),
            "paid" => Ok(JobStatus::Paid),
            "cancelled" => Ok(JobStatus::Cancelled),
            other => Err(StatusParseError {
                kind: "job status",
                value: other.to_string(),
            }),
        }
    }

    /// Terminal states accept no further transitions at all.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Paid | JobStatus::Cancelled)
    }

    /// Completed and cancelled jobs are locked for non-privileged edits.
    pub fn is_edit_locked(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Cancelled)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusParseError {
    pub kind: &'static str,
    pub value: String,
}

impl std::fmt::Display for StatusParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {}: {:?}", self.kind, self.value)
    }
}

impl std::error::Error for StatusParseError {}

/// Invoice lifecycle as seen by the validator. Owned by the invoicing
/// subsystem; only settlement matters here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvoiceStatus {
    Draft,
    Sent,
    PartiallyPaid,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::PartiallyPaid => "partially_paid",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Result<Self, StatusParseError> {
        match value.trim() {
            "draft" => Ok(InvoiceStatus::Draft),
            "sent" => Ok(InvoiceStatus::Sent),
            "partially_paid" => Ok(InvoiceStatus::PartiallyPaid),
            "paid" => Ok(InvoiceStatus::Paid),
            "overdue" => Ok(InvoiceStatus::Overdue),
            "cancelled" => Ok(InvoiceStatus::Cancelled),
            other => Err(StatusParseError {
                kind: "invoice status",
                value: other.to_string(),
            }),
        }
    }

    pub fn is_settled(self) -> bool {
        matches!(self, InvoiceStatus::Paid)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EstimateStatus {
    Draft,
    Sent,
    Accepted,
    Declined,
    Expired,
}

impl EstimateStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EstimateStatus::Draft => "draft",
            EstimateStatus::Sent => "sent",
            EstimateStatus::Accepted => "accepted",
            EstimateStatus::Declined => "declined",
            EstimateStatus::Expired => "expired",
        }
    }

    pub fn parse(value: &str) -> Result<Self, StatusParseError> {
        match value.trim() {
            "draft" => Ok(EstimateStatus::Draft),
            "sent" => Ok(EstimateStatus::Sent),
            "accepted" => Ok(EstimateStatus::Accepted),
            "declined" => Ok(EstimateStatus::Declined),
            "expired" => Ok(EstimateStatus::Expired),
            other => Err(StatusParseError {
                kind: "estimate status",
                value: other.to_string(),
            }),
        }
    }

    pub fn is_accepted(self) -> bool {
        matches!(self, EstimateStatus::Accepted)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl JobPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            JobPriority::Low => "low",
            JobPriority::Medium => "medium",
            JobPriority::High => "high",
            JobPriority::Urgent => "urgent",
        }
    }

    pub fn parse(value: &str) -> Result<Self, StatusParseError> {
        match value.trim() {
            "low" => Ok(JobPriority::Low),
            "medium" => Ok(JobPriority::Medium),
            "high" => Ok(JobPriority::High),
            "urgent" => Ok(JobPriority::Urgent),
            other => Err(StatusParseError {
                kind: "job priority",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobType {
    Service,
    Installation,
    Repair,
    Maintenance,
    Inspection,
    Consultation,
}

impl JobType {
    pub fn as_str(self) -> &'static str {
        match self {
            JobType::Service => "service",
            JobType::Installation => "installation",
            JobType::Repair => "repair",
            JobType::Maintenance => "maintenance",
            JobType::Inspection => "inspection",
            JobType::Consultation => "consultation",
        }
    }

    pub fn parse(value: &str) -> Result<Self, StatusParseError> {
        match value.trim() {
            "service" => Ok(JobType::Service),
            "installation" => Ok(JobType::Installation),
            "repair" => Ok(JobType::Repair),
            "maintenance" => Ok(JobType::Maintenance),
            "inspection" => Ok(JobType::Inspection),
            "consultation" => Ok(JobType::Consultation),
            other => Err(StatusParseError {
                kind: "job type",
                value: other.to_string(),
            }),
        }
    }
}
