#![forbid(unsafe_code)]

use crate::StoreError;
use fo_core::status::{EstimateStatus, InvoiceStatus, JobPriority, JobStatus, JobType};
use fo_core::transition::{EstimateSummary, InvoiceSummary, TransitionContext};

#[derive(Clone, Debug)]
pub struct JobRow {
    pub id: String,
    pub number: String,
    pub status: JobStatus,
    pub title: String,
    pub description: Option<String>,
    pub priority: JobPriority,
    pub job_type: Option<JobType>,
    pub property_id: String,
    pub customer_id: Option<String>,
    pub assigned_to: Option<String>,
    pub scheduled_start_ms: Option<i64>,
    pub scheduled_end_ms: Option<i64>,
    pub actual_start_ms: Option<i64>,
    pub actual_end_ms: Option<i64>,
    pub total_amount_cents: i64,
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug)]
pub struct InvoiceRow {
    pub id: String,
    pub job_id: String,
    pub status: InvoiceStatus,
    pub total_amount_cents: i64,
    pub created_at_ms: i64,
}

#[derive(Clone, Debug)]
pub struct EstimateRow {
    pub id: String,
    pub job_id: String,
    pub status: EstimateStatus,
    pub created_at_ms: i64,
}

#[derive(Clone, Debug)]
pub struct TeamAssignmentRow {
    pub id: String,
    pub job_id: String,
    pub user_id: String,
    pub role: String,
    pub assigned_at_ms: i64,
}

#[derive(Clone, Debug)]
pub struct AuditEventRow {
    pub seq: i64,
    pub job_id: String,
    pub ts_ms: i64,
    pub action: String,
    pub actor_id: Option<String>,
    pub meta_json: Option<String>,
}

/// A job plus the related collections the transition validator reads.
#[derive(Clone, Debug)]
pub struct JobDetail {
    pub job: JobRow,
    pub invoices: Vec<InvoiceRow>,
    pub estimates: Vec<EstimateRow>,
    pub team_assignments: Vec<TeamAssignmentRow>,
}

impl JobDetail {
    /// Assemble the validator's read-only context from the persisted state.
    pub fn transition_context(&self) -> TransitionContext {
        TransitionContext {
            scheduled_start_ms: self.job.scheduled_start_ms,
            scheduled_end_ms: self.job.scheduled_end_ms,
            assigned_to: self.job.assigned_to.clone(),
            customer_id: self.job.customer_id.clone(),
            property_id: Some(self.job.property_id.clone()),
            total_amount_cents: self.job.total_amount_cents,
            invoices: self
                .invoices
                .iter()
                .map(|i| InvoiceSummary {
                    status: i.status,
                    total_amount_cents: i.total_amount_cents,
                })
                .collect(),
            estimates: self
                .estimates
                .iter()
                .map(|e| EstimateSummary { status: e.status })
                .collect(),
            team_assignments: self
                .team_assignments
                .iter()
                .map(|t| t.user_id.clone())
                .collect(),
        }
    }
}

/// Raw column values as sqlite hands them over; statuses are still strings.
/// Split from [`JobRow`] so enum parsing can fail into [`StoreError`] instead
/// of being shoehorned into `rusqlite::Error`.
pub(crate) struct RawJobRow {
    pub id: String,
    pub number: String,
    pub status: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub job_type: Option<String>,
    pub property_id: String,
    pub customer_id: Option<String>,
    pub assigned_to: Option<String>,
    pub scheduled_start_ms: Option<i64>,
    pub scheduled_end_ms: Option<i64>,
    pub actual_start_ms: Option<i64>,
    pub actual_end_ms: Option<i64>,
    pub total_amount_cents: i64,
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

/// Column order shared by every job SELECT in this crate.
pub(crate) const JOB_COLUMNS: &str = "id, number, status, title, description, priority, job_type, \
     property_id, customer_id, assigned_to, scheduled_start_ms, scheduled_end_ms, \
     actual_start_ms, actual_end_ms, total_amount_cents, notes, created_by, \
     created_at_ms, updated_at_ms";

pub(crate) fn read_raw_job_row(row: &rusqlite::Row<'_>) -> Result<RawJobRow, rusqlite::Error> {
    Ok(RawJobRow {
        id: row.get(0)?,
        number: row.get(1)?,
        status: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        priority: row.get(5)?,
        job_type: row.get(6)?,
        property_id: row.get(7)?,
        customer_id: row.get(8)?,
        assigned_to: row.get(9)?,
        scheduled_start_ms: row.get(10)?,
        scheduled_end_ms: row.get(11)?,
        actual_start_ms: row.get(12)?,
        actual_end_ms: row.get(13)?,
        total_amount_cents: row.get(14)?,
        notes: row.get(15)?,
        created_by: row.get(16)?,
        created_at_ms: row.get(17)?,
        updated_at_ms: row.get(18)?,
    })
}

impl RawJobRow {
    pub(crate) fn into_job(self) -> Result<JobRow, StoreError> {
        Ok(JobRow {
            status: JobStatus::parse(&self.status)?,
            priority: JobPriority::parse(&self.priority)?,
            job_type: self.job_type.as_deref().map(JobType::parse).transpose()?,
            id: self.id,
            number: self.number,
            title: self.title,
            description: self.description,
            property_id: self.property_id,
            customer_id: self.customer_id,
            assigned_to: self.assigned_to,
            scheduled_start_ms: self.scheduled_start_ms,
            scheduled_end_ms: self.scheduled_end_ms,
            actual_start_ms: self.actual_start_ms,
            actual_end_ms: self.actual_end_ms,
            total_amount_cents: self.total_amount_cents,
            notes: self.notes,
            created_by: self.created_by,
            created_at_ms: self.created_at_ms,
            updated_at_ms: self.updated_at_ms,
        })
    }
}
