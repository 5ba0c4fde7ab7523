#![forbid(unsafe_code)]

use crate::status::{EstimateStatus, InvoiceStatus, JobStatus};

/// Read-only bundle the validator decides over. Assembled by the caller from
/// the job row and its related collections; the validator never touches
/// storage itself.
#[derive(Clone, Debug, Default)]
pub struct TransitionContext {
    pub scheduled_start_ms: Option<i64>,
    pub scheduled_end_ms: Option<i64>,
    pub assigned_to: Option<String>,
    pub customer_id: Option<String>,
    pub property_id: Option<String>,
    pub total_amount_cents: i64,
    pub invoices: Vec<InvoiceSummary>,
    pub estimates: Vec<EstimateSummary>,
    pub team_assignments: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct InvoiceSummary {
    pub status: InvoiceStatus,
    pub total_amount_cents: i64,
}

#[derive(Clone, Debug)]
pub struct EstimateSummary {
    pub status: EstimateStatus,
}

/// Outcome of a single transition request. Warnings are advisory and never
/// block; `required_fields` is populated only when the rejection is "missing
/// data" rather than "wrong order".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionDecision {
    pub allowed: bool,
    pub reason: Option<String>,
    pub required_fields: Vec<&'static str>,
    pub warnings: Vec<String>,
}

impl TransitionDecision {
    fn allow(warnings: Vec<String>) -> Self {
        Self {
            allowed: true,
            reason: None,
            required_fields: Vec::new(),
            warnings,
        }
    }

    fn reject(reason: String) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            required_fields: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn missing(reason: String, required_fields: Vec<&'static str>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            required_fields,
            warnings: Vec::new(),
        }
    }
}

/// Allowed-edge table, kept as data so it can be audited and tested on its
/// own. `on_hold` returns to whichever state it was entered from; the caller
/// tracks that prior state and passes it back as `current`.
pub fn allowed_targets(from: JobStatus) -> &'static [JobStatus] {
    match from {
        JobStatus::Quoted => &[
            JobStatus::Scheduled,
            JobStatus::InProgress,
            JobStatus::Cancelled,
        ],
        JobStatus::Scheduled => &[
            JobStatus::InProgress,
            JobStatus::OnHold,
            JobStatus::Cancelled,
        ],
        JobStatus::InProgress => &[
            JobStatus::Completed,
            JobStatus::OnHold,
            JobStatus::Cancelled,
        ],
        JobStatus::OnHold => &[
            JobStatus::Scheduled,
            JobStatus::InProgress,
            JobStatus::Cancelled,
        ],
        JobStatus::Completed => &[JobStatus::Invoiced],
        JobStatus::Invoiced => &[JobStatus::Paid, JobStatus::Cancelled],
        JobStatus::Paid => &[],
        JobStatus::Cancelled => &[],
    }
}

pub fn edge_exists(from: JobStatus, to: JobStatus) -> bool {
    allowed_targets(from).contains(&to)
}

/// Decide whether `current -> requested` is a legal transition under `ctx`.
///
/// Pure and deterministic: retrying with the same inputs yields the same
/// decision. The caller persists the new status and surfaces warnings.
pub fn validate_transition(
    current: JobStatus,
    requested: JobStatus,
    ctx: &TransitionContext,
) -> TransitionDecision {
    if current == requested {
        return TransitionDecision::reject(format!(
            "job is already {}",
            current.as_str()
        ));
    }

    if !edge_exists(current, requested) {
        return TransitionDecision::reject(format!(
            "transition not allowed from {} to {}",
            current.as_str(),
            requested.as_str()
        ));
    }

    let mut warnings = Vec::new();

    match (current, requested) {
        (JobStatus::Quoted, JobStatus::Scheduled) => {
            let mut missing = Vec::new();
            if ctx.scheduled_start_ms.is_none() {
                missing.push("scheduled_start");
            }
            if ctx.scheduled_end_ms.is_none() {
                missing.push("scheduled_end");
            }
            if !missing.is_empty() {
                return TransitionDecision::missing(
                    "job must have a start and end time before scheduling".to_string(),
                    missing,
                );
            }
        }
        (_, JobStatus::InProgress) => {
            if ctx.assigned_to.is_none() {
                return TransitionDecision::missing(
                    "job must be assigned before starting".to_string(),
                    vec!["assigned_to"],
                );
            }
        }
        (JobStatus::InProgress, JobStatus::Completed) => {
            if ctx.team_assignments.is_empty() {
                warnings.push("no team assignments recorded for this job".to_string());
            }
        }
        (JobStatus::Completed, JobStatus::Invoiced) => {
            // Intentionally permissive: zero totals and missing estimates warn
            // but do not block.
            if ctx.total_amount_cents == 0 {
                warnings.push("job total amount is zero".to_string());
            }
            if !ctx.estimates.iter().any(|e| e.status.is_accepted()) {
                warnings.push("no accepted estimate on record".to_string());
            }
            if ctx.invoices.is_empty() {
                warnings.push("no invoice exists yet but status is invoiced".to_string());
            }
        }
        _ => {}
    }

    if requested == JobStatus::Paid
        && !ctx.invoices.iter().any(|i| i.status.is_settled())
    {
        return TransitionDecision::missing(
            "job cannot be marked paid without a settled invoice".to_string(),
            vec!["invoice payment"],
        );
    }

    TransitionDecision::allow(warnings)
}
