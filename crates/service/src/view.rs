#![forbid(unsafe_code)]

use crate::lifecycle::StatusChangeOutcome;
use fo_core::status::JobType;
use fo_core::transition::TransitionDecision;
use fo_storage::JobRow;
use serde_json::{Value, json};

/// Wire shape of a job row.
pub fn job_json(job: &JobRow) -> Value {
    json!({
        "id": job.id,
        "number": job.number,
        "status": job.status.as_str(),
        "title": job.title,
        "description": job.description,
        "priority": job.priority.as_str(),
        "job_type": job.job_type.map(JobType::as_str),
        "property_id": job.property_id,
        "customer_id": job.customer_id,
        "assigned_to": job.assigned_to,
        "scheduled_start_ms": job.scheduled_start_ms,
        "scheduled_end_ms": job.scheduled_end_ms,
        "actual_start_ms": job.actual_start_ms,
        "actual_end_ms": job.actual_end_ms,
        "total_amount_cents": job.total_amount_cents,
        "notes": job.notes,
        "created_by": job.created_by,
        "created_at_ms": job.created_at_ms,
        "updated_at_ms": job.updated_at_ms,
    })
}

pub fn decision_json(decision: &TransitionDecision) -> Value {
    json!({
        "allowed": decision.allowed,
        "reason": decision.reason,
        "required_fields": decision.required_fields,
        "warnings": decision.warnings,
    })
}

pub fn status_change_json(outcome: &StatusChangeOutcome) -> Value {
    json!({
        "applied": outcome.applied(),
        "decision": decision_json(&outcome.decision),
        "job": outcome.job.as_ref().map(job_json),
    })
}
