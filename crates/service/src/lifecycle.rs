#![forbid(unsafe_code)]

use crate::error::ServiceError;
use crate::notify::{JobAssignedNotice, NotificationSink};
use crate::payloads::{ChangeStatusPayload, CreateJobPayload, UpdateJobPayload};
use fo_core::access::{Actor, Capability};
use fo_core::ids::CompanyId;
use fo_core::recurrence::{
    OccurrenceSlot, RecurrenceExpansion, RecurrenceInterval, RecurrenceRule, RecurrenceSeed,
};
use fo_core::status::{JobPriority, JobStatus, JobType};
use fo_core::transition::{TransitionDecision, validate_transition};
use fo_storage::{
    AuditEventRow, JobCreateRequest, JobDetail, JobRow, JobSetStatusRequest, JobUpdateRequest,
    SqliteStore,
};
use tracing::{info, warn};

/// Occurrences are persisted in chunks of this size, one transaction per
/// chunk. A failure mid-series rolls back the seed and every occurrence
/// already written; there is no atomicity guarantee across chunks beyond
/// that compensation.
pub const RECURRENCE_BATCH: usize = 10;

pub struct CreateJobOutcome {
    pub seed: JobRow,
    pub occurrences: Vec<JobRow>,
}

/// Result of a status change request. A disallowed transition is a normal
/// outcome, not an error: the decision explains the rejection and `job` is
/// `None`.
#[derive(Debug)]
pub struct StatusChangeOutcome {
    pub decision: TransitionDecision,
    pub job: Option<JobRow>,
}

impl StatusChangeOutcome {
    pub fn applied(&self) -> bool {
        self.job.is_some()
    }
}

/// Orchestrates job operations over the store: capability checks, transition
/// validation, recurrence expansion, and notification dispatch.
pub struct JobLifecycle<S: NotificationSink> {
    store: SqliteStore,
    sink: S,
}

impl<S: NotificationSink> JobLifecycle<S> {
    pub fn new(store: SqliteStore, sink: S) -> Self {
        Self { store, sink }
    }

    /// Direct store access for relation setup and inspection.
    pub fn store(&mut self) -> &mut SqliteStore {
        &mut self.store
    }

    /// Create a job, expanding its recurrence rule into sibling jobs when one
    /// is present. The seed is occurrence 1; generated occurrences carry
    /// `(k/n)` title suffixes and shifted schedules.
    pub fn create_job(
        &mut self,
        actor: &Actor,
        payload: CreateJobPayload,
    ) -> Result<CreateJobOutcome, ServiceError> {
        require(actor, Capability::ManageJobs)?;
        let company = company_of(actor)?;

        let priority = match payload.priority.as_deref() {
            Some(raw) => JobPriority::parse(raw)?,
            None => JobPriority::Medium,
        };
        let job_type = payload
            .job_type
            .as_deref()
            .map(JobType::parse)
            .transpose()?;

        let seed = self.store.job_create(
            &company,
            JobCreateRequest {
                title: payload.title,
                description: payload.description,
                priority,
                job_type,
                property_id: payload.property_id,
                customer_id: payload.customer_id,
                assigned_to: payload.assigned_to,
                scheduled_start_ms: payload.scheduled_start_ms,
                scheduled_end_ms: payload.scheduled_end_ms,
                total_amount_cents: payload.total_amount_cents,
                notes: payload.notes,
                created_by: actor.user_id.clone(),
            },
        )?;
        info!(job_id = %seed.id, number = %seed.number, "job created");

        let mut occurrences = Vec::new();
        if let Some(recurrence) = payload.recurrence {
            let rule = RecurrenceRule {
                interval: RecurrenceInterval::parse(&recurrence.interval),
                end_date_ms: recurrence.end_date_ms,
                count: recurrence.count,
            };
            let slots: Vec<OccurrenceSlot> = RecurrenceExpansion::new(
                &RecurrenceSeed {
                    title: seed.title.clone(),
                    scheduled_start_ms: seed.scheduled_start_ms,
                    scheduled_end_ms: seed.scheduled_end_ms,
                },
                &rule,
            )
            .collect();

            for chunk in slots.chunks(RECURRENCE_BATCH) {
                match self.store.job_insert_occurrences(&company, &seed.id, chunk) {
                    Ok(mut batch) => occurrences.append(&mut batch),
                    Err(err) => {
                        warn!(seed_id = %seed.id, error = %err, "recurrence batch failed, rolling back series");
                        self.rollback_series(&company, &seed, &occurrences);
                        return Err(err.into());
                    }
                }
            }
            info!(seed_id = %seed.id, occurrences = occurrences.len(), "recurrence expanded");
        }

        if let Some(assignee) = seed.assigned_to.as_deref()
            && assignee != actor.user_id
        {
            self.notify_assigned(&seed, assignee);
        }

        Ok(CreateJobOutcome { seed, occurrences })
    }

    fn rollback_series(&mut self, company: &CompanyId, seed: &JobRow, created: &[JobRow]) {
        for job in created.iter().chain(std::iter::once(seed)) {
            if let Err(err) = self.store.job_delete(company, &job.id) {
                warn!(job_id = %job.id, error = %err, "rollback delete failed");
            }
        }
    }

    fn notify_assigned(&self, job: &JobRow, assignee: &str) {
        let notice = JobAssignedNotice {
            job_id: &job.id,
            number: &job.number,
            title: &job.title,
            assigned_to: assignee,
        };
        if let Err(err) = self.sink.job_assigned(&notice) {
            warn!(job_id = %job.id, error = %err, "assignment notification failed");
        }
    }

    pub fn job(&mut self, actor: &Actor, job_id: &str) -> Result<JobDetail, ServiceError> {
        require(actor, Capability::ViewJobs)?;
        let company = company_of(actor)?;
        Ok(self.store.job_detail(&company, job_id)?)
    }

    pub fn audit(
        &mut self,
        actor: &Actor,
        job_id: &str,
        limit: usize,
    ) -> Result<Vec<AuditEventRow>, ServiceError> {
        require(actor, Capability::ViewJobs)?;
        let company = company_of(actor)?;
        Ok(self.store.audit_tail(&company, job_id, limit)?)
    }

    /// Request a status transition. The validator decides; a rejection comes
    /// back as data so the caller can show the reason and missing fields.
    pub fn change_status(
        &mut self,
        actor: &Actor,
        job_id: &str,
        payload: ChangeStatusPayload,
    ) -> Result<StatusChangeOutcome, ServiceError> {
        require(actor, Capability::ManageJobs)?;
        let company = company_of(actor)?;
        let requested = JobStatus::parse(&payload.status)?;

        let detail = self.store.job_detail(&company, job_id)?;
        if detail.job.status.is_edit_locked() && !actor.can(Capability::EditLockedJob) {
            return Err(ServiceError::Forbidden("edit_locked_job"));
        }

        let mut ctx = detail.transition_context();
        ctx.scheduled_start_ms = payload.scheduled_start_ms.or(ctx.scheduled_start_ms);
        ctx.scheduled_end_ms = payload.scheduled_end_ms.or(ctx.scheduled_end_ms);

        let decision = validate_transition(detail.job.status, requested, &ctx);
        if !decision.allowed {
            info!(
                job_id,
                from = detail.job.status.as_str(),
                to = requested.as_str(),
                reason = decision.reason.as_deref().unwrap_or(""),
                "transition rejected"
            );
            return Ok(StatusChangeOutcome {
                decision,
                job: None,
            });
        }

        let job = self.store.job_set_status(
            &company,
            job_id,
            JobSetStatusRequest {
                status: requested,
                scheduled_start_ms: payload.scheduled_start_ms,
                scheduled_end_ms: payload.scheduled_end_ms,
                reason: payload.reason,
                actor_id: actor.user_id.clone(),
            },
        )?;
        info!(
            job_id,
            from = detail.job.status.as_str(),
            to = requested.as_str(),
            warnings = decision.warnings.len(),
            "transition applied"
        );

        Ok(StatusChangeOutcome {
            decision,
            job: Some(job),
        })
    }

    pub fn update_job(
        &mut self,
        actor: &Actor,
        job_id: &str,
        payload: UpdateJobPayload,
    ) -> Result<JobRow, ServiceError> {
        require(actor, Capability::ManageJobs)?;
        let company = company_of(actor)?;
        if payload.is_empty() {
            return Err(ServiceError::Validation("no fields to update".to_string()));
        }

        let Some(current) = self.store.job_get(&company, job_id)? else {
            return Err(ServiceError::NotFound);
        };
        if current.status.is_edit_locked() && !actor.can(Capability::EditLockedJob) {
            return Err(ServiceError::Forbidden("edit_locked_job"));
        }

        let priority = payload
            .priority
            .as_deref()
            .map(JobPriority::parse)
            .transpose()?;
        let job_type = payload
            .job_type
            .as_deref()
            .map(JobType::parse)
            .transpose()?;

        Ok(self.store.job_update(
            &company,
            job_id,
            JobUpdateRequest {
                title: payload.title,
                description: payload.description,
                priority,
                job_type,
                assigned_to: payload.assigned_to,
                scheduled_start_ms: payload.scheduled_start_ms,
                scheduled_end_ms: payload.scheduled_end_ms,
                total_amount_cents: payload.total_amount_cents,
                notes: payload.notes,
            },
        )?)
    }

    /// Schedule shorthand: a `quoted -> scheduled` transition carrying the
    /// window in the same request.
    pub fn schedule_job(
        &mut self,
        actor: &Actor,
        job_id: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<StatusChangeOutcome, ServiceError> {
        self.change_status(
            actor,
            job_id,
            ChangeStatusPayload {
                status: JobStatus::Scheduled.as_str().to_string(),
                scheduled_start_ms: Some(start_ms),
                scheduled_end_ms: Some(end_ms),
                reason: None,
            },
        )
    }

    pub fn assign_job(
        &mut self,
        actor: &Actor,
        job_id: &str,
        user_id: &str,
    ) -> Result<JobRow, ServiceError> {
        require(actor, Capability::ManageJobs)?;
        let company = company_of(actor)?;
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(ServiceError::Validation(
                "assignee must not be empty".to_string(),
            ));
        }

        let Some(current) = self.store.job_get(&company, job_id)? else {
            return Err(ServiceError::NotFound);
        };
        if current.status.is_edit_locked() && !actor.can(Capability::EditLockedJob) {
            return Err(ServiceError::Forbidden("edit_locked_job"));
        }

        let job = self.store.job_update(
            &company,
            job_id,
            JobUpdateRequest {
                assigned_to: Some(user_id.to_string()),
                ..JobUpdateRequest::default()
            },
        )?;
        self.notify_assigned(&job, user_id);
        Ok(job)
    }

    pub fn cancel_job(
        &mut self,
        actor: &Actor,
        job_id: &str,
        reason: Option<String>,
    ) -> Result<StatusChangeOutcome, ServiceError> {
        self.change_status(
            actor,
            job_id,
            ChangeStatusPayload {
                status: JobStatus::Cancelled.as_str().to_string(),
                scheduled_start_ms: None,
                scheduled_end_ms: None,
                reason,
            },
        )
    }
}

fn require(actor: &Actor, capability: Capability) -> Result<(), ServiceError> {
    if actor.can(capability) {
        return Ok(());
    }
    Err(ServiceError::Forbidden(match capability {
        Capability::ViewJobs => "view_jobs",
        Capability::ManageJobs => "manage_jobs",
        Capability::EditLockedJob => "edit_locked_job",
    }))
}

fn company_of(actor: &Actor) -> Result<CompanyId, ServiceError> {
    Ok(CompanyId::try_new(actor.company_id.clone())?)
}
