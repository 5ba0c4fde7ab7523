#![forbid(unsafe_code)]

use crate::audit::insert_audit_event_tx;
use crate::numbers::{next_job_number_tx, year_of_ms};
use crate::rows::{JOB_COLUMNS, RawJobRow, read_raw_job_row};
use crate::{
    JobCreateRequest, JobDetail, JobRow, JobSetStatusRequest, JobUpdateRequest, SqliteStore,
    StoreError, ensure_company_tx, next_counter_tx, now_ms,
};
use fo_core::ids::CompanyId;
use fo_core::recurrence::OccurrenceSlot;
use fo_core::status::{JobPriority, JobStatus, JobType};
use rusqlite::{OptionalExtension, Transaction, params};
use serde_json::{Map as JsonMap, Value as JsonValue};

const MAX_JOB_TITLE_LEN: usize = 200;
const MAX_NOTES_LEN: usize = 20_000;

fn normalize_title(raw: &str) -> Result<String, StoreError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(StoreError::InvalidInput("job.title must not be empty"));
    }
    Ok(raw.chars().take(MAX_JOB_TITLE_LEN).collect())
}

fn normalize_money(cents: i64) -> Result<i64, StoreError> {
    if cents < 0 {
        return Err(StoreError::InvalidInput(
            "money amounts must not be negative",
        ));
    }
    Ok(cents)
}

fn normalize_property_id(raw: &str) -> Result<String, StoreError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(StoreError::InvalidInput("job.property_id must not be empty"));
    }
    Ok(raw.to_string())
}

fn opt_trimmed(raw: Option<String>) -> Option<String> {
    raw.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

struct NewJob {
    title: String,
    description: Option<String>,
    status: JobStatus,
    priority: JobPriority,
    job_type: Option<JobType>,
    property_id: String,
    customer_id: Option<String>,
    assigned_to: Option<String>,
    scheduled_start_ms: Option<i64>,
    scheduled_end_ms: Option<i64>,
    total_amount_cents: i64,
    notes: Option<String>,
    created_by: String,
}

fn insert_job_tx(
    tx: &Transaction<'_>,
    company: &str,
    new_job: &NewJob,
    now_ms: i64,
) -> Result<JobRow, StoreError> {
    let id_seq = next_counter_tx(tx, company, "job_ids")?;
    let id = format!("job_{id_seq:06}");
    let number = next_job_number_tx(tx, company, year_of_ms(now_ms), now_ms)?;

    tx.execute(
        r#"
        INSERT INTO jobs(
          company, id, number, status, title, description, priority, job_type,
          property_id, customer_id, assigned_to, scheduled_start_ms, scheduled_end_ms,
          actual_start_ms, actual_end_ms, total_amount_cents, notes, created_by,
          created_at_ms, updated_at_ms
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
        "#,
        params![
            company,
            id.as_str(),
            number.as_str(),
            new_job.status.as_str(),
            new_job.title,
            new_job.description,
            new_job.priority.as_str(),
            new_job.job_type.map(JobType::as_str),
            new_job.property_id,
            new_job.customer_id,
            new_job.assigned_to,
            new_job.scheduled_start_ms,
            new_job.scheduled_end_ms,
            Option::<i64>::None,
            Option::<i64>::None,
            new_job.total_amount_cents,
            new_job.notes,
            new_job.created_by,
            now_ms,
            now_ms,
        ],
    )?;

    let mut meta = JsonMap::<String, JsonValue>::new();
    meta.insert("number".to_string(), JsonValue::String(number.clone()));
    meta.insert(
        "title".to_string(),
        JsonValue::String(new_job.title.clone()),
    );
    insert_audit_event_tx(
        tx,
        company,
        &id,
        now_ms,
        "created",
        Some(&new_job.created_by),
        Some(JsonValue::Object(meta).to_string()),
    )?;

    Ok(JobRow {
        id,
        number,
        status: new_job.status,
        title: new_job.title.clone(),
        description: new_job.description.clone(),
        priority: new_job.priority,
        job_type: new_job.job_type,
        property_id: new_job.property_id.clone(),
        customer_id: new_job.customer_id.clone(),
        assigned_to: new_job.assigned_to.clone(),
        scheduled_start_ms: new_job.scheduled_start_ms,
        scheduled_end_ms: new_job.scheduled_end_ms,
        actual_start_ms: None,
        actual_end_ms: None,
        total_amount_cents: new_job.total_amount_cents,
        notes: new_job.notes.clone(),
        created_by: new_job.created_by.clone(),
        created_at_ms: now_ms,
        updated_at_ms: now_ms,
    })
}

fn job_row_tx(
    tx: &Transaction<'_>,
    company: &str,
    id: &str,
) -> Result<Option<JobRow>, StoreError> {
    let raw: Option<RawJobRow> = tx
        .query_row(
            &format!("SELECT {JOB_COLUMNS} FROM jobs WHERE company=?1 AND id=?2"),
            params![company, id],
            read_raw_job_row,
        )
        .optional()?;
    raw.map(RawJobRow::into_job).transpose()
}

impl SqliteStore {
    /// Create the seed job. New jobs always start life as `quoted`.
    pub fn job_create(
        &mut self,
        company: &CompanyId,
        request: JobCreateRequest,
    ) -> Result<JobRow, StoreError> {
        let now_ms = now_ms();
        let new_job = NewJob {
            title: normalize_title(&request.title)?,
            description: opt_trimmed(request.description),
            status: JobStatus::Quoted,
            priority: request.priority,
            job_type: request.job_type,
            property_id: normalize_property_id(&request.property_id)?,
            customer_id: opt_trimmed(request.customer_id),
            assigned_to: opt_trimmed(request.assigned_to),
            scheduled_start_ms: request.scheduled_start_ms,
            scheduled_end_ms: request.scheduled_end_ms,
            total_amount_cents: normalize_money(request.total_amount_cents)?,
            notes: opt_trimmed(request.notes),
            created_by: request.created_by,
        };

        let tx = self.conn.transaction()?;
        ensure_company_tx(&tx, company, now_ms)?;
        let job = insert_job_tx(&tx, company.as_str(), &new_job, now_ms)?;
        tx.commit()?;
        Ok(job)
    }

    /// Persist one batch of recurrence occurrences as siblings of the seed.
    ///
    /// Each occurrence is an independent job: own id, own number, shifted
    /// schedule, suffixed title. One transaction per call; the orchestrator
    /// chunks calls, and there is no atomicity across chunks.
    pub fn job_insert_occurrences(
        &mut self,
        company: &CompanyId,
        seed_id: &str,
        slots: &[OccurrenceSlot],
    ) -> Result<Vec<JobRow>, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        let Some(seed) = job_row_tx(&tx, company.as_str(), seed_id)? else {
            return Err(StoreError::UnknownId);
        };

        let mut created = Vec::with_capacity(slots.len());
        for slot in slots {
            let new_job = NewJob {
                title: normalize_title(&slot.title)?,
                description: seed.description.clone(),
                status: seed.status,
                priority: seed.priority,
                job_type: seed.job_type,
                property_id: seed.property_id.clone(),
                customer_id: seed.customer_id.clone(),
                assigned_to: seed.assigned_to.clone(),
                scheduled_start_ms: Some(slot.scheduled_start_ms),
                scheduled_end_ms: slot.scheduled_end_ms,
                total_amount_cents: seed.total_amount_cents,
                notes: seed.notes.clone(),
                created_by: seed.created_by.clone(),
            };
            created.push(insert_job_tx(&tx, company.as_str(), &new_job, now_ms)?);
        }

        tx.commit()?;
        Ok(created)
    }

    pub fn job_get(
        &mut self,
        company: &CompanyId,
        id: &str,
    ) -> Result<Option<JobRow>, StoreError> {
        let tx = self.conn.transaction()?;
        let job = job_row_tx(&tx, company.as_str(), id)?;
        tx.commit()?;
        Ok(job)
    }

    pub fn job_get_by_number(
        &mut self,
        company: &CompanyId,
        number: &str,
    ) -> Result<Option<JobRow>, StoreError> {
        let raw: Option<RawJobRow> = self
            .conn
            .query_row(
                &format!("SELECT {JOB_COLUMNS} FROM jobs WHERE company=?1 AND number=?2"),
                params![company.as_str(), number],
                read_raw_job_row,
            )
            .optional()?;
        raw.map(RawJobRow::into_job).transpose()
    }

    /// Job plus related collections; the validator's input context.
    pub fn job_detail(
        &mut self,
        company: &CompanyId,
        id: &str,
    ) -> Result<JobDetail, StoreError> {
        let tx = self.conn.transaction()?;
        let Some(job) = job_row_tx(&tx, company.as_str(), id)? else {
            return Err(StoreError::UnknownId);
        };
        let invoices = crate::relations::invoices_by_job_tx(&tx, company.as_str(), id)?;
        let estimates = crate::relations::estimates_by_job_tx(&tx, company.as_str(), id)?;
        let team_assignments =
            crate::relations::team_assignments_by_job_tx(&tx, company.as_str(), id)?;
        tx.commit()?;
        Ok(JobDetail {
            job,
            invoices,
            estimates,
            team_assignments,
        })
    }

    /// Partial field update. Does not touch status; status changes go through
    /// [`SqliteStore::job_set_status`] after validation.
    pub fn job_update(
        &mut self,
        company: &CompanyId,
        id: &str,
        request: JobUpdateRequest,
    ) -> Result<JobRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        let Some(current) = job_row_tx(&tx, company.as_str(), id)? else {
            return Err(StoreError::UnknownId);
        };

        let title = match request.title {
            Some(raw) => normalize_title(&raw)?,
            None => current.title,
        };
        let total_amount_cents = match request.total_amount_cents {
            Some(cents) => normalize_money(cents)?,
            None => current.total_amount_cents,
        };
        let description = opt_trimmed(request.description).or(current.description);
        let assigned_to = opt_trimmed(request.assigned_to).or(current.assigned_to);
        let notes = match request.notes {
            Some(raw) => Some(raw.trim().chars().take(MAX_NOTES_LEN).collect()),
            None => current.notes,
        };

        tx.execute(
            r#"
            UPDATE jobs
            SET title=?3, description=?4, priority=?5, job_type=?6, assigned_to=?7,
                scheduled_start_ms=?8, scheduled_end_ms=?9, total_amount_cents=?10,
                notes=?11, updated_at_ms=?12
            WHERE company=?1 AND id=?2
            "#,
            params![
                company.as_str(),
                id,
                title,
                description,
                request.priority.unwrap_or(current.priority).as_str(),
                request
                    .job_type
                    .or(current.job_type)
                    .map(JobType::as_str),
                assigned_to,
                request.scheduled_start_ms.or(current.scheduled_start_ms),
                request.scheduled_end_ms.or(current.scheduled_end_ms),
                total_amount_cents,
                notes,
                now_ms,
            ],
        )?;

        insert_audit_event_tx(
            &tx,
            company.as_str(),
            id,
            now_ms,
            "updated",
            None,
            None,
        )?;

        let Some(job) = job_row_tx(&tx, company.as_str(), id)? else {
            return Err(StoreError::UnknownId);
        };
        tx.commit()?;
        Ok(job)
    }

    /// Persist an already-validated status transition.
    ///
    /// Side effects mirror the lifecycle: entering `in_progress` stamps
    /// `actual_start`, entering `completed` stamps `actual_end`, cancelling
    /// with a reason appends it to the notes.
    pub fn job_set_status(
        &mut self,
        company: &CompanyId,
        id: &str,
        request: JobSetStatusRequest,
    ) -> Result<JobRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        let Some(current) = job_row_tx(&tx, company.as_str(), id)? else {
            return Err(StoreError::UnknownId);
        };

        let actual_start_ms = if request.status == JobStatus::InProgress {
            current.actual_start_ms.or(Some(now_ms))
        } else {
            current.actual_start_ms
        };
        let actual_end_ms = if request.status == JobStatus::Completed {
            current.actual_end_ms.or(Some(now_ms))
        } else {
            current.actual_end_ms
        };

        let reason = request
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let notes = if request.status == JobStatus::Cancelled
            && let Some(reason) = reason
        {
            let existing = current.notes.as_deref().unwrap_or("");
            Some(
                format!("{existing}\n\n[CANCELLED]: {reason}")
                    .trim()
                    .to_string(),
            )
        } else {
            current.notes.clone()
        };

        tx.execute(
            r#"
            UPDATE jobs
            SET status=?3,
                scheduled_start_ms=COALESCE(?4, scheduled_start_ms),
                scheduled_end_ms=COALESCE(?5, scheduled_end_ms),
                actual_start_ms=?6, actual_end_ms=?7, notes=?8, updated_at_ms=?9
            WHERE company=?1 AND id=?2
            "#,
            params![
                company.as_str(),
                id,
                request.status.as_str(),
                request.scheduled_start_ms,
                request.scheduled_end_ms,
                actual_start_ms,
                actual_end_ms,
                notes,
                now_ms,
            ],
        )?;

        let mut meta = JsonMap::<String, JsonValue>::new();
        meta.insert(
            "from".to_string(),
            JsonValue::String(current.status.as_str().to_string()),
        );
        meta.insert(
            "to".to_string(),
            JsonValue::String(request.status.as_str().to_string()),
        );
        if let Some(reason) = reason {
            meta.insert("reason".to_string(), JsonValue::String(reason.to_string()));
        }
        insert_audit_event_tx(
            &tx,
            company.as_str(),
            id,
            now_ms,
            "status_change",
            Some(&request.actor_id),
            Some(JsonValue::Object(meta).to_string()),
        )?;

        let Some(job) = job_row_tx(&tx, company.as_str(), id)? else {
            return Err(StoreError::UnknownId);
        };
        tx.commit()?;
        Ok(job)
    }

    /// Physical delete. Normal lifecycle never deletes; this exists solely as
    /// the compensating rollback of a job created earlier in the same failed
    /// operation.
    pub fn job_delete(&mut self, company: &CompanyId, id: &str) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            "DELETE FROM jobs WHERE company=?1 AND id=?2",
            params![company.as_str(), id],
        )?;
        if changed != 1 {
            return Err(StoreError::UnknownId);
        }
        tx.execute(
            "DELETE FROM audit_events WHERE company=?1 AND job_id=?2",
            params![company.as_str(), id],
        )?;
        tx.commit()?;
        Ok(())
    }
}
