#![forbid(unsafe_code)]

use crate::audit::insert_audit_event_tx;
use crate::{
    EstimateAddRequest, EstimateRow, InvoiceAddRequest, InvoiceRow, SqliteStore, StoreError,
    TeamAssignmentAddRequest, TeamAssignmentRow, ensure_company_tx, next_counter_tx, now_ms,
};
use fo_core::ids::CompanyId;
use fo_core::status::{EstimateStatus, InvoiceStatus};
use rusqlite::{OptionalExtension, Transaction, params};

fn ensure_job_exists_tx(
    tx: &Transaction<'_>,
    company: &str,
    job_id: &str,
) -> Result<(), StoreError> {
    let found: Option<i64> = tx
        .query_row(
            "SELECT 1 FROM jobs WHERE company=?1 AND id=?2",
            params![company, job_id],
            |row| row.get(0),
        )
        .optional()?;
    if found.is_none() {
        return Err(StoreError::UnknownId);
    }
    Ok(())
}

pub(crate) fn invoices_by_job_tx(
    tx: &Transaction<'_>,
    company: &str,
    job_id: &str,
) -> Result<Vec<InvoiceRow>, StoreError> {
    let mut stmt = tx.prepare(
        r#"
        SELECT id, job_id, status, total_amount_cents, created_at_ms
        FROM invoices
        WHERE company=?1 AND job_id=?2
        ORDER BY created_at_ms ASC, id ASC
        "#,
    )?;
    let mut rows = stmt.query(params![company, job_id])?;
    let mut invoices = Vec::new();
    while let Some(row) = rows.next()? {
        let status: String = row.get(2)?;
        invoices.push(InvoiceRow {
            id: row.get(0)?,
            job_id: row.get(1)?,
            status: InvoiceStatus::parse(&status)?,
            total_amount_cents: row.get(3)?,
            created_at_ms: row.get(4)?,
        });
    }
    Ok(invoices)
}

pub(crate) fn estimates_by_job_tx(
    tx: &Transaction<'_>,
    company: &str,
    job_id: &str,
) -> Result<Vec<EstimateRow>, StoreError> {
    let mut stmt = tx.prepare(
        r#"
        SELECT id, job_id, status, created_at_ms
        FROM estimates
        WHERE company=?1 AND job_id=?2
        ORDER BY created_at_ms ASC, id ASC
        "#,
    )?;
    let mut rows = stmt.query(params![company, job_id])?;
    let mut estimates = Vec::new();
    while let Some(row) = rows.next()? {
        let status: String = row.get(2)?;
        estimates.push(EstimateRow {
            id: row.get(0)?,
            job_id: row.get(1)?,
            status: EstimateStatus::parse(&status)?,
            created_at_ms: row.get(3)?,
        });
    }
    Ok(estimates)
}

pub(crate) fn team_assignments_by_job_tx(
    tx: &Transaction<'_>,
    company: &str,
    job_id: &str,
) -> Result<Vec<TeamAssignmentRow>, StoreError> {
    let mut stmt = tx.prepare(
        r#"
        SELECT id, job_id, user_id, role, assigned_at_ms
        FROM team_assignments
        WHERE company=?1 AND job_id=?2
        ORDER BY assigned_at_ms ASC, id ASC
        "#,
    )?;
    let mut rows = stmt.query(params![company, job_id])?;
    let mut assignments = Vec::new();
    while let Some(row) = rows.next()? {
        assignments.push(TeamAssignmentRow {
            id: row.get(0)?,
            job_id: row.get(1)?,
            user_id: row.get(2)?,
            role: row.get(3)?,
            assigned_at_ms: row.get(4)?,
        });
    }
    Ok(assignments)
}

impl SqliteStore {
    pub fn invoice_add(
        &mut self,
        company: &CompanyId,
        request: InvoiceAddRequest,
    ) -> Result<InvoiceRow, StoreError> {
        if request.total_amount_cents < 0 {
            return Err(StoreError::InvalidInput(
                "invoice.total_amount_cents must not be negative",
            ));
        }
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        ensure_company_tx(&tx, company, now_ms)?;
        ensure_job_exists_tx(&tx, company.as_str(), &request.job_id)?;

        let seq = next_counter_tx(&tx, company.as_str(), "invoice_ids")?;
        let id = format!("inv_{seq:06}");
        tx.execute(
            r#"
            INSERT INTO invoices(company, id, job_id, status, total_amount_cents, created_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                company.as_str(),
                id.as_str(),
                request.job_id,
                request.status.as_str(),
                request.total_amount_cents,
                now_ms,
            ],
        )?;
        insert_audit_event_tx(
            &tx,
            company.as_str(),
            &request.job_id,
            now_ms,
            "invoice_added",
            None,
            None,
        )?;
        tx.commit()?;

        Ok(InvoiceRow {
            id,
            job_id: request.job_id,
            status: request.status,
            total_amount_cents: request.total_amount_cents,
            created_at_ms: now_ms,
        })
    }

    pub fn estimate_add(
        &mut self,
        company: &CompanyId,
        request: EstimateAddRequest,
    ) -> Result<EstimateRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        ensure_company_tx(&tx, company, now_ms)?;
        ensure_job_exists_tx(&tx, company.as_str(), &request.job_id)?;

        let seq = next_counter_tx(&tx, company.as_str(), "estimate_ids")?;
        let id = format!("est_{seq:06}");
        tx.execute(
            r#"
            INSERT INTO estimates(company, id, job_id, status, created_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                company.as_str(),
                id.as_str(),
                request.job_id,
                request.status.as_str(),
                now_ms,
            ],
        )?;
        tx.commit()?;

        Ok(EstimateRow {
            id,
            job_id: request.job_id,
            status: request.status,
            created_at_ms: now_ms,
        })
    }

    pub fn team_assignment_add(
        &mut self,
        company: &CompanyId,
        request: TeamAssignmentAddRequest,
    ) -> Result<TeamAssignmentRow, StoreError> {
        let user_id = request.user_id.trim().to_string();
        if user_id.is_empty() {
            return Err(StoreError::InvalidInput(
                "team_assignment.user_id must not be empty",
            ));
        }
        let role = request.role.trim().to_string();
        if role.is_empty() {
            return Err(StoreError::InvalidInput(
                "team_assignment.role must not be empty",
            ));
        }

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        ensure_company_tx(&tx, company, now_ms)?;
        ensure_job_exists_tx(&tx, company.as_str(), &request.job_id)?;

        let seq = next_counter_tx(&tx, company.as_str(), "team_assignment_ids")?;
        let id = format!("ta_{seq:06}");
        tx.execute(
            r#"
            INSERT INTO team_assignments(company, id, job_id, user_id, role, assigned_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                company.as_str(),
                id.as_str(),
                request.job_id,
                user_id,
                role,
                now_ms,
            ],
        )?;
        insert_audit_event_tx(
            &tx,
            company.as_str(),
            &request.job_id,
            now_ms,
            "team_assigned",
            Some(&user_id),
            None,
        )?;
        tx.commit()?;

        Ok(TeamAssignmentRow {
            id,
            job_id: request.job_id,
            user_id,
            role,
            assigned_at_ms: now_ms,
        })
    }
}
