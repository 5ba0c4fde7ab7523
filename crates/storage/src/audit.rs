#![forbid(unsafe_code)]

use crate::{AuditEventRow, SqliteStore, StoreError};
use fo_core::ids::CompanyId;
use rusqlite::{Transaction, params};

const MAX_AUDIT_TAIL: usize = 200;

pub(crate) fn insert_audit_event_tx(
    tx: &Transaction<'_>,
    company: &str,
    job_id: &str,
    ts_ms: i64,
    action: &str,
    actor_id: Option<&str>,
    meta_json: Option<String>,
) -> Result<(), StoreError> {
    tx.execute(
        r#"
        INSERT INTO audit_events(company, job_id, ts_ms, action, actor_id, meta_json)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![company, job_id, ts_ms, action, actor_id, meta_json],
    )?;
    Ok(())
}

impl SqliteStore {
    /// Audit events for a job, newest first.
    pub fn audit_tail(
        &self,
        company: &CompanyId,
        job_id: &str,
        limit: usize,
    ) -> Result<Vec<AuditEventRow>, StoreError> {
        let limit = limit.clamp(1, MAX_AUDIT_TAIL);
        let mut stmt = self.conn.prepare(
            r#"
            SELECT seq, job_id, ts_ms, action, actor_id, meta_json
            FROM audit_events
            WHERE company=?1 AND job_id=?2
            ORDER BY seq DESC
            LIMIT ?3
            "#,
        )?;
        let mut rows = stmt.query(params![company.as_str(), job_id, limit as i64])?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(AuditEventRow {
                seq: row.get(0)?,
                job_id: row.get(1)?,
                ts_ms: row.get(2)?,
                action: row.get(3)?,
                actor_id: row.get(4)?,
                meta_json: row.get(5)?,
            });
        }
        Ok(events)
    }
}
