#![forbid(unsafe_code)]

mod audit;
mod error;
mod jobs;
mod numbers;
mod relations;
mod requests;
mod rows;

pub use error::StoreError;
pub use requests::*;
pub use rows::*;

use fo_core::ids::CompanyId;
use rusqlite::{Connection, Transaction, params};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join("fieldops.db");
        let conn = Connection::open(db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;

        let store = Self { conn, storage_dir };
        store.migrate()?;
        Ok(store)
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;

            CREATE TABLE IF NOT EXISTS companies (
              company TEXT PRIMARY KEY,
              created_at_ms INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS counters (
              company TEXT NOT NULL,
              name TEXT NOT NULL,
              value INTEGER NOT NULL,
              PRIMARY KEY (company, name)
            );

            CREATE TABLE IF NOT EXISTS jobs (
              company TEXT NOT NULL,
              id TEXT NOT NULL,
              number TEXT NOT NULL,
              status TEXT NOT NULL,
              title TEXT NOT NULL,
              description TEXT,
              priority TEXT NOT NULL,
              job_type TEXT,
              property_id TEXT NOT NULL,
              customer_id TEXT,
              assigned_to TEXT,
              scheduled_start_ms INTEGER,
              scheduled_end_ms INTEGER,
              actual_start_ms INTEGER,
              actual_end_ms INTEGER,
              total_amount_cents INTEGER NOT NULL DEFAULT 0,
              notes TEXT,
              created_by TEXT NOT NULL,
              created_at_ms INTEGER NOT NULL,
              updated_at_ms INTEGER NOT NULL,
              PRIMARY KEY (company, id)
            );
            CREATE UNIQUE INDEX IF NOT EXISTS jobs_by_number
              ON jobs(company, number);
            CREATE INDEX IF NOT EXISTS jobs_by_status
              ON jobs(company, status, updated_at_ms);

            CREATE TABLE IF NOT EXISTS invoices (
              company TEXT NOT NULL,
              id TEXT NOT NULL,
              job_id TEXT NOT NULL,
              status TEXT NOT NULL,
              total_amount_cents INTEGER NOT NULL,
              created_at_ms INTEGER NOT NULL,
              PRIMARY KEY (company, id)
            );
            CREATE INDEX IF NOT EXISTS invoices_by_job
              ON invoices(company, job_id);

            CREATE TABLE IF NOT EXISTS estimates (
              company TEXT NOT NULL,
              id TEXT NOT NULL,
              job_id TEXT NOT NULL,
              status TEXT NOT NULL,
              created_at_ms INTEGER NOT NULL,
              PRIMARY KEY (company, id)
            );
            CREATE INDEX IF NOT EXISTS estimates_by_job
              ON estimates(company, job_id);

            CREATE TABLE IF NOT EXISTS team_assignments (
              company TEXT NOT NULL,
              id TEXT NOT NULL,
              job_id TEXT NOT NULL,
              user_id TEXT NOT NULL,
              role TEXT NOT NULL,
              assigned_at_ms INTEGER NOT NULL,
              PRIMARY KEY (company, id)
            );
            CREATE INDEX IF NOT EXISTS team_assignments_by_job
              ON team_assignments(company, job_id);

            CREATE TABLE IF NOT EXISTS audit_events (
              seq INTEGER PRIMARY KEY AUTOINCREMENT,
              company TEXT NOT NULL,
              job_id TEXT NOT NULL,
              ts_ms INTEGER NOT NULL,
              action TEXT NOT NULL,
              actor_id TEXT,
              meta_json TEXT
            );
            CREATE INDEX IF NOT EXISTS audit_events_by_job
              ON audit_events(company, job_id, seq);
            "#,
        )?;
        Ok(())
    }
}

fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn ensure_company_tx(
    tx: &Transaction<'_>,
    company: &CompanyId,
    now_ms: i64,
) -> Result<(), StoreError> {
    tx.execute(
        "INSERT OR IGNORE INTO companies(company, created_at_ms) VALUES (?1, ?2)",
        params![company.as_str(), now_ms],
    )?;
    Ok(())
}

fn next_counter_tx(tx: &Transaction<'_>, company: &str, name: &str) -> Result<i64, StoreError> {
    use rusqlite::OptionalExtension;

    let current: i64 = tx
        .query_row(
            "SELECT value FROM counters WHERE company=?1 AND name=?2",
            params![company, name],
            |row| row.get(0),
        )
        .optional()?
        .unwrap_or(0);
    let next = current + 1;
    tx.execute(
        r#"
        INSERT INTO counters(company, name, value) VALUES (?1, ?2, ?3)
        ON CONFLICT(company, name) DO UPDATE SET value=excluded.value
        "#,
        params![company, name, next],
    )?;
    Ok(next)
}
