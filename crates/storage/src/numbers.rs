#![forbid(unsafe_code)]

use crate::{StoreError, next_counter_tx};
use fo_core::number::{fallback_job_number, format_job_number, parse_job_number};
use rusqlite::{OptionalExtension, Transaction, params};

/// Allocate the next job number for `company` within `year`.
///
/// Backed by an atomic counter inside the caller's transaction, so two
/// concurrent creators can never observe the same value (the naive
/// "select max, add one" has that race). When the counter does not exist
/// yet it is seeded from the newest persisted number for that year; a
/// malformed stored number yields a time-derived fallback instead of
/// failing the whole operation.
pub(crate) fn next_job_number_tx(
    tx: &Transaction<'_>,
    company: &str,
    year: i32,
    now_ms: i64,
) -> Result<String, StoreError> {
    let counter = format!("job_number_{year}");

    let seeded: Option<i64> = tx
        .query_row(
            "SELECT value FROM counters WHERE company=?1 AND name=?2",
            params![company, counter.as_str()],
            |row| row.get(0),
        )
        .optional()?;

    if seeded.is_none() {
        let latest: Option<String> = tx
            .query_row(
                r#"
                SELECT number FROM jobs
                WHERE company=?1 AND number LIKE ?2
                ORDER BY created_at_ms DESC, id DESC
                LIMIT 1
                "#,
                params![company, format!("JOB-{year:04}-%")],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(number) = latest {
            match parse_job_number(&number) {
                Some(parsed) => {
                    tx.execute(
                        r#"
                        INSERT INTO counters(company, name, value) VALUES (?1, ?2, ?3)
                        ON CONFLICT(company, name) DO UPDATE SET value=excluded.value
                        "#,
                        params![company, counter.as_str(), i64::from(parsed.seq)],
                    )?;
                }
                None => return Ok(fallback_job_number(year, now_ms)),
            }
        }
    }

    let seq = next_counter_tx(tx, company, &counter)?;
    Ok(format_job_number(year, seq as u32))
}

pub(crate) fn year_of_ms(now_ms: i64) -> i32 {
    time::OffsetDateTime::from_unix_timestamp(now_ms / 1000)
        .map(|dt| dt.year())
        .unwrap_or(1970)
}
