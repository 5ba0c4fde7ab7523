#![forbid(unsafe_code)]

/// Job number formatting and parsing: `JOB-<4-digit year>-<seq>`, sequence
/// zero-padded to at least three digits and scoped per company per year.
/// Allocation itself (the atomic increment) lives with the store; these
/// helpers keep the wire format in one place.
pub fn format_job_number(year: i32, seq: u32) -> String {
    format!("JOB-{year:04}-{seq:03}")
}

/// Collision-resistant stand-in used when an existing number cannot be
/// parsed: a time-derived suffix instead of failing the whole operation.
pub fn fallback_job_number(year: i32, now_ms: i64) -> String {
    format!("JOB-{year:04}-{:03}", now_ms.rem_euclid(1000))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParsedJobNumber {
    pub year: i32,
    pub seq: u32,
}

/// Parse `JOB-YYYY-NNN`. The sequence accepts any digit run of three or more
/// so numbers past 999 remain parseable.
pub fn parse_job_number(value: &str) -> Option<ParsedJobNumber> {
    let rest = value.trim().strip_prefix("JOB-")?;
    let (year_part, seq_part) = rest.split_once('-')?;
    if year_part.len() != 4 || !year_part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if seq_part.len() < 3 || !seq_part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let year = year_part.parse::<i32>().ok()?;
    let seq = seq_part.parse::<u32>().ok()?;
    Some(ParsedJobNumber { year, seq })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_pads_to_three_digits() {
        assert_eq!(format_job_number(2025, 1), "JOB-2025-001");
        assert_eq!(format_job_number(2025, 14), "JOB-2025-014");
        assert_eq!(format_job_number(2025, 1234), "JOB-2025-1234");
    }

    #[test]
    fn parse_accepts_well_formed_numbers() {
        assert_eq!(
            parse_job_number("JOB-2025-014"),
            Some(ParsedJobNumber {
                year: 2025,
                seq: 14
            })
        );
        assert_eq!(
            parse_job_number(" JOB-2024-1000 "),
            Some(ParsedJobNumber {
                year: 2024,
                seq: 1000
            })
        );
    }

    #[test]
    fn parse_rejects_malformed_numbers() {
        assert_eq!(parse_job_number("JOB-25-014"), None);
        assert_eq!(parse_job_number("JOB-2025-14"), None);
        assert_eq!(parse_job_number("INV-2025-014"), None);
        assert_eq!(parse_job_number("JOB-2025-abc"), None);
        assert_eq!(parse_job_number(""), None);
    }

    #[test]
    fn round_trip() {
        let formatted = format_job_number(2026, 7);
        assert_eq!(
            parse_job_number(&formatted),
            Some(ParsedJobNumber { year: 2026, seq: 7 })
        );
    }

    #[test]
    fn fallback_stays_in_format() {
        let fallback = fallback_job_number(2025, 1_724_803_123_456);
        assert!(parse_job_number(&fallback).is_some());
    }
}
