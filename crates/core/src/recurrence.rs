#![forbid(unsafe_code)]

use time::{Date, Duration, Month, OffsetDateTime};

/// Hard ceiling when a rule supplies neither an end date nor a count. One
/// year of weekly jobs; guarantees the expansion always terminates.
pub const DEFAULT_MAX_OCCURRENCES: u32 = 52;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecurrenceInterval {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl RecurrenceInterval {
    pub fn as_str(self) -> &'static str {
        match self {
            RecurrenceInterval::Daily => "daily",
            RecurrenceInterval::Weekly => "weekly",
            RecurrenceInterval::Biweekly => "biweekly",
            RecurrenceInterval::Monthly => "monthly",
            RecurrenceInterval::Quarterly => "quarterly",
            RecurrenceInterval::Yearly => "yearly",
        }
    }

    /// Unknown cadences fall back to monthly rather than failing.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "daily" => RecurrenceInterval::Daily,
            "weekly" => RecurrenceInterval::Weekly,
            "biweekly" => RecurrenceInterval::Biweekly,
            "quarterly" => RecurrenceInterval::Quarterly,
            "yearly" => RecurrenceInterval::Yearly,
            _ => RecurrenceInterval::Monthly,
        }
    }
}

/// Advance one interval. Day and week arithmetic is fixed-width; month and
/// year arithmetic is calendar-aware with the day-of-month clamped to the
/// target month's length (Jan 31 + 1 month in 2024 lands on Feb 29).
pub fn next_occurrence(at: OffsetDateTime, interval: RecurrenceInterval) -> OffsetDateTime {
    match interval {
        RecurrenceInterval::Daily => at + Duration::days(1),
        RecurrenceInterval::Weekly => at + Duration::days(7),
        RecurrenceInterval::Biweekly => at + Duration::days(14),
        RecurrenceInterval::Monthly => add_calendar_months(at, 1),
        RecurrenceInterval::Quarterly => add_calendar_months(at, 3),
        RecurrenceInterval::Yearly => add_calendar_months(at, 12),
    }
}

fn add_calendar_months(at: OffsetDateTime, months: i32) -> OffsetDateTime {
    let date = at.date();
    let zero_based = date.year() * 12 + (i32::from(u8::from(date.month())) - 1) + months;
    let year = zero_based.div_euclid(12);
    let month =
        Month::try_from((zero_based.rem_euclid(12) + 1) as u8).unwrap_or(date.month());
    let day = date
        .day()
        .min(time::util::days_in_year_month(year, month));
    let rolled = Date::from_calendar_date(year, month, day).unwrap_or(date);
    at.replace_date(rolled)
}

/// Cadence plus bounds for a recurring series.
#[derive(Clone, Debug)]
pub struct RecurrenceRule {
    pub interval: RecurrenceInterval,
    pub end_date_ms: Option<i64>,
    pub count: Option<u32>,
}

impl RecurrenceRule {
    /// Total occurrences in the series including the seed.
    pub fn max_occurrences(&self) -> u32 {
        self.count.unwrap_or(DEFAULT_MAX_OCCURRENCES).max(1)
    }
}

/// The first job of the series, already created by the caller.
#[derive(Clone, Debug)]
pub struct RecurrenceSeed {
    pub title: String,
    pub scheduled_start_ms: Option<i64>,
    pub scheduled_end_ms: Option<i64>,
}

/// One generated instance. The seed itself is occurrence 1; slots start at 2.
/// Job numbers are assigned later by the allocator at persist time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccurrenceSlot {
    pub ordinal: u32,
    pub total: u32,
    pub title: String,
    pub scheduled_start_ms: i64,
    pub scheduled_end_ms: Option<i64>,
}

/// Finite, consuming iterator over the future instances of a recurring
/// series. Empty when the seed has no start time; otherwise bounded by the
/// rule's end date, its count, or [`DEFAULT_MAX_OCCURRENCES`].
#[derive(Debug)]
pub struct RecurrenceExpansion {
    interval: RecurrenceInterval,
    end_limit_ms: Option<i64>,
    total: u32,
    duration_ms: Option<i64>,
    base_title: String,
    cursor: Option<OffsetDateTime>,
    next_ordinal: u32,
}

impl RecurrenceExpansion {
    pub fn new(seed: &RecurrenceSeed, rule: &RecurrenceRule) -> Self {
        let cursor = seed
            .scheduled_start_ms
            .and_then(datetime_from_unix_ms);
        let duration_ms = match (seed.scheduled_start_ms, seed.scheduled_end_ms) {
            (Some(start), Some(end)) => Some((end - start).max(0)),
            _ => None,
        };
        Self {
            interval: rule.interval,
            end_limit_ms: rule.end_date_ms,
            total: rule.max_occurrences(),
            duration_ms,
            base_title: seed.title.clone(),
            cursor,
            next_ordinal: 2,
        }
    }
}

impl Iterator for RecurrenceExpansion {
    type Item = OccurrenceSlot;

    fn next(&mut self) -> Option<OccurrenceSlot> {
        let cursor = self.cursor?;
        if self.next_ordinal > self.total {
            self.cursor = None;
            return None;
        }

        let advanced = next_occurrence(cursor, self.interval);
        let start_ms = unix_ms(advanced);
        if let Some(limit) = self.end_limit_ms
            && start_ms > limit
        {
            self.cursor = None;
            return None;
        }

        let ordinal = self.next_ordinal;
        self.next_ordinal += 1;
        self.cursor = Some(advanced);

        Some(OccurrenceSlot {
            ordinal,
            total: self.total,
            title: format!("{} ({}/{})", self.base_title, ordinal, self.total),
            scheduled_start_ms: start_ms,
            scheduled_end_ms: self.duration_ms.map(|d| start_ms + d),
        })
    }
}

fn datetime_from_unix_ms(ms: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000).ok()
}

fn unix_ms(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const HOUR_MS: i64 = 3_600_000;
    const DAY_MS: i64 = 86_400_000;

    fn ms(at: OffsetDateTime) -> i64 {
        unix_ms(at)
    }

    #[test]
    fn interval_parse_defaults_to_monthly() {
        assert_eq!(RecurrenceInterval::parse("weekly"), RecurrenceInterval::Weekly);
        assert_eq!(RecurrenceInterval::parse("monthly"), RecurrenceInterval::Monthly);
        assert_eq!(
            RecurrenceInterval::parse("fortnightly"),
            RecurrenceInterval::Monthly
        );
        assert_eq!(RecurrenceInterval::parse(""), RecurrenceInterval::Monthly);
    }

    #[test]
    fn monthly_rollover_clamps_to_month_end() {
        // Jan 31 2024 + 1 month = Feb 29 2024 (leap year clamp). Pinned as
        // ground truth for the calendar arithmetic.
        let jan31 = datetime!(2024-01-31 00:00:00 UTC);
        let next = next_occurrence(jan31, RecurrenceInterval::Monthly);
        assert_eq!(next, datetime!(2024-02-29 00:00:00 UTC));

        let non_leap = datetime!(2025-01-31 00:00:00 UTC);
        let next = next_occurrence(non_leap, RecurrenceInterval::Monthly);
        assert_eq!(next, datetime!(2025-02-28 00:00:00 UTC));
    }

    #[test]
    fn yearly_advance_crosses_year_boundary() {
        let at = datetime!(2024-02-29 09:30:00 UTC);
        let next = next_occurrence(at, RecurrenceInterval::Yearly);
        assert_eq!(next, datetime!(2025-02-28 09:30:00 UTC));
    }

    #[test]
    fn quarterly_advance_preserves_time_of_day() {
        let at = datetime!(2024-11-15 08:00:00 UTC);
        let next = next_occurrence(at, RecurrenceInterval::Quarterly);
        assert_eq!(next, datetime!(2025-02-15 08:00:00 UTC));
    }

    #[test]
    fn no_start_time_means_empty_expansion() {
        let seed = RecurrenceSeed {
            title: "Gutter cleaning".to_string(),
            scheduled_start_ms: None,
            scheduled_end_ms: None,
        };
        let rule = RecurrenceRule {
            interval: RecurrenceInterval::Weekly,
            end_date_ms: None,
            count: None,
        };
        assert_eq!(RecurrenceExpansion::new(&seed, &rule).count(), 0);
    }

    #[test]
    fn uncapped_weekly_series_stops_at_default_cap() {
        let start = datetime!(2024-01-01 10:00:00 UTC);
        let seed = RecurrenceSeed {
            title: "Lawn service".to_string(),
            scheduled_start_ms: Some(ms(start)),
            scheduled_end_ms: Some(ms(start) + HOUR_MS),
        };
        let rule = RecurrenceRule {
            interval: RecurrenceInterval::Weekly,
            end_date_ms: None,
            count: None,
        };
        let slots: Vec<_> = RecurrenceExpansion::new(&seed, &rule).collect();
        // 52 total including the seed, so 51 generated.
        assert_eq!(slots.len(), 51);
        assert_eq!(slots.first().map(|s| s.ordinal), Some(2));
        assert_eq!(slots.last().map(|s| s.ordinal), Some(52));
        assert_eq!(
            slots[0].scheduled_start_ms,
            ms(start) + 7 * DAY_MS
        );
    }

    #[test]
    fn end_date_bounds_a_daily_series() {
        let start = datetime!(2024-06-01 00:00:00 UTC);
        let seed = RecurrenceSeed {
            title: "Pool check".to_string(),
            scheduled_start_ms: Some(ms(start)),
            scheduled_end_ms: None,
        };
        let rule = RecurrenceRule {
            interval: RecurrenceInterval::Daily,
            end_date_ms: Some(ms(start) + 5 * DAY_MS),
            count: None,
        };
        let slots: Vec<_> = RecurrenceExpansion::new(&seed, &rule).collect();
        assert_eq!(slots.len(), 5);
        for slot in &slots {
            assert!(slot.scheduled_start_ms <= ms(start) + 5 * DAY_MS);
            assert_eq!(slot.scheduled_end_ms, None);
        }
    }

    #[test]
    fn count_bounds_the_series_and_titles_carry_ordinals() {
        let start = datetime!(2024-03-10 14:00:00 UTC);
        let seed = RecurrenceSeed {
            title: "Filter swap".to_string(),
            scheduled_start_ms: Some(ms(start)),
            scheduled_end_ms: Some(ms(start) + 2 * HOUR_MS),
        };
        let rule = RecurrenceRule {
            interval: RecurrenceInterval::Monthly,
            end_date_ms: None,
            count: Some(4),
        };
        let slots: Vec<_> = RecurrenceExpansion::new(&seed, &rule).collect();
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].title, "Filter swap (2/4)");
        assert_eq!(slots[2].title, "Filter swap (4/4)");
        for slot in &slots {
            assert_eq!(
                slot.scheduled_end_ms,
                Some(slot.scheduled_start_ms + 2 * HOUR_MS)
            );
        }
    }

    #[test]
    fn expansion_is_not_restartable() {
        let start = datetime!(2024-01-01 00:00:00 UTC);
        let seed = RecurrenceSeed {
            title: "Visit".to_string(),
            scheduled_start_ms: Some(ms(start)),
            scheduled_end_ms: None,
        };
        let rule = RecurrenceRule {
            interval: RecurrenceInterval::Daily,
            end_date_ms: None,
            count: Some(3),
        };
        let mut expansion = RecurrenceExpansion::new(&seed, &rule);
        assert!(expansion.next().is_some());
        assert!(expansion.next().is_some());
        assert!(expansion.next().is_none());
        assert!(expansion.next().is_none());
    }
}
