//! Summaries computed from streams of attendance records.

use crate::error::AttendanceError;
use crate::models::{AttendanceRecord, Status};
use chrono::{Days, NaiveDate};
use serde::Serialize;

/// Counts of each status over some set of records, plus the share of them that were present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceSummary {
    pub total: usize,
    pub present_count: usize,
    pub absent_count: usize,
    pub late_count: usize,
    /// `present_count / total` as a whole percentage, rounded half up. Zero when `total` is zero.
    pub rate_percent: u32,
}

impl AttendanceSummary {
    /// Summarizes already validated statuses.
    pub fn from_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = Status>,
    {
        let mut summary = statuses
            .into_iter()
            .fold(Self::default(), |mut summary, status| {
                summary.total += 1;
                match status {
                    Status::Present => summary.present_count += 1,
                    Status::Absent => summary.absent_count += 1,
                    Status::Late => summary.late_count += 1,
                }
                summary
            });

        summary.rate_percent = rate_percent(summary.present_count, summary.total);
        summary
    }

    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a AttendanceRecord>,
    {
        Self::from_statuses(records.into_iter().map(|record| record.status))
    }

    /// Summarizes raw wire statuses, failing on the first token that is not a valid [`Status`].
    pub fn from_wire<I, S>(statuses: I) -> Result<Self, AttendanceError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = statuses
            .into_iter()
            .map(|raw| raw.as_ref().parse::<Status>())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_statuses(parsed))
    }
}

/// `round(part / total * 100)` with halves rounded up, in integer arithmetic.
fn rate_percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }

    let part = part as u64;
    let total = total as u64;
    ((part * 200 + total) / (total * 2)) as u32
}

/// Attendance counts for a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyCounts {
    pub date: NaiveDate,
    pub present: usize,
    pub absent: usize,
    pub late: usize,
}

impl DailyCounts {
    pub fn total(&self) -> usize {
        self.present + self.absent + self.late
    }
}

/// Breaks `records` down per day for the `days` days ending at `until`, oldest first.
///
/// Days without any records are still present in the output with zero counts.
pub fn daily_trend(records: &[AttendanceRecord], until: NaiveDate, days: u32) -> Vec<DailyCounts> {
    (0..days)
        .rev()
        .filter_map(|offset| until.checked_sub_days(Days::new(offset.into())))
        .map(|date| {
            let summary =
                AttendanceSummary::from_records(records.iter().filter(|r| r.date == date));
            DailyCounts {
                date,
                present: summary.present_count,
                absent: summary.absent_count,
                late: summary.late_count,
            }
        })
        .collect()
}
