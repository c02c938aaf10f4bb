//! Merging a class roster with the attendance records of a single day.

use crate::models::{AttendanceRecord, RosterStudent, Status};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// One roster line: a student and the decision recorded for them, if any.
///
/// A `status` of `None` means nobody has marked the student yet, which is not the same as
/// [`Status::Absent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub student_id: String,
    pub student_name: String,
    pub email: String,
    pub status: Option<Status>,
}

/// Several records were found for one `(student, class, date)` key.
///
/// The merge still produces an entry for the student; the warning only exists so that the
/// inconsistency can be investigated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyWarning {
    pub student_id: String,
    pub class_id: String,
    pub date: NaiveDate,
    pub duplicates: usize,
    /// The status that was kept.
    pub chosen: Status,
}

impl fmt::Display for ConsistencyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} attendance records for student {} in class {} on {}, kept '{}'",
            self.duplicates, self.student_id, self.class_id, self.date, self.chosen
        )
    }
}

/// The outcome of [`merge_roster`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedRoster {
    pub entries: Vec<RosterEntry>,
    pub warnings: Vec<ConsistencyWarning>,
}

impl MergedRoster {
    /// The number of entries carrying the given status.
    pub fn count(&self, status: Status) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.status == Some(status))
            .count()
    }

    /// The number of students nobody has marked yet.
    pub fn unmarked(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.status.is_none())
            .count()
    }
}

/// Produces one [`RosterEntry`] per roster student, in roster order.
///
/// `records` should all belong to one class and day. Records for students that are not on the
/// roster are ignored. If a student has more than one record, the one written last (by
/// `recorded_at`, then by position in `records`) wins and a [`ConsistencyWarning`] is logged and
/// returned.
pub fn merge_roster(roster: &[RosterStudent], records: &[AttendanceRecord]) -> MergedRoster {
    let enrolled: HashSet<&str> = roster.iter().map(|s| s.student_id.as_str()).collect();

    let mut by_student: HashMap<&str, Vec<&AttendanceRecord>> = HashMap::new();
    for record in records {
        if enrolled.contains(record.student_id.as_str()) {
            by_student
                .entry(record.student_id.as_str())
                .or_default()
                .push(record);
        }
    }

    let mut warnings = Vec::new();
    let mut warned: HashSet<&str> = HashSet::new();

    let entries = roster
        .iter()
        .map(|student| {
            let matches = by_student
                .get(student.student_id.as_str())
                .map(Vec::as_slice)
                .unwrap_or_default();

            let chosen = latest_write(matches);

            if let Some(record) = chosen {
                if matches.len() > 1 && warned.insert(student.student_id.as_str()) {
                    let warning = ConsistencyWarning {
                        student_id: student.student_id.clone(),
                        class_id: record.class_id.clone(),
                        date: record.date,
                        duplicates: matches.len(),
                        chosen: record.status,
                    };
                    tracing::warn!(
                        student_id = %warning.student_id,
                        class_id = %warning.class_id,
                        date = %warning.date,
                        duplicates = warning.duplicates,
                        "duplicate attendance records: {warning}"
                    );
                    warnings.push(warning);
                }
            }

            RosterEntry {
                student_id: student.student_id.clone(),
                student_name: student.name.clone(),
                email: student.email.clone(),
                status: chosen.map(|record| record.status),
            }
        })
        .collect();

    MergedRoster { entries, warnings }
}

/// `max_by_key` keeps the last of several equal maxima, so ties go to the later record.
fn latest_write<'a>(records: &[&'a AttendanceRecord]) -> Option<&'a AttendanceRecord> {
    records.iter().copied().max_by_key(|record| record.recorded_at)
}
