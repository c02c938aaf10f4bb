//! The only path by which attendance records are created or changed.

use crate::error::AttendanceError;
use crate::gateway::AttendanceGateway;
use crate::models::{self, AttendanceMark, AttendanceRecord, Status};
use crate::session::{Authorize, Session};

/// An attendance mark exactly as it arrives from a caller, before any validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkRequest {
    pub student_id: String,
    pub class_id: String,
    pub date: String,
    pub status: String,
}

impl MarkRequest {
    pub fn new(
        student_id: impl Into<String>,
        class_id: impl Into<String>,
        date: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            class_id: class_id.into(),
            date: date.into(),
            status: status.into(),
        }
    }

    /// Checks every field and turns the request into a mark attributed to the session's user.
    pub fn validate(&self, session: &Session) -> Result<AttendanceMark, AttendanceError> {
        let student_id = required("student_id", &self.student_id)?;
        let class_id = required("class_id", &self.class_id)?;
        let recorded_by = required("recorded_by", session.user_id())?;
        let status: Status = self.status.parse()?;
        let date = models::parse_date(&self.date)?;

        Ok(AttendanceMark {
            student_id,
            class_id,
            date,
            status,
            recorded_by,
        })
    }
}

fn required(field: &str, value: &str) -> Result<String, AttendanceError> {
    if value.trim().is_empty() {
        Err(AttendanceError::InvalidArgument(format!("{field} is empty")))
    } else {
        Ok(value.to_string())
    }
}

/// Records one attendance decision.
///
/// The request is validated first, then `policy` is asked whether the session's user may mark the
/// class, and only then is the record upserted. Writing the same mark twice leaves the same stored
/// state as writing it once, and a later mark for the same `(student, class, date)` simply
/// replaces an earlier one. The returned record is what the gateway stored.
pub fn mark_attendance<G, A>(
    gateway: &mut G,
    policy: &mut A,
    session: &Session,
    request: &MarkRequest,
) -> Result<AttendanceRecord, AttendanceError>
where
    G: AttendanceGateway + ?Sized,
    A: Authorize<G> + ?Sized,
{
    let mark = request.validate(session)?;

    if !policy.may_mark(gateway, session.user(), &mark.class_id)? {
        return Err(AttendanceError::unauthorized(
            &session.user().email,
            format!("mark attendance for class {}", mark.class_id),
        ));
    }

    let record = gateway.upsert_attendance(&mark)?;

    tracing::info!(
        student_id = %record.student_id,
        class_id = %record.class_id,
        date = %record.date,
        status = %record.status,
        recorded_by = %record.recorded_by,
        "attendance marked"
    );

    Ok(record)
}
