//! The boundary between the attendance core and the data store.
//!
//! The core never talks to a database directly. Everything it reads or writes goes through these
//! traits, so the store behind them can be swapped out (see [`crate::sqlite::SqliteGateway`]).

use crate::error::GatewayError;
use crate::models::{
    AttendanceMark, AttendanceRecord, Class, ClassListing, NewClass, NewUser, RosterStudent, User,
};
use chrono::NaiveDate;

/// Attendance reads and the single write path for attendance records.
pub trait AttendanceGateway {
    /// Retrieves the students enrolled in a class.
    fn fetch_roster(&mut self, class_id: &str) -> Result<Vec<RosterStudent>, GatewayError>;

    /// Retrieves the attendance records of a class for one day.
    fn fetch_attendance(
        &mut self,
        class_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, GatewayError>;

    /// Retrieves a student's attendance records, newest date first, optionally limited to one
    /// class.
    fn fetch_attendance_history(
        &mut self,
        student_id: &str,
        class_id: Option<&str>,
    ) -> Result<Vec<AttendanceRecord>, GatewayError>;

    /// Inserts or replaces the record keyed on `(student_id, class_id, date)` and returns what was
    /// stored. A single call is atomic. Repeating a mark whose status and author match the stored
    /// record leaves that record exactly as it was.
    fn upsert_attendance(&mut self, mark: &AttendanceMark)
    -> Result<AttendanceRecord, GatewayError>;
}

/// Users, classes and enrollments.
pub trait DirectoryGateway {
    fn find_user(&mut self, user_id: &str) -> Result<Option<User>, GatewayError>;

    fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>, GatewayError>;

    /// Retrieves every user, most recently created first.
    fn list_users(&mut self) -> Result<Vec<User>, GatewayError>;

    fn insert_user(&mut self, user: &NewUser) -> Result<User, GatewayError>;

    fn find_class(&mut self, class_id: &str) -> Result<Option<Class>, GatewayError>;

    /// Retrieves classes with their teacher's name and number of enrolled students. When
    /// `teacher_id` is given only that teacher's classes are returned.
    fn list_classes(&mut self, teacher_id: Option<&str>)
    -> Result<Vec<ClassListing>, GatewayError>;

    /// Retrieves the classes a student is enrolled in.
    fn student_classes(&mut self, student_id: &str) -> Result<Vec<ClassListing>, GatewayError>;

    fn insert_class(&mut self, class: &NewClass) -> Result<Class, GatewayError>;

    /// Enrolls a student in a class. Returns `false` if the pair already existed.
    fn enroll(&mut self, student_id: &str, class_id: &str) -> Result<bool, GatewayError>;
}
