use crate::error::AttendanceError;
use crate::gateway::{AttendanceGateway, DirectoryGateway};
use crate::models::{
    self, AttendanceRecord, Class, ClassListing, NewClass, NewUser, Role, User,
};
use crate::roster::{self, MergedRoster};
use crate::session::{self, Authorize, ClassTeacherPolicy, Session};
use crate::sqlite::SqliteGateway;
use crate::stats::{self, AttendanceSummary, DailyCounts};
use crate::writer::{self, MarkRequest};

/// A student's attendance records, newest first, with their summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentHistory {
    pub records: Vec<AttendanceRecord>,
    pub summary: AttendanceSummary,
}

/// School-wide totals for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overview {
    pub total_users: usize,
    pub total_students: usize,
    pub total_teachers: usize,
    pub total_classes: usize,
}

/// The manager for recording, modifying, and retrieving attendance data on behalf of signed-in
/// users.
pub struct AttendanceManager<G = SqliteGateway> {
    gateway: G,
}

impl AttendanceManager<SqliteGateway> {
    /// Creates a new `AttendanceManager` backed by the `sqlite3` database at `database_url`.
    pub fn connect(database_url: &str) -> Result<Self, AttendanceError> {
        Ok(Self::new(SqliteGateway::open(database_url)?))
    }
}

impl<G> AttendanceManager<G>
where
    G: AttendanceGateway + DirectoryGateway,
{
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    /// Resolves an email address to a session.
    pub fn sign_in(&mut self, email: &str) -> Result<Session, AttendanceError> {
        session::sign_in(&mut self.gateway, email)
    }

    /// Records one attendance decision. Only admins and the class's teacher may do this.
    pub fn mark(
        &mut self,
        session: &Session,
        request: &MarkRequest,
    ) -> Result<AttendanceRecord, AttendanceError> {
        writer::mark_attendance(&mut self.gateway, &mut ClassTeacherPolicy, session, request)
    }

    /// The roster of a class for one day, with every student's status (or lack of one).
    pub fn class_roster(
        &mut self,
        session: &Session,
        class_id: &str,
        date: &str,
    ) -> Result<MergedRoster, AttendanceError> {
        if class_id.trim().is_empty() {
            return Err(AttendanceError::InvalidArgument("class_id is empty".into()));
        }
        let date = models::parse_date(date)?;

        // Asked before the class lookup so only admins learn whether a class id exists.
        if !ClassTeacherPolicy.may_mark(&mut self.gateway, session.user(), class_id)? {
            return Err(AttendanceError::unauthorized(
                &session.user().email,
                format!("view the roster of class {class_id}"),
            ));
        }
        self.require_class(class_id)?;

        let students = self.gateway.fetch_roster(class_id)?;
        let records = self.gateway.fetch_attendance(class_id, date)?;

        Ok(roster::merge_roster(&students, &records))
    }

    /// A student's attendance records and summary, optionally limited to one class.
    ///
    /// Students may only look at their own history.
    pub fn student_history(
        &mut self,
        session: &Session,
        student_id: &str,
        class_id: Option<&str>,
    ) -> Result<StudentHistory, AttendanceError> {
        self.require_history_access(session, student_id)?;

        let records = self
            .gateway
            .fetch_attendance_history(student_id, class_id)?;
        let summary = AttendanceSummary::from_records(&records);

        Ok(StudentHistory { records, summary })
    }

    /// Per-day counts of a student's attendance for the `days` days ending at `until`.
    pub fn student_trend(
        &mut self,
        session: &Session,
        student_id: &str,
        class_id: Option<&str>,
        until: &str,
        days: u32,
    ) -> Result<Vec<DailyCounts>, AttendanceError> {
        let until = models::parse_date(until)?;
        let history = self.student_history(session, student_id, class_id)?;

        Ok(stats::daily_trend(&history.records, until, days))
    }

    /// The classes relevant to the session's user: everything for admins, the classes taught by a
    /// teacher, or the classes a student is enrolled in.
    pub fn my_classes(&mut self, session: &Session) -> Result<Vec<ClassListing>, AttendanceError> {
        let listings = match session.role() {
            Role::Admin => self.gateway.list_classes(None)?,
            Role::Teacher => self.gateway.list_classes(Some(session.user_id()))?,
            Role::Student => self.gateway.student_classes(session.user_id())?,
        };
        Ok(listings)
    }

    /// Every user, most recently created first.
    pub fn list_users(&mut self, session: &Session) -> Result<Vec<User>, AttendanceError> {
        session.require(&[Role::Admin], "list users")?;
        Ok(self.gateway.list_users()?)
    }

    /// Every class with its teacher and student count.
    pub fn list_classes(
        &mut self,
        session: &Session,
    ) -> Result<Vec<ClassListing>, AttendanceError> {
        session.require(&[Role::Admin], "list classes")?;
        Ok(self.gateway.list_classes(None)?)
    }

    pub fn overview(&mut self, session: &Session) -> Result<Overview, AttendanceError> {
        session.require(&[Role::Admin], "view the overview")?;

        let users = self.gateway.list_users()?;
        let classes = self.gateway.list_classes(None)?;

        Ok(Overview {
            total_users: users.len(),
            total_students: users.iter().filter(|u| u.role == Role::Student).count(),
            total_teachers: users.iter().filter(|u| u.role == Role::Teacher).count(),
            total_classes: classes.len(),
        })
    }

    /// Adds a user. Email addresses must be unique.
    pub fn add_user(
        &mut self,
        session: &Session,
        new_user: NewUser,
    ) -> Result<User, AttendanceError> {
        session.require(&[Role::Admin], "add users")?;

        let new_user = NewUser {
            email: non_empty("email", &new_user.email)?,
            name: non_empty("name", &new_user.name)?,
            role: new_user.role,
        };

        if self.gateway.find_user_by_email(&new_user.email)?.is_some() {
            return Err(AttendanceError::InvalidArgument(format!(
                "{} is already registered",
                new_user.email
            )));
        }

        let user = self.gateway.insert_user(&new_user)?;
        tracing::info!(user_id = %user.id, role = %user.role, "user added");
        Ok(user)
    }

    /// Adds a class taught by an existing teacher.
    pub fn add_class(
        &mut self,
        session: &Session,
        new_class: NewClass,
    ) -> Result<Class, AttendanceError> {
        session.require(&[Role::Admin], "add classes")?;

        let new_class = NewClass {
            name: non_empty("name", &new_class.name)?,
            description: new_class.description.trim().to_string(),
            teacher_id: non_empty("teacher_id", &new_class.teacher_id)?,
        };

        match self.gateway.find_user(&new_class.teacher_id)? {
            Some(user) if user.role == Role::Teacher => {}
            Some(user) => {
                return Err(AttendanceError::InvalidArgument(format!(
                    "{} is a {}, not a teacher",
                    user.email, user.role
                )));
            }
            None => {
                return Err(AttendanceError::NotFound(format!(
                    "teacher {}",
                    new_class.teacher_id
                )));
            }
        }

        let class = self.gateway.insert_class(&new_class)?;
        tracing::info!(class_id = %class.id, teacher_id = %class.teacher_id, "class added");
        Ok(class)
    }

    /// Enrolls a student in a class. Returns `false` if they were already enrolled.
    pub fn enroll(
        &mut self,
        session: &Session,
        student_id: &str,
        class_id: &str,
    ) -> Result<bool, AttendanceError> {
        session.require(&[Role::Admin], "enroll students")?;

        let student_id = non_empty("student_id", student_id)?;
        let class_id = non_empty("class_id", class_id)?;

        match self.gateway.find_user(&student_id)? {
            Some(user) if user.role == Role::Student => {}
            Some(user) => {
                return Err(AttendanceError::InvalidArgument(format!(
                    "{} is a {}, not a student",
                    user.email, user.role
                )));
            }
            None => return Err(AttendanceError::NotFound(format!("student {student_id}"))),
        }
        self.require_class(&class_id)?;

        Ok(self.gateway.enroll(&student_id, &class_id)?)
    }

    fn require_class(&mut self, class_id: &str) -> Result<Class, AttendanceError> {
        self.gateway
            .find_class(class_id)?
            .ok_or_else(|| AttendanceError::NotFound(format!("class {class_id}")))
    }

    fn require_history_access(
        &self,
        session: &Session,
        student_id: &str,
    ) -> Result<(), AttendanceError> {
        if student_id.trim().is_empty() {
            return Err(AttendanceError::InvalidArgument("student_id is empty".into()));
        }

        match session.role() {
            Role::Admin | Role::Teacher => Ok(()),
            Role::Student if session.user_id() == student_id => Ok(()),
            Role::Student => Err(AttendanceError::unauthorized(
                &session.user().email,
                format!("view the attendance of student {student_id}"),
            )),
        }
    }
}

fn non_empty(field: &str, value: &str) -> Result<String, AttendanceError> {
    let value = value.trim();
    if value.is_empty() {
        Err(AttendanceError::InvalidArgument(format!("{field} is empty")))
    } else {
        Ok(value.to_string())
    }
}
