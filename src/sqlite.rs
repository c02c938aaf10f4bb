//! A [`SqliteGateway`] stores everything in a `sqlite3` database through `diesel`.

use crate::error::GatewayError;
use crate::gateway::{AttendanceGateway, DirectoryGateway};
use crate::models::{
    AttendanceMark, AttendanceRecord, Class, ClassListing, Enrollment, NewClass, NewUser,
    RosterStudent, User,
};
use crate::schema;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use std::collections::HashMap;
use uuid::Uuid;

/// The SQL that creates every table, kept in the diesel migrations directory.
const SCHEMA: &str = include_str!("../migrations/2024-01-01-000000_create_tables/up.sql");

pub struct SqliteGateway {
    db: SqliteConnection,
}

impl SqliteGateway {
    /// Connects to the `sqlite3` database at `database_url` and makes sure every table exists.
    ///
    /// `:memory:` gives a private, empty database.
    pub fn open(database_url: &str) -> Result<Self, GatewayError> {
        let db =
            SqliteConnection::establish(database_url).map_err(|source| GatewayError::Connection {
                url: database_url.to_string(),
                source,
            })?;

        let mut gateway = Self { db };
        gateway.initialize_schema()?;

        tracing::debug!(database_url, "opened attendance database");
        Ok(gateway)
    }

    /// Creates any missing tables. Safe to call on an existing database.
    pub fn initialize_schema(&mut self) -> Result<(), GatewayError> {
        self.db
            .batch_execute(SCHEMA)
            .map_err(|err| GatewayError::Migration(err.to_string()))
    }

    fn now() -> NaiveDateTime {
        Utc::now().naive_utc()
    }

    /// Attaches teacher names and enrollment counts to classes.
    fn listings(&mut self, classes: Vec<Class>) -> Result<Vec<ClassListing>, GatewayError> {
        use schema::enrollments;
        use schema::users;

        let class_ids: Vec<&str> = classes.iter().map(|c| c.id.as_str()).collect();
        let teacher_ids: Vec<&str> = classes.iter().map(|c| c.teacher_id.as_str()).collect();

        let teacher_names: HashMap<String, String> = users::table
            .filter(users::id.eq_any(teacher_ids))
            .select((users::id, users::name))
            .load::<(String, String)>(&mut self.db)?
            .into_iter()
            .collect();

        let mut counts: HashMap<String, usize> = HashMap::new();
        for class_id in enrollments::table
            .filter(enrollments::class_id.eq_any(class_ids))
            .select(enrollments::class_id)
            .load::<String>(&mut self.db)?
        {
            *counts.entry(class_id).or_insert(0) += 1;
        }

        Ok(classes
            .into_iter()
            .map(|class| ClassListing {
                teacher_name: teacher_names
                    .get(&class.teacher_id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string()),
                student_count: counts.get(&class.id).copied().unwrap_or(0),
                class,
            })
            .collect())
    }
}

impl AttendanceGateway for SqliteGateway {
    fn fetch_roster(&mut self, class_id: &str) -> Result<Vec<RosterStudent>, GatewayError> {
        use schema::enrollments;
        use schema::users;

        Ok(enrollments::table
            .inner_join(users::table)
            .filter(enrollments::class_id.eq(class_id))
            .order((users::name, users::id))
            .select((users::id, users::name, users::email))
            .load::<RosterStudent>(&mut self.db)?)
    }

    fn fetch_attendance(
        &mut self,
        class_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, GatewayError> {
        use schema::attendance;

        Ok(attendance::table
            .filter(attendance::class_id.eq(class_id))
            .filter(attendance::date.eq(date))
            .select(AttendanceRecord::as_select())
            .load(&mut self.db)?)
    }

    fn fetch_attendance_history(
        &mut self,
        student_id: &str,
        class_id: Option<&str>,
    ) -> Result<Vec<AttendanceRecord>, GatewayError> {
        use schema::attendance;

        let mut query = attendance::table
            .filter(attendance::student_id.eq(student_id))
            .order((attendance::date.desc(), attendance::class_id))
            .select(AttendanceRecord::as_select())
            .into_boxed();

        if let Some(class_id) = class_id {
            query = query.filter(attendance::class_id.eq(class_id));
        }

        Ok(query.load(&mut self.db)?)
    }

    fn upsert_attendance(
        &mut self,
        mark: &AttendanceMark,
    ) -> Result<AttendanceRecord, GatewayError> {
        use schema::attendance;

        let record = AttendanceRecord {
            student_id: mark.student_id.clone(),
            class_id: mark.class_id.clone(),
            date: mark.date,
            status: mark.status,
            recorded_by: mark.recorded_by.clone(),
            recorded_at: Self::now(),
        };

        let (stored, changed) = self.db.transaction::<_, diesel::result::Error, _>(|conn| {
            let existing = attendance::table
                .find((record.student_id.as_str(), record.class_id.as_str(), record.date))
                .select(AttendanceRecord::as_select())
                .first(conn)
                .optional()?;

            // An identical mark leaves the stored row, including its timestamp, untouched.
            if let Some(existing) = existing {
                if existing.status == record.status && existing.recorded_by == record.recorded_by {
                    return Ok((existing, false));
                }
            }

            // If the record already exists, this replaces it.
            let stored = diesel::replace_into(attendance::table)
                .values(&record)
                .returning(AttendanceRecord::as_returning())
                .get_result(conn)?;

            Ok((stored, true))
        })?;

        tracing::debug!(
            student_id = %stored.student_id,
            class_id = %stored.class_id,
            date = %stored.date,
            status = %stored.status,
            changed,
            "upserted attendance record"
        );

        Ok(stored)
    }
}

impl DirectoryGateway for SqliteGateway {
    fn find_user(&mut self, user_id: &str) -> Result<Option<User>, GatewayError> {
        use schema::users;

        Ok(users::table
            .find(user_id)
            .select(User::as_select())
            .first(&mut self.db)
            .optional()?)
    }

    fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>, GatewayError> {
        use schema::users;

        Ok(users::table
            .filter(users::email.eq(email))
            .select(User::as_select())
            .first(&mut self.db)
            .optional()?)
    }

    fn list_users(&mut self) -> Result<Vec<User>, GatewayError> {
        use schema::users;

        Ok(users::table
            .order((users::created_at.desc(), users::email))
            .select(User::as_select())
            .load(&mut self.db)?)
    }

    fn insert_user(&mut self, user: &NewUser) -> Result<User, GatewayError> {
        use schema::users;

        let user = User {
            id: Uuid::new_v4().to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            created_at: Self::now(),
        };

        let stored = diesel::insert_into(users::table)
            .values(&user)
            .returning(User::as_returning())
            .get_result(&mut self.db)?;

        tracing::debug!(user_id = %stored.id, role = %stored.role, "inserted user");
        Ok(stored)
    }

    fn find_class(&mut self, class_id: &str) -> Result<Option<Class>, GatewayError> {
        use schema::classes;

        Ok(classes::table
            .find(class_id)
            .select(Class::as_select())
            .first(&mut self.db)
            .optional()?)
    }

    fn list_classes(
        &mut self,
        teacher_id: Option<&str>,
    ) -> Result<Vec<ClassListing>, GatewayError> {
        use schema::classes;

        let mut query = classes::table
            .order((classes::name, classes::id))
            .select(Class::as_select())
            .into_boxed();

        if let Some(teacher_id) = teacher_id {
            query = query.filter(classes::teacher_id.eq(teacher_id));
        }

        let found = query.load(&mut self.db)?;
        self.listings(found)
    }

    fn student_classes(&mut self, student_id: &str) -> Result<Vec<ClassListing>, GatewayError> {
        use schema::classes;
        use schema::enrollments;

        let found = enrollments::table
            .inner_join(classes::table)
            .filter(enrollments::student_id.eq(student_id))
            .order((classes::name, classes::id))
            .select(Class::as_select())
            .load(&mut self.db)?;

        self.listings(found)
    }

    fn insert_class(&mut self, class: &NewClass) -> Result<Class, GatewayError> {
        use schema::classes;

        let class = Class {
            id: Uuid::new_v4().to_string(),
            name: class.name.clone(),
            description: class.description.clone(),
            teacher_id: class.teacher_id.clone(),
        };

        let stored = diesel::insert_into(classes::table)
            .values(&class)
            .returning(Class::as_returning())
            .get_result(&mut self.db)?;

        tracing::debug!(class_id = %stored.id, teacher_id = %stored.teacher_id, "inserted class");
        Ok(stored)
    }

    fn enroll(&mut self, student_id: &str, class_id: &str) -> Result<bool, GatewayError> {
        use schema::enrollments;

        let enrollment = Enrollment {
            student_id: student_id.to_string(),
            class_id: class_id.to_string(),
        };

        // The pair is the primary key, so an existing enrollment is left alone.
        let inserted = diesel::insert_or_ignore_into(enrollments::table)
            .values(&enrollment)
            .execute(&mut self.db)?;

        tracing::debug!(student_id, class_id, inserted, "enrolled student");
        Ok(inserted == 1)
    }
}
