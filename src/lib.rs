//! Attendance tracking for a school: teachers mark daily attendance per class, students review
//! their history, admins manage users and classes.
//!
//! The interesting parts are small and pure: [`roster::merge_roster`] reconciles a class roster
//! with a day's records, [`stats::AttendanceSummary`] aggregates records, and
//! [`writer::mark_attendance`] validates and upserts a single mark. Storage sits behind the traits
//! in [`gateway`].

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod gateway;
pub mod import;
pub mod manager;
pub mod models;
pub mod roster;
pub mod schema;
pub mod session;
pub mod sqlite;
pub mod stats;
pub mod writer;

pub use error::{AttendanceError, GatewayError};
pub use manager::AttendanceManager;
pub use models::{AttendanceRecord, Role, Status, User};
pub use session::Session;

/// Installs the global `tracing` subscriber. `RUST_LOG` takes precedence over `default_level`.
pub fn init_logging(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
