//! Creates the attendance database and optionally loads users from a CSV export.
//!
//! ```text
//! setup [users.csv]
//! ```
//!
//! The CSV needs `email,name,role` columns. Users whose email is already registered are skipped,
//! so running this again with an updated export only adds the newcomers.

use anyhow::{Context, Result};
use school_attendance::config::Settings;
use school_attendance::import;
use school_attendance::sqlite::SqliteGateway;
use std::fs::File;

pub fn main() -> Result<()> {
    let settings = Settings::load()?;
    school_attendance::init_logging(&settings.log_level);

    // Opening the gateway creates any missing tables.
    let mut gateway = SqliteGateway::open(&settings.database_url)?;
    println!("Database ready at {}", settings.database_url);

    if let Some(path) = std::env::args().nth(1) {
        let file = File::open(&path).with_context(|| format!("could not open {path}"))?;
        let report = import::import_users(&mut gateway, file)?;

        println!("Users added: {:#?}", report.added);
        println!("Already registered: {:#?}", report.skipped);
    }

    Ok(())
}
