use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Settings for the command-line application.
///
/// Values come from an optional `config.toml` in the working directory, overridden by
/// `ATTENDANCE_*` environment variables. `DATABASE_URL` (from the environment or a `.env` file)
/// is used when no database is configured.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub log_level: String,
    /// How many days the trend view covers by default.
    pub history_days: u32,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "attendance.sqlite3".to_string());

        let settings = Config::builder()
            .set_default("database_url", database_url)?
            .set_default("log_level", "info")?
            .set_default("history_days", 7)?
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("ATTENDANCE"))
            .build()?;

        settings.try_deserialize()
    }
}
