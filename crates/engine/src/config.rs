//! # Engine Configuration
//!
//! Environment-driven settings for the slot maintenance engine.
//!
//! ## Environment Variables
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `SLOT_WINDOW_DAYS`: forward window guaranteed to hold slots (default: 7)
//! - `SLOT_RETENTION_DAYS`: age past which unbooked slots are retired (default: 3)
//! - `CLINIC_TIMEZONE`: IANA zone all civil dates and triggers use (default: "America/New_York")
//! - `REFRESH_AT`: daily composed refresh trigger, HH:MM (default: "00:01")
//! - `RETIRE_AT`: standalone retirement trigger, HH:MM (default: "01:00")
//! - `RECLAIM_AT`: standalone reclamation trigger, HH:MM (default: "02:00")
//! - `LOG_LEVEL`: logging level (default: "info")

use chrono::NaiveTime;
use chrono_tz::Tz;
use eyre::{Result, WrapErr};
use std::env;
use tracing::Level;

use clinislot_core::models::slot::parse_hhmm;

/// A daily trigger time in the configured civil zone.
///
/// Recurrence is expressed as data; the cron expression handed to the
/// job scheduler is derived from it internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobTime {
    pub hour: u8,
    pub minute: u8,
}

impl JobTime {
    pub const fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    /// Six-field cron expression firing once a day at this time.
    pub fn cron_expr(&self) -> String {
        format!("0 {} {} * * *", self.minute, self.hour)
    }
}

impl TryFrom<NaiveTime> for JobTime {
    type Error = eyre::Report;

    fn try_from(time: NaiveTime) -> Result<Self> {
        use chrono::Timelike;
        Ok(Self::new(time.hour() as u8, time.minute() as u8))
    }
}

/// Configuration for the slot maintenance engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// PostgreSQL database connection string
    pub database_url: String,

    /// Days ahead for which slots are guaranteed to exist
    pub window_days: u32,

    /// Unbooked slots older than this many days are retired
    pub retention_days: u32,

    /// Civil time zone for dates and trigger times
    pub timezone: Tz,

    /// Daily composed refresh trigger
    pub refresh_at: JobTime,

    /// Daily standalone retirement trigger
    pub retire_at: JobTime,

    /// Daily standalone reclamation trigger
    pub reclaim_at: JobTime,

    /// Log level for the application
    pub log_level: Level,
}

impl EngineConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is unset, a numeric value does
    /// not parse, the zone is not a valid IANA name, or a trigger time
    /// is not `HH:MM`.
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .wrap_err("DATABASE_URL environment variable must be set")?;

        let window_days = env::var("SLOT_WINDOW_DAYS")
            .unwrap_or_else(|_| "7".to_string())
            .parse()
            .wrap_err("Invalid SLOT_WINDOW_DAYS value")?;

        let retention_days = env::var("SLOT_RETENTION_DAYS")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .wrap_err("Invalid SLOT_RETENTION_DAYS value")?;

        let timezone: Tz = env::var("CLINIC_TIMEZONE")
            .unwrap_or_else(|_| "America/New_York".to_string())
            .parse()
            .map_err(|e| eyre::eyre!("Invalid CLINIC_TIMEZONE value: {e}"))?;

        let refresh_at = job_time_from_env("REFRESH_AT", JobTime::new(0, 1))?;
        let retire_at = job_time_from_env("RETIRE_AT", JobTime::new(1, 0))?;
        let reclaim_at = job_time_from_env("RECLAIM_AT", JobTime::new(2, 0))?;

        let log_level = match env::var("LOG_LEVEL")
            .unwrap_or_else(|_| "info".to_string())
            .as_str()
        {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        Ok(Self {
            database_url,
            window_days,
            retention_days,
            timezone,
            refresh_at,
            retire_at,
            reclaim_at,
            log_level,
        })
    }
}

fn job_time_from_env(key: &str, default: JobTime) -> Result<JobTime> {
    match env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => {
            let time = parse_hhmm(&raw)
                .map_err(|e| eyre::eyre!("Invalid {key} value: {e}"))?;
            JobTime::try_from(time)
        }
    }
}
