//! Configuration file support for Regimen.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/regimen/config.toml`.
//! Dates are written as quoted `YYYY-MM-DD` strings.

use crate::{CalendarDate, Error, Result, ScheduleWindow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default reminder lookahead, in days
pub const DEFAULT_REMINDER_WINDOW_DAYS: i64 = 14;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub reminder: ReminderConfig,
}

/// Schedule anchor, active window and special-event calendar
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScheduleConfig {
    /// First day of the schedule; anchors the alternating hair-mask weeks
    #[serde(default = "default_start_date")]
    pub start_date: CalendarDate,

    /// First day after the schedule (exclusive)
    #[serde(default = "default_end_date")]
    pub end_date: CalendarDate,

    #[serde(default = "default_special_event_dates")]
    pub special_event_dates: Vec<CalendarDate>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            start_date: default_start_date(),
            end_date: default_end_date(),
            special_event_dates: default_special_event_dates(),
        }
    }
}

/// Appointment reminder configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ReminderConfig {
    #[serde(default = "default_window_days")]
    pub window_days: i64,

    /// How often the watcher re-reads the clock
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

// Default value functions
fn ymd(year: i32, month: u32, day: u32) -> CalendarDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn default_start_date() -> CalendarDate {
    ymd(2025, 6, 23)
}

fn default_end_date() -> CalendarDate {
    ymd(2026, 6, 23)
}

fn default_special_event_dates() -> Vec<CalendarDate> {
    vec![
        ymd(2025, 8, 2),
        ymd(2025, 9, 6),
        ymd(2025, 10, 11),
        ymd(2026, 3, 14),
    ]
}

fn default_window_days() -> i64 {
    DEFAULT_REMINDER_WINDOW_DAYS
}

fn default_refresh_interval_secs() -> u64 {
    60
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("regimen").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject settings the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.schedule.end_date <= self.schedule.start_date {
            return Err(Error::Config(format!(
                "end_date {} must be after start_date {}",
                self.schedule.end_date, self.schedule.start_date
            )));
        }
        if self.reminder.window_days <= 0 {
            return Err(Error::Config(format!(
                "reminder window_days must be positive, got {}",
                self.reminder.window_days
            )));
        }
        if self.reminder.refresh_interval_secs == 0 {
            return Err(Error::Config(
                "reminder refresh_interval_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    /// The active schedule window
    pub fn window(&self) -> ScheduleWindow {
        ScheduleWindow::new(self.schedule.start_date, self.schedule.end_date)
    }
}
