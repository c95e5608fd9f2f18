#![forbid(unsafe_code)]

//! Core domain model and scheduling logic for Regimen.
//!
//! This crate provides:
//! - Domain types (treatments, slots, day schedules, month cells)
//! - The treatment catalog
//! - The schedule rule engine
//! - Calendar date utilities (weeks, month grids, navigation)
//! - Appointment reminders and the refresh ticker
//! - Configuration and logging setup

pub mod types;
pub mod error;
pub mod catalog;
pub mod calendar;
pub mod config;
pub mod logging;
pub mod engine;
pub mod reminder;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog, legend, Catalog};
pub use calendar::{
    month_grid, navigate, same_calendar_day, start_of_week, week_dates, View,
};
pub use config::{Config, DEFAULT_REMINDER_WINDOW_DAYS};
pub use engine::{DayRule, ScheduleEngine};
pub use reminder::{
    upcoming_event, Clock, ManualClock, ReminderChange, ReminderMonitor, ReminderTicker,
    SystemClock,
};
