//! Appointment reminders.
//!
//! This module provides:
//! - The reminder-window lookup over the special-event calendar
//! - A `Clock` seam so "today" can be simulated in tests
//! - `ReminderMonitor`, which re-evaluates the reminder when "now" moves
//! - `ReminderTicker`, a background refresher released by its handle

use crate::{CalendarDate, Config, Result};
use chrono::Local;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// First event (in the given order) that is 1..=`window_days` days away
///
/// An event on `today` itself is not upcoming. The result is the first
/// match in list order, which is not necessarily the nearest event.
pub fn upcoming_event(
    today: CalendarDate,
    special_event_dates: &[CalendarDate],
    window_days: i64,
) -> Option<CalendarDate> {
    special_event_dates.iter().copied().find(|&event| {
        let days = (event - today).num_days();
        days > 0 && days <= window_days
    })
}

// ============================================================================
// Clock
// ============================================================================

/// Source of the current calendar date
pub trait Clock {
    fn today(&self) -> CalendarDate;
}

/// The local wall clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> CalendarDate {
        Local::now().date_naive()
    }
}

/// A clock that only moves when told to
///
/// Clones share the same date, so a test can keep one handle while a
/// monitor or ticker owns another.
#[derive(Clone, Debug)]
pub struct ManualClock {
    today: Arc<Mutex<CalendarDate>>,
}

impl ManualClock {
    pub fn new(today: CalendarDate) -> Self {
        Self {
            today: Arc::new(Mutex::new(today)),
        }
    }

    pub fn set(&self, date: CalendarDate) {
        let mut today = self.today.lock().unwrap_or_else(|e| e.into_inner());
        *today = date;
    }

    /// Move the clock forward by whole days
    pub fn advance_days(&self, days: u64) {
        let mut today = self.today.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(next) = today.checked_add_days(chrono::Days::new(days)) {
            *today = next;
        }
    }
}

impl Clock for ManualClock {
    fn today(&self) -> CalendarDate {
        *self.today.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ============================================================================
// Monitor
// ============================================================================

/// Outcome of re-evaluating the reminder
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReminderChange {
    Unchanged,
    /// A reminder appeared where there was none
    Raised(CalendarDate),
    /// The reminder now points at a different event
    Changed(CalendarDate),
    Cleared,
}

/// Tracks the current reminder against a clock
#[derive(Debug)]
pub struct ReminderMonitor<C: Clock> {
    clock: C,
    special_event_dates: Vec<CalendarDate>,
    window_days: i64,
    today: CalendarDate,
    current: Option<CalendarDate>,
}

impl<C: Clock> ReminderMonitor<C> {
    /// Create a monitor and evaluate the reminder for the clock's today
    pub fn new(clock: C, special_event_dates: Vec<CalendarDate>, window_days: i64) -> Self {
        let today = clock.today();
        let current = upcoming_event(today, &special_event_dates, window_days);
        Self {
            clock,
            special_event_dates,
            window_days,
            today,
            current,
        }
    }

    pub fn from_config(clock: C, config: &Config) -> Self {
        Self::new(
            clock,
            config.schedule.special_event_dates.clone(),
            config.reminder.window_days,
        )
    }

    /// Event currently being reminded about, if any
    pub fn current(&self) -> Option<CalendarDate> {
        self.current
    }

    /// Date the reminder was last evaluated for
    pub fn today(&self) -> CalendarDate {
        self.today
    }

    /// Re-read the clock and recompute the reminder
    pub fn refresh(&mut self) -> ReminderChange {
        let today = self.clock.today();
        let next = upcoming_event(today, &self.special_event_dates, self.window_days);
        let previous = std::mem::replace(&mut self.current, next);
        self.today = today;

        let change = match (previous, next) {
            (None, Some(event)) => ReminderChange::Raised(event),
            (Some(_), None) => ReminderChange::Cleared,
            (Some(old), Some(event)) if old != event => ReminderChange::Changed(event),
            _ => ReminderChange::Unchanged,
        };

        if change != ReminderChange::Unchanged {
            tracing::info!("Reminder for {}: {:?}", today, change);
        }
        change
    }
}

// ============================================================================
// Ticker
// ============================================================================

/// Handle to a background thread refreshing a `ReminderMonitor`
///
/// The thread stops when `stop()` is called or the handle is dropped.
pub struct ReminderTicker {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ReminderTicker {
    /// Refresh `monitor` every `interval`, calling `on_tick` after each refresh
    ///
    /// `on_tick` receives the change and the reminder now in effect.
    pub fn spawn<C, F>(
        mut monitor: ReminderMonitor<C>,
        interval: Duration,
        mut on_tick: F,
    ) -> Result<Self>
    where
        C: Clock + Send + 'static,
        F: FnMut(ReminderChange, Option<CalendarDate>) + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name("regimen-reminder".into())
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let change = monitor.refresh();
                        on_tick(change, monitor.current());
                    }
                    // Stop requested, or the handle went away
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        tracing::debug!("Reminder ticker started ({:?} interval)", interval);
        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Stop the ticker and wait for its thread to exit
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("Reminder ticker thread panicked");
            } else {
                tracing::debug!("Reminder ticker stopped");
            }
        }
    }
}

impl Drop for ReminderTicker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::mpsc::channel;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn events() -> Vec<CalendarDate> {
        vec![d(2025, 8, 2), d(2025, 9, 6), d(2025, 10, 11), d(2026, 3, 14)]
    }

    #[test]
    fn test_event_today_is_excluded() {
        assert_eq!(upcoming_event(d(2025, 8, 2), &events(), 14), None);
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        assert_eq!(upcoming_event(d(2025, 7, 19), &events(), 14), Some(d(2025, 8, 2)));
        assert_eq!(upcoming_event(d(2025, 7, 18), &events(), 14), None);
        assert_eq!(upcoming_event(d(2025, 8, 1), &events(), 14), Some(d(2025, 8, 2)));
    }

    #[test]
    fn test_past_events_are_ignored() {
        assert_eq!(upcoming_event(d(2025, 8, 3), &events(), 14), None);
        assert_eq!(upcoming_event(d(2026, 4, 1), &events(), 14), None);
    }

    #[test]
    fn test_first_match_in_list_order_wins() {
        let unordered = vec![d(2025, 8, 10), d(2025, 8, 5)];
        assert_eq!(upcoming_event(d(2025, 8, 1), &unordered, 14), Some(d(2025, 8, 10)));
    }

    #[test]
    fn test_empty_event_list() {
        assert_eq!(upcoming_event(d(2025, 8, 1), &[], 14), None);
    }

    #[test]
    fn test_monitor_tracks_clock() {
        let clock = ManualClock::new(d(2025, 7, 1));
        let mut monitor = ReminderMonitor::new(clock.clone(), events(), 14);
        assert_eq!(monitor.current(), None);

        assert_eq!(monitor.refresh(), ReminderChange::Unchanged);

        clock.set(d(2025, 7, 20));
        assert_eq!(monitor.refresh(), ReminderChange::Raised(d(2025, 8, 2)));
        assert_eq!(monitor.current(), Some(d(2025, 8, 2)));
        assert_eq!(monitor.today(), d(2025, 7, 20));

        clock.advance_days(13);
        assert_eq!(monitor.today(), d(2025, 7, 20));
        assert_eq!(monitor.refresh(), ReminderChange::Cleared);

        clock.set(d(2025, 8, 1));
        assert_eq!(monitor.refresh(), ReminderChange::Raised(d(2025, 8, 2)));
    }

    #[test]
    fn test_monitor_reports_changed_event() {
        let clock = ManualClock::new(d(2025, 8, 1));
        let mut monitor = ReminderMonitor::new(clock.clone(), vec![d(2025, 8, 2), d(2025, 8, 10)], 14);
        assert_eq!(monitor.current(), Some(d(2025, 8, 2)));

        clock.set(d(2025, 8, 2));
        assert_eq!(monitor.refresh(), ReminderChange::Changed(d(2025, 8, 10)));
    }

    #[test]
    fn test_monitor_from_config() {
        let clock = ManualClock::new(d(2026, 3, 1));
        let monitor = ReminderMonitor::from_config(clock, &Config::default());
        assert_eq!(monitor.current(), Some(d(2026, 3, 14)));
    }

    #[test]
    fn test_ticker_refreshes_until_stopped() {
        let clock = ManualClock::new(d(2025, 7, 1));
        let monitor = ReminderMonitor::new(clock.clone(), events(), 14);
        let (tx, rx) = channel();

        let ticker = ReminderTicker::spawn(monitor, Duration::from_millis(5), move |change, current| {
            let _ = tx.send((change, current));
        })
        .unwrap();

        clock.set(d(2025, 7, 25));
        let raised = loop {
            let (change, current) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
            if change != ReminderChange::Unchanged {
                break (change, current);
            }
        };
        assert_eq!(raised, (ReminderChange::Raised(d(2025, 8, 2)), Some(d(2025, 8, 2))));

        ticker.stop();
        // Sender moved into the thread is gone once it has been joined
        while rx.try_recv().is_ok() {}
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn test_ticker_stops_on_drop() {
        let monitor = ReminderMonitor::new(ManualClock::new(d(2025, 7, 1)), events(), 14);
        let (tx, rx) = channel::<()>();
        {
            let _ticker = ReminderTicker::spawn(monitor, Duration::from_secs(3600), move |_, _| {
                let _ = tx.send(());
            })
            .unwrap();
        }
        // Thread joined without ever ticking; its sender is dropped
        assert_eq!(rx.recv(), Err(std::sync::mpsc::RecvError));
    }
}
