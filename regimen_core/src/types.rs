//! Core domain types for the Regimen schedule.
//!
//! This module defines the fundamental types used throughout the system:
//! - Calendar dates and the schedule window
//! - Treatment entries and layout dividers
//! - Day schedules split into morning/midday/evening slots
//! - Month grid cells

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A date at day granularity. There is no time-of-day component.
pub type CalendarDate = NaiveDate;

// ============================================================================
// Treatment Types
// ============================================================================

/// Display category of a treatment (presentation maps this to icon/color)
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Minoxidil,
    Topical,
    LightTherapy,
    Microneedling,
    MedicatedShampoo,
    Shampoo,
    HairMask,
    Procedure,
    Serum,
}

/// Identifier for every fixed entry the schedule can emit
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentId {
    /// Primary procedure on a special-event day
    PrpProcedure,
    /// Evening recovery on a special-event day
    Recovery,
    MorningMinoxidil,
    RedLight,
    EveningMinoxidil,
    Serum,
    /// Topical treatment B (Tuesday/Wednesday/Thursday evenings)
    Ru58841,
    /// Wednesday post-gym shampoo
    GymShampoo,
    /// Saturday medicated shampoo
    Nizoral,
    Microneedling,
    /// Saturday replacement for the scalp routine in a special-event week
    RestDay,
    /// Hair mask A, even weeks since the schedule start
    K18,
    /// Hair mask B, odd weeks since the schedule start
    DeepConditioning,
}

impl TreatmentId {
    /// All identifiers, in legend order
    pub const ALL: [TreatmentId; 13] = [
        TreatmentId::PrpProcedure,
        TreatmentId::Recovery,
        TreatmentId::MorningMinoxidil,
        TreatmentId::RedLight,
        TreatmentId::EveningMinoxidil,
        TreatmentId::Serum,
        TreatmentId::Ru58841,
        TreatmentId::GymShampoo,
        TreatmentId::Nizoral,
        TreatmentId::Microneedling,
        TreatmentId::RestDay,
        TreatmentId::K18,
        TreatmentId::DeepConditioning,
    ];
}

/// A single treatment to apply
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreatmentEntry {
    pub id: TreatmentId,
    pub name: String,
    pub category: Category,
}

/// A layout separator inside a slot; not a treatment
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DividerEntry {
    pub label: String,
}

/// One item of a slot's ordered entry list
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entry {
    Treatment(TreatmentEntry),
    Divider(DividerEntry),
}

impl Entry {
    /// Build a divider entry with the given label
    pub fn divider(label: impl Into<String>) -> Self {
        Entry::Divider(DividerEntry {
            label: label.into(),
        })
    }

    /// The treatment, or None for dividers
    pub fn as_treatment(&self) -> Option<&TreatmentEntry> {
        match self {
            Entry::Treatment(t) => Some(t),
            Entry::Divider(_) => None,
        }
    }
}

impl From<TreatmentEntry> for Entry {
    fn from(entry: TreatmentEntry) -> Self {
        Entry::Treatment(entry)
    }
}

// ============================================================================
// Day Schedule
// ============================================================================

/// Time-of-day slot
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Morning,
    Midday,
    Evening,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Morning, Slot::Midday, Slot::Evening];

    pub fn label(self) -> &'static str {
        match self {
            Slot::Morning => "Morning",
            Slot::Midday => "Midday",
            Slot::Evening => "Evening",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything scheduled for one day, per slot, in application order
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DaySchedule {
    pub morning: Vec<Entry>,
    pub midday: Vec<Entry>,
    pub evening: Vec<Entry>,
}

impl DaySchedule {
    /// Entries of a single slot
    pub fn slot(&self, slot: Slot) -> &[Entry] {
        match slot {
            Slot::Morning => &self.morning,
            Slot::Midday => &self.midday,
            Slot::Evening => &self.evening,
        }
    }

    pub(crate) fn slot_mut(&mut self, slot: Slot) -> &mut Vec<Entry> {
        match slot {
            Slot::Morning => &mut self.morning,
            Slot::Midday => &mut self.midday,
            Slot::Evening => &mut self.evening,
        }
    }

    /// All treatments of the day (dividers skipped), morning to evening
    pub fn treatments(&self) -> impl Iterator<Item = &TreatmentEntry> {
        self.morning
            .iter()
            .chain(&self.midday)
            .chain(&self.evening)
            .filter_map(Entry::as_treatment)
    }

    pub fn treatment_count(&self) -> usize {
        self.treatments().count()
    }

    /// True when no slot holds any entry
    pub fn is_empty(&self) -> bool {
        self.morning.is_empty() && self.midday.is_empty() && self.evening.is_empty()
    }
}

// ============================================================================
// Calendar Types
// ============================================================================

/// One cell of a month grid
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthCell {
    pub date: CalendarDate,
    pub is_current_month: bool,
}

/// Half-open range `[start, end)` during which the schedule is active
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleWindow {
    pub start: CalendarDate,
    pub end: CalendarDate,
}

impl ScheduleWindow {
    pub fn new(start: CalendarDate, end: CalendarDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: CalendarDate) -> bool {
        self.start <= date && date < self.end
    }
}

/// Parse a `YYYY-MM-DD` string into a calendar date
///
/// Strings that do not name a real day (e.g. `2025-02-30`) are rejected.
pub fn parse_date(s: &str) -> crate::Result<CalendarDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| crate::Error::InvalidDate(format!("'{}': {}", s, e)))
}
