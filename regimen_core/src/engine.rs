//! Treatment scheduling rule engine.
//!
//! Derives the ordered list of treatments for a calendar date:
//! - Special-event days get a fixed override schedule
//! - Otherwise a daily base routine is laid down
//! - Then a per-weekday rule appends (or, on Wednesday, prepends) extras
//!
//! The engine holds only configuration and is safe to share across threads.

use crate::calendar::{same_calendar_day, same_week};
use crate::catalog::{get_default_catalog, Catalog, WEDNESDAY_DIVIDER_LABEL};
use crate::{CalendarDate, Config, DaySchedule, Entry, ScheduleWindow, Slot, TreatmentId};
use chrono::{Datelike, Weekday};

/// Weekday-specific additions applied after the base routine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DayRule {
    /// Sunday, Monday, Friday
    BaseOnly,
    /// Tuesday, Thursday: topical treatment in the evening
    EveningTopical,
    /// Wednesday: post-gym divider and shampoo at the front of the morning,
    /// topical treatment in the evening
    GymDay,
    /// Saturday: scalp routine (or rest in a special-event week) and the
    /// alternating hair mask
    ScalpDay,
}

impl DayRule {
    pub fn for_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sun | Weekday::Mon | Weekday::Fri => DayRule::BaseOnly,
            Weekday::Tue | Weekday::Thu => DayRule::EveningTopical,
            Weekday::Wed => DayRule::GymDay,
            Weekday::Sat => DayRule::ScalpDay,
        }
    }
}

/// The schedule rule engine
#[derive(Clone, Debug)]
pub struct ScheduleEngine {
    catalog: &'static Catalog,
    special_event_dates: Vec<CalendarDate>,
    window: ScheduleWindow,
}

impl ScheduleEngine {
    /// Create an engine over the given special-event dates and window
    ///
    /// `window.start` anchors the alternating hair-mask weeks.
    pub fn new(special_event_dates: Vec<CalendarDate>, window: ScheduleWindow) -> Self {
        Self {
            catalog: get_default_catalog(),
            special_event_dates,
            window,
        }
    }

    /// Create an engine from loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.schedule.special_event_dates.clone(), config.window())
    }

    pub fn special_event_dates(&self) -> &[CalendarDate] {
        &self.special_event_dates
    }

    pub fn window(&self) -> ScheduleWindow {
        self.window
    }

    /// True when `date` is one of the special-event days
    pub fn is_special_event_day(&self, date: CalendarDate) -> bool {
        self.special_event_dates
            .iter()
            .any(|&event| same_calendar_day(event, date))
    }

    /// True when `date` lies in the Sunday..Saturday week of any special event
    pub fn is_special_event_week(&self, date: CalendarDate) -> bool {
        self.special_event_dates
            .iter()
            .any(|&event| same_week(event, date))
    }

    /// Whole weeks elapsed since the schedule start, floored
    ///
    /// Dates before the start give negative values.
    pub fn weeks_since_start(&self, date: CalendarDate) -> i64 {
        (date - self.window.start).num_days().div_euclid(7)
    }

    /// Hair mask for a Saturday: K18 on even weeks, deep conditioning on odd
    pub fn hair_mask_for(&self, date: CalendarDate) -> TreatmentId {
        if self.weeks_since_start(date).rem_euclid(2) == 0 {
            TreatmentId::K18
        } else {
            TreatmentId::DeepConditioning
        }
    }

    /// Derive everything scheduled for `date`
    pub fn treatments_for_date(&self, date: CalendarDate) -> DaySchedule {
        let weekday = date.weekday();
        let mut schedule = DaySchedule::default();

        if self.is_special_event_day(date) {
            tracing::debug!("{} is a special-event day, using override schedule", date);
            self.push(&mut schedule, Slot::Morning, TreatmentId::PrpProcedure);
            self.push(&mut schedule, Slot::Evening, TreatmentId::Recovery);
            return schedule;
        }

        let special_week = self.is_special_event_week(date);

        // Base routine
        if weekday != Weekday::Sat {
            self.push(&mut schedule, Slot::Morning, TreatmentId::MorningMinoxidil);
        }
        if weekday.num_days_from_monday() < 5 {
            self.push(&mut schedule, Slot::Midday, TreatmentId::RedLight);
        }
        if weekday != Weekday::Sat {
            self.push(&mut schedule, Slot::Evening, TreatmentId::EveningMinoxidil);
            self.push(&mut schedule, Slot::Evening, TreatmentId::Serum);
        }

        match DayRule::for_weekday(weekday) {
            DayRule::BaseOnly => {}
            DayRule::EveningTopical => {
                self.push(&mut schedule, Slot::Evening, TreatmentId::Ru58841);
            }
            DayRule::GymDay => {
                let mut front = vec![Entry::divider(WEDNESDAY_DIVIDER_LABEL)];
                front.extend(self.catalog.entry(TreatmentId::GymShampoo));
                schedule.morning.splice(0..0, front);
                self.push(&mut schedule, Slot::Evening, TreatmentId::Ru58841);
            }
            DayRule::ScalpDay => {
                if special_week {
                    tracing::debug!("{} falls in a special-event week, resting scalp", date);
                    self.push(&mut schedule, Slot::Morning, TreatmentId::RestDay);
                } else {
                    self.push(&mut schedule, Slot::Morning, TreatmentId::Nizoral);
                    self.push(&mut schedule, Slot::Morning, TreatmentId::Microneedling);
                }
                self.push(&mut schedule, Slot::Evening, self.hair_mask_for(date));
            }
        }

        schedule
    }

    /// Schedules for a sequence of dates, e.g. a week or a month grid
    pub fn schedules_for<I>(&self, dates: I) -> Vec<(CalendarDate, DaySchedule)>
    where
        I: IntoIterator<Item = CalendarDate>,
    {
        dates
            .into_iter()
            .map(|date| (date, self.treatments_for_date(date)))
            .collect()
    }

    fn push(&self, schedule: &mut DaySchedule, slot: Slot, id: TreatmentId) {
        schedule.slot_mut(slot).extend(self.catalog.entry(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::week_dates;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn ids(entries: &[Entry]) -> Vec<Option<TreatmentId>> {
        entries
            .iter()
            .map(|e| e.as_treatment().map(|t| t.id))
            .collect()
    }

    fn some(list: &[TreatmentId]) -> Vec<Option<TreatmentId>> {
        list.iter().copied().map(Some).collect()
    }

    fn create_test_engine() -> ScheduleEngine {
        // 2025-06-23 is a Monday; 2025-08-02 is a Saturday
        ScheduleEngine::new(
            vec![d(2025, 8, 2), d(2025, 9, 6), d(2025, 10, 11), d(2026, 3, 14)],
            ScheduleWindow::new(d(2025, 6, 23), d(2026, 6, 23)),
        )
    }

    fn engine_without_events() -> ScheduleEngine {
        ScheduleEngine::new(vec![], ScheduleWindow::new(d(2025, 6, 23), d(2026, 6, 23)))
    }

    #[test]
    fn test_special_event_day_overrides() {
        crate::logging::init_test();
        let engine = create_test_engine();

        for &date in engine.special_event_dates() {
            let schedule = engine.treatments_for_date(date);
            assert_eq!(ids(&schedule.morning), some(&[TreatmentId::PrpProcedure]));
            assert!(schedule.midday.is_empty());
            assert_eq!(ids(&schedule.evening), some(&[TreatmentId::Recovery]));
        }
    }

    #[test]
    fn test_special_event_override_ignores_weekday() {
        // A Wednesday event must not get the divider or the gym shampoo
        let engine = ScheduleEngine::new(
            vec![d(2025, 7, 2)],
            ScheduleWindow::new(d(2025, 6, 23), d(2026, 6, 23)),
        );
        let schedule = engine.treatments_for_date(d(2025, 7, 2));
        assert_eq!(ids(&schedule.morning), some(&[TreatmentId::PrpProcedure]));
        assert!(schedule.midday.is_empty());
        assert_eq!(ids(&schedule.evening), some(&[TreatmentId::Recovery]));
    }

    #[test]
    fn test_base_only_days() {
        let engine = engine_without_events();

        // Sunday: no midday
        let sunday = engine.treatments_for_date(d(2025, 6, 29));
        assert_eq!(ids(&sunday.morning), some(&[TreatmentId::MorningMinoxidil]));
        assert!(sunday.midday.is_empty());
        assert_eq!(
            ids(&sunday.evening),
            some(&[TreatmentId::EveningMinoxidil, TreatmentId::Serum])
        );

        // Monday and Friday: red light at midday
        for date in [d(2025, 6, 23), d(2025, 6, 27)] {
            let schedule = engine.treatments_for_date(date);
            assert_eq!(ids(&schedule.morning), some(&[TreatmentId::MorningMinoxidil]));
            assert_eq!(ids(&schedule.midday), some(&[TreatmentId::RedLight]));
            assert_eq!(
                ids(&schedule.evening),
                some(&[TreatmentId::EveningMinoxidil, TreatmentId::Serum])
            );
        }
    }

    #[test]
    fn test_tuesday_thursday_topical_appended_once() {
        let engine = engine_without_events();

        for date in [d(2025, 6, 24), d(2025, 6, 26)] {
            let schedule = engine.treatments_for_date(date);
            assert_eq!(
                ids(&schedule.evening),
                some(&[
                    TreatmentId::EveningMinoxidil,
                    TreatmentId::Serum,
                    TreatmentId::Ru58841
                ])
            );
            assert_eq!(ids(&schedule.midday), some(&[TreatmentId::RedLight]));
        }
    }

    #[test]
    fn test_wednesday_divider_leads_morning() {
        let engine = engine_without_events();
        let schedule = engine.treatments_for_date(d(2025, 6, 25));

        assert_eq!(schedule.morning.len(), 3);
        assert_eq!(schedule.morning[0], Entry::divider(WEDNESDAY_DIVIDER_LABEL));
        assert_eq!(
            ids(&schedule.morning[1..]),
            some(&[TreatmentId::GymShampoo, TreatmentId::MorningMinoxidil])
        );
        assert_eq!(ids(&schedule.midday), some(&[TreatmentId::RedLight]));
        assert_eq!(
            ids(&schedule.evening),
            some(&[
                TreatmentId::EveningMinoxidil,
                TreatmentId::Serum,
                TreatmentId::Ru58841
            ])
        );
    }

    #[test]
    fn test_saturday_outside_special_week() {
        let engine = create_test_engine();
        let schedule = engine.treatments_for_date(d(2025, 6, 28));

        assert_eq!(
            ids(&schedule.morning),
            some(&[TreatmentId::Nizoral, TreatmentId::Microneedling])
        );
        assert!(schedule.midday.is_empty());
        assert_eq!(schedule.evening.len(), 1);
    }

    #[test]
    fn test_saturday_in_special_week_rests() {
        // Event on Wednesday 2025-07-16; the Saturday of that week rests
        let engine = ScheduleEngine::new(
            vec![d(2025, 7, 16)],
            ScheduleWindow::new(d(2025, 6, 23), d(2026, 6, 23)),
        );
        let schedule = engine.treatments_for_date(d(2025, 7, 19));

        assert_eq!(ids(&schedule.morning), some(&[TreatmentId::RestDay]));
        assert!(schedule.midday.is_empty());
        assert_eq!(schedule.evening.len(), 1);
    }

    #[test]
    fn test_special_week_is_calendar_week() {
        // Event on Sunday 2025-07-20: the Saturday before belongs to the
        // previous week, the Saturday after to the event's week
        let engine = ScheduleEngine::new(
            vec![d(2025, 7, 20)],
            ScheduleWindow::new(d(2025, 6, 23), d(2026, 6, 23)),
        );

        assert!(!engine.is_special_event_week(d(2025, 7, 19)));
        assert!(engine.is_special_event_week(d(2025, 7, 26)));
        assert_eq!(
            ids(&engine.treatments_for_date(d(2025, 7, 19)).morning),
            some(&[TreatmentId::Nizoral, TreatmentId::Microneedling])
        );
        assert_eq!(
            ids(&engine.treatments_for_date(d(2025, 7, 26)).morning),
            some(&[TreatmentId::RestDay])
        );
    }

    #[test]
    fn test_special_week_only_changes_saturday() {
        let engine = ScheduleEngine::new(
            vec![d(2025, 7, 16)],
            ScheduleWindow::new(d(2025, 6, 23), d(2026, 6, 23)),
        );
        let plain = engine_without_events();

        for date in week_dates(d(2025, 7, 16)) {
            if date.weekday() == Weekday::Sat || date == d(2025, 7, 16) {
                continue;
            }
            assert_eq!(
                engine.treatments_for_date(date),
                plain.treatments_for_date(date),
                "{}",
                date
            );
        }
    }

    #[test]
    fn test_hair_mask_alternates_from_start() {
        let engine = engine_without_events();

        let mask = |date| ids(&engine.treatments_for_date(date).evening);
        assert_eq!(mask(d(2025, 6, 28)), some(&[TreatmentId::K18]));
        assert_eq!(mask(d(2025, 7, 5)), some(&[TreatmentId::DeepConditioning]));
        assert_eq!(mask(d(2025, 7, 12)), some(&[TreatmentId::K18]));

        assert_eq!(engine.weeks_since_start(d(2025, 6, 28)), 0);
        assert_eq!(engine.weeks_since_start(d(2025, 7, 5)), 1);
        assert_eq!(engine.weeks_since_start(d(2025, 7, 12)), 2);
    }

    #[test]
    fn test_hair_mask_in_special_week_still_alternates() {
        // Event on Wednesday 2025-07-09; its Saturday is week 2
        let engine = ScheduleEngine::new(
            vec![d(2025, 7, 9)],
            ScheduleWindow::new(d(2025, 6, 23), d(2026, 6, 23)),
        );
        let schedule = engine.treatments_for_date(d(2025, 7, 12));
        assert_eq!(ids(&schedule.morning), some(&[TreatmentId::RestDay]));
        assert_eq!(ids(&schedule.evening), some(&[TreatmentId::K18]));
    }

    #[test]
    fn test_weeks_before_start_are_floored() {
        let engine = engine_without_events();
        // 2025-06-21 is two days before the start: week -1, odd
        assert_eq!(engine.weeks_since_start(d(2025, 6, 21)), -1);
        assert_eq!(engine.hair_mask_for(d(2025, 6, 21)), TreatmentId::DeepConditioning);
        // 2025-06-14 is week -2, even
        assert_eq!(engine.weeks_since_start(d(2025, 6, 14)), -2);
        assert_eq!(engine.hair_mask_for(d(2025, 6, 14)), TreatmentId::K18);
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let engine = create_test_engine();
        for date in week_dates(d(2025, 9, 3)) {
            assert_eq!(engine.treatments_for_date(date), engine.treatments_for_date(date));
        }
    }

    #[test]
    fn test_day_rule_table() {
        assert_eq!(DayRule::for_weekday(Weekday::Sun), DayRule::BaseOnly);
        assert_eq!(DayRule::for_weekday(Weekday::Mon), DayRule::BaseOnly);
        assert_eq!(DayRule::for_weekday(Weekday::Tue), DayRule::EveningTopical);
        assert_eq!(DayRule::for_weekday(Weekday::Wed), DayRule::GymDay);
        assert_eq!(DayRule::for_weekday(Weekday::Thu), DayRule::EveningTopical);
        assert_eq!(DayRule::for_weekday(Weekday::Fri), DayRule::BaseOnly);
        assert_eq!(DayRule::for_weekday(Weekday::Sat), DayRule::ScalpDay);
    }

    #[test]
    fn test_schedules_for_week() {
        let engine = create_test_engine();
        let week = engine.schedules_for(week_dates(d(2025, 7, 30)));

        assert_eq!(week.len(), 7);
        // Saturday of that week is the 2025-08-02 event
        let (saturday, schedule) = &week[6];
        assert_eq!(*saturday, d(2025, 8, 2));
        assert_eq!(ids(&schedule.morning), some(&[TreatmentId::PrpProcedure]));
    }

    #[test]
    fn test_special_week_at_end_of_date_range() {
        let engine = ScheduleEngine::new(
            vec![NaiveDate::MAX],
            ScheduleWindow::new(d(2025, 6, 23), d(2026, 6, 23)),
        );
        assert!(engine.is_special_event_week(NaiveDate::MAX));
        assert!(!engine.is_special_event_week(d(2025, 7, 19)));
        assert_eq!(
            ids(&engine.treatments_for_date(NaiveDate::MAX).evening),
            some(&[TreatmentId::Recovery])
        );
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ScheduleEngine>();
    }
}
