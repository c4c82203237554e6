//! Show selection
//!
//! Given the five-day schedule and the current weekday/time-of-day, finds the
//! show airing now and the nearest upcoming show, each tagged with how many
//! days ahead of today it airs.

use crate::schedule::{DaySchedule, Show, WeekSchedule, SCHEDULE_DAYS};

/// A selected show and the number of days ahead of today it airs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub show: Show,
    /// 0 = today, 1..4 = later in the schedule week
    pub offset: u32,
}

/// Outcome of one evaluation. Recomputed on every pass, never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionResult {
    pub current: Option<Placement>,
    pub next: Option<Placement>,
}

impl SelectionResult {
    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.next.is_none()
    }

    pub fn current_show(&self) -> Option<&Show> {
        self.current.as_ref().map(|p| &p.show)
    }

    pub fn next_show(&self) -> Option<&Show> {
        self.next.as_ref().map(|p| &p.show)
    }
}

/// Select the current and next show.
///
/// `today` is 0 = Monday .. 6 = Sunday. Days are visited at offsets 0..4 as
/// `(today % 5 + offset) % 5`, so a weekend `today` lands on a weekday slot for
/// the next-show search. Only a weekday `today` gets a current-show check.
/// Days that are pending or failed are skipped.
pub fn select(schedule: &WeekSchedule, today: u32, now_seconds: u32) -> SelectionResult {
    let now = i64::from(now_seconds);
    let mut result = SelectionResult::default();

    for offset in 0..SCHEDULE_DAYS as u32 {
        let slot = ((today % SCHEDULE_DAYS as u32 + offset) % SCHEDULE_DAYS as u32) as usize;
        let Some(day) = schedule.day(slot).ready() else {
            continue;
        };

        if offset == 0 && (today as usize) < SCHEDULE_DAYS {
            result.current = current_on(day, now).map(|show| Placement {
                show: show.clone(),
                offset,
            });
        }

        if result.next.is_none() {
            result.next = next_on(day, offset, now).map(|show| Placement {
                show: show.clone(),
                offset,
            });
        }

        if result.next.is_some() {
            break;
        }
    }

    result
}

/// First running show whose [start_time, end_time) window contains `now`.
/// Overlapping shows are not supported; the earliest listed wins.
fn current_on(day: &DaySchedule, now: i64) -> Option<&Show> {
    day.shows.iter().find(|show| show.is_running && show.airs_at(now))
}

/// Next-show candidate on the day at `offset`.
///
/// Today: the running show with the smallest start_time not before `now`
/// (ties go to the earliest listed). This is the chronologically nearest
/// show, not the first listed match, so an out-of-order document still
/// yields the right one. Later days: the earliest-listed running
/// show, without looking at its start_time. That asymmetry is long-standing
/// behavior consumers rely on and is kept as is.
fn next_on(day: &DaySchedule, offset: u32, now: i64) -> Option<&Show> {
    let mut running = day.shows.iter().filter(|show| show.is_running);

    if offset > 0 {
        return running.next();
    }

    running
        .filter(|show| show.start_time >= now)
        .fold(None, |best: Option<&Show>, show| match best {
            Some(b) if b.start_time <= show.start_time => Some(b),
            _ => Some(show),
        })
}
