//! Schedule data model: shows, per-day schedules and the five-slot week.
//!
//! The wire format is one JSON document per weekday with a `shows` array.
//! A document that fails to parse, or lacks `shows`, is treated the same as
//! one that never arrived.

use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Number of weekdays the schedule covers (Monday..Friday)
pub const SCHEDULE_DAYS: usize = 5;

/// Seconds in one civil day
pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Weekday names, indexed 0 = Monday .. 4 = Friday.
/// Also the document names on the schedule server.
pub const WEEKDAY_NAMES: [&str; SCHEDULE_DAYS] =
    ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

/// A single show as published in a weekday document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Show {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "desc", default)]
    pub description: String,
    #[serde(default)]
    pub hosts: String,
    #[serde(default)]
    pub poster: String,
    /// Seconds since local midnight
    pub start_time: i64,
    /// Seconds since local midnight, exclusive
    pub end_time: i64,
    /// Informational only. The document a show came from decides its day.
    #[serde(default)]
    pub day: i64,
    #[serde(default, deserialize_with = "int_as_bool", serialize_with = "bool_as_int")]
    pub is_running: bool,
}

impl Show {
    /// Whether `now` falls inside the closed-open window [start_time, end_time)
    pub fn airs_at(&self, now: i64) -> bool {
        self.start_time <= now && now < self.end_time
    }

    /// Whether the window is empty or inverted
    pub fn has_empty_window(&self) -> bool {
        self.end_time <= self.start_time
    }
}

/// `is_running` arrives as 0/1; accept a JSON bool too.
fn int_as_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Int(i64),
        Bool(bool),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Int(n) => n != 0,
        Flag::Bool(b) => b,
    })
}

fn bool_as_int<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u8(u8::from(*value))
}

/// Errors while turning a weekday document into a [`DaySchedule`]
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("weekday index {0} is outside the Monday..Friday schedule")]
    WeekdayOutOfRange(usize),
    #[error("malformed {day} document: {source}")]
    Malformed {
        day: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
struct DayDocument {
    shows: Vec<Show>,
}

/// Shows for one weekday
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySchedule {
    /// 0 = Monday .. 4 = Friday
    pub weekday: usize,
    pub shows: Vec<Show>,
}

impl DaySchedule {
    pub fn new(weekday: usize, shows: Vec<Show>) -> Self {
        Self { weekday, shows }
    }

    pub fn name(&self) -> &'static str {
        WEEKDAY_NAMES[self.weekday % SCHEDULE_DAYS]
    }

    /// Parse a weekday document body.
    ///
    /// Shows with an empty or inverted window are kept as published and
    /// logged; they can never be current but may still be picked as next.
    pub fn from_json(weekday: usize, body: &[u8]) -> Result<Self, ScheduleError> {
        let day = *WEEKDAY_NAMES
            .get(weekday)
            .ok_or(ScheduleError::WeekdayOutOfRange(weekday))?;

        let doc: DayDocument = serde_json::from_slice(body)
            .map_err(|source| ScheduleError::Malformed { day, source })?;

        for show in doc.shows.iter().filter(|s| s.has_empty_window()) {
            warn!(
                "{} show \"{}\" has an empty window ({}..{})",
                day, show.name, show.start_time, show.end_time
            );
        }

        Ok(Self::new(weekday, doc.shows))
    }
}

/// Load state of one weekday slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DayState {
    /// Fetch not yet complete
    #[default]
    Pending,
    Ready(Arc<DaySchedule>),
    /// Fetch failed or the document was malformed
    Failed,
}

impl DayState {
    pub fn ready(&self) -> Option<&DaySchedule> {
        match self {
            DayState::Ready(day) => Some(day.as_ref()),
            DayState::Pending | DayState::Failed => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, DayState::Pending)
    }
}

/// The five weekday slots, indexed 0 = Monday .. 4 = Friday
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekSchedule {
    days: [DayState; SCHEDULE_DAYS],
}

impl WeekSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Week with every slot ready, in Monday..Friday order (test helper)
    pub fn from_days(days: [Vec<Show>; SCHEDULE_DAYS]) -> Self {
        let mut week = Self::new();
        for (idx, shows) in days.into_iter().enumerate() {
            week.days[idx] = DayState::Ready(Arc::new(DaySchedule::new(idx, shows)));
        }
        week
    }

    /// Slot for `weekday`, wrapping modulo five
    pub fn day(&self, weekday: usize) -> &DayState {
        &self.days[weekday % SCHEDULE_DAYS]
    }

    /// Replace one slot. Out-of-range indices are rejected, not wrapped.
    pub fn set_day(&mut self, weekday: usize, state: DayState) -> Result<(), ScheduleError> {
        let slot = self
            .days
            .get_mut(weekday)
            .ok_or(ScheduleError::WeekdayOutOfRange(weekday))?;
        *slot = state;
        Ok(())
    }

    /// True once no slot is still pending
    pub fn is_settled(&self) -> bool {
        !self.days.iter().any(DayState::is_pending)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DayState> {
        self.days.iter()
    }
}
