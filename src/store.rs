/// Schedule store
/// Passive cache of the latest known snapshot for each weekday. Writers
/// replace whole day slots; readers take cheap clones and can subscribe to
/// changes.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crate::schedule::{DayState, ScheduleError, WeekSchedule, SCHEDULE_DAYS, WEEKDAY_NAMES};

#[derive(Debug, Clone)]
pub struct ScheduleStore {
    tx: Arc<watch::Sender<WeekSchedule>>,
}

impl Default for ScheduleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleStore {
    /// Store with every day pending
    pub fn new() -> Self {
        Self::with_week(WeekSchedule::new())
    }

    pub fn with_week(week: WeekSchedule) -> Self {
        let (tx, _rx) = watch::channel(week);
        Self { tx: Arc::new(tx) }
    }

    /// Replace one weekday's slot. Subscribers are only woken when the slot
    /// actually changed.
    pub fn set_day(&self, weekday: usize, state: DayState) -> Result<(), ScheduleError> {
        if weekday >= SCHEDULE_DAYS {
            return Err(ScheduleError::WeekdayOutOfRange(weekday));
        }

        let changed = self.tx.send_if_modified(|week| {
            if week.day(weekday) == &state {
                return false;
            }
            week.set_day(weekday, state).is_ok()
        });

        if changed {
            debug!("{} schedule updated", WEEKDAY_NAMES[weekday]);
        }
        Ok(())
    }

    /// Current snapshot of all five days
    pub fn snapshot(&self) -> WeekSchedule {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WeekSchedule> {
        self.tx.subscribe()
    }

    /// Resolves once no day is pending
    pub async fn wait_settled(&self) {
        let mut rx = self.subscribe();
        // Only errors if the sender is gone, and `self` holds it
        let _ = rx.wait_for(WeekSchedule::is_settled).await;
    }
}
