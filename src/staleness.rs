/// Staleness scheduler
/// Works out when the current selection stops being true (the current show
/// ends or the next one starts) and arms a single one-shot timer for it.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::schedule::SECONDS_PER_DAY;
use crate::selector::SelectionResult;

/// Added to every delay so the re-evaluation lands after the boundary,
/// not on it
pub const STALENESS_BUFFER: Duration = Duration::from_secs(1);

/// Seconds from `now_seconds` until the selection changes, without buffer.
/// Current show: until it ends, or until the next show starts if that comes
/// first (a show starting this very second is both current and next).
/// Otherwise next show: until it starts, counting its weekday offset as
/// whole days.
pub fn seconds_until_stale(result: &SelectionResult, now_seconds: u32) -> Option<i64> {
    let now = i64::from(now_seconds);

    let next = result.next.as_ref().map(|next| {
        (i64::from(next.offset) * SECONDS_PER_DAY)
            .saturating_add(next.show.start_time)
            .saturating_sub(now)
    });

    match &result.current {
        Some(current) => {
            let ends = current.show.end_time.saturating_sub(now);
            Some(next.filter(|&starts| starts >= 0).map_or(ends, |starts| ends.min(starts)))
        }
        None => next,
    }
}

/// Delay before the next re-evaluation, buffer included.
/// None means nothing will change and no timer should be armed.
pub fn staleness_delay(result: &SelectionResult, now_seconds: u32) -> Option<Duration> {
    seconds_until_stale(result, now_seconds)
        .map(|secs| Duration::from_secs(secs.max(0) as u64) + STALENESS_BUFFER)
}

/// Format a delay for logging
pub fn format_delay(d: Duration) -> String {
    let secs = d.as_secs();
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let mins = (secs % 3600) / 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, mins)
    } else if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m {}s", mins, secs % 60)
    }
}

/// Emitted once when an armed timer expires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleEvent {
    /// Which arming produced this event
    pub generation: u64,
}

struct ArmedTimer {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// One-shot timer with replace-on-arm semantics: at most one is ever live.
///
/// Must be used inside a tokio runtime.
pub struct StalenessTimer {
    events: mpsc::UnboundedSender<StaleEvent>,
    armed: Option<ArmedTimer>,
    generation: u64,
}

impl StalenessTimer {
    pub fn new(events: mpsc::UnboundedSender<StaleEvent>) -> Self {
        Self {
            events,
            armed: None,
            generation: 0,
        }
    }

    /// Arm for `delay`, replacing any timer still pending
    pub fn arm(&mut self, delay: Duration) {
        self.cancel();
        self.generation += 1;

        let generation = self.generation;
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let events = self.events.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = sleep(delay) => {
                    debug!("Selection stale (generation {})", generation);
                    let _ = events.send(StaleEvent { generation });
                }
                _ = token.cancelled() => {}
            }
        });

        self.armed = Some(ArmedTimer { cancel, handle });
    }

    /// Re-arm from a fresh selection, or disarm when nothing will change
    pub fn rearm(&mut self, result: &SelectionResult, now_seconds: u32) -> Option<Duration> {
        match staleness_delay(result, now_seconds) {
            Some(delay) => {
                debug!("Re-evaluating in {}", format_delay(delay));
                self.arm(delay);
                Some(delay)
            }
            None => {
                self.cancel();
                None
            }
        }
    }

    /// Disarm. Events already delivered by an earlier arming are marked
    /// stale by their generation.
    pub fn cancel(&mut self) {
        if let Some(armed) = self.armed.take() {
            armed.cancel.cancel();
            armed.handle.abort();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.as_ref().is_some_and(|a| !a.handle.is_finished())
    }

    /// Whether `event` came from the most recent arming
    pub fn is_current(&self, event: &StaleEvent) -> bool {
        event.generation == self.generation
    }
}

impl Drop for StalenessTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
