//! Countdown presenter
//!
//! Turns a target instant into a coarse relative phrase ("in 5 minutes",
//! "2 hours ago") and keeps it fresh with a one-second tick that only
//! re-renders when the phrase actually changes.

use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::clock::Clock;

/// Render hook, called with the full label + phrase
pub type RenderFn = Arc<dyn Fn(&str) + Send + Sync>;

const TICK: Duration = Duration::from_secs(1);

// Rounding thresholds for each unit
const SECONDS_THRESHOLD: f64 = 45.0;
const MINUTES_THRESHOLD: f64 = 45.0;
const HOURS_THRESHOLD: f64 = 22.0;
const DAYS_THRESHOLD: f64 = 26.0;
const MONTHS_THRESHOLD: f64 = 11.0;

/// Phrase for a signed span without direction, e.g. "a minute", "3 hours"
fn humanize(millis: i64) -> String {
    let ms = millis.unsigned_abs() as f64;
    let seconds = (ms / 1_000.0).round();
    let minutes = (ms / 60_000.0).round();
    let hours = (ms / 3_600_000.0).round();
    let exact_days = ms / 86_400_000.0;
    let days = exact_days.round();
    // 400 years have 4800 months and 146097 days
    let exact_months = exact_days * 4800.0 / 146_097.0;
    let months = exact_months.round();
    let years = (exact_months / 12.0).round();

    if seconds < SECONDS_THRESHOLD {
        "a few seconds".to_string()
    } else if minutes <= 1.0 {
        "a minute".to_string()
    } else if minutes < MINUTES_THRESHOLD {
        format!("{} minutes", minutes as u64)
    } else if hours <= 1.0 {
        "an hour".to_string()
    } else if hours < HOURS_THRESHOLD {
        format!("{} hours", hours as u64)
    } else if days <= 1.0 {
        "a day".to_string()
    } else if days < DAYS_THRESHOLD {
        format!("{} days", days as u64)
    } else if months <= 1.0 {
        "a month".to_string()
    } else if months < MONTHS_THRESHOLD {
        format!("{} months", months as u64)
    } else if years <= 1.0 {
        "a year".to_string()
    } else {
        format!("{} years", years as u64)
    }
}

/// Relative phrase from `now` to `target`: "in …" when the target is still
/// ahead, "… ago" otherwise (including exactly now).
pub fn relative_time<T: TimeZone, U: TimeZone>(target: &DateTime<T>, now: &DateTime<U>) -> String {
    let millis = target.timestamp_millis() - now.timestamp_millis();
    let phrase = humanize(millis);
    if millis > 0 {
        format!("in {}", phrase)
    } else {
        format!("{} ago", phrase)
    }
}

/// [`relative_time`] with an optional label such as "ends " or "starts "
pub fn format<T: TimeZone, U: TimeZone>(
    target: &DateTime<T>,
    now: &DateTime<U>,
    prefix: Option<&str>,
) -> String {
    let relative = relative_time(target, now);
    match prefix {
        Some(prefix) => format!("{}{}", prefix, relative),
        None => relative,
    }
}

/// A live countdown: one tick task per instance.
///
/// Renders once immediately, then on whole-second ticks only when the text
/// differs from the last render. Dropping or cancelling stops the tick.
pub struct Countdown {
    target: DateTime<Tz>,
    prefix: Option<String>,
    clock: Arc<dyn Clock>,
    render: RenderFn,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Countdown {
    /// Start counting toward `target`. Must be called inside a tokio runtime.
    pub fn spawn(
        target: DateTime<Tz>,
        prefix: Option<String>,
        clock: Arc<dyn Clock>,
        render: RenderFn,
    ) -> Self {
        let cancel = CancellationToken::new();
        let handle = Self::start_tick(target, prefix.clone(), clock.clone(), render.clone(), cancel.clone());

        Self {
            target,
            prefix,
            clock,
            render,
            cancel,
            handle,
        }
    }

    pub fn target(&self) -> DateTime<Tz> {
        self.target
    }

    /// Point at a new instant, replacing the running tick.
    /// No-op when the target is unchanged.
    pub fn retarget(&mut self, target: DateTime<Tz>) {
        if target == self.target && !self.handle.is_finished() {
            return;
        }
        self.cancel();
        self.target = target;
        self.cancel = CancellationToken::new();
        self.handle = Self::start_tick(
            target,
            self.prefix.clone(),
            self.clock.clone(),
            self.render.clone(),
            self.cancel.clone(),
        );
    }

    /// Stop ticking. No render happens after this returns.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.handle.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && !self.handle.is_finished()
    }

    fn start_tick(
        target: DateTime<Tz>,
        prefix: Option<String>,
        clock: Arc<dyn Clock>,
        render: RenderFn,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let mut last = format(&target, &clock.now(), prefix.as_deref());
        render(&last);

        tokio::spawn(async move {
            // Line ticks up with the clock's whole seconds
            let subsec = u64::from(clock.now().timestamp_subsec_nanos());
            let first = Instant::now() + Duration::from_nanos(1_000_000_000u64.saturating_sub(subsec));
            let mut interval = interval_at(first, TICK);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let text = format(&target, &clock.now(), prefix.as_deref());
                        if text != last {
                            trace!("Countdown text changed: {}", text);
                            render(&text);
                            last = text;
                        }
                    }
                    _ = cancel.cancelled() => break,
                }
            }
        })
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.cancel();
    }
}
