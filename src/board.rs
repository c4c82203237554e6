//! Now/next board
//!
//! Wires the pieces together on one control loop: schedule changes and
//! staleness events trigger a fresh selection, the staleness timer is
//! re-armed from scratch, the two countdowns follow their targets, and the
//! resulting [`BoardView`] is published to subscribers.

use chrono::{DateTime, Duration as ChronoDuration, SubsecRound};
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::clock::{reading_at, Clock};
use crate::countdown::{self, Countdown, RenderFn};
use crate::schedule::{WeekSchedule, SECONDS_PER_DAY};
use crate::selector::{select, SelectionResult};
use crate::staleness::StalenessTimer;
use crate::store::ScheduleStore;

pub const ENDS_PREFIX: &str = "ends ";
pub const STARTS_PREFIX: &str = "starts ";

/// Everything the presentation layer needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardView {
    pub selection: SelectionResult,
    /// e.g. "ends in 13 minutes"
    pub current_countdown: Option<String>,
    /// e.g. "starts in 2 days"
    pub next_countdown: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Current,
    Next,
}

impl Slot {
    fn prefix(self) -> &'static str {
        match self {
            Slot::Current => ENDS_PREFIX,
            Slot::Next => STARTS_PREFIX,
        }
    }

    fn text_mut(self, view: &mut BoardView) -> &mut Option<String> {
        match self {
            Slot::Current => &mut view.current_countdown,
            Slot::Next => &mut view.next_countdown,
        }
    }
}

/// Absolute instants the countdowns point at: when the current show ends
/// and when the next show starts. Whole seconds, so repeated evaluations
/// within a show yield the same targets. A target chrono can't represent
/// is dropped.
pub fn countdown_targets(
    selection: &SelectionResult,
    now: &DateTime<Tz>,
) -> (Option<DateTime<Tz>>, Option<DateTime<Tz>>) {
    let now_seconds = i64::from(reading_at(now).seconds);
    let now = now.trunc_subsecs(0);
    let shift = |secs: i64| {
        ChronoDuration::try_seconds(secs).and_then(|d| now.checked_add_signed(d))
    };

    let current = selection
        .current
        .as_ref()
        .and_then(|p| shift(p.show.end_time.saturating_sub(now_seconds)));

    let next = selection.next.as_ref().and_then(|p| {
        shift(
            (i64::from(p.offset) * SECONDS_PER_DAY)
                .saturating_add(p.show.start_time)
                .saturating_sub(now_seconds),
        )
    });

    (current, next)
}

/// One-off view for `now`, without live countdowns
pub fn view_at(week: &WeekSchedule, now: &DateTime<Tz>) -> BoardView {
    let reading = reading_at(now);
    let selection = select(week, reading.weekday, reading.seconds);
    let (current, next) = countdown_targets(&selection, now);

    BoardView {
        current_countdown: current.map(|t| countdown::format(&t, now, Some(ENDS_PREFIX))),
        next_countdown: next.map(|t| countdown::format(&t, now, Some(STARTS_PREFIX))),
        selection,
    }
}

pub struct Board {
    clock: Arc<dyn Clock>,
    store: ScheduleStore,
    view_tx: Arc<watch::Sender<BoardView>>,
}

/// Timers owned by a running board; all of them stop when this is dropped
struct LiveTimers {
    staleness: StalenessTimer,
    current: Option<Countdown>,
    next: Option<Countdown>,
}

impl Board {
    pub fn new(clock: Arc<dyn Clock>, store: ScheduleStore) -> Self {
        let (view_tx, _rx) = watch::channel(BoardView::default());
        Self {
            clock,
            store,
            view_tx: Arc::new(view_tx),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<BoardView> {
        self.view_tx.subscribe()
    }

    pub fn view(&self) -> BoardView {
        self.view_tx.borrow().clone()
    }

    /// Run until `cancel` fires. Every timer the board armed is stopped
    /// before this returns.
    pub async fn run(&self, cancel: CancellationToken) {
        let (stale_tx, mut stale_rx) = mpsc::unbounded_channel();
        let mut timers = LiveTimers {
            staleness: StalenessTimer::new(stale_tx),
            current: None,
            next: None,
        };
        let mut schedule_rx = self.store.subscribe();

        schedule_rx.mark_unchanged();
        self.reevaluate(&mut timers);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = schedule_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    debug!("Schedule changed");
                    self.reevaluate(&mut timers);
                }
                Some(event) = stale_rx.recv() => {
                    if timers.staleness.is_current(&event) {
                        self.reevaluate(&mut timers);
                    } else {
                        debug!("Ignoring superseded staleness event {}", event.generation);
                    }
                }
            }
        }

        timers.staleness.cancel();
        timers.current.take();
        timers.next.take();
        info!("Board stopped");
    }

    fn reevaluate(&self, timers: &mut LiveTimers) {
        let now = self.clock.now();
        let reading = reading_at(&now);
        let week = self.store.snapshot();
        let selection = select(&week, reading.weekday, reading.seconds);

        if let Some(current) = selection.current_show() {
            debug!("Now playing: {}", current.name);
        }
        if let Some(next) = &selection.next {
            debug!("Up next: {} (+{}d)", next.show.name, next.offset);
        }

        timers.staleness.rearm(&selection, reading.seconds);

        let (current_target, next_target) = countdown_targets(&selection, &now);

        self.view_tx.send_modify(|view| {
            view.selection = selection;
            if current_target.is_none() {
                view.current_countdown = None;
            }
            if next_target.is_none() {
                view.next_countdown = None;
            }
        });

        // Countdowns render straight into the view, after the selection is in
        self.follow(&mut timers.current, current_target, Slot::Current);
        self.follow(&mut timers.next, next_target, Slot::Next);
    }

    fn follow(&self, countdown: &mut Option<Countdown>, target: Option<DateTime<Tz>>, slot: Slot) {
        let Some(target) = target else {
            countdown.take();
            return;
        };

        if let Some(live) = countdown.as_mut() {
            live.retarget(target);
        } else {
            *countdown = Some(Countdown::spawn(
                target,
                Some(slot.prefix().to_string()),
                Arc::clone(&self.clock),
                self.render_into(slot),
            ));
        }
    }

    fn render_into(&self, slot: Slot) -> RenderFn {
        let view_tx = Arc::clone(&self.view_tx);
        Arc::new(move |text: &str| {
            view_tx.send_if_modified(|view| {
                let field = slot.text_mut(view);
                if field.as_deref() == Some(text) {
                    return false;
                }
                *field = Some(text.to_string());
                true
            });
        })
    }
}
