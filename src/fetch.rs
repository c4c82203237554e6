//! Weekday document fetcher
//!
//! Retrieves the five weekday documents concurrently and writes each result
//! into the [`ScheduleStore`] as it lands. Completion order doesn't matter.
//! There is no retry beyond the optional periodic refresh.

use anyhow::{Context, Result};
use std::sync::Arc;
use thiserror::Error;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::schedule::{DaySchedule, DayState, ScheduleError, SCHEDULE_DAYS, WEEKDAY_NAMES};
use crate::store::ScheduleStore;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request for {day} failed: {source}")]
    Transport {
        day: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{day} document returned HTTP {status}")]
    Status {
        day: &'static str,
        status: reqwest::StatusCode,
    },
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

pub struct Fetcher {
    client: reqwest::Client,
    config: Arc<Config>,
    store: ScheduleStore,
}

impl Fetcher {
    pub fn new(config: Arc<Config>, store: ScheduleStore) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            config,
            store,
        })
    }

    /// Fetch and parse one weekday's document
    pub async fn fetch_day(&self, weekday: usize) -> Result<DaySchedule, FetchError> {
        let url = self
            .config
            .day_url(weekday)
            .ok_or(ScheduleError::WeekdayOutOfRange(weekday))?;
        let day = WEEKDAY_NAMES[weekday];

        debug!("Fetching {} from {}", day, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Transport { day, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { day, status });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport { day, source })?;

        Ok(DaySchedule::from_json(weekday, &body)?)
    }

    /// Fetch one day and record the outcome in the store.
    ///
    /// A failed refresh keeps the last good snapshot; a day that never
    /// loaded is marked failed.
    pub async fn refresh_day(&self, weekday: usize) {
        let day = WEEKDAY_NAMES.get(weekday).copied().unwrap_or("?");

        let state = match self.fetch_day(weekday).await {
            Ok(schedule) => {
                debug!("{}: {} shows", day, schedule.shows.len());
                DayState::Ready(Arc::new(schedule))
            }
            Err(e) => {
                warn!("No schedule for {}: {}", day, e);
                if self.store.snapshot().day(weekday).ready().is_some() {
                    return;
                }
                DayState::Failed
            }
        };

        if let Err(e) = self.store.set_day(weekday, state) {
            warn!("Dropping {} schedule: {}", day, e);
        }
    }

    /// Fetch all five days concurrently and wait for every one to finish.
    /// Dropping the returned future detaches the fetches instead of
    /// aborting them.
    pub async fn refresh_all(self: &Arc<Self>) {
        let handles: Vec<_> = (0..SCHEDULE_DAYS)
            .map(|weekday| {
                let fetcher = Arc::clone(self);
                tokio::spawn(async move { fetcher.refresh_day(weekday).await })
            })
            .collect();

        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Schedule fetch task failed: {}", e);
            }
        }
    }

    /// Initial fetch, then periodic refreshes if configured, until cancelled.
    /// Cancellation does not interrupt a fetch already in flight.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        info!("Fetching schedule from {}", self.config.schedule_base_url);

        loop {
            tokio::select! {
                _ = self.refresh_all() => {}
                _ = cancel.cancelled() => break,
            }

            let Some(interval) = self.config.refresh_interval() else {
                debug!("Schedule refresh disabled");
                break;
            };

            tokio::select! {
                _ = sleep(interval) => debug!("Refreshing schedule"),
                _ = cancel.cancelled() => break,
            }
        }

        debug!("Fetcher stopped");
    }
}
