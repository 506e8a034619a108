//! Per-tick orchestration: fetch, filter, order, cap, notify, persist,
//! summarize.
//!
//! One tick walks FETCHING -> FILTERING -> NOTIFYING -> PERSISTING ->
//! (SUMMARY?) and back to idle. A failure anywhere aborts the tick without
//! touching announced/watermark state that has not already been earned;
//! the run loop logs it and retries on the next interval.
//!
//! Dispatch happens before `record_batch`, so a crash in between can replay
//! a notification after restart. That at-least-once window is accepted and
//! bounded to one batch; it is not a dedup bug.

use crate::adapters::{Notify, Scoreboard};
use crate::config::AppConfig;
use crate::domain::{Event, Roster};
use crate::error::Result;
use crate::ranking;
use crate::store::EventStore;
use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

pub struct PollCycle<S, N> {
    feed: S,
    notifier: N,
    store: EventStore,
    roster: Roster,
    batch_cap: usize,
    summary_threshold: u32,
    contest_start: DateTime<Utc>,
    display_offset: FixedOffset,
}

impl<S: Scoreboard, N: Notify> PollCycle<S, N> {
    pub fn new(config: &AppConfig, store: EventStore, feed: S, notifier: N) -> Self {
        let display_offset =
            FixedOffset::east_opt(config.contest.display_utc_offset_hours * 3600)
                .unwrap_or_else(|| Utc.fix());

        Self {
            feed,
            notifier,
            store,
            roster: config.roster.clone(),
            batch_cap: config.poll.batch_cap,
            summary_threshold: config.poll.summary_threshold,
            contest_start: config.contest.start,
            display_offset,
        }
    }

    /// Tick forever at `poll_interval`. Per-tick errors are logged and the
    /// loop keeps going; only a failed durable write returns.
    pub async fn run(&mut self, poll_interval: Duration) -> Result<()> {
        info!(
            roster = self.roster.len(),
            interval_secs = poll_interval.as_secs(),
            state = %self.store.path().display(),
            "poll loop started"
        );

        let mut ticker = interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = self.tick().await {
                if e.is_fatal() {
                    error!("stopping poll loop: {e}");
                    return Err(e);
                }
                warn!("tick failed, retrying next interval: {e}");
            }
        }
    }

    /// Run one full cycle.
    pub async fn tick(&mut self) -> Result<()> {
        let feed = self.feed.history().await?;

        let mut fresh: Vec<Event> = feed
            .into_iter()
            .filter(|e| self.store.is_new(e, &self.roster))
            .collect();
        // chronological regardless of feed order; excess past the cap stays
        // new for the next tick since the watermark has not passed it yet
        fresh.sort_by_key(|e| e.timestamp);
        fresh.truncate(self.batch_cap);

        if !fresh.is_empty() {
            debug!(count = fresh.len(), "announcing fresh submissions");
        }

        for event in &fresh {
            let total = self
                .store
                .update_best(&event.team, &event.task, event.score());
            let msg = self.format_submission(event, total);
            if let Err(e) = self.notifier.send(&msg).await {
                // delivery is fire-and-forget; the event is announced anyway
                warn!(team = %event.team, task = %event.task, "delivery failed: {e}");
            }
            self.store.note_notified();
        }

        if !fresh.is_empty() {
            self.store.record_batch(&fresh)?;
        }

        if self.store.since_last_summary() >= self.summary_threshold {
            self.post_summary().await?;
        }

        Ok(())
    }

    /// Fetch the score table, rank the full field and post the roster
    /// summary. Resets the notification counter on success.
    pub async fn post_summary(&mut self) -> Result<()> {
        let table = self.feed.scores().await?;
        let ranked = ranking::rank(&table);
        let msg =
            ranking::render_summary(&ranked, &self.roster, Utc::now() - self.contest_start);

        if let Err(e) = self.notifier.send(&msg).await {
            warn!("summary delivery failed: {e}");
        }

        self.store.reset_summary_counter();
        info!(entities = ranked.len(), "posted ranking summary");
        Ok(())
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    fn format_submission(&self, event: &Event, total: f64) -> String {
        let t = event.submitted_at().with_timezone(&self.display_offset).time();
        format!(
            "[{:02}:{:02}:{:02} UTC]: {} submitted {} for {:.2} points\nTotal: {:.2}",
            t.hour(),
            t.minute(),
            t.second(),
            self.roster.display_name(&event.team),
            event.task,
            event.score(),
            total
        )
    }
}
