//! Durable dedup state for announced submissions.
//!
//! One JSON file per deployment holding the array of announced event tuples.
//! The watermark and the per-team best-score table are derived, not stored:
//! the watermark is recomputed from the announced set on load, and best
//! scores are rebuilt incrementally as events flow through the cycle.

use crate::domain::{Event, Roster};
use crate::error::{PodiumError, Result};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct EventStore {
    path: PathBuf,
    announced: HashSet<Event>,
    watermark: i64,
    best: HashMap<String, HashMap<String, f64>>,
    since_last_summary: u32,
}

impl EventStore {
    /// Load persisted state from `path`, or start empty if the file does not
    /// exist yet (first run).
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut store = Self {
            path,
            announced: HashSet::new(),
            watermark: 0,
            best: HashMap::new(),
            since_last_summary: 0,
        };

        if store.path.exists() {
            let raw = fs::read_to_string(&store.path)?;
            let events: Vec<Event> = serde_json::from_str(&raw)?;
            store.watermark = events.iter().map(|e| e.timestamp).max().unwrap_or(0);
            store.announced = events.into_iter().collect();
            info!(
                announced = store.announced.len(),
                watermark = store.watermark,
                "loaded announce state from {}",
                store.path.display()
            );
        } else {
            debug!("no announce state at {}, starting empty", store.path.display());
        }

        Ok(store)
    }

    /// Seed a fresh deployment from the `k` most recent feed events so the
    /// first tick does not replay the whole contest into the chat.
    ///
    /// No-op when persisted state already exists. Returns whether seeding ran.
    pub fn bootstrap(&mut self, feed: &[Event], k: usize) -> Result<bool> {
        if self.path.exists() {
            debug!("announce state already exists, skipping bootstrap");
            return Ok(false);
        }

        let mut recent: Vec<Event> = feed.to_vec();
        recent.sort_by_key(|e| std::cmp::Reverse(e.timestamp));
        recent.truncate(k);

        self.watermark = recent.iter().map(|e| e.timestamp).max().unwrap_or(0);
        self.announced = recent.into_iter().collect();
        self.persist()?;

        info!(
            seeded = self.announced.len(),
            watermark = self.watermark,
            "bootstrapped announce state"
        );
        Ok(true)
    }

    /// Whether this event still needs announcing: unseen, newer than the
    /// watermark, and from a tracked team.
    pub fn is_new(&self, event: &Event, roster: &Roster) -> bool {
        event.timestamp > self.watermark
            && roster.contains(&event.team)
            && !self.announced.contains(event)
    }

    /// Add a dispatched batch to the announced set, advance the watermark and
    /// persist synchronously. Call only after the notifications went out.
    pub fn record_batch(&mut self, events: &[Event]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }

        let batch_max = events.iter().map(|e| e.timestamp).max().unwrap_or(0);
        self.announced.extend(events.iter().cloned());
        self.watermark = self.watermark.max(batch_max);
        self.persist()
    }

    /// Raise the best score for a (team, task) cell if `score` beats it and
    /// return the team's running total over all tasks.
    pub fn update_best(&mut self, team: &str, task: &str, score: f64) -> f64 {
        let tasks = self.best.entry(team.to_string()).or_default();
        let cell = tasks.entry(task.to_string()).or_insert(0.0);
        if score > *cell {
            *cell = score;
        }
        tasks.values().sum()
    }

    pub fn watermark(&self) -> i64 {
        self.watermark
    }

    pub fn announced_len(&self) -> usize {
        self.announced.len()
    }

    pub fn since_last_summary(&self) -> u32 {
        self.since_last_summary
    }

    pub fn note_notified(&mut self) {
        self.since_last_summary += 1;
    }

    pub fn reset_summary_counter(&mut self) {
        self.since_last_summary = 0;
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomic replace: write a sibling temp file, then rename over the
    /// target. A crash mid-write leaves the previous state intact.
    fn persist(&self) -> Result<()> {
        let events: Vec<&Event> = self.announced.iter().collect();
        let raw = serde_json::to_string(&events)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw)
            .and_then(|()| fs::rename(&tmp, &self.path))
            .map_err(|e| {
                PodiumError::Persistence(format!("writing {}: {}", self.path.display(), e))
            })?;

        debug!(announced = self.announced.len(), "persisted announce state");
        Ok(())
    }
}
