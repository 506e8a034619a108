//! HTTP client for the contest ranking service.
//!
//! Two endpoints: `/history` returns the submission feed as a JSON array of
//! `[team, task, timestamp, score]` tuples, `/scores` returns the full
//! per-task score table. Both are untrusted; a malformed body fails the tick
//! cleanly and the next tick retries.

use crate::domain::{Event, ScoreTable};
use crate::error::{PodiumError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Read side of the scoreboard, as the poll cycle sees it. Trait so tests
/// can feed scripted events instead of a live service.
#[async_trait]
pub trait Scoreboard: Send + Sync {
    /// Full submission history feed.
    async fn history(&self) -> Result<Vec<Event>>;

    /// Authoritative score table, used for summaries only.
    async fn scores(&self) -> Result<ScoreTable>;
}

pub struct ScoreboardClient {
    client: Client,
    history_url: String,
    scores_url: String,
}

impl ScoreboardClient {
    /// Timeouts are bounded so a hung fetch cannot stall the poll loop.
    pub fn new(history_url: &str, scores_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            history_url: history_url.to_string(),
            scores_url: scores_url.to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(PodiumError::FeedUnavailable(format!(
                "{} returned {}",
                url,
                resp.status()
            )));
        }
        // The ranking service serves JSON with a text/plain content type, so
        // parse the body ourselves instead of using resp.json().
        let body = resp.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| PodiumError::MalformedPayload(format!("{url}: {e}")))
    }
}

#[async_trait]
impl Scoreboard for ScoreboardClient {
    async fn history(&self) -> Result<Vec<Event>> {
        let events: Vec<Event> = self.get_json(&self.history_url).await?;
        debug!(count = events.len(), "fetched history feed");
        Ok(events)
    }

    async fn scores(&self) -> Result<ScoreTable> {
        let table: ScoreTable = self.get_json(&self.scores_url).await?;
        debug!(entities = table.len(), "fetched score table");
        Ok(table)
    }
}
