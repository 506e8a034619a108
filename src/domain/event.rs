use chrono::{DateTime, TimeZone, Utc};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Wire shape of a submission: `[team_id, task_id, timestamp, score]`.
type EventTuple = (String, String, i64, f64);

/// One recorded submission from the scoreboard history feed.
///
/// Identity is the full tuple: two events with identical fields are the same
/// event. The score is stored as an [`OrderedFloat`] so the whole struct is
/// `Eq + Hash` and can live in the announced set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "EventTuple", into = "EventTuple")]
pub struct Event {
    pub team: String,
    pub task: String,
    /// Seconds since the Unix epoch, as reported by the feed.
    pub timestamp: i64,
    pub score: OrderedFloat<f64>,
}

impl Event {
    pub fn new(team: impl Into<String>, task: impl Into<String>, timestamp: i64, score: f64) -> Self {
        Self {
            team: team.into(),
            task: task.into(),
            timestamp,
            score: OrderedFloat(score),
        }
    }

    pub fn score(&self) -> f64 {
        self.score.into_inner()
    }

    /// Submission instant in UTC. Out-of-range timestamps clamp to the epoch
    /// rather than panic; the feed is untrusted.
    pub fn submitted_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.timestamp, 0).single().unwrap_or_default()
    }
}

impl From<EventTuple> for Event {
    fn from((team, task, timestamp, score): EventTuple) -> Self {
        Self::new(team, task, timestamp, score)
    }
}

impl From<Event> for EventTuple {
    fn from(e: Event) -> Self {
        (e.team, e.task, e.timestamp, e.score.into_inner())
    }
}
