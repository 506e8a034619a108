//! End-to-end cycle tests with scripted collaborators: the dedup pipeline
//! across restarts, including the accepted crash-replay window.

use async_trait::async_trait;
use podium::adapters::{Notify, Scoreboard};
use podium::config::{
    AppConfig, ContestConfig, LoggingConfig, PollConfig, ScoreboardConfig, StateConfig,
    TelegramConfig,
};
use podium::cycle::PollCycle;
use podium::domain::{Event, Roster, ScoreTable};
use podium::error::Result;
use podium::store::EventStore;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

struct ScriptedBoard {
    history: Mutex<Vec<Event>>,
    scores: ScoreTable,
}

impl ScriptedBoard {
    fn new(history: Vec<Event>) -> Self {
        Self {
            history: Mutex::new(history),
            scores: ScoreTable::default(),
        }
    }
}

#[async_trait]
impl Scoreboard for &ScriptedBoard {
    async fn history(&self) -> Result<Vec<Event>> {
        Ok(self.history.lock().unwrap().clone())
    }

    async fn scores(&self) -> Result<ScoreTable> {
        Ok(self.scores.clone())
    }
}

#[derive(Default)]
struct Outbox {
    sent: Mutex<Vec<String>>,
}

impl Outbox {
    fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Notify for &Outbox {
    async fn send(&self, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

fn config(state_path: &Path) -> AppConfig {
    AppConfig {
        scoreboard: ScoreboardConfig {
            history_url: "http://localhost/history".to_string(),
            scores_url: "http://localhost/scores".to_string(),
            request_timeout_secs: 1,
        },
        poll: PollConfig {
            interval_secs: 1,
            batch_cap: 10,
            summary_threshold: 100,
        },
        roster: Roster {
            prefix: "UZB".to_string(),
            members: HashMap::from([
                ("UZB1".to_string(), "Alice".to_string()),
                ("UZB2".to_string(), "Bob".to_string()),
            ]),
        },
        telegram: TelegramConfig {
            bot_token: "t".to_string(),
            chat_id: "c".to_string(),
            api_url: "http://localhost".to_string(),
        },
        contest: ContestConfig {
            start: chrono::Utc::now(),
            display_utc_offset_hours: 0,
        },
        state: StateConfig {
            path: state_path.to_path_buf(),
        },
        logging: LoggingConfig::default(),
    }
}

#[tokio::test]
async fn restart_reloads_watermark_and_stays_idempotent() {
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("sent.json");
    let cfg = config(&state_path);

    let board = ScriptedBoard::new(vec![
        Event::new("UZB1", "towers", 100, 40.0),
        Event::new("UZB2", "graphs", 200, 55.0),
    ]);
    let outbox = Outbox::default();

    {
        let store = EventStore::load(&state_path).unwrap();
        let mut cycle = PollCycle::new(&cfg, store, &board, &outbox);
        cycle.tick().await.unwrap();
        assert_eq!(outbox.count(), 2);
        assert_eq!(cycle.store().watermark(), 200);
    }

    // fresh process, same state file and same feed: nothing re-announced
    let store = EventStore::load(&state_path).unwrap();
    assert_eq!(store.watermark(), 200);
    let mut cycle = PollCycle::new(&cfg, store, &board, &outbox);
    cycle.tick().await.unwrap();
    assert_eq!(outbox.count(), 2);

    // a genuinely newer event still comes through
    board
        .history
        .lock()
        .unwrap()
        .push(Event::new("UZB1", "graphs", 300, 12.5));
    cycle.tick().await.unwrap();
    assert_eq!(outbox.count(), 3);
    assert_eq!(cycle.store().watermark(), 300);
}

// A crash after dispatch but before record_batch re-announces the batch on
// restart. At-least-once is the documented tradeoff of dispatch-then-persist;
// this pins the behavior down as expected rather than a dedup regression.
#[tokio::test]
async fn crash_between_dispatch_and_persist_replays_the_batch() {
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("sent.json");
    let cfg = config(&state_path);

    let board = ScriptedBoard::new(vec![Event::new("UZB1", "towers", 100, 40.0)]);
    let outbox = Outbox::default();

    // first life: announce and persist, then a later event arrives
    {
        let store = EventStore::load(&state_path).unwrap();
        let mut cycle = PollCycle::new(&cfg, store, &board, &outbox);
        cycle.tick().await.unwrap();
    }
    assert_eq!(outbox.count(), 1);
    let pre_crash_state = std::fs::read_to_string(&state_path).unwrap();

    board
        .history
        .lock()
        .unwrap()
        .push(Event::new("UZB2", "graphs", 200, 55.0));
    {
        let store = EventStore::load(&state_path).unwrap();
        let mut cycle = PollCycle::new(&cfg, store, &board, &outbox);
        cycle.tick().await.unwrap();
    }
    assert_eq!(outbox.count(), 2);

    // "crash": the dispatch happened but the state write is rolled back
    std::fs::write(&state_path, pre_crash_state).unwrap();

    let store = EventStore::load(&state_path).unwrap();
    let mut cycle = PollCycle::new(&cfg, store, &board, &outbox);
    cycle.tick().await.unwrap();

    // the second event went out twice; the first stayed deduplicated
    assert_eq!(outbox.count(), 3);
    let sent = outbox.sent.lock().unwrap();
    assert_eq!(
        sent.iter().filter(|m| m.contains("graphs")).count(),
        2,
        "replayed batch should be re-dispatched after the rollback"
    );
    assert_eq!(sent.iter().filter(|m| m.contains("towers")).count(), 1);
}

#[tokio::test]
async fn bootstrap_then_run_skips_history_but_catches_new_events() {
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("sent.json");
    let cfg = config(&state_path);

    let history: Vec<Event> = (1..=20)
        .map(|i| Event::new("UZB1", format!("t{i}"), i, 1.0))
        .collect();
    let board = ScriptedBoard::new(history);
    let outbox = Outbox::default();

    let mut store = EventStore::load(&state_path).unwrap();
    let feed = (&board).history().await.unwrap();
    assert!(store.bootstrap(&feed, 10).unwrap());
    assert_eq!(store.watermark(), 20);

    // nothing announced for the seeded backlog
    let mut cycle = PollCycle::new(&cfg, store, &board, &outbox);
    cycle.tick().await.unwrap();
    assert_eq!(outbox.count(), 0);

    board
        .history
        .lock()
        .unwrap()
        .push(Event::new("UZB2", "fresh", 21, 30.0));
    cycle.tick().await.unwrap();
    assert_eq!(outbox.count(), 1);
}
