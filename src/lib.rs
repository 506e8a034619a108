pub mod adapters;
pub mod config;
pub mod cycle;
pub mod domain;
pub mod error;
pub mod ranking;
pub mod store;

pub use adapters::{Notify, Scoreboard, ScoreboardClient, TelegramNotifier};
pub use config::AppConfig;
pub use cycle::PollCycle;
pub use domain::{Event, Roster, ScoreTable};
pub use error::{PodiumError, Result};
pub use ranking::MedalThresholds;
pub use store::EventStore;
