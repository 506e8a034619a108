pub mod scoreboard;
pub mod telegram;

pub use scoreboard::{Scoreboard, ScoreboardClient};
pub use telegram::{Notify, TelegramNotifier};
