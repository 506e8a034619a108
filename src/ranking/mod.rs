//! Ranking and medal-tier computation over the full score table.
//!
//! Medal cutoffs follow the olympiad convention: roughly the top twelfth of
//! the field takes gold, the next sixth silver and the next quarter bronze,
//! each rounded up. Cutoffs are computed over everyone on the scoreboard,
//! not just the tracked roster.

use crate::domain::{Roster, ScoreTable};
use chrono::Duration;
use std::fmt::Write as _;

/// Medal cutoffs for a field of `n` ranked entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MedalThresholds {
    pub gold: usize,
    pub silver: usize,
    pub bronze: usize,
}

impl MedalThresholds {
    pub fn for_field(n: usize) -> Self {
        let gold = (n + 11) / 12;
        let silver = (n + 5) / 6 + gold;
        let bronze = (n + 3) / 4 + silver;
        Self { gold, silver, bronze }
    }

    /// Medal emoji for a 1-based rank position, if any.
    pub fn medal(&self, position: usize) -> Option<&'static str> {
        if position <= self.gold {
            Some("🥇")
        } else if position <= self.silver {
            Some("🥈")
        } else if position <= self.bronze {
            Some("🥉")
        } else {
            None
        }
    }
}

/// Total score per entity, descending. The sort is stable, so entities with
/// equal totals keep the score table's own order.
pub fn rank(table: &ScoreTable) -> Vec<(String, f64)> {
    let mut totals = table.totals();
    totals.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    totals
}

/// Render the summary message: a header with elapsed contest time, then one
/// line per rostered entity in rank order. Non-roster entities are skipped
/// but still hold their rank positions for the medal cutoffs.
pub fn render_summary(ranked: &[(String, f64)], roster: &Roster, elapsed: Duration) -> String {
    let thresholds = MedalThresholds::for_field(ranked.len());

    let mut msg = format!(
        "<b>🏅 Scoreboard</b> ({})\n\n",
        format_elapsed(elapsed)
    );

    for (position, (entity, total)) in ranked.iter().enumerate() {
        let position = position + 1;
        if !roster.matches_prefix(entity) {
            continue;
        }
        let medal = thresholds
            .medal(position)
            .map_or_else(String::new, |m| format!(" {m}"));
        let _ = writeln!(
            msg,
            "<b>{}</b>. <i>{}</i> — <code>{:.2}</code>{}",
            position,
            roster.display_name(entity),
            total,
            medal
        );
    }

    msg.trim_end().to_string()
}

/// `H:MM:SS`, clamping negative durations (summary before contest start) to
/// zero.
fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.num_seconds().max(0);
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
