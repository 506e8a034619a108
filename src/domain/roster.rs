use serde::Deserialize;
use std::collections::HashMap;

/// The fixed set of tracked teams for one deployment.
///
/// Only teams listed here produce notifications. The `prefix` is the country
/// namespace the team ids share (e.g. `"UZB"` for `UZB1..UZB4`); the summary
/// renderer uses it to pick roster lines out of the full ranked field.
#[derive(Debug, Clone, Deserialize)]
pub struct Roster {
    pub prefix: String,
    pub members: HashMap<String, String>,
}

impl Roster {
    pub fn contains(&self, team_id: &str) -> bool {
        self.members.contains_key(team_id)
    }

    /// Display name for a tracked team, falling back to the raw id for
    /// prefix-matched teams that were left out of the member map.
    pub fn display_name<'a>(&'a self, team_id: &'a str) -> &'a str {
        self.members.get(team_id).map_or(team_id, String::as_str)
    }

    pub fn matches_prefix(&self, entity_id: &str) -> bool {
        entity_id.starts_with(&self.prefix)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
