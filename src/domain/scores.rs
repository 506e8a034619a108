use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// The authoritative per-task score table: entity id → task id → score.
///
/// The scoreboard serves this as one JSON object. Entries are kept in
/// document order because ranking ties break by the source's own iteration
/// order; deserializing into a plain map would throw that order away.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreTable(pub Vec<(String, HashMap<String, f64>)>);

impl ScoreTable {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total score per entity, in document order.
    pub fn totals(&self) -> Vec<(String, f64)> {
        self.0
            .iter()
            .map(|(entity, tasks)| (entity.clone(), tasks.values().sum()))
            .collect()
    }
}

impl<'de> Deserialize<'de> for ScoreTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = ScoreTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of entity id to task scores")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, HashMap<String, f64>>()? {
                    entries.push(entry);
                }
                Ok(ScoreTable(entries))
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}
