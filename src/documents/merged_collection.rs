use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::GameRecord;

/// Output document of one merge run.
#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct MergedCollection {
    pub total_games: usize,
    pub merged_at: String,
    pub games: Vec<GameRecord>,
}

impl MergedCollection {
    pub fn new(games: Vec<GameRecord>, merged_at: DateTime<Utc>) -> Self {
        MergedCollection {
            total_games: games.len(),
            merged_at: merged_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            games,
        }
    }
}
