use crate::{
    documents::{GameRecord, RatedGame},
    Status,
};
use async_trait::async_trait;

/// Hosted table that receives the merged catalog.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Inserts or updates `games` keyed on their id. The batch is accepted or
    /// rejected as a whole.
    async fn upsert(&self, games: &[GameRecord]) -> Result<(), Status>;

    /// Total number of stored games.
    async fn count(&self) -> Result<u64, Status>;

    /// Highest rated games, best first.
    async fn top_rated(&self, limit: usize) -> Result<Vec<RatedGame>, Status>;
}
