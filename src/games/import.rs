use crate::{
    documents::{GameRecord, RatedGame},
    traits::GameStore,
    Status,
};
use futures::{stream, StreamExt};
use tracing::{error, info};

/// Games sent to the store per upsert call.
pub const BATCH_SIZE: usize = 100;

/// Games listed by the post-import sanity check.
pub const TOP_RATED_LIMIT: usize = 5;

/// Result of a single upsert call.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    Accepted { batch: usize, size: usize },
    Rejected { batch: usize, size: usize, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchFailure {
    pub batch: usize,
    pub size: usize,
    pub message: String,
}

/// Record tallies accumulated over all batches of an import.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ImportSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<BatchFailure>,
}

impl ImportSummary {
    pub fn record(mut self, outcome: BatchOutcome) -> Self {
        match outcome {
            BatchOutcome::Accepted { size, .. } => self.succeeded += size,
            BatchOutcome::Rejected {
                batch,
                size,
                message,
            } => {
                self.failed += size;
                self.errors.push(BatchFailure {
                    batch,
                    size,
                    message,
                });
            }
        }
        self
    }
}

/// What the read-back after an import could confirm.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Verification {
    pub total: Option<u64>,
    pub top_rated: Vec<RatedGame>,
}

pub struct Importer<S: GameStore> {
    store: S,
}

impl<S: GameStore> Importer<S> {
    pub fn new(store: S) -> Self {
        Importer { store }
    }

    #[cfg(test)]
    fn store(&self) -> &S {
        &self.store
    }

    /// Upserts `games` in batches of `BATCH_SIZE`, one batch at a time. A
    /// rejected batch is tallied and the import moves on to the next one.
    pub async fn import(&self, games: &[GameRecord]) -> ImportSummary {
        info!("Inserting {} games...", games.len());

        stream::iter(games.chunks(BATCH_SIZE).enumerate())
            .then(|(i, batch)| self.upload_batch(i + 1, batch))
            .fold(ImportSummary::default(), |summary, outcome| async move {
                summary.record(outcome)
            })
            .await
    }

    async fn upload_batch(&self, batch: usize, games: &[GameRecord]) -> BatchOutcome {
        match self.store.upsert(games).await {
            Ok(()) => {
                info!("Inserted batch {batch} ({} games)", games.len());
                BatchOutcome::Accepted {
                    batch,
                    size: games.len(),
                }
            }
            Err(status) => {
                error!("Error inserting batch {batch} ({} games): {status}", games.len());
                BatchOutcome::Rejected {
                    batch,
                    size: games.len(),
                    message: status.to_string(),
                }
            }
        }
    }

    /// Reads back the row count and the top rated games. Query failures are
    /// logged and leave the corresponding part empty.
    pub async fn verify(&self) -> Verification {
        info!("Verifying import...");
        let mut verification = Verification::default();

        match self.store.count().await {
            Ok(total) => {
                info!("Total games in database: {total}");
                verification.total = Some(total);
            }
            Err(status) => {
                error!("Error verifying: {status}");
                return verification;
            }
        }

        match self.store.top_rated(TOP_RATED_LIMIT).await {
            Ok(games) => {
                if !games.is_empty() {
                    info!("Top {} games by rating:", games.len());
                }
                for (i, game) in games.iter().enumerate() {
                    info!(
                        "  {}. {} - {} {}",
                        i + 1,
                        game.name,
                        game.rating.map(|r| r.to_string()).unwrap_or_default(),
                        game.status.as_deref().unwrap_or_default()
                    );
                }
                verification.top_rated = games;
            }
            Err(status) => error!("Error reading top rated games: {status}"),
        }

        verification
    }

    /// Imports `games` and verifies the result. Fails when not a single game
    /// was accepted by the store, in which case verification is skipped.
    pub async fn run(&self, games: &[GameRecord]) -> Result<ImportSummary, Status> {
        let summary = self.import(games).await;

        info!("Import summary:");
        info!("  Success: {} games", summary.succeeded);
        if summary.failed > 0 {
            info!("  Failed: {} games", summary.failed);
        }

        if summary.succeeded == 0 {
            return Err(Status::internal(format!(
                "no games were imported ({} failed)",
                summary.failed
            )));
        }

        self.verify().await;
        Ok(summary)
    }
}
