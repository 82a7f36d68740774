use std::collections::HashSet;

use super::SourceFile;
use crate::documents::{GameRecord, Identity};
use tracing::{info, warn};

/// Tracks the identities seen during a merge run.
///
/// First occurrence of an identity wins. All anonymous records share a single
/// identity, so at most one of them survives a run.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<Identity>,
}

impl Deduplicator {
    /// Returns the record stamped with its source file if its identity was
    /// not seen before.
    pub fn offer(&mut self, mut record: GameRecord, source_file: &str) -> Option<GameRecord> {
        match self.seen.insert(record.identity()) {
            true => {
                record.source_file = Some(source_file.to_owned());
                Some(record)
            }
            false => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct MergeOutcome {
    pub games: Vec<GameRecord>,
    pub duplicates: usize,
}

/// Flattens all source files, in the given order, into a single collection
/// with unique identities.
pub fn merge(sources: Vec<SourceFile>) -> MergeOutcome {
    let mut dedup = Deduplicator::default();
    let mut outcome = MergeOutcome::default();

    for source in sources {
        for record in source.records {
            let anonymous = record.identity() == Identity::Anonymous;
            match dedup.offer(record, &source.name) {
                Some(record) => {
                    if anonymous {
                        warn!("{}: kept game without id", source.name);
                    }
                    outcome.games.push(record);
                }
                None => {
                    if anonymous {
                        warn!("{}: dropped game without id", source.name);
                    }
                    outcome.duplicates += 1;
                }
            }
        }
    }

    info!(
        "Total unique games: {} ({} duplicates dropped)",
        outcome.games.len(),
        outcome.duplicates
    );
    outcome
}
