pub mod export;
pub mod import;
pub mod loader;
pub mod merge;

pub use export::{write_artifacts, Artifacts, SqlValue};
pub use import::{ImportSummary, Importer, BATCH_SIZE};
pub use loader::{load_dir, RecordSource, SourceFile};
pub use merge::{merge, Deduplicator, MergeOutcome};
