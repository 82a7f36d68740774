use std::path::PathBuf;

use clap::Parser;
use game_catalog::{documents::MergedCollection, games, Status, Tracing};
use tracing::info;

/// Merges the scrapers' JSON documents into a single deduplicated catalog and
/// generates the SQL scripts for the games table.
#[derive(Parser)]
struct Opts {
    #[clap(long)]
    prod_tracing: bool,

    /// Directory with the scrapers' output documents.
    #[clap(long, default_value = "scrapy/data")]
    data_dir: PathBuf,

    /// Directory that receives the merged document and the SQL scripts.
    #[clap(long, default_value = ".")]
    output_dir: PathBuf,
}

fn main() -> Result<(), Status> {
    let opts: Opts = Opts::parse();
    Tracing::init("batch/merge_games", opts.prod_tracing)?;

    let sources = games::load_dir(&opts.data_dir)?;
    let outcome = games::merge(sources);

    let collection = MergedCollection::new(outcome.games, chrono::Utc::now());
    let artifacts = games::write_artifacts(&opts.output_dir, &collection)?;

    info!("Done! Next steps:");
    info!(
        "  1. Run {} in the Supabase SQL editor to create the table",
        artifacts.schema.display()
    );
    info!(
        "  2. Run {} to insert all game data, or import {} with import_games",
        artifacts.insert.display(),
        artifacts.merged.display()
    );

    Ok(())
}
