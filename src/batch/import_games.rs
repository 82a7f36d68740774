use std::path::PathBuf;

use clap::Parser;
use game_catalog::{
    api::{SupabaseApi, SupabaseConfig},
    documents::MergedCollection,
    games::Importer,
    Status, Tracing,
};
use tracing::{error, info};

/// Upserts the merged catalog into the Supabase games table and reads back
/// the result.
#[derive(Parser)]
struct Opts {
    #[clap(long)]
    prod_tracing: bool,

    /// Merged document produced by merge_games.
    #[clap(long, default_value = "merged_games.json")]
    input: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Status> {
    let opts: Opts = Opts::parse();
    Tracing::init("batch/import_games", opts.prod_tracing)?;

    let config = SupabaseConfig::from_env().inspect_err(|status| error!("{status}"))?;

    let text = std::fs::read_to_string(&opts.input)?;
    let collection = serde_json::from_str::<MergedCollection>(&text)
        .map_err(|e| Status::parse(&opts.input.display().to_string(), e))?;
    info!("Found {} games to import", collection.games.len());

    let importer = Importer::new(SupabaseApi::new(config));
    importer
        .run(&collection.games)
        .await
        .inspect_err(|status| error!("{status}"))?;

    info!("Import completed!");
    Ok(())
}
