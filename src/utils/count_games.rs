use clap::Parser;
use game_catalog::{
    api::{SupabaseApi, SupabaseConfig},
    games::Importer,
    Status, Tracing,
};
use tracing::error;

/// Prints the number of stored games and the top rated ones without
/// importing anything.
#[derive(Parser)]
struct Opts {
    #[clap(long)]
    prod_tracing: bool,
}

#[tokio::main]
async fn main() -> Result<(), Status> {
    let opts: Opts = Opts::parse();
    Tracing::init("utils/count_games", opts.prod_tracing)?;

    let config = SupabaseConfig::from_env().inspect_err(|status| error!("{status}"))?;

    let verification = Importer::new(SupabaseApi::new(config)).verify().await;
    match verification.total {
        Some(_) => Ok(()),
        None => Err(Status::internal("failed to read the games table")),
    }
}
