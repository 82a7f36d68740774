mod game_record;
mod merged_collection;
mod rated_game;

pub use game_record::{GameRecord, Identity};
pub use merged_collection::MergedCollection;
pub use rated_game::RatedGame;
