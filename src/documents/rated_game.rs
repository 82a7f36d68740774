use serde::{Deserialize, Serialize};

/// Subset of a stored game returned by read-back queries.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct RatedGame {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub rating: Option<f64>,

    #[serde(default)]
    pub status: Option<String>,
}
