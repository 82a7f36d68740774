use serde::{Deserialize, Deserializer, Serialize};

/// A single cataloged game as produced by the scrapers.
///
/// Every field is always serialized, optional ones as `null`, so the merged
/// document and the rows pushed to the store carry the full column set.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct GameRecord {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub thumbnail: Option<String>,

    #[serde(default)]
    pub rating: Option<f64>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub iframe_src: Option<String>,

    #[serde(default)]
    pub iframe_html: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub is_embeddable: bool,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub features: Vec<serde_json::Value>,

    #[serde(default)]
    pub controls: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<serde_json::Value>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub play_count: i64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub reviews: Vec<serde_json::Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub review_count: i64,

    #[serde(default)]
    pub average_rating: Option<f64>,

    #[serde(default)]
    pub source_file: Option<String>,
}

impl GameRecord {
    pub fn identity(&self) -> Identity {
        Identity::from(self.id.as_str())
    }
}

/// Deduplication key of a `GameRecord`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    Identified(String),

    /// Record without an id. All anonymous records share this one identity.
    Anonymous,
}

impl From<&str> for Identity {
    fn from(id: &str) -> Self {
        match id.is_empty() {
            true => Identity::Anonymous,
            false => Identity::Identified(id.to_owned()),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Some scrapers emit numeric ids. They are kept as their decimal text, so
/// `1`, `1.0` and `"1"` all name the same game.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Text(id)) => id,
        Some(RawId::Int(id)) => id.to_string(),
        Some(RawId::Float(id)) => id.to_string(),
        None => String::default(),
    })
}
