use crate::{
    documents::{GameRecord, RatedGame},
    traits::GameStore,
    Status,
};
use async_trait::async_trait;
use reqwest::{header::CONTENT_RANGE, Request, RequestBuilder, Response};
use serde::Deserialize;
use tracing::instrument;

const URL_VARS: [&str; 2] = ["SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"];
const KEY_VARS: [&str; 3] = [
    "SUPABASE_SERVICE_KEY",
    "SUPABASE_ANON_KEY",
    "NEXT_PUBLIC_SUPABASE_ANON_KEY",
];

const GAMES_TABLE: &str = "games";

/// Connection settings for the hosted Supabase project.
#[derive(Debug, Clone, PartialEq)]
pub struct SupabaseConfig {
    pub url: String,
    pub key: String,
}

impl SupabaseConfig {
    /// Resolves the project url and key through their fallback chains of
    /// variable names. Empty values count as unset.
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Status> {
        let first = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| lookup(*name))
                .find(|value| !value.is_empty())
        };

        match (first(&URL_VARS[..]), first(&KEY_VARS[..])) {
            (Some(url), Some(key)) => Ok(SupabaseConfig {
                url: url.trim_end_matches('/').to_owned(),
                key,
            }),
            _ => Err(Status::missing_config(format!(
                "set {} and {} environment variables, e.g.\n  \
                 export SUPABASE_URL=\"https://your-project.supabase.co\"\n  \
                 export SUPABASE_SERVICE_KEY=\"your-service-key\"",
                URL_VARS[0], KEY_VARS[0]
            ))),
        }
    }

    pub fn from_env() -> Result<Self, Status> {
        Self::resolve(|name| std::env::var(name).ok())
    }
}

/// Client for the PostgREST interface of a Supabase project.
pub struct SupabaseApi {
    config: SupabaseConfig,
    client: reqwest::Client,
}

impl SupabaseApi {
    pub fn new(config: SupabaseConfig) -> Self {
        SupabaseApi {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn table_uri(&self, query: &str) -> String {
        format!("{}/rest/v1/{GAMES_TABLE}?{query}", self.config.url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.key)
            .bearer_auth(&self.config.key)
    }

    /// Upsert keyed on `id`. Re-importing the same games updates the rows in
    /// place instead of failing on duplicate keys.
    fn upsert_request(&self, games: &[GameRecord]) -> Result<Request, Status> {
        Ok(self
            .authorize(self.client.post(self.table_uri("on_conflict=id")))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(games)
            .build()?)
    }

    fn count_request(&self) -> Result<Request, Status> {
        Ok(self
            .authorize(self.client.head(self.table_uri("select=id")))
            .header("Prefer", "count=exact")
            .build()?)
    }

    fn top_rated_request(&self, limit: usize) -> Result<Request, Status> {
        let uri = self.table_uri(&format!(
            "select=id,name,rating,status&order=rating.desc.nullslast&limit={limit}"
        ));
        Ok(self.authorize(self.client.get(&uri)).build()?)
    }
}

#[async_trait]
impl GameStore for SupabaseApi {
    #[instrument(level = "trace", skip(self, games), fields(batch_size = games.len()))]
    async fn upsert(&self, games: &[GameRecord]) -> Result<(), Status> {
        let resp = self.client.execute(self.upsert_request(games)?).await?;

        check(resp).await?;
        Ok(())
    }

    #[instrument(level = "trace", skip(self))]
    async fn count(&self) -> Result<u64, Status> {
        let resp = self.client.execute(self.count_request()?).await?;
        let resp = check(resp).await?;

        let range = match resp.headers().get(CONTENT_RANGE) {
            Some(range) => range.to_str().unwrap_or_default(),
            None => return Err(Status::internal("count response without Content-Range")),
        };
        content_range_total(range)
            .ok_or_else(|| Status::internal(format!("unexpected Content-Range '{range}'")))
    }

    #[instrument(level = "trace", skip(self))]
    async fn top_rated(&self, limit: usize) -> Result<Vec<RatedGame>, Status> {
        let resp = self.client.execute(self.top_rated_request(limit)?).await?;

        let text = check(resp).await?.text().await?;
        serde_json::from_str::<Vec<RatedGame>>(&text).map_err(|e| {
            Status::internal(format!("Parse error: {e}\n Supabase response: {text}"))
        })
    }
}

/// Turns a non-success response into an error carrying the store's message.
async fn check(resp: Response) -> Result<Response, Status> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let text = resp.text().await?;
    let message = match serde_json::from_str::<PostgrestError>(&text) {
        Ok(err) => err.message,
        Err(_) => text,
    };
    Err(Status::internal(format!("{status}: {message}")))
}

/// Total from a `Content-Range` header such as `0-24/250` or `*/0`.
fn content_range_total(range: &str) -> Option<u64> {
    range.rsplit_once('/')?.1.parse().ok()
}

#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: String,
}
