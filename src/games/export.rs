use std::path::{Path, PathBuf};

use crate::{
    documents::{GameRecord, MergedCollection},
    Status,
};
use itertools::Itertools;
use serde_json::Value;
use tracing::info;

pub const MERGED_FILE: &str = "merged_games.json";
pub const SCHEMA_FILE: &str = "create_games_table.sql";
pub const INSERT_FILE: &str = "insert_games_data.sql";

/// Columns written by the insert text, in table order. `created_at` and
/// `updated_at` are filled in by the store.
pub const INSERT_COLUMNS: [&str; 19] = [
    "id",
    "name",
    "url",
    "thumbnail",
    "rating",
    "status",
    "iframe_src",
    "iframe_html",
    "is_embeddable",
    "description",
    "features",
    "controls",
    "tags",
    "category",
    "play_count",
    "reviews",
    "review_count",
    "average_rating",
    "source_file",
];

pub const SCHEMA_SQL: &str = r#"-- Create games table in Supabase
CREATE TABLE IF NOT EXISTS games (
  id TEXT PRIMARY KEY,
  name TEXT NOT NULL,
  url TEXT,
  thumbnail TEXT,
  rating NUMERIC,
  status TEXT,
  iframe_src TEXT,
  iframe_html TEXT,
  is_embeddable BOOLEAN DEFAULT false,
  description TEXT,
  features JSONB DEFAULT '[]'::jsonb,
  controls TEXT,
  tags JSONB DEFAULT '[]'::jsonb,
  category TEXT,
  play_count INTEGER DEFAULT 0,
  reviews JSONB DEFAULT '[]'::jsonb,
  review_count INTEGER DEFAULT 0,
  average_rating NUMERIC,
  source_file TEXT,
  created_at TIMESTAMPTZ DEFAULT NOW(),
  updated_at TIMESTAMPTZ DEFAULT NOW()
);

-- Indexes for the site's listing queries
CREATE INDEX IF NOT EXISTS idx_games_rating ON games(rating DESC);
CREATE INDEX IF NOT EXISTS idx_games_status ON games(status);
CREATE INDEX IF NOT EXISTS idx_games_category ON games(category);
CREATE INDEX IF NOT EXISTS idx_games_tags ON games USING GIN(tags);
CREATE INDEX IF NOT EXISTS idx_games_is_embeddable ON games(is_embeddable);

-- Keep updated_at current
CREATE OR REPLACE FUNCTION update_updated_at_column()
RETURNS TRIGGER AS $$
BEGIN
  NEW.updated_at = NOW();
  RETURN NEW;
END;
$$ language 'plpgsql';

DROP TRIGGER IF EXISTS update_games_updated_at ON games;
CREATE TRIGGER update_games_updated_at BEFORE UPDATE ON games
FOR EACH ROW EXECUTE FUNCTION update_updated_at_column();

-- Public read-only access
ALTER TABLE games ENABLE ROW LEVEL SECURITY;

CREATE POLICY "Allow public read access" ON games
  FOR SELECT USING (true);

GRANT SELECT ON games TO anon, authenticated;
"#;

/// A single value of an insert statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),

    /// Serialized JSON, annotated as `jsonb`.
    Json(String),
}

impl SqlValue {
    /// Optional text column. Empty strings are stored as NULL.
    fn text(value: &Option<String>) -> Self {
        match value.as_deref() {
            None | Some("") => SqlValue::Null,
            Some(text) => SqlValue::Text(text.to_owned()),
        }
    }

    fn float(value: Option<f64>) -> Self {
        match value {
            Some(value) => SqlValue::Float(value),
            None => SqlValue::Null,
        }
    }

    fn json(values: &[Value]) -> Self {
        SqlValue::Json(Value::Array(values.to_vec()).to_string())
    }

    pub fn render(&self) -> String {
        match self {
            SqlValue::Null => "NULL".to_owned(),
            SqlValue::Bool(true) => "TRUE".to_owned(),
            SqlValue::Bool(false) => "FALSE".to_owned(),
            SqlValue::Int(value) => value.to_string(),
            SqlValue::Float(value) => value.to_string(),
            SqlValue::Text(text) => quote(text),
            SqlValue::Json(json) => format!("{}::jsonb", quote(json)),
        }
    }
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Row values of `record` in `INSERT_COLUMNS` order.
pub fn row(record: &GameRecord) -> [SqlValue; 19] {
    [
        SqlValue::Text(record.id.clone()),
        SqlValue::Text(record.name.clone()),
        SqlValue::text(&record.url),
        SqlValue::text(&record.thumbnail),
        SqlValue::float(record.rating),
        SqlValue::text(&record.status),
        SqlValue::text(&record.iframe_src),
        SqlValue::text(&record.iframe_html),
        SqlValue::Bool(record.is_embeddable),
        SqlValue::text(&record.description),
        SqlValue::json(&record.features),
        SqlValue::text(&record.controls),
        SqlValue::json(&record.tags),
        SqlValue::text(&record.category),
        SqlValue::Int(record.play_count),
        SqlValue::json(&record.reviews),
        SqlValue::Int(record.review_count),
        SqlValue::float(record.average_rating),
        SqlValue::text(&record.source_file),
    ]
}

pub fn insert_statement(record: &GameRecord) -> String {
    format!(
        "INSERT INTO games ({}) VALUES (\n  {}\n);\n",
        INSERT_COLUMNS.join(", "),
        row(record).iter().map(SqlValue::render).join(",\n  ")
    )
}

/// One insert statement per record, in order.
pub fn insert_sql(records: &[GameRecord]) -> String {
    let mut sql = String::from("-- Insert game data\n-- Run this after creating the table\n\n");
    for record in records {
        sql.push_str(&insert_statement(record));
        sql.push('\n');
    }
    sql
}

#[derive(Debug)]
pub struct Artifacts {
    pub merged: PathBuf,
    pub schema: PathBuf,
    pub insert: PathBuf,
}

/// Writes the merged document and both SQL scripts to `dir`, replacing any
/// previous run's output.
pub fn write_artifacts(dir: &Path, collection: &MergedCollection) -> Result<Artifacts, Status> {
    let artifacts = Artifacts {
        merged: dir.join(MERGED_FILE),
        schema: dir.join(SCHEMA_FILE),
        insert: dir.join(INSERT_FILE),
    };

    std::fs::write(
        &artifacts.merged,
        serde_json::to_string_pretty(collection)?,
    )?;
    info!("Merged data saved to: {}", artifacts.merged.display());

    std::fs::write(&artifacts.schema, SCHEMA_SQL)?;
    info!("SQL schema saved to: {}", artifacts.schema.display());

    std::fs::write(&artifacts.insert, insert_sql(&collection.games))?;
    info!("Insert SQL saved to: {}", artifacts.insert.display());

    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn record(id: &str, name: &str) -> GameRecord {
        GameRecord {
            id: id.to_owned(),
            name: name.to_owned(),
            source_file: Some("a.json".to_owned()),
            ..Default::default()
        }
    }

    #[test]
    fn render_scalars() {
        assert_eq!(SqlValue::Null.render(), "NULL");
        assert_eq!(SqlValue::Bool(true).render(), "TRUE");
        assert_eq!(SqlValue::Bool(false).render(), "FALSE");
        assert_eq!(SqlValue::Int(1200).render(), "1200");
        assert_eq!(SqlValue::Float(4.5).render(), "4.5");
        assert_eq!(SqlValue::Float(4.0).render(), "4");
    }

    #[test]
    fn render_doubles_quotes() {
        assert_eq!(
            SqlValue::Text("Joe's Diner".to_owned()).render(),
            "'Joe''s Diner'"
        );
    }

    #[test]
    fn render_json_annotated() {
        assert_eq!(
            SqlValue::json(&[json!("co-op"), json!("it's fun")]).render(),
            r#"'["co-op","it''s fun"]'::jsonb"#
        );
        assert_eq!(SqlValue::json(&[]).render(), "'[]'::jsonb");
    }

    #[test]
    fn empty_optional_text_is_null() {
        assert_eq!(SqlValue::text(&Some(String::new())), SqlValue::Null);
        assert_eq!(SqlValue::text(&None), SqlValue::Null);
    }

    #[test]
    fn statement_keeps_numbers_and_booleans_unquoted() {
        let mut game = record("1", "Joe's Diner");
        game.rating = Some(4.5);
        game.is_embeddable = true;
        game.play_count = 12;

        let statement = insert_statement(&game);
        assert!(statement.contains("\n  4.5,\n"));
        assert!(statement.contains("\n  TRUE,\n"));
        assert!(statement.contains("\n  12,\n"));
        assert!(!statement.contains("'4.5'"));
        assert!(!statement.contains("'TRUE'"));
        assert!(statement.contains("'Joe''s Diner'"));
    }

    #[test]
    fn statement_column_order() {
        let mut game = record("7", "Foo");
        game.tags = vec![json!("racing")];
        game.reviews = vec![json!({"user": "a", "score": 5})];
        game.average_rating = Some(3.25);

        let statement = insert_statement(&game);
        assert!(statement.starts_with(
            "INSERT INTO games (id, name, url, thumbnail, rating, status, iframe_src, \
             iframe_html, is_embeddable, description, features, controls, tags, category, \
             play_count, reviews, review_count, average_rating, source_file) VALUES (\n"
        ));

        let values = statement
            .lines()
            .skip(1)
            .take(19)
            .map(|line| line.trim().trim_end_matches(','))
            .collect::<Vec<_>>();
        assert_eq!(
            values,
            vec![
                "'7'",
                "'Foo'",
                "NULL",
                "NULL",
                "NULL",
                "NULL",
                "NULL",
                "NULL",
                "FALSE",
                "NULL",
                "'[]'::jsonb",
                "NULL",
                r#"'["racing"]'::jsonb"#,
                "NULL",
                "0",
                r#"'[{"user":"a","score":5}]'::jsonb"#,
                "0",
                "3.25",
                "'a.json'",
            ]
        );
        assert!(statement.ends_with("\n);\n"));
    }

    #[test]
    fn opaque_values_keep_scraped_key_order() {
        let game: GameRecord = serde_json::from_str(
            r#"{"id": "1", "reviews": [{"user": "z", "text": "ok", "score": 3}]}"#,
        )
        .unwrap();

        assert_eq!(
            SqlValue::json(&game.reviews).render(),
            r#"'[{"user":"z","text":"ok","score":3}]'::jsonb"#
        );
        assert_eq!(
            serde_json::to_string(&game.reviews).unwrap(),
            r#"[{"user":"z","text":"ok","score":3}]"#
        );
    }

    #[test]
    fn one_statement_per_record_in_order() {
        let sql = insert_sql(&[record("2", "B"), record("1", "A"), record("3", "C")]);

        assert!(sql.starts_with("-- Insert game data\n"));
        assert_eq!(sql.matches("INSERT INTO games").count(), 3);
        let b = sql.find("'B'").unwrap();
        let a = sql.find("'A'").unwrap();
        let c = sql.find("'C'").unwrap();
        assert!(b < a && a < c);
    }

    #[test]
    fn schema_lists_every_column() {
        for column in INSERT_COLUMNS.iter().chain(["created_at", "updated_at"].iter()) {
            assert!(
                SCHEMA_SQL.contains(&format!("\n  {column} ")),
                "missing column {column}"
            );
        }
        assert!(SCHEMA_SQL.contains("id TEXT PRIMARY KEY"));
    }

    #[test]
    fn writes_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let merged_at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let collection = MergedCollection::new(vec![record("1", "Foo")], merged_at);

        let artifacts = write_artifacts(dir.path(), &collection).unwrap();

        let merged: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&artifacts.merged).unwrap()).unwrap();
        assert_eq!(merged["total_games"], json!(1));
        assert_eq!(merged["merged_at"], json!("2024-03-01T00:00:00.000Z"));
        assert_eq!(merged["games"][0]["id"], json!("1"));
        assert_eq!(merged["games"][0]["play_count"], json!(0));
        assert_eq!(merged["games"][0]["source_file"], json!("a.json"));

        assert_eq!(std::fs::read_to_string(&artifacts.schema).unwrap(), SCHEMA_SQL);
        assert_eq!(
            std::fs::read_to_string(&artifacts.insert)
                .unwrap()
                .matches("INSERT INTO games")
                .count(),
            1
        );
    }
}
