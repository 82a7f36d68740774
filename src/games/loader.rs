use std::path::{Path, PathBuf};

use crate::{documents::GameRecord, Status};
use serde_json::Value;
use tracing::{info, instrument};

/// Records read from one scraper output file.
#[derive(Debug, Default, Clone)]
pub struct SourceFile {
    pub name: String,
    pub records: Vec<GameRecord>,
}

/// Shapes of the documents written by the different scrapers.
#[derive(Debug, PartialEq)]
pub enum RecordSource {
    /// A bare array of records.
    Bare(Vec<Value>),

    /// `{ "games": [...] }`
    Games(Vec<Value>),

    /// `{ "selected_games": [...] }`, written by the curated selection scraper.
    SelectedGames(Vec<Value>),

    /// Anything else contributes no records.
    Unrecognized,
}

impl RecordSource {
    pub fn classify(document: Value) -> Self {
        match document {
            Value::Array(records) => RecordSource::Bare(records),
            Value::Object(mut fields) => {
                if let Some(Value::Array(records)) = fields.remove("games") {
                    RecordSource::Games(records)
                } else if let Some(Value::Array(records)) = fields.remove("selected_games") {
                    RecordSource::SelectedGames(records)
                } else {
                    RecordSource::Unrecognized
                }
            }
            _ => RecordSource::Unrecognized,
        }
    }

    pub fn into_records(self) -> Vec<Value> {
        match self {
            RecordSource::Bare(records)
            | RecordSource::Games(records)
            | RecordSource::SelectedGames(records) => records,
            RecordSource::Unrecognized => vec![],
        }
    }
}

/// Lists scraper output files in `dir`, sorted by file name.
///
/// Hidden files such as `.gitkeep` markers are skipped.
pub fn list_data_files(dir: &Path) -> Result<Vec<PathBuf>, Status> {
    let mut files = vec![];
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('.') || !name.ends_with(".json") {
            continue;
        }
        files.push(entry.path());
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

/// Reads a single scraper document. Malformed input aborts the run.
#[instrument(level = "trace")]
pub fn load_file(path: &Path) -> Result<SourceFile, Status> {
    let name = match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => return Err(Status::invalid_argument(format!("{path:?} is not a file"))),
    };

    let text = std::fs::read_to_string(path)?;
    let document = serde_json::from_str::<Value>(&text).map_err(|e| Status::parse(&name, e))?;

    let records = RecordSource::classify(document)
        .into_records()
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            serde_json::from_value::<GameRecord>(record)
                .map_err(|e| Status::parse(&format!("{name}[{i}]"), e))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SourceFile { name, records })
}

/// Loads every scraper document under `dir` in file name order.
pub fn load_dir(dir: &Path) -> Result<Vec<SourceFile>, Status> {
    let files = list_data_files(dir)?;
    info!("Found {} JSON files to process", files.len());

    let mut sources = vec![];
    for path in files {
        let source = load_file(&path)?;
        info!("{}: {} games", source.name, source.records.len());
        sources.push(source);
    }

    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn classify_bare_array() {
        let source = RecordSource::classify(json!([{"id": "1"}]));
        assert_eq!(source, RecordSource::Bare(vec![json!({"id": "1"})]));
    }

    #[test]
    fn classify_prefers_games_over_selected_games() {
        let source = RecordSource::classify(json!({
            "games": [{"id": "1"}],
            "selected_games": [{"id": "2"}],
        }));
        assert_eq!(source, RecordSource::Games(vec![json!({"id": "1"})]));
    }

    #[test]
    fn classify_selected_games() {
        let source = RecordSource::classify(json!({"selected_games": [{"id": "2"}]}));
        assert_eq!(source, RecordSource::SelectedGames(vec![json!({"id": "2"})]));
    }

    #[test]
    fn classify_falls_through_non_array_games() {
        let source = RecordSource::classify(json!({
            "games": "not a list",
            "selected_games": [{"id": "2"}],
        }));
        assert_eq!(source, RecordSource::SelectedGames(vec![json!({"id": "2"})]));
    }

    #[test]
    fn classify_unrecognized_shapes() {
        assert_eq!(
            RecordSource::classify(json!({"items": []})),
            RecordSource::Unrecognized
        );
        assert_eq!(RecordSource::classify(json!(17)), RecordSource::Unrecognized);
        assert!(RecordSource::classify(json!("games")).into_records().is_empty());
    }

    #[test]
    fn lists_json_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.json", "[]");
        write(dir.path(), "a.json", "[]");
        write(dir.path(), "notes.txt", "");
        write(dir.path(), ".gitkeep", "");
        write(dir.path(), ".hidden.json", "[]");
        fs::create_dir(dir.path().join("nested.json")).unwrap();

        let names = list_data_files(dir.path())
            .unwrap()
            .into_iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[test]
    fn load_file_reads_wrapped_records() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "action.json",
            r#"{"category": "action", "games": [{"id": "1", "name": "Foo"}]}"#,
        );

        let source = load_file(&dir.path().join("action.json")).unwrap();
        assert_eq!(source.name, "action.json");
        assert_eq!(source.records.len(), 1);
        assert_eq!(source.records[0].name, "Foo");
    }

    #[test]
    fn load_file_unrecognized_shape_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "stats.json", r#"{"total": 3}"#);

        let source = load_file(&dir.path().join("stats.json")).unwrap();
        assert!(source.records.is_empty());
    }

    #[test]
    fn malformed_file_aborts_load() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.json", r#"[{"id": "1"}]"#);
        write(dir.path(), "b.json", r#"[{"id": "2""#);

        match load_dir(dir.path()) {
            Err(Status::Parse(msg)) => assert!(msg.starts_with("b.json")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn mistyped_record_aborts_load() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "a.json",
            r#"[{"id": "1"}, {"id": "2"}, {"id": "3", "rating": "great"}]"#,
        );

        match load_file(&dir.path().join("a.json")) {
            Err(Status::Parse(msg)) => assert!(msg.starts_with("a.json[2]: "), "{msg}"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
