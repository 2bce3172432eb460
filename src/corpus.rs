//! Pattern corpus loading
//!
//! Corpus sources are tabular CSV files, one labeled query pattern per row.
//! Individual rows and individual files are skipped on failure; the
//! aggregate order (file discovery order, then row order) is the stable
//! tie-break used by the corpus classifier.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::Result;
use crate::types::{QueryPattern, ToolId};

/// A source of labeled query patterns.
pub trait CorpusSource {
    fn load(&self) -> Result<Vec<QueryPattern>>;
}

/// CSV row shape: query_pattern, tool_name, tool_args, confidence,
/// query_type, entity, intent, description.
#[derive(Debug, Deserialize)]
struct PatternRow {
    query_pattern: String,
    tool_name: String,
    tool_args: String,
    confidence: f64,
    query_type: String,
    entity: String,
    intent: String,
    description: String,
}

/// Loads every `*.csv` file under a directory, in sorted path order.
pub struct CsvCorpusDir {
    dir: PathBuf,
}

impl CsvCorpusDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn csv_files(&self) -> Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
            .collect();
        files.sort();
        Ok(files)
    }
}

impl CorpusSource for CsvCorpusDir {
    fn load(&self) -> Result<Vec<QueryPattern>> {
        let mut patterns = Vec::new();

        for path in self.csv_files()? {
            match load_csv_file(&path) {
                Ok(mut file_patterns) => {
                    info!(path = %path.display(), count = file_patterns.len(), "loaded corpus file");
                    patterns.append(&mut file_patterns);
                }
                Err(error) => {
                    warn!(path = %path.display(), %error, "skipping corpus file");
                }
            }
        }

        info!(count = patterns.len(), "corpus loaded");
        Ok(patterns)
    }
}

fn load_csv_file(path: &Path) -> Result<Vec<QueryPattern>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut patterns = Vec::new();

    for row in reader.deserialize::<PatternRow>() {
        match row {
            Ok(row) => {
                if let Some(pattern) = row_to_pattern(row) {
                    patterns.push(pattern);
                }
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "skipping malformed corpus row");
            }
        }
    }

    Ok(patterns)
}

fn row_to_pattern(row: PatternRow) -> Option<QueryPattern> {
    let Some(tool_id) = ToolId::parse(row.tool_name.trim()) else {
        warn!(tool = %row.tool_name, "skipping row with unknown tool");
        return None;
    };

    Some(QueryPattern {
        pattern_text: row.query_pattern.trim().to_string(),
        tool_id,
        argument_template: parse_template(&row.tool_args),
        base_confidence: row.confidence.clamp(0.0, 1.0),
        query_type: row.query_type.trim().to_string(),
        entity: row.entity.trim().to_string(),
        intent_tag: row.intent.trim().to_string(),
        description: row.description.trim().to_string(),
    })
}

/// Parse an argument template from its textual literal form.
///
/// Templates are written as Python-style dict literals in the corpus
/// (`{'limit': 10, 'recent_only': True}`); quotes and keyword literals are
/// normalized before JSON parsing. Anything malformed loads as an empty
/// template rather than failing the row.
pub fn parse_template(raw: &str) -> Map<String, Value> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Map::new();
    }

    let normalized = raw
        .replace('\'', "\"")
        .replace("True", "true")
        .replace("False", "false")
        .replace("None", "null");

    match serde_json::from_str::<Value>(&normalized) {
        Ok(Value::Object(map)) => map,
        _ => {
            warn!(template = raw, "malformed argument template, using empty");
            Map::new()
        }
    }
}
