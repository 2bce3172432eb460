//! Trained model persistence
//!
//! A `ModelStore` carries the trained text model and its pattern corpus
//! across process restarts. Loading tolerates missing or corrupt state by
//! yielding nothing, in which case the engine retrains from the corpus.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::model::TextModel;
use crate::types::QueryPattern;

/// Persisted snapshot: the trained model (if training had happened) plus
/// the patterns it was trained on.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoredModel {
    pub model: Option<TextModel>,
    pub patterns: Vec<QueryPattern>,
}

/// Save/load boundary for trained state.
pub trait ModelStore {
    fn save(&self, model: Option<&TextModel>, patterns: &[QueryPattern]) -> Result<()>;
    /// Previously saved state, or `None` when nothing usable is stored.
    fn load(&self) -> Result<Option<StoredModel>>;
}

/// JSON file store.
pub struct JsonModelStore {
    path: PathBuf,
}

impl JsonModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ModelStore for JsonModelStore {
    fn save(&self, model: Option<&TextModel>, patterns: &[QueryPattern]) -> Result<()> {
        let stored = StoredModel {
            model: model.cloned(),
            patterns: patterns.to_vec(),
        };
        let json = serde_json::to_vec(&stored)?;
        std::fs::write(&self.path, json)
            .map_err(|e| Error::Persistence(format!("{}: {e}", self.path.display())))?;
        info!(path = %self.path.display(), patterns = patterns.len(), "model saved");
        Ok(())
    }

    fn load(&self) -> Result<Option<StoredModel>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let bytes = std::fs::read(&self.path)
            .map_err(|e| Error::Persistence(format!("{}: {e}", self.path.display())))?;

        match serde_json::from_slice::<StoredModel>(&bytes) {
            Ok(stored) => {
                info!(
                    path = %self.path.display(),
                    patterns = stored.patterns.len(),
                    trained = stored.model.is_some(),
                    "model loaded"
                );
                Ok(Some(stored))
            }
            Err(error) => {
                warn!(path = %self.path.display(), %error, "stored model unreadable, ignoring");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ToolId;
    use serde_json::Map;

    fn pattern(text: &str, tool: ToolId) -> QueryPattern {
        QueryPattern {
            pattern_text: text.to_string(),
            tool_id: tool,
            argument_template: Map::new(),
            base_confidence: 0.9,
            query_type: "simple".to_string(),
            entity: "products".to_string(),
            intent_tag: "test".to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonModelStore::new(dir.path().join("model.json"));

        let patterns = vec![
            pattern("list all products", ToolId::List),
            pattern("delete product 1", ToolId::Delete),
        ];
        let model = TextModel::train(&patterns).unwrap();

        store.save(Some(&model), &patterns).unwrap();
        let stored = store.load().unwrap().unwrap();

        assert_eq!(stored.patterns.len(), 2);
        let restored = stored.model.unwrap();
        assert_eq!(
            restored.predict("list all products").0,
            model.predict("list all products").0
        );
    }

    #[test]
    fn test_missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonModelStore::new(dir.path().join("absent.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, b"not json at all").unwrap();
        let store = JsonModelStore::new(path);
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_without_model() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonModelStore::new(dir.path().join("model.json"));
        store.save(None, &[pattern("x y", ToolId::List)]).unwrap();
        let stored = store.load().unwrap().unwrap();
        assert!(stored.model.is_none());
        assert_eq!(stored.patterns.len(), 1);
    }
}
