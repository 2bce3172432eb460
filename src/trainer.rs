//! Training orchestration
//!
//! Loads the corpus, trains the text model eagerly and saves both through
//! a model store. Used by offline training jobs; the engine itself trains
//! lazily.

use ahash::AHashMap;

use tracing::{info, warn};

use crate::corpus::CorpusSource;
use crate::error::Result;
use crate::model::TextModel;
use crate::persistence::ModelStore;
use crate::types::QueryPattern;

/// Corpus breakdown after training.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingStats {
    pub total_patterns: usize,
    pub by_query_type: AHashMap<String, usize>,
    pub by_entity: AHashMap<String, usize>,
    pub by_intent: AHashMap<String, usize>,
    pub trained: bool,
}

/// One-shot trainer over a corpus source.
pub struct ClassifierTrainer {
    patterns: Vec<QueryPattern>,
    model: Option<TextModel>,
}

impl ClassifierTrainer {
    /// Load every pattern from the source and train. An empty corpus loads
    /// fine but leaves the model untrained.
    pub fn train_from(source: &dyn CorpusSource) -> Result<Self> {
        let patterns = source.load()?;

        if patterns.is_empty() {
            warn!("corpus source produced no patterns, nothing to train");
            return Ok(Self {
                patterns,
                model: None,
            });
        }

        let model = TextModel::train(&patterns);
        info!(patterns = patterns.len(), "training complete");

        Ok(Self { patterns, model })
    }

    pub fn patterns(&self) -> &[QueryPattern] {
        &self.patterns
    }

    pub fn model(&self) -> Option<&TextModel> {
        self.model.as_ref()
    }

    /// Persist the trained model and its corpus.
    pub fn save_to(&self, store: &dyn ModelStore) -> Result<()> {
        if self.model.is_none() {
            warn!("saving untrained state");
        }
        store.save(self.model.as_ref(), &self.patterns)
    }

    pub fn stats(&self) -> TrainingStats {
        let mut by_query_type: AHashMap<String, usize> = AHashMap::new();
        let mut by_entity: AHashMap<String, usize> = AHashMap::new();
        let mut by_intent: AHashMap<String, usize> = AHashMap::new();

        for pattern in &self.patterns {
            *by_query_type.entry(pattern.query_type.clone()).or_insert(0) += 1;
            *by_entity.entry(pattern.entity.clone()).or_insert(0) += 1;
            *by_intent.entry(pattern.intent_tag.clone()).or_insert(0) += 1;
        }

        TrainingStats {
            total_patterns: self.patterns.len(),
            by_query_type,
            by_entity,
            by_intent,
            trained: self.model.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::persistence::JsonModelStore;
    use crate::types::ToolId;
    use serde_json::Map;

    struct FixedSource(Vec<QueryPattern>);

    impl CorpusSource for FixedSource {
        fn load(&self) -> Result<Vec<QueryPattern>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenSource;

    impl CorpusSource for BrokenSource {
        fn load(&self) -> Result<Vec<QueryPattern>> {
            Err(Error::Corpus("unavailable".to_string()))
        }
    }

    fn pattern(text: &str, tool: ToolId, query_type: &str, intent: &str) -> QueryPattern {
        QueryPattern {
            pattern_text: text.to_string(),
            tool_id: tool,
            argument_template: Map::new(),
            base_confidence: 0.9,
            query_type: query_type.to_string(),
            entity: "products".to_string(),
            intent_tag: intent.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_train_and_stats() {
        let source = FixedSource(vec![
            pattern("list all products", ToolId::List, "simple", "list"),
            pattern("show products", ToolId::List, "simple", "list"),
            pattern("delete product 1", ToolId::Delete, "targeted", "delete"),
        ]);

        let trainer = ClassifierTrainer::train_from(&source).unwrap();
        let stats = trainer.stats();

        assert!(stats.trained);
        assert_eq!(stats.total_patterns, 3);
        assert_eq!(stats.by_query_type.get("simple"), Some(&2));
        assert_eq!(stats.by_intent.get("delete"), Some(&1));
        assert_eq!(stats.by_entity.get("products"), Some(&3));
    }

    #[test]
    fn test_empty_source_is_untrained_not_error() {
        let trainer = ClassifierTrainer::train_from(&FixedSource(vec![])).unwrap();
        assert!(trainer.model().is_none());
        assert!(!trainer.stats().trained);
    }

    #[test]
    fn test_source_failure_propagates() {
        assert!(ClassifierTrainer::train_from(&BrokenSource).is_err());
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonModelStore::new(dir.path().join("model.json"));

        let source = FixedSource(vec![
            pattern("list all products", ToolId::List, "simple", "list"),
            pattern("delete product 1", ToolId::Delete, "targeted", "delete"),
        ]);
        let trainer = ClassifierTrainer::train_from(&source).unwrap();
        trainer.save_to(&store).unwrap();

        let stored = store.load().unwrap().unwrap();
        assert_eq!(stored.patterns.len(), 2);
        assert!(stored.model.is_some());
    }
}
