//! Classification engine facade
//!
//! Explicitly constructed (no process-wide singletons): build it once from
//! a corpus source and/or a model store, then share it read-only across
//! requests. Both public entrypoints are pure functions of the engine
//! state and the input text.

use tracing::info;

use crate::assembler;
use crate::classifier::CorpusClassifier;
use crate::corpus::CorpusSource;
use crate::error::{Error, Result};
use crate::persistence::ModelStore;
use crate::rules::RuleClassifier;
use crate::types::{ClassificationResult, QueryPattern};

/// The two classification paths behind one constructed component.
pub struct ClassifierEngine {
    corpus: CorpusClassifier,
    rules: RuleClassifier,
}

impl ClassifierEngine {
    /// Build from an already-loaded corpus. An empty corpus is allowed:
    /// the corpus path degrades to the default result and the rule path
    /// still works.
    pub fn new(patterns: Vec<QueryPattern>) -> Self {
        Self {
            corpus: CorpusClassifier::new(patterns),
            rules: RuleClassifier::new(),
        }
    }

    /// Build from a corpus source, requiring a usable corpus.
    pub fn from_source(source: &dyn CorpusSource) -> Result<Self> {
        let patterns = source.load()?;
        if patterns.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        Ok(Self::new(patterns))
    }

    /// Build from persisted state, retraining from the corpus source when
    /// nothing usable is stored. Fails only if neither the store nor the
    /// source can produce any patterns.
    pub fn load_or_train(store: &dyn ModelStore, source: &dyn CorpusSource) -> Result<Self> {
        if let Some(stored) = store.load()? {
            if !stored.patterns.is_empty() {
                info!(patterns = stored.patterns.len(), "engine built from stored model");
                let corpus = match stored.model {
                    Some(model) => CorpusClassifier::with_model(stored.patterns, model),
                    None => CorpusClassifier::new(stored.patterns),
                };
                return Ok(Self {
                    corpus,
                    rules: RuleClassifier::new(),
                });
            }
        }

        info!("no stored model, training from corpus source");
        Self::from_source(source)
    }

    pub fn patterns(&self) -> &[QueryPattern] {
        self.corpus.patterns()
    }

    /// Persist the current corpus and (lazily trained) model.
    pub fn save_to(&self, store: &dyn ModelStore) -> Result<()> {
        store.save(self.corpus.model(), self.corpus.patterns())
    }

    /// Classify via the corpus-trained model.
    pub fn classify_with_corpus_model(&self, text: &str) -> ClassificationResult {
        assembler::finalize(self.corpus.classify(text), text)
    }

    /// Classify via the rule-based joint classifier.
    pub fn classify_with_rules(&self, text: &str) -> ClassificationResult {
        assembler::from_intent_result(self.rules.classify(text))
    }
}
