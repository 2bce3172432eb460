//! Corpus-trained classifier
//!
//! Predicts the tool with the trained text model, picks the canonical
//! corpus pattern for its argument template by word-set similarity, then
//! overrides the template with slots extracted from the actual message.
//! Degrades to the fixed default result whenever no model can exist.

use std::sync::OnceLock;

use tracing::debug;

use crate::model::TextModel;
use crate::similarity::jaccard_words;
use crate::slots::{SlotExtractor, SlotName};
use crate::types::{
    ClassificationResult, QueryPattern, Slot, ToolArgs, ToolId, METHOD_ML,
};

/// Classifier over a loaded pattern corpus.
///
/// The model is trained lazily on first classification; `OnceLock` makes
/// concurrent first requests single-flight, and everything is read-only
/// afterwards.
pub struct CorpusClassifier {
    patterns: Vec<QueryPattern>,
    model: OnceLock<Option<TextModel>>,
    slots: SlotExtractor,
}

impl CorpusClassifier {
    /// Build an untrained classifier; training happens on first use.
    pub fn new(patterns: Vec<QueryPattern>) -> Self {
        Self {
            patterns,
            model: OnceLock::new(),
            slots: SlotExtractor::new(),
        }
    }

    /// Build from a persisted model, skipping retraining.
    pub fn with_model(patterns: Vec<QueryPattern>, model: TextModel) -> Self {
        let lock = OnceLock::new();
        let _ = lock.set(Some(model));
        Self {
            patterns,
            model: lock,
            slots: SlotExtractor::new(),
        }
    }

    pub fn patterns(&self) -> &[QueryPattern] {
        &self.patterns
    }

    /// The trained model, training it now if needed. `None` with an empty
    /// corpus.
    pub fn model(&self) -> Option<&TextModel> {
        self.model
            .get_or_init(|| TextModel::train(&self.patterns))
            .as_ref()
    }

    /// Classify a message. Always resolves; never errors.
    pub fn classify(&self, text: &str) -> ClassificationResult {
        let Some(model) = self.model() else {
            return ClassificationResult::default_result();
        };

        let (tool, predicted_confidence) = model.predict(text);

        let Some(best) = self.best_pattern(tool, text) else {
            return ClassificationResult::default_result();
        };

        debug!(
            tool = %tool,
            predicted_confidence,
            pattern = %best.pattern_text,
            "corpus classification"
        );

        let mut args = ToolArgs::from_template(tool, &best.argument_template);
        for slot in self.dynamic_slots(tool, text) {
            args.apply_slot(&slot);
        }

        ClassificationResult {
            tool_id: tool,
            args,
            confidence: (predicted_confidence * best.base_confidence).clamp(0.0, 1.0),
            method: METHOD_ML.to_string(),
            query_type: best.query_type.clone(),
            entity: best.entity.clone(),
            intent_tag: best.intent_tag.clone(),
            description: best.description.clone(),
        }
    }

    /// Best-overlap pattern among those labeled with the predicted tool;
    /// ties keep the earliest pattern in corpus order. Zero overlap with
    /// every candidate yields nothing, which degrades to the default
    /// result.
    fn best_pattern(&self, tool: ToolId, text: &str) -> Option<&QueryPattern> {
        let mut best: Option<&QueryPattern> = None;
        let mut best_similarity = 0.0;

        for pattern in self.patterns.iter().filter(|p| p.tool_id == tool) {
            let similarity = jaccard_words(text, &pattern.pattern_text);
            if similarity > best_similarity {
                best_similarity = similarity;
                best = Some(pattern);
            }
        }

        best
    }

    /// Slots pulled from the actual message, by the same shared engine the
    /// rule-based path uses.
    fn dynamic_slots(&self, tool: ToolId, text: &str) -> Vec<Slot> {
        let text_lower = text.to_lowercase();

        let required: &[SlotName] = match tool {
            ToolId::Create => &[SlotName::Name, SlotName::Price, SlotName::Description],
            ToolId::Update => &[
                SlotName::Id,
                SlotName::Name,
                SlotName::Price,
                SlotName::Description,
            ],
            ToolId::Delete => &[SlotName::Id],
            ToolId::Get => &[SlotName::Id],
            ToolId::List => &[],
        };

        let mut slots: Vec<Slot> = required
            .iter()
            .filter_map(|slot| self.slots.extract(*slot, &text_lower))
            .collect();

        match tool {
            ToolId::List => {
                if let Some(slot) = self.slots.extract_name_prefix(&text_lower) {
                    slots.push(slot);
                }
            }
            ToolId::Create => {
                if !slots.iter().any(|s| s.name == "description") {
                    if let Some(slot) =
                        self.slots.extract_description_fallback(&text_lower, &slots)
                    {
                        slots.push(slot);
                    }
                }
            }
            _ => {}
        }

        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::METHOD_DEFAULT;
    use serde_json::{json, Map};

    fn pattern(text: &str, tool: ToolId, template: &str, confidence: f64) -> QueryPattern {
        QueryPattern {
            pattern_text: text.to_string(),
            tool_id: tool,
            argument_template: crate::corpus::parse_template(template),
            base_confidence: confidence,
            query_type: "simple".to_string(),
            entity: "products".to_string(),
            intent_tag: "test".to_string(),
            description: format!("pattern: {text}"),
        }
    }

    fn sample_classifier() -> CorpusClassifier {
        CorpusClassifier::new(vec![
            pattern("list all products", ToolId::List, "{}", 0.95),
            pattern("show recent products", ToolId::List, "{'limit': 5}", 0.9),
            pattern("create a new product", ToolId::Create, "{}", 0.9),
            pattern("add product smart lamp", ToolId::Create, "{}", 0.9),
            pattern("delete product 1", ToolId::Delete, "{}", 0.95),
            pattern("update product 1 price 10", ToolId::Update, "{}", 0.9),
            pattern("get product 1", ToolId::Get, "{}", 0.9),
        ])
    }

    #[test]
    fn test_zero_patterns_returns_default() {
        let classifier = CorpusClassifier::new(vec![]);
        let result = classifier.classify("list all products");
        assert_eq!(result.tool_id, ToolId::List);
        assert!(result.args.to_map().is_empty());
        assert_eq!(result.confidence, 0.5);
        assert_eq!(result.method, METHOD_DEFAULT);
    }

    #[test]
    fn test_list_query_resolves_list() {
        let classifier = sample_classifier();
        let result = classifier.classify("list all products");
        assert_eq!(result.tool_id, ToolId::List);
        assert_eq!(result.method, "ml_classifier");
        assert!(result.confidence > 0.0 && result.confidence <= 1.0);
    }

    #[test]
    fn test_confidence_is_product_of_stages() {
        let classifier = sample_classifier();
        let result = classifier.classify("list all products");
        // Best pattern base confidence is 0.95, so the product can never
        // exceed it.
        assert!(result.confidence <= 0.95);
    }

    #[test]
    fn test_template_seeds_then_dynamic_overrides() {
        let classifier = sample_classifier();
        let result = classifier.classify("delete product 42");
        assert_eq!(result.tool_id, ToolId::Delete);
        let map = result.args.to_map();
        assert_eq!(map.get("id"), Some(&json!(42)));
    }

    #[test]
    fn test_template_survives_when_no_dynamic_value() {
        let classifier = sample_classifier();
        let result = classifier.classify("show recent products");
        assert_eq!(result.tool_id, ToolId::List);
        // Template limit survives; no dynamic list slot overrides it here.
        assert_eq!(result.args.to_map().get("limit"), Some(&json!(5)));
    }

    #[test]
    fn test_create_slots_from_message() {
        let classifier = sample_classifier();
        let result = classifier.classify("add Smart Lamp, with remote control, price $49.99");
        assert_eq!(result.tool_id, ToolId::Create);
        let map = result.args.to_map();
        assert_eq!(map.get("name"), Some(&json!("Smart Lamp")));
        assert_eq!(map.get("price").and_then(|v| v.as_f64()), Some(49.99));
        assert!(map
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap()
            .contains("remote control"));
    }

    #[test]
    fn test_classification_is_idempotent() {
        let classifier = sample_classifier();
        let first = classifier.classify("delete product 42");
        let second = classifier.classify("delete product 42");
        assert_eq!(first.tool_id, second.tool_id);
        assert_eq!(first.confidence, second.confidence);
        assert_eq!(first.args, second.args);
    }

    #[test]
    fn test_prebuilt_model_is_used() {
        let patterns = sample_classifier().patterns.clone();
        let model = TextModel::train(&patterns).unwrap();
        let classifier = CorpusClassifier::with_model(patterns, model);
        let result = classifier.classify("list all products");
        assert_eq!(result.tool_id, ToolId::List);
    }

    #[test]
    fn test_best_pattern_tie_keeps_corpus_order() {
        let classifier = CorpusClassifier::new(vec![
            pattern("alpha beta", ToolId::List, "{'first': true}", 0.9),
            pattern("alpha beta", ToolId::List, "{'second': true}", 0.9),
        ]);
        let best = classifier.best_pattern(ToolId::List, "alpha beta").unwrap();
        assert_eq!(best.argument_template, {
            let mut m = Map::new();
            m.insert("first".to_string(), json!(true));
            m
        });
    }
}
