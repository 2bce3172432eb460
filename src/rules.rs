//! Rule-based joint intent classification and slot filling
//!
//! Stateless and corpus-free: a fixed ordered rule table scores the five
//! intents, then the winner's slot set is filled by the shared extraction
//! engine.

use regex::Regex;
use tracing::debug;

use crate::slots::{SlotExtractor, SlotName};
use crate::types::{IntentResult, Slot, ToolId};

/// Confidence when no intent rule matches.
const DEFAULT_CONFIDENCE: f64 = 0.5;
/// Boost applied to rules whose pattern source is longer than this.
const SPECIFICITY_LEN: usize = 20;
const SPECIFICITY_BOOST: f64 = 0.05;

struct IntentRule {
    pattern: Regex,
    base_confidence: f64,
    /// Pattern source length, used for the specificity boost.
    source_len: usize,
}

/// Joint intent + slot classifier over a fixed rule table.
pub struct RuleClassifier {
    intents: Vec<(ToolId, Vec<IntentRule>)>,
    slots: SlotExtractor,
}

impl RuleClassifier {
    pub fn new() -> Self {
        let rule = |pattern: &str, base_confidence: f64| IntentRule {
            pattern: Regex::new(pattern).expect("invalid intent pattern"),
            base_confidence,
            source_len: pattern.len(),
        };

        // Table order is the tie-break order: first intent, first rule wins.
        let intents = vec![
            (
                ToolId::Create,
                vec![
                    rule(r"\b(?:add|create|new product|insert)\b", 0.9),
                    rule(r"\b(?:add|create)\s+(?:a\s+)?(?:new\s+)?product\b", 0.95),
                ],
            ),
            (
                ToolId::Update,
                vec![
                    rule(r"\b(?:update|modify|change|edit)\b", 0.9),
                    rule(
                        r"\b(?:update|modify|change|edit)\s+(?:product\s+)?(?:id\s+)?\d+\b",
                        0.95,
                    ),
                ],
            ),
            (
                ToolId::Delete,
                vec![
                    rule(r"\b(?:delete|remove|drop)\b", 0.9),
                    rule(
                        r"\b(?:delete|remove|drop)\s+(?:product\s+)?(?:id\s+)?\d+\b",
                        0.95,
                    ),
                ],
            ),
            (
                ToolId::Get,
                vec![
                    rule(r"\b(?:get|find|retrieve|show|display|view)\b", 0.8),
                    rule(
                        r"\b(?:get|find|retrieve|show|display|view)\s+(?:product\s+)?(?:id\s+)?\d+\b",
                        0.9,
                    ),
                ],
            ),
            (
                ToolId::List,
                vec![
                    rule(r"\b(?:list|show|display|view|get)\s+(?:all\s+)?products?\b", 0.95),
                    rule(r"\b(?:what\s+)?products?\s+(?:do\s+you\s+)?have\b", 0.9),
                    rule(r"\b(?:catalog|inventory)\b", 0.85),
                    rule(r"\b(?:get|show)\s+recent\s+(?:created\s+)?products?\b", 0.95),
                    rule(r"\b(?:show|get)\s+(?:latest|newest)\s+products?\b", 0.95),
                    rule(r"\b(?:recent|latest|newest)\s+products?\b", 0.9),
                ],
            ),
        ];

        Self {
            intents,
            slots: SlotExtractor::new(),
        }
    }

    /// Classify intent and fill its slots in one pass.
    pub fn classify(&self, text: &str) -> IntentResult {
        let text_lower = text.to_lowercase();

        let (intent, intent_confidence) = self.classify_intent(&text_lower);
        let mut slots = self.fill_slots(intent, &text_lower);

        // Create messages without an explicit description marker still often
        // carry one after the name/price phrases.
        if intent == ToolId::Create && !slots.iter().any(|s| s.name == "description") {
            if let Some(slot) = self.slots.extract_description_fallback(&text_lower, &slots) {
                slots.push(slot);
            }
        }

        debug!(
            intent = %intent,
            confidence = intent_confidence,
            slot_count = slots.len(),
            "rule classification"
        );

        IntentResult {
            intent,
            intent_confidence,
            slots,
            raw_text: text.to_string(),
        }
    }

    /// Score every rule of every intent; the maximum wins, ties resolved by
    /// table order. No match at all falls back to the list tool.
    fn classify_intent(&self, text_lower: &str) -> (ToolId, f64) {
        let mut best_intent = ToolId::List;
        let mut best_confidence = DEFAULT_CONFIDENCE;

        for (intent, rules) in &self.intents {
            for rule in rules {
                if !rule.pattern.is_match(text_lower) {
                    continue;
                }
                let mut confidence = rule.base_confidence;
                if rule.source_len > SPECIFICITY_LEN {
                    confidence += SPECIFICITY_BOOST;
                }
                if confidence > best_confidence {
                    best_confidence = confidence;
                    best_intent = *intent;
                }
            }
        }

        (best_intent, best_confidence.min(1.0))
    }

    fn fill_slots(&self, intent: ToolId, text_lower: &str) -> Vec<Slot> {
        let required: &[SlotName] = match intent {
            ToolId::Create => &[SlotName::Name, SlotName::Price, SlotName::Description],
            ToolId::Update => &[
                SlotName::Id,
                SlotName::Name,
                SlotName::Price,
                SlotName::Description,
            ],
            ToolId::Delete => &[SlotName::Id],
            ToolId::Get => &[SlotName::Id],
            // List arguments come from the list-specific prefix extractor.
            ToolId::List => &[],
        };

        let mut slots: Vec<Slot> = required
            .iter()
            .filter_map(|slot| self.slots.extract(*slot, text_lower))
            .collect();

        if intent == ToolId::List {
            if let Some(slot) = self.slots.extract_name_prefix(text_lower) {
                slots.push(slot);
            }
        }

        slots
    }
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new()
    }
}
