//! Result assembly
//!
//! Normalizes both classifiers' output into the canonical result shape,
//! applies the shared recent-products heuristic exactly once, and owns the
//! caller-facing JSON serialization and response messages.

use serde_json::{json, Value};

use crate::types::{ClassificationResult, IntentResult, ToolArgs, ToolId, METHOD_JOINT};

const RECENT_WORDS: [&str; 3] = ["recent", "latest", "newest"];

/// Build a result from the rule-based joint classifier's output.
pub fn from_intent_result(result: IntentResult) -> ClassificationResult {
    let mut args = ToolArgs::empty(result.intent);
    for slot in &result.slots {
        args.apply_slot(slot);
    }

    let assembled = ClassificationResult {
        tool_id: result.intent,
        args,
        confidence: result.intent_confidence.clamp(0.0, 1.0),
        method: METHOD_JOINT.to_string(),
        query_type: String::new(),
        entity: String::new(),
        intent_tag: String::new(),
        description: String::new(),
    };

    finalize(assembled, &result.raw_text)
}

/// Apply cross-cutting post-processing to a result from either classifier.
///
/// List requests phrased with "recent"/"latest"/"newest" are forced to a
/// single most-recent item, overriding any limit already present.
pub fn finalize(mut result: ClassificationResult, raw_text: &str) -> ClassificationResult {
    if result.tool_id == ToolId::List {
        let text_lower = raw_text.to_lowercase();
        if RECENT_WORDS.iter().any(|word| text_lower.contains(word)) {
            if let ToolArgs::List(list_args) = &mut result.args {
                list_args.limit = Some(1);
                list_args.recent_only = Some(true);
            }
        }
    }

    result.confidence = result.confidence.clamp(0.0, 1.0);
    result
}

/// Serialize a result to the downstream executor's expected shape.
pub fn to_value(result: &ClassificationResult) -> Value {
    json!({
        "tool_name": result.tool_id.as_str(),
        "tool_args": result.args.to_map(),
        "confidence": result.confidence,
        "method": result.method,
        "query_type": result.query_type,
        "entity": result.entity,
        "intent": result.intent_tag,
        "description": result.description,
    })
}

/// User-facing message for an executed tool. List results adjust to the
/// number of products returned.
pub fn response_message(tool: ToolId, list_result_count: Option<usize>) -> &'static str {
    if tool == ToolId::List {
        if let Some(count) = list_result_count {
            return match count {
                0 => "No products found.",
                1 => "Here's the product:",
                _ => "Here are the products:",
            };
        }
    }

    match tool {
        ToolId::Create => "Added! Here's the product:",
        ToolId::Update => "Updated! Here's the product:",
        ToolId::Delete => "Deleted! Product removed successfully.",
        ToolId::Get => "Found! Here's the product:",
        ToolId::List => "Here are the products:",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleClassifier;
    use serde_json::json;

    #[test]
    fn test_recent_heuristic_forces_limit() {
        let classifier = RuleClassifier::new();
        let result = from_intent_result(classifier.classify("show latest products"));
        assert_eq!(result.tool_id, ToolId::List);
        let map = result.args.to_map();
        assert_eq!(map.get("limit"), Some(&json!(1)));
        assert_eq!(map.get("recent_only"), Some(&json!(true)));
    }

    #[test]
    fn test_recent_heuristic_overrides_existing_limit() {
        let mut result = ClassificationResult::default_result();
        if let ToolArgs::List(args) = &mut result.args {
            args.limit = Some(25);
        }
        let result = finalize(result, "show me the newest products");
        let map = result.args.to_map();
        assert_eq!(map.get("limit"), Some(&json!(1)));
        assert_eq!(map.get("recent_only"), Some(&json!(true)));
    }

    #[test]
    fn test_recent_heuristic_only_for_list() {
        let classifier = RuleClassifier::new();
        let result = from_intent_result(classifier.classify("delete the latest product 9"));
        // Not a list result, so no limit is injected.
        assert!(result.args.to_map().get("limit").is_none());
    }

    #[test]
    fn test_plain_list_untouched() {
        let classifier = RuleClassifier::new();
        let result = from_intent_result(classifier.classify("list all products"));
        assert!(result.args.to_map().is_empty());
    }

    #[test]
    fn test_value_shape() {
        let classifier = RuleClassifier::new();
        let result = from_intent_result(classifier.classify("delete product 42"));
        let value = to_value(&result);
        assert_eq!(value["tool_name"], json!("product.delete"));
        assert_eq!(value["tool_args"]["id"], json!(42));
        assert_eq!(value["method"], json!("ml_joint_classifier"));
        assert!(value["confidence"].as_f64().unwrap() <= 1.0);
    }

    #[test]
    fn test_response_messages() {
        assert_eq!(
            response_message(ToolId::Create, None),
            "Added! Here's the product:"
        );
        assert_eq!(response_message(ToolId::List, Some(0)), "No products found.");
        assert_eq!(
            response_message(ToolId::List, Some(1)),
            "Here's the product:"
        );
        assert_eq!(
            response_message(ToolId::List, Some(3)),
            "Here are the products:"
        );
        assert_eq!(
            response_message(ToolId::List, None),
            "Here are the products:"
        );
    }
}
