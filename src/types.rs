//! Core data types for classification results

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Method tag for results produced by the corpus-trained classifier.
pub const METHOD_ML: &str = "ml_classifier";
/// Method tag for results produced by the rule-based joint classifier.
pub const METHOD_JOINT: &str = "ml_joint_classifier";
/// Method tag for the fixed fallback result.
pub const METHOD_DEFAULT: &str = "default";

/// The closed set of tool identifiers a request can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolId {
    Create,
    Update,
    Delete,
    Get,
    List,
}

impl ToolId {
    /// All tools, in fixed table order (used as the intent tie-break order).
    pub const ALL: [ToolId; 5] = [
        ToolId::Create,
        ToolId::Update,
        ToolId::Delete,
        ToolId::Get,
        ToolId::List,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolId::Create => "product.create",
            ToolId::Update => "product.update",
            ToolId::Delete => "product.delete",
            ToolId::Get => "product.get",
            ToolId::List => "product.list",
        }
    }

    /// Parse a tool identifier from its wire name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "product.create" => Some(ToolId::Create),
            "product.update" => Some(ToolId::Update),
            "product.delete" => Some(ToolId::Delete),
            "product.get" => Some(ToolId::Get),
            "product.list" => Some(ToolId::List),
            _ => None,
        }
    }
}

impl std::fmt::Display for ToolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A labeled training example loaded from the pattern corpus.
///
/// Immutable once loaded; corpus order is the stable tie-break for
/// best-pattern selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryPattern {
    pub pattern_text: String,
    pub tool_id: ToolId,
    /// Parsed argument template; malformed templates load as an empty map.
    pub argument_template: Map<String, Value>,
    pub base_confidence: f64,
    pub query_type: String,
    pub entity: String,
    pub intent_tag: String,
    pub description: String,
}

/// A named argument value extracted from free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub name: String,
    pub value: Value,
    pub confidence: f64,
    /// Capture span (byte offsets) in the lower-cased source text.
    pub start: usize,
    pub end: usize,
}

impl Slot {
    pub fn new(name: &str, value: Value, confidence: f64, start: usize, end: usize) -> Self {
        Self {
            name: name.to_string(),
            value,
            confidence,
            start,
            end,
        }
    }
}

/// Intermediate output of the rule-based joint classifier.
#[derive(Debug, Clone)]
pub struct IntentResult {
    pub intent: ToolId,
    pub intent_confidence: f64,
    pub slots: Vec<Slot>,
    pub raw_text: String,
}

/// Arguments for `product.create`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Arguments for `product.update`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Arguments for `product.delete`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

/// Arguments for `product.get`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

/// Arguments for `product.list`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_only: Option<bool>,
}

/// Typed per-tool argument set, converted to/from a generic JSON map only
/// at the boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolArgs {
    Create(CreateArgs),
    Update(UpdateArgs),
    Delete(DeleteArgs),
    Get(GetArgs),
    List(ListArgs),
}

impl ToolArgs {
    /// Empty argument set for a tool.
    pub fn empty(tool: ToolId) -> Self {
        match tool {
            ToolId::Create => ToolArgs::Create(CreateArgs::default()),
            ToolId::Update => ToolArgs::Update(UpdateArgs::default()),
            ToolId::Delete => ToolArgs::Delete(DeleteArgs::default()),
            ToolId::Get => ToolArgs::Get(GetArgs::default()),
            ToolId::List => ToolArgs::List(ListArgs::default()),
        }
    }

    /// Seed typed arguments from a template map. A template that does not
    /// fit the tool's argument shape yields the empty set.
    pub fn from_template(tool: ToolId, template: &Map<String, Value>) -> Self {
        let value = Value::Object(template.clone());
        match tool {
            ToolId::Create => serde_json::from_value(value)
                .map(ToolArgs::Create)
                .unwrap_or_else(|_| Self::empty(tool)),
            ToolId::Update => serde_json::from_value(value)
                .map(ToolArgs::Update)
                .unwrap_or_else(|_| Self::empty(tool)),
            ToolId::Delete => serde_json::from_value(value)
                .map(ToolArgs::Delete)
                .unwrap_or_else(|_| Self::empty(tool)),
            ToolId::Get => serde_json::from_value(value)
                .map(ToolArgs::Get)
                .unwrap_or_else(|_| Self::empty(tool)),
            ToolId::List => serde_json::from_value(value)
                .map(ToolArgs::List)
                .unwrap_or_else(|_| Self::empty(tool)),
        }
    }

    /// Overlay an extracted slot onto the argument set. Slots that do not
    /// belong to the tool's argument shape are ignored.
    pub fn apply_slot(&mut self, slot: &Slot) {
        match self {
            ToolArgs::Create(a) => match slot.name.as_str() {
                "name" => a.name = slot.value.as_str().map(str::to_owned),
                "price" => a.price = slot.value.as_f64(),
                "description" => a.description = slot.value.as_str().map(str::to_owned),
                _ => {}
            },
            ToolArgs::Update(a) => match slot.name.as_str() {
                "id" => a.id = slot.value.as_i64(),
                "name" => a.name = slot.value.as_str().map(str::to_owned),
                "price" => a.price = slot.value.as_f64(),
                "description" => a.description = slot.value.as_str().map(str::to_owned),
                _ => {}
            },
            ToolArgs::Delete(a) => {
                if slot.name == "id" {
                    a.id = slot.value.as_i64();
                }
            }
            ToolArgs::Get(a) => {
                if slot.name == "id" {
                    a.id = slot.value.as_i64();
                }
            }
            ToolArgs::List(a) => {
                if slot.name == "name_prefix" {
                    a.name_prefix = slot.value.as_str().map(str::to_owned);
                }
            }
        }
    }

    /// Boundary conversion to the generic argument map; unset fields are
    /// omitted.
    pub fn to_map(&self) -> Map<String, Value> {
        let value = match self {
            ToolArgs::Create(a) => serde_json::to_value(a),
            ToolArgs::Update(a) => serde_json::to_value(a),
            ToolArgs::Delete(a) => serde_json::to_value(a),
            ToolArgs::Get(a) => serde_json::to_value(a),
            ToolArgs::List(a) => serde_json::to_value(a),
        };
        match value {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Final result of one classification request.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    pub tool_id: ToolId,
    pub args: ToolArgs,
    pub confidence: f64,
    pub method: String,
    pub query_type: String,
    pub entity: String,
    pub intent_tag: String,
    pub description: String,
}

impl ClassificationResult {
    /// The fixed fallback returned when no model or rule can resolve the
    /// input.
    pub fn default_result() -> Self {
        Self {
            tool_id: ToolId::List,
            args: ToolArgs::empty(ToolId::List),
            confidence: 0.5,
            method: METHOD_DEFAULT.to_string(),
            query_type: "simple".to_string(),
            entity: "products".to_string(),
            intent_tag: "list".to_string(),
            description: "Default fallback".to_string(),
        }
    }
}
