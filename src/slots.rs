//! Slot extraction from user input
//!
//! One ordered pattern table per slot type, shared by both classifiers.
//! Extraction is a pure function of (slot name, text): rules are tried in
//! order against the lower-cased text, the first match whose processed
//! value is usable wins.

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::types::Slot;

/// Slot types known to the extraction engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotName {
    Name,
    Price,
    Id,
    Description,
}

impl SlotName {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotName::Name => "name",
            SlotName::Price => "price",
            SlotName::Id => "id",
            SlotName::Description => "description",
        }
    }
}

/// Phrases that name the entity rather than a product; never usable as a
/// product name.
const GENERIC_NAMES: [&str; 5] = ["product", "products", "a product", "new product", "a new product"];

/// Extracts typed slot values from user messages.
pub struct SlotExtractor {
    name_rules: Vec<(Regex, f64)>,
    price_rules: Vec<(Regex, f64)>,
    id_rules: Vec<(Regex, f64)>,
    description_rules: Vec<(Regex, f64)>,
    prefix_rules: Vec<Regex>,
}

impl SlotExtractor {
    pub fn new() -> Self {
        // Compile rule tables once - these patterns never fail
        let rule = |pattern: &str, confidence: f64| {
            (Regex::new(pattern).expect("invalid slot pattern"), confidence)
        };

        let name_rules = vec![
            rule(
                r"(?:add|create|new product called?|product called?|named?)\s+([^,]+?)(?:\s*,|\s+with|\s+price|$)",
                0.9,
            ),
            rule(r"(?:add|create)\s+([^,]+?)(?:\s*,|\s+with|\s+price|$)", 0.85),
        ];

        let price_rules = vec![
            rule(r"price\s*\$?(\d+(?:\.\d{2})?)", 0.95),
            rule(r"\$(\d+(?:\.\d{2})?)", 0.9),
            rule(r"(\d+(?:\.\d{2})?)\s*dollars?", 0.85),
            rule(r"(\d+(?:\.\d{2})?)\s*usd", 0.85),
        ];

        let id_rules = vec![
            rule(r"(?:product\s+)?id\s+(\d+)", 0.95),
            rule(
                r"(?:update|modify|change|edit|delete|remove|drop|get|find|retrieve)\s+(?:product\s+)?(\d+)",
                0.9,
            ),
        ];

        let description_rules = vec![
            rule(r"with\s+([^,]+?)(?:\s*,|\s+price|$)", 0.9),
            rule(r"description[:\s]+([^,]+?)(?:\s*,|\s+price|$)", 0.95),
            rule(r"features?[:\s]+([^,]+?)(?:\s*,|\s+price|$)", 0.9),
        ];

        let prefix = |pattern: &str| Regex::new(pattern).expect("invalid prefix pattern");
        let prefix_rules = vec![
            prefix(r"starting\s+with\s+letter\s+([a-z])"),
            prefix(r"starting\s+with\s+([a-z])"),
            prefix(r"that\s+start\s+with\s+([a-z])"),
            prefix(r"beginning\s+with\s+([a-z])"),
        ];

        Self {
            name_rules,
            price_rules,
            id_rules,
            description_rules,
            prefix_rules,
        }
    }

    fn rules(&self, slot: SlotName) -> &[(Regex, f64)] {
        match slot {
            SlotName::Name => &self.name_rules,
            SlotName::Price => &self.price_rules,
            SlotName::Id => &self.id_rules,
            SlotName::Description => &self.description_rules,
        }
    }

    /// Extract one slot from the lower-cased text, or nothing if every rule
    /// fails. Rules whose captured value fails its processor are skipped
    /// in favor of the next rule.
    pub fn extract(&self, slot: SlotName, text_lower: &str) -> Option<Slot> {
        for (pattern, confidence) in self.rules(slot) {
            let Some(caps) = pattern.captures(text_lower) else {
                continue;
            };
            let Some(group) = caps.get(1) else {
                continue;
            };
            let raw = group.as_str().trim();
            if let Some(value) = process_value(slot, raw) {
                debug!(slot = slot.as_str(), %value, "slot extracted");
                return Some(Slot::new(
                    slot.as_str(),
                    value,
                    *confidence,
                    group.start(),
                    group.end(),
                ));
            }
        }
        None
    }

    /// List-specific extraction: leading letter after "starting with" /
    /// "beginning with" phrasing, uppercased, used as a name-prefix filter.
    pub fn extract_name_prefix(&self, text_lower: &str) -> Option<Slot> {
        for pattern in &self.prefix_rules {
            if let Some(caps) = pattern.captures(text_lower) {
                if let Some(group) = caps.get(1) {
                    let letter = group.as_str().to_uppercase();
                    return Some(Slot::new(
                        "name_prefix",
                        Value::String(letter),
                        0.9,
                        group.start(),
                        group.end(),
                    ));
                }
            }
        }
        None
    }

    /// Fallback description extraction for create messages.
    ///
    /// Removes every already-extracted name/price occurrence from the
    /// lower-cased text by literal substring match on their normalized
    /// renderings, strips a leading comma and collapses whitespace; a
    /// remainder longer than 2 chars becomes a description slot at fixed
    /// confidence 0.7. Only fires when at least one name/price slot was
    /// extracted, since otherwise the remainder is the whole command.
    pub fn extract_description_fallback(
        &self,
        text_lower: &str,
        existing_slots: &[Slot],
    ) -> Option<Slot> {
        let removable: Vec<&Slot> = existing_slots
            .iter()
            .filter(|s| s.name == "name" || s.name == "price")
            .collect();
        if removable.is_empty() {
            return None;
        }

        let mut remainder = text_lower.to_string();
        for slot in removable {
            if slot.name == "name" {
                if let Some(name) = slot.value.as_str() {
                    let name_lower = name.to_lowercase();
                    for verb in [
                        "add",
                        "create",
                        "new product called",
                        "product called",
                        "named",
                        "name",
                    ] {
                        remainder = remainder.replace(&format!("{verb} {name_lower}"), "");
                    }
                    remainder = remainder.replace(&name_lower, "");
                }
            } else if let Some(price) = slot.value.as_f64() {
                let rendered = format_price(price);
                for phrase in [
                    format!("price ${rendered}"),
                    format!("price {rendered}"),
                    format!("${rendered}"),
                    format!("{rendered} dollars"),
                    format!("{rendered} dollar"),
                    format!("{rendered} usd"),
                ] {
                    remainder = remainder.replace(&phrase, "");
                }
            }
        }

        let remainder = remainder.trim();
        let remainder = remainder.strip_prefix(',').unwrap_or(remainder);
        let remainder = collapse_whitespace(remainder);

        if remainder.len() > 2 {
            let len = remainder.len();
            Some(Slot::new("description", Value::String(remainder), 0.7, 0, len))
        } else {
            None
        }
    }
}

impl Default for SlotExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a raw captured value through the slot's processor. Unusable values
/// (unparsable numbers, empty or generic names) yield nothing so the next
/// rule can be tried.
fn process_value(slot: SlotName, raw: &str) -> Option<Value> {
    match slot {
        SlotName::Name => {
            let collapsed = collapse_whitespace(raw);
            if collapsed.is_empty() || GENERIC_NAMES.contains(&collapsed.as_str()) {
                return None;
            }
            Some(Value::String(title_case(&collapsed)))
        }
        SlotName::Price => {
            let price: f64 = raw.parse().ok()?;
            serde_json::Number::from_f64(price).map(Value::Number)
        }
        SlotName::Id => {
            let id: i64 = raw.parse().ok()?;
            Some(Value::from(id))
        }
        SlotName::Description => {
            let collapsed = collapse_whitespace(raw);
            if collapsed.is_empty() {
                None
            } else {
                Some(Value::String(collapsed))
            }
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Render a price the way it appears in messages: no trailing ".0" for
/// whole amounts.
fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("{}", price as i64)
    } else {
        format!("{price}")
    }
}
