//! Sibling grouping policy
//!
//! Decides how same-parent child elements land in their parent's mapping:
//! a tag seen once maps straight to its value, a repeated tag maps to a
//! list of values in document order.

use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};

/// Occurrence count of each tag among a set of siblings
#[derive(Debug, Clone, Default)]
pub struct SiblingCounts {
    counts: IndexMap<String, usize>,
}

impl SiblingCounts {
    /// Count the given tags
    pub fn from_tags<'a>(tags: impl IntoIterator<Item = &'a str>) -> Self {
        let mut counts = IndexMap::new();
        for tag in tags {
            *counts.entry(tag.to_string()).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Number of siblings with `tag`
    pub fn get(&self, tag: &str) -> usize {
        self.counts.get(tag).copied().unwrap_or(0)
    }

    /// Whether `tag` occurs more than once
    pub fn is_repeated(&self, tag: &str) -> bool {
        self.get(tag) > 1
    }
}

/// Group converted siblings into a mapping.
///
/// Keys appear in order of first occurrence. Only tags with more than one
/// occurrence produce lists.
pub fn group_siblings(siblings: Vec<(String, JsonValue)>) -> Map<String, JsonValue> {
    let counts = SiblingCounts::from_tags(siblings.iter().map(|(tag, _)| tag.as_str()));
    let mut grouped = Map::new();

    for (tag, value) in siblings {
        if counts.is_repeated(&tag) {
            let entry = grouped
                .entry(tag)
                .or_insert_with(|| JsonValue::Array(Vec::new()));
            if let JsonValue::Array(items) = entry {
                items.push(value);
            }
        } else {
            grouped.insert(tag, value);
        }
    }

    grouped
}

/// Merge grouped siblings into a parent mapping; child keys win.
pub fn merge_into(parent: &mut Map<String, JsonValue>, grouped: Map<String, JsonValue>) {
    for (key, value) in grouped {
        parent.insert(key, value);
    }
}

/// Append one converted child to a `children` list (Abdera / Cobra layout).
///
/// A tag seen once among its siblings is merged into the previous entry
/// when that entry is a mapping and the list already holds more than one
/// item; otherwise the child is pushed as its own `{tag: value}` entry.
pub fn push_child_entry(
    children: &mut Vec<JsonValue>,
    counts: &SiblingCounts,
    tag: String,
    value: JsonValue,
) {
    let can_merge = !counts.is_repeated(&tag) && children.len() > 1;
    if can_merge {
        if let Some(JsonValue::Object(last)) = children.last_mut() {
            last.insert(tag, value);
            return;
        }
    }

    let mut entry = Map::new();
    entry.insert(tag, value);
    children.push(JsonValue::Object(entry));
}
