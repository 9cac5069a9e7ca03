//! Cobra Convention
//!
//! References:
//! - https://github.com/datacenter/cobra/blob/master/cobra/internal/codec/jsoncodec.py
//!
//! Same layout as Abdera, except that "attributes" is always present with
//! sorted, uncoerced values and the "children" list is never flattened.

use serde_json::{Map, Value as JsonValue};
use tracing::instrument;

use super::base::{ConventionConfig, XmlData};
use super::coercion::FromString;
use super::grouping::{push_child_entry, SiblingCounts};
use super::Convention;
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::namespaces::declaration_prefix;

/// Cobra convention (XML → data only)
#[derive(Debug, Clone)]
pub struct Cobra {
    engine: XmlData,
}

impl Default for Cobra {
    fn default() -> Self {
        Self::new()
    }
}

impl Cobra {
    /// Create a new Cobra convention
    pub fn new() -> Self {
        let config = ConventionConfig::new()
            .with_simple_text(true)
            .with_from_string(FromString::Raw);

        Self {
            engine: XmlData::new(config),
        }
    }

    /// Replace the coercion applied to element text
    pub fn with_from_string(mut self, from_string: FromString) -> Self {
        self.engine = self.engine.with_from_string(from_string);
        self
    }

    /// Replace the depth limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.engine = self.engine.with_limits(limits);
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &ConventionConfig {
        self.engine.config()
    }

    fn decode_element(&self, element: &Element, depth: usize) -> Result<(String, JsonValue)> {
        self.config().limits().check_depth(depth)?;

        let tag = element.tag.clone();

        let mut names: Vec<&String> = element
            .attributes()
            .keys()
            .filter(|name| declaration_prefix(name).is_none())
            .collect();
        names.sort();
        let mut attributes = Map::new();
        for name in &names {
            attributes.insert(
                name.to_string(),
                JsonValue::String(element.attributes[name.as_str()].clone()),
            );
        }

        let text = element.text().map(str::trim).unwrap_or_default();
        let mut children = Vec::new();
        if !text.is_empty() {
            let scalar = self.engine.coerce(Some(text));
            if self.config().simple_text() && element.children.is_empty() && names.is_empty() {
                return Ok((tag, scalar));
            }
            children.push(scalar);
        }

        let counts = SiblingCounts::from_tags(element.children.iter().map(|c| c.tag.as_str()));
        for child in element.children() {
            let (child_tag, child_value) = self.decode_element(child, depth + 1)?;
            push_child_entry(&mut children, &counts, child_tag, child_value);
        }

        let mut value = Map::new();
        value.insert("attributes".to_string(), JsonValue::Object(attributes));
        if !children.is_empty() {
            value.insert("children".to_string(), JsonValue::Array(children));
        }

        Ok((tag, JsonValue::Object(value)))
    }
}

impl Convention for Cobra {
    fn name(&self) -> &'static str {
        "cobra"
    }

    fn engine(&self) -> &XmlData {
        &self.engine
    }

    fn encode(&self, _data: &JsonValue) -> Result<Vec<Element>> {
        Err(Error::UnsupportedFeature(
            "the cobra convention only converts XML to data".to_string(),
        ))
    }

    fn encode_into(&self, _data: &JsonValue, _root: &mut Element) -> Result<()> {
        Err(Error::UnsupportedFeature(
            "the cobra convention only converts XML to data".to_string(),
        ))
    }

    #[instrument(level = "debug", skip_all, fields(root = %root.tag))]
    fn decode(&self, root: &Element) -> Result<JsonValue> {
        let (tag, value) = self.decode_element(root, 0)?;
        let mut wrapper = Map::new();
        wrapper.insert(tag, value);
        Ok(JsonValue::Object(wrapper))
    }

    fn is_lossy(&self) -> bool {
        true
    }

    fn loses_xmlns(&self) -> bool {
        true
    }
}
