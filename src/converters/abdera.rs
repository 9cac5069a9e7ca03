//! Abdera Convention
//!
//! References:
//! - http://wiki.open311.org/JSON_and_XML_Conversion/#the-abdera-convention
//!
//! Attributes go to an "attributes" mapping and text plus child elements to
//! an ordered "children" list. Single entries are flattened away. Only the
//! XML → data direction is defined.

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

/// Abdera convention (XML → data only)
#[derive(Debug, Clone)]
pub struct Abdera {
    engine: XmlData,
}

impl Default for Abdera {
    fn default() -> Self {
        Self::new()
    }
}

impl Abdera {
    /// Create a new Abdera convention
    pub fn new() -> Self {
        let config = ConventionConfig::new().with_simple_text(true);

        Self {
            engine: XmlData::new(config),
        }
    }

    /// Replace the XML string to scalar coercion
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
        let mut value = Map::new();

        let mut attributes = Map::new();
        for (name, raw) in element.attributes() {
            if declaration_prefix(name).is_none() {
                attributes.insert(name.clone(), self.engine.coerce(Some(raw)));
            }
        }
        let has_attributes = !attributes.is_empty();
        if has_attributes {
            value.insert("attributes".to_string(), JsonValue::Object(attributes));
        }

        let mut children = Vec::new();
        let text = element.text().map(str::trim).unwrap_or_default();
        if !text.is_empty() {
            let scalar = self.engine.coerce(Some(text));
            if self.config().simple_text() && element.children.is_empty() && !has_attributes {
                return Ok((tag, scalar));
            }
            children.push(scalar);
        }

        let counts = SiblingCounts::from_tags(element.children.iter().map(|c| c.tag.as_str()));
        for child in element.children() {
            let (child_tag, child_value) = self.decode_element(child, depth + 1)?;
            push_child_entry(&mut children, &counts, child_tag, child_value);
        }

        if !has_attributes && children.len() == 1 {
            if let Some(only) = children.pop() {
                return Ok((tag, only));
            }
        }
        if !children.is_empty() {
            value.insert("children".to_string(), JsonValue::Array(children));
        }

        Ok((tag, JsonValue::Object(value)))
    }
}

impl Convention for Abdera {
    fn name(&self) -> &'static str {
        "abdera"
    }

    fn engine(&self) -> &XmlData {
        &self.engine
    }

    fn encode(&self, _data: &JsonValue) -> Result<Vec<Element>> {
        Err(Error::UnsupportedFeature(
            "the abdera convention only converts XML to data".to_string(),
        ))
    }

    fn encode_into(&self, _data: &JsonValue, _root: &mut Element) -> Result<()> {
        Err(Error::UnsupportedFeature(
            "the abdera convention only converts XML to data".to_string(),
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
