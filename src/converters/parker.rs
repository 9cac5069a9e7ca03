//! Parker Convention
//!
//! Implements the Parker convention for XML to data conversion.
//!
//! References:
//! - http://wiki.open311.org/JSON_and_XML_Conversion/#the-parker-convention
//! - https://developer.mozilla.org/en-US/docs/Archive/JXON#The_Parker_Convention
//!
//! The Parker convention is a simplified, lossy conversion that:
//! - Ignores attributes and mixed-content text
//! - Keeps namespaced tags verbatim in Clark notation
//! - Removes the document root element by default
//! - Uses element names as object keys

use serde_json::{Map, Value as JsonValue};
use tracing::instrument;

use super::base::{ConventionConfig, XmlData};
use super::coercion::{FromString, ToXmlString};
use super::grouping::group_siblings;
use super::Convention;
use crate::documents::Element;
use crate::error::Result;
use crate::limits::Limits;

/// Parker convention
///
/// A simplified convention that produces compact data but loses:
/// - All attribute information
/// - Namespace declarations
/// - Text of elements that have children
#[derive(Debug, Clone, Default)]
pub struct Parker {
    engine: XmlData,
    preserve_root: bool,
}

impl Parker {
    /// Create a new Parker convention
    pub fn new() -> Self {
        Self {
            engine: XmlData::new(ConventionConfig::new()),
            preserve_root: false,
        }
    }

    /// Keep the root element as the single top-level key when decoding
    pub fn with_preserve_root(mut self, preserve: bool) -> Self {
        self.preserve_root = preserve;
        self
    }

    /// Replace the XML string to scalar coercion
    pub fn with_from_string(mut self, from_string: FromString) -> Self {
        self.engine = self.engine.with_from_string(from_string);
        self
    }

    /// Replace the scalar to XML string coercion
    pub fn with_to_string(mut self, to_string: ToXmlString) -> Self {
        self.engine = self.engine.with_to_string(to_string);
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

    /// Whether decoding keeps the root element
    pub fn preserve_root(&self) -> bool {
        self.preserve_root
    }

    /// Decode, choosing per call whether the root element is kept
    #[instrument(level = "debug", skip_all, fields(root = %root.tag, preserve = preserve))]
    pub fn decode_with_root(&self, root: &Element, preserve: bool) -> Result<JsonValue> {
        let value = self.decode_element(root, 0)?;
        if !preserve {
            return Ok(value);
        }
        let mut wrapper = Map::new();
        wrapper.insert(root.tag.clone(), value);
        Ok(JsonValue::Object(wrapper))
    }

    fn decode_element(&self, element: &Element, depth: usize) -> Result<JsonValue> {
        self.config().limits().check_depth(depth)?;

        // Leaves are their (unstripped) text
        if element.children.is_empty() {
            return Ok(self.engine.coerce(element.text()));
        }

        let mut siblings = Vec::with_capacity(element.children.len());
        for child in element.children() {
            siblings.push((child.tag.clone(), self.decode_element(child, depth + 1)?));
        }
        Ok(JsonValue::Object(group_siblings(siblings)))
    }
}

impl Convention for Parker {
    fn name(&self) -> &'static str {
        "parker"
    }

    fn engine(&self) -> &XmlData {
        &self.engine
    }

    fn decode(&self, root: &Element) -> Result<JsonValue> {
        self.decode_with_root(root, self.preserve_root)
    }

    fn is_lossy(&self) -> bool {
        true
    }

    fn loses_xmlns(&self) -> bool {
        true
    }
}
