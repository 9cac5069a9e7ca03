//! GData Convention
//!
//! References:
//! - http://wiki.open311.org/JSON_and_XML_Conversion/#the-gdata-convention
//!
//! Attributes map to plain keys, element text goes under "$t". On the way
//! back to XML, scalar values next to "$t" become attributes.

use super::base::{ConventionConfig, XmlData};
use super::coercion::{FromString, ToXmlString};
use super::Convention;
use crate::limits::Limits;

/// GData convention
#[derive(Debug, Clone)]
pub struct GData {
    engine: XmlData,
}

impl Default for GData {
    fn default() -> Self {
        Self::new()
    }
}

impl GData {
    /// Create a new GData convention
    pub fn new() -> Self {
        let config = ConventionConfig::new().with_text_key(Some("$t".to_string()));

        Self {
            engine: XmlData::new(config),
        }
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
}

impl Convention for GData {
    fn name(&self) -> &'static str {
        "gdata"
    }

    fn engine(&self) -> &XmlData {
        &self.engine
    }

    fn is_lossy(&self) -> bool {
        false
    }

    fn loses_xmlns(&self) -> bool {
        true
    }
}
