//! Yahoo Convention
//!
//! References:
//! - https://developer.yahoo.com/javascript/json.html#xml
//!
//! Like GData, but text is stored under "content", text-only leaves
//! collapse to a bare string and values are not type-coerced.

use super::base::{ConventionConfig, XmlData};
use super::coercion::{FromString, ToXmlString};
use super::Convention;
use crate::limits::Limits;

/// Yahoo convention
#[derive(Debug, Clone)]
pub struct Yahoo {
    engine: XmlData,
}

impl Default for Yahoo {
    fn default() -> Self {
        Self::new()
    }
}

impl Yahoo {
    /// Create a new Yahoo convention
    pub fn new() -> Self {
        let config = ConventionConfig::new()
            .with_text_key(Some("content".to_string()))
            .with_simple_text(true)
            .with_from_string(FromString::Raw);

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

impl Convention for Yahoo {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    fn engine(&self) -> &XmlData {
        &self.engine
    }

    fn is_lossy(&self) -> bool {
        true
    }

    fn loses_xmlns(&self) -> bool {
        true
    }
}
