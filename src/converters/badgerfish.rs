//! BadgerFish Convention
//!
//! References:
//! - http://www.sklar.com/badgerfish/
//! - https://developer.mozilla.org/en-US/docs/Archive/JXON
//!
//! The BadgerFish convention preserves most of the XML structure:
//! - Element text is in the "$" key
//! - Attributes are prefixed with "@"
//! - Namespace declarations are in "@xmlns"
//! - Repeated siblings become lists

use super::base::{ConventionConfig, XmlData};
use super::coercion::{FromString, ToXmlString};
use super::Convention;
use crate::limits::Limits;

/// BadgerFish convention
///
/// Keeps attributes (prefixed with `@`), text (under `$`) and namespace
/// declarations (under `@xmlns`).
#[derive(Debug, Clone)]
pub struct BadgerFish {
    engine: XmlData,
}

impl Default for BadgerFish {
    fn default() -> Self {
        Self::new()
    }
}

impl BadgerFish {
    /// Create a new BadgerFish convention
    pub fn new() -> Self {
        let config = ConventionConfig::new()
            .with_attr_prefix(Some("@".to_string()))
            .with_text_key(Some("$".to_string()))
            .with_ns_key(Some("@xmlns".to_string()));

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

impl Convention for BadgerFish {
    fn name(&self) -> &'static str {
        "badgerfish"
    }

    fn engine(&self) -> &XmlData {
        &self.engine
    }

    fn is_lossy(&self) -> bool {
        false
    }

    fn loses_xmlns(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::{Document, Element};
    use crate::error::Error;
    use serde_json::{json, Value as JsonValue};

    fn decode(xml: &str) -> JsonValue {
        let root = Document::from_string(xml).unwrap().root.unwrap();
        BadgerFish::new().decode(&root).unwrap()
    }

    fn encode(data: JsonValue) -> Vec<String> {
        BadgerFish::new()
            .encode(&data)
            .unwrap()
            .iter()
            .map(|e| e.to_xml_string().unwrap())
            .collect()
    }

    #[test]
    fn test_badgerfish_config() {
        let convention = BadgerFish::new();
        assert_eq!(convention.config().attr_prefix(), Some("@"));
        assert_eq!(convention.config().text_key(), Some("$"));
        assert_eq!(convention.config().ns_key(), Some("@xmlns"));
        assert!(!convention.config().simple_text());
    }

    #[test]
    fn test_badgerfish_decode_attributes() {
        assert_eq!(decode(r#"<x x="1"/>"#), json!({"x": {"@x": 1}}));
        assert_eq!(
            decode(r#"<div id="2">parent-text<p>text</p></div>"#),
            json!({"div": {"@id": 2, "$": "parent-text", "p": {"$": "text"}}})
        );
        assert_eq!(
            decode(r#"<alice charlie="david">bob</alice>"#),
            json!({"alice": {"@charlie": "david", "$": "bob"}})
        );
    }

    #[test]
    fn test_badgerfish_decode_siblings() {
        assert_eq!(
            decode("<alice><bob>charlie</bob></alice>"),
            json!({"alice": {"bob": {"$": "charlie"}}})
        );
        assert_eq!(
            decode("<alice><bob>charlie</bob><bob>david</bob></alice>"),
            json!({"alice": {"bob": [{"$": "charlie"}, {"$": "david"}]}})
        );
    }

    #[test]
    fn test_badgerfish_decode_keeps_child_order() {
        let data = decode("<root><a/><x/><b/><y/><c/><z/></root>");
        let keys: Vec<&str> = data["root"]
            .as_object()
            .unwrap()
            .keys()
            .map(|k| k.as_str())
            .collect();
        assert_eq!(keys, ["a", "x", "b", "y", "c", "z"]);
    }

    #[test]
    fn test_badgerfish_encode() {
        assert_eq!(encode(json!({"animal": {}})), ["<animal/>"]);
        assert_eq!(encode(json!({"animal": "Deka"})), ["<animal>Deka</animal>"]);
        assert_eq!(
            encode(json!({"animal": {"@name": "Deka", "$": "is my cat"}})),
            [r#"<animal name="Deka">is my cat</animal>"#]
        );
        assert_eq!(
            encode(json!({"animal": {"$": " in my house ", "dog": "Charlie"}})),
            ["<animal> in my house <dog>Charlie</dog></animal>"]
        );
        assert_eq!(
            encode(json!({"x": {"@x": 1}, "y": "z"})),
            [r#"<x x="1"/>"#, "<y>z</y>"]
        );
    }

    #[test]
    fn test_badgerfish_encode_edge_cases() {
        assert_eq!(encode(json!("x")), ["<x/>"]);
        assert!(encode(json!({})).is_empty());
        assert_eq!(
            encode(json!({"alice": {"bob": [{"$": "charlie"}]}})),
            ["<alice><bob>charlie</bob></alice>"]
        );
    }

    #[test]
    fn test_badgerfish_custom_root() {
        let mut root = Element::new("html");
        BadgerFish::new()
            .encode_into(&json!({"p": {"$": 1}}), &mut root)
            .unwrap();
        assert_eq!(root.to_xml_string().unwrap(), "<html><p>1</p></html>");
    }

    #[test]
    fn test_badgerfish_string_coercion_overrides() {
        let root = Element::new("x").with_text("true");
        let raw = BadgerFish::new().with_from_string(FromString::Raw);
        assert_eq!(raw.decode(&root).unwrap(), json!({"x": {"$": "true"}}));

        fn capitalized_bools(value: &JsonValue) -> String {
            match value {
                JsonValue::Bool(true) => "True".to_string(),
                JsonValue::Bool(false) => "False".to_string(),
                other => crate::converters::coercion::to_string(other).unwrap_or_default(),
            }
        }
        let custom = BadgerFish::new().with_to_string(ToXmlString::Custom(capitalized_bools));
        let elements = custom.encode(&json!({"x": {"$": false}})).unwrap();
        assert_eq!(elements[0].to_xml_string().unwrap(), "<x>False</x>");
    }

    #[test]
    fn test_badgerfish_style_attribute_mapping_is_unsupported() {
        let result = BadgerFish::new().encode(&json!({"alice": {"@style": {"color": "red"}}}));
        assert!(matches!(result, Err(Error::UnsupportedFeature(_))));
    }
}
