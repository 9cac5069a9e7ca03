//! Base convention configuration and the shared conversion engine
//!
//! Every convention is the same algorithm driven by a [`ConventionConfig`]:
//! where attributes go (`attr_prefix`), where text goes (`text_key`), where
//! namespace declarations go (`ns_key`) and whether text-only leaves
//! collapse to bare scalars (`simple_text`).

use serde_json::{Map, Value as JsonValue};
use tracing::{debug, instrument, trace};

use super::coercion::{is_scalar, kind_of, FromString, ToXmlString};
use super::grouping::{group_siblings, merge_into};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::namespaces::{declaration_prefix, NamespaceContext};
use crate::names::split_clark;

/// Immutable configuration of a convention
#[derive(Debug, Clone, Default)]
pub struct ConventionConfig {
    /// Prefix marking mapping keys that are XML attributes
    attr_prefix: Option<String>,
    /// Key holding element text next to attributes or children
    text_key: Option<String>,
    /// Key holding the namespace prefix to URI sub-mapping
    ns_key: Option<String>,
    /// Collapse text-only leaves to bare scalars
    simple_text: bool,
    /// XML string to scalar coercion
    from_string: FromString,
    /// Scalar to XML string coercion
    to_string: ToXmlString,
    /// Depth limits for the tree walk
    limits: Limits,
}

impl ConventionConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the attribute prefix
    pub fn attr_prefix(&self) -> Option<&str> {
        self.attr_prefix.as_deref()
    }

    /// Get the text key
    pub fn text_key(&self) -> Option<&str> {
        self.text_key.as_deref()
    }

    /// Get the namespace key
    pub fn ns_key(&self) -> Option<&str> {
        self.ns_key.as_deref()
    }

    /// Check if text-only leaves collapse to scalars
    pub fn simple_text(&self) -> bool {
        self.simple_text
    }

    /// Get the XML string to scalar coercion
    pub fn from_string(&self) -> FromString {
        self.from_string
    }

    /// Get the scalar to XML string coercion
    pub fn to_string(&self) -> ToXmlString {
        self.to_string
    }

    /// Get the limits
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Set attribute prefix
    pub fn with_attr_prefix(mut self, prefix: Option<String>) -> Self {
        self.attr_prefix = prefix;
        self
    }

    /// Set text key
    pub fn with_text_key(mut self, key: Option<String>) -> Self {
        self.text_key = key;
        self
    }

    /// Set namespace key
    pub fn with_ns_key(mut self, key: Option<String>) -> Self {
        self.ns_key = key;
        self
    }

    /// Set simple text collapsing
    pub fn with_simple_text(mut self, simple_text: bool) -> Self {
        self.simple_text = simple_text;
        self
    }

    /// Set XML string to scalar coercion
    pub fn with_from_string(mut self, from_string: FromString) -> Self {
        self.from_string = from_string;
        self
    }

    /// Set scalar to XML string coercion
    pub fn with_to_string(mut self, to_string: ToXmlString) -> Self {
        self.to_string = to_string;
        self
    }

    /// Set limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }
}

/// Where encoded elements go: a fresh list of siblings or an existing root
enum Target<'a> {
    Siblings(&'a mut Vec<Element>),
    Root(&'a mut Element),
}

impl Target<'_> {
    fn append(&mut self, element: Element) {
        match self {
            Target::Siblings(list) => list.push(element),
            Target::Root(root) => root.add_child(element),
        }
    }
}

/// The conversion engine shared by all conventions
#[derive(Debug, Clone, Default)]
pub struct XmlData {
    config: ConventionConfig,
}

impl XmlData {
    /// Create an engine for the given configuration
    pub fn new(config: ConventionConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &ConventionConfig {
        &self.config
    }

    /// Replace the XML string to scalar coercion
    pub fn with_from_string(mut self, from_string: FromString) -> Self {
        self.config = self.config.with_from_string(from_string);
        self
    }

    /// Replace the scalar to XML string coercion
    pub fn with_to_string(mut self, to_string: ToXmlString) -> Self {
        self.config = self.config.with_to_string(to_string);
        self
    }

    /// Replace the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.config = self.config.with_limits(limits);
        self
    }

    /// Coerce an XML string to a scalar
    pub fn coerce(&self, value: Option<&str>) -> JsonValue {
        self.config.from_string.apply(value)
    }

    /// Render a scalar as an XML string
    pub fn stringify(&self, value: &JsonValue) -> Result<String> {
        self.config.to_string.apply(value)
    }

    // ------------------------------------------------------------------
    // data -> XML
    // ------------------------------------------------------------------

    /// Convert a data tree into a list of new elements, one per top-level key
    #[instrument(level = "debug", skip_all)]
    pub fn encode(&self, data: &JsonValue) -> Result<Vec<Element>> {
        let mut elements = Vec::new();
        self.build(data, &mut Target::Siblings(&mut elements), 0)?;
        debug!(count = elements.len(), "encoded top-level elements");
        Ok(elements)
    }

    /// Convert a data tree into attributes, text and children of `root`
    #[instrument(level = "debug", skip_all, fields(root = %root.tag))]
    pub fn encode_into(&self, data: &JsonValue, root: &mut Element) -> Result<()> {
        self.build(data, &mut Target::Root(root), 0)
    }

    fn build(&self, data: &JsonValue, target: &mut Target<'_>, depth: usize) -> Result<()> {
        self.config.limits.check_depth(depth)?;

        match data {
            JsonValue::Object(map) => {
                for (key, value) in map {
                    self.build_entry(key, value, target, depth)?;
                }
                Ok(())
            }
            JsonValue::Array(_) => Err(Error::MalformedInput(
                "a list can only appear as the value of a mapping key".to_string(),
            )),
            scalar => {
                let text = self.stringify(scalar)?;
                match target {
                    Target::Root(root) if self.config.text_key.is_none() => {
                        set_text(root, text);
                    }
                    // A scalar with nowhere to go as text becomes a tag of its own
                    _ => target.append(Element::new(text)),
                }
                Ok(())
            }
        }
    }

    fn build_entry(
        &self,
        key: &str,
        value: &JsonValue,
        target: &mut Target<'_>,
        depth: usize,
    ) -> Result<()> {
        if let Target::Root(root) = target {
            if let Some(name) = self
                .config
                .attr_prefix()
                .and_then(|prefix| key.strip_prefix(prefix))
            {
                match value {
                    JsonValue::Object(declarations) => {
                        self.declare_namespaces(key, declarations, root)?
                    }
                    _ => {
                        let text = self.stringify(value)?;
                        root.set_attribute(name, text);
                    }
                }
                return Ok(());
            }

            if self.config.text_key() == Some(key) {
                let text = self.stringify(value)?;
                set_text(root, text);
                return Ok(());
            }

            // Without an attribute prefix, scalars next to a text key are attributes
            if self.config.attr_prefix.is_none()
                && self.config.text_key.is_some()
                && is_scalar(value)
            {
                let text = self.stringify(value)?;
                root.set_attribute(key, text);
                return Ok(());
            }
        }

        let items = match value {
            JsonValue::Array(items) => items.as_slice(),
            other => std::slice::from_ref(other),
        };

        for item in items {
            let mut element = Element::new(key);
            match item {
                JsonValue::Array(_) => {
                    return Err(Error::MalformedInput(format!(
                        "list under '{}' contains a nested list",
                        key
                    )))
                }
                JsonValue::Object(_) => {
                    self.build(item, &mut Target::Root(&mut element), depth + 1)?
                }
                scalar => {
                    let text = self.stringify(scalar)?;
                    set_text(&mut element, text);
                }
            }
            trace!(tag = key, "encoded child element");
            target.append(element);
        }
        Ok(())
    }

    fn declare_namespaces(
        &self,
        key: &str,
        declarations: &Map<String, JsonValue>,
        root: &mut Element,
    ) -> Result<()> {
        match self.config.ns_key() {
            Some(ns_key) if ns_key == key => {}
            Some(ns_key) => {
                return Err(Error::UnsupportedFeature(format!(
                    "attribute '{}' holds a mapping; only '{}' may hold namespace declarations",
                    key, ns_key
                )))
            }
            None => {
                return Err(Error::UnsupportedFeature(format!(
                    "attribute '{}' holds a mapping but this convention has no namespace support",
                    key
                )))
            }
        }

        for (prefix, uri) in declarations {
            if !is_scalar(uri) {
                return Err(Error::MalformedInput(format!(
                    "namespace '{}' must map to a URI, found {}",
                    prefix,
                    kind_of(uri)
                )));
            }
            let uri = self.stringify(uri)?;
            let is_default = prefix.is_empty() || self.config.text_key() == Some(prefix.as_str());
            let name = if is_default {
                "xmlns".to_string()
            } else {
                format!("xmlns:{}", prefix)
            };
            root.set_attribute(name, uri);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // XML -> data
    // ------------------------------------------------------------------

    /// Convert an element into a one-entry mapping `{tag: content}`
    #[instrument(level = "debug", skip_all, fields(root = %root.tag))]
    pub fn decode(&self, root: &Element) -> Result<JsonValue> {
        let mut scope = NamespaceContext::new();
        let (tag, content) = self.decode_element(root, &mut scope, 0)?;

        let mut wrapper = Map::new();
        wrapper.insert(tag, content);
        Ok(JsonValue::Object(wrapper))
    }

    fn decode_element(
        &self,
        element: &Element,
        scope: &mut NamespaceContext,
        depth: usize,
    ) -> Result<(String, JsonValue)> {
        self.config.limits.check_depth(depth)?;

        scope.push_scope();
        for (name, value) in element.attributes() {
            if let Some(prefix) = declaration_prefix(name) {
                scope.declare(prefix, value.as_str());
            }
        }
        let result = self.decode_content(element, scope, depth);
        scope.pop_scope();
        result
    }

    fn decode_content(
        &self,
        element: &Element,
        scope: &mut NamespaceContext,
        depth: usize,
    ) -> Result<(String, JsonValue)> {
        let tag = self.key_name(&element.tag, scope)?;
        let mut value = Map::new();

        for (name, raw) in element.attributes() {
            if let Some(prefix) = declaration_prefix(name) {
                if let Some(ns_key) = self.config.ns_key() {
                    let key = if prefix.is_empty() {
                        self.config.text_key().unwrap_or("$")
                    } else {
                        prefix
                    };
                    let group = value
                        .entry(ns_key)
                        .or_insert_with(|| JsonValue::Object(Map::new()));
                    if let JsonValue::Object(declarations) = group {
                        declarations.insert(key.to_string(), JsonValue::String(raw.clone()));
                    }
                }
                continue;
            }

            let name = self.key_name(name, scope)?;
            let key = match self.config.attr_prefix() {
                Some(prefix) => format!("{}{}", prefix, name),
                None => name,
            };
            value.insert(key, self.coerce(Some(raw)));
        }

        if let Some(text_key) = self.config.text_key() {
            let text = element.text().map(str::trim).unwrap_or_default();
            if !text.is_empty() {
                let scalar = self.coerce(Some(text));
                if self.config.simple_text
                    && element.children.is_empty()
                    && !has_attributes(element)
                {
                    return Ok((tag, scalar));
                }
                value.insert(text_key.to_string(), scalar);
            }
        }

        let mut siblings = Vec::with_capacity(element.children.len());
        for child in element.children() {
            siblings.push(self.decode_element(child, scope, depth + 1)?);
        }
        merge_into(&mut value, group_siblings(siblings));

        Ok((tag, JsonValue::Object(value)))
    }

    /// Data key for an element or attribute name.
    ///
    /// Prefixed names are only meaningful next to their declarations, so
    /// conventions that drop declarations keep Clark names verbatim.
    fn key_name(&self, name: &str, scope: &NamespaceContext) -> Result<String> {
        match self.config.ns_key() {
            Some(_) => display_name(name, scope),
            None => Ok(name.to_string()),
        }
    }
}

/// Rewrite a Clark-notation name as `prefix:local` using the declarations in scope
fn display_name(name: &str, scope: &NamespaceContext) -> Result<String> {
    scope.unresolve(name).ok_or_else(|| {
        let uri = split_clark(name).map(|(uri, _)| uri).unwrap_or(name);
        Error::UnsupportedFeature(format!(
            "namespace '{}' of '{}' is not declared on the element or its ancestors",
            uri, name
        ))
    })
}

/// Whether an element carries attributes other than namespace declarations
pub(crate) fn has_attributes(element: &Element) -> bool {
    element
        .attributes()
        .keys()
        .any(|name| declaration_prefix(name).is_none())
}

fn set_text(element: &mut Element, text: String) {
    element.text = if text.is_empty() { None } else { Some(text) };
}
