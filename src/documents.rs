//! XML document handling
//!
//! This module provides the element tree the conversion engine works on,
//! together with a `quick-xml` based parser and serializer.
//!
//! The tree follows the ElementTree model: an element's `text` is the
//! character data before its first child node, and only element children
//! are kept. Namespaced names are stored in Clark notation (`{uri}local`)
//! and `xmlns` declarations stay on the declaring element as attributes.

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::names::{local_name, split_clark, split_qname, validate_qname};
use crate::namespaces::{declaration_prefix, NamespaceContext};
use indexmap::IndexMap;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::path::Path;
use tracing::{debug, instrument, trace};

/// XML Element in the document tree
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Element tag name
    pub tag: String,
    /// Element attributes, in document order
    pub attributes: IndexMap<String, String>,
    /// Text content before the first child (if any)
    pub text: Option<String>,
    /// Child elements
    pub children: Vec<Element>,
}

impl Element {
    /// Create a new element
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Get the tag name
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Get the local name of the element
    pub fn local_name(&self) -> &str {
        local_name(&self.tag)
    }

    /// Get the namespace URI of a Clark-notation tag
    pub fn namespace(&self) -> Option<&str> {
        split_clark(&self.tag).map(|(uri, _)| uri)
    }

    /// Get the prefix of a `prefix:local` tag
    pub fn prefix(&self) -> Option<&str> {
        if split_clark(&self.tag).is_some() {
            return None;
        }
        split_qname(&self.tag).0
    }

    /// Get the text content
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Get the attributes
    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    /// Get the child elements
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Get an attribute value by name
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Set an attribute, keeping the position of an existing one
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Set text content
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    /// Add a child element
    pub fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Add an attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Set text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    /// Add a child element
    pub fn with_child(mut self, child: Element) -> Self {
        self.add_child(child);
        self
    }

    /// Serialize this element (and its subtree) without indentation
    pub fn to_xml_string(&self) -> Result<String> {
        write_element(self, None)
    }
}

/// XML Document representation
#[derive(Debug, Default)]
pub struct Document {
    /// Root element of the document
    pub root: Option<Element>,
}

struct OpenElement {
    element: Element,
    // set once any child node (element, comment, PI) has been seen
    text_closed: bool,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an XML document from a string
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse(xml.as_bytes())
    }

    /// Read and parse an XML document from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading XML document");
        let bytes = std::fs::read(path)?;
        Self::parse(&bytes)
    }

    /// Parse an XML document from bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        Self::parse_with_limits(xml, &Limits::default())
    }

    /// Parse an XML document from bytes, enforcing the given limits
    #[instrument(level = "debug", skip(xml), fields(size = xml.len()))]
    pub fn parse_with_limits(xml: &[u8], limits: &Limits) -> Result<Self> {
        limits.check_xml_size(xml.len())?;

        let mut reader = Reader::from_reader(xml);
        reader.trim_text(false);

        let mut doc = Document::new();
        let mut stack: Vec<OpenElement> = Vec::new();
        let mut scope = NamespaceContext::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    limits.check_depth(stack.len())?;
                    Self::close_text(&mut stack);
                    scope.push_scope();
                    let element = Self::parse_element(&e, &mut scope)?;
                    stack.push(OpenElement {
                        element,
                        text_closed: false,
                    });
                }
                Ok(Event::End(_)) => {
                    scope.pop_scope();
                    if let Some(open) = stack.pop() {
                        Self::attach(&mut doc, &mut stack, open.element)?;
                    }
                }
                Ok(Event::Empty(e)) => {
                    limits.check_depth(stack.len())?;
                    Self::close_text(&mut stack);
                    scope.push_scope();
                    let element = Self::parse_element(&e, &mut scope);
                    scope.pop_scope();
                    Self::attach(&mut doc, &mut stack, element?)?;
                }
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|e| Error::Xml(format!("failed to unescape text: {}", e)))?;
                    Self::append_text(&mut stack, &text);
                }
                Ok(Event::CData(e)) => {
                    let text = String::from_utf8_lossy(&e);
                    Self::append_text(&mut stack, &text);
                }
                Ok(Event::Comment(_)) | Ok(Event::PI(_)) => Self::close_text(&mut stack),
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!(
                        "error parsing XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {} // declarations and doctypes carry nothing for the tree
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(Error::Xml(format!(
                "unexpected end of document: element '{}' is not closed",
                open.element.tag
            )));
        }

        Ok(doc)
    }

    /// Parse element from BytesStart event, declaring its namespaces in `scope`
    fn parse_element(start: &BytesStart<'_>, scope: &mut NamespaceContext) -> Result<Element> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| Error::Xml(format!("invalid element name: {}", e)))?
            .to_string();

        let mut raw_attributes = Vec::new();
        for attr_result in start.attributes() {
            let attr =
                attr_result.map_err(|e| Error::Xml(format!("failed to parse attribute: {}", e)))?;

            let attr_name = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| Error::Xml(format!("invalid attribute name: {}", e)))?
                .to_string();

            let attr_value = attr
                .unescape_value()
                .map_err(|e| Error::Xml(format!("failed to unescape attribute value: {}", e)))?
                .to_string();

            if let Some(prefix) = declaration_prefix(&attr_name) {
                scope.declare(prefix, attr_value.as_str());
            }
            raw_attributes.push((attr_name, attr_value));
        }

        // Names are resolved only after every declaration on this element is known
        let mut element = Element::new(scope.resolve_element(&name)?);
        for (attr_name, attr_value) in raw_attributes {
            let key = if declaration_prefix(&attr_name).is_some() {
                attr_name
            } else {
                scope.resolve_attribute(&attr_name)?
            };
            element.attributes.insert(key, attr_value);
        }

        trace!(tag = %element.tag, "parsed element");
        Ok(element)
    }

    fn attach(doc: &mut Document, stack: &mut [OpenElement], element: Element) -> Result<()> {
        if let Some(parent) = stack.last_mut() {
            parent.element.add_child(element);
        } else if doc.root.is_some() {
            return Err(Error::Xml(format!(
                "document has more than one root element ('{}')",
                element.tag
            )));
        } else {
            doc.root = Some(element);
        }
        Ok(())
    }

    fn close_text(stack: &mut [OpenElement]) {
        if let Some(parent) = stack.last_mut() {
            parent.text_closed = true;
        }
    }

    fn append_text(stack: &mut [OpenElement], text: &str) {
        // Text outside the root and tail text after a child are not kept
        if let Some(current) = stack.last_mut().filter(|open| !open.text_closed) {
            current
                .element
                .text
                .get_or_insert_with(String::new)
                .push_str(text);
        }
    }

    /// Get the root element
    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }
}

/// Serialize an element tree to an XML string.
///
/// With `indent` set, nested elements are written on their own lines using
/// that many spaces per level. Clark-notation names are written with the
/// prefix declared in scope; URIs with no declaration get a generated
/// `ns0`, `ns1`, ... prefix declared on the element that needs it.
pub fn write_element(element: &Element, indent: Option<usize>) -> Result<String> {
    let mut writer = match indent {
        Some(width) => Writer::new_with_indent(Vec::new(), b' ', width),
        None => Writer::new(Vec::new()),
    };
    let mut scope = NamespaceContext::new();
    let mut generated = 0;
    write_node(&mut writer, element, &mut scope, &mut generated)?;
    String::from_utf8(writer.into_inner()).map_err(Error::xml)
}

fn write_node(
    writer: &mut Writer<Vec<u8>>,
    element: &Element,
    scope: &mut NamespaceContext,
    generated: &mut usize,
) -> Result<()> {
    scope.push_scope();
    for (name, value) in element.attributes() {
        if let Some(prefix) = declaration_prefix(name) {
            scope.declare(prefix, value.as_str());
        }
    }

    let mut extra_declarations = Vec::new();
    let tag = qualify_name(&element.tag, false, scope, &mut extra_declarations, generated);
    validate_qname(&tag)?;

    let mut start = BytesStart::new(tag.as_str());
    let mut attributes = Vec::with_capacity(element.attributes.len());
    for (name, value) in element.attributes() {
        let name = if declaration_prefix(name).is_some() {
            name.clone()
        } else {
            qualify_name(name, true, scope, &mut extra_declarations, generated)
        };
        validate_qname(&name)?;
        attributes.push((name, value.as_str()));
    }
    for (name, value) in &attributes {
        start.push_attribute((name.as_str(), *value));
    }
    for (name, uri) in &extra_declarations {
        start.push_attribute((name.as_str(), uri.as_str()));
    }

    let text = element.text().filter(|t| !t.is_empty());
    if element.children.is_empty() && text.is_none() {
        writer.write_event(Event::Empty(start)).map_err(Error::xml)?;
    } else {
        writer.write_event(Event::Start(start)).map_err(Error::xml)?;
        if let Some(text) = text {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(Error::xml)?;
        }
        for child in &element.children {
            write_node(writer, child, scope, generated)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(tag.as_str())))
            .map_err(Error::xml)?;
    }

    scope.pop_scope();
    Ok(())
}

fn qualify_name(
    name: &str,
    is_attribute: bool,
    scope: &mut NamespaceContext,
    extra_declarations: &mut Vec<(String, String)>,
    generated: &mut usize,
) -> String {
    let Some((uri, local)) = split_clark(name) else {
        return name.to_string();
    };
    match scope.prefix_for(uri).map(str::to_string) {
        Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, local),
        Some(_) if !is_attribute => local.to_string(),
        _ => {
            let mut prefix = format!("ns{}", generated);
            while scope.get_namespace(&prefix).is_some() {
                *generated += 1;
                prefix = format!("ns{}", generated);
            }
            *generated += 1;
            scope.declare(prefix.as_str(), uri);
            extra_declarations.push((format!("xmlns:{}", prefix), uri.to_string()));
            format!("{}:{}", prefix, local)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_creation() {
        let doc = Document::new();
        assert!(doc.root.is_none());
    }

    #[test]
    fn test_parse_simple_xml() {
        let xml = r#"<root><child>text</child></root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root.unwrap();
        assert_eq!(root.tag(), "root");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].tag(), "child");
        assert_eq!(root.children[0].text(), Some("text"));
    }

    #[test]
    fn test_parse_keeps_attribute_order() {
        let xml = r#"<root z="1" a="2" m="3"/>"#;
        let root = Document::from_string(xml).unwrap().root.unwrap();
        let names: Vec<&str> = root.attributes().keys().map(|k| k.as_str()).collect();
        assert_eq!(names, ["z", "a", "m"]);
        assert_eq!(root.get_attribute("a"), Some("2"));
    }

    #[test]
    fn test_text_stops_at_first_child_node() {
        let xml = r#"<root>before<!--note-->after<child/>tail</root>"#;
        let root = Document::from_string(xml).unwrap().root.unwrap();
        assert_eq!(root.text(), Some("before"));
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn test_text_is_unescaped_and_untrimmed() {
        let xml = "<root>Quote: &quot; New-line:\n</root>";
        let root = Document::from_string(xml).unwrap().root.unwrap();
        assert_eq!(root.text(), Some("Quote: \" New-line:\n"));
    }

    #[test]
    fn test_cdata_joins_text() {
        let xml = "<root>a<![CDATA[<b>]]>c</root>";
        let root = Document::from_string(xml).unwrap().root.unwrap();
        assert_eq!(root.text(), Some("a<b>c"));
    }

    #[test]
    fn test_parse_with_namespaces() {
        let xml = r#"<root xmlns="http://example.com" xmlns:x="http://x"><x:item x:id="1"/></root>"#;
        let root = Document::from_string(xml).unwrap().root.unwrap();

        assert_eq!(root.tag(), "{http://example.com}root");
        assert_eq!(root.namespace(), Some("http://example.com"));
        assert_eq!(root.local_name(), "root");
        assert_eq!(root.get_attribute("xmlns"), Some("http://example.com"));
        assert_eq!(root.get_attribute("xmlns:x"), Some("http://x"));

        let item = &root.children[0];
        assert_eq!(item.tag(), "{http://x}item");
        assert_eq!(item.get_attribute("{http://x}id"), Some("1"));
    }

    #[test]
    fn test_unbound_prefix_is_an_error() {
        let result = Document::from_string("<a:root/>");
        assert!(matches!(result, Err(Error::Namespace(_))));
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(
            Document::from_string("<root><a></b></root>"),
            Err(Error::Xml(_))
        ));
        assert!(matches!(
            Document::from_string("<root>"),
            Err(Error::Xml(_))
        ));
    }

    #[test]
    fn test_depth_limit() {
        let limits = Limits::new().with_max_depth(2);
        let result = Document::parse_with_limits(b"<a><b><c><d/></c></b></a>", &limits);
        assert!(matches!(result, Err(Error::LimitExceeded(_))));
    }

    #[test]
    fn test_write_element() {
        let element = Element::new("div")
            .with_attribute("id", "2")
            .with_text("parent-text")
            .with_child(Element::new("p").with_text("a < b"))
            .with_child(Element::new("hr"));

        assert_eq!(
            element.to_xml_string().unwrap(),
            r#"<div id="2">parent-text<p>a &lt; b</p><hr/></div>"#
        );
    }

    #[test]
    fn test_write_indented() {
        let element = Element::new("a").with_child(Element::new("b").with_text("1"));
        let xml = write_element(&element, Some(2)).unwrap();
        assert_eq!(xml, "<a>\n  <b>1</b>\n</a>");
    }

    #[test]
    fn test_write_restores_prefixes() {
        let xml = r#"<root xmlns:ding="http://zanstra.com/ding"><ding:dong>binnen</ding:dong></root>"#;
        let root = Document::from_string(xml).unwrap().root.unwrap();
        assert_eq!(root.to_xml_string().unwrap(), xml);
    }

    #[test]
    fn test_write_generates_missing_prefixes() {
        let element = Element::new("root").with_child(Element::new("{http://zanstra.com/ding}dong"));
        assert_eq!(
            element.to_xml_string().unwrap(),
            r#"<root><ns0:dong xmlns:ns0="http://zanstra.com/ding"/></root>"#
        );
    }

    #[test]
    fn test_write_rejects_invalid_names() {
        let element = Element::new("x").with_child(Element::new("@x"));
        assert!(matches!(element.to_xml_string(), Err(Error::Name(_))));
    }
}
