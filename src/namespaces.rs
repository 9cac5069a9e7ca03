//! XML namespace handling
//!
//! Namespace support is best-effort. Parsed documents carry namespaced
//! names in Clark notation (`{uri}local`) while keeping the `xmlns`
//! declarations as ordinary attributes on the declaring element. A
//! [`NamespaceContext`] tracks those declarations while a tree is walked so
//! names can be resolved in either direction.

use crate::error::{Error, Result};
use crate::names::{split_clark, split_qname};
use crate::XML_NAMESPACE;
use indexmap::IndexMap;

/// Namespace URI
pub type NamespaceUri = String;

/// Namespace prefix (empty for the default namespace)
pub type Prefix = String;

/// Returns the declared prefix if `attr_name` is a namespace declaration.
///
/// `xmlns` declares the default namespace and yields `""`, `xmlns:p`
/// yields `p`. Anything else is an ordinary attribute.
pub fn declaration_prefix(attr_name: &str) -> Option<&str> {
    if attr_name == "xmlns" {
        Some("")
    } else {
        attr_name.strip_prefix("xmlns:")
    }
}

/// Scoped namespace context for resolving prefixes
#[derive(Debug, Clone, Default)]
pub struct NamespaceContext {
    scopes: Vec<IndexMap<Prefix, NamespaceUri>>,
}

impl NamespaceContext {
    /// Create a new empty namespace context
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new scope for an element
    pub fn push_scope(&mut self) {
        self.scopes.push(IndexMap::new());
    }

    /// Close the innermost scope
    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Declare a prefix in the innermost scope (`""` for the default namespace)
    pub fn declare(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        if self.scopes.is_empty() {
            self.push_scope();
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(prefix.into(), namespace.into());
        }
    }

    /// Get the namespace bound to a prefix, searching outwards
    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(XML_NAMESPACE);
        }
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(prefix))
            .map(|s| s.as_str())
            .filter(|uri| !uri.is_empty())
    }

    /// Get the default namespace in scope
    pub fn get_default_namespace(&self) -> Option<&str> {
        self.get_namespace("")
    }

    /// Find the nearest prefix bound to `uri` that is not shadowed
    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        if uri == XML_NAMESPACE {
            return Some("xml");
        }
        self.scopes.iter().rev().find_map(|scope| {
            scope
                .iter()
                .find(|(prefix, bound)| {
                    bound.as_str() == uri && self.get_namespace(prefix) == Some(uri)
                })
                .map(|(prefix, _)| prefix.as_str())
        })
    }

    /// Resolve an element name to Clark notation
    pub fn resolve_element(&self, name: &str) -> Result<String> {
        match split_qname(name) {
            (Some(prefix), local) => self.qualify(prefix, local),
            (None, local) => Ok(match self.get_default_namespace() {
                Some(uri) => format!("{{{}}}{}", uri, local),
                None => local.to_string(),
            }),
        }
    }

    /// Resolve an attribute name to Clark notation.
    ///
    /// Unprefixed attributes are never in the default namespace.
    pub fn resolve_attribute(&self, name: &str) -> Result<String> {
        match split_qname(name) {
            (Some(prefix), local) => self.qualify(prefix, local),
            (None, local) => Ok(local.to_string()),
        }
    }

    fn qualify(&self, prefix: &str, local: &str) -> Result<String> {
        let uri = self
            .get_namespace(prefix)
            .ok_or_else(|| Error::Namespace(format!("unbound prefix: {}", prefix)))?;
        Ok(format!("{{{}}}{}", uri, local))
    }

    /// Map a Clark-notation name back to `prefix:local` using this context.
    ///
    /// Names without a namespace are returned unchanged. Returns `None` when
    /// no declaration in scope binds the URI.
    pub fn unresolve(&self, name: &str) -> Option<String> {
        match split_clark(name) {
            None => Some(name.to_string()),
            Some((uri, local)) => match self.prefix_for(uri)? {
                "" => Some(local.to_string()),
                prefix => Some(format!("{}:{}", prefix, local)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_prefix() {
        assert_eq!(declaration_prefix("xmlns"), Some(""));
        assert_eq!(declaration_prefix("xmlns:svg"), Some("svg"));
        assert_eq!(declaration_prefix("xmlnsfoo"), None);
        assert_eq!(declaration_prefix("id"), None);
    }

    #[test]
    fn test_namespace_context() {
        let mut ctx = NamespaceContext::new();
        ctx.push_scope();
        ctx.declare("xs", "http://www.w3.org/2001/XMLSchema");
        ctx.declare("", "http://example.com");

        assert_eq!(
            ctx.get_namespace("xs"),
            Some("http://www.w3.org/2001/XMLSchema")
        );
        assert_eq!(ctx.get_default_namespace(), Some("http://example.com"));
        assert_eq!(ctx.get_namespace("xml"), Some(XML_NAMESPACE));
    }

    #[test]
    fn test_inner_scope_shadows_outer() {
        let mut ctx = NamespaceContext::new();
        ctx.push_scope();
        ctx.declare("a", "http://outer");
        ctx.push_scope();
        ctx.declare("a", "http://inner");

        assert_eq!(ctx.get_namespace("a"), Some("http://inner"));
        assert_eq!(ctx.prefix_for("http://outer"), None);

        ctx.pop_scope();
        assert_eq!(ctx.get_namespace("a"), Some("http://outer"));
        assert_eq!(ctx.prefix_for("http://outer"), Some("a"));
    }

    #[test]
    fn test_resolve_and_unresolve() {
        let mut ctx = NamespaceContext::new();
        ctx.push_scope();
        ctx.declare("ding", "http://zanstra.com/ding");

        let clark = ctx.resolve_element("ding:dong").unwrap();
        assert_eq!(clark, "{http://zanstra.com/ding}dong");
        assert_eq!(ctx.unresolve(&clark).as_deref(), Some("ding:dong"));
        assert_eq!(ctx.resolve_element("plain").unwrap(), "plain");
        assert!(matches!(
            ctx.resolve_element("nope:dong"),
            Err(Error::Namespace(_))
        ));
    }

    #[test]
    fn test_default_namespace_applies_to_elements_only() {
        let mut ctx = NamespaceContext::new();
        ctx.push_scope();
        ctx.declare("", "http://default");

        assert_eq!(ctx.resolve_element("item").unwrap(), "{http://default}item");
        assert_eq!(ctx.resolve_attribute("id").unwrap(), "id");
        assert_eq!(ctx.unresolve("{http://default}item").as_deref(), Some("item"));
    }

    #[test]
    fn test_undeclared_default_namespace() {
        let mut ctx = NamespaceContext::new();
        ctx.push_scope();
        ctx.declare("", "http://default");
        ctx.push_scope();
        ctx.declare("", "");

        assert_eq!(ctx.get_default_namespace(), None);
        assert_eq!(ctx.resolve_element("item").unwrap(), "item");
        assert_eq!(ctx.unresolve("{http://unknown}item"), None);
    }
}
