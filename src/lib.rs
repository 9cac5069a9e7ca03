//! # xmljson
//!
//! Convert between XML element trees and JSON-like data trees.
//!
//! Several well-known conventions decide where attributes, text content and
//! repeated siblings land in the data tree:
//!
//! - BadgerFish: `@` attributes, `$` text, `@xmlns` namespaces
//! - GData: plain attributes, `$t` text
//! - Parker: children only, root absorbed
//! - Yahoo: plain attributes, `content` text, raw strings
//! - Abdera / Cobra: `attributes` and `children` layout (XML → data only)
//!
//! All conventions are presets of one engine,
//! [`converters::XmlData`], driven by a [`converters::ConventionConfig`].
//!
//! ## Example
//!
//! ```rust
//! use xmljson::converters::{BadgerFish, Convention};
//! use xmljson::documents::Document;
//!
//! let doc = Document::from_string(r#"<p id="1">text</p>"#)?;
//! let root = doc.root().expect("document has a root");
//!
//! let data = BadgerFish::new().decode(root)?;
//! assert_eq!(data, serde_json::json!({"p": {"@id": 1, "$": "text"}}));
//!
//! let elements = BadgerFish::new().encode(&data)?;
//! assert_eq!(elements[0].to_xml_string()?, r#"<p id="1">text</p>"#);
//! # Ok::<(), xmljson::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// XML names, namespaces and the element tree
pub mod names;
pub mod namespaces;
pub mod documents;

// Data conversion
pub mod converters;

// Re-exports for convenience
pub use converters::{
    create_convention, Abdera, BadgerFish, Cobra, Convention, ConventionConfig, ConventionType,
    DataNode, GData, Parker, XmlData, Yahoo,
};
pub use documents::{Document, Element};
pub use error::{Error, Result};
pub use limits::Limits;

/// Version of the xmljson library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XML namespace
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// XMLNS namespace
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";
