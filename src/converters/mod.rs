//! XML ↔ data conventions
//!
//! This module provides the conventions for transforming XML element trees
//! into JSON-like data trees and back.
//!
//! Supported conventions:
//! - BadgerFish: http://www.sklar.com/badgerfish/
//! - GData: http://wiki.open311.org/JSON_and_XML_Conversion/#the-gdata-convention
//! - Parker: http://wiki.open311.org/JSON_and_XML_Conversion/#the-parker-convention
//! - Yahoo: https://developer.yahoo.com/javascript/json.html#xml
//! - Abdera: http://wiki.open311.org/JSON_and_XML_Conversion/#the-abdera-convention
//! - Cobra: https://github.com/datacenter/cobra (XML → data only)
//!
//! All of them are presets of one engine, [`XmlData`], configured by a
//! [`ConventionConfig`].

mod abdera;
mod badgerfish;
mod base;
pub mod coercion;
mod cobra;
mod gdata;
pub mod grouping;
mod parker;
mod yahoo;

pub use abdera::Abdera;
pub use badgerfish::BadgerFish;
pub use base::{ConventionConfig, XmlData};
pub use cobra::Cobra;
pub use coercion::{FromString, ToXmlString};
pub use gdata::GData;
pub use parker::Parker;
pub use yahoo::Yahoo;

use crate::documents::Element;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

/// A node of the data tree: null, boolean, number, string, list or ordered mapping
pub type DataNode = JsonValue;

/// Trait implemented by every convention preset
pub trait Convention: Send + Sync {
    /// Short lowercase name of the convention
    fn name(&self) -> &'static str;

    /// The engine configured for this convention
    fn engine(&self) -> &XmlData;

    /// Convert a data tree into a list of new elements
    fn encode(&self, data: &DataNode) -> Result<Vec<Element>> {
        self.engine().encode(data)
    }

    /// Convert a data tree into the attributes, text and children of `root`
    fn encode_into(&self, data: &DataNode, root: &mut Element) -> Result<()> {
        self.engine().encode_into(data, root)
    }

    /// Convert an element into a data tree
    fn decode(&self, root: &Element) -> Result<DataNode> {
        self.engine().decode(root)
    }

    /// Returns true if the convention may lose information during conversion
    fn is_lossy(&self) -> bool;

    /// Returns true if namespace declarations are lost during conversion
    fn loses_xmlns(&self) -> bool;

    /// Returns true if the convention can perform lossless round-trips
    fn is_lossless(&self) -> bool {
        !self.is_lossy() && !self.loses_xmlns()
    }
}

/// Convention type enumeration for selecting a conversion strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConventionType {
    /// BadgerFish (`@` attributes, `$` text, `@xmlns` namespaces)
    BadgerFish,
    /// GData (`$t` text, scalars as attributes)
    GData,
    /// Parker (text and children only, lossy)
    #[default]
    Parker,
    /// Yahoo (`content` text, collapsed leaves, raw strings)
    Yahoo,
    /// Abdera (`attributes` / `children` layout)
    Abdera,
    /// Cobra (Abdera layout with sorted raw attributes)
    Cobra,
}

impl ConventionType {
    /// Every convention, in display order
    pub const ALL: [ConventionType; 6] = [
        Self::Abdera,
        Self::BadgerFish,
        Self::Cobra,
        Self::GData,
        Self::Parker,
        Self::Yahoo,
    ];

    /// Lowercase name used on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadgerFish => "badgerfish",
            Self::GData => "gdata",
            Self::Parker => "parker",
            Self::Yahoo => "yahoo",
            Self::Abdera => "abdera",
            Self::Cobra => "cobra",
        }
    }
}

impl fmt::Display for ConventionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConventionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| Error::UnknownConvention(s.to_string()))
    }
}

/// Create a convention by type
pub fn create_convention(kind: ConventionType) -> Box<dyn Convention> {
    match kind {
        ConventionType::BadgerFish => Box::new(BadgerFish::new()),
        ConventionType::GData => Box::new(GData::new()),
        ConventionType::Parker => Box::new(Parker::new()),
        ConventionType::Yahoo => Box::new(Yahoo::new()),
        ConventionType::Abdera => Box::new(Abdera::new()),
        ConventionType::Cobra => Box::new(Cobra::new()),
    }
}
