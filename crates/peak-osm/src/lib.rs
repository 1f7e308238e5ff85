//! OpenStreetMap XML documents for the peak merge.
//!
//! [`OsmDocument`] keeps every element it reads, implements
//! [`peak_model::MapDocument`] for the engine, and writes the result back as
//! OSM XML ready for review in an editor.

#![deny(unsafe_code)]

pub mod document;
pub mod element;
pub mod error;

pub use document::{FIRST_NEW_NODE_ID, OsmDocument};
pub use element::OsmElement;
pub use error::{OsmError, Result};

/// Value written to the root `generator` attribute.
pub const GENERATOR: &str = "peak2osm";
