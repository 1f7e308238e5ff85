//! Source loaders for the peak merge.
//!
//! - SSR place names from GeoJSON ([`load_ssr`])
//! - N50 terrain points from a Kartverket GML archive ([`read_n50_archive`])
//!   or an already converted OSM file ([`load_n50`])
//! - existing OSM peaks bound to an [`peak_osm::OsmDocument`] ([`existing_peaks`])

#![deny(unsafe_code)]

pub mod elevation;
pub mod error;
pub mod n50_gml;
pub mod osm;
pub mod ssr;

pub use elevation::clean_elevation;
pub use error::{IngestError, Result};
pub use n50_gml::{load_n50_archive, parse_n50_gml, read_n50_archive};
pub use osm::{existing_peaks, load_n50, n50_records};
pub use ssr::{ELEVATION_GROUP, load_ssr, parse_ssr};
