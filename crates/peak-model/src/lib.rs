//! Shared data model for peak reconciliation.
//!
//! Records from the three sources (SSR place names, N50 terrain points and
//! existing OpenStreetMap peaks) are all represented as [`PeakRecord`]s.
//! Map records additionally carry an [`ExternalHandle`] into the map document,
//! which is mutated through the [`MapDocument`] trait.

#![deny(unsafe_code)]

pub mod error;
pub mod geo;
pub mod handle;
pub mod record;
pub mod tags;

pub use error::{ModelError, Result};
pub use geo::{
    EARTH_RADIUS_M, Point, SEARCH_BOX_RADIUS_M, SearchBox, coordinate_offset, create_search_box,
    distance,
};
pub use handle::{ExternalHandle, MapDocument, MaterializedPeak};
pub use record::{Origin, PeakRecord, RecordId};
pub use tags::{Elevation, Tags, keys, values};
