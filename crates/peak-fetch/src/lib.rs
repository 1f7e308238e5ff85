//! Network collaborators of peakmerge.
//!
//! Resolves a municipality against the GeoNorge municipality register,
//! downloads its N50 map data from Kartverket and the peaks already mapped
//! inside it from Overpass.

mod client;
mod error;
mod municipality;
mod overpass;

pub use client::{FetchClient, GEONORGE_API_URL, N50_DOWNLOAD_URL};
pub use error::{FetchError, Result};
pub use municipality::{
    Municipality, MunicipalityQuery, MunicipalityRecord, SearchResponse, resolve_search,
};
pub use overpass::{OVERPASS_API_URL, overpass_query};
