//! Error types for source loading.

use std::path::PathBuf;

use peak_osm::OsmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// Failed to read a source file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// SSR file is not a GeoJSON feature collection.
    #[error("failed to parse GeoJSON {path}: {source}")]
    GeoJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// N50 download is not a readable zip archive, or lacks the entry.
    #[error("N50 archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("failed to read archive entry {entry}: {source}")]
    ArchiveEntry {
        entry: String,
        #[source]
        source: std::io::Error,
    },

    #[error("N50 GML: {0}")]
    Gml(#[from] quick_xml::Error),

    #[error(transparent)]
    Osm(#[from] OsmError),
}

pub type Result<T> = std::result::Result<T, IngestError>;
