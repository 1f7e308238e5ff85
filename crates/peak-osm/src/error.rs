use std::path::PathBuf;

use quick_xml::events::attributes::AttrError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OsmError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid attribute: {0}")]
    Attribute(#[from] AttrError),

    #[error("no node id left below {lowest}")]
    IdsExhausted { lowest: i64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("expected an <osm> root element, found <{found}>")]
    NotOsm { found: String },

    #[error("malformed OSM XML: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, OsmError>;
