//! CSV export of records that carry a review stamp.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use peak_match::PeakSets;
use peak_model::{PeakRecord, keys};
use peak_osm::OsmDocument;

/// One record needing a human look.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewRow {
    pub origin: &'static str,
    /// Position in the source set.
    pub index: usize,
    /// Node id, for records that came from the map.
    pub osm_id: Option<i64>,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub check: String,
    pub duplicate: String,
    pub close: String,
}

/// Rows for every record stamped `CHECK`, `DUPLICATE` or `CLOSE`, in
/// SSR, N50, OSM order.
pub fn review_rows(sets: &PeakSets, document: &OsmDocument) -> Vec<ReviewRow> {
    sets.iter()
        .filter(|(_, record)| needs_review(record))
        .map(|(id, record)| ReviewRow {
            origin: record.origin.label(),
            index: id.index,
            osm_id: record
                .handle
                .and_then(|handle| document.element(handle))
                .and_then(|element| element.id()),
            name: record.name().unwrap_or_default().to_string(),
            lat: record.location.lat,
            lon: record.location.lon,
            check: stamp(record, keys::CHECK),
            duplicate: stamp(record, keys::DUPLICATE),
            close: stamp(record, keys::CLOSE),
        })
        .collect()
}

fn needs_review(record: &PeakRecord) -> bool {
    [keys::CHECK, keys::DUPLICATE, keys::CLOSE]
        .into_iter()
        .any(|key| record.tags.contains_key(key))
}

fn stamp(record: &PeakRecord, key: &str) -> String {
    record.tags.get(key).unwrap_or_default().to_string()
}

/// Writes `rows` with a header line.
pub fn write_review<W: Write>(writer: W, rows: &[ReviewRow]) -> csv::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

pub fn save_review(path: &Path, rows: &[ReviewRow]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("create review file {}", path.display()))?;
    write_review(file, rows).with_context(|| format!("write review file {}", path.display()))
}
