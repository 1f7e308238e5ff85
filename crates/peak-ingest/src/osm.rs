//! Peak records from OSM XML: N50 terrain points and existing map peaks.

use std::path::Path;

use peak_model::{ExternalHandle, MapDocument, Origin, PeakRecord, Tags, keys, values};
use peak_osm::OsmDocument;
use tracing::{debug, info};

use crate::elevation::clean_elevation;
use crate::error::Result;

/// Reads an N50 terrain point file. Every node becomes a record tagged
/// `natural=hill`; survey point markers in the file are kept.
pub fn load_n50(path: &Path) -> Result<Vec<PeakRecord>> {
    let document = OsmDocument::read(path)?;
    let records = n50_records(&document);
    info!(path = %path.display(), records = records.len(), "loaded N50 peaks");
    Ok(records)
}

pub fn n50_records(document: &OsmDocument) -> Vec<PeakRecord> {
    document
        .nodes()
        .filter_map(|(_, node)| {
            let location = node.location()?;
            let mut tags = node.tags();
            clean_tags(&mut tags);
            tags.insert(keys::NATURAL, values::HILL);
            Some(PeakRecord::new(Origin::TopoSurvey, location, tags))
        })
        .collect()
}

/// Binds every node whose `natural` is an elevation kind to a map record.
///
/// Unit suffixes in `ele` are cleaned on the node itself, which is then
/// marked modified.
pub fn existing_peaks(document: &mut OsmDocument) -> Vec<PeakRecord> {
    let candidates: Vec<(ExternalHandle, Tags)> = document
        .nodes()
        .filter(|(_, node)| {
            node.tag(keys::NATURAL)
                .is_some_and(|kind| values::ELEVATION_KINDS.contains(&kind))
        })
        .map(|(handle, node)| (handle, node.tags()))
        .collect();

    let mut records = Vec::with_capacity(candidates.len());
    let mut cleaned = 0;
    for (handle, mut tags) in candidates {
        let Some(location) = document.element(handle).and_then(|node| node.location()) else {
            debug!(handle = handle.raw(), "skipping peak node without coordinates");
            continue;
        };
        if let Some(ele) = clean_tags(&mut tags) {
            document.set_tag(handle, keys::ELE, &ele);
            document.mark_modified(handle);
            cleaned += 1;
        }
        records.push(PeakRecord::existing(location, tags, handle));
    }
    info!(records = records.len(), cleaned, "loaded existing OSM peaks");
    records
}

/// Cleans `ele` in place and returns the new value if it changed.
fn clean_tags(tags: &mut Tags) -> Option<String> {
    let ele = clean_elevation(tags.get(keys::ELE)?)?;
    tags.insert(keys::ELE, ele.as_str());
    Some(ele)
}
