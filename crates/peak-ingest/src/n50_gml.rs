//! N50 terrain and survey points from a Kartverket GML archive.
//!
//! The archive holds one GML file per theme. The elevation theme carries
//! `Terrengpunkt` (spot heights) and `TrigonometriskPunkt` (survey points),
//! positioned in UTM zone 33N.

use std::io::{Cursor, Read};
use std::path::Path;

use peak_model::{Origin, PeakRecord, Point, Tags, keys, values};
use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::{info, warn};

use crate::error::{IngestError, Result};

const TERRAIN_POINT: &[u8] = b"Terrengpunkt";
const SURVEY_POINT: &[u8] = b"TrigonometriskPunkt";
const POSITION: &[u8] = b"pos";
const HEIGHT: &[u8] = "høyde".as_bytes();

/// EPSG:25833.
const UTM_ZONE: u8 = 33;
const UTM_HEMISPHERE: char = 'N';
/// Decimal places kept for converted coordinates.
const COORDINATE_SCALE: f64 = 1e7;

/// Reads the elevation entry of a downloaded N50 archive.
pub fn read_n50_archive(archive: &[u8], entry: &str) -> Result<Vec<PeakRecord>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(archive))?;
    let mut file = archive.by_name(entry)?;
    let mut gml = String::with_capacity(usize::try_from(file.size()).unwrap_or_default());
    file.read_to_string(&mut gml)
        .map_err(|source| IngestError::ArchiveEntry {
            entry: entry.to_string(),
            source,
        })?;
    let records = parse_n50_gml(&gml)?;
    info!(entry, records = records.len(), "loaded N50 peaks from GML");
    Ok(records)
}

/// Reads an N50 archive saved on disk.
pub fn load_n50_archive(path: &Path, entry: &str) -> Result<Vec<PeakRecord>> {
    let archive = std::fs::read(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    read_n50_archive(&archive, entry)
}

/// Terrain points first, then survey points, each in document order.
///
/// Every point becomes `natural=hill` with its `ele`; survey points also get
/// `man_made=survey_point`. Points without a usable position or height are
/// skipped.
pub fn parse_n50_gml(gml: &str) -> Result<Vec<PeakRecord>> {
    let mut reader = Reader::from_str(gml);
    reader.config_mut().trim_text(true);

    let mut terrain = Vec::new();
    let mut survey = Vec::new();
    let mut current: Option<PendingPoint> = None;
    let mut field = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                TERRAIN_POINT => current = Some(PendingPoint::new(false)),
                SURVEY_POINT => current = Some(PendingPoint::new(true)),
                POSITION if current.is_some() => field = Some(Field::Position),
                HEIGHT if current.is_some() => field = Some(Field::Height),
                _ => {}
            },
            Event::Text(ref e) => {
                if let (Some(point), Some(field)) = (current.as_mut(), field) {
                    let text = e.decode().map_err(quick_xml::Error::from)?;
                    point.push(field, &text);
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                TERRAIN_POINT | SURVEY_POINT => {
                    if let Some(point) = current.take() {
                        let target = if point.survey { &mut survey } else { &mut terrain };
                        match point.into_record() {
                            Some(record) => target.push(record),
                            None => warn!("skipping N50 point without position or height"),
                        }
                    }
                }
                _ => field = None,
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    terrain.append(&mut survey);
    Ok(terrain)
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Position,
    Height,
}

#[derive(Debug, Default)]
struct PendingPoint {
    survey: bool,
    position: String,
    height: String,
}

impl PendingPoint {
    fn new(survey: bool) -> Self {
        Self {
            survey,
            ..Self::default()
        }
    }

    fn push(&mut self, field: Field, text: &str) {
        match field {
            Field::Position => self.position.push_str(text),
            Field::Height => self.height.push_str(text),
        }
    }

    fn into_record(self) -> Option<PeakRecord> {
        let location = utm33_to_point(&self.position)?;
        let height = self.height.trim();
        if height.is_empty() {
            return None;
        }
        let mut tags = Tags::new();
        tags.insert(keys::NATURAL, values::HILL);
        tags.insert(keys::ELE, height);
        if self.survey {
            tags.insert(keys::MAN_MADE, values::SURVEY_POINT);
        }
        Some(PeakRecord::new(Origin::TopoSurvey, location, tags))
    }
}

/// Converts a `gml:pos` of `"<easting> <northing>"` in UTM 33N.
fn utm33_to_point(position: &str) -> Option<Point> {
    let mut parts = position.split_whitespace().map(str::parse::<f64>);
    let easting = parts.next()?.ok()?;
    let northing = parts.next()?.ok()?;
    let (lat, lon) =
        utm::wsg84_utm_to_lat_lon(easting, northing, UTM_ZONE, UTM_HEMISPHERE).ok()?;
    Point::new(round_coordinate(lon), round_coordinate(lat)).ok()
}

fn round_coordinate(degrees: f64) -> f64 {
    (degrees * COORDINATE_SCALE).round() / COORDINATE_SCALE
}
