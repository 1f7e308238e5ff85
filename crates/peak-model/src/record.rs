use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geo::{Point, SEARCH_BOX_RADIUS_M, SearchBox, create_search_box};
use crate::handle::ExternalHandle;
use crate::tags::{Tags, keys, values};

/// Source a record was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// SSR place names.
    AuthorityNames,
    /// N50 terrain and trigonometric points.
    TopoSurvey,
    /// Peaks already in OpenStreetMap.
    ExistingMap,
}

impl Origin {
    pub fn label(self) -> &'static str {
        match self {
            Self::AuthorityNames => "SSR",
            Self::TopoSurvey => "N50",
            Self::ExistingMap => "OSM",
        }
    }

    /// Prefix for keys that preserve a value overwritten during a merge.
    pub fn preserved_prefix(self) -> &'static str {
        match self {
            Self::AuthorityNames => "SSR_",
            Self::TopoSurvey => "N50_",
            Self::ExistingMap => "OSM_",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stable identifier of a record: its origin and position in that origin's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId {
    pub origin: Origin,
    pub index: usize,
}

impl RecordId {
    pub fn new(origin: Origin, index: usize) -> Self {
        Self { origin, index }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.origin, self.index)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeakRecord {
    pub origin: Origin,
    pub location: Point,
    pub tags: Tags,
    pub search_box: SearchBox,
    /// Only set for existing map records.
    pub handle: Option<ExternalHandle>,
}

impl PeakRecord {
    pub fn new(origin: Origin, location: Point, tags: Tags) -> Self {
        Self {
            origin,
            location,
            tags,
            search_box: create_search_box(location, SEARCH_BOX_RADIUS_M),
            handle: None,
        }
    }

    /// Existing map record bound to a node of the map document.
    pub fn existing(location: Point, tags: Tags, handle: ExternalHandle) -> Self {
        Self {
            handle: Some(handle),
            ..Self::new(Origin::ExistingMap, location, tags)
        }
    }

    pub fn is_summit(&self) -> bool {
        self.tags.has(keys::NATURAL, values::PEAK)
    }

    pub fn is_survey_point(&self) -> bool {
        self.tags.has(keys::MAN_MADE, values::SURVEY_POINT)
    }

    pub fn name(&self) -> Option<&str> {
        self.tags.get(keys::NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_precomputes_search_box() {
        let location = Point { lon: 8.3, lat: 61.6 };
        let record = PeakRecord::new(Origin::TopoSurvey, location, Tags::new());
        assert!(record.search_box.contains(location));
        assert_eq!(record.search_box, create_search_box(location, SEARCH_BOX_RADIUS_M));
        assert!(record.handle.is_none());
    }

    #[test]
    fn existing_record_carries_handle() {
        let record = PeakRecord::existing(
            Point { lon: 8.3, lat: 61.6 },
            [("natural", "peak")].into_iter().collect(),
            ExternalHandle::new(4),
        );
        assert_eq!(record.origin, Origin::ExistingMap);
        assert_eq!(record.handle, Some(ExternalHandle::new(4)));
        assert!(record.is_summit());
        assert!(!record.is_survey_point());
    }

    #[test]
    fn record_id_display() {
        assert_eq!(RecordId::new(Origin::AuthorityNames, 3).to_string(), "SSR#3");
    }
}
