use std::collections::{BTreeMap, BTreeSet};

use peak_match::{MatchConfig, MatchRole, Pass, PeakSets, Reconciler, reconcile};
use peak_model::{
    EARTH_RADIUS_M, ExternalHandle, MapDocument, Origin, PeakRecord, Point, RecordId, Tags,
};

#[derive(Debug, Default)]
struct RecordingDocument {
    nodes: BTreeMap<usize, BTreeMap<String, String>>,
    modified: BTreeSet<usize>,
}

impl RecordingDocument {
    fn tag(&self, handle: usize, key: &str) -> Option<&str> {
        self.nodes.get(&handle)?.get(key).map(String::as_str)
    }
}

impl MapDocument for RecordingDocument {
    fn set_tag(&mut self, handle: ExternalHandle, key: &str, value: &str) {
        self.nodes
            .entry(handle.raw())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    fn remove_tag(&mut self, handle: ExternalHandle, key: &str) {
        if let Some(tags) = self.nodes.get_mut(&handle.raw()) {
            tags.remove(key);
        }
    }

    fn mark_modified(&mut self, handle: ExternalHandle) {
        self.modified.insert(handle.raw());
    }
}

const BASE: Point = Point { lon: 8.45, lat: 61.62 };

/// Point `metres` due north of [`BASE`]; the gap to `BASE` truncates to the
/// integer part of `metres`.
fn north(metres: f64) -> Point {
    Point {
        lon: BASE.lon,
        lat: BASE.lat + (metres / EARTH_RADIUS_M).to_degrees(),
    }
}

fn tags(pairs: &[(&str, &str)]) -> Tags {
    pairs.iter().copied().collect()
}

fn ssr(at: Point, name: &str) -> PeakRecord {
    PeakRecord::new(
        Origin::AuthorityNames,
        at,
        tags(&[("name", name), ("SSR_TYPE", "fjell")]),
    )
}

fn n50(at: Point, pairs: &[(&str, &str)]) -> PeakRecord {
    PeakRecord::new(Origin::TopoSurvey, at, tags(pairs))
}

#[derive(Default)]
struct Fixture {
    authority: Vec<PeakRecord>,
    topo: Vec<PeakRecord>,
    existing: Vec<PeakRecord>,
    document: RecordingDocument,
}

impl Fixture {
    fn osm(mut self, at: Point, pairs: &[(&str, &str)]) -> Self {
        let handle = self.existing.len();
        let tags = tags(pairs);
        self.document.nodes.insert(
            handle,
            tags.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        );
        self.existing
            .push(PeakRecord::existing(at, tags, ExternalHandle::new(handle)));
        self
    }

    fn ssr(mut self, at: Point, name: &str) -> Self {
        self.authority.push(ssr(at, name));
        self
    }

    fn n50(mut self, at: Point, pairs: &[(&str, &str)]) -> Self {
        self.topo.push(n50(at, pairs));
        self
    }

    fn into_parts(self) -> (PeakSets, RecordingDocument) {
        let sets = PeakSets::new(self.authority, self.topo, self.existing).unwrap();
        (sets, self.document)
    }
}

fn osm_id(index: usize) -> RecordId {
    RecordId::new(Origin::ExistingMap, index)
}

fn ssr_id(index: usize) -> RecordId {
    RecordId::new(Origin::AuthorityNames, index)
}

fn n50_id(index: usize) -> RecordId {
    RecordId::new(Origin::TopoSurvey, index)
}

#[test]
fn identical_names_ten_metres_apart_are_merged() {
    let (mut sets, mut document) = Fixture::default()
        .osm(BASE, &[("natural", "peak"), ("name", "Storfjellet")])
        .ssr(north(10.4), "Storfjellet")
        .into_parts();

    let result = reconcile(&mut sets, &mut document, &MatchConfig::default());

    let merged = &sets.existing[0];
    assert_eq!(merged.tags.get("GAP"), Some("10"));
    assert_eq!(merged.tags.get("JARO_WINKLER"), Some("1.000"));
    assert_eq!(merged.tags.get("SSR_TYPE"), Some("fjell"));
    assert_eq!(merged.tags.get("natural"), Some("peak"));
    assert_eq!(document.tag(0, "GAP"), Some("10"));
    assert_eq!(document.tag(0, "SSR_TYPE"), Some("fjell"));
    assert!(document.modified.contains(&0));

    assert!(result.state.is_consumed(ssr_id(0)));
    assert_eq!(
        result.state.partner(osm_id(0), MatchRole::NameMatched),
        Some(ssr_id(0))
    );
    assert_eq!(result.report(Pass::NameMatch).unwrap().committed, 1);
    assert!(result.materialized.is_empty());
}

#[test]
fn dissimilar_name_far_away_is_left_alone() {
    let (mut sets, mut document) = Fixture::default()
        .osm(BASE, &[("natural", "hill"), ("name", "Sørtoppen")])
        .ssr(north(450.0), "Nordtoppen")
        .into_parts();

    let result = reconcile(&mut sets, &mut document, &MatchConfig::default());

    let map = &sets.existing[0];
    assert!(!map.tags.contains_key("GAP"));
    assert!(!map.tags.contains_key("CHECK"));
    assert!(!map.tags.contains_key("DUPLICATE"));
    assert!(!map.tags.contains_key("SSR_TYPE"));
    assert!(document.modified.is_empty());
    assert_eq!(result.report(Pass::NameMatch).unwrap().committed, 0);
    assert_eq!(result.materialized.len(), 1);
}

#[test]
fn dissimilar_name_within_merge_distance_needs_check() {
    let (mut sets, mut document) = Fixture::default()
        .osm(BASE, &[("natural", "hill"), ("name", "Sørtoppen")])
        .ssr(north(250.5), "Nordtoppen")
        .into_parts();

    let result = reconcile(&mut sets, &mut document, &MatchConfig::default());

    let map = &sets.existing[0];
    assert_eq!(map.tags.get("CHECK"), Some("250"));
    assert_eq!(map.tags.get("name"), Some("Sørtoppen"));
    assert!(!map.tags.contains_key("GAP"));
    assert!(document.modified.contains(&0));
    assert!(!result.state.is_consumed(ssr_id(0)));
    assert_eq!(result.report(Pass::NameMatch).unwrap().checks, 1);
}

#[test]
fn rotated_letters_in_a_name_need_check_instead_of_merge() {
    // Jaro-Winkler 0.899: just under the 0.9 threshold.
    let (mut sets, mut document) = Fixture::default()
        .osm(BASE, &[("natural", "peak"), ("name", "Storfjellet")])
        .ssr(north(40.3), "Stoefjellrt")
        .into_parts();

    let result = reconcile(&mut sets, &mut document, &MatchConfig::default());

    let map = &sets.existing[0];
    assert_eq!(map.tags.get("CHECK"), Some("40"));
    assert_eq!(map.tags.get("name"), Some("Storfjellet"));
    assert!(!map.tags.contains_key("GAP"));
    assert!(!map.tags.contains_key("SSR_TYPE"));
    assert_eq!(document.tag(0, "CHECK"), Some("40"));
    assert!(!result.state.is_consumed(ssr_id(0)));
    assert_eq!(result.report(Pass::NameMatch).unwrap().committed, 0);
    assert_eq!(result.report(Pass::NameMatch).unwrap().checks, 1);
}

#[test]
fn similar_name_beyond_merge_distance_is_a_probable_duplicate() {
    let (mut sets, mut document) = Fixture::default()
        .osm(BASE, &[("natural", "hill"), ("name", "Storfjell")])
        .ssr(north(600.2), "Storfjellet")
        .into_parts();

    let result = reconcile(&mut sets, &mut document, &MatchConfig::default());

    let map = &sets.existing[0];
    assert_eq!(map.tags.get("DUPLICATE"), Some("600"));
    assert_eq!(map.tags.get("JARO_WINKLER"), Some("0.964"));
    assert_eq!(result.report(Pass::NameMatch).unwrap().duplicates, 1);
    assert!(!result.state.is_consumed(ssr_id(0)));
}

#[test]
fn survey_elevation_within_tolerance_is_merged() {
    let (mut sets, mut document) = Fixture::default()
        .osm(BASE, &[("natural", "peak"), ("ele", "812")])
        .n50(north(30.3), &[("natural", "hill"), ("ele", "814")])
        .into_parts();

    let result = reconcile(&mut sets, &mut document, &MatchConfig::default());

    let map = &sets.existing[0];
    assert_eq!(map.tags.get("GAP"), Some("30"));
    assert_eq!(map.tags.get("ele"), Some("814"));
    assert_eq!(map.tags.get("OSM_ele"), Some("812"));
    assert_eq!(map.tags.get("natural"), Some("hill"));
    assert_eq!(map.tags.get("OSM_natural"), Some("peak"));
    assert_eq!(document.tag(0, "ele"), Some("814"));
    assert_eq!(
        result.state.partner(osm_id(0), MatchRole::ElevationMatched),
        Some(n50_id(0))
    );
    assert!(result.materialized.is_empty());
}

#[test]
fn elevation_outside_tolerance_needs_check() {
    let (mut sets, mut document) = Fixture::default()
        .osm(BASE, &[("natural", "hill"), ("ele", "812")])
        .n50(north(30.3), &[("natural", "hill"), ("ele", "815")])
        .into_parts();

    let result = reconcile(&mut sets, &mut document, &MatchConfig::default());

    assert_eq!(sets.existing[0].tags.get("CHECK"), Some("30"));
    assert_eq!(sets.existing[0].tags.get("ele"), Some("812"));
    assert_eq!(result.report(Pass::ElevationMatch).unwrap().checks, 1);
    assert_eq!(result.materialized.len(), 1);
}

#[test]
fn malformed_map_elevation_needs_check() {
    let (mut sets, mut document) = Fixture::default()
        .osm(BASE, &[("natural", "hill"), ("ele", "ca. 800")])
        .n50(north(12.5), &[("natural", "hill"), ("ele", "800")])
        .into_parts();

    let result = reconcile(&mut sets, &mut document, &MatchConfig::default());

    assert_eq!(sets.existing[0].tags.get("CHECK"), Some("12"));
    assert_eq!(result.report(Pass::ElevationMatch).unwrap().committed, 0);
}

#[test]
fn survey_points_need_to_be_closer() {
    let survey = [("natural", "hill"), ("ele", "640"), ("man_made", "survey_point")];
    let (mut far_sets, mut far_document) = Fixture::default()
        .osm(BASE, &[("natural", "hill")])
        .n50(north(30.5), &survey)
        .into_parts();
    let far = reconcile(&mut far_sets, &mut far_document, &MatchConfig::default());
    assert_eq!(far_sets.existing[0].tags.get("CHECK"), Some("30"));
    assert_eq!(far.report(Pass::ElevationMatch).unwrap().committed, 0);

    let (mut near_sets, mut near_document) = Fixture::default()
        .osm(BASE, &[("natural", "hill")])
        .n50(north(20.5), &survey)
        .into_parts();
    let near = reconcile(&mut near_sets, &mut near_document, &MatchConfig::default());
    assert_eq!(near_sets.existing[0].tags.get("GAP"), Some("20"));
    assert_eq!(near_sets.existing[0].tags.get("man_made"), Some("survey_point"));
    assert_eq!(near.report(Pass::ElevationMatch).unwrap().committed, 1);
}

#[test]
fn name_matched_summit_keeps_its_classification() {
    let (mut sets, mut document) = Fixture::default()
        .osm(BASE, &[("natural", "peak"), ("name", "Storfjellet")])
        .ssr(north(10.5), "Storfjellet")
        .n50(north(20.5), &[("natural", "hill"), ("ele", "812")])
        .into_parts();

    let result = reconcile(&mut sets, &mut document, &MatchConfig::default());

    let map = &sets.existing[0];
    assert_eq!(map.tags.get("natural"), Some("peak"));
    assert!(!map.tags.contains_key("OSM_natural"));
    assert_eq!(map.tags.get("ele"), Some("812"));
    assert_eq!(map.tags.get("GAP"), Some("20"));
    assert!(result.state.has(osm_id(0), MatchRole::NameMatched));
    assert!(result.state.has(osm_id(0), MatchRole::ElevationMatched));
    assert!(result.materialized.is_empty());
}

#[test]
fn unconfirmed_summit_is_demoted() {
    let (mut sets, mut document) = Fixture::default()
        .osm(BASE, &[("natural", "peak"), ("name", "Kollen")])
        .into_parts();

    let result = reconcile(&mut sets, &mut document, &MatchConfig::default());

    let map = &sets.existing[0];
    assert_eq!(map.tags.get("natural"), Some("hill"));
    assert_eq!(map.tags.get("OSM_natural"), Some("peak"));
    assert_eq!(document.tag(0, "natural"), Some("hill"));
    assert_eq!(document.tag(0, "OSM_natural"), Some("peak"));
    assert!(document.modified.contains(&0));
    assert_eq!(result.report(Pass::Demotion).unwrap().committed, 1);
}

#[test]
fn close_place_names_flag_the_first_only() {
    let (mut sets, mut document) = Fixture::default()
        .ssr(BASE, "Storfjellet")
        .ssr(north(20.5), "Storfjellett")
        .into_parts();

    let result = reconcile(&mut sets, &mut document, &MatchConfig::default());

    assert_eq!(sets.authority[0].tags.get("CLOSE"), Some("20"));
    assert!(!sets.authority[1].tags.contains_key("CLOSE"));
    assert_eq!(result.report(Pass::CloseNames).unwrap().duplicates, 1);
    assert_eq!(result.materialized.len(), 2);
    assert_eq!(result.materialized[0].tags.get("CLOSE"), Some("20"));
}

#[test]
fn map_duplicates_are_flagged_once_per_pair() {
    let (mut sets, mut document) = Fixture::default()
        .osm(BASE, &[("natural", "hill"), ("name", "Varden")])
        .osm(north(500.5), &[("natural", "hill"), ("name", "Varden")])
        .osm(north(900.0), &[("natural", "hill")])
        .into_parts();

    let result = reconcile(&mut sets, &mut document, &MatchConfig::default());

    assert_eq!(sets.existing[0].tags.get("DUPLICATE"), Some("500"));
    assert_eq!(sets.existing[0].tags.get("JARO_WINKLER"), Some("1.000"));
    assert!(!sets.existing[1].tags.contains_key("DUPLICATE"));
    assert!(!sets.existing[2].tags.contains_key("DUPLICATE"));
    assert_eq!(result.report(Pass::DuplicateMapPeaks).unwrap().duplicates, 1);
}

#[test]
fn unnamed_side_allows_a_match_but_never_a_duplicate() {
    let (mut sets, mut document) = Fixture::default()
        .osm(BASE, &[("natural", "peak")])
        .osm(north(100.5), &[("natural", "peak")])
        .ssr(north(201.0), "Varden")
        .into_parts();

    let result = reconcile(&mut sets, &mut document, &MatchConfig::default());

    assert!(!sets.existing[0].tags.contains_key("DUPLICATE"));
    assert!(!sets.existing[1].tags.contains_key("DUPLICATE"));

    let named = &sets.existing[1];
    assert_eq!(named.tags.get("name"), Some("Varden"));
    assert_eq!(named.tags.get("GAP"), Some("100"));
    assert!(!named.tags.contains_key("JARO_WINKLER"));
    assert_eq!(named.tags.get("natural"), Some("peak"));
    assert_eq!(result.report(Pass::NameMatch).unwrap().committed, 1);

    assert_eq!(sets.existing[0].tags.get("natural"), Some("hill"));
}

#[test]
fn greedy_assignment_does_not_backtrack() {
    // Nearest pair first: A takes X, leaving B only the far Y.
    let (mut sets, mut document) = Fixture::default()
        .osm(north(160.0), &[("natural", "peak")])
        .osm(BASE, &[("natural", "peak")])
        .ssr(north(150.0), "Toppen")
        .ssr(north(400.5), "Toppen")
        .into_parts();

    let result = reconcile(&mut sets, &mut document, &MatchConfig::default());

    assert_eq!(
        result.state.partner(ssr_id(0), MatchRole::Consumed),
        Some(osm_id(0))
    );
    assert!(!result.state.is_consumed(ssr_id(1)));
    assert!(!result.state.has(osm_id(1), MatchRole::NameMatched));
    assert_eq!(sets.existing[1].tags.get("natural"), Some("hill"));
    assert_eq!(result.materialized.len(), 1);
    assert_eq!(result.materialized[0].origin, Origin::AuthorityNames);
    assert_eq!(result.materialized[0].location, north(400.5));
}

#[test]
fn rerunning_a_pass_commits_nothing_new() {
    let (mut sets, mut document) = Fixture::default()
        .osm(BASE, &[("natural", "peak"), ("name", "Storfjellet")])
        .ssr(north(10.4), "Storfjellet")
        .into_parts();

    let mut reconciler = Reconciler::new(&mut sets, &mut document, MatchConfig::default());
    let first = reconciler.name_match();
    let second = reconciler.name_match();

    assert_eq!(first.committed, 1);
    assert_eq!(second.committed, 0);
    assert_eq!(second.checks, 0);
    assert_eq!(second.duplicates, 0);
    assert_eq!(reconciler.state().count(MatchRole::Consumed), 1);
}

#[test]
fn leftover_names_merge_into_terrain_points() {
    let (mut sets, mut document) = Fixture::default()
        .n50(BASE, &[("natural", "hill"), ("ele", "430")])
        .ssr(north(60.5), "Haugen")
        .n50(north(2000.0), &[("natural", "hill"), ("ele", "512")])
        .ssr(north(2150.5), "Åsen")
        .into_parts();

    let result = reconcile(&mut sets, &mut document, &MatchConfig::default());

    let merged = &sets.topo[0];
    assert_eq!(merged.tags.get("name"), Some("Haugen"));
    assert_eq!(merged.tags.get("GAP"), Some("60"));
    assert!(result.state.has(n50_id(0), MatchRole::NameMatched));
    assert!(!result.state.is_consumed(n50_id(0)));

    assert_eq!(sets.authority[1].tags.get("CHECK"), Some("150"));
    assert_eq!(result.report(Pass::ResidualNames).unwrap().committed, 1);
    assert_eq!(result.report(Pass::ResidualNames).unwrap().checks, 1);
    assert!(document.modified.is_empty());

    let origins: Vec<Origin> = result.materialized.iter().map(|peak| peak.origin).collect();
    assert_eq!(
        origins,
        vec![Origin::TopoSurvey, Origin::TopoSurvey, Origin::AuthorityNames]
    );
    assert_eq!(result.materialized[0].tags.get("name"), Some("Haugen"));
    assert_eq!(result.materialized[2].tags.get("CHECK"), Some("150"));
}

#[test]
fn every_pass_reports_in_order() {
    let (mut sets, mut document) = Fixture::default().into_parts();
    let result = reconcile(&mut sets, &mut document, &MatchConfig::default());
    let passes: Vec<Pass> = result.reports.iter().map(|report| report.pass).collect();
    assert_eq!(passes, Pass::ALL.to_vec());
    assert!(result.reports.iter().all(|report| report.committed == 0));
}
