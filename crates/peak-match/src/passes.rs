//! The seven reconciliation passes.
//!
//! Every pairing pass walks its candidate list once, nearest first, and
//! commits a pair only if neither side is already taken for the pass's role.
//! Nothing is revisited, so a later, closer alternative is lost if its partner
//! was consumed earlier in the walk.

use std::collections::BTreeSet;

use peak_model::{Elevation, MapDocument, MaterializedPeak, Origin, RecordId, keys, values};
use tracing::debug;

use crate::candidates::generate_candidates;
use crate::config::MatchConfig;
use crate::engine::{Pass, PassReport, PeakSets};
use crate::merge::{add_tag, current_elevation, merge_tags, reclassify};
use crate::similarity::{compare_names, names_allow_match, names_look_duplicate};
use crate::state::{MatchRole, MatchState};

/// Runs passes against one set of records and one map document.
///
/// Passes are public so they can be exercised one at a time; [`crate::reconcile`]
/// runs them in their fixed order.
pub struct Reconciler<'a> {
    sets: &'a mut PeakSets,
    document: &'a mut dyn MapDocument,
    config: MatchConfig,
    state: MatchState,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        sets: &'a mut PeakSets,
        document: &'a mut dyn MapDocument,
        config: MatchConfig,
    ) -> Self {
        Self {
            sets,
            document,
            config,
            state: MatchState::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn into_state(self) -> MatchState {
        self.state
    }

    /// Pass 1: flags place names that sit close to another place name.
    pub fn close_names(&mut self) -> PassReport {
        let mut report = PassReport::new(Pass::CloseNames);
        let state = &self.state;
        let candidates = generate_candidates(
            &self.sets.authority,
            &self.sets.authority,
            self.config.close_name_radius_m,
            |id| state.is_consumed(id),
        );

        let authority = &mut self.sets.authority;
        for candidate in candidates {
            let (first, second) = (candidate.primary.index, candidate.secondary.index);
            if authority[first].tags.contains_key(keys::CLOSE)
                || authority[second].tags.contains_key(keys::CLOSE)
            {
                continue;
            }
            add_tag(
                &mut authority[first],
                &mut *self.document,
                keys::CLOSE,
                &candidate.gap_label(),
            );
            report.duplicates += 1;
        }
        report
    }

    /// Pass 2: flags map peaks that look like duplicates of each other.
    pub fn duplicate_map_peaks(&mut self) -> PassReport {
        let mut report = PassReport::new(Pass::DuplicateMapPeaks);
        let state = &self.state;
        let candidates = generate_candidates(
            &self.sets.existing,
            &self.sets.existing,
            self.config.duplicate_radius_m,
            |id| state.is_consumed(id),
        );

        let threshold = self.config.name_similarity_threshold;
        let existing = &mut self.sets.existing;
        let mut tested = BTreeSet::new();
        for candidate in candidates {
            let (first, second) = (candidate.primary.index, candidate.secondary.index);
            if existing[first].tags.contains_key(keys::DUPLICATE)
                || existing[second].tags.contains_key(keys::DUPLICATE)
                || tested.contains(&(second, first))
            {
                continue;
            }
            let score = compare_names(&existing[first].tags, &existing[second].tags);
            tested.insert((first, second));
            if names_look_duplicate(score, threshold) {
                let record = &mut existing[first];
                add_tag(record, &mut *self.document, keys::DUPLICATE, &candidate.gap_label());
                add_tag(record, &mut *self.document, keys::JARO_WINKLER, &score_label(score));
                report.duplicates += 1;
            }
        }
        report
    }

    /// Pass 3: merges place names into map peaks by name and distance.
    pub fn name_match(&mut self) -> PassReport {
        let mut report = PassReport::new(Pass::NameMatch);
        let state = &self.state;
        let candidates = generate_candidates(
            &self.sets.authority,
            &self.sets.existing,
            self.config.name_search_radius_m,
            |id| state.is_consumed(id),
        );

        let threshold = self.config.name_similarity_threshold;
        let PeakSets {
            authority, existing, ..
        } = &mut *self.sets;
        for candidate in candidates {
            let (name_id, map_id) = (candidate.primary, candidate.secondary);
            if self.state.is_consumed(name_id) || self.state.has(map_id, MatchRole::NameMatched) {
                continue;
            }
            let donor = &authority[name_id.index];
            let recipient = &mut existing[map_id.index];
            let score = compare_names(&donor.tags, &recipient.tags);

            if candidate.gap_m < self.config.name_match_gap_m {
                if names_allow_match(score, threshold) {
                    merge_tags(recipient, &donor.tags, &mut *self.document);
                    add_tag(recipient, &mut *self.document, keys::GAP, &candidate.gap_label());
                    if score <= 1.0 {
                        let label = score_label(score);
                        add_tag(recipient, &mut *self.document, keys::JARO_WINKLER, &label);
                    }
                    self.state.mark(name_id, MatchRole::Consumed, map_id);
                    self.state.mark(map_id, MatchRole::NameMatched, name_id);
                    report.committed += 1;
                    debug!(
                        authority = %name_id,
                        existing = %map_id,
                        gap_m = candidate.gap_m,
                        similarity = score,
                        "name matched"
                    );
                } else {
                    add_tag(recipient, &mut *self.document, keys::CHECK, &candidate.gap_label());
                    report.checks += 1;
                }
            } else if names_look_duplicate(score, threshold) {
                add_tag(recipient, &mut *self.document, keys::DUPLICATE, &candidate.gap_label());
                add_tag(recipient, &mut *self.document, keys::JARO_WINKLER, &score_label(score));
                report.duplicates += 1;
            }
        }
        report
    }

    /// Pass 4: merges surveyed terrain points into map peaks by distance and
    /// elevation.
    pub fn elevation_match(&mut self) -> PassReport {
        let mut report = PassReport::new(Pass::ElevationMatch);
        let state = &self.state;
        let candidates = generate_candidates(
            &self.sets.topo,
            &self.sets.existing,
            self.config.elevation_search_radius_m,
            |id| state.is_consumed(id),
        );

        let config = self.config;
        let PeakSets { topo, existing, .. } = &mut *self.sets;
        for candidate in candidates {
            let (topo_id, map_id) = (candidate.primary, candidate.secondary);
            if self.state.is_consumed(topo_id)
                || self.state.has(map_id, MatchRole::ElevationMatched)
            {
                continue;
            }
            let donor = &mut topo[topo_id.index];
            let recipient = &mut existing[map_id.index];

            let close_enough = candidate.gap_m < config.elevation_match_gap_m
                && (!donor.is_survey_point() || candidate.gap_m < config.survey_point_gap_m);
            let agrees = elevations_agree(
                current_elevation(recipient),
                current_elevation(donor),
                config.elevation_tolerance_m,
            );

            if close_enough && agrees {
                // A name match already settled the classification.
                if self.state.has(map_id, MatchRole::NameMatched) && recipient.is_summit() {
                    donor.tags.remove(keys::NATURAL);
                }
                merge_tags(recipient, &donor.tags, &mut *self.document);
                add_tag(recipient, &mut *self.document, keys::GAP, &candidate.gap_label());
                self.state.mark(topo_id, MatchRole::Consumed, map_id);
                self.state.mark(map_id, MatchRole::ElevationMatched, topo_id);
                report.committed += 1;
                debug!(
                    topo = %topo_id,
                    existing = %map_id,
                    gap_m = candidate.gap_m,
                    "elevation matched"
                );
            } else {
                add_tag(recipient, &mut *self.document, keys::CHECK, &candidate.gap_label());
                report.checks += 1;
            }
        }
        report
    }

    /// Pass 5: demotes map summits that neither source confirmed to hills.
    pub fn demote_unconfirmed(&mut self) -> PassReport {
        let mut report = PassReport::new(Pass::Demotion);
        for (index, record) in self.sets.existing.iter_mut().enumerate() {
            let id = RecordId::new(Origin::ExistingMap, index);
            if self.state.has(id, MatchRole::NameMatched)
                || self.state.has(id, MatchRole::ElevationMatched)
                || !record.is_summit()
            {
                continue;
            }
            if reclassify(record, &mut *self.document, keys::NATURAL, values::HILL) {
                report.committed += 1;
            }
        }
        report
    }

    /// Pass 6: merges leftover place names into leftover terrain points.
    pub fn residual_names(&mut self) -> PassReport {
        let mut report = PassReport::new(Pass::ResidualNames);
        let state = &self.state;
        let candidates = generate_candidates(
            &self.sets.topo,
            &self.sets.authority,
            self.config.residual_search_radius_m,
            |id| state.is_consumed(id),
        );

        let PeakSets {
            authority, topo, ..
        } = &mut *self.sets;
        for candidate in candidates {
            let (topo_id, name_id) = (candidate.primary, candidate.secondary);
            if self.state.is_consumed(name_id)
                || self.state.is_consumed(topo_id)
                || self.state.has(topo_id, MatchRole::NameMatched)
            {
                continue;
            }
            let name_record = &mut authority[name_id.index];
            if candidate.gap_m < self.config.residual_match_gap_m {
                let recipient = &mut topo[topo_id.index];
                merge_tags(recipient, &name_record.tags, &mut *self.document);
                add_tag(recipient, &mut *self.document, keys::GAP, &candidate.gap_label());
                self.state.mark(name_id, MatchRole::Consumed, topo_id);
                self.state.mark(topo_id, MatchRole::NameMatched, name_id);
                report.committed += 1;
                debug!(
                    authority = %name_id,
                    topo = %topo_id,
                    gap_m = candidate.gap_m,
                    "residual name matched"
                );
            } else {
                add_tag(name_record, &mut *self.document, keys::CHECK, &candidate.gap_label());
                report.checks += 1;
            }
        }
        report
    }

    /// Pass 7: every terrain point, then every place name, that was never
    /// consumed becomes a new map node.
    pub fn materialize(&mut self) -> (PassReport, Vec<MaterializedPeak>) {
        let mut report = PassReport::new(Pass::Materialize);
        let mut added = Vec::new();
        for records in [&self.sets.topo, &self.sets.authority] {
            for (index, record) in records.iter().enumerate() {
                if self.state.is_consumed(RecordId::new(record.origin, index)) {
                    continue;
                }
                added.push(MaterializedPeak {
                    origin: record.origin,
                    location: record.location,
                    tags: record.tags.clone(),
                });
            }
        }
        report.committed = added.len();
        (report, added)
    }
}

/// Whether a map elevation is consistent with a surveyed one.
///
/// A map record without `ele` always agrees. Any unparseable value, or a
/// survey point without a usable elevation, cannot be compared and does not
/// agree, which routes the pair to manual review.
fn elevations_agree(map: Elevation, survey: Elevation, tolerance_m: f64) -> bool {
    match (map, survey) {
        (Elevation::Missing, _) => true,
        (Elevation::Metres(map), Elevation::Metres(survey)) => {
            (map - survey).abs() <= tolerance_m
        }
        _ => false,
    }
}

fn score_label(score: f64) -> String {
    format!("{score:.3}")
}
