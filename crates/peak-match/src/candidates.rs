//! Candidate pair generation.

use peak_model::{PeakRecord, RecordId, distance};

/// Pair of records within a pass radius. Rebuilt for every pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchCandidate {
    pub primary: RecordId,
    pub secondary: RecordId,
    pub gap_m: f64,
}

impl MatchCandidate {
    /// Gap truncated to whole metres, as stamped on tags.
    #[must_use]
    pub fn gap_label(&self) -> String {
        (self.gap_m as i64).to_string()
    }
}

/// Collects every pair closer than `max_gap_m`, nearest first.
///
/// Records for which `excluded` returns true are skipped on both sides. The
/// secondary's search box is checked before the exact distance. Ordering is
/// global across all primaries and stable for equal gaps, so pairs at the same
/// distance keep primary-then-secondary input order. A record is never paired
/// with itself.
pub fn generate_candidates(
    primary: &[PeakRecord],
    secondary: &[PeakRecord],
    max_gap_m: f64,
    excluded: impl Fn(RecordId) -> bool,
) -> Vec<MatchCandidate> {
    let mut candidates = Vec::new();

    for (primary_index, primary_record) in primary.iter().enumerate() {
        let primary_id = RecordId::new(primary_record.origin, primary_index);
        if excluded(primary_id) {
            continue;
        }
        for (secondary_index, secondary_record) in secondary.iter().enumerate() {
            let secondary_id = RecordId::new(secondary_record.origin, secondary_index);
            if secondary_id == primary_id || excluded(secondary_id) {
                continue;
            }
            if !secondary_record.search_box.contains(primary_record.location) {
                continue;
            }
            let gap_m = distance(primary_record.location, secondary_record.location);
            if gap_m < max_gap_m {
                candidates.push(MatchCandidate {
                    primary: primary_id,
                    secondary: secondary_id,
                    gap_m,
                });
            }
        }
    }

    candidates.sort_by(|a, b| a.gap_m.total_cmp(&b.gap_m));
    candidates
}

#[cfg(test)]
mod tests {
    use peak_model::{Origin, Point, Tags, coordinate_offset};

    use super::*;

    fn record(origin: Origin, lon: f64, lat: f64) -> PeakRecord {
        PeakRecord::new(origin, Point { lon, lat }, Tags::new())
    }

    /// Point `metres` north of the base point.
    fn north_of(base: Point, metres: f64) -> Point {
        Point {
            lon: base.lon,
            lat: coordinate_offset(base, metres).lat,
        }
    }

    #[test]
    fn sorted_globally_by_gap() {
        let base = Point { lon: 8.0, lat: 61.0 };
        let far = north_of(base, 200.0);
        let primary = vec![
            record(Origin::AuthorityNames, base.lon, base.lat),
            record(Origin::AuthorityNames, far.lon, far.lat),
        ];
        let near_far = north_of(far, 30.0);
        let near_base = north_of(base, 120.0);
        let secondary = vec![
            record(Origin::ExistingMap, near_base.lon, near_base.lat),
            record(Origin::ExistingMap, near_far.lon, near_far.lat),
        ];

        let candidates = generate_candidates(&primary, &secondary, 300.0, |_| false);
        let gaps: Vec<i64> = candidates.iter().map(|c| c.gap_m as i64).collect();
        assert!(gaps.windows(2).all(|pair| pair[0] <= pair[1]), "{gaps:?}");
        assert_eq!(candidates[0].primary, RecordId::new(Origin::AuthorityNames, 1));
        assert_eq!(candidates[0].secondary, RecordId::new(Origin::ExistingMap, 1));
        assert_eq!(candidates.len(), 4);
    }

    #[test]
    fn excludes_self_pairs_and_far_records() {
        let base = Point { lon: 8.0, lat: 61.0 };
        let near = north_of(base, 40.0);
        let far = north_of(base, 5000.0);
        let set = vec![
            record(Origin::AuthorityNames, base.lon, base.lat),
            record(Origin::AuthorityNames, near.lon, near.lat),
            record(Origin::AuthorityNames, far.lon, far.lat),
        ];

        let candidates = generate_candidates(&set, &set, 50.0, |_| false);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].primary, RecordId::new(Origin::AuthorityNames, 0));
        assert_eq!(candidates[1].primary, RecordId::new(Origin::AuthorityNames, 1));
    }

    #[test]
    fn gap_must_be_strictly_below_radius() {
        let base = Point { lon: 8.0, lat: 61.0 };
        let primary = vec![record(Origin::TopoSurvey, base.lon, base.lat)];
        let secondary = vec![record(Origin::ExistingMap, base.lon, base.lat)];
        assert!(generate_candidates(&primary, &secondary, 0.0, |_| false).is_empty());
        assert_eq!(generate_candidates(&primary, &secondary, 1.0, |_| false).len(), 1);
    }

    #[test]
    fn excluded_records_are_skipped_on_both_sides() {
        let base = Point { lon: 8.0, lat: 61.0 };
        let primary = vec![record(Origin::TopoSurvey, base.lon, base.lat)];
        let secondary = vec![
            record(Origin::ExistingMap, base.lon, base.lat),
            record(Origin::ExistingMap, base.lon, base.lat),
        ];
        let blocked = RecordId::new(Origin::ExistingMap, 0);
        let candidates = generate_candidates(&primary, &secondary, 10.0, |id| id == blocked);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].secondary, RecordId::new(Origin::ExistingMap, 1));

        let none = generate_candidates(&primary, &secondary, 10.0, |id| {
            id.origin == Origin::TopoSurvey
        });
        assert!(none.is_empty());
    }

    #[test]
    fn gap_label_truncates() {
        let candidate = MatchCandidate {
            primary: RecordId::new(Origin::AuthorityNames, 0),
            secondary: RecordId::new(Origin::ExistingMap, 0),
            gap_m: 29.97,
        };
        assert_eq!(candidate.gap_label(), "29");
    }
}
