//! Match-state table shared by the passes.
//!
//! Consumption flags live here, keyed by [`RecordId`], instead of on the
//! records themselves. Flags are set once and never cleared.

use std::collections::BTreeMap;

use peak_model::RecordId;
use serde::Serialize;

/// Role under which a record was paired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRole {
    /// Source record merged into a counterpart. Excluded from every later
    /// candidate list and never materialized.
    Consumed,
    /// Recipient of a name merge.
    NameMatched,
    /// Recipient of an elevation merge.
    ElevationMatched,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchState {
    entries: BTreeMap<(RecordId, MatchRole), RecordId>,
}

impl MatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `id` was paired with `partner` under `role`.
    ///
    /// Returns `false` and leaves the table unchanged if the flag is already set.
    pub fn mark(&mut self, id: RecordId, role: MatchRole, partner: RecordId) -> bool {
        match self.entries.entry((id, role)) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(partner);
                true
            }
        }
    }

    #[must_use]
    pub fn has(&self, id: RecordId, role: MatchRole) -> bool {
        self.entries.contains_key(&(id, role))
    }

    #[must_use]
    pub fn is_consumed(&self, id: RecordId) -> bool {
        self.has(id, MatchRole::Consumed)
    }

    /// Record that `id` was paired with under `role`, if any.
    #[must_use]
    pub fn partner(&self, id: RecordId, role: MatchRole) -> Option<RecordId> {
        self.entries.get(&(id, role)).copied()
    }

    #[must_use]
    pub fn count(&self, role: MatchRole) -> usize {
        self.entries.keys().filter(|(_, r)| *r == role).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RecordId, MatchRole, RecordId)> + '_ {
        self.entries
            .iter()
            .map(|(&(id, role), &partner)| (id, role, partner))
    }
}

#[cfg(test)]
mod tests {
    use peak_model::Origin;

    use super::*;

    #[test]
    fn flags_are_set_once() {
        let mut state = MatchState::new();
        let ssr = RecordId::new(Origin::AuthorityNames, 0);
        let osm = RecordId::new(Origin::ExistingMap, 2);
        let other = RecordId::new(Origin::ExistingMap, 5);

        assert!(state.mark(ssr, MatchRole::Consumed, osm));
        assert!(!state.mark(ssr, MatchRole::Consumed, other));
        assert_eq!(state.partner(ssr, MatchRole::Consumed), Some(osm));
        assert!(state.is_consumed(ssr));
        assert!(!state.has(ssr, MatchRole::NameMatched));
    }

    #[test]
    fn roles_are_independent() {
        let mut state = MatchState::new();
        let osm = RecordId::new(Origin::ExistingMap, 1);
        state.mark(osm, MatchRole::NameMatched, RecordId::new(Origin::AuthorityNames, 0));
        state.mark(osm, MatchRole::ElevationMatched, RecordId::new(Origin::TopoSurvey, 3));

        assert!(!state.is_consumed(osm));
        assert_eq!(state.count(MatchRole::NameMatched), 1);
        assert_eq!(state.count(MatchRole::ElevationMatched), 1);
        assert_eq!(state.iter().count(), 2);
    }
}
