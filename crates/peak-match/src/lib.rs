//! Reconciliation of SSR place names, N50 terrain points and existing
//! OpenStreetMap peaks.
//!
//! The engine runs seven passes in a fixed order. Each pairing pass builds a
//! nearest-first candidate list and assigns greedily; tags are merged through
//! [`merge_tags`], and map nodes are edited through the
//! [`peak_model::MapDocument`] interface only.

#![deny(unsafe_code)]

pub mod candidates;
pub mod config;
pub mod engine;
pub mod error;
pub mod merge;
pub mod passes;
pub mod similarity;
pub mod state;

pub use candidates::{MatchCandidate, generate_candidates};
pub use config::{ConfigError, MatchConfig};
pub use engine::{Pass, PassReport, PeakSets, Reconciliation, reconcile};
pub use error::{MatchError, Result};
pub use merge::{add_tag, current_elevation, merge_tags, reclassify};
pub use passes::Reconciler;
pub use similarity::{
    NAMES_NOT_COMPARABLE, compare_names, jaro_similarity, jaro_winkler_similarity,
    names_allow_match, names_look_duplicate,
};
pub use state::{MatchRole, MatchState};
