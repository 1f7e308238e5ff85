//! Orchestration of the reconciliation passes.

use std::fmt;
use std::time::Instant;

use peak_model::{MapDocument, MaterializedPeak, Origin, PeakRecord, RecordId};
use serde::Serialize;
use tracing::{info, info_span};

use crate::config::MatchConfig;
use crate::error::{MatchError, Result};
use crate::passes::Reconciler;
use crate::state::MatchState;

/// The three record collections, each indexed by [`RecordId::index`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeakSets {
    pub authority: Vec<PeakRecord>,
    pub topo: Vec<PeakRecord>,
    pub existing: Vec<PeakRecord>,
}

impl PeakSets {
    /// Builds the sets, checking that every record sits in the set of its origin.
    pub fn new(
        authority: Vec<PeakRecord>,
        topo: Vec<PeakRecord>,
        existing: Vec<PeakRecord>,
    ) -> Result<Self> {
        check_origin(&authority, Origin::AuthorityNames)?;
        check_origin(&topo, Origin::TopoSurvey)?;
        check_origin(&existing, Origin::ExistingMap)?;
        Ok(Self {
            authority,
            topo,
            existing,
        })
    }

    #[must_use]
    pub fn records(&self, origin: Origin) -> &[PeakRecord] {
        match origin {
            Origin::AuthorityNames => &self.authority,
            Origin::TopoSurvey => &self.topo,
            Origin::ExistingMap => &self.existing,
        }
    }

    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<&PeakRecord> {
        self.records(id.origin).get(id.index)
    }

    /// Records of all three sets with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &PeakRecord)> {
        [Origin::AuthorityNames, Origin::TopoSurvey, Origin::ExistingMap]
            .into_iter()
            .flat_map(move |origin| {
                self.records(origin)
                    .iter()
                    .enumerate()
                    .map(move |(index, record)| (RecordId::new(origin, index), record))
            })
    }
}

fn check_origin(records: &[PeakRecord], expected: Origin) -> Result<()> {
    match records.iter().position(|record| record.origin != expected) {
        Some(index) => Err(MatchError::OriginMismatch {
            expected,
            found: records[index].origin,
            index,
        }),
        None => Ok(()),
    }
}

/// Reconciliation passes in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pass {
    CloseNames,
    DuplicateMapPeaks,
    NameMatch,
    ElevationMatch,
    Demotion,
    ResidualNames,
    Materialize,
}

impl Pass {
    pub const ALL: [Pass; 7] = [
        Pass::CloseNames,
        Pass::DuplicateMapPeaks,
        Pass::NameMatch,
        Pass::ElevationMatch,
        Pass::Demotion,
        Pass::ResidualNames,
        Pass::Materialize,
    ];

    /// One-based position in the run.
    #[must_use]
    pub fn number(self) -> usize {
        self as usize + 1
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CloseNames => "close_names",
            Self::DuplicateMapPeaks => "duplicate_map_peaks",
            Self::NameMatch => "name_match",
            Self::ElevationMatch => "elevation_match",
            Self::Demotion => "demotion",
            Self::ResidualNames => "residual_names",
            Self::Materialize => "materialize",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::CloseNames => "close SSR names",
            Self::DuplicateMapPeaks => "duplicate OSM peaks",
            Self::NameMatch => "SSR names matched with OSM",
            Self::ElevationMatch => "N50 peaks matched with OSM",
            Self::Demotion => "unconfirmed OSM peaks demoted to hill",
            Self::ResidualNames => "SSR names matched with N50",
            Self::Materialize => "new peaks from N50 and SSR",
        }
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counts produced by one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub pass: Pass,
    /// Merges, demotions or new nodes, depending on the pass.
    pub committed: usize,
    /// `CHECK` stamps.
    pub checks: usize,
    /// `CLOSE` or `DUPLICATE` stamps.
    pub duplicates: usize,
}

impl PassReport {
    #[must_use]
    pub fn new(pass: Pass) -> Self {
        Self {
            pass,
            committed: 0,
            checks: 0,
            duplicates: 0,
        }
    }
}

/// Outcome of a full run.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// One report per pass, in execution order.
    pub reports: Vec<PassReport>,
    pub materialized: Vec<MaterializedPeak>,
    pub state: MatchState,
}

impl Reconciliation {
    #[must_use]
    pub fn report(&self, pass: Pass) -> Option<&PassReport> {
        self.reports.iter().find(|report| report.pass == pass)
    }
}

/// Runs the seven passes in order over `sets`, editing map nodes through
/// `document`. Each pass sees the consumption flags left by the ones before it.
pub fn reconcile(
    sets: &mut PeakSets,
    document: &mut dyn MapDocument,
    config: &MatchConfig,
) -> Reconciliation {
    let span = info_span!(
        "reconcile",
        authority = sets.authority.len(),
        topo = sets.topo.len(),
        existing = sets.existing.len()
    );
    let _guard = span.enter();

    let mut reconciler = Reconciler::new(sets, document, *config);
    let mut reports = Vec::with_capacity(Pass::ALL.len());

    reports.push(run_pass(Pass::CloseNames, || reconciler.close_names()));
    reports.push(run_pass(Pass::DuplicateMapPeaks, || {
        reconciler.duplicate_map_peaks()
    }));
    reports.push(run_pass(Pass::NameMatch, || reconciler.name_match()));
    reports.push(run_pass(Pass::ElevationMatch, || reconciler.elevation_match()));
    reports.push(run_pass(Pass::Demotion, || reconciler.demote_unconfirmed()));
    reports.push(run_pass(Pass::ResidualNames, || reconciler.residual_names()));

    let mut materialized = Vec::new();
    reports.push(run_pass(Pass::Materialize, || {
        let (report, added) = reconciler.materialize();
        materialized = added;
        report
    }));

    Reconciliation {
        reports,
        materialized,
        state: reconciler.into_state(),
    }
}

fn run_pass(pass: Pass, run: impl FnOnce() -> PassReport) -> PassReport {
    info_span!("pass", pass = %pass).in_scope(|| {
        let start = Instant::now();
        let report = run();
        info!(
            pass = %pass,
            committed = report.committed,
            checks = report.checks,
            duplicates = report.duplicates,
            duration_ms = start.elapsed().as_millis(),
            "{}",
            pass.description()
        );
        report
    })
}
