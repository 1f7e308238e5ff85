//! Load, reconcile and write steps of a merge run.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use peak_ingest::{existing_peaks, load_n50, load_n50_archive, load_ssr, read_n50_archive};
use peak_match::{MatchConfig, PeakSets, Reconciliation, reconcile};
use peak_model::PeakRecord;
use peak_osm::{GENERATOR, OsmDocument};

/// Result of merging one municipality.
#[derive(Debug)]
pub struct MergeOutput {
    /// Records after the merge, including every stamp.
    pub sets: PeakSets,
    /// Existing map document with merged tags and the appended nodes.
    pub document: OsmDocument,
    pub reconciliation: Reconciliation,
    /// Ids of the appended nodes, in materialization order.
    pub added_ids: Vec<i64>,
}

/// Where the N50 terrain points come from.
#[derive(Debug, Clone, Copy)]
pub enum N50Source<'a> {
    /// Points already converted to an OSM file.
    OsmFile(&'a Path),
    /// Kartverket GML archive saved on disk.
    ArchiveFile { path: &'a Path, entry: &'a str },
    /// Kartverket GML archive as downloaded.
    Archive { bytes: &'a [u8], entry: &'a str },
}

impl N50Source<'_> {
    fn load(self) -> Result<Vec<PeakRecord>> {
        match self {
            Self::OsmFile(path) => load_n50(path)
                .with_context(|| format!("load N50 peaks from {}", path.display())),
            Self::ArchiveFile { path, entry } => load_n50_archive(path, entry)
                .with_context(|| format!("load N50 peaks from {entry} in {}", path.display())),
            Self::Archive { bytes, entry } => read_n50_archive(bytes, entry)
                .with_context(|| format!("load N50 peaks from downloaded {entry}")),
        }
    }
}

/// Loads the SSR names and N50 points, and binds the peaks of `document`.
pub fn load_sources(
    ssr: &Path,
    n50: N50Source<'_>,
    document: &mut OsmDocument,
) -> Result<PeakSets> {
    let span = info_span!("load");
    let _guard = span.enter();

    let authority = load_ssr(ssr)
        .with_context(|| format!("load SSR place names from {}", ssr.display()))?;
    let topo = n50.load()?;
    let existing = existing_peaks(document);
    PeakSets::new(authority, topo, existing).context("assemble peak sets")
}

/// Runs the reconciliation and appends the new peaks to `document`.
pub fn merge(
    mut sets: PeakSets,
    mut document: OsmDocument,
    config: &MatchConfig,
) -> Result<MergeOutput> {
    let start = Instant::now();
    let reconciliation = reconcile(&mut sets, &mut document, config);
    let added_ids = document
        .append_nodes(&reconciliation.materialized)
        .context("append new peaks")?;
    document.mark_generated(GENERATOR);
    info!(
        modified = document.modified_count(),
        added = added_ids.len(),
        duration_ms = start.elapsed().as_millis(),
        "merge complete"
    );
    Ok(MergeOutput {
        sets,
        document,
        reconciliation,
        added_ids,
    })
}

/// Writes the merged document.
pub fn save_output(output: &MergeOutput, path: &Path) -> Result<()> {
    output
        .document
        .save(path)
        .with_context(|| format!("write merged peaks to {}", path.display()))?;
    info!(path = %path.display(), "saved merged peaks");
    Ok(())
}
