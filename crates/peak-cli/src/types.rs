use std::path::PathBuf;

use peak_fetch::Municipality;
use peak_match::PassReport;

/// Record counts per source before matching.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceCounts {
    pub authority: usize,
    pub topo: usize,
    pub existing: usize,
}

#[derive(Debug)]
pub struct MergeResult {
    pub municipality: Municipality,
    pub output: PathBuf,
    pub review_csv: Option<PathBuf>,
    pub sources: SourceCounts,
    pub reports: Vec<PassReport>,
    /// Map nodes edited, including the appended ones.
    pub modified: usize,
    pub added: usize,
    pub review_rows: usize,
}
