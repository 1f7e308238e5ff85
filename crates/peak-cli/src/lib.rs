//! Library side of the `peakmerge` binary.

pub mod logging;
pub mod pipeline;
pub mod review;
