// THEORY:
// This file is the main entry point for the `srm_vision` library crate: a Statistical
// Region Merging engine that segments raster images into statistically homogeneous
// regions.
//
// The public surface is the `SrmEngine` in `pipeline` together with its request,
// output and report types, plus the async `SegmentationPool` in `parallel_pipeline`.
// The individual stages (plane extraction, edge building and sorting, the region
// store, the merge predicate and sweep, reconstruction) live in `core_modules`.

pub mod core_modules;
pub mod parallel_pipeline;
pub mod pipeline;

pub use parallel_pipeline::{SegmentationJob, SegmentationPool};
pub use pipeline::{
    CancelToken, PredicateKind, Segmentation, SegmentationOutput, SegmentationReport,
    SegmentationRequest, SrmConfig, SrmEngine, SrmError, SrmResult,
};
