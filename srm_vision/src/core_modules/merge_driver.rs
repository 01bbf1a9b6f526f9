// THEORY:
// The merge driver is the segmentation itself: one sequential pass over the sorted
// edges of a plane. For each edge it looks up the current regions of both endpoints
// and, if they differ, asks the predicate about their CURRENT statistics. Means move
// as regions absorb pixels, so the same pair of pixel values can be compatible early
// in the sweep and incompatible later; this is what separates region merging from a
// plain minimum-spanning-forest cut on static edge weights.
//
// The loop cannot be reordered or split: every decision reads state the previous
// decisions wrote. Each edge is visited exactly once.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::core_modules::edge::Edge;
use crate::core_modules::error::{SrmError, SrmResult};
use crate::core_modules::merge_predicate::MergePredicate;
use crate::core_modules::region_store::RegionStore;

/// A shareable flag that asks running segmentations to stop.
///
/// The sweep polls it once per edge. A cancelled call returns `SrmError::Cancelled`
/// and leaves the caller's output buffers untouched.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Runs the merge sweep over `sorted_edges` and returns how many merges happened.
pub fn merge_all(
    sorted_edges: &[Edge],
    regions: &mut RegionStore,
    predicate: &MergePredicate,
    cancel: Option<&CancelToken>,
) -> SrmResult<usize> {
    let mut merges = 0;
    for edge in sorted_edges {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(SrmError::Cancelled);
        }

        let root_from = regions.find(edge.from);
        let root_to = regions.find(edge.to);
        if root_from == root_to {
            continue;
        }

        if predicate.compatible(
            regions.size(root_from),
            regions.mean(root_from),
            regions.size(root_to),
            regions.mean(root_to),
        ) {
            regions.union(root_from, root_to);
            merges += 1;
        }
    }
    Ok(merges)
}
