// THEORY:
// Edge weights are bounded bytes, so ordering them needs no comparisons: a counting sort
// over 256 buckets runs in linear time. The sort is stable, which keeps the builder's
// row-major order among edges of equal weight. Ties are therefore always visited in the
// same sequence and repeated runs merge identically.

use crate::core_modules::edge::{Edge, WEIGHT_LEVELS};
use crate::core_modules::error::{SrmResult, try_vec_with_capacity};

/// Returns `edges` ordered by ascending weight, ties in input order.
///
/// `pixels` is only used to describe the plane in an allocation failure.
pub fn sort_edges(edges: &[Edge], pixels: usize) -> SrmResult<Vec<Edge>> {
    let mut counts = [0usize; WEIGHT_LEVELS];
    for edge in edges {
        counts[edge.weight as usize] += 1;
    }

    // Prefix sums turn bucket sizes into bucket start offsets.
    let mut offsets = [0usize; WEIGHT_LEVELS];
    let mut running = 0;
    for (offset, count) in offsets.iter_mut().zip(counts.iter()) {
        *offset = running;
        running += count;
    }

    let mut sorted = try_vec_with_capacity(edges.len(), "sorted edge list", pixels)?;
    sorted.resize(
        edges.len(),
        Edge {
            from: 0,
            to: 0,
            weight: 0,
        },
    );
    for edge in edges {
        let slot = &mut offsets[edge.weight as usize];
        sorted[*slot] = *edge;
        *slot += 1;
    }
    Ok(sorted)
}
