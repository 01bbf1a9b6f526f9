// THEORY:
// The edge builder turns a plane into its 4-neighbor adjacency graph. Each pixel links
// only to its right and bottom neighbor, so every adjacent pair appears exactly once and
// a W×H plane produces `2·W·H − W − H` edges.
//
// Emission order is row-major, and for one pixel the horizontal edge comes before the
// vertical one. The sorter keeps this order inside each weight bucket, which is what
// makes the merge sweep reproducible.

use crate::core_modules::error::{SrmError, SrmResult, try_vec_with_capacity};
use crate::core_modules::plane::Plane;

/// Number of distinct edge weights for byte samples.
pub const WEIGHT_LEVELS: usize = 256;

/// An adjacency between two pixels of the same plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Linear index of the left or upper pixel.
    pub from: u32,
    /// Linear index of the right or lower neighbor.
    pub to: u32,
    /// Absolute difference of the two byte samples.
    pub weight: u8,
}

/// Exact number of edges for a `width × height` plane.
pub fn edge_count(width: usize, height: usize) -> usize {
    let horizontal = width.saturating_sub(1) * height;
    let vertical = width * height.saturating_sub(1);
    horizontal + vertical
}

/// Builds the plane's edge list in row-major, horizontal-before-vertical order.
pub fn build_edges(plane: &Plane<'_>) -> SrmResult<Vec<Edge>> {
    let width = plane.width();
    let height = plane.height();
    if width == 0 || height == 0 {
        return Err(SrmError::invalid(format!(
            "plane dimensions must be positive, got {width}x{height}"
        )));
    }

    let mut edges = try_vec_with_capacity(edge_count(width, height), "edge list", plane.pixel_count())?;
    for row in 0..height {
        for col in 0..width {
            let index = row * width + col;
            let value = plane.value(index);
            if col + 1 < width {
                edges.push(make_edge(index, index + 1, value, plane.value(index + 1)));
            }
            if row + 1 < height {
                edges.push(make_edge(index, index + width, value, plane.value(index + width)));
            }
        }
    }
    Ok(edges)
}

#[inline]
fn make_edge(from: usize, to: usize, a: u8, b: u8) -> Edge {
    Edge {
        from: from as u32,
        to: to as u32,
        weight: a.abs_diff(b),
    }
}
