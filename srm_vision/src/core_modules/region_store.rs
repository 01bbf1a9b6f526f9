// THEORY:
// The `RegionStore` is a disjoint-set forest over the pixels of one plane, augmented
// with the statistics the merge predicate needs: how many pixels a region holds and
// the running mean of their original values.
//
// Key properties:
// 1.  **Path compression**: `find` walks to the root once, then re-points every node it
//     visited straight at the root. A second `find` on the same pixel is a single hop.
// 2.  **Union by size**: the smaller tree is attached under the larger one, so trees stay
//     shallow. Together with path compression the amortized cost per operation is the
//     inverse-Ackermann bound.
// 3.  **Live statistics**: only roots carry meaningful `size`/`mean`. A union combines
//     them as a weighted mean, so at any moment a region's mean is the exact average of
//     its members' bytes without ever rescanning them.
//
// Regions are never removed. A merged-away root simply stops being a root.

use crate::core_modules::error::{SrmResult, try_vec_with_capacity};
use crate::core_modules::plane::Plane;

/// Disjoint-set forest with per-region pixel count and running mean.
#[derive(Debug, Clone)]
pub struct RegionStore {
    parent: Vec<u32>,
    size: Vec<u32>,
    mean: Vec<f64>,
    regions: usize,
}

impl RegionStore {
    /// Creates one singleton region per pixel of `plane`.
    pub fn from_plane(plane: &Plane<'_>) -> SrmResult<Self> {
        let pixels = plane.pixel_count();
        let mut parent = try_vec_with_capacity(pixels, "region parents", pixels)?;
        let mut size = try_vec_with_capacity(pixels, "region sizes", pixels)?;
        let mut mean = try_vec_with_capacity(pixels, "region means", pixels)?;

        for (index, value) in plane.values().enumerate() {
            parent.push(index as u32);
            size.push(1);
            mean.push(value as f64);
        }

        Ok(Self {
            parent,
            size,
            mean,
            regions: pixels,
        })
    }

    /// Number of pixels tracked by the store.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Number of regions that are still roots.
    pub fn region_count(&self) -> usize {
        self.regions
    }

    /// Returns the root of `pixel`'s region, compressing the path behind it.
    pub fn find(&mut self, pixel: u32) -> u32 {
        let mut root = pixel;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }

        let mut node = pixel;
        while node != root {
            let next = self.parent[node as usize];
            self.parent[node as usize] = root;
            node = next;
        }
        root
    }

    /// Merges two distinct roots and returns the surviving root.
    ///
    /// The larger region absorbs the smaller one; on equal sizes `root_a` survives.
    pub fn union(&mut self, root_a: u32, root_b: u32) -> u32 {
        debug_assert_ne!(root_a, root_b, "union of a region with itself");
        debug_assert!(self.is_root(root_a) && self.is_root(root_b));

        let (keep, absorb) = if self.size[root_a as usize] < self.size[root_b as usize] {
            (root_b, root_a)
        } else {
            (root_a, root_b)
        };

        let (keep_i, absorb_i) = (keep as usize, absorb as usize);
        let keep_size = self.size[keep_i] as f64;
        let absorb_size = self.size[absorb_i] as f64;
        let merged_size = self.size[keep_i] + self.size[absorb_i];

        self.mean[keep_i] = (self.mean[keep_i] * keep_size + self.mean[absorb_i] * absorb_size)
            / merged_size as f64;
        self.size[keep_i] = merged_size;
        self.parent[absorb_i] = keep;
        self.regions -= 1;
        keep
    }

    /// Pixel count of the region rooted at `root`.
    pub fn size(&self, root: u32) -> u32 {
        self.size[root as usize]
    }

    /// Mean sample value of the region rooted at `root`.
    pub fn mean(&self, root: u32) -> f64 {
        self.mean[root as usize]
    }

    pub fn is_root(&self, pixel: u32) -> bool {
        self.parent[pixel as usize] == pixel
    }
}
