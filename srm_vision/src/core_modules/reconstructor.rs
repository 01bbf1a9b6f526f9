// THEORY:
// After the sweep the region store holds the final partition, but only implicitly, as
// a forest. The reconstructor renders it into flat per-pixel planes:
//
// 1.  **Labels**: scan pixels row-major; the first time a root shows up it receives the
//     next id starting at 0. Ids are therefore contiguous and numbered in discovery
//     order, independent of which pixel happened to become the root.
// 2.  **Averages**: every pixel receives its root's running mean.
//
// Either pass is skipped when the caller did not ask for it. The region count is known
// from the store regardless.

use crate::core_modules::error::{SrmResult, try_vec_with_capacity};
use crate::core_modules::region_store::RegionStore;

/// The rendered result of one plane.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneSegmentation {
    pub average: Option<Vec<f32>>,
    pub labels: Option<Vec<i32>>,
    pub region_count: usize,
    pub merges: usize,
}

/// Renders the requested outputs for a finished sweep.
pub fn reconstruct(
    regions: &mut RegionStore,
    want_average: bool,
    want_labels: bool,
) -> SrmResult<(Option<Vec<f32>>, Option<Vec<i32>>)> {
    let labels = if want_labels {
        Some(assign_labels(regions)?)
    } else {
        None
    };
    let average = if want_average {
        Some(fill_average(regions)?)
    } else {
        None
    };
    Ok((average, labels))
}

fn assign_labels(regions: &mut RegionStore) -> SrmResult<Vec<i32>> {
    let pixels = regions.len();
    let mut root_label = try_vec_with_capacity(pixels, "label map", pixels)?;
    root_label.resize(pixels, -1i32);
    let mut labels = try_vec_with_capacity(pixels, "label plane", pixels)?;

    let mut next_label = 0i32;
    for pixel in 0..pixels as u32 {
        let root = regions.find(pixel) as usize;
        if root_label[root] < 0 {
            root_label[root] = next_label;
            next_label += 1;
        }
        labels.push(root_label[root]);
    }
    Ok(labels)
}

fn fill_average(regions: &mut RegionStore) -> SrmResult<Vec<f32>> {
    let pixels = regions.len();
    let mut average = try_vec_with_capacity(pixels, "average plane", pixels)?;
    for pixel in 0..pixels as u32 {
        let root = regions.find(pixel);
        average.push(regions.mean(root) as f32);
    }
    Ok(average)
}
