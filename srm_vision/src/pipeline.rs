// THEORY:
// The `pipeline` module is the top-level API of the segmentation engine. It takes a
// structured request (an interleaved byte image with explicit width, height and channel
// count) and produces per-pixel region averages and region labels.
//
// Stages, per channel plane:
// 1.  **Plane extraction**: a strided view of one channel; no copying.
// 2.  **Edge building** and **edge sorting**: the 4-neighbor graph, weight-ordered.
// 3.  **Merge sweep**: the region store and predicate drive one sequential pass.
// 4.  **Reconstruction**: labels and averages rendered from the final forest.
//
// Planes share nothing, so they run in parallel and are joined before the call
// returns. Results are scattered into the caller's buffers only after every plane has
// finished, which means any error, including cancellation, leaves those buffers exactly
// as they were supplied.
//
// `SrmEngine` carries configuration only. It is cheap to clone and safe to share
// between threads; every call builds and drops its own per-plane state.

use log::{debug, trace};
use rayon::prelude::*;

use crate::core_modules::edge::build_edges;
use crate::core_modules::edge_sorter::sort_edges;
use crate::core_modules::merge_driver::merge_all;
use crate::core_modules::merge_predicate::MergePredicate;
use crate::core_modules::plane::{Plane, scatter_plane, split_planes};
use crate::core_modules::reconstructor::{PlaneSegmentation, reconstruct};
use crate::core_modules::region_store::RegionStore;

// Re-export key data structures for the public API.
pub use crate::core_modules::error::{SrmError, SrmResult};
pub use crate::core_modules::merge_driver::CancelToken;
pub use crate::core_modules::merge_predicate::PredicateKind;

/// Number of quantization levels for byte samples (`g`).
pub const DEFAULT_LEVELS: f64 = 256.0;

/// Default complexity parameter.
pub const DEFAULT_Q: f32 = 25.0;

/// Engine-wide tuning. Per-call values (Q, output flags) live on the request.
#[derive(Debug, Clone)]
pub struct SrmConfig {
    /// Quantization levels `g` used by the merge predicate.
    pub levels: f64,
    /// Which compatibility test the sweep applies.
    pub predicate: PredicateKind,
    /// Segment channel planes on the rayon pool instead of one after another.
    /// Results are identical either way.
    pub parallel_planes: bool,
}

impl Default for SrmConfig {
    fn default() -> Self {
        Self {
            levels: DEFAULT_LEVELS,
            predicate: PredicateKind::Hoeffding,
            parallel_planes: true,
        }
    }
}

/// One segmentation call: an interleaved H×W×C byte image plus its parameters.
#[derive(Debug, Clone)]
pub struct SegmentationRequest<'a> {
    /// Complexity parameter Q; larger values give finer segmentations.
    pub q: f32,
    /// Row-major interleaved samples, at least `width * height * channels` long.
    pub pixels: &'a [u8],
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub compute_average: bool,
    pub compute_labels: bool,
    /// Polled once per edge during the sweep.
    pub cancel: Option<CancelToken>,
}

impl<'a> SegmentationRequest<'a> {
    /// A request for both outputs with the default complexity.
    pub fn new(pixels: &'a [u8], width: usize, height: usize, channels: usize) -> Self {
        Self {
            q: DEFAULT_Q,
            pixels,
            width,
            height,
            channels,
            compute_average: true,
            compute_labels: true,
            cancel: None,
        }
    }

    pub fn with_q(mut self, q: f32) -> Self {
        self.q = q;
        self
    }

    pub fn with_outputs(mut self, compute_average: bool, compute_labels: bool) -> Self {
        self.compute_average = compute_average;
        self.compute_labels = compute_labels;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Total number of samples, `width * height * channels`.
    pub fn sample_count(&self) -> Option<usize> {
        self.width
            .checked_mul(self.height)?
            .checked_mul(self.channels)
    }
}

/// Caller-allocated output buffers, each H×W×C and interleaved like the input.
#[derive(Debug, Default)]
pub struct SegmentationOutput<'a> {
    pub average: Option<&'a mut [f32]>,
    pub labels: Option<&'a mut [i32]>,
}

/// Summary of a finished segmentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationReport {
    /// Final number of regions for each channel plane.
    pub region_counts: Vec<usize>,
    /// Number of merges the sweep performed for each channel plane.
    pub merge_counts: Vec<usize>,
}

/// Owned result of [`SrmEngine::segment`].
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    /// Region averages; all zeros if averages were not requested.
    pub average: Vec<f32>,
    /// Region labels, numbered from 0 per plane; all zeros if labels were not requested.
    pub labels: Vec<i32>,
    pub report: SegmentationReport,
}

/// The stateless Statistical Region Merging engine.
#[derive(Debug, Clone, Default)]
pub struct SrmEngine {
    config: SrmConfig,
}

impl SrmEngine {
    pub fn new(config: SrmConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SrmConfig {
        &self.config
    }

    /// Segments `request` and writes the requested outputs into `output`.
    ///
    /// The engine never reads `output`. On error nothing is written.
    pub fn segment_into(
        &self,
        request: &SegmentationRequest<'_>,
        mut output: SegmentationOutput<'_>,
    ) -> SrmResult<SegmentationReport> {
        // Stage 0: Validation (nothing is touched before it passes)
        let samples = self.validate(request, &output)?;
        trace!(
            "segmenting {}x{}x{} ({} samples), q={}",
            request.width, request.height, request.channels, samples, request.q
        );

        // Stage 1: Plane Extraction
        let planes = split_planes(request.pixels, request.width, request.height, request.channels);

        // Stage 2: Independent Per-Plane Segmentation
        let segment = |plane: &Plane<'_>| self.segment_plane(plane, request);
        let results: Vec<PlaneSegmentation> = if self.config.parallel_planes && planes.len() > 1 {
            planes.par_iter().map(segment).collect::<SrmResult<_>>()?
        } else {
            planes.iter().map(segment).collect::<SrmResult<_>>()?
        };

        // Stage 3: Scatter Into Caller Buffers
        let channels = request.channels;
        for (channel, result) in results.iter().enumerate() {
            if let (Some(buffer), Some(values)) = (output.average.as_deref_mut(), &result.average) {
                scatter_plane(buffer, channels, channel, values);
            }
            if let (Some(buffer), Some(values)) = (output.labels.as_deref_mut(), &result.labels) {
                scatter_plane(buffer, channels, channel, values);
            }
        }

        Ok(SegmentationReport {
            region_counts: results.iter().map(|r| r.region_count).collect(),
            merge_counts: results.iter().map(|r| r.merges).collect(),
        })
    }

    /// Segments `request` into freshly allocated, zero-filled buffers.
    pub fn segment(&self, request: &SegmentationRequest<'_>) -> SrmResult<Segmentation> {
        let samples = self.validate_request(request)?;
        let mut average = vec![0.0f32; samples];
        let mut labels = vec![0i32; samples];

        let report = self.segment_into(
            request,
            SegmentationOutput {
                average: request.compute_average.then_some(average.as_mut_slice()),
                labels: request.compute_labels.then_some(labels.as_mut_slice()),
            },
        )?;

        Ok(Segmentation {
            width: request.width,
            height: request.height,
            channels: request.channels,
            average,
            labels,
            report,
        })
    }

    /// Checks every argument up front and returns the total sample count.
    fn validate(
        &self,
        request: &SegmentationRequest<'_>,
        output: &SegmentationOutput<'_>,
    ) -> SrmResult<usize> {
        let samples = self.validate_request(request)?;
        if request.compute_average {
            check_output("average", output.average.as_deref().map(<[f32]>::len), samples)?;
        }
        if request.compute_labels {
            check_output("label", output.labels.as_deref().map(<[i32]>::len), samples)?;
        }
        Ok(samples)
    }

    fn validate_request(&self, request: &SegmentationRequest<'_>) -> SrmResult<usize> {
        if request.width == 0 || request.height == 0 || request.channels == 0 {
            return Err(SrmError::invalid(format!(
                "width, height and channels must be > 0, got {}x{}x{}",
                request.width, request.height, request.channels
            )));
        }
        if !request.q.is_finite() || request.q <= 0.0 {
            return Err(SrmError::invalid(format!(
                "Q must be a finite value > 0, got {}",
                request.q
            )));
        }
        if !self.config.levels.is_finite() || self.config.levels <= 0.0 {
            return Err(SrmError::invalid(format!(
                "levels must be a finite value > 0, got {}",
                self.config.levels
            )));
        }

        let samples = request
            .sample_count()
            .ok_or_else(|| SrmError::invalid("image dimensions overflow"))?;
        let plane_pixels = request.width * request.height;
        if plane_pixels > i32::MAX as usize {
            return Err(SrmError::invalid(format!(
                "plane of {plane_pixels} pixels exceeds the 32-bit label range"
            )));
        }
        if request.pixels.len() < samples {
            return Err(SrmError::invalid(format!(
                "input holds {} samples, expected {}",
                request.pixels.len(),
                samples
            )));
        }
        Ok(samples)
    }

    fn segment_plane(
        &self,
        plane: &Plane<'_>,
        request: &SegmentationRequest<'_>,
    ) -> SrmResult<PlaneSegmentation> {
        let pixels = plane.pixel_count();
        let predicate =
            MergePredicate::new(self.config.predicate, self.config.levels, request.q as f64, pixels)?;

        let edges = sort_edges(&build_edges(plane)?, pixels)?;
        let mut regions = RegionStore::from_plane(plane)?;
        let merges = merge_all(&edges, &mut regions, &predicate, request.cancel.as_ref())?;
        let (average, labels) =
            reconstruct(&mut regions, request.compute_average, request.compute_labels)?;

        debug!(
            "plane {}: {} edges, {} merges, {} regions",
            plane.channel(),
            edges.len(),
            merges,
            regions.region_count()
        );

        Ok(PlaneSegmentation {
            average,
            labels,
            region_count: regions.region_count(),
            merges,
        })
    }
}

fn check_output(name: &str, len: Option<usize>, samples: usize) -> SrmResult<()> {
    match len {
        None => Err(SrmError::invalid(format!(
            "{name} output requested but no {name} buffer was supplied"
        ))),
        Some(len) if len < samples => Err(SrmError::invalid(format!(
            "{name} buffer holds {len} samples, expected {samples}"
        ))),
        Some(_) => Ok(()),
    }
}
