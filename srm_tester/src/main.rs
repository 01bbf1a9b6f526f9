use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use log::info;
use srm_vision::core_modules::utils::image_helper::image_helper::{
    save_average, save_labels, to_interleaved,
};
use srm_vision::{PredicateKind, SegmentationRequest, SrmConfig, SrmEngine};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Predicate {
    /// |m1 - m2| <= b(n1) + b(n2)
    Hoeffding,
    /// Log-corrected bound, coarser on textured images.
    Relaxed,
}

impl From<Predicate> for PredicateKind {
    fn from(predicate: Predicate) -> Self {
        match predicate {
            Predicate::Hoeffding => PredicateKind::Hoeffding,
            Predicate::Relaxed => PredicateKind::Relaxed,
        }
    }
}

/// Segments an image with Statistical Region Merging and writes the results as PNGs.
#[derive(Parser, Debug)]
#[command(name = "srm_tester", version, about)]
struct Args {
    /// Image to segment (any format the `image` crate decodes).
    input: PathBuf,

    /// Complexity parameter Q; larger values give more, smaller regions.
    #[arg(short, long, default_value_t = 25.0)]
    q: f32,

    /// Where to write the region-average image.
    #[arg(long)]
    average: Option<PathBuf>,

    /// Where to write the false-color label image (one file per channel when C > 1).
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Convert the input to single-channel luminance before segmenting.
    #[arg(long, default_value_t = false)]
    grayscale: bool,

    #[arg(long, value_enum, default_value_t = Predicate::Hoeffding)]
    predicate: Predicate,

    /// Segment channels one after another instead of in parallel.
    #[arg(long, default_value_t = false)]
    sequential: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.average.is_none() && args.labels.is_none() {
        bail!("nothing to do: pass --average and/or --labels");
    }

    // --- 1. Load & Convert ---
    let decoded = image::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    let decoded = if args.grayscale {
        image::DynamicImage::ImageLuma8(decoded.to_luma8())
    } else {
        decoded
    };
    let image = to_interleaved(&decoded);
    info!(
        "loaded {} ({}x{}, {} channels)",
        args.input.display(),
        image.width,
        image.height,
        image.channels
    );

    // --- 2. Segment ---
    let engine = SrmEngine::new(SrmConfig {
        predicate: args.predicate.into(),
        parallel_planes: !args.sequential,
        ..Default::default()
    });
    let request = SegmentationRequest::new(
        &image.pixels,
        image.width as usize,
        image.height as usize,
        image.channels,
    )
    .with_q(args.q)
    .with_outputs(args.average.is_some(), args.labels.is_some());

    let start = Instant::now();
    let segmentation = engine.segment(&request).context("segmentation failed")?;
    info!(
        "segmented in {:.4} s, regions per channel: {:?}",
        start.elapsed().as_secs_f64(),
        segmentation.report.region_counts
    );

    // --- 3. Write Outputs ---
    if let Some(path) = &args.average {
        save_average(path, image.width, image.height, image.channels, &segmentation.average)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("average image saved to {}", path.display());
    }

    if let Some(path) = &args.labels {
        for channel in 0..image.channels {
            let target = label_path(path, channel, image.channels);
            save_labels(
                &target,
                image.width,
                image.height,
                image.channels,
                channel,
                &segmentation.labels,
            )
            .with_context(|| format!("failed to write {}", target.display()))?;
            info!("channel {channel} labels saved to {}", target.display());
        }
    }

    Ok(())
}

/// `labels.png` for single-channel images, `labels_c0.png`, `labels_c1.png`, ... otherwise.
fn label_path(base: &Path, channel: usize, channels: usize) -> PathBuf {
    if channels == 1 {
        return base.to_path_buf();
    }
    let stem = base
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("labels");
    let extension = base.extension().and_then(|e| e.to_str()).unwrap_or("png");
    base.with_file_name(format!("{stem}_c{channel}.{extension}"))
}
