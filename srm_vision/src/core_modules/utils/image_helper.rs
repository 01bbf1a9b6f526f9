// Bridges between decoded images on disk and the engine's interleaved byte buffers.
// None of this is part of segmentation proper; it is what a caller needs around it.

pub mod image_helper {
    use image::codecs::png::PngEncoder;
    use image::error::{ImageError, ParameterError, ParameterErrorKind};
    use image::{DynamicImage, ExtendedColorType, ImageEncoder};
    use std::path::Path;

    /// An interleaved row-major byte image ready to hand to the engine.
    #[derive(Debug, Clone, PartialEq)]
    pub struct InterleavedImage {
        pub pixels: Vec<u8>,
        pub width: u32,
        pub height: u32,
        pub channels: usize,
    }

    /// Converts a decoded image into interleaved bytes, keeping its channel layout.
    ///
    /// 8-bit images pass through untouched. Wider sample types are stretched onto
    /// 0..=255 with a min–max rescale over the whole image.
    pub fn to_interleaved(image: &DynamicImage) -> InterleavedImage {
        let (width, height) = (image.width(), image.height());
        let channels = image.color().channel_count() as usize;
        let pixels = match image {
            DynamicImage::ImageLuma8(buffer) => buffer.as_raw().clone(),
            DynamicImage::ImageLumaA8(buffer) => buffer.as_raw().clone(),
            DynamicImage::ImageRgb8(buffer) => buffer.as_raw().clone(),
            DynamicImage::ImageRgba8(buffer) => buffer.as_raw().clone(),
            DynamicImage::ImageLuma16(buffer) => rescale_u16(buffer.as_raw()),
            DynamicImage::ImageLumaA16(buffer) => rescale_u16(buffer.as_raw()),
            DynamicImage::ImageRgb16(buffer) => rescale_u16(buffer.as_raw()),
            DynamicImage::ImageRgba16(buffer) => rescale_u16(buffer.as_raw()),
            DynamicImage::ImageRgb32F(buffer) => rescale_to_bytes(buffer.as_raw()),
            DynamicImage::ImageRgba32F(buffer) => rescale_to_bytes(buffer.as_raw()),
            other => {
                let rgba = other.to_rgba8();
                return InterleavedImage {
                    pixels: rgba.into_raw(),
                    width,
                    height,
                    channels: 4,
                };
            }
        };
        InterleavedImage {
            pixels,
            width,
            height,
            channels,
        }
    }

    fn rescale_u16(samples: &[u16]) -> Vec<u8> {
        let widened: Vec<f32> = samples.iter().map(|&s| s as f32).collect();
        rescale_to_bytes(&widened)
    }

    /// Min–max rescales arbitrary samples onto 0..=255, truncating toward zero.
    ///
    /// A constant input maps to all zeros.
    pub fn rescale_to_bytes(samples: &[f32]) -> Vec<u8> {
        let (min, max) = samples
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| (lo.min(s), hi.max(s)));
        let range = max - min;
        if !range.is_finite() || range <= 0.0 {
            return vec![0; samples.len()];
        }
        samples
            .iter()
            .map(|&s| ((s - min) / range * 255.0) as u8)
            .collect()
    }

    fn color_type_for(channels: usize) -> Result<ExtendedColorType, ImageError> {
        match channels {
            1 => Ok(ExtendedColorType::L8),
            2 => Ok(ExtendedColorType::La8),
            3 => Ok(ExtendedColorType::Rgb8),
            4 => Ok(ExtendedColorType::Rgba8),
            _ => Err(ImageError::Parameter(ParameterError::from_kind(
                ParameterErrorKind::DimensionMismatch,
            ))),
        }
    }

    /// Writes an 8-bit PNG from interleaved bytes.
    pub fn save_png(
        path: impl AsRef<Path>,
        width: u32,
        height: u32,
        channels: usize,
        buffer: &[u8],
    ) -> Result<(), ImageError> {
        let color = color_type_for(channels)?;
        let output = std::fs::File::create(path)?;
        let encoder = PngEncoder::new(output);
        encoder.write_image(buffer, width, height, color)?;
        Ok(())
    }

    /// Rounds a region-average image back to bytes.
    pub fn average_to_bytes(average: &[f32]) -> Vec<u8> {
        average
            .iter()
            .map(|&value| value.round().clamp(0.0, 255.0) as u8)
            .collect()
    }

    /// Saves a region-average image with the same channel layout as its input.
    pub fn save_average(
        path: impl AsRef<Path>,
        width: u32,
        height: u32,
        channels: usize,
        average: &[f32],
    ) -> Result<(), ImageError> {
        save_png(path, width, height, channels, &average_to_bytes(average))
    }

    /// Stable false color for a region label.
    pub fn label_color(label: i32) -> [u8; 3] {
        let hash = (label as u32).wrapping_add(1).wrapping_mul(0x9E37_79B1);
        [(hash >> 24) as u8, (hash >> 16) as u8, (hash >> 8) as u8]
    }

    /// Renders one channel of an interleaved label image as RGB false color.
    pub fn colorize_labels(labels: &[i32], channels: usize, channel: usize) -> Vec<u8> {
        labels
            .iter()
            .skip(channel)
            .step_by(channels)
            .flat_map(|&label| label_color(label))
            .collect()
    }

    /// Saves one channel of a label image as a false-color RGB PNG.
    pub fn save_labels(
        path: impl AsRef<Path>,
        width: u32,
        height: u32,
        channels: usize,
        channel: usize,
        labels: &[i32],
    ) -> Result<(), ImageError> {
        save_png(path, width, height, 3, &colorize_labels(labels, channels, channel))
    }
}
