// THEORY:
// A `Plane` is one channel of an interleaved H×W×C byte image, seen through a strided
// window over the caller's buffer. The extractor never copies samples: `value(index)`
// reads `pixels[index * channels + channel]` directly.
//
// Every later stage (edges, regions, reconstruction) addresses pixels by their linear
// plane index `row * width + col`, so a plane only needs to answer two questions:
// how big it is and what byte sits at a given index.

/// A zero-copy, single-channel view into an interleaved image buffer.
#[derive(Debug, Clone, Copy)]
pub struct Plane<'a> {
    pixels: &'a [u8],
    width: usize,
    height: usize,
    channels: usize,
    channel: usize,
}

impl<'a> Plane<'a> {
    /// Builds a view of `channel` within `pixels`.
    ///
    /// Dimensions are validated by the engine before any plane is built; the view only
    /// checks them in debug builds.
    pub fn new(pixels: &'a [u8], width: usize, height: usize, channels: usize, channel: usize) -> Self {
        debug_assert!(channel < channels);
        debug_assert!(pixels.len() >= width * height * channels);
        Self {
            pixels,
            width,
            height,
            channels,
            channel,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channel(&self) -> usize {
        self.channel
    }

    /// Number of pixels in the plane (`P`).
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// The byte sample at linear plane index `index`.
    #[inline]
    pub fn value(&self, index: usize) -> u8 {
        self.pixels[index * self.channels + self.channel]
    }

    /// Iterates the plane's samples in row-major order.
    pub fn values(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.pixel_count()).map(move |index| self.value(index))
    }
}

/// Splits an interleaved buffer into one view per channel.
pub fn split_planes(pixels: &[u8], width: usize, height: usize, channels: usize) -> Vec<Plane<'_>> {
    (0..channels)
        .map(|channel| Plane::new(pixels, width, height, channels, channel))
        .collect()
}

/// Writes a per-plane result back into its interleaved slot of `output`.
pub fn scatter_plane<T: Copy>(output: &mut [T], channels: usize, channel: usize, values: &[T]) {
    for (index, value) in values.iter().enumerate() {
        output[index * channels + channel] = *value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planes_read_their_own_channel() {
        // 2x1 RGB: (1,2,3) (4,5,6)
        let pixels = [1u8, 2, 3, 4, 5, 6];
        let planes = split_planes(&pixels, 2, 1, 3);
        assert_eq!(planes.len(), 3);
        assert_eq!(planes[0].values().collect::<Vec<_>>(), vec![1, 4]);
        assert_eq!(planes[1].values().collect::<Vec<_>>(), vec![2, 5]);
        assert_eq!(planes[2].values().collect::<Vec<_>>(), vec![3, 6]);
        assert_eq!(planes[2].channel(), 2);
    }

    #[test]
    fn single_channel_view_is_identity() {
        let pixels = [9u8, 8, 7, 6];
        let plane = Plane::new(&pixels, 2, 2, 1, 0);
        assert_eq!(plane.pixel_count(), 4);
        assert_eq!(plane.value(3), 6);
    }

    #[test]
    fn scatter_fills_only_one_channel() {
        let mut output = vec![0i32; 6];
        scatter_plane(&mut output, 3, 1, &[7, 8]);
        assert_eq!(output, vec![0, 7, 0, 0, 8, 0]);
    }
}
