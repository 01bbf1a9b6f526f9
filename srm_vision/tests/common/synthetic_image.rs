use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniformly random bytes, reproducible from `seed`.
pub fn noise_u8(width: usize, height: usize, channels: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..width * height * channels).map(|_| rng.random::<u8>()).collect()
}

/// Flat blocks with small seeded noise on top, one channel.
pub fn noisy_blocks_u8(width: usize, height: usize, block: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let level = (((x / block) + 2 * (y / block)) % 4) as i32 * 60 + 30;
            let jitter = rng.random_range(-6..=6);
            data.push((level + jitter).clamp(0, 255) as u8);
        }
    }
    data
}

/// A 2x2 arrangement of flat quadrants valued 20, 80 / 140, 200.
pub fn quadrants_u8(side: usize) -> Vec<u8> {
    let half = side / 2;
    let mut data = Vec::with_capacity(side * side);
    for y in 0..side {
        for x in 0..side {
            let value = match (y < half, x < half) {
                (true, true) => 20,
                (true, false) => 80,
                (false, true) => 140,
                (false, false) => 200,
            };
            data.push(value);
        }
    }
    data
}

/// Interleaves equally sized single-channel planes.
pub fn interleave(planes: &[&[u8]]) -> Vec<u8> {
    let len = planes[0].len();
    let mut data = Vec::with_capacity(len * planes.len());
    for i in 0..len {
        for plane in planes {
            data.push(plane[i]);
        }
    }
    data
}
