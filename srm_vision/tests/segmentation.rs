mod common;

use std::collections::{HashMap, HashSet};

use common::synthetic_image::{interleave, noise_u8, noisy_blocks_u8, quadrants_u8};
use srm_vision::{
    CancelToken, SegmentationOutput, SegmentationRequest, SrmConfig, SrmEngine, SrmError,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn region_count(pixels: &[u8], width: usize, height: usize, q: f32) -> usize {
    let request = SegmentationRequest::new(pixels, width, height, 1)
        .with_q(q)
        .with_outputs(false, false);
    SrmEngine::default()
        .segment_into(&request, SegmentationOutput::default())
        .expect("segmentation failed")
        .region_counts[0]
}

#[test]
fn two_row_scenario() {
    init_logging();
    let pixels = [10u8, 10, 200, 200];
    let result = SrmEngine::default()
        .segment(&SegmentationRequest::new(&pixels, 2, 2, 1).with_q(25.0))
        .unwrap();

    assert_eq!(result.report.region_counts, vec![2]);
    assert_eq!(result.labels, vec![0, 0, 1, 1]);
    assert_eq!(result.average, vec![10.0, 10.0, 200.0, 200.0]);
}

#[test]
fn single_pixel_is_one_region() {
    for value in [0u8, 17, 255] {
        let pixels = [value];
        let result = SrmEngine::default()
            .segment(&SegmentationRequest::new(&pixels, 1, 1, 1))
            .unwrap();
        assert_eq!(result.labels, vec![0]);
        assert_eq!(result.average, vec![value as f32]);
    }
}

#[test]
fn uniform_plane_is_one_region_for_any_q() {
    let pixels = vec![99u8; 7 * 5];
    for q in [1e-3, 1.0, 25.0, 1e6] {
        let result = SrmEngine::default()
            .segment(&SegmentationRequest::new(&pixels, 7, 5, 1).with_q(q))
            .unwrap();
        assert_eq!(result.report.region_counts, vec![1], "q={q}");
        assert!(result.labels.iter().all(|&label| label == 0));
        assert!(result.average.iter().all(|&value| value == 99.0));
    }
}

#[test]
fn identical_calls_are_bit_identical() {
    let (width, height) = (23, 19);
    let pixels = noise_u8(width, height, 3, 7);
    let request = SegmentationRequest::new(&pixels, width, height, 3).with_q(12.0);

    let parallel = SrmEngine::default();
    let sequential = SrmEngine::new(SrmConfig {
        parallel_planes: false,
        ..Default::default()
    });

    let first = parallel.segment(&request).unwrap();
    let second = parallel.segment(&request).unwrap();
    let third = sequential.segment(&request).unwrap();

    assert_eq!(first.labels, second.labels);
    assert_eq!(first.labels, third.labels);
    let bits = |values: &[f32]| values.iter().map(|v| v.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&first.average), bits(&second.average));
    assert_eq!(bits(&first.average), bits(&third.average));
}

#[test]
fn region_count_moves_monotonically_with_q() {
    let side = 16;
    let pixels = quadrants_u8(side);
    let qs = [0.01, 0.1, 1.0, 10.0, 100.0, 1000.0, 10000.0];
    let counts: Vec<usize> = qs.iter().map(|&q| region_count(&pixels, side, side, q)).collect();

    for pair in counts.windows(2) {
        assert!(pair[0] <= pair[1], "region counts not monotonic in Q: {counts:?}");
    }
    assert_eq!(counts[0], 1);
    assert_eq!(counts[counts.len() - 1], 4);
}

#[test]
fn larger_q_segments_noise_more_finely() {
    let (width, height) = (32, 32);
    let pixels = noise_u8(width, height, 1, 11);
    let coarse = region_count(&pixels, width, height, 1.0);
    let fine = region_count(&pixels, width, height, 10000.0);
    assert!(fine > coarse, "fine={fine} coarse={coarse}");
}

#[test]
fn labels_cover_a_contiguous_range() {
    let (width, height, channels) = (17, 13, 3);
    let pixels = noise_u8(width, height, channels, 3);
    let result = SrmEngine::default()
        .segment(&SegmentationRequest::new(&pixels, width, height, channels).with_q(40.0))
        .unwrap();

    for channel in 0..channels {
        let used: HashSet<i32> = result.labels.iter().skip(channel).step_by(channels).copied().collect();
        let regions = result.report.region_counts[channel] as i32;
        let expected: HashSet<i32> = (0..regions).collect();
        assert_eq!(used, expected, "channel {channel}");
    }
}

#[test]
fn averages_are_exact_region_means() {
    let (width, height) = (40, 24);
    let pixels = noisy_blocks_u8(width, height, 8, 5);
    let result = SrmEngine::default()
        .segment(&SegmentationRequest::new(&pixels, width, height, 1).with_q(20.0))
        .unwrap();

    let mut sums: HashMap<i32, (f64, usize)> = HashMap::new();
    for (&label, &value) in result.labels.iter().zip(pixels.iter()) {
        let entry = sums.entry(label).or_insert((0.0, 0));
        entry.0 += value as f64;
        entry.1 += 1;
    }

    for (&label, &average) in result.labels.iter().zip(result.average.iter()) {
        let (sum, count) = sums[&label];
        let mean = sum / count as f64;
        assert!(
            (average as f64 - mean).abs() < 1e-3,
            "label {label}: average {average} vs mean {mean}"
        );
    }
}

#[test]
fn channels_are_segmented_independently() {
    let (width, height) = (20, 15);
    let red = noise_u8(width, height, 1, 21);
    let green = noisy_blocks_u8(width, height, 5, 22);
    let blue = vec![128u8; width * height];
    let rgb = interleave(&[&red, &green, &blue]);

    let engine = SrmEngine::default();
    let joint = engine
        .segment(&SegmentationRequest::new(&rgb, width, height, 3).with_q(30.0))
        .unwrap();
    let alone = engine
        .segment(&SegmentationRequest::new(&green, width, height, 1).with_q(30.0))
        .unwrap();

    let joint_green: Vec<i32> = joint.labels.iter().skip(1).step_by(3).copied().collect();
    let joint_green_avg: Vec<f32> = joint.average.iter().skip(1).step_by(3).copied().collect();
    assert_eq!(joint_green, alone.labels);
    assert_eq!(joint_green_avg, alone.average);
    assert_eq!(joint.report.region_counts[1], alone.report.region_counts[0]);
    assert_eq!(joint.report.region_counts[2], 1);
}

#[test]
fn failures_leave_outputs_untouched() {
    let pixels = [10u8, 10, 200, 200];
    let engine = SrmEngine::default();

    let attempts = [
        SegmentationRequest::new(&pixels, 2, 2, 1).with_q(0.0),
        SegmentationRequest::new(&pixels, 2, 2, 1).with_q(-3.0),
        SegmentationRequest::new(&pixels, 0, 2, 1),
        SegmentationRequest::new(&pixels, 2, 0, 1),
        SegmentationRequest::new(&pixels, 2, 2, 0),
        SegmentationRequest::new(&pixels, 3, 2, 1),
    ];

    for request in attempts {
        let mut average = vec![-1.0f32; 4];
        let mut labels = vec![-1i32; 4];
        let result = engine.segment_into(
            &request,
            SegmentationOutput {
                average: Some(&mut average),
                labels: Some(&mut labels),
            },
        );
        assert!(matches!(result, Err(SrmError::InvalidArgument(_))), "{request:?}");
        assert_eq!(average, vec![-1.0; 4]);
        assert_eq!(labels, vec![-1; 4]);
    }
}

#[test]
fn undersized_or_missing_outputs_are_rejected() {
    let pixels = [1u8, 2, 3, 4];
    let request = SegmentationRequest::new(&pixels, 2, 2, 1);
    let engine = SrmEngine::default();

    let mut short = vec![0.0f32; 3];
    let mut labels = vec![5i32; 4];
    let result = engine.segment_into(
        &request,
        SegmentationOutput {
            average: Some(&mut short),
            labels: Some(&mut labels),
        },
    );
    assert!(matches!(result, Err(SrmError::InvalidArgument(_))));
    assert_eq!(labels, vec![5; 4]);

    let result = engine.segment_into(&request, SegmentationOutput::default());
    assert!(matches!(result, Err(SrmError::InvalidArgument(_))));
}

#[test]
fn cancelled_request_writes_nothing() {
    let (width, height) = (16, 16);
    let pixels = noise_u8(width, height, 2, 9);
    let token = CancelToken::new();
    token.cancel();
    let request = SegmentationRequest::new(&pixels, width, height, 2).with_cancel(token);

    let mut average = vec![7.0f32; width * height * 2];
    let mut labels = vec![7i32; width * height * 2];
    let result = SrmEngine::default().segment_into(
        &request,
        SegmentationOutput {
            average: Some(&mut average),
            labels: Some(&mut labels),
        },
    );
    assert_eq!(result, Err(SrmError::Cancelled));
    assert!(average.iter().all(|&v| v == 7.0));
    assert!(labels.iter().all(|&v| v == 7));
}
