//! Integration tests for the frame path.
//!
//! Exercises sampling, extraction, caching, and synthesis across
//! sbs-core, sbs-effects, and sbs-media.

use sbs_core::{ColorAdjustment, ConversionOptions, EngineConfig, FrameId, StereoError, VideoRef};
use sbs_effects::{compute_shift, DisparityShift, StereoPipeline};
use sbs_media::{
    BatchController, FrameCache, FrameRequest, SamplingPlanner, TestPatternSource, VideoMetadata,
};
use std::sync::Arc;
use std::time::Duration;

// ── Helpers ────────────────────────────────────────────────────

fn metadata(duration_secs: f64) -> VideoMetadata {
    VideoMetadata {
        size_bytes: 100 * 1024 * 1024,
        duration_secs,
        fps: 30.0,
        width: 64,
        height: 16,
    }
}

fn controller(
    source: TestPatternSource,
    options: &ConversionOptions,
) -> BatchController<TestPatternSource> {
    BatchController::new(
        source,
        FrameCache::shared(100),
        StereoPipeline::new(options, ColorAdjustment::IDENTITY),
    )
}

// ── Sampling → extraction ──────────────────────────────────────

#[tokio::test]
async fn sampled_frames_fit_the_plan() {
    let meta = metadata(60.0);
    let plan = SamplingPlanner::default().plan(meta.size_bytes, meta.duration_secs, meta.fps);
    assert_eq!(plan.sampling_rate, 29);

    let ctl = controller(TestPatternSource::new(meta), &ConversionOptions::default());
    let video: VideoRef = "/videos/one-minute.mp4".into();
    let request = FrameRequest::rgba(meta.width, meta.height);

    let mut frames = Vec::new();
    for index in plan.frame_indices() {
        let src = ctl.extract_frame(&video, FrameId(index), request).await.unwrap();
        frames.push(ctl.pipeline().process(&src).unwrap());
    }

    assert_eq!(frames.len() as u64, plan.effective_frames);
    assert_eq!(ctl.buffer_stats().cached_frames, 63);
    // Timestamps follow the sampled indices
    assert_eq!(frames[1].timestamp_ms(), 29.0 * 1000.0 / 30.0);
}

#[tokio::test]
async fn cache_evicts_fifo_during_long_batch() {
    let meta = metadata(10.0);
    let ctl = controller(TestPatternSource::new(meta), &ConversionOptions::default());
    let video: VideoRef = "clip".into();
    let request = FrameRequest::rgba(8, 2);

    let report = ctl.process_batch(&video, 0, 101, request, |_| {}).await;
    assert!(report.is_complete());
    assert_eq!(ctl.buffer_stats().cached_frames, 100);

    // Frame 0 was evicted, so asking again goes back to the source
    let calls = ctl.source().calls();
    ctl.extract_frame(&video, FrameId(0), request).await.unwrap();
    assert_eq!(ctl.source().calls(), calls + 1);

    // Frame 100 is still cached
    ctl.extract_frame(&video, FrameId(100), request).await.unwrap();
    assert_eq!(ctl.source().calls(), calls + 1);
}

// ── Synthesis through the controller ───────────────────────────

#[tokio::test]
async fn batch_frames_are_shifted_stereo_pairs() {
    // 64/1280 → 5% of 64 px = 3 px (3.2 rounded)
    let options = ConversionOptions::new(64.0, 1280.0);
    assert_eq!(compute_shift(64.0, 1280.0), 5.0);
    assert_eq!(DisparityShift::from_options(&options).pixels(64), 3);

    let meta = metadata(1.0);
    let ctl = controller(TestPatternSource::new(meta), &options);
    let report = ctl
        .process_batch(&"clip".into(), 0, 2, FrameRequest::rgba(64, 16), |_| {})
        .await;
    let frames = report.into_result().unwrap();

    let frame = &frames[0];
    assert_eq!(frame.width(), 128);
    // Right eye pixel x samples source x + 3; bars are 8 px wide
    assert_eq!(frame.pixel(64 + 4, 0), frame.pixel(7, 0));
    assert_eq!(frame.pixel(64 + 5, 0), frame.pixel(8, 0));
    // Right edge clamps to the last source column
    assert_eq!(frame.pixel(127, 15), frame.pixel(63, 15));
}

#[tokio::test]
async fn color_adjustment_applies_to_both_eyes() {
    let meta = metadata(1.0);
    let ctl = BatchController::new(
        TestPatternSource::new(meta),
        FrameCache::shared(10),
        StereoPipeline::new(
            &ConversionOptions::default(),
            ColorAdjustment::new(1.0, 1.0, 0.0),
        ),
    );
    let frames = ctl
        .process_batch(&"clip".into(), 0, 1, FrameRequest::rgba(16, 2), |_| {})
        .await
        .into_result()
        .unwrap();

    // Yellow bar (x = 2) desaturates to its gray average
    let [r, g, b, a] = frames[0].pixel(2, 0);
    assert_eq!((r, g, b, a), (170, 170, 170, 255));
    assert_eq!(frames[0].pixel(16 + 2, 0)[0], 170);
}

#[tokio::test]
async fn config_drives_cache_and_stats() {
    let config = EngineConfig {
        frame_cache_capacity: 4,
        reference_width: 10,
        reference_height: 10,
        ..EngineConfig::default()
    };
    let ctl = BatchController::new(
        TestPatternSource::new(metadata(1.0)),
        FrameCache::shared(config.frame_cache_capacity),
        StereoPipeline::default(),
    )
    .with_per_frame_bytes(config.per_frame_bytes());

    ctl.process_batch(&"clip".into(), 0, 10, FrameRequest::rgba(4, 4), |_| {})
        .await;
    let stats = ctl.buffer_stats();
    assert_eq!(stats.cached_frames, 4);
    assert_eq!(stats.estimated_bytes, 4 * 400);
}

// ── Cancellation and failure ───────────────────────────────────

#[tokio::test]
async fn cancel_from_another_task_truncates_batch() {
    let source = TestPatternSource::new(metadata(1.0)).with_delay(Duration::from_millis(5));
    let ctl = Arc::new(controller(source, &ConversionOptions::default()));

    let task = {
        let ctl = Arc::clone(&ctl);
        tokio::spawn(async move {
            let video = VideoRef::new("clip");
            ctl.process_batch(&video, 0, 20, FrameRequest::rgba(8, 2), |_| {})
                .await
        })
    };

    while ctl.state().processed_frames < 2 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    ctl.cancel();

    let report = task.await.unwrap();
    assert!(report.frames.len() < 20);
    assert!(report.frames.len() >= 2);
    assert!(report.is_cancelled());
    assert!(matches!(report.into_result(), Err(StereoError::Cancelled(_))));
    assert!(!ctl.state().is_processing);
}

#[tokio::test]
async fn failed_batch_keeps_earlier_frames_cached() {
    let source = TestPatternSource::new(metadata(1.0)).failing_at(5);
    let ctl = controller(source, &ConversionOptions::default());
    let report = ctl
        .process_batch(&"clip".into(), 0, 10, FrameRequest::rgba(8, 2), |_| {})
        .await;

    assert_eq!(report.frames.len(), 5);
    assert!(!report.is_cancelled());
    assert_eq!(ctl.buffer_stats().cached_frames, 5);
    assert!(ctl.state().error.unwrap().contains("frame 5"));
}
