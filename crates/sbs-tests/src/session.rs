//! Integration tests for conversion sessions.
//!
//! Covers single-flight behavior, cancellation, and result caching shared
//! between sessions.

use sbs_core::{ConversionOptions, EngineConfig, StereoError, VideoRef};
use sbs_media::{ConversionSession, ResultCache, SessionConfig, SessionState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

// ── Helpers ────────────────────────────────────────────────────

fn slow_session(results: Arc<ResultCache>) -> Arc<ConversionSession> {
    Arc::new(ConversionSession::new(
        results,
        SessionConfig {
            progress_step: 10,
            step_delay: Duration::from_millis(20),
        },
    ))
}

fn spawn_convert(
    session: &Arc<ConversionSession>,
    video: &str,
    options: ConversionOptions,
) -> tokio::task::JoinHandle<sbs_core::Result<Arc<sbs_media::ConversionResult>>> {
    let session = Arc::clone(session);
    let video = VideoRef::new(video);
    tokio::spawn(async move { session.convert(&video, &options).await })
}

async fn wait_for_progress(rx: &mut watch::Receiver<SessionState>, at_least: u8) {
    loop {
        rx.changed().await.unwrap();
        if rx.borrow_and_update().progress() >= at_least {
            return;
        }
    }
}

// ── Progress ───────────────────────────────────────────────────

#[tokio::test]
async fn progress_is_monotonic_up_to_100() {
    let session = slow_session(Arc::new(ResultCache::new()));
    let mut rx = session.subscribe();
    let task = spawn_convert(&session, "v", ConversionOptions::default());

    let mut seen = Vec::new();
    while rx.changed().await.is_ok() {
        let state = rx.borrow_and_update().clone();
        seen.push(state.progress());
        if state.is_terminal() {
            break;
        }
    }
    task.await.unwrap().unwrap();

    assert_eq!(seen.last(), Some(&100));
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "{seen:?}");
}

#[tokio::test]
async fn engine_config_paces_session() {
    let config = EngineConfig {
        progress_step: 50,
        progress_step_delay_ms: 0,
        ..EngineConfig::default()
    };
    let session = ConversionSession::new(Arc::new(ResultCache::new()), SessionConfig::from(&config));
    let mut rx = session.subscribe();
    session
        .convert(&"v".into(), &ConversionOptions::default())
        .await
        .unwrap();
    assert!(matches!(*rx.borrow_and_update(), SessionState::Completed(_)));
}

// ── Cancellation ───────────────────────────────────────────────

#[tokio::test]
async fn cancel_mid_conversion() {
    let results = Arc::new(ResultCache::new());
    let session = slow_session(Arc::clone(&results));
    let mut rx = session.subscribe();
    let task = spawn_convert(&session, "v", ConversionOptions::default());

    wait_for_progress(&mut rx, 30).await;
    assert!(session.cancel());

    let err = task.await.unwrap().unwrap_err();
    assert!(matches!(err, StereoError::Cancelled(_)));
    assert_eq!(session.progress(), 0);
    assert!(matches!(session.state(), SessionState::Cancelled(_)));
    assert!(session.state().error_message().is_some());
    assert!(results.is_empty());
    assert!(!session.is_converting());
}

#[tokio::test]
async fn new_conversion_cancels_the_running_one() {
    let session = slow_session(Arc::new(ResultCache::new()));
    let mut rx = session.subscribe();
    let first = spawn_convert(&session, "first", ConversionOptions::default());

    wait_for_progress(&mut rx, 20).await;
    let second = session
        .convert(&"second".into(), &ConversionOptions::default())
        .await
        .unwrap();

    assert!(matches!(
        first.await.unwrap(),
        Err(StereoError::Cancelled(_))
    ));
    assert_eq!(second.video, VideoRef::new("second"));
    assert_eq!(session.state(), SessionState::Completed(second));
}

#[tokio::test]
async fn convert_after_cancel_starts_over() {
    let session = slow_session(Arc::new(ResultCache::new()));
    let mut rx = session.subscribe();
    let task = spawn_convert(&session, "v", ConversionOptions::default());
    wait_for_progress(&mut rx, 10).await;
    session.cancel();
    let _ = task.await.unwrap();

    let result = session
        .convert(&"v".into(), &ConversionOptions::default())
        .await
        .unwrap();
    assert_eq!(session.state(), SessionState::Completed(result));
}

// ── Result cache ───────────────────────────────────────────────

#[tokio::test]
async fn sessions_share_injected_result_cache() {
    let results = Arc::new(ResultCache::new());
    let fast = SessionConfig {
        progress_step: 100,
        step_delay: Duration::ZERO,
    };
    let a = ConversionSession::new(Arc::clone(&results), fast);
    let b = ConversionSession::new(Arc::clone(&results), fast);
    let video: VideoRef = "shared".into();
    let options = ConversionOptions::new(70.0, 3500.0);

    let first = a.convert(&video, &options).await.unwrap();
    let second = b.convert(&video, &options).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(b.progress(), 100);

    // Different distances are a different conversion
    let other = b
        .convert(&video, &ConversionOptions::new(70.0, 3000.0))
        .await
        .unwrap();
    assert!(!Arc::ptr_eq(&first, &other));
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn clear_cache_does_not_affect_running_conversion() {
    let results = Arc::new(ResultCache::new());
    let session = slow_session(Arc::clone(&results));
    let mut rx = session.subscribe();
    let task = spawn_convert(&session, "v", ConversionOptions::default());

    wait_for_progress(&mut rx, 10).await;
    session.clear_cache();

    let result = task.await.unwrap().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(session.state(), SessionState::Completed(result));
}
