//! Whole-video conversion session.
//!
//! A session runs at most one conversion at a time. Starting a new run
//! cancels the previous one. Finished results go into a shared
//! [`ResultCache`], so converting the same video with the same distances
//! again completes immediately with the cached result.
//!
//! State changes are published on a `watch` channel; see
//! [`ConversionSession::subscribe`].

use crate::cancel::CancelToken;
use crate::result_cache::{ConversionResult, ResultCache, ResultKey};
use parking_lot::Mutex;
use sbs_core::{ConversionOptions, EngineConfig, Result, StereoError, ValidationReport, VideoRef};
use sbs_effects::compute_shift;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Lifecycle of a session.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Idle,
    Converting {
        progress: u8,
    },
    Completed(Arc<ConversionResult>),
    Cancelled(String),
    Failed(String),
}

impl SessionState {
    /// Progress in percent. Cancelled and failed runs report 0.
    pub fn progress(&self) -> u8 {
        match self {
            Self::Converting { progress } => *progress,
            Self::Completed(_) => 100,
            Self::Idle | Self::Cancelled(_) | Self::Failed(_) => 0,
        }
    }

    /// Whether the last run has finished one way or another.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed(_) | Self::Cancelled(_) | Self::Failed(_)
        )
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Cancelled(msg) | Self::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Pacing of the session's progress loop.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Percent advanced per step.
    pub progress_step: u8,
    pub step_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for SessionConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            progress_step: config.progress_step.clamp(1, 100),
            step_delay: Duration::from_millis(config.progress_step_delay_ms),
        }
    }
}

/// Single-flight conversion of whole videos.
pub struct ConversionSession {
    results: Arc<ResultCache>,
    config: SessionConfig,
    state: watch::Sender<SessionState>,
    active: Mutex<Option<CancelToken>>,
    last_validation: Mutex<Option<ValidationReport>>,
}

impl ConversionSession {
    pub fn new(results: Arc<ResultCache>, config: SessionConfig) -> Self {
        let (state, _) = watch::channel(SessionState::Idle);
        Self {
            results,
            config,
            state,
            active: Mutex::new(None),
            last_validation: Mutex::new(None),
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn progress(&self) -> u8 {
        self.state.borrow().progress()
    }

    /// Validation report of the most recent `convert` call.
    pub fn last_validation(&self) -> Option<ValidationReport> {
        self.last_validation.lock().clone()
    }

    pub fn results(&self) -> &Arc<ResultCache> {
        &self.results
    }

    /// Whether a conversion is currently running.
    pub fn is_converting(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Convert `video` with `options`.
    ///
    /// Out-of-range options are logged and recorded in
    /// [`Self::last_validation`] but do not stop the run.
    pub async fn convert(
        &self,
        video: &VideoRef,
        options: &ConversionOptions,
    ) -> Result<Arc<ConversionResult>> {
        let report = options.validate();
        if !report.valid {
            warn!(video = %video, errors = ?report.errors, "Converting with out-of-range options");
        }
        *self.last_validation.lock() = Some(report);

        let key = ResultKey::new(video, options);
        if let Some(result) = self.results.get(&key) {
            debug!(video = %video, "Result cache hit");
            self.supersede();
            self.state.send_replace(SessionState::Completed(Arc::clone(&result)));
            return Ok(result);
        }

        let token = self.begin();
        info!(video = %video, "Starting conversion");

        let mut progress = 0u8;
        while progress < 100 {
            tokio::time::sleep(self.config.step_delay).await;
            progress = progress.saturating_add(self.config.progress_step).min(100);
            if !self.publish_if_current(&token, SessionState::Converting { progress }) {
                return Err(self.stopped(video));
            }
        }

        let shift = compute_shift(options.pupil_distance, options.convergence_distance);
        if !shift.is_finite() {
            let err = StereoError::Conversion(format!(
                "disparity shift is not finite for {}/{} mm",
                options.pupil_distance, options.convergence_distance
            ));
            self.finish_if_current(&token, SessionState::Failed(err.to_string()));
            warn!(video = %video, error = %err, "Conversion failed");
            return Err(err);
        }

        let result = Arc::new(ConversionResult::new(video, options, shift));
        if !self.finish_if_current(&token, SessionState::Completed(Arc::clone(&result))) {
            return Err(self.stopped(video));
        }
        self.results.insert(key, Arc::clone(&result));
        info!(video = %video, shift, locator = %result.locator, "Conversion complete");
        Ok(result)
    }

    /// Abort the running conversion, if any.
    ///
    /// Returns `false` when nothing was running.
    pub fn cancel(&self) -> bool {
        let mut active = self.active.lock();
        let Some(token) = active.take() else {
            return false;
        };
        token.cancel();
        self.state
            .send_replace(SessionState::Cancelled("conversion cancelled".into()));
        info!("Conversion cancelled");
        true
    }

    /// Empty the result cache. A running conversion is unaffected.
    pub fn clear_cache(&self) {
        self.results.clear();
        info!("Result cache cleared");
    }

    /// Cancel any running conversion and install a fresh token.
    fn begin(&self) -> CancelToken {
        let token = CancelToken::new();
        let mut active = self.active.lock();
        if let Some(previous) = active.replace(token.clone()) {
            debug!("Superseding running conversion");
            previous.cancel();
        }
        self.state
            .send_replace(SessionState::Converting { progress: 0 });
        token
    }

    /// Cancel any running conversion without installing a new one.
    fn supersede(&self) {
        if let Some(previous) = self.active.lock().take() {
            debug!("Superseding running conversion");
            previous.cancel();
        }
    }

    /// Publish `state` only while `token` is still the active, uncancelled run.
    fn publish_if_current(&self, token: &CancelToken, state: SessionState) -> bool {
        let active = self.active.lock();
        let current = active
            .as_ref()
            .is_some_and(|t| t.same_as(token) && !token.is_cancelled());
        if current {
            self.state.send_replace(state);
        }
        current
    }

    /// Publish a terminal state and release the token if it is still active.
    fn finish_if_current(&self, token: &CancelToken, state: SessionState) -> bool {
        let mut active = self.active.lock();
        let current = active
            .as_ref()
            .is_some_and(|t| t.same_as(token) && !token.is_cancelled());
        if current {
            *active = None;
            self.state.send_replace(state);
        }
        current
    }

    fn stopped(&self, video: &VideoRef) -> StereoError {
        debug!(video = %video, "Conversion stopped before completion");
        StereoError::Cancelled(format!("conversion of {} cancelled", video))
    }
}

impl Default for ConversionSession {
    fn default() -> Self {
        Self::new(Arc::new(ResultCache::new()), SessionConfig::default())
    }
}
