//! Marker motion smoothing
//!
//! Position fixes arrive sparsely (every few seconds); snapping a map marker
//! between them reads as teleporting. [`MotionInterpolator`] smooths the
//! motion with a frame-scheduled eased interpolation between the marker's
//! current position and each new fix.
//!
//! Rendering is out of scope: the [`Marker`] trait is the seam to whatever
//! actually draws, and the interpolator only ever calls `position` /
//! `set_position` on it.
//!
//! Track handles are owned by the interpolator instance, so independent
//! instances (one per map, in tests, etc.) never interfere.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::constants::motion as motion_config;
use crate::geo::LatLon;

/// The rendering layer's view of a movable marker.
pub trait Marker: Send + Sync + 'static {
    /// Current displayed position.
    fn position(&self) -> LatLon;

    /// Moves the marker.
    fn set_position(&self, position: LatLon);
}

/// Symmetric ease-in-out quadratic curve over `[0, 1]`.
pub fn ease_in_out_quad(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        t * (4.0 - 2.0 * t) - 1.0
    }
}

/// Frame-scheduled position interpolator with at most one active animation
/// per track.
pub struct MotionInterpolator {
    frame_interval: Duration,
    tracks: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl MotionInterpolator {
    /// Creates an interpolator at the default frame rate (~60 fps).
    pub fn new() -> Self {
        Self {
            frame_interval: motion_config::FRAME_INTERVAL,
            tracks: Mutex::new(HashMap::new()),
        }
    }

    /// Overrides the frame interval (tests use a coarser clock).
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Animates `marker` to `target` with the default duration and track.
    pub async fn animate(&self, marker: Arc<dyn Marker>, target: LatLon) {
        self.animate_to(
            marker,
            target,
            motion_config::DEFAULT_DURATION,
            motion_config::DEFAULT_TRACK,
        )
        .await;
    }

    /// Animates `marker` from its current position to `target`.
    ///
    /// Any in-flight animation on `track_id` is canceled first - starting a
    /// new animation on a track always supersedes the previous one, and the
    /// marker's position at call time becomes the new start. Cancellation
    /// takes effect before the superseded task's next frame, so at most one
    /// stale frame may still run.
    pub async fn animate_to(
        &self,
        marker: Arc<dyn Marker>,
        target: LatLon,
        duration: Duration,
        track_id: &str,
    ) {
        let mut tracks = self.tracks.lock().await;

        if let Some(previous) = tracks.remove(track_id) {
            previous.abort();
            debug!(track = track_id, "Superseded in-flight animation");
        }

        let start = marker.position();
        let frame_interval = self.frame_interval;
        let duration = duration.max(Duration::from_millis(1));

        let handle = tokio::spawn(async move {
            let begun = Instant::now();
            let mut frames = tokio::time::interval(frame_interval);
            frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                frames.tick().await;

                let t = (begun.elapsed().as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0);
                let eased = ease_in_out_quad(t);
                marker.set_position(LatLon::new(
                    start.lat + (target.lat - start.lat) * eased,
                    start.lon + (target.lon - start.lon) * eased,
                ));

                if t >= 1.0 {
                    break;
                }
            }
        });

        tracks.insert(track_id.to_owned(), handle);
    }

    /// Cancels the animation on `track_id`, releasing its handle.
    ///
    /// No-op when nothing is running on the track.
    pub async fn cancel(&self, track_id: &str) {
        let mut tracks = self.tracks.lock().await;
        if let Some(handle) = tracks.remove(track_id) {
            handle.abort();
            debug!(track = track_id, "Canceled animation");
        }
    }

    /// Whether an animation is currently running on `track_id`.
    pub async fn is_animating(&self, track_id: &str) -> bool {
        let tracks = self.tracks.lock().await;
        tracks
            .get(track_id)
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Default for MotionInterpolator {
    fn default() -> Self {
        Self::new()
    }
}
