use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};

use crate::config::Config;
use crate::distance;
use crate::error::SessionError;
use crate::store::RouteStore;
use crate::types::track::{
    LocationSample, SessionState, StopOutcome, Track, TrackId, TrackPoint, Waypoint, UNBOUND_ID,
};

/// Location-provider collaborator. One call, one optional fix; the call may
/// resolve asynchronously and is allowed to yield nothing.
pub trait LocationProvider: Send + Sync + 'static {
    fn current_sample(&self) -> impl Future<Output = Option<LocationSample>> + Send;
}

/// Point-in-time view of a running session's published metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub track_id: Option<TrackId>,
    pub elapsed_millis: i64,
    pub distance_meters: f64,
    pub avg_speed_kmh: f64,
}

/// The distance/elapsed/average-speed triple frozen at the first stop
/// attempt. Held so a retried stop after a failed finalize writes the same
/// numbers instead of re-reading a clock whose bookkeeping ticks are gone.
#[derive(Debug, Clone, Copy)]
struct FinalMetrics {
    distance_meters: f64,
    elapsed_millis: i64,
    avg_speed_kmh: f64,
}

/// State shared between the public API and the two periodic activities.
/// Every mutation goes through the one mutex; the sampling tick holds it
/// across persist + buffer append + distance update so distance is never
/// computed against a point that has not been appended yet.
struct SessionCore {
    state: SessionState,
    track_id: Option<TrackId>,
    started_at: Option<Instant>,
    paused_millis: i64,
    pause_started: Option<Instant>,
    elapsed_millis: i64,
    distance_meters: f64,
    avg_speed_kmh: f64,
    last_point: Option<TrackPoint>,
    last_fix: Option<LocationSample>,
    points: Vec<TrackPoint>,
    waypoints: Vec<Waypoint>,
    pending_final: Option<FinalMetrics>,
}

impl SessionCore {
    fn new() -> Self {
        Self {
            state: SessionState::Idle,
            track_id: None,
            started_at: None,
            paused_millis: 0,
            pause_started: None,
            elapsed_millis: 0,
            distance_meters: 0.0,
            avg_speed_kmh: 0.0,
            last_point: None,
            last_fix: None,
            points: Vec::new(),
            waypoints: Vec::new(),
            pending_final: None,
        }
    }

    fn begin(&mut self, track_id: TrackId, now: Instant) {
        self.state = SessionState::Recording;
        self.track_id = Some(track_id);
        self.started_at = Some(now);
        self.paused_millis = 0;
        self.pause_started = None;
        self.elapsed_millis = 0;
        self.distance_meters = 0.0;
        self.avg_speed_kmh = 0.0;
        self.last_point = None;
        self.points.clear();
        self.waypoints.clear();
        self.pending_final = None;
    }

    /// Once-per-second bookkeeping: pause interval accounting, elapsed time,
    /// average speed.
    fn timer_tick(&mut self, now: Instant) {
        match self.state {
            SessionState::Paused => {
                if self.pause_started.is_none() {
                    self.pause_started = Some(now);
                }
            }
            SessionState::Recording => {
                self.settle(now);
                if self.elapsed_millis > 1_000 {
                    let hours = self.elapsed_millis as f64 / 3_600_000.0;
                    if hours > 0.0 {
                        self.avg_speed_kmh = (self.distance_meters / 1_000.0) / hours;
                    }
                }
            }
            _ => {}
        }
    }

    /// Closes any open pause interval and recomputes elapsed time as of
    /// `now`. Elapsed time excludes everything spent paused.
    fn settle(&mut self, now: Instant) {
        if let Some(pause_started) = self.pause_started.take() {
            self.paused_millis += (now - pause_started).as_millis() as i64;
        }
        if let Some(started_at) = self.started_at {
            self.elapsed_millis = (now - started_at).as_millis() as i64 - self.paused_millis;
        }
    }

    fn finish(&mut self, outcome: StopOutcome) {
        self.state = SessionState::Stopped(outcome);
        self.track_id = None;
        self.last_point = None;
        self.avg_speed_kmh = 0.0;
        self.points.clear();
        self.waypoints.clear();
        self.pending_final = None;
    }
}

struct SessionInner<L, S> {
    provider: L,
    store: Arc<S>,
    config: Config,
    core: Mutex<SessionCore>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<L, S> SessionInner<L, S> {
    fn core(&self) -> MutexGuard<'_, SessionCore> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<L: LocationProvider, S: RouteStore> SessionInner<L, S> {
    /// Applies one fix: persist, append, extend the running distance. Skips
    /// silently when the session stopped while the provider call was in
    /// flight, and drops the sample when persistence fails (the next tick
    /// writes fresh).
    fn apply_sample(&self, sample: LocationSample) {
        let mut core = self.core();
        if !core.state.is_active() {
            return;
        }
        core.last_fix = Some(sample);
        let Some(track_id) = core.track_id else {
            return;
        };
        let point = TrackPoint {
            track_id,
            position: sample.position,
            elevation: sample.elevation.unwrap_or(0.0),
            captured_at: sample.captured_at,
        };
        if let Err(err) = self.store.append_point(point.clone()) {
            tracing::warn!(%err, track_id, "point persistence failed, sample dropped");
            return;
        }
        let previous = core.last_point.as_ref().map(|p| p.position);
        if let Some(previous) = previous {
            core.distance_meters += distance::distance_meters(previous, point.position);
        }
        core.points.push(point.clone());
        core.last_point = Some(point);
    }
}

/// The recording state machine for one session.
///
/// `start` spawns two periodic activities: a 1-second timer tick for elapsed
/// time and average speed, and a 10-second sampling tick that asks the
/// location provider for a fix and turns it into a track point. Both run
/// until `stop`, which cancels them together before buffers are cleared.
/// Must be driven from within a Tokio runtime.
pub struct RecordingSession<L, S> {
    inner: Arc<SessionInner<L, S>>,
}

impl<L: LocationProvider, S: RouteStore> RecordingSession<L, S> {
    pub fn new(provider: L, store: Arc<S>, config: Config) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                provider,
                store,
                config,
                core: Mutex::new(SessionCore::new()),
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Allocates a fresh track and begins recording. Calling `start` while
    /// already recording or paused is a no-op returning the existing track
    /// id. A stopped session is terminal and refuses to restart.
    pub fn start(&self, activity_kind: &str) -> Result<TrackId, SessionError> {
        let track_id = {
            let mut core = self.inner.core();
            if core.state.is_active() {
                return Ok(core.track_id.unwrap_or(UNBOUND_ID));
            }
            if let SessionState::Stopped(_) = core.state {
                return Err(SessionError::SessionFinished);
            }
            let name = format!("Track {}", Utc::now().timestamp_millis());
            let track_id = self.inner.store.create_track(&name, activity_kind)?;
            core.begin(track_id, Instant::now());
            tracing::info!(track_id, activity_kind, "recording started");
            track_id
        };
        self.spawn_ticks();
        Ok(track_id)
    }

    fn spawn_ticks(&self) {
        let timer = {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                let mut tick = interval(inner.config.timer_tick);
                tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    tick.tick().await;
                    inner.core().timer_tick(Instant::now());
                }
            })
        };
        let sampler = {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                let mut tick = interval(inner.config.sample_tick);
                tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    tick.tick().await;
                    // The tick keeps running while paused; it just stops
                    // asking for fixes.
                    if inner.core().state != SessionState::Recording {
                        continue;
                    }
                    match inner.provider.current_sample().await {
                        Some(sample) => inner.apply_sample(sample),
                        None => tracing::debug!("no fix this tick, skipping"),
                    }
                }
            })
        };
        let mut tasks = self
            .inner
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        tasks.push(timer);
        tasks.push(sampler);
    }

    fn abort_ticks(&self) {
        let mut tasks = self
            .inner
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for task in tasks.drain(..) {
            task.abort();
        }
    }

    /// Flips between `Recording` and `Paused`. No-op outside an active
    /// session. The pause interval itself is accounted by the timer tick.
    pub fn toggle_pause(&self) {
        let mut core = self.inner.core();
        match core.state {
            SessionState::Recording => {
                core.state = SessionState::Paused;
                tracing::info!("recording paused");
            }
            SessionState::Paused => {
                core.state = SessionState::Recording;
                tracing::info!("recording resumed");
            }
            _ => {}
        }
    }

    /// Drops a waypoint at the last known fix. Requires an active session
    /// and at least one successful sample.
    pub fn add_waypoint(
        &self,
        description: &str,
        photo_ref: Option<&str>,
    ) -> Result<Waypoint, SessionError> {
        let mut core = self.inner.core();
        if !core.state.is_active() {
            return Err(SessionError::NotRecording);
        }
        let track_id = core.track_id.ok_or(SessionError::NotRecording)?;
        let fix = core.last_fix.ok_or(SessionError::NoFix)?;
        let waypoint = Waypoint {
            id: UNBOUND_ID,
            track_id,
            position: fix.position,
            description: description.to_string(),
            photo_ref: photo_ref.map(str::to_string),
        };
        let id = self.inner.store.append_waypoint(waypoint.clone())?;
        let waypoint = Waypoint { id, ..waypoint };
        core.waypoints.push(waypoint.clone());
        Ok(waypoint)
    }

    /// Ends the session. With `save`, the final metrics are written in one
    /// update and the saved track is returned; otherwise the track and
    /// everything under it is deleted. Both periodic activities are
    /// cancelled before buffers are touched, so an in-flight sample cannot
    /// land in cleared state. A failed finalize is returned to the caller
    /// with the session state and buffers intact; nothing is silently
    /// discarded, and a retried `stop` writes the same metrics that were
    /// frozen on the first attempt.
    pub fn stop(&self, save: bool) -> Result<Option<Track>, SessionError> {
        let mut core = self.inner.core();
        if !core.state.is_active() {
            return Ok(None);
        }
        let track_id = core.track_id.ok_or(SessionError::NotRecording)?;
        // Freeze the final triple while tick bookkeeping is still live.
        // Once the ticks are aborted nobody accounts pause intervals, so a
        // retry must not settle against the clock again.
        let metrics = match core.pending_final {
            Some(metrics) => metrics,
            None => {
                core.settle(Instant::now());
                let metrics = FinalMetrics {
                    distance_meters: core.distance_meters,
                    elapsed_millis: core.elapsed_millis,
                    avg_speed_kmh: core.avg_speed_kmh,
                };
                core.pending_final = Some(metrics);
                metrics
            }
        };
        self.abort_ticks();
        if save {
            self.inner.store.finalize_track_metrics(
                track_id,
                metrics.distance_meters,
                metrics.elapsed_millis,
                metrics.avg_speed_kmh,
            )?;
            let track = self.inner.store.track(track_id);
            core.finish(StopOutcome::Saved);
            tracing::info!(track_id, "recording saved");
            Ok(track)
        } else {
            self.inner.store.delete_track(track_id)?;
            core.finish(StopOutcome::Discarded);
            tracing::info!(track_id, "recording discarded");
            Ok(None)
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let core = self.inner.core();
        SessionSnapshot {
            state: core.state,
            track_id: core.track_id,
            elapsed_millis: core.elapsed_millis,
            distance_meters: core.distance_meters,
            avg_speed_kmh: core.avg_speed_kmh,
        }
    }

    /// Points buffered so far by this session, in capture order.
    pub fn points(&self) -> Vec<TrackPoint> {
        self.inner.core().points.clone()
    }

    pub fn waypoints(&self) -> Vec<Waypoint> {
        self.inner.core().waypoints.clone()
    }

    pub fn last_fix(&self) -> Option<LocationSample> {
        self.inner.core().last_fix
    }
}

impl<L, S> Drop for RecordingSession<L, S> {
    fn drop(&mut self) {
        let mut tasks = self
            .inner
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for task in tasks.drain(..) {
            task.abort();
        }
    }
}
