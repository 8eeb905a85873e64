//! Track recording core: a session state machine that turns periodic
//! location fixes into a distance/duration/average-speed track, a route
//! store for the recorded data, and a GPX 1.1 codec that round-trips it.

pub mod config;
pub mod distance;
pub mod error;
pub mod exchange;
pub mod gpx;
pub mod session;
pub mod store;
pub mod types;

pub use config::Config;
pub use error::{ExchangeError, GpxError, SessionError, StoreError};
pub use session::{LocationProvider, RecordingSession, SessionSnapshot};
pub use store::{MemoryStore, RouteStore};
pub use types::track::{
    GeoPoint, LocationSample, SessionState, StopOutcome, Track, TrackId, TrackPoint, Waypoint,
    WaypointId,
};
