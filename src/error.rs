use crate::types::track::TrackId;

#[derive(Debug, thiserror::Error)]
pub enum GpxError {
    #[error("Invalid GPX: {0}")]
    InvalidDocument(String),
    #[error("Track point missing required attribute `{0}`")]
    MissingAttribute(&'static str),
    #[error("Write failed: {0}")]
    WriteFailed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),
    #[error("Waypoint not found: {0}")]
    WaypointNotFound(i64),
    #[error("Store rejected write: {0}")]
    WriteRejected(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("No recording in progress")]
    NotRecording,
    #[error("Session already stopped; start a new one")]
    SessionFinished,
    #[error("No location fix available yet")]
    NoFix,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error(transparent)]
    Gpx(#[from] GpxError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Track has no points to export: {0}")]
    EmptyTrack(TrackId),
}
