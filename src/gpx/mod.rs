mod reader;
mod writer;

pub use reader::{parse, GpxDocument};
pub use writer::serialize;

pub(crate) const GPX_NAMESPACE: &str = "http://www.topografix.com/GPX/1/1";
pub(crate) const GPX_VERSION: &str = "1.1";
pub(crate) const GPX_CREATOR: &str = "trackrec-rs";

/// Timestamp layout used inside `<time>` elements: ISO-8601 UTC, whole
/// seconds.
pub(crate) const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
