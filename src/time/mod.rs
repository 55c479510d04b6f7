//! Engine timebase
//!
//! All temporal logic runs against host-supplied timestamps rather than
//! wall-clock reads, so every timing property is reproducible under test.

pub mod deadline;
pub mod instant;

pub use deadline::Deadline;
pub use instant::{Duration, Timestamp};
