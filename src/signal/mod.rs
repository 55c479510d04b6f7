//! Signal intake
//!
//! Normalizes raw host events into timestamped samples, rate-limits the
//! continuous streams, and fans accepted samples out to the detectors.

pub mod sampler;
pub mod types;
pub mod window;

pub use sampler::{Sampler, SamplerStats};
pub use types::{RawEvent, Sample, SampleKind, SamplePayload, TargetId, TargetInfo, TargetRegion};
pub use window::SlidingWindow;
