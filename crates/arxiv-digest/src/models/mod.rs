//! Data models shared across the pipeline.
//!
//! `PaperRecord` is validated at construction; the other types are transient
//! values produced while batching and annotating.

mod batch;
mod citation;
mod paper;

pub use batch::{Batch, BatchOutcome};
pub use citation::Citation;
pub use paper::PaperRecord;
