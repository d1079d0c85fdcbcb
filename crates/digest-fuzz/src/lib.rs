//! Fuzzing library for arxiv-digest.
//!
//! Targets exercise the text passes that run over untrusted LLM output and the
//! decoding of cached paper lists.
//!
//! # Usage
//!
//! ```bash
//! cd crates/digest-fuzz
//! cargo +nightly fuzz run fuzz_annotate -- -max_total_time=60
//! ```

pub use arxiv_digest::{models, text};
