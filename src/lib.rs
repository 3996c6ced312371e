//! # phash-eval
//!
//! Perceptual hash robustness and false-positive evaluation library.
//!
//! This library provides an **API-first design** where the caller supplies a
//! decode callback, and this library handles fingerprinting, baseline
//! aggregation, comparison and report generation.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use phash_eval::{EvalConfig, EvalSession, ImageSetType, SampleGroup, SampleMeta};
//!
//! let config = EvalConfig::builder()
//!     .hash_size(8)
//!     .high_freq_factor(4)
//!     .build()?;
//!
//! let session = EvalSession::new(config, Box::new(|meta| {
//!     // Your decoding logic here
//!     Ok(decoded_image)
//! }))?;
//!
//! let group = SampleGroup::partition("board1", ImageSetType::Single, samples, "res");
//! let report = session.evaluate_groups("single", &[group]);
//! let false_positives = session.false_positives(&report)?;
//! ```
//!
//! ## Modules
//!
//! - [`error`]: Error types for the library
//! - [`config`]: Hash and evaluation configuration
//! - [`pixels`]: Decoded image input and grayscale conversion
//! - [`hash`]: Fingerprints and the hashers that produce them
//! - [`baseline`]: Majority aggregation of several renderings
//! - [`distance`]: Hamming distance and validity classification
//! - [`eval`]: Evaluation session, false-positive sweep and reports
//! - [`stats`]: Summaries over report rows

pub mod baseline;
pub mod config;
pub mod distance;
pub mod error;
pub mod eval;
pub mod hash;
pub mod pixels;
pub mod stats;

// Re-export commonly used types
pub use baseline::aggregate;
pub use config::{EvalConfig, EvalConfigBuilder, HashConfig, ResizeMode, SUPPORTED_HASH_SIZES};
pub use distance::{ComparisonResult, Distance, classify, compare, distance};
pub use error::{Error, Result};
pub use eval::{
    false_positive::false_positive_sweep,
    record::{HashRecord, ImageSetType, SampleGroup, SampleMeta},
    report::{EvaluationReport, EvaluationRow, FalsePositiveRow},
    session::{DecodeFn, EvalSession},
};
pub use hash::{
    CropResistantConfig, CropResistantHasher, Fingerprint, FrequencyHasher, RegionHash, RegionMatch,
};
pub use pixels::{ImageData, LumaImage};
pub use stats::{RowSummary, Scored, summarize};
