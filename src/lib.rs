//! Signature extraction from scanned documents
//!
//! Finds the most prominent dark mark on a page, isolates its ink strokes and
//! exports them as black-on-transparent RGBA, ready to overlay elsewhere.

pub mod batch;
pub mod config;
pub mod error;
pub mod geometry;
pub mod preprocessing;

pub use batch::{BatchOptions, BatchReport, FileOutcome};
pub use config::{ExtractorConfig, Size, UpscaleFilter};
pub use error::ExtractError;
pub use preprocessing::{Extraction, SignatureExtractor};
