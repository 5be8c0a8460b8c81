//! Signature isolation pipeline
//!
//! A coarse pass finds the most prominent dark mark on the page, a fine pass
//! isolates its ink strokes and turns them into an alpha mask.

pub mod pipeline;
pub mod steps;

pub use pipeline::{Extraction, SignatureExtractor, StepTiming};
