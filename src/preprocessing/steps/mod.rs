//! Individual image operations used by the extraction pipeline

pub mod alpha;
pub mod background;
pub mod clahe;
pub mod grayscale;
pub mod morphology;
pub mod resize;
pub mod threshold;
