use crate::config::ExtractorConfig;
use crate::error::ExtractError;
use crate::geometry::{self, BoundingBox};
use image::{imageops, DynamicImage, RgbaImage};
use serde::Serialize;
use std::time::Instant;

use super::steps;

/// Timing information for a single pipeline stage
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Isolated signature plus where it was found
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    /// Black ink on transparent background, at the configured output size
    #[serde(skip)]
    pub image: RgbaImage,
    /// Region around the largest dark blob, in page coordinates
    pub coarse_region: BoundingBox,
    /// Padded union of the ink strokes, in page coordinates
    pub ink_region: BoundingBox,
    /// Total processing time in milliseconds
    pub total_time_ms: u64,
    /// Individual stage timings
    pub steps: Vec<StepTiming>,
}

/// Two-pass signature isolation: locate the largest dark mark, then trace
/// its strokes with locally adaptive thresholds and export them as alpha
#[derive(Debug, Clone)]
pub struct SignatureExtractor {
    config: ExtractorConfig,
}

impl SignatureExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self, ExtractError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Run the full pipeline on a decoded page
    pub fn extract(&self, image: &DynamicImage) -> Result<Extraction, ExtractError> {
        let start = Instant::now();
        let mut timings = Vec::new();
        let cfg = &self.config;

        if image.width() == 0 || image.height() == 0 {
            return Err(ExtractError::DecodeError("image is empty".to_string()));
        }

        let mut page = image.to_rgb8();
        if cfg.correct_background {
            page = run_step("background", &mut timings, || {
                Ok(steps::background::apply(
                    &page,
                    cfg.background_kernel,
                    cfg.background_median,
                ))
            })?;
        }
        let (page_w, page_h) = page.dimensions();

        // Coarse pass: merge strokes into blobs and keep the biggest one
        let blobs = run_step("coarse_mask", &mut timings, || {
            let gray = steps::grayscale::apply(&page);
            let mask = steps::threshold::binary_inverted(&gray, cfg.coarse_threshold);
            Ok(steps::morphology::dilate(
                &mask,
                cfg.dilate_kernel,
                cfg.dilate_iterations,
            ))
        })?;

        let coarse_region = run_step("locate", &mut timings, || {
            let contours = geometry::external_contours(&blobs);
            let blob = geometry::largest(&contours).ok_or(ExtractError::NoSignatureFound)?;
            tracing::debug!(
                "Largest of {} blobs: area {:.0} at {:?}",
                contours.len(),
                blob.area,
                blob.bounds
            );
            Ok(blob.bounds.expand_clamped(cfg.coarse_padding, page_w, page_h))
        })?;

        let crop = imageops::crop_imm(
            &page,
            coarse_region.x,
            coarse_region.y,
            coarse_region.width,
            coarse_region.height,
        )
        .to_image();

        // Fine pass: trace the strokes inside the crop
        let enhanced = run_step("clahe", &mut timings, || {
            let gray = steps::grayscale::apply(&crop);
            Ok(steps::clahe::apply(
                &gray,
                cfg.clahe_clip_limit,
                cfg.clahe_tiles,
            ))
        })?;

        let cleaned = run_step("fine_mask", &mut timings, || {
            let binary = steps::threshold::adaptive_gaussian_inverted(
                &enhanced,
                cfg.adaptive_block_size,
                cfg.adaptive_c,
            );
            Ok(steps::morphology::open(
                &binary,
                cfg.open_kernel,
                cfg.open_iterations,
            ))
        })?;

        let tight = run_step("trace", &mut timings, || {
            let contours = geometry::external_contours(&cleaned);
            let total = contours.len();
            let valid: Vec<_> = contours
                .into_iter()
                .filter(|c| c.area > cfg.min_contour_area)
                .collect();
            tracing::debug!("{} of {} ink contours kept", valid.len(), total);

            let ink = geometry::union_bounds(&valid).ok_or(ExtractError::NoValidInkFound)?;
            Ok(ink.pad_clamped(cfg.fine_padding, cleaned.width(), cleaned.height()))
        })?;

        let image = run_step("compose", &mut timings, || {
            let mask = imageops::crop_imm(&cleaned, tight.x, tight.y, tight.width, tight.height)
                .to_image();
            let rgba = steps::alpha::from_mask(&mask);
            Ok(steps::resize::apply(
                &rgba,
                cfg.output_size,
                cfg.upscale_filter,
            ))
        })?;

        let ink_region = tight.translate(coarse_region.x, coarse_region.y);
        tracing::debug!(
            "Coarse region {:?}, ink region {:?}",
            coarse_region,
            ink_region
        );

        Ok(Extraction {
            image,
            coarse_region,
            ink_region,
            total_time_ms: start.elapsed().as_millis() as u64,
            steps: timings,
        })
    }
}

fn run_step<T, F>(name: &str, timings: &mut Vec<StepTiming>, step_fn: F) -> Result<T, ExtractError>
where
    F: FnOnce() -> Result<T, ExtractError>,
{
    let step_start = Instant::now();
    let result = step_fn()?;
    timings.push(StepTiming {
        name: name.to_string(),
        time_ms: step_start.elapsed().as_millis() as u64,
    });
    Ok(result)
}
