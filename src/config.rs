use crate::error::ExtractError;
use crate::preprocessing::steps::morphology::MAX_KERNEL_SIDE;
use image::imageops::FilterType;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Width and height pair, written as `WxH` on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl FromStr for Size {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .to_lowercase()
            .split_once('x')
            .map(|(w, h)| (w.trim().to_string(), h.trim().to_string()))
            .ok_or_else(|| format!("expected WxH, got '{}'", s))?;
        let width = w
            .parse()
            .map_err(|e| format!("invalid width '{}': {}", w, e))?;
        let height = h
            .parse()
            .map_err(|e| format!("invalid height '{}': {}", h, e))?;
        Ok(Self { width, height })
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Filter used when the tight crop has to be enlarged to reach the output size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum UpscaleFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Lanczos3,
}

impl From<UpscaleFilter> for FilterType {
    fn from(filter: UpscaleFilter) -> Self {
        match filter {
            UpscaleFilter::Nearest => FilterType::Nearest,
            UpscaleFilter::Triangle => FilterType::Triangle,
            UpscaleFilter::CatmullRom => FilterType::CatmullRom,
            UpscaleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Extraction parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractorConfig {
    /// Global cutoff for locating the signature; darker pixels are ink
    pub coarse_threshold: u8,
    pub dilate_kernel: Size,
    pub dilate_iterations: u32,
    /// Margin kept around the largest blob before the fine pass
    pub coarse_padding: u32,
    pub clahe_clip_limit: f32,
    pub clahe_tiles: Size,
    /// Neighbourhood size of the adaptive threshold (odd)
    pub adaptive_block_size: u32,
    /// Offset subtracted from the local mean
    pub adaptive_c: i32,
    pub open_kernel: Size,
    pub open_iterations: u32,
    /// Contours with an area at or below this are discarded as speckle
    pub min_contour_area: f64,
    /// Margin kept around the union of ink contours
    pub fine_padding: u32,
    pub output_size: Size,
    pub upscale_filter: UpscaleFilter,
    /// Flatten uneven illumination before the coarse pass
    pub correct_background: bool,
    pub background_kernel: Size,
    pub background_median: u32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            coarse_threshold: 150,
            dilate_kernel: Size::new(3, 3),
            dilate_iterations: 1,
            coarse_padding: 100,
            clahe_clip_limit: 2.0,
            clahe_tiles: Size::new(8, 8),
            adaptive_block_size: 15,
            adaptive_c: 6,
            open_kernel: Size::new(2, 2),
            open_iterations: 1,
            min_contour_area: 100.0,
            fine_padding: 20,
            output_size: Size::new(300, 100),
            upscale_filter: UpscaleFilter::Triangle,
            correct_background: false,
            background_kernel: Size::new(7, 7),
            background_median: 23,
        }
    }
}

impl ExtractorConfig {
    pub fn validate(&self) -> Result<(), ExtractError> {
        let sizes = [
            ("dilate kernel", self.dilate_kernel),
            ("open kernel", self.open_kernel),
            ("CLAHE tile grid", self.clahe_tiles),
            ("output size", self.output_size),
            ("background kernel", self.background_kernel),
        ];
        for (name, size) in sizes {
            if size.is_empty() {
                return Err(ExtractError::InvalidConfig(format!(
                    "{} must be non-empty, got {}",
                    name, size
                )));
            }
        }

        let elements = [
            ("dilate kernel", self.dilate_kernel),
            ("open kernel", self.open_kernel),
            ("background kernel", self.background_kernel),
        ];
        for (name, size) in elements {
            if size.width > MAX_KERNEL_SIDE || size.height > MAX_KERNEL_SIDE {
                return Err(ExtractError::InvalidConfig(format!(
                    "{} sides must not exceed {}, got {}",
                    name, MAX_KERNEL_SIDE, size
                )));
            }
        }

        if self.dilate_iterations == 0 || self.open_iterations == 0 {
            return Err(ExtractError::InvalidConfig(
                "morphology iterations must be at least 1".to_string(),
            ));
        }

        if self.adaptive_block_size < 3 || self.adaptive_block_size % 2 == 0 {
            return Err(ExtractError::InvalidConfig(format!(
                "adaptive block size must be odd and >= 3, got {}",
                self.adaptive_block_size
            )));
        }

        if self.background_median == 0 || self.background_median % 2 == 0 {
            return Err(ExtractError::InvalidConfig(format!(
                "background median size must be odd, got {}",
                self.background_median
            )));
        }

        if !self.clahe_clip_limit.is_finite() || self.clahe_clip_limit < 0.0 {
            return Err(ExtractError::InvalidConfig(format!(
                "CLAHE clip limit must be a non-negative number, got {}",
                self.clahe_clip_limit
            )));
        }

        if !self.min_contour_area.is_finite() || self.min_contour_area < 0.0 {
            return Err(ExtractError::InvalidConfig(format!(
                "minimum contour area must be a non-negative number, got {}",
                self.min_contour_area
            )));
        }

        Ok(())
    }
}

/// Tuning flags shared by every subcommand
#[derive(clap::Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Global threshold used to locate the signature
    #[arg(long, env = "SIGNATURE_COARSE_THRESHOLD", default_value = "150")]
    pub coarse_threshold: u8,

    /// Structuring element merging nearby strokes (WxH)
    #[arg(long, default_value = "3x3")]
    pub dilate_kernel: Size,

    #[arg(long, default_value = "1")]
    pub dilate_iterations: u32,

    /// Padding around the located blob, in pixels
    #[arg(long, default_value = "100")]
    pub coarse_padding: u32,

    #[arg(long, default_value = "2.0")]
    pub clahe_clip_limit: f32,

    /// CLAHE tile grid (WxH)
    #[arg(long, default_value = "8x8")]
    pub clahe_tiles: Size,

    /// Adaptive threshold neighbourhood (odd)
    #[arg(long, default_value = "15")]
    pub adaptive_block_size: u32,

    /// Adaptive threshold offset
    #[arg(long, default_value = "6", allow_negative_numbers = true)]
    pub adaptive_c: i32,

    /// Structuring element for speckle removal (WxH)
    #[arg(long, default_value = "2x2")]
    pub open_kernel: Size,

    #[arg(long, default_value = "1")]
    pub open_iterations: u32,

    /// Minimum ink contour area in square pixels
    #[arg(long, default_value = "100")]
    pub min_contour_area: f64,

    /// Padding around the ink, in pixels
    #[arg(long, default_value = "20")]
    pub fine_padding: u32,

    /// Output raster size (WxH)
    #[arg(long, env = "SIGNATURE_OUTPUT_SIZE", default_value = "300x100")]
    pub output_size: Size,

    /// Filter used when the crop is smaller than the output size
    #[arg(long, value_enum, default_value_t = UpscaleFilter::Triangle)]
    pub upscale_filter: UpscaleFilter,

    /// Flatten uneven page illumination first
    #[arg(long)]
    pub correct_background: bool,

    #[arg(long, default_value = "7x7")]
    pub background_kernel: Size,

    #[arg(long, default_value = "23")]
    pub background_median: u32,
}

impl From<ConfigArgs> for ExtractorConfig {
    fn from(args: ConfigArgs) -> Self {
        Self {
            coarse_threshold: args.coarse_threshold,
            dilate_kernel: args.dilate_kernel,
            dilate_iterations: args.dilate_iterations,
            coarse_padding: args.coarse_padding,
            clahe_clip_limit: args.clahe_clip_limit,
            clahe_tiles: args.clahe_tiles,
            adaptive_block_size: args.adaptive_block_size,
            adaptive_c: args.adaptive_c,
            open_kernel: args.open_kernel,
            open_iterations: args.open_iterations,
            min_contour_area: args.min_contour_area,
            fine_padding: args.fine_padding,
            output_size: args.output_size,
            upscale_filter: args.upscale_filter,
            correct_background: args.correct_background,
            background_kernel: args.background_kernel,
            background_median: args.background_median,
        }
    }
}
