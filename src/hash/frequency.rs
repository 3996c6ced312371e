//! DCT-based perceptual hash.

use image::GrayImage;
use image::imageops::{self, FilterType};

use crate::config::{HashConfig, ResizeMode};
use crate::error::Result;
use crate::hash::dct::Dct2d;
use crate::hash::fingerprint::Fingerprint;
use crate::pixels::{ImageData, LumaImage};
use crate::stats::median;

/// Computes frequency-domain fingerprints under one configuration.
///
/// The hasher holds only immutable state (the configuration and a cosine
/// table), so a single instance can be shared across rayon workers.
///
/// # Example
///
/// ```
/// use phash_eval::{FrequencyHasher, HashConfig, LumaImage, ResizeMode};
///
/// let hasher = FrequencyHasher::new(HashConfig::new(8, 4, ResizeMode::Stretch))?;
/// let image = LumaImage::from_fn(64, 48, |x, y| ((x * 7 + y * 3) % 256) as u8)?;
/// let fingerprint = hasher.hash(&image)?;
/// assert_eq!(fingerprint.size(), 8);
/// assert_eq!(fingerprint.to_token().len(), 16);
/// # Ok::<(), phash_eval::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct FrequencyHasher {
    config: HashConfig,
    dct: Dct2d,
}

impl FrequencyHasher {
    /// Create a hasher. Fails if `hash_size` or `high_freq_factor` is zero.
    pub fn new(config: HashConfig) -> Result<Self> {
        config.check_positive()?;
        Ok(Self {
            config,
            dct: Dct2d::new(config.working_size()),
        })
    }

    /// Configuration this hasher was built with.
    #[must_use]
    pub fn config(&self) -> &HashConfig {
        &self.config
    }

    /// Hash decoded image data, converting it to luma first.
    pub fn hash_image(&self, image: &ImageData, source_id: &str) -> Result<Fingerprint> {
        self.hash(&image.to_luma(source_id)?)
    }

    /// Hash a single-channel image.
    pub fn hash(&self, image: &LumaImage) -> Result<Fingerprint> {
        let hash_size = self.config.hash_size;
        let grid = self.working_grid(image);
        let low = self.dct.low_frequencies(&grid, hash_size);
        let threshold = median(&low);
        Fingerprint::from_bits(hash_size, low.iter().map(|&c| c > threshold))
    }

    /// Resize to the square working size according to the resize mode.
    fn working_grid(&self, image: &LumaImage) -> Vec<f64> {
        let side = self.config.working_size() as u32;
        let source = image.to_gray_image();
        let square = match self.config.resize_mode {
            ResizeMode::Stretch => imageops::resize(&source, side, side, FilterType::Lanczos3),
            ResizeMode::Fit => {
                let (w, h) = fit_size(side, source.width(), source.height());
                let scaled = imageops::resize(&source, w, h, FilterType::Lanczos3);
                let mut canvas = GrayImage::new(side, side);
                imageops::replace(&mut canvas, &scaled, 0, 0);
                canvas
            }
        };
        square.as_raw().iter().map(|&v| f64::from(v)).collect()
    }
}

/// Dimensions that make the larger side equal `side`, truncating the other.
pub(crate) fn fit_size(side: u32, width: u32, height: u32) -> (u32, u32) {
    if width > height {
        let scaled = (u64::from(height) * u64::from(side) / u64::from(width)) as u32;
        (side, scaled.max(1))
    } else {
        let scaled = (u64::from(width) * u64::from(side) / u64::from(height)) as u32;
        (scaled.max(1), side)
    }
}
