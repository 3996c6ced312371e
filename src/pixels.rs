//! Decoded image input.
//!
//! The hasher works on single-channel samples. Callers hand over whatever
//! their decoder produced as [`ImageData`]; conversion to [`LumaImage`] happens
//! once, before hashing.

use image::GrayImage;
use imgref::ImgVec;
use rgb::{RGB8, RGBA8};

use crate::error::{Error, Result};

/// Image data accepted by the hasher and the evaluation session.
///
/// Supports both `imgref::ImgVec` types and raw slices for flexibility.
#[derive(Debug, Clone)]
pub enum ImageData {
    /// 8-bit luma image using imgref.
    Luma(ImgVec<u8>),

    /// RGB8 image using imgref.
    Rgb8(ImgVec<RGB8>),

    /// RGBA8 image using imgref. Alpha is ignored.
    Rgba8(ImgVec<RGBA8>),

    /// 8-bit luma raw slice with dimensions.
    LumaSlice {
        /// Samples in row-major order.
        data: Vec<u8>,
        /// Image width.
        width: usize,
        /// Image height.
        height: usize,
    },
}

impl ImageData {
    /// Get image width.
    #[must_use]
    pub fn width(&self) -> usize {
        match self {
            Self::Luma(img) => img.width(),
            Self::Rgb8(img) => img.width(),
            Self::Rgba8(img) => img.width(),
            Self::LumaSlice { width, .. } => *width,
        }
    }

    /// Get image height.
    #[must_use]
    pub fn height(&self) -> usize {
        match self {
            Self::Luma(img) => img.height(),
            Self::Rgb8(img) => img.height(),
            Self::Rgba8(img) => img.height(),
            Self::LumaSlice { height, .. } => *height,
        }
    }

    /// Convert to a single-channel image.
    ///
    /// `source_id` only labels the error when the data is malformed.
    pub fn to_luma(&self, source_id: &str) -> Result<LumaImage> {
        let (width, height) = (self.width(), self.height());
        let samples = match self {
            Self::Luma(img) => img.pixels().collect(),
            Self::Rgb8(img) => img.pixels().map(|p| luma(p.r, p.g, p.b)).collect(),
            Self::Rgba8(img) => img.pixels().map(|p| luma(p.r, p.g, p.b)).collect(),
            Self::LumaSlice { data, .. } => data.clone(),
        };
        LumaImage::new(width, height, samples).map_err(|e| match e {
            Error::ImageRead { reason, .. } => Error::image_read(source_id, reason),
            other => other,
        })
    }
}

/// ITU-R 601-2 luma transform with integer weights, rounded to nearest.
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let l = (u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114 + 500) / 1000;
    l as u8
}

/// Single-channel 8-bit image, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumaImage {
    width: usize,
    height: usize,
    samples: Vec<u8>,
}

impl LumaImage {
    /// Create an image, checking that the sample count matches the dimensions.
    pub fn new(width: usize, height: usize, samples: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::image_read(
                "<memory>",
                format!("empty image ({width}x{height})"),
            ));
        }
        if samples.len() != width * height {
            return Err(Error::image_read(
                "<memory>",
                format!(
                    "expected {} samples for {width}x{height}, got {}",
                    width * height,
                    samples.len()
                ),
            ));
        }
        u32::try_from(width.max(height)).map_err(|_| {
            Error::image_read("<memory>", format!("dimensions too large: {width}x{height}"))
        })?;
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Create an image filled by a function of `(x, y)`.
    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> u8) -> Result<Self> {
        let samples = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Self::new(width, height, samples)
    }

    /// Image width.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Samples in row-major order.
    #[must_use]
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Sample at `(x, y)`.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.samples[y * self.width + x]
    }

    /// Copy of the rectangle starting at `(x, y)`; clamped to the image.
    pub fn crop(&self, x: usize, y: usize, width: usize, height: usize) -> Result<Self> {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        let width = width.min(self.width - x);
        let height = height.min(self.height - y);
        let mut samples = Vec::with_capacity(width * height);
        for row in y..y + height {
            let start = row * self.width + x;
            samples.extend_from_slice(&self.samples[start..start + width]);
        }
        Self::new(width, height, samples)
    }

    pub(crate) fn to_gray_image(&self) -> GrayImage {
        // Dimensions were checked to fit u32 and to match the sample count.
        GrayImage::from_raw(self.width as u32, self.height as u32, self.samples.clone())
            .unwrap_or_else(|| GrayImage::new(self.width as u32, self.height as u32))
    }

    pub(crate) fn from_gray_image(img: &GrayImage) -> Result<Self> {
        Self::new(
            img.width() as usize,
            img.height() as usize,
            img.as_raw().clone(),
        )
    }
}

impl From<LumaImage> for ImageData {
    fn from(img: LumaImage) -> Self {
        Self::LumaSlice {
            data: img.samples,
            width: img.width,
            height: img.height,
        }
    }
}
