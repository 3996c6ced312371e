//! Segment-based hashing that tolerates cropping.
//!
//! The image is split into bright and dark connected regions on a small
//! blurred copy; each sufficiently large region is cropped from the source by
//! its bounding box and hashed on its own. Two images are compared by how many
//! of their regions find a close partner in the other image.

use std::collections::VecDeque;

use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};

use crate::config::HashConfig;
use crate::error::{Error, Result};
use crate::hash::fingerprint::Fingerprint;
use crate::hash::frequency::FrequencyHasher;
use crate::pixels::LumaImage;

/// Default fraction of differing bits under which two regions still match.
pub const DEFAULT_BIT_ERROR_RATE: f64 = 0.25;

/// Parameters of the segmentation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropResistantConfig {
    /// Per-region hasher parameters.
    pub hash: HashConfig,
    /// Side of the square image segmentation runs on.
    pub segmentation_size: u32,
    /// Samples above this are "bright", the rest "dark".
    pub segment_threshold: u8,
    /// Smallest region, in segmentation pixels, that gets hashed.
    pub min_segment_size: usize,
    /// Keep only this many of the largest regions.
    pub limit_segments: Option<usize>,
    /// Gaussian blur applied before thresholding.
    pub blur_sigma: f32,
}

impl Default for CropResistantConfig {
    fn default() -> Self {
        Self {
            hash: HashConfig::default(),
            segmentation_size: 300,
            segment_threshold: 128,
            min_segment_size: 1024,
            limit_segments: None,
            blur_sigma: 2.0,
        }
    }
}

/// Bounding box and pixel count of one connected region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    pixels: usize,
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
}

/// Fingerprints of the regions of one image, largest region first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionHash {
    regions: Vec<Fingerprint>,
}

/// Outcome of comparing two region hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegionMatch {
    /// Regions of the left hash with a partner within the cutoff.
    pub matches: usize,
    /// Sum of the partner distances of matching regions.
    pub distance_sum: u32,
}

impl RegionHash {
    /// Wrap precomputed region fingerprints.
    pub fn new(regions: Vec<Fingerprint>) -> Result<Self> {
        let Some(first) = regions.first() else {
            return Err(Error::EmptySet("region hash has no regions".to_string()));
        };
        let bit_len = first.bit_len();
        if let Some(other) = regions.iter().find(|r| r.bit_len() != bit_len) {
            return Err(Error::SizeMismatch {
                expected: bit_len,
                actual: other.bit_len(),
            });
        }
        Ok(Self { regions })
    }

    /// Region fingerprints.
    #[must_use]
    pub fn regions(&self) -> &[Fingerprint] {
        &self.regions
    }

    /// Number of regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Always false; a region hash holds at least one region.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// For each own region, find the closest region of `other`; count those
    /// within `bit_error_rate * bit_len` differing bits.
    pub fn diff(&self, other: &Self, bit_error_rate: f64) -> Result<RegionMatch> {
        let cutoff = self.regions[0].bit_len() as f64 * bit_error_rate;
        let mut result = RegionMatch::default();
        for region in &self.regions {
            let mut lowest = u32::MAX;
            for candidate in &other.regions {
                lowest = lowest.min(region.hamming(candidate)?);
            }
            if f64::from(lowest) <= cutoff {
                result.matches += 1;
                result.distance_sum += lowest;
            }
        }
        Ok(result)
    }

    /// Whether at least `region_cutoff` regions match at the default error rate.
    pub fn matches(&self, other: &Self, region_cutoff: usize) -> Result<bool> {
        Ok(self.diff(other, DEFAULT_BIT_ERROR_RATE)?.matches >= region_cutoff)
    }
}

/// Hashes images region by region.
#[derive(Debug, Clone)]
pub struct CropResistantHasher {
    config: CropResistantConfig,
    hasher: FrequencyHasher,
}

impl CropResistantHasher {
    /// Create a hasher for the given configuration.
    pub fn new(config: CropResistantConfig) -> Result<Self> {
        if config.segmentation_size == 0 {
            return Err(Error::InvalidConfig(
                "segmentation_size must be positive".to_string(),
            ));
        }
        let hasher = FrequencyHasher::new(config.hash)?;
        Ok(Self { config, hasher })
    }

    /// Segment `image` and hash every region.
    pub fn hash(&self, image: &LumaImage) -> Result<RegionHash> {
        let mut segments = self.find_segments(image);
        segments.sort_by(|a, b| b.pixels.cmp(&a.pixels));
        if let Some(limit) = self.config.limit_segments {
            segments.truncate(limit);
        }

        if segments.is_empty() {
            return RegionHash::new(vec![self.hasher.hash(image)?]);
        }

        let size = self.config.segmentation_size as f64;
        let scale_x = image.width() as f64 / size;
        let scale_y = image.height() as f64 / size;
        let regions = segments
            .iter()
            .map(|s| {
                let x0 = (s.min_x as f64 * scale_x).floor() as usize;
                let y0 = (s.min_y as f64 * scale_y).floor() as usize;
                let x1 = ((s.max_x + 1) as f64 * scale_x).ceil() as usize;
                let y1 = ((s.max_y + 1) as f64 * scale_y).ceil() as usize;
                let crop = image.crop(x0, y0, (x1 - x0).max(1), (y1 - y0).max(1))?;
                self.hasher.hash(&crop)
            })
            .collect::<Result<Vec<_>>>()?;
        RegionHash::new(regions)
    }

    fn find_segments(&self, image: &LumaImage) -> Vec<Segment> {
        let side = self.config.segmentation_size;
        let small = imageops::resize(&image.to_gray_image(), side, side, FilterType::Lanczos3);
        let small = imageops::blur(&small, self.config.blur_sigma);

        let n = side as usize;
        let bright: Vec<bool> = small
            .as_raw()
            .iter()
            .map(|&v| v > self.config.segment_threshold)
            .collect();

        let mut assigned = vec![false; n * n];
        let mut segments = Vec::new();
        let mut queue = VecDeque::new();
        for start in 0..n * n {
            if assigned[start] {
                continue;
            }
            let class = bright[start];
            assigned[start] = true;
            queue.push_back(start);
            let mut seg = Segment {
                pixels: 0,
                min_x: usize::MAX,
                min_y: usize::MAX,
                max_x: 0,
                max_y: 0,
            };
            while let Some(i) = queue.pop_front() {
                let (x, y) = (i % n, i / n);
                seg.pixels += 1;
                seg.min_x = seg.min_x.min(x);
                seg.min_y = seg.min_y.min(y);
                seg.max_x = seg.max_x.max(x);
                seg.max_y = seg.max_y.max(y);

                let mut visit = |j: usize| {
                    if !assigned[j] && bright[j] == class {
                        assigned[j] = true;
                        queue.push_back(j);
                    }
                };
                if x > 0 {
                    visit(i - 1);
                }
                if x + 1 < n {
                    visit(i + 1);
                }
                if y > 0 {
                    visit(i - n);
                }
                if y + 1 < n {
                    visit(i + n);
                }
            }
            if seg.pixels >= self.config.min_segment_size {
                segments.push(seg);
            }
        }
        segments
    }
}
