//! Hashing and evaluation configuration.
//!
//! Configuration is an immutable value passed into every component. It can be
//! assembled with [`EvalConfig::builder`] or deserialized from JSON; both paths
//! end in [`EvalConfig::validate`], so an `EvalConfig` obtained from this
//! module is always in range.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::eval::record::ImageSetType;

/// Fingerprint side lengths the evaluation recognizes.
pub const SUPPORTED_HASH_SIZES: &[usize] = &[4, 8, 16, 32];

/// How a source image is brought to the square working size before the
/// frequency transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeMode {
    /// Scale preserving aspect ratio, pasted at the top-left of a black canvas.
    Fit,
    /// Resize directly to the square, ignoring aspect ratio.
    #[default]
    #[serde(alias = "nofit")]
    Stretch,
}

impl std::fmt::Display for ResizeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fit => write!(f, "fit"),
            Self::Stretch => write!(f, "stretch"),
        }
    }
}

impl std::str::FromStr for ResizeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fit" => Ok(Self::Fit),
            "stretch" | "nofit" => Ok(Self::Stretch),
            other => Err(Error::InvalidConfig(format!("unknown resize mode: {other}"))),
        }
    }
}

/// Parameters of the frequency hasher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashConfig {
    /// Fingerprint side length; the fingerprint has `hash_size²` bits.
    pub hash_size: usize,
    /// Oversampling multiplier applied before truncating to low frequencies.
    pub high_freq_factor: usize,
    /// Aspect-ratio handling before the transform.
    pub resize_mode: ResizeMode,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            hash_size: 8,
            high_freq_factor: 4,
            resize_mode: ResizeMode::Stretch,
        }
    }
}

impl HashConfig {
    /// Create a hash configuration.
    #[must_use]
    pub fn new(hash_size: usize, high_freq_factor: usize, resize_mode: ResizeMode) -> Self {
        Self {
            hash_size,
            high_freq_factor,
            resize_mode,
        }
    }

    /// Side of the square working image fed to the transform.
    #[must_use]
    pub fn working_size(&self) -> usize {
        self.hash_size * self.high_freq_factor
    }

    /// Number of bits in a fingerprint produced under this configuration.
    #[must_use]
    pub fn bit_len(&self) -> usize {
        self.hash_size * self.hash_size
    }

    /// Check the parameters without restricting `hash_size` to the supported set.
    pub(crate) fn check_positive(&self) -> Result<()> {
        if self.hash_size == 0 {
            return Err(Error::InvalidConfig("hash_size must be positive".to_string()));
        }
        if self.high_freq_factor == 0 {
            return Err(Error::InvalidConfig(
                "high_freq_factor must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Validate against the recognized option ranges.
    pub fn validate(&self) -> Result<()> {
        self.check_positive()?;
        if !SUPPORTED_HASH_SIZES.contains(&self.hash_size) {
            return Err(Error::InvalidConfig(format!(
                "hash_size {} not in {:?}",
                self.hash_size, SUPPORTED_HASH_SIZES
            )));
        }
        Ok(())
    }
}

/// Full evaluation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Hasher parameters.
    #[serde(flatten)]
    pub hash: HashConfig,
    /// Validity cutoff for single-image sets.
    pub ave_threshold: f64,
    /// Validity cutoff for "versions" sets.
    pub ave_threshold_versions: f64,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            hash: HashConfig::default(),
            ave_threshold: 0.9,
            ave_threshold_versions: 0.8,
        }
    }
}

impl EvalConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> EvalConfigBuilder {
        EvalConfigBuilder::default()
    }

    /// Parse and validate a JSON configuration.
    ///
    /// Missing keys take their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Validate every option.
    pub fn validate(&self) -> Result<()> {
        self.hash.validate()?;
        check_threshold("ave_threshold", self.ave_threshold)?;
        check_threshold("ave_threshold_versions", self.ave_threshold_versions)?;
        Ok(())
    }

    /// Validity threshold applicable to an image set.
    #[must_use]
    pub fn threshold_for(&self, set_type: ImageSetType) -> f64 {
        if set_type.is_versions() {
            self.ave_threshold_versions
        } else {
            self.ave_threshold
        }
    }

    /// One-line description for report headers.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "hash_size: {}, hff: {}, mode: {}, threshold: {}, threshold_versions: {}",
            self.hash.hash_size,
            self.hash.high_freq_factor,
            self.hash.resize_mode,
            self.ave_threshold,
            self.ave_threshold_versions
        )
    }
}

fn check_threshold(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "{name} must be in (0, 1), got {value}"
        )))
    }
}

/// Builder for [`EvalConfig`].
#[derive(Debug, Default)]
pub struct EvalConfigBuilder {
    hash_size: Option<usize>,
    high_freq_factor: Option<usize>,
    resize_mode: Option<ResizeMode>,
    ave_threshold: Option<f64>,
    ave_threshold_versions: Option<f64>,
}

impl EvalConfigBuilder {
    /// Set the fingerprint side length.
    #[must_use]
    pub fn hash_size(mut self, size: usize) -> Self {
        self.hash_size = Some(size);
        self
    }

    /// Set the oversampling factor.
    #[must_use]
    pub fn high_freq_factor(mut self, factor: usize) -> Self {
        self.high_freq_factor = Some(factor);
        self
    }

    /// Set the resize mode.
    #[must_use]
    pub fn resize_mode(mut self, mode: ResizeMode) -> Self {
        self.resize_mode = Some(mode);
        self
    }

    /// Set the single-image validity threshold.
    #[must_use]
    pub fn ave_threshold(mut self, threshold: f64) -> Self {
        self.ave_threshold = Some(threshold);
        self
    }

    /// Set the versions-set validity threshold.
    #[must_use]
    pub fn ave_threshold_versions(mut self, threshold: f64) -> Self {
        self.ave_threshold_versions = Some(threshold);
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<EvalConfig> {
        let defaults = EvalConfig::default();
        let config = EvalConfig {
            hash: HashConfig {
                hash_size: self.hash_size.unwrap_or(defaults.hash.hash_size),
                high_freq_factor: self
                    .high_freq_factor
                    .unwrap_or(defaults.hash.high_freq_factor),
                resize_mode: self.resize_mode.unwrap_or(defaults.hash.resize_mode),
            },
            ave_threshold: self.ave_threshold.unwrap_or(defaults.ave_threshold),
            ave_threshold_versions: self
                .ave_threshold_versions
                .unwrap_or(defaults.ave_threshold_versions),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = EvalConfig::builder().build().unwrap();
        assert_eq!(config.hash.hash_size, 8);
        assert_eq!(config.hash.high_freq_factor, 4);
        assert_eq!(config.hash.resize_mode, ResizeMode::Stretch);
        assert!((config.ave_threshold - 0.9).abs() < f64::EPSILON);
        assert!((config.ave_threshold_versions - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_builder_rejects_out_of_range() {
        assert!(EvalConfig::builder().hash_size(0).build().is_err());
        assert!(EvalConfig::builder().hash_size(12).build().is_err());
        assert!(EvalConfig::builder().high_freq_factor(0).build().is_err());
        assert!(EvalConfig::builder().ave_threshold(1.0).build().is_err());
        assert!(EvalConfig::builder().ave_threshold_versions(0.0).build().is_err());
    }

    #[test]
    fn test_resize_mode_parse() {
        assert_eq!("fit".parse::<ResizeMode>().unwrap(), ResizeMode::Fit);
        assert_eq!("Stretch".parse::<ResizeMode>().unwrap(), ResizeMode::Stretch);
        assert_eq!("nofit".parse::<ResizeMode>().unwrap(), ResizeMode::Stretch);
        assert!(matches!(
            "crop".parse::<ResizeMode>(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_json() {
        let config = EvalConfig::from_json(
            r#"{"hash_size": 16, "high_freq_factor": 6, "resize_mode": "nofit", "ave_threshold": 0.85}"#,
        )
        .unwrap();
        assert_eq!(config.hash.hash_size, 16);
        assert_eq!(config.hash.high_freq_factor, 6);
        assert_eq!(config.hash.resize_mode, ResizeMode::Stretch);
        assert!((config.ave_threshold - 0.85).abs() < f64::EPSILON);
        assert!((config.ave_threshold_versions - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        assert!(matches!(
            EvalConfig::from_json(r#"{"resize_mode": "crop"}"#),
            Err(Error::Json(_))
        ));
        assert!(matches!(
            EvalConfig::from_json(r#"{"hash_size": 7}"#),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"hash_size": 4, "resize_mode": "fit"}}"#).unwrap();
        let config = EvalConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.hash.hash_size, 4);
        assert_eq!(config.hash.resize_mode, ResizeMode::Fit);
    }

    #[test]
    fn test_threshold_for_set_type() {
        let config = EvalConfig::default();
        assert_eq!(config.threshold_for(ImageSetType::Versions), 0.8);
        assert_eq!(config.threshold_for(ImageSetType::Single), 0.9);
        assert_eq!(config.threshold_for(ImageSetType::WiresOnly), 0.9);
    }

    #[test]
    fn test_working_size() {
        let hash = HashConfig::new(8, 4, ResizeMode::Fit);
        assert_eq!(hash.working_size(), 32);
        assert_eq!(hash.bit_len(), 64);
    }
}
