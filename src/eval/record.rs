//! Sample metadata, hash records and evaluation groups.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hash::Fingerprint;

/// Value used for untouched (reference) renderings.
pub const UNTOUCHED_VALUE: &str = "na";

/// Kind of image set a sample belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSetType {
    /// One rendering per design; exact reproducibility expected.
    Single,
    /// Several intentionally different valid renderings per design.
    Versions,
    /// Renderings containing only the conductor layer.
    WiresOnly,
    /// Cropped variants of single renderings.
    Cropped,
}

impl ImageSetType {
    /// Get all set types.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[Self::Single, Self::Versions, Self::WiresOnly, Self::Cropped]
    }

    /// Whether the looser "versions" threshold applies.
    #[must_use]
    pub fn is_versions(self) -> bool {
        matches!(self, Self::Versions)
    }

    /// Parse from string (case-insensitive).
    #[must_use]
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "single" => Some(Self::Single),
            "versions" | "version" => Some(Self::Versions),
            "wires_only" | "wires" | "run_wires_only" => Some(Self::WiresOnly),
            "cropped" | "crop" => Some(Self::Cropped),
            _ => None,
        }
    }
}

impl std::fmt::Display for ImageSetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Versions => write!(f, "versions"),
            Self::WiresOnly => write!(f, "wires_only"),
            Self::Cropped => write!(f, "cropped"),
        }
    }
}

impl std::str::FromStr for ImageSetType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_str_loose(s).ok_or_else(|| format!("Unknown image set type: {s}"))
    }
}

/// Metadata of one image sample, known before it is decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleMeta {
    /// Identifier handed to the decode callback (usually a path).
    pub source: String,
    /// Transformation category, e.g. `res`, `mpl`, `cropped`.
    pub modifier: String,
    /// Transformation parameter, `na` for untouched renderings.
    pub value: String,
    /// Design identifier.
    pub name: String,
    /// Set the sample belongs to.
    pub image_set_type: ImageSetType,
    /// Group/folder identifier.
    pub module: String,
}

impl SampleMeta {
    /// Create sample metadata.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        modifier: impl Into<String>,
        value: impl Into<String>,
        name: impl Into<String>,
        image_set_type: ImageSetType,
        module: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            modifier: modifier.into(),
            value: value.into(),
            name: name.into(),
            image_set_type,
            module: module.into(),
        }
    }

    /// Parse a `modifier-value-name` file stem.
    ///
    /// Anything after the second `-` belongs to the name.
    ///
    /// # Example
    ///
    /// ```
    /// use phash_eval::eval::record::{ImageSetType, SampleMeta};
    ///
    /// let meta = SampleMeta::from_stem("res-0.5-board-a", "board_a", ImageSetType::Single, "out/res-0.5-board-a.png")?;
    /// assert_eq!(meta.modifier, "res");
    /// assert_eq!(meta.value, "0.5");
    /// assert_eq!(meta.name, "board-a");
    /// # Ok::<(), phash_eval::Error>(())
    /// ```
    pub fn from_stem(
        stem: &str,
        module: &str,
        image_set_type: ImageSetType,
        source: &str,
    ) -> Result<Self> {
        let mut parts = stem.splitn(3, '-');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(modifier), Some(value), Some(name))
                if !modifier.is_empty() && !value.is_empty() && !name.is_empty() =>
            {
                Ok(Self::new(source, modifier, value, name, image_set_type, module))
            }
            _ => Err(Error::InvalidSampleName(format!(
                "{stem}: expected modifier-value-name"
            ))),
        }
    }

    /// Parse metadata from a path; the module is the parent directory name.
    pub fn from_path(path: &Path, image_set_type: ImageSetType) -> Result<Self> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::InvalidSampleName(path.display().to_string()))?;
        let module = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        Self::from_stem(stem, module, image_set_type, &path.display().to_string())
    }

    /// Whether this is an untouched rendering.
    #[must_use]
    pub fn is_untouched(&self) -> bool {
        self.value == UNTOUCHED_VALUE
    }
}

/// Fingerprint of one processed image together with its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashRecord {
    /// Sample metadata.
    pub meta: SampleMeta,
    /// Fingerprint of the decoded image.
    pub fingerprint: Fingerprint,
}

/// Samples of one module, split into the baseline set and the targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleGroup {
    /// Group/folder identifier.
    pub module: String,
    /// Set the group belongs to; selects the threshold and the row layout.
    pub image_set_type: ImageSetType,
    /// Samples aggregated into the baseline fingerprint.
    pub baseline: Vec<SampleMeta>,
    /// Transformed variants evaluated against the baseline.
    pub targets: Vec<SampleMeta>,
    /// Emit rows for the baseline samples themselves.
    pub include_baseline_rows: bool,
}

impl SampleGroup {
    /// Create a group with baseline rows included.
    #[must_use]
    pub fn new(module: impl Into<String>, image_set_type: ImageSetType) -> Self {
        Self {
            module: module.into(),
            image_set_type,
            baseline: Vec::new(),
            targets: Vec::new(),
            include_baseline_rows: true,
        }
    }

    /// Add baseline samples.
    #[must_use]
    pub fn with_baseline(mut self, samples: impl IntoIterator<Item = SampleMeta>) -> Self {
        self.baseline.extend(samples);
        self
    }

    /// Add target samples.
    #[must_use]
    pub fn with_targets(mut self, samples: impl IntoIterator<Item = SampleMeta>) -> Self {
        self.targets.extend(samples);
        self
    }

    /// Omit rows for the baseline samples.
    #[must_use]
    pub fn without_baseline_rows(mut self) -> Self {
        self.include_baseline_rows = false;
        self
    }

    /// Split samples into a group by modifier: samples whose modifier is
    /// `baseline_modifier` form the baseline, the rest are targets.
    #[must_use]
    pub fn partition(
        module: impl Into<String>,
        image_set_type: ImageSetType,
        samples: impl IntoIterator<Item = SampleMeta>,
        baseline_modifier: &str,
    ) -> Self {
        let (baseline, targets): (Vec<_>, Vec<_>) = samples
            .into_iter()
            .partition(|s| s.modifier == baseline_modifier);
        Self::new(module, image_set_type)
            .with_baseline(baseline)
            .with_targets(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_type_roundtrip() {
        for t in ImageSetType::all() {
            let parsed: ImageSetType = t.to_string().parse().unwrap();
            assert_eq!(*t, parsed);
        }
        assert_eq!(ImageSetType::from_str_loose("Wires-Only"), Some(ImageSetType::WiresOnly));
        assert_eq!(ImageSetType::from_str_loose("grid"), None);
    }

    #[test]
    fn test_from_stem() {
        let meta = SampleMeta::from_stem("mpl-rotate_90_0.1-board1", "board1", ImageSetType::Single, "x.png")
            .unwrap();
        assert_eq!(meta.modifier, "mpl");
        assert_eq!(meta.value, "rotate_90_0.1");
        assert_eq!(meta.name, "board1");
        assert_eq!(meta.module, "board1");
        assert!(!meta.is_untouched());

        let meta = SampleMeta::from_stem("res-na-board1", "board1", ImageSetType::Single, "y.png").unwrap();
        assert!(meta.is_untouched());
    }

    #[test]
    fn test_from_stem_rejects_short_names() {
        assert!(matches!(
            SampleMeta::from_stem("res-na", "m", ImageSetType::Single, "z.png"),
            Err(Error::InvalidSampleName(_))
        ));
        assert!(SampleMeta::from_stem("res--board", "m", ImageSetType::Single, "z.png").is_err());
    }

    #[test]
    fn test_from_path() {
        let meta = SampleMeta::from_path(
            Path::new("/data/single/arduino/cropped-97-arduino.png"),
            ImageSetType::Cropped,
        )
        .unwrap();
        assert_eq!(meta.module, "arduino");
        assert_eq!(meta.value, "97");
        assert_eq!(meta.source, "/data/single/arduino/cropped-97-arduino.png");
    }

    #[test]
    fn test_partition() {
        let samples = vec![
            SampleMeta::new("a", "res", "na", "b1", ImageSetType::Single, "m"),
            SampleMeta::new("b", "mpl", "color_darker", "b1", ImageSetType::Single, "m"),
            SampleMeta::new("c", "res", "0.5", "b1", ImageSetType::Single, "m"),
        ];
        let group = SampleGroup::partition("m", ImageSetType::Single, samples, "res");
        assert_eq!(group.baseline.len(), 2);
        assert_eq!(group.targets.len(), 1);
        assert_eq!(group.targets[0].modifier, "mpl");
        assert!(group.include_baseline_rows);
    }
}
