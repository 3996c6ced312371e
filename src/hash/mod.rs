//! Perceptual fingerprints.
//!
//! - [`fingerprint::Fingerprint`]: square bit matrix with a canonical hex token
//! - [`frequency::FrequencyHasher`]: DCT perceptual hash of a whole image
//! - [`crop_resistant::CropResistantHasher`]: per-region hashing for cropped input
//! - [`dct`]: the separable transform used by the hashers

pub mod crop_resistant;
pub mod dct;
pub mod fingerprint;
pub mod frequency;

pub use crop_resistant::{CropResistantConfig, CropResistantHasher, RegionHash, RegionMatch};
pub use fingerprint::Fingerprint;
pub use frequency::FrequencyHasher;
