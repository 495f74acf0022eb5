//! Device identification for display
//!
//! A static table maps hardware model identifiers to chip marketing names.
//! Nothing here influences segmentation, compositing or benchmarking.

use serde::Serialize;

/// Identifier reported when running under a simulator
pub const SIMULATOR_IDENTIFIER: &str = "Simulator";

const CHIP_TABLE: &[(&[&str], &str)] = &[
    (&["iPhone17,1", "iPhone17,2", "iPhone17,3", "iPhone17,4"], "A17 Pro"),
    (&["iPhone16,1", "iPhone16,2"], "A18 Pro"),
    (&["iPhone15,2", "iPhone15,3"], "A16 Bionic"),
    (&["iPhone14,7", "iPhone14,8"], "A15 Bionic"),
    (&["iPhone13,1", "iPhone13,2", "iPhone13,3", "iPhone13,4"], "A14 Bionic"),
    (&["iPhone12,1", "iPhone12,3", "iPhone12,5", "iPhone12,8"], "A13 Bionic"),
];

/// Chip name for a model identifier; unknown identifiers are returned as-is
#[must_use]
pub fn chip_name(model_identifier: &str) -> &str {
    CHIP_TABLE
        .iter()
        .find(|(models, _)| models.iter().any(|model| *model == model_identifier))
        .map_or(model_identifier, |(_, chip)| *chip)
}

/// Host description shown next to benchmark results
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub model_identifier: String,
    pub chip: String,
    pub os: String,
    pub arch: String,
}

impl DeviceInfo {
    /// Describe a device from its model identifier
    #[must_use]
    pub fn from_identifier(model_identifier: &str) -> Self {
        Self {
            model_identifier: model_identifier.to_string(),
            chip: chip_name(model_identifier).to_string(),
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        }
    }

    /// Describe the current host
    ///
    /// `SEGDEMO_DEVICE_MODEL` overrides the identifier; otherwise the target
    /// architecture is used.
    #[must_use]
    pub fn current() -> Self {
        let identifier = std::env::var("SEGDEMO_DEVICE_MODEL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| std::env::consts::ARCH.to_string());
        Self::from_identifier(identifier.trim())
    }
}

impl std::fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}) - {}/{}",
            self.chip, self.model_identifier, self.os, self.arch
        )
    }
}
