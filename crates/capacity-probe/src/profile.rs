// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Device and capacity profile value types.

use crate::ProbeError;
use std::fmt;

/// Environment variable overriding the parallel-unit count.
pub const ENV_UNIT_COUNT: &str = "TILE_UNIT_COUNT";
/// Environment variable overriding the per-unit scratch size in bytes.
pub const ENV_SCRATCH_BYTES: &str = "TILE_SCRATCH_BYTES";
/// Environment variable overriding the transfer alignment in bytes.
pub const ENV_ALIGNMENT_BYTES: &str = "TILE_ALIGNMENT_BYTES";

/// Built-in device generations: `(name, units, scratch bytes, alignment)`.
const GENERATIONS: &[(&str, u32, u64, u32)] = &[
    ("lane64", 64, 248 * 1024, 32),
    ("lane40", 40, 192 * 1024, 32),
    ("lane8", 8, 128 * 1024, 32),
];

/// The hardware side of a capacity profile: what the device offers,
/// independent of any particular problem's element width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeviceProfile {
    /// Number of independent parallel compute units.
    pub unit_count: u32,
    /// Per-unit fast scratch memory in bytes.
    pub scratch_bytes: u64,
    /// Minimum contiguous-transfer granularity in bytes (power of two).
    pub alignment_bytes: u32,
}

impl DeviceProfile {
    /// Detects the device profile of the current environment.
    ///
    /// Environment overrides take precedence over the default generation;
    /// a missing variable degrades to the default rather than erroring.
    /// A present-but-unparsable variable is an error — silently ignoring
    /// an explicit override would mask misconfiguration.
    pub fn detect() -> Result<Self, ProbeError> {
        let default = Self::default();
        let profile = Self {
            unit_count: read_env(ENV_UNIT_COUNT)?.unwrap_or(default.unit_count),
            scratch_bytes: read_env(ENV_SCRATCH_BYTES)?.unwrap_or(default.scratch_bytes),
            alignment_bytes: read_env(ENV_ALIGNMENT_BYTES)?.unwrap_or(default.alignment_bytes),
        };
        profile.validate()?;
        tracing::debug!(
            units = profile.unit_count,
            scratch = profile.scratch_bytes,
            alignment = profile.alignment_bytes,
            "detected device profile",
        );
        Ok(profile)
    }

    /// Looks up a built-in device generation by name.
    pub fn generation(name: &str) -> Result<Self, ProbeError> {
        GENERATIONS
            .iter()
            .find(|(n, ..)| *n == name)
            .map(|&(_, unit_count, scratch_bytes, alignment_bytes)| Self {
                unit_count,
                scratch_bytes,
                alignment_bytes,
            })
            .ok_or_else(|| ProbeError::UnknownGeneration {
                name: name.to_string(),
            })
    }

    /// Names of all built-in device generations.
    pub fn generation_names() -> Vec<&'static str> {
        GENERATIONS.iter().map(|(n, ..)| *n).collect()
    }

    /// Checks the hard constraints on the profile fields.
    pub fn validate(&self) -> Result<(), ProbeError> {
        if self.unit_count == 0 {
            return Err(ProbeError::InvalidProfile {
                detail: "unit count is zero".into(),
            });
        }
        if self.scratch_bytes == 0 {
            return Err(ProbeError::InvalidProfile {
                detail: "scratch size is zero".into(),
            });
        }
        if self.alignment_bytes == 0 || !self.alignment_bytes.is_power_of_two() {
            return Err(ProbeError::InvalidProfile {
                detail: format!(
                    "alignment must be a power of two, got {}",
                    self.alignment_bytes
                ),
            });
        }
        Ok(())
    }

    /// Binds this device profile to a problem's element width.
    pub fn with_element_size(&self, element_size: usize) -> CapacityProfile {
        CapacityProfile {
            unit_count: self.unit_count,
            scratch_bytes: self.scratch_bytes,
            alignment_bytes: self.alignment_bytes,
            element_size: element_size as u32,
        }
    }

    /// Returns a summary string suitable for logging or CLI display.
    pub fn summary(&self) -> String {
        format!(
            "Device: {} units, {} KB scratch/unit, {} B alignment",
            self.unit_count,
            self.scratch_bytes / 1024,
            self.alignment_bytes,
        )
    }
}

impl Default for DeviceProfile {
    /// The default generation (`lane64`).
    fn default() -> Self {
        Self {
            unit_count: 64,
            scratch_bytes: 248 * 1024,
            alignment_bytes: 32,
        }
    }
}

impl fmt::Display for DeviceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

fn read_env<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ProbeError> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ProbeError::ParseError { var, value }),
        Err(_) => Ok(None),
    }
}

/// The full capacity profile the planner consumes: device limits plus the
/// element width of the problem being planned.
///
/// Immutable, supplied once per planning call, discarded after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CapacityProfile {
    /// Number of independent parallel compute units.
    pub unit_count: u32,
    /// Per-unit fast scratch memory in bytes.
    pub scratch_bytes: u64,
    /// Minimum contiguous-transfer granularity in bytes (power of two).
    pub alignment_bytes: u32,
    /// Element width of the planned problem in bytes.
    pub element_size: u32,
}

impl CapacityProfile {
    /// Checks the hard constraints on all four fields.
    pub fn validate(&self) -> Result<(), ProbeError> {
        DeviceProfile {
            unit_count: self.unit_count,
            scratch_bytes: self.scratch_bytes,
            alignment_bytes: self.alignment_bytes,
        }
        .validate()?;
        if self.element_size == 0 {
            return Err(ProbeError::InvalidProfile {
                detail: "element size is zero".into(),
            });
        }
        Ok(())
    }

    /// Alignment granularity expressed in elements (at least 1).
    pub fn alignment_elems(&self) -> i64 {
        (self.alignment_bytes as i64 / self.element_size as i64).max(1)
    }

    /// Total scratch capacity expressed in elements.
    pub fn scratch_elems(&self) -> i64 {
        self.scratch_bytes as i64 / self.element_size as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_valid() {
        let p = DeviceProfile::default();
        p.validate().unwrap();
        assert_eq!(p.unit_count, 64);
        assert_eq!(p.scratch_bytes, 253952);
        assert_eq!(p.alignment_bytes, 32);
    }

    #[test]
    fn test_generation_lookup() {
        let p = DeviceProfile::generation("lane8").unwrap();
        assert_eq!(p.unit_count, 8);
        assert!(matches!(
            DeviceProfile::generation("lane128"),
            Err(ProbeError::UnknownGeneration { .. })
        ));
    }

    #[test]
    fn test_generation_names() {
        assert!(DeviceProfile::generation_names().contains(&"lane64"));
    }

    #[test]
    fn test_validate_rejects_zero_units() {
        let p = DeviceProfile {
            unit_count: 0,
            ..Default::default()
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_power_of_two_alignment() {
        let p = DeviceProfile {
            alignment_bytes: 24,
            ..Default::default()
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_with_element_size() {
        let c = DeviceProfile::default().with_element_size(4);
        c.validate().unwrap();
        assert_eq!(c.element_size, 4);
        assert_eq!(c.alignment_elems(), 8);
        assert_eq!(c.scratch_elems(), 253952 / 4);
    }

    #[test]
    fn test_capacity_rejects_zero_element_size() {
        let c = DeviceProfile::default().with_element_size(0);
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_alignment_elems_floor_one() {
        // 8-byte elements on a 4-byte-alignment device still report 1.
        let c = CapacityProfile {
            unit_count: 4,
            scratch_bytes: 1024,
            alignment_bytes: 4,
            element_size: 8,
        };
        assert_eq!(c.alignment_elems(), 1);
    }

    #[test]
    fn test_summary() {
        let p = DeviceProfile::default();
        let s = p.summary();
        assert!(s.contains("64 units"));
        assert!(s.contains("248 KB"));
    }

    #[test]
    fn test_serde_roundtrip() {
        let c = DeviceProfile::default().with_element_size(2);
        let json = serde_json::to_string(&c).unwrap();
        let back: CapacityProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }
}
