// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # capacity-probe
//!
//! Hardware capacity discovery for the tiling planner.
//!
//! The planner never talks to hardware itself: it consumes a read-only
//! [`CapacityProfile`] — unit count, scratch-memory size, transfer
//! alignment, element width — built from a [`DeviceProfile`] detected here.
//!
//! # Graceful Degradation
//! Detection first consults environment overrides (`TILE_UNIT_COUNT`,
//! `TILE_SCRATCH_BYTES`, `TILE_ALIGNMENT_BYTES`), useful for tests and
//! cross-compilation hosts where the real device is absent. Anything not
//! overridden falls back to the default device generation rather than
//! failing hard.
//!
//! # Example
//! ```
//! use capacity_probe::DeviceProfile;
//!
//! let device = DeviceProfile::detect().expect("capacity detection failed");
//! println!("{}", device.summary());
//! let capacity = device.with_element_size(4);
//! assert!(capacity.validate().is_ok());
//! ```

mod error;
mod profile;

pub use error::ProbeError;
pub use profile::{CapacityProfile, DeviceProfile};

/// Detects the device profile of the current environment.
///
/// This is a convenience wrapper around [`DeviceProfile::detect()`].
pub fn detect() -> Result<DeviceProfile, ProbeError> {
    DeviceProfile::detect()
}
