// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Value histogram over a flattened input.
//!
//! Each unit scans a disjoint band of the input and accumulates a
//! private bin table; the executor merges the per-unit tables afterwards.
//! Planning therefore reduces to evenly banding the flattened element
//! count.

use crate::OpError;
use capacity_probe::DeviceProfile;
use tensor_core::{AxisSpec, DType, Shape, SplitSpec};
use tiling_planner::{Descriptor, PlanError, ShapeAdapter};

/// Histogram of `input` values over `bins` buckets.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Histogram {
    /// Input operand shape (flattened for planning).
    pub input: Shape,
    /// Number of buckets.
    pub bins: i64,
    /// Element type of the input.
    pub dtype: DType,
}

impl Histogram {
    /// Validates the bucket count.
    pub fn validate(&self) -> Result<(), OpError> {
        if self.bins <= 0 {
            return Err(OpError::InvalidAttribute {
                op: "histogram",
                detail: format!("bins must be positive, got {}", self.bins),
            });
        }
        Ok(())
    }

    /// Bytes one unit's private bin table occupies (32-bit counters).
    pub fn bin_table_bytes(&self) -> i64 {
        self.bins * 4
    }

    /// Plans this histogram on the given device.
    pub fn plan(&self, device: &DeviceProfile) -> Result<Descriptor, OpError> {
        self.validate()?;
        let capacity = device.with_element_size(self.dtype.size_bytes());
        Ok(tiling_planner::plan_for(self, &capacity)?)
    }
}

impl ShapeAdapter for Histogram {
    fn name(&self) -> &str {
        "histogram"
    }

    fn logical_shape(&self) -> Result<Shape, PlanError> {
        Ok(Shape::vector(self.input.num_elements()))
    }

    fn axis_spec(&self) -> Result<AxisSpec, PlanError> {
        Ok(AxisSpec::Split(SplitSpec::new(
            0,
            vec![self.input.num_elements()],
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_bins_rejected() {
        let h = Histogram {
            input: Shape::vector(100),
            bins: 0,
            dtype: DType::F32,
        };
        assert!(matches!(
            h.validate(),
            Err(OpError::InvalidAttribute { op: "histogram", .. })
        ));
    }

    #[test]
    fn test_bin_table_bytes() {
        let h = Histogram {
            input: Shape::vector(100),
            bins: 256,
            dtype: DType::F32,
        };
        assert_eq!(h.bin_table_bytes(), 1024);
    }

    #[test]
    fn test_plan_bands_elements() {
        let h = Histogram {
            input: Shape::new(&[512, 512]).unwrap(),
            bins: 256,
            dtype: DType::F32,
        };
        let d = h.plan(&DeviceProfile::default()).unwrap();
        assert_eq!(d.unit_plan.total_extent(), 512 * 512);
        assert_eq!(d.required_units as i32, d.unit_plan.used_units());
    }

    #[test]
    fn test_plan_empty_input() {
        let h = Histogram {
            input: Shape::new(&[0, 4]).unwrap(),
            bins: 16,
            dtype: DType::F32,
        };
        let d = h.plan(&DeviceProfile::default()).unwrap();
        assert_eq!(d.required_units, 0);
    }
}
