// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Linear-space generation: `num` evenly spaced values from `start` to
//! `stop`, inclusive.
//!
//! The kernel produces the first half ascending from `start` and the
//! mirror half descending from `stop` (the symmetric form keeps the
//! endpoints exact), so the lowered fill is bidirectional and the plan
//! bisects the unit straddling the midpoint.

use crate::OpError;
use capacity_probe::DeviceProfile;
use tensor_core::{AxisSpec, DType, FillSpec, Shape};
use tiling_planner::{Descriptor, PlanError, ShapeAdapter};

/// Generates `num` evenly spaced values in `[start, stop]`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LinSpace {
    /// First generated value.
    pub start: f64,
    /// Last generated value.
    pub stop: f64,
    /// Number of values.
    pub num: i64,
    /// Element type of the output.
    pub dtype: DType,
}

impl LinSpace {
    /// Validates the element count.
    pub fn validate(&self) -> Result<(), OpError> {
        if self.num < 0 {
            return Err(OpError::InvalidAttribute {
                op: "lin-space",
                detail: format!("num must be non-negative, got {}", self.num),
            });
        }
        Ok(())
    }

    /// The per-index increment; zero for fewer than two values.
    pub fn step(&self) -> f64 {
        if self.num > 1 {
            (self.stop - self.start) / (self.num - 1) as f64
        } else {
            0.0
        }
    }

    /// Plans this generation on the given device.
    pub fn plan(&self, device: &DeviceProfile) -> Result<Descriptor, OpError> {
        self.validate()?;
        let capacity = device.with_element_size(self.dtype.size_bytes());
        Ok(tiling_planner::plan_for(self, &capacity)?)
    }
}

impl ShapeAdapter for LinSpace {
    fn name(&self) -> &str {
        "lin-space"
    }

    fn logical_shape(&self) -> Result<Shape, PlanError> {
        if self.num < 0 {
            return Err(PlanError::ShapeMismatch {
                detail: format!("negative element count {}", self.num),
            });
        }
        Ok(Shape::vector(self.num))
    }

    fn axis_spec(&self) -> Result<AxisSpec, PlanError> {
        Ok(AxisSpec::Fill(FillSpec {
            len: self.num.max(0),
            bidirectional: true,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step() {
        let l = LinSpace {
            start: 0.0,
            stop: 10.0,
            num: 5,
            dtype: DType::F32,
        };
        assert!((l.step() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_step_degenerate() {
        let l = LinSpace {
            start: 3.0,
            stop: 9.0,
            num: 1,
            dtype: DType::F32,
        };
        assert_eq!(l.step(), 0.0);
    }

    #[test]
    fn test_negative_num_rejected() {
        let l = LinSpace {
            start: 0.0,
            stop: 1.0,
            num: -4,
            dtype: DType::F32,
        };
        assert!(matches!(
            l.validate(),
            Err(OpError::InvalidAttribute { op: "lin-space", .. })
        ));
    }

    #[test]
    fn test_plan_is_bidirectional() {
        let l = LinSpace {
            start: 0.0,
            stop: 1.0,
            num: 640000,
            dtype: DType::F32,
        };
        let d = l.plan(&DeviceProfile::default()).unwrap();
        assert!(d.is_bidirectional());
        assert_eq!(d.unit_plan.total_extent(), 640000);
    }

    #[test]
    fn test_plan_zero_num() {
        let l = LinSpace {
            start: 0.0,
            stop: 1.0,
            num: 0,
            dtype: DType::F32,
        };
        let d = l.plan(&DeviceProfile::default()).unwrap();
        assert_eq!(d.required_units, 0);
    }

    #[test]
    fn test_plan_small_num_not_bisected() {
        let l = LinSpace {
            start: 0.0,
            stop: 0.0,
            num: 1,
            dtype: DType::F32,
        };
        let d = l.plan(&DeviceProfile::default()).unwrap();
        assert!(!d.is_bidirectional());
        assert_eq!(d.required_units, 1);
    }
}
