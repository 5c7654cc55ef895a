// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Axis split: one tensor carved into consecutive parts.

use crate::OpError;
use capacity_probe::DeviceProfile;
use tensor_core::{AxisSpec, DType, Shape, SplitSpec};
use tiling_planner::{Descriptor, PlanError, ShapeAdapter};

/// Splits `input` along `axis` into `parts`.
///
/// One part may carry the inferred-size sentinel (`-1`); its value is
/// derived so all parts cover the axis.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Split {
    /// Input operand shape.
    pub input: Shape,
    /// Split axis. Negative values count from the back.
    pub axis: i64,
    /// Requested part sizes along the axis.
    pub parts: Vec<i64>,
    /// Element type.
    pub dtype: DType,
}

impl Split {
    fn resolve(&self) -> Result<(usize, Vec<i64>), PlanError> {
        let axis = tiling_planner::shape_model::resolve_axis(self.axis, self.input.rank().max(1))?;
        let extent = self.input.dim(axis).unwrap_or(1);
        let parts = SplitSpec::new(axis as i64, self.parts.clone())
            .resolved_parts(extent)
            .map_err(|e| PlanError::ShapeMismatch {
                detail: e.to_string(),
            })?;
        Ok((axis, parts))
    }

    /// Validates the part list against the axis extent.
    pub fn validate(&self) -> Result<(), OpError> {
        self.resolve()?;
        Ok(())
    }

    /// Shapes of the split outputs, in order.
    pub fn output_shapes(&self) -> Result<Vec<Shape>, OpError> {
        let (axis, parts) = self.resolve()?;
        let mut shapes = Vec::with_capacity(parts.len());
        for p in parts {
            let mut dims = self.input.dims().to_vec();
            dims[axis] = p;
            shapes.push(Shape::new(&dims).map_err(|e| {
                OpError::Plan(PlanError::ShapeMismatch {
                    detail: e.to_string(),
                })
            })?);
        }
        Ok(shapes)
    }

    /// Plans this split on the given device.
    pub fn plan(&self, device: &DeviceProfile) -> Result<Descriptor, OpError> {
        let capacity = device.with_element_size(self.dtype.size_bytes());
        Ok(tiling_planner::plan_for(self, &capacity)?)
    }
}

impl ShapeAdapter for Split {
    fn name(&self) -> &str {
        "split"
    }

    fn logical_shape(&self) -> Result<Shape, PlanError> {
        Ok(self.input)
    }

    fn axis_spec(&self) -> Result<AxisSpec, PlanError> {
        let (axis, parts) = self.resolve()?;
        Ok(AxisSpec::Split(SplitSpec::new(axis as i64, parts)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiling_planner::strategy;

    #[test]
    fn test_output_shapes() {
        let s = Split {
            input: Shape::new(&[11, 16]).unwrap(),
            axis: 1,
            parts: vec![8, -1],
            dtype: DType::F32,
        };
        let outs = s.output_shapes().unwrap();
        assert_eq!(outs[0], Shape::new(&[11, 8]).unwrap());
        assert_eq!(outs[1], Shape::new(&[11, 8]).unwrap());
    }

    #[test]
    fn test_parts_mismatch() {
        let s = Split {
            input: Shape::new(&[11, 16]).unwrap(),
            axis: 1,
            parts: vec![8, 9],
            dtype: DType::F32,
        };
        assert!(matches!(
            s.validate(),
            Err(OpError::Plan(PlanError::ShapeMismatch { .. }))
        ));
    }

    #[test]
    fn test_single_part_plans_pure_move() {
        let s = Split {
            input: Shape::new(&[1820, 232]).unwrap(),
            axis: 0,
            parts: vec![1820],
            dtype: DType::U8,
        };
        let d = s.plan(&DeviceProfile::default()).unwrap();
        assert_eq!(d.plan_id, strategy::PLAN_ID_PURE_MOVE);
        assert_eq!(d.required_units, 64);
    }

    #[test]
    fn test_zero_part_allowed() {
        let s = Split {
            input: Shape::new(&[12800, 2]).unwrap(),
            axis: 1,
            parts: vec![0, 2, -1],
            dtype: DType::F32,
        };
        let outs = s.output_shapes().unwrap();
        assert_eq!(outs[0].dim(1), Some(0));
        assert_eq!(outs[1].dim(1), Some(2));
        assert_eq!(outs[2].dim(1), Some(0));
        // Only one part carries data: a pure move.
        let d = s.plan(&DeviceProfile::default()).unwrap();
        assert_eq!(d.plan_id, strategy::PLAN_ID_PURE_MOVE);
    }
}
