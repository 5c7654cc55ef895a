// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Strided slice: a begin/end/stride range per dimension.

use crate::OpError;
use capacity_probe::DeviceProfile;
use tensor_core::{AxisSpec, DType, Shape, SliceSpec};
use tiling_planner::{Descriptor, PlanError, ShapeAdapter};

/// Slices `input` with a `[begin, end)` range stepping `stride` in every
/// dimension. Negative begin/end indices count from the back of their
/// dimension; strides must be positive.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StridedSlice {
    /// Input operand shape.
    pub input: Shape,
    /// Range start per dimension.
    pub begin: Vec<i64>,
    /// Range end (exclusive) per dimension.
    pub end: Vec<i64>,
    /// Step per dimension.
    pub stride: Vec<i64>,
    /// Element type.
    pub dtype: DType,
}

impl StridedSlice {
    fn resolve(&self) -> Result<SliceSpec, PlanError> {
        let rank = self.input.rank();
        for (name, len) in [
            ("begin", self.begin.len()),
            ("end", self.end.len()),
            ("stride", self.stride.len()),
        ] {
            if len != rank {
                return Err(PlanError::RankMismatch {
                    detail: format!("{name} has {len} entries but the input has rank {rank}"),
                });
            }
        }

        let mut begin = Vec::with_capacity(rank);
        let mut size = Vec::with_capacity(rank);
        for d in 0..rank {
            let extent = self.input.dims()[d];
            let stride = self.stride[d];
            if stride <= 0 {
                return Err(PlanError::UnsupportedShape {
                    detail: format!("non-positive stride {stride} in dimension {d}"),
                });
            }
            let b = clamp_index(self.begin[d], extent);
            let e = clamp_index(self.end[d], extent);
            let out = if e > b { (e - b + stride - 1) / stride } else { 0 };
            begin.push(b);
            size.push(out);
        }
        Ok(SliceSpec::new(begin, size, self.stride.clone()))
    }

    /// Validates the range lists against the input shape.
    pub fn validate(&self) -> Result<(), OpError> {
        self.resolve()?;
        Ok(())
    }

    /// The sliced output shape.
    pub fn output_shape(&self) -> Result<Shape, OpError> {
        let spec = self.resolve()?;
        Shape::new(&spec.size).map_err(|e| {
            OpError::Plan(PlanError::ShapeMismatch {
                detail: e.to_string(),
            })
        })
    }

    /// Plans this slice on the given device.
    pub fn plan(&self, device: &DeviceProfile) -> Result<Descriptor, OpError> {
        let capacity = device.with_element_size(self.dtype.size_bytes());
        Ok(tiling_planner::plan_for(self, &capacity)?)
    }
}

/// Resolves a possibly negative index against `extent` and clamps it into
/// `[0, extent]`.
fn clamp_index(index: i64, extent: i64) -> i64 {
    let resolved = if index < 0 { index + extent } else { index };
    resolved.clamp(0, extent)
}

impl ShapeAdapter for StridedSlice {
    fn name(&self) -> &str {
        "strided-slice"
    }

    fn logical_shape(&self) -> Result<Shape, PlanError> {
        Ok(self.input)
    }

    fn axis_spec(&self) -> Result<AxisSpec, PlanError> {
        Ok(AxisSpec::Slice(self.resolve()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiling_planner::strategy;

    fn op(input: &[i64], begin: &[i64], end: &[i64], stride: &[i64]) -> StridedSlice {
        StridedSlice {
            input: Shape::new(input).unwrap(),
            begin: begin.to_vec(),
            end: end.to_vec(),
            stride: stride.to_vec(),
            dtype: DType::F32,
        }
    }

    #[test]
    fn test_output_shape() {
        let s = op(&[10, 20], &[2, 0], &[8, 20], &[2, 1]);
        assert_eq!(s.output_shape().unwrap(), Shape::new(&[3, 20]).unwrap());
    }

    #[test]
    fn test_negative_indices() {
        let s = op(&[16], &[-8], &[-2], &[1]);
        assert_eq!(s.output_shape().unwrap(), Shape::new(&[6]).unwrap());
    }

    #[test]
    fn test_end_clamped() {
        let s = op(&[10], &[0], &[100], &[1]);
        assert_eq!(s.output_shape().unwrap(), Shape::new(&[10]).unwrap());
    }

    #[test]
    fn test_empty_range() {
        let s = op(&[10], &[8], &[4], &[1]);
        assert_eq!(s.output_shape().unwrap(), Shape::new(&[0]).unwrap());
        let d = s.plan(&DeviceProfile::default()).unwrap();
        assert_eq!(d.required_units, 0);
    }

    #[test]
    fn test_rank_mismatch() {
        let s = op(&[10, 20], &[0], &[10], &[1]);
        assert!(matches!(
            s.validate(),
            Err(OpError::Plan(PlanError::RankMismatch { .. }))
        ));
    }

    #[test]
    fn test_negative_stride_unsupported() {
        let s = op(&[10], &[9], &[0], &[-1]);
        assert!(matches!(
            s.validate(),
            Err(OpError::Plan(PlanError::UnsupportedShape { .. }))
        ));
    }

    #[test]
    fn test_identity_slice_is_pure_move() {
        let s = op(&[512, 512], &[0, 0], &[512, 512], &[1, 1]);
        let d = s.plan(&DeviceProfile::default()).unwrap();
        assert_eq!(d.plan_id, strategy::PLAN_ID_PURE_MOVE);
        assert_eq!(d.unit_plan.total_extent(), 512 * 512);
    }

    #[test]
    fn test_contiguous_tail_slice_geometry() {
        // Keep columns [64, 192) of each row: 128-element runs, offset 64.
        let s = op(&[256, 256], &[0, 64], &[256, 192], &[1, 1]);
        let d = s.plan(&DeviceProfile::default()).unwrap();
        assert_eq!(d.axis_geometry[1].offset, 64);
        assert_eq!(d.axis_geometry[0].input_step, 256);
        assert_eq!(d.axis_geometry[0].output_step, 128);
    }
}
