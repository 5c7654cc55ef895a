// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Concatenation of several tensors along one axis.
//!
//! Lowering: the *output* tensor is the planning shape, and the input
//! extents along the concat axis become the parts of a split — the
//! executor walks the same geometry whether it scatters inputs into the
//! output or gathers output parts from inputs.

use crate::OpError;
use capacity_probe::DeviceProfile;
use tensor_core::{AxisSpec, DType, Shape, SplitSpec};
use tiling_planner::{Descriptor, PlanError, ShapeAdapter};

/// Concatenation along `axis`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Concat {
    /// Input operand shapes, in stacking order.
    pub inputs: Vec<Shape>,
    /// Concatenation axis. Negative values count from the back.
    pub axis: i64,
    /// Element type shared by all operands.
    pub dtype: DType,
}

impl Concat {
    /// Checks operand agreement and resolves the output shape and axis.
    fn resolve(&self) -> Result<(Shape, usize), PlanError> {
        let first = self.inputs.first().ok_or_else(|| PlanError::ShapeMismatch {
            detail: "concat requires at least one input".into(),
        })?;
        let rank = first.rank();
        if rank == 0 {
            // Scalars stack into a vector.
            return Ok((Shape::vector(self.inputs.len() as i64), 0));
        }
        let axis = tiling_planner::shape_model::resolve_axis(self.axis, rank)?;

        let mut axis_total = 0i64;
        for (i, input) in self.inputs.iter().enumerate() {
            if input.rank() != rank {
                return Err(PlanError::RankMismatch {
                    detail: format!(
                        "input {i} has rank {} but input 0 has rank {rank}",
                        input.rank(),
                    ),
                });
            }
            for d in 0..rank {
                if d != axis && input.dim(d) != first.dim(d) {
                    return Err(PlanError::ShapeMismatch {
                        detail: format!(
                            "input {i} dimension {d} is {:?}, expected {:?}",
                            input.dim(d),
                            first.dim(d),
                        ),
                    });
                }
            }
            axis_total += input.dim(axis).unwrap_or(1);
        }

        let mut dims = first.dims().to_vec();
        dims[axis] = axis_total;
        let output = Shape::new(&dims).map_err(|e| PlanError::ShapeMismatch {
            detail: e.to_string(),
        })?;
        Ok((output, axis))
    }

    /// Validates operand agreement.
    pub fn validate(&self) -> Result<(), OpError> {
        self.resolve()?;
        Ok(())
    }

    /// The concatenated output shape.
    pub fn output_shape(&self) -> Result<Shape, OpError> {
        Ok(self.resolve()?.0)
    }

    /// Plans this concat on the given device.
    pub fn plan(&self, device: &DeviceProfile) -> Result<Descriptor, OpError> {
        let capacity = device.with_element_size(self.dtype.size_bytes());
        Ok(tiling_planner::plan_for(self, &capacity)?)
    }
}

impl ShapeAdapter for Concat {
    fn name(&self) -> &str {
        "concat"
    }

    fn logical_shape(&self) -> Result<Shape, PlanError> {
        Ok(self.resolve()?.0)
    }

    fn axis_spec(&self) -> Result<AxisSpec, PlanError> {
        let (_, axis) = self.resolve()?;
        let parts = self
            .inputs
            .iter()
            .map(|s| s.dim(axis).unwrap_or(1))
            .collect();
        Ok(AxisSpec::Split(SplitSpec::new(axis as i64, parts)))
    }
}
