// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Pairwise distance between two point sets.
//!
//! The kernel fills an `[n, m]` distance matrix from `[n, d]` and
//! `[m, d]` operands. Planning-wise that is row partitioning of the
//! output: each unit computes a disjoint band of rows, staging its rows
//! of both operands through scratch.

use crate::OpError;
use capacity_probe::DeviceProfile;
use tensor_core::{AxisSpec, DType, Shape, SplitSpec};
use tiling_planner::{Descriptor, PlanError, ShapeAdapter};

/// Pairwise distances between the rows of `lhs` and `rhs`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PairwiseDistance {
    /// Left point set, shape `[n, d]`.
    pub lhs: Shape,
    /// Right point set, shape `[m, d]`.
    pub rhs: Shape,
    /// Element type.
    pub dtype: DType,
}

impl PairwiseDistance {
    fn resolve(&self) -> Result<Shape, PlanError> {
        for (name, shape) in [("lhs", &self.lhs), ("rhs", &self.rhs)] {
            if shape.rank() != 2 {
                return Err(PlanError::RankMismatch {
                    detail: format!("{name} must be rank 2, got rank {}", shape.rank()),
                });
            }
        }
        if self.lhs.dim(1) != self.rhs.dim(1) {
            return Err(PlanError::ShapeMismatch {
                detail: format!(
                    "feature dimensions disagree: {:?} vs {:?}",
                    self.lhs.dim(1),
                    self.rhs.dim(1),
                ),
            });
        }
        let n = self.lhs.dim(0).unwrap_or(0);
        let m = self.rhs.dim(0).unwrap_or(0);
        Shape::new(&[n, m]).map_err(|e| PlanError::ShapeMismatch {
            detail: e.to_string(),
        })
    }

    /// Validates operand agreement.
    pub fn validate(&self) -> Result<(), OpError> {
        self.resolve()?;
        Ok(())
    }

    /// The `[n, m]` output shape.
    pub fn output_shape(&self) -> Result<Shape, OpError> {
        Ok(self.resolve()?)
    }

    /// Plans this distance computation on the given device.
    pub fn plan(&self, device: &DeviceProfile) -> Result<Descriptor, OpError> {
        let capacity = device.with_element_size(self.dtype.size_bytes());
        Ok(tiling_planner::plan_for(self, &capacity)?)
    }
}

impl ShapeAdapter for PairwiseDistance {
    fn name(&self) -> &str {
        "pairwise-distance"
    }

    fn logical_shape(&self) -> Result<Shape, PlanError> {
        self.resolve()
    }

    fn axis_spec(&self) -> Result<AxisSpec, PlanError> {
        let out = self.resolve()?;
        Ok(AxisSpec::Split(SplitSpec::new(
            0,
            vec![out.dim(0).unwrap_or(0)],
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(n: i64, m: i64, d: i64) -> PairwiseDistance {
        PairwiseDistance {
            lhs: Shape::matrix(n, d),
            rhs: Shape::matrix(m, d),
            dtype: DType::F32,
        }
    }

    #[test]
    fn test_output_shape() {
        assert_eq!(
            op(100, 40, 8).output_shape().unwrap(),
            Shape::matrix(100, 40),
        );
    }

    #[test]
    fn test_feature_mismatch() {
        let p = PairwiseDistance {
            lhs: Shape::matrix(10, 8),
            rhs: Shape::matrix(10, 9),
            dtype: DType::F32,
        };
        assert!(matches!(
            p.validate(),
            Err(OpError::Plan(PlanError::ShapeMismatch { .. }))
        ));
    }

    #[test]
    fn test_rank_mismatch() {
        let p = PairwiseDistance {
            lhs: Shape::vector(10),
            rhs: Shape::matrix(10, 8),
            dtype: DType::F32,
        };
        assert!(matches!(
            p.validate(),
            Err(OpError::Plan(PlanError::RankMismatch { .. }))
        ));
    }

    #[test]
    fn test_plan_partitions_rows() {
        let d = op(4096, 512, 16).plan(&DeviceProfile::default()).unwrap();
        assert_eq!(d.unit_plan.total_extent(), 4096 * 512);
        assert!(d.required_units > 1);
    }

    #[test]
    fn test_plan_empty_sets() {
        let d = op(0, 512, 16).plan(&DeviceProfile::default()).unwrap();
        assert_eq!(d.required_units, 0);
    }
}
