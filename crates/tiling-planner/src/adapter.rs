// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The [`ShapeAdapter`] injection seam between operators and the planner.
//!
//! Operators differ only in how they derive a logical shape and an axis
//! specification from their own attributes. Instead of one tiling class
//! hierarchy per operator, each operator implements this two-hook trait
//! and the planner stays a single parameterized engine.

use crate::{plan, Descriptor, PlanError};
use capacity_probe::CapacityProfile;
use tensor_core::{AxisSpec, Shape};

/// Derives the planner inputs for one operator invocation.
///
/// Implementations are purely algorithmic — no I/O or system calls —
/// which keeps them trivially unit-testable.
pub trait ShapeAdapter: Send + Sync {
    /// Human-readable operator name, used for logging only.
    fn name(&self) -> &str;

    /// Derives the logical iteration-space shape.
    fn logical_shape(&self) -> Result<Shape, PlanError>;

    /// Derives the axis specification over that shape.
    fn axis_spec(&self) -> Result<AxisSpec, PlanError>;
}

/// Plans one operator invocation through its adapter.
pub fn plan_for(
    adapter: &dyn ShapeAdapter,
    capacity: &CapacityProfile,
) -> Result<Descriptor, PlanError> {
    let shape = adapter.logical_shape()?;
    let spec = adapter.axis_spec()?;
    tracing::debug!(op = adapter.name(), shape = %shape, "planning operator");
    plan(&shape, &spec, capacity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use capacity_probe::DeviceProfile;
    use tensor_core::{FillSpec, SplitSpec};

    struct RowBlockAdapter {
        rows: i64,
        cols: i64,
    }

    impl ShapeAdapter for RowBlockAdapter {
        fn name(&self) -> &str {
            "row-block"
        }

        fn logical_shape(&self) -> Result<Shape, PlanError> {
            Shape::new(&[self.rows, self.cols]).map_err(|e| PlanError::ShapeMismatch {
                detail: e.to_string(),
            })
        }

        fn axis_spec(&self) -> Result<AxisSpec, PlanError> {
            Ok(AxisSpec::Split(SplitSpec::new(0, vec![self.rows])))
        }
    }

    struct FailingAdapter;

    impl ShapeAdapter for FailingAdapter {
        fn name(&self) -> &str {
            "failing"
        }

        fn logical_shape(&self) -> Result<Shape, PlanError> {
            Err(PlanError::RankMismatch {
                detail: "operands disagree".into(),
            })
        }

        fn axis_spec(&self) -> Result<AxisSpec, PlanError> {
            Ok(AxisSpec::Fill(FillSpec {
                len: 0,
                bidirectional: false,
            }))
        }
    }

    #[test]
    fn test_plan_for_adapter() {
        let capacity = DeviceProfile::default().with_element_size(4);
        let adapter = RowBlockAdapter {
            rows: 128,
            cols: 64,
        };
        let d = plan_for(&adapter, &capacity).unwrap();
        assert!(d.required_units > 0);
        assert_eq!(d.unit_plan.total_extent(), 128 * 64);
    }

    #[test]
    fn test_adapter_error_propagates() {
        let capacity = DeviceProfile::default().with_element_size(4);
        assert!(matches!(
            plan_for(&FailingAdapter, &capacity),
            Err(PlanError::RankMismatch { .. })
        ));
    }
}
