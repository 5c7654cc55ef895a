// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # op-catalog
//!
//! Operator front ends for the tiling planner.
//!
//! Each operator type validates its own attributes and lowers them to the
//! planner's `(Shape, AxisSpec)` inputs through the
//! [`tiling_planner::ShapeAdapter`] seam. The planner itself knows
//! nothing about concatenation or histograms — only about the fused
//! iteration spaces these adapters derive.
//!
//! # Example
//! ```
//! use capacity_probe::DeviceProfile;
//! use op_catalog::Split;
//! use tensor_core::{DType, Shape};
//!
//! let op = Split {
//!     input: Shape::new(&[11, 16]).unwrap(),
//!     axis: 1,
//!     parts: vec![8, 8],
//!     dtype: DType::F16,
//! };
//! let descriptor = op.plan(&DeviceProfile::default()).unwrap();
//! assert!(descriptor.required_units > 0);
//! ```

mod concat;
mod error;
mod histogram;
mod lin_space;
mod pairwise_distance;
mod split;
mod strided_slice;

pub use concat::Concat;
pub use error::OpError;
pub use histogram::Histogram;
pub use lin_space::LinSpace;
pub use pairwise_distance::PairwiseDistance;
pub use split::Split;
pub use strided_slice::StridedSlice;

use capacity_probe::DeviceProfile;
use tiling_planner::{Descriptor, ShapeAdapter};

/// A serializable, tagged union over every operator the catalog knows.
///
/// Useful for problem-description files and tooling; library callers can
/// equally use the concrete operator types directly.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum OperatorSpec {
    /// Concatenation along one axis.
    Concat(Concat),
    /// Axis split into consecutive parts.
    Split(Split),
    /// Strided slice over every dimension.
    StridedSlice(StridedSlice),
    /// Linear-space generation.
    LinSpace(LinSpace),
    /// Pairwise distance between two point sets.
    PairwiseDistance(PairwiseDistance),
    /// Value histogram.
    Histogram(Histogram),
}

impl OperatorSpec {
    /// The operator as a planner adapter.
    pub fn as_adapter(&self) -> &dyn ShapeAdapter {
        match self {
            OperatorSpec::Concat(op) => op,
            OperatorSpec::Split(op) => op,
            OperatorSpec::StridedSlice(op) => op,
            OperatorSpec::LinSpace(op) => op,
            OperatorSpec::PairwiseDistance(op) => op,
            OperatorSpec::Histogram(op) => op,
        }
    }

    /// The operator's element type.
    pub fn dtype(&self) -> tensor_core::DType {
        match self {
            OperatorSpec::Concat(op) => op.dtype,
            OperatorSpec::Split(op) => op.dtype,
            OperatorSpec::StridedSlice(op) => op.dtype,
            OperatorSpec::LinSpace(op) => op.dtype,
            OperatorSpec::PairwiseDistance(op) => op.dtype,
            OperatorSpec::Histogram(op) => op.dtype,
        }
    }

    /// Plans this operator on the given device.
    pub fn plan(&self, device: &DeviceProfile) -> Result<Descriptor, OpError> {
        let capacity = device.with_element_size(self.dtype().size_bytes());
        tracing::debug!(
            op = self.as_adapter().name(),
            dtype = self.dtype().as_str(),
            "planning catalog operator",
        );
        Ok(tiling_planner::plan_for(self.as_adapter(), &capacity)?)
    }
}
