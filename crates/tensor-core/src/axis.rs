// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Axis specifications: how an operator carves its iteration space.
//!
//! An [`AxisSpec`] is the operator-agnostic input to the tiling planner.
//! Operators lower their own attributes (concat inputs, slice ranges,
//! generation lengths) into one of the three variants here.

use crate::{Shape, TensorError};

/// Sentinel marking a split part whose size is inferred from the axis
/// extent and the remaining parts.
pub const INFERRED_PART: i64 = -1;

/// Splits one axis into consecutive parts.
///
/// At most one part may carry the [`INFERRED_PART`] sentinel; its value is
/// derived so that all parts sum to the axis extent. Zero-sized parts are
/// allowed (they produce empty outputs).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SplitSpec {
    /// Axis to split. Negative values count from the back.
    pub axis: i64,
    /// Requested part sizes along the axis.
    pub parts: Vec<i64>,
}

impl SplitSpec {
    /// Creates a split specification.
    pub fn new(axis: i64, parts: Vec<i64>) -> Self {
        Self { axis, parts }
    }

    /// Resolves the inferred part (if any) against the axis extent and
    /// checks that the parts cover it exactly.
    pub fn resolved_parts(&self, axis_extent: i64) -> Result<Vec<i64>, TensorError> {
        let mut inferred = None;
        let mut known_sum = 0i64;
        let mut inferred_count = 0usize;
        for (i, &p) in self.parts.iter().enumerate() {
            if p < 0 {
                inferred = Some(i);
                inferred_count += 1;
            } else {
                known_sum += p;
            }
        }
        if inferred_count > 1 {
            return Err(TensorError::MultipleInferredParts {
                count: inferred_count,
            });
        }

        let mut parts = self.parts.clone();
        match inferred {
            Some(i) => {
                if known_sum > axis_extent {
                    return Err(TensorError::PartSumMismatch {
                        expected: axis_extent,
                        got: known_sum,
                    });
                }
                parts[i] = axis_extent - known_sum;
            }
            None => {
                if known_sum != axis_extent {
                    return Err(TensorError::PartSumMismatch {
                        expected: axis_extent,
                        got: known_sum,
                    });
                }
            }
        }
        Ok(parts)
    }
}

/// Slices every dimension of a tensor with a begin/size/stride triple.
///
/// `size` is the *output* extent of the dimension; a dimension is left
/// untouched ("pass-through") when `begin == 0`, `size == dim`, and
/// `stride == 1`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SliceSpec {
    /// Start index per dimension. Negative values count from the back.
    pub begin: Vec<i64>,
    /// Output extent per dimension.
    pub size: Vec<i64>,
    /// Step per dimension (must be positive).
    pub stride: Vec<i64>,
}

impl SliceSpec {
    /// Creates a slice specification.
    pub fn new(begin: Vec<i64>, size: Vec<i64>, stride: Vec<i64>) -> Self {
        Self {
            begin,
            size,
            stride,
        }
    }

    /// Creates the identity slice for `shape` (every dimension pass-through).
    pub fn full(shape: &Shape) -> Self {
        let rank = shape.rank();
        Self {
            begin: vec![0; rank],
            size: shape.dims().to_vec(),
            stride: vec![1; rank],
        }
    }

    /// Returns the rank this specification addresses.
    pub fn rank(&self) -> usize {
        self.begin.len()
    }

    /// Checks that the three per-dimension lists agree on rank.
    pub fn check_rank(&self, shape_rank: usize) -> Result<(), TensorError> {
        for len in [self.begin.len(), self.size.len(), self.stride.len()] {
            if len != shape_rank {
                return Err(TensorError::SpecRankMismatch {
                    spec_rank: len,
                    shape_rank,
                });
            }
        }
        Ok(())
    }

    /// Returns `true` if dimension `d` of a tensor with extent `extent`
    /// passes through unchanged.
    pub fn is_pass_through(&self, d: usize, extent: i64) -> bool {
        self.begin[d] == 0 && self.size[d] == extent && self.stride[d] == 1
    }
}

/// Generates a 1-D value progression of `len` elements.
///
/// `bidirectional` requests the symmetric fill: the first half is produced
/// forward from the start parameter and the mirror half backward from the
/// stop parameter, so the plan must bisect the unit that straddles the
/// midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FillSpec {
    /// Number of generated elements.
    pub len: i64,
    /// Whether the fill runs forward and backward from the midpoint.
    pub bidirectional: bool,
}

/// The tagged union of all iteration-space descriptions the planner accepts.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AxisSpec {
    /// Split one axis into consecutive parts.
    Split(SplitSpec),
    /// Slice every dimension with begin/size/stride.
    Slice(SliceSpec),
    /// Generate a 1-D progression.
    Fill(FillSpec),
}
