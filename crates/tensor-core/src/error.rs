// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for shape and axis-specification construction.

/// Errors that can occur when building shapes or axis specifications.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TensorError {
    /// The requested rank exceeds the fixed shape capacity.
    #[error("rank {rank} exceeds the maximum supported rank {max}")]
    RankExceeded { rank: usize, max: usize },

    /// A dimension size is negative.
    #[error("dimension {index} is negative: {value}")]
    NegativeDim { index: usize, value: i64 },

    /// A slice specification's per-dimension lists disagree with the rank.
    #[error("slice spec rank {spec_rank} does not match shape rank {shape_rank}")]
    SpecRankMismatch { spec_rank: usize, shape_rank: usize },

    /// More than one split part used the inferred-size sentinel.
    #[error("at most one split part may be inferred, found {count}")]
    MultipleInferredParts { count: usize },

    /// The split part sizes do not cover the axis extent.
    #[error("split parts sum to {got} but the axis extent is {expected}")]
    PartSumMismatch { expected: i64, got: i64 },
}
