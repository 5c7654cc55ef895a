// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the tiling planner.
//!
//! All errors are terminal for the single planning call — nothing is
//! retried internally and no partial plan is ever returned.

/// Errors that can occur during tiling planning.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// The axis index is outside the shape's rank after negative-index
    /// resolution.
    #[error("axis {axis} out of range for rank {rank}")]
    AxisOutOfRange { axis: i64, rank: usize },

    /// Operand ranks (or a spec's per-dimension lists) disagree.
    #[error("rank mismatch: {detail}")]
    RankMismatch { detail: String },

    /// Operand dimensions disagree, or an axis specification does not
    /// cover its axis.
    #[error("shape mismatch: {detail}")]
    ShapeMismatch { detail: String },

    /// The supplied capacity profile cannot support any valid plan.
    #[error("capacity invalid: {detail}")]
    CapacityInvalid { detail: String },

    /// The shape falls outside every strategy's addressable pattern.
    /// A planner limitation, not a data error.
    #[error("unsupported shape: {detail}")]
    UnsupportedShape { detail: String },

    /// The plan exceeds the fixed descriptor capacity.
    #[error("descriptor overflow: {detail}")]
    DescriptorOverflow { detail: String },
}
