// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for operator validation.

use tiling_planner::PlanError;

/// Errors surfaced by operator front ends.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OpError {
    /// An operator attribute is invalid independent of any shape.
    #[error("{op}: {detail}")]
    InvalidAttribute { op: &'static str, detail: String },

    /// The planner rejected the lowered problem.
    #[error(transparent)]
    Plan(#[from] PlanError),
}
