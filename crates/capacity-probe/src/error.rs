// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for capacity detection.

/// Errors that can occur when building a capacity profile.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    /// An environment override could not be parsed as a number.
    #[error("failed to parse {var}='{value}' as an integer")]
    ParseError { var: &'static str, value: String },

    /// The assembled profile violates a hard constraint.
    #[error("invalid capacity profile: {detail}")]
    InvalidProfile { detail: String },

    /// The requested device generation is not in the built-in table.
    #[error("unknown device generation '{name}'")]
    UnknownGeneration { name: String },
}
