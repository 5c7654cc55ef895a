// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Shape, dtype, and axis-specification value types shared by the tiling
//! planner and the operator catalog.
//!
//! This crate provides:
//! - [`Shape`] — a fixed-capacity dimension list (max rank 8, no heap
//!   allocation in the planning hot path).
//! - [`DType`] — supported element types and their byte widths.
//! - [`AxisSpec`] — the tagged description of how an operator carves its
//!   iteration space: [`SplitSpec`], [`SliceSpec`], or [`FillSpec`].
//!
//! # Design Goals
//! - Plain immutable value types; everything is `Copy` or cheaply `Clone`.
//! - Validation at construction, so downstream consumers never re-check.
//! - Clean error types via `thiserror`.

mod axis;
mod dtype;
mod error;
mod shape;

pub use axis::{AxisSpec, FillSpec, SliceSpec, SplitSpec};
pub use dtype::DType;
pub use error::TensorError;
pub use shape::{Shape, MAX_RANK};
