// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Shape normalization and axis fusion.
//!
//! Every operator's iteration space is reduced here to an
//! `outer × axis × inner` form before any partitioning happens:
//! dimensions left of the partition axis multiply into `outer`, dimensions
//! right of it into `inner`. For slices, runs of adjacent pass-through
//! dimensions fuse into one logical dimension first, so downstream stages
//! only ever reason about the dimensions the slice actually disturbs.

use crate::descriptor::AxisGeometry;
use crate::PlanError;
use tensor_core::{AxisSpec, Shape, SliceSpec};

/// A normalized, fused planning problem.
///
/// The planner's single internal currency: strategy selection, unit
/// partitioning, and chunking all read from this and never from the raw
/// operator inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct FusedProblem {
    /// Product of output extents left of the partition axis.
    pub outer: i64,
    /// Output extent along the partition axis.
    pub axis_extent: i64,
    /// Input extent along the partition axis.
    pub input_axis_extent: i64,
    /// Product of output extents right of the partition axis
    /// (the contiguous tail of every output row).
    pub inner: i64,
    /// Input element step along the partition axis.
    pub axis_stride: i64,
    /// Resolved output parts along the axis (one entry for slices/fills).
    pub parts: Vec<i64>,
    /// Whether the fill runs forward and backward from the midpoint.
    pub bidirectional: bool,
    /// Whether the problem generates values instead of moving them.
    pub generated: bool,
    /// Whether the whole output is one contiguous input run (identity
    /// slice, single-part split, or a fill).
    pub contiguous: bool,
    /// Output extent of each fused dimension, outermost first, parallel
    /// to `geometry`.
    pub dims_out: Vec<i64>,
    /// Per-fused-dimension stepping, outermost first.
    pub geometry: Vec<AxisGeometry>,
}

impl FusedProblem {
    /// Total number of output elements.
    pub fn total_output(&self) -> i64 {
        self.outer * self.axis_extent * self.inner
    }

    /// `true` when the iteration space has no elements.
    pub fn is_empty(&self) -> bool {
        self.total_output() == 0
    }

    /// `true` when at most one part carries data — the whole problem is a
    /// single contiguous move (or fill).
    pub fn single_part(&self) -> bool {
        self.parts.iter().filter(|&&p| p > 0).count() <= 1
    }

    /// Smallest non-empty output part along the axis.
    pub fn min_part(&self) -> i64 {
        self.parts
            .iter()
            .copied()
            .filter(|&p| p > 0)
            .min()
            .unwrap_or(0)
    }

    /// Contiguous output run in elements: what one burst can move without
    /// re-addressing.
    pub fn inner_run_elems(&self) -> i64 {
        if self.generated {
            self.axis_extent
        } else if self.axis_stride == 1 {
            if self.parts.len() > 1 {
                self.min_part() * self.inner
            } else {
                self.axis_extent * self.inner
            }
        } else {
            self.inner
        }
    }

    /// Input span in elements covered when the adjacent (axis) dimension
    /// is folded into one padded burst.
    pub fn combined_run_elems(&self) -> i64 {
        if self.generated {
            self.axis_extent
        } else if self.axis_extent == 0 {
            0
        } else {
            ((self.axis_extent - 1) * self.axis_stride + 1) * self.inner
        }
    }

    /// Number of fused dimensions.
    pub fn fused_rank(&self) -> usize {
        self.geometry.len()
    }
}

/// Normalizes a raw `(shape, axis spec)` pair into a [`FusedProblem`].
pub fn normalize(shape: &Shape, spec: &AxisSpec) -> Result<FusedProblem, PlanError> {
    match spec {
        AxisSpec::Split(split) => normalize_split(shape, split),
        AxisSpec::Slice(slice) => normalize_slice(shape, slice),
        AxisSpec::Fill(fill) => {
            if fill.len < 0 {
                return Err(PlanError::ShapeMismatch {
                    detail: format!("fill length is negative: {}", fill.len),
                });
            }
            Ok(FusedProblem {
                outer: 1,
                axis_extent: fill.len,
                input_axis_extent: fill.len,
                inner: 1,
                axis_stride: 1,
                parts: vec![fill.len],
                bidirectional: fill.bidirectional,
                generated: true,
                contiguous: true,
                dims_out: vec![fill.len],
                geometry: vec![AxisGeometry {
                    input_step: 0,
                    output_step: 1,
                    offset: 0,
                }],
            })
        }
    }
}

/// Resolves a possibly negative axis index against `rank`.
pub fn resolve_axis(axis: i64, rank: usize) -> Result<usize, PlanError> {
    let resolved = if axis < 0 { axis + rank as i64 } else { axis };
    if resolved < 0 || resolved >= rank as i64 {
        return Err(PlanError::AxisOutOfRange { axis, rank });
    }
    Ok(resolved as usize)
}

fn normalize_split(
    shape: &Shape,
    split: &tensor_core::SplitSpec,
) -> Result<FusedProblem, PlanError> {
    // Scalars plan as a single-element vector.
    let shape = if shape.rank() == 0 {
        Shape::vector(1)
    } else {
        *shape
    };
    let axis = resolve_axis(split.axis, shape.rank())?;
    let axis_extent = shape.dims()[axis];
    let parts = split
        .resolved_parts(axis_extent)
        .map_err(|e| PlanError::ShapeMismatch {
            detail: e.to_string(),
        })?;

    let outer = shape.outer_extent(axis);
    let inner = shape.inner_extent(axis);
    let primary_part = parts.iter().copied().find(|&p| p > 0).unwrap_or(0);

    let mut geometry = vec![
        AxisGeometry {
            input_step: axis_extent * inner,
            output_step: primary_part * inner,
            offset: 0,
        },
        AxisGeometry {
            input_step: inner,
            output_step: inner,
            offset: 0,
        },
    ];
    let mut dims_out = vec![outer, axis_extent];
    if inner > 1 {
        geometry.push(AxisGeometry {
            input_step: 1,
            output_step: 1,
            offset: 0,
        });
        dims_out.push(inner);
    }
    let contiguous = parts.iter().filter(|&&p| p > 0).count() <= 1;

    tracing::debug!(
        outer,
        axis_extent,
        inner,
        parts = parts.len(),
        "fused split problem",
    );

    Ok(FusedProblem {
        outer,
        axis_extent,
        input_axis_extent: axis_extent,
        inner,
        axis_stride: 1,
        parts,
        bidirectional: false,
        generated: false,
        contiguous,
        dims_out,
        geometry,
    })
}

/// One fused dimension of a slice: `output` consecutive indices stepping
/// `stride` through `input` starting at `begin`.
#[derive(Debug, Clone, Copy)]
struct FusedDim {
    input: i64,
    output: i64,
    begin: i64,
    stride: i64,
}

impl FusedDim {
    fn pass_through(&self) -> bool {
        self.begin == 0 && self.output == self.input && self.stride == 1
    }
}

fn normalize_slice(shape: &Shape, slice: &SliceSpec) -> Result<FusedProblem, PlanError> {
    let rank = shape.rank();
    slice.check_rank(rank).map_err(|e| PlanError::RankMismatch {
        detail: e.to_string(),
    })?;
    if rank == 0 {
        // Scalar identity slice.
        return normalize_slice(&Shape::vector(1), &SliceSpec::full(&Shape::vector(1)));
    }

    // Resolve and validate each dimension.
    let mut dims = Vec::with_capacity(rank);
    for d in 0..rank {
        let extent = shape.dims()[d];
        let stride = slice.stride[d];
        if stride <= 0 {
            return Err(PlanError::UnsupportedShape {
                detail: format!("non-positive stride {stride} in dimension {d}"),
            });
        }
        let size = slice.size[d];
        if size < 0 {
            return Err(PlanError::ShapeMismatch {
                detail: format!("negative slice size {size} in dimension {d}"),
            });
        }
        let begin = if slice.begin[d] < 0 {
            slice.begin[d] + extent
        } else {
            slice.begin[d]
        };
        if begin < 0 || (size > 0 && begin + (size - 1) * stride > extent - 1) {
            return Err(PlanError::ShapeMismatch {
                detail: format!(
                    "slice [begin {begin}, size {size}, stride {stride}] exceeds \
                     dimension {d} of extent {extent}",
                ),
            });
        }
        dims.push(FusedDim {
            input: extent,
            output: size,
            begin,
            stride,
        });
    }

    // Fuse runs of adjacent pass-through dimensions.
    let mut fused: Vec<FusedDim> = Vec::with_capacity(rank);
    for dim in dims {
        match fused.last_mut() {
            Some(prev) if prev.pass_through() && dim.pass_through() => {
                prev.input *= dim.input;
                prev.output *= dim.output;
            }
            _ => fused.push(dim),
        }
    }

    // The partition axis is the innermost fused dimension the slice
    // actually disturbs; a fully pass-through slice is a plain copy.
    let axis = fused
        .iter()
        .rposition(|d| !d.pass_through())
        .unwrap_or(fused.len() - 1);

    let outer: i64 = fused[..axis].iter().map(|d| d.output).product();
    let inner: i64 = fused[axis + 1..].iter().map(|d| d.output).product();
    let axis_dim = fused[axis];

    // Geometry: input step per output index, outermost first.
    let mut geometry = Vec::with_capacity(fused.len());
    for (i, dim) in fused.iter().enumerate() {
        let inner_input: i64 = fused[i + 1..].iter().map(|d| d.input).product();
        let inner_output: i64 = fused[i + 1..].iter().map(|d| d.output).product();
        geometry.push(AxisGeometry {
            input_step: dim.stride * inner_input,
            output_step: inner_output,
            offset: dim.begin * inner_input,
        });
    }

    tracing::debug!(
        fused_rank = fused.len(),
        outer,
        axis_extent = axis_dim.output,
        inner,
        stride = axis_dim.stride,
        "fused slice problem",
    );

    let contiguous = fused.len() == 1 && fused[0].pass_through();
    Ok(FusedProblem {
        outer,
        axis_extent: axis_dim.output,
        input_axis_extent: axis_dim.input,
        inner,
        axis_stride: axis_dim.stride,
        parts: vec![axis_dim.output],
        bidirectional: false,
        generated: false,
        contiguous,
        dims_out: fused.iter().map(|d| d.output).collect(),
        geometry,
    })
}
