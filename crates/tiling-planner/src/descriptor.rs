// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The fixed-layout plan descriptor consumed verbatim by the executor.
//!
//! A [`Descriptor`] is the only artifact that crosses the boundary between
//! planning and execution. Its field widths and array capacities are part
//! of the executor contract; [`Descriptor::to_bytes`] produces the
//! versioned little-endian wire form, which is deterministic for identical
//! plans.

use crate::chunk::ChunkPlan;
use crate::unit::PartitionPlan;
use crate::PlanError;
use tensor_core::MAX_RANK;

/// Wire-format version tag.
pub const DESCRIPTOR_VERSION: u16 = 1;

/// Hard ceiling on the encoded descriptor size.
pub const DESCRIPTOR_MAX_BYTES: usize = 4096;

/// Levels of nested block-move parameters a strategy may address.
pub const MAX_NEST_LEVELS: usize = 2;

/// Chunk-plan slots: main-unit, tail-unit, and the forward/backward pair
/// of the bidirectional midpoint unit.
pub const MAX_CHUNK_PLANS: usize = 4;

/// Index of the main-unit chunk plan in [`Descriptor::chunk_plans`].
pub const CHUNK_MAIN: usize = 0;
/// Index of the tail-unit chunk plan.
pub const CHUNK_TAIL: usize = 1;
/// Index of the midpoint unit's forward-segment chunk plan.
pub const CHUNK_FORWARD: usize = 2;
/// Index of the midpoint unit's backward-segment chunk plan.
pub const CHUNK_BACKWARD: usize = 3;

/// Executor workspace reservation. A fixed constant for every plan that
/// moves data; the empty plan reports zero.
pub const WORKSPACE_BYTES: u64 = 16 * 1024 * 1024;

/// Per-axis stepping of one fused dimension.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize,
)]
pub struct AxisGeometry {
    /// Input element step per output index along this dimension.
    pub input_step: i64,
    /// Output element step along this dimension.
    pub output_step: i64,
    /// Input element offset contributed by this dimension's start.
    pub offset: i64,
}

/// One tier of block-move parameters.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize,
)]
pub struct BlockMoveParams {
    /// Number of bursts in this tier.
    pub block_count: u16,
    /// Burst length in bytes.
    pub block_len: u32,
    /// Source step between bursts in bytes.
    pub src_stride: u32,
    /// Destination step between bursts in bytes.
    pub dst_stride: u32,
}

/// The complete, immutable output of one planning call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Descriptor {
    /// Wire-format version.
    pub version: u16,
    /// Strategy tag the executor dispatches on.
    pub plan_id: u32,
    /// Parallel units the executor must launch (may be below the pool size).
    pub required_units: u32,
    /// Workspace bytes the executor must have available.
    pub workspace_bytes: u64,
    /// Row-level unit distribution.
    pub unit_plan: PartitionPlan,
    /// Column-level unit distribution; all-zero for one-dimensional plans.
    pub col_plan: PartitionPlan,
    /// Scratch chunking per slot (see `CHUNK_*` indices).
    pub chunk_plans: [ChunkPlan; MAX_CHUNK_PLANS],
    /// Unit straddling the generation midpoint; -1 when not bidirectional.
    pub midpoint_unit: i32,
    /// Number of meaningful entries in `axis_geometry`.
    pub geometry_len: u32,
    /// Per-axis stepping, outermost first.
    pub axis_geometry: [AxisGeometry; MAX_RANK],
    /// Nested block-move parameters, innermost tier first.
    pub block_move: [BlockMoveParams; MAX_NEST_LEVELS],
}

impl Descriptor {
    /// The zero-unit, zero-workspace plan for an empty iteration space.
    pub fn empty() -> Self {
        Self {
            version: DESCRIPTOR_VERSION,
            plan_id: crate::strategy::PLAN_ID_EMPTY,
            required_units: 0,
            workspace_bytes: 0,
            unit_plan: PartitionPlan::empty(),
            col_plan: PartitionPlan::empty(),
            chunk_plans: [ChunkPlan::empty(); MAX_CHUNK_PLANS],
            midpoint_unit: -1,
            geometry_len: 0,
            axis_geometry: [AxisGeometry::default(); MAX_RANK],
            block_move: [BlockMoveParams::default(); MAX_NEST_LEVELS],
        }
    }

    /// Returns `true` if this plan bisects a unit at the midpoint.
    pub fn is_bidirectional(&self) -> bool {
        self.midpoint_unit >= 0
    }

    /// Encodes the descriptor into its fixed little-endian wire form.
    ///
    /// Identical plans encode to byte-identical buffers.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::encoded_len());
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.plan_id.to_le_bytes());
        out.extend_from_slice(&self.required_units.to_le_bytes());
        out.extend_from_slice(&self.workspace_bytes.to_le_bytes());
        for plan in [&self.unit_plan, &self.col_plan] {
            out.extend_from_slice(&plan.main_factor.to_le_bytes());
            out.extend_from_slice(&plan.main_count.to_le_bytes());
            out.extend_from_slice(&plan.tail_factor.to_le_bytes());
            out.extend_from_slice(&plan.tail_count.to_le_bytes());
        }
        for chunk in &self.chunk_plans {
            out.extend_from_slice(&chunk.main_factor.to_le_bytes());
            out.extend_from_slice(&chunk.main_count.to_le_bytes());
            out.extend_from_slice(&chunk.tail_factor.to_le_bytes());
        }
        out.extend_from_slice(&self.midpoint_unit.to_le_bytes());
        out.extend_from_slice(&self.geometry_len.to_le_bytes());
        for geo in &self.axis_geometry {
            out.extend_from_slice(&geo.input_step.to_le_bytes());
            out.extend_from_slice(&geo.output_step.to_le_bytes());
            out.extend_from_slice(&geo.offset.to_le_bytes());
        }
        for mv in &self.block_move {
            out.extend_from_slice(&mv.block_count.to_le_bytes());
            out.extend_from_slice(&mv.block_len.to_le_bytes());
            out.extend_from_slice(&mv.src_stride.to_le_bytes());
            out.extend_from_slice(&mv.dst_stride.to_le_bytes());
        }
        out
    }

    /// Size of the encoded wire form in bytes.
    pub fn encoded_len() -> usize {
        2 + 4 + 4 + 8                      // header
            + 2 * (8 + 4 + 8 + 4)          // unit + col plans
            + MAX_CHUNK_PLANS * (8 + 4 + 8) // chunk plans
            + 4 + 4                        // midpoint + geometry length
            + MAX_RANK * 3 * 8             // axis geometry
            + MAX_NEST_LEVELS * (2 + 4 + 4 + 4) // block-move tiers
    }
}

/// Narrows an `i64` into a block-move field, failing with
/// [`PlanError::DescriptorOverflow`] when the value does not fit.
pub(crate) fn narrow<T: TryFrom<i64>>(value: i64, field: &'static str) -> Result<T, PlanError> {
    T::try_from(value).map_err(|_| PlanError::DescriptorOverflow {
        detail: format!("{field} value {value} exceeds its descriptor field width"),
    })
}

/// Serializes all computed plan parameters into the fixed descriptor
/// layout, checking every fixed-width field on the way.
#[allow(clippy::too_many_arguments)]
pub(crate) fn emit(
    problem: &crate::shape_model::FusedProblem,
    choice: &crate::strategy::StrategyChoice,
    unit_plan: PartitionPlan,
    col_plan: PartitionPlan,
    chunk_plans: [ChunkPlan; MAX_CHUNK_PLANS],
    midpoint_unit: i32,
    required_units: i64,
    capacity: &capacity_probe::CapacityProfile,
) -> Result<Descriptor, PlanError> {
    use crate::strategy::StrategyDecision;

    let elem_size = capacity.element_size as i64;
    let (axis_geometry, geometry_len) = pack_geometry(&problem.geometry)?;

    // Innermost tier: the burst the executor issues per move.
    let inner_tier = match choice.decision {
        StrategyDecision::PureMove => {
            let len = chunk_plans[CHUNK_MAIN].main_factor * elem_size;
            BlockMoveParams {
                block_count: 1,
                block_len: narrow(len, "block_len")?,
                src_stride: narrow(len, "src_stride")?,
                dst_stride: narrow(len, "dst_stride")?,
            }
        }
        StrategyDecision::BlockAlignedMove {
            block_len_bytes,
            src_stride_bytes,
            dst_stride_bytes,
        } => BlockMoveParams {
            // One burst per output part of each row.
            block_count: narrow(problem.parts.len() as i64, "block_count")?,
            block_len: narrow(block_len_bytes, "block_len")?,
            src_stride: narrow(src_stride_bytes, "src_stride")?,
            dst_stride: narrow(dst_stride_bytes, "dst_stride")?,
        },
        StrategyDecision::PaddedGatherMove {
            padded_len_bytes,
            burst_count,
            ..
        } => BlockMoveParams {
            block_count: narrow(burst_count, "block_count")?,
            block_len: narrow(padded_len_bytes, "block_len")?,
            src_stride: narrow(problem.axis_stride * problem.inner * elem_size, "src_stride")?,
            dst_stride: narrow(padded_len_bytes, "dst_stride")?,
        },
        StrategyDecision::ThreadParallelMove { .. } => BlockMoveParams::default(),
    };

    // Outer tier: the chunk loop within one unit's share.
    let main_chunk = chunk_plans[CHUNK_MAIN];
    let outer_tier = if main_chunk.main_count > 0 {
        let step = main_chunk.main_factor * elem_size;
        BlockMoveParams {
            block_count: narrow(main_chunk.main_count as i64, "block_count")?,
            block_len: narrow(step, "block_len")?,
            src_stride: narrow(step, "src_stride")?,
            dst_stride: narrow(step, "dst_stride")?,
        }
    } else {
        BlockMoveParams::default()
    };

    Ok(Descriptor {
        version: DESCRIPTOR_VERSION,
        plan_id: choice.decision.plan_id(),
        required_units: narrow(required_units, "required_units")?,
        workspace_bytes: WORKSPACE_BYTES,
        unit_plan,
        col_plan,
        chunk_plans,
        midpoint_unit,
        geometry_len,
        axis_geometry,
        block_move: [inner_tier, outer_tier],
    })
}

/// Copies fused per-axis geometry into the fixed descriptor array.
pub(crate) fn pack_geometry(
    geometry: &[AxisGeometry],
) -> Result<([AxisGeometry; MAX_RANK], u32), PlanError> {
    if geometry.len() > MAX_RANK {
        return Err(PlanError::DescriptorOverflow {
            detail: format!(
                "{} fused axes exceed the {} descriptor slots",
                geometry.len(),
                MAX_RANK,
            ),
        });
    }
    let mut packed = [AxisGeometry::default(); MAX_RANK];
    packed[..geometry.len()].copy_from_slice(geometry);
    Ok((packed, geometry.len() as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_descriptor() {
        let d = Descriptor::empty();
        assert_eq!(d.required_units, 0);
        assert_eq!(d.workspace_bytes, 0);
        assert!(!d.is_bidirectional());
    }

    #[test]
    fn test_encoded_len_matches() {
        let d = Descriptor::empty();
        assert_eq!(d.to_bytes().len(), Descriptor::encoded_len());
        assert!(Descriptor::encoded_len() <= DESCRIPTOR_MAX_BYTES);
    }

    #[test]
    fn test_encoding_deterministic() {
        let d = Descriptor::empty();
        assert_eq!(d.to_bytes(), d.to_bytes());
    }

    #[test]
    fn test_narrow_overflow() {
        let r: Result<u16, _> = narrow(70000, "block_count");
        assert!(matches!(r, Err(PlanError::DescriptorOverflow { .. })));
        let ok: u16 = narrow(42, "block_count").unwrap();
        assert_eq!(ok, 42);
    }

    #[test]
    fn test_pack_geometry_overflow() {
        let geo = vec![AxisGeometry::default(); MAX_RANK + 1];
        assert!(matches!(
            pack_geometry(&geo),
            Err(PlanError::DescriptorOverflow { .. })
        ));
        let (packed, len) = pack_geometry(&geo[..3]).unwrap();
        assert_eq!(len, 3);
        assert_eq!(packed[3], AxisGeometry::default());
    }
}
