// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Strategy selection: choosing the data-movement template for a fused
//! problem.
//!
//! The decision ladder runs in a fixed order — first matching rule wins —
//! and the order is part of the planning contract:
//!
//! 1. [`StrategyDecision::PureMove`] — fills and problems whose whole
//!    output is one contiguous run (single-part splits, identity slices).
//! 2. [`StrategyDecision::PaddedGatherMove`] — inner runs below the
//!    alignment unit whose combined span still reaches it.
//! 3. [`StrategyDecision::BlockAlignedMove`] — alignment-sized inner runs.
//! 4. [`StrategyDecision::ThreadParallelMove`] — everything else; burst
//!    setup overhead would dominate, so the move runs as parallel scalars.
//!
//! The numeric thresholds are empirically tuned on hardware and preserved
//! as named constants; they are not derived here.

use crate::chunk::chunk_capacity;
use crate::math::ceil_align;
use crate::shape_model::FusedProblem;
use crate::PlanError;
use capacity_probe::CapacityProfile;

/// Plan id of the empty (zero-extent) plan.
pub const PLAN_ID_EMPTY: u32 = 0;
/// Plan id of [`StrategyDecision::PureMove`].
pub const PLAN_ID_PURE_MOVE: u32 = 100;
/// Plan id of [`StrategyDecision::BlockAlignedMove`].
pub const PLAN_ID_BLOCK_ALIGNED: u32 = 101;
/// Plan id of [`StrategyDecision::PaddedGatherMove`].
pub const PLAN_ID_PADDED_GATHER: u32 = 102;
/// Plan id of [`StrategyDecision::ThreadParallelMove`].
pub const PLAN_ID_THREAD_PARALLEL: u32 = 200;

/// Pure moves spread the unit pool over at least this many bytes each.
pub const PURE_MOVE_UNIT_GRANULE_BYTES: i64 = 512;

/// Minimum total output for the padded gather to be economical.
pub const MIN_GATHER_OUTPUT_BYTES: i64 = 128;

/// Largest axis stride the gather template can address.
pub const MAX_GATHER_STRIDE: i64 = 16;

/// Elements one thread block covers in the scalar-parallel template.
pub const THREAD_BLOCK_ELEMS: i64 = 1024;

/// Addressable fused dimensions per strategy.
pub const MAX_DIMS_PURE: usize = 2;
/// See [`MAX_DIMS_PURE`].
pub const MAX_DIMS_BLOCK: usize = 4;
/// See [`MAX_DIMS_PURE`].
pub const MAX_DIMS_GATHER: usize = 5;
/// See [`MAX_DIMS_PURE`].
pub const MAX_DIMS_THREAD: usize = 8;

/// The chosen data-movement template and its mode parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StrategyDecision {
    /// Contiguous staging of the whole per-unit share, no inner loop
    /// structure beyond chunking.
    PureMove,
    /// Contiguous-burst copy with alignment-sized blocks.
    BlockAlignedMove {
        /// Burst length in bytes (a multiple of the alignment unit).
        block_len_bytes: i64,
        /// Source step between bursts in bytes.
        src_stride_bytes: i64,
        /// Destination step between bursts in bytes.
        dst_stride_bytes: i64,
    },
    /// Sub-alignment runs widened into fixed-length padded bursts.
    PaddedGatherMove {
        /// Unpadded burst length in bytes.
        burst_len_bytes: i64,
        /// Padded burst length in bytes (a multiple of the alignment unit).
        padded_len_bytes: i64,
        /// Bursts per outer row.
        burst_count: i64,
    },
    /// Parallel scalar execution; no burst structure at all.
    ThreadParallelMove {
        /// Elements covered per thread block.
        thread_block: i64,
    },
}

impl StrategyDecision {
    /// The strategy tag the executor dispatches on.
    pub fn plan_id(&self) -> u32 {
        match self {
            StrategyDecision::PureMove => PLAN_ID_PURE_MOVE,
            StrategyDecision::BlockAlignedMove { .. } => PLAN_ID_BLOCK_ALIGNED,
            StrategyDecision::PaddedGatherMove { .. } => PLAN_ID_PADDED_GATHER,
            StrategyDecision::ThreadParallelMove { .. } => PLAN_ID_THREAD_PARALLEL,
        }
    }

    /// Human-readable name of the strategy.
    pub fn name(&self) -> &'static str {
        match self {
            StrategyDecision::PureMove => "pure-move",
            StrategyDecision::BlockAlignedMove { .. } => "block-aligned-move",
            StrategyDecision::PaddedGatherMove { .. } => "padded-gather-move",
            StrategyDecision::ThreadParallelMove { .. } => "thread-parallel-move",
        }
    }

    /// Logical scratch buffers the strategy keeps resident at once.
    pub fn buffer_radix(&self) -> i64 {
        match self {
            // Double-buffered staging.
            StrategyDecision::PureMove => 2,
            // Double-buffered input and output.
            StrategyDecision::BlockAlignedMove { .. } => 4,
            // Input, output, and index table, double-buffered.
            StrategyDecision::PaddedGatherMove { .. } => 6,
            // Scalars address memory directly.
            StrategyDecision::ThreadParallelMove { .. } => 1,
        }
    }

    /// Fused dimensions the strategy's loop nest can address.
    pub fn max_chunk_dims(&self) -> usize {
        match self {
            StrategyDecision::PureMove => MAX_DIMS_PURE,
            StrategyDecision::BlockAlignedMove { .. } => MAX_DIMS_BLOCK,
            StrategyDecision::PaddedGatherMove { .. } => MAX_DIMS_GATHER,
            StrategyDecision::ThreadParallelMove { .. } => MAX_DIMS_THREAD,
        }
    }
}

/// A strategy decision plus the fused dimension chosen for chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyChoice {
    /// The selected template.
    pub decision: StrategyDecision,
    /// Index (into the fused dims) of the dimension subdivided across
    /// scratch-sized chunks.
    pub chunk_axis: usize,
}

/// Selects the data-movement strategy for a fused problem.
pub fn select_strategy(
    problem: &FusedProblem,
    capacity: &CapacityProfile,
) -> Result<StrategyChoice, PlanError> {
    let elem_size = capacity.element_size as i64;
    let align = capacity.alignment_bytes as i64;
    let total_bytes = problem.total_output() * elem_size;
    let run_bytes = problem.inner_run_elems() * elem_size;
    let combined_bytes = problem.combined_run_elems() * elem_size;
    let rank = problem.fused_rank();

    if rank > MAX_DIMS_THREAD {
        return Err(PlanError::UnsupportedShape {
            detail: format!("{rank} fused dimensions exceed every strategy's loop nest"),
        });
    }

    let decision = if problem.generated || problem.contiguous {
        // Nothing to interleave: the whole per-unit share is one run.
        StrategyDecision::PureMove
    } else if run_bytes % align != 0
        && run_bytes < align
        && combined_bytes >= align
        && total_bytes >= MIN_GATHER_OUTPUT_BYTES
        && problem.axis_stride <= MAX_GATHER_STRIDE
        && rank <= MAX_DIMS_GATHER
    {
        StrategyDecision::PaddedGatherMove {
            burst_len_bytes: run_bytes,
            padded_len_bytes: ceil_align(run_bytes, align),
            burst_count: if problem.parts.len() > 1 {
                problem.parts.len() as i64
            } else {
                problem.axis_extent
            },
        }
    } else if run_bytes >= align && rank <= MAX_DIMS_BLOCK {
        let (src_step, dst_step) = if rank >= 2 {
            (
                problem.geometry[0].input_step * elem_size,
                problem.geometry[0].output_step * elem_size,
            )
        } else {
            (run_bytes, run_bytes)
        };
        StrategyDecision::BlockAlignedMove {
            block_len_bytes: ceil_align(run_bytes, align),
            src_stride_bytes: src_step,
            dst_stride_bytes: dst_step,
        }
    } else {
        StrategyDecision::ThreadParallelMove {
            thread_block: THREAD_BLOCK_ELEMS,
        }
    };

    let capacity_elems = chunk_capacity(capacity, decision.buffer_radix())?;
    let chunk_axis = select_chunk_axis(
        &problem.dims_out,
        capacity_elems,
        decision.max_chunk_dims(),
    );

    tracing::debug!(
        strategy = decision.name(),
        plan_id = decision.plan_id(),
        chunk_axis,
        run_bytes,
        combined_bytes,
        total_bytes,
        "selected strategy",
    );

    Ok(StrategyChoice {
        decision,
        chunk_axis,
    })
}

/// Finds the outermost dimension whose remaining extent still exceeds the
/// scratch chunk capacity, scanning from the innermost addressable
/// dimension outward. Falls back to the outermost addressable dimension
/// when everything fits.
fn select_chunk_axis(dims_out: &[i64], capacity_elems: i64, max_dims: usize) -> usize {
    if dims_out.is_empty() {
        return 0;
    }
    let left_limit = dims_out.len().saturating_sub(max_dims);
    let mut right_product = 1i64;
    for i in (left_limit..dims_out.len()).rev() {
        let cur = dims_out[i].max(1);
        if right_product * cur >= capacity_elems {
            return i;
        }
        right_product *= cur;
    }
    left_limit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape_model::normalize;
    use capacity_probe::DeviceProfile;
    use tensor_core::{AxisSpec, FillSpec, Shape, SliceSpec, SplitSpec};

    fn capacity(elem: usize) -> CapacityProfile {
        DeviceProfile::default().with_element_size(elem)
    }

    fn split_problem(shape: &[i64], axis: i64, parts: Vec<i64>) -> FusedProblem {
        normalize(
            &Shape::new(shape).unwrap(),
            &AxisSpec::Split(SplitSpec::new(axis, parts)),
        )
        .unwrap()
    }

    #[test]
    fn test_single_part_split_is_pure_move() {
        let p = split_problem(&[1820, 232], 0, vec![1820]);
        let c = select_strategy(&p, &capacity(1)).unwrap();
        assert_eq!(c.decision, StrategyDecision::PureMove);
        assert_eq!(c.decision.plan_id(), PLAN_ID_PURE_MOVE);
    }

    #[test]
    fn test_fill_is_pure_move() {
        let p = normalize(
            &Shape::vector(640000),
            &AxisSpec::Fill(FillSpec {
                len: 640000,
                bidirectional: true,
            }),
        )
        .unwrap();
        let c = select_strategy(&p, &capacity(4)).unwrap();
        assert_eq!(c.decision, StrategyDecision::PureMove);
    }

    #[test]
    fn test_aligned_inner_run_is_block_move() {
        // Two 8-column f32 halves: 32-byte runs, exactly one alignment unit.
        let p = split_problem(&[11, 16], 1, vec![8, 8]);
        let c = select_strategy(&p, &capacity(4)).unwrap();
        match c.decision {
            StrategyDecision::BlockAlignedMove {
                block_len_bytes,
                src_stride_bytes,
                dst_stride_bytes,
            } => {
                assert_eq!(block_len_bytes % 32, 0);
                assert_eq!(src_stride_bytes, 16 * 4);
                assert_eq!(dst_stride_bytes, 8 * 4);
            }
            other => panic!("expected block-aligned move, got {other:?}"),
        }
    }

    #[test]
    fn test_sub_alignment_run_with_volume_is_gather() {
        // 16-byte runs below the 32-byte alignment unit, but the combined
        // row reaches it and the output volume is economical.
        let p = split_problem(&[1024, 16], 1, vec![8, 8]);
        let c = select_strategy(&p, &capacity(2)).unwrap();
        match c.decision {
            StrategyDecision::PaddedGatherMove {
                burst_len_bytes,
                padded_len_bytes,
                burst_count,
            } => {
                assert_eq!(burst_len_bytes, 16);
                assert_eq!(padded_len_bytes, 32);
                assert_eq!(burst_count, 2);
            }
            other => panic!("expected padded gather, got {other:?}"),
        }
    }

    #[test]
    fn test_sub_alignment_split_is_gather() {
        // Two 8-column f16 halves: 16-byte runs below the alignment unit,
        // but the combined 32-byte row reaches it.
        let p = split_problem(&[11, 16], 1, vec![8, 8]);
        let c = select_strategy(&p, &capacity(2)).unwrap();
        match c.decision {
            StrategyDecision::PaddedGatherMove {
                burst_len_bytes,
                padded_len_bytes,
                burst_count,
            } => {
                assert_eq!(burst_len_bytes, 16);
                assert_eq!(padded_len_bytes, 32);
                assert_eq!(burst_count, 2);
            }
            other => panic!("expected padded gather, got {other:?}"),
        }
    }

    #[test]
    fn test_short_combined_run_is_thread_parallel() {
        // Byte elements: even the combined 16-byte row misses the
        // alignment unit, so burst setup cannot pay off.
        let p = split_problem(&[3, 16], 1, vec![8, 8]);
        let c = select_strategy(&p, &capacity(1)).unwrap();
        assert!(matches!(
            c.decision,
            StrategyDecision::ThreadParallelMove { .. }
        ));
    }

    #[test]
    fn test_wide_stride_skips_gather() {
        // Strided slice keeping every 32nd element: runs of one element,
        // stride beyond the gather template's reach.
        let shape = Shape::new(&[512, 1024]).unwrap();
        let spec = AxisSpec::Slice(SliceSpec::new(vec![0, 0], vec![512, 32], vec![1, 32]));
        let p = normalize(&shape, &spec).unwrap();
        let c = select_strategy(&p, &capacity(4)).unwrap();
        assert!(matches!(
            c.decision,
            StrategyDecision::ThreadParallelMove { .. }
        ));
    }

    #[test]
    fn test_strided_slice_within_gather_reach() {
        // Every 4th f16 element out of wide rows: 2-byte runs, combined
        // span (253 elements) well past one alignment unit.
        let shape = Shape::new(&[4096, 256]).unwrap();
        let spec = AxisSpec::Slice(SliceSpec::new(vec![0, 0], vec![4096, 64], vec![1, 4]));
        let p = normalize(&shape, &spec).unwrap();
        let c = select_strategy(&p, &capacity(2)).unwrap();
        assert!(matches!(
            c.decision,
            StrategyDecision::PaddedGatherMove { .. }
        ));
    }

    #[test]
    fn test_plan_ids_are_distinct() {
        let ids = [
            PLAN_ID_EMPTY,
            PLAN_ID_PURE_MOVE,
            PLAN_ID_BLOCK_ALIGNED,
            PLAN_ID_PADDED_GATHER,
            PLAN_ID_THREAD_PARALLEL,
        ];
        let mut dedup = ids.to_vec();
        dedup.sort_unstable();
        dedup.dedup();
        assert_eq!(dedup.len(), ids.len());
    }

    #[test]
    fn test_select_chunk_axis_scan() {
        // Innermost block of 4096 exceeds a 1024-element capacity.
        assert_eq!(select_chunk_axis(&[10, 64, 4096], 1024, 4), 2);
        // Capacity runs out one level further up.
        assert_eq!(select_chunk_axis(&[10, 64, 512], 1024, 4), 1);
        // Everything fits: outermost addressable dimension.
        assert_eq!(select_chunk_axis(&[2, 3, 4], 1024, 4), 0);
        // The addressable window is capped.
        assert_eq!(select_chunk_axis(&[9, 9, 2, 3, 4], 1024, 3), 2);
    }

    #[test]
    fn test_chunk_axis_respects_strategy_cap() {
        let p = split_problem(&[1024, 16], 1, vec![8, 8]);
        let c = select_strategy(&p, &capacity(2)).unwrap();
        assert!(c.chunk_axis < p.fused_rank());
    }
}
