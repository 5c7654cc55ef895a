// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tiling-planner
//!
//! Plans how a tensor operator's iteration space is executed on a
//! fixed-lane accelerator: which of the parallel units works on which
//! index range, how each unit's share is chunked through its scratch
//! memory, which data-movement template the executor should run, and the
//! fixed-layout [`Descriptor`] that carries all of it across the
//! planning/execution boundary.
//!
//! # Pipeline
//!
//! ```text
//! (shape, axis spec) ──► shape_model::normalize ──► FusedProblem
//!                         strategy::select_strategy ──► StrategyChoice
//!                         unit::partition_units[_2d] ──► PartitionPlan(s)
//!                         chunk::partition_chunks ──► ChunkPlan(s)
//!                         descriptor::emit ──► Descriptor
//! ```
//!
//! Planning is a pure synchronous function of its inputs: no I/O, no
//! suspension points, no shared state. Calls for different operator
//! invocations may run concurrently without coordination. The produced
//! plan assigns disjoint index ranges to every unit, so the downstream
//! execution phase needs no locking or barriers.
//!
//! # Example
//! ```
//! use capacity_probe::DeviceProfile;
//! use tensor_core::{AxisSpec, Shape, SplitSpec};
//!
//! let capacity = DeviceProfile::default().with_element_size(4);
//! let shape = Shape::new(&[1024, 256]).unwrap();
//! let spec = AxisSpec::Split(SplitSpec::new(0, vec![1024]));
//! let descriptor = tiling_planner::plan(&shape, &spec, &capacity).unwrap();
//! assert!(descriptor.required_units > 0);
//! ```

mod adapter;
pub mod chunk;
pub mod descriptor;
mod error;
mod math;
pub mod shape_model;
pub mod strategy;
pub mod unit;

pub use adapter::{plan_for, ShapeAdapter};
pub use chunk::{ChunkPlan, MidpointSplit};
pub use descriptor::{
    AxisGeometry, BlockMoveParams, Descriptor, CHUNK_BACKWARD, CHUNK_FORWARD, CHUNK_MAIN,
    CHUNK_TAIL, DESCRIPTOR_MAX_BYTES, DESCRIPTOR_VERSION, WORKSPACE_BYTES,
};
pub use error::PlanError;
pub use strategy::{StrategyChoice, StrategyDecision};
pub use unit::PartitionPlan;

use crate::chunk::{bisect_midpoint_unit, chunk_capacity, partition_chunks};
use crate::descriptor::MAX_CHUNK_PLANS;
use crate::math::ceil_div;
use crate::shape_model::FusedProblem;
use crate::strategy::{select_strategy, MIN_GATHER_OUTPUT_BYTES, PURE_MOVE_UNIT_GRANULE_BYTES};
use crate::unit::{partition_units, partition_units_2d};
use capacity_probe::CapacityProfile;
use tensor_core::{AxisSpec, Shape};

/// Plans one operator invocation.
///
/// Returns the immutable [`Descriptor`] the executor consumes verbatim,
/// or the first terminal [`PlanError`]. A zero-extent iteration space
/// yields the zero-unit, zero-workspace plan rather than an error.
pub fn plan(
    shape: &Shape,
    axis_spec: &AxisSpec,
    capacity: &CapacityProfile,
) -> Result<Descriptor, PlanError> {
    capacity
        .validate()
        .map_err(|e| PlanError::CapacityInvalid {
            detail: e.to_string(),
        })?;

    let problem = shape_model::normalize(shape, axis_spec)?;
    if problem.is_empty() {
        tracing::debug!("empty iteration space, emitting the zero-unit plan");
        return Ok(Descriptor::empty());
    }

    let choice = select_strategy(&problem, capacity)?;
    let capacity_elems = chunk_capacity(capacity, choice.decision.buffer_radix())?;

    let assembled = match choice.decision {
        StrategyDecision::PureMove => {
            plan_flat(&problem, capacity, capacity_elems, PURE_MOVE_UNIT_GRANULE_BYTES, true)?
        }
        StrategyDecision::ThreadParallelMove { thread_block } => {
            let granule_bytes = thread_block * capacity.element_size as i64;
            plan_flat(&problem, capacity, capacity_elems, granule_bytes, false)?
        }
        StrategyDecision::BlockAlignedMove { .. } => {
            plan_block(&problem, capacity, capacity_elems)?
        }
        StrategyDecision::PaddedGatherMove { .. } => {
            plan_gather(&problem, capacity, capacity_elems)?
        }
    };

    let d = descriptor::emit(
        &problem,
        &choice,
        assembled.unit_plan,
        assembled.col_plan,
        assembled.chunk_plans,
        assembled.midpoint_unit,
        assembled.required_units,
        capacity,
    )?;
    tracing::info!(
        plan_id = d.plan_id,
        required_units = d.required_units,
        main_factor = d.unit_plan.main_factor,
        tail_factor = d.unit_plan.tail_factor,
        "planned {}",
        choice.decision.name(),
    );
    Ok(d)
}

/// Intermediate partitioning state handed to the emitter.
struct AssembledPlan {
    unit_plan: PartitionPlan,
    col_plan: PartitionPlan,
    chunk_plans: [ChunkPlan; MAX_CHUNK_PLANS],
    midpoint_unit: i32,
    required_units: i64,
}

/// One-dimensional partitioning over the flattened iteration space, used
/// by the pure-move and thread-parallel templates. The unit pool shrinks
/// so each engaged unit covers at least `granule_bytes` of output
/// (`bisect` additionally splits the midpoint unit of bidirectional
/// fills).
fn plan_flat(
    problem: &FusedProblem,
    capacity: &CapacityProfile,
    capacity_elems: i64,
    granule_bytes: i64,
    bisect: bool,
) -> Result<AssembledPlan, PlanError> {
    let total = problem.total_output();
    let total_bytes = total * capacity.element_size as i64;
    let pool = (capacity.unit_count as i64)
        .min(ceil_div(total_bytes, granule_bytes))
        .max(1);
    let unit_plan = partition_units(total, pool as i32)?;

    let mut chunk_plans = [ChunkPlan::empty(); MAX_CHUNK_PLANS];
    chunk_plans[CHUNK_MAIN] = partition_chunks(unit_plan.main_factor, capacity_elems);
    chunk_plans[CHUNK_TAIL] = partition_chunks(unit_plan.tail_factor, capacity_elems);

    let mut midpoint_unit = -1;
    if bisect && problem.bidirectional {
        if let Some(split) = bisect_midpoint_unit(total, &unit_plan, capacity_elems) {
            chunk_plans[CHUNK_FORWARD] = split.forward;
            chunk_plans[CHUNK_BACKWARD] = split.backward;
            midpoint_unit = split.unit_index;
            tracing::debug!(
                unit = split.unit_index,
                forward = split.forward_extent,
                backward = split.backward_extent,
                "bisected midpoint unit",
            );
        }
    }

    Ok(AssembledPlan {
        unit_plan,
        col_plan: PartitionPlan::empty(),
        chunk_plans,
        midpoint_unit,
        required_units: unit_plan.used_units() as i64,
    })
}

/// Two-level partitioning for the block-aligned template: outer rows and
/// the fused axis columns share the unit pool; each unit's column share
/// is chunked through scratch.
fn plan_block(
    problem: &FusedProblem,
    capacity: &CapacityProfile,
    capacity_elems: i64,
) -> Result<AssembledPlan, PlanError> {
    let cols = problem.axis_extent * problem.inner;
    let (unit_plan, col_plan) = partition_units_2d(problem.outer, cols, capacity)?;

    let mut chunk_plans = [ChunkPlan::empty(); MAX_CHUNK_PLANS];
    chunk_plans[CHUNK_MAIN] = partition_chunks(col_plan.main_factor, capacity_elems);
    chunk_plans[CHUNK_TAIL] = partition_chunks(col_plan.tail_factor, capacity_elems);

    Ok(AssembledPlan {
        unit_plan,
        col_plan,
        chunk_plans,
        midpoint_unit: -1,
        required_units: unit_plan.used_units() as i64 * col_plan.used_units() as i64,
    })
}

/// Row partitioning for the padded-gather template: whole rows go to
/// units; the per-unit row count is chunked by how many padded rows fit
/// one scratch buffer.
fn plan_gather(
    problem: &FusedProblem,
    capacity: &CapacityProfile,
    capacity_elems: i64,
) -> Result<AssembledPlan, PlanError> {
    let total_bytes = problem.total_output() * capacity.element_size as i64;
    let pool = (capacity.unit_count as i64)
        .min(ceil_div(total_bytes, MIN_GATHER_OUTPUT_BYTES))
        .max(1);
    let unit_plan = partition_units(problem.outer, pool as i32)?;

    let row_elems = (problem.axis_extent * problem.inner).max(1);
    let rows_per_chunk = (capacity_elems / row_elems).max(1);

    let mut chunk_plans = [ChunkPlan::empty(); MAX_CHUNK_PLANS];
    chunk_plans[CHUNK_MAIN] = partition_chunks(unit_plan.main_factor, rows_per_chunk);
    chunk_plans[CHUNK_TAIL] = partition_chunks(unit_plan.tail_factor, rows_per_chunk);

    Ok(AssembledPlan {
        unit_plan,
        col_plan: PartitionPlan::empty(),
        chunk_plans,
        midpoint_unit: -1,
        required_units: unit_plan.used_units() as i64,
    })
}
