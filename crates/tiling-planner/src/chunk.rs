// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Chunk partitioning: subdividing one unit's share into scratch-sized
//! pieces.
//!
//! The distribution mirrors [`crate::unit::partition_units`] but runs over
//! "chunks within one unit": a main chunk factor repeated `count − 1`
//! times plus one tail chunk. The bidirectional variant additionally
//! bisects the unit straddling the global midpoint into independently
//! chunked forward and backward segments.

use crate::math::{ceil_div, floor_align};
use crate::unit::PartitionPlan;
use crate::PlanError;
use capacity_probe::CapacityProfile;

/// Scratch bytes reserved for index tables and staging bookkeeping before
/// any chunk capacity is computed.
pub const SCRATCH_RESERVE_BYTES: i64 = 8 * 1024;

/// Chunking of one unit's extent: `main_factor` for the first
/// `main_count − 1` chunks, `tail_factor` for the last.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize,
)]
pub struct ChunkPlan {
    /// Elements per full chunk.
    pub main_factor: i64,
    /// Total number of chunks (including the tail chunk).
    pub main_count: i32,
    /// Elements in the final chunk.
    pub tail_factor: i64,
}

impl ChunkPlan {
    /// The all-zero plan for an empty extent.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Total extent covered by the plan.
    pub fn covered(&self) -> i64 {
        if self.main_count == 0 {
            0
        } else {
            self.main_factor * (self.main_count as i64 - 1) + self.tail_factor
        }
    }
}

/// Computes the per-buffer chunk capacity in elements.
///
/// The usable scratch (after the fixed reserve) is divided among the
/// `buffer_radix` logical buffers the strategy keeps resident at once,
/// then floored to the alignment granularity. Fails with
/// [`PlanError::CapacityInvalid`] when the result cannot hold even one
/// alignment unit — planning cannot proceed and the error is fatal.
pub fn chunk_capacity(capacity: &CapacityProfile, buffer_radix: i64) -> Result<i64, PlanError> {
    let elem_size = capacity.element_size as i64;
    let align_elems = capacity.alignment_elems();
    let usable = capacity.scratch_bytes as i64 - SCRATCH_RESERVE_BYTES;
    if usable <= 0 {
        return Err(PlanError::CapacityInvalid {
            detail: format!(
                "scratch of {} bytes cannot cover the {} byte reserve",
                capacity.scratch_bytes, SCRATCH_RESERVE_BYTES,
            ),
        });
    }
    let per_buffer = usable / buffer_radix.max(1) / elem_size;
    let aligned = floor_align(per_buffer, align_elems);
    if aligned < align_elems {
        return Err(PlanError::CapacityInvalid {
            detail: format!(
                "scratch of {} bytes leaves {per_buffer} elements per buffer, \
                 below one alignment unit of {align_elems}",
                capacity.scratch_bytes,
            ),
        });
    }
    Ok(aligned)
}

/// Divides `extent` into chunks of at most `capacity_elems` elements.
pub fn partition_chunks(extent: i64, capacity_elems: i64) -> ChunkPlan {
    if extent <= 0 || capacity_elems <= 0 {
        return ChunkPlan::empty();
    }
    let main_factor = extent.min(capacity_elems);
    let count = ceil_div(extent, main_factor);
    let tail_factor = extent - main_factor * (count - 1);
    let plan = ChunkPlan {
        main_factor,
        main_count: count as i32,
        tail_factor,
    };
    debug_assert_eq!(plan.covered(), extent);
    plan
}

/// The bisected midpoint unit of a bidirectional fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MidpointSplit {
    /// Index of the unit straddling the midpoint.
    pub unit_index: i32,
    /// Elements between the unit start and the midpoint (produced
    /// ascending from the start parameter).
    pub forward_extent: i64,
    /// Remaining elements of the unit (produced descending from the stop
    /// parameter).
    pub backward_extent: i64,
    /// Chunking of the forward segment.
    pub forward: ChunkPlan,
    /// Chunking of the backward segment.
    pub backward: ChunkPlan,
}

/// Locates and bisects the unit containing the midpoint of a
/// bidirectional fill.
///
/// `half = total / 2`; the straddling unit is `half / per_unit`, stepping
/// back one when the midpoint lands exactly on a unit boundary (that unit
/// then carries an empty backward segment). Units before it run purely
/// forward, units after purely backward. Returns `None` for problems too
/// small to bisect.
pub fn bisect_midpoint_unit(
    total_extent: i64,
    units: &PartitionPlan,
    capacity_elems: i64,
) -> Option<MidpointSplit> {
    if total_extent <= 1 || units.main_factor == 0 {
        return None;
    }
    let half = total_extent / 2;
    let per_unit = units.main_factor;
    let mut index = half / per_unit;
    if half % per_unit == 0 {
        index -= 1;
    }
    let unit_extent = units.unit_extent(index as i32);
    let forward_extent = half - index * per_unit;
    let backward_extent = unit_extent - forward_extent;
    Some(MidpointSplit {
        unit_index: index as i32,
        forward_extent,
        backward_extent,
        forward: partition_chunks(forward_extent, capacity_elems),
        backward: partition_chunks(backward_extent, capacity_elems),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::partition_units;
    use capacity_probe::DeviceProfile;

    fn capacity(elem: usize) -> CapacityProfile {
        DeviceProfile::default().with_element_size(elem)
    }

    #[test]
    fn test_chunk_capacity_aligned() {
        let cap = chunk_capacity(&capacity(4), 2).unwrap();
        // (253952 - 8192) / 2 / 4 = 30720 elements, already 8-aligned.
        assert_eq!(cap, 30720);
        assert_eq!(cap % capacity(4).alignment_elems(), 0);
    }

    #[test]
    fn test_chunk_capacity_too_small() {
        let tiny = CapacityProfile {
            unit_count: 4,
            scratch_bytes: 4096,
            alignment_bytes: 32,
            element_size: 4,
        };
        assert!(matches!(
            chunk_capacity(&tiny, 2),
            Err(PlanError::CapacityInvalid { .. })
        ));
    }

    #[test]
    fn test_chunk_capacity_radix_below_alignment() {
        // 9 KiB scratch leaves 1 KiB usable; radix 64 gives 4 elements per
        // buffer, below the 8-element alignment unit.
        let p = CapacityProfile {
            unit_count: 4,
            scratch_bytes: 9 * 1024,
            alignment_bytes: 32,
            element_size: 4,
        };
        assert!(chunk_capacity(&p, 64).is_err());
        assert!(chunk_capacity(&p, 2).is_ok());
    }

    #[test]
    fn test_partition_chunks_exact() {
        let c = partition_chunks(100, 25);
        assert_eq!(c.main_factor, 25);
        assert_eq!(c.main_count, 4);
        assert_eq!(c.tail_factor, 25);
        assert_eq!(c.covered(), 100);
    }

    #[test]
    fn test_partition_chunks_with_tail() {
        let c = partition_chunks(100, 30);
        assert_eq!(c.main_factor, 30);
        assert_eq!(c.main_count, 4);
        assert_eq!(c.tail_factor, 10);
        assert_eq!(c.covered(), 100);
    }

    #[test]
    fn test_partition_chunks_fits_whole() {
        let c = partition_chunks(10, 30);
        assert_eq!(c.main_factor, 10);
        assert_eq!(c.main_count, 1);
        assert_eq!(c.tail_factor, 10);
    }

    #[test]
    fn test_partition_chunks_empty() {
        assert_eq!(partition_chunks(0, 30), ChunkPlan::empty());
    }

    #[test]
    fn test_chunk_coverage_sweep() {
        for extent in [1i64, 7, 64, 101, 4096, 99991] {
            for cap in [1i64, 8, 30, 1024, 200000] {
                let c = partition_chunks(extent, cap);
                assert_eq!(c.covered(), extent, "extent={extent} cap={cap}");
                assert!(c.tail_factor <= c.main_factor);
            }
        }
    }

    #[test]
    fn test_bisect_midpoint_on_boundary() {
        // 640000 over 32 units: 20000 each. The midpoint (320000) lands on
        // the boundary after unit 15, which takes a full forward segment
        // and an empty backward one.
        let units = partition_units(640000, 32).unwrap();
        let split = bisect_midpoint_unit(640000, &units, 30720).unwrap();
        assert_eq!(split.unit_index, 15);
        assert_eq!(split.forward_extent, 20000);
        assert_eq!(split.backward_extent, 0);
        assert_eq!(
            split.forward.covered() + split.backward.covered(),
            units.unit_extent(15),
        );
    }

    #[test]
    fn test_bisect_midpoint_inside_unit() {
        // 100 over 3 units: 34 34 32. Midpoint 50 falls inside unit 1.
        let units = partition_units(100, 3).unwrap();
        let split = bisect_midpoint_unit(100, &units, 1024).unwrap();
        assert_eq!(split.unit_index, 1);
        assert_eq!(split.forward_extent, 50 - 34);
        assert_eq!(split.backward_extent, 34 - 16);
        assert_eq!(
            split.forward_extent + split.backward_extent,
            units.unit_extent(1),
        );
    }

    #[test]
    fn test_bisect_tail_unit() {
        // 10 over 3 units: 4 4 2. Midpoint 5 falls inside unit 1.
        let units = partition_units(10, 3).unwrap();
        let split = bisect_midpoint_unit(10, &units, 1024).unwrap();
        assert_eq!(split.unit_index, 1);
        assert_eq!(split.forward_extent, 1);
        assert_eq!(split.backward_extent, 3);
    }

    #[test]
    fn test_bisect_single_element() {
        let units = partition_units(1, 4).unwrap();
        assert!(bisect_midpoint_unit(1, &units, 1024).is_none());
    }
}
