// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Unit partitioning: spreading an extent across the parallel-unit pool.
//!
//! Two entry points:
//! - [`partition_units`] — the one-dimensional front-loaded distribution
//!   used by every strategy: all main units receive the same factor and at
//!   most one tail unit receives the smaller remainder.
//! - [`partition_units_2d`] — the two-level distribution used when an
//!   outer (batch) extent and an axis extent must share the same unit
//!   pool: candidate factorizations `m × n ≈ units` are enumerated and
//!   scored by wasted work.

use crate::math::ceil_div;
use crate::PlanError;
use capacity_probe::CapacityProfile;

/// Column extents are rounded up to this granule before choosing a 2-D
/// factorization, which biases the search away from cutting an axis into
/// transfers too short to move efficiently.
pub const COL_GRANULE_BYTES: i64 = 512;

/// Minimum bytes of work per engaged unit; below this the pool is shrunk
/// instead of fanning out.
pub const MIN_UNIT_WORK_BYTES: i64 = 8 * 1024;

/// One level of even distribution: `main_factor × main_count +
/// tail_factor × tail_count == total`, with `tail_factor <= main_factor`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize,
)]
pub struct PartitionPlan {
    /// Share given to each main unit.
    pub main_factor: i64,
    /// Number of units receiving `main_factor`.
    pub main_count: i32,
    /// Share given to each tail unit (zero when the split is exact).
    pub tail_factor: i64,
    /// Number of units receiving `tail_factor`.
    pub tail_count: i32,
}

impl PartitionPlan {
    /// The all-zero plan for an empty extent.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Total extent covered by the plan.
    pub fn total_extent(&self) -> i64 {
        self.main_factor * self.main_count as i64 + self.tail_factor * self.tail_count as i64
    }

    /// Number of units that received non-zero work.
    pub fn used_units(&self) -> i32 {
        let tail = if self.tail_factor > 0 {
            self.tail_count
        } else {
            0
        };
        self.main_count + tail
    }

    /// Extent assigned to `unit`, zero past the engaged pool.
    pub fn unit_extent(&self, unit: i32) -> i64 {
        if unit < self.main_count {
            self.main_factor
        } else if unit < self.main_count + self.tail_count {
            self.tail_factor
        } else {
            0
        }
    }

    /// Start offset of `unit` within the partitioned extent.
    pub fn unit_offset(&self, unit: i32) -> i64 {
        let main_units = (unit.min(self.main_count)) as i64;
        let tail_units = (unit - self.main_count).max(0) as i64;
        main_units * self.main_factor + tail_units * self.tail_factor
    }
}

/// Divides `total_extent` across at most `unit_count` units.
///
/// `main_factor = ⌈total/units⌉`; the engaged pool is `⌈total/main⌉`
/// (never more than `unit_count`); the final unit takes the remainder.
/// When the remainder equals the main factor it folds into the main pool,
/// so `tail_count` is 0 or 1 and `tail_factor < main_factor` whenever a
/// tail exists.
pub fn partition_units(total_extent: i64, unit_count: i32) -> Result<PartitionPlan, PlanError> {
    if unit_count <= 0 {
        return Err(PlanError::CapacityInvalid {
            detail: format!("unit count must be positive, got {unit_count}"),
        });
    }
    if total_extent == 0 {
        return Ok(PartitionPlan::empty());
    }

    let main_factor = ceil_div(total_extent, unit_count as i64);
    let used = ceil_div(total_extent, main_factor);
    let tail = total_extent - main_factor * (used - 1);

    let plan = if tail == main_factor {
        PartitionPlan {
            main_factor,
            main_count: used as i32,
            tail_factor: 0,
            tail_count: 0,
        }
    } else {
        PartitionPlan {
            main_factor,
            main_count: (used - 1) as i32,
            tail_factor: tail,
            tail_count: 1,
        }
    };
    debug_assert_eq!(plan.total_extent(), total_extent);
    Ok(plan)
}

/// Spreads `extent` over exactly `count` units with at most a one-unit
/// factor spread: `⌈extent/count⌉` for the first units, `⌊extent/count⌋`
/// for the rest. Used for the per-axis plans of the 2-D distribution,
/// where the unit grid is fixed by the chosen factorization.
fn spread_over(extent: i64, count: i64) -> PartitionPlan {
    if extent == 0 || count == 0 {
        return PartitionPlan::empty();
    }
    let main_factor = ceil_div(extent, count);
    let rem = extent % count;
    let (main_count, tail_count) = if rem == 0 {
        (count, 0)
    } else {
        (rem, count - rem)
    };
    let tail_factor = if tail_count > 0 { extent / count } else { 0 };
    let plan = PartitionPlan {
        main_factor,
        main_count: main_count as i32,
        tail_factor,
        tail_count: tail_count as i32,
    };
    debug_assert_eq!(plan.total_extent(), extent);
    plan
}

/// One candidate 2-D factorization and its wasted-work score.
#[derive(Debug, Clone, Copy)]
struct DualCut {
    rows: i64,
    cols: i64,
    used: i64,
    delta: i64,
}

/// Divides a `rows × cols` space across the unit pool.
///
/// Enumerates cut counts `m` (rows) and `n = units/m` (columns), scores
/// each candidate by the size gap between the largest and smallest
/// rectangle, and keeps the smallest gap. A candidate that would shrink a
/// row's share below one alignment unit — while the full row extent
/// exceeds one — is skipped unless it is the only option.
///
/// Returns the row plan and the column plan; the engaged unit count is
/// `row.used_units() × col.used_units()`.
pub fn partition_units_2d(
    rows: i64,
    cols: i64,
    capacity: &CapacityProfile,
) -> Result<(PartitionPlan, PartitionPlan), PlanError> {
    if capacity.unit_count == 0 {
        return Err(PlanError::CapacityInvalid {
            detail: "unit count must be positive".into(),
        });
    }
    if rows == 0 || cols == 0 {
        return Ok((PartitionPlan::empty(), PartitionPlan::empty()));
    }

    let elem_size = capacity.element_size as i64;
    let align_elems = capacity.alignment_elems();
    let col_granule = (COL_GRANULE_BYTES / elem_size).max(1);
    let granular_cols = ceil_div(cols, col_granule);

    let total_bytes = rows * cols * elem_size;
    let units = (capacity.unit_count as i64)
        .min(ceil_div(total_bytes, MIN_UNIT_WORK_BYTES))
        .max(1);

    // Candidate cut counts: m and units/m for m up to √units.
    let mut cut_counts = std::collections::BTreeSet::new();
    let upper = (units as f64).sqrt().ceil() as i64 + 1;
    for m in 1..upper {
        cut_counts.insert(m);
        cut_counts.insert(units / m);
    }

    let mut candidates: Vec<DualCut> = Vec::new();
    for &m in &cut_counts {
        if m <= 0 {
            continue;
        }
        let n = units / m;
        if m > rows || n <= 0 || n > granular_cols {
            continue;
        }
        let m_factor = ceil_div(rows, m);
        let n_factor = ceil_div(granular_cols, n);
        let mut delta = m_factor * n_factor;
        if m * n == units {
            if rows % m == 0 && granular_cols % n == 0 {
                delta = 0;
            } else if rows % m == 0 {
                delta -= m_factor * (granular_cols / n);
            } else if granular_cols % n == 0 {
                delta -= n_factor * (rows / m);
            } else {
                delta -= (rows / m) * (granular_cols / n);
            }
        }
        // Refuse to shave a row share below one alignment unit when the
        // full extent exceeds one, unless no other candidate survives.
        if rows / m < align_elems && rows > align_elems && !candidates.is_empty() {
            continue;
        }
        candidates.push(DualCut {
            rows: m,
            cols: n,
            used: m * n,
            delta,
        });
    }

    let best = candidates
        .iter()
        .min_by_key(|c| (c.delta, std::cmp::Reverse(c.used)))
        .copied()
        .unwrap_or(DualCut {
            rows: units.min(rows).max(1),
            cols: 1,
            used: units.min(rows).max(1),
            delta: 0,
        });

    let row_cuts = best.rows.min(rows);
    let col_cuts = best.cols.min(cols);
    tracing::debug!(
        rows,
        cols,
        row_cuts,
        col_cuts,
        delta = best.delta,
        "chose 2-d unit factorization",
    );

    Ok((spread_over(rows, row_cuts), spread_over(cols, col_cuts)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use capacity_probe::DeviceProfile;

    fn capacity(elem: usize) -> CapacityProfile {
        DeviceProfile::default().with_element_size(elem)
    }

    #[test]
    fn test_partition_101_over_13() {
        let p = partition_units(101, 13).unwrap();
        assert_eq!(p.main_factor, 8);
        assert_eq!(p.main_count, 12);
        assert_eq!(p.tail_factor, 5);
        assert_eq!(p.tail_count, 1);
        assert_eq!(p.total_extent(), 101);
        assert_eq!(p.used_units(), 13);
    }

    #[test]
    fn test_partition_divisible_has_no_tail() {
        let p = partition_units(640000, 32).unwrap();
        assert_eq!(p.main_factor, 20000);
        assert_eq!(p.main_count, 32);
        assert_eq!(p.tail_count, 0);
        assert_eq!(p.total_extent(), 640000);
    }

    #[test]
    fn test_partition_fewer_elements_than_units() {
        let p = partition_units(5, 13).unwrap();
        assert_eq!(p.main_factor, 1);
        assert_eq!(p.used_units(), 5);
        assert_eq!(p.tail_count, 0);
    }

    #[test]
    fn test_partition_zero_extent() {
        let p = partition_units(0, 8).unwrap();
        assert_eq!(p, PartitionPlan::empty());
        assert_eq!(p.used_units(), 0);
    }

    #[test]
    fn test_partition_zero_units_fails() {
        assert!(matches!(
            partition_units(100, 0),
            Err(PlanError::CapacityInvalid { .. })
        ));
    }

    #[test]
    fn test_coverage_and_front_loading_sweep() {
        for total in [1i64, 2, 7, 64, 101, 1000, 4097, 99991] {
            for units in [1i32, 2, 3, 13, 32, 64, 100] {
                let p = partition_units(total, units).unwrap();
                assert_eq!(p.total_extent(), total, "total={total} units={units}");
                assert!(p.used_units() <= units);
                assert!(
                    p.tail_factor <= p.main_factor,
                    "tail must not exceed main for total={total} units={units}",
                );
                if total % units as i64 == 0 && total >= units as i64 {
                    assert_eq!(p.tail_count, 0, "exact split must have no tail");
                }
            }
        }
    }

    #[test]
    fn test_unit_extent_and_offset() {
        let p = partition_units(101, 13).unwrap();
        assert_eq!(p.unit_extent(0), 8);
        assert_eq!(p.unit_extent(11), 8);
        assert_eq!(p.unit_extent(12), 5);
        assert_eq!(p.unit_extent(13), 0);
        assert_eq!(p.unit_offset(0), 0);
        assert_eq!(p.unit_offset(12), 96);
        let last = p.unit_offset(12) + p.unit_extent(12);
        assert_eq!(last, 101);
    }

    #[test]
    fn test_spread_over_multi_tail() {
        // 14 over 4 units at a fixed grid: 4 4 3 3.
        let p = spread_over(14, 4);
        assert_eq!(p.main_factor, 4);
        assert_eq!(p.main_count, 2);
        assert_eq!(p.tail_factor, 3);
        assert_eq!(p.tail_count, 2);
        assert_eq!(p.total_extent(), 14);
    }

    #[test]
    fn test_partition_2d_coverage() {
        let (rows, cols) = partition_units_2d(1000, 4096, &capacity(4)).unwrap();
        assert_eq!(rows.total_extent(), 1000);
        assert_eq!(cols.total_extent(), 4096);
        let used = rows.used_units() as i64 * cols.used_units() as i64;
        assert!(used > 0 && used <= 64);
    }

    #[test]
    fn test_partition_2d_small_problem_limits_pool() {
        // 1 KiB of work total: the pool must not fan out to all 64 units.
        let (rows, cols) = partition_units_2d(16, 16, &capacity(4)).unwrap();
        let used = rows.used_units() as i64 * cols.used_units() as i64;
        assert!(used <= 1);
        assert_eq!(rows.total_extent(), 16);
        assert_eq!(cols.total_extent(), 16);
    }

    #[test]
    fn test_partition_2d_single_row() {
        let (rows, cols) = partition_units_2d(1, 1 << 20, &capacity(1)).unwrap();
        assert_eq!(rows.total_extent(), 1);
        assert_eq!(rows.used_units(), 1);
        assert_eq!(cols.total_extent(), 1 << 20);
        assert!(cols.used_units() > 1);
    }

    #[test]
    fn test_partition_2d_zero_extent() {
        let (rows, cols) = partition_units_2d(0, 128, &capacity(4)).unwrap();
        assert_eq!(rows, PartitionPlan::empty());
        assert_eq!(cols, PartitionPlan::empty());
    }
}
