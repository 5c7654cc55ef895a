// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `tile-plan sweep` command: plan one problem across unit-pool sizes.

use crate::config::load_problem;
use anyhow::Context;
use std::path::PathBuf;

pub fn execute(problem: PathBuf, units: String) -> anyhow::Result<()> {
    let spec = load_problem(&problem)?;
    let mut device = capacity_probe::detect()?;

    let pool_sizes: Vec<u32> = units
        .split(',')
        .map(|s| s.trim().parse::<u32>().with_context(|| format!("invalid unit count '{s}'")))
        .collect::<anyhow::Result<_>>()?;

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              tile-plan · Unit-Pool Sweep            ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
    println!("  Problem: {}", problem.display());
    println!();
    println!(
        "  {:>6} {:>8} {:>8} {:>12} {:>12} {:>10}",
        "Units", "PlanId", "Used", "MainFactor", "TailFactor", "Chunks",
    );
    println!("  {}", "-".repeat(62));

    for pool in pool_sizes {
        device.unit_count = pool;
        match spec.plan(&device) {
            Ok(d) => {
                println!(
                    "  {:>6} {:>8} {:>8} {:>12} {:>12} {:>10}",
                    pool,
                    d.plan_id,
                    d.required_units,
                    d.unit_plan.main_factor,
                    d.unit_plan.tail_factor,
                    d.chunk_plans[tiling_planner::CHUNK_MAIN].main_count,
                );
            }
            Err(e) => println!("  {:>6} planning failed: {e}", pool),
        }
    }
    println!();
    Ok(())
}
