// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `tile-plan plan` command: plan one problem and print its descriptor.

use crate::commands::resolve_device;
use crate::config::load_problem;
use std::path::PathBuf;
use tiling_planner::{CHUNK_BACKWARD, CHUNK_FORWARD, CHUNK_MAIN, CHUNK_TAIL};

pub fn execute(
    problem: PathBuf,
    units: Option<u32>,
    scratch: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    let spec = load_problem(&problem)?;
    let device = resolve_device(units, scratch)?;

    let descriptor = spec
        .plan(&device)
        .map_err(|e| anyhow::anyhow!("planning failed: {e}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&descriptor)?);
        return Ok(());
    }

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║               tile-plan · Plan Summary              ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
    println!("  Problem: {}", problem.display());
    println!("  {}", device.summary());
    println!();
    println!("  Plan id:          {}", descriptor.plan_id);
    println!("  Required units:   {}", descriptor.required_units);
    println!(
        "  Workspace:        {:.1} MB",
        descriptor.workspace_bytes as f64 / (1024.0 * 1024.0),
    );
    println!(
        "  Descriptor bytes: {}",
        descriptor.to_bytes().len(),
    );
    println!();

    let u = &descriptor.unit_plan;
    println!(
        "  Unit plan:   {} x {} + {} x {}",
        u.main_factor, u.main_count, u.tail_factor, u.tail_count,
    );
    if descriptor.col_plan.main_count > 0 {
        let c = &descriptor.col_plan;
        println!(
            "  Column plan: {} x {} + {} x {}",
            c.main_factor, c.main_count, c.tail_factor, c.tail_count,
        );
    }

    let main = &descriptor.chunk_plans[CHUNK_MAIN];
    if main.main_count > 0 {
        println!(
            "  Chunks/unit: {} of {} (tail {})",
            main.main_count, main.main_factor, main.tail_factor,
        );
    }
    let tail = &descriptor.chunk_plans[CHUNK_TAIL];
    if tail.main_count > 0 {
        println!(
            "  Tail unit:   {} of {} (tail {})",
            tail.main_count, tail.main_factor, tail.tail_factor,
        );
    }
    if descriptor.is_bidirectional() {
        println!(
            "  Midpoint:    unit {} (forward {}, backward {})",
            descriptor.midpoint_unit,
            descriptor.chunk_plans[CHUNK_FORWARD].covered(),
            descriptor.chunk_plans[CHUNK_BACKWARD].covered(),
        );
    }

    if descriptor.geometry_len > 0 {
        println!();
        println!(
            "  {:<6} {:>12} {:>12} {:>12}",
            "Axis", "InStep", "OutStep", "Offset",
        );
        for (i, geo) in descriptor
            .axis_geometry
            .iter()
            .take(descriptor.geometry_len as usize)
            .enumerate()
        {
            println!(
                "  {:<6} {:>12} {:>12} {:>12}",
                i, geo.input_step, geo.output_step, geo.offset,
            );
        }
    }
    println!();
    Ok(())
}
