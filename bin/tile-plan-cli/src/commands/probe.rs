// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `tile-plan probe` command: display the detected capacity profile.

use capacity_probe::DeviceProfile;

pub fn execute() -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║             tile-plan · Device Capacity             ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let device = capacity_probe::detect()?;
    println!("  Detected");
    println!("   Units:       {}", device.unit_count);
    println!(
        "   Scratch:     {} KB per unit",
        device.scratch_bytes / 1024,
    );
    println!("   Alignment:   {} B", device.alignment_bytes);
    println!();

    println!("  Built-in generations");
    println!(
        "   {:<10} {:>6} {:>12} {:>10}",
        "Name", "Units", "Scratch", "Alignment",
    );
    println!("   {}", "-".repeat(42));
    for name in DeviceProfile::generation_names() {
        let g = DeviceProfile::generation(name)?;
        println!(
            "   {:<10} {:>6} {:>9} KB {:>8} B",
            name,
            g.unit_count,
            g.scratch_bytes / 1024,
            g.alignment_bytes,
        );
    }
    println!();
    println!("{}", device.summary());
    Ok(())
}
