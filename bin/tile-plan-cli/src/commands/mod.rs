// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! CLI subcommand implementations.

pub mod plan;
pub mod probe;
pub mod sweep;

use tracing_subscriber::EnvFilter;

/// Initialises tracing from the `-v` verbosity counter.
///
/// `RUST_LOG` takes precedence when set.
pub fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Resolves the device profile, applying CLI overrides on top of the
/// detected one.
pub fn resolve_device(
    units: Option<u32>,
    scratch: Option<u64>,
) -> anyhow::Result<capacity_probe::DeviceProfile> {
    let mut device = capacity_probe::detect()?;
    if let Some(u) = units {
        device.unit_count = u;
    }
    if let Some(s) = scratch {
        device.scratch_bytes = s;
    }
    device.validate()?;
    Ok(device)
}
