// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tile-plan
//!
//! Command-line inspector for the tiling planner.
//!
//! ## Usage
//! ```bash
//! # Plan a problem described in a TOML file
//! tile-plan plan --problem ./problems/split.toml
//!
//! # Show the detected device capacity
//! tile-plan probe
//!
//! # Sweep a problem across unit-pool sizes
//! tile-plan sweep --problem ./problems/split.toml --units 8,16,32,64
//! ```

mod commands;
mod config;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tile-plan",
    about = "Tiling-planner inspector for fixed-lane accelerators",
    version
)]
struct Cli {
    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a problem and print its descriptor.
    Plan {
        /// Path to a TOML problem description.
        #[arg(short, long)]
        problem: std::path::PathBuf,

        /// Override the detected unit count.
        #[arg(long)]
        units: Option<u32>,

        /// Override the detected scratch size in bytes.
        #[arg(long)]
        scratch: Option<u64>,

        /// Emit the full descriptor as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Display the detected device capacity profile.
    Probe,

    /// Plan a problem across several unit-pool sizes.
    Sweep {
        /// Path to a TOML problem description.
        #[arg(short, long)]
        problem: std::path::PathBuf,

        /// Comma-separated unit counts to sweep (e.g., "8,16,32,64").
        #[arg(long, default_value = "8,16,32,64")]
        units: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Plan {
            problem,
            units,
            scratch,
            json,
        } => commands::plan::execute(problem, units, scratch, json),
        Commands::Probe => commands::probe::execute(),
        Commands::Sweep { problem, units } => commands::sweep::execute(problem, units),
    }
}
