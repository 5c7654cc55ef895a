// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Problem-description files.
//!
//! A problem file is the tagged [`op_catalog::OperatorSpec`] in TOML:
//!
//! ```toml
//! op = "split"
//! input = [11, 16]
//! axis = 1
//! parts = [8, 8]
//! dtype = "f16"
//! ```
//!
//! ```toml
//! op = "lin-space"
//! start = -1.0
//! stop = 1.0
//! num = 640000
//! dtype = "f32"
//! ```

use anyhow::Context;
use op_catalog::OperatorSpec;
use std::path::Path;

/// Loads a problem description from a TOML file.
pub fn load_problem(path: &Path) -> anyhow::Result<OperatorSpec> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read problem file '{}'", path.display()))?;
    parse_problem(&content)
}

/// Parses a problem description from a TOML string.
pub fn parse_problem(toml_str: &str) -> anyhow::Result<OperatorSpec> {
    toml::from_str(toml_str).context("invalid problem description")
}
