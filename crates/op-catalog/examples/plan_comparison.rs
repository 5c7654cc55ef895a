// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Compares the plans a handful of representative operators get on each
//! built-in device generation.
//!
//! Run with: `cargo run --example plan_comparison`

use capacity_probe::DeviceProfile;
use op_catalog::{Concat, Histogram, LinSpace, OperatorSpec, Split, StridedSlice};
use tensor_core::{DType, Shape};

fn main() {
    let ops: Vec<(&str, OperatorSpec)> = vec![
        (
            "split whole [1820,232] u8",
            OperatorSpec::Split(Split {
                input: Shape::new(&[1820, 232]).unwrap(),
                axis: 0,
                parts: vec![1820],
                dtype: DType::U8,
            }),
        ),
        (
            "concat 2x[11,8] f16",
            OperatorSpec::Concat(Concat {
                inputs: vec![
                    Shape::new(&[11, 8]).unwrap(),
                    Shape::new(&[11, 8]).unwrap(),
                ],
                axis: 1,
                dtype: DType::F16,
            }),
        ),
        (
            "slice [256,256] cols 64..192 f32",
            OperatorSpec::StridedSlice(StridedSlice {
                input: Shape::new(&[256, 256]).unwrap(),
                begin: vec![0, 64],
                end: vec![256, 192],
                stride: vec![1, 1],
                dtype: DType::F32,
            }),
        ),
        (
            "linspace 640000 f32",
            OperatorSpec::LinSpace(LinSpace {
                start: -1.0,
                stop: 1.0,
                num: 640000,
                dtype: DType::F32,
            }),
        ),
        (
            "histogram [512,512] 256 bins",
            OperatorSpec::Histogram(Histogram {
                input: Shape::new(&[512, 512]).unwrap(),
                bins: 256,
                dtype: DType::F32,
            }),
        ),
    ];

    println!(
        "{:<34} {:>8} {:>8} {:>8} {:>10}",
        "Operator", "Device", "PlanId", "Units", "MainFactor",
    );
    println!("{}", "-".repeat(74));

    for name in DeviceProfile::generation_names() {
        let device = DeviceProfile::generation(name).expect("built-in generation");
        for (label, op) in &ops {
            match op.plan(&device) {
                Ok(d) => println!(
                    "{:<34} {:>8} {:>8} {:>8} {:>10}",
                    label, name, d.plan_id, d.required_units, d.unit_plan.main_factor,
                ),
                Err(e) => println!("{:<34} {:>8} planning failed: {e}", label, name),
            }
        }
        println!();
    }
}
