/////////////////////////////////////////////////////////////////////////////////////////////
//
// Example 2D thin plate spline fit of a V-shaped height profile pinned by a row of zero
// valued anchors, evaluated over a 500 x 500 grid and written to CSV.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

use thinplate::{
    TpsInterpolator, TpsTestFunctions, create_evaluation_grid, point_arrays_to_csv,
    progress::{ProgressMsg, ProgressSink, closure_sink},
};
use std::{env, sync::Arc, thread::JoinHandle};

/// Generates a callback closure_sink that prints fitting progress.
fn get_callback_sink() -> (Arc<dyn ProgressSink>, JoinHandle<()>) {
    closure_sink(256, |msg| match msg {
        ProgressMsg::SystemAssembled {
            num_points,
            dimensions,
            system_size,
        } => {
            println!(
                "Assembled {}x{} system for {} points in {}D",
                system_size, system_size, num_points, dimensions
            );
        }
        ProgressMsg::RankDeficient { rank, system_size } => {
            println!("Rank deficient system: rank {} of {}", rank, system_size);
        }
        ProgressMsg::SystemSolved { rank, .. } => {
            println!("Solved with rank {}", rank);
        }
        ProgressMsg::Message { message } => {
            println!("{message}");
        }
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "v_profile_2d_grid.csv".to_string());

    // Seven V-profile points plus 100 zero valued anchors along y = 400
    let (points, values) = TpsTestFunctions::v_profile_2d(100);

    let (sink, listener) = get_callback_sink();

    // Setup and solve the thin plate spline
    let tps = TpsInterpolator::builder(2, points, values)
        .progress_callback(sink)
        .build()?;

    // Build a 500 x 500 grid of target points with unit spacing
    let n = 500;
    let grid = create_evaluation_grid(&[(0.0, 499.0), (0.0, 499.0)], &[n, n]);

    // Evaluate and keep the first output component, which carries the heights
    let interpolated = tps.interpolate_many(&grid)?;
    let heights = interpolated.as_ref().subcols(0, 1).to_owned();

    point_arrays_to_csv(&grid, &heights, &output_path)?;
    println!("Wrote {} grid values to {}", grid.nrows(), output_path);

    drop(tps);
    let _ = listener.join();

    Ok(())
}
