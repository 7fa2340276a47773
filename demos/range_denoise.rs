//! Range grid denoising example
//!
//! Simulates an organized depth sensor frame with sparse spikes, removes them
//! with the windowed median filter and reports what was dropped.
//!
//! Usage: `range_denoise [window_size] [range_threshold]`

use anyhow::Context;
use cloudlib_algorithms::{extract_indices, NoiseFilter};
use cloudlib_core::{Point, PointCloud};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

const WIDTH: usize = 320;
const HEIGHT: usize = 240;

fn simulate_frame(rng: &mut StdRng) -> (PointCloud, usize) {
    let mut frame = PointCloud::organized(WIDTH, HEIGHT);
    frame.set_name("frame");
    let mut spikes = 0;

    for row in 0..HEIGHT {
        for col in 0..WIDTH {
            // Tilted floor plane seen from above
            let mut z = 1.5 + row as f32 * 0.002 + rng.gen_range(-0.001..0.001);
            if rng.gen_bool(0.005) {
                z += rng.gen_range(0.5..5.0);
                spikes += 1;
            }
            frame.push(Point::new(col as f32 * 0.01, row as f32 * 0.01, z));
        }
    }

    (frame, spikes)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let mut filter = NoiseFilter::default();
    if let Some(window) = args.next() {
        let window = window.parse::<usize>().context("window_size must be an integer")?;
        filter = filter.with_window_size(window);
    }
    if let Some(threshold) = args.next() {
        let threshold = threshold.parse::<f32>().context("range_threshold must be a number")?;
        filter = filter.with_range_threshold(threshold);
    }

    let mut rng = StdRng::seed_from_u64(7);
    let (frame, spikes) = simulate_frame(&mut rng);
    frame.check_layout()?;
    info!("simulated {}x{} frame with {} spikes", WIDTH, HEIGHT, spikes);

    let candidates: Vec<usize> = (0..frame.len()).collect();

    let start = Instant::now();
    let kept = filter.filter(&frame, &candidates)?;
    let sequential = start.elapsed();

    let start = Instant::now();
    let kept_parallel = filter.filter_parallel(&frame, &candidates)?;
    let parallel = start.elapsed();
    anyhow::ensure!(kept == kept_parallel, "parallel filter disagrees with sequential");

    let cleaned = extract_indices(&frame, &kept)?;
    println!(
        "window {} threshold {}: kept {} of {} points ({} removed, {} spikes injected)",
        filter.window_size,
        filter.range_threshold,
        cleaned.len(),
        frame.len(),
        frame.len() - cleaned.len(),
        spikes
    );
    println!("sequential {:?}, parallel {:?}", sequential, parallel);

    Ok(())
}
