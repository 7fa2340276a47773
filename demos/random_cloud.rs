//! Random point cloud example
//!
//! Builds a cloud of uniformly distributed points, prints it, archives it next
//! to a translated copy in the binary container and reads the archive back.
//!
//! Run with `RUST_LOG=debug` to see the codec's log output.

use anyhow::{ensure, Context};
use cloudlib_algorithms::centroid;
use cloudlib_core::{Point, PointCloud, SharedPointCloud};
use cloudlib_io::{encoded_len, load_from_bin, save_to_bin};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut rng = StdRng::seed_from_u64(0);
    let mut cloud = PointCloud::named("random");
    for _ in 0..1000 {
        cloud.push(Point::new(
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-10.0..10.0),
        ));
    }

    println!("{}", cloud);

    let offset = Point::new(100.0, 0.0, 0.0);
    let mut shifted: PointCloud = cloud.iter().map(|p| *p + offset).collect();
    shifted.set_name("random (shifted)");

    let clouds = [SharedPointCloud::new(cloud), SharedPointCloud::new(shifted)];
    let path = std::env::temp_dir().join("cloudlib_random_cloud.bin");
    save_to_bin(&path, &clouds).with_context(|| format!("writing {}", path.display()))?;
    info!("wrote {} bytes to {}", encoded_len(&clouds), path.display());

    let restored = load_from_bin(&path).with_context(|| format!("reading {}", path.display()))?;
    ensure!(restored.len() == clouds.len(), "expected {} clouds", clouds.len());

    for (original, loaded) in clouds.iter().zip(&restored) {
        ensure!(original.as_bytes() == loaded.as_bytes(), "points changed in round trip");
        println!(
            "{:<20} {:>5} points, centroid {}",
            loaded.name().unwrap_or("<unnamed>"),
            loaded.len(),
            centroid(loaded)?
        );
    }

    std::fs::remove_file(&path)?;
    Ok(())
}
