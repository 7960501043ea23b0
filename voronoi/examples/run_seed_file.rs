//! Example: relax a seed file and save the resulting diagram
//!
//! Reads a YAML or JSON seed file, runs Lloyd relaxation with the options it
//! stores and writes the relaxed sites with their diagram. Logs go to the
//! console and to `logs/`.
//!
//! # Usage
//!
//! ```bash
//! cargo run --release --example run_seed_file -- seeds.yaml diagram.json
//! ```
//!
//! Without arguments a seed file with quadtree sites for a synthetic raster
//! is written to `seeds.yaml` and relaxed into `diagram.yaml`.

use std::env;

use anyhow::Context;
use common::log_setup::setup_logging;
use tracing::info;
use voronoi::{quadtree_sites, GridSize, SeedFile};

fn main() -> anyhow::Result<()> {
    setup_logging("info", "logs")?;

    let args: Vec<String> = env::args().collect();
    let (seed_path, output_path) = match args.as_slice() {
        [_, seeds, output] => (seeds.clone(), output.clone()),
        [_] => {
            let seeds = "seeds.yaml".to_string();
            demo_seed_file().save(&seeds)?;
            (seeds, "diagram.yaml".to_string())
        }
        _ => {
            eprintln!("Usage: {} [<seed_file> <output_file>]", args[0]);
            std::process::exit(1);
        }
    };

    let seeds = SeedFile::from_file(&seed_path)?;
    info!(
        width = seeds.width,
        height = seeds.height,
        sites = seeds.x.len(),
        "loaded '{}'",
        seed_path
    );

    let output = seeds
        .run()
        .with_context(|| format!("Failed to relax '{}'", seed_path))?;
    output.save(&output_path)?;
    Ok(())
}

/// Seeds from a raster with a bright disc on a dark gradient, so the quadtree
/// places more sites along the disc edge.
fn demo_seed_file() -> SeedFile {
    let size = GridSize::new(96, 64);
    let pixels: Vec<[u8; 3]> = size
        .cells()
        .map(|cell| {
            let (dx, dy) = (cell.x - 48, cell.y - 32);
            if dx * dx + dy * dy < 20 * 20 {
                [240, 220, 160]
            } else {
                let shade = (cell.x * 2) as u8;
                [shade / 4, shade / 3, shade / 2]
            }
        })
        .collect();

    let sites = quadtree_sites(size, &pixels, 16, 0.05);
    SeedFile::new(size, &sites)
}
