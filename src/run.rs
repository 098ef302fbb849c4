use std::{error::Error, path::PathBuf};

use indicatif::{ProgressBar, ProgressIterator, ProgressStyle};
use log::{info, warn};

use goop_fluids::overlay::Overlays;
use goop_io::{decode::FluidDataDecoder, encode::FluidDataEncoder};

use crate::RunArgs;

pub fn run(args: RunArgs) -> Result<(), Box<dyn Error>> {
    let scenario = args.scenario.scenario(args.count);
    let mut sim = match args.count {
        Some(count) => scenario.build_with_capacity(count)?,
        None => scenario.build()?,
    };

    if args.stats {
        sim.overlays.flags.toggle_stats();
    }

    let mut encoder = match &args.out {
        Some(path) => {
            let mut encoder = FluidDataEncoder::new(path.clone(), args.frames, args.fps)?;
            encoder.encode_metadata(&sim)?;
            Some(encoder)
        }
        None => None,
    };

    if args.substeps == 0 {
        warn!("--substeps 0 records the initial state on every frame");
    }

    let bar_template = "Running Simulation {spinner:.green} [{elapsed}] [{bar:50.white/white}] {pos}/{len} ({eta})";
    let style = ProgressStyle::with_template(bar_template)?
        .progress_chars("=> ").tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    let progress = ProgressBar::new(args.frames).with_style(style);

    for _ in (0..args.frames).progress_with(progress) {
        for _ in 0..args.substeps {
            if let Some(stir) = args.stir {
                sim.apply_radial_force(stir.center, stir.force, stir.radius);
            }
            if let Some(sweep) = args.sweep {
                sim.apply_line_force(sweep.from, sweep.to, sweep.force);
            }

            sim.step(args.dt);
        }

        if let Some(encoder) = encoder.as_mut() {
            encoder.encode_frame(&sim)?;
        }
    }

    let max_speed = sim.velocities().iter().map(|v| v.length()).fold(0.0, f32::max);
    info!(
        "{}: {} steps, {} springs, max speed {:.3}",
        scenario,
        sim.fluid.frames(),
        sim.springs().len(),
        max_speed,
    );

    if sim.overlays.flags.contains(Overlays::SPRINGS) {
        info!("{} overlay primitives", sim.primitives().len());
    }

    if let Some(point) = args.probe {
        let probe = sim.probe(point);
        println!(
            "cell {} at {} (size {}): {} particles",
            probe.cell, probe.origin, probe.cell_size, probe.occupancy,
        );
        if let Some(nearest) = probe.nearest {
            println!("nearest particle {} with {} neighbors", nearest.index, nearest.neighbors);
        }
        if let Some(distance) = probe.obstacle_distance {
            println!("nearest obstacle surface at {distance:.3}");
        }
    }

    if let Some(encoder) = encoder {
        info!("recorded {} frames", encoder.frames_written());
    }

    Ok(())
}

pub fn inspect(dir: PathBuf) -> Result<(), Box<dyn Error>> {
    let mut decoder = FluidDataDecoder::new(dir);
    let meta = decoder.decode_metadata()?;

    println!(
        "{} frames at {} fps, particle radius {}, interaction radius {}",
        meta.num_frames, meta.fps, meta.particle_radius, meta.interaction_radius,
    );
    println!("{} obstacles, {} sinks", meta.obstacles.len(), meta.sinks.len());

    let mut frame = 0;
    while let Some(data) = decoder.decode_frame()? {
        match data.bounds() {
            Some((lo, hi)) => println!(
                "{frame}: {} particles in [{lo}, {hi}], max speed {:.3}",
                data.len(),
                data.max_speed(),
            ),
            None => println!("{frame}: empty"),
        }
        frame += 1;
    }

    Ok(())
}
