//! Sample a boundary potential on a plane
//!
//! Builds a grid, a density and a potential operator from a JSON or TOML
//! job file, evaluates the potential on a plane and writes the field as
//! JSON or VTK.
//!
//! Usage:
//!   cargo run --release --bin plane-potential -- --config job.toml --output field.vtk
//!   cargo run --release --bin plane-potential -- --write-config job.toml

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use math_audio_bem_potential::core::io::{
    ExportData, PlaneJobConfig, export, load_config, save_config,
};
use math_audio_bem_potential::core::{Parallelization, PlaneEvaluation};

#[derive(Parser, Debug)]
#[command(name = "plane-potential")]
#[command(about = "Evaluate a boundary potential on a plane", long_about = None)]
struct Args {
    /// Path to JSON or TOML job file (default: Laplace single layer of a unit sphere)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file (.json or .vtk), overrides the job file
    ///
    /// Paths in the job file are relative to the job file's directory.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of parallel threads (default: all cores)
    #[arg(short = 't', long)]
    threads: Option<usize>,

    /// Write the job configuration to this file and exit
    #[arg(long)]
    write_config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let (mut config, base_dir) = match &args.config {
        Some(path) => {
            println!("Loading configuration from: {}", path.display());
            let config = load_config(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            let base_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
            (config, base_dir)
        }
        None => {
            println!("No configuration file specified, using the default job");
            (PlaneJobConfig::default(), PathBuf::from("."))
        }
    };

    if let Some(path) = &args.write_config {
        save_config(&config, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Configuration written to: {}", path.display());
        return Ok(());
    }

    if let Some(threads) = args.threads {
        config.parameters.evaluation.parallelization = Parallelization::Parallel {
            max_threads: Some(threads),
        };
    }
    if args.verbose {
        config.parameters.evaluation.verbose = true;
    }

    print_config_summary(&config);

    let job = config.build(&base_dir)?;
    let start = std::time::Instant::now();
    let field = job.run()?;
    let elapsed = start.elapsed();

    print_field_summary(&field);
    println!("Evaluation time: {:.3?}", elapsed);

    let output = config.output.resolved(&base_dir);
    let label = job.operator.label();
    if let Some(path) = args.output.as_ref().or(output.file.as_ref()) {
        export(
            path,
            ExportData::Plane {
                name: &label,
                evaluation: &field,
            },
        )
        .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Results saved to: {}", path.display());
    }

    if let Some(path) = &output.mesh_file {
        export(
            path,
            ExportData::GridFunction {
                name: "density",
                function: &job.density,
            },
        )
        .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Density saved to: {}", path.display());
    }

    Ok(())
}

fn print_config_summary(config: &PlaneJobConfig) {
    println!("\n=== Job ===");
    if !config.description.is_empty() {
        println!("Description: {}", config.description);
    }
    println!("Grid: {:?}", config.grid);
    println!("Space: {}{}", config.space.family, config.space.order);
    println!(
        "Operator: {:?} {:?}",
        config.operator.kernel, config.operator.potential
    );
    let l = &config.plane.limits;
    println!(
        "Plane: ({}, {}, {}) -> ({}, {}, {}), {} x {} points",
        l.xmin,
        l.ymin,
        l.zmin,
        l.xmax,
        l.ymax,
        l.zmax,
        config.plane.dimensions[0],
        config.plane.dimensions[1]
    );
}

fn print_field_summary(field: &PlaneEvaluation) {
    let magnitudes = field.magnitudes();
    let (min, max) = magnitudes
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &m| {
            (lo.min(m), hi.max(m))
        });

    println!("\n=== Field ===");
    println!(
        "{} points, {} component(s)",
        field.len(),
        field.component_count()
    );
    if !field.is_empty() {
        println!("|value| range: [{:.6e}, {:.6e}]", min, max);
    }
}
