//! motion-deblur - Linear motion blur synthesis and Wiener restoration
//!
//! CLI entry point

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use motion_deblur::{
    exit_codes,
    // CLI
    BlurArgs, Cli, Commands, KernelArgs, MotionArgs, RestoreArgs, SweepArgs, SynthArgs,
    // Config
    Config,
    // Core
    nrmse, psnr, synthesize_pairs_with, BlurError, BlurImage, BlurSampler, Convolution,
    MotionKernel, Scaling, WienerDeconvolver,
};
use serde::Serialize;
use std::time::Instant;
use tracing::{info, Level};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(exit_codes::INVALID_ARGS);
        }
    };

    let result = match &cli.command {
        Commands::Kernel(args) => run_kernel(args, &config),
        Commands::Blur(args) => run_blur(args, &config),
        Commands::Restore(args) => run_restore(args, &config),
        Commands::Sweep(args) => run_sweep(args, &config),
        Commands::Synth(args) => run_synth(args, &config),
    };

    std::process::exit(match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for(&e)
        }
    });
}

// ============ Setup ============

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load the config file and apply the subcommand's explicit flags
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let file_config = match &cli.config {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::load()?,
    };

    let config = file_config.merge_with_cli(&cli.command.overrides());
    config.validate()?;
    Ok(config)
}

fn exit_code_for(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<BlurError>() {
        Some(BlurError::ImageNotFound(_)) => exit_codes::INPUT_NOT_FOUND,
        Some(BlurError::InvalidParameter(_)) | Some(BlurError::ShapeMismatch(_)) => {
            exit_codes::INVALID_ARGS
        }
        _ => exit_codes::GENERAL_ERROR,
    }
}

// ============ Helper Functions ============

fn build_kernel(motion: &MotionArgs, config: &Config) -> motion_deblur::Result<MotionKernel> {
    match config.grid_size {
        Some(size) => MotionKernel::with_grid_size(motion.angle, motion.length, size),
        None => MotionKernel::new(motion.angle, motion.length),
    }
}

fn build_operator(motion: &MotionArgs, config: &Config) -> motion_deblur::Result<Convolution> {
    let kernel = build_kernel(motion, config)?;
    Convolution::from_motion(&kernel, config.normalize_kernel)
}

/// Scaling for a blurred image on save
///
/// A raw kernel multiplies intensities by its sum, so those images are
/// stretched to the 8-bit range instead of clipped.
fn blurred_scaling(config: &Config) -> Scaling {
    if config.normalize_kernel {
        Scaling::Clip
    } else {
        Scaling::Rescale
    }
}

fn progress_bar(len: usize, message: &'static str) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(ProgressStyle::default_bar().template("{bar:40} {pos}/{len} {msg}")?);
    pb.set_message(message);
    Ok(pb)
}

// ============ Kernel Command ============

#[derive(Serialize)]
struct KernelReport {
    angle: f64,
    length: f64,
    size: usize,
    sum: f64,
    kernel: Vec<Vec<f64>>,
}

fn run_kernel(args: &KernelArgs, config: &Config) -> anyhow::Result<()> {
    let kernel = build_kernel(&args.motion, config)?;
    let values = if args.normalize {
        kernel.normalized()
    } else {
        kernel.as_array().clone()
    };

    if args.json {
        let report = KernelReport {
            angle: kernel.angle(),
            length: kernel.length(),
            size: kernel.size(),
            sum: values.sum(),
            kernel: values.rows().into_iter().map(|row| row.to_vec()).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Kernel θ={:.3}° L={:.3} ({}x{})",
            kernel.angle(),
            kernel.length(),
            kernel.size(),
            kernel.size()
        );
        for row in values.rows() {
            let line: Vec<String> = row.iter().map(|v| format!("{:.4}", v)).collect();
            println!("  {}", line.join(" "));
        }
        println!("Sum: {:.6}", values.sum());
    }

    if let Some(path) = &args.output {
        BlurImage::new(values).save(path, Scaling::Rescale)?;
        info!(path = %path.display(), "saved kernel image");
    }

    Ok(())
}

// ============ Blur Command ============

fn run_blur(args: &BlurArgs, config: &Config) -> anyhow::Result<()> {
    let sharp = BlurImage::open(&args.input)?;
    let op = build_operator(&args.motion, config)?;

    let blurred = sharp
        .linear_blur(&op)?
        .with_gaussian_noise(config.noise_sigma, config.seed)?;
    blurred.save(&args.output, blurred_scaling(config))?;

    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        noise_sigma = config.noise_sigma,
        normalize_kernel = config.normalize_kernel,
        "blurred image"
    );
    println!("Saved: {}", args.output.display());
    Ok(())
}

// ============ Restore Command ============

fn run_restore(args: &RestoreArgs, config: &Config) -> anyhow::Result<()> {
    let start_time = Instant::now();
    let blurred = BlurImage::open(&args.input)?;
    let op = build_operator(&args.motion, config)?;

    let restored = WienerDeconvolver::new(config.lambda)?.deconvolve_with(blurred.data(), &op)?;
    let scaling = if args.rescale {
        Scaling::Rescale
    } else {
        Scaling::Clip
    };
    BlurImage::new(restored).save(&args.output, scaling)?;

    info!(
        lambda = config.lambda,
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "restored image"
    );
    println!("Saved: {}", args.output.display());
    Ok(())
}

// ============ Sweep Command ============

#[derive(Serialize)]
struct SweepRow {
    lambda: f64,
    nrmse: f64,
    psnr: f64,
}

fn run_sweep(args: &SweepArgs, config: &Config) -> anyhow::Result<()> {
    if args.lambdas.is_empty() {
        return Err(BlurError::InvalidParameter("no λ values given".to_string()).into());
    }

    let sharp = BlurImage::open(&args.input)?;
    let op = build_operator(&args.motion, config)?;
    let blurred = sharp
        .linear_blur(&op)?
        .with_gaussian_noise(config.noise_sigma, config.seed)?;

    let pb = progress_bar(args.lambdas.len(), "Restoring")?;
    let restorations =
        WienerDeconvolver::sweep_with(blurred.data(), op.kernel(), &args.lambdas, |_| pb.inc(1));
    pb.finish_and_clear();
    let restorations = restorations?;

    let mut rows = Vec::with_capacity(restorations.len());
    for (lambda, restored) in &restorations {
        rows.push(SweepRow {
            lambda: *lambda,
            nrmse: nrmse(restored, sharp.data())?,
            psnr: psnr(restored, sharp.data(), 1.0)?,
        });
    }

    let best = rows
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.nrmse.total_cmp(&b.nrmse))
        .map(|(index, _)| index)
        .unwrap_or(0);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!("{:>12} {:>10} {:>10}", "lambda", "nrmse", "psnr_db");
        for (index, row) in rows.iter().enumerate() {
            let marker = if index == best { " *" } else { "" };
            println!(
                "{:>12.3e} {:>10.5} {:>10.2}{}",
                row.lambda, row.nrmse, row.psnr, marker
            );
        }
    }

    if let Some(dir) = &args.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        sharp.save(&dir.join("original.png"), Scaling::Clip)?;
        blurred.save(&dir.join("blurred.png"), blurred_scaling(config))?;
        BlurImage::new(restorations[best].1.clone()).save(&dir.join("restored.png"), Scaling::Clip)?;
        info!(dir = %dir.display(), lambda = rows[best].lambda, "saved sweep images");
    }

    Ok(())
}

// ============ Synth Command ============

#[derive(Serialize)]
struct PairRecord {
    file: String,
    angle: f64,
    length: f64,
}

/// Manifest written next to the synthesized images
const MANIFEST_NAME: &str = "pairs.json";

fn run_synth(args: &SynthArgs, config: &Config) -> anyhow::Result<()> {
    if args.count == 0 {
        return Err(BlurError::InvalidParameter("count must be positive".to_string()).into());
    }

    let start_time = Instant::now();
    let sharp = BlurImage::open(&args.input)?;
    let params = BlurSampler::from_config(config)?.sample_batch(args.count)?;

    let pb = progress_bar(params.len(), "Blurring")?;
    let pairs = synthesize_pairs_with(&sharp, &params, config.noise_sigma, config.seed, |_| {
        pb.inc(1)
    });
    pb.finish_and_clear();
    let pairs = pairs?;

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("failed to create {}", args.output_dir.display()))?;

    let mut records = Vec::with_capacity(pairs.len());
    for (index, pair) in pairs.iter().enumerate() {
        let file = format!("blurred_{:04}.png", index);
        pair.blurred.save(&args.output_dir.join(&file), Scaling::Clip)?;
        records.push(PairRecord {
            file,
            angle: pair.params.angle(),
            length: pair.params.length(),
        });
    }

    let manifest = args.output_dir.join(MANIFEST_NAME);
    std::fs::write(&manifest, serde_json::to_string_pretty(&records)?)
        .with_context(|| format!("failed to write {}", manifest.display()))?;

    info!(
        count = records.len(),
        dir = %args.output_dir.display(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "synthesized blurred images"
    );
    println!("Saved {} images to {}", records.len(), args.output_dir.display());
    Ok(())
}
