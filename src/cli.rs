//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::CliOverrides;

/// Linear motion blur synthesis and Wiener restoration
#[derive(Parser, Debug)]
#[command(name = "motion-deblur")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ./motion-deblur.toml or the user config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the motion blur kernel for an angle and length
    Kernel(KernelArgs),
    /// Blur a grayscale image along a straight-line motion
    Blur(BlurArgs),
    /// Restore a blurred image with a known motion
    Restore(RestoreArgs),
    /// Blur an image and compare restorations over several λ values
    Sweep(SweepArgs),
    /// Blur an image with motions drawn from the configured ranges
    Synth(SynthArgs),
}

/// Motion description shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct MotionArgs {
    /// Motion angle in degrees (counter-clockwise from the x axis)
    #[arg(short, long, allow_negative_numbers = true)]
    pub angle: f64,

    /// Motion length in pixels
    #[arg(short, long)]
    pub length: f64,

    /// Fixed odd kernel grid size
    #[arg(long)]
    pub grid_size: Option<usize>,
}

#[derive(Args, Debug)]
pub struct KernelArgs {
    #[command(flatten)]
    pub motion: MotionArgs,

    /// Scale the kernel to unit sum
    #[arg(long)]
    pub normalize: bool,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,

    /// Save the kernel as a rescaled 8-bit image
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct BlurArgs {
    /// Sharp input image
    pub input: PathBuf,

    /// Blurred output image
    pub output: PathBuf,

    #[command(flatten)]
    pub motion: MotionArgs,

    /// Standard deviation of added Gaussian noise
    #[arg(long)]
    pub noise_sigma: Option<f64>,

    /// Noise seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Blur with the raw kernel instead of the unit-sum kernel
    #[arg(long)]
    pub no_normalize: bool,
}

#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Blurred input image
    pub input: PathBuf,

    /// Restored output image
    pub output: PathBuf,

    #[command(flatten)]
    pub motion: MotionArgs,

    /// Regularization (noise-to-signal power ratio)
    #[arg(long)]
    pub lambda: Option<f64>,

    /// Stretch output intensities to the full 8-bit range
    #[arg(long)]
    pub rescale: bool,

    /// Deconvolve with the raw kernel instead of the unit-sum kernel
    #[arg(long)]
    pub no_normalize: bool,
}

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Sharp reference image
    pub input: PathBuf,

    #[command(flatten)]
    pub motion: MotionArgs,

    /// Comma-separated λ values
    #[arg(long, value_delimiter = ',', default_values_t = vec![0.001, 0.01, 0.1, 1.0])]
    pub lambdas: Vec<f64>,

    /// Standard deviation of added Gaussian noise
    #[arg(long)]
    pub noise_sigma: Option<f64>,

    /// Noise seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write original, blurred and best restored images here
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Blur and restore with the raw kernel instead of the unit-sum kernel
    #[arg(long)]
    pub no_normalize: bool,
}

#[derive(Args, Debug)]
pub struct SynthArgs {
    /// Sharp input image
    pub input: PathBuf,

    /// Directory for the blurred images and `pairs.json`
    pub output_dir: PathBuf,

    /// Number of blurred images to write
    #[arg(short = 'n', long, default_value_t = 8)]
    pub count: usize,

    /// Standard deviation of added Gaussian noise
    #[arg(long)]
    pub noise_sigma: Option<f64>,

    /// Seed for motion sampling and noise
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Commands {
    /// Config values explicitly set by this subcommand's flags
    pub fn overrides(&self) -> CliOverrides {
        let mut overrides = CliOverrides::new();
        match self {
            Commands::Kernel(args) => {
                overrides.grid_size = args.motion.grid_size;
            }
            Commands::Blur(args) => {
                overrides.grid_size = args.motion.grid_size;
                overrides.noise_sigma = args.noise_sigma;
                overrides.seed = args.seed;
                if args.no_normalize {
                    overrides.normalize_kernel = Some(false);
                }
            }
            Commands::Restore(args) => {
                overrides.grid_size = args.motion.grid_size;
                overrides.lambda = args.lambda;
                if args.no_normalize {
                    overrides.normalize_kernel = Some(false);
                }
            }
            Commands::Sweep(args) => {
                overrides.grid_size = args.motion.grid_size;
                overrides.noise_sigma = args.noise_sigma;
                overrides.seed = args.seed;
                if args.no_normalize {
                    overrides.normalize_kernel = Some(false);
                }
            }
            Commands::Synth(args) => {
                overrides.noise_sigma = args.noise_sigma;
                overrides.seed = args.seed;
            }
        }
        overrides
    }
}
