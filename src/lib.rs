//! motion-deblur - Linear motion blur synthesis and Wiener restoration
//!
//! Models straight-line camera motion as a convolution with an exactly
//! anti-aliased point-spread function and inverts it with a regularized
//! frequency-domain filter.
//!
//! # Features
//!
//! - **Kernel synthesis** ([`kernel`]) - Per-pixel exact coverage of a
//!   `L × 1` segment at any angle
//! - **Blur operator** ([`linop`]) - FFT circular convolution and its adjoint
//! - **Restoration** ([`inverse`]) - Wiener deconvolution and λ sweeps
//! - **Images** ([`blur_image`]) - Grayscale load/save with blur and deblur
//! - **Data synthesis** ([`sampler`]) - Seeded random motions and parallel
//!   blurred-pair generation
//! - **Metrics** ([`metrics`]) - RMSE, normalized RMSE and PSNR
//!
//! # Example
//!
//! ```rust
//! use motion_deblur::{motion_kernel, wiener, Convolution, LinearOperator};
//! use ndarray::Array2;
//!
//! let kernel = motion_kernel(0.0, 5.0).unwrap();
//! assert_eq!(kernel.dim(), (7, 7));
//!
//! let op = Convolution::normalized(kernel.clone()).unwrap();
//! let sharp = Array2::from_shape_fn((16, 16), |(r, c)| ((r + 2 * c) % 5) as f64);
//! let blurred = op.apply(&sharp).unwrap();
//!
//! let restored = wiener(&blurred, op.kernel(), 1e-6).unwrap();
//! assert_eq!(restored.dim(), sharp.dim());
//! ```

pub mod blur_image;
pub mod cli;
pub mod config;
pub mod error;
pub mod inverse;
pub mod kernel;
pub mod linop;
pub mod metrics;
pub mod sampler;

// Re-export public API
pub use blur_image::{BlurImage, Scaling};
pub use cli::{
    BlurArgs, Cli, Commands, KernelArgs, MotionArgs, RestoreArgs, SweepArgs, SynthArgs,
};
pub use config::{CliOverrides, Config, ConfigError, ParamRange};
pub use error::{BlurError, Result};
pub use inverse::{wiener, WienerDeconvolver, DEFAULT_LAMBDA};
pub use kernel::{
    kernel_grid_size, line_integral, motion_kernel, segment_integral, MotionKernel,
    MotionParams, PixelCell,
};
pub use linop::{Convolution, LinearOperator};
pub use metrics::{nrmse, psnr, rmse};
pub use sampler::{synthesize_pairs, synthesize_pairs_with, BlurSampler, TrainingPair};

/// Process exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const INVALID_ARGS: i32 = 2;
    pub const INPUT_NOT_FOUND: i32 = 3;
}
