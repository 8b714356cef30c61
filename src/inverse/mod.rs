//! Inverse problem solvers for the blur model
//!
//! # Features
//!
//! - **Wiener** ([`wiener`]) - Frequency-domain regularized deconvolution
//!   with a known kernel
//!
//! # Example
//!
//! ```rust
//! use motion_deblur::{Convolution, LinearOperator, MotionKernel, WienerDeconvolver};
//! use ndarray::Array2;
//!
//! let kernel = MotionKernel::new(30.0, 7.0).unwrap();
//! let blur = Convolution::normalized(kernel.into_array()).unwrap();
//!
//! let sharp = Array2::from_shape_fn((32, 32), |(r, c)| ((r * c) % 7) as f64 / 7.0);
//! let blurred = blur.apply(&sharp).unwrap();
//!
//! let restored = WienerDeconvolver::new(1e-3)
//!     .unwrap()
//!     .deconvolve_with(&blurred, &blur)
//!     .unwrap();
//! assert_eq!(restored.dim(), sharp.dim());
//! ```

pub mod wiener;

// Re-export public API
pub use wiener::{wiener, WienerDeconvolver, DEFAULT_LAMBDA, SINGULAR_RESPONSE_TOLERANCE};
