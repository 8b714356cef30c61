//! Motion blur point-spread functions
//!
//! Provides exact anti-aliased kernels for straight-line camera motion.
//!
//! # Features
//!
//! - **Line integral** ([`line_integral`]) - Exact coverage of a pixel by a
//!   unit-width line or segment
//! - **Kernel synthesis** ([`motion`]) - Full `N × N` kernel for an angle
//!   and a length
//!
//! # Example
//!
//! ```rust
//! use motion_deblur::MotionKernel;
//!
//! let kernel = MotionKernel::new(30.0, 9.0).unwrap();
//! assert_eq!(kernel.size() % 2, 1);
//! assert!((kernel.sum() - 9.0).abs() < 1e-9);
//! ```

pub mod line_integral;
pub mod motion;

// Re-export public API
pub use line_integral::{
    line_integral, normalize_angle, segment_integral, Orientation, PixelCell,
    AXIS_ANGLE_TOLERANCE, BAND_HALF_WIDTH,
};
pub use motion::{kernel_grid_size, motion_kernel, MotionKernel, MotionParams};
