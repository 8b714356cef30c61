//! Linear operators for the blur forward model
//!
//! # Features
//!
//! - **Convolution** ([`convolution`]) - Circular convolution by a kernel
//!   and its adjoint (correlation)
//! - **FFT helpers** ([`fft`]) - 2D transforms and kernel centring
//!
//! Both directions are evaluated in the frequency domain with periodic
//! boundaries; kernels are zero-padded to the image size.

pub mod convolution;
pub mod fft;

use ndarray::Array2;

use crate::error::Result;

// Re-export public API
pub use convolution::Convolution;
pub use fft::{center_kernel, fft2, ifft2, kernel_spectrum};

/// A linear map between images of the same shape
pub trait LinearOperator {
    /// Apply the operator
    fn apply(&self, input: &Array2<f64>) -> Result<Array2<f64>>;

    /// Apply the adjoint (transpose) operator
    fn apply_adjoint(&self, input: &Array2<f64>) -> Result<Array2<f64>>;
}
