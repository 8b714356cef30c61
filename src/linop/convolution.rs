//! Circular convolution by a point-spread function
//!
//! The forward blur model. Images are treated as periodic, which is the
//! boundary model Wiener deconvolution inverts exactly.

use ndarray::Array2;
use rustfft::num_complex::Complex64;
use tracing::debug;

use super::fft::{fft2, ifft2, kernel_spectrum};
use super::LinearOperator;
use crate::error::{BlurError, Result};
use crate::kernel::MotionKernel;

/// Convolution operator defined by its kernel
///
/// The kernel is used as given; [`Convolution::normalized`] rescales it to
/// unit sum so the blur preserves brightness. The same kernel must be used
/// for blurring and for deconvolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Convolution {
    kernel: Array2<f64>,
}

impl Convolution {
    /// Wrap a kernel without rescaling it
    pub fn new(kernel: Array2<f64>) -> Result<Self> {
        if kernel.is_empty() {
            return Err(BlurError::InvalidParameter("kernel is empty".to_string()));
        }
        if kernel.iter().any(|v| !v.is_finite()) {
            return Err(BlurError::InvalidParameter(
                "kernel contains non-finite values".to_string(),
            ));
        }
        Ok(Self { kernel })
    }

    /// Wrap a kernel scaled to unit sum
    pub fn normalized(kernel: Array2<f64>) -> Result<Self> {
        let op = Self::new(kernel)?;
        let sum = op.kernel.sum();
        if !sum.is_finite() || sum <= 0.0 {
            return Err(BlurError::InvalidParameter(format!(
                "kernel sum must be positive to normalize, got {}",
                sum
            )));
        }
        Ok(Self {
            kernel: op.kernel / sum,
        })
    }

    /// Operator for a motion kernel, optionally normalized
    pub fn from_motion(kernel: &MotionKernel, normalize: bool) -> Result<Self> {
        let data = kernel.as_array().clone();
        if normalize {
            Self::normalized(data)
        } else {
            Self::new(data)
        }
    }

    pub fn kernel(&self) -> &Array2<f64> {
        &self.kernel
    }

    /// Frequency response of the kernel on an image of `shape`
    pub fn frequency_response(&self, shape: (usize, usize)) -> Result<Array2<Complex64>> {
        kernel_spectrum(&self.kernel, shape)
    }

    fn filter(
        &self,
        image: &Array2<f64>,
        combine: impl Fn(Complex64, Complex64) -> Complex64,
    ) -> Result<Array2<f64>> {
        let response = self.frequency_response(image.dim())?;
        let mut spectrum = fft2(image);
        spectrum.zip_mut_with(&response, |s, &k| *s = combine(*s, k));

        debug!(
            rows = image.nrows(),
            cols = image.ncols(),
            kernel_rows = self.kernel.nrows(),
            kernel_cols = self.kernel.ncols(),
            "applied convolution in frequency domain"
        );

        Ok(ifft2(&spectrum))
    }
}

impl LinearOperator for Convolution {
    fn apply(&self, image: &Array2<f64>) -> Result<Array2<f64>> {
        self.filter(image, |s, k| s * k)
    }

    fn apply_adjoint(&self, image: &Array2<f64>) -> Result<Array2<f64>> {
        self.filter(image, |s, k| s * k.conj())
    }
}
