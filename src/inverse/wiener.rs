//! Wiener deconvolution
//!
//! Restores an image blurred by a known kernel under the periodic boundary
//! model of [`Convolution`]. Each frequency bin of the observation is
//! multiplied by
//!
//! ```text
//! W = conj(K) / (|K|² + λ)
//! ```
//!
//! where `K` is the centred kernel's frequency response and `λ` the
//! noise-to-signal power ratio. `λ = 0` is plain inverse filtering; larger
//! values trade sharpness for noise suppression.

use ndarray::Array2;
use rayon::prelude::*;
use rustfft::num_complex::Complex64;
use tracing::{debug, warn};

use crate::error::{BlurError, Result};
use crate::linop::{fft2, ifft2, Convolution};

// ============================================================
// Constants
// ============================================================

/// With `λ = 0`, a bin whose response magnitude is at most this fraction
/// of the peak magnitude is treated as a zero of the kernel
pub const SINGULAR_RESPONSE_TOLERANCE: f64 = 1e-12;

/// Default regularization
pub const DEFAULT_LAMBDA: f64 = 0.1;

// ============================================================
// Deconvolver
// ============================================================

/// Wiener deconvolution with a fixed regularization parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WienerDeconvolver {
    lambda: f64,
}

impl Default for WienerDeconvolver {
    fn default() -> Self {
        Self {
            lambda: DEFAULT_LAMBDA,
        }
    }
}

impl WienerDeconvolver {
    /// Create a deconvolver; `lambda` must be finite and non-negative
    ///
    /// No minimum is substituted for `λ = 0`: deconvolving with a kernel
    /// whose response vanishes somewhere fails with
    /// [`BlurError::NumericalInstability`].
    pub fn new(lambda: f64) -> Result<Self> {
        if !lambda.is_finite() || lambda < 0.0 {
            return Err(BlurError::InvalidParameter(format!(
                "lambda must be finite and non-negative, got {}",
                lambda
            )));
        }
        Ok(Self { lambda })
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Restore `blurred` given the kernel that blurred it
    ///
    /// The output has the shape of `blurred`. Values are not clipped and may
    /// leave the input's dynamic range.
    pub fn deconvolve(&self, blurred: &Array2<f64>, kernel: &Array2<f64>) -> Result<Array2<f64>> {
        self.deconvolve_with(blurred, &Convolution::new(kernel.clone())?)
    }

    /// Restore `blurred` given the forward operator that blurred it
    pub fn deconvolve_with(&self, blurred: &Array2<f64>, op: &Convolution) -> Result<Array2<f64>> {
        let response = op.frequency_response(blurred.dim())?;
        self.restore(&fft2(blurred), &response)
    }

    /// Restore `blurred` for each regularization value in `lambdas`
    ///
    /// Spectra are computed once; the values are evaluated in parallel and
    /// returned in input order.
    pub fn sweep(
        blurred: &Array2<f64>,
        kernel: &Array2<f64>,
        lambdas: &[f64],
    ) -> Result<Vec<(f64, Array2<f64>)>> {
        Self::sweep_with(blurred, kernel, lambdas, |_| {})
    }

    /// [`Self::sweep`], calling `on_restored(λ)` as each restoration finishes
    pub fn sweep_with<F>(
        blurred: &Array2<f64>,
        kernel: &Array2<f64>,
        lambdas: &[f64],
        on_restored: F,
    ) -> Result<Vec<(f64, Array2<f64>)>>
    where
        F: Fn(f64) + Sync,
    {
        let response = Convolution::new(kernel.clone())?.frequency_response(blurred.dim())?;
        let spectrum = fft2(blurred);

        lambdas
            .par_iter()
            .map(|&lambda| {
                let restored = Self::new(lambda)?.restore(&spectrum, &response)?;
                on_restored(lambda);
                Ok((lambda, restored))
            })
            .collect()
    }

    /// Per-bin filter `conj(K) / (|K|² + λ)`
    pub fn filter(&self, response: &Array2<Complex64>) -> Result<Array2<Complex64>> {
        let peak = response.iter().map(|k| k.norm()).fold(0.0_f64, f64::max);
        let weakest = response.iter().map(|k| k.norm()).fold(f64::INFINITY, f64::min);

        debug!(
            lambda = self.lambda,
            peak, weakest, "computing Wiener filter"
        );

        if self.lambda == 0.0 {
            if peak.is_nan() || peak <= 0.0 || weakest <= SINGULAR_RESPONSE_TOLERANCE * peak {
                return Err(BlurError::NumericalInstability(format!(
                    "kernel response vanishes (min {:.3e}, max {:.3e}) and lambda is 0",
                    weakest, peak
                )));
            }
            warn!("lambda is 0, using unregularized inverse filtering");
        } else if self.lambda < SINGULAR_RESPONSE_TOLERANCE * weakest * weakest {
            warn!(
                lambda = self.lambda,
                weakest, "lambda is negligible against every response bin"
            );
        }

        let lambda = self.lambda;
        Ok(response.mapv(|k| k.conj() / (k.norm_sqr() + lambda)))
    }

    fn restore(
        &self,
        spectrum: &Array2<Complex64>,
        response: &Array2<Complex64>,
    ) -> Result<Array2<f64>> {
        let filter = self.filter(response)?;
        let mut restored = spectrum.clone();
        restored.zip_mut_with(&filter, |s, &w| *s *= w);
        Ok(ifft2(&restored))
    }
}

/// Wiener-deconvolve `blurred` by `kernel` with regularization `lambda`
pub fn wiener(blurred: &Array2<f64>, kernel: &Array2<f64>, lambda: f64) -> Result<Array2<f64>> {
    WienerDeconvolver::new(lambda)?.deconvolve(blurred, kernel)
}

// ============================================================
// Tests
// ============================================================
