//! Grayscale image wrapper for blur and deblur operations
//!
//! Couples an intensity buffer to the forward model and its inverse.
//! Intensities loaded from 8-bit images are scaled to `[0, 1]`; every
//! operation returns a new image.

use image::{GrayImage, Luma};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::path::Path;

use crate::error::{BlurError, Result};
use crate::inverse::WienerDeconvolver;
use crate::kernel::MotionKernel;
use crate::linop::{Convolution, LinearOperator};

/// Maximum 8-bit intensity
const U8_MAX: f64 = 255.0;

/// How intensities are mapped to 8 bits on export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scaling {
    /// Clamp to `[0, 1]` then scale (keeps absolute brightness)
    #[default]
    Clip,
    /// Stretch the image's own min..max range to 0..255 (for display)
    Rescale,
}

/// A grayscale image held as a 2D intensity array
#[derive(Debug, Clone, PartialEq)]
pub struct BlurImage {
    data: Array2<f64>,
}

impl BlurImage {
    /// Wrap an intensity array (rows × columns)
    pub fn new(data: Array2<f64>) -> Self {
        Self { data }
    }

    /// Convert an 8-bit grayscale image, scaling intensities to `[0, 1]`
    pub fn from_gray(gray: &GrayImage) -> Self {
        let (width, height) = gray.dimensions();
        let data = Array2::from_shape_fn((height as usize, width as usize), |(r, c)| {
            gray.get_pixel(c as u32, r as u32).0[0] as f64 / U8_MAX
        });
        Self { data }
    }

    /// Load an image file as grayscale
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BlurError::ImageNotFound(path.to_path_buf()));
        }

        let img = image::open(path).map_err(|e| BlurError::InvalidImage(e.to_string()))?;
        Ok(Self::from_gray(&img.to_luma8()))
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn into_data(self) -> Array2<f64> {
        self.data
    }

    /// Image size as (rows, columns)
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Apply a linear blur operator
    pub fn linear_blur(&self, op: &impl LinearOperator) -> Result<Self> {
        Ok(Self::new(op.apply(&self.data)?))
    }

    /// Blur along a straight-line motion with a unit-sum kernel
    ///
    /// Returns the blurred image and the kernel that produced it, which is
    /// the kernel [`Self::deblur`] expects.
    pub fn motion_blur(&self, angle: f64, length: f64) -> Result<(Self, Array2<f64>)> {
        let kernel = MotionKernel::new(angle, length)?;
        let op = Convolution::from_motion(&kernel, true)?;
        let blurred = self.linear_blur(&op)?;
        Ok((blurred, op.kernel().clone()))
    }

    /// Add white Gaussian noise with standard deviation `sigma`
    pub fn with_gaussian_noise(&self, sigma: f64, seed: u64) -> Result<Self> {
        if sigma == 0.0 {
            return Ok(self.clone());
        }
        let normal = Normal::new(0.0, sigma).map_err(|e| {
            BlurError::InvalidParameter(format!("noise sigma {}: {}", sigma, e))
        })?;
        let mut rng = StdRng::seed_from_u64(seed);
        Ok(Self::new(self.data.mapv(|v| v + normal.sample(&mut rng))))
    }

    /// Wiener-deconvolve with `kernel` and regularization `lambda`
    pub fn deblur(&self, kernel: &Array2<f64>, lambda: f64) -> Result<Self> {
        let restored = WienerDeconvolver::new(lambda)?.deconvolve(&self.data, kernel)?;
        Ok(Self::new(restored))
    }

    /// Convert to an 8-bit grayscale image
    pub fn to_gray(&self, scaling: Scaling) -> GrayImage {
        let (rows, cols) = self.data.dim();
        let (offset, scale) = match scaling {
            Scaling::Clip => (0.0, 1.0),
            Scaling::Rescale => {
                let min = self.data.iter().copied().fold(f64::INFINITY, f64::min);
                let max = self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let range = max - min;
                if range > 0.0 {
                    (min, 1.0 / range)
                } else {
                    (min, 0.0)
                }
            }
        };

        GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
            let value = (self.data[[y as usize, x as usize]] - offset) * scale;
            Luma([(value.clamp(0.0, 1.0) * U8_MAX).round() as u8])
        })
    }

    /// Save as an 8-bit grayscale image (format chosen by extension)
    pub fn save(&self, path: &Path, scaling: Scaling) -> Result<()> {
        self.to_gray(scaling)
            .save(path)
            .map_err(|e| BlurError::InvalidImage(e.to_string()))
    }
}

impl From<Array2<f64>> for BlurImage {
    fn from(data: Array2<f64>) -> Self {
        Self::new(data)
    }
}
