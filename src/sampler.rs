//! Random motion sampling and blurred-pair synthesis
//!
//! [`BlurSampler`] draws `(θ, L)` uniformly from configured ranges with a
//! seeded generator, so a given seed always yields the same sequence.
//! [`synthesize_pairs`] blurs one sharp image with many parameter sets in
//! parallel.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use crate::blur_image::BlurImage;
use crate::config::{Config, ParamRange};
use crate::error::{BlurError, Result};
use crate::kernel::MotionParams;
use crate::linop::Convolution;

/// Seeded uniform sampler of motion parameters
#[derive(Debug, Clone)]
pub struct BlurSampler {
    angle_range: ParamRange,
    length_range: ParamRange,
    rng: StdRng,
}

impl BlurSampler {
    pub fn new(angle_range: ParamRange, length_range: ParamRange, seed: u64) -> Result<Self> {
        check_range("angle", &angle_range)?;
        check_range("length", &length_range)?;
        if length_range.min <= 0.0 {
            return Err(BlurError::InvalidParameter(format!(
                "length range must be positive, got min {}",
                length_range.min
            )));
        }

        Ok(Self {
            angle_range,
            length_range,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.angle_range, config.length_range, config.seed)
    }

    /// Draw one parameter set
    pub fn sample(&mut self) -> Result<MotionParams> {
        let angle = draw(&mut self.rng, &self.angle_range);
        let length = draw(&mut self.rng, &self.length_range);
        MotionParams::new(angle, length)
    }

    /// Draw `count` parameter sets
    pub fn sample_batch(&mut self, count: usize) -> Result<Vec<MotionParams>> {
        (0..count).map(|_| self.sample()).collect()
    }
}

fn check_range(name: &str, range: &ParamRange) -> Result<()> {
    if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max {
        return Err(BlurError::InvalidParameter(format!(
            "invalid {} range [{}, {}]",
            name, range.min, range.max
        )));
    }
    Ok(())
}

fn draw(rng: &mut StdRng, range: &ParamRange) -> f64 {
    if range.min == range.max {
        range.min
    } else {
        rng.gen_range(range.min..=range.max)
    }
}

/// A blurred image with the motion that produced it
#[derive(Debug, Clone)]
pub struct TrainingPair {
    pub params: MotionParams,
    pub blurred: BlurImage,
}

impl TrainingPair {
    pub fn data(&self) -> &Array2<f64> {
        self.blurred.data()
    }
}

/// Blur `sharp` once per parameter set with unit-sum kernels
///
/// When `noise_sigma > 0` each output gets Gaussian noise seeded with
/// `seed + index`, so results do not depend on thread scheduling.
pub fn synthesize_pairs(
    sharp: &BlurImage,
    params: &[MotionParams],
    noise_sigma: f64,
    seed: u64,
) -> Result<Vec<TrainingPair>> {
    synthesize_pairs_with(sharp, params, noise_sigma, seed, |_| {})
}

/// [`synthesize_pairs`], calling `on_done(index)` as each pair finishes
pub fn synthesize_pairs_with<F>(
    sharp: &BlurImage,
    params: &[MotionParams],
    noise_sigma: f64,
    seed: u64,
    on_done: F,
) -> Result<Vec<TrainingPair>>
where
    F: Fn(usize) + Sync,
{
    if !noise_sigma.is_finite() || noise_sigma < 0.0 {
        return Err(BlurError::InvalidParameter(format!(
            "noise sigma must be non-negative, got {}",
            noise_sigma
        )));
    }

    debug!(count = params.len(), noise_sigma, "synthesizing blurred pairs");

    params
        .par_iter()
        .enumerate()
        .map(|(index, p)| {
            let kernel = p.kernel()?;
            let op = Convolution::from_motion(&kernel, true)?;
            let blurred = sharp
                .linear_blur(&op)?
                .with_gaussian_noise(noise_sigma, seed.wrapping_add(index as u64))?;
            on_done(index);
            Ok(TrainingPair {
                params: *p,
                blurred,
            })
        })
        .collect()
}
