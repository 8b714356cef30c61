//! Motion blur kernel synthesis
//!
//! Builds the point-spread function of a straight-line camera motion by
//! evaluating [`segment_integral`] on every pixel of an odd-sized square
//! grid centred on the origin.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::line_integral::{normalize_angle, segment_integral, PixelCell, BAND_HALF_WIDTH};
use crate::error::{BlurError, Result};

/// Upper bound on a grid side before the allocation check
const MAX_GRID_SIZE: usize = usize::MAX / 4;

/// Motion parameters `(θ, L)`
///
/// Only constructed through [`MotionParams::new`], so a value always holds
/// a normalized angle and a finite positive length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMotionParams")]
pub struct MotionParams {
    angle: f64,
    length: f64,
}

#[derive(Deserialize)]
struct RawMotionParams {
    angle: f64,
    length: f64,
}

impl TryFrom<RawMotionParams> for MotionParams {
    type Error = BlurError;

    fn try_from(raw: RawMotionParams) -> Result<Self> {
        Self::new(raw.angle, raw.length)
    }
}

impl MotionParams {
    /// Validate and normalize motion parameters
    ///
    /// Any finite angle is accepted; the length must be finite and positive.
    pub fn new(angle: f64, length: f64) -> Result<Self> {
        if !angle.is_finite() {
            return Err(BlurError::InvalidParameter(format!(
                "angle must be finite, got {}",
                angle
            )));
        }
        if !length.is_finite() || length <= 0.0 {
            return Err(BlurError::InvalidParameter(format!(
                "length must be positive, got {}",
                length
            )));
        }

        Ok(Self {
            angle: normalize_angle(angle),
            length,
        })
    }

    /// Motion angle in degrees, normalized to `[0, 180)`
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Segment length in pixels
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Synthesize the kernel for these parameters
    pub fn kernel(&self) -> Result<MotionKernel> {
        MotionKernel::from_params(*self)
    }
}

/// Smallest odd grid size whose pixels contain the whole `length × 1`
/// rectangle in any orientation
///
/// Fails for lengths that are not finite and non-negative, or whose grid
/// could not be allocated.
pub fn kernel_grid_size(length: f64) -> Result<usize> {
    if !length.is_finite() || length < 0.0 {
        return Err(BlurError::InvalidParameter(format!(
            "length must be finite and non-negative, got {}",
            length
        )));
    }

    let half = (support_reach(length) - 0.5).ceil().max(0.0);
    let size = if half < MAX_GRID_SIZE as f64 {
        (half as usize)
            .checked_mul(2)
            .and_then(|n| n.checked_add(1))
    } else {
        None
    };

    match size {
        Some(size) => {
            check_grid_alloc(size)?;
            Ok(size)
        }
        None => Err(BlurError::InvalidParameter(format!(
            "length {} needs a kernel grid that is too large",
            length
        ))),
    }
}

/// Reject grids whose `size × size` buffer exceeds what ndarray can address
fn check_grid_alloc(size: usize) -> Result<()> {
    size.checked_mul(size)
        .and_then(|cells| cells.checked_mul(std::mem::size_of::<f64>()))
        .filter(|&bytes| bytes <= isize::MAX as usize)
        .map(|_| ())
        .ok_or_else(|| {
            BlurError::InvalidParameter(format!("kernel grid {}x{} is too large", size, size))
        })
}

/// Distance from the origin to the rectangle's farthest corner
fn support_reach(length: f64) -> f64 {
    (length.max(0.0) / 2.0).hypot(BAND_HALF_WIDTH)
}

/// A synthesized motion blur kernel
///
/// Cell `(row, col)` holds the fraction of the unit pixel centred at
/// `x = col - c`, `y = c - row` (with `c = size / 2`) covered by the motion
/// segment. The cells sum to the segment length; use [`Self::normalized`]
/// for a brightness-preserving blur.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionKernel {
    params: MotionParams,
    data: Array2<f64>,
}

impl MotionKernel {
    /// Synthesize a kernel on the smallest grid that holds its support
    pub fn new(angle: f64, length: f64) -> Result<Self> {
        Self::from_params(MotionParams::new(angle, length)?)
    }

    /// Synthesize a kernel on a caller-chosen odd grid
    ///
    /// A grid smaller than [`kernel_grid_size`] truncates the support and
    /// loses energy.
    pub fn with_grid_size(angle: f64, length: f64, size: usize) -> Result<Self> {
        let params = MotionParams::new(angle, length)?;
        if size == 0 || size % 2 == 0 {
            return Err(BlurError::InvalidParameter(format!(
                "kernel grid size must be odd and non-zero, got {}",
                size
            )));
        }

        check_grid_alloc(size)?;

        let required = kernel_grid_size(params.length).ok();
        if required.map_or(true, |required| size < required) {
            warn!(
                size,
                required,
                length = params.length,
                "kernel grid truncates the motion support"
            );
        }

        Ok(Self {
            params,
            data: synthesize(&params, size),
        })
    }

    /// Synthesize from motion parameters on the default grid
    pub fn from_params(params: MotionParams) -> Result<Self> {
        let params = MotionParams::new(params.angle, params.length)?;
        let size = kernel_grid_size(params.length)?;
        Ok(Self {
            params,
            data: synthesize(&params, size),
        })
    }

    pub fn params(&self) -> MotionParams {
        self.params
    }

    /// Normalized motion angle in degrees
    pub fn angle(&self) -> f64 {
        self.params.angle
    }

    pub fn length(&self) -> f64 {
        self.params.length
    }

    /// Grid size (the kernel is `size × size`)
    pub fn size(&self) -> usize {
        self.data.nrows()
    }

    /// Index of the centre cell
    pub fn center(&self) -> (usize, usize) {
        let c = self.size() / 2;
        (c, c)
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn into_array(self) -> Array2<f64> {
        self.data
    }

    /// Total weight (equals the length when the grid holds the support)
    pub fn sum(&self) -> f64 {
        self.data.sum()
    }

    /// Copy of the kernel scaled to unit sum
    pub fn normalized(&self) -> Array2<f64> {
        let sum = self.sum();
        if sum > 0.0 {
            &self.data / sum
        } else {
            self.data.clone()
        }
    }
}

/// Kernel array for `(angle, length)` on its default grid
pub fn motion_kernel(angle: f64, length: f64) -> Result<Array2<f64>> {
    MotionKernel::new(angle, length).map(MotionKernel::into_array)
}

fn synthesize(params: &MotionParams, size: usize) -> Array2<f64> {
    let center = (size / 2) as f64;
    // No cell whose centre lies farther than this can touch the rectangle
    let reach = support_reach(params.length) + std::f64::consts::FRAC_1_SQRT_2;

    let kernel = Array2::from_shape_fn((size, size), |(row, col)| {
        let x = col as f64 - center;
        let y = center - row as f64;
        if x.hypot(y) > reach {
            return 0.0;
        }
        segment_integral(params.angle, params.length, &PixelCell::unit(x, y))
    });

    debug!(
        angle = params.angle,
        length = params.length,
        size,
        sum = kernel.sum(),
        "synthesized motion kernel"
    );

    kernel
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-10;

    fn assert_close(a: &Array2<f64>, b: &Array2<f64>, tol: f64) {
        assert_eq!(a.dim(), b.dim());
        for ((idx, x), y) in a.indexed_iter().zip(b.iter()) {
            assert!((x - y).abs() < tol, "mismatch at {:?}: {} vs {}", idx, x, y);
        }
    }

    #[test]
    fn test_grid_size() {
        assert_eq!(kernel_grid_size(0.5).unwrap(), 3);
        assert_eq!(kernel_grid_size(1.0).unwrap(), 3);
        assert_eq!(kernel_grid_size(4.0).unwrap(), 5);
        assert_eq!(kernel_grid_size(5.0).unwrap(), 7);
        assert_eq!(kernel_grid_size(10.0).unwrap(), 11);
        assert_eq!(kernel_grid_size(23.0).unwrap(), 25);
        for length in [0.3, 1.7, 6.0, 12.2, 31.0] {
            let size = kernel_grid_size(length).unwrap();
            assert_eq!(size % 2, 1);
            assert!(size as f64 >= length);
        }
    }

    #[test]
    fn test_params_validation() {
        assert!(matches!(
            MotionParams::new(0.0, 0.0),
            Err(BlurError::InvalidParameter(_))
        ));
        assert!(matches!(
            MotionParams::new(0.0, -3.0),
            Err(BlurError::InvalidParameter(_))
        ));
        assert!(matches!(
            MotionParams::new(f64::NAN, 3.0),
            Err(BlurError::InvalidParameter(_))
        ));
        assert!(matches!(
            MotionParams::new(10.0, f64::INFINITY),
            Err(BlurError::InvalidParameter(_))
        ));

        let params = MotionParams::new(-30.0, 7.0).unwrap();
        assert_eq!(params.angle(), 150.0);
        assert_eq!(params.length(), 7.0);
    }

    #[test]
    fn test_unbuildable_lengths_rejected() {
        for length in [f64::INFINITY, f64::NAN, -1.0] {
            assert!(matches!(
                kernel_grid_size(length),
                Err(BlurError::InvalidParameter(_))
            ));
        }
        // Finite but far beyond any addressable grid
        assert!(matches!(
            MotionKernel::new(0.0, 1e12),
            Err(BlurError::InvalidParameter(_))
        ));
        assert!(matches!(
            kernel_grid_size(1e300),
            Err(BlurError::InvalidParameter(_))
        ));
        assert!(matches!(
            MotionKernel::with_grid_size(0.0, 5.0, usize::MAX),
            Err(BlurError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_from_params_revalidates() {
        let negative = MotionParams {
            angle: 0.0,
            length: -3.0,
        };
        assert!(matches!(
            MotionKernel::from_params(negative),
            Err(BlurError::InvalidParameter(_))
        ));

        let infinite = MotionParams {
            angle: 0.0,
            length: f64::INFINITY,
        };
        assert!(matches!(
            MotionKernel::from_params(infinite),
            Err(BlurError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_params_deserialize_validates() {
        let params: MotionParams = serde_json::from_str(r#"{"angle": 270.0, "length": 4.0}"#).unwrap();
        assert_eq!(params.angle(), 90.0);
        assert_eq!(params.length(), 4.0);

        assert!(serde_json::from_str::<MotionParams>(r#"{"angle": 0.0, "length": -3.0}"#).is_err());
    }

    #[test]
    fn test_invalid_grid_size() {
        assert!(MotionKernel::with_grid_size(0.0, 5.0, 6).is_err());
        assert!(MotionKernel::with_grid_size(0.0, 5.0, 0).is_err());
        assert!(MotionKernel::with_grid_size(0.0, -5.0, 7).is_err());
    }

    #[test]
    fn test_horizontal_kernel_l5() {
        let kernel = MotionKernel::with_grid_size(0.0, 5.0, 7).unwrap();
        let data = kernel.as_array();
        assert_eq!(data.dim(), (7, 7));

        for ((row, col), &value) in data.indexed_iter() {
            let expected = if row == 3 && (1..=5).contains(&col) {
                1.0
            } else {
                0.0
            };
            assert!(
                (value - expected).abs() < EPS,
                "({}, {}) = {}",
                row,
                col,
                value
            );
        }
        assert!((kernel.sum() - 5.0).abs() < EPS);
    }

    #[test]
    fn test_default_grid_matches_explicit() {
        let auto = MotionKernel::new(0.0, 5.0).unwrap();
        let explicit = MotionKernel::with_grid_size(0.0, 5.0, 7).unwrap();
        assert_eq!(auto, explicit);
    }

    #[test]
    fn test_vertical_kernel_l5() {
        let kernel = MotionKernel::new(90.0, 5.0).unwrap();
        let data = kernel.as_array();
        for ((row, col), &value) in data.indexed_iter() {
            let expected = if col == 3 && (1..=5).contains(&row) {
                1.0
            } else {
                0.0
            };
            assert!((value - expected).abs() < EPS);
        }
    }

    #[test]
    fn test_even_length_box_profile() {
        let kernel = MotionKernel::new(0.0, 4.0).unwrap();
        let data = kernel.as_array();
        assert_eq!(data.dim(), (5, 5));
        let row: Vec<f64> = data.row(2).to_vec();
        let expected = [0.5, 1.0, 1.0, 1.0, 0.5];
        for (value, want) in row.iter().zip(expected.iter()) {
            assert!((value - want).abs() < EPS);
        }
        let off_row: f64 = data.sum() - data.row(2).sum();
        assert!(off_row.abs() < EPS);
    }

    #[test]
    fn test_energy_conservation() {
        let angles = [0.0, 7.5, 13.0, 30.0, 45.0, 60.0, 89.9, 90.0, 112.0, 135.0, 170.0];
        let lengths = [1.0, 2.5, 5.0, 10.0, 17.3, 23.0];
        for &angle in &angles {
            for &length in &lengths {
                let kernel = MotionKernel::new(angle, length).unwrap();
                assert!(
                    (kernel.sum() - length).abs() < 1e-9,
                    "angle={} length={} sum={}",
                    angle,
                    length,
                    kernel.sum()
                );
            }
        }
    }

    #[test]
    fn test_non_negative() {
        let kernel = MotionKernel::new(37.0, 12.0).unwrap();
        assert!(kernel.as_array().iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn test_direction_symmetry() {
        for angle in [0.0, 20.0, 35.0, 45.0, 90.0, 123.0] {
            let a = MotionKernel::new(angle, 9.0).unwrap();
            let b = MotionKernel::new(angle + 180.0, 9.0).unwrap();
            let c = MotionKernel::new(angle - 180.0, 9.0).unwrap();
            assert_close(a.as_array(), b.as_array(), 1e-12);
            assert_close(a.as_array(), c.as_array(), 1e-12);
        }
    }

    #[test]
    fn test_point_symmetry_45() {
        let kernel = MotionKernel::new(45.0, 10.0).unwrap();
        let data = kernel.as_array();
        let n = kernel.size();
        for ((row, col), &value) in data.indexed_iter() {
            let mirrored = data[[n - 1 - row, n - 1 - col]];
            assert!((value - mirrored).abs() < 1e-12);
        }
        // Weight follows the rising diagonal
        let (c, _) = kernel.center();
        assert!(data[[c - 2, c + 2]] > 0.5);
        assert_eq!(data[[c - 2, c - 2]], 0.0);
    }

    #[test]
    fn test_mirror_about_vertical_axis() {
        // θ and 180° - θ are mirror images across the y axis
        let a = MotionKernel::new(30.0, 8.0).unwrap();
        let b = MotionKernel::new(150.0, 8.0).unwrap();
        let n = a.size();
        for ((row, col), &value) in a.as_array().indexed_iter() {
            let mirrored = b.as_array()[[row, n - 1 - col]];
            assert!((value - mirrored).abs() < 1e-12);
        }
    }

    #[test]
    fn test_reflection_about_diagonal() {
        // Swapping x and y maps θ to 90° - θ
        let a = MotionKernel::new(25.0, 11.0).unwrap();
        let b = MotionKernel::new(65.0, 11.0).unwrap();
        let last = a.size() - 1;
        for ((row, col), &value) in b.as_array().indexed_iter() {
            let reflected = a.as_array()[[last - col, last - row]];
            assert!((value - reflected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_sub_pixel_length() {
        let kernel = MotionKernel::new(0.0, 0.5).unwrap();
        let (c, _) = kernel.center();
        assert!((kernel.as_array()[[c, c]] - 0.5).abs() < EPS);
        assert!((kernel.sum() - 0.5).abs() < EPS);

        let oblique = MotionKernel::new(30.0, 0.6).unwrap();
        let centre = oblique.as_array()[[c, c]];
        assert!(centre > 0.4 && centre <= 0.6, "centre weight {}", centre);
        assert!((oblique.sum() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_truncated_grid_loses_energy() {
        let kernel = MotionKernel::with_grid_size(0.0, 9.0, 5).unwrap();
        assert!((kernel.sum() - 5.0).abs() < EPS);
    }

    #[test]
    fn test_normalized() {
        let kernel = MotionKernel::new(63.0, 7.0).unwrap();
        let normalized = kernel.normalized();
        assert!((normalized.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_deterministic() {
        let a = motion_kernel(41.0, 13.0).unwrap();
        let b = motion_kernel(41.0, 13.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_params_kernel() {
        let params = MotionParams::new(200.0, 6.0).unwrap();
        let kernel = params.kernel().unwrap();
        assert!((kernel.angle() - 20.0).abs() < 1e-12);
        assert_eq!(kernel.length(), 6.0);
        assert_eq!(kernel.params(), params);
    }
}
