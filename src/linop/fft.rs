//! Two-dimensional FFT helpers
//!
//! Row-then-column transforms over `ndarray` arrays using `rustfft`, plus
//! the kernel placement that turns a small centred kernel into a full-size
//! frequency response.

use ndarray::{Array2, Axis};
use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftDirection, FftPlanner};

use crate::error::{BlurError, Result};

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// Forward 2D DFT of a real array
pub fn fft2(data: &Array2<f64>) -> Array2<Complex64> {
    let mut spectrum = data.mapv(|v| Complex64::new(v, 0.0));
    transform(&mut spectrum, FftDirection::Forward);
    spectrum
}

/// Inverse 2D DFT, keeping the real part
///
/// The imaginary residue left by rounding is discarded. The `1 / (H·W)`
/// scaling omitted by `rustfft` is applied here.
pub fn ifft2(spectrum: &Array2<Complex64>) -> Array2<f64> {
    let (rows, cols) = spectrum.dim();
    let mut data = spectrum.clone();
    transform(&mut data, FftDirection::Inverse);

    let scale = if rows * cols > 0 {
        1.0 / (rows * cols) as f64
    } else {
        1.0
    };
    data.mapv(|z| z.re * scale)
}

/// Zero-pad `kernel` to `shape`, moving its centre tap `(kh/2, kw/2)` to
/// index `(0, 0)` and wrapping the other taps around the edges
///
/// With this placement the kernel's frequency response has zero phase at
/// its centre, so convolution does not shift the image.
pub fn center_kernel(kernel: &Array2<f64>, shape: (usize, usize)) -> Result<Array2<f64>> {
    let (kh, kw) = kernel.dim();
    let (height, width) = shape;

    if kh == 0 || kw == 0 {
        return Err(BlurError::InvalidParameter("kernel is empty".to_string()));
    }
    if kh > height || kw > width {
        return Err(BlurError::ShapeMismatch(format!(
            "kernel {}x{} exceeds image {}x{}",
            kh, kw, height, width
        )));
    }

    let (ch, cw) = (kh / 2, kw / 2);
    let mut padded = Array2::<f64>::zeros(shape);
    for ((row, col), &value) in kernel.indexed_iter() {
        padded[[(row + height - ch) % height, (col + width - cw) % width]] = value;
    }

    Ok(padded)
}

/// Frequency response of a centred kernel on an image of `shape`
pub fn kernel_spectrum(kernel: &Array2<f64>, shape: (usize, usize)) -> Result<Array2<Complex64>> {
    let padded = center_kernel(kernel, shape)?;
    Ok(fft2(&padded))
}

fn transform(data: &mut Array2<Complex64>, direction: FftDirection) {
    let (rows, cols) = data.dim();
    if rows == 0 || cols == 0 {
        return;
    }

    let mut planner = FftPlanner::new();
    let row_fft = planner.plan_fft(cols, direction);
    let col_fft = planner.plan_fft(rows, direction);

    transform_lanes(data, Axis(1), row_fft.as_ref());
    transform_lanes(data, Axis(0), col_fft.as_ref());
}

/// Apply `fft` to every 1D lane along `axis`
fn transform_lanes(data: &mut Array2<Complex64>, axis: Axis, fft: &dyn Fft<f64>) {
    let mut buffer = vec![ZERO; data.len_of(axis)];
    let mut scratch = vec![ZERO; fft.get_inplace_scratch_len()];

    for mut lane in data.lanes_mut(axis) {
        for (dst, src) in buffer.iter_mut().zip(lane.iter()) {
            *dst = *src;
        }
        fft.process_with_scratch(&mut buffer, &mut scratch);
        for (dst, src) in lane.iter_mut().zip(buffer.iter()) {
            *dst = *src;
        }
    }
}
