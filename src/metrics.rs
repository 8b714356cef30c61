//! Image quality metrics for comparing restorations against a reference

use ndarray::Array2;

use crate::error::{BlurError, Result};

fn check_shapes(estimate: &Array2<f64>, reference: &Array2<f64>) -> Result<()> {
    if estimate.dim() != reference.dim() {
        return Err(BlurError::ShapeMismatch(format!(
            "estimate {:?} vs reference {:?}",
            estimate.dim(),
            reference.dim()
        )));
    }
    if estimate.is_empty() {
        return Err(BlurError::InvalidParameter("images are empty".to_string()));
    }
    Ok(())
}

/// Root-mean-square difference
pub fn rmse(estimate: &Array2<f64>, reference: &Array2<f64>) -> Result<f64> {
    check_shapes(estimate, reference)?;
    let sum_sq: f64 = estimate
        .iter()
        .zip(reference.iter())
        .map(|(a, b)| (a - b) * (a - b))
        .sum();
    Ok((sum_sq / estimate.len() as f64).sqrt())
}

/// RMS difference divided by the RMS of the reference, `‖x̂ - x‖ / ‖x‖`
pub fn nrmse(estimate: &Array2<f64>, reference: &Array2<f64>) -> Result<f64> {
    let error = rmse(estimate, reference)?;
    let norm = (reference.iter().map(|v| v * v).sum::<f64>() / reference.len() as f64).sqrt();
    if norm == 0.0 {
        return Err(BlurError::InvalidParameter(
            "reference image is all zeros".to_string(),
        ));
    }
    Ok(error / norm)
}

/// Peak signal-to-noise ratio in dB for intensities with maximum `peak`
///
/// Identical images give `f64::INFINITY`.
pub fn psnr(estimate: &Array2<f64>, reference: &Array2<f64>, peak: f64) -> Result<f64> {
    if !peak.is_finite() || peak <= 0.0 {
        return Err(BlurError::InvalidParameter(format!(
            "peak must be positive, got {}",
            peak
        )));
    }
    let error = rmse(estimate, reference)?;
    if error == 0.0 {
        return Ok(f64::INFINITY);
    }
    Ok(20.0 * (peak / error).log10())
}
