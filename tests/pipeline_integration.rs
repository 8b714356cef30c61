//! Library pipeline integration tests
//!
//! Kernel synthesis, blur and restoration exercised through the public API.

use motion_deblur::{
    kernel_grid_size, motion_kernel, nrmse, psnr, synthesize_pairs, wiener, BlurError, BlurImage,
    BlurSampler, Config, Convolution, LinearOperator, MotionKernel, Scaling, WienerDeconvolver,
};
use ndarray::Array2;

fn smooth_scene(rows: usize, cols: usize) -> Array2<f64> {
    let tau = 2.0 * std::f64::consts::PI;
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        let y = r as f64 / rows as f64;
        let x = c as f64 / cols as f64;
        0.5 + 0.25 * (tau * 3.0 * x).sin() * (tau * 2.0 * y).cos() + 0.1 * (tau * 5.0 * y).sin()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // TC-PIPE-001: Horizontal kernel of length 5 is a centred bar of ones
    #[test]
    fn test_horizontal_kernel_layout() {
        let k = motion_kernel(0.0, 5.0).unwrap();
        assert_eq!(k.dim(), (7, 7));
        for col in 0..7 {
            let expected = if (1..=5).contains(&col) { 1.0 } else { 0.0 };
            assert!((k[[3, col]] - expected).abs() < 1e-12, "col {}", col);
        }
        let off_row: f64 = k.sum() - k.row(3).sum();
        assert!(off_row.abs() < 1e-12);
    }

    // TC-PIPE-002: Kernel mass equals the motion length for many angles
    #[test]
    fn test_kernel_mass_matches_length() {
        for &length in &[1.5, 4.0, 7.3, 12.0] {
            for step in 0..24 {
                let angle = step as f64 * 7.5;
                let kernel = MotionKernel::new(angle, length).unwrap();
                assert_eq!(kernel.size(), kernel_grid_size(length).unwrap());
                assert!(
                    (kernel.sum() - length).abs() < 1e-9,
                    "θ={} L={} sum={}",
                    angle,
                    length,
                    kernel.sum()
                );
                assert!(kernel.as_array().iter().all(|&v| (0.0..=1.0 + 1e-12).contains(&v)));
            }
        }
    }

    // TC-PIPE-003: Blur then restore with small λ recovers the scene
    #[test]
    fn test_blur_restore_roundtrip() {
        let sharp = smooth_scene(48, 48);
        let op = Convolution::normalized(motion_kernel(30.0, 7.0).unwrap()).unwrap();
        let blurred = op.apply(&sharp).unwrap();

        let error_blurred = nrmse(&blurred, &sharp).unwrap();
        let restored = wiener(&blurred, op.kernel(), 1e-8).unwrap();
        let error_restored = nrmse(&restored, &sharp).unwrap();

        assert!(error_restored < 1e-3, "restored nrmse {}", error_restored);
        assert!(error_restored < error_blurred);
    }

    // TC-PIPE-004: Adjoint identity holds for an oblique motion
    #[test]
    fn test_adjoint_identity() {
        let op = Convolution::new(motion_kernel(63.0, 6.0).unwrap()).unwrap();
        let x = Array2::from_shape_fn((20, 24), |(r, c)| ((r * 7 + c * 13) % 17) as f64 - 8.0);
        let y = Array2::from_shape_fn((20, 24), |(r, c)| ((r * 3 + c * 5) % 11) as f64 * 0.3);

        let lhs = (&op.apply(&x).unwrap() * &y).sum();
        let rhs = (&x * &op.apply_adjoint(&y).unwrap()).sum();
        assert!((lhs - rhs).abs() < 1e-8 * lhs.abs().max(1.0));
    }

    // TC-PIPE-005: Noisy restoration prefers moderate λ
    #[test]
    fn test_lambda_sweep_with_noise() {
        let sharp = BlurImage::new(smooth_scene(64, 64));
        let (blurred, kernel) = sharp.motion_blur(45.0, 9.0).unwrap();
        let noisy = blurred.with_gaussian_noise(0.02, 5).unwrap();

        let lambdas = [1e-7, 1e-2, 1e3];
        let results = WienerDeconvolver::sweep(noisy.data(), &kernel, &lambdas).unwrap();
        let errors: Vec<f64> = results
            .iter()
            .map(|(_, r)| nrmse(r, sharp.data()).unwrap())
            .collect();

        assert!(errors[1] < errors[0], "errors {:?}", errors);
        assert!(errors[1] < errors[2], "errors {:?}", errors);
    }

    // TC-PIPE-006: Unregularized inversion of a singular blur fails loudly
    #[test]
    fn test_zero_lambda_singular_kernel() {
        // A length-2 horizontal bar has a spectral zero at the Nyquist column
        let op = Convolution::normalized(motion_kernel(0.0, 2.0).unwrap()).unwrap();
        let blurred = op.apply(&smooth_scene(16, 16)).unwrap();
        assert!(matches!(
            wiener(&blurred, op.kernel(), 0.0),
            Err(BlurError::NumericalInstability(_))
        ));
        assert!(wiener(&blurred, op.kernel(), 1e-3).is_ok());
    }

    // TC-PIPE-007: Synthesized pairs follow the sampled parameters
    #[test]
    fn test_sampler_pipeline() {
        let config = Config {
            seed: 17,
            ..Default::default()
        };
        let mut sampler = BlurSampler::from_config(&config).unwrap();
        let params = sampler.sample_batch(5).unwrap();

        let sharp = BlurImage::new(smooth_scene(64, 64));
        let pairs = synthesize_pairs(&sharp, &params, 0.0, config.seed).unwrap();
        assert_eq!(pairs.len(), 5);

        for pair in &pairs {
            let kernel = pair.params.kernel().unwrap();
            let restored = pair.blurred.deblur(&kernel.normalized(), 1e-9).unwrap();
            let before = psnr(pair.data(), sharp.data(), 1.0).unwrap();
            let after = psnr(restored.data(), sharp.data(), 1.0).unwrap();
            assert!(after > before, "params {:?} psnr {} -> {}", pair.params, before, after);
        }
    }

    // TC-PIPE-008: Images survive an 8-bit save/load cycle within quantization
    #[test]
    fn test_image_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.png");

        let image = BlurImage::new(smooth_scene(20, 30));
        image.save(&path, Scaling::Clip).unwrap();

        let loaded = BlurImage::open(&path).unwrap();
        assert_eq!(loaded.dim(), (20, 30));
        let max_diff = loaded
            .data()
            .iter()
            .zip(image.data().iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        assert!(max_diff <= 0.5 / 255.0 + 1e-9);
    }
}
