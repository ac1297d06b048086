//! Additive Gaussian measurement noise
//! Location: src/degradation/noise.rs

use crate::signal::Sample;
use rand::Rng;
use rand_distr::StandardNormal;

/// Add independent `N(0, std)` noise to every field, in recording order.
///
/// Non-positive `std` is the identity and draws nothing from `rng`.
pub fn add_gaussian_noise<R: Rng + ?Sized>(sample: Sample, std: f64, rng: &mut R) -> Sample {
    if std <= 0.0 {
        return sample;
    }

    sample.map_fields(|_, value| {
        let z: f64 = rng.sample(StandardNormal);
        value + z * std
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::SignalField;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_zero_std_is_identity() {
        let mut rng = StdRng::seed_from_u64(0);
        let sample = Sample::new(64.0, 45.0, 0.7);
        assert_eq!(add_gaussian_noise(sample, 0.0, &mut rng), sample);
        assert_eq!(add_gaussian_noise(sample, -0.5, &mut rng), sample);
    }

    #[test]
    fn test_every_field_perturbed() {
        let mut rng = StdRng::seed_from_u64(8);
        let sample = Sample::new(64.0, 45.0, 0.7);
        let noisy = add_gaussian_noise(sample, 0.1, &mut rng);

        for field in SignalField::ALL {
            assert_ne!(noisy.get(field), sample.get(field));
            assert!((noisy.get(field) - sample.get(field)).abs() < 1.0);
        }
    }

    #[test]
    fn test_noise_scale_tracks_std() {
        let mut rng = StdRng::seed_from_u64(21);
        let sample = Sample::default();
        let n = 5000;

        let var: f64 = (0..n)
            .map(|_| add_gaussian_noise(sample, 0.5, &mut rng).hr.powi(2))
            .sum::<f64>()
            / n as f64;

        assert!((var.sqrt() - 0.5).abs() < 0.03, "std estimate {}", var.sqrt());
    }
}
