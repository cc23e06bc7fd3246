/*!
Synthetic regression data: points on a regular `x` grid with `y = slope * x + intercept`
plus independent `N(0, sigma)` noise.

```rust
use linreg_mcmc::io::synthetic::SyntheticData;
use rand::SeedableRng;
use rand::rngs::SmallRng;

let data = SyntheticData::default().generate(&mut SmallRng::seed_from_u64(42)).unwrap();
assert_eq!(data.len(), 1000);
```
*/

use ndarray::Array2;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{Error, Result};
use crate::model::Observations;

/// Parameters of a synthetic dataset. The default is a slope of 3, an intercept of 20
/// and noise scale 5 over `x = 0, 0.1, ..., 99.9`.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticData {
    pub slope: f64,
    pub intercept: f64,
    pub sigma: f64,
    /// First `x` value.
    pub start: f64,
    /// Distance between consecutive `x` values.
    pub spacing: f64,
    pub n_points: usize,
}

impl Default for SyntheticData {
    fn default() -> Self {
        Self {
            slope: 3.0,
            intercept: 20.0,
            sigma: 5.0,
            start: 0.0,
            spacing: 0.1,
            n_points: 1_000,
        }
    }
}

impl SyntheticData {
    /// Draws `n_points` observations from `rng`. `sigma` must be finite and `> 0`, and the
    /// line and grid settings finite.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Observations> {
        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "synthetic noise scale must be finite and > 0, got {}",
                self.sigma
            )));
        }
        for (name, value) in [
            ("slope", self.slope),
            ("intercept", self.intercept),
            ("start", self.start),
            ("spacing", self.spacing),
        ] {
            if !value.is_finite() {
                return Err(Error::InvalidConfig(format!(
                    "synthetic {name} must be finite, got {value}"
                )));
            }
        }
        let noise = Normal::new(0.0, self.sigma)
            .map_err(|e| Error::RandomSource(format!("synthetic noise: {e}")))?;
        let mut data = Array2::zeros((self.n_points, 2));
        for (i, mut row) in data.rows_mut().into_iter().enumerate() {
            let x = self.start + self.spacing * i as f64;
            row[0] = x;
            row[1] = self.slope * x + self.intercept + noise.sample(rng);
        }
        Observations::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn grid_and_noise_follow_settings() {
        let settings = SyntheticData {
            slope: 2.0,
            intercept: 1.0,
            sigma: 0.5,
            start: -1.0,
            spacing: 0.5,
            n_points: 2_000,
        };
        let data = settings.generate(&mut SmallRng::seed_from_u64(1)).unwrap();
        assert_eq!(data.len(), 2_000);
        assert_eq!(data.xs()[0], -1.0);
        assert_eq!(data.xs()[2], 0.0);

        let residuals: Vec<f64> = data.iter().map(|(x, y)| y - (2.0 * x + 1.0)).collect();
        let mean = residuals.iter().sum::<f64>() / residuals.len() as f64;
        let var = residuals.iter().map(|r| (r - mean).powi(2)).sum::<f64>()
            / (residuals.len() - 1) as f64;
        assert_abs_diff_eq!(mean, 0.0, epsilon = 0.05);
        assert_abs_diff_eq!(var.sqrt(), 0.5, epsilon = 0.05);
    }

    #[test]
    fn same_seed_same_data() {
        let a = SyntheticData::default().generate(&mut SmallRng::seed_from_u64(42)).unwrap();
        let b = SyntheticData::default().generate(&mut SmallRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let bad = [
            SyntheticData {
                sigma: -1.0,
                ..SyntheticData::default()
            },
            SyntheticData {
                sigma: 0.0,
                ..SyntheticData::default()
            },
            SyntheticData {
                sigma: f64::NAN,
                ..SyntheticData::default()
            },
            SyntheticData {
                start: f64::INFINITY,
                ..SyntheticData::default()
            },
            SyntheticData {
                spacing: f64::NAN,
                ..SyntheticData::default()
            },
        ];
        for settings in bad {
            assert!(
                matches!(
                    settings.generate(&mut SmallRng::seed_from_u64(0)),
                    Err(Error::InvalidConfig(_))
                ),
                "expected {settings:?} to be rejected"
            );
        }
    }
}
