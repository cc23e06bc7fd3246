/*!
# Model Types

The value types the sampler works with:

- [`Theta`]: the parameter vector `(a, b, sigma)` of the regression `y ~ N(a * x + b, sigma)`.
- [`StepSize`]: the proposal width `k`.
- [`Observations`]: the immutable `(n, 2)` table of `(x, y)` pairs.

All three validate on construction, so a value of any of these types is always usable by
the scoring and proposal functions: `sigma` is finite and strictly positive, `k` is finite
and strictly positive, and every observation is finite.

```rust
use linreg_mcmc::model::{Observations, Theta};

let theta = Theta::new(1.0, 0.0, 0.5).unwrap();
assert_eq!(theta.to_array(), [1.0, 0.0, 0.5]);

let data = Observations::from_pairs(&[(1.0, 1.0), (2.0, 2.0)]).unwrap();
assert_eq!(data.len(), 2);

assert!(Theta::new(1.0, 0.0, 0.0).is_err());
```
*/

use ndarray::{Array2, ArrayView1, Axis};
use std::fmt;

use crate::error::{Error, Result};

/// Names of the three parameters, in storage order.
pub const PARAM_NAMES: [&str; 3] = ["a", "b", "sigma"];

/// Parameter vector of the linear model: slope `a`, intercept `b` and noise scale `sigma`.
///
/// The mean of an observation is `a * x + b`. Fields are private so that the
/// `sigma > 0` invariant cannot be broken after construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theta {
    a: f64,
    b: f64,
    sigma: f64,
}

impl Theta {
    /// Builds a parameter vector, rejecting non-finite values and `sigma <= 0`.
    pub fn new(a: f64, b: f64, sigma: f64) -> Result<Self> {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(Error::InvalidParameter { sigma });
        }
        if !(a.is_finite() && b.is_finite()) {
            return Err(Error::InvalidTheta { a, b });
        }
        Ok(Self { a, b, sigma })
    }

    /// Slope.
    pub fn a(&self) -> f64 {
        self.a
    }

    /// Intercept.
    pub fn b(&self) -> f64 {
        self.b
    }

    /// Noise standard deviation, always `> 0`.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// `[a, b, sigma]`, matching [`PARAM_NAMES`].
    pub fn to_array(&self) -> [f64; 3] {
        [self.a, self.b, self.sigma]
    }

    /// Mean of the observation at `x` under this parameter vector.
    pub fn predict(&self, x: f64) -> f64 {
        self.a * x + self.b
    }
}

impl TryFrom<[f64; 3]> for Theta {
    type Error = Error;

    fn try_from(value: [f64; 3]) -> Result<Self> {
        Theta::new(value[0], value[1], value[2])
    }
}

impl fmt::Display for Theta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(a = {:.4}, b = {:.4}, sigma = {:.4})",
            self.a, self.b, self.sigma
        )
    }
}

/// Width `k` of the random-walk proposal. Always finite and `> 0`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct StepSize(f64);

impl StepSize {
    pub fn new(k: f64) -> Result<Self> {
        if k.is_finite() && k > 0.0 {
            Ok(Self(k))
        } else {
            Err(Error::InvalidArgument { step_size: k })
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

/// Observed `(x, y)` pairs stored as an `(n, 2)` array: column 0 is `x`, column 1 is `y`.
#[derive(Debug, Clone, PartialEq)]
pub struct Observations {
    data: Array2<f64>,
}

impl Observations {
    /// Wraps an `(n, 2)` array. Fails if the array does not have exactly two columns or
    /// holds a NaN or infinite value.
    pub fn new(data: Array2<f64>) -> Result<Self> {
        if data.ncols() != 2 {
            return Err(Error::InvalidData(format!(
                "expected 2 columns (x, y), got {}",
                data.ncols()
            )));
        }
        if let Some((row, _)) = data
            .axis_iter(Axis(0))
            .enumerate()
            .find(|(_, r)| r.iter().any(|v| !v.is_finite()))
        {
            return Err(Error::InvalidData(format!(
                "non-finite value in row {row}"
            )));
        }
        Ok(Self { data })
    }

    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self> {
        let flat: Vec<f64> = pairs.iter().flat_map(|&(x, y)| [x, y]).collect();
        let data = Array2::from_shape_vec((pairs.len(), 2), flat)
            .map_err(|e| Error::InvalidData(e.to_string()))?;
        Self::new(data)
    }

    pub fn xs(&self) -> ArrayView1<'_, f64> {
        self.data.column(0)
    }

    pub fn ys(&self) -> ArrayView1<'_, f64> {
        self.data.column(1)
    }

    /// Iterates over `(x, y)` pairs in row order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.data.axis_iter(Axis(0)).map(|row| (row[0], row[1]))
    }

    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn theta_rejects_non_positive_sigma() {
        for sigma in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            match Theta::new(0.0, 0.0, sigma) {
                Err(Error::InvalidParameter { .. }) => {}
                other => panic!("expected InvalidParameter for sigma={sigma}, got {other:?}"),
            }
        }
    }

    #[test]
    fn theta_rejects_non_finite_coefficients() {
        assert!(matches!(
            Theta::new(f64::NAN, 0.0, 1.0),
            Err(Error::InvalidTheta { .. })
        ));
        assert!(matches!(
            Theta::new(0.0, f64::NEG_INFINITY, 1.0),
            Err(Error::InvalidTheta { .. })
        ));
    }

    #[test]
    fn theta_predicts_slope_times_x_plus_intercept() {
        let theta = Theta::try_from([2.0, -1.0, 1.0]).unwrap();
        assert_eq!(theta.predict(3.0), 5.0);
    }

    #[test]
    fn step_size_must_be_positive() {
        assert!(StepSize::new(0.1).is_ok());
        for k in [0.0, -0.5, f64::NAN] {
            assert!(matches!(
                StepSize::new(k),
                Err(Error::InvalidArgument { .. })
            ));
        }
    }

    #[test]
    fn observations_require_two_finite_columns() {
        assert!(Observations::new(arr2(&[[1.0, 2.0, 3.0]])).is_err());
        assert!(Observations::new(arr2(&[[1.0, f64::NAN]])).is_err());

        let data = Observations::new(arr2(&[[1.0, 2.0], [3.0, 4.0]])).unwrap();
        assert_eq!(data.xs().to_vec(), vec![1.0, 3.0]);
        assert_eq!(data.ys().to_vec(), vec![2.0, 4.0]);
        assert_eq!(data.iter().collect::<Vec<_>>(), vec![(1.0, 2.0), (3.0, 4.0)]);
    }

    #[test]
    fn empty_observations_are_allowed() {
        let data = Observations::from_pairs(&[]).unwrap();
        assert!(data.is_empty());
    }
}
