//! Statistics over vector views
//!
//! Concrete statistics are polymorphic over the [`Stat`] capability so
//! callers can hold, pass and table them uniformly. Stream statistics
//! (everything except the median) silently drop non-finite values before
//! aggregating; this is a documented data-cleaning policy, not error
//! suppression. The median instead sorts a copy with NaN ordered greatest
//! and excludes only NaN, so infinities participate in the midpoint.
//!
//! # Example
//!
//! ```
//! use jam::{Stat, Sum, Mean, Vector};
//!
//! let v = Vector::from_slice(&[0.0, 1.0, 2.0, f64::NAN, -4.0, f64::INFINITY, 8.0]);
//! assert_eq!(Sum.compute(&v).unwrap(), 7.0);
//! assert_eq!(Mean.compute(&v).unwrap(), 1.4);
//! ```

use std::cmp::Ordering;

use crate::backend;
use crate::error::{Error, Result};
use crate::vector::VectorView;

/// A statistic computable from any vector view.
pub trait Stat {
    /// Computes the statistic over `data`.
    fn compute(&self, data: &dyn VectorView) -> Result<f64>;
}

fn raw_values(data: &dyn VectorView) -> Vec<f64> {
    (0..data.len()).filter_map(|i| data.get(i).ok()).collect()
}

fn finite_values(data: &dyn VectorView) -> Vec<f64> {
    raw_values(data)
        .into_iter()
        .filter(|x| x.is_finite())
        .collect()
}

/// Sum of the finite values. Zero when none exist.
pub struct Sum;

impl Stat for Sum {
    fn compute(&self, data: &dyn VectorView) -> Result<f64> {
        Ok(finite_values(data).iter().sum())
    }
}

/// Arithmetic mean of the finite values.
pub struct Mean;

impl Stat for Mean {
    fn compute(&self, data: &dyn VectorView) -> Result<f64> {
        let finite = finite_values(data);
        if finite.is_empty() {
            return Err(Error::EmptyInput("no finite values"));
        }
        Ok(finite.iter().sum::<f64>() / finite.len() as f64)
    }
}

/// Largest finite value.
pub struct Max;

impl Stat for Max {
    fn compute(&self, data: &dyn VectorView) -> Result<f64> {
        let finite = finite_values(data);
        if finite.is_empty() {
            return Err(Error::EmptyInput("no finite values"));
        }
        Ok(finite.iter().copied().fold(f64::NEG_INFINITY, f64::max))
    }
}

/// Smallest finite value.
pub struct Min;

impl Stat for Min {
    fn compute(&self, data: &dyn VectorView) -> Result<f64> {
        let finite = finite_values(data);
        if finite.is_empty() {
            return Err(Error::EmptyInput("no finite values"));
        }
        Ok(finite.iter().copied().fold(f64::INFINITY, f64::min))
    }
}

/// Sum of absolute finite values.
pub struct Norm1;

impl Stat for Norm1 {
    fn compute(&self, data: &dyn VectorView) -> Result<f64> {
        Ok(finite_values(data).iter().map(|x| x.abs()).sum())
    }
}

/// Euclidean norm of the finite values.
pub struct Norm2;

impl Stat for Norm2 {
    fn compute(&self, data: &dyn VectorView) -> Result<f64> {
        Ok(finite_values(data)
            .iter()
            .map(|x| x * x)
            .sum::<f64>()
            .sqrt())
    }
}

/// Median over a sorted copy. NaN sorts greatest and is excluded from the
/// midpoint; infinities are kept. An even count averages the two middles.
pub struct Median;

impl Stat for Median {
    fn compute(&self, data: &dyn VectorView) -> Result<f64> {
        let mut values = raw_values(data);
        values.sort_by(nan_greatest);
        let count = values.iter().filter(|x| !x.is_nan()).count();
        if count == 0 {
            return Err(Error::EmptyInput("no non-NaN values"));
        }
        if count % 2 == 1 {
            Ok(values[count / 2])
        } else {
            Ok((values[count / 2 - 1] + values[count / 2]) / 2.0)
        }
    }
}

fn nan_greatest(a: &f64, b: &f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
    }
}

/// Quantile evaluation over the finite values of a view, delegating to the
/// backend percentile engine.
pub struct QuantileCalculator;

impl QuantileCalculator {
    /// Validates a quantile probability. Valid range is `(0.0, 1.0]`: zero
    /// and negative probabilities fail, the maximum (1.0) is permitted.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidQuantile`] outside the valid range.
    ///
    /// # Examples
    ///
    /// ```
    /// use jam::QuantileCalculator;
    ///
    /// assert!(QuantileCalculator::validate(0.0).is_err());
    /// assert!(QuantileCalculator::validate(1.0).is_ok());
    /// ```
    pub fn validate(probability: f64) -> Result<()> {
        if probability > 0.0 && probability <= 1.0 {
            Ok(())
        } else {
            Err(Error::InvalidQuantile { value: probability })
        }
    }

    /// Computes one quantile.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidQuantile`] for an out-of-range probability;
    /// [`Error::EmptyInput`] when the view has no finite values.
    pub fn compute(data: &dyn VectorView, probability: f64) -> Result<f64> {
        Self::validate(probability)?;
        let finite = finite_values(data);
        if finite.is_empty() {
            return Err(Error::EmptyInput("no finite values"));
        }
        Ok(backend::percentile(&finite, probability))
    }

    /// Computes several quantiles over one pass of validation and
    /// filtering.
    pub fn compute_many(data: &dyn VectorView, probabilities: &[f64]) -> Result<Quantiles> {
        for &p in probabilities {
            Self::validate(p)?;
        }
        let finite = finite_values(data);
        if finite.is_empty() {
            return Err(Error::EmptyInput("no finite values"));
        }
        let values = probabilities
            .iter()
            .map(|&p| backend::percentile(&finite, p))
            .collect();
        Ok(Quantiles {
            probabilities: probabilities.to_vec(),
            values,
        })
    }
}

/// Immutable snapshot of quantile probabilities and their values.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantiles {
    probabilities: Vec<f64>,
    values: Vec<f64>,
}

impl Quantiles {
    /// The requested probabilities.
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// The quantile values, parallel to [`Quantiles::probabilities`].
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of quantiles.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no quantiles were requested.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Immutable seven-number summary derived once from a data vector.
///
/// All accumulation runs over finite values only. A view with zero finite
/// values summarizes to [`StatSummary::EMPTY`], whose fields are all NaN.
/// The standard deviation is the sample deviation (denominator `n - 1`) and
/// is NaN for single-observation inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatSummary {
    count: usize,
    min: f64,
    q1: f64,
    median: f64,
    mean: f64,
    std_dev: f64,
    q3: f64,
    max: f64,
}

impl StatSummary {
    /// The summary of a view with no finite values.
    pub const EMPTY: StatSummary = StatSummary {
        count: 0,
        min: f64::NAN,
        q1: f64::NAN,
        median: f64::NAN,
        mean: f64::NAN,
        std_dev: f64::NAN,
        q3: f64::NAN,
        max: f64::NAN,
    };

    /// Summarizes a view in a single accumulation pass plus quantile
    /// evaluation.
    pub fn compute(data: &dyn VectorView) -> StatSummary {
        let finite = finite_values(data);
        if finite.is_empty() {
            return StatSummary::EMPTY;
        }

        let count = finite.len();
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &x in &finite {
            sum += x;
            if x < min {
                min = x;
            }
            if x > max {
                max = x;
            }
        }
        let mean = sum / count as f64;

        let std_dev = if count > 1 {
            let centered_norm = finite
                .iter()
                .map(|x| (x - mean) * (x - mean))
                .sum::<f64>()
                .sqrt();
            centered_norm / ((count - 1) as f64).sqrt()
        } else {
            f64::NAN
        };

        StatSummary {
            count,
            min,
            q1: backend::percentile(&finite, 0.25),
            median: backend::percentile(&finite, 0.5),
            mean,
            std_dev,
            q3: backend::percentile(&finite, 0.75),
            max,
        }
    }

    /// Number of finite observations.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Smallest finite observation.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// First quartile.
    pub fn q1(&self) -> f64 {
        self.q1
    }

    /// Median.
    pub fn median(&self) -> f64 {
        self.median
    }

    /// Arithmetic mean.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample standard deviation; NaN unless `count > 1`.
    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Third quartile.
    pub fn q3(&self) -> f64 {
        self.q3
    }

    /// Largest finite observation.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// True for the summary of zero finite values.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl std::fmt::Display for StatSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "n={} min={} q1={} median={} mean={} sd={} q3={} max={}",
            self.count, self.min, self.q1, self.median, self.mean, self.std_dev, self.q3, self.max
        )
    }
}
