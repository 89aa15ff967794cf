//! ARIMA estimation by conditional sum of squares
//!
//! The model is fitted on the `d`-times differenced series. AR and MA
//! coefficients start from Yule-Walker style moment estimates and are refined
//! by a Hooke-Jeeves pattern search that minimises the conditional sum of squared
//! one-step errors. A mean term is only estimated when `d == 0`.
//!
//! ## Example
//!
//! ```rust
//! use series_math::arima::{Arima, ArimaOrder};
//!
//! let data: Vec<f64> = (1..=24).map(|x| 100.0 + x as f64 * 3.0 + (x % 4) as f64).collect();
//! let fitted = Arima::new(ArimaOrder::new(1, 1, 1)).unwrap().fit(&data).unwrap();
//! let forecast = fitted.forecast(3).unwrap();
//! assert_eq!(forecast.len(), 3);
//! ```

use crate::difference::Differenced;
use crate::{MathError, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use statrs::statistics::Statistics;
use std::fmt;

const MAX_AR_ORDER: usize = 5;
const MAX_DIFFERENCE_ORDER: usize = 2;
const MAX_MA_ORDER: usize = 5;

/// Upper bound on the absolute coefficient sum of each polynomial.
/// Keeps the AR part stationary and the MA part invertible.
const COEFFICIENT_BOUND: f64 = 0.999;

const DEFAULT_MAX_ITERATIONS: usize = 2000;
/// Step size at which the search is considered converged
const TOLERANCE: f64 = 1e-7;
const INITIAL_STEP: f64 = 0.1;

/// Order of an ARIMA(p, d, q) model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// AR order
    pub p: usize,
    /// Differencing order
    pub d: usize,
    /// MA order
    pub q: usize,
}

impl ArimaOrder {
    pub const fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Number of estimated coefficients
    pub fn n_params(&self) -> usize {
        self.p + self.q
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

/// Unfitted ARIMA estimator
#[derive(Debug, Clone)]
pub struct Arima {
    order: ArimaOrder,
    max_iterations: usize,
}

impl Arima {
    /// Create an estimator for the given order
    pub fn new(order: ArimaOrder) -> Result<Self> {
        if order.p > MAX_AR_ORDER {
            return Err(MathError::InvalidInput(format!(
                "AR order must be <= {}, got {}",
                MAX_AR_ORDER, order.p
            )));
        }
        if order.d > MAX_DIFFERENCE_ORDER {
            return Err(MathError::InvalidInput(format!(
                "Differencing order must be <= {}, got {}",
                MAX_DIFFERENCE_ORDER, order.d
            )));
        }
        if order.q > MAX_MA_ORDER {
            return Err(MathError::InvalidInput(format!(
                "MA order must be <= {}, got {}",
                MAX_MA_ORDER, order.q
            )));
        }

        Ok(Self {
            order,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        })
    }

    /// Limit the number of search iterations before giving up
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// Fit the model to `data`
    pub fn fit(&self, data: &[f64]) -> Result<FittedArima> {
        if data.iter().any(|x| !x.is_finite()) {
            return Err(MathError::InvalidInput(
                "Data contains NaN or infinite values".to_string(),
            ));
        }

        let ArimaOrder { p, d, q } = self.order;
        let differenced = Differenced::new(data, d)?;
        let w = differenced.values();
        if w.len() <= p {
            return Err(MathError::InsufficientData(format!(
                "{} needs more than {} differenced observations, got {}",
                self.order,
                p,
                w.len()
            )));
        }

        let mean = if d == 0 { w.iter().mean() } else { 0.0 };
        let centered: Vec<f64> = w.iter().map(|x| x - mean).collect();

        let initial = initial_estimates(&centered, p, q);
        let (params, iterations) = self.pattern_search(&centered, initial)?;
        let (ar, ma) = params.split_at(p);

        let residuals = conditional_residuals(&centered, ar, ma);
        let css: f64 = residuals[p..].iter().map(|e| e * e).sum();
        if !css.is_finite() {
            return Err(MathError::CalculationError(
                "Sum of squared residuals is not finite".to_string(),
            ));
        }
        let sigma2 = css / (centered.len() - p) as f64;

        Ok(FittedArima {
            order: self.order,
            ar: ar.to_vec(),
            ma: ma.to_vec(),
            mean,
            sigma2,
            css,
            iterations,
            differenced,
            centered,
            residuals,
        })
    }

    /// Hooke-Jeeves pattern search over the coefficient vector
    fn pattern_search(&self, w: &[f64], initial: Vec<f64>) -> Result<(Vec<f64>, usize)> {
        let p = self.order.p;
        let mut base = initial;
        let mut best = objective(w, p, &base);
        if !best.is_finite() {
            return Err(MathError::CalculationError(
                "Initial estimates are outside the admissible region".to_string(),
            ));
        }

        let mut step = INITIAL_STEP;
        let mut iterations = 0;
        while iterations < self.max_iterations {
            iterations += 1;
            let (mut point, mut score) = explore(w, p, &base, best, step);

            if score < best {
                // Keep moving along the improving direction while it pays off
                loop {
                    let pattern: Vec<f64> = point
                        .iter()
                        .zip(base.iter())
                        .map(|(x, b)| 2.0 * x - b)
                        .collect();
                    base = point;
                    best = score;
                    if iterations >= self.max_iterations {
                        break;
                    }
                    iterations += 1;

                    let pattern_score = objective(w, p, &pattern);
                    let (next, next_score) = explore(w, p, &pattern, pattern_score, step);
                    if next_score < best {
                        point = next;
                        score = next_score;
                    } else {
                        break;
                    }
                }
            } else {
                step *= 0.5;
                if step < TOLERANCE {
                    return Ok((base, iterations));
                }
            }
        }

        Err(MathError::NotConverged {
            iterations: self.max_iterations,
        })
    }
}

/// ARIMA model with estimated coefficients
#[derive(Debug, Clone)]
pub struct FittedArima {
    order: ArimaOrder,
    ar: Vec<f64>,
    ma: Vec<f64>,
    mean: f64,
    sigma2: f64,
    css: f64,
    iterations: usize,
    differenced: Differenced,
    /// Differenced series with the mean removed
    centered: Vec<f64>,
    residuals: Vec<f64>,
}

impl FittedArima {
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    /// Estimated mean of the differenced series (zero when `d > 0`)
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Innovation variance
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Conditional sum of squares at the optimum
    pub fn css(&self) -> f64 {
        self.css
    }

    /// Search iterations used
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// One-step residuals on the differenced scale
    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    /// Project `steps` values past the end of the fitted data
    pub fn forecast(&self, steps: usize) -> Result<Vec<f64>> {
        let n = self.centered.len();
        let mut extended = self.centered.clone();
        let mut errors = self.residuals.clone();

        for _ in 0..steps {
            let t = extended.len();
            let mut next = 0.0;
            for (i, phi) in self.ar.iter().enumerate() {
                if t > i {
                    next += phi * extended[t - 1 - i];
                }
            }
            for (j, theta) in self.ma.iter().enumerate() {
                if t > j {
                    next += theta * errors[t - 1 - j];
                }
            }
            extended.push(next);
            // Future innovations have zero expectation
            errors.push(0.0);
        }

        let projected: Vec<f64> = extended[n..].iter().map(|v| v + self.mean).collect();
        let values = self.differenced.integrate(&projected);

        if values.iter().any(|v| !v.is_finite()) {
            return Err(MathError::CalculationError(
                "Projection produced non-finite values".to_string(),
            ));
        }

        Ok(values)
    }

    /// Normal-theory prediction intervals for the next `steps` values
    pub fn forecast_intervals(&self, steps: usize, confidence: f64) -> Result<Vec<(f64, f64)>> {
        if confidence <= 0.0 || confidence >= 1.0 {
            return Err(MathError::InvalidInput(
                "Confidence level must be between 0 and 1".to_string(),
            ));
        }

        let values = self.forecast(steps)?;
        let normal =
            Normal::new(0.0, 1.0).map_err(|e| MathError::CalculationError(e.to_string()))?;
        let z = normal.inverse_cdf(0.5 + confidence / 2.0);

        let mut cumulative = 0.0;
        let intervals = values
            .iter()
            .zip(self.psi_weights(steps))
            .map(|(value, psi)| {
                cumulative += psi * psi;
                let half_width = z * (self.sigma2 * cumulative).sqrt();
                (value - half_width, value + half_width)
            })
            .collect();

        Ok(intervals)
    }

    /// MA(infinity) weights of the integrated process
    fn psi_weights(&self, count: usize) -> Vec<f64> {
        // phi(B) * (1 - B)^d, stored as coefficients of B^0, B^1, ...
        let mut poly: Vec<f64> = std::iter::once(1.0)
            .chain(self.ar.iter().map(|phi| -phi))
            .collect();
        for _ in 0..self.order.d {
            let mut next = vec![0.0; poly.len() + 1];
            for (k, c) in poly.iter().enumerate() {
                next[k] += c;
                next[k + 1] -= c;
            }
            poly = next;
        }
        let ar_star: Vec<f64> = poly[1..].iter().map(|c| -c).collect();

        let mut psi = Vec::with_capacity(count);
        for j in 0..count {
            if j == 0 {
                psi.push(1.0);
                continue;
            }
            let mut weight = if j <= self.ma.len() { self.ma[j - 1] } else { 0.0 };
            for (i, phi) in ar_star.iter().enumerate().take(j) {
                weight += phi * psi[j - 1 - i];
            }
            psi.push(weight);
        }
        psi
    }
}

/// Conditional one-step residuals; pre-sample errors are taken as zero
fn conditional_residuals(w: &[f64], ar: &[f64], ma: &[f64]) -> Vec<f64> {
    let p = ar.len();
    let mut residuals = vec![0.0; w.len()];
    for t in p..w.len() {
        let mut prediction = 0.0;
        for (i, phi) in ar.iter().enumerate() {
            prediction += phi * w[t - 1 - i];
        }
        for (j, theta) in ma.iter().enumerate() {
            if t > j {
                prediction += theta * residuals[t - 1 - j];
            }
        }
        residuals[t] = w[t] - prediction;
    }
    residuals
}

/// Exploratory move: probe each coordinate by one step in either direction
fn explore(w: &[f64], p: usize, start: &[f64], start_score: f64, step: f64) -> (Vec<f64>, f64) {
    let mut point = start.to_vec();
    let mut score = start_score;
    for i in 0..point.len() {
        for direction in [1.0, -1.0] {
            let mut candidate = point.clone();
            candidate[i] += direction * step;
            let candidate_score = objective(w, p, &candidate);
            if candidate_score < score {
                point = candidate;
                score = candidate_score;
                break;
            }
        }
    }
    (point, score)
}

fn admissible(coefficients: &[f64]) -> bool {
    coefficients.iter().map(|c| c.abs()).sum::<f64>() < COEFFICIENT_BOUND
}

fn objective(w: &[f64], p: usize, params: &[f64]) -> f64 {
    let (ar, ma) = params.split_at(p);
    if !admissible(ar) || !admissible(ma) {
        return f64::INFINITY;
    }
    let css: f64 = conditional_residuals(w, ar, ma)[p..]
        .iter()
        .map(|e| e * e)
        .sum();
    if css.is_finite() {
        css
    } else {
        f64::INFINITY
    }
}

/// Starting point for the search: Levinson-Durbin AR estimates, then
/// lagged autocorrelations of the AR residuals for the MA part
fn initial_estimates(w: &[f64], p: usize, q: usize) -> Vec<f64> {
    let autocov = autocovariances(w, p.max(q));
    let mut ar = levinson_durbin(&autocov, p);
    shrink_into_region(&mut ar);

    let mut ma = vec![0.0; q];
    if q > 0 {
        let residuals = conditional_residuals(w, &ar, &[]);
        let tail = &residuals[p.min(residuals.len())..];
        let residual_autocov = autocovariances(tail, q);
        if residual_autocov[0] > 1e-12 {
            for (k, coefficient) in ma.iter_mut().enumerate() {
                *coefficient = (residual_autocov[k + 1] / residual_autocov[0]).clamp(-0.5, 0.5);
            }
        }
        shrink_into_region(&mut ma);
    }

    ar.into_iter().chain(ma).collect()
}

fn shrink_into_region(coefficients: &mut [f64]) {
    let total: f64 = coefficients.iter().map(|c| c.abs()).sum();
    let limit = 0.9 * COEFFICIENT_BOUND;
    if total >= limit {
        let scale = limit / total;
        coefficients.iter_mut().for_each(|c| *c *= scale);
    }
}

fn autocovariances(data: &[f64], max_lag: usize) -> Vec<f64> {
    let n = data.len();
    let mut result = vec![0.0; max_lag + 1];
    if n == 0 {
        return result;
    }

    let mean = data.iter().mean();
    for (lag, value) in result.iter_mut().enumerate() {
        if lag >= n {
            break;
        }
        let sum: f64 = (lag..n)
            .map(|i| (data[i] - mean) * (data[i - lag] - mean))
            .sum();
        *value = sum / n as f64;
    }
    result
}

/// Solve the Yule-Walker equations for `order` AR coefficients
fn levinson_durbin(autocov: &[f64], order: usize) -> Vec<f64> {
    let mut coefficients = vec![0.0; order];
    if order == 0 || autocov[0].abs() < 1e-12 {
        return coefficients;
    }

    let mut error = autocov[0];
    for k in 0..order {
        let mut acc = autocov[k + 1];
        for j in 0..k {
            acc -= coefficients[j] * autocov[k - j];
        }
        if error.abs() < 1e-12 {
            break;
        }
        let reflection = acc / error;

        let previous = coefficients.clone();
        coefficients[k] = reflection;
        for j in 0..k {
            coefficients[j] = previous[j] - reflection * previous[k - 1 - j];
        }
        error *= 1.0 - reflection * reflection;
    }
    coefficients
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal as NormalDist};
    use rstest::rstest;

    /// Integrated AR(1) process with seeded gaussian innovations
    fn simulate_ari(phi: f64, n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let noise = NormalDist::new(0.0, 1.0).unwrap();
        let mut level = 500.0;
        let mut previous_change = 0.0;
        let mut series = Vec::with_capacity(n);
        for _ in 0..n {
            let change = phi * previous_change + noise.sample(&mut rng);
            level += change;
            previous_change = change;
            series.push(level);
        }
        series
    }

    #[rstest]
    #[case(ArimaOrder::new(6, 1, 1))]
    #[case(ArimaOrder::new(1, 3, 1))]
    #[case(ArimaOrder::new(1, 1, 6))]
    fn test_order_validation(#[case] order: ArimaOrder) {
        assert!(matches!(Arima::new(order), Err(MathError::InvalidInput(_))));
    }

    #[test]
    fn test_order_display() {
        assert_eq!(ArimaOrder::default().to_string(), "ARIMA(1,1,1)");
    }

    #[test]
    fn test_recovers_ar_coefficient() {
        let data = simulate_ari(0.6, 400, 7);
        let fitted = Arima::new(ArimaOrder::new(1, 1, 0))
            .unwrap()
            .fit(&data)
            .unwrap();

        let phi = fitted.ar_coefficients()[0];
        assert!((phi - 0.6).abs() < 0.15, "phi = {}", phi);
        assert!(fitted.sigma2() > 0.5 && fitted.sigma2() < 1.5);
    }

    #[test]
    fn test_forecast_follows_ar_recursion() {
        let data = simulate_ari(0.5, 120, 11);
        let fitted = Arima::new(ArimaOrder::new(1, 1, 0))
            .unwrap()
            .fit(&data)
            .unwrap();
        let phi = fitted.ar_coefficients()[0];
        let forecast = fitted.forecast(2).unwrap();

        let last = data[data.len() - 1];
        let last_change = last - data[data.len() - 2];
        assert!((forecast[0] - (last + phi * last_change)).abs() < 1e-9);
        assert!((forecast[1] - (forecast[0] + phi * phi * last_change)).abs() < 1e-9);
    }

    #[test]
    fn test_arima_111_on_short_history() {
        let data = [120.0, 135.0, 128.0];
        let fitted = Arima::new(ArimaOrder::default()).unwrap().fit(&data).unwrap();
        let forecast = fitted.forecast(4).unwrap();

        assert_eq!(forecast.len(), 4);
        assert!(forecast.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_constant_series_projects_flat() {
        let data = [42.0; 8];
        let fitted = Arima::new(ArimaOrder::default()).unwrap().fit(&data).unwrap();
        let forecast = fitted.forecast(3).unwrap();

        for value in forecast {
            assert!((value - 42.0).abs() < 1e-9);
        }
        assert_eq!(fitted.css(), 0.0);
    }

    #[test]
    fn test_trend_is_continued() {
        let data: Vec<f64> = (0..24).map(|x| 100.0 + 5.0 * x as f64).collect();
        let fitted = Arima::new(ArimaOrder::default()).unwrap().fit(&data).unwrap();
        let forecast = fitted.forecast(3).unwrap();

        assert!(forecast[0] > data[data.len() - 1]);
        assert!(forecast[2] > forecast[0]);
    }

    #[test]
    fn test_mean_estimated_without_differencing() {
        let data = [10.0, 12.0, 11.0, 13.0, 12.0, 11.0, 12.0, 13.0];
        let fitted = Arima::new(ArimaOrder::new(1, 0, 0))
            .unwrap()
            .fit(&data)
            .unwrap();
        assert!((fitted.mean() - 11.75).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_non_finite_data() {
        let data = [1.0, f64::NAN, 3.0, 4.0];
        let result = Arima::new(ArimaOrder::default()).unwrap().fit(&data);
        assert!(matches!(result, Err(MathError::InvalidInput(_))));
    }

    #[test]
    fn test_insufficient_data() {
        let result = Arima::new(ArimaOrder::default()).unwrap().fit(&[5.0, 6.0]);
        assert!(matches!(result, Err(MathError::InsufficientData(_))));
    }

    #[test]
    fn test_reports_non_convergence() {
        let data = simulate_ari(0.4, 60, 3);
        let result = Arima::new(ArimaOrder::default())
            .unwrap()
            .with_max_iterations(1)
            .fit(&data);
        assert_eq!(result.unwrap_err(), MathError::NotConverged { iterations: 1 });
    }

    #[test]
    fn test_intervals_widen_with_horizon() {
        let data = simulate_ari(0.3, 80, 5);
        let fitted = Arima::new(ArimaOrder::default()).unwrap().fit(&data).unwrap();
        let forecast = fitted.forecast(4).unwrap();
        let intervals = fitted.forecast_intervals(4, 0.95).unwrap();

        assert_eq!(intervals.len(), 4);
        let mut previous_width = 0.0;
        for ((lower, upper), value) in intervals.iter().zip(forecast.iter()) {
            assert!(lower < value && value < upper);
            let width = upper - lower;
            assert!(width > previous_width);
            previous_width = width;
        }

        assert!(fitted.forecast_intervals(4, 1.5).is_err());
    }
}
