//! Differencing and integration of series
//!
//! `Differenced` keeps the last value of every intermediate level so that
//! projections made on the differenced scale can be integrated back onto the
//! original scale.

use crate::{MathError, Result};

fn difference_once(data: &[f64]) -> Vec<f64> {
    data.windows(2).map(|w| w[1] - w[0]).collect()
}

/// A series differenced `order` times, remembering what is needed to undo it
#[derive(Debug, Clone, PartialEq)]
pub struct Differenced {
    values: Vec<f64>,
    /// Last value of each level, level 0 being the original series
    tails: Vec<f64>,
}

impl Differenced {
    /// Difference `data` `order` times
    pub fn new(data: &[f64], order: usize) -> Result<Self> {
        if data.len() <= order {
            return Err(MathError::InsufficientData(format!(
                "Need more than {} observations to difference {} times, got {}",
                order,
                order,
                data.len()
            )));
        }

        let mut tails = Vec::with_capacity(order);
        let mut level = data.to_vec();
        for _ in 0..order {
            // len() > 1 is guaranteed by the check above
            tails.push(level[level.len() - 1]);
            level = difference_once(&level);
        }

        Ok(Self {
            values: level,
            tails,
        })
    }

    /// The differenced values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Differencing order
    pub fn order(&self) -> usize {
        self.tails.len()
    }

    /// Map values continuing the differenced series back to the original scale
    pub fn integrate(&self, continuation: &[f64]) -> Vec<f64> {
        let mut result = continuation.to_vec();
        for &last in self.tails.iter().rev() {
            let mut running = last;
            for value in result.iter_mut() {
                running += *value;
                *value = running;
            }
        }
        result
    }
}
