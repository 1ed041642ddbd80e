use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::loss::{HalfQuadraticLoss, MseLoss, QuadraticLoss};

/// Selects the cost a network minimises.
///
/// - `Mse`: mean squared error; gradient `(guess - target) · 2/n`.
/// - `Quadratic`: sum of squared errors; gradient `(guess - target) · 2`.
/// - `HalfQuadratic`: half the sum of squared errors; gradient `guess - target`.
///
/// Only [`gradient`](CostFunction::gradient) drives training;
/// [`total`](CostFunction::total) is reported for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostFunction {
    Mse,
    Quadratic,
    #[default]
    HalfQuadratic,
}

impl CostFunction {
    pub fn total(&self, guess: &[f64], target: &[f64]) -> Result<f64> {
        check_lengths(guess, target)?;
        if guess.is_empty() {
            return Ok(0.0);
        }
        Ok(match self {
            CostFunction::Mse           => MseLoss::total(guess, target),
            CostFunction::Quadratic     => QuadraticLoss::total(guess, target),
            CostFunction::HalfQuadratic => HalfQuadraticLoss::total(guess, target),
        })
    }

    /// ∂C/∂guess, one entry per output neuron.
    pub fn gradient(&self, guess: &[f64], target: &[f64]) -> Result<Vec<f64>> {
        check_lengths(guess, target)?;
        Ok(match self {
            CostFunction::Mse           => MseLoss::gradient(guess, target),
            CostFunction::Quadratic     => QuadraticLoss::gradient(guess, target),
            CostFunction::HalfQuadratic => HalfQuadraticLoss::gradient(guess, target),
        })
    }
}

fn check_lengths(guess: &[f64], target: &[f64]) -> Result<()> {
    if guess.len() != target.len() {
        return Err(Error::mismatch("cost function", guess.len(), target.len()));
    }
    Ok(())
}
