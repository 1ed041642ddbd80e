pub struct QuadraticLoss;

impl QuadraticLoss {
    /// Scalar sum of squared differences: Σ(guess - target)²
    pub fn total(guess: &[f64], target: &[f64]) -> f64 {
        guess.iter().zip(target.iter())
            .map(|(g, t)| (g - t).powi(2))
            .sum()
    }

    /// Per-output gradient: (guess - target) · 2
    pub fn gradient(guess: &[f64], target: &[f64]) -> Vec<f64> {
        guess.iter().zip(target.iter())
            .map(|(g, t)| (g - t) * 2.0)
            .collect()
    }
}
