/// Half the sum of squared differences. Its gradient is the raw error,
/// which makes it the default cost for classification networks.
pub struct HalfQuadraticLoss;

impl HalfQuadraticLoss {
    /// Scalar: ½ · Σ(guess - target)²
    pub fn total(guess: &[f64], target: &[f64]) -> f64 {
        0.5 * guess.iter().zip(target.iter())
            .map(|(g, t)| (g - t).powi(2))
            .sum::<f64>()
    }

    /// Per-output gradient: guess - target
    pub fn gradient(guess: &[f64], target: &[f64]) -> Vec<f64> {
        guess.iter().zip(target.iter())
            .map(|(g, t)| g - t)
            .collect()
    }
}
