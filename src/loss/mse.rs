pub struct MseLoss;

impl MseLoss {
    /// Scalar MSE: mean((guess - target)²)
    pub fn total(guess: &[f64], target: &[f64]) -> f64 {
        let n = guess.len() as f64;
        guess.iter().zip(target.iter())
            .map(|(g, t)| (g - t).powi(2))
            .sum::<f64>() / n
    }

    /// Per-output gradient: (guess - target) · 2/n
    pub fn gradient(guess: &[f64], target: &[f64]) -> Vec<f64> {
        let scale = 2.0 / guess.len() as f64;
        guess.iter().zip(target.iter())
            .map(|(g, t)| (g - t) * scale)
            .collect()
    }
}
