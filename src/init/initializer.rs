use rand::Rng;
use serde::{Serialize, Deserialize};
use std::f64::consts::PI;

use crate::math::matrix::Matrix;

/// Weight and bias initialisation strategies.
///
/// For a layer with `n` inputs and `m` neurons (weights shaped `m × n`):
///
/// - `XavierUniform`: `w ~ U(-1, 1) · sqrt(6 / (n + m))`
/// - `XavierNormal`: `w ~ N(0, 1) · sqrt(2 / (n + m))`
/// - `Kaiming`: `w ~ U(-1, 1) · sqrt(n / 2)`
/// - `Zero`: every weight and bias is `0`
///
/// All random strategies draw biases from `U(-1, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Initializer {
    #[default]
    XavierUniform,
    XavierNormal,
    Kaiming,
    Zero,
}

impl Initializer {
    /// Fills `weights` and `biases` using the thread-local generator.
    pub fn initialize(&self, weights: &mut Matrix, biases: &mut [f64]) {
        self.initialize_with_rng(weights, biases, &mut rand::thread_rng());
    }

    /// Fills `weights` and `biases` from `rng`; a seeded generator makes the
    /// result reproducible.
    pub fn initialize_with_rng<R: Rng + ?Sized>(
        &self,
        weights: &mut Matrix,
        biases: &mut [f64],
        rng: &mut R,
    ) {
        let fan_in = weights.cols() as f64;
        let fan_out = weights.rows() as f64;

        match self {
            Initializer::XavierUniform => {
                let factor = (6.0 / (fan_in + fan_out)).sqrt();
                fill_matrix(weights, || symmetric_uniform(rng) * factor);
            }
            Initializer::XavierNormal => {
                let factor = (2.0 / (fan_in + fan_out)).sqrt();
                fill_matrix(weights, || sample_standard_normal(rng) * factor);
            }
            Initializer::Kaiming => {
                let factor = (fan_in / 2.0).sqrt();
                fill_matrix(weights, || symmetric_uniform(rng) * factor);
            }
            Initializer::Zero => {
                weights.fill(0.0);
                biases.iter_mut().for_each(|b| *b = 0.0);
                return;
            }
        }

        for b in biases.iter_mut() {
            *b = symmetric_uniform(rng);
        }
    }
}

fn fill_matrix<F: FnMut() -> f64>(weights: &mut Matrix, mut sample: F) {
    for row in weights.rows_mut() {
        for w in row.iter_mut() {
            *w = sample();
        }
    }
}

/// Uniform draw from `[-1, 1)`.
fn symmetric_uniform<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(-1.0..1.0)
}

/// Samples a single value from N(0, 1) using the Box-Muller transform.
fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // Both draws lie in (0, 1] to avoid log(0).
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = 1.0 - rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}
