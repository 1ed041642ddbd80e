pub mod mse;
pub mod quadratic;
pub mod half_quadratic;
pub mod cost_function;

pub use mse::MseLoss;
pub use quadratic::QuadraticLoss;
pub use half_quadratic::HalfQuadraticLoss;
pub use cost_function::CostFunction;
