pub mod dataset;
pub mod idx;

pub use dataset::{DataSet, Match};
pub use idx::IdxLayout;
