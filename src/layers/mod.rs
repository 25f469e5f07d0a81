pub mod dense;
pub mod initialization;

pub use dense::{DenseLayer, ForwardTrace};
pub use initialization::WeightInit;
