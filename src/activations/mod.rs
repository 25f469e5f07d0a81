//! # Activation Functions Module
//!
//! Activation functions applied element-wise after each dense layer.
//!
//! ## Available Activations
//!
//! - **Sigmoid**: `1 / (1 + e^(-x))` - Outputs between 0 and 1. Used by the
//!   hidden layer of the Q-network.
//! - **Tanh**: Hyperbolic tangent - Outputs between -1 and 1
//! - **ReLU** (Rectified Linear Unit): `max(0, x)`
//! - **Linear**: Identity function - Used by the output layer so return
//!   estimates are unbounded
//!
//! ## Usage Example
//!
//! ```rust
//! use flappy_dqn::activations::Activation;
//! use ndarray::array;
//!
//! let mut data = array![[1.0, -0.5, 0.0, 2.0]];
//! Activation::Sigmoid.apply_batch(&mut data);
//! assert!(data.iter().all(|&v| v > 0.0 && v < 1.0));
//! ```

pub mod functions;

pub use functions::Activation;
