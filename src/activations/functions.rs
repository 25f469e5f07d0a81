use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// An enumeration of the possible activation functions that can be used in a neural network layer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum Activation {
    #[default]
    Sigmoid,
    Tanh,
    Relu,
    Linear,
}

impl Activation {
    /// Value of the activation at `x`.
    pub fn value(self, x: f32) -> f32 {
        match self {
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
            Activation::Relu => x.max(0.0),
            Activation::Linear => x,
        }
    }

    /// Derivative of the activation at the pre-activation value `x`.
    pub fn derivative(self, x: f32) -> f32 {
        match self {
            Activation::Sigmoid => {
                let sigmoid = self.value(x);
                sigmoid * (1.0 - sigmoid)
            }
            Activation::Tanh => {
                let tanh_x = x.tanh();
                1.0 - tanh_x * tanh_x
            }
            Activation::Relu => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::Linear => 1.0,
        }
    }

    /// Apply the activation function to a batch of inputs in-place.
    pub fn apply_batch(&self, inputs: &mut Array2<f32>) {
        if let Activation::Linear = self {
            return;
        }
        let activation = *self;
        inputs.mapv_inplace(|v| activation.value(v));
    }

    /// Compute the derivative of the activation function for a batch of pre-activation values.
    pub fn derivative_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        match self {
            Activation::Linear => Array2::ones(inputs.dim()),
            activation => inputs.mapv(|v| activation.derivative(v)),
        }
    }
}
