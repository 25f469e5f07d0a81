use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::initialization::WeightInit;
use crate::activations::Activation;
use crate::error::{FlappyError, Result};

/// A fully connected (dense) layer in a neural network
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DenseLayer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub activation: Activation,
}

/// Values recorded during a forward pass and consumed by [`DenseLayer::backward_batch`].
pub struct ForwardTrace {
    pub inputs: Array2<f32>,
    pub pre_activation: Array2<f32>,
}

impl DenseLayer {
    /// Create a new dense layer, drawing its weights from `rng` with the given strategy.
    /// The biases are initialized with zeros.
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        activation: Activation,
        init: WeightInit,
        rng: &mut R,
    ) -> Self {
        DenseLayer {
            weights: init.initialize_weights((input_size, output_size), rng),
            biases: init.initialize_biases(output_size),
            activation,
        }
    }

    pub fn with_weights(mut self, weights: Array2<f32>) -> Result<Self> {
        if weights.dim() != self.weights.dim() {
            return Err(FlappyError::shape("layer weights", self.weights.len(), weights.len()));
        }
        self.weights = weights;
        Ok(self)
    }

    pub fn with_biases(mut self, biases: Array1<f32>) -> Result<Self> {
        if biases.dim() != self.biases.dim() {
            return Err(FlappyError::shape("layer biases", self.biases.len(), biases.len()));
        }
        self.biases = biases;
        Ok(self)
    }

    pub fn input_size(&self) -> usize {
        self.weights.shape()[0]
    }

    pub fn output_size(&self) -> usize {
        self.weights.shape()[1]
    }

    fn pre_activation(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        inputs.dot(&self.weights) + &self.biases.view().insert_axis(Axis(0))
    }

    /// Forward pass for a batch of inputs. Does not touch the layer.
    pub fn forward_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut outputs = self.pre_activation(inputs);
        self.activation.apply_batch(&mut outputs);
        outputs
    }

    /// Forward pass that also returns what the backward pass needs.
    pub fn forward_traced(&self, inputs: ArrayView2<f32>) -> (Array2<f32>, ForwardTrace) {
        let pre_activation = self.pre_activation(inputs);
        let mut outputs = pre_activation.clone();
        self.activation.apply_batch(&mut outputs);
        let trace = ForwardTrace {
            inputs: inputs.to_owned(),
            pre_activation,
        };
        (outputs, trace)
    }

    /// Gradients for a batch of output errors.
    ///
    /// Returns `(adjusted_error, weight_gradients, bias_gradients)`, where the
    /// adjusted error is the output error scaled by the activation derivative.
    pub fn backward_batch(
        &self,
        trace: &ForwardTrace,
        output_errors: ArrayView2<f32>,
    ) -> (Array2<f32>, Array2<f32>, Array1<f32>) {
        let activation_deriv = self.activation.derivative_batch(trace.pre_activation.view());
        let adjusted_error = &output_errors * &activation_deriv;
        let weight_gradients = trace.inputs.t().dot(&adjusted_error);
        let bias_gradients = adjusted_error.sum_axis(Axis(0));

        (adjusted_error, weight_gradients, bias_gradients)
    }
}
