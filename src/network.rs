use std::fs;
use std::path::Path;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activations::Activation;
use crate::error::{FlappyError, Result};
use crate::layers::{DenseLayer, WeightInit};
use crate::loss::{Loss, MSE};
use crate::optimizer::{Optimizer, OptimizerWrapper};

/// A feed-forward network of dense layers together with the optimizer that
/// updates it.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NeuralNetwork {
    pub layers: Vec<DenseLayer>,
    pub optimizer: OptimizerWrapper,
}

impl NeuralNetwork {
    /// Build a network from already constructed layers.
    ///
    /// Fails if the network is empty or consecutive layers disagree on size.
    pub fn new(layers: Vec<DenseLayer>, optimizer: OptimizerWrapper) -> Result<Self> {
        if layers.is_empty() {
            return Err(FlappyError::invalid_parameter("layers", "network needs at least one layer"));
        }
        for pair in layers.windows(2) {
            if pair[0].output_size() != pair[1].input_size() {
                return Err(FlappyError::shape(
                    "layer input",
                    pair[0].output_size(),
                    pair[1].input_size(),
                ));
            }
        }
        Ok(NeuralNetwork { layers, optimizer })
    }

    /// Create a network with the given layer sizes and activations, drawing
    /// initial weights from `rng`.
    ///
    /// `layer_sizes` includes the input and output sizes, so there must be
    /// exactly one activation per window of two sizes.
    pub fn from_sizes<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        activations: &[Activation],
        optimizer: OptimizerWrapper,
        rng: &mut R,
    ) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(FlappyError::invalid_parameter("layer_sizes", "must have at least 2 entries"));
        }
        if layer_sizes.len() - 1 != activations.len() {
            return Err(FlappyError::invalid_parameter(
                "activations",
                "number of activations must match number of layer sizes - 1",
            ));
        }
        if layer_sizes.contains(&0) {
            return Err(FlappyError::invalid_parameter("layer_sizes", "every layer needs at least one unit"));
        }

        let layers = layer_sizes
            .windows(2)
            .zip(activations.iter())
            .map(|(window, &activation)| {
                DenseLayer::new(window[0], window[1], activation, WeightInit::for_activation(activation), rng)
            })
            .collect::<Vec<_>>();

        Self::new(layers, optimizer)
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, DenseLayer::input_size)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, DenseLayer::output_size)
    }

    /// Total number of trainable parameters.
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|layer| layer.weights.len() + layer.biases.len())
            .sum()
    }

    fn check_input_width(&self, width: usize) -> Result<()> {
        if width != self.input_size() {
            return Err(FlappyError::shape("network input", self.input_size(), width));
        }
        Ok(())
    }

    /// Forward pass for a single input vector, treated as a batch of one.
    pub fn forward(&self, input: ArrayView1<f32>) -> Result<Array1<f32>> {
        let output = self.forward_batch(input.insert_axis(Axis(0)))?;
        Ok(output.index_axis_move(Axis(0), 0))
    }

    /// Forward pass for a batch of inputs, one row per sample.
    pub fn forward_batch(&self, inputs: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_input_width(inputs.ncols())?;
        let mut current_output = inputs.to_owned();
        for layer in &self.layers {
            current_output = layer.forward_batch(current_output.view());
        }
        Ok(current_output)
    }

    /// One gradient step on a single sample. Returns the loss measured before the update.
    pub fn train(&mut self, input: ArrayView1<f32>, target: ArrayView1<f32>) -> Result<f32> {
        self.train_batch(input.insert_axis(Axis(0)), target.insert_axis(Axis(0)))
    }

    /// One gradient step on the mean squared error of a batch.
    /// Returns the loss measured before the update.
    pub fn train_batch(&mut self, inputs: ArrayView2<f32>, targets: ArrayView2<f32>) -> Result<f32> {
        self.check_input_width(inputs.ncols())?;
        if targets.ncols() != self.output_size() {
            return Err(FlappyError::shape("network target", self.output_size(), targets.ncols()));
        }
        if targets.nrows() != inputs.nrows() {
            return Err(FlappyError::shape("target batch", inputs.nrows(), targets.nrows()));
        }

        let mut traces = Vec::with_capacity(self.layers.len());
        let mut current_output = inputs.to_owned();
        for layer in &self.layers {
            let (output, trace) = layer.forward_traced(current_output.view());
            traces.push(trace);
            current_output = output;
        }

        let loss = MSE.compute_batch(current_output.view(), targets);
        let mut current_error = MSE.gradient_batch(current_output.view(), targets);

        self.optimizer.begin_step();
        for (i, trace) in traces.iter().enumerate().rev() {
            let layer = &mut self.layers[i];
            let (adjusted_error, weight_gradients, bias_gradients) =
                layer.backward_batch(trace, current_error.view());

            // Propagate through the weights as they were during the forward pass.
            if i != 0 {
                current_error = adjusted_error.dot(&layer.weights.t());
            }

            self.optimizer.update_weights(i, &mut layer.weights, &weight_gradients);
            self.optimizer.update_biases(i, &mut layer.biases, &bias_gradients);
        }

        Ok(loss)
    }

    /// Save the network, including optimizer state, with bincode.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = bincode::serialize(self)?;
        fs::write(path, serialized)?;
        Ok(())
    }

    /// Load a network saved with [`NeuralNetwork::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read(path)?;
        let network: Self = bincode::deserialize(&data)?;
        Self::new(network.layers, network.optimizer)
    }
}
