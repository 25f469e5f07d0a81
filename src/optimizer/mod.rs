//! # Optimizers
//!
//! First-order optimizers for the dense network. Each optimizer owns its
//! learning rate, fixed at construction, and keeps whatever per-layer state it
//! needs keyed by layer index.
//!
//! - [`SGD`]: plain gradient descent.
//! - [`Adam`]: bias-corrected first and second moments. The effective step
//!   size is recomputed every step from the step counter.

use ndarray::{Array, Array1, Array2, Dimension, Zip};
use serde::{Deserialize, Serialize};

pub trait Optimizer {
    /// Called once before the parameter updates of a gradient step.
    fn begin_step(&mut self) {}

    fn update_weights(&mut self, layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>);

    fn update_biases(&mut self, layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>);

    /// Base learning rate set at construction.
    fn learning_rate(&self) -> f32;
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum OptimizerWrapper {
    SGD(SGD),
    Adam(Adam),
}

impl Optimizer for OptimizerWrapper {
    fn begin_step(&mut self) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.begin_step(),
            OptimizerWrapper::Adam(optimizer) => optimizer.begin_step(),
        }
    }

    fn update_weights(&mut self, layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.update_weights(layer, weights, gradients),
            OptimizerWrapper::Adam(optimizer) => optimizer.update_weights(layer, weights, gradients),
        }
    }

    fn update_biases(&mut self, layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.update_biases(layer, biases, gradients),
            OptimizerWrapper::Adam(optimizer) => optimizer.update_biases(layer, biases, gradients),
        }
    }

    fn learning_rate(&self) -> f32 {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.learning_rate(),
            OptimizerWrapper::Adam(optimizer) => optimizer.learning_rate(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SGD {
    pub learning_rate: f32,
}

impl SGD {
    pub fn new(learning_rate: f32) -> SGD {
        SGD { learning_rate }
    }
}

impl Optimizer for SGD {
    fn update_weights(&mut self, _layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>) {
        let learning_rate = self.learning_rate;
        weights.zip_mut_with(gradients, |w, &g| *w -= learning_rate * g);
    }

    fn update_biases(&mut self, _layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>) {
        let learning_rate = self.learning_rate;
        biases.zip_mut_with(gradients, |b, &g| *b -= learning_rate * g);
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Adam {
    pub learning_rate: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    m_weights: Vec<Array2<f32>>,
    v_weights: Vec<Array2<f32>>,
    m_biases: Vec<Array1<f32>>,
    v_biases: Vec<Array1<f32>>,
    /// Number of gradient steps taken so far.
    pub t: u32,
}

impl Adam {
    pub fn new(learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Adam {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            m_weights: Vec::new(),
            v_weights: Vec::new(),
            m_biases: Vec::new(),
            v_biases: Vec::new(),
            t: 0,
        }
    }

    /// Keras defaults for everything but the learning rate.
    pub fn with_learning_rate(learning_rate: f32) -> Self {
        Self::new(learning_rate, 0.9, 0.999, 1e-7)
    }

    /// Bias-corrected step size for the current step.
    ///
    /// `lr * sqrt(1 - beta2^t) / (1 - beta1^t)`; equals the base learning
    /// rate before the first step.
    pub fn step_size(&self) -> f32 {
        if self.t == 0 {
            return self.learning_rate;
        }
        let t = self.t as i32;
        self.learning_rate * (1.0 - self.beta2.powi(t)).sqrt() / (1.0 - self.beta1.powi(t))
    }

    fn apply<D: Dimension>(
        &self,
        params: &mut Array<f32, D>,
        gradients: &Array<f32, D>,
        m: &mut Array<f32, D>,
        v: &mut Array<f32, D>,
    ) {
        let (beta1, beta2, epsilon) = (self.beta1, self.beta2, self.epsilon);
        let step_size = self.step_size();
        Zip::from(params)
            .and(gradients)
            .and(m)
            .and(v)
            .for_each(|p, &g, m, v| {
                *m = beta1 * *m + (1.0 - beta1) * g;
                *v = beta2 * *v + (1.0 - beta2) * g * g;
                *p -= step_size * *m / (v.sqrt() + epsilon);
            });
    }
}

/// Moment buffer for `layer`, created (or reset) to zeros when missing or mis-shaped.
fn moment_slot<D: Dimension>(slots: &mut Vec<Array<f32, D>>, layer: usize, dim: D) -> Array<f32, D> {
    while slots.len() <= layer {
        slots.push(Array::zeros(dim.clone()));
    }
    if slots[layer].raw_dim() != dim {
        slots[layer] = Array::zeros(dim);
    }
    std::mem::take(&mut slots[layer])
}

impl Optimizer for Adam {
    fn begin_step(&mut self) {
        self.t += 1;
    }

    fn update_weights(&mut self, layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>) {
        let mut m = moment_slot(&mut self.m_weights, layer, weights.raw_dim());
        let mut v = moment_slot(&mut self.v_weights, layer, weights.raw_dim());
        self.apply(weights, gradients, &mut m, &mut v);
        self.m_weights[layer] = m;
        self.v_weights[layer] = v;
    }

    fn update_biases(&mut self, layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>) {
        let mut m = moment_slot(&mut self.m_biases, layer, biases.raw_dim());
        let mut v = moment_slot(&mut self.v_biases, layer, biases.raw_dim());
        self.apply(biases, gradients, &mut m, &mut v);
        self.m_biases[layer] = m;
        self.v_biases[layer] = v;
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}
