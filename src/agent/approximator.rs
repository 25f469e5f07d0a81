use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activations::Activation;
use crate::config::NetworkConfig;
use crate::error::{FlappyError, Result};
use crate::network::NeuralNetwork;
use crate::optimizer::{Adam, Optimizer, OptimizerWrapper};
use crate::types::{Observation, QValues, ACTION_COUNT, OBSERVATION_SIZE};

/// Maps an observation to one expected-return estimate per action.
pub trait FunctionApproximator {
    /// Estimate the returns of every action in `observation`.
    ///
    /// Must not change anything a caller can observe.
    fn predict(&self, observation: &Observation) -> Result<QValues>;

    /// Take one gradient step moving `predict(observation)` toward `target`
    /// under mean squared error. Returns the loss before the step.
    fn train(&mut self, observation: &Observation, target: &QValues) -> Result<f32>;
}

/// The Q-network: 5 inputs, one small sigmoid hidden layer, 2 linear outputs,
/// trained with Adam.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct QNetwork {
    network: NeuralNetwork,
}

impl QNetwork {
    pub fn new<R: Rng + ?Sized>(config: &NetworkConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let optimizer = OptimizerWrapper::Adam(Adam::new(
            config.learning_rate,
            config.beta1,
            config.beta2,
            config.adam_epsilon,
        ));
        let network = NeuralNetwork::from_sizes(
            &[OBSERVATION_SIZE, config.hidden_units, ACTION_COUNT],
            &[config.hidden_activation, Activation::Linear],
            optimizer,
            rng,
        )?;
        Ok(QNetwork { network })
    }

    /// Default architecture: 3 sigmoid hidden units, learning rate 0.002.
    pub fn create<R: Rng + ?Sized>(rng: &mut R) -> Result<Self> {
        Self::new(&NetworkConfig::default(), rng)
    }

    /// Wrap an existing network, checking it maps 5 inputs to 2 outputs.
    pub fn from_network(network: NeuralNetwork) -> Result<Self> {
        if network.input_size() != OBSERVATION_SIZE {
            return Err(FlappyError::shape("q-network input", OBSERVATION_SIZE, network.input_size()));
        }
        if network.output_size() != ACTION_COUNT {
            return Err(FlappyError::shape("q-network output", ACTION_COUNT, network.output_size()));
        }
        Ok(QNetwork { network })
    }

    pub fn network(&self) -> &NeuralNetwork {
        &self.network
    }

    pub fn learning_rate(&self) -> f32 {
        self.network.optimizer.learning_rate()
    }

    /// Predict from a raw slice, treated as a single-sample batch.
    pub fn predict_raw(&self, values: &[f32]) -> Result<QValues> {
        self.predict(&Observation::from_slice(values)?)
    }

    /// Train from raw slices. Both shapes are checked before anything changes.
    pub fn train_raw(&mut self, values: &[f32], target: &[f32]) -> Result<f32> {
        let observation = Observation::from_slice(values)?;
        let target = QValues::from_slice(target)?;
        self.train(&observation, &target)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.network.save(path)
    }

    /// Load weights written by [`QNetwork::save`], rejecting networks of the wrong arity.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_network(NeuralNetwork::load(path)?)
    }
}

impl FunctionApproximator for QNetwork {
    fn predict(&self, observation: &Observation) -> Result<QValues> {
        QValues::try_from(self.network.forward(observation.view())?)
    }

    fn train(&mut self, observation: &Observation, target: &QValues) -> Result<f32> {
        self.network.train(observation.view(), target.view())
    }
}
