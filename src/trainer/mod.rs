use std::{fs, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    error::TrainError,
    helpers::IndexShuffler,
    network::Trainable,
};

mod logger;
mod momentum;
mod training_set;

pub use logger::{History, LogFile, Logger, MockLogger};
pub use momentum::DeltaHistory;
pub use training_set::TrainingSet;

/// Training hyperparameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Size of the steps taken down the error surface.
    pub learning_constant: f64,
    /// Fraction of the previous weight change added to the next one.
    pub momentum: f64,
    /// Seed of the permutation the training set is presented in.
    pub seed: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            learning_constant: 0.5,
            momentum: 0.,
            seed: 2,
        }
    }
}

impl TrainerConfig {
    /// Reads a JSON config. Missing fields take their default values.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let s = fs::read_to_string(path)
            .with_context(|| format!("Failed to read trainer config from {}", path.display()))?;
        let config = serde_json::from_str(&s)
            .with_context(|| format!("Invalid trainer config in {}", path.display()))?;
        Ok(config)
    }
}

/// Outcome of [Trainer::train_until].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrainingReport {
    /// Epochs run by this call.
    pub epochs: usize,
    /// Error of the last epoch.
    pub error: f64,
    /// Whether the error reached the target.
    pub converged: bool,
}

/// Trains networks by backpropagation with momentum.
///
/// Every call to [train_neural_net](Trainer::train_neural_net) runs one epoch: each example
/// of the training set is presented once, in an order shuffled with the configured seed,
/// and the weights are adjusted after every example. The error of all epochs is accumulated
/// until [reset_net_error](Trainer::reset_net_error) is called.
///
/// The previous change of every weight is remembered between epochs so the momentum term
/// always applies to the same connection. The history is reset when the trainer sees a
/// network with a different shape.
#[derive(Debug)]
pub struct Trainer {
    config: TrainerConfig,
    set: TrainingSet,
    history: DeltaHistory,
    net_error: f64,
    epoch: usize,
    logger: Box<dyn Logger>,

    // per example buffers
    signals: Vec<Vec<f64>>,
    layer_inputs: Vec<f64>,
}

impl Default for Trainer {
    fn default() -> Self {
        Self {
            config: TrainerConfig::default(),
            set: TrainingSet::new(),
            history: DeltaHistory::new(),
            net_error: 0.,
            epoch: 0,
            logger: Box::new(MockLogger),
            signals: Vec::new(),
            layer_inputs: Vec::new(),
        }
    }
}

impl Trainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a trainer from `config`. Invalid values are replaced by the defaults.
    pub fn with_config(config: TrainerConfig) -> Self {
        let mut trainer = Self::new();
        trainer.set_learning_constant(config.learning_constant);
        trainer.set_momentum(config.momentum);
        trainer.set_seed(config.seed);
        trainer
    }

    /// Reports the error of every epoch to `logger`.
    pub fn with_logger<L: Logger + 'static>(mut self, logger: L) -> Self {
        self.logger = Box::new(logger);
        self
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn learning_constant(&self) -> f64 {
        self.config.learning_constant
    }

    /// Ignored unless `value` is positive.
    pub fn set_learning_constant(&mut self, value: f64) {
        if value > 0. {
            self.config.learning_constant = value;
        }
    }

    pub fn momentum(&self) -> f64 {
        self.config.momentum
    }

    /// Ignored unless `value` is positive.
    pub fn set_momentum(&mut self, value: f64) {
        if value > 0. {
            self.config.momentum = value;
        }
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.config.seed = seed;
    }

    /// Appends a single example.
    pub fn add_to_training_set<U: Into<Vec<f64>>, V: Into<Vec<f64>>>(&mut self, input: U, target: V) {
        self.set.push(input, target);
    }

    /// Replaces the training set with the given parallel sequences.
    pub fn add_new_training_set<D, L, U, V>(&mut self, inputs: D, targets: L)
    where
        D: IntoIterator<Item = U>,
        L: IntoIterator<Item = V>,
        U: Into<Vec<f64>>,
        V: Into<Vec<f64>>,
    {
        self.set = TrainingSet::from_vecs(inputs, targets);
    }

    pub fn set_training_set(&mut self, set: TrainingSet) {
        self.set = set;
    }

    pub fn training_set(&self) -> &TrainingSet {
        &self.set
    }

    /// Error accumulated over all epochs since the last reset.
    pub fn net_error(&self) -> f64 {
        self.net_error
    }

    pub fn reset_net_error(&mut self) {
        self.net_error = 0.;
    }

    /// Number of epochs run so far.
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    pub fn reset_momentum(&mut self) {
        self.history.reset();
    }

    /// Checks that `net` can be trained on the current training set.
    pub fn validate<N: Trainable + ?Sized>(&self, net: &N) -> Result<(), TrainError> {
        if !net.is_ready() {
            return Err(TrainError::NetworkNotReady);
        }
        for (index, (input, target)) in self.set.iter().enumerate() {
            if input.len() != net.num_inputs() {
                return Err(TrainError::InputSize {
                    index,
                    expected: net.num_inputs(),
                    received: input.len(),
                });
            }
            if target.len() != net.num_outputs() {
                return Err(TrainError::TargetSize {
                    index,
                    expected: net.num_outputs(),
                    received: target.len(),
                });
            }
        }
        Ok(())
    }

    /// Runs a single epoch and returns its error. The error is also added to
    /// [net_error](Trainer::net_error).
    ///
    /// Fails without touching the network if it isn't fully configured or if any example
    /// doesn't match its input and output sizes.
    pub fn train_neural_net<N: Trainable + ?Sized>(&mut self, net: &mut N) -> Result<f64, TrainError> {
        self.validate(&*net)?;
        if self.set.is_empty() {
            log::warn!("Training set is empty, skipping epoch");
            return Ok(0.);
        }
        if self.history.fit(&*net) {
            log::debug!("Momentum history reset to match the network");
        }

        let layers = net.num_layers();
        self.signals.resize_with(layers + 1, Vec::new);

        let mut error = 0.;
        for idx in IndexShuffler::new(self.set.len(), self.config.seed) {
            let (input, target) = match self.set.get(idx) {
                Some(example) => example,
                None => continue,
            };
            net.response(input);
            error += example_error(&*net, target);

            output_signals(&*net, target, &mut self.signals[layers]);
            hidden_signals(&*net, &mut self.signals);
            adjust_weights(
                net,
                input,
                &self.signals,
                &mut self.history,
                &mut self.layer_inputs,
                &self.config,
            );
        }

        log::debug!("Epoch {} finished with error {}", self.epoch, error);
        self.logger.epoch_error(self.epoch, error);
        self.epoch += 1;
        self.net_error += error;
        Ok(error)
    }

    /// Runs `epochs` epochs and returns the accumulated error.
    pub fn train<N: Trainable + ?Sized>(&mut self, net: &mut N, epochs: usize) -> Result<f64, TrainError> {
        for _ in 0..epochs {
            self.train_neural_net(net)?;
        }
        Ok(self.net_error)
    }

    /// Trains until the error of a single epoch is at most `target_error` or `max_epochs`
    /// epochs have run. The accumulated error is reset before every epoch.
    pub fn train_until<N: Trainable + ?Sized>(
        &mut self,
        net: &mut N,
        target_error: f64,
        max_epochs: usize,
    ) -> Result<TrainingReport, TrainError> {
        let mut report = TrainingReport {
            epochs: 0,
            error: self.net_error,
            converged: false,
        };
        while report.epochs < max_epochs {
            self.reset_net_error();
            report.error = self.train_neural_net(net)?;
            report.epochs += 1;
            if report.error <= target_error {
                report.converged = true;
                break;
            }
        }
        log::info!(
            "Training stopped after {} epochs with error {}",
            report.epochs,
            report.error
        );
        Ok(report)
    }
}

/// Half the squared distance between the last response and `target`.
fn example_error<N: Trainable + ?Sized>(net: &N, target: &[f64]) -> f64 {
    let output = net.activations(net.num_layers()).unwrap_or(&[]);
    target
        .iter()
        .zip(output)
        .map(|(t, o)| 0.5 * (t - o).powi(2))
        .sum()
}

/// Error signal of every output unit.
fn output_signals<N: Trainable + ?Sized>(net: &N, target: &[f64], signals: &mut Vec<f64>) {
    let layer = net.num_layers();
    let unit = net.output_unit();
    let output = net.activations(layer).unwrap_or(&[]);
    let unit_inputs = net.unit_inputs(layer).unwrap_or(&[]);

    signals.clear();
    signals.extend(
        target
            .iter()
            .zip(output)
            .zip(unit_inputs)
            .map(|((t, o), x)| (t - o) * unit.gradient(*x)),
    );
}

/// Propagates the output signals back through the hidden layers, last layer first.
/// Uses the weights from before this example's adjustment.
fn hidden_signals<N: Trainable + ?Sized>(net: &N, signals: &mut [Vec<f64>]) {
    for layer in (0..net.num_layers()).rev() {
        let unit = net.layer_unit(layer).unwrap_or_default();
        let unit_inputs = net.unit_inputs(layer).unwrap_or(&[]);
        let connection = match net.weighted_connection(layer + 1) {
            Some(c) => c,
            None => continue,
        };
        let n = connection.in_size();

        let (lower, upper) = signals.split_at_mut(layer + 1);
        let above = &upper[0];
        let current = &mut lower[layer];
        current.clear();
        current.extend(unit_inputs.iter().enumerate().map(|(j, x)| {
            let sum: f64 = connection
                .weights()
                .chunks_exact(n)
                .zip(above)
                .map(|(row, e)| e * row[j])
                .sum();
            unit.gradient(*x) * sum
        }));
    }
}

/// Applies `Δw = learning_constant * signal * input + momentum * previous Δw` to every
/// weight, starting with the connection into the output layer.
fn adjust_weights<N: Trainable + ?Sized>(
    net: &mut N,
    input: &[f64],
    signals: &[Vec<f64>],
    history: &mut DeltaHistory,
    layer_inputs: &mut Vec<f64>,
    config: &TrainerConfig,
) {
    let lr = config.learning_constant;
    let momentum = config.momentum;
    let num_inputs = net.num_inputs();

    for layer in (0..=net.num_layers()).rev() {
        layer_inputs.clear();
        if layer == 0 {
            layer_inputs.extend_from_slice(&input[..num_inputs]);
        } else {
            layer_inputs.extend_from_slice(net.activations(layer - 1).unwrap_or(&[]));
        }

        let connection = match net.weighted_connection_mut(layer) {
            Some(c) => c,
            None => continue,
        };
        for (node, signal) in signals[layer].iter().enumerate() {
            if let (Some(weights), Some(deltas)) =
                (connection.weight_row_mut(node), history.row_mut(layer, node))
            {
                for ((w, prev), x) in weights.iter_mut().zip(deltas).zip(layer_inputs.iter()) {
                    let delta = lr * signal * x + momentum * *prev;
                    *w += delta;
                    *prev = delta;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        a_funcs::ActivationKind, connection::WeightedConnection, helpers::tests::check,
        network::{FeedForward, NetworkBuilder},
    };

    const TOLERANCE: f64 = 1e-9;

    fn linear_net(weights: Vec<f64>) -> FeedForward {
        let n = weights.len();
        let mut net = NetworkBuilder::new(n, 1)
            .output_unit(ActivationKind::Linear, 1., 1.)
            .build()
            .unwrap();
        net.set_weighted_connection(0, WeightedConnection::from_weights(n, 1, weights).unwrap())
            .unwrap();
        net
    }

    fn weights(net: &FeedForward, layer: usize) -> Vec<f64> {
        net.weighted_connection(layer).unwrap().weights().to_vec()
    }

    #[test]
    fn single_step_delta_rule() {
        let mut net = linear_net(vec![0., 0.]);
        let mut trainer = Trainer::new();
        trainer.add_to_training_set(vec![1., 1.], vec![1.]);

        let error = trainer.train_neural_net(&mut net).unwrap();
        assert_eq!(error, 0.5);
        check(&[0.5, 0.5], &weights(&net, 0), TOLERANCE, "weights");
    }

    #[test]
    fn momentum_carries_previous_delta() {
        let mut net = linear_net(vec![0., 0.]);
        let mut trainer = Trainer::new();
        trainer.set_momentum(0.5);
        trainer.add_to_training_set(vec![1., 1.], vec![1.]);

        trainer.train_neural_net(&mut net).unwrap();
        check(&[0.5, 0.5], &weights(&net, 0), TOLERANCE, "first epoch");

        // the response is exact now, only the momentum term moves the weights
        let error = trainer.train_neural_net(&mut net).unwrap();
        assert_eq!(error, 0.);
        check(&[0.75, 0.75], &weights(&net, 0), TOLERANCE, "second epoch");

        trainer.reset_momentum();
        trainer.train_neural_net(&mut net).unwrap();
        // response 1.5, signal -0.5, delta -0.25
        check(&[0.5, 0.5], &weights(&net, 0), TOLERANCE, "after reset");
    }

    #[test]
    fn hidden_layer_gradient_matches_hand_computation() {
        // 1 input, 1 linear hidden unit (slope 2), 1 linear output
        let mut net = NetworkBuilder::new(1, 1)
            .output_unit(ActivationKind::Linear, 1., 1.)
            .layer_spec(crate::network::construction::LayerSpec {
                units: 1,
                unit: crate::unit::Unit::new(ActivationKind::Linear, 2., 1.),
                init_range: 1.,
            })
            .build()
            .unwrap();
        net.set_weighted_connection(0, WeightedConnection::from_weights(1, 1, vec![0.5]).unwrap())
            .unwrap();
        net.set_weighted_connection(1, WeightedConnection::from_weights(1, 1, vec![0.25]).unwrap())
            .unwrap();

        let mut trainer = Trainer::new();
        trainer.set_learning_constant(0.1);
        trainer.add_to_training_set(vec![1.], vec![1.]);
        let error = trainer.train_neural_net(&mut net).unwrap();

        // hidden: x = 0.5, a = 1; output: 0.25, signal 0.75
        // hidden signal: gradient 2 * 0.75 * 0.25 = 0.375
        check(&[0.5 * 0.75 * 0.75], &[error], TOLERANCE, "error");
        check(&[0.25 + 0.1 * 0.75 * 1.], &weights(&net, 1), TOLERANCE, "output weights");
        check(&[0.5 + 0.1 * 0.375 * 1.], &weights(&net, 0), TOLERANCE, "hidden weights");
    }

    #[test]
    fn hidden_momentum_uses_own_history() {
        // 1 input, 1 linear hidden unit, 1 linear output
        let mut net = NetworkBuilder::new(1, 1)
            .output_unit(ActivationKind::Linear, 1., 1.)
            .layer(1, ActivationKind::Linear, 1.)
            .build()
            .unwrap();
        net.set_weighted_connection(0, WeightedConnection::from_weights(1, 1, vec![0.5]).unwrap())
            .unwrap();
        net.set_weighted_connection(1, WeightedConnection::from_weights(1, 1, vec![0.25]).unwrap())
            .unwrap();

        let (lr, momentum) = (0.1, 0.5);
        let mut trainer = Trainer::new();
        trainer.set_learning_constant(lr);
        trainer.set_momentum(momentum);
        trainer.add_to_training_set(vec![1.], vec![1.]);

        // epoch 1: hidden activation 0.5, response 0.125
        let (w0, w1) = (0.5, 0.25);
        let out_signal = 1. - w0 * w1;
        let hidden_signal = out_signal * w1;
        let d1 = lr * out_signal * w0;
        let d0 = lr * hidden_signal;
        let (w0, w1) = (w0 + d0, w1 + d1);

        trainer.train_neural_net(&mut net).unwrap();
        check(&[w1], &weights(&net, 1), TOLERANCE, "output weights, epoch 1");
        check(&[w0], &weights(&net, 0), TOLERANCE, "hidden weights, epoch 1");

        // epoch 2: each connection adds half of its own previous change
        let out_signal = 1. - w0 * w1;
        let hidden_signal = out_signal * w1;
        let (w1, w0) = (
            w1 + lr * out_signal * w0 + momentum * d1,
            w0 + lr * hidden_signal + momentum * d0,
        );

        trainer.train_neural_net(&mut net).unwrap();
        check(&[w1], &weights(&net, 1), TOLERANCE, "output weights, epoch 2");
        check(&[w0], &weights(&net, 0), TOLERANCE, "hidden weights, epoch 2");
        check(&[0.5576842895507812], &weights(&net, 0), 1e-12, "hidden weight value");
    }

    #[test]
    fn momentum_resets_when_network_changes_shape() {
        let mut net = linear_net(vec![0., 0.]);
        let mut trainer = Trainer::new();
        trainer.set_momentum(0.5);
        trainer.add_to_training_set(vec![1., 1.], vec![1.]);
        trainer.train_neural_net(&mut net).unwrap();
        assert_eq!(trainer.history.layer(0), Some(&[0.5, 0.5][..]));

        // connection 0 keeps its 2x1 shape but a hidden layer now follows it
        net.add_layer(1, ActivationKind::Linear, 1., 1., 1.).unwrap();
        net.set_weighted_connection(0, WeightedConnection::from_weights(2, 1, vec![0.5, 0.5]).unwrap())
            .unwrap();
        net.set_weighted_connection(1, WeightedConnection::from_weights(1, 1, vec![0.5]).unwrap())
            .unwrap();
        let mut fresh_net = net.clone();

        let mut fresh = Trainer::new();
        fresh.set_momentum(0.5);
        fresh.add_to_training_set(vec![1., 1.], vec![1.]);

        trainer.train_neural_net(&mut net).unwrap();
        fresh.train_neural_net(&mut fresh_net).unwrap();

        // response 0.5, output signal 0.5, hidden signal 0.25
        check(&[0.625, 0.625], &weights(&net, 0), TOLERANCE, "hidden weights");
        check(&[0.75], &weights(&net, 1), TOLERANCE, "output weights");
        assert_eq!(weights(&net, 0), weights(&fresh_net, 0));
        assert_eq!(weights(&net, 1), weights(&fresh_net, 1));
        assert_eq!(trainer.history, fresh.history);
    }

    #[test]
    fn mismatched_examples_are_rejected() {
        let mut net = linear_net(vec![0., 0.]);
        let mut trainer = Trainer::new();
        trainer.add_to_training_set(vec![1., 1.], vec![1.]);
        trainer.add_to_training_set(vec![1.], vec![1.]);
        assert_eq!(
            trainer.train_neural_net(&mut net),
            Err(TrainError::InputSize {
                index: 1,
                expected: 2,
                received: 1
            })
        );
        assert_eq!(weights(&net, 0), vec![0., 0.]);

        trainer.add_new_training_set(vec![vec![1., 1.]], vec![vec![1., 2.]]);
        assert!(matches!(
            trainer.train_neural_net(&mut net),
            Err(TrainError::TargetSize { index: 0, .. })
        ));

        let mut empty = FeedForward::new();
        assert_eq!(
            trainer.train_neural_net(&mut empty),
            Err(TrainError::NetworkNotReady)
        );
        assert_eq!(trainer.epoch(), 0);
    }

    #[test]
    fn invalid_parameters_are_ignored() {
        let mut trainer = Trainer::with_config(TrainerConfig {
            learning_constant: -1.,
            momentum: 0.25,
            seed: 7,
        });
        assert_eq!(trainer.learning_constant(), 0.5);
        assert_eq!(trainer.momentum(), 0.25);
        trainer.set_momentum(0.);
        trainer.set_learning_constant(0.);
        assert_eq!(trainer.momentum(), 0.25);
        assert_eq!(trainer.learning_constant(), 0.5);
        assert_eq!(trainer.config().seed, 7);
    }

    #[test]
    fn logger_sees_every_epoch() {
        let history = History::default();
        let mut net = linear_net(vec![0., 0.]);
        let mut trainer = Trainer::new().with_logger(history.clone());
        trainer.add_to_training_set(vec![1., 0.], vec![1.]);

        let mut errors = Vec::new();
        for _ in 0..3 {
            errors.push(trainer.train_neural_net(&mut net).unwrap());
        }

        assert_eq!(history.errors(), errors);
        assert_eq!(trainer.epoch(), 3);
    }

    #[test]
    fn train_until_stops_at_target() {
        let mut net = linear_net(vec![0., 0.]);
        let mut trainer = Trainer::new();
        trainer.add_to_training_set(vec![1., 1.], vec![1.]);

        // first epoch reaches the exact solution, the second reports zero error
        let report = trainer.train_until(&mut net, 1e-12, 10).unwrap();
        assert_eq!(
            report,
            TrainingReport {
                epochs: 2,
                error: 0.,
                converged: true
            }
        );
        assert_eq!(trainer.net_error(), 0.);
    }
}
