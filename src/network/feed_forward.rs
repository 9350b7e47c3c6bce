use std::convert::TryFrom;
use std::error;
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::{Network, Trainable};
use crate::{
    a_funcs::ActivationKind,
    connection::{WeightedConnection, DEFAULT_INIT_RANGE},
    error::ConfigError,
    unit::Unit,
};

/// A fully connected feed-forward network: an input layer, any number of hidden layers
/// and an output layer.
///
/// The network is configured incrementally. Set the input and output sizes, then append
/// hidden layers with [add_layer](FeedForward::add_layer). Once both sizes are known the
/// network always holds one [WeightedConnection] per hidden layer plus one leading into
/// the output layer, and adjacent connections always agree on their sizes.
///
/// The response to the last input is cached layer by layer so a trainer can reuse it.
/// It can be saved to and loaded from a file either as text or as JSON.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(into = "FeedForwardUnvalidated", try_from = "FeedForwardUnvalidated")]
pub struct FeedForward {
    num_inputs: usize,
    num_outputs: usize,
    output_unit: Unit,
    hidden_units: Vec<Unit>,
    connections: Vec<WeightedConnection>,

    activations: Vec<Vec<f64>>,
    unit_inputs: Vec<Vec<f64>>,
}

impl FeedForward {
    /// An empty network with a threshold output unit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of input units. Zero is ignored.
    ///
    /// If the first connection no longer fits it is rebuilt with the default
    /// initialisation range.
    pub fn set_num_inputs(&mut self, num_inputs: usize) {
        if num_inputs == 0 || num_inputs == self.num_inputs {
            return;
        }
        self.num_inputs = num_inputs;
        if self.hidden_units.is_empty() {
            self.refresh_direct_connection();
        } else {
            let out_size = self.connections[0].out_size();
            // out_size belongs to a hidden layer and is never zero
            let _ = self.connections[0].configure(num_inputs, out_size, DEFAULT_INIT_RANGE);
        }
        self.clear_cache();
    }

    /// Sets the number of output units. Zero is ignored.
    ///
    /// If the connection into the output layer no longer fits it is rebuilt with the
    /// default initialisation range.
    pub fn set_num_outputs(&mut self, num_outputs: usize) {
        if num_outputs == 0 || num_outputs == self.num_outputs {
            return;
        }
        self.num_outputs = num_outputs;
        if self.hidden_units.is_empty() {
            self.refresh_direct_connection();
        } else {
            let layers = self.hidden_units.len();
            let in_size = self.connections[layers - 1].out_size();
            let _ = self.connections[layers].configure(in_size, num_outputs, DEFAULT_INIT_RANGE);
        }
        self.clear_cache();
    }

    pub fn set_output_unit_type(&mut self, kind: ActivationKind) {
        self.output_unit.set_kind(kind);
    }

    pub fn set_output_unit_slope(&mut self, slope: f64) {
        self.output_unit.set_slope(slope);
    }

    pub fn set_output_unit_amplify(&mut self, amplify: f64) {
        self.output_unit.set_amplify(amplify);
    }

    pub fn set_output_unit(&mut self, unit: Unit) {
        self.output_unit = unit;
    }

    /// Appends a hidden layer of `num_units` units after the existing ones.
    ///
    /// The connection into the new layer and the replacement connection into the output
    /// layer are drawn from `[-init_range/2, init_range/2)`. Fails without modifying the
    /// network if any numeric argument isn't positive or if the number of inputs is unset.
    pub fn add_layer(
        &mut self,
        num_units: usize,
        kind: ActivationKind,
        init_range: f64,
        slope: f64,
        amplify: f64,
    ) -> Result<(), ConfigError> {
        if num_units == 0 {
            return Err(ConfigError::NonPositive { name: "num_units" });
        }
        if !(init_range > 0.) {
            return Err(ConfigError::NonPositive { name: "init_range" });
        }
        if !(slope > 0.) {
            return Err(ConfigError::NonPositive { name: "slope" });
        }
        if !(amplify > 0.) {
            return Err(ConfigError::NonPositive { name: "amplify" });
        }
        if self.num_inputs == 0 {
            return Err(ConfigError::MissingInputs);
        }

        let in_size = match self.hidden_units.last() {
            Some(_) => self.connections[self.hidden_units.len() - 1].out_size(),
            None => self.num_inputs,
        };
        let mut connection = WeightedConnection::default();
        connection.configure(in_size, num_units, init_range)?;

        let mut output = WeightedConnection::default();
        if self.num_outputs > 0 {
            output.configure(num_units, self.num_outputs, init_range)?;
        }

        // drop the old output connection, or the direct one if there were no hidden layers
        self.connections.truncate(self.hidden_units.len());
        self.connections.push(connection);
        self.connections.push(output);
        self.hidden_units.push(Unit::new(kind, slope, amplify));
        self.clear_cache();

        log::trace!(
            "Added hidden layer {} with {} {} units",
            self.hidden_units.len() - 1,
            num_units,
            kind
        );
        Ok(())
    }

    /// Replaces the connection feeding `layer`. The replacement must have the same shape
    /// as the connection it replaces.
    pub fn set_weighted_connection(
        &mut self,
        layer: usize,
        connection: WeightedConnection,
    ) -> Result<(), ConfigError> {
        let layers = self.connections.len();
        if layer >= layers {
            return Err(ConfigError::LayerOutOfRange { layer, layers });
        }
        let expected = (self.layer_in_size(layer), self.layer_out_size(layer));
        let received = (connection.in_size(), connection.out_size());
        if expected != received {
            return Err(ConfigError::ShapeMismatch {
                layer,
                expected,
                received,
            });
        }
        self.connections[layer] = connection;
        self.clear_cache();
        Ok(())
    }

    /// Resets the network to the empty default.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn output_unit(&self) -> Unit {
        self.output_unit
    }

    /// Number of units in hidden layer `layer`.
    pub fn layer_size(&self, layer: usize) -> Option<usize> {
        if layer < self.hidden_units.len() {
            Some(self.connections[layer].out_size())
        } else {
            None
        }
    }

    /// Saves the network as JSON.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string(self)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to save network to {}", path.display()))
    }

    /// Loads a network saved with [save_json](FeedForward::save_json).
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let s = fs::read_to_string(path)
            .with_context(|| format!("Failed to read network from {}", path.display()))?;
        let network = serde_json::from_str(&s)
            .with_context(|| format!("{} doesn't contain a valid network", path.display()))?;
        Ok(network)
    }

    fn layer_in_size(&self, layer: usize) -> usize {
        if layer == 0 {
            self.num_inputs
        } else {
            self.connections[layer - 1].out_size()
        }
    }

    fn layer_out_size(&self, layer: usize) -> usize {
        if layer == self.hidden_units.len() {
            self.num_outputs
        } else {
            self.connections[layer].out_size()
        }
    }

    /// Keeps the input to output connection of a network without hidden layers in sync
    /// with the input and output sizes.
    fn refresh_direct_connection(&mut self) {
        self.connections.clear();
        if self.num_inputs > 0 && self.num_outputs > 0 {
            self.connections
                .push(WeightedConnection::new(self.num_inputs, self.num_outputs));
        }
    }

    fn clear_cache(&mut self) {
        self.activations.clear();
        self.unit_inputs.clear();
    }
}

impl Network for FeedForward {
    fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    fn response(&mut self, input: &[f64]) -> &[f64] {
        if input.len() < self.num_inputs || !self.is_ready() {
            return &[];
        }
        self.clear_cache();

        let mut current = input[..self.num_inputs].to_vec();
        for (i, connection) in self.connections.iter_mut().enumerate() {
            connection.set_inputs(&current);
            let unit_inputs = connection.forward().to_vec();
            let unit = self.hidden_units.get(i).unwrap_or(&self.output_unit);
            current = unit.apply(&unit_inputs);

            self.unit_inputs.push(unit_inputs);
            self.activations.push(current.clone());
        }
        self.activations.last().map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Trainable for FeedForward {
    fn num_layers(&self) -> usize {
        self.hidden_units.len()
    }

    fn activations(&self, layer: usize) -> Option<&[f64]> {
        self.activations.get(layer).map(Vec::as_slice)
    }

    fn unit_inputs(&self, layer: usize) -> Option<&[f64]> {
        self.unit_inputs.get(layer).map(Vec::as_slice)
    }

    fn layer_unit(&self, layer: usize) -> Option<Unit> {
        self.hidden_units.get(layer).copied()
    }

    fn output_unit(&self) -> Unit {
        self.output_unit
    }

    fn weighted_connection(&self, layer: usize) -> Option<&WeightedConnection> {
        self.connections.get(layer)
    }

    fn weighted_connection_mut(&mut self, layer: usize) -> Option<&mut WeightedConnection> {
        self.connections.get_mut(layer)
    }
}

impl From<FeedForward> for FeedForwardUnvalidated {
    fn from(network: FeedForward) -> Self {
        FeedForwardUnvalidated {
            num_inputs: network.num_inputs,
            num_outputs: network.num_outputs,
            output_unit: network.output_unit,
            hidden_units: network.hidden_units,
            connections: network.connections,
        }
    }
}

/// The persistent parts of a [FeedForward], not yet checked for consistency.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct FeedForwardUnvalidated {
    pub(crate) num_inputs: usize,
    pub(crate) num_outputs: usize,
    pub(crate) output_unit: Unit,
    pub(crate) hidden_units: Vec<Unit>,
    pub(crate) connections: Vec<WeightedConnection>,
}

/// Stored network data that doesn't describe a valid network.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsError {
    /// The number of connections doesn't match the number of hidden layers.
    LayerCount { layers: usize, connections: usize },
    /// Connection `index` doesn't fit the layer before it.
    Incompatible {
        index: usize,
        received_input: usize,
        expected_input: usize,
    },
    /// The connection into the output layer doesn't have one output per network output.
    OutputMismatch {
        received_output: usize,
        expected_output: usize,
    },
    /// Connection `index` has no nodes.
    Unconfigured { index: usize },
    /// Connection `index` holds the wrong number of weights.
    NotEnoughWeights {
        index: usize,
        weights: usize,
        expected: usize,
    },
}
impl error::Error for ConsError {}
impl fmt::Display for ConsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsError::LayerCount {
                layers,
                connections,
            } => write!(
                f,
                "A network with {} hidden layers needs {} connections but {} were provided.",
                layers,
                layers + 1,
                connections
            ),
            ConsError::Incompatible {
                index,
                received_input,
                expected_input,
            } => write!(
                f,
                "Connection {} is incompatible with the layer before it:\n\tExpected input length of {} but received {}.",
                index, expected_input, received_input
            ),
            ConsError::OutputMismatch {
                received_output,
                expected_output,
            } => write!(
                f,
                "The output connection should have {} outputs but has {}.",
                expected_output, received_output
            ),
            ConsError::Unconfigured { index } => {
                write!(f, "Connection {} has no input or output nodes.", index)
            }
            ConsError::NotEnoughWeights {
                index,
                weights,
                expected,
            } => write!(
                f,
                "Connection {} expected {} weights but {} were provided.",
                index, expected, weights
            ),
        }?;
        f.write_str(" Error occured while attempting to construct a network from stored data.")
    }
}

impl TryFrom<FeedForwardUnvalidated> for FeedForward {
    type Error = ConsError;
    fn try_from(value: FeedForwardUnvalidated) -> Result<Self, Self::Error> {
        let FeedForwardUnvalidated {
            num_inputs,
            num_outputs,
            output_unit,
            hidden_units,
            connections,
        } = value;

        let layers = hidden_units.len();
        let expected_connections = if layers == 0 && (num_inputs == 0 || num_outputs == 0) {
            0
        } else {
            layers + 1
        };
        if connections.len() != expected_connections {
            return Err(ConsError::LayerCount {
                layers,
                connections: connections.len(),
            });
        }

        for (index, connection) in connections.iter().enumerate() {
            let weights = connection.weights().len();
            let expected = connection.in_size() * connection.out_size();
            if weights != expected {
                return Err(ConsError::NotEnoughWeights {
                    index,
                    weights,
                    expected,
                });
            }

            // a network without outputs keeps an unconfigured connection into the output layer
            if index == layers && num_outputs == 0 && !connection.is_configured() {
                continue;
            }

            let expected_input = match index {
                0 => num_inputs,
                _ => connections[index - 1].out_size(),
            };
            if connection.in_size() != expected_input {
                return Err(ConsError::Incompatible {
                    index,
                    received_input: connection.in_size(),
                    expected_input,
                });
            }
            if !connection.is_configured() {
                return Err(ConsError::Unconfigured { index });
            }
            if index == layers && connection.out_size() != num_outputs {
                return Err(ConsError::OutputMismatch {
                    received_output: connection.out_size(),
                    expected_output: num_outputs,
                });
            }
        }

        // stored units may carry non-positive parameters, which fall back to the defaults
        let hidden_units = hidden_units
            .into_iter()
            .map(|u| Unit::new(u.kind(), u.slope(), u.amplify()))
            .collect();
        let output_unit = Unit::new(output_unit.kind(), output_unit.slope(), output_unit.amplify());

        Ok(FeedForward {
            num_inputs,
            num_outputs,
            output_unit,
            hidden_units,
            connections,
            activations: Vec::new(),
            unit_inputs: Vec::new(),
        })
    }
}
