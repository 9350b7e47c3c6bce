use super::FeedForward;
use crate::{a_funcs::ActivationKind, error::ConfigError, unit::Unit};

/// Description of a single hidden layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerSpec {
    pub units: usize,
    pub unit: Unit,
    pub init_range: f64,
}

impl LayerSpec {
    /// Layer with unit slope and amplification.
    pub fn new(units: usize, kind: ActivationKind, init_range: f64) -> Self {
        Self {
            units,
            unit: Unit::new(kind, 1., 1.),
            init_range,
        }
    }
}

/// Builder for feed-forward networks. Hidden layers are added in order, the first call to
/// [layer](NetworkBuilder::layer) describing the layer closest to the input.
///
/// ```
/// use rusty_nnet::{ActivationKind, Network, NetworkBuilder};
///
/// let mut net = NetworkBuilder::new(2, 1)
///     .output_unit(ActivationKind::Unipolar, 1., 1.)
///     .layer(4, ActivationKind::Tanh, 1.)
///     .build()
///     .unwrap();
/// assert_eq!(net.response(&[0., 1.]).len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct NetworkBuilder {
    num_inputs: usize,
    num_outputs: usize,
    output_unit: Unit,
    layers: Vec<LayerSpec>,
}

impl NetworkBuilder {
    pub fn new(num_inputs: usize, num_outputs: usize) -> Self {
        NetworkBuilder {
            num_inputs,
            num_outputs,
            output_unit: Unit::default(),
            layers: Vec::new(),
        }
    }

    pub fn output_unit(mut self, kind: ActivationKind, slope: f64, amplify: f64) -> Self {
        self.output_unit = Unit::new(kind, slope, amplify);
        self
    }

    /// Adds a hidden layer with unit slope and amplification.
    pub fn layer(self, units: usize, kind: ActivationKind, init_range: f64) -> Self {
        self.layer_spec(LayerSpec::new(units, kind, init_range))
    }

    /// Adds a fully specified hidden layer.
    pub fn layer_spec(mut self, spec: LayerSpec) -> Self {
        self.layers.push(spec);
        self
    }

    /// Adds all of the provided layers.
    pub fn layers<T>(mut self, specs: T) -> Self
    where
        T: IntoIterator<Item = LayerSpec>,
    {
        self.layers.extend(specs);
        self
    }

    /// Builds the network. Fails if either size is zero or a layer is invalid.
    pub fn build(self) -> Result<FeedForward, ConfigError> {
        if self.num_inputs == 0 {
            return Err(ConfigError::NonPositive { name: "num_inputs" });
        }
        if self.num_outputs == 0 {
            return Err(ConfigError::NonPositive { name: "num_outputs" });
        }

        let mut net = FeedForward::new();
        net.set_num_inputs(self.num_inputs);
        net.set_num_outputs(self.num_outputs);
        net.set_output_unit(self.output_unit);
        for spec in self.layers {
            net.add_layer(
                spec.units,
                spec.unit.kind(),
                spec.init_range,
                spec.unit.slope(),
                spec.unit.amplify(),
            )?;
        }
        Ok(net)
    }
}
