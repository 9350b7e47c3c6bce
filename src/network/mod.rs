pub mod construction;
pub mod feed_forward;
mod text_format;

pub use self::construction::{LayerSpec, NetworkBuilder};
pub use self::feed_forward::{ConsError, FeedForward};

use crate::{connection::WeightedConnection, unit::Unit};

/// Trait all neural network architectures must implement
pub trait Network {
    /// Returns input size of the network
    fn num_inputs(&self) -> usize;

    /// Return output size of the network
    fn num_outputs(&self) -> usize;

    /// Computes the response of the network to `input`.
    /// Elements beyond the input size are ignored. Returns an empty slice if `input`
    /// is too short or the network isn't fully configured.
    fn response(&mut self, input: &[f64]) -> &[f64];
}

/// The accessors a trainer needs to compute weight updates.
///
/// Layer indices run from `0` to `num_layers()` inclusive: layer `i < num_layers()` is
/// hidden layer `i` and layer `num_layers()` is the output layer. Connection `i` feeds
/// layer `i`.
pub trait Trainable: Network {
    /// Number of hidden layers.
    fn num_layers(&self) -> usize;

    /// Post-activation values of `layer` from the most recent response.
    fn activations(&self, layer: usize) -> Option<&[f64]>;

    /// Pre-activation values of `layer` from the most recent response.
    fn unit_inputs(&self, layer: usize) -> Option<&[f64]>;

    /// Activation settings of hidden layer `layer`.
    fn layer_unit(&self, layer: usize) -> Option<Unit>;

    fn output_unit(&self) -> Unit;

    fn weighted_connection(&self, layer: usize) -> Option<&WeightedConnection>;

    fn weighted_connection_mut(&mut self, layer: usize) -> Option<&mut WeightedConnection>;

    /// Activation settings for any layer index, including the output layer.
    fn unit_for(&self, layer: usize) -> Option<Unit> {
        if layer == self.num_layers() {
            Some(self.output_unit())
        } else {
            self.layer_unit(layer)
        }
    }

    /// True once every connection is configured and consistent with the network's sizes.
    fn is_ready(&self) -> bool {
        self.num_inputs() > 0
            && self.num_outputs() > 0
            && (0..=self.num_layers()).all(|l| {
                self.weighted_connection(l)
                    .map_or(false, WeightedConnection::is_configured)
            })
    }
}
