use crate::{
    error::ConfigError,
    initializer::{Initializer, UniformInit},
};
use serde::{Deserialize, Serialize};

/// Initialisation range used when none is specified.
pub const DEFAULT_INIT_RANGE: f64 = 2.;

/// The weighted connections linking the units of one layer to the units of the next.
///
/// Every input node is connected to every output node. The weights are stored row-major:
/// row `i` holds the weights from all input nodes to output node `i`. A connection with
/// zero nodes is unconfigured and produces no output.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct WeightedConnection {
    in_size: usize,
    out_size: usize,
    weights: Vec<f64>,

    #[serde(skip)]
    inputs: Vec<f64>,
    #[serde(skip)]
    outputs: Vec<f64>,
}

impl WeightedConnection {
    /// Connection between the given number of nodes, initialised over the default range.
    /// Stays unconfigured if either size is zero.
    pub fn new(in_size: usize, out_size: usize) -> Self {
        let mut connection = Self::default();
        // zero sizes leave the connection unconfigured, which is what we want here
        let _ = connection.configure(in_size, out_size, DEFAULT_INIT_RANGE);
        connection
    }

    /// Builds a connection from row-major weights.
    pub fn from_weights(
        in_size: usize,
        out_size: usize,
        weights: Vec<f64>,
    ) -> Result<Self, ConfigError> {
        check_sizes(in_size, out_size)?;
        if weights.len() != in_size * out_size {
            return Err(ConfigError::ShapeMismatch {
                layer: 0,
                expected: (in_size, out_size),
                received: (weights.len() / out_size, out_size),
            });
        }
        Ok(Self {
            in_size,
            out_size,
            weights,
            inputs: Vec::new(),
            outputs: Vec::new(),
        })
    }

    /// Resizes the connection and draws fresh weights uniformly from
    /// `[-init_range/2, init_range/2)`, seeded with the range.
    /// Invalid arguments leave the connection untouched.
    pub fn configure(
        &mut self,
        in_size: usize,
        out_size: usize,
        init_range: f64,
    ) -> Result<(), ConfigError> {
        check_sizes(in_size, out_size)?;
        if !(init_range > 0. && init_range.is_finite()) {
            return Err(ConfigError::NonPositive { name: "init_range" });
        }
        self.configure_with(in_size, out_size, UniformInit::new(init_range))
    }

    /// Resizes the connection, taking the weights from `init`.
    pub fn configure_with<I: Initializer>(
        &mut self,
        in_size: usize,
        out_size: usize,
        mut init: I,
    ) -> Result<(), ConfigError> {
        check_sizes(in_size, out_size)?;
        self.in_size = in_size;
        self.out_size = out_size;
        self.weights = (0..in_size * out_size)
            .map(|_| init.get(in_size, out_size))
            .collect();
        self.inputs.clear();
        self.outputs.clear();
        Ok(())
    }

    pub fn in_size(&self) -> usize {
        self.in_size
    }

    pub fn out_size(&self) -> usize {
        self.out_size
    }

    pub fn is_configured(&self) -> bool {
        self.in_size > 0 && self.out_size > 0
    }

    /// Stores the input node values. Ignored unless `inputs` has exactly one value per input node.
    pub fn set_inputs(&mut self, inputs: &[f64]) {
        if inputs.len() == self.in_size {
            self.inputs.clear();
            self.inputs.extend_from_slice(inputs);
        }
    }

    pub fn inputs(&self) -> &[f64] {
        &self.inputs
    }

    /// Last values computed by [forward](Self::forward).
    pub fn outputs(&self) -> &[f64] {
        &self.outputs
    }

    /// Applies the weights to the stored inputs. Each output node receives the
    /// weighted sum of all input nodes; there is no bias and no activation.
    pub fn forward(&mut self) -> &[f64] {
        self.outputs.clear();
        if self.in_size > 0 {
            let inputs = &self.inputs;
            self.outputs.extend(
                self.weights
                    .chunks_exact(self.in_size)
                    .map(|row| row.iter().zip(inputs).map(|(w, x)| w * x).sum::<f64>()),
            );
        }
        &self.outputs
    }

    /// Weights from every input node to output node `node`.
    pub fn weight_row(&self, node: usize) -> Option<&[f64]> {
        if node < self.out_size {
            let start = node * self.in_size;
            Some(&self.weights[start..start + self.in_size])
        } else {
            None
        }
    }

    pub fn weight_row_mut(&mut self, node: usize) -> Option<&mut [f64]> {
        if node < self.out_size {
            let start = node * self.in_size;
            Some(&mut self.weights[start..start + self.in_size])
        } else {
            None
        }
    }

    /// Replaces the weights leading into output node `node`. Returns false and changes nothing
    /// if the node doesn't exist or `weights` has the wrong length.
    pub fn set_weight_row(&mut self, node: usize, weights: &[f64]) -> bool {
        match self.weight_row_mut(node) {
            Some(row) if row.len() == weights.len() => {
                row.copy_from_slice(weights);
                true
            }
            _ => false,
        }
    }

    /// All weights, row-major.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

fn check_sizes(in_size: usize, out_size: usize) -> Result<(), ConfigError> {
    if in_size == 0 {
        return Err(ConfigError::NonPositive { name: "in_size" });
    }
    if out_size == 0 {
        return Err(ConfigError::NonPositive { name: "out_size" });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        helpers::tests::check,
        initializer::{ConstantInit, WeightInit},
    };

    fn create_connection() -> WeightedConnection {
        let init = WeightInit::new((1..=12).map(|x| x as f64));
        let mut connection = WeightedConnection::default();
        connection.configure_with(4, 3, init).unwrap();
        connection
    }

    const INPUTS: [f64; 4] = [1., 2., 3., 4.];
    const TOLERANCE: f64 = 0.0001;

    #[test]
    fn connection_forward() {
        let mut connection = create_connection();
        connection.set_inputs(&INPUTS);
        let output = connection.forward();
        let expected = &[30., 70., 110.];

        check(expected, output, TOLERANCE, "output");
    }

    #[test]
    fn wrong_input_length_is_ignored() {
        let mut connection = create_connection();
        connection.set_inputs(&INPUTS);
        connection.set_inputs(&[1., 1.]);
        assert_eq!(connection.inputs(), &INPUTS);
    }

    #[test]
    fn weight_rows() {
        let mut connection = create_connection();
        assert_eq!(connection.weight_row(1), Some(&[5., 6., 7., 8.][..]));
        assert_eq!(connection.weight_row(3), None);

        assert!(connection.set_weight_row(2, &[0., 0., 0., 1.]));
        assert!(!connection.set_weight_row(2, &[1., 1.]));
        assert!(!connection.set_weight_row(5, &[1., 1., 1., 1.]));
        assert_eq!(connection.weight_row(2), Some(&[0., 0., 0., 1.][..]));

        connection.set_inputs(&INPUTS);
        check(&[30., 70., 4.], connection.forward(), TOLERANCE, "output");
    }

    #[test]
    fn configure_rejects_invalid_arguments() {
        let mut connection = create_connection();
        let before = connection.clone();

        assert!(connection.configure(0, 3, 1.).is_err());
        assert!(connection.configure(3, 0, 1.).is_err());
        assert!(connection.configure(3, 3, 0.).is_err());
        assert!(connection.configure(3, 3, -2.).is_err());
        assert_eq!(connection, before);

        assert!(!WeightedConnection::new(0, 2).is_configured());
    }

    #[test]
    fn configure_is_reproducible() {
        let mut a = WeightedConnection::default();
        let mut b = WeightedConnection::default();
        a.configure(3, 5, 4.).unwrap();
        b.configure(3, 5, 4.).unwrap();

        assert_eq!(a.weights().len(), 15);
        assert_eq!(a.weights(), b.weights());
        assert!(a.weights().iter().all(|w| *w >= -2. && *w < 2.));
    }

    #[test]
    fn from_weights_checks_length() {
        assert!(WeightedConnection::from_weights(2, 2, vec![1., 2., 3.]).is_err());
        let connection = WeightedConnection::from_weights(2, 1, vec![1., 2.]).unwrap();
        assert_eq!(connection.weight_row(0), Some(&[1., 2.][..]));

        let mut zeros = WeightedConnection::default();
        zeros.configure_with(2, 2, ConstantInit(0.)).unwrap();
        assert!(zeros.weights().iter().all(|w| *w == 0.));
    }
}
