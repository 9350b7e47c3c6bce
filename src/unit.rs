use crate::a_funcs::ActivationKind;

use serde::{Deserialize, Serialize};

/// The activation settings shared by every unit (neuron) of a layer.
///
/// `slope` scales the unit input before the activation function is applied and
/// `amplify` scales the result. Both are always strictly positive: attempts to set
/// a non-positive value are ignored and the previous value is kept.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    kind: ActivationKind,
    slope: f64,
    amplify: f64,
}

impl Default for Unit {
    fn default() -> Self {
        Self {
            kind: ActivationKind::Threshold,
            slope: 1.,
            amplify: 1.,
        }
    }
}

impl Unit {
    pub fn new(kind: ActivationKind, slope: f64, amplify: f64) -> Self {
        let mut unit = Self {
            kind,
            ..Self::default()
        };
        unit.set_slope(slope);
        unit.set_amplify(amplify);
        unit
    }

    pub fn kind(&self) -> ActivationKind {
        self.kind
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn amplify(&self) -> f64 {
        self.amplify
    }

    pub fn set_kind(&mut self, kind: ActivationKind) {
        self.kind = kind;
    }

    pub fn set_slope(&mut self, slope: f64) {
        if slope > 0. {
            self.slope = slope;
        }
    }

    pub fn set_amplify(&mut self, amplify: f64) {
        if amplify > 0. {
            self.amplify = amplify;
        }
    }

    /// Activation value for a single unit input.
    pub fn activation(&self, x: f64) -> f64 {
        self.kind.activation(self.slope, self.amplify, x)
    }

    /// Gradient of the activation for a single unit input.
    pub fn gradient(&self, x: f64) -> f64 {
        self.kind.gradient(self.slope, self.amplify, x)
    }

    /// Applies the activation to every element of `inputs`.
    pub fn apply(&self, inputs: &[f64]) -> Vec<f64> {
        inputs.iter().map(|x| self.activation(*x)).collect()
    }
}
