use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// The activation functions available to the units of a network.
///
/// Every kind carries a stable integer code which is used by the text file format.
/// `Unknown` (code -1) marks an invalid or unset kind; it evaluates to zero everywhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivationKind {
    Unknown,
    Threshold,
    Unipolar,
    Bipolar,
    Tanh,
    Gaussian,
    Arctan,
    Sine,
    Cosine,
    Sinc,
    Elliot,
    Linear,
    Isru,
    SoftSign,
    SoftPlus,
}

impl ActivationKind {
    /// Every valid kind, in code order.
    pub const ALL: [ActivationKind; 14] = [
        ActivationKind::Threshold,
        ActivationKind::Unipolar,
        ActivationKind::Bipolar,
        ActivationKind::Tanh,
        ActivationKind::Gaussian,
        ActivationKind::Arctan,
        ActivationKind::Sine,
        ActivationKind::Cosine,
        ActivationKind::Sinc,
        ActivationKind::Elliot,
        ActivationKind::Linear,
        ActivationKind::Isru,
        ActivationKind::SoftSign,
        ActivationKind::SoftPlus,
    ];

    pub fn code(self) -> i32 {
        match self {
            ActivationKind::Unknown => -1,
            ActivationKind::Threshold => 0,
            ActivationKind::Unipolar => 1,
            ActivationKind::Bipolar => 2,
            ActivationKind::Tanh => 3,
            ActivationKind::Gaussian => 4,
            ActivationKind::Arctan => 5,
            ActivationKind::Sine => 6,
            ActivationKind::Cosine => 7,
            ActivationKind::Sinc => 8,
            ActivationKind::Elliot => 9,
            ActivationKind::Linear => 10,
            ActivationKind::Isru => 11,
            ActivationKind::SoftSign => 12,
            ActivationKind::SoftPlus => 13,
        }
    }

    /// Converts a code back into a kind. Codes without a matching kind map to `Unknown`.
    pub fn from_code(code: i32) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.code() == code)
            .unwrap_or(ActivationKind::Unknown)
    }

    pub fn name(self) -> &'static str {
        match self {
            ActivationKind::Unknown => "Unknown",
            ActivationKind::Threshold => "Threshold",
            ActivationKind::Unipolar => "Unipolar",
            ActivationKind::Bipolar => "Bipolar",
            ActivationKind::Tanh => "Tanh",
            ActivationKind::Gaussian => "Gauss",
            ActivationKind::Arctan => "Arctan",
            ActivationKind::Sine => "Sin",
            ActivationKind::Cosine => "Cos",
            ActivationKind::Sinc => "SinC",
            ActivationKind::Elliot => "Elliot",
            ActivationKind::Linear => "Linear",
            ActivationKind::Isru => "ISRU",
            ActivationKind::SoftSign => "SoftSign",
            ActivationKind::SoftPlus => "SoftPlus",
        }
    }

    /// The function pair implementing this kind.
    pub fn func(self) -> &'static dyn ActivFunc {
        match self {
            ActivationKind::Unknown => &Unknown,
            ActivationKind::Threshold => &Threshold,
            ActivationKind::Unipolar => &Unipolar,
            ActivationKind::Bipolar => &Bipolar,
            ActivationKind::Tanh => &Tanh,
            ActivationKind::Gaussian => &Gaussian,
            ActivationKind::Arctan => &Arctan,
            ActivationKind::Sine => &Sine,
            ActivationKind::Cosine => &Cosine,
            ActivationKind::Sinc => &Sinc,
            ActivationKind::Elliot => &Elliot,
            ActivationKind::Linear => &Linear,
            ActivationKind::Isru => &Isru,
            ActivationKind::SoftSign => &SoftSign,
            ActivationKind::SoftPlus => &SoftPlus,
        }
    }

    /// `amplify * f(slope, x)`
    pub fn activation(self, slope: f64, amplify: f64, x: f64) -> f64 {
        amplify * self.func().evaluate(slope, x)
    }

    /// `amplify * f'(slope, x)`, the derivative with respect to `x`.
    pub fn gradient(self, slope: f64, amplify: f64, x: f64) -> f64 {
        amplify * self.func().derivative(slope, x)
    }
}

impl Default for ActivationKind {
    fn default() -> Self {
        ActivationKind::Threshold
    }
}

impl fmt::Display for ActivationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an activation name fails.
#[derive(Clone, Debug, PartialEq)]
pub struct UnknownActivation(pub String);

impl fmt::Display for UnknownActivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown activation function '{}'", self.0)
    }
}

impl std::error::Error for UnknownActivation {}

impl FromStr for ActivationKind {
    type Err = UnknownActivation;

    /// Accepts the display names, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .chain(std::iter::once(ActivationKind::Unknown))
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownActivation(s.to_owned()))
    }
}

/// An activation function together with its derivative. Both take the slope
/// parameter and the unit's input; amplification is applied by the caller.
pub trait ActivFunc {
    fn evaluate(&self, slope: f64, x: f64) -> f64;
    fn derivative(&self, slope: f64, x: f64) -> f64;
}

/// Inputs closer to zero than this are treated as zero by `Sinc`.
const SINC_EPSILON: f64 = 0.00001;

#[derive(Clone, Copy, Debug)]
pub struct Unknown;
impl ActivFunc for Unknown {
    fn evaluate(&self, _: f64, _: f64) -> f64 {
        0.
    }
    fn derivative(&self, _: f64, _: f64) -> f64 {
        0.
    }
}

#[derive(Clone, Copy, Debug)]
/// Returns 0 or `slope`. The derivative is zero everywhere except the origin,
/// where it is undefined and the slope is returned instead.
pub struct Threshold;
impl ActivFunc for Threshold {
    fn evaluate(&self, slope: f64, x: f64) -> f64 {
        if x >= 0. {
            slope
        } else {
            0.
        }
    }
    fn derivative(&self, slope: f64, x: f64) -> f64 {
        if x == 0. {
            slope
        } else {
            0.
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Unipolar;
impl ActivFunc for Unipolar {
    fn evaluate(&self, slope: f64, x: f64) -> f64 {
        1. / (1. + (-slope * x).exp())
    }
    fn derivative(&self, slope: f64, x: f64) -> f64 {
        let exp = (-slope * x).exp();
        let exp1 = 1. + exp;
        slope * exp / (exp1 * exp1)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Bipolar;
impl ActivFunc for Bipolar {
    fn evaluate(&self, slope: f64, x: f64) -> f64 {
        2. / (1. + (-slope * x).exp()) - 1.
    }
    fn derivative(&self, slope: f64, x: f64) -> f64 {
        let exp = (-slope * x).exp();
        let exp1 = 1. + exp;
        2. * slope * exp / (exp1 * exp1)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Tanh;
impl ActivFunc for Tanh {
    fn evaluate(&self, slope: f64, x: f64) -> f64 {
        (slope * x).tanh()
    }
    fn derivative(&self, slope: f64, x: f64) -> f64 {
        let t = (slope * x).tanh();
        slope * (1. - t * t)
    }
}

#[derive(Clone, Copy, Debug)]
/// Bell curve; the slope controls its width.
pub struct Gaussian;
impl ActivFunc for Gaussian {
    fn evaluate(&self, slope: f64, x: f64) -> f64 {
        (-slope * x * x).exp()
    }
    fn derivative(&self, slope: f64, x: f64) -> f64 {
        -2. * slope * x * (-slope * x * x).exp()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Arctan;
impl ActivFunc for Arctan {
    fn evaluate(&self, slope: f64, x: f64) -> f64 {
        (slope * x).atan()
    }
    fn derivative(&self, slope: f64, x: f64) -> f64 {
        slope / (1. + slope * slope * x * x)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Sine;
impl ActivFunc for Sine {
    fn evaluate(&self, slope: f64, x: f64) -> f64 {
        (slope * x).sin()
    }
    fn derivative(&self, slope: f64, x: f64) -> f64 {
        slope * (slope * x).cos()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Cosine;
impl ActivFunc for Cosine {
    fn evaluate(&self, slope: f64, x: f64) -> f64 {
        (slope * x).cos()
    }
    fn derivative(&self, slope: f64, x: f64) -> f64 {
        -slope * (slope * x).sin()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Sinc;
impl ActivFunc for Sinc {
    fn evaluate(&self, slope: f64, x: f64) -> f64 {
        if x.abs() < SINC_EPSILON {
            1.
        } else {
            (slope * x).sin() / (slope * x)
        }
    }
    fn derivative(&self, slope: f64, x: f64) -> f64 {
        if x.abs() < SINC_EPSILON {
            0.
        } else {
            (slope * x * (slope * x).cos() - (slope * x).sin()) / (slope * x * x)
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Elliot;
impl ActivFunc for Elliot {
    fn evaluate(&self, slope: f64, x: f64) -> f64 {
        (slope * x / 2.) / (1. + (slope * x).abs()) + 0.5
    }
    fn derivative(&self, slope: f64, x: f64) -> f64 {
        let abs1 = 1. + (slope * x).abs();
        0.5 * slope / (abs1 * abs1)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Linear;
impl ActivFunc for Linear {
    fn evaluate(&self, slope: f64, x: f64) -> f64 {
        slope * x
    }
    fn derivative(&self, slope: f64, _: f64) -> f64 {
        slope
    }
}

#[derive(Clone, Copy, Debug)]
/// Inverse square root unit. Unlike the other sigmoids the slope shrinks the range,
/// which is `±1/sqrt(slope)`.
pub struct Isru;
impl ActivFunc for Isru {
    fn evaluate(&self, slope: f64, x: f64) -> f64 {
        x / (1. + slope * x * x).sqrt()
    }
    fn derivative(&self, slope: f64, x: f64) -> f64 {
        let g = 1. / (1. + slope * x * x).sqrt();
        g * g * g
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SoftSign;
impl ActivFunc for SoftSign {
    fn evaluate(&self, slope: f64, x: f64) -> f64 {
        slope * x / (1. + (slope * x).abs())
    }
    fn derivative(&self, slope: f64, x: f64) -> f64 {
        let abs1 = 1. + (slope * x).abs();
        slope / (abs1 * abs1)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SoftPlus;
impl ActivFunc for SoftPlus {
    fn evaluate(&self, slope: f64, x: f64) -> f64 {
        (1. + (slope * x).exp()).ln()
    }
    fn derivative(&self, slope: f64, x: f64) -> f64 {
        let exp = (slope * x).exp();
        slope * exp / (1. + exp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLOPES: [f64; 3] = [0.5, 1., 5.];
    const STEP: f64 = 1e-7;
    const TOLERANCE: f64 = 1e-4;

    fn numerical_gradient(kind: ActivationKind, slope: f64, amplify: f64, x: f64) -> f64 {
        let above = kind.activation(slope, amplify, x + STEP);
        let below = kind.activation(slope, amplify, x - STEP);
        (above - below) / (2. * STEP)
    }

    #[test]
    fn gradients_match_numerical_derivatives() {
        // Threshold is discontinuous at the origin and checked separately below.
        let kinds = ActivationKind::ALL
            .iter()
            .copied()
            .filter(|k| *k != ActivationKind::Threshold);

        for kind in kinds {
            for &slope in &SLOPES {
                for &amplify in &[1., 2.5] {
                    for step in 0..=20 {
                        let x = -5. + step as f64 * 0.5;
                        let expected = numerical_gradient(kind, slope, amplify, x);
                        let received = kind.gradient(slope, amplify, x);
                        assert!(
                            (expected - received).abs() < TOLERANCE,
                            "{} gradient mismatch at x={}, slope={}, amplify={}: expected {}, received {}",
                            kind,
                            x,
                            slope,
                            amplify,
                            expected,
                            received
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn threshold_steps_at_origin() {
        for &slope in &SLOPES {
            assert_eq!(ActivationKind::Threshold.activation(slope, 2., -0.001), 0.);
            assert_eq!(ActivationKind::Threshold.activation(slope, 2., -4.), 0.);
            assert_eq!(ActivationKind::Threshold.activation(slope, 2., 0.), slope * 2.);
            assert_eq!(ActivationKind::Threshold.activation(slope, 2., 3.), slope * 2.);

            assert_eq!(ActivationKind::Threshold.gradient(slope, 2., 0.), slope * 2.);
            assert_eq!(ActivationKind::Threshold.gradient(slope, 2., 0.5), 0.);
        }
    }

    #[test]
    fn sinc_is_defined_at_origin() {
        assert_eq!(ActivationKind::Sinc.activation(3., 1.5, 0.), 1.5);
        assert_eq!(ActivationKind::Sinc.gradient(3., 1.5, 0.), 0.);
        assert_eq!(ActivationKind::Sinc.activation(1., 1., 0.000001), 1.);
    }

    #[test]
    fn unknown_is_zero() {
        assert_eq!(ActivationKind::Unknown.activation(1., 1., 0.7), 0.);
        assert_eq!(ActivationKind::Unknown.gradient(1., 1., 0.7), 0.);
    }

    #[test]
    fn known_values() {
        let eps = 1e-12;
        assert!((ActivationKind::Unipolar.activation(1., 1., 0.) - 0.5).abs() < eps);
        assert!(ActivationKind::Bipolar.activation(1., 1., 0.).abs() < eps);
        assert!((ActivationKind::Elliot.activation(1., 1., 0.) - 0.5).abs() < eps);
        assert!((ActivationKind::Gaussian.activation(1., 3., 0.) - 3.).abs() < eps);
        assert!((ActivationKind::Linear.activation(2., 3., 1.5) - 9.).abs() < eps);
        assert!((ActivationKind::SoftPlus.activation(1., 1., 0.) - 2f64.ln()).abs() < eps);
        assert!((ActivationKind::Isru.activation(4., 1., 1e6) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn codes_round_trip() {
        for kind in ActivationKind::ALL.iter().copied() {
            assert_eq!(ActivationKind::from_code(kind.code()), kind);
            assert_eq!(kind.name().parse::<ActivationKind>(), Ok(kind));
        }
        assert_eq!(ActivationKind::from_code(-1), ActivationKind::Unknown);
        assert_eq!(ActivationKind::from_code(42), ActivationKind::Unknown);
        assert_eq!("isru".parse::<ActivationKind>(), Ok(ActivationKind::Isru));
        assert!("relu".parse::<ActivationKind>().is_err());
    }
}
