use std::{error::Error, fmt};

use crate::network::ConsError;

/// A configuration call was rejected. The target is left unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A parameter that has to be strictly positive wasn't.
    NonPositive { name: &'static str },
    /// Hidden layers can only be added once the number of inputs is known.
    MissingInputs,
    /// No connection exists at the given layer index.
    LayerOutOfRange { layer: usize, layers: usize },
    /// A replacement connection doesn't fit between its neighbouring layers.
    ShapeMismatch {
        layer: usize,
        expected: (usize, usize),
        received: (usize, usize),
    },
}

impl Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonPositive { name } => {
                write!(f, "Parameter '{}' must be greater than zero.", name)
            }
            ConfigError::MissingInputs => {
                f.write_str("The number of network inputs must be set before adding layers.")
            }
            ConfigError::LayerOutOfRange { layer, layers } => write!(
                f,
                "Layer {} does not exist, the network has {} connection layers.",
                layer, layers
            ),
            ConfigError::ShapeMismatch {
                layer,
                expected,
                received,
            } => write!(
                f,
                "Connection for layer {} must have {} inputs and {} outputs but has {} and {}.",
                layer, expected.0, expected.1, received.0, received.1
            ),
        }
    }
}

/// Training could not start. No weights were modified.
#[derive(Debug, Clone, PartialEq)]
pub enum TrainError {
    /// The network has no connections or some of its sizes are unset.
    NetworkNotReady,
    InputSize {
        index: usize,
        expected: usize,
        received: usize,
    },
    TargetSize {
        index: usize,
        expected: usize,
        received: usize,
    },
}

impl Error for TrainError {}

impl fmt::Display for TrainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainError::NetworkNotReady => {
                f.write_str("The network isn't fully configured and cannot be trained.")
            }
            TrainError::InputSize {
                index,
                expected,
                received,
            } => write!(
                f,
                "Training input {} has {} values but the network expects {}.",
                index, received, expected
            ),
            TrainError::TargetSize {
                index,
                expected,
                received,
            } => write!(
                f,
                "Training target {} has {} values but the network produces {}.",
                index, received, expected
            ),
        }
    }
}

/// The text representation of a network could not be read.
#[derive(Debug)]
pub enum ParseError {
    /// The input ended while `expected` was still to be read.
    UnexpectedEnd { expected: &'static str },
    /// `token` could not be read as `expected`.
    InvalidToken {
        token: String,
        expected: &'static str,
    },
    /// The values were readable but describe an impossible network.
    Inconsistent(ConsError),
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParseError::Inconsistent(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedEnd { expected } => {
                write!(f, "Unexpected end of input, expected {}.", expected)
            }
            ParseError::InvalidToken { token, expected } => {
                write!(f, "Invalid token '{}', expected {}.", token, expected)
            }
            ParseError::Inconsistent(e) => write!(f, "Inconsistent network description: {}", e),
        }
    }
}

impl From<ConsError> for ParseError {
    fn from(e: ConsError) -> Self {
        ParseError::Inconsistent(e)
    }
}
