//! The space separated single line format networks are saved in.
//!
//! The header holds `inputs outputs layers output_code output_slope output_amplify`. It is
//! followed by one record per connection, each starting with the delimiter `L`, then
//! `in out code slope amplify` and the row-major weights. The record of the connection into
//! the output layer carries `0 0.0 0.0` since the output unit is part of the header.
//!
//! Reals are written the way `java.lang.Double.toString` writes them, so `1.0E-7`, `2.5E10`
//! and `Infinity`. The reader accepts these as well as Rust's own float syntax.

use std::convert::TryFrom;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::{FromStr, SplitWhitespace};

use anyhow::Context;

use super::feed_forward::{FeedForward, FeedForwardUnvalidated};
use super::{Network, Trainable};
use crate::{
    a_funcs::ActivationKind, connection::WeightedConnection, error::ParseError, unit::Unit,
};

const LAYER_DELIMITER: &str = "L";

impl fmt::Display for FeedForward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let out = self.output_unit();
        write!(
            f,
            "{} {} {} {} {} {} ",
            self.num_inputs(),
            self.num_outputs(),
            self.num_layers(),
            out.kind().code(),
            Real(out.slope()),
            Real(out.amplify())
        )?;

        let mut layer = 0;
        while let Some(connection) = self.weighted_connection(layer) {
            let (code, slope, amplify) = match self.layer_unit(layer) {
                Some(u) => (u.kind().code(), u.slope(), u.amplify()),
                None => (0, 0., 0.),
            };
            write!(
                f,
                "{} {} {} {} {} {} ",
                LAYER_DELIMITER,
                connection.in_size(),
                connection.out_size(),
                code,
                Real(slope),
                Real(amplify)
            )?;
            for w in connection.weights() {
                write!(f, "{} ", Real(*w))?;
            }
            layer += 1;
        }
        writeln!(f)
    }
}

/// A real number in the text format's float syntax.
struct Real(f64);

impl fmt::Display for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = self.0;
        if x.is_nan() {
            return f.write_str("NaN");
        }
        if x.is_infinite() {
            return f.write_str(if x > 0. { "Infinity" } else { "-Infinity" });
        }
        if x == 0. || (1e-3..1e7).contains(&x.abs()) {
            // plain decimal with at least one fractional digit
            let plain = format!("{}", x);
            return if plain.contains('.') {
                f.write_str(&plain)
            } else {
                write!(f, "{}.0", plain)
            };
        }

        let sci = format!("{:e}", x);
        let (mantissa, exponent) = sci.split_at(sci.find('e').unwrap_or(sci.len()));
        let exponent = exponent.trim_start_matches('e');
        if mantissa.contains('.') {
            write!(f, "{}E{}", mantissa, exponent)
        } else {
            write!(f, "{}.0E{}", mantissa, exponent)
        }
    }
}

impl FromStr for FeedForward {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = Tokens::new(s);

        let num_inputs = tokens.parse::<usize>("the number of inputs")?;
        let num_outputs = tokens.parse::<usize>("the number of outputs")?;
        let num_layers = tokens.parse::<usize>("the number of hidden layers")?;
        let output_kind = ActivationKind::from_code(tokens.parse("the output unit type")?);
        let output_slope = tokens.parse("the output unit slope")?;
        let output_amplify = tokens.parse("the output unit amplification")?;

        // a network missing either size has no connections unless it has hidden layers
        let records = if num_layers == 0 && (num_inputs == 0 || num_outputs == 0) {
            0
        } else {
            num_layers.saturating_add(1)
        };

        // header counts are untrusted, grow per record
        let mut hidden_units = Vec::new();
        let mut connections = Vec::new();
        for layer in 0..records {
            tokens.skip_delimiter();
            let in_size = tokens.parse::<usize>("the number of connection inputs")?;
            let out_size = tokens.parse::<usize>("the number of connection outputs")?;
            let kind = ActivationKind::from_code(tokens.parse("the layer unit type")?);
            let slope = tokens.parse("the layer unit slope")?;
            let amplify = tokens.parse("the layer unit amplification")?;

            let num_weights = in_size.checked_mul(out_size).ok_or_else(|| {
                ParseError::InvalidToken {
                    token: format!("{} {}", in_size, out_size),
                    expected: "connection sizes",
                }
            })?;
            let weights = (0..num_weights)
                .map(|_| tokens.parse::<f64>("a weight"))
                .collect::<Result<Vec<_>, _>>()?;
            let connection = if weights.is_empty() {
                WeightedConnection::default()
            } else {
                // sizes are non-zero and the weight count matches
                WeightedConnection::from_weights(in_size, out_size, weights).map_err(|_| {
                    ParseError::InvalidToken {
                        token: format!("{} {}", in_size, out_size),
                        expected: "connection sizes",
                    }
                })?
            };
            connections.push(connection);

            if layer < num_layers {
                hidden_units.push(Unit::new(kind, slope, amplify));
            }
        }

        let network = FeedForward::try_from(FeedForwardUnvalidated {
            num_inputs,
            num_outputs,
            output_unit: Unit::new(output_kind, output_slope, output_amplify),
            hidden_units,
            connections,
        })?;
        Ok(network)
    }
}

impl FeedForward {
    /// Reads a network from its text representation.
    pub fn from_text(s: &str) -> Result<Self, ParseError> {
        s.parse()
    }

    /// Writes the network to `path` in the text format.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_string())
            .with_context(|| format!("Failed to save network to {}", path.display()))
    }

    /// Loads a network saved with [save](FeedForward::save).
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let s = fs::read_to_string(path)
            .with_context(|| format!("Failed to read network from {}", path.display()))?;
        let network = s
            .parse()
            .with_context(|| format!("{} doesn't contain a valid network", path.display()))?;
        Ok(network)
    }
}

struct Tokens<'a> {
    iter: std::iter::Peekable<SplitWhitespace<'a>>,
}

impl<'a> Tokens<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            iter: s.split_whitespace().peekable(),
        }
    }

    fn skip_delimiter(&mut self) {
        if self.iter.peek() == Some(&LAYER_DELIMITER) {
            self.iter.next();
        }
    }

    fn parse<T: FromStr>(&mut self, expected: &'static str) -> Result<T, ParseError> {
        let token = self
            .iter
            .next()
            .ok_or(ParseError::UnexpectedEnd { expected })?;
        token.parse().map_err(|_| ParseError::InvalidToken {
            token: token.to_owned(),
            expected,
        })
    }
}
