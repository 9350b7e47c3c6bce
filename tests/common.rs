#![allow(dead_code)]

use std::path::PathBuf;

use rusty_nnet::{
    network::construction::LayerSpec, ActivationKind, FeedForward, NetworkBuilder, Unit,
    WeightedConnection,
};

/// Network without hidden layers and a single linear output unit using `weights`.
pub fn linear_net(weights: Vec<f64>) -> FeedForward {
    let n = weights.len();
    let mut net = NetworkBuilder::new(n, 1)
        .output_unit(ActivationKind::Linear, 1., 1.)
        .build()
        .unwrap();
    net.set_weighted_connection(0, WeightedConnection::from_weights(n, 1, weights).unwrap())
        .unwrap();
    net
}

/// Three inputs, two hidden layers with differing unit settings and two outputs.
pub fn layered_net() -> FeedForward {
    NetworkBuilder::new(3, 2)
        .output_unit(ActivationKind::Bipolar, 0.5, 2.)
        .layer_spec(LayerSpec {
            units: 5,
            unit: Unit::new(ActivationKind::Tanh, 1.5, 1.),
            init_range: 1.,
        })
        .layer_spec(LayerSpec {
            units: 4,
            unit: Unit::new(ActivationKind::SoftPlus, 1., 0.5),
            init_range: 3.,
        })
        .build()
        .unwrap()
}

/// Evenly spaced points covering `[from, to]`.
pub fn grid(from: f64, to: f64, points: usize) -> Vec<f64> {
    (0..points)
        .map(|i| from + (to - from) * i as f64 / (points - 1) as f64)
        .collect()
}

pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("rusty_nnet_{}_{}", std::process::id(), name))
}

pub fn assert_close(expected: &[f64], received: &[f64], tolerance: f64) {
    assert_eq!(expected.len(), received.len());
    for (e, r) in expected.iter().zip(received) {
        assert!(
            (e - r).abs() < tolerance,
            "expected: {:?}\nreceived: {:?}",
            expected,
            received
        );
    }
}
