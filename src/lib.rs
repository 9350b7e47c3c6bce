//! Fully connected feed-forward neural networks trained by backpropagation with momentum.
//!
//! ```
//! use rusty_nnet::{ActivationKind, Network, NetworkBuilder, Trainer};
//!
//! let mut net = NetworkBuilder::new(2, 1)
//!     .output_unit(ActivationKind::Linear, 1., 1.)
//!     .build()
//!     .unwrap();
//!
//! let mut trainer = Trainer::new();
//! trainer.add_to_training_set(vec![1., 1.], vec![1.]);
//! trainer.train(&mut net, 20).unwrap();
//!
//! assert!((net.response(&[1., 1.])[0] - 1.).abs() < 1e-6);
//! ```

pub mod a_funcs;
pub mod connection;
pub mod error;
pub mod helpers;
pub mod initializer;
pub mod network;
pub mod trainer;
pub mod unit;

pub use a_funcs::ActivationKind;
pub use connection::WeightedConnection;
pub use error::{ConfigError, ParseError, TrainError};
pub use network::{FeedForward, Network, NetworkBuilder, Trainable};
pub use trainer::{Trainer, TrainerConfig, TrainingReport, TrainingSet};
pub use unit::Unit;
