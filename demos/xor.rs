//! Trains a small network on the xor function and saves it.
//!
//! Run with `RUST_LOG=debug` to see the error of every epoch.

use rusty_nnet::{
    trainer::LogFile, ActivationKind, FeedForward, Network, NetworkBuilder, Trainer, TrainerConfig,
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut net = NetworkBuilder::new(2, 1)
        .output_unit(ActivationKind::Unipolar, 1., 1.)
        .layer(4, ActivationKind::Unipolar, 2.)
        .build()?;

    let config = match std::env::args().nth(1) {
        Some(path) => TrainerConfig::from_file(path)?,
        None => TrainerConfig {
            learning_constant: 0.5,
            momentum: 0.5,
            ..TrainerConfig::default()
        },
    };
    let log_path = std::env::temp_dir().join("xor_errors.log");
    let mut trainer = Trainer::with_config(config).with_logger(LogFile::new(&log_path)?);
    trainer.add_new_training_set(
        vec![vec![0., 0.], vec![0., 1.], vec![1., 0.], vec![1., 1.]],
        vec![vec![0.], vec![1.], vec![1.], vec![0.]],
    );

    let report = trainer.train_until(&mut net, 1e-3, 20_000)?;
    println!(
        "{} after {} epochs, error {}",
        if report.converged { "Converged" } else { "Stopped" },
        report.epochs,
        report.error
    );

    for input in &[[0., 0.], [0., 1.], [1., 0.], [1., 1.]] {
        println!("{:?} -> {:?}", input, net.response(input));
    }

    let path = std::env::temp_dir().join("xor.net");
    net.save(&path)?;
    let loaded = FeedForward::from_file(&path)?;
    println!("Saved to {}:\n{}", path.display(), loaded);
    println!("Epoch errors logged to {}", log_path.display());
    Ok(())
}
