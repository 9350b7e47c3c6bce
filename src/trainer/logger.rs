use std::{
    cell::RefCell,
    fmt::Debug,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::Context;

/// Receives the accumulated network error after every epoch.
pub trait Logger: Debug {
    fn epoch_error(&mut self, epoch: usize, error: f64);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MockLogger;

impl Logger for MockLogger {
    fn epoch_error(&mut self, _epoch: usize, _error: f64) {}
}

/// Writes one error value per line.
#[derive(Debug)]
pub struct LogFile {
    file: PathBuf,
    writer: BufWriter<File>,
}

impl LogFile {
    pub fn new<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        Ok(Self {
            file: path.to_owned(),
            writer: BufWriter::new(file),
        })
    }
}

impl Logger for LogFile {
    fn epoch_error(&mut self, _epoch: usize, error: f64) {
        if let Err(e) = writeln!(self.writer, "{}", error).and_then(|_| self.writer.flush()) {
            log::warn!(
                "Error while logging network error to file: {}\nError: {}",
                self.file.display(),
                e
            );
        }
    }
}

/// Keeps every reported error in memory. Clones share the same record, so a clone can be
/// handed to a [Trainer](crate::Trainer) and read back later.
#[derive(Debug, Default, Clone)]
pub struct History {
    errors: Rc<RefCell<Vec<f64>>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> Vec<f64> {
        self.errors.borrow().clone()
    }
}

impl Logger for History {
    fn epoch_error(&mut self, _epoch: usize, error: f64) {
        self.errors.borrow_mut().push(error);
    }
}
