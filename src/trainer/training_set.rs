/// Paired input and target vectors.
///
/// The lengths of the vectors aren't checked when they are added; the trainer checks
/// them against the network before an epoch starts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrainingSet {
    inputs: Vec<Vec<f64>>,
    targets: Vec<Vec<f64>>,
}

impl TrainingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from parallel input and target sequences. Surplus elements of the longer
    /// sequence are dropped.
    pub fn from_vecs<D, L, U, V>(inputs: D, targets: L) -> Self
    where
        D: IntoIterator<Item = U>,
        L: IntoIterator<Item = V>,
        U: Into<Vec<f64>>,
        V: Into<Vec<f64>>,
    {
        inputs.into_iter().zip(targets).collect()
    }

    pub fn push<U: Into<Vec<f64>>, V: Into<Vec<f64>>>(&mut self, input: U, target: V) {
        self.inputs.push(input.into());
        self.targets.push(target.into());
    }

    /// Get the input and target at idx respectively.
    pub fn get(&self, idx: usize) -> Option<(&[f64], &[f64])> {
        let input = self.inputs.get(idx)?;
        let target = self.targets.get(idx)?;
        Some((input.as_slice(), target.as_slice()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[f64], &[f64])> {
        self.inputs
            .iter()
            .zip(&self.targets)
            .map(|(i, t)| (i.as_slice(), t.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn clear(&mut self) {
        self.inputs.clear();
        self.targets.clear();
    }
}

impl<U: Into<Vec<f64>>, V: Into<Vec<f64>>> std::iter::FromIterator<(U, V)> for TrainingSet {
    fn from_iter<T: IntoIterator<Item = (U, V)>>(iter: T) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<U: Into<Vec<f64>>, V: Into<Vec<f64>>> Extend<(U, V)> for TrainingSet {
    fn extend<T: IntoIterator<Item = (U, V)>>(&mut self, iter: T) {
        for (input, target) in iter {
            self.push(input, target);
        }
    }
}
