use crate::network::Trainable;

/// The previous weight change of every weight in a network, laid out exactly like the
/// weights of its connections.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeltaHistory {
    shapes: Vec<(usize, usize)>,
    deltas: Vec<Vec<f64>>,
}

impl DeltaHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the history match the connections of `net`. If any connection changed shape
    /// the whole history is reset to zero. Returns true if it was reset.
    pub fn fit<N: Trainable + ?Sized>(&mut self, net: &N) -> bool {
        let shapes: Vec<(usize, usize)> = (0..=net.num_layers())
            .filter_map(|l| net.weighted_connection(l))
            .map(|c| (c.in_size(), c.out_size()))
            .collect();
        if shapes == self.shapes {
            return false;
        }
        self.deltas = shapes.iter().map(|(i, o)| vec![0.; i * o]).collect();
        self.shapes = shapes;
        true
    }

    /// Previous changes of the weights leading into output node `node` of connection `layer`.
    pub fn row_mut(&mut self, layer: usize, node: usize) -> Option<&mut [f64]> {
        let (in_size, out_size) = *self.shapes.get(layer)?;
        if node >= out_size {
            return None;
        }
        let start = node * in_size;
        Some(&mut self.deltas[layer][start..start + in_size])
    }

    pub fn layer(&self, layer: usize) -> Option<&[f64]> {
        self.deltas.get(layer).map(Vec::as_slice)
    }

    /// Forgets all previous changes.
    pub fn reset(&mut self) {
        for d in &mut self.deltas {
            d.iter_mut().for_each(|x| *x = 0.);
        }
    }
}
