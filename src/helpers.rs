use rand::{rngs::SmallRng, seq::SliceRandom, SeedableRng};

/// Shuffles an array of consecutive integers and allows you to iterate through them.
///
/// The permutation depends only on `size` and `seed`, so two shufflers built with
/// the same arguments yield the same order.
pub struct IndexShuffler {
    idxs: Box<[usize]>,
    idx: usize,
}

impl IndexShuffler {
    pub fn new(size: usize, seed: u64) -> Self {
        let mut idxs: Box<[usize]> = (0..size).collect();
        idxs.shuffle(&mut SmallRng::seed_from_u64(seed));
        IndexShuffler { idxs, idx: 0 }
    }

    pub fn len(&self) -> usize {
        self.idxs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idxs.is_empty()
    }
}

impl Iterator for IndexShuffler {
    type Item = usize;
    fn next(&mut self) -> Option<Self::Item> {
        let i = self.idxs.get(self.idx).copied();
        self.idx += 1;
        i
    }
}
