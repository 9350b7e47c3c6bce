use rand::distributions::Uniform;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Implement Initializer for the struct reference as well
macro_rules! impl_ref {
    ($struct:ty) => {
        impl Initializer for &mut $struct {
            fn get(&mut self, in_size: usize, out_size: usize) -> f64 {
                <$struct as Initializer>::get(self, in_size, out_size)
            }
        }
    };
}

/// Source of initial weight values. Weights are requested row by row, so the
/// n-th call yields the weight at row `n / in_size`, column `n % in_size`.
pub trait Initializer {
    fn get(&mut self, in_size: usize, out_size: usize) -> f64;
}

/// Draws weights uniformly from `[-range/2, range/2)`.
///
/// Unless a seed is given explicitly the generator is seeded with the range itself
/// (truncated to an integer), so connections built with the same range always
/// start out with the same weights.
pub struct UniformInit {
    rng: SmallRng,
    dist: Uniform<f64>,
}

impl UniformInit {
    /// Panics if `range` isn't positive; callers validate it beforehand.
    pub fn new(range: f64) -> Self {
        Self::with_seed(range, range as u64)
    }

    pub fn with_seed(range: f64, seed: u64) -> Self {
        UniformInit {
            rng: SmallRng::seed_from_u64(seed),
            dist: Uniform::new(-range / 2., range / 2.),
        }
    }
}

impl Initializer for UniformInit {
    fn get(&mut self, _in_size: usize, _out_size: usize) -> f64 {
        self.rng.sample(self.dist)
    }
}
impl_ref!(UniformInit);

/// Always initializes weights to the same value.
pub struct ConstantInit(pub f64);
impl Initializer for ConstantInit {
    fn get(&mut self, _: usize, _: usize) -> f64 {
        self.0
    }
}
impl_ref!(ConstantInit);

/// This initializer accepts an iterator over f64 values and uses them to initialize the weights.
/// Once the iterator runs dry the remaining weights are set to zero.
pub struct WeightInit<T: Iterator<Item = f64>> {
    iter: T,
}
impl<I: Iterator<Item = f64>> WeightInit<I> {
    pub fn new<T: IntoIterator<Item = f64, IntoIter = I>>(weights: T) -> Self {
        Self {
            iter: weights.into_iter(),
        }
    }
}

impl<I: Iterator<Item = f64>> Initializer for WeightInit<I> {
    fn get(&mut self, _in_size: usize, _out_size: usize) -> f64 {
        self.iter.next().unwrap_or(0.)
    }
}

impl<I: Iterator<Item = f64>> Initializer for &mut WeightInit<I> {
    fn get(&mut self, in_size: usize, out_size: usize) -> f64 {
        (*self).get(in_size, out_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_stays_in_range() {
        let mut init = UniformInit::new(3.);
        for _ in 0..1000 {
            let w = init.get(4, 4);
            assert!(w >= -1.5 && w < 1.5, "weight {} out of range", w);
        }
    }

    #[test]
    fn uniform_is_seeded_by_range() {
        let a: Vec<f64> = {
            let mut init = UniformInit::new(2.);
            (0..8).map(|_| init.get(1, 1)).collect()
        };
        let b: Vec<f64> = {
            let mut init = UniformInit::new(2.9);
            (0..8).map(|_| init.get(1, 1)).collect()
        };
        let c: Vec<f64> = {
            let mut init = UniformInit::with_seed(2., 7);
            (0..8).map(|_| init.get(1, 1)).collect()
        };
        // 2.9 truncates to the same seed as 2, but draws from a wider interval
        let scaled: Vec<f64> = a.iter().map(|w| w * 2.9 / 2.).collect();
        for (x, y) in scaled.iter().zip(&b) {
            assert!((x - y).abs() < 1e-9);
        }
        assert_ne!(a, c);
    }

    #[test]
    fn weight_init_pads_with_zeros() {
        let mut init = WeightInit::new(vec![1., 2.]);
        let values: Vec<f64> = (0..4).map(|_| init.get(2, 2)).collect();
        assert_eq!(values, vec![1., 2., 0., 0.]);
    }
}
