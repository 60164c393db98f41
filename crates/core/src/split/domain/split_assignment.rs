use rand::seq::SliceRandom;
use rand::RngCore;

use crate::shared::layout::Split;

/// Partition of identities into disjoint train and test sets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitAssignment {
    train: Vec<String>,
    test: Vec<String>,
}

impl SplitAssignment {
    /// Shuffles `identities` and gives the first `floor(test_fraction * N)` to test.
    ///
    /// Identities are sorted before shuffling, so the result depends only on
    /// the identity set and the state of `rng`, not on directory listing order.
    pub fn assign(mut identities: Vec<String>, test_fraction: f64, rng: &mut dyn RngCore) -> Self {
        identities.sort();
        identities.dedup();
        identities.shuffle(rng);

        let test_count = test_count(identities.len(), test_fraction);
        let train = identities.split_off(test_count);
        Self {
            train,
            test: identities,
        }
    }

    pub fn identities(&self, split: Split) -> &[String] {
        match split {
            Split::Train => &self.train,
            Split::Test => &self.test,
        }
    }
}

fn test_count(total: usize, test_fraction: f64) -> usize {
    ((total as f64 * test_fraction).floor() as usize).min(total)
}
