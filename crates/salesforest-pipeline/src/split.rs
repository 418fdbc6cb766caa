//! Seeded train/test partitioning.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::dataset::SalesDataset;
use crate::error::PipelineError;

/// How large the held-out partition should be.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TestSize {
    /// Fraction of rows, in (0.0, 1.0); the test count is rounded up.
    Fraction(f64),
    /// Exact number of rows.
    Count(usize),
}

impl TestSize {
    /// Number of test rows for a dataset of `n_samples` rows.
    #[must_use]
    pub fn n_test(self, n_samples: usize) -> usize {
        match self {
            TestSize::Fraction(f) => (f * n_samples as f64).ceil() as usize,
            TestSize::Count(n) => n,
        }
    }
}

/// Disjoint train/test row indices into the source dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    train: Vec<usize>,
    test: Vec<usize>,
}

impl SplitIndices {
    /// Train partition row indices.
    #[must_use]
    pub fn train(&self) -> &[usize] {
        &self.train
    }

    /// Test partition row indices.
    #[must_use]
    pub fn test(&self) -> &[usize] {
        &self.test
    }
}

/// Train/test split configuration.
///
/// Construct via [`TrainTestSplit::new`], then chain `with_seed` if desired.
/// The default holds out 20% of rows with seed 42.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainTestSplit {
    test_size: TestSize,
    seed: u64,
}

impl TrainTestSplit {
    /// Create a split with the given test size and seed 42.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidTestFraction`] if a fraction is not in (0.0, 1.0).
    pub fn new(test_size: TestSize) -> Result<Self, PipelineError> {
        if let TestSize::Fraction(fraction) = test_size {
            if !(fraction > 0.0 && fraction < 1.0) {
                return Err(PipelineError::InvalidTestFraction { fraction });
            }
        }
        Ok(Self { test_size, seed: 42 })
    }

    /// Set the shuffle seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the test size.
    #[must_use]
    pub fn test_size(&self) -> TestSize {
        self.test_size
    }

    /// Return the shuffle seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Shuffle `0..n_samples` and cut it into test (first) and train (rest).
    ///
    /// The same `(n_samples, test_size, seed)` always yields the same indices.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidSplit`] when either partition would be
    /// empty, which is always the case for fewer than two rows.
    pub fn split(&self, n_samples: usize) -> Result<SplitIndices, PipelineError> {
        let n_test = self.test_size.n_test(n_samples);
        let n_train = n_samples.saturating_sub(n_test);
        if n_test == 0 || n_train == 0 {
            return Err(PipelineError::InvalidSplit {
                n_samples,
                n_train,
                n_test,
            });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut permutation: Vec<usize> = (0..n_samples).collect();
        permutation.shuffle(&mut rng);

        let train = permutation.split_off(n_test);
        debug!(n_samples, n_train, n_test, seed = self.seed, "rows partitioned");

        Ok(SplitIndices {
            train,
            test: permutation,
        })
    }

    /// Split a dataset into `(train, test)` datasets.
    ///
    /// # Errors
    ///
    /// Same as [`TrainTestSplit::split`].
    pub fn split_dataset(
        &self,
        dataset: &SalesDataset,
    ) -> Result<(SalesDataset, SalesDataset), PipelineError> {
        let indices = self.split(dataset.len())?;
        Ok((dataset.select(indices.train()), dataset.select(indices.test())))
    }
}

impl Default for TrainTestSplit {
    fn default() -> Self {
        Self {
            test_size: TestSize::Fraction(0.2),
            seed: 42,
        }
    }
}
