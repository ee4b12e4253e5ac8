use std::sync::{Arc, Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Where quiz shuffles draw their randomness from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShuffleSource {
    #[default]
    Thread,
    Seeded(u64),
}

/// Generator shared by every quiz start of one service.
///
/// A seeded shuffler is built once from its seed and then keeps advancing, so
/// a run is reproducible while consecutive quizzes still differ. Clones share
/// the same stream.
#[derive(Clone, Default)]
pub(crate) struct Shuffler {
    seeded: Option<Arc<Mutex<StdRng>>>,
}

impl Shuffler {
    pub(crate) fn new(source: ShuffleSource) -> Self {
        match source {
            ShuffleSource::Thread => Self::default(),
            ShuffleSource::Seeded(seed) => Self {
                seeded: Some(Arc::new(Mutex::new(StdRng::seed_from_u64(seed)))),
            },
        }
    }

    /// Run `f` with the generator for one quiz start.
    pub(crate) fn with_rng<T>(&self, f: impl FnOnce(&mut dyn RngCore) -> T) -> T {
        match &self.seeded {
            None => f(&mut rand::rng()),
            Some(rng) => {
                // The generator holds no invariant a panicking caller could break.
                let mut guard = rng.lock().unwrap_or_else(PoisonError::into_inner);
                f(&mut *guard)
            }
        }
    }
}
