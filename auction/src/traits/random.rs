//! Random source abstraction for testable random number generation.

use rand::RngCore;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Trait for providing random bytes.
///
/// This abstraction allows code that depends on random numbers to be
/// tested with deterministic, controllable values.
pub trait RandomSource: Send + Sync {
    /// Fill the destination buffer with random bytes.
    fn fill_bytes(&self, dest: &mut [u8]);

    /// Generate a lowercase base36 string of `len` characters.
    fn base36_suffix(&self, len: usize) -> String {
        let mut bytes = vec![0u8; len];
        self.fill_bytes(&mut bytes);
        bytes
            .iter()
            .map(|b| BASE36[usize::from(*b) % BASE36.len()] as char)
            .collect()
    }
}

/// Production implementation using the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRng;

impl RandomSource for ThreadRng {
    fn fill_bytes(&self, dest: &mut [u8]) {
        rand::thread_rng().fill_bytes(dest);
    }
}

impl ThreadRng {
    pub fn new() -> Self {
        Self
    }
}
