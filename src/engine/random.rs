//! Winner selection
//!
//! Results feed a competitive leaderboard, so the default picker draws from the
//! platform CSPRNG. A seeded PCG is used only when that source fails.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Uniform index source
pub trait IndexPicker {
    /// Uniform index in `[0, count)`. Returns 0 when `count` is 0.
    fn pick_index(&mut self, count: usize) -> usize;
}

/// Secure random picker with a PRNG fallback
#[derive(Debug, Default)]
pub struct SecureRandom {
    fallback: Option<Pcg32>,
}

impl SecureRandom {
    pub fn new() -> Self {
        Self { fallback: None }
    }

    /// True once the secure source has failed and the fallback is in use
    pub fn is_degraded(&self) -> bool {
        self.fallback.is_some()
    }

    fn fallback_rng(&mut self) -> &mut Pcg32 {
        self.fallback
            .get_or_insert_with(|| Pcg32::seed_from_u64(clock_seed()))
    }
}

impl IndexPicker for SecureRandom {
    fn pick_index(&mut self, count: usize) -> usize {
        if count <= 1 {
            return 0;
        }

        if self.fallback.is_none() {
            match secure_index(count) {
                Ok(index) => return index,
                Err(e) => {
                    log::warn!("Secure random source unavailable ({}), using PRNG fallback", e);
                }
            }
        }

        self.fallback_rng().random_range(0..count)
    }
}

/// Unbiased index from the OS/browser CSPRNG via rejection sampling
fn secure_index(count: usize) -> Result<usize, getrandom::Error> {
    let n = count as u64;
    // Largest multiple of n that fits; draws at or above it are rejected
    let limit = u64::MAX - u64::MAX % n;
    loop {
        let mut bytes = [0u8; 8];
        getrandom::fill(&mut bytes)?;
        let value = u64::from_le_bytes(bytes);
        if value < limit {
            return Ok((value % n) as usize);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn clock_seed() -> u64 {
    js_sys::Date::now() as u64
}

#[cfg(not(target_arch = "wasm32"))]
fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Deterministic picker for replays and tests
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: Pcg32,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl IndexPicker for SeededRandom {
    fn pick_index(&mut self, count: usize) -> usize {
        if count <= 1 {
            return 0;
        }
        self.rng.random_range(0..count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frequencies(picker: &mut impl IndexPicker, k: usize, trials: usize) -> Vec<usize> {
        let mut counts = vec![0; k];
        for _ in 0..trials {
            let i = picker.pick_index(k);
            assert!(i < k);
            counts[i] += 1;
        }
        counts
    }

    fn assert_uniform(counts: &[usize], trials: usize) {
        let expected = trials as f64 / counts.len() as f64;
        for (i, &c) in counts.iter().enumerate() {
            let deviation = (c as f64 - expected).abs() / expected;
            assert!(deviation < 0.15, "index {} drawn {} times, expected ~{}", i, c, expected);
        }
    }

    #[test]
    fn test_secure_random_uniform() {
        let mut picker = SecureRandom::new();
        let counts = frequencies(&mut picker, 5, 10_000);
        assert_uniform(&counts, 10_000);
        assert!(!picker.is_degraded());
    }

    #[test]
    fn test_seeded_random_uniform() {
        let mut picker = SeededRandom::new(12345);
        let counts = frequencies(&mut picker, 12, 12_000);
        assert_uniform(&counts, 12_000);
    }

    #[test]
    fn test_seeded_random_is_reproducible() {
        let mut a = SeededRandom::new(99);
        let mut b = SeededRandom::new(99);
        for _ in 0..50 {
            assert_eq!(a.pick_index(7), b.pick_index(7));
        }
    }

    #[test]
    fn test_degenerate_counts() {
        let mut picker = SecureRandom::new();
        assert_eq!(picker.pick_index(0), 0);
        assert_eq!(picker.pick_index(1), 0);
    }
}
