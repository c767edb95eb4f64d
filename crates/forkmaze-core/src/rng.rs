//! Seeds and the deterministic number stream behind puzzle generation.
//!
//! A [`Seed`] is six characters drawn from a 32-symbol alphabet that leaves
//! out the easily confused `0`, `O`, `1` and `I`. It is folded into a `u32`
//! with a rolling hash and fed to [`SeededRng`], a mulberry32 generator. Every
//! step is wrapping 32-bit integer arithmetic, so the same seed produces the
//! same stream on every platform.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Symbols a seed may contain.
pub const SEED_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Number of characters in a seed.
pub const SEED_LEN: usize = 6;

/// Reasons a seed string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeedError {
    #[error("seed must be 6 characters, got {0}")]
    Length(usize),
    #[error("seed character {0:?} is not allowed (0, O, 1 and I are excluded)")]
    Symbol(char),
}

/// A validated, uppercased puzzle seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Seed([u8; SEED_LEN]);

impl Seed {
    /// Draw a seed from the operating system's entropy source.
    pub fn random() -> Self {
        let mut bytes = [0u8; SEED_LEN];
        getrandom::getrandom(&mut bytes).unwrap_or_else(|_| {
            // Fallback: derive from a process-wide counter if getrandom fails
            static COUNTER: std::sync::atomic::AtomicU32 = std::sync::atomic::AtomicU32::new(1);
            let counter = COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            let mut rng = SeededRng::new(counter);
            for b in bytes.iter_mut() {
                *b = rng.next_below(256) as u8;
            }
        });

        let mut symbols = [0u8; SEED_LEN];
        for (dst, b) in symbols.iter_mut().zip(bytes) {
            *dst = SEED_ALPHABET[b as usize % SEED_ALPHABET.len()];
        }
        Self(symbols)
    }

    /// Fold the seed into a 32-bit state with a `h * 31 + c` rolling hash.
    pub fn hash32(&self) -> u32 {
        self.0
            .iter()
            .fold(0u32, |h, &c| h.wrapping_mul(31).wrapping_add(c as u32))
    }

    pub fn as_str(&self) -> &str {
        // Every byte is from SEED_ALPHABET, which is ASCII.
        std::str::from_utf8(&self.0).unwrap_or("")
    }

    /// Start a generator stream for this seed.
    pub fn rng(&self) -> SeededRng {
        SeededRng::new(self.hash32())
    }
}

impl FromStr for Seed {
    type Err = SeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let count = upper.chars().count();
        if count != SEED_LEN {
            return Err(SeedError::Length(count));
        }

        let mut symbols = [0u8; SEED_LEN];
        for (dst, ch) in symbols.iter_mut().zip(upper.chars()) {
            if !ch.is_ascii() || !SEED_ALPHABET.contains(&(ch as u8)) {
                return Err(SeedError::Symbol(ch));
            }
            *dst = ch as u8;
        }
        Ok(Self(symbols))
    }
}

impl TryFrom<String> for Seed {
    type Error = SeedError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Seed> for String {
    fn from(seed: Seed) -> Self {
        seed.as_str().to_string()
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// mulberry32: small, fast, and fully specified in 32-bit arithmetic.
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Uniform float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / 4_294_967_296.0
    }

    /// Uniform integer in `[0, bound)`; `bound` must be non-zero.
    pub fn next_below(&mut self, bound: usize) -> usize {
        (self.next_f64() * bound as f64) as usize
    }

    /// True with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_below(i + 1);
            slice.swap(i, j);
        }
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            items.get(self.next_below(items.len()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_parse_uppercases() {
        let seed: Seed = "zxn8yb".parse().unwrap();
        assert_eq!(seed.as_str(), "ZXN8YB");
    }

    #[test]
    fn test_seed_rejects_ambiguous_symbols() {
        assert_eq!("ABCDE0".parse::<Seed>(), Err(SeedError::Symbol('0')));
        assert_eq!("ABCDEO".parse::<Seed>(), Err(SeedError::Symbol('O')));
        assert_eq!("ABCDE1".parse::<Seed>(), Err(SeedError::Symbol('1')));
        assert_eq!("ABCDEI".parse::<Seed>(), Err(SeedError::Symbol('I')));
        assert_eq!("ABC".parse::<Seed>(), Err(SeedError::Length(3)));
    }

    #[test]
    fn test_hash_is_rolling() {
        let seed: Seed = "AAAAAA".parse().unwrap();
        let expected = (0..6).fold(0u32, |h, _| h.wrapping_mul(31).wrapping_add(65));
        assert_eq!(seed.hash32(), expected);
    }

    #[test]
    fn test_mulberry32_reference_values() {
        // First outputs of mulberry32 seeded with 0.
        let mut rng = SeededRng::new(0);
        assert_eq!(rng.next_u32(), 1_144_304_738);
        assert_eq!(rng.next_u32(), 1_416_247);
        assert_eq!(rng.next_u32(), 958_946_056);
    }

    #[test]
    fn test_stream_is_deterministic() {
        let seed: Seed = "ZXN8YB".parse().unwrap();
        let mut a = seed.rng();
        let mut b = seed.rng();
        for _ in 0..1000 {
            let x = a.next_f64();
            assert!((0.0..1.0).contains(&x));
            assert_eq!(x.to_bits(), b.next_f64().to_bits());
        }
    }

    #[test]
    fn test_random_seed_is_valid() {
        let seed = Seed::random();
        let reparsed: Seed = seed.as_str().parse().unwrap();
        assert_eq!(seed, reparsed);
    }

    #[test]
    fn test_seed_serde_as_string() {
        let seed: Seed = "K7P2QX".parse().unwrap();
        let json = serde_json::to_string(&seed).unwrap();
        assert_eq!(json, "\"K7P2QX\"");
        let back: Seed = serde_json::from_str(&json).unwrap();
        assert_eq!(back, seed);
        assert!(serde_json::from_str::<Seed>("\"OOOOOO\"").is_err());
    }
}
