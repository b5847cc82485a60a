use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{ParseSeedError, core::piece::PieceKind};

/// Supplies piece kinds in shuffled permutations of all seven.
///
/// Each permutation is consumed in order. Once the last kind of a
/// permutation is drawn, the next one is shuffled from the same RNG stream,
/// so every kind appears exactly once in each run of seven draws.
///
/// # Example
///
/// ```
/// use stackfall_engine::DropQueue;
///
/// let mut queue = DropQueue::new();
///
/// let next = queue.peek_next();
/// assert_eq!(queue.pop_next(), next);
/// ```
#[derive(Debug, Clone)]
pub struct DropQueue {
    rng: Pcg32,
    order: [PieceKind; PieceKind::LEN],
    cursor: usize,
}

impl Default for DropQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Seed for deterministic piece order.
///
/// A 128-bit value written as 32 hex digits, both in its serialized form
/// and when parsed from a string.
///
/// # Example
///
/// ```
/// use stackfall_engine::{DropQueue, QueueSeed};
///
/// let seed: QueueSeed = "0123456789abcdef0123456789abcdef".parse().unwrap();
///
/// let mut a = DropQueue::with_seed(seed);
/// let mut b = DropQueue::with_seed(seed);
/// for _ in 0..14 {
///     assert_eq!(a.pop_next(), b.pop_next());
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSeed([u8; 16]);

impl QueueSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for QueueSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for QueueSeed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(ParseSeedError::InvalidLength(s.len()));
        }
        if !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseSeedError::InvalidDigit);
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| ParseSeedError::InvalidDigit)?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for QueueSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QueueSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `QueueSeed` values with `rng.random()`.
impl Distribution<QueueSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> QueueSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        QueueSeed(seed)
    }
}

impl DropQueue {
    /// Creates a queue with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for a reproducible order.
    #[must_use]
    pub fn with_seed(seed: QueueSeed) -> Self {
        let mut this = Self {
            rng: Pcg32::from_seed(seed.0),
            order: PieceKind::ALL,
            cursor: 0,
        };
        this.reshuffle();
        this
    }

    fn reshuffle(&mut self) {
        self.order = PieceKind::ALL;
        self.order.shuffle(&mut self.rng);
        self.cursor = 0;
    }

    /// Draws the next kind, shuffling a fresh permutation after the last one.
    pub fn pop_next(&mut self) -> PieceKind {
        let kind = self.order[self.cursor];
        self.cursor += 1;
        if self.cursor == PieceKind::LEN {
            self.reshuffle();
        }
        kind
    }

    /// Returns the kind the next [`Self::pop_next`] will draw.
    #[must_use]
    pub fn peek_next(&self) -> PieceKind {
        self.order[self.cursor]
    }

    /// Discards the current permutation and shuffles a new one.
    ///
    /// The RNG stream continues, so a reset does not replay the same order.
    pub fn reset(&mut self) {
        self.reshuffle();
    }
}
