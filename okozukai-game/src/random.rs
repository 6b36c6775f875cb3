//! Injectable randomness for happenings and temptations.
use hmac::{Hmac, Mac};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::constants::EVENT_STREAM_TAG;
use crate::numbers::{floor_f64_to_usize, usize_to_f64};

/// Source of uniform draws in `[0, 1)`.
pub trait RandomSource {
    fn uniform(&mut self) -> f64;

    /// Position in a resumable stream, if the source has one.
    fn cursor(&self) -> Option<RngCursor> {
        None
    }
}

/// Anything carrying a selection probability.
pub trait Weighted {
    fn probability(&self) -> f64;
}

/// Result of a weighted draw, including whether the tail fallback fired.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedPick<'a, T> {
    pub item: &'a T,
    pub index: usize,
    pub roll: f64,
    /// True when cumulative weight never reached the roll and the last item was returned.
    pub fallback: bool,
}

/// Draw one item by accumulating probabilities in slice order.
///
/// Returns the first item whose cumulative probability reaches the roll. When the
/// weights sum to less than the roll, the last item is returned; weights are not
/// normalised, so an under-weighted table biases its tail entry.
pub fn weighted_pick<'a, T, R>(rng: &mut R, items: &'a [T]) -> Option<WeightedPick<'a, T>>
where
    T: Weighted,
    R: RandomSource + ?Sized,
{
    let last = items.len().checked_sub(1)?;
    let roll = rng.uniform();
    let mut cumulative = 0.0;
    for (index, item) in items.iter().enumerate() {
        cumulative += item.probability();
        if roll <= cumulative {
            return Some(WeightedPick {
                item,
                index,
                roll,
                fallback: false,
            });
        }
    }
    Some(WeightedPick {
        item: &items[last],
        index: last,
        roll,
        fallback: true,
    })
}

pub fn weighted_choice<'a, T, R>(rng: &mut R, items: &'a [T]) -> Option<&'a T>
where
    T: Weighted,
    R: RandomSource + ?Sized,
{
    weighted_pick(rng, items).map(|pick| pick.item)
}

/// Uniform draw: `index = floor(uniform * len)`.
pub fn uniform_choice<'a, T, R>(rng: &mut R, items: &'a [T]) -> Option<&'a T>
where
    R: RandomSource + ?Sized,
{
    let last = items.len().checked_sub(1)?;
    let index = floor_f64_to_usize(rng.uniform() * usize_to_f64(items.len())).min(last);
    items.get(index)
}

/// Resumable position of a [`SeededRandom`] stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngCursor {
    pub seed: u64,
    pub draws: u64,
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<SmallRng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: RngCore> RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Deterministic event stream derived from a user-visible seed.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: u64,
    stream: CountingRng<SmallRng>,
}

impl SeededRandom {
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            stream: CountingRng::new(derive_stream_seed(seed, EVENT_STREAM_TAG)),
        }
    }

    /// Rebuild a stream and fast-forward it to a saved position.
    ///
    /// Cost is linear in `cursor.draws`; callers restoring untrusted saves bound it first.
    #[must_use]
    pub fn resume(cursor: RngCursor) -> Self {
        let mut random = Self::from_seed(cursor.seed);
        for _ in 0..cursor.draws {
            random.stream.next_u64();
        }
        random
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.stream.draws()
    }
}

impl RandomSource for SeededRandom {
    fn uniform(&mut self) -> f64 {
        self.stream.r#gen::<f64>()
    }

    fn cursor(&self) -> Option<RngCursor> {
        Some(RngCursor {
            seed: self.seed,
            draws: self.stream.draws(),
        })
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}

/// Scripted source replaying a fixed list of draws, cycling when exhausted.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceRandom {
    values: Vec<f64>,
    next: usize,
}

impl SequenceRandom {
    /// Values outside `[0, 1)` are clamped into range.
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        let values: Vec<f64> = values
            .into_iter()
            .map(|v| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0 - f64::EPSILON) })
            .collect();
        Self { values, next: 0 }
    }

    /// A source that always returns the same draw.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self::new([value])
    }

    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.next
    }
}

impl RandomSource for SequenceRandom {
    fn uniform(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.next % self.values.len()];
        self.next = self.next.saturating_add(1);
        value
    }
}
