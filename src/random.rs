//! Entropy sources and the fixed-width random field packer.

use rand::rngs::adapter::ReseedingRng;
use rand::rngs::OsRng;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha12Core;

/// What a random draw will be used for.
///
/// Deterministic test doubles intercept draws by purpose so a counter reset
/// and the trailing random field can be pinned independently.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Purpose {
    /// The fresh value a counter takes when its timestamp advances.
    CounterReset,
    /// A bounded positive counter increment.
    CounterIncrement,
    /// A generic random field.
    RandomField,
}

/// Cryptographically strong source of fixed-width random integers.
///
/// Draws must be uniform over `[0, 2^bits)`; widths are exact powers of two,
/// so plain bit-masking is unbiased and no modulo truncation is involved.
pub trait RandomSource {
    /// Returns `bits` uniformly distributed random bits in the low bits of
    /// the result. `bits` must be at most 128.
    fn random_bits(&mut self, bits: u32, purpose: Purpose) -> u128;
}

/// All-ones value of `bits` width.
pub(crate) const fn bit_mask(bits: u32) -> u128 {
    if bits == 0 {
        0
    } else if bits >= 128 {
        u128::MAX
    } else {
        (1 << bits) - 1
    }
}

fn masked_draw(rng: &mut impl RngCore, bits: u32) -> u128 {
    if bits == 0 {
        return 0;
    }
    let mut value = rng.next_u64() as u128;
    if bits > 64 {
        value |= (rng.next_u64() as u128) << 64;
    }
    value & bit_mask(bits)
}

/// The process-default entropy source.
///
/// Employs [`ChaCha12Core`] with a [`ReseedingRng`] wrapper to emulate the
/// strategy used by [`rand::rngs::ThreadRng`], reseeding from the operating
/// system.
#[derive(Debug)]
pub struct SystemRandom(ReseedingRng<ChaCha12Core, OsRng>);

impl Default for SystemRandom {
    fn default() -> Self {
        Self(ReseedingRng::new(
            ChaCha12Core::from_entropy(),
            1024 * 64,
            OsRng,
        ))
    }
}

impl RandomSource for SystemRandom {
    fn random_bits(&mut self, bits: u32, _purpose: Purpose) -> u128 {
        masked_draw(&mut self.0, bits)
    }
}

/// An adapter that implements [`RandomSource`] for [`RngCore`] types,
/// ignoring the draw purpose.
///
/// # Examples
///
/// ```rust
/// use newnewid::{Adapter, V7Generator, SystemClock, METHOD_0_NO_COUNTER};
///
/// let mut g = V7Generator::new(
///     METHOD_0_NO_COUNTER,
///     SystemClock,
///     Adapter(rand::rngs::OsRng),
/// );
/// println!("{}", g.generate()?);
/// # Ok::<(), newnewid::Error>(())
/// ```
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Adapter<T>(/** The wrapped [`RngCore`] type. */ pub T);

impl<T: RngCore> RandomSource for Adapter<T> {
    fn random_bits(&mut self, bits: u32, _purpose: Purpose) -> u128 {
        masked_draw(&mut self.0, bits)
    }
}

/// Produces the random field of an identifier at a fixed bit width.
///
/// In plain mode every call is one fresh draw. In monotonic mode the field
/// is redrawn until it strictly exceeds the previous value, which keeps the
/// field itself sortable without a dedicated counter; once the previous
/// value is the maximum representable one, the maximum is returned again and
/// the caller must tolerate the collision risk.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct RandomField {
    bits: u32,
    monotonic: bool,
    last: Option<u128>,
}

impl RandomField {
    /// Creates a plain packer of `bits` width.
    pub fn new(bits: u32) -> Self {
        Self {
            bits,
            monotonic: false,
            last: None,
        }
    }

    /// Creates a packer whose output strictly increases across calls.
    pub fn monotonic(bits: u32) -> Self {
        Self {
            bits,
            monotonic: true,
            last: None,
        }
    }

    /// Width of the produced field.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Draws the next field value.
    pub fn next<R: RandomSource>(&mut self, rng: &mut R) -> u128 {
        if self.bits == 0 {
            return 0;
        }
        if !self.monotonic {
            return rng.random_bits(self.bits, Purpose::RandomField);
        }

        let max = bit_mask(self.bits);
        if self.last == Some(max) {
            // cannot increase any further; ordering falls back to the timestamp
            return max;
        }
        loop {
            let value = rng.random_bits(self.bits, Purpose::RandomField);
            if self.last.map_or(true, |prev| value > prev) {
                self.last = Some(value);
                return value;
            }
        }
    }
}
