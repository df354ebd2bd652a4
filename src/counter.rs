//! Timestamp-keyed monotonic sequence counter.

use crate::error::Error;
use crate::random::{bit_mask, Purpose, RandomSource};

/// Sequence counter that increments while the timestamp stands still and
/// resets to a fresh random value once it advances.
///
/// The reset draw is one bit narrower than the counter so increments have
/// headroom before wrapping. Overflow past the counter width wraps silently;
/// catching the resulting ordering violation is the enclosing generator's
/// job.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Counter {
    bits: u32,
    max_increment_bits: Option<u32>,
    mask: u128,
    last_timestamp: Option<u128>,
    value: Option<u128>,
}

impl Counter {
    /// Creates a counter of `bits` width.
    ///
    /// A width of zero disables the counter entirely (every value is zero).
    /// Otherwise `max_increment_bits` selects the increment policy: `1` adds
    /// exactly one per repeated timestamp, wider settings add a random
    /// positive value below `2^max_increment_bits`.
    pub fn new(bits: u32, max_increment_bits: Option<u32>) -> Result<Self, Error> {
        Self::seeded(bits, max_increment_bits, None, None)
    }

    /// Creates a counter resuming a previously issued `(timestamp, counter)`
    /// pair, so a monotonic sequence can continue across restarts.
    pub fn seeded(
        bits: u32,
        max_increment_bits: Option<u32>,
        last_timestamp: Option<u128>,
        value: Option<u128>,
    ) -> Result<Self, Error> {
        if bits > 128 {
            return Err(Error::InvalidConfiguration(format!(
                "counter width must be at most 128 bits, not {}",
                bits
            )));
        }
        if bits > 0 {
            let increment = max_increment_bits.ok_or_else(|| {
                Error::InvalidConfiguration(
                    "max_increment_bits must be set when the counter width is nonzero".into(),
                )
            })?;
            if !(1..=bits).contains(&increment) {
                return Err(Error::InvalidConfiguration(format!(
                    "max_increment_bits must be within 1..={}, not {}",
                    bits, increment
                )));
            }
        }

        let value = match value {
            Some(_) => value,
            None if bits == 0 => Some(0),
            None => None,
        };
        Ok(Self {
            bits,
            max_increment_bits,
            mask: bit_mask(bits),
            last_timestamp,
            value,
        })
    }

    /// Width of the counter field.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Returns the next counter value for `timestamp`.
    ///
    /// A timestamp at or below the previous one increments; a fresh
    /// timestamp resets.
    pub fn next<R: RandomSource>(&mut self, timestamp: u128, rng: &mut R) -> u128 {
        if self.bits == 0 {
            return 0;
        }

        let raw = match self.last_timestamp {
            Some(last) if timestamp <= last => {
                let current = match self.value {
                    Some(value) => value,
                    None => self.reset_value(rng),
                };
                current + self.increment(rng)
            }
            _ => self.reset_value(rng),
        };

        let value = raw & self.mask;
        self.value = Some(value);
        self.last_timestamp = Some(timestamp);
        value
    }

    // one reserved bit of headroom above the reset value
    fn reset_value<R: RandomSource>(&self, rng: &mut R) -> u128 {
        rng.random_bits(self.bits - 1, Purpose::CounterReset)
    }

    fn increment<R: RandomSource>(&self, rng: &mut R) -> u128 {
        // validated at construction for nonzero-width counters
        let bits = self.max_increment_bits.unwrap_or(1);
        if bits == 1 {
            return 1;
        }
        loop {
            let increment = rng.random_bits(bits, Purpose::CounterIncrement);
            if increment > 0 {
                return increment;
            }
        }
    }
}
