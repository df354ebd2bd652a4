//! Deterministic clock and entropy doubles shared by the unit tests.

use crate::clock::UuidClock;
use crate::random::{Purpose, RandomSource};

/// Nanoseconds since the Unix epoch at 2022-02-22T14:22:22-05:00.
pub(crate) const TEST_EPOCH_NANOS: u128 = 1_645_557_742_000_000_000;

/// Clock answering from a canned sequence of nanosecond readings, cycling
/// once the sequence is exhausted.
pub(crate) struct FrozenClock {
    readings: Vec<u128>,
    index: usize,
}

impl FrozenClock {
    pub(crate) fn at(nanos: u128) -> Self {
        Self::cycle(vec![nanos])
    }

    pub(crate) fn cycle(readings: Vec<u128>) -> Self {
        assert!(!readings.is_empty());
        Self { readings, index: 0 }
    }
}

impl UuidClock for FrozenClock {
    fn epoch_nanos(&mut self) -> u128 {
        let value = self.readings[self.index % self.readings.len()];
        self.index += 1;
        value
    }
}

/// Random source answering each draw purpose from its own canned sequence,
/// cycling independently per purpose. Canned values are returned verbatim,
/// ignoring the requested width, so tests can pin wide fields directly.
pub(crate) struct FrozenRandom {
    counter_reset: Vec<u128>,
    counter_increment: Vec<u128>,
    random_field: Vec<u128>,
    indexes: [usize; 3],
}

impl FrozenRandom {
    pub(crate) fn new() -> Self {
        Self {
            counter_reset: vec![0],
            counter_increment: vec![1],
            random_field: vec![0],
            indexes: [0; 3],
        }
    }

    pub(crate) fn counter_reset(mut self, values: Vec<u128>) -> Self {
        assert!(!values.is_empty());
        self.counter_reset = values;
        self
    }

    pub(crate) fn counter_increment(mut self, values: Vec<u128>) -> Self {
        assert!(!values.is_empty());
        self.counter_increment = values;
        self
    }

    pub(crate) fn random_field(mut self, values: Vec<u128>) -> Self {
        assert!(!values.is_empty());
        self.random_field = values;
        self
    }
}

impl RandomSource for FrozenRandom {
    fn random_bits(&mut self, _bits: u32, purpose: Purpose) -> u128 {
        let (values, index) = match purpose {
            Purpose::CounterReset => (&self.counter_reset, &mut self.indexes[0]),
            Purpose::CounterIncrement => (&self.counter_increment, &mut self.indexes[1]),
            Purpose::RandomField => (&self.random_field, &mut self.indexes[2]),
        };
        let value = values[*index % values.len()];
        *index += 1;
        value
    }
}
