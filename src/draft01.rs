//! Layouts from draft-peabody-dispatch-new-uuid-format-01 and -02.
//!
//! The early drafts encoded the v7 timestamp as 36 bits of epoch seconds
//! followed by a sub-second fraction whose width picks the precision, and
//! gave v8 five fixed fields instead of the later custom trio. Later drafts
//! replaced both; these codecs stay so identifiers minted under the old
//! layouts keep parsing, and generation is retained because the layouts run
//! on the same counter and clock machinery as the current ones.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::clock::{self, UuidClock};
use crate::counter::Counter;
use crate::error::Error;
use crate::generator::MonotonicGuard;
use crate::random::{bit_mask, RandomField, RandomSource};
use crate::Uuid;

const VERSION_V7: u8 = 7;
const VERSION_V8: u8 = 8;
const SECONDS_BITS: u32 = 36;

/// Timestamp granularity of the draft-01 v7 layout.
///
/// The granularity decides how the 74 non-constant bits split between the
/// sub-second fraction, the sequence counter, and random filler.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Precision {
    /// 48-bit timestamp, 12-bit sequence, 52 random bits.
    Milli,
    /// 60-bit timestamp, 14-bit sequence, 48 random bits.
    Micro,
    /// 74-bit timestamp, 8-bit sequence, 40 random bits.
    Nano,
}

impl Precision {
    /// Width of the sequence counter.
    pub fn seq_bits(self) -> u32 {
        match self {
            Self::Milli => 12,
            Self::Micro => 14,
            Self::Nano => 8,
        }
    }

    /// Width of the trailing random field.
    pub fn random_bits(self) -> u32 {
        match self {
            Self::Milli => 52,
            Self::Micro => 48,
            Self::Nano => 40,
        }
    }

    /// Width of the composite timestamp.
    pub fn clock_bits(self) -> u32 {
        match self {
            Self::Milli => 48,
            Self::Micro => 60,
            Self::Nano => 74,
        }
    }

    fn least_tick(self) -> Duration {
        match self {
            Self::Milli => Duration::from_millis(1),
            Self::Micro => Duration::from_micros(1),
            Self::Nano => Duration::from_nanos(1),
        }
    }

    fn read(self, clock: &mut impl UuidClock) -> u128 {
        match self {
            Self::Milli => clock.epoch_36bit_seconds_12bit_millis(),
            Self::Micro => clock.epoch_36bit_seconds_24bit_micros(),
            Self::Nano => clock.epoch_36bit_seconds_38bit_nanos(),
        }
    }

    fn fraction_bits(self) -> u32 {
        self.clock_bits() - SECONDS_BITS
    }
}

/// Monotonic generator for the draft-01 v7 layout.
pub struct PrecisionV7Generator<C, R> {
    precision: Precision,
    clock: C,
    rng: R,
    counter: Counter,
    random: RandomField,
    guard: MonotonicGuard,
}

impl<C: UuidClock, R: RandomSource> PrecisionV7Generator<C, R> {
    /// Creates a generator instance.
    pub fn new(precision: Precision, raise_on_backward: bool, clock: C, rng: R) -> Self {
        let counter =
            Counter::new(precision.seq_bits(), Some(1)).expect("the draft-01 layouts are valid");
        Self {
            precision,
            clock,
            rng,
            counter,
            random: RandomField::new(precision.random_bits()),
            guard: MonotonicGuard::new(precision.least_tick(), raise_on_backward),
        }
    }

    /// Generates a new UUIDv7 object in the draft-01 layout.
    pub fn generate(&mut self) -> Result<Uuid, Error> {
        let Self {
            precision,
            clock,
            rng,
            counter,
            random,
            guard,
        } = self;
        guard.run(|| {
            let timestamp = precision.read(clock) & bit_mask(precision.clock_bits());
            let seq = counter.next(timestamp, rng) as u16;
            let rand = random.next(rng) as u64;
            encode_v7(*precision, timestamp, seq, rand)
        })
    }
}

/// Packs a composite timestamp, sequence, and random filler into the
/// draft-01 v7 layout for `precision`. Inputs are masked to their widths.
pub fn encode_v7(precision: Precision, timestamp: u128, seq: u16, rand: u64) -> Uuid {
    let timestamp = timestamp & bit_mask(precision.clock_bits());
    let seq = seq as u128 & bit_mask(precision.seq_bits());
    // the milli layout has no field between var and the end, so its random
    // filler may occupy all 62 trailing bits even though generators draw 52
    let rand_field_bits = match precision {
        Precision::Milli => 62,
        _ => precision.random_bits(),
    };
    let rand = rand as u128 & bit_mask(rand_field_bits);
    let unixts = (timestamp >> precision.fraction_bits()) & bit_mask(SECONDS_BITS);
    let ver = VERSION_V7 as u128;
    let var = 0b10u128;

    let value = match precision {
        Precision::Milli => {
            let msec = timestamp & bit_mask(12);
            (unixts << 92) | (msec << 80) | (ver << 76) | (seq << 64) | (var << 62) | rand
        }
        Precision::Micro => {
            let usec_a = (timestamp >> 12) & bit_mask(12);
            let usec_b = timestamp & bit_mask(12);
            (unixts << 92)
                | (usec_a << 80)
                | (ver << 76)
                | (usec_b << 64)
                | (var << 62)
                | (seq << 48)
                | rand
        }
        Precision::Nano => {
            let nsec_a = (timestamp >> 26) & bit_mask(12);
            let nsec_b = (timestamp >> 14) & bit_mask(12);
            let nsec_c = timestamp & bit_mask(14);
            (unixts << 92)
                | (nsec_a << 80)
                | (ver << 76)
                | (nsec_b << 64)
                | (var << 62)
                | (nsec_c << 48)
                | (seq << 40)
                | rand
        }
    };
    Uuid::from_u128(value)
}

/// Fields recovered from a draft-01 v7 identifier.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct PrecisionV7Fields {
    /// 36-bit epoch seconds.
    pub unixts: u64,
    /// Sub-second fraction at the precision's resolution.
    pub subsec: u64,
    pub variant: u8,
    pub seq: u16,
    pub rand: u64,
    /// The reassembled composite timestamp.
    pub timestamp: u128,
    /// Calendar rendition of the timestamp.
    pub time: DateTime<Utc>,
}

/// Extracts the draft-01 v7 fields. The precision is not recoverable from
/// the wire layout and must match the one used at generation time.
pub fn decode_v7(uuid: Uuid, precision: Precision) -> Result<PrecisionV7Fields, Error> {
    let value = uuid.as_u128();
    let version = ((value >> 76) & 0xF) as u8;
    if version != VERSION_V7 {
        return Err(Error::FormatMismatch {
            expected: VERSION_V7,
            actual: version,
        });
    }

    let unixts = ((value >> 92) & bit_mask(SECONDS_BITS)) as u64;
    let variant = ((value >> 62) & 0b11) as u8;
    let (subsec, seq, rand) = match precision {
        Precision::Milli => (
            ((value >> 80) & bit_mask(12)) as u64,
            ((value >> 64) & bit_mask(12)) as u16,
            (value & bit_mask(62)) as u64,
        ),
        Precision::Micro => {
            let usec_a = (value >> 80) & bit_mask(12);
            let usec_b = (value >> 64) & bit_mask(12);
            (
                ((usec_a << 12) | usec_b) as u64,
                ((value >> 48) & bit_mask(14)) as u16,
                (value & bit_mask(48)) as u64,
            )
        }
        Precision::Nano => {
            let nsec_a = (value >> 80) & bit_mask(12);
            let nsec_b = (value >> 64) & bit_mask(12);
            let nsec_c = (value >> 48) & bit_mask(14);
            (
                ((nsec_a << 26) | (nsec_b << 14) | nsec_c) as u64,
                ((value >> 40) & bit_mask(8)) as u16,
                (value & bit_mask(40)) as u64,
            )
        }
    };

    let timestamp = ((unixts as u128) << precision.fraction_bits()) | subsec as u128;
    let nanos = match precision {
        Precision::Milli => (unixts as u128) * 1_000_000_000 + (subsec as u128) * 1_000_000,
        Precision::Micro => (unixts as u128) * 1_000_000_000 + (subsec as u128) * 1_000,
        Precision::Nano => (unixts as u128) * 1_000_000_000 + subsec as u128,
    };
    let time = clock::datetime_from_epoch_nanos(nanos)
        .expect("a 36-bit second count is within the calendar range");

    Ok(PrecisionV7Fields {
        unixts,
        subsec,
        variant,
        seq,
        rand,
        timestamp,
        time,
    })
}

/// Fields of the draft-01 five-field v8 layout.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct FiveFieldV8 {
    /// 32-bit timestamp part.
    pub timestamp_32: u32,
    /// The next 16 timestamp bits (the draft names the field after the
    /// running total of 48).
    pub timestamp_48: u16,
    /// 12 bits of additional timestamp or sequence.
    pub time_or_seq: u16,
    /// 8 bits of sequence or node.
    pub seq_or_node: u8,
    /// 54-bit node.
    pub node: u64,
}

/// Packs the draft-01 five-field v8 layout, masking each part to its width.
///
/// The draft leaves monotonicity entirely to the caller: the library neither
/// counts nor checks ordering for this layout.
pub fn encode_v8(fields: FiveFieldV8) -> Uuid {
    let value = ((fields.timestamp_32 as u128) << 96)
        | ((fields.timestamp_48 as u128) << 80)
        | ((VERSION_V8 as u128) << 76)
        | ((fields.time_or_seq as u128 & bit_mask(12)) << 64)
        | (0b10u128 << 62)
        | ((fields.seq_or_node as u128) << 54)
        | (fields.node as u128 & bit_mask(54));
    Uuid::from_u128(value)
}

/// Extracts the draft-01 five-field v8 parts.
pub fn decode_v8(uuid: Uuid) -> Result<(FiveFieldV8, u8), Error> {
    let value = uuid.as_u128();
    let version = ((value >> 76) & 0xF) as u8;
    if version != VERSION_V8 {
        return Err(Error::FormatMismatch {
            expected: VERSION_V8,
            actual: version,
        });
    }

    let fields = FiveFieldV8 {
        timestamp_32: ((value >> 96) & bit_mask(32)) as u32,
        timestamp_48: ((value >> 80) & bit_mask(16)) as u16,
        time_or_seq: ((value >> 64) & bit_mask(12)) as u16,
        seq_or_node: ((value >> 54) & bit_mask(8)) as u8,
        node: (value & bit_mask(54)) as u64,
    };
    let variant = ((value >> 62) & 0b11) as u8;
    Ok((fields, variant))
}
