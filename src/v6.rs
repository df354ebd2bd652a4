//! UUIDv6, the sortable reordering of the Gregorian-timestamp layout.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                           time_high                           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |           time_mid            |  ver  |       time_low        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |var|         clock_seq         |             node              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                              node                             |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! The 60-bit timestamp counts 100-nanosecond Gregorian ticks, split so the
//! most significant bits come first and the whole value sorts by creation
//! time. `clock_seq` is a 14-bit counter incremented by one whenever the
//! tick count repeats.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::clock::{self, UuidClock};
use crate::counter::Counter;
use crate::error::Error;
use crate::generator::MonotonicGuard;
use crate::random::{bit_mask, RandomField, RandomSource};
use crate::Uuid;

const VERSION: u8 = 6;
const CLOCK_BITS: u32 = 60;
const CLOCK_SEQ_BITS: u32 = 14;
const NODE_BITS: u32 = 48;
const LEAST_TICK: Duration = Duration::from_nanos(100);

/// Source of the 48-bit node field.
///
/// The recommended source is fresh random bits. Hardware-address discovery
/// is left to the caller; pass the address with [`NodeId::Mac`] to produce
/// the (not recommended) MAC variant.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum NodeId {
    /// Fill the node with fresh random bits on every identifier.
    #[default]
    Random,
    /// Use a fixed hardware address.
    Mac(u64),
}

/// Configuration for a [`V6Generator`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Uuid6Option {
    /// Source of the node field.
    pub node: NodeId,
    /// Fail with [`Error::BackwardClock`] instead of waiting out the clock.
    pub raise_on_backward: bool,
}

enum NodeSource {
    Random(RandomField),
    Mac(u64),
}

/// Monotonic UUIDv6 generator.
///
/// # Examples
///
/// ```rust
/// use newnewid::{SystemClock, SystemRandom, Uuid6Option, V6Generator};
///
/// let mut g = V6Generator::new(
///     Uuid6Option::default(),
///     SystemClock,
///     SystemRandom::default(),
/// );
/// println!("{}", g.generate()?);
/// # Ok::<(), newnewid::Error>(())
/// ```
pub struct V6Generator<C, R> {
    clock: C,
    rng: R,
    counter: Counter,
    node: NodeSource,
    guard: MonotonicGuard,
}

impl<C: UuidClock, R: RandomSource> V6Generator<C, R> {
    /// Creates a generator instance.
    pub fn new(option: Uuid6Option, clock: C, rng: R) -> Self {
        let counter = Counter::new(CLOCK_SEQ_BITS, Some(1)).expect("the v6 counter layout is valid");
        Self {
            clock,
            rng,
            counter,
            node: Self::node_source(option.node),
            guard: MonotonicGuard::new(LEAST_TICK, option.raise_on_backward),
        }
    }

    /// Resumes a generator from the last identifier it issued, re-seeding
    /// the clock sequence so the monotonic order continues across restarts.
    pub fn resume(option: Uuid6Option, clock: C, rng: R, last: Uuid) -> Result<Self, Error> {
        let fields = decode(last)?;
        let counter = Counter::seeded(
            CLOCK_SEQ_BITS,
            Some(1),
            Some(fields.gregorian_100ns as u128),
            Some(fields.clock_seq as u128),
        )?;
        Ok(Self {
            clock,
            rng,
            counter,
            node: Self::node_source(option.node),
            guard: MonotonicGuard::resume(LEAST_TICK, option.raise_on_backward, last),
        })
    }

    fn node_source(node: NodeId) -> NodeSource {
        match node {
            NodeId::Random => NodeSource::Random(RandomField::new(NODE_BITS)),
            NodeId::Mac(address) => NodeSource::Mac(address & bit_mask(NODE_BITS) as u64),
        }
    }

    /// Generates a new UUIDv6 object.
    pub fn generate(&mut self) -> Result<Uuid, Error> {
        let Self {
            clock,
            rng,
            counter,
            node,
            guard,
        } = self;
        guard.run(|| {
            let timestamp = clock.gregorian_100ns() & bit_mask(CLOCK_BITS);
            let clock_seq = counter.next(timestamp, rng) as u16;
            let node = match node {
                NodeSource::Random(field) => field.next(rng) as u64,
                NodeSource::Mac(address) => *address,
            };
            encode(timestamp as u64, clock_seq, node)
        })
    }
}

/// Packs a 60-bit Gregorian tick count, clock sequence, and node into the
/// UUIDv6 bit layout. Inputs are masked to their field widths.
pub fn encode(gregorian_100ns: u64, clock_seq: u16, node: u64) -> Uuid {
    let time = gregorian_100ns as u128 & bit_mask(CLOCK_BITS);
    let time_high = (time >> 28) & 0xFFFF_FFFF;
    let time_mid = (time >> 12) & 0xFFFF;
    let time_low = time & 0x0FFF;
    let value = (time_high << 96)
        | (time_mid << 80)
        | ((VERSION as u128) << 76)
        | (time_low << 64)
        | (0b10u128 << 62)
        | ((clock_seq as u128 & bit_mask(CLOCK_SEQ_BITS)) << 48)
        | (node as u128 & bit_mask(NODE_BITS));
    Uuid::from_u128(value)
}

/// Fields recovered from a UUIDv6.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Uuid6Fields {
    pub time_high: u32,
    pub time_mid: u16,
    pub time_low: u16,
    pub variant: u8,
    pub clock_seq: u16,
    pub node: u64,
    /// The reassembled 60-bit timestamp.
    pub gregorian_100ns: u64,
    /// Calendar rendition of the timestamp.
    pub time: DateTime<Utc>,
}

/// Extracts the UUIDv6 fields, failing with [`Error::FormatMismatch`] when
/// the version nibble is not 6.
pub fn decode(uuid: Uuid) -> Result<Uuid6Fields, Error> {
    let value = uuid.as_u128();
    let version = ((value >> 76) & 0xF) as u8;
    if version != VERSION {
        return Err(Error::FormatMismatch {
            expected: VERSION,
            actual: version,
        });
    }

    let time_high = ((value >> 96) & 0xFFFF_FFFF) as u32;
    let time_mid = ((value >> 80) & 0xFFFF) as u16;
    let time_low = ((value >> 64) & 0x0FFF) as u16;
    let variant = ((value >> 62) & 0b11) as u8;
    let clock_seq = ((value >> 48) & bit_mask(CLOCK_SEQ_BITS)) as u16;
    let node = (value & bit_mask(NODE_BITS)) as u64;

    let gregorian_100ns =
        ((time_high as u64) << 28) | ((time_mid as u64) << 12) | time_low as u64;
    let time = clock::datetime_from_gregorian_100ns(gregorian_100ns as u128)
        .expect("a 60-bit tick count is within the calendar range");

    Ok(Uuid6Fields {
        time_high,
        time_mid,
        time_low,
        variant,
        clock_seq,
        node,
        gregorian_100ns,
        time,
    })
}
