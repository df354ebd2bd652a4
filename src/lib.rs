//! Generation and parsing of the time-sortable UUIDv6/v7/v8 formats across
//! the draft revisions that defined them.
//!
//! ```rust
//! let uuid = newnewid::uuid7()?;
//! println!("{}", uuid); // e.g. "017f22e2-79b0-7cc3-98c4-dc0c0c07398f"
//! println!("{:?}", uuid.as_bytes()); // as 16-byte big-endian array
//! # Ok::<(), newnewid::Error>(())
//! ```
//!
//! # Field and bit layout
//!
//! The flagship layout is UUIDv7:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                          unix_ts_ms                           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |          unix_ts_ms           |  ver  |        rand_a         |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |var|                        rand_b                             |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                            rand_b                             |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! The 74 bits across `rand_a` and `rand_b` are partitioned by a
//! [`Uuid7Option`] into an optional sub-millisecond time fraction, an
//! optional counter, and trailing random bits; the named "methods" 0 through
//! 4 of the drafts are preset partitions ([`METHOD_0_NO_COUNTER`] and
//! friends). UUIDv6 carries a Gregorian 100-nanosecond timestamp with a
//! 14-bit clock sequence, and UUIDv8 packs three caller-defined fields.
//!
//! # Monotonicity
//!
//! Every generator instance guarantees that successive identifiers strictly
//! increase as raw 128-bit integers, even while the wall clock stands still
//! or moves backward: counters absorb repeated timestamps, and a candidate
//! that would sort at or below its predecessor makes the generator wait one
//! clock tick of the format and retry (or fail, when configured to raise on
//! a backward clock). Routing every call site with the same configuration to
//! the same generator is what extends the guarantee process-wide; the
//! entry-point functions do that through a global [`GeneratorRegistry`].
//!
//! ```rust
//! use newnewid::{GeneratorRegistry, METHOD_1_FIXED_LENGTH_DEDICATED_COUNTER_BITS_26};
//!
//! let registry = GeneratorRegistry::new();
//! let a = registry.uuid7_with(METHOD_1_FIXED_LENGTH_DEDICATED_COUNTER_BITS_26)?;
//! let b = registry.uuid7_with(METHOD_1_FIXED_LENGTH_DEDICATED_COUNTER_BITS_26)?;
//! assert!(b > a);
//! # Ok::<(), newnewid::Error>(())
//! ```
//!
//! # Parsing
//!
//! [`parse`] inspects the version nibble and routes to the codec a draft
//! revision registered for it. The v7 payload partition is not recoverable
//! from the wire layout, so parsing a v7 identifier requires the same
//! [`Uuid7Option`] (or draft-01 [`Precision`](draft01::Precision)) it was
//! generated with.
//!
//! ```rust
//! use newnewid::{parse, ParseOptions, ParsedUuid, Spec, METHOD_1_FIXED_LENGTH_DEDICATED_COUNTER_BITS_12};
//!
//! let uuid = "017f22e2-79b0-7cc3-98c4-dc0c0c07398f".parse()?;
//! let options = ParseOptions {
//!     uuid7: Some(METHOD_1_FIXED_LENGTH_DEDICATED_COUNTER_BITS_12),
//!     ..Default::default()
//! };
//! let ParsedUuid::V7(fields) = parse(uuid, Spec::LATEST, &options)? else {
//!     unreachable!();
//! };
//! assert_eq!(fields.counter, Some(0xcc3));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod clock;
mod counter;
mod error;
mod generator;
mod id;
mod random;
mod registry;

pub mod draft01;
pub mod parser;
pub mod v6;
pub mod v7;
pub mod v8;

#[cfg(test)]
mod testutil;

pub use clock::{
    datetime_from_epoch_100ns, datetime_from_epoch_micros, datetime_from_epoch_millis,
    datetime_from_epoch_nanos, datetime_from_epoch_seconds, datetime_from_gregorian_100ns,
    SystemClock, UuidClock, GREGORIAN_OFFSET,
};
pub use counter::Counter;
pub use error::{Error, VersionKind};
pub use id::{ParseError, Uuid, Variant};
pub use random::{Adapter, Purpose, RandomField, RandomSource, SystemRandom};
pub use registry::{
    max_uuid, nil_uuid, ulid_compatible, uuid4, uuid6, uuid6_with, uuid7, uuid7_with,
    GeneratorRegistry,
};

#[doc(inline)]
pub use parser::{parse, ParseOptions, ParsedUuid, Spec};
#[doc(inline)]
pub use v6::{NodeId, Uuid6Option, V6Generator};
#[doc(inline)]
pub use v7::{
    Uuid7Option, V7Generator, METHOD_0_NO_COUNTER,
    METHOD_1_FIXED_LENGTH_DEDICATED_COUNTER_BITS_12,
    METHOD_1_FIXED_LENGTH_DEDICATED_COUNTER_BITS_26,
    METHOD_1_FIXED_LENGTH_DEDICATED_COUNTER_BITS_42, METHOD_2_MONOTONIC_RANDOM_62_BITS,
    METHOD_3_RERANDOMIZE_UNTIL_MONOTONIC, METHOD_4_INCREASED_CLOCK_PRECISION_12_BITS,
    METHOD_4_INCREASED_CLOCK_PRECISION_12_BITS_WITH_COUNTER_14_BITS, ULID_COMPATIBLE,
};
#[doc(inline)]
pub use v8::uuid8;
