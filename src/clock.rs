//! Wall-clock readings at the encodings used by the identifier layouts.

use chrono::{DateTime, Utc};

/// 100-nanosecond intervals between the Gregorian reform (1582-10-15) and
/// the Unix epoch (1970-01-01).
pub const GREGORIAN_OFFSET: u128 = 0x01B2_1DD2_1381_4000;

const SECONDS_36_BITS: u128 = 0x000F_FFFF_FFFF;

/// Source of the current wall-clock time.
///
/// [`epoch_nanos`](UuidClock::epoch_nanos) is the only sampled reading;
/// every other encoding is derived from it, so the sub-readings of a single
/// generation call can never disagree with each other. Implementations are
/// expected to be monotonic only to the extent the underlying clock is; no
/// smoothing is applied here.
pub trait UuidClock {
    /// Nanoseconds since the Unix epoch.
    fn epoch_nanos(&mut self) -> u128;

    /// Seconds since the Unix epoch.
    fn epoch_seconds(&mut self) -> u128 {
        self.epoch_nanos() / 1_000_000_000
    }

    /// Milliseconds since the Unix epoch.
    fn epoch_millis(&mut self) -> u128 {
        self.epoch_nanos() / 1_000_000
    }

    /// 100-nanosecond ticks since the Unix epoch.
    fn epoch_100ns(&mut self) -> u128 {
        self.epoch_nanos() / 100
    }

    /// 100-nanosecond ticks since the Gregorian reform.
    fn gregorian_100ns(&mut self) -> u128 {
        self.epoch_100ns() + GREGORIAN_OFFSET
    }

    /// 36-bit epoch seconds concatenated with 12-bit milliseconds.
    fn epoch_36bit_seconds_12bit_millis(&mut self) -> u128 {
        let millis = self.epoch_millis();
        (((millis / 1_000) & SECONDS_36_BITS) << 12) | (millis % 1_000)
    }

    /// 36-bit epoch seconds concatenated with 24-bit microseconds.
    fn epoch_36bit_seconds_24bit_micros(&mut self) -> u128 {
        let micros = self.epoch_nanos() / 1_000;
        (((micros / 1_000_000) & SECONDS_36_BITS) << 24) | (micros % 1_000_000)
    }

    /// 36-bit epoch seconds concatenated with 38-bit nanoseconds.
    fn epoch_36bit_seconds_38bit_nanos(&mut self) -> u128 {
        let nanos = self.epoch_nanos();
        (((nanos / 1_000_000_000) & SECONDS_36_BITS) << 38) | (nanos % 1_000_000_000)
    }
}

/// The operating-system clock.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct SystemClock;

impl UuidClock for SystemClock {
    fn epoch_nanos(&mut self) -> u128 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock may have gone backwards")
            .as_nanos()
    }
}

/// Converts epoch seconds to a calendar timestamp.
pub fn datetime_from_epoch_seconds(seconds: u128) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(i64::try_from(seconds).ok()?, 0)
}

/// Converts epoch milliseconds to a calendar timestamp.
pub fn datetime_from_epoch_millis(millis: u128) -> Option<DateTime<Utc>> {
    datetime_from_epoch_nanos(millis.checked_mul(1_000_000)?)
}

/// Converts epoch microseconds to a calendar timestamp.
pub fn datetime_from_epoch_micros(micros: u128) -> Option<DateTime<Utc>> {
    datetime_from_epoch_nanos(micros.checked_mul(1_000)?)
}

/// Converts epoch nanoseconds to a calendar timestamp.
pub fn datetime_from_epoch_nanos(nanos: u128) -> Option<DateTime<Utc>> {
    let seconds = i64::try_from(nanos / 1_000_000_000).ok()?;
    DateTime::from_timestamp(seconds, (nanos % 1_000_000_000) as u32)
}

/// Converts epoch 100-nanosecond ticks to a calendar timestamp.
pub fn datetime_from_epoch_100ns(ticks: u128) -> Option<DateTime<Utc>> {
    datetime_from_epoch_nanos(ticks.checked_mul(100)?)
}

/// Converts Gregorian 100-nanosecond ticks to a calendar timestamp.
///
/// Tick values below [`GREGORIAN_OFFSET`] fall before the Unix epoch and are
/// converted with Euclidean division so the result stays exact.
pub fn datetime_from_gregorian_100ns(ticks: u128) -> Option<DateTime<Utc>> {
    let nanos = i128::try_from(ticks)
        .ok()?
        .checked_sub(GREGORIAN_OFFSET as i128)?
        .checked_mul(100)?;
    let seconds = i64::try_from(nanos.div_euclid(1_000_000_000)).ok()?;
    DateTime::from_timestamp(seconds, nanos.rem_euclid(1_000_000_000) as u32)
}
