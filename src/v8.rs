//! UUIDv8, the fully caller-defined layout.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                           custom_a                            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |          custom_a             |  ver  |       custom_b        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |var|                       custom_c                            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                           custom_c                            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! The 122 payload bits carry whatever the caller wants, stored as 48-bit,
//! 12-bit, and 62-bit parts. The library only packs and unpacks; keeping
//! v8 identifiers sortable (or unique) is entirely the caller's business.

use crate::error::Error;
use crate::random::bit_mask;
use crate::Uuid;

const VERSION: u8 = 8;

/// Generates a UUIDv8 object from the three custom parts, masked to their
/// field widths.
///
/// # Examples
///
/// ```rust
/// use newnewid::uuid8;
///
/// let uuid = uuid8(0x320c3d4dcc00, 0x75b, 0xec932d5f69181c0);
/// assert_eq!(uuid.to_string(), "320c3d4d-cc00-875b-8ec9-32d5f69181c0");
/// ```
pub fn uuid8(custom_a: u64, custom_b: u16, custom_c: u64) -> Uuid {
    Uuid::from_fields_v8(
        custom_a & bit_mask(48) as u64,
        custom_b & bit_mask(12) as u16,
        custom_c & bit_mask(62) as u64,
    )
}

/// Fields recovered from a UUIDv8.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Uuid8Fields {
    pub custom_a: u64,
    pub custom_b: u16,
    pub variant: u8,
    pub custom_c: u64,
}

/// Extracts the UUIDv8 parts, failing with [`Error::FormatMismatch`] when
/// the version nibble is not 8.
pub fn decode(uuid: Uuid) -> Result<Uuid8Fields, Error> {
    let value = uuid.as_u128();
    let version = ((value >> 76) & 0xF) as u8;
    if version != VERSION {
        return Err(Error::FormatMismatch {
            expected: VERSION,
            actual: version,
        });
    }

    Ok(Uuid8Fields {
        custom_a: ((value >> 80) & bit_mask(48)) as u64,
        custom_b: ((value >> 64) & bit_mask(12)) as u16,
        variant: ((value >> 62) & 0b11) as u8,
        custom_c: (value & bit_mask(62)) as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::{decode, uuid8, Uuid8Fields};
    use crate::error::Error;
    use crate::{Uuid, Variant};

    /// Reproduces the published vector
    #[test]
    fn reproduces_the_published_vector() {
        let uuid = uuid8(0x320C3D4DCC00, 0x75B, 0xEC932D5F69181C0);
        assert_eq!(
            uuid,
            "320c3d4d-cc00-875b-8ec9-32d5f69181c0".parse().unwrap()
        );
        assert_eq!(uuid.version(), Some(8));
        assert_eq!(uuid.variant(), Variant::Var10);
    }

    /// Masks oversized inputs instead of failing
    #[test]
    fn masks_oversized_inputs_instead_of_failing() {
        let uuid = uuid8(u64::MAX, u16::MAX, u64::MAX);
        assert_eq!(
            uuid,
            "ffffffff-ffff-8fff-bfff-ffffffffffff".parse().unwrap()
        );
    }

    /// Round-trips the custom parts at field boundaries
    #[test]
    fn round_trips_the_custom_parts_at_field_boundaries() {
        let cases = [
            (0u64, 0u16, 0u64),
            (1, 1, 1),
            ((1 << 48) - 1, (1 << 12) - 1, (1 << 62) - 1),
            ((1 << 48) - 2, (1 << 12) - 2, (1 << 62) - 2),
            (0x320C3D4DCC00, 0x75B, 0xEC932D5F69181C0),
        ];
        for (custom_a, custom_b, custom_c) in cases {
            assert_eq!(
                decode(uuid8(custom_a, custom_b, custom_c)),
                Ok(Uuid8Fields {
                    custom_a,
                    custom_b,
                    variant: 0b10,
                    custom_c,
                })
            );
        }
    }

    /// Refuses to decode other versions
    #[test]
    fn refuses_to_decode_other_versions() {
        let v7 = Uuid::from_fields_v7(1, 2, 3);
        assert_eq!(
            decode(v7),
            Err(Error::FormatMismatch {
                expected: 8,
                actual: 7,
            })
        );
    }
}
