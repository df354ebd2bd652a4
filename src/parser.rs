//! Routing a 128-bit value to the codec registered for its version under a
//! chosen draft revision.
//!
//! Several drafts of the new UUID formats shipped mutually incompatible
//! layouts under the same version numbers. Each [`Spec`] value names one
//! revision and binds the version nibbles to the codecs that revision
//! defined; revisions that merely re-exported their predecessor share the
//! same bindings instead of duplicating code. The lookup is explicit: an
//! unbound version resolves to [`Error::UnsupportedVersion`], never a
//! fall-through.

use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::clock;
use crate::draft01::{self, FiveFieldV8, Precision, PrecisionV7Fields};
use crate::error::{Error, VersionKind};
use crate::random::bit_mask;
use crate::v6::{self, Uuid6Fields};
use crate::v7::{self, Uuid7Fields, Uuid7Option};
use crate::v8::{self, Uuid8Fields};
use crate::Uuid;

/// A draft revision of the new UUID formats.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Spec {
    DraftPeabody01,
    DraftPeabody02,
    DraftPeabody03,
    DraftPeabody04,
    DraftRfc4122Bis00,
    DraftRfc4122Bis01,
    DraftRfc4122Bis02,
    DraftRfc4122Bis03,
}

impl Spec {
    /// The revision `"latest"` resolves to.
    pub const LATEST: Spec = Spec::DraftRfc4122Bis03;

    /// The draft name of this revision.
    pub fn name(self) -> &'static str {
        match self {
            Self::DraftPeabody01 => "draft-peabody-dispatch-new-uuid-format-01",
            Self::DraftPeabody02 => "draft-peabody-dispatch-new-uuid-format-02",
            Self::DraftPeabody03 => "draft-peabody-dispatch-new-uuid-format-03",
            Self::DraftPeabody04 => "draft-peabody-dispatch-new-uuid-format-04",
            Self::DraftRfc4122Bis00 => "draft-ietf-uuidrev-rfc4122bis-00",
            Self::DraftRfc4122Bis01 => "draft-ietf-uuidrev-rfc4122bis-01",
            Self::DraftRfc4122Bis02 => "draft-ietf-uuidrev-rfc4122bis-02",
            Self::DraftRfc4122Bis03 => "draft-ietf-uuidrev-rfc4122bis-03",
        }
    }

    fn v7_layout(self) -> V7Layout {
        match self {
            Self::DraftPeabody01 | Self::DraftPeabody02 => V7Layout::Precision,
            _ => V7Layout::Methods,
        }
    }

    fn v8_layout(self) -> V8Layout {
        match self {
            Self::DraftPeabody01 | Self::DraftPeabody02 => V8Layout::FiveField,
            _ => V8Layout::Custom,
        }
    }
}

impl FromStr for Spec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "latest" => Self::LATEST,
            "draft-peabody-dispatch-new-uuid-format-01" => Self::DraftPeabody01,
            "draft-peabody-dispatch-new-uuid-format-02" => Self::DraftPeabody02,
            "draft-peabody-dispatch-new-uuid-format-03" => Self::DraftPeabody03,
            "draft-peabody-dispatch-new-uuid-format-04" => Self::DraftPeabody04,
            "draft-ietf-uuidrev-rfc4122bis-00" => Self::DraftRfc4122Bis00,
            "draft-ietf-uuidrev-rfc4122bis-01" => Self::DraftRfc4122Bis01,
            "draft-ietf-uuidrev-rfc4122bis-02" => Self::DraftRfc4122Bis02,
            "draft-ietf-uuidrev-rfc4122bis-03" => Self::DraftRfc4122Bis03,
            _ => {
                return Err(Error::InvalidConfiguration(format!("unknown spec: {}", s)));
            }
        })
    }
}

enum V7Layout {
    Precision,
    Methods,
}

enum V8Layout {
    FiveField,
    Custom,
}

/// Caller-supplied context for the layouts that do not describe themselves.
#[derive(Copy, Clone, Debug, Default)]
pub struct ParseOptions {
    /// The bit partition the v7 identifier was generated with.
    pub uuid7: Option<Uuid7Option>,
    /// Timestamp granularity of the draft-01 v7 layout.
    pub precision: Option<Precision>,
}

/// Structured fields of a parsed identifier.
#[derive(Clone, PartialEq, Debug)]
pub enum ParsedUuid {
    /// The all-zero sentinel.
    Nil,
    /// The all-one sentinel.
    Max,
    V1 {
        time_low: u32,
        time_mid: u16,
        time_high: u16,
        variant: u8,
        clock_seq: u16,
        node: u64,
        gregorian_100ns: u64,
        time: DateTime<Utc>,
    },
    V3 {
        md5_high: u64,
        md5_mid: u16,
        md5_low: u64,
        variant: u8,
        /// The reassembled 122-bit digest remainder.
        md5: u128,
    },
    V4 {
        random_a: u64,
        random_b: u16,
        random_c: u64,
        variant: u8,
    },
    V5 {
        sha1_high: u64,
        sha1_mid: u16,
        sha1_low: u64,
        variant: u8,
        /// The reassembled 122-bit digest remainder.
        sha1: u128,
    },
    V6(Uuid6Fields),
    V7(Uuid7Fields),
    /// The draft-01 v7 layout.
    V7Precision(PrecisionV7Fields),
    V8(Uuid8Fields),
    /// The draft-01 v8 layout.
    V8FiveField { fields: FiveFieldV8, variant: u8 },
}

/// Parses `uuid` under `spec`, dispatching on the version nibble.
///
/// The nil and max sentinels parse under every spec. A v7 identifier needs
/// the generation-time context in `options` ([`ParseOptions::uuid7`] for the
/// method layouts, [`ParseOptions::precision`] for draft-01); without it the
/// result is [`Error::MissingParameter`].
pub fn parse(uuid: Uuid, spec: Spec, options: &ParseOptions) -> Result<ParsedUuid, Error> {
    let version = VersionKind::of(uuid);
    let unsupported = || Error::UnsupportedVersion {
        spec: spec.name(),
        version,
    };

    match version {
        VersionKind::Nil if uuid == Uuid::NIL => Ok(ParsedUuid::Nil),
        VersionKind::Max if uuid == Uuid::MAX => Ok(ParsedUuid::Max),
        VersionKind::Nil | VersionKind::Max => Err(unsupported()),
        VersionKind::Numbered(1) => Ok(parse_v1(uuid)),
        VersionKind::Numbered(3) => Ok(parse_v3(uuid)),
        VersionKind::Numbered(4) => Ok(parse_v4(uuid)),
        VersionKind::Numbered(5) => Ok(parse_v5(uuid)),
        VersionKind::Numbered(6) => Ok(ParsedUuid::V6(v6::decode(uuid)?)),
        VersionKind::Numbered(7) => match spec.v7_layout() {
            V7Layout::Precision => {
                let precision = options
                    .precision
                    .ok_or(Error::MissingParameter("precision"))?;
                Ok(ParsedUuid::V7Precision(draft01::decode_v7(uuid, precision)?))
            }
            V7Layout::Methods => {
                let option = options.uuid7.ok_or(Error::MissingParameter("uuid7"))?;
                Ok(ParsedUuid::V7(v7::decode(uuid, &option)?))
            }
        },
        VersionKind::Numbered(8) => match spec.v8_layout() {
            V8Layout::FiveField => {
                let (fields, variant) = draft01::decode_v8(uuid)?;
                Ok(ParsedUuid::V8FiveField { fields, variant })
            }
            V8Layout::Custom => Ok(ParsedUuid::V8(v8::decode(uuid)?)),
        },
        VersionKind::Numbered(_) => Err(unsupported()),
    }
}

fn parse_v1(uuid: Uuid) -> ParsedUuid {
    let value = uuid.as_u128();
    let time_low = ((value >> 96) & bit_mask(32)) as u32;
    let time_mid = ((value >> 80) & bit_mask(16)) as u16;
    let time_high = ((value >> 64) & bit_mask(12)) as u16;
    let variant = ((value >> 62) & 0b11) as u8;
    let clock_seq = ((value >> 48) & bit_mask(14)) as u16;
    let node = (value & bit_mask(48)) as u64;

    // v1 stores the low timestamp bits first; reassemble before converting
    let gregorian_100ns =
        ((time_high as u64) << 48) | ((time_mid as u64) << 32) | time_low as u64;
    let time = clock::datetime_from_gregorian_100ns(gregorian_100ns as u128)
        .expect("a 60-bit tick count is within the calendar range");

    ParsedUuid::V1 {
        time_low,
        time_mid,
        time_high,
        variant,
        clock_seq,
        node,
        gregorian_100ns,
        time,
    }
}

fn parse_v3(uuid: Uuid) -> ParsedUuid {
    let (high, mid, low, variant) = split_hash_layout(uuid);
    ParsedUuid::V3 {
        md5_high: high,
        md5_mid: mid,
        md5_low: low,
        variant,
        md5: ((high as u128) << 74) | ((mid as u128) << 62) | low as u128,
    }
}

fn parse_v4(uuid: Uuid) -> ParsedUuid {
    let (random_a, random_b, random_c, variant) = split_hash_layout(uuid);
    ParsedUuid::V4 {
        random_a,
        random_b,
        random_c,
        variant,
    }
}

fn parse_v5(uuid: Uuid) -> ParsedUuid {
    let (high, mid, low, variant) = split_hash_layout(uuid);
    ParsedUuid::V5 {
        sha1_high: high,
        sha1_mid: mid,
        sha1_low: low,
        variant,
        sha1: ((high as u128) << 74) | ((mid as u128) << 62) | low as u128,
    }
}

// the 48/12/62 split shared by the hash-based and random layouts
fn split_hash_layout(uuid: Uuid) -> (u64, u16, u64, u8) {
    let value = uuid.as_u128();
    (
        ((value >> 80) & bit_mask(48)) as u64,
        ((value >> 64) & bit_mask(12)) as u16,
        (value & bit_mask(62)) as u64,
        ((value >> 62) & 0b11) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::{parse, ParseOptions, ParsedUuid, Spec};
    use crate::draft01::Precision;
    use crate::error::{Error, VersionKind};
    use crate::v7::METHOD_1_FIXED_LENGTH_DEDICATED_COUNTER_BITS_12;
    use crate::Uuid;

    fn uuid(text: &str) -> Uuid {
        text.parse().unwrap()
    }

    /// Resolves spec names including the latest alias
    #[test]
    fn resolves_spec_names_including_the_latest_alias() {
        assert_eq!("latest".parse::<Spec>().unwrap(), Spec::LATEST);
        for spec in [
            Spec::DraftPeabody01,
            Spec::DraftPeabody02,
            Spec::DraftPeabody03,
            Spec::DraftPeabody04,
            Spec::DraftRfc4122Bis00,
            Spec::DraftRfc4122Bis01,
            Spec::DraftRfc4122Bis02,
            Spec::DraftRfc4122Bis03,
        ] {
            assert_eq!(spec.name().parse::<Spec>().unwrap(), spec);
        }
        assert!(matches!(
            "draft-nobody-dispatch-anything-99".parse::<Spec>(),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    /// Parses sentinels under every spec
    #[test]
    fn parses_sentinels_under_every_spec() {
        for spec in [Spec::DraftPeabody01, Spec::DraftPeabody03, Spec::LATEST] {
            assert_eq!(
                parse(Uuid::NIL, spec, &ParseOptions::default()),
                Ok(ParsedUuid::Nil)
            );
            assert_eq!(
                parse(Uuid::MAX, spec, &ParseOptions::default()),
                Ok(ParsedUuid::Max)
            );
        }
    }

    /// Rejects sentinel nibbles with a non-sentinel body
    #[test]
    fn rejects_sentinel_nibbles_with_a_non_sentinel_body() {
        let almost_nil = Uuid::from(1u128);
        match parse(almost_nil, Spec::LATEST, &ParseOptions::default()) {
            Err(Error::UnsupportedVersion { version, .. }) => {
                assert_eq!(version, VersionKind::Nil);
            }
            other => panic!("expected UnsupportedVersion, got {:?}", other),
        }

        let almost_max = Uuid::from(u128::MAX - 1);
        assert!(matches!(
            parse(almost_max, Spec::LATEST, &ParseOptions::default()),
            Err(Error::UnsupportedVersion { .. })
        ));
    }

    /// Rejects versions without a registered codec
    #[test]
    fn rejects_versions_without_a_registered_codec() {
        let v2 = Uuid::from(2u128 << 76 | 2u128 << 62);
        match parse(v2, Spec::LATEST, &ParseOptions::default()) {
            Err(Error::UnsupportedVersion { spec, version }) => {
                assert_eq!(spec, "draft-ietf-uuidrev-rfc4122bis-03");
                assert_eq!(version, VersionKind::Numbered(2));
            }
            other => panic!("expected UnsupportedVersion, got {:?}", other),
        }
    }

    /// Requires the generation option to split a v7 payload
    #[test]
    fn requires_the_generation_option_to_split_a_v7_payload() {
        let v7 = uuid("017f22e2-79b0-7cc3-98c4-dc0c0c07398f");
        assert_eq!(
            parse(v7, Spec::LATEST, &ParseOptions::default()),
            Err(Error::MissingParameter("uuid7"))
        );

        let options = ParseOptions {
            uuid7: Some(METHOD_1_FIXED_LENGTH_DEDICATED_COUNTER_BITS_12),
            ..Default::default()
        };
        match parse(v7, Spec::LATEST, &options) {
            Ok(ParsedUuid::V7(fields)) => {
                assert_eq!(fields.unix_ts_ms, 0x17f22e279b0);
                assert_eq!(fields.counter, Some(0xcc3));
                assert_eq!(fields.random, Some(0x18c4dc0c0c07398f));
                assert_eq!(fields.time.to_rfc3339(), "2022-02-22T19:22:22+00:00");
            }
            other => panic!("expected a v7 parse, got {:?}", other),
        }
    }

    /// Splits v7 under the draft-01 precision layout
    #[test]
    fn splits_v7_under_the_draft_01_precision_layout() {
        let v7 = uuid("06113209-430f-783b-89b8-68d0adb7fa01");
        assert_eq!(
            parse(v7, Spec::DraftPeabody01, &ParseOptions::default()),
            Err(Error::MissingParameter("precision"))
        );

        let options = ParseOptions {
            precision: Some(Precision::Milli),
            ..Default::default()
        };
        match parse(v7, Spec::DraftPeabody02, &options) {
            Ok(ParsedUuid::V7Precision(fields)) => {
                assert_eq!(fields.seq, 2107);
                assert_eq!(fields.subsec, 783);
            }
            other => panic!("expected a draft-01 v7 parse, got {:?}", other),
        }
    }

    /// Selects the v8 layout by spec
    #[test]
    fn selects_the_v8_layout_by_spec() {
        let v8 = uuid("320c3d4d-cc00-875b-8ec9-32d5f69181c0");
        match parse(v8, Spec::LATEST, &ParseOptions::default()) {
            Ok(ParsedUuid::V8(fields)) => {
                assert_eq!(fields.custom_a, 0x320c3d4dcc00);
                assert_eq!(fields.custom_b, 0x75b);
                assert_eq!(fields.custom_c, 0xec932d5f69181c0);
            }
            other => panic!("expected a v8 parse, got {:?}", other),
        }
        match parse(v8, Spec::DraftPeabody01, &ParseOptions::default()) {
            Ok(ParsedUuid::V8FiveField { fields, variant }) => {
                assert_eq!(fields.timestamp_32, 0x320c3d4d);
                assert_eq!(fields.timestamp_48, 0xcc00);
                assert_eq!(fields.time_or_seq, 0x75b);
                assert_eq!(variant, 0b10);
            }
            other => panic!("expected a five-field v8 parse, got {:?}", other),
        }
    }

    /// Parses v6 under every spec
    #[test]
    fn parses_v6_under_every_spec() {
        let v6 = uuid("1ec9414c-232a-6b00-b3c8-9e6bdeced846");
        for spec in [Spec::DraftPeabody01, Spec::DraftPeabody04, Spec::LATEST] {
            match parse(v6, spec, &ParseOptions::default()) {
                Ok(ParsedUuid::V6(fields)) => {
                    assert_eq!(fields.clock_seq, 13256);
                    assert_eq!(fields.node, 174_186_136_787_014);
                    assert_eq!(fields.gregorian_100ns, 0x1EC9414C232AB00);
                }
                other => panic!("expected a v6 parse, got {:?}", other),
            }
        }
    }

    /// Parses the classic v1 layout
    #[test]
    fn parses_the_classic_v1_layout() {
        let v1 = uuid("2cf1c828-dc02-11ed-b270-0242ac110002");
        match parse(v1, Spec::LATEST, &ParseOptions::default()) {
            Ok(ParsedUuid::V1 {
                time_low,
                time_mid,
                time_high,
                clock_seq,
                node,
                gregorian_100ns,
                ..
            }) => {
                assert_eq!(time_low, 0x2cf1c828);
                assert_eq!(time_mid, 0xdc02);
                assert_eq!(time_high, 0x1ed);
                assert_eq!(clock_seq, 0x3270 & 0x3fff);
                assert_eq!(node, 0x0242ac110002);
                assert_eq!(
                    gregorian_100ns,
                    (0x1ed_u64 << 48) | (0xdc02_u64 << 32) | 0x2cf1c828
                );
            }
            other => panic!("expected a v1 parse, got {:?}", other),
        }
    }

    /// Parses the random v4 layout
    #[test]
    fn parses_the_random_v4_layout() {
        let v4 = uuid("2ca4b2ce-6c13-40d4-bccf-37d222820f6f");
        match parse(v4, Spec::LATEST, &ParseOptions::default()) {
            Ok(ParsedUuid::V4 {
                random_a,
                random_b,
                random_c,
                variant,
            }) => {
                assert_eq!(random_a, 0x2ca4b2ce6c13);
                assert_eq!(random_b, 0x0d4);
                assert_eq!(random_c, 0x3ccf37d222820f6f & ((1 << 62) - 1));
                assert_eq!(variant, 0b10);
            }
            other => panic!("expected a v4 parse, got {:?}", other),
        }
    }

    /// Parses the hash layouts of v3 and v5
    #[test]
    fn parses_the_hash_layouts_of_v3_and_v5() {
        let v3 = uuid("5df41881-3aed-3515-88a7-2f4a814cf09e");
        match parse(v3, Spec::LATEST, &ParseOptions::default()) {
            Ok(ParsedUuid::V3 {
                md5_high, md5_mid, ..
            }) => {
                assert_eq!(md5_high, 0x5df418813aed);
                assert_eq!(md5_mid, 0x515);
            }
            other => panic!("expected a v3 parse, got {:?}", other),
        }

        let v5 = uuid("2ed6657d-e927-568b-95e1-2665a8aea6a2");
        match parse(v5, Spec::DraftRfc4122Bis01, &ParseOptions::default()) {
            Ok(ParsedUuid::V5 {
                sha1_high, sha1_mid, ..
            }) => {
                assert_eq!(sha1_high, 0x2ed6657de927);
                assert_eq!(sha1_mid, 0x68b);
            }
            other => panic!("expected a v5 parse, got {:?}", other),
        }
    }
}
