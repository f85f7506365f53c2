//! Byte-level codec tests, anchored on the normative examples of
//! KMIP 1.4 §9.1.2 (all of them use tag 0x420020, CompromiseDate).

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]

use num_bigint_dig::BigInt;
use time::macros::datetime;

use crate::{
    kmip_1_4,
    ttlv::{
        KmipBigInt, KmipEnumerationVariant, TTLVBytesDeserializer, TTLVBytesSerializer, TTLValue,
        TtlvError, TTLV,
    },
};

fn to_bytes(ttlv: &TTLV) -> Vec<u8> {
    ttlv.to_bytes_1_4().unwrap()
}

fn round_trip(ttlv: &TTLV) -> TTLV {
    TTLV::from_bytes_1_4(&to_bytes(ttlv)).unwrap()
}

fn compromise_date(value: TTLValue) -> TTLV {
    TTLV {
        tag: kmip_1_4::kmip_types::Tag::CompromiseDate.to_string(),
        value,
    }
}

#[test]
fn normative_integer() {
    // An Integer containing the decimal value 8:
    // 42 00 20 | 02 | 00 00 00 04 | 00 00 00 08 00 00 00 00
    let bytes = to_bytes(&compromise_date(TTLValue::Integer(8)));
    assert_eq!(
        bytes,
        vec![
            0x42, 0x00, 0x20, 0x02, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00,
            0x00, 0x00,
        ]
    );
}

#[test]
fn normative_long_integer() {
    // A Long Integer containing the decimal value 123456789000000000:
    // 42 00 20 | 03 | 00 00 00 08 | 01 B6 9B 4B A5 74 92 00
    let bytes = to_bytes(&compromise_date(TTLValue::LongInteger(
        123_456_789_000_000_000,
    )));
    assert_eq!(
        bytes,
        vec![
            0x42, 0x00, 0x20, 0x03, 0x00, 0x00, 0x00, 0x08, 0x01, 0xB6, 0x9B, 0x4B, 0xA5, 0x74,
            0x92, 0x00,
        ]
    );
}

#[test]
fn normative_big_integer() {
    // A Big Integer containing the decimal value 1234567890000000000000000000:
    // 42 00 20 | 04 | 00 00 00 10 | 00 00 00 00 03 FD 35 EB 6B C2 DF 46 18 08 00 00
    let bi = KmipBigInt::from(BigInt::parse_bytes(b"1234567890000000000000000000", 10).unwrap());
    let bytes = to_bytes(&compromise_date(TTLValue::BigInteger(bi)));
    assert_eq!(
        bytes,
        vec![
            0x42, 0x00, 0x20, 0x04, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x03, 0xFD,
            0x35, 0xEB, 0x6B, 0xC2, 0xDF, 0x46, 0x18, 0x08, 0x00, 0x00,
        ]
    );
}

#[test]
fn normative_enumeration() {
    // An Enumeration with value 255:
    // 42 00 20 | 05 | 00 00 00 04 | 00 00 00 FF 00 00 00 00
    let bytes = to_bytes(&compromise_date(TTLValue::Enumeration(
        KmipEnumerationVariant::from(255),
    )));
    assert_eq!(
        bytes,
        vec![
            0x42, 0x00, 0x20, 0x05, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0xFF, 0x00, 0x00,
            0x00, 0x00,
        ]
    );
}

#[test]
fn normative_boolean() {
    // A Boolean with the value True:
    // 42 00 20 | 06 | 00 00 00 08 | 00 00 00 00 00 00 00 01
    let bytes = to_bytes(&compromise_date(TTLValue::Boolean(true)));
    assert_eq!(
        bytes,
        vec![
            0x42, 0x00, 0x20, 0x06, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x01,
        ]
    );
}

#[test]
fn normative_text_string() {
    // A Text String with the value "Hello World":
    // 42 00 20 | 07 | 00 00 00 0B | 48 65 6C 6C 6F 20 57 6F 72 6C 64 00 00 00 00 00
    let bytes = to_bytes(&compromise_date(TTLValue::TextString(
        "Hello World".to_owned(),
    )));
    assert_eq!(
        bytes,
        vec![
            0x42, 0x00, 0x20, 0x07, 0x00, 0x00, 0x00, 0x0B, 0x48, 0x65, 0x6C, 0x6C, 0x6F, 0x20,
            0x57, 0x6F, 0x72, 0x6C, 0x64, 0x00, 0x00, 0x00, 0x00, 0x00,
        ]
    );
}

#[test]
fn normative_byte_string() {
    // A Byte String with the value { 0x01, 0x02, 0x03 }:
    // 42 00 20 | 08 | 00 00 00 03 | 01 02 03 00 00 00 00 00
    let bytes = to_bytes(&compromise_date(TTLValue::ByteString(vec![1, 2, 3])));
    assert_eq!(
        bytes,
        vec![
            0x42, 0x00, 0x20, 0x08, 0x00, 0x00, 0x00, 0x03, 0x01, 0x02, 0x03, 0x00, 0x00, 0x00,
            0x00, 0x00,
        ]
    );
}

#[test]
fn normative_date_time() {
    // A Date-Time, containing the value for Friday, March 14, 2008, 11:56:40 GMT:
    // 42 00 20 | 09 | 00 00 00 08 | 00 00 00 00 47 DA 67 F8
    let bytes = to_bytes(&compromise_date(TTLValue::DateTime(datetime!(
        2008-03-14 11:56:40 UTC
    ))));
    assert_eq!(
        bytes,
        vec![
            0x42, 0x00, 0x20, 0x09, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x47, 0xDA,
            0x67, 0xF8,
        ]
    );
}

#[test]
fn normative_interval() {
    // An Interval, containing the value for 10 days:
    // 42 00 20 | 0A | 00 00 00 04 | 00 0D 2F 00 00 00 00 00
    let bytes = to_bytes(&compromise_date(TTLValue::Interval(864_000)));
    assert_eq!(
        bytes,
        vec![
            0x42, 0x00, 0x20, 0x0A, 0x00, 0x00, 0x00, 0x04, 0x00, 0x0D, 0x2F, 0x00, 0x00, 0x00,
            0x00, 0x00,
        ]
    );
}

#[test]
fn normative_structure() {
    // A Structure containing an Enumeration, value 254, followed by an
    // Integer, value 255:
    let ttlv = compromise_date(TTLValue::Structure(vec![
        TTLV {
            tag: kmip_1_4::kmip_types::Tag::ApplicationSpecificInformation.to_string(),
            value: TTLValue::Enumeration(KmipEnumerationVariant::from(254)),
        },
        TTLV {
            tag: kmip_1_4::kmip_types::Tag::ArchiveDate.to_string(),
            value: TTLValue::Integer(255),
        },
    ]));
    let bytes = to_bytes(&ttlv);
    assert_eq!(
        bytes,
        vec![
            0x42, 0x00, 0x20, 0x01, 0x00, 0x00, 0x00, 0x20, //
            0x42, 0x00, 0x04, 0x05, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0xFE, 0x00, 0x00,
            0x00, 0x00, //
            0x42, 0x00, 0x05, 0x02, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0xFF, 0x00, 0x00,
            0x00, 0x00,
        ]
    );
    assert_eq!(round_trip(&ttlv), ttlv);
}

#[test]
fn every_item_is_eight_byte_aligned() {
    let samples = vec![
        compromise_date(TTLValue::Integer(-42)),
        compromise_date(TTLValue::LongInteger(i64::MIN)),
        compromise_date(TTLValue::Boolean(false)),
        compromise_date(TTLValue::TextString("padding check".to_owned())),
        compromise_date(TTLValue::ByteString(vec![0xAB; 17])),
        compromise_date(TTLValue::Interval(1)),
    ];
    for ttlv in samples {
        let bytes = to_bytes(&ttlv);
        assert_eq!(bytes.len() % 8, 0, "{ttlv:?} is not aligned");
        // the length header counts value bytes before padding
        let length = u32::from_be_bytes(bytes[4..8].try_into().unwrap()) as usize;
        assert!(length <= bytes.len() - 8);
        // trailing padding, if any, must be zero
        assert!(bytes[8 + length..].iter().all(|b| *b == 0));
    }
}

#[test]
fn decode_encode_is_identity() {
    let ttlv = TTLV::structure(
        "Link",
        vec![
            TTLV::integer("LinkType", 123),
            TTLV::text_string("LinkedObjectIdentifier", "Hello KMIP"),
        ],
    );
    let bytes = to_bytes(&ttlv);
    let decoded = TTLV::from_bytes_1_4(&bytes).unwrap();
    assert_eq!(to_bytes(&decoded), bytes);
    assert_eq!(decoded, ttlv);
}

#[test]
fn vendor_extension_tags_survive() {
    let ttlv = TTLV::byte_string("0x540002", vec![1, 2, 3, 4]);
    let bytes = to_bytes(&ttlv);
    assert_eq!(&bytes[..3], &[0x54, 0x00, 0x02]);
    let decoded = TTLV::from_bytes_1_4(&bytes).unwrap();
    assert_eq!(decoded.tag, "0x540002");
    assert_eq!(decoded, ttlv);
}

#[test]
fn unknown_tag_name_is_rejected() {
    let ttlv = TTLV::integer("NoSuchTag", 1);
    assert!(matches!(
        ttlv.to_bytes_1_4(),
        Err(TtlvError::UnknownTag(_))
    ));
}

#[test]
fn truncated_input_is_detected() {
    let bytes = to_bytes(&compromise_date(TTLValue::LongInteger(7)));
    for cut in [1, 7, 9, bytes.len() - 1] {
        let result = TTLV::from_bytes_1_4(&bytes[..cut]);
        assert!(
            matches!(result, Err(TtlvError::Truncated)),
            "cut at {cut} gave {result:?}"
        );
    }
}

#[test]
fn invalid_utf8_is_rejected() {
    // TextString of length 2 holding invalid UTF-8
    let bytes = vec![
        0x42, 0x00, 0x20, 0x07, 0x00, 0x00, 0x00, 0x02, 0xFF, 0xFE, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00,
    ];
    assert!(matches!(
        TTLV::from_bytes_1_4(&bytes),
        Err(TtlvError::InvalidUtf8(_))
    ));
}

#[test]
fn bad_integer_length_is_a_type_mismatch() {
    // Integer claiming 8 bytes of value
    let bytes = vec![
        0x42, 0x00, 0x20, 0x02, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00,
        0x00,
    ];
    assert!(matches!(
        TTLV::from_bytes_1_4(&bytes),
        Err(TtlvError::TypeMismatch { .. })
    ));
}

#[test]
fn misaligned_structure_is_rejected() {
    // Structure whose length is not a multiple of 8
    let bytes = vec![
        0x42, 0x00, 0x20, 0x01, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00,
    ];
    assert!(matches!(
        TTLV::from_bytes_1_4(&bytes),
        Err(TtlvError::Alignment(_))
    ));
}

#[test]
fn nonzero_padding_is_rejected() {
    // Integer 8 with garbage in the padding bytes
    let bytes = vec![
        0x42, 0x00, 0x20, 0x02, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00,
        0x01,
    ];
    assert!(matches!(
        TTLV::from_bytes_1_4(&bytes),
        Err(TtlvError::Alignment(_))
    ));
}

#[test]
fn invalid_type_byte_is_rejected() {
    let bytes = vec![
        0x42, 0x00, 0x20, 0x0B, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00,
    ];
    assert!(matches!(
        TTLV::from_bytes_1_4(&bytes),
        Err(TtlvError::InvalidType(0x0B))
    ));
}

#[test]
fn trailing_garbage_is_rejected() {
    let mut bytes = to_bytes(&compromise_date(TTLValue::Integer(1)));
    bytes.extend_from_slice(&[0; 8]);
    assert!(matches!(
        TTLV::from_bytes_1_4(&bytes),
        Err(TtlvError::Alignment(_))
    ));
}

#[test]
fn streaming_reader_reports_consumed_size() {
    let ttlv = compromise_date(TTLValue::TextString("ab".to_owned()));
    let bytes = to_bytes(&ttlv);
    let (decoded, consumed) = TTLVBytesDeserializer::new(bytes.as_slice())
        .read_ttlv::<kmip_1_4::kmip_types::Tag>()
        .unwrap();
    assert_eq!(consumed, bytes.len());
    assert_eq!(decoded, ttlv);
}

#[test]
fn serializer_writes_into_any_writer() {
    let ttlv = compromise_date(TTLValue::Integer(1));
    let mut buffer = Vec::new();
    TTLVBytesSerializer::new(&mut buffer)
        .write_ttlv::<kmip_1_4::kmip_types::Tag>(&ttlv)
        .unwrap();
    assert_eq!(buffer, to_bytes(&ttlv));
}

#[test]
fn zeroize_byte_strings_scrubs_nested_material() {
    let mut ttlv = TTLV::structure(
        "KeyBlock",
        vec![TTLV::structure(
            "KeyValue",
            vec![TTLV::byte_string("KeyMaterial", vec![0xAA; 32])],
        )],
    );
    ttlv.zeroize_byte_strings();
    let material = ttlv
        .child("KeyValue")
        .unwrap()
        .child("KeyMaterial")
        .unwrap()
        .as_bytes()
        .unwrap();
    assert_eq!(material, vec![0_u8; 32].as_slice());
}
