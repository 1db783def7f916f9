//! Generated checks for varint and zig-zag decoding.

mod common;

use common::deterministic_runner;
use pbfwire::{
    DecodeError,
    varint::{MAX_VARINT_LEN, VarintRead, decode_varint, read_varint},
    zigzag_decode,
    zigzag_encode,
};
use pbfwire_testing::varint;
use proptest::{
    collection::vec,
    prelude::any,
    prop_assert_eq,
    test_runner::TestCaseError,
};
use rstest::rstest;

#[rstest]
#[case::zero(0, 0)]
#[case::minus_one(-1, 1)]
#[case::one(1, 2)]
#[case::max(i64::MAX, u64::MAX - 1)]
#[case::min(i64::MIN, u64::MAX)]
fn zigzag_maps_extremes(#[case] signed: i64, #[case] unsigned: u64) {
    assert_eq!(zigzag_encode(signed), unsigned);
    assert_eq!(zigzag_decode(unsigned), signed);
}

#[test]
fn zigzag_round_trips_every_signed_value() {
    deterministic_runner(512)
        .run(&any::<i64>(), |value| {
            prop_assert_eq!(zigzag_decode(zigzag_encode(value)), value);
            Ok(())
        })
        .expect("signed values should round-trip");
}

#[test]
fn zigzag_round_trips_every_unsigned_value() {
    deterministic_runner(512)
        .run(&any::<u64>(), |value| {
            prop_assert_eq!(zigzag_encode(zigzag_decode(value)), value);
            Ok(())
        })
        .expect("unsigned values should round-trip");
}

#[rstest]
#[case(128)]
#[case(256)]
fn varint_consumes_only_its_own_bytes(#[case] cases: u32) {
    let strategy = (any::<u64>(), vec(any::<u8>(), 0..16));
    deterministic_runner(cases)
        .run(&strategy, |(value, trailing)| {
            let encoded = varint(value);
            let mut bytes = encoded.clone();
            bytes.extend_from_slice(&trailing);

            let mut reader = bytes.as_slice();
            match read_varint(&mut reader)
                .map_err(|err| TestCaseError::fail(format!("read failed: {err}")))?
            {
                VarintRead::Value(decoded, len) => {
                    prop_assert_eq!(decoded, value);
                    prop_assert_eq!(len, encoded.len());
                }
                VarintRead::Eof => return Err(TestCaseError::fail("unexpected end of input")),
            }
            prop_assert_eq!(reader.len(), trailing.len());

            let (decoded, len) = decode_varint(&bytes)
                .map_err(|err| TestCaseError::fail(format!("decode failed: {err}")))?;
            prop_assert_eq!((decoded, len), (value, encoded.len()));
            Ok(())
        })
        .expect("varints should stop at their last byte");
}

#[test]
fn overlong_varint_fails_without_reading_further() {
    let bytes = [0x80u8; 32];
    let mut reader = &bytes[..];
    let err = read_varint(&mut reader).expect_err("continuation never ends");
    assert!(matches!(err, DecodeError::VarintOverflow { max: MAX_VARINT_LEN }));
    assert!(bytes.len() - reader.len() <= MAX_VARINT_LEN + 1);
}

#[test]
fn tenth_byte_beyond_64_bits_overflows() {
    let mut bytes = vec![0xff; 9];
    bytes.push(0x02);
    let err = decode_varint(&bytes).expect_err("value needs 65 bits");
    assert!(matches!(err, DecodeError::VarintOverflow { .. }));
}

#[test]
fn truncated_varint_is_not_clean_end() {
    let mut reader: &[u8] = &[0xac];
    let err = read_varint(&mut reader).expect_err("input ends mid-varint");
    assert!(matches!(err, DecodeError::TruncatedStream { expected: 2, actual: 1 }));

    let mut empty: &[u8] = &[];
    assert_eq!(read_varint(&mut empty).expect("clean end"), VarintRead::Eof);
}
