use std::fmt;

use num_bigint_dig::{BigInt, Sign};

/// A KMIP Big Integer.
///
/// KMIP 1.4 §9.1.1.4: Big Integers are encoded as two's complement,
/// big-endian, sign-extended so that the value length is a multiple of
/// eight bytes. This wrapper owns the padding rule so the wire layer can
/// stay oblivious to it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KmipBigInt(BigInt);

impl KmipBigInt {
    #[must_use]
    pub fn from_signed_bytes_be(bytes: &[u8]) -> Self {
        Self(BigInt::from_signed_bytes_be(bytes))
    }

    /// Two's complement big-endian bytes, sign-extended to a multiple of 8.
    #[must_use]
    pub fn to_signed_bytes_be(&self) -> Vec<u8> {
        let bytes = self.0.to_signed_bytes_be();
        let pad = (8 - bytes.len() % 8) % 8;
        if pad == 0 && !bytes.is_empty() {
            return bytes;
        }
        let fill = if self.0.sign() == Sign::Minus { 0xFF } else { 0x00 };
        let pad = if bytes.is_empty() { 8 } else { pad };
        let mut out = vec![fill; pad];
        out.extend_from_slice(&bytes);
        out
    }
}

impl From<BigInt> for KmipBigInt {
    fn from(value: BigInt) -> Self {
        Self(value)
    }
}

impl From<KmipBigInt> for BigInt {
    fn from(value: KmipBigInt) -> Self {
        value.0
    }
}

impl From<i64> for KmipBigInt {
    fn from(value: i64) -> Self {
        Self(BigInt::from(value))
    }
}

impl fmt::Display for KmipBigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use num_bigint_dig::BigInt;

    use super::KmipBigInt;

    #[test]
    fn sign_extension_to_multiple_of_eight() {
        let bi = KmipBigInt::from(BigInt::parse_bytes(b"1234567890000000000000000000", 10).unwrap());
        let bytes = bi.to_signed_bytes_be();
        assert_eq!(bytes.len() % 8, 0);
        assert_eq!(
            bytes,
            vec![
                0x00, 0x00, 0x00, 0x00, 0x03, 0xFD, 0x35, 0xEB, 0x6B, 0xC2, 0xDF, 0x46, 0x18,
                0x08, 0x00, 0x00,
            ]
        );
    }

    #[test]
    fn zero_is_eight_zero_bytes() {
        let bi = KmipBigInt::from(0_i64);
        assert_eq!(bi.to_signed_bytes_be(), vec![0_u8; 8]);
    }

    #[test]
    fn negative_values_extend_with_ones() {
        let bi = KmipBigInt::from(-1_i64);
        assert_eq!(bi.to_signed_bytes_be(), vec![0xFF_u8; 8]);

        let bi = KmipBigInt::from(-1_234_567_i64);
        let bytes = bi.to_signed_bytes_be();
        assert_eq!(bytes.len(), 8);
        assert_eq!(KmipBigInt::from_signed_bytes_be(&bytes), bi);
    }

    #[test]
    fn round_trip() {
        for value in [0_i64, 1, -1, 255, -255, i64::MAX, i64::MIN] {
            let bi = KmipBigInt::from(value);
            let bytes = bi.to_signed_bytes_be();
            assert_eq!(bytes.len() % 8, 0);
            assert_eq!(KmipBigInt::from_signed_bytes_be(&bytes), bi);
        }
    }
}
