// Licensed under the Apache-2.0 license

//! Token sections and their bounded JSON encoding
//!
//! Every section is encoded into a caller supplied buffer no larger than the
//! section cap. The bytes produced are exactly the bytes that end up in the
//! token, so they can be hashed as they are encoded.

use crate::{
    EatError, HEADER_MAGIC, HEADER_MAX_SIZE, PUBLIC_KEY_MAX_SIZE, SIGN_ALG_ECDSA_P256_SHA256,
    SIGN_MAX_SIZE,
};
use serde::{Serialize, Serializer};
use std::io;

/// Serialize bytes as a lowercase hex string
pub(crate) fn serialize_hex<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: AsRef<[u8]>,
{
    serializer.serialize_str(&hex::encode(value.as_ref()))
}

/// `io::Write` over a fixed buffer that refuses to grow past its end
struct BoundedWriter<'a> {
    buffer: &'a mut [u8],
    pos: usize,
}

impl io::Write for BoundedWriter<'_> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let end_pos = self
            .pos
            .checked_add(bytes.len())
            .filter(|end| *end <= self.buffer.len())
            .ok_or(io::ErrorKind::WriteZero)?;
        self.buffer[self.pos..end_pos].copy_from_slice(bytes);
        self.pos = end_pos;
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A token section with a byte cap
pub trait SectionEncode: Serialize {
    /// Section byte cap
    const MAX_SIZE: usize;

    /// Semantic checks run before encoding
    fn validate(&self) -> Result<(), EatError> {
        Ok(())
    }

    /// Encode the section as compact JSON into `buf`
    ///
    /// # Arguments
    ///
    /// * `buf` - Destination, only the first `MAX_SIZE` bytes are used
    ///
    /// # Returns
    ///
    /// * `usize` - Encoded length
    /// * `EatError::SectionTooLarge` - Section exceeds its cap
    /// * `EatError::BufferTooSmall` - `buf` is shorter than the cap and too short
    fn encode(&self, buf: &mut [u8]) -> Result<usize, EatError> {
        self.validate()?;
        let limited = buf.len() < Self::MAX_SIZE;
        let limit = buf.len().min(Self::MAX_SIZE);
        let mut writer = BoundedWriter {
            buffer: &mut buf[..limit],
            pos: 0,
        };
        match serde_json::to_writer(&mut writer, self) {
            Ok(()) => Ok(writer.pos),
            Err(err) if err.is_io() && limited => Err(EatError::BufferTooSmall),
            Err(err) if err.is_io() => Err(EatError::SectionTooLarge),
            Err(err) => Err(err.into()),
        }
    }
}

/// `header` section
#[derive(Debug, Serialize)]
pub struct Header<'a> {
    magic: &'static str,
    encr_alg: Option<&'static str>,
    sign_alg: &'static str,
    key_id: &'a str,
}

impl<'a> Header<'a> {
    /// Header of an unencrypted token signed with ECDSA P-256 / SHA-256
    pub fn new(key_id: &'a str) -> Self {
        Self {
            magic: HEADER_MAGIC,
            encr_alg: None,
            sign_alg: SIGN_ALG_ECDSA_P256_SHA256,
            key_id,
        }
    }
}

impl SectionEncode for Header<'_> {
    const MAX_SIZE: usize = HEADER_MAX_SIZE;
}

/// `public_key` section: SEC1 compressed point as hex
#[derive(Debug, Serialize)]
pub struct PublicKeySection {
    compressed: String,
}

impl PublicKeySection {
    /// Build from raw big-endian affine coordinates
    pub fn from_coordinates(x: &[u8], y: &[u8]) -> Result<Self, EatError> {
        let y_last = y.last().ok_or(EatError::InvalidData)?;
        if x.is_empty() || x.len() != y.len() {
            return Err(EatError::InvalidData);
        }
        let prefix = if y_last & 1 == 0 { "02" } else { "03" };
        Ok(Self {
            compressed: format!("{prefix}{}", hex::encode(x)),
        })
    }

    pub fn compressed(&self) -> &str {
        &self.compressed
    }
}

impl SectionEncode for PublicKeySection {
    const MAX_SIZE: usize = PUBLIC_KEY_MAX_SIZE;
}

/// `sign` section
#[derive(Debug, Serialize)]
pub struct SignSection<'a> {
    #[serde(serialize_with = "serialize_hex")]
    r: &'a [u8],

    #[serde(serialize_with = "serialize_hex")]
    s: &'a [u8],
}

impl<'a> SignSection<'a> {
    pub fn new(r: &'a [u8], s: &'a [u8]) -> Self {
        Self { r, s }
    }
}

impl SectionEncode for SignSection<'_> {
    const MAX_SIZE: usize = SIGN_MAX_SIZE;

    fn validate(&self) -> Result<(), EatError> {
        if self.r.is_empty() || self.s.is_empty() {
            return Err(EatError::InvalidData);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header() {
        let mut buf = [0u8; HEADER_MAX_SIZE];
        let len = Header::new("tee_att_key0").encode(&mut buf).unwrap();
        assert_eq!(
            &buf[..len],
            br#"{"magic":"44fef7cc","encr_alg":null,"sign_alg":"ecdsa_secp256r1_sha256","key_id":"tee_att_key0"}"#
        );
    }

    #[test]
    fn test_header_cap() {
        let key_id = "k".repeat(HEADER_MAX_SIZE);
        let mut buf = [0u8; 512];
        assert_eq!(
            Header::new(&key_id).encode(&mut buf),
            Err(EatError::SectionTooLarge)
        );
    }

    #[test]
    fn test_buffer_too_small() {
        let mut buf = [0u8; 16];
        assert_eq!(
            Header::new("key").encode(&mut buf),
            Err(EatError::BufferTooSmall)
        );
    }

    #[test]
    fn test_public_key_parity() {
        let x = [0x12u8; 32];
        let mut y = [0u8; 32];
        y[31] = 0x10;
        let even = PublicKeySection::from_coordinates(&x, &y).unwrap();
        assert_eq!(even.compressed(), format!("02{}", "12".repeat(32)));
        y[31] = 0x11;
        let odd = PublicKeySection::from_coordinates(&x, &y).unwrap();
        assert_eq!(odd.compressed(), format!("03{}", "12".repeat(32)));

        let mut buf = [0u8; PUBLIC_KEY_MAX_SIZE];
        let len = odd.encode(&mut buf).unwrap();
        assert_eq!(len, r#"{"compressed":""#.len() + 66 + r#""}"#.len());
    }

    #[test]
    fn test_public_key_invalid() {
        assert_eq!(
            PublicKeySection::from_coordinates(&[1u8; 32], &[]).err(),
            Some(EatError::InvalidData)
        );
        assert_eq!(
            PublicKeySection::from_coordinates(&[1u8; 32], &[1u8; 48]).err(),
            Some(EatError::InvalidData)
        );
    }

    #[test]
    fn test_sign() {
        let mut buf = [0u8; SIGN_MAX_SIZE];
        let len = SignSection::new(&[0xab; 32], &[0xcd; 32])
            .encode(&mut buf)
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf[..len]).unwrap();
        assert_eq!(value["r"], "ab".repeat(32));
        assert_eq!(value["s"], "cd".repeat(32));
        assert_eq!(
            SignSection::new(&[], &[1]).encode(&mut buf),
            Err(EatError::InvalidData)
        );
    }
}
