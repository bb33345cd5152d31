/*++

Licensed under the Apache-2.0 license.

File Name:

    aes256gcm.rs

Abstract:

    File contains implementation of AES-256 GCM algorithm with truncated
    tag support (12 to 16 bytes).

--*/

use crate::CryptoError;
use aes_gcm::aead::consts::{U12, U13, U14, U15, U16};
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::AesGcm;

pub const AES_256_KEY_SIZE: usize = 32;
pub const AES_256_GCM_IV_SIZE: usize = 12;

/// Selects the GCM instance matching the requested tag length.
macro_rules! with_tag_len {
    ($tag_len:expr, $cipher:ident => $body:expr) => {
        match $tag_len {
            12 => {
                type $cipher = AesGcm<Aes256, U12, U12>;
                $body
            }
            13 => {
                type $cipher = AesGcm<Aes256, U12, U13>;
                $body
            }
            14 => {
                type $cipher = AesGcm<Aes256, U12, U14>;
                $body
            }
            15 => {
                type $cipher = AesGcm<Aes256, U12, U15>;
                $body
            }
            16 => {
                type $cipher = AesGcm<Aes256, U12, U16>;
                $body
            }
            _ => Err(CryptoError::InvalidLength),
        }
    };
}

pub enum Aes256Gcm {}

impl Aes256Gcm {
    /// Smallest accepted tag length
    pub const MIN_TAG_SIZE: usize = 12;

    /// Largest accepted tag length
    pub const MAX_TAG_SIZE: usize = 16;

    /// One-shot AES-256-GCM encryption.
    ///
    /// # Arguments
    ///
    /// * `key` - AES-256 key
    /// * `iv` - 96-bit nonce
    /// * `aad` - Additional authenticated data
    /// * `plaintext` - Data to encrypt
    /// * `ciphertext` - Output, at least `plaintext.len()` bytes
    /// * `tag` - Output tag, 12 to 16 bytes
    pub fn encrypt(
        key: &[u8; AES_256_KEY_SIZE],
        iv: &[u8; AES_256_GCM_IV_SIZE],
        aad: &[u8],
        plaintext: &[u8],
        ciphertext: &mut [u8],
        tag: &mut [u8],
    ) -> Result<(), CryptoError> {
        if ciphertext.len() < plaintext.len() {
            return Err(CryptoError::InvalidLength);
        }
        let buffer = &mut ciphertext[..plaintext.len()];
        buffer.copy_from_slice(plaintext);

        with_tag_len!(tag.len(), Cipher => {
            let cipher = Cipher::new(GenericArray::from_slice(key));
            let computed = cipher
                .encrypt_in_place_detached(GenericArray::from_slice(iv), aad, buffer)
                .map_err(|_| CryptoError::InvalidLength)?;
            tag.copy_from_slice(&computed);
            Ok(())
        })
    }

    /// One-shot AES-256-GCM decryption.
    ///
    /// On failure the output buffer content is unspecified.
    pub fn decrypt(
        key: &[u8; AES_256_KEY_SIZE],
        iv: &[u8; AES_256_GCM_IV_SIZE],
        aad: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
        plaintext: &mut [u8],
    ) -> Result<(), CryptoError> {
        if plaintext.len() < ciphertext.len() {
            return Err(CryptoError::InvalidLength);
        }
        let buffer = &mut plaintext[..ciphertext.len()];
        buffer.copy_from_slice(ciphertext);

        with_tag_len!(tag.len(), Cipher => {
            let cipher = Cipher::new(GenericArray::from_slice(key));
            cipher
                .decrypt_in_place_detached(
                    GenericArray::from_slice(iv),
                    aad,
                    buffer,
                    GenericArray::from_slice(tag),
                )
                .map_err(|_| CryptoError::VerifyFailed)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 32] = [
        0x92, 0xac, 0xe3, 0xe3, 0x48, 0xcd, 0x82, 0x10, 0x92, 0xcd, 0x92, 0x1a, 0xa3, 0x54, 0x63,
        0x74, 0x29, 0x9a, 0xb4, 0x62, 0x9, 0x69, 0x1b, 0xc2, 0x8b, 0x87, 0x52, 0xd1, 0x7f, 0x12,
        0x3c, 0x20,
    ];
    const IV: [u8; 12] = [
        0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb,
    ];
    const AAD: [u8; 8] = [0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff];
    const PLAINTEXT: [u8; 10] = [0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09];
    const CIPHERTEXT: [u8; 10] = [0xe2, 0x7a, 0xbd, 0xd2, 0xd2, 0xa5, 0x3d, 0x2f, 0x13, 0x6b];
    const TAG: [u8; 16] = [
        0x9a, 0x4a, 0x25, 0x79, 0x52, 0x93, 0x1, 0xbc, 0xfb, 0x71, 0xc7, 0x8d, 0x40, 0x60, 0xf5,
        0x2c,
    ];

    #[test]
    fn test_encrypt_decrypt() {
        // from https://github.com/C2SP/wycheproof/blob/master/testvectors/aes_gcm_test.json
        let mut ciphertext = [0u8; 10];
        let mut tag = [0u8; 16];
        Aes256Gcm::encrypt(&KEY, &IV, &AAD, &PLAINTEXT, &mut ciphertext, &mut tag).unwrap();
        assert_eq!(ciphertext, CIPHERTEXT);
        assert_eq!(tag, TAG);

        let mut plaintext = [0u8; 10];
        Aes256Gcm::decrypt(&KEY, &IV, &AAD, &CIPHERTEXT, &TAG, &mut plaintext).unwrap();
        assert_eq!(plaintext, PLAINTEXT);
    }

    #[test]
    fn test_truncated_tag_is_prefix() {
        let mut ciphertext = [0u8; 10];
        let mut tag = [0u8; 12];
        Aes256Gcm::encrypt(&KEY, &IV, &AAD, &PLAINTEXT, &mut ciphertext, &mut tag).unwrap();
        assert_eq!(tag[..], TAG[..12]);

        let mut plaintext = [0u8; 10];
        Aes256Gcm::decrypt(&KEY, &IV, &AAD, &CIPHERTEXT, &tag, &mut plaintext).unwrap();
        assert_eq!(plaintext, PLAINTEXT);
    }

    #[test]
    fn test_decrypt_bad_tag() {
        let mut tag = TAG;
        tag[0] ^= 1;
        let mut plaintext = [0u8; 10];
        assert_eq!(
            Aes256Gcm::decrypt(&KEY, &IV, &AAD, &CIPHERTEXT, &tag, &mut plaintext),
            Err(CryptoError::VerifyFailed)
        );
    }

    #[test]
    fn test_unsupported_tag_len() {
        let mut ciphertext = [0u8; 10];
        let mut tag = [0u8; 8];
        assert_eq!(
            Aes256Gcm::encrypt(&KEY, &IV, &AAD, &PLAINTEXT, &mut ciphertext, &mut tag),
            Err(CryptoError::InvalidLength)
        );
    }
}
