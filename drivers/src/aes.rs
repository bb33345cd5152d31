/*++

Licensed under the Apache-2.0 license.

File Name:

    aes.rs

Abstract:

    File contains API for AES-256-GCM Cryptography operations

--*/

use crate::{Accelerator, TeeError, TeeResult};
use tee_emu_crypto::{Aes256Gcm, CryptoError, AES_256_GCM_IV_SIZE, AES_256_KEY_SIZE};
use zeroize::Zeroize;

pub const AES_256_KEY_BYTES: usize = AES_256_KEY_SIZE;
pub const AES_GCM_IV_BYTES: usize = AES_256_GCM_IV_SIZE;
pub const AES_GCM_MIN_TAG_BYTES: usize = Aes256Gcm::MIN_TAG_SIZE;
pub const AES_GCM_MAX_TAG_BYTES: usize = Aes256Gcm::MAX_TAG_SIZE;

#[derive(Debug, Clone, Default)]
pub struct Aes {
    accel: Accelerator,
}

impl Aes {
    pub fn new(accel: Accelerator) -> Self {
        Self { accel }
    }

    fn check_sizes(input: &[u8], output: &[u8], tag_len: usize) -> TeeResult<()> {
        if output.len() < input.len()
            || !(AES_GCM_MIN_TAG_BYTES..=AES_GCM_MAX_TAG_BYTES).contains(&tag_len)
        {
            return Err(TeeError::InvalidSize);
        }
        Ok(())
    }

    /// AES-256-GCM encryption
    ///
    /// # Arguments
    ///
    /// * `key` - AES-256 key
    /// * `iv` - 96-bit IV
    /// * `aad` - Additional authenticated data
    /// * `input` - Plaintext
    /// * `output` - Ciphertext, at least `input.len()` bytes
    /// * `tag` - Tag output, 12 to 16 bytes
    pub fn gcm_encrypt(
        &mut self,
        key: &[u8; AES_256_KEY_BYTES],
        iv: &[u8; AES_GCM_IV_BYTES],
        aad: &[u8],
        input: &[u8],
        output: &mut [u8],
        tag: &mut [u8],
    ) -> TeeResult<()> {
        Self::check_sizes(input, output, tag.len())?;
        let _guard = self.accel.acquire();
        Aes256Gcm::encrypt(key, iv, aad, input, output, tag).map_err(|_| TeeError::InvalidSize)
    }

    /// AES-256-GCM decryption
    ///
    /// # Returns
    ///
    /// * `TeeError::InvalidState` - Tag mismatch. `output` is zeroized.
    pub fn gcm_decrypt(
        &mut self,
        key: &[u8; AES_256_KEY_BYTES],
        iv: &[u8; AES_GCM_IV_BYTES],
        aad: &[u8],
        input: &[u8],
        tag: &[u8],
        output: &mut [u8],
    ) -> TeeResult<()> {
        Self::check_sizes(input, output, tag.len())?;
        let _guard = self.accel.acquire();
        match Aes256Gcm::decrypt(key, iv, aad, input, tag, output) {
            Ok(()) => Ok(()),
            Err(CryptoError::VerifyFailed) => {
                output.zeroize();
                Err(TeeError::InvalidState)
            }
            Err(_) => {
                output.zeroize();
                Err(TeeError::InvalidSize)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 32] = [0x24; 32];
    const IV: [u8; 12] = [0x0c; 12];

    #[test]
    fn test_round_trip() {
        let mut aes = Aes::default();
        let mut ct = [0u8; 5];
        let mut tag = [0u8; 14];
        aes.gcm_encrypt(&KEY, &IV, b"aad", b"hello", &mut ct, &mut tag)
            .unwrap();
        assert_ne!(&ct, b"hello");

        let mut pt = [0u8; 8];
        aes.gcm_decrypt(&KEY, &IV, b"aad", &ct, &tag, &mut pt)
            .unwrap();
        assert_eq!(&pt[..5], b"hello");
    }

    #[test]
    fn test_tamper_zeroizes_output() {
        let mut aes = Aes::default();
        let mut ct = [0u8; 5];
        let mut tag = [0u8; 16];
        aes.gcm_encrypt(&KEY, &IV, b"", b"hello", &mut ct, &mut tag)
            .unwrap();
        ct[0] ^= 0x80;
        let mut pt = [0xffu8; 5];
        assert_eq!(
            aes.gcm_decrypt(&KEY, &IV, b"", &ct, &tag, &mut pt),
            Err(TeeError::InvalidState)
        );
        assert_eq!(pt, [0u8; 5]);
    }

    #[test]
    fn test_size_checks() {
        let mut aes = Aes::default();
        let mut ct = [0u8; 4];
        let mut tag = [0u8; 16];
        assert_eq!(
            aes.gcm_encrypt(&KEY, &IV, b"", b"hello", &mut ct, &mut tag),
            Err(TeeError::InvalidSize)
        );
        let mut ct = [0u8; 5];
        let mut short_tag = [0u8; 11];
        assert_eq!(
            aes.gcm_encrypt(&KEY, &IV, b"", b"hello", &mut ct, &mut short_tag),
            Err(TeeError::InvalidSize)
        );
        let mut long_tag = [0u8; 17];
        assert_eq!(
            aes.gcm_encrypt(&KEY, &IV, b"", b"hello", &mut ct, &mut long_tag),
            Err(TeeError::InvalidSize)
        );
    }
}
