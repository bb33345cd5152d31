/*++

Licensed under the Apache-2.0 license.

File Name:

    sha256.rs

Abstract:

    File contains API for SHA-256 Cryptography operations

--*/

use crate::{Accelerator, TeeError, TeeResult};
use tee_emu_crypto::Sha256 as Sha256Engine;

const SHA256_MAX_DATA_SIZE: usize = 1024 * 1024;

/// SHA-256 digest
pub type Sha256Digest = [u8; 32];

#[derive(Debug, Clone, Default)]
pub struct Sha256 {
    accel: Accelerator,
}

impl Sha256 {
    pub fn new(accel: Accelerator) -> Self {
        Self { accel }
    }

    /// Initialize multi step digest operation
    ///
    /// # Returns
    ///
    /// * `Sha256DigestOp` - Object representing the digest operation
    pub fn digest_init(&mut self) -> TeeResult<Sha256DigestOp<'_>> {
        Ok(Sha256DigestOp {
            sha: self,
            state: Sha256Engine::new(),
        })
    }

    /// Calculate the digest of the buffer
    ///
    /// # Arguments
    ///
    /// * `buf` - Buffer to calculate the digest over
    pub fn digest(&mut self, buf: &[u8]) -> TeeResult<Sha256Digest> {
        if buf.len() > SHA256_MAX_DATA_SIZE {
            return Err(TeeError::InvalidSize);
        }
        let _guard = self.accel.acquire();
        Ok(Sha256Engine::digest(buf))
    }
}

/// Multi step SHA-256 digest operation
pub struct Sha256DigestOp<'a> {
    /// SHA-256 Engine
    sha: &'a mut Sha256,

    /// Running state
    state: Sha256Engine,
}

impl Sha256DigestOp<'_> {
    /// Update the digest with data
    ///
    /// # Arguments
    ///
    /// * `data` - Data to used to update the digest
    pub fn update(&mut self, data: &[u8]) -> TeeResult<()> {
        if self.state.data_size() + data.len() > SHA256_MAX_DATA_SIZE {
            return Err(TeeError::InvalidSize);
        }
        let _guard = self.sha.accel.acquire();
        self.state.update(data);
        Ok(())
    }

    /// Finalize the digest operation
    pub fn finalize(self, digest: &mut Sha256Digest) -> TeeResult<()> {
        let _guard = self.sha.accel.acquire();
        *digest = self.state.finalize();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streaming_matches_one_shot() {
        let mut sha = Sha256::default();
        let expected = sha.digest(b"header-eat-public_key").unwrap();

        let mut op = sha.digest_init().unwrap();
        op.update(b"header").unwrap();
        op.update(b"-eat").unwrap();
        op.update(b"-public_key").unwrap();
        let mut digest = [0u8; 32];
        op.finalize(&mut digest).unwrap();
        assert_eq!(digest, expected);
    }

    #[test]
    fn test_max_data_size() {
        let mut sha = Sha256::default();
        let big = vec![0u8; SHA256_MAX_DATA_SIZE + 1];
        assert_eq!(sha.digest(&big), Err(TeeError::InvalidSize));
    }
}
