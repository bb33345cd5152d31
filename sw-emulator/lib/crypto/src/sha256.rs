/*++

Licensed under the Apache-2.0 license.

File Name:

    sha256.rs

Abstract:

    File contains implementation of Secure Hash 256 Algorithm (SHA-256)

--*/

use sha2::Digest;

/// SHA-256
#[derive(Clone, Default)]
pub struct Sha256 {
    /// Running state
    state: sha2::Sha256,

    /// Bytes absorbed so far
    data_size: usize,
}

impl Sha256 {
    /// SHA-256 Block Size
    pub const BLOCK_SIZE: usize = 64;

    /// SHA-256 Hash Size
    pub const HASH_SIZE: usize = 32;

    /// Create a new instance of Secure Hash Algorithm object
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the hash
    ///
    /// # Arguments
    ///
    /// * `data` - Data to absorb
    pub fn update(&mut self, data: &[u8]) {
        self.state.update(data);
        self.data_size += data.len();
    }

    /// Number of bytes absorbed so far
    pub fn data_size(&self) -> usize {
        self.data_size
    }

    /// Finish the computation and return the digest
    pub fn finalize(self) -> [u8; Self::HASH_SIZE] {
        self.state.finalize().into()
    }

    /// One-shot SHA-256
    pub fn digest(data: &[u8]) -> [u8; Self::HASH_SIZE] {
        sha2::Sha256::digest(data).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA_256_ABC: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn test_sha256_abc() {
        assert_eq!(hex::encode(Sha256::digest(b"abc")), SHA_256_ABC);
    }

    #[test]
    fn test_sha256_streaming_matches_one_shot() {
        let mut sha = Sha256::new();
        sha.update(b"a");
        sha.update(b"");
        sha.update(b"bc");
        assert_eq!(sha.data_size(), 3);
        assert_eq!(hex::encode(sha.finalize()), SHA_256_ABC);
    }
}
