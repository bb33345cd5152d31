/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the TEE Emulator Crypto library. These are the
    software primitives backing the accelerator models in `tee-drivers`.

--*/

mod aes256gcm;
mod ecdsa;
mod hmac256;
mod sha256;

pub use aes256gcm::{Aes256Gcm, AES_256_GCM_IV_SIZE, AES_256_KEY_SIZE};
pub use ecdsa::{EcdsaCurve, EcdsaEngine, EcdsaKeyPairRaw, MAX_COORD_SIZE};
pub use hmac256::Hmac256;
pub use sha256::Sha256;

/// Failure reported by a software primitive.
///
/// Never crosses the driver boundary; the drivers translate it.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CryptoError {
    /// Key bytes do not form a valid key
    InvalidKey,

    /// Input length not accepted by the primitive
    InvalidLength,

    /// Signature or tag did not verify
    VerifyFailed,
}
