/*++

Licensed under the Apache-2.0 license.

File Name:

    mod.rs

Abstract:

    File contains the attestation service. It collects the software claims of
    the installed firmware and emits them as a signed JSON entity attestation
    token.

--*/

mod claims;
mod token;

pub use claims::collect_claims;
pub use token::generate_token;

use crate::SecureStorage;

/// Attestation configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationConfig {
    /// Key identifier reported in the token header
    pub key_id: String,

    /// Value of the `device_status` claim
    pub device_status: u32,
}

impl Default for AttestationConfig {
    fn default() -> Self {
        Self {
            key_id: "tee_att_key0".into(),
            device_status: 0xA5,
        }
    }
}

/// Key signing the token
pub enum AttestationKey<'a> {
    /// Fresh P-256 key pair per token
    Ephemeral,

    /// P-256 key held in the secure key store, generated on first use
    SecStorage {
        store: &'a mut SecureStorage,
        key_id: &'a str,
    },
}

/// Caller supplied token claims
#[derive(Debug, Clone, Copy)]
pub struct TokenInput<'a> {
    /// Verifier nonce, 32, 48 or 64 bytes
    pub auth_challenge: &'a [u8],

    pub client_id: i32,

    /// Certificate reference reported as `psa_cert_ref`, at most
    /// `CERT_REF_MAX_LEN` bytes
    pub cert_ref: &'a str,
}
