/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the secure storage and attestation services.

--*/

#[cfg(all(feature = "insecure-dev-keys", feature = "production"))]
compile_error!("insecure-dev-keys must not be enabled in production builds");

pub mod attestation;
mod drivers;
mod root_key;
pub mod sec_storage;

pub use attestation::{
    collect_claims, generate_token, AttestationConfig, AttestationKey, TokenInput,
};
pub use drivers::Drivers;
pub use root_key::RootKey;
pub use sec_storage::{KeyFlags, KeyType, SecStorageConfig, SecureStorage};
