/*++

Licensed under the Apache-2.0 license.

File Name:

    root_key.rs

Abstract:

    File contains derivation of the secure storage namespace keys from a
    fused HMAC key.

--*/

use crate::Drivers;
use tee_drivers::{cprintln, FuseKeyBlock, KeyPurpose, NamespaceKeys, TeeResult};

/// Seed of the namespace encryption key, eight little-endian words
const EKEY_SEED: [u32; 8] = [0xAEBE5A5A; 8];

/// Seed of the namespace tweak key, eight little-endian words
const TKEY_SEED: [u32; 8] = [0xCEDEA5A5; 8];

#[cfg(feature = "insecure-dev-keys")]
const DEV_EKEY: [u8; 32] = [0xA5; 32];

#[cfg(feature = "insecure-dev-keys")]
const DEV_TKEY: [u8; 32] = [0x5A; 32];

fn seed_bytes(words: &[u32; 8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    for (chunk, word) in out.chunks_exact_mut(4).zip(words.iter()) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
    out
}

pub struct RootKey;

impl RootKey {
    /// Derive the namespace keys `(ekey, tkey)`.
    ///
    /// With an HMAC peripheral each key is `HMAC-SHA256(fuse_key, seed)` and
    /// the fused key never leaves the peripheral. Without one each key is
    /// `SHA-256(fuse_key || seed)`.
    ///
    /// # Arguments
    ///
    /// * `drivers` - Drivers
    /// * `block` - Fuse key block carrying the `HmacUp` purpose
    ///
    /// # Returns
    ///
    /// * `TeeError::NotFound` - Block unprogrammed or carrying another purpose
    pub fn derive(drivers: &mut Drivers, block: FuseKeyBlock) -> TeeResult<NamespaceKeys> {
        cfg_if::cfg_if! {
            if #[cfg(feature = "insecure-dev-keys")] {
                let _ = (drivers, block);
                cprintln!("[sec_stg] WARNING: using insecure development keys");
                Ok(NamespaceKeys::new(DEV_EKEY, DEV_TKEY))
            } else {
                Self::derive_from_fuses(drivers, block)
            }
        }
    }

    #[cfg_attr(feature = "insecure-dev-keys", allow(dead_code))]
    fn derive_from_fuses(drivers: &mut Drivers, block: FuseKeyBlock) -> TeeResult<NamespaceKeys> {
        let ekey_seed = seed_bytes(&EKEY_SEED);
        let tkey_seed = seed_bytes(&TKEY_SEED);

        let keys = if drivers.hmac.is_present() {
            NamespaceKeys::new(
                drivers.hmac.hmac(block.into(), &[&ekey_seed])?,
                drivers.hmac.hmac(block.into(), &[&tkey_seed])?,
            )
        } else {
            let fuse_key = drivers.fuse_bank.read_key(block, KeyPurpose::HmacUp)?;
            let mut ekey = [0u8; 32];
            let mut tkey = [0u8; 32];
            for (seed, key) in [(&ekey_seed, &mut ekey), (&tkey_seed, &mut tkey)] {
                let mut op = drivers.sha256.digest_init()?;
                op.update(fuse_key.as_ref())?;
                op.update(seed)?;
                op.finalize(key)?;
            }
            let keys = NamespaceKeys::new(ekey, tkey);
            zeroize::Zeroize::zeroize(&mut ekey);
            zeroize::Zeroize::zeroize(&mut tkey);
            keys
        };

        assert_ne!(
            keys.ekey(),
            keys.tkey(),
            "namespace encryption and tweak keys must differ"
        );
        cprintln!(
            "[sec_stg] Derived namespace keys from key block {}",
            usize::from(block)
        );
        Ok(keys)
    }
}
