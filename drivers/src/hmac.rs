/*++

Licensed under the Apache-2.0 license.

File Name:

    hmac.rs

Abstract:

    File contains API for HMAC-SHA256 Cryptography operations

--*/

use crate::{Accelerator, FuseBank, FuseKeyBlock, KeyPurpose, TeeError, TeeResult};
use tee_emu_crypto::Hmac256;

/// HMAC-SHA256 tag
pub type HmacTag = [u8; Hmac256::TAG_SIZE];

///
/// Hmac Key
///
#[derive(Debug, Copy, Clone)]
pub enum HmacKey<'a> {
    /// Software supplied key
    Array(&'a [u8]),

    /// Fused key block. The key must carry the `HmacUp` purpose and never
    /// leaves the peripheral.
    Fuse(FuseKeyBlock),
}

impl<'a> From<&'a [u8]> for HmacKey<'a> {
    /// Converts to this type from the input type.
    fn from(value: &'a [u8]) -> Self {
        Self::Array(value)
    }
}

impl From<FuseKeyBlock> for HmacKey<'_> {
    /// Converts to this type from the input type.
    fn from(value: FuseKeyBlock) -> Self {
        Self::Fuse(value)
    }
}

#[derive(Clone)]
pub struct Hmac {
    accel: Accelerator,
    fuses: FuseBank,
    present: bool,
}

impl Hmac {
    /// Create the HMAC driver
    ///
    /// # Arguments
    ///
    /// * `accel` - HMAC accelerator
    /// * `fuses` - Fuse bank the peripheral reads key blocks from
    /// * `present` - SoC has an HMAC peripheral
    pub fn new(accel: Accelerator, fuses: FuseBank, present: bool) -> Self {
        Self {
            accel,
            fuses,
            present,
        }
    }

    /// Whether the SoC has an HMAC peripheral
    pub fn is_present(&self) -> bool {
        self.present
    }

    /// Calculate the HMAC-SHA256 of the concatenated data parts
    ///
    /// # Arguments
    ///
    /// * `key` - HMAC key
    /// * `data` - Message parts
    ///
    /// # Returns
    ///
    /// * `TeeError::NotSupported` - SoC has no HMAC peripheral
    /// * `TeeError::NotFound` - Fuse block unprogrammed or not an `HmacUp` key
    pub fn hmac(&mut self, key: HmacKey, data: &[&[u8]]) -> TeeResult<HmacTag> {
        if !self.present {
            return Err(TeeError::NotSupported);
        }
        match key {
            HmacKey::Array(key) => {
                let _guard = self.accel.acquire();
                Ok(Hmac256::mac(key, data))
            }
            HmacKey::Fuse(block) => {
                let fused = self.fuses.read_key(block, KeyPurpose::HmacUp)?;
                let _guard = self.accel.acquire();
                Ok(Hmac256::mac(fused.as_ref(), data))
            }
        }
    }
}
