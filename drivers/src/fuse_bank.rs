/*++

Licensed under the Apache-2.0 license.

File Name:

    fuse_bank.rs

Abstract:

    File contains API for the OTP Fuse Bank: key blocks with their purpose
    registers and the factory programmed device identity.

--*/

use crate::{TeeError, TeeResult};
use std::sync::{Arc, Mutex, PoisonError};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of a fused key in bytes
pub const FUSE_KEY_SIZE: usize = 32;

/// Key block identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FuseKeyBlock {
    Block0 = 0,
    Block1 = 1,
    Block2 = 2,
    Block3 = 3,
    Block4 = 4,
    Block5 = 5,
}

impl FuseKeyBlock {
    pub const COUNT: usize = 6;
}

impl From<FuseKeyBlock> for usize {
    /// Converts to this type from the input type.
    fn from(block: FuseKeyBlock) -> Self {
        block as Self
    }
}

/// Purpose register value of a key block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPurpose {
    User = 0,
    XtsAes256Key1 = 2,
    XtsAes256Key2 = 3,
    XtsAes128Key = 4,
    HmacDownAll = 5,
    HmacDownJtag = 6,
    HmacDownDigitalSignature = 7,
    /// Key usable by the HMAC peripheral for upstream (software visible) MACs
    HmacUp = 8,
    SecureBootDigest0 = 9,
    SecureBootDigest1 = 10,
    SecureBootDigest2 = 11,
}

/// Key material read back from a key block
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct FuseKey([u8; FUSE_KEY_SIZE]);

impl AsRef<[u8]> for FuseKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[derive(Zeroize)]
struct KeySlot {
    #[zeroize(skip)]
    purpose: KeyPurpose,
    key: [u8; FUSE_KEY_SIZE],
}

struct FuseState {
    key_blocks: [Option<KeySlot>; FuseKeyBlock::COUNT],
    mac_address: [u8; 6],
    chip_revision: u32,
}

/// Fuse Bank
///
/// Clones refer to the same fuses.
#[derive(Clone)]
pub struct FuseBank {
    state: Arc<Mutex<FuseState>>,
}

impl Default for FuseBank {
    fn default() -> Self {
        Self::new([0x02, 0x00, 0x00, 0x00, 0x00, 0x01], 0)
    }
}

impl FuseBank {
    /// Create a fuse bank with blank key blocks
    ///
    /// # Arguments
    ///
    /// * `mac_address` - Factory MAC address
    /// * `chip_revision` - Chip revision, `major * 100 + minor`
    pub fn new(mac_address: [u8; 6], chip_revision: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(FuseState {
                key_blocks: Default::default(),
                mac_address,
                chip_revision,
            })),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut FuseState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Burn a key and its purpose into a key block
    ///
    /// # Returns
    ///
    /// * `TeeError::InvalidState` - Block already programmed
    pub fn program_key(
        &self,
        block: FuseKeyBlock,
        purpose: KeyPurpose,
        key: &[u8; FUSE_KEY_SIZE],
    ) -> TeeResult<()> {
        self.with_state(|state| {
            let slot = &mut state.key_blocks[usize::from(block)];
            if slot.is_some() {
                return Err(TeeError::InvalidState);
            }
            *slot = Some(KeySlot { purpose, key: *key });
            Ok(())
        })
    }

    /// Purpose of a key block, `None` when unprogrammed
    pub fn key_purpose(&self, block: FuseKeyBlock) -> Option<KeyPurpose> {
        self.with_state(|state| {
            state.key_blocks[usize::from(block)]
                .as_ref()
                .map(|slot| slot.purpose)
        })
    }

    /// Read a key block that carries `purpose`
    ///
    /// # Returns
    ///
    /// * `TeeError::NotFound` - Block unprogrammed or carrying another purpose
    pub fn read_key(&self, block: FuseKeyBlock, purpose: KeyPurpose) -> TeeResult<FuseKey> {
        self.with_state(|state| match &state.key_blocks[usize::from(block)] {
            Some(slot) if slot.purpose == purpose => Ok(FuseKey(slot.key)),
            _ => Err(TeeError::NotFound),
        })
    }

    /// Factory MAC address
    pub fn mac_address(&self) -> [u8; 6] {
        self.with_state(|state| state.mac_address)
    }

    /// Chip revision, `major * 100 + minor`
    pub fn chip_revision(&self) -> u32 {
        self.with_state(|state| state.chip_revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_and_read() {
        let fuses = FuseBank::default();
        assert_eq!(fuses.key_purpose(FuseKeyBlock::Block2), None);
        fuses
            .program_key(FuseKeyBlock::Block2, KeyPurpose::HmacUp, &[7u8; 32])
            .unwrap();
        assert_eq!(
            fuses.key_purpose(FuseKeyBlock::Block2),
            Some(KeyPurpose::HmacUp)
        );
        let key = fuses
            .read_key(FuseKeyBlock::Block2, KeyPurpose::HmacUp)
            .unwrap();
        assert_eq!(key.as_ref(), &[7u8; 32]);
    }

    #[test]
    fn test_otp_cannot_reprogram() {
        let fuses = FuseBank::default();
        fuses
            .program_key(FuseKeyBlock::Block0, KeyPurpose::User, &[1u8; 32])
            .unwrap();
        assert_eq!(
            fuses.program_key(FuseKeyBlock::Block0, KeyPurpose::HmacUp, &[2u8; 32]),
            Err(TeeError::InvalidState)
        );
    }

    #[test]
    fn test_purpose_mismatch() {
        let fuses = FuseBank::default();
        fuses
            .program_key(FuseKeyBlock::Block1, KeyPurpose::XtsAes128Key, &[1u8; 32])
            .unwrap();
        assert_eq!(
            fuses
                .read_key(FuseKeyBlock::Block1, KeyPurpose::HmacUp)
                .err(),
            Some(TeeError::NotFound)
        );
        assert_eq!(
            fuses
                .read_key(FuseKeyBlock::Block3, KeyPurpose::HmacUp)
                .err(),
            Some(TeeError::NotFound)
        );
    }

    #[test]
    fn test_clones_share_fuses() {
        let fuses = FuseBank::new([1, 2, 3, 4, 5, 6], 301);
        let clone = fuses.clone();
        fuses
            .program_key(FuseKeyBlock::Block4, KeyPurpose::HmacUp, &[9u8; 32])
            .unwrap();
        assert_eq!(clone.key_purpose(FuseKeyBlock::Block4), Some(KeyPurpose::HmacUp));
        assert_eq!(clone.mac_address(), [1, 2, 3, 4, 5, 6]);
        assert_eq!(clone.chip_revision(), 301);
    }
}
