/*++

Licensed under the Apache-2.0 license.

File Name:

    record.rs

Abstract:

    File contains the persisted key record and its fixed size encoding.

--*/

use tee_drivers::{EcdsaCurve, StorageError, TeeError, TeeResult};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Size of an encoded key record, independent of the key type
pub const KEY_RECORD_SIZE: usize = 256;

const PAYLOAD_SIZE: usize = 144;
const RESERVED_SIZE: usize = 104;

pub const AES256_KEY_SIZE: usize = 32;
pub const AES256_IV_SIZE: usize = 16;

/// Type of a stored key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    Aes256 = 0,
    EcdsaSecp256r1 = 1,
    EcdsaSecp384r1 = 2,
}

impl KeyType {
    /// Curve of an ECDSA key type
    pub fn curve(self) -> Option<EcdsaCurve> {
        match self {
            KeyType::Aes256 => None,
            KeyType::EcdsaSecp256r1 => Some(EcdsaCurve::Secp256r1),
            KeyType::EcdsaSecp384r1 => Some(EcdsaCurve::Secp384r1),
        }
    }
}

impl From<KeyType> for u32 {
    /// Converts to this type from the input type.
    fn from(key_type: KeyType) -> Self {
        key_type as Self
    }
}

impl TryFrom<u32> for KeyType {
    type Error = TeeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(KeyType::Aes256),
            1 => Ok(KeyType::EcdsaSecp256r1),
            2 => Ok(KeyType::EcdsaSecp384r1),
            _ => Err(TeeError::Storage(StorageError::Corrupted)),
        }
    }
}

bitflags::bitflags! {
    /// Key record flags
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct KeyFlags: u32 {
        /// Key can never be cleared or regenerated
        const WRITE_ONCE = 0b0001;
    }
}

/// AES-256 key material
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct AesKeyMaterial {
    pub key: [u8; AES256_KEY_SIZE],
    pub iv: [u8; AES256_IV_SIZE],
}

/// ECDSA key material as raw big-endian scalars
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct EcdsaKeyMaterial {
    #[zeroize(skip)]
    curve: EcdsaCurve,
    priv_key: [u8; 48],
    pub_x: [u8; 48],
    pub_y: [u8; 48],
}

impl EcdsaKeyMaterial {
    pub fn new(curve: EcdsaCurve, priv_key: &[u8], pub_x: &[u8], pub_y: &[u8]) -> TeeResult<Self> {
        let len = curve.coord_size();
        if priv_key.len() != len || pub_x.len() != len || pub_y.len() != len {
            return Err(TeeError::InvalidSize);
        }
        let mut material = Self {
            curve,
            priv_key: [0u8; 48],
            pub_x: [0u8; 48],
            pub_y: [0u8; 48],
        };
        material.priv_key[..len].copy_from_slice(priv_key);
        material.pub_x[..len].copy_from_slice(pub_x);
        material.pub_y[..len].copy_from_slice(pub_y);
        Ok(material)
    }

    pub fn curve(&self) -> EcdsaCurve {
        self.curve
    }

    pub fn priv_key(&self) -> &[u8] {
        &self.priv_key[..self.curve.coord_size()]
    }

    pub fn pub_x(&self) -> &[u8] {
        &self.pub_x[..self.curve.coord_size()]
    }

    pub fn pub_y(&self) -> &[u8] {
        &self.pub_y[..self.curve.coord_size()]
    }
}

/// Key material of a record
pub enum KeyMaterial {
    Aes(AesKeyMaterial),
    Ecdsa(EcdsaKeyMaterial),
}

/// Key record
///
/// The key type is derived from the material so the two cannot disagree.
pub struct KeyRecord {
    pub flags: KeyFlags,
    pub material: KeyMaterial,
}

/// On flash layout of a key record, little-endian
#[repr(C)]
#[derive(FromBytes, Immutable, IntoBytes, KnownLayout, Zeroize, ZeroizeOnDrop)]
struct StoredKeyRecord {
    key_type: u32,
    flags: u32,
    payload: [u8; PAYLOAD_SIZE],
    reserved: [u8; RESERVED_SIZE],
}

const _: () = assert!(core::mem::size_of::<StoredKeyRecord>() == KEY_RECORD_SIZE);

impl KeyRecord {
    pub fn key_type(&self) -> KeyType {
        match &self.material {
            KeyMaterial::Aes(_) => KeyType::Aes256,
            KeyMaterial::Ecdsa(ecdsa) => match ecdsa.curve() {
                EcdsaCurve::Secp256r1 => KeyType::EcdsaSecp256r1,
                EcdsaCurve::Secp384r1 => KeyType::EcdsaSecp384r1,
            },
        }
    }

    /// Encode to the fixed size layout
    pub fn encode(&self) -> Zeroizing<[u8; KEY_RECORD_SIZE]> {
        let mut stored = StoredKeyRecord {
            key_type: u32::from(self.key_type()).to_le(),
            flags: self.flags.bits().to_le(),
            payload: [0u8; PAYLOAD_SIZE],
            reserved: [0u8; RESERVED_SIZE],
        };
        match &self.material {
            KeyMaterial::Aes(aes) => {
                stored.payload[..AES256_KEY_SIZE].copy_from_slice(&aes.key);
                stored.payload[AES256_KEY_SIZE..AES256_KEY_SIZE + AES256_IV_SIZE]
                    .copy_from_slice(&aes.iv);
            }
            KeyMaterial::Ecdsa(ecdsa) => {
                let len = ecdsa.curve().coord_size();
                stored.payload[..len].copy_from_slice(ecdsa.priv_key());
                stored.payload[len..2 * len].copy_from_slice(ecdsa.pub_x());
                stored.payload[2 * len..3 * len].copy_from_slice(ecdsa.pub_y());
            }
        }

        let mut out = Zeroizing::new([0u8; KEY_RECORD_SIZE]);
        out.copy_from_slice(stored.as_bytes());
        out
    }

    /// Decode from the fixed size layout
    ///
    /// # Returns
    ///
    /// * `StorageError::Corrupted` - Wrong length or unknown key type
    pub fn decode(bytes: &[u8]) -> TeeResult<Self> {
        let stored = StoredKeyRecord::read_from_bytes(bytes)
            .map_err(|_| TeeError::Storage(StorageError::Corrupted))?;
        let key_type = KeyType::try_from(u32::from_le(stored.key_type))?;
        let flags = KeyFlags::from_bits_retain(u32::from_le(stored.flags));

        let material = match key_type.curve() {
            None => {
                let mut aes = AesKeyMaterial {
                    key: [0u8; AES256_KEY_SIZE],
                    iv: [0u8; AES256_IV_SIZE],
                };
                aes.key.copy_from_slice(&stored.payload[..AES256_KEY_SIZE]);
                aes.iv.copy_from_slice(
                    &stored.payload[AES256_KEY_SIZE..AES256_KEY_SIZE + AES256_IV_SIZE],
                );
                KeyMaterial::Aes(aes)
            }
            Some(curve) => {
                let len = curve.coord_size();
                KeyMaterial::Ecdsa(EcdsaKeyMaterial::new(
                    curve,
                    &stored.payload[..len],
                    &stored.payload[len..2 * len],
                    &stored.payload[2 * len..3 * len],
                )?)
            }
        };
        Ok(Self { flags, material })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ecdsa_record(curve: EcdsaCurve) -> KeyRecord {
        let len = curve.coord_size();
        KeyRecord {
            flags: KeyFlags::WRITE_ONCE,
            material: KeyMaterial::Ecdsa(
                EcdsaKeyMaterial::new(curve, &vec![1u8; len], &vec![2u8; len], &vec![3u8; len])
                    .unwrap(),
            ),
        }
    }

    #[test]
    fn test_layout() {
        let record = KeyRecord {
            flags: KeyFlags::empty(),
            material: KeyMaterial::Aes(AesKeyMaterial {
                key: [0x11; 32],
                iv: [0x22; 16],
            }),
        };
        let bytes = record.encode();
        assert_eq!(bytes.len(), KEY_RECORD_SIZE);
        assert_eq!(&bytes[..8], &[0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&bytes[8..40], &[0x11; 32]);
        assert_eq!(&bytes[40..56], &[0x22; 16]);
        assert!(bytes[56..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_size_independent_of_type() {
        for curve in [EcdsaCurve::Secp256r1, EcdsaCurve::Secp384r1] {
            let record = ecdsa_record(curve);
            let bytes = record.encode();
            assert_eq!(bytes.len(), KEY_RECORD_SIZE);
            assert_eq!(&bytes[4..8], &1u32.to_le_bytes());

            let decoded = KeyRecord::decode(&bytes[..]).unwrap();
            assert_eq!(decoded.key_type(), record.key_type());
            assert_eq!(decoded.flags, KeyFlags::WRITE_ONCE);
            let KeyMaterial::Ecdsa(material) = &decoded.material else {
                panic!("expected ECDSA material");
            };
            assert_eq!(material.curve(), curve);
            assert!(material.priv_key().iter().all(|&b| b == 1));
            assert!(material.pub_x().iter().all(|&b| b == 2));
            assert!(material.pub_y().iter().all(|&b| b == 3));
        }
    }

    #[test]
    fn test_p384_fills_payload() {
        let bytes = ecdsa_record(EcdsaCurve::Secp384r1).encode();
        assert_eq!(&bytes[..4], &2u32.to_le_bytes());
        assert!(bytes[8..8 + PAYLOAD_SIZE].iter().all(|&b| b != 0));
    }

    #[test]
    fn test_decode_rejects() {
        let mut bytes = *ecdsa_record(EcdsaCurve::Secp256r1).encode();
        assert_eq!(
            KeyRecord::decode(&bytes[..255]).err(),
            Some(TeeError::Storage(StorageError::Corrupted))
        );
        bytes[0] = 7;
        assert_eq!(
            KeyRecord::decode(&bytes).err(),
            Some(TeeError::Storage(StorageError::Corrupted))
        );
    }

    #[test]
    fn test_unknown_flags_preserved() {
        let mut bytes = *ecdsa_record(EcdsaCurve::Secp256r1).encode();
        bytes[4] = 0x81;
        let decoded = KeyRecord::decode(&bytes).unwrap();
        assert!(decoded.flags.contains(KeyFlags::WRITE_ONCE));
        assert_eq!(decoded.flags.bits(), 0x81);
    }
}
