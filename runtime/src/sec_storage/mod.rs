/*++

Licensed under the Apache-2.0 license.

File Name:

    mod.rs

Abstract:

    File contains the secure key store. Keys are kept as fixed size records
    inside an encrypted flash namespace and are only ever used in place.

--*/

mod record;

pub use record::{
    AesKeyMaterial, EcdsaKeyMaterial, KeyFlags, KeyMaterial, KeyRecord, KeyType, AES256_IV_SIZE,
    AES256_KEY_SIZE, KEY_RECORD_SIZE,
};

use crate::{Drivers, RootKey};
use tee_drivers::{
    cprintln, pbkdf2_hmac_sha256, EcdsaCurve, EcdsaPrivKey, EcdsaPubKey, EcdsaSignature,
    FuseKeyBlock, SecureNamespace, StorageError, TeeError, TeeResult, AES_GCM_IV_BYTES,
    FLASH_NAME_MAX_SIZE,
};
use zeroize::Zeroizing;

/// Longest accepted salt for derived key signing
pub const DERIVED_KEY_SALT_MAX_SIZE: usize = 64;

/// Longest accepted hash for signing
pub const SIGN_HASH_MAX_SIZE: usize = 64;

/// Length of the PBKDF2 output used as a P-256 scalar
const DERIVED_KEY_SIZE: usize = 32;

/// Secure storage configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecStorageConfig {
    /// Fuse block holding the `HmacUp` key the namespace keys derive from
    pub namespace_key_block: FuseKeyBlock,

    /// Fuse block keying PBKDF2 for derived key signing. `None` disables it.
    pub pbkdf2_key_block: Option<FuseKeyBlock>,

    /// Encrypted flash namespace holding the key records
    pub namespace: String,

    /// PBKDF2-HMAC-SHA256 iteration count for derived key signing
    pub pbkdf2_iterations: u32,
}

impl Default for SecStorageConfig {
    fn default() -> Self {
        Self {
            namespace_key_block: FuseKeyBlock::Block4,
            pbkdf2_key_block: Some(FuseKeyBlock::Block5),
            namespace: "tee_sec_stg".into(),
            pbkdf2_iterations: 2048,
        }
    }
}

impl SecStorageConfig {
    /// Validate the configuration
    ///
    /// # Returns
    ///
    /// * `TeeError::InvalidArgument` - Bad namespace name, zero iterations or
    ///   both features keyed by the same fuse block
    pub fn validate(&self) -> TeeResult<()> {
        if self.namespace.is_empty() || self.namespace.len() > FLASH_NAME_MAX_SIZE {
            return Err(TeeError::InvalidArgument);
        }
        if self.pbkdf2_iterations == 0 {
            return Err(TeeError::InvalidArgument);
        }
        if self.pbkdf2_key_block == Some(self.namespace_key_block) {
            return Err(TeeError::InvalidArgument);
        }
        Ok(())
    }
}

fn check_key_id(key_id: &str) -> TeeResult<()> {
    if key_id.is_empty() || key_id.len() > FLASH_NAME_MAX_SIZE {
        return Err(TeeError::InvalidArgument);
    }
    Ok(())
}

fn check_hash(curve: EcdsaCurve, hash: &[u8]) -> TeeResult<()> {
    if hash.is_empty() {
        return Err(TeeError::InvalidArgument);
    }
    if hash.len() < curve.coord_size() / 2 || hash.len() > SIGN_HASH_MAX_SIZE {
        return Err(TeeError::InvalidSize);
    }
    Ok(())
}

fn map_storage_err(err: TeeError) -> TeeError {
    match err {
        TeeError::Storage(StorageError::NotFound) => TeeError::NotFound,
        err => err,
    }
}

/// Secure key store
pub struct SecureStorage {
    config: SecStorageConfig,
    ns: Option<SecureNamespace>,
}

impl Default for SecureStorage {
    fn default() -> Self {
        Self::new(SecStorageConfig::default())
    }
}

impl SecureStorage {
    pub fn new(config: SecStorageConfig) -> Self {
        Self { config, ns: None }
    }

    pub fn config(&self) -> &SecStorageConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.ns.is_some()
    }

    /// Derive the namespace keys and open the namespace
    ///
    /// Calling it on an initialized store does nothing.
    ///
    /// # Arguments
    ///
    /// * `drivers` - Drivers
    pub fn init(&mut self, drivers: &mut Drivers) -> TeeResult<()> {
        if self.ns.is_some() {
            return Ok(());
        }
        self.config.validate()?;

        let keys = RootKey::derive(drivers, self.config.namespace_key_block)?;
        let ns = SecureNamespace::open(
            &drivers.flash,
            &self.config.namespace,
            keys,
            drivers.aes.clone(),
            drivers.trng.clone(),
        )?;
        self.ns = Some(ns);
        cprintln!("[sec_stg] Initialized namespace {}", self.config.namespace.as_str());
        Ok(())
    }

    /// Close the namespace and drop its keys
    pub fn teardown(&mut self) {
        if let Some(mut ns) = self.ns.take() {
            ns.discard();
            cprintln!("[sec_stg] Closed namespace {}", ns.name());
        }
    }

    fn namespace(&mut self) -> TeeResult<&mut SecureNamespace> {
        self.ns.as_mut().ok_or(TeeError::InvalidState)
    }

    fn persist<F>(&mut self, op: F) -> TeeResult<()>
    where
        F: FnOnce(&mut SecureNamespace) -> TeeResult<()>,
    {
        let ns = self.namespace()?;
        match op(ns).and_then(|_| ns.commit()) {
            Ok(()) => Ok(()),
            Err(err) => {
                ns.discard();
                Err(map_storage_err(err))
            }
        }
    }

    fn load(&mut self, key_id: &str) -> TeeResult<KeyRecord> {
        check_key_id(key_id)?;
        let ns = self.namespace()?;
        let blob = Zeroizing::new(ns.get_blob(key_id).map_err(map_storage_err)?);
        KeyRecord::decode(&blob)
    }

    fn load_ecdsa(&mut self, key_id: &str, key_type: KeyType) -> TeeResult<EcdsaKeyMaterial> {
        let record = self.load(key_id)?;
        if record.key_type() != key_type {
            return Err(TeeError::InvalidState);
        }
        match record.material {
            KeyMaterial::Ecdsa(material) => Ok(material),
            KeyMaterial::Aes(_) => Err(TeeError::InvalidState),
        }
    }

    fn load_aes(&mut self, key_id: &str) -> TeeResult<AesKeyMaterial> {
        match self.load(key_id)?.material {
            KeyMaterial::Aes(material) => Ok(material),
            KeyMaterial::Ecdsa(_) => Err(TeeError::InvalidState),
        }
    }

    /// Whether a key is stored under `key_id`
    pub fn key_exists(&mut self, key_id: &str) -> TeeResult<bool> {
        check_key_id(key_id)?;
        self.namespace()?.contains(key_id)
    }

    /// Type of the key stored under `key_id`
    pub fn key_type(&mut self, key_id: &str) -> TeeResult<KeyType> {
        Ok(self.load(key_id)?.key_type())
    }

    /// Remove a key
    ///
    /// # Returns
    ///
    /// * `TeeError::NotFound` - No such key
    /// * `TeeError::InvalidState` - Key is write-once
    pub fn clear_key(&mut self, key_id: &str) -> TeeResult<()> {
        let record = self.load(key_id)?;
        if record.flags.contains(KeyFlags::WRITE_ONCE) {
            cprintln!("[sec_stg] Key {} is write-once", key_id);
            return Err(TeeError::InvalidState);
        }
        self.persist(|ns| ns.erase_key(key_id))?;
        cprintln!("[sec_stg] Cleared key {}", key_id);
        Ok(())
    }

    /// Generate and store a key
    ///
    /// # Arguments
    ///
    /// * `drivers` - Drivers
    /// * `key_id` - Key identifier
    /// * `key_type` - Type of the key
    /// * `flags` - Record flags
    ///
    /// # Returns
    ///
    /// * `TeeError::InvalidState` - A key is already stored under `key_id`
    /// * `TeeError::NotSupported` - Curve not available on this SoC
    pub fn generate_key(
        &mut self,
        drivers: &mut Drivers,
        key_id: &str,
        key_type: KeyType,
        flags: KeyFlags,
    ) -> TeeResult<()> {
        if self.key_exists(key_id)? {
            return Err(TeeError::InvalidState);
        }

        let material = match key_type.curve() {
            None => {
                let mut aes = AesKeyMaterial {
                    key: [0u8; AES256_KEY_SIZE],
                    iv: [0u8; AES256_IV_SIZE],
                };
                drivers.trng.fill(&mut aes.key)?;
                drivers.trng.fill(&mut aes.iv)?;
                KeyMaterial::Aes(aes)
            }
            Some(curve) => {
                let (priv_key, pub_key) = drivers.ecdsa.key_pair(curve)?;
                KeyMaterial::Ecdsa(EcdsaKeyMaterial::new(
                    curve,
                    priv_key.as_bytes(),
                    pub_key.x(),
                    pub_key.y(),
                )?)
            }
        };
        let record = KeyRecord { flags, material };
        let encoded = record.encode();
        self.persist(|ns| ns.set_blob(key_id, &encoded[..]))?;

        cprintln!(
            "[sec_stg] Generated key {} type {} flags {}",
            key_id,
            u32::from(key_type),
            flags.bits()
        );
        Ok(())
    }

    /// Sign a hash with a stored ECDSA key
    ///
    /// # Arguments
    ///
    /// * `drivers` - Drivers
    /// * `key_id` - Key identifier
    /// * `key_type` - Expected type of the stored key
    /// * `hash` - Hash to sign, half the curve length up to 64 bytes
    ///
    /// # Returns
    ///
    /// * `EcdsaSignature` - Raw `r` and `s`, each of the curve length
    pub fn sign(
        &mut self,
        drivers: &mut Drivers,
        key_id: &str,
        key_type: KeyType,
        hash: &[u8],
    ) -> TeeResult<EcdsaSignature> {
        let curve = key_type.curve().ok_or(TeeError::InvalidArgument)?;
        check_hash(curve, hash)?;
        let material = self.load_ecdsa(key_id, key_type)?;
        let priv_key = EcdsaPrivKey::from_slice(curve, material.priv_key())?;
        drivers.ecdsa.sign(&priv_key, hash)
    }

    /// Public key of a stored ECDSA key
    pub fn get_pubkey(
        &mut self,
        drivers: &mut Drivers,
        key_id: &str,
        key_type: KeyType,
    ) -> TeeResult<EcdsaPubKey> {
        let curve = key_type.curve().ok_or(TeeError::InvalidArgument)?;
        if curve == EcdsaCurve::Secp384r1 && !drivers.soc.has_p384 {
            return Err(TeeError::NotSupported);
        }
        let material = self.load_ecdsa(key_id, key_type)?;
        EcdsaPubKey::from_coordinates(curve, material.pub_x(), material.pub_y())
    }

    fn nonce(material: &AesKeyMaterial) -> [u8; AES_GCM_IV_BYTES] {
        let mut nonce = [0u8; AES_GCM_IV_BYTES];
        nonce.copy_from_slice(&material.iv[..AES_GCM_IV_BYTES]);
        nonce
    }

    /// AES-256-GCM encryption with a stored key
    ///
    /// The nonce is the leading 12 bytes of the IV fixed when the key was
    /// generated, so every call under one key reuses it.
    ///
    /// # Arguments
    ///
    /// * `drivers` - Drivers
    /// * `key_id` - Key identifier
    /// * `aad` - Additional authenticated data
    /// * `input` - Plaintext, non-empty
    /// * `output` - Ciphertext, at least `input.len()` bytes
    /// * `tag` - Tag output, 12 to 16 bytes
    pub fn aead_encrypt(
        &mut self,
        drivers: &mut Drivers,
        key_id: &str,
        aad: &[u8],
        input: &[u8],
        output: &mut [u8],
        tag: &mut [u8],
    ) -> TeeResult<()> {
        if input.is_empty() {
            return Err(TeeError::InvalidArgument);
        }
        let material = self.load_aes(key_id)?;
        drivers.aes.gcm_encrypt(
            &material.key,
            &Self::nonce(&material),
            aad,
            input,
            output,
            tag,
        )
    }

    /// AES-256-GCM decryption with a stored key
    ///
    /// # Returns
    ///
    /// * `TeeError::InvalidState` - Tag mismatch or not an AES key
    pub fn aead_decrypt(
        &mut self,
        drivers: &mut Drivers,
        key_id: &str,
        aad: &[u8],
        input: &[u8],
        tag: &[u8],
        output: &mut [u8],
    ) -> TeeResult<()> {
        if input.is_empty() {
            return Err(TeeError::InvalidArgument);
        }
        let material = self.load_aes(key_id)?;
        drivers.aes.gcm_decrypt(
            &material.key,
            &Self::nonce(&material),
            aad,
            input,
            tag,
            output,
        )
    }

    /// Sign a hash with a P-256 key derived from a fused key and `salt`
    ///
    /// The scalar is `PBKDF2-HMAC-SHA256(fuse_key, salt)` and only exists for
    /// the duration of the call.
    ///
    /// # Arguments
    ///
    /// * `drivers` - Drivers
    /// * `salt` - Salt, 1 to 64 bytes
    /// * `hash` - Hash to sign
    ///
    /// # Returns
    ///
    /// * `(EcdsaSignature, EcdsaPubKey)` - Signature and the derived public key
    pub fn sign_with_derived_key(
        &mut self,
        drivers: &mut Drivers,
        salt: &[u8],
        hash: &[u8],
    ) -> TeeResult<(EcdsaSignature, EcdsaPubKey)> {
        self.namespace()?;
        let block = self
            .config
            .pbkdf2_key_block
            .ok_or(TeeError::NotSupported)?;
        if !drivers.hmac.is_present() {
            return Err(TeeError::NotSupported);
        }
        if salt.is_empty() {
            return Err(TeeError::InvalidArgument);
        }
        if salt.len() > DERIVED_KEY_SALT_MAX_SIZE {
            return Err(TeeError::InvalidSize);
        }
        check_hash(EcdsaCurve::Secp256r1, hash)?;

        let mut scalar = Zeroizing::new([0u8; DERIVED_KEY_SIZE]);
        pbkdf2_hmac_sha256(
            &mut drivers.hmac,
            block.into(),
            salt,
            self.config.pbkdf2_iterations,
            &mut scalar[..],
        )?;
        let priv_key = EcdsaPrivKey::from_slice(EcdsaCurve::Secp256r1, &scalar[..])?;
        let pub_key = drivers.ecdsa.public_key(&priv_key)?;
        let signature = drivers.ecdsa.sign(&priv_key, hash)?;
        Ok((signature, pub_key))
    }
}
