/*++

Licensed under the Apache-2.0 license.

File Name:

    flash.rs

Abstract:

    File contains the persistent storage model: a flash partition holding
    named entries grouped in namespaces, and an encrypted namespace handle
    that seals every entry with AES-256-GCM under the namespace keys.

--*/

use crate::{cprintln, Aes, Trng, AES_GCM_IV_BYTES};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use tee_emu_crypto::Hmac256;
use tee_error::{StorageError, TeeError, TeeResult};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Longest namespace or entry name, in bytes
pub const FLASH_NAME_MAX_SIZE: usize = 15;

/// Largest value stored in one entry, in bytes
pub const FLASH_MAX_BLOB_SIZE: usize = 4000;

/// Default number of entries a partition holds
pub const FLASH_DEFAULT_MAX_ENTRIES: usize = 126;

const SEAL_TAG_SIZE: usize = 16;
const SEAL_OVERHEAD: usize = AES_GCM_IV_BYTES + SEAL_TAG_SIZE;
const KEY_CHECK_ENTRY: &str = "\0key-check";
const KEY_CHECK_VALUE: &[u8] = b"namespace key check v1";

#[derive(Default)]
struct NamespaceData {
    key_check: Option<Vec<u8>>,
    entries: BTreeMap<String, Vec<u8>>,
}

struct PartitionState {
    namespaces: BTreeMap<String, NamespaceData>,
    max_entries: usize,
}

impl PartitionState {
    fn entry_count(&self) -> usize {
        self.namespaces.values().map(|ns| ns.entries.len()).sum()
    }
}

/// Flash partition
///
/// Clones refer to the same partition; content survives any number of
/// namespace handles being opened and dropped, which models a restart.
#[derive(Clone)]
pub struct FlashPartition {
    state: Arc<Mutex<PartitionState>>,
}

impl Default for FlashPartition {
    fn default() -> Self {
        Self::new(FLASH_DEFAULT_MAX_ENTRIES)
    }
}

impl FlashPartition {
    /// Create an erased partition
    ///
    /// # Arguments
    ///
    /// * `max_entries` - Number of entries the partition can hold
    pub fn new(max_entries: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(PartitionState {
                namespaces: BTreeMap::new(),
                max_entries,
            })),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut PartitionState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Number of committed entries across all namespaces
    pub fn entry_count(&self) -> usize {
        self.with_state(|state| state.entry_count())
    }

    /// Raw (sealed) content of a committed entry
    pub fn raw_entry(&self, namespace: &str, name: &str) -> Option<Vec<u8>> {
        self.with_state(|state| {
            state
                .namespaces
                .get(namespace)
                .and_then(|ns| ns.entries.get(name).cloned())
        })
    }

    /// Overwrite the raw content of a committed entry
    pub fn write_raw_entry(&self, namespace: &str, name: &str, data: &[u8]) -> TeeResult<()> {
        self.with_state(|state| {
            let entry = state
                .namespaces
                .get_mut(namespace)
                .and_then(|ns| ns.entries.get_mut(name))
                .ok_or(TeeError::Storage(StorageError::NotFound))?;
            entry.clear();
            entry.extend_from_slice(data);
            Ok(())
        })
    }

    /// Erase the whole partition
    pub fn erase(&self) {
        self.with_state(|state| state.namespaces.clear());
    }
}

/// Encryption and tweak keys of a namespace
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct NamespaceKeys {
    ekey: [u8; 32],
    tkey: [u8; 32],
}

impl NamespaceKeys {
    pub fn new(ekey: [u8; 32], tkey: [u8; 32]) -> Self {
        Self { ekey, tkey }
    }

    pub fn ekey(&self) -> &[u8; 32] {
        &self.ekey
    }

    pub fn tkey(&self) -> &[u8; 32] {
        &self.tkey
    }
}

fn check_name(name: &str) -> TeeResult<()> {
    if name.is_empty() {
        return Err(TeeError::InvalidArgument);
    }
    if name.len() > FLASH_NAME_MAX_SIZE {
        return Err(TeeError::Storage(StorageError::ValueTooLong));
    }
    Ok(())
}

/// Handle to an encrypted namespace of a flash partition
///
/// Writes and erases are staged in the handle and reach the partition on
/// `commit`. Staged entries are kept sealed.
pub struct SecureNamespace {
    partition: FlashPartition,
    name: String,
    keys: NamespaceKeys,
    aes: Aes,
    trng: Trng,
    pending: BTreeMap<String, Option<Vec<u8>>>,
}

impl SecureNamespace {
    /// Open a namespace, formatting it on first use
    ///
    /// # Arguments
    ///
    /// * `partition` - Flash partition
    /// * `name` - Namespace name
    /// * `keys` - Namespace keys
    /// * `aes` - AES driver used for sealing
    /// * `trng` - TRNG driver used for nonces
    ///
    /// # Returns
    ///
    /// * `StorageError::Corrupted` - Namespace was formatted with other keys
    pub fn open(
        partition: &FlashPartition,
        name: &str,
        keys: NamespaceKeys,
        aes: Aes,
        trng: Trng,
    ) -> TeeResult<Self> {
        check_name(name)?;
        let mut ns = Self {
            partition: partition.clone(),
            name: name.into(),
            keys,
            aes,
            trng,
            pending: BTreeMap::new(),
        };

        let existing = partition.with_state(|state| {
            state
                .namespaces
                .get(name)
                .and_then(|data| data.key_check.clone())
        });
        match existing {
            Some(sealed) => {
                let value = ns.unseal(KEY_CHECK_ENTRY, &sealed)?;
                if value != KEY_CHECK_VALUE {
                    return Err(TeeError::Storage(StorageError::Corrupted));
                }
            }
            None => {
                let sealed = ns.seal(KEY_CHECK_ENTRY, KEY_CHECK_VALUE)?;
                partition.with_state(|state| {
                    state.namespaces.entry(name.into()).or_default().key_check = Some(sealed);
                });
                cprintln!("[flash] Formatted namespace {}", name);
            }
        }
        Ok(ns)
    }

    /// Namespace name
    pub fn name(&self) -> &str {
        &self.name
    }

    fn aad(&self, entry: &str) -> [u8; 32] {
        Hmac256::mac(
            &self.keys.tkey,
            &[self.name.as_bytes(), &[0u8], entry.as_bytes()],
        )
    }

    fn seal(&mut self, entry: &str, data: &[u8]) -> TeeResult<Vec<u8>> {
        let nonce: [u8; AES_GCM_IV_BYTES] = self.trng.generate()?;
        let aad = self.aad(entry);

        let mut sealed = Vec::new();
        sealed
            .try_reserve_exact(data.len() + SEAL_OVERHEAD)
            .map_err(|_| TeeError::NoMemory)?;
        sealed.resize(data.len() + SEAL_OVERHEAD, 0);

        let (iv, rest) = sealed.split_at_mut(AES_GCM_IV_BYTES);
        let (ciphertext, tag) = rest.split_at_mut(data.len());
        iv.copy_from_slice(&nonce);
        self.aes
            .gcm_encrypt(&self.keys.ekey, &nonce, &aad, data, ciphertext, tag)?;
        Ok(sealed)
    }

    fn unseal(&mut self, entry: &str, sealed: &[u8]) -> TeeResult<Vec<u8>> {
        if sealed.len() < SEAL_OVERHEAD {
            return Err(TeeError::Storage(StorageError::Corrupted));
        }
        let (iv, rest) = sealed.split_at(AES_GCM_IV_BYTES);
        let (ciphertext, tag) = rest.split_at(rest.len() - SEAL_TAG_SIZE);
        let mut nonce = [0u8; AES_GCM_IV_BYTES];
        nonce.copy_from_slice(iv);
        let aad = self.aad(entry);

        let mut plaintext = Vec::new();
        plaintext
            .try_reserve_exact(ciphertext.len())
            .map_err(|_| TeeError::NoMemory)?;
        plaintext.resize(ciphertext.len(), 0);
        self.aes
            .gcm_decrypt(&self.keys.ekey, &nonce, &aad, ciphertext, tag, &mut plaintext)
            .map_err(|_| TeeError::Storage(StorageError::Corrupted))?;
        Ok(plaintext)
    }

    fn committed(&self, entry: &str) -> Option<Vec<u8>> {
        self.partition.raw_entry(&self.name, entry)
    }

    fn lookup(&self, entry: &str) -> Option<Vec<u8>> {
        match self.pending.get(entry) {
            Some(staged) => staged.clone(),
            None => self.committed(entry),
        }
    }

    /// Whether the entry exists, including staged changes
    pub fn contains(&self, entry: &str) -> TeeResult<bool> {
        check_name(entry)?;
        Ok(self.lookup(entry).is_some())
    }

    /// Read and authenticate an entry
    ///
    /// # Returns
    ///
    /// * `StorageError::NotFound` - No such entry
    /// * `StorageError::Corrupted` - Entry does not authenticate under the namespace keys
    pub fn get_blob(&mut self, entry: &str) -> TeeResult<Vec<u8>> {
        check_name(entry)?;
        let sealed = self
            .lookup(entry)
            .ok_or(TeeError::Storage(StorageError::NotFound))?;
        self.unseal(entry, &sealed)
    }

    /// Stage a write of an entry
    pub fn set_blob(&mut self, entry: &str, data: &[u8]) -> TeeResult<()> {
        check_name(entry)?;
        if data.len() > FLASH_MAX_BLOB_SIZE {
            return Err(TeeError::Storage(StorageError::ValueTooLong));
        }
        if self.lookup(entry).is_none() {
            let staged_new = self
                .pending
                .iter()
                .filter(|(name, value)| value.is_some() && self.committed(name).is_none())
                .count();
            let full = self.partition.with_state(|state| {
                state.entry_count() + staged_new >= state.max_entries
            });
            if full {
                return Err(TeeError::Storage(StorageError::PartitionFull));
            }
        }
        let sealed = self.seal(entry, data)?;
        self.pending.insert(entry.into(), Some(sealed));
        Ok(())
    }

    /// Stage the removal of an entry
    pub fn erase_key(&mut self, entry: &str) -> TeeResult<()> {
        if !self.contains(entry)? {
            return Err(TeeError::Storage(StorageError::NotFound));
        }
        self.pending.insert(entry.into(), None);
        Ok(())
    }

    /// Write all staged changes to the partition
    pub fn commit(&mut self) -> TeeResult<()> {
        let pending = core::mem::take(&mut self.pending);
        let name = self.name.clone();
        self.partition.with_state(|state| {
            let ns = state.namespaces.entry(name).or_default();
            for (entry, value) in pending {
                match value {
                    Some(sealed) => {
                        ns.entries.insert(entry, sealed);
                    }
                    None => {
                        ns.entries.remove(&entry);
                    }
                }
            }
        });
        Ok(())
    }

    /// Drop all staged changes
    pub fn discard(&mut self) {
        self.pending.clear();
    }
}
