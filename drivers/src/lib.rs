/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the TEE driver models.

--*/

mod aes;
mod ecdsa;
mod flash;
mod fuse_bank;
mod hmac;
mod image_info;
mod pbkdf2;
mod sha256;
mod soc_ifc;
mod trng;

pub mod printer;

pub use aes::{
    Aes, AES_256_KEY_BYTES, AES_GCM_IV_BYTES, AES_GCM_MAX_TAG_BYTES, AES_GCM_MIN_TAG_BYTES,
};
pub use ecdsa::{Ecdsa, EcdsaCurve, EcdsaPrivKey, EcdsaPubKey, EcdsaResult, EcdsaSignature};
pub use flash::{
    FlashPartition, NamespaceKeys, SecureNamespace, FLASH_DEFAULT_MAX_ENTRIES,
    FLASH_MAX_BLOB_SIZE, FLASH_NAME_MAX_SIZE,
};
pub use fuse_bank::{FuseBank, FuseKey, FuseKeyBlock, KeyPurpose, FUSE_KEY_SIZE};
pub use hmac::{Hmac, HmacKey, HmacTag};
pub use image_info::{FwComponent, ImageInfo, ImageInfoBank, IMAGE_VERSION_MAX_LEN};
pub use pbkdf2::pbkdf2_hmac_sha256;
pub use sha256::{Sha256, Sha256Digest, Sha256DigestOp};
pub use soc_ifc::{Accelerator, SocConfig};
pub use tee_error::{StorageError, TeeError, TeeResult};
pub use trng::Trng;
