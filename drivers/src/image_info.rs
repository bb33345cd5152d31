/*++

Licensed under the Apache-2.0 license.

File Name:

    image_info.rs

Abstract:

    File contains the firmware image metadata reported by the boot chain
    for each installed firmware partition.

--*/

use crate::{TeeError, TeeResult};
use std::collections::BTreeMap;

/// Longest version string carried in an image descriptor
pub const IMAGE_VERSION_MAX_LEN: usize = 32;

/// Firmware component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FwComponent {
    Bootloader,
    Tee,
    App,
}

/// Metadata of one firmware image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub version: String,
    pub platform_version: String,
    pub secure_version: u32,
    pub min_chip_rev: u32,
    pub max_chip_rev: u32,

    /// SHA-256 of the image as computed at boot
    pub digest: [u8; 32],
    pub digest_validated: bool,
    pub sign_verified: bool,
    pub secure_padding: bool,
}

/// Image metadata of all installed firmware partitions
#[derive(Debug, Clone, Default)]
pub struct ImageInfoBank {
    images: BTreeMap<FwComponent, ImageInfo>,
}

impl ImageInfoBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the metadata of a component
    ///
    /// # Returns
    ///
    /// * `TeeError::InvalidSize` - A version string is too long
    pub fn insert(&mut self, component: FwComponent, info: ImageInfo) -> TeeResult<()> {
        if info.version.len() > IMAGE_VERSION_MAX_LEN
            || info.platform_version.len() > IMAGE_VERSION_MAX_LEN
        {
            return Err(TeeError::InvalidSize);
        }
        self.images.insert(component, info);
        Ok(())
    }

    pub fn remove(&mut self, component: FwComponent) -> Option<ImageInfo> {
        self.images.remove(&component)
    }

    /// Metadata of a component
    ///
    /// # Returns
    ///
    /// * `TeeError::NotSupported` - Component not installed on this platform
    pub fn image_info(&self, component: FwComponent) -> TeeResult<ImageInfo> {
        self.images
            .get(&component)
            .cloned()
            .ok_or(TeeError::NotSupported)
    }
}
