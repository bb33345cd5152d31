// Licensed under the Apache-2.0 license
#![allow(dead_code)]

use tee_drivers::{
    FlashPartition, FuseBank, FuseKeyBlock, FwComponent, ImageInfo, ImageInfoBank, KeyPurpose,
    SocConfig,
};
use tee_runtime::{Drivers, SecureStorage};

pub const NAMESPACE_FUSE_KEY: [u8; 32] = [0x3c; 32];
pub const PBKDF2_FUSE_KEY: [u8; 32] = [0xc3; 32];
pub const MAC_ADDRESS: [u8; 6] = [0x24, 0x0a, 0xc4, 0x12, 0x34, 0x56];
pub const CHIP_REVISION: u32 = 301;

pub fn fuse_bank() -> FuseBank {
    let fuses = FuseBank::new(MAC_ADDRESS, CHIP_REVISION);
    fuses
        .program_key(FuseKeyBlock::Block4, KeyPurpose::HmacUp, &NAMESPACE_FUSE_KEY)
        .unwrap();
    fuses
        .program_key(FuseKeyBlock::Block5, KeyPurpose::HmacUp, &PBKDF2_FUSE_KEY)
        .unwrap();
    fuses
}

pub fn image_info(version: &str, secure_padding: bool) -> ImageInfo {
    ImageInfo {
        version: version.into(),
        platform_version: "v5.4".into(),
        secure_version: 2,
        min_chip_rev: 0,
        max_chip_rev: 399,
        digest: [0x6b; 32],
        digest_validated: true,
        sign_verified: true,
        secure_padding,
    }
}

pub fn image_info_bank(with_tee: bool) -> ImageInfoBank {
    let mut images = ImageInfoBank::new();
    images
        .insert(FwComponent::Bootloader, image_info("bl-v1.0", false))
        .unwrap();
    images
        .insert(FwComponent::App, image_info("app-v2.1", true))
        .unwrap();
    if with_tee {
        images
            .insert(FwComponent::Tee, image_info("tee-v1.3", true))
            .unwrap();
    }
    images
}

pub fn drivers_with(soc: SocConfig, flash: FlashPartition) -> Drivers {
    Drivers::new(soc, fuse_bank(), flash, image_info_bank(true))
}

pub fn drivers() -> Drivers {
    drivers_with(SocConfig::default(), FlashPartition::default())
}

pub fn init_store(drivers: &mut Drivers) -> SecureStorage {
    let mut store = SecureStorage::default();
    store.init(drivers).unwrap();
    store
}
