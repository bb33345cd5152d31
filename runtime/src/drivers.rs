// Licensed under the Apache-2.0 license

use tee_drivers::{
    Accelerator, Aes, Ecdsa, FlashPartition, FuseBank, Hmac, ImageInfoBank, Sha256, SocConfig,
    Trng,
};

/// Driver handles used by the secure services
///
/// Cloning yields handles to the same peripherals, fuses and flash.
#[derive(Clone)]
pub struct Drivers {
    pub soc: SocConfig,

    /// SHA-256 Engine
    pub sha256: Sha256,

    /// HMAC-SHA256 Engine
    pub hmac: Hmac,

    /// ECDSA Engine
    pub ecdsa: Ecdsa,

    /// AES-GCM Engine
    pub aes: Aes,

    /// True Random Number Generator
    pub trng: Trng,

    pub fuse_bank: FuseBank,

    pub flash: FlashPartition,

    /// Metadata of the installed firmware images
    pub image_info: ImageInfoBank,
}

impl Drivers {
    /// Bring up the drivers of a SoC
    ///
    /// # Arguments
    ///
    /// * `soc` - SoC capabilities
    /// * `fuse_bank` - OTP fuses
    /// * `flash` - Secure storage partition
    /// * `image_info` - Firmware image metadata from the boot chain
    pub fn new(
        soc: SocConfig,
        fuse_bank: FuseBank,
        flash: FlashPartition,
        image_info: ImageInfoBank,
    ) -> Self {
        Self {
            soc,
            sha256: Sha256::new(Accelerator::new()),
            hmac: Hmac::new(Accelerator::new(), fuse_bank.clone(), soc.has_hmac),
            ecdsa: Ecdsa::new(Accelerator::new(), soc.has_p384),
            aes: Aes::new(Accelerator::new()),
            trng: Trng::new(Accelerator::new()),
            fuse_bank,
            flash,
            image_info,
        }
    }
}
