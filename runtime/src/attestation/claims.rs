// Licensed under the Apache-2.0 license

use tee_drivers::{cprintln, FwComponent, ImageInfo, ImageInfoBank, TeeError, TeeResult};
use tee_eat::{ChipRevRange, ClaimComponent, DigestKind, PartDigest, SwClaim};

fn claim_component(component: FwComponent) -> ClaimComponent {
    match component {
        FwComponent::Bootloader => ClaimComponent::Bootloader,
        FwComponent::Tee => ClaimComponent::Tee,
        FwComponent::App => ClaimComponent::App,
    }
}

fn build_claim(component: FwComponent, info: ImageInfo) -> SwClaim {
    let component = claim_component(component);
    SwClaim {
        component,
        version: info.version,
        platform_version: info.platform_version,
        secure_version: info.secure_version,
        chip_rev: ChipRevRange {
            min: info.min_chip_rev,
            max: info.max_chip_rev,
        },
        digest: PartDigest {
            kind: DigestKind::Sha256,
            digest: info.digest,
            digest_validated: info.digest_validated,
            sign_verified: info.sign_verified,
            secure_padding: component
                .has_secure_padding()
                .then_some(info.secure_padding),
        },
    }
}

/// Collect the software claims of the installed firmware
///
/// Bootloader and app claims are mandatory. A TEE claim is appended only when
/// the platform reports a TEE image.
///
/// # Arguments
///
/// * `images` - Firmware image metadata
///
/// # Returns
///
/// * `Vec<SwClaim>` - Claims in bootloader, app, tee order
pub fn collect_claims(images: &ImageInfoBank) -> TeeResult<Vec<SwClaim>> {
    let mut claims = Vec::new();
    claims.try_reserve(3).map_err(|_| TeeError::NoMemory)?;

    for component in [FwComponent::Bootloader, FwComponent::App] {
        let info = images.image_info(component).map_err(|err| {
            cprintln!("[att] Missing mandatory image metadata");
            err
        })?;
        claims.push(build_claim(component, info));
    }

    match images.image_info(FwComponent::Tee) {
        Ok(info) => claims.push(build_claim(FwComponent::Tee, info)),
        Err(TeeError::NotSupported) => (),
        Err(err) => return Err(err),
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(version: &str, secure_padding: bool) -> ImageInfo {
        ImageInfo {
            version: version.into(),
            platform_version: "v5.4".into(),
            secure_version: 3,
            min_chip_rev: 0,
            max_chip_rev: 399,
            digest: [0x5a; 32],
            digest_validated: true,
            sign_verified: false,
            secure_padding,
        }
    }

    #[test]
    fn test_order_and_padding() {
        let mut images = ImageInfoBank::new();
        images.insert(FwComponent::Tee, info("tee-1", true)).unwrap();
        images.insert(FwComponent::App, info("app-1", true)).unwrap();
        images
            .insert(FwComponent::Bootloader, info("bl-1", true))
            .unwrap();

        let claims = collect_claims(&images).unwrap();
        let components: Vec<_> = claims.iter().map(|c| c.component).collect();
        assert_eq!(
            components,
            [
                ClaimComponent::Bootloader,
                ClaimComponent::App,
                ClaimComponent::Tee
            ]
        );
        assert_eq!(claims[0].digest.secure_padding, None);
        assert_eq!(claims[1].digest.secure_padding, Some(true));
        assert_eq!(claims[2].digest.secure_padding, Some(true));
        assert_eq!(claims[0].version, "bl-1");
        assert_eq!(claims[0].chip_rev, ChipRevRange { min: 0, max: 399 });
        assert_eq!(claims[0].digest.kind, DigestKind::Sha256);
    }

    #[test]
    fn test_tee_omitted() {
        let mut images = ImageInfoBank::new();
        images.insert(FwComponent::App, info("app-1", false)).unwrap();
        images
            .insert(FwComponent::Bootloader, info("bl-1", false))
            .unwrap();

        let claims = collect_claims(&images).unwrap();
        assert_eq!(claims.len(), 2);
        assert_eq!(claims[1].digest.secure_padding, Some(false));
    }

    #[test]
    fn test_mandatory_missing() {
        let mut images = ImageInfoBank::new();
        images.insert(FwComponent::Tee, info("tee-1", true)).unwrap();
        images
            .insert(FwComponent::Bootloader, info("bl-1", true))
            .unwrap();
        assert_eq!(collect_claims(&images), Err(TeeError::NotSupported));

        images.remove(FwComponent::Bootloader);
        images.insert(FwComponent::App, info("app-1", true)).unwrap();
        assert_eq!(collect_claims(&images), Err(TeeError::NotSupported));
    }
}
