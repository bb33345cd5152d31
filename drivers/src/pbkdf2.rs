/*++

Licensed under the Apache-2.0 license.

File Name:

    pbkdf2.rs

Abstract:

    PBKDF2 (RFC 8018 Section 5.2) with HMAC-SHA256 as the PRF, driven by the
    HMAC peripheral so the password may be a fused key.

--*/

use crate::{Hmac, HmacKey, HmacTag, TeeError, TeeResult};
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Default, Zeroize, ZeroizeOnDrop)]
struct Block {
    u: HmacTag,
    t: HmacTag,
}

/// Calculate PBKDF2-HMAC-SHA256
///
/// # Arguments
///
/// * `hmac` - HMAC context
/// * `key` - Password, used as the HMAC key
/// * `salt` - Salt
/// * `iterations` - Iteration count, at least 1
/// * `output` - Derived key material, any non-zero length
pub fn pbkdf2_hmac_sha256(
    hmac: &mut Hmac,
    key: HmacKey,
    salt: &[u8],
    iterations: u32,
    output: &mut [u8],
) -> TeeResult<()> {
    if iterations == 0 || output.is_empty() {
        return Err(TeeError::InvalidArgument);
    }

    for (index, chunk) in output.chunks_mut(core::mem::size_of::<HmacTag>()).enumerate() {
        let counter = u32::try_from(index + 1).map_err(|_| TeeError::InvalidSize)?;
        let mut block = Block::default();

        block.u = hmac.hmac(key, &[salt, &counter.to_be_bytes()])?;
        block.t = block.u;
        for _ in 1..iterations {
            block.u = hmac.hmac(key, &[&block.u])?;
            block
                .t
                .iter_mut()
                .zip(block.u.iter())
                .for_each(|(t, u)| *t ^= u);
        }

        chunk.copy_from_slice(&block.t[..chunk.len()]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Accelerator, FuseBank, FuseKeyBlock, KeyPurpose};

    fn hmac_driver() -> Hmac {
        let fuses = FuseBank::default();
        fuses
            .program_key(FuseKeyBlock::Block5, KeyPurpose::HmacUp, &[0x3c; 32])
            .unwrap();
        Hmac::new(Accelerator::new(), fuses, true)
    }

    #[test]
    fn test_rfc7914_vector() {
        // RFC 7914 Section 11, PBKDF2-HMAC-SHA256 with c = 1
        let mut hmac = hmac_driver();
        let mut out = [0u8; 64];
        pbkdf2_hmac_sha256(&mut hmac, HmacKey::Array(b"passwd"), b"salt", 1, &mut out).unwrap();
        assert_eq!(
            hex::encode(out),
            "55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc\
             49ca9cccf179b645991664b39d77ef317c71b845b1e30bd509112041d3a19783"
        );
    }

    #[test]
    fn test_fused_key_matches_reference() {
        let mut hmac = hmac_driver();
        let mut out = [0u8; 32];
        pbkdf2_hmac_sha256(
            &mut hmac,
            HmacKey::Fuse(FuseKeyBlock::Block5),
            b"attestation salt",
            2048,
            &mut out,
        )
        .unwrap();

        let mut expected = [0u8; 32];
        ::pbkdf2::pbkdf2_hmac::<sha2::Sha256>(&[0x3c; 32], b"attestation salt", 2048, &mut expected);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_invalid_arguments() {
        let mut hmac = hmac_driver();
        let mut out = [0u8; 32];
        assert_eq!(
            pbkdf2_hmac_sha256(&mut hmac, HmacKey::Array(b"k"), b"s", 0, &mut out),
            Err(TeeError::InvalidArgument)
        );
        assert_eq!(
            pbkdf2_hmac_sha256(&mut hmac, HmacKey::Array(b"k"), b"s", 1, &mut []),
            Err(TeeError::InvalidArgument)
        );
    }
}
