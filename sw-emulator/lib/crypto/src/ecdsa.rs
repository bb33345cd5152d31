/*++

Licensed under the Apache-2.0 license.

File Name:

    ecdsa.rs

Abstract:

    File contains implementation of the ECDSA P-256 and P-384 algorithms on
    raw big-endian coordinates.

--*/

use crate::CryptoError;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Largest coordinate size of the supported curves (P-384)
pub const MAX_COORD_SIZE: usize = 48;

/// Supported curves
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EcdsaCurve {
    Secp256r1,
    Secp384r1,
}

impl EcdsaCurve {
    /// Coordinate (and private scalar) size in bytes
    pub const fn coord_size(&self) -> usize {
        match self {
            EcdsaCurve::Secp256r1 => 32,
            EcdsaCurve::Secp384r1 => 48,
        }
    }
}

/// Key pair as raw big-endian scalars.
///
/// Only the first `curve.coord_size()` bytes of each array are meaningful.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct EcdsaKeyPairRaw {
    #[zeroize(skip)]
    curve: EcdsaCurve,
    priv_key: [u8; MAX_COORD_SIZE],
    pub_x: [u8; MAX_COORD_SIZE],
    pub_y: [u8; MAX_COORD_SIZE],
}

impl EcdsaKeyPairRaw {
    fn new(curve: EcdsaCurve) -> Self {
        Self {
            curve,
            priv_key: [0u8; MAX_COORD_SIZE],
            pub_x: [0u8; MAX_COORD_SIZE],
            pub_y: [0u8; MAX_COORD_SIZE],
        }
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

macro_rules! curve_impl {
    ($mod_name:ident, $krate:ident) => {
        mod $mod_name {
            use crate::CryptoError;
            use $krate::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
            use $krate::ecdsa::{Signature, SigningKey, VerifyingKey};
            use $krate::{EncodedPoint, FieldBytes};

            fn export_public(
                signing_key: &SigningKey,
                x_out: &mut [u8],
                y_out: &mut [u8],
            ) -> Result<(), CryptoError> {
                let point = signing_key.verifying_key().to_encoded_point(false);
                let x = point.x().ok_or(CryptoError::InvalidKey)?;
                let y = point.y().ok_or(CryptoError::InvalidKey)?;
                x_out.copy_from_slice(x.as_slice());
                y_out.copy_from_slice(y.as_slice());
                Ok(())
            }

            pub fn gen_key_pair(
                priv_out: &mut [u8],
                x_out: &mut [u8],
                y_out: &mut [u8],
            ) -> Result<(), CryptoError> {
                let signing_key = SigningKey::random(&mut rand::rngs::OsRng);
                priv_out.copy_from_slice(signing_key.to_bytes().as_slice());
                export_public(&signing_key, x_out, y_out)
            }

            pub fn public_key(
                priv_key: &[u8],
                x_out: &mut [u8],
                y_out: &mut [u8],
            ) -> Result<(), CryptoError> {
                let signing_key =
                    SigningKey::from_slice(priv_key).map_err(|_| CryptoError::InvalidKey)?;
                export_public(&signing_key, x_out, y_out)
            }

            pub fn sign(
                priv_key: &[u8],
                hash: &[u8],
                r_out: &mut [u8],
                s_out: &mut [u8],
            ) -> Result<(), CryptoError> {
                let signing_key =
                    SigningKey::from_slice(priv_key).map_err(|_| CryptoError::InvalidKey)?;
                let signature: Signature = signing_key
                    .sign_prehash(hash)
                    .map_err(|_| CryptoError::InvalidLength)?;
                let (r, s) = signature.split_bytes();
                r_out.copy_from_slice(r.as_slice());
                s_out.copy_from_slice(s.as_slice());
                Ok(())
            }

            pub fn verify(
                x: &[u8],
                y: &[u8],
                hash: &[u8],
                r: &[u8],
                s: &[u8],
            ) -> Result<(), CryptoError> {
                let point = EncodedPoint::from_affine_coordinates(
                    FieldBytes::from_slice(x),
                    FieldBytes::from_slice(y),
                    false,
                );
                let verifying_key =
                    VerifyingKey::from_encoded_point(&point).map_err(|_| CryptoError::InvalidKey)?;
                let signature =
                    Signature::from_scalars(FieldBytes::clone_from_slice(r), FieldBytes::clone_from_slice(s))
                        .map_err(|_| CryptoError::VerifyFailed)?;
                verifying_key
                    .verify_prehash(hash, &signature)
                    .map_err(|_| CryptoError::VerifyFailed)
            }
        }
    };
}

curve_impl!(secp256r1, p256);
curve_impl!(secp384r1, p384);

pub enum EcdsaEngine {}

impl EcdsaEngine {
    /// Generate a random key pair
    ///
    /// # Arguments
    ///
    /// * `curve` - Curve of the key pair
    ///
    /// # Result
    ///
    /// * `EcdsaKeyPairRaw` - Private & public key pair
    pub fn gen_key_pair(curve: EcdsaCurve) -> Result<EcdsaKeyPairRaw, CryptoError> {
        let mut pair = EcdsaKeyPairRaw::new(curve);
        let len = curve.coord_size();
        let EcdsaKeyPairRaw {
            priv_key,
            pub_x,
            pub_y,
            ..
        } = &mut pair;
        match curve {
            EcdsaCurve::Secp256r1 => {
                secp256r1::gen_key_pair(&mut priv_key[..len], &mut pub_x[..len], &mut pub_y[..len])?
            }
            EcdsaCurve::Secp384r1 => {
                secp384r1::gen_key_pair(&mut priv_key[..len], &mut pub_x[..len], &mut pub_y[..len])?
            }
        }
        Ok(pair)
    }

    /// Recompute the key pair from a private scalar
    pub fn key_pair_from_private(
        curve: EcdsaCurve,
        priv_key: &[u8],
    ) -> Result<EcdsaKeyPairRaw, CryptoError> {
        let len = curve.coord_size();
        if priv_key.len() != len {
            return Err(CryptoError::InvalidLength);
        }
        let mut pair = EcdsaKeyPairRaw::new(curve);
        pair.priv_key[..len].copy_from_slice(priv_key);
        let EcdsaKeyPairRaw { pub_x, pub_y, .. } = &mut pair;
        match curve {
            EcdsaCurve::Secp256r1 => {
                secp256r1::public_key(priv_key, &mut pub_x[..len], &mut pub_y[..len])?
            }
            EcdsaCurve::Secp384r1 => {
                secp384r1::public_key(priv_key, &mut pub_x[..len], &mut pub_y[..len])?
            }
        }
        Ok(pair)
    }

    /// Sign the hash with specified private key
    ///
    /// # Arguments
    ///
    /// * `curve` - Curve of the key
    /// * `priv_key` - Private key, `coord_size` bytes
    /// * `hash` - Hash to sign
    /// * `r` - Output, `coord_size` bytes
    /// * `s` - Output, `coord_size` bytes
    pub fn sign(
        curve: EcdsaCurve,
        priv_key: &[u8],
        hash: &[u8],
        r: &mut [u8],
        s: &mut [u8],
    ) -> Result<(), CryptoError> {
        let len = curve.coord_size();
        if priv_key.len() != len || r.len() != len || s.len() != len || hash.is_empty() {
            return Err(CryptoError::InvalidLength);
        }
        match curve {
            EcdsaCurve::Secp256r1 => secp256r1::sign(priv_key, hash, r, s),
            EcdsaCurve::Secp384r1 => secp384r1::sign(priv_key, hash, r, s),
        }
    }

    /// Verify the signature
    pub fn verify(
        curve: EcdsaCurve,
        x: &[u8],
        y: &[u8],
        hash: &[u8],
        r: &[u8],
        s: &[u8],
    ) -> Result<(), CryptoError> {
        let len = curve.coord_size();
        if x.len() != len || y.len() != len || r.len() != len || s.len() != len {
            return Err(CryptoError::InvalidLength);
        }
        match curve {
            EcdsaCurve::Secp256r1 => secp256r1::verify(x, y, hash, r, s),
            EcdsaCurve::Secp384r1 => secp384r1::verify(x, y, hash, r, s),
        }
    }
}
