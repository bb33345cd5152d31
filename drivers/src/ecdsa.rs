/*++

Licensed under the Apache-2.0 license.

File Name:

    ecdsa.rs

Abstract:

    File contains API for ECDSA P-256 / P-384 Cryptography operations

--*/

use crate::{Accelerator, TeeError, TeeResult};
use tee_emu_crypto::{CryptoError, EcdsaEngine, MAX_COORD_SIZE};
use zeroize::{Zeroize, ZeroizeOnDrop};

pub use tee_emu_crypto::EcdsaCurve;

/// ECDSA private key
///
/// Not `Clone`; the scalar is wiped when the key is dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct EcdsaPrivKey {
    #[zeroize(skip)]
    curve: EcdsaCurve,
    scalar: [u8; MAX_COORD_SIZE],
}

impl EcdsaPrivKey {
    /// Import a raw big-endian scalar
    ///
    /// # Returns
    ///
    /// * `TeeError::InvalidSize` - Scalar length does not match the curve
    pub fn from_slice(curve: EcdsaCurve, scalar: &[u8]) -> TeeResult<Self> {
        let len = curve.coord_size();
        if scalar.len() != len {
            return Err(TeeError::InvalidSize);
        }
        let mut key = Self {
            curve,
            scalar: [0u8; MAX_COORD_SIZE],
        };
        key.scalar[..len].copy_from_slice(scalar);
        Ok(key)
    }

    pub fn curve(&self) -> EcdsaCurve {
        self.curve
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.scalar[..self.curve.coord_size()]
    }
}

/// ECDSA public key as raw affine coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcdsaPubKey {
    curve: EcdsaCurve,
    x: [u8; MAX_COORD_SIZE],
    y: [u8; MAX_COORD_SIZE],
}

impl EcdsaPubKey {
    /// Build from raw big-endian coordinates
    pub fn from_coordinates(curve: EcdsaCurve, x: &[u8], y: &[u8]) -> TeeResult<Self> {
        let len = curve.coord_size();
        if x.len() != len || y.len() != len {
            return Err(TeeError::InvalidSize);
        }
        let mut key = Self {
            curve,
            x: [0u8; MAX_COORD_SIZE],
            y: [0u8; MAX_COORD_SIZE],
        };
        key.x[..len].copy_from_slice(x);
        key.y[..len].copy_from_slice(y);
        Ok(key)
    }

    pub fn curve(&self) -> EcdsaCurve {
        self.curve
    }

    pub fn x(&self) -> &[u8] {
        &self.x[..self.curve.coord_size()]
    }

    pub fn y(&self) -> &[u8] {
        &self.y[..self.curve.coord_size()]
    }
}

/// ECDSA signature as raw `r` and `s` scalars
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcdsaSignature {
    curve: EcdsaCurve,
    r: [u8; MAX_COORD_SIZE],
    s: [u8; MAX_COORD_SIZE],
}

impl EcdsaSignature {
    pub fn r(&self) -> &[u8] {
        &self.r[..self.curve.coord_size()]
    }

    pub fn s(&self) -> &[u8] {
        &self.s[..self.curve.coord_size()]
    }

    /// Write `r‖s` to `out`, returning the number of bytes written
    pub fn write_raw(&self, out: &mut [u8]) -> TeeResult<usize> {
        let len = self.curve.coord_size();
        let out = out.get_mut(..2 * len).ok_or(TeeError::InvalidSize)?;
        out[..len].copy_from_slice(self.r());
        out[len..].copy_from_slice(self.s());
        Ok(2 * len)
    }
}

/// ECDSA Verify Result
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EcdsaResult {
    Success = 0,
    SigVerifyFailed = 1,
}

fn map_err(err: CryptoError) -> TeeError {
    match err {
        CryptoError::InvalidKey => TeeError::InvalidArgument,
        CryptoError::InvalidLength => TeeError::InvalidSize,
        CryptoError::VerifyFailed => TeeError::InvalidState,
    }
}

#[derive(Debug, Clone)]
pub struct Ecdsa {
    accel: Accelerator,
    has_p384: bool,
}

impl Ecdsa {
    /// Create the ECDSA driver
    ///
    /// # Arguments
    ///
    /// * `accel` - ECDSA accelerator
    /// * `has_p384` - Peripheral supports the P-384 curve
    pub fn new(accel: Accelerator, has_p384: bool) -> Self {
        Self { accel, has_p384 }
    }

    fn check_curve(&self, curve: EcdsaCurve) -> TeeResult<()> {
        match curve {
            EcdsaCurve::Secp384r1 if !self.has_p384 => Err(TeeError::NotSupported),
            _ => Ok(()),
        }
    }

    /// Generate an ECDSA key pair
    ///
    /// # Arguments
    ///
    /// * `curve` - Curve of the key pair
    ///
    /// # Returns
    ///
    /// * `(EcdsaPrivKey, EcdsaPubKey)` - Key pair
    pub fn key_pair(&mut self, curve: EcdsaCurve) -> TeeResult<(EcdsaPrivKey, EcdsaPubKey)> {
        self.check_curve(curve)?;
        let raw = {
            let _guard = self.accel.acquire();
            EcdsaEngine::gen_key_pair(curve).map_err(map_err)?
        };
        Ok((
            EcdsaPrivKey::from_slice(curve, raw.priv_key())?,
            EcdsaPubKey::from_coordinates(curve, raw.pub_x(), raw.pub_y())?,
        ))
    }

    /// Compute the public key of a private scalar
    pub fn public_key(&mut self, priv_key: &EcdsaPrivKey) -> TeeResult<EcdsaPubKey> {
        let curve = priv_key.curve();
        self.check_curve(curve)?;
        let raw = {
            let _guard = self.accel.acquire();
            EcdsaEngine::key_pair_from_private(curve, priv_key.as_bytes()).map_err(map_err)?
        };
        EcdsaPubKey::from_coordinates(curve, raw.pub_x(), raw.pub_y())
    }

    /// Sign the hash with specified private key
    ///
    /// # Arguments
    ///
    /// * `priv_key` - Private key
    /// * `hash` - Hash to sign
    pub fn sign(&mut self, priv_key: &EcdsaPrivKey, hash: &[u8]) -> TeeResult<EcdsaSignature> {
        let curve = priv_key.curve();
        self.check_curve(curve)?;
        let mut sig = EcdsaSignature {
            curve,
            r: [0u8; MAX_COORD_SIZE],
            s: [0u8; MAX_COORD_SIZE],
        };
        let len = curve.coord_size();
        let _guard = self.accel.acquire();
        EcdsaEngine::sign(
            curve,
            priv_key.as_bytes(),
            hash,
            &mut sig.r[..len],
            &mut sig.s[..len],
        )
        .map_err(map_err)?;
        Ok(sig)
    }

    /// Verify signature with specified public key and hash
    ///
    /// # Arguments
    ///
    /// * `pub_key` - Public key
    /// * `hash` - Hash that was signed
    /// * `signature` - Signature to verify
    ///
    /// # Result
    ///
    /// *  `EcdsaResult` - Success or SigVerifyFailed
    pub fn verify(
        &mut self,
        pub_key: &EcdsaPubKey,
        hash: &[u8],
        signature: &EcdsaSignature,
    ) -> TeeResult<EcdsaResult> {
        self.check_curve(pub_key.curve())?;
        if signature.curve != pub_key.curve() {
            return Err(TeeError::InvalidArgument);
        }
        let _guard = self.accel.acquire();
        match EcdsaEngine::verify(
            pub_key.curve(),
            pub_key.x(),
            pub_key.y(),
            hash,
            signature.r(),
            signature.s(),
        ) {
            Ok(()) => Ok(EcdsaResult::Success),
            Err(CryptoError::VerifyFailed) => Ok(EcdsaResult::SigVerifyFailed),
            Err(err) => Err(map_err(err)),
        }
    }
}
