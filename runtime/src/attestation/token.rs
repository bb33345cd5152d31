// Licensed under the Apache-2.0 license

use super::{collect_claims, AttestationConfig, AttestationKey, TokenInput};
use crate::{Drivers, KeyFlags, KeyType, SecureStorage};
use tee_drivers::{
    cprintln, EcdsaCurve, EcdsaPrivKey, EcdsaPubKey, EcdsaResult, EcdsaSignature, Sha256Digest,
    TeeError, TeeResult,
};
use tee_eat::{
    EatClaims, Header, PublicKeySection, SectionEncode, SignSection, SwClaims, TokenWriter,
    AUTH_CHALLENGE_SIZES, CERT_REF_MAX_LEN, EAT_MAX_SIZE, HEADER_MAX_SIZE, PUBLIC_KEY_MAX_SIZE,
    SECTION_EAT, SECTION_HEADER, SECTION_PUBLIC_KEY, SECTION_SIGN, SIGN_MAX_SIZE, TOKEN_MIN_SIZE,
};

enum TokenSigner<'a> {
    Ephemeral(EcdsaPrivKey),
    Stored {
        store: &'a mut SecureStorage,
        key_id: &'a str,
    },
}

impl TokenSigner<'_> {
    fn sign(&mut self, drivers: &mut Drivers, digest: &Sha256Digest) -> TeeResult<EcdsaSignature> {
        match self {
            TokenSigner::Ephemeral(priv_key) => drivers.ecdsa.sign(priv_key, digest),
            TokenSigner::Stored { store, key_id } => {
                store.sign(drivers, *key_id, KeyType::EcdsaSecp256r1, digest)
            }
        }
    }
}

fn token_signer<'a>(
    drivers: &mut Drivers,
    key: AttestationKey<'a>,
) -> TeeResult<(TokenSigner<'a>, EcdsaPubKey)> {
    match key {
        AttestationKey::Ephemeral => {
            let (priv_key, pub_key) = drivers.ecdsa.key_pair(EcdsaCurve::Secp256r1)?;
            Ok((TokenSigner::Ephemeral(priv_key), pub_key))
        }
        AttestationKey::SecStorage { store, key_id } => {
            if !store.key_exists(key_id)? {
                store.generate_key(drivers, key_id, KeyType::EcdsaSecp256r1, KeyFlags::empty())?;
                cprintln!("[att] Generated attestation key {}", key_id);
            }
            if store.key_type(key_id)? != KeyType::EcdsaSecp256r1 {
                return Err(TeeError::InvalidState);
            }
            let pub_key = store.get_pubkey(drivers, key_id, KeyType::EcdsaSecp256r1)?;
            Ok((TokenSigner::Stored { store, key_id }, pub_key))
        }
    }
}

/// Generate a signed attestation token
///
/// The token is `{"header":..,"eat":..,"public_key":..,"sign":..}`. The
/// signature covers SHA-256 over the header, eat and public_key section bytes
/// exactly as written, concatenated in that order.
///
/// # Arguments
///
/// * `drivers` - Drivers
/// * `key` - Signing key
/// * `config` - Attestation configuration
/// * `input` - Caller supplied claims
/// * `out` - Token destination, at least `TOKEN_MIN_SIZE` bytes
///
/// # Returns
///
/// * `usize` - Token length
/// * `TeeError::InvalidArgument` - Challenge is not 32, 48 or 64 bytes
/// * `TeeError::InvalidSize` - Destination or a section is too small, or
///   `cert_ref` is longer than `CERT_REF_MAX_LEN`
pub fn generate_token(
    drivers: &mut Drivers,
    key: AttestationKey<'_>,
    config: &AttestationConfig,
    input: &TokenInput<'_>,
    out: &mut [u8],
) -> TeeResult<usize> {
    if !AUTH_CHALLENGE_SIZES.contains(&input.auth_challenge.len()) {
        return Err(TeeError::InvalidArgument);
    }
    if input.cert_ref.len() > CERT_REF_MAX_LEN || out.len() < TOKEN_MIN_SIZE {
        return Err(TeeError::InvalidSize);
    }

    out.fill(0);
    match assemble(drivers, key, config, input, out) {
        Ok(len) => {
            cprintln!("[att] Generated token of {} bytes", len);
            Ok(len)
        }
        Err(err) => {
            out.fill(0);
            cprintln!("[att] Token generation failed: {}", u32::from(err));
            Err(err)
        }
    }
}

fn assemble(
    drivers: &mut Drivers,
    key: AttestationKey<'_>,
    config: &AttestationConfig,
    input: &TokenInput<'_>,
    out: &mut [u8],
) -> TeeResult<usize> {
    let claims = collect_claims(&drivers.image_info)?;
    let (mut signer, pub_key) = token_signer(drivers, key)?;

    let device_id = drivers.sha256.digest(&drivers.fuse_bank.mac_address())?;
    let mut instance_id = Sha256Digest::default();
    let mut op = drivers.sha256.digest_init()?;
    op.update(pub_key.x())?;
    op.update(pub_key.y())?;
    op.finalize(&mut instance_id)?;

    let eat = EatClaims {
        auth_challenge: input.auth_challenge,
        client_id: input.client_id,
        device_version: drivers.fuse_bank.chip_revision(),
        device_id,
        instance_id,
        cert_ref: input.cert_ref,
        device_status: config.device_status,
        sw_claims: SwClaims(&claims),
    };

    let mut header_buf = [0u8; HEADER_MAX_SIZE];
    let mut eat_buf = [0u8; EAT_MAX_SIZE];
    let mut pub_key_buf = [0u8; PUBLIC_KEY_MAX_SIZE];
    let mut digest = Sha256Digest::default();

    let mut op = drivers.sha256.digest_init()?;
    let header_len = Header::new(&config.key_id).encode(&mut header_buf)?;
    op.update(&header_buf[..header_len])?;
    let eat_len = eat.encode(&mut eat_buf)?;
    op.update(&eat_buf[..eat_len])?;
    let pub_key_len = PublicKeySection::from_coordinates(pub_key.x(), pub_key.y())?
        .encode(&mut pub_key_buf)?;
    op.update(&pub_key_buf[..pub_key_len])?;
    op.finalize(&mut digest)?;

    let signature = signer.sign(drivers, &digest)?;
    if drivers.ecdsa.verify(&pub_key, &digest, &signature)? != EcdsaResult::Success {
        cprintln!("[att] Token signature verification failed");
        return Err(TeeError::InvalidState);
    }

    let mut sign_buf = [0u8; SIGN_MAX_SIZE];
    let sign_len = SignSection::new(signature.r(), signature.s()).encode(&mut sign_buf)?;

    let mut writer = TokenWriter::new(out)?;
    writer.section(SECTION_HEADER, &header_buf[..header_len])?;
    writer.section(SECTION_EAT, &eat_buf[..eat_len])?;
    writer.section(SECTION_PUBLIC_KEY, &pub_key_buf[..pub_key_len])?;
    writer.section(SECTION_SIGN, &sign_buf[..sign_len])?;
    Ok(writer.finish()?)
}
