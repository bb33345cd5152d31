// Licensed under the Apache-2.0 license

//! Fixed names, values and size limits of the JSON token

/// Top level section names, in emission order
pub const SECTION_HEADER: &str = "header";
pub const SECTION_EAT: &str = "eat";
pub const SECTION_PUBLIC_KEY: &str = "public_key";
pub const SECTION_SIGN: &str = "sign";

/// Token format magic carried in the header
pub const HEADER_MAGIC: &str = "44fef7cc";

/// Signature algorithm identifier carried in the header
pub const SIGN_ALG_ECDSA_P256_SHA256: &str = "ecdsa_secp256r1_sha256";

/// Longest `psa_cert_ref` accepted, in bytes before JSON escaping
pub const CERT_REF_MAX_LEN: usize = 64;

/// Section byte caps
pub const HEADER_MAX_SIZE: usize = 128;

/// Fits three software claims with 32 byte version strings, a 64 byte
/// challenge and a `CERT_REF_MAX_LEN` certificate reference, with every
/// string character escaped as `\u00XX` and every integer at its widest
pub const EAT_MAX_SIZE: usize = 3072;
pub const PUBLIC_KEY_MAX_SIZE: usize = 128;
pub const SIGN_MAX_SIZE: usize = 192;

/// Smallest destination buffer accepted for a token
pub const TOKEN_MIN_SIZE: usize =
    HEADER_MAX_SIZE + EAT_MAX_SIZE + PUBLIC_KEY_MAX_SIZE + SIGN_MAX_SIZE;

/// Largest token the platform transports
pub const TOKEN_MAX_SIZE: usize = 4096;

/// Accepted authentication challenge sizes
pub const AUTH_CHALLENGE_SIZES: [usize; 3] = [32, 48, 64];

const _: () = assert!(TOKEN_MIN_SIZE == 3520);
const _: () = assert!(TOKEN_MIN_SIZE <= TOKEN_MAX_SIZE);
