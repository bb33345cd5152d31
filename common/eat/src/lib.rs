// Licensed under the Apache-2.0 license

//! JSON EAT (Entity Attestation Token) encoder library
//!
//! This library encodes the sections of a JSON entity attestation token and
//! assembles them into the outer token object:
//!
//! ```text
//! {"header":{...},"eat":{...},"public_key":{...},"sign":{...}}
//! ```
//!
//! # Features
//!
//! - Compact JSON with a fixed key order, one encoder per section
//! - Per-section byte caps enforced while encoding into fixed buffers
//! - Encoded section bytes are exactly the bytes written to the token, so
//!   they can be fed to a running digest as they are produced

pub mod claim_keys;
pub mod claims;
pub mod error;
pub mod sections;
pub mod token;

// Re-export error types
pub use error::EatError;

pub use claim_keys::*;

pub use claims::{ChipRevRange, ClaimComponent, DigestKind, EatClaims, PartDigest, SwClaim, SwClaims};
pub use sections::{Header, PublicKeySection, SectionEncode, SignSection};
pub use token::TokenWriter;
