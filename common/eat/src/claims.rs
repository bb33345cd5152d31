// Licensed under the Apache-2.0 license

//! `eat` section: device identity and per-component software claims

use crate::sections::{serialize_hex, SectionEncode};
use crate::{EatError, EAT_MAX_SIZE};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Software component a claim describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimComponent {
    Bootloader = 1,
    Tee = 2,
    App = 3,
    Other = 0xFF,
}

impl ClaimComponent {
    /// Numeric code emitted as the claim `type`
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Key of the claim inside `sw_claims`
    pub const fn name(self) -> &'static str {
        match self {
            ClaimComponent::Bootloader => "bootloader",
            ClaimComponent::Tee => "tee",
            ClaimComponent::App => "app",
            ClaimComponent::Other => "other",
        }
    }

    /// Whether the claim carries the `secure_padding` flag
    pub const fn has_secure_padding(self) -> bool {
        matches!(self, ClaimComponent::Tee | ClaimComponent::App)
    }
}

impl Serialize for ClaimComponent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.code())
    }
}

/// Digest algorithm of a component measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestKind {
    Sha256 = 0,
}

impl Serialize for DigestKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(*self as u32)
    }
}

/// Chip revisions a component supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChipRevRange {
    pub min: u32,
    pub max: u32,
}

/// Measurement of a component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartDigest {
    #[serde(rename = "type")]
    pub kind: DigestKind,

    #[serde(rename = "calc_digest", serialize_with = "serialize_hex")]
    pub digest: [u8; 32],

    pub digest_validated: bool,

    pub sign_verified: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub secure_padding: Option<bool>,
}

/// Claim about one software component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwClaim {
    #[serde(rename = "type")]
    pub component: ClaimComponent,

    #[serde(rename = "ver")]
    pub version: String,

    #[serde(rename = "platform_ver")]
    pub platform_version: String,

    #[serde(rename = "secure_ver")]
    pub secure_version: u32,

    #[serde(rename = "part_chip_rev")]
    pub chip_rev: ChipRevRange,

    #[serde(rename = "part_digest")]
    pub digest: PartDigest,
}

/// `sw_claims` object; claims are emitted in slice order keyed by component
pub struct SwClaims<'a>(pub &'a [SwClaim]);

impl Serialize for SwClaims<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for claim in self.0 {
            map.serialize_entry(claim.component.name(), claim)?;
        }
        map.end()
    }
}

/// `eat` section
#[derive(Serialize)]
pub struct EatClaims<'a> {
    #[serde(serialize_with = "serialize_hex")]
    pub auth_challenge: &'a [u8],

    pub client_id: i32,

    #[serde(rename = "device_ver")]
    pub device_version: u32,

    #[serde(serialize_with = "serialize_hex")]
    pub device_id: [u8; 32],

    #[serde(serialize_with = "serialize_hex")]
    pub instance_id: [u8; 32],

    #[serde(rename = "psa_cert_ref")]
    pub cert_ref: &'a str,

    pub device_status: u32,

    pub sw_claims: SwClaims<'a>,
}

impl SectionEncode for EatClaims<'_> {
    const MAX_SIZE: usize = EAT_MAX_SIZE;

    fn validate(&self) -> Result<(), EatError> {
        let mut seen: Vec<ClaimComponent> = Vec::with_capacity(self.sw_claims.0.len());
        for claim in self.sw_claims.0 {
            if seen.contains(&claim.component)
                || claim.digest.secure_padding.is_some() != claim.component.has_secure_padding()
            {
                return Err(EatError::InvalidData);
            }
            seen.push(claim.component);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn claim(component: ClaimComponent) -> SwClaim {
        SwClaim {
            component,
            version: "1.0.0".into(),
            platform_version: "v5.4".into(),
            secure_version: 2,
            chip_rev: ChipRevRange { min: 0, max: 399 },
            digest: PartDigest {
                kind: DigestKind::Sha256,
                digest: [0xa5; 32],
                digest_validated: true,
                sign_verified: false,
                secure_padding: component.has_secure_padding().then_some(true),
            },
        }
    }

    fn eat<'a>(claims: &'a [SwClaim]) -> EatClaims<'a> {
        EatClaims {
            auth_challenge: &[0x11; 32],
            client_id: -7,
            device_version: 301,
            device_id: [0x22; 32],
            instance_id: [0x33; 32],
            cert_ref: "0716053550213-10100",
            device_status: 165,
            sw_claims: SwClaims(claims),
        }
    }

    #[test]
    fn test_claim_json_layout() {
        let json = serde_json::to_string(&claim(ClaimComponent::Bootloader)).unwrap();
        assert_eq!(
            json,
            concat!(
                r#"{"type":1,"ver":"1.0.0","platform_ver":"v5.4","secure_ver":2,"#,
                r#""part_chip_rev":{"min":0,"max":399},"part_digest":{"type":0,"#,
                r#""calc_digest":"a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5","#,
                r#""digest_validated":true,"sign_verified":false}}"#
            )
        );
    }

    #[test]
    fn test_secure_padding_only_for_tee_and_app() {
        for (component, expected) in [
            (ClaimComponent::Bootloader, None),
            (ClaimComponent::Tee, Some(true)),
            (ClaimComponent::App, Some(true)),
        ] {
            let value = serde_json::to_value(claim(component)).unwrap();
            assert_eq!(
                value["part_digest"].get("secure_padding").and_then(Value::as_bool),
                expected
            );
        }
    }

    #[test]
    fn test_sw_claims_order() {
        let claims = [
            claim(ClaimComponent::Bootloader),
            claim(ClaimComponent::App),
            claim(ClaimComponent::Tee),
        ];
        let json = serde_json::to_string(&SwClaims(&claims)).unwrap();
        let bootloader = json.find("\"bootloader\"").unwrap();
        let app = json.find("\"app\"").unwrap();
        let tee = json.find("\"tee\"").unwrap();
        assert!(bootloader < app && app < tee);
    }

    #[test]
    fn test_eat_section() {
        let claims = [claim(ClaimComponent::Bootloader), claim(ClaimComponent::App)];
        let mut buf = [0u8; EAT_MAX_SIZE];
        let len = eat(&claims).encode(&mut buf).unwrap();
        let value: Value = serde_json::from_slice(&buf[..len]).unwrap();

        let text = core::str::from_utf8(&buf[..len]).unwrap();
        let positions: Vec<usize> = [
            "auth_challenge",
            "client_id",
            "device_ver",
            "device_id",
            "instance_id",
            "psa_cert_ref",
            "device_status",
            "sw_claims",
        ]
        .iter()
        .map(|key| text.find(&format!("\"{key}\":")).unwrap())
        .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(value["auth_challenge"], "11".repeat(32));
        assert_eq!(value["client_id"], -7);
        assert_eq!(value["device_ver"], 301);
        assert_eq!(value["device_id"], "22".repeat(32));
        assert_eq!(value["instance_id"], "33".repeat(32));
        assert!(value["sw_claims"].get("tee").is_none());
        assert_eq!(value["sw_claims"]["app"]["type"], 3);
    }

    #[test]
    fn test_eat_section_rejects_bad_claims() {
        let claims = [claim(ClaimComponent::App), claim(ClaimComponent::App)];
        let mut buf = [0u8; EAT_MAX_SIZE];
        assert_eq!(eat(&claims).encode(&mut buf), Err(EatError::InvalidData));

        let mut bootloader = claim(ClaimComponent::Bootloader);
        bootloader.digest.secure_padding = Some(false);
        assert_eq!(
            eat(&[bootloader]).encode(&mut buf),
            Err(EatError::InvalidData)
        );
    }

    #[test]
    fn test_eat_section_cap() {
        let mut big = [0u8; 2 * EAT_MAX_SIZE];
        let mut app = claim(ClaimComponent::App);
        app.version = "v".repeat(EAT_MAX_SIZE);
        assert_eq!(
            eat(&[claim(ClaimComponent::Bootloader), app]).encode(&mut big),
            Err(EatError::SectionTooLarge)
        );
    }
}
