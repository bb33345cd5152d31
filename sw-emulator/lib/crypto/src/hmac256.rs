/*++

Licensed under the Apache-2.0 license.

File Name:

    hmac256.rs

Abstract:

    File contains implementation of HMAC-SHA256.

--*/

use hmac::{Mac, SimpleHmac};

pub enum Hmac256 {}

impl Hmac256 {
    /// HMAC-SHA256 Tag Size
    pub const TAG_SIZE: usize = 32;

    /// One-shot HMAC-SHA256
    ///
    /// # Arguments
    ///
    /// * `key` - HMAC key of any length
    /// * `data` - Message parts, absorbed in order
    ///
    /// # Result
    ///
    /// * `[u8; 32]` - Tag
    pub fn mac(key: &[u8], data: &[&[u8]]) -> [u8; Self::TAG_SIZE] {
        // SimpleHmac accepts keys of any size, so construction cannot fail.
        let mut mac = match <SimpleHmac<sha2::Sha256> as Mac>::new_from_slice(key) {
            Ok(mac) => mac,
            Err(_) => unreachable!(),
        };
        for part in data {
            mac.update(part);
        }
        mac.finalize().into_bytes().into()
    }
}
