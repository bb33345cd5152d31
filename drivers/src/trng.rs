// Licensed under the Apache-2.0 license

use crate::{Accelerator, TeeError, TeeResult};
use rand::rngs::OsRng;
use rand::RngCore;

#[derive(Debug, Clone, Default)]
pub struct Trng {
    accel: Accelerator,
}

impl Trng {
    pub fn new(accel: Accelerator) -> Self {
        Self { accel }
    }

    /// Fill `buf` with random bytes
    pub fn fill(&mut self, buf: &mut [u8]) -> TeeResult<()> {
        let _guard = self.accel.acquire();
        OsRng
            .try_fill_bytes(buf)
            .map_err(|_| TeeError::InvalidState)
    }

    pub fn generate<const N: usize>(&mut self) -> TeeResult<[u8; N]> {
        let mut out = [0u8; N];
        self.fill(&mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_differs() {
        let mut trng = Trng::default();
        let a: [u8; 32] = trng.generate().unwrap();
        let b: [u8; 32] = trng.generate().unwrap();
        assert_ne!(a, b);
    }
}
