/*++

Licensed under the Apache-2.0 license.

File Name:

    soc_ifc.rs

Abstract:

    File contains the SoC capability description and the accelerator
    ownership primitive shared by the driver models.

--*/

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Capabilities of the SoC the drivers run on
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SocConfig {
    /// SoC has an HMAC peripheral able to consume fused keys
    pub has_hmac: bool,

    /// ECDSA peripheral supports the P-384 curve
    pub has_p384: bool,
}

impl Default for SocConfig {
    fn default() -> Self {
        Self {
            has_hmac: true,
            has_p384: true,
        }
    }
}

/// Exclusive ownership of one hardware accelerator.
///
/// Clones refer to the same accelerator. A raw operation holds the guard
/// for its whole duration so operations issued from different threads
/// never interleave on the peripheral.
#[derive(Debug, Clone, Default)]
pub struct Accelerator {
    lock: Arc<Mutex<()>>,
}

impl Accelerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the accelerator. A poisoned lock is taken over.
    pub(crate) fn acquire(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_accelerator_shared_between_clones() {
        let accel = Accelerator::new();
        let clone = accel.clone();
        let guard = accel.acquire();
        assert!(clone.lock.try_lock().is_err());
        drop(guard);
        assert!(clone.lock.try_lock().is_ok());
    }

    #[test]
    fn test_accelerator_recovers_from_poison() {
        let accel = Accelerator::new();
        let clone = accel.clone();
        let _ = thread::spawn(move || {
            let _guard = clone.acquire();
            panic!("holder panicked");
        })
        .join();
        let _guard = accel.acquire();
    }
}
