//! Provisioned-pin registry
//!
//! Single source of truth for which physical pins currently have owners. The
//! map is keyed by board address, and key uniqueness IS the one-owner
//! invariant: a register call for an occupied address fails instead of
//! replacing the entry. The controller wraps the registry in an
//! `Arc<RwLock<_>>` so concurrent provisioning for the same address has
//! exactly one winner.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::errors::{GpioError, GpioResult};
use crate::pin::GpioPin;

/// Registry of live pin handles, keyed by board address
#[derive(Default)]
pub struct PinRegistry {
    pins: HashMap<u8, GpioPin>,
}

impl PinRegistry {
    pub fn new() -> Self {
        Self {
            pins: HashMap::new(),
        }
    }

    /// Whether an address currently has an owner
    pub fn contains(&self, address: u8) -> bool {
        self.pins.contains_key(&address)
    }

    /// The handle registered for an address, if any
    pub fn get(&self, address: u8) -> Option<&GpioPin> {
        self.pins.get(&address)
    }

    /// Register a freshly provisioned handle
    pub(crate) fn register(&mut self, pin: GpioPin) -> GpioResult<()> {
        let address = pin.address();
        if let Some(existing) = self.pins.get(&address) {
            return Err(GpioError::PinAlreadyProvisioned {
                address,
                name: existing.name().to_string(),
            });
        }

        info!(
            "registered pin {} as '{}' ({}, total: {})",
            address,
            pin.name(),
            pin.mode(),
            self.pins.len() + 1
        );
        self.pins.insert(address, pin);
        Ok(())
    }

    /// Remove and return the handle for an address
    pub(crate) fn deregister(&mut self, address: u8) -> Option<GpioPin> {
        match self.pins.remove(&address) {
            Some(pin) => {
                info!(
                    "deregistered pin {} '{}' (total: {})",
                    address,
                    pin.name(),
                    self.pins.len()
                );
                Some(pin)
            }
            None => {
                warn!("deregister of unknown pin {}", address);
                None
            }
        }
    }

    /// Copy-on-read snapshot of every registered handle
    ///
    /// Safe to iterate while provisioning continues on other threads.
    pub fn snapshot(&self) -> Vec<GpioPin> {
        self.pins.values().cloned().collect()
    }

    /// Number of registered handles
    pub fn count(&self) -> usize {
        self.pins.len()
    }

    /// Remove every handle, returning them for teardown
    pub(crate) fn drain(&mut self) -> Vec<GpioPin> {
        self.pins.drain().map(|(_, pin)| pin).collect()
    }
}
