//! State-change events and listener registration
//!
//! Only the registration contract lives here: callers register callbacks on a
//! handle and the engine fires them after successful writes and scheduled
//! flips. Interrupt-driven dispatch, debouncing, and edge filtering belong to
//! provider-side machinery and are out of scope.

use std::sync::Arc;

use crate::types::PinState;

/// A state change observed on a provisioned pin
#[derive(Debug, Clone)]
pub struct PinEvent {
    /// Board-specific address of the pin
    pub address: u8,

    /// State the pin was driven to
    pub state: PinState,
}

/// Callback fired on pin state changes
///
/// Arc rather than Box so the engine can snapshot the listener list and
/// invoke callbacks without holding the registration lock.
pub type PinListener = Arc<dyn Fn(&PinEvent) + Send + Sync>;
