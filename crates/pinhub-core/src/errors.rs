//! Error types for provisioning and state operations
//!
//! Every expected business condition (a pin that already has an owner, a mode
//! the hardware cannot drive) is an error-kind return at the call site that
//! violated the contract; none leaves the registry or a handle partially
//! mutated.

use thiserror::Error;

use crate::provider::ProviderError;
use crate::types::PinMode;

/// Errors raised by provisioning and pin state operations
#[derive(Error, Debug)]
pub enum GpioError {
    /// Provisioning a physical pin that already has an owner
    #[error("pin {address} is already provisioned as '{name}'")]
    PinAlreadyProvisioned { address: u8, name: String },

    /// Requested mode is not in the pin's supported capability set
    #[error("pin {address} does not support mode {mode}")]
    UnsupportedMode { address: u8, mode: PinMode },

    /// State operation on a handle that has been unexported
    #[error("pin {address} is not exported")]
    PinNotExported { address: u8 },

    /// Operation direction mismatch (e.g. write to an input-only pin)
    #[error("operation not valid for mode {mode} on pin {address}")]
    InvalidPinMode { address: u8, mode: PinMode },

    /// Non-positive durations/delays, invalid state values
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Unknown pin address in the board profile
    #[error("no pin with address {address} in board profile")]
    NotFound { address: u8 },

    /// Unprovisioning a handle that is not currently registered
    #[error("pin {address} is not provisioned")]
    NotProvisioned { address: u8 },

    /// Failure reported by the injected provider capability
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Result type for GPIO operations
pub type GpioResult<T> = Result<T, GpioError>;
