//! Provider capability boundary
//!
//! The core never touches voltage levels or registers itself; it drives an
//! injected [`GpioProvider`] for all physical I/O. Production deployments
//! plug in a native driver, tests and host development plug in a simulated
//! one. Providers are shared by reference across every handle and must keep
//! their individual operations safe for concurrent use across distinct
//! addresses.

use std::sync::Arc;

use thiserror::Error;

use crate::catalog::PinIdentity;
use crate::types::{PinMode, PinState, PullResistance};

/// Errors reported by a provider implementation
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Operation on an address the provider has not exported
    #[error("provider: pin {address} is not exported")]
    NotExported { address: u8 },

    /// The provider cannot perform this operation class at all
    #[error("provider: {operation} is not supported for pin {address}")]
    Unsupported { address: u8, operation: &'static str },

    /// Driver-level I/O failure
    #[error("provider I/O failure: {0}")]
    Io(String),
}

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Hardware-access interface the core drives
///
/// Implementations handle the actual electrical I/O for a board. Analog and
/// PWM operations default to [`ProviderError::Unsupported`] so digital-only
/// drivers implement just the operations their hardware has.
pub trait GpioProvider: Send + Sync {
    /// Human-readable provider name (for logs and diagnostics)
    fn name(&self) -> &str;

    /// Enable a pin for software control under the given mode
    fn export(&self, pin: &PinIdentity, mode: PinMode) -> ProviderResult<()>;

    /// Disable software control of a pin
    fn unexport(&self, pin: &PinIdentity) -> ProviderResult<()>;

    /// Read the current digital state of a pin
    fn state(&self, pin: &PinIdentity) -> ProviderResult<PinState>;

    /// Drive a pin to the given digital state
    fn set_state(&self, pin: &PinIdentity, state: PinState) -> ProviderResult<()>;

    /// Read the current analog level of a pin
    fn value(&self, pin: &PinIdentity) -> ProviderResult<f64> {
        Err(ProviderError::Unsupported {
            address: pin.address,
            operation: "analog read",
        })
    }

    /// Drive a pin to the given analog level
    fn set_value(&self, pin: &PinIdentity, value: f64) -> ProviderResult<()> {
        let _ = value;
        Err(ProviderError::Unsupported {
            address: pin.address,
            operation: "analog write",
        })
    }

    /// Set the PWM duty value of a pin
    fn set_pwm(&self, pin: &PinIdentity, duty: u32) -> ProviderResult<()> {
        let _ = duty;
        Err(ProviderError::Unsupported {
            address: pin.address,
            operation: "pwm write",
        })
    }

    /// Configure the pull resistor of a pin
    fn set_pull_resistance(&self, pin: &PinIdentity, pull: PullResistance) -> ProviderResult<()> {
        let _ = pull;
        Err(ProviderError::Unsupported {
            address: pin.address,
            operation: "pull resistor",
        })
    }
}

/// Thread-safe shared reference to a provider capability
///
/// One provider instance serves every handle in a controller; Arc is only the
/// sharing mechanism, synchronization stays inside the implementation.
pub type SharedProvider = Arc<dyn GpioProvider>;
