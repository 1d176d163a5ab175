//! GPIO pin provisioning and lifecycle control
//!
//! This crate lets a process reserve physical pins for specific functions
//! (digital input/output, analog, PWM), guarantees each physical pin has at
//! most one logical owner at a time, validates requested modes against the
//! pin's electrical capabilities, and manages runtime state transitions —
//! synchronous set/toggle plus cancellable, precisely-timed pulse and blink
//! tasks.
//!
//! # Architecture
//!
//! - **`catalog`**: immutable board descriptions (pin addresses, capability
//!   sets, pull resistors), loadable from TOML
//! - **`provider`**: the injected hardware-access boundary; the core never
//!   performs electrical I/O itself
//! - **`controller`** / **`registry`**: the process-scoped context object and
//!   the one-owner-per-pin provisioning registry behind it
//! - **`pin`** / **`handles`**: live pin handles and their typed views
//! - **`scheduler`**: worker threads running pulse/blink with cooperative,
//!   joinable cancellation
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use pinhub_core::{BoardProfile, GpioController, PinState};
//!
//! # fn profile() -> BoardProfile { BoardProfile::new("demo") }
//! # fn provider() -> pinhub_core::SharedProvider { unimplemented!() }
//! let gpio = GpioController::new(profile(), provider());
//!
//! let led = gpio.provision_digital_output(17, "status-led")?;
//! led.blink(
//!     Duration::from_millis(200),
//!     Duration::from_secs(1),
//!     PinState::High,
//! )?;
//!
//! gpio.shutdown();
//! # Ok::<(), pinhub_core::GpioError>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod catalog;
pub mod controller;
pub mod errors;
pub mod events;
pub mod handles;
pub mod pin;
pub mod provider;
pub mod registry;
pub mod types;

mod scheduler;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export commonly used types
pub use catalog::{BoardProfile, PinIdentity, ProfileError};
pub use controller::{GpioController, DEFAULT_OUTPUT_STATE};
pub use errors::{GpioError, GpioResult};
pub use events::{PinEvent, PinListener};
pub use handles::{
    AnalogInputPin, AnalogOutputPin, DigitalInputPin, DigitalOutputPin, PwmOutputPin,
};
pub use pin::GpioPin;
pub use provider::{GpioProvider, ProviderError, ProviderResult, SharedProvider};
pub use registry::PinRegistry;
pub use types::{ModeSet, PinDirection, PinMode, PinState, PullResistance};
