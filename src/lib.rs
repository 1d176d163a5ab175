//! # pinhub — GPIO pin provisioning and lifecycle control
//!
//! pinhub lets a process reserve physical pins on single-board hardware for
//! specific functions (digital input/output, analog, PWM), with three
//! guarantees the bare driver layer does not give you:
//!
//! - **One owner per pin**: provisioning an address that already has a live
//!   handle fails, even under concurrent provisioning from many threads.
//! - **Capability validation**: a pin can only be provisioned in a mode its
//!   board catalog entry electrically supports.
//! - **Safe timed transitions**: pulse and blink run on cancellable worker
//!   threads that are joined on supersede, unprovision, and shutdown — no
//!   leaked threads, no stray flips after cancellation.
//!
//! The actual electrical I/O is delegated to an injected [`GpioProvider`]
//! capability; `pinhub-sim` ships an in-memory one for tests and host
//! development.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! pinhub = { version = "0.1", features = ["sim"] }
//! ```
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use pinhub::prelude::*;
//! // With the `sim` feature, also available as `pinhub::sim`
//! use pinhub_sim::{sim_profile, SimProvider};
//!
//! let gpio = GpioController::new(sim_profile(), Arc::new(SimProvider::new()));
//!
//! // Reserve pin 0 as a digital output, initially low
//! let led = gpio.provision_digital_output(0, "status-led")?;
//!
//! // Synchronous state changes
//! led.high()?;
//! led.toggle()?;
//!
//! // Timed transitions: high for 200ms, then back low
//! led.pulse(Duration::from_millis(200), PinState::High)?;
//!
//! // Release everything
//! gpio.shutdown();
//! # Ok::<(), pinhub::GpioError>(())
//! ```

pub use pinhub_core::*;

#[cfg(feature = "sim")]
pub use pinhub_sim as sim;

/// Commonly used types, for glob import
pub mod prelude {
    pub use pinhub_core::{
        BoardProfile, GpioController, GpioError, GpioPin, GpioProvider, GpioResult, PinIdentity,
        PinMode, PinState, PullResistance,
    };
}
