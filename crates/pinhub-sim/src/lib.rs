//! Simulated provider capability for pinhub
//!
//! Everything a [`pinhub_core::GpioController`] needs without hardware: an
//! in-memory [`SimProvider`] implementing the provider boundary, and a fixed
//! [`sim_profile`] board catalog covering every mode family. Used by the
//! integration tests and for host-side development.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use pinhub_core::GpioController;
//! use pinhub_sim::{sim_profile, SimProvider};
//!
//! let gpio = GpioController::new(sim_profile(), Arc::new(SimProvider::new()));
//! let led = gpio.provision_digital_output(0, "led").unwrap();
//! led.high().unwrap();
//! ```

pub mod board;
pub mod provider;

pub use board::sim_profile;
pub use provider::SimProvider;
