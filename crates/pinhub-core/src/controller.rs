//! Process-scoped GPIO controller
//!
//! The [`GpioController`] is the explicit context object that ties a board
//! profile, one provider capability, and the provisioned-pin registry
//! together. It is constructed once per process (or once per test) and passed
//! by reference to whatever needs it; there is no global instance to reset.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::catalog::BoardProfile;
use crate::errors::{GpioError, GpioResult};
use crate::handles::{
    AnalogInputPin, AnalogOutputPin, DigitalInputPin, DigitalOutputPin, PwmOutputPin,
};
use crate::pin::{GpioPin, PinCore};
use crate::provider::SharedProvider;
use crate::registry::PinRegistry;
use crate::types::{PinMode, PinState, PullResistance};

/// Initial state applied when a digital output is provisioned without an
/// explicit one
pub const DEFAULT_OUTPUT_STATE: PinState = PinState::Low;

/// Setting applied right after export, while the registry lock is still held
enum InitialSetting {
    None,
    State(PinState),
    Level(f64),
    Duty(u32),
    Pull(PullResistance),
}

/// GPIO pin provisioning and lifecycle controller
///
/// Owns the registry of provisioned pins and enforces the one-owner-per-pin
/// and mode-support invariants at provisioning time. All physical I/O goes
/// through the injected provider capability.
pub struct GpioController {
    profile: BoardProfile,
    provider: SharedProvider,
    registry: Arc<RwLock<PinRegistry>>,
}

impl GpioController {
    /// Create a controller for one board profile and one provider capability
    pub fn new(profile: BoardProfile, provider: SharedProvider) -> Self {
        info!(
            "gpio controller created (board: '{}', provider: '{}', {} pins)",
            profile.name,
            provider.name(),
            profile.len()
        );
        Self {
            profile,
            provider,
            registry: Arc::new(RwLock::new(PinRegistry::new())),
        }
    }

    /// The board profile this controller was created with
    pub fn profile(&self) -> &BoardProfile {
        &self.profile
    }

    /// The provider capability this controller drives
    pub fn provider(&self) -> SharedProvider {
        Arc::clone(&self.provider)
    }

    /// Provision a digital output pin, initially driven to
    /// [`DEFAULT_OUTPUT_STATE`]
    pub fn provision_digital_output(
        &self,
        address: u8,
        name: &str,
    ) -> GpioResult<DigitalOutputPin> {
        self.provision_digital_output_with_state(address, name, DEFAULT_OUTPUT_STATE)
    }

    /// Provision a digital output pin, initially driven to `initial`
    pub fn provision_digital_output_with_state(
        &self,
        address: u8,
        name: &str,
        initial: PinState,
    ) -> GpioResult<DigitalOutputPin> {
        self.provision(
            address,
            PinMode::DigitalOutput,
            name,
            InitialSetting::State(initial),
        )
        .map(DigitalOutputPin::new)
    }

    /// Provision a digital input pin
    pub fn provision_digital_input(&self, address: u8, name: &str) -> GpioResult<DigitalInputPin> {
        self.provision(address, PinMode::DigitalInput, name, InitialSetting::None)
            .map(DigitalInputPin::new)
    }

    /// Provision a digital input pin and configure its pull resistor
    pub fn provision_digital_input_with_pull(
        &self,
        address: u8,
        name: &str,
        pull: PullResistance,
    ) -> GpioResult<DigitalInputPin> {
        let identity = self.profile.lookup(address)?;
        if !identity.supports_pull {
            return Err(GpioError::InvalidArgument(format!(
                "pin {} has no configurable pull resistor",
                identity
            )));
        }
        self.provision(
            address,
            PinMode::DigitalInput,
            name,
            InitialSetting::Pull(pull),
        )
        .map(DigitalInputPin::new)
    }

    /// Provision an analog input pin
    pub fn provision_analog_input(&self, address: u8, name: &str) -> GpioResult<AnalogInputPin> {
        self.provision(address, PinMode::AnalogInput, name, InitialSetting::None)
            .map(AnalogInputPin::new)
    }

    /// Provision an analog output pin, initially driven to `initial`
    pub fn provision_analog_output(
        &self,
        address: u8,
        name: &str,
        initial: f64,
    ) -> GpioResult<AnalogOutputPin> {
        self.provision(
            address,
            PinMode::AnalogOutput,
            name,
            InitialSetting::Level(initial),
        )
        .map(AnalogOutputPin::new)
    }

    /// Provision a PWM output pin, initially driven at `duty`
    pub fn provision_pwm_output(
        &self,
        address: u8,
        name: &str,
        duty: u32,
    ) -> GpioResult<PwmOutputPin> {
        self.provision(address, PinMode::PwmOutput, name, InitialSetting::Duty(duty))
            .map(PwmOutputPin::new)
    }

    /// Validate, export, and register a pin under the registry write lock
    ///
    /// All-or-nothing: a failure at any step leaves no registry entry and no
    /// exported pin behind.
    fn provision(
        &self,
        address: u8,
        mode: PinMode,
        name: &str,
        initial: InitialSetting,
    ) -> GpioResult<GpioPin> {
        let identity = self.profile.lookup(address)?.clone();
        if !identity.supports_mode(mode) {
            return Err(GpioError::UnsupportedMode { address, mode });
        }

        // Check-export-insert happens under the write lock so concurrent
        // provisioning of the same address has exactly one winner.
        let mut registry = self.registry.write();
        if let Some(existing) = registry.get(address) {
            return Err(GpioError::PinAlreadyProvisioned {
                address,
                name: existing.name().to_string(),
            });
        }

        self.provider.export(&identity, mode)?;
        if let Err(e) = self.apply_initial(&identity, &initial) {
            if let Err(rollback) = self.provider.unexport(&identity) {
                warn!(
                    "rollback unexport failed for pin {}: {}",
                    identity, rollback
                );
            }
            return Err(e);
        }

        let core = PinCore::new(
            identity,
            mode,
            name,
            Arc::clone(&self.provider),
            Arc::downgrade(&self.registry),
        );
        let pin = GpioPin::from_core(core);
        registry.register(pin.clone())?;
        info!("provisioned pin {} as '{}' ({})", address, name, mode);
        Ok(pin)
    }

    fn apply_initial(
        &self,
        identity: &crate::catalog::PinIdentity,
        initial: &InitialSetting,
    ) -> GpioResult<()> {
        match initial {
            InitialSetting::None => Ok(()),
            InitialSetting::State(state) => Ok(self.provider.set_state(identity, *state)?),
            InitialSetting::Level(level) => Ok(self.provider.set_value(identity, *level)?),
            InitialSetting::Duty(duty) => Ok(self.provider.set_pwm(identity, *duty)?),
            InitialSetting::Pull(pull) => Ok(self.provider.set_pull_resistance(identity, *pull)?),
        }
    }

    /// Snapshot of every currently provisioned handle
    ///
    /// Copy-on-read: safe to iterate while provisioning continues on other
    /// threads.
    pub fn provisioned_pins(&self) -> Vec<GpioPin> {
        self.registry.read().snapshot()
    }

    /// Whether an address currently has an owner
    pub fn is_provisioned(&self, address: u8) -> bool {
        self.registry.read().contains(address)
    }

    /// Unprovision a pin: cancel any scheduled task, unexport at the
    /// provider, remove from the registry
    ///
    /// Fails with [`GpioError::NotProvisioned`] when the handle is not
    /// currently registered (already unprovisioned, or superseded by a newer
    /// handle for the same address). The error is advisory; the handle is
    /// unusable either way.
    pub fn unprovision_pin(&self, pin: &GpioPin) -> GpioResult<()> {
        if !pin.core.remove_from_registry() {
            return Err(GpioError::NotProvisioned {
                address: pin.address(),
            });
        }
        pin.core.release()
    }

    /// Unprovision every pin: cancel all scheduled tasks, unexport
    /// everything, clear the registry
    ///
    /// Also runs on drop. Idempotent.
    pub fn shutdown(&self) {
        let pins = self.registry.write().drain();
        if pins.is_empty() {
            return;
        }
        info!("shutting down gpio controller ({} pins)", pins.len());
        for pin in pins {
            if let Err(e) = pin.core.release() {
                warn!("failed to unexport pin {} during shutdown: {}", pin.address(), e);
            }
        }
    }
}

impl Drop for GpioController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
