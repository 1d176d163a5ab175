//! In-memory provider capability
//!
//! Keeps a table of simulated pin lines instead of touching hardware. Beyond
//! the [`GpioProvider`] contract it exposes line-level accessors so tests can
//! drive "external" signals into input pins and inspect what an output pin
//! was last driven to.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::{debug, trace};

use pinhub_core::{
    GpioProvider, PinIdentity, PinMode, PinState, ProviderError, ProviderResult, PullResistance,
};

#[derive(Clone)]
struct SimLine {
    exported: bool,
    mode: Option<PinMode>,
    state: PinState,
    value: f64,
    duty: u32,
    pull: PullResistance,
}

impl Default for SimLine {
    fn default() -> Self {
        Self {
            exported: false,
            mode: None,
            state: PinState::Low,
            value: 0.0,
            duty: 0,
            pull: PullResistance::Off,
        }
    }
}

/// Simulated provider capability
///
/// All operations are safe for concurrent use across distinct addresses; the
/// single internal lock also serializes same-address access.
#[derive(Default)]
pub struct SimProvider {
    lines: Mutex<HashMap<u8, SimLine>>,
}

impl SimProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the provider currently has `address` exported
    pub fn is_exported(&self, address: u8) -> bool {
        self.lines
            .lock()
            .get(&address)
            .map(|l| l.exported)
            .unwrap_or(false)
    }

    /// Drive a line from "outside" (e.g. simulate an external signal on an
    /// input pin); the line must be exported
    pub fn set_line_state(&self, address: u8, state: PinState) -> ProviderResult<()> {
        self.with_line(address, |line| line.state = state)
    }

    /// The state a line was last driven to, if it is known to the provider
    pub fn line_state(&self, address: u8) -> Option<PinState> {
        self.lines.lock().get(&address).map(|l| l.state)
    }

    /// The mode a line was exported under, if currently exported
    pub fn line_mode(&self, address: u8) -> Option<PinMode> {
        self.lines.lock().get(&address).and_then(|l| l.mode)
    }

    /// The analog level a line was last driven to
    pub fn line_value(&self, address: u8) -> Option<f64> {
        self.lines.lock().get(&address).map(|l| l.value)
    }

    /// The PWM duty a line was last driven at
    pub fn line_duty(&self, address: u8) -> Option<u32> {
        self.lines.lock().get(&address).map(|l| l.duty)
    }

    /// The pull resistor configuration of a line
    pub fn line_pull(&self, address: u8) -> Option<PullResistance> {
        self.lines.lock().get(&address).map(|l| l.pull)
    }

    fn with_line<T>(&self, address: u8, f: impl FnOnce(&mut SimLine) -> T) -> ProviderResult<T> {
        let mut lines = self.lines.lock();
        match lines.get_mut(&address) {
            Some(line) if line.exported => Ok(f(line)),
            _ => Err(ProviderError::NotExported { address }),
        }
    }
}

impl GpioProvider for SimProvider {
    fn name(&self) -> &str {
        "sim"
    }

    fn export(&self, pin: &PinIdentity, mode: PinMode) -> ProviderResult<()> {
        let mut lines = self.lines.lock();
        let line = lines.entry(pin.address).or_default();
        line.exported = true;
        line.mode = Some(mode);
        debug!("sim: exported pin {} as {}", pin, mode);
        Ok(())
    }

    fn unexport(&self, pin: &PinIdentity) -> ProviderResult<()> {
        let mut lines = self.lines.lock();
        if let Some(line) = lines.get_mut(&pin.address) {
            line.exported = false;
            line.mode = None;
        }
        debug!("sim: unexported pin {}", pin);
        Ok(())
    }

    fn state(&self, pin: &PinIdentity) -> ProviderResult<PinState> {
        self.with_line(pin.address, |line| line.state)
    }

    fn set_state(&self, pin: &PinIdentity, state: PinState) -> ProviderResult<()> {
        trace!("sim: pin {} -> {}", pin, state);
        self.with_line(pin.address, |line| line.state = state)
    }

    fn value(&self, pin: &PinIdentity) -> ProviderResult<f64> {
        self.with_line(pin.address, |line| line.value)
    }

    fn set_value(&self, pin: &PinIdentity, value: f64) -> ProviderResult<()> {
        trace!("sim: pin {} -> {}", pin, value);
        self.with_line(pin.address, |line| line.value = value)
    }

    fn set_pwm(&self, pin: &PinIdentity, duty: u32) -> ProviderResult<()> {
        trace!("sim: pin {} -> duty {}", pin, duty);
        self.with_line(pin.address, |line| line.duty = duty)
    }

    fn set_pull_resistance(&self, pin: &PinIdentity, pull: PullResistance) -> ProviderResult<()> {
        self.with_line(pin.address, |line| line.pull = pull)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinhub_core::ModeSet;

    fn identity(address: u8) -> PinIdentity {
        PinIdentity::new(
            address,
            format!("SIM {}", address),
            ModeSet::of(&[PinMode::DigitalOutput]),
        )
    }

    #[test]
    fn test_operations_require_export() {
        let sim = SimProvider::new();
        let pin = identity(0);

        assert!(matches!(
            sim.state(&pin),
            Err(ProviderError::NotExported { address: 0 })
        ));

        sim.export(&pin, PinMode::DigitalOutput).unwrap();
        sim.set_state(&pin, PinState::High).unwrap();
        assert_eq!(sim.state(&pin).unwrap(), PinState::High);

        sim.unexport(&pin).unwrap();
        assert!(sim.state(&pin).is_err());
        assert!(!sim.is_exported(0));
    }

    #[test]
    fn test_line_manipulation() {
        let sim = SimProvider::new();
        let pin = identity(3);
        sim.export(&pin, PinMode::DigitalInput).unwrap();

        sim.set_line_state(3, PinState::High).unwrap();
        assert_eq!(sim.state(&pin).unwrap(), PinState::High);
        assert_eq!(sim.line_state(3), Some(PinState::High));
    }

    #[test]
    fn test_analog_and_pwm_lines() {
        let sim = SimProvider::new();
        let pin = identity(5);
        sim.export(&pin, PinMode::AnalogOutput).unwrap();

        sim.set_value(&pin, 2.5).unwrap();
        assert_eq!(sim.value(&pin).unwrap(), 2.5);

        sim.set_pwm(&pin, 512).unwrap();
        assert_eq!(sim.line_duty(5), Some(512));
    }
}
