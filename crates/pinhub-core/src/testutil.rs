//! Shared fixtures for unit tests: an in-memory provider and a small board

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::catalog::{BoardProfile, PinIdentity};
use crate::pin::{GpioPin, PinCore};
use crate::provider::{GpioProvider, ProviderError, ProviderResult, SharedProvider};
use crate::types::{ModeSet, PinMode, PinState, PullResistance};

#[derive(Clone)]
struct TestPinState {
    exported: bool,
    state: PinState,
    value: f64,
}

impl Default for TestPinState {
    fn default() -> Self {
        Self {
            exported: false,
            state: PinState::Low,
            value: 0.0,
        }
    }
}

/// Minimal in-memory provider for unit tests
pub(crate) struct TestProvider {
    pins: Mutex<HashMap<u8, TestPinState>>,
    fail_next_export: AtomicBool,
}

impl TestProvider {
    pub(crate) fn shared() -> Arc<TestProvider> {
        Arc::new(TestProvider {
            pins: Mutex::new(HashMap::new()),
            fail_next_export: AtomicBool::new(false),
        })
    }

    pub(crate) fn is_exported(&self, address: u8) -> bool {
        self.pins
            .lock()
            .get(&address)
            .map(|p| p.exported)
            .unwrap_or(false)
    }

    /// Make the next export call fail with an I/O error
    pub(crate) fn fail_next_export(&self) {
        self.fail_next_export.store(true, Ordering::SeqCst);
    }

    fn with_exported<T>(
        &self,
        address: u8,
        f: impl FnOnce(&mut TestPinState) -> T,
    ) -> ProviderResult<T> {
        let mut pins = self.pins.lock();
        match pins.get_mut(&address) {
            Some(pin) if pin.exported => Ok(f(pin)),
            _ => Err(ProviderError::NotExported { address }),
        }
    }
}

impl GpioProvider for TestProvider {
    fn name(&self) -> &str {
        "test-provider"
    }

    fn export(&self, pin: &PinIdentity, _mode: PinMode) -> ProviderResult<()> {
        if self.fail_next_export.swap(false, Ordering::SeqCst) {
            return Err(ProviderError::Io("injected export failure".to_string()));
        }
        self.pins.lock().entry(pin.address).or_default().exported = true;
        Ok(())
    }

    fn unexport(&self, pin: &PinIdentity) -> ProviderResult<()> {
        if let Some(entry) = self.pins.lock().get_mut(&pin.address) {
            entry.exported = false;
        }
        Ok(())
    }

    fn state(&self, pin: &PinIdentity) -> ProviderResult<PinState> {
        self.with_exported(pin.address, |p| p.state)
    }

    fn set_state(&self, pin: &PinIdentity, state: PinState) -> ProviderResult<()> {
        self.with_exported(pin.address, |p| p.state = state)
    }

    fn value(&self, pin: &PinIdentity) -> ProviderResult<f64> {
        self.with_exported(pin.address, |p| p.value)
    }

    fn set_value(&self, pin: &PinIdentity, value: f64) -> ProviderResult<()> {
        self.with_exported(pin.address, |p| p.value = value)
    }

    fn set_pwm(&self, pin: &PinIdentity, duty: u32) -> ProviderResult<()> {
        self.with_exported(pin.address, |p| p.value = duty as f64)
    }

    fn set_pull_resistance(&self, pin: &PinIdentity, _pull: PullResistance) -> ProviderResult<()> {
        self.with_exported(pin.address, |_| ())
    }
}

/// Identity supporting exactly `mode`, without a pull resistor
pub(crate) fn test_identity(address: u8, mode: PinMode) -> PinIdentity {
    PinIdentity::new(address, format!("TEST {}", address), ModeSet::of(&[mode]))
}

/// An exported, registry-detached handle for pin/scheduler tests
pub(crate) fn test_pin(provider: &Arc<TestProvider>, address: u8, mode: PinMode) -> GpioPin {
    let identity = test_identity(address, mode);
    provider
        .export(&identity, mode)
        .expect("test export should succeed");
    let core = PinCore::new(
        identity,
        mode,
        format!("test-{}", address),
        Arc::clone(provider) as SharedProvider,
        Weak::new(),
    );
    GpioPin::from_core(core)
}

/// Small board used by controller tests
pub(crate) fn test_profile() -> BoardProfile {
    BoardProfile::new("test-board")
        .with_pin(PinIdentity::new(
            0,
            "GPIO 0",
            ModeSet::of(&[PinMode::DigitalInput, PinMode::DigitalOutput]),
        ))
        .with_pin(
            PinIdentity::new(
                1,
                "GPIO 1",
                ModeSet::of(&[PinMode::DigitalInput, PinMode::DigitalOutput]),
            )
            .with_pull(),
        )
        .with_pin(PinIdentity::new(
            2,
            "GPIO 2",
            ModeSet::of(&[PinMode::DigitalInput]),
        ))
        .with_pin(PinIdentity::new(
            3,
            "AIN 0",
            ModeSet::of(&[PinMode::AnalogInput]),
        ))
        .with_pin(PinIdentity::new(
            4,
            "AOUT 0",
            ModeSet::of(&[PinMode::AnalogOutput]),
        ))
        .with_pin(PinIdentity::new(
            5,
            "PWM 0",
            ModeSet::of(&[PinMode::PwmOutput, PinMode::DigitalOutput]),
        ))
}
