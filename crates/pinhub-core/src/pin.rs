//! Provisioned pin handle and state engine
//!
//! A [`GpioPin`] is the live handle returned by provisioning. It delegates
//! all physical I/O to the shared provider capability, serializes state
//! mutations on the same pin (direct writes, toggles, and scheduled flips)
//! through a per-pin operation lock, and owns at most one scheduled task at a
//! time. Handles are cheap to clone; every clone refers to the same
//! provisioned pin.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, error};

use crate::catalog::PinIdentity;
use crate::errors::{GpioError, GpioResult};
use crate::events::{PinEvent, PinListener};
use crate::provider::SharedProvider;
use crate::registry::PinRegistry;
use crate::scheduler::{self, ScheduledTask};
use crate::types::{PinDirection, PinMode, PinState, PullResistance};

/// Shared inner state of a provisioned pin
pub(crate) struct PinCore {
    identity: PinIdentity,
    mode: PinMode,
    name: String,
    provider: SharedProvider,
    exported: AtomicBool,
    /// Serializes direct writes, toggles, and scheduled flips on this pin
    op_lock: Mutex<()>,
    /// At most one in-flight pulse/blink per pin
    task: Mutex<Option<ScheduledTask>>,
    listeners: RwLock<Vec<PinListener>>,
    /// Owning registry, for the unexport-as-unprovision path
    registry: Weak<RwLock<PinRegistry>>,
}

impl PinCore {
    pub(crate) fn new(
        identity: PinIdentity,
        mode: PinMode,
        name: impl Into<String>,
        provider: SharedProvider,
        registry: Weak<RwLock<PinRegistry>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            identity,
            mode,
            name: name.into(),
            provider,
            exported: AtomicBool::new(true),
            op_lock: Mutex::new(()),
            task: Mutex::new(None),
            listeners: RwLock::new(Vec::new()),
            registry,
        })
    }

    pub(crate) fn address(&self) -> u8 {
        self.identity.address
    }

    fn ensure_exported(&self) -> GpioResult<()> {
        if self.exported.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(GpioError::PinNotExported {
                address: self.identity.address,
            })
        }
    }

    fn invalid_mode(&self) -> GpioError {
        GpioError::InvalidPinMode {
            address: self.identity.address,
            mode: self.mode,
        }
    }

    /// Drive the pin and fire listeners; the write path for caller threads
    fn write_state(&self, state: PinState) -> GpioResult<()> {
        self.ensure_exported()?;
        if !self.mode.is_digital() || self.mode.direction() != PinDirection::Out {
            return Err(self.invalid_mode());
        }
        {
            let _guard = self.op_lock.lock();
            self.provider.set_state(&self.identity, state)?;
        }
        self.fire(state);
        Ok(())
    }

    /// Drive the pin from a scheduler worker
    ///
    /// Returns false when the pin has been unexported and the task should
    /// stop. Provider failures cannot be returned to any caller here, so they
    /// are surfaced through the log and the task keeps its schedule.
    pub(crate) fn apply_scheduled_state(&self, state: PinState) -> bool {
        if !self.exported.load(Ordering::SeqCst) {
            debug!(
                "scheduled state change skipped: pin {} no longer exported",
                self.identity
            );
            return false;
        }
        {
            let _guard = self.op_lock.lock();
            if let Err(e) = self.provider.set_state(&self.identity, state) {
                error!(
                    "scheduled state change failed on pin {}: {}",
                    self.identity, e
                );
                return true;
            }
        }
        self.fire(state);
        true
    }

    /// Invoke listeners outside every lock so callbacks may re-enter the pin
    fn fire(&self, state: PinState) {
        let listeners: Vec<PinListener> = self.listeners.read().clone();
        if listeners.is_empty() {
            return;
        }
        let event = PinEvent {
            address: self.identity.address,
            state,
        };
        for listener in listeners {
            listener(&event);
        }
    }

    /// Cancel and join any in-flight pulse/blink
    pub(crate) fn cancel_active_task(&self) {
        let task = self.task.lock().take();
        if let Some(mut task) = task {
            task.cancel();
        }
    }

    /// Remove this exact handle from its registry, if still registered
    ///
    /// A stale handle whose address has since been re-provisioned must not
    /// evict the new owner, so the entry is only removed when it is this
    /// handle.
    pub(crate) fn remove_from_registry(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let mut registry = registry.write();
        let is_self = registry
            .get(self.identity.address)
            .map(|pin| std::ptr::eq(Arc::as_ptr(&pin.core), self))
            .unwrap_or(false);
        if is_self {
            registry.deregister(self.identity.address);
        }
        is_self
    }

    /// Cancel tasks and unexport at the provider; idempotent
    pub(crate) fn release(&self) -> GpioResult<()> {
        self.cancel_active_task();
        if self.exported.swap(false, Ordering::SeqCst) {
            self.provider.unexport(&self.identity)?;
            debug!("unexported pin {}", self.identity);
        }
        Ok(())
    }
}

/// Live handle to a provisioned pin
///
/// Equality means "the same provisioned handle", not merely the same address:
/// a pin that is unprovisioned and provisioned again yields a distinct handle.
#[derive(Clone)]
pub struct GpioPin {
    pub(crate) core: Arc<PinCore>,
}

impl GpioPin {
    pub(crate) fn from_core(core: Arc<PinCore>) -> Self {
        Self { core }
    }

    /// Board-specific address of the underlying pin
    pub fn address(&self) -> u8 {
        self.core.identity.address
    }

    /// Name given at provisioning time
    pub fn name(&self) -> &str {
        &self.core.name
    }

    /// Mode the pin was provisioned in
    pub fn mode(&self) -> PinMode {
        self.core.mode
    }

    /// Immutable identity from the board profile
    pub fn identity(&self) -> &PinIdentity {
        &self.core.identity
    }

    /// The provider capability this handle drives
    pub fn provider(&self) -> SharedProvider {
        Arc::clone(&self.core.provider)
    }

    /// Whether the pin is currently exported for software control
    pub fn is_exported(&self) -> bool {
        self.core.exported.load(Ordering::SeqCst)
    }

    /// Read the current digital state
    ///
    /// Legal for any digital mode; analog and PWM handles read levels through
    /// [`GpioPin::value`] instead.
    pub fn state(&self) -> GpioResult<PinState> {
        self.core.ensure_exported()?;
        if !self.core.mode.is_digital() {
            return Err(self.core.invalid_mode());
        }
        Ok(self.core.provider.state(&self.core.identity)?)
    }

    pub fn is_high(&self) -> GpioResult<bool> {
        Ok(self.state()?.is_high())
    }

    pub fn is_low(&self) -> GpioResult<bool> {
        Ok(self.state()?.is_low())
    }

    /// Drive the pin to `state`; fails for input-direction modes
    pub fn set_state(&self, state: PinState) -> GpioResult<()> {
        self.core.write_state(state)
    }

    pub fn high(&self) -> GpioResult<()> {
        self.set_state(PinState::High)
    }

    pub fn low(&self) -> GpioResult<()> {
        self.set_state(PinState::Low)
    }

    /// Read the current state and write its complement
    ///
    /// Serialized against scheduled flips on this handle, but best-effort
    /// (not linearizable) with respect to other users of the same provider.
    pub fn toggle(&self) -> GpioResult<()> {
        self.core.ensure_exported()?;
        if !self.core.mode.is_digital() || self.core.mode.direction() != PinDirection::Out {
            return Err(self.core.invalid_mode());
        }
        let next = {
            let _guard = self.core.op_lock.lock();
            let next = self.core.provider.state(&self.core.identity)?.complement();
            self.core.provider.set_state(&self.core.identity, next)?;
            next
        };
        self.core.fire(next);
        Ok(())
    }

    /// Drive the pin to `active` now and to its complement after `duration`
    ///
    /// Any pulse/blink already running on this handle is cancelled first.
    /// Returns as soon as the timer is armed; use [`GpioPin::pulse_blocking`]
    /// to wait for the trailing edge.
    pub fn pulse(&self, duration: Duration, active: PinState) -> GpioResult<()> {
        self.pulse_inner(duration, active, false)
    }

    /// Like [`GpioPin::pulse`], but waits until the pulse completes
    pub fn pulse_blocking(&self, duration: Duration, active: PinState) -> GpioResult<()> {
        self.pulse_inner(duration, active, true)
    }

    fn pulse_inner(&self, duration: Duration, active: PinState, blocking: bool) -> GpioResult<()> {
        if duration.is_zero() {
            return Err(GpioError::InvalidArgument(
                "pulse duration must be positive".to_string(),
            ));
        }
        self.core.cancel_active_task();
        self.core.write_state(active)?;

        let task = scheduler::spawn_pulse(Arc::clone(&self.core), duration, active);
        let completion = blocking.then(|| task.completion());
        *self.core.task.lock() = Some(task);
        debug!(
            "pulse armed on pin {}: {}ms {}",
            self.core.identity,
            duration.as_millis(),
            active
        );

        if let Some(done) = completion {
            // Disconnect means the worker exited (completed or superseded)
            let _ = done.recv();
        }
        Ok(())
    }

    /// Alternate between `active` and its complement every `delay`, for the
    /// whole increments of `duration`, ending in the inactive state
    ///
    /// Any pulse/blink already running on this handle is cancelled first. A
    /// `duration` that is not an exact multiple of `delay` truncates to the
    /// last full increment.
    pub fn blink(&self, delay: Duration, duration: Duration, active: PinState) -> GpioResult<()> {
        self.blink_inner(delay, duration, active, false)
    }

    /// Like [`GpioPin::blink`], but waits until the blink window completes
    pub fn blink_blocking(
        &self,
        delay: Duration,
        duration: Duration,
        active: PinState,
    ) -> GpioResult<()> {
        self.blink_inner(delay, duration, active, true)
    }

    fn blink_inner(
        &self,
        delay: Duration,
        duration: Duration,
        active: PinState,
        blocking: bool,
    ) -> GpioResult<()> {
        if delay.is_zero() {
            return Err(GpioError::InvalidArgument(
                "blink delay must be positive".to_string(),
            ));
        }
        if duration.is_zero() {
            return Err(GpioError::InvalidArgument(
                "blink duration must be positive".to_string(),
            ));
        }
        self.core.cancel_active_task();
        self.core.write_state(active)?;

        let task = scheduler::spawn_blink(Arc::clone(&self.core), delay, duration, active);
        let completion = blocking.then(|| task.completion());
        *self.core.task.lock() = Some(task);
        debug!(
            "blink armed on pin {}: every {}ms for {}ms",
            self.core.identity,
            delay.as_millis(),
            duration.as_millis()
        );

        if let Some(done) = completion {
            let _ = done.recv();
        }
        Ok(())
    }

    /// Cancel any in-flight pulse/blink, leaving the pin at its current state
    ///
    /// Call this before issuing direct writes while a blink is running;
    /// otherwise the writes race the scheduled flips.
    pub fn cancel_scheduled(&self) {
        self.core.cancel_active_task();
    }

    /// Read the current analog level
    pub fn value(&self) -> GpioResult<f64> {
        self.core.ensure_exported()?;
        if !self.core.mode.is_analog() {
            return Err(self.core.invalid_mode());
        }
        Ok(self.core.provider.value(&self.core.identity)?)
    }

    /// Drive the pin to an analog level; fails unless mode is analog output
    pub fn set_value(&self, value: f64) -> GpioResult<()> {
        self.core.ensure_exported()?;
        if self.core.mode != PinMode::AnalogOutput {
            return Err(self.core.invalid_mode());
        }
        let _guard = self.core.op_lock.lock();
        Ok(self.core.provider.set_value(&self.core.identity, value)?)
    }

    /// Set the PWM duty value; fails unless mode is PWM output
    pub fn set_pwm(&self, duty: u32) -> GpioResult<()> {
        self.core.ensure_exported()?;
        if self.core.mode != PinMode::PwmOutput {
            return Err(self.core.invalid_mode());
        }
        let _guard = self.core.op_lock.lock();
        Ok(self.core.provider.set_pwm(&self.core.identity, duty)?)
    }

    /// Configure the pull resistor; fails when the pin has none
    pub fn set_pull_resistance(&self, pull: PullResistance) -> GpioResult<()> {
        self.core.ensure_exported()?;
        if !self.core.identity.supports_pull {
            return Err(GpioError::InvalidArgument(format!(
                "pin {} has no configurable pull resistor",
                self.core.identity
            )));
        }
        Ok(self
            .core
            .provider
            .set_pull_resistance(&self.core.identity, pull)?)
    }

    /// Register a callback fired after successful writes and scheduled flips
    pub fn add_listener<F>(&self, listener: F)
    where
        F: Fn(&PinEvent) + Send + Sync + 'static,
    {
        self.core.listeners.write().push(Arc::new(listener));
    }

    /// Remove all registered listeners
    pub fn clear_listeners(&self) {
        self.core.listeners.write().clear();
    }

    /// Unprovision this pin: cancel tasks, unexport, remove from the registry
    ///
    /// Idempotent: unexporting an already-unexported handle is a no-op.
    pub fn unexport(&self) -> GpioResult<()> {
        if !self.is_exported() {
            return Ok(());
        }
        self.core.remove_from_registry();
        self.core.release()
    }
}

impl PartialEq for GpioPin {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }
}

impl Eq for GpioPin {}

impl std::fmt::Debug for GpioPin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpioPin")
            .field("address", &self.address())
            .field("name", &self.name())
            .field("mode", &self.mode())
            .field("exported", &self.is_exported())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{test_pin, TestProvider};
    use crate::types::PinMode;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_set_and_read_state() {
        let provider = TestProvider::shared();
        let pin = test_pin(&provider, 1, PinMode::DigitalOutput);

        pin.set_state(PinState::High).unwrap();
        assert_eq!(pin.state().unwrap(), PinState::High);
        pin.low().unwrap();
        assert!(pin.is_low().unwrap());
    }

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let provider = TestProvider::shared();
        let pin = test_pin(&provider, 1, PinMode::DigitalOutput);

        pin.low().unwrap();
        pin.toggle().unwrap();
        assert!(pin.is_high().unwrap());
        pin.toggle().unwrap();
        assert!(pin.is_low().unwrap());
    }

    #[test]
    fn test_write_to_input_pin_rejected() {
        let provider = TestProvider::shared();
        let pin = test_pin(&provider, 2, PinMode::DigitalInput);

        assert!(matches!(
            pin.set_state(PinState::High),
            Err(GpioError::InvalidPinMode { address: 2, .. })
        ));
        // Reads stay legal for inputs
        pin.state().unwrap();
    }

    #[test]
    fn test_analog_handle_rejects_digital_ops() {
        let provider = TestProvider::shared();
        let pin = test_pin(&provider, 3, PinMode::AnalogOutput);

        assert!(matches!(
            pin.state(),
            Err(GpioError::InvalidPinMode { address: 3, .. })
        ));
        pin.set_value(0.4).unwrap();
        assert_eq!(pin.value().unwrap(), 0.4);
    }

    #[test]
    fn test_unexported_pin_rejects_state_ops() {
        let provider = TestProvider::shared();
        let pin = test_pin(&provider, 1, PinMode::DigitalOutput);

        pin.unexport().unwrap();
        assert!(!pin.is_exported());
        assert!(matches!(
            pin.set_state(PinState::High),
            Err(GpioError::PinNotExported { address: 1 })
        ));
        assert!(matches!(
            pin.state(),
            Err(GpioError::PinNotExported { address: 1 })
        ));
        // Second unexport is a no-op
        pin.unexport().unwrap();
    }

    #[test]
    fn test_zero_durations_rejected() {
        let provider = TestProvider::shared();
        let pin = test_pin(&provider, 1, PinMode::DigitalOutput);

        assert!(matches!(
            pin.pulse(Duration::ZERO, PinState::High),
            Err(GpioError::InvalidArgument(_))
        ));
        assert!(matches!(
            pin.blink(Duration::ZERO, Duration::from_millis(100), PinState::High),
            Err(GpioError::InvalidArgument(_))
        ));
        assert!(matches!(
            pin.blink(Duration::from_millis(100), Duration::ZERO, PinState::High),
            Err(GpioError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_pulse_restores_complement() {
        let provider = TestProvider::shared();
        let pin = test_pin(&provider, 1, PinMode::DigitalOutput);

        pin.low().unwrap();
        pin.pulse(Duration::from_millis(50), PinState::High).unwrap();
        assert!(pin.is_high().unwrap());

        std::thread::sleep(Duration::from_millis(150));
        assert!(pin.is_low().unwrap());
    }

    #[test]
    fn test_blocking_pulse_completes_before_returning() {
        let provider = TestProvider::shared();
        let pin = test_pin(&provider, 1, PinMode::DigitalOutput);

        pin.low().unwrap();
        pin.pulse_blocking(Duration::from_millis(50), PinState::High)
            .unwrap();
        assert!(pin.is_low().unwrap());
    }

    #[test]
    fn test_blocking_blink_ends_inactive() {
        let provider = TestProvider::shared();
        let pin = test_pin(&provider, 1, PinMode::DigitalOutput);

        pin.low().unwrap();
        pin.blink_blocking(
            Duration::from_millis(20),
            Duration::from_millis(80),
            PinState::High,
        )
        .unwrap();
        assert!(pin.is_low().unwrap());
    }

    #[test]
    fn test_listeners_fire_on_writes_and_flips() {
        let provider = TestProvider::shared();
        let pin = test_pin(&provider, 1, PinMode::DigitalOutput);

        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = Arc::clone(&seen);
        pin.add_listener(move |event| {
            assert_eq!(event.address, 1);
            seen_clone.fetch_add(1, Ordering::SeqCst);
        });

        pin.high().unwrap();
        pin.pulse_blocking(Duration::from_millis(30), PinState::High)
            .unwrap();

        // One direct write + pulse leading edge + pulse trailing edge
        assert_eq!(seen.load(Ordering::SeqCst), 3);

        pin.clear_listeners();
        pin.low().unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_pull_requires_capability() {
        let provider = TestProvider::shared();
        // test_pin identities declare no pull resistor
        let pin = test_pin(&provider, 7, PinMode::DigitalInput);

        assert!(matches!(
            pin.set_pull_resistance(PullResistance::PullUp),
            Err(GpioError::InvalidArgument(_))
        ));
    }
}
