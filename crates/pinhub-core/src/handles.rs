//! Typed views over [`GpioPin`], one per mode family
//!
//! Provisioning calls return these so that the common case is checked by the
//! type system: an input handle simply has no write methods. The untyped
//! [`GpioPin`] behind [`as_pin`](DigitalOutputPin::as_pin) still enforces the
//! same rules at runtime for callers that work with heterogeneous pins.

use std::time::Duration;

use crate::errors::GpioResult;
use crate::events::PinEvent;
use crate::pin::GpioPin;
use crate::types::{PinMode, PinState, PullResistance};

macro_rules! delegate_common {
    ($handle:ty) => {
        impl $handle {
            pub(crate) fn new(pin: GpioPin) -> Self {
                Self { pin }
            }

            /// The untyped handle, for registry-level operations
            pub fn as_pin(&self) -> &GpioPin {
                &self.pin
            }

            /// Convert into the untyped handle
            pub fn into_pin(self) -> GpioPin {
                self.pin
            }

            pub fn address(&self) -> u8 {
                self.pin.address()
            }

            pub fn name(&self) -> &str {
                self.pin.name()
            }

            pub fn mode(&self) -> PinMode {
                self.pin.mode()
            }

            pub fn is_exported(&self) -> bool {
                self.pin.is_exported()
            }

            /// Unprovision this pin; idempotent
            pub fn unexport(&self) -> GpioResult<()> {
                self.pin.unexport()
            }
        }
    };
}

/// Handle to a pin provisioned as a digital output
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DigitalOutputPin {
    pin: GpioPin,
}

delegate_common!(DigitalOutputPin);

impl DigitalOutputPin {
    pub fn state(&self) -> GpioResult<PinState> {
        self.pin.state()
    }

    pub fn is_high(&self) -> GpioResult<bool> {
        self.pin.is_high()
    }

    pub fn is_low(&self) -> GpioResult<bool> {
        self.pin.is_low()
    }

    pub fn set_state(&self, state: PinState) -> GpioResult<()> {
        self.pin.set_state(state)
    }

    pub fn high(&self) -> GpioResult<()> {
        self.pin.high()
    }

    pub fn low(&self) -> GpioResult<()> {
        self.pin.low()
    }

    pub fn toggle(&self) -> GpioResult<()> {
        self.pin.toggle()
    }

    /// See [`GpioPin::pulse`]
    pub fn pulse(&self, duration: Duration, active: PinState) -> GpioResult<()> {
        self.pin.pulse(duration, active)
    }

    /// See [`GpioPin::pulse_blocking`]
    pub fn pulse_blocking(&self, duration: Duration, active: PinState) -> GpioResult<()> {
        self.pin.pulse_blocking(duration, active)
    }

    /// See [`GpioPin::blink`]
    pub fn blink(&self, delay: Duration, duration: Duration, active: PinState) -> GpioResult<()> {
        self.pin.blink(delay, duration, active)
    }

    /// See [`GpioPin::blink_blocking`]
    pub fn blink_blocking(
        &self,
        delay: Duration,
        duration: Duration,
        active: PinState,
    ) -> GpioResult<()> {
        self.pin.blink_blocking(delay, duration, active)
    }

    /// Cancel any in-flight pulse/blink
    pub fn cancel_scheduled(&self) {
        self.pin.cancel_scheduled()
    }

    pub fn add_listener<F>(&self, listener: F)
    where
        F: Fn(&PinEvent) + Send + Sync + 'static,
    {
        self.pin.add_listener(listener)
    }

    pub fn clear_listeners(&self) {
        self.pin.clear_listeners()
    }
}

/// Handle to a pin provisioned as a digital input
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DigitalInputPin {
    pin: GpioPin,
}

delegate_common!(DigitalInputPin);

impl DigitalInputPin {
    pub fn state(&self) -> GpioResult<PinState> {
        self.pin.state()
    }

    pub fn is_high(&self) -> GpioResult<bool> {
        self.pin.is_high()
    }

    pub fn is_low(&self) -> GpioResult<bool> {
        self.pin.is_low()
    }

    pub fn set_pull_resistance(&self, pull: PullResistance) -> GpioResult<()> {
        self.pin.set_pull_resistance(pull)
    }

    pub fn add_listener<F>(&self, listener: F)
    where
        F: Fn(&PinEvent) + Send + Sync + 'static,
    {
        self.pin.add_listener(listener)
    }

    pub fn clear_listeners(&self) {
        self.pin.clear_listeners()
    }
}

/// Handle to a pin provisioned as an analog input
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalogInputPin {
    pin: GpioPin,
}

delegate_common!(AnalogInputPin);

impl AnalogInputPin {
    pub fn value(&self) -> GpioResult<f64> {
        self.pin.value()
    }
}

/// Handle to a pin provisioned as an analog output
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalogOutputPin {
    pin: GpioPin,
}

delegate_common!(AnalogOutputPin);

impl AnalogOutputPin {
    pub fn value(&self) -> GpioResult<f64> {
        self.pin.value()
    }

    pub fn set_value(&self, value: f64) -> GpioResult<()> {
        self.pin.set_value(value)
    }
}

/// Handle to a pin provisioned as a PWM output
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PwmOutputPin {
    pin: GpioPin,
}

delegate_common!(PwmOutputPin);

impl PwmOutputPin {
    pub fn set_pwm(&self, duty: u32) -> GpioResult<()> {
        self.pin.set_pwm(duty)
    }
}
