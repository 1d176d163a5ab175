//! Simulated board profile
//!
//! A small fixed catalog covering every mode family, used by the integration
//! tests and by host development without hardware.

use pinhub_core::{BoardProfile, ModeSet, PinIdentity, PinMode};

/// Digital pin with both directions and a pull resistor
const DIGITAL_MODES: ModeSet = ModeSet::of(&[PinMode::DigitalInput, PinMode::DigitalOutput]);

/// Board profile of the simulated board
///
/// | address | name     | capabilities                      |
/// |---------|----------|-----------------------------------|
/// | 0..=2   | GPIO 0-2 | digital in/out, pull              |
/// | 3       | GPIO 3   | digital in only, pull             |
/// | 4       | GPIO 4   | digital out only                  |
/// | 5       | AIN 0    | analog in                         |
/// | 6       | AOUT 0   | analog out                        |
/// | 7       | PWM 0    | pwm out, digital out              |
pub fn sim_profile() -> BoardProfile {
    let mut profile = BoardProfile::new("sim-board");
    for address in 0..=2u8 {
        profile = profile.with_pin(
            PinIdentity::new(address, format!("GPIO {}", address), DIGITAL_MODES).with_pull(),
        );
    }
    profile
        .with_pin(
            PinIdentity::new(3, "GPIO 3", ModeSet::of(&[PinMode::DigitalInput])).with_pull(),
        )
        .with_pin(PinIdentity::new(
            4,
            "GPIO 4",
            ModeSet::of(&[PinMode::DigitalOutput]),
        ))
        .with_pin(PinIdentity::new(
            5,
            "AIN 0",
            ModeSet::of(&[PinMode::AnalogInput]),
        ))
        .with_pin(PinIdentity::new(
            6,
            "AOUT 0",
            ModeSet::of(&[PinMode::AnalogOutput]),
        ))
        .with_pin(PinIdentity::new(
            7,
            "PWM 0",
            ModeSet::of(&[PinMode::PwmOutput, PinMode::DigitalOutput]),
        ))
}
