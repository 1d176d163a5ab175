//! Pin modes, states, and capability sets

use serde::{Deserialize, Serialize};

/// Electrical direction of a pin mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinDirection {
    /// Signal flows into the process (reads)
    In,
    /// Signal flows out of the process (writes)
    Out,
}

impl std::fmt::Display for PinDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PinDirection::In => write!(f, "in"),
            PinDirection::Out => write!(f, "out"),
        }
    }
}

/// Electrical function assigned to a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinMode {
    /// Binary read (high/low)
    DigitalInput,
    /// Binary write (high/low)
    DigitalOutput,
    /// Continuous level read
    AnalogInput,
    /// Continuous level write
    AnalogOutput,
    /// Pulse-width modulated output
    PwmOutput,
}

impl PinMode {
    /// Direction associated with this mode
    pub const fn direction(self) -> PinDirection {
        match self {
            PinMode::DigitalInput | PinMode::AnalogInput => PinDirection::In,
            PinMode::DigitalOutput | PinMode::AnalogOutput | PinMode::PwmOutput => {
                PinDirection::Out
            }
        }
    }

    /// Whether this mode carries a binary high/low state
    pub const fn is_digital(self) -> bool {
        matches!(self, PinMode::DigitalInput | PinMode::DigitalOutput)
    }

    /// Whether this mode carries a continuous level
    pub const fn is_analog(self) -> bool {
        matches!(self, PinMode::AnalogInput | PinMode::AnalogOutput)
    }

    const fn bit(self) -> u8 {
        match self {
            PinMode::DigitalInput => 1,
            PinMode::DigitalOutput => 1 << 1,
            PinMode::AnalogInput => 1 << 2,
            PinMode::AnalogOutput => 1 << 3,
            PinMode::PwmOutput => 1 << 4,
        }
    }
}

impl std::fmt::Display for PinMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PinMode::DigitalInput => write!(f, "digital_input"),
            PinMode::DigitalOutput => write!(f, "digital_output"),
            PinMode::AnalogInput => write!(f, "analog_input"),
            PinMode::AnalogOutput => write!(f, "analog_output"),
            PinMode::PwmOutput => write!(f, "pwm_output"),
        }
    }
}

impl std::str::FromStr for PinMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "digital_input" => Ok(PinMode::DigitalInput),
            "digital_output" => Ok(PinMode::DigitalOutput),
            "analog_input" => Ok(PinMode::AnalogInput),
            "analog_output" => Ok(PinMode::AnalogOutput),
            "pwm_output" => Ok(PinMode::PwmOutput),
            _ => Err(format!("Invalid pin mode: {}", s)),
        }
    }
}

const ALL_MODES: [PinMode; 5] = [
    PinMode::DigitalInput,
    PinMode::DigitalOutput,
    PinMode::AnalogInput,
    PinMode::AnalogOutput,
    PinMode::PwmOutput,
];

/// Capability set over [`PinMode`]
///
/// A fixed bitset checked at provisioning time: a pin may only be provisioned
/// in a mode its identity declares here.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeSet(u8);

impl ModeSet {
    /// The empty capability set
    pub const EMPTY: ModeSet = ModeSet(0);

    /// Build a set from a list of modes
    pub const fn of(modes: &[PinMode]) -> ModeSet {
        let mut bits = 0u8;
        let mut i = 0;
        while i < modes.len() {
            bits |= modes[i].bit();
            i += 1;
        }
        ModeSet(bits)
    }

    /// Return a copy of this set with `mode` added
    pub const fn with(self, mode: PinMode) -> ModeSet {
        ModeSet(self.0 | mode.bit())
    }

    /// Whether `mode` is a member of this set
    pub const fn contains(self, mode: PinMode) -> bool {
        self.0 & mode.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Add a mode in place
    pub fn insert(&mut self, mode: PinMode) {
        self.0 |= mode.bit();
    }

    /// Iterate the member modes
    pub fn iter(self) -> impl Iterator<Item = PinMode> {
        ALL_MODES.into_iter().filter(move |m| self.contains(*m))
    }
}

impl FromIterator<PinMode> for ModeSet {
    fn from_iter<T: IntoIterator<Item = PinMode>>(iter: T) -> Self {
        let mut set = ModeSet::EMPTY;
        for mode in iter {
            set.insert(mode);
        }
        set
    }
}

impl std::fmt::Debug for ModeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Serialize for ModeSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for ModeSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let modes = Vec::<PinMode>::deserialize(deserializer)?;
        Ok(modes.into_iter().collect())
    }
}

/// Binary state of a digital pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinState {
    Low,
    High,
}

impl PinState {
    pub const fn is_high(self) -> bool {
        matches!(self, PinState::High)
    }

    pub const fn is_low(self) -> bool {
        matches!(self, PinState::Low)
    }

    /// The opposite state
    pub const fn complement(self) -> PinState {
        match self {
            PinState::Low => PinState::High,
            PinState::High => PinState::Low,
        }
    }
}

impl std::ops::Not for PinState {
    type Output = PinState;

    fn not(self) -> PinState {
        self.complement()
    }
}

impl From<bool> for PinState {
    fn from(high: bool) -> Self {
        if high {
            PinState::High
        } else {
            PinState::Low
        }
    }
}

impl std::fmt::Display for PinState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PinState::Low => write!(f, "low"),
            PinState::High => write!(f, "high"),
        }
    }
}

/// Pull resistor configuration for input pins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullResistance {
    Off,
    PullDown,
    PullUp,
}

impl std::fmt::Display for PullResistance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PullResistance::Off => write!(f, "off"),
            PullResistance::PullDown => write!(f, "pull_down"),
            PullResistance::PullUp => write!(f, "pull_up"),
        }
    }
}
