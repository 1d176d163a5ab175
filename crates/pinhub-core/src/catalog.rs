//! Pin catalog: immutable board descriptions
//!
//! A [`BoardProfile`] is the read-only lookup table describing every physical
//! pin a board exposes: its address, the modes it electrically supports, and
//! whether it has a configurable pull resistor. Profiles are built in code or
//! loaded from a TOML file:
//!
//! ```toml
//! name = "demo-board"
//!
//! [[pins]]
//! address = 0
//! name = "GPIO 0"
//! modes = ["digital_input", "digital_output"]
//! pull = true
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::{GpioError, GpioResult};
use crate::types::{ModeSet, PinMode};

/// Errors raised while loading or validating a board profile
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("invalid TOML syntax: {0}")]
    Parse(String),

    #[error("duplicate pin address {address} in board profile")]
    DuplicateAddress { address: u8 },

    #[error("pin {address} declares no supported modes")]
    EmptyModeSet { address: u8 },
}

impl From<toml::de::Error> for ProfileError {
    fn from(err: toml::de::Error) -> Self {
        ProfileError::Parse(err.to_string())
    }
}

/// Immutable description of a physical pin
///
/// Equality and hashing consider the board-specific address only; the name
/// and capability set are descriptive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinIdentity {
    /// Board-specific address
    pub address: u8,

    /// Display name (e.g. "GPIO 17")
    pub name: String,

    /// Modes the pin electrically supports
    #[serde(rename = "modes")]
    pub supported_modes: ModeSet,

    /// Whether the pin has a configurable pull resistor
    #[serde(rename = "pull", default)]
    pub supports_pull: bool,
}

impl PinIdentity {
    pub fn new(address: u8, name: impl Into<String>, supported_modes: ModeSet) -> Self {
        Self {
            address,
            name: name.into(),
            supported_modes,
            supports_pull: false,
        }
    }

    /// Mark the pin as having a configurable pull resistor
    pub fn with_pull(mut self) -> Self {
        self.supports_pull = true;
        self
    }

    /// Whether the pin electrically supports `mode`
    pub fn supports_mode(&self, mode: PinMode) -> bool {
        self.supported_modes.contains(mode)
    }
}

impl PartialEq for PinIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for PinIdentity {}

impl std::hash::Hash for PinIdentity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.address.hash(state);
    }
}

impl std::fmt::Display for PinIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (#{})", self.name, self.address)
    }
}

/// Read-only lookup table of every pin a board exposes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardProfile {
    /// Board profile name
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pins: Vec<PinIdentity>,
}

impl BoardProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pins: Vec::new(),
        }
    }

    /// Add a pin description (builder style)
    pub fn with_pin(mut self, pin: PinIdentity) -> Self {
        self.pins.push(pin);
        self
    }

    /// Look up the identity for a board-specific address
    pub fn lookup(&self, address: u8) -> GpioResult<&PinIdentity> {
        self.pins
            .iter()
            .find(|p| p.address == address)
            .ok_or(GpioError::NotFound { address })
    }

    /// All pin identities in the profile
    pub fn pins(&self) -> &[PinIdentity] {
        &self.pins
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Parse and validate a profile from TOML text
    pub fn from_toml(text: &str) -> Result<Self, ProfileError> {
        let profile: BoardProfile = toml::from_str(text)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Check structural invariants: unique addresses, non-empty mode sets
    pub fn validate(&self) -> Result<(), ProfileError> {
        let mut seen = std::collections::HashSet::new();
        for pin in &self.pins {
            if !seen.insert(pin.address) {
                return Err(ProfileError::DuplicateAddress {
                    address: pin.address,
                });
            }
            if pin.supported_modes.is_empty() {
                return Err(ProfileError::EmptyModeSet {
                    address: pin.address,
                });
            }
        }
        Ok(())
    }
}
