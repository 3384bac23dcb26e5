//! Hardware configuration types
//!
//! These types define the pin assignments and geometry of one motor
//! channel.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use stepmotor_hal::PinId;

use crate::error::MotorError;
use crate::motor::Microstep;

/// Full steps per rotation of a 1.8° motor
pub const DEFAULT_STEPS_PER_REVOLUTION: u16 = 200;

/// Step pulse high time, satisfies A4988 (1 µs minimum)
pub const DEFAULT_PULSE_WIDTH_US: u32 = 1;

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// Logical pin number
    pub pin: PinId,
    /// Pin is active-low (inverted)
    pub inverted: bool,
}

impl PinConfig {
    /// Create a new pin config
    pub const fn new(pin: PinId) -> Self {
        Self {
            pin,
            inverted: false,
        }
    }

    /// Create an inverted (active-low) pin
    pub const fn inverted(pin: PinId) -> Self {
        Self {
            pin,
            inverted: true,
        }
    }

    /// Electrical level that represents the logical `active` state
    pub const fn level(self, active: bool) -> bool {
        active != self.inverted
    }
}

/// Motor channel hardware configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotorConfig {
    /// Full steps per motor rotation, must be non-zero
    pub steps_per_revolution: u16,
    /// Step pulse pin (None = not wired yet)
    pub step_pin: Option<PinId>,
    /// Direction pin, high = forward unless inverted
    pub dir_pin: Option<PinConfig>,
    /// MS1, MS2, MS3 select lines (None = hardwired on the board)
    pub microstep_pins: Option<[PinConfig; 3]>,
    /// Microstep resolution applied at construction
    pub microsteps: Microstep,
    /// Step pulse high time in µs, must be at least 1
    pub pulse_width_us: u32,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            steps_per_revolution: DEFAULT_STEPS_PER_REVOLUTION,
            step_pin: None,
            dir_pin: None,
            microstep_pins: None,
            microsteps: Microstep::Full,
            pulse_width_us: DEFAULT_PULSE_WIDTH_US,
        }
    }
}

impl MotorConfig {
    /// Configuration with every line wired
    pub fn new(
        steps_per_revolution: u16,
        step_pin: PinId,
        dir_pin: PinId,
        microstep_pins: [PinId; 3],
    ) -> Self {
        Self {
            steps_per_revolution,
            step_pin: Some(step_pin),
            dir_pin: Some(PinConfig::new(dir_pin)),
            microstep_pins: Some(microstep_pins.map(PinConfig::new)),
            ..Self::default()
        }
    }

    /// Check the geometry and timing fields
    pub fn validate(&self) -> Result<(), MotorError> {
        if self.steps_per_revolution == 0 || self.pulse_width_us == 0 {
            return Err(MotorError::InvalidConfig);
        }
        Ok(())
    }

    /// Encode into `buf` as postcard, returning the used prefix
    #[cfg(feature = "serde")]
    pub fn to_slice<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], MotorError> {
        postcard::to_slice(self, buf).map_err(|_| MotorError::Encoding)
    }

    /// Decode a postcard-encoded configuration and validate it
    #[cfg(feature = "serde")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MotorError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| MotorError::Encoding)?;
        config.validate()?;
        Ok(config)
    }
}
