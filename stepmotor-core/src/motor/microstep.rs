//! Microstep resolution
//!
//! The A4988-class driver reads its resolution from three select lines
//! (MS1, MS2, MS3). Only the five resolutions below are wired on the
//! board, so the factor is a closed enum rather than a free integer.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::MotorError;

/// Microsteps per full step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Microstep {
    #[default]
    Full = 1,
    Half = 2,
    Quarter = 4,
    Eighth = 8,
    Sixteenth = 16,
}

impl Microstep {
    /// Every supported resolution, coarsest first
    pub const ALL: [Microstep; 5] = [
        Microstep::Full,
        Microstep::Half,
        Microstep::Quarter,
        Microstep::Eighth,
        Microstep::Sixteenth,
    ];

    /// Subdivision factor (1, 2, 4, 8 or 16)
    pub const fn factor(self) -> u8 {
        self as u8
    }

    /// Logical levels for (MS1, MS2, MS3)
    pub const fn select_levels(self) -> [bool; 3] {
        match self {
            Microstep::Full => [false, false, false],
            Microstep::Half => [true, false, false],
            Microstep::Quarter => [false, true, false],
            Microstep::Eighth => [false, true, true],
            Microstep::Sixteenth => [true, true, true],
        }
    }
}

impl TryFrom<u8> for Microstep {
    type Error = MotorError;

    fn try_from(factor: u8) -> Result<Self, Self::Error> {
        match factor {
            1 => Ok(Microstep::Full),
            2 => Ok(Microstep::Half),
            4 => Ok(Microstep::Quarter),
            8 => Ok(Microstep::Eighth),
            16 => Ok(Microstep::Sixteenth),
            other => Err(MotorError::InvalidMicrostep(other)),
        }
    }
}

impl From<Microstep> for u8 {
    fn from(ms: Microstep) -> Self {
        ms.factor()
    }
}
