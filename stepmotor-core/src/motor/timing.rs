//! Speed and step-delay conversions
//!
//! Steps/second always counts physical micro-steps, so the microstep
//! factor appears in the RPM conversion and nowhere else.

use crate::error::MotorError;
use crate::motor::Microstep;

const MICROS_PER_SEC: f64 = 1_000_000.0;
const SECS_PER_MIN: f32 = 60.0;

/// How the caller last asked for speed
///
/// Changing the microstep factor keeps whichever quantity was requested:
/// an RPM setpoint is rescaled to the new steps/second, a steps/second
/// setpoint is left alone.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpeedSetpoint {
    /// Signed micro-steps per second
    StepsPerSecond(f32),
    /// Signed shaft revolutions per minute
    Rpm(f32),
}

impl Default for SpeedSetpoint {
    fn default() -> Self {
        SpeedSetpoint::StepsPerSecond(0.0)
    }
}

fn micro_steps_per_rev(steps_per_revolution: u16, ms: Microstep) -> f32 {
    steps_per_revolution as f32 * ms.factor() as f32
}

/// Shaft RPM to micro-steps per second
pub fn rpm_to_steps_per_second(rpm: f32, steps_per_revolution: u16, ms: Microstep) -> f32 {
    rpm * micro_steps_per_rev(steps_per_revolution, ms) / SECS_PER_MIN
}

/// Micro-steps per second back to shaft RPM
///
/// Zero velocity has no meaningful inverse here and fails with
/// [`MotorError::RpmUndefined`], as does a zero step count.
pub fn steps_per_second_to_rpm(
    steps_per_second: f32,
    steps_per_revolution: u16,
    ms: Microstep,
) -> Result<f32, MotorError> {
    if steps_per_second == 0.0 || steps_per_revolution == 0 {
        return Err(MotorError::RpmUndefined);
    }
    Ok(steps_per_second * SECS_PER_MIN / micro_steps_per_rev(steps_per_revolution, ms))
}

/// Microseconds between pulses, rounded to nearest
///
/// Computed in `f64` so the only rounding is the final one. Returns None
/// for zero velocity. Delays beyond `u32::MAX` saturate.
pub fn step_delay_micros(steps_per_second: f32) -> Option<u32> {
    if steps_per_second == 0.0 {
        return None;
    }
    let delay = libm::round(MICROS_PER_SEC / libm::fabs(f64::from(steps_per_second)));
    // Float to int casts saturate
    Some(delay as u32)
}
