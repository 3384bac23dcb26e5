//! Motor errors

/// Errors returned by [`crate::Motor`] operations
///
/// None of these are fatal. A failed call leaves the motor and every pin
/// exactly as they were before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorError {
    /// Step pin is outside both fast banks, no pulse can be emitted
    StepPinUnbound,
    /// Pulse requested while the velocity is zero
    Stopped,
    /// Microstep factor outside {1, 2, 4, 8, 16}
    InvalidMicrostep(u8),
    /// RPM queried while the velocity is zero
    RpmUndefined,
    /// Speed input was NaN or infinite
    InvalidVelocity,
    /// Configuration failed validation
    InvalidConfig,
    /// Configuration could not be encoded or decoded
    Encoding,
}
