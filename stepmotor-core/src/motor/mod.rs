//! Step/direction motor channel
//!
//! [`Motor`] owns its I/O backend and keeps pin state, binding and timing
//! consistent with each other after every call. It never schedules
//! anything itself: the owning loop polls [`Motor::take_update`], reads
//! [`Motor::step_delay_micros`] and calls [`Motor::step`] at that cadence.
//!
//! ```ignore
//! let mut motor = Motor::new(io, MotorConfig::new(200, 7, 4, [10, 11, 12]))?;
//! motor.set_rpm(60.0)?;
//!
//! // In the scheduler loop:
//! if motor.take_update() {
//!     interval_us = motor.step_delay_micros();
//! }
//! motor.step(&mut delay)?;
//! ```

pub mod binding;
pub mod direction;
pub mod microstep;
pub mod timing;

pub use binding::StepBinding;
pub use direction::Direction;
pub use microstep::Microstep;
pub use timing::SpeedSetpoint;

use embedded_hal::delay::DelayNs;
use stepmotor_hal::{MotorIo, PinId};

use crate::config::{MotorConfig, PinConfig};
use crate::error::MotorError;

/// One stepper axis driven through a step/dir driver chip
pub struct Motor<IO: MotorIo> {
    io: IO,
    steps_per_revolution: u16,
    step_pin: Option<PinId>,
    binding: StepBinding,
    dir_pin: Option<PinConfig>,
    microstep_pins: Option<[PinConfig; 3]>,
    microstep: Microstep,
    pulse_width_us: u32,
    direction: Direction,
    setpoint: SpeedSetpoint,
    /// Signed micro-steps per second
    steps_per_second: f32,
    /// None while stopped
    step_delay_us: Option<u32>,
    update_pending: bool,
    selected: bool,
}

impl<IO: MotorIo> Motor<IO> {
    /// Create a motor and bring its pins to a known state
    ///
    /// The direction pin is driven to forward and the microstep select
    /// lines are programmed for `config.microsteps`. The motor starts
    /// stopped with no update pending.
    pub fn new(io: IO, config: MotorConfig) -> Result<Self, MotorError> {
        config.validate()?;

        let mut motor = Self {
            io,
            steps_per_revolution: config.steps_per_revolution,
            step_pin: None,
            binding: StepBinding::Unbound,
            dir_pin: config.dir_pin,
            microstep_pins: config.microstep_pins,
            microstep: config.microsteps,
            pulse_width_us: config.pulse_width_us,
            direction: Direction::Forward,
            setpoint: SpeedSetpoint::default(),
            steps_per_second: 0.0,
            step_delay_us: None,
            update_pending: false,
            selected: false,
        };

        if let Some(pin) = config.step_pin {
            motor.set_step_pin(pin);
        }
        motor.write_direction();
        motor.write_microstep_pins();

        Ok(motor)
    }

    /// Borrow the I/O backend
    pub fn io(&self) -> &IO {
        &self.io
    }

    /// Mutably borrow the I/O backend
    pub fn io_mut(&mut self) -> &mut IO {
        &mut self.io
    }

    /// Consume the motor and return the I/O backend
    pub fn release(self) -> IO {
        self.io
    }

    /// Get the full steps per motor rotation
    pub fn steps_per_revolution(&self) -> u16 {
        self.steps_per_revolution
    }

    // ---- Pin configuration ----

    /// Assign the step pin and rebind it
    ///
    /// A pin outside both fast banks is stored but left unbound, and every
    /// following [`Motor::step`] fails with [`MotorError::StepPinUnbound`].
    pub fn set_step_pin(&mut self, pin: PinId) {
        let binding = StepBinding::resolve(pin);
        self.step_pin = Some(pin);
        self.binding = binding;

        #[cfg(feature = "defmt")]
        {
            if binding.is_bound() {
                defmt::debug!("step pin {} bound to {}", pin, binding);
            } else {
                defmt::warn!("step pin {} is not on a fast bank", pin);
            }
        }
    }

    /// Get the assigned step pin
    pub fn step_pin(&self) -> Option<PinId> {
        self.step_pin
    }

    /// Current step pin binding
    pub fn binding(&self) -> StepBinding {
        self.binding
    }

    /// Assign the direction pin and drive it to the current direction
    pub fn set_direction_pin(&mut self, pin: PinConfig) {
        self.dir_pin = Some(pin);
        self.write_direction();
    }

    /// Get the direction pin configuration
    pub fn direction_pin(&self) -> Option<PinConfig> {
        self.dir_pin
    }

    /// MS1, MS2, MS3 select lines if they are wired
    pub fn microstep_pins(&self) -> Option<[PinConfig; 3]> {
        self.microstep_pins
    }

    /// Step pulse high time in µs
    pub fn pulse_width_us(&self) -> u32 {
        self.pulse_width_us
    }

    // ---- Direction ----

    /// Set direction and drive the pin, leaving velocity untouched
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
        self.write_direction();
    }

    /// Get the current direction
    pub fn direction(&self) -> Direction {
        self.direction
    }

    fn write_direction(&mut self) {
        if let Some(pin) = self.dir_pin {
            self.io
                .set_pin(pin.pin, pin.level(self.direction.is_forward()));
        }
    }

    // ---- Speed ----

    /// Set signed velocity in micro-steps per second
    ///
    /// Direction follows the sign (zero counts as forward). Zero stops the
    /// motor: the delay becomes undefined and [`Motor::step`] fails.
    pub fn set_steps_per_second(&mut self, steps_per_second: f32) -> Result<(), MotorError> {
        if !steps_per_second.is_finite() {
            return Err(MotorError::InvalidVelocity);
        }
        self.setpoint = SpeedSetpoint::StepsPerSecond(steps_per_second);
        self.apply_velocity(steps_per_second);
        Ok(())
    }

    /// Get the signed velocity in micro-steps per second
    pub fn steps_per_second(&self) -> f32 {
        self.steps_per_second
    }

    /// Set signed shaft speed in revolutions per minute
    pub fn set_rpm(&mut self, rpm: f32) -> Result<(), MotorError> {
        let steps_per_second =
            timing::rpm_to_steps_per_second(rpm, self.steps_per_revolution, self.microstep);
        if !rpm.is_finite() || !steps_per_second.is_finite() {
            return Err(MotorError::InvalidVelocity);
        }
        self.setpoint = SpeedSetpoint::Rpm(rpm);
        self.apply_velocity(steps_per_second);
        Ok(())
    }

    /// Shaft speed in RPM, fails while stopped
    pub fn rpm(&self) -> Result<f32, MotorError> {
        timing::steps_per_second_to_rpm(
            self.steps_per_second,
            self.steps_per_revolution,
            self.microstep,
        )
    }

    /// Stop the motor
    pub fn stop(&mut self) {
        self.setpoint = SpeedSetpoint::StepsPerSecond(0.0);
        self.apply_velocity(0.0);
    }

    /// Get the speed as last requested
    pub fn setpoint(&self) -> SpeedSetpoint {
        self.setpoint
    }

    /// Microseconds between pulses, None while stopped
    pub fn step_delay_micros(&self) -> Option<u32> {
        self.step_delay_us
    }

    /// Check if the motor is stopped (zero velocity)
    pub fn is_stopped(&self) -> bool {
        self.step_delay_us.is_none()
    }

    fn apply_velocity(&mut self, steps_per_second: f32) {
        let direction = Direction::from_forward(steps_per_second >= 0.0);
        if direction != self.direction {
            self.direction = direction;
            self.write_direction();
        }
        self.retime(steps_per_second);
    }

    /// Store velocity and derive the delay, direction is not touched
    fn retime(&mut self, steps_per_second: f32) {
        self.steps_per_second = steps_per_second;
        self.step_delay_us = timing::step_delay_micros(steps_per_second);
        self.update_pending = true;
    }

    // ---- Microstepping ----

    /// Set microstep resolution from a raw factor
    ///
    /// Anything outside {1, 2, 4, 8, 16} is rejected without touching the
    /// pins or the stored factor.
    pub fn set_microstep_factor(&mut self, factor: u8) -> Result<(), MotorError> {
        let microstep = match Microstep::try_from(factor) {
            Ok(microstep) => microstep,
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("rejected microstep factor {}", factor);
                return Err(e);
            }
        };
        self.set_microstep(microstep)
    }

    /// Set microstep resolution
    ///
    /// Same resolution is a no-op. Otherwise the select lines are
    /// reprogrammed and timing is recomputed, keeping the RPM when speed
    /// was last set in RPM and the steps/second otherwise.
    pub fn set_microstep(&mut self, microstep: Microstep) -> Result<(), MotorError> {
        if microstep == self.microstep {
            return Ok(());
        }

        let steps_per_second = match self.setpoint {
            SpeedSetpoint::Rpm(rpm) => {
                timing::rpm_to_steps_per_second(rpm, self.steps_per_revolution, microstep)
            }
            SpeedSetpoint::StepsPerSecond(_) => self.steps_per_second,
        };
        if !steps_per_second.is_finite() {
            return Err(MotorError::InvalidVelocity);
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("microstep 1/{} -> 1/{}", self.microstep.factor(), microstep.factor());

        self.microstep = microstep;
        self.write_microstep_pins();
        self.retime(steps_per_second);
        Ok(())
    }

    /// Get the current microstep resolution
    pub fn microstep(&self) -> Microstep {
        self.microstep
    }

    fn write_microstep_pins(&mut self) {
        if let Some(pins) = self.microstep_pins {
            for (pin, level) in pins.iter().zip(self.microstep.select_levels()) {
                self.io.set_pin(pin.pin, pin.level(level));
            }
        }
    }

    // ---- Flags ----

    /// Mark this motor as the target of subsequent commands
    pub fn select(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Check if this motor is selected
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Read and clear the update-pending flag
    ///
    /// True exactly once after each change to the step delay or microstep
    /// resolution.
    pub fn take_update(&mut self) -> bool {
        core::mem::replace(&mut self.update_pending, false)
    }

    /// Peek at the update-pending flag without clearing it
    pub fn is_update_pending(&self) -> bool {
        self.update_pending
    }

    // ---- Pulse ----

    /// Emit one step pulse
    ///
    /// Sets the bound bit, busy-waits the pulse width, clears it. The
    /// toggle runs inside a critical section so an interrupt cannot
    /// stretch the pulse. Fails before touching any pin when the step pin
    /// is unbound or the motor is stopped.
    pub fn step<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), MotorError> {
        let (bank, mask) = self.binding.target().ok_or(MotorError::StepPinUnbound)?;
        if self.is_stopped() {
            return Err(MotorError::Stopped);
        }

        let width_us = self.pulse_width_us;
        let io = &mut self.io;
        critical_section::with(|_| {
            io.set_bits(bank, mask);
            delay.delay_us(width_us);
            io.clear_bits(bank, mask);
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepmotor_hal::mock::{IoEvent, RecordingDelay, RecordingIo};
    use stepmotor_hal::PortBank;

    const STEP: PinId = 7;
    const DIR: PinId = 4;
    const MS: [PinId; 3] = [10, 11, 12];

    fn motor() -> Motor<RecordingIo> {
        let mut motor = Motor::new(RecordingIo::new(), MotorConfig::new(200, STEP, DIR, MS)).unwrap();
        motor.io_mut().clear_events();
        motor
    }

    fn ms_levels(motor: &Motor<RecordingIo>) -> [Option<bool>; 3] {
        MS.map(|pin| motor.io().pin_level(pin))
    }

    #[test]
    fn test_new_initializes_pins() {
        let motor = Motor::new(RecordingIo::<64>::new(), MotorConfig::new(200, STEP, DIR, MS)).unwrap();

        assert_eq!(motor.io().pin_level(DIR), Some(true));
        assert_eq!(
            MS.map(|pin| motor.io().pin_level(pin)),
            [Some(false), Some(false), Some(false)]
        );
        assert_eq!(motor.binding(), StepBinding::BankA(0b1000_0000));
        assert!(motor.is_stopped());
        assert!(!motor.is_update_pending());
        assert!(!motor.is_selected());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = MotorConfig {
            steps_per_revolution: 0,
            ..MotorConfig::default()
        };
        assert!(matches!(
            Motor::new(RecordingIo::<64>::new(), config),
            Err(MotorError::InvalidConfig)
        ));
    }

    #[test]
    fn test_default_config_is_unbound_and_silent() {
        let motor = Motor::new(RecordingIo::<64>::new(), MotorConfig::default()).unwrap();

        assert_eq!(motor.step_pin(), None);
        assert_eq!(motor.binding(), StepBinding::Unbound);
        assert!(motor.io().events().is_empty());
    }

    #[test]
    fn test_rpm_scenario() {
        let mut motor = motor();
        motor.set_rpm(60.0).unwrap();

        assert_eq!(motor.steps_per_second(), 200.0);
        assert_eq!(motor.step_delay_micros(), Some(5000));
        assert_eq!(motor.direction(), Direction::Forward);
    }

    #[test]
    fn test_microstep_keeps_rpm() {
        let mut motor = motor();
        motor.set_rpm(60.0).unwrap();
        assert!(motor.take_update());

        motor.set_microstep_factor(8).unwrap();

        assert_eq!(motor.steps_per_second(), 1600.0);
        assert_eq!(motor.step_delay_micros(), Some(625));
        assert_eq!(motor.rpm(), Ok(60.0));
        assert!(motor.take_update());
        assert_eq!(ms_levels(&motor), [Some(false), Some(true), Some(true)]);
    }

    #[test]
    fn test_microstep_keeps_steps_per_second() {
        let mut motor = motor();
        motor.set_steps_per_second(400.0).unwrap();

        motor.set_microstep(Microstep::Sixteenth).unwrap();

        assert_eq!(motor.steps_per_second(), 400.0);
        assert_eq!(motor.step_delay_micros(), Some(2500));
        assert_eq!(motor.rpm(), Ok(7.5));
    }

    #[test]
    fn test_reverse_velocity() {
        let mut motor = motor();
        motor.set_steps_per_second(-100.0).unwrap();

        assert_eq!(motor.direction(), Direction::Reverse);
        assert_eq!(motor.io().pin_level(DIR), Some(false));
        assert_eq!(motor.step_delay_micros(), Some(10_000));
    }

    #[test]
    fn test_direction_pin_written_on_sign_change_only() {
        let mut motor = motor();
        motor.set_steps_per_second(100.0).unwrap();
        motor.set_steps_per_second(250.0).unwrap();
        assert_eq!(motor.io().pin_writes(), 0);

        motor.set_steps_per_second(-250.0).unwrap();
        assert_eq!(motor.io().events(), &[IoEvent::Pin { pin: DIR, high: false }]);
    }

    #[test]
    fn test_inverted_direction_pin() {
        let mut motor = motor();
        motor.set_direction_pin(PinConfig::inverted(5));
        assert_eq!(motor.io().pin_level(5), Some(false));

        motor.set_steps_per_second(-1.0).unwrap();
        assert_eq!(motor.io().pin_level(5), Some(true));
    }

    #[test]
    fn test_set_direction_leaves_velocity() {
        let mut motor = motor();
        motor.set_steps_per_second(100.0).unwrap();
        motor.take_update();

        motor.set_direction(Direction::Reverse);

        assert_eq!(motor.direction(), Direction::Reverse);
        assert_eq!(motor.io().pin_level(DIR), Some(false));
        assert_eq!(motor.steps_per_second(), 100.0);
        assert!(!motor.take_update());
    }

    #[test]
    fn test_microstep_change_keeps_explicit_direction() {
        let mut motor = motor();
        motor.set_steps_per_second(100.0).unwrap();
        motor.set_direction(Direction::Reverse);

        motor.set_microstep(Microstep::Half).unwrap();

        assert_eq!(motor.direction(), Direction::Reverse);
        assert_eq!(motor.io().pin_level(DIR), Some(false));
    }

    #[test]
    fn test_reversing_explicit_direction() {
        let mut motor = motor();
        motor.set_direction(motor.direction().opposite());
        assert_eq!(motor.io().pin_level(DIR), Some(false));

        motor.set_direction(motor.direction().opposite());
        assert_eq!(motor.direction(), Direction::Forward);
        assert_eq!(motor.io().pin_level(DIR), Some(true));
    }

    #[test]
    fn test_microstep_idempotent() {
        let mut motor = motor();
        motor.set_microstep_factor(4).unwrap();
        assert!(motor.take_update());
        let writes = motor.io().pin_writes();

        motor.set_microstep_factor(4).unwrap();

        assert_eq!(motor.io().pin_writes(), writes);
        assert!(!motor.take_update());
    }

    #[test]
    fn test_invalid_microstep_changes_nothing() {
        let mut motor = motor();
        motor.set_rpm(30.0).unwrap();
        motor.take_update();
        motor.io_mut().clear_events();

        assert_eq!(motor.set_microstep_factor(3), Err(MotorError::InvalidMicrostep(3)));

        assert_eq!(motor.microstep(), Microstep::Full);
        assert!(motor.io().events().is_empty());
        assert!(!motor.take_update());
        assert_eq!(motor.step_delay_micros(), Some(10_000));
    }

    #[test]
    fn test_non_finite_velocity_rejected() {
        let mut motor = motor();
        motor.set_steps_per_second(100.0).unwrap();
        motor.take_update();

        assert_eq!(motor.set_steps_per_second(f32::NAN), Err(MotorError::InvalidVelocity));
        assert_eq!(motor.set_rpm(f32::INFINITY), Err(MotorError::InvalidVelocity));
        assert_eq!(motor.set_rpm(f32::MAX), Err(MotorError::InvalidVelocity));

        assert_eq!(motor.steps_per_second(), 100.0);
        assert!(!motor.take_update());
    }

    #[test]
    fn test_update_flag_read_once() {
        let mut motor = motor();
        assert!(!motor.take_update());

        motor.set_steps_per_second(50.0).unwrap();
        assert!(motor.is_update_pending());
        assert!(motor.take_update());
        assert!(!motor.take_update());
        assert!(!motor.is_update_pending());
    }

    #[test]
    fn test_stop_raises_update() {
        let mut motor = motor();
        motor.set_rpm(60.0).unwrap();
        motor.take_update();

        motor.stop();

        assert!(motor.is_stopped());
        assert_eq!(motor.step_delay_micros(), None);
        assert!(motor.take_update());
        assert_eq!(motor.rpm(), Err(MotorError::RpmUndefined));
    }

    #[test]
    fn test_selection_flag() {
        let mut motor = motor();
        motor.select(true);
        assert!(motor.is_selected());
        motor.select(false);
        assert!(!motor.is_selected());
    }

    #[test]
    fn test_step_pulse_sequence() {
        let mut motor = motor();
        let mut delay = RecordingDelay::default();
        motor.set_steps_per_second(200.0).unwrap();

        motor.step(&mut delay).unwrap();

        assert_eq!(
            motor.io().events(),
            &[
                IoEvent::SetBits { bank: PortBank::A, mask: 0b1000_0000 },
                IoEvent::ClearBits { bank: PortBank::A, mask: 0b1000_0000 },
            ]
        );
        assert_eq!(motor.io().port(PortBank::A), 0);
        assert_eq!(delay.total_ns, 1_000);
    }

    #[test]
    fn test_step_on_high_bank() {
        let mut motor = motor();
        let mut delay = RecordingDelay::default();
        motor.set_step_pin(8);
        motor.set_steps_per_second(200.0).unwrap();

        motor.step(&mut delay).unwrap();

        assert_eq!(
            motor.io().events()[0],
            IoEvent::SetBits { bank: PortBank::B, mask: 0b0000_0001 }
        );
    }

    #[test]
    fn test_step_when_stopped_fails() {
        let mut motor = motor();
        let mut delay = RecordingDelay::default();

        assert_eq!(motor.step(&mut delay), Err(MotorError::Stopped));
        assert!(motor.io().events().is_empty());
        assert_eq!(delay.calls, 0);
    }

    #[test]
    fn test_step_unbound_fails() {
        let mut motor = motor();
        let mut delay = RecordingDelay::default();
        motor.set_steps_per_second(200.0).unwrap();

        motor.set_step_pin(14);

        assert_eq!(motor.step_pin(), Some(14));
        assert_eq!(motor.binding(), StepBinding::Unbound);
        assert_eq!(motor.step(&mut delay), Err(MotorError::StepPinUnbound));
        assert!(motor.io().events().is_empty());
    }

    #[test]
    fn test_rebind_replaces_previous_binding() {
        let mut motor = motor();
        let mut delay = RecordingDelay::default();
        motor.set_steps_per_second(200.0).unwrap();

        motor.set_step_pin(14);
        motor.set_step_pin(2);
        motor.step(&mut delay).unwrap();

        assert_eq!(
            motor.io().events()[0],
            IoEvent::SetBits { bank: PortBank::A, mask: 0b0000_0100 }
        );
    }

    #[test]
    fn test_custom_pulse_width() {
        let config = MotorConfig {
            pulse_width_us: 2,
            ..MotorConfig::new(200, 9, DIR, MS)
        };
        let mut motor = Motor::new(RecordingIo::<64>::new(), config).unwrap();
        let mut delay = RecordingDelay::default();
        motor.set_rpm(10.0).unwrap();

        motor.step(&mut delay).unwrap();

        assert_eq!(delay.total_ns, 2_000);
    }

    #[test]
    fn test_hardwired_microstep_pins() {
        let config = MotorConfig {
            step_pin: Some(3),
            ..MotorConfig::default()
        };
        let mut motor = Motor::new(RecordingIo::<64>::new(), config).unwrap();
        motor.set_rpm(60.0).unwrap();

        motor.set_microstep(Microstep::Quarter).unwrap();

        assert!(motor.io().events().is_empty());
        assert_eq!(motor.steps_per_second(), 800.0);
        assert_eq!(motor.step_delay_micros(), Some(1250));
    }
}
