//! Board-agnostic core for a single step/direction motor channel
//!
//! This crate contains the motor logic that does not depend on a specific
//! chip:
//!
//! - Configuration types (pins, geometry, initial microstepping)
//! - Step pin binding onto a fast I/O bank
//! - Speed to step-delay timing (RPM and steps/second)
//! - Microstep resolution select lines
//! - Single-pulse generation
//! - Selection and update-pending flags for the owning scheduler
//!
//! Deciding *when* to pulse is left to the caller: poll
//! [`Motor::take_update`], read [`Motor::step_delay_micros`], and call
//! [`Motor::step`] at that cadence.

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod motor;

pub use config::{MotorConfig, PinConfig};
pub use error::MotorError;
pub use motor::{Direction, Microstep, Motor, SpeedSetpoint, StepBinding};
