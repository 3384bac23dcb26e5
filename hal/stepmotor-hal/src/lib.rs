//! Stepmotor Hardware Abstraction Layer
//!
//! This crate defines the I/O capabilities a step/direction motor driver
//! needs from the chip it runs on. Chip-specific code implements these
//! traits once and the motor core stays board-agnostic.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Owning control loop (firmware)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  stepmotor-core (Motor)                 │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  stepmotor-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!         │                       │
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ port register │       │  PinBanks     │
//! │   backends    │       │ (embedded-hal)│
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::DigitalOutputs`] - Per-pin writes (direction, microstep select)
//! - [`gpio::FastPorts`] - Bulk set/clear on a byte-wide bank (step pulses)
//! - [`gpio::MotorIo`] - Both of the above

#![no_std]
#![deny(unsafe_code)]

pub mod bitbang;
pub mod gpio;
#[cfg(feature = "mock")]
pub mod mock;

// Re-export key traits at crate root for convenience
pub use bitbang::PinBanks;
pub use gpio::{DigitalOutputs, FastPorts, MotorIo, PinId, PortBank, BANK_WIDTH, MAX_PIN};
