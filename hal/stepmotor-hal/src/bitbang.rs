//! Bit-banged banks over `embedded-hal` output pins
//!
//! Fallback backend for chips that do not expose a byte-wide port
//! register at the logical pin layout. Each bank write turns into one
//! `OutputPin` call per bit in the mask, so a step pulse is slightly wider
//! than on a real port backend, never narrower.

use core::convert::Infallible;

use embedded_hal::digital::{OutputPin, PinState};

use crate::gpio::{DigitalOutputs, FastPorts, PinId, PortBank, MAX_PIN};

/// Number of logical pins owned by a [`PinBanks`]
pub const PIN_COUNT: usize = MAX_PIN as usize + 1;

/// Logical pins 0-13 backed by individual output pins
///
/// Pins must be infallible (true for the GPIO outputs of the common
/// embedded HALs). Writes to pin numbers above [`MAX_PIN`] are ignored.
pub struct PinBanks<P> {
    pins: [P; PIN_COUNT],
}

impl<P> PinBanks<P>
where
    P: OutputPin<Error = Infallible>,
{
    /// Take ownership of the pins, index = logical pin number
    pub fn new(pins: [P; PIN_COUNT]) -> Self {
        Self { pins }
    }

    /// Give the pins back
    pub fn release(self) -> [P; PIN_COUNT] {
        self.pins
    }

    fn drive(&mut self, pin: PinId, high: bool) {
        let Some(out) = self.pins.get_mut(pin as usize) else {
            return;
        };
        match out.set_state(PinState::from(high)) {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }

    fn drive_mask(&mut self, bank: PortBank, mask: u8, high: bool) {
        for bit in 0..bank.pin_count() {
            if mask & (1 << bit) != 0 {
                self.drive(bank.first_pin() + bit, high);
            }
        }
    }
}

impl<P> DigitalOutputs for PinBanks<P>
where
    P: OutputPin<Error = Infallible>,
{
    fn set_pin(&mut self, pin: PinId, high: bool) {
        self.drive(pin, high);
    }
}

impl<P> FastPorts for PinBanks<P>
where
    P: OutputPin<Error = Infallible>,
{
    fn set_bits(&mut self, bank: PortBank, mask: u8) {
        self.drive_mask(bank, mask, true);
    }

    fn clear_bits(&mut self, bank: PortBank, mask: u8) {
        self.drive_mask(bank, mask, false);
    }
}
