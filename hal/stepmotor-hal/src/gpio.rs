//! GPIO capability abstractions
//!
//! Two kinds of output are needed by a step/direction driver: ordinary
//! per-pin writes for lines that change rarely (direction, microstep
//! select) and a bulk set/clear on a whole bank for the step line, which
//! has to toggle as fast as the chip allows.

/// Logical pin number as printed on the board (0-13)
pub type PinId = u8;

/// Highest logical pin that belongs to a fast bank
pub const MAX_PIN: PinId = 13;

/// Bit width of a bank register
pub const BANK_WIDTH: u8 = 8;

/// Byte-wide I/O bank that can be toggled in one register write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortBank {
    /// Low bank: logical pins 0-7, bit = pin
    A,
    /// High bank: logical pins 8-13, bit = pin - 8
    B,
}

impl PortBank {
    /// First logical pin mapped onto bit 0 of this bank
    pub const fn first_pin(self) -> PinId {
        match self {
            PortBank::A => 0,
            PortBank::B => BANK_WIDTH,
        }
    }

    /// Number of logical pins wired to this bank
    pub const fn pin_count(self) -> u8 {
        match self {
            PortBank::A => BANK_WIDTH,
            PortBank::B => MAX_PIN + 1 - BANK_WIDTH,
        }
    }

    /// Check whether a logical pin lives on this bank
    pub const fn contains(self, pin: PinId) -> bool {
        pin >= self.first_pin() && pin < self.first_pin() + self.pin_count()
    }
}

/// Per-pin digital outputs addressed by logical pin number
///
/// Used for the direction line and the three microstep select lines.
pub trait DigitalOutputs {
    /// Drive a pin to the given level (true = high)
    fn set_pin(&mut self, pin: PinId, high: bool);

    /// Drive a pin high
    fn set_pin_high(&mut self, pin: PinId) {
        self.set_pin(pin, true);
    }

    /// Drive a pin low
    fn set_pin_low(&mut self, pin: PinId) {
        self.set_pin(pin, false);
    }
}

/// Bulk bank toggling
///
/// Each call must touch only the bits in `mask` and must complete in a
/// single write where the hardware allows it (e.g. `PORTx |= mask` on AVR,
/// the SIO set/clear aliases on RP2040).
pub trait FastPorts {
    /// Drive every bit set in `mask` high
    fn set_bits(&mut self, bank: PortBank, mask: u8);

    /// Drive every bit set in `mask` low
    fn clear_bits(&mut self, bank: PortBank, mask: u8);
}

/// Complete I/O backend for one motor
pub trait MotorIo: DigitalOutputs + FastPorts {}

// Blanket implementation for types that implement both traits
impl<T: DigitalOutputs + FastPorts> MotorIo for T {}
