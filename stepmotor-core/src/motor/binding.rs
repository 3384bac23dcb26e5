//! Step pin binding
//!
//! Resolves a logical step pin onto the bank register that can toggle it
//! in one write, and the mask of its bit within that bank.

use stepmotor_hal::{PinId, PortBank};

/// Where step pulses go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepBinding {
    /// Bank A, single-bit mask
    BankA(u8),
    /// Bank B, single-bit mask
    BankB(u8),
    /// Pin not on a fast bank; pulses fail
    #[default]
    Unbound,
}

impl StepBinding {
    /// Bind a logical pin
    pub const fn resolve(pin: PinId) -> Self {
        if PortBank::A.contains(pin) {
            StepBinding::BankA(1 << (pin - PortBank::A.first_pin()))
        } else if PortBank::B.contains(pin) {
            StepBinding::BankB(1 << (pin - PortBank::B.first_pin()))
        } else {
            StepBinding::Unbound
        }
    }

    /// Bank and mask to toggle, None when unbound
    pub const fn target(self) -> Option<(PortBank, u8)> {
        match self {
            StepBinding::BankA(mask) => Some((PortBank::A, mask)),
            StepBinding::BankB(mask) => Some((PortBank::B, mask)),
            StepBinding::Unbound => None,
        }
    }

    /// Bit index within the bank
    pub const fn bit(self) -> Option<u8> {
        match self.target() {
            Some((_, mask)) => Some(mask.trailing_zeros() as u8),
            None => None,
        }
    }

    /// Check if pulses have somewhere to go
    pub const fn is_bound(self) -> bool {
        !matches!(self, StepBinding::Unbound)
    }
}
