//! Recording fake backend for host tests
//!
//! `RecordingIo` keeps the last written bank bytes and a bounded log of
//! every call so tests can assert on exact write sequences.

use embedded_hal::delay::DelayNs;
use heapless::Vec;

use crate::gpio::{DigitalOutputs, FastPorts, PinId, PortBank};

/// One recorded backend call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoEvent {
    /// `set_pin(pin, high)`
    Pin { pin: PinId, high: bool },
    /// `set_bits(bank, mask)`
    SetBits { bank: PortBank, mask: u8 },
    /// `clear_bits(bank, mask)`
    ClearBits { bank: PortBank, mask: u8 },
}

/// Fake I/O backend that records everything
#[derive(Debug, Default)]
pub struct RecordingIo<const N: usize = 64> {
    log: Vec<IoEvent, N>,
    ports: [u8; 2],
    overflowed: bool,
}

impl<const N: usize> RecordingIo<N> {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self {
            log: Vec::new(),
            ports: [0; 2],
            overflowed: false,
        }
    }

    /// All recorded events, oldest first
    pub fn events(&self) -> &[IoEvent] {
        &self.log
    }

    /// Drop the event log, keeping port state
    pub fn clear_events(&mut self) {
        self.log.clear();
        self.overflowed = false;
    }

    /// Whether events were dropped because the log was full
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Number of `set_pin` calls recorded
    pub fn pin_writes(&self) -> usize {
        self.log
            .iter()
            .filter(|e| matches!(e, IoEvent::Pin { .. }))
            .count()
    }

    /// Last level written to a pin, if it was ever written
    pub fn pin_level(&self, pin: PinId) -> Option<bool> {
        self.log.iter().rev().find_map(|e| match *e {
            IoEvent::Pin { pin: p, high } if p == pin => Some(high),
            _ => None,
        })
    }

    /// Current value of a bank register
    pub fn port(&self, bank: PortBank) -> u8 {
        self.ports[Self::index(bank)]
    }

    fn index(bank: PortBank) -> usize {
        match bank {
            PortBank::A => 0,
            PortBank::B => 1,
        }
    }

    fn record(&mut self, event: IoEvent) {
        if self.log.push(event).is_err() {
            self.overflowed = true;
        }
    }
}

impl<const N: usize> DigitalOutputs for RecordingIo<N> {
    fn set_pin(&mut self, pin: PinId, high: bool) {
        self.record(IoEvent::Pin { pin, high });
    }
}

impl<const N: usize> FastPorts for RecordingIo<N> {
    fn set_bits(&mut self, bank: PortBank, mask: u8) {
        self.ports[Self::index(bank)] |= mask;
        self.record(IoEvent::SetBits { bank, mask });
    }

    fn clear_bits(&mut self, bank: PortBank, mask: u8) {
        self.ports[Self::index(bank)] &= !mask;
        self.record(IoEvent::ClearBits { bank, mask });
    }
}

/// Delay that only counts what was asked of it
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordingDelay {
    /// Sum of all requested delays in nanoseconds
    pub total_ns: u64,
    /// Number of delay calls
    pub calls: u32,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
        self.calls += 1;
    }
}
