//! Motor rotation direction

/// Rotation direction as seen by the driver's DIR input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Positive velocity
    #[default]
    Forward,
    /// Negative velocity
    Reverse,
}

impl Direction {
    /// Map a forward flag onto a direction
    pub const fn from_forward(forward: bool) -> Self {
        if forward {
            Direction::Forward
        } else {
            Direction::Reverse
        }
    }

    /// Check if this is the forward direction
    pub const fn is_forward(self) -> bool {
        matches!(self, Direction::Forward)
    }

    /// Get the opposite direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }
}
