//! Direction of travel.

/// Direction of motor motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Forward (positive step count).
    Forward,
    /// Reverse (negative or zero step count).
    Reverse,
}

impl Direction {
    /// Get direction from a signed step delta.
    ///
    /// A zero delta maps to `Reverse`. No pulse follows, so the level only
    /// matters to something else reading the DIR line.
    #[inline]
    pub fn from_delta(delta: i64) -> Self {
        if delta > 0 {
            Direction::Forward
        } else {
            Direction::Reverse
        }
    }

    /// DIR line level for this direction.
    #[inline]
    pub fn pin_level(self, invert: bool) -> bool {
        match self {
            Direction::Forward => !invert,
            Direction::Reverse => invert,
        }
    }
}
