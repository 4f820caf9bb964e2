//! Microstep mode table.

use crate::error::MotorError;

/// Driver microstep resolution, selected by the MS1..MS3 lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MicrostepMode {
    /// Full step (mode 0).
    #[default]
    Full,
    /// Half step (mode 1).
    Half,
    /// Quarter step (mode 2).
    Quarter,
    /// Eighth step (mode 3).
    Eighth,
    /// Sixteenth step (mode 4).
    Sixteenth,
    /// Thirty-second step (mode 5).
    ThirtySecond,
}

impl MicrostepMode {
    /// All modes in index order.
    pub const ALL: [Self; 6] = [
        Self::Full,
        Self::Half,
        Self::Quarter,
        Self::Eighth,
        Self::Sixteenth,
        Self::ThirtySecond,
    ];

    /// Look up a mode by its index (0..=5).
    ///
    /// # Errors
    ///
    /// Returns `MotorError::InvalidMode` for any other value.
    pub fn from_index(mode: i64) -> Result<Self, MotorError> {
        usize::try_from(mode)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(MotorError::InvalidMode(mode))
    }

    /// Mode index (0..=5).
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Microsteps per full step.
    #[inline]
    pub const fn divisor(self) -> u16 {
        1 << self.index()
    }

    /// MS1, MS2, MS3 levels (`true` = high).
    pub const fn levels(self) -> [bool; 3] {
        match self {
            Self::Full => [false, false, false],
            Self::Half => [true, false, false],
            Self::Quarter => [false, true, false],
            Self::Eighth => [true, true, false],
            Self::Sixteenth => [false, false, true],
            Self::ThirtySecond => [true, true, true],
        }
    }
}

impl TryFrom<i64> for MicrostepMode {
    type Error = MotorError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_index(value)
    }
}
