//! Pedal positions.

use crate::{CoreError, CoreResult};

/// A pedal position in `[0.0, 1.0]`.
///
/// `0.0` is the pedal at rest, `1.0` floored.  For the clutch that means
/// `0.0` = fully engaged and `1.0` = fully disengaged.
///
/// Finite out-of-range input is clamped; NaN and infinities are rejected.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "f64", into = "f64"))]
pub struct Pedal(f64);

impl Pedal {
    pub const RELEASED: Pedal = Pedal(0.0);
    pub const FLOORED: Pedal = Pedal(1.0);

    /// Build a pedal position, clamping finite values into `[0, 1]`.
    ///
    /// # Errors
    ///
    /// [`CoreError::NonFinitePedal`] if `position` is NaN or infinite.
    pub fn new(position: f64) -> CoreResult<Self> {
        if !position.is_finite() {
            return Err(CoreError::NonFinitePedal(position));
        }
        Ok(Pedal(position.clamp(0.0, 1.0)))
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn is_released(self) -> bool {
        self.0 == 0.0
    }
}

impl TryFrom<f64> for Pedal {
    type Error = CoreError;

    fn try_from(position: f64) -> CoreResult<Self> {
        Pedal::new(position)
    }
}

impl From<Pedal> for f64 {
    fn from(pedal: Pedal) -> f64 {
        pedal.0
    }
}
