//! Gear selection and the gear → ratio lookup table.
//!
//! A ratio's sign encodes rotation direction (reverse is negative) and its
//! magnitude the torque multiplication.  Neutral has ratio zero: nothing is
//! transmitted.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::{CoreError, CoreResult};

// ── Gear ──────────────────────────────────────────────────────────────────────

/// Position of the gear stick.  The set is closed: seven positions, no more.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Gear {
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "N"))]
    Neutral,
    #[cfg_attr(feature = "serde", serde(rename = "R"))]
    Reverse,
    #[cfg_attr(feature = "serde", serde(rename = "1"))]
    First,
    #[cfg_attr(feature = "serde", serde(rename = "2"))]
    Second,
    #[cfg_attr(feature = "serde", serde(rename = "3"))]
    Third,
    #[cfg_attr(feature = "serde", serde(rename = "4"))]
    Fourth,
    #[cfg_attr(feature = "serde", serde(rename = "5"))]
    Fifth,
}

impl Gear {
    /// Every gear, in table order.
    pub const ALL: [Gear; 7] = [
        Gear::Neutral,
        Gear::Reverse,
        Gear::First,
        Gear::Second,
        Gear::Third,
        Gear::Fourth,
        Gear::Fifth,
    ];

    /// Dense index into [`Gear::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Gear::Neutral => 0,
            Gear::Reverse => 1,
            Gear::First   => 2,
            Gear::Second  => 3,
            Gear::Third   => 4,
            Gear::Fourth  => 5,
            Gear::Fifth   => 6,
        }
    }

    #[inline]
    pub fn is_neutral(self) -> bool {
        matches!(self, Gear::Neutral)
    }

    #[inline]
    pub fn is_reverse(self) -> bool {
        matches!(self, Gear::Reverse)
    }

    /// The label printed on the gear knob.
    pub fn as_str(self) -> &'static str {
        match self {
            Gear::Neutral => "N",
            Gear::Reverse => "R",
            Gear::First   => "1",
            Gear::Second  => "2",
            Gear::Third   => "3",
            Gear::Fourth  => "4",
            Gear::Fifth   => "5",
        }
    }
}

impl fmt::Display for Gear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Gear {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Gear> {
        let label = s.trim();
        Gear::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(label))
            .ok_or_else(|| CoreError::UnknownGear(s.to_string()))
    }
}

// ── GearRatioTable ────────────────────────────────────────────────────────────

/// Immutable, total mapping from every [`Gear`] to its signed ratio.
///
/// Construction checks that each gear appears exactly once, that neutral is
/// zero, reverse negative and every forward gear positive.  Once built, a
/// lookup cannot fail.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "BTreeMap<Gear, f64>", into = "BTreeMap<Gear, f64>")
)]
pub struct GearRatioTable {
    ratios: [f64; 7],
}

impl GearRatioTable {
    /// Build a table from `(gear, ratio)` pairs.
    ///
    /// # Errors
    ///
    /// - [`CoreError::DuplicateGearRatio`] if a gear is listed twice.
    /// - [`CoreError::MissingGearRatio`] if any gear is absent.
    /// - [`CoreError::Config`] if a ratio is non-finite or has the wrong sign
    ///   for its gear.
    pub fn from_pairs<I>(pairs: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (Gear, f64)>,
    {
        let mut slots: [Option<f64>; 7] = [None; 7];
        for (gear, ratio) in pairs {
            let slot = &mut slots[gear.index()];
            if slot.is_some() {
                return Err(CoreError::DuplicateGearRatio(gear));
            }
            *slot = Some(ratio);
        }

        let mut ratios = [0.0; 7];
        for gear in Gear::ALL {
            let ratio = slots[gear.index()].ok_or(CoreError::MissingGearRatio(gear))?;
            check_ratio(gear, ratio)?;
            ratios[gear.index()] = ratio;
        }
        Ok(Self { ratios })
    }

    /// Signed ratio for `gear`.
    #[inline]
    pub fn ratio(&self, gear: Gear) -> f64 {
        self.ratios[gear.index()]
    }

    /// Iterate `(gear, ratio)` in table order.
    pub fn iter(&self) -> impl Iterator<Item = (Gear, f64)> + '_ {
        Gear::ALL.into_iter().map(|g| (g, self.ratio(g)))
    }
}

impl Default for GearRatioTable {
    /// The five-speed box: R −3.5, 1st 3.5, 2nd 2.0, 3rd 1.4, 4th 1.0, 5th 0.8.
    fn default() -> Self {
        Self {
            ratios: [0.0, -3.5, 3.5, 2.0, 1.4, 1.0, 0.8],
        }
    }
}

impl TryFrom<BTreeMap<Gear, f64>> for GearRatioTable {
    type Error = CoreError;

    fn try_from(map: BTreeMap<Gear, f64>) -> CoreResult<Self> {
        GearRatioTable::from_pairs(map)
    }
}

impl From<GearRatioTable> for BTreeMap<Gear, f64> {
    fn from(table: GearRatioTable) -> Self {
        table.iter().collect()
    }
}

fn check_ratio(gear: Gear, ratio: f64) -> CoreResult<()> {
    if !ratio.is_finite() {
        return Err(CoreError::Config(format!("ratio for gear {gear} is not finite")));
    }
    let ok = match gear {
        Gear::Neutral => ratio == 0.0,
        Gear::Reverse => ratio < 0.0,
        _             => ratio > 0.0,
    };
    if ok {
        Ok(())
    } else {
        Err(CoreError::Config(format!("ratio {ratio} has the wrong sign for gear {gear}")))
    }
}
