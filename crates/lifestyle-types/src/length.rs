//! Linear measures in deck units.
//!
//! Decks measure positions in EMU (English Metric Units). Configuration files
//! and humans think in centimetres, so [`Length`] stores EMU internally and
//! (de)serialises as centimetres.

use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// EMU per centimetre.
pub const EMU_PER_CM: i64 = 360_000;

/// A length in EMU.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Length(i64);

impl Length {
    pub const ZERO: Length = Length(0);

    /// Creates a length from a raw EMU count.
    pub const fn from_emu(emu: i64) -> Self {
        Self(emu)
    }

    /// Creates a length from centimetres, rounded to the nearest EMU.
    pub fn from_cm(cm: f64) -> Self {
        Self((cm * EMU_PER_CM as f64).round() as i64)
    }

    pub const fn emu(self) -> i64 {
        self.0
    }

    pub fn as_cm(self) -> f64 {
        self.0 as f64 / EMU_PER_CM as f64
    }
}

impl Add for Length {
    type Output = Length;

    fn add(self, rhs: Length) -> Length {
        Length(self.0 + rhs.0)
    }
}

impl AddAssign for Length {
    fn add_assign(&mut self, rhs: Length) {
        self.0 += rhs.0;
    }
}

impl Sub for Length {
    type Output = Length;

    fn sub(self, rhs: Length) -> Length {
        Length(self.0 - rhs.0)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}cm", self.as_cm())
    }
}

impl serde::Serialize for Length {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_f64(self.as_cm())
    }
}

impl<'de> serde::Deserialize<'de> for Length {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let cm = f64::deserialize(deserializer)?;
        if !cm.is_finite() {
            return Err(serde::de::Error::custom("length must be a finite number of cm"));
        }
        Ok(Length::from_cm(cm))
    }
}

/// An axis-aligned placement rectangle on a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Frame {
    pub x: Length,
    pub y: Length,
    pub width: Length,
    pub height: Length,
}

impl Frame {
    pub fn new(x: Length, y: Length, width: Length, height: Length) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Convenience constructor taking centimetres.
    pub fn from_cm(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(
            Length::from_cm(x),
            Length::from_cm(y),
            Length::from_cm(width),
            Length::from_cm(height),
        )
    }

    /// Bottom edge of the frame.
    pub fn bottom(&self) -> Length {
        self.y + self.height
    }
}
