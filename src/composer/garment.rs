use std::fmt;
use std::str::FromStr;

use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{MockupError, MockupResult};

/// Opaque garment fill color, stored as 8-bit sRGB.
///
/// Parsed from `#RRGGBB` or `RRGGBB` (case-insensitive) and always printed as uppercase
/// `#RRGGBB`, which is also its serialized form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GarmentColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl GarmentColor {
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn parse_hex(s: &str) -> MockupResult<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 || !s.is_ascii() {
            return Err(MockupError::validation(
                "garment color must be #RRGGBB (case-insensitive)",
            ));
        }

        fn hex_byte(pair: &str) -> MockupResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| MockupError::validation(format!("invalid hex byte \"{pair}\"")))
        }

        Ok(Self {
            r: hex_byte(&s[0..2])?,
            g: hex_byte(&s[2..4])?,
            b: hex_byte(&s[4..6])?,
        })
    }

    pub fn to_rgba8_premul(self) -> Rgba8Premul {
        Rgba8Premul::opaque(self.r, self.g, self.b)
    }
}

impl Default for GarmentColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for GarmentColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for GarmentColor {
    type Err = MockupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl serde::Serialize for GarmentColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for GarmentColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Which side of the garment is being previewed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewSide {
    #[default]
    Front,
    Back,
}

impl ViewSide {
    pub fn flipped(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

/// Garment appearance chosen by the customer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GarmentState {
    pub color: GarmentColor,
    pub view_side: ViewSide,
}

#[cfg(test)]
#[path = "../../tests/unit/composer/garment.rs"]
mod tests;
