//! Unit conversion from the metric values Open-Meteo returns.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
#[error("Unknown {kind}: {value:?}")]
pub struct ParseUnitError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! unit_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &[$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ParseUnitError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok($name::$variant),)+
                    _ => Err(ParseUnitError {
                        kind: $kind,
                        value: value.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

unit_enum!(
    /// Temperature unit; source values are °C.
    TemperatureUnit, "temperature unit" {
        Celsius => "celsius",
        Fahrenheit => "fahrenheit",
    }
);

unit_enum!(
    /// Precipitation unit; source values are mm.
    LengthUnit, "precipitation unit" {
        Mm => "mm",
        Inch => "inch",
    }
);

unit_enum!(
    /// Wind speed unit; source values are m/s.
    SpeedUnit, "wind speed unit" {
        Mps => "mps",
        Kmph => "kmph",
        Mph => "mph",
        Knot => "knot",
    }
);

unit_enum!(
    /// Air pressure unit; source values are hPa.
    PressureUnit, "air pressure unit" {
        Hpa => "hpa",
        Inhg => "inhg",
    }
);

pub const PERCENTAGE_FRACTION_DIGITS: usize = 0;

pub fn celsius_to_fahrenheit(value: f64) -> f64 {
    value * 1.8 + 32.0
}

pub fn mm_to_inches(value: f64) -> f64 {
    value / 25.4
}

pub fn mps_to_mph(value: f64) -> f64 {
    value * 2.23694
}

pub fn mps_to_kmph(value: f64) -> f64 {
    value * 3.6
}

pub fn mps_to_knots(value: f64) -> f64 {
    value * 1.94384
}

pub fn hpa_to_inhg(value: f64) -> f64 {
    value / 33.863886666667
}

impl TemperatureUnit {
    pub fn convert(&self, celsius: f64) -> f64 {
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => celsius_to_fahrenheit(celsius),
        }
    }

    pub fn fraction_digits(&self) -> usize {
        0
    }
}

impl LengthUnit {
    pub fn convert(&self, mm: f64) -> f64 {
        match self {
            Self::Mm => mm,
            Self::Inch => mm_to_inches(mm),
        }
    }

    pub fn fraction_digits(&self) -> usize {
        match self {
            Self::Mm => 0,
            Self::Inch => 1,
        }
    }
}

impl SpeedUnit {
    pub fn convert(&self, mps: f64) -> f64 {
        match self {
            Self::Mps => mps,
            Self::Kmph => mps_to_kmph(mps),
            Self::Mph => mps_to_mph(mps),
            Self::Knot => mps_to_knots(mps),
        }
    }

    pub fn fraction_digits(&self) -> usize {
        match self {
            Self::Mps => 1,
            Self::Kmph | Self::Mph | Self::Knot => 0,
        }
    }
}

impl PressureUnit {
    pub fn convert(&self, hpa: f64) -> f64 {
        match self {
            Self::Hpa => hpa,
            Self::Inhg => hpa_to_inhg(hpa),
        }
    }

    pub fn fraction_digits(&self) -> usize {
        match self {
            Self::Hpa => 0,
            Self::Inhg => 1,
        }
    }
}

/// Fixed-point formatting where exact ties round away from zero.
///
/// Plain `{:.N}` formatting rounds ties to even, which shows `2` for `2.5`.
pub fn to_fixed(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    const PROBE: usize = 30;
    let negative = value < 0.0;
    let abs = value.abs();

    // Exact decimal expansion well past the rounding digit
    let exact = format!("{:.*}", digits + PROBE, abs);
    let (head, tail) = exact.split_at(exact.len() - (PROBE - 1));
    let tie = head.ends_with('5') && tail.bytes().all(|b| b == b'0');

    let rounded = if tie {
        let truncated = head[..head.len() - 1].trim_end_matches('.');
        increment_decimal(truncated)
    } else {
        format!("{:.*}", digits, abs)
    };

    if negative {
        format!("-{}", rounded)
    } else {
        rounded
    }
}

/// Add one unit in the last place of a plain decimal string.
fn increment_decimal(decimal: &str) -> String {
    let mut bytes = decimal.as_bytes().to_vec();
    for i in (0..bytes.len()).rev() {
        match bytes[i] {
            b'.' => continue,
            b'9' => bytes[i] = b'0',
            digit => {
                bytes[i] = digit + 1;
                return String::from_utf8_lossy(&bytes).into_owned();
            }
        }
    }
    format!("1{}", String::from_utf8_lossy(&bytes))
}
