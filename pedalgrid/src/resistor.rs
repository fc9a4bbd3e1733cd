//! Resistor color-code decoder and encoder.
//!
//! Covers the IEC 60062 band system both directions:
//!
//! - decode: 4-band and 5-band color sequences to ohms + tolerance
//! - encode: ohms + tolerance back to bands for build-guide rendering
//! - E-series validation (E12/E24/E48/E96), advisory only
//! - the `47k` / `4k7` / `560R` shorthand used in BOM value columns
//!
//! All lookup tables are complete per IEC 60062, including the gold/silver
//! fractional multipliers needed for sub-10-ohm parts.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use nom::branch::alt;
use nom::character::complete::{digit1, one_of};
use nom::combinator::{all_consuming, map, opt};
use nom::number::complete::double;
use nom::sequence::tuple;
use nom::IResult;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance implied by a missing fourth band on old 3-band parts. Display
/// convention only; [`decode_bands`] never fills it in silently.
pub const DEFAULT_TOLERANCE: f64 = 20.0;

// ---------------------------------------------------------------------------
// Band colors and lookup tables
// ---------------------------------------------------------------------------

/// One band color from the IEC 60062 code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandColor {
    Black,
    Brown,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Violet,
    Gray,
    White,
    Gold,
    Silver,
}

/// Multiplier values in ascending order, used when searching for an encoding.
const MULTIPLIERS: [(f64, BandColor); 12] = [
    (0.01, BandColor::Silver),
    (0.1, BandColor::Gold),
    (1.0, BandColor::Black),
    (10.0, BandColor::Brown),
    (100.0, BandColor::Red),
    (1e3, BandColor::Orange),
    (1e4, BandColor::Yellow),
    (1e5, BandColor::Green),
    (1e6, BandColor::Blue),
    (1e7, BandColor::Violet),
    (1e8, BandColor::Gray),
    (1e9, BandColor::White),
];

impl BandColor {
    /// Digit value 0-9, if this color is valid in a digit position.
    pub fn digit(self) -> Option<u32> {
        match self {
            BandColor::Black => Some(0),
            BandColor::Brown => Some(1),
            BandColor::Red => Some(2),
            BandColor::Orange => Some(3),
            BandColor::Yellow => Some(4),
            BandColor::Green => Some(5),
            BandColor::Blue => Some(6),
            BandColor::Violet => Some(7),
            BandColor::Gray => Some(8),
            BandColor::White => Some(9),
            BandColor::Gold | BandColor::Silver => None,
        }
    }

    /// Multiplier value. Every color is valid in the multiplier position;
    /// gold and silver give the fractional multipliers for sub-10-ohm parts.
    pub fn multiplier(self) -> f64 {
        match self {
            BandColor::Black => 1.0,
            BandColor::Brown => 10.0,
            BandColor::Red => 100.0,
            BandColor::Orange => 1e3,
            BandColor::Yellow => 1e4,
            BandColor::Green => 1e5,
            BandColor::Blue => 1e6,
            BandColor::Violet => 1e7,
            BandColor::Gray => 1e8,
            BandColor::White => 1e9,
            BandColor::Gold => 0.1,
            BandColor::Silver => 0.01,
        }
    }

    /// Tolerance in percent, if this color is valid in the tolerance
    /// position.
    pub fn tolerance(self) -> Option<f64> {
        match self {
            BandColor::Brown => Some(1.0),
            BandColor::Red => Some(2.0),
            BandColor::Green => Some(0.5),
            BandColor::Blue => Some(0.25),
            BandColor::Violet => Some(0.1),
            BandColor::Gray => Some(0.05),
            BandColor::Gold => Some(5.0),
            BandColor::Silver => Some(10.0),
            _ => None,
        }
    }

    fn from_digit(d: u32) -> BandColor {
        match d {
            0 => BandColor::Black,
            1 => BandColor::Brown,
            2 => BandColor::Red,
            3 => BandColor::Orange,
            4 => BandColor::Yellow,
            5 => BandColor::Green,
            6 => BandColor::Blue,
            7 => BandColor::Violet,
            8 => BandColor::Gray,
            _ => BandColor::White,
        }
    }

    /// Canonical lowercase name. Aliases (`purple`, `grey`) never come back
    /// out; they are folded on input.
    pub fn name(self) -> &'static str {
        match self {
            BandColor::Black => "black",
            BandColor::Brown => "brown",
            BandColor::Red => "red",
            BandColor::Orange => "orange",
            BandColor::Yellow => "yellow",
            BandColor::Green => "green",
            BandColor::Blue => "blue",
            BandColor::Violet => "violet",
            BandColor::Gray => "gray",
            BandColor::White => "white",
            BandColor::Gold => "gold",
            BandColor::Silver => "silver",
        }
    }
}

impl Display for BandColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BandColor {
    type Err = ResistorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let color = match s.trim().to_ascii_lowercase().as_str() {
            "black" => BandColor::Black,
            "brown" => BandColor::Brown,
            "red" => BandColor::Red,
            "orange" => BandColor::Orange,
            "yellow" => BandColor::Yellow,
            "green" => BandColor::Green,
            "blue" => BandColor::Blue,
            "violet" | "purple" => BandColor::Violet,
            "gray" | "grey" => BandColor::Gray,
            "white" => BandColor::White,
            "gold" => BandColor::Gold,
            "silver" => BandColor::Silver,
            _ => return Err(ResistorError::UnknownColor(s.to_string())),
        };
        Ok(color)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum ResistorError {
    #[error("unknown band color \"{0}\"")]
    UnknownColor(String),
    #[error("expected 4 or 5 color bands, got {0}")]
    BandCount(usize),
    #[error("{color} is not a digit color (band {position})")]
    DigitBand { position: usize, color: BandColor },
    #[error("{0} is not a tolerance color")]
    ToleranceBand(BandColor),
    #[error("tolerance {0}% has no band color (valid: 0.05, 0.1, 0.25, 0.5, 1, 2, 5, 10)")]
    UnsupportedTolerance(f64),
    #[error("{0} ohms cannot be represented as color bands")]
    Unencodable(f64),
    #[error("resistance must be positive, got {0}")]
    NonPositive(f64),
    #[error("unrecognized resistance value \"{0}\"")]
    InvalidValue(String),
}

// ---------------------------------------------------------------------------
// E-series standard values
// ---------------------------------------------------------------------------

/// IEC 60063 preferred-value series, coarsest to finest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ESeries {
    E12,
    E24,
    E48,
    E96,
}

const E12_VALUES: [f64; 12] = [
    1.0, 1.2, 1.5, 1.8, 2.2, 2.7, 3.3, 3.9, 4.7, 5.6, 6.8, 8.2,
];

const E24_VALUES: [f64; 24] = [
    1.0, 1.1, 1.2, 1.3, 1.5, 1.6, 1.8, 2.0, 2.2, 2.4, 2.7, 3.0, 3.3, 3.6, 3.9, 4.3, 4.7, 5.1,
    5.6, 6.2, 6.8, 7.5, 8.2, 9.1,
];

const E48_VALUES: [f64; 48] = [
    1.00, 1.05, 1.10, 1.15, 1.21, 1.27, 1.33, 1.40, 1.47, 1.54, 1.62, 1.69, 1.78, 1.87, 1.96,
    2.05, 2.15, 2.26, 2.37, 2.49, 2.61, 2.74, 2.87, 3.01, 3.16, 3.32, 3.48, 3.65, 3.83, 4.02,
    4.22, 4.42, 4.64, 4.87, 5.11, 5.36, 5.62, 5.90, 6.19, 6.49, 6.81, 7.15, 7.50, 7.87, 8.25,
    8.66, 9.09, 9.53,
];

const E96_VALUES: [f64; 96] = [
    1.00, 1.02, 1.05, 1.07, 1.10, 1.13, 1.15, 1.18, 1.21, 1.24, 1.27, 1.30, 1.33, 1.37, 1.40,
    1.43, 1.47, 1.50, 1.54, 1.58, 1.62, 1.65, 1.69, 1.74, 1.78, 1.82, 1.87, 1.91, 1.96, 2.00,
    2.05, 2.10, 2.15, 2.21, 2.26, 2.32, 2.37, 2.43, 2.49, 2.55, 2.61, 2.67, 2.74, 2.80, 2.87,
    2.94, 3.01, 3.09, 3.16, 3.24, 3.32, 3.40, 3.48, 3.57, 3.65, 3.74, 3.83, 3.92, 4.02, 4.12,
    4.22, 4.32, 4.42, 4.53, 4.64, 4.75, 4.87, 4.99, 5.11, 5.23, 5.36, 5.49, 5.62, 5.76, 5.90,
    6.04, 6.19, 6.34, 6.49, 6.65, 6.81, 6.98, 7.15, 7.32, 7.50, 7.68, 7.87, 8.06, 8.25, 8.45,
    8.66, 8.87, 9.09, 9.31, 9.53, 9.76,
];

impl ESeries {
    /// All series, checked coarsest-first so a 10k part reports E12 rather
    /// than the E96 superset.
    pub const ALL: [ESeries; 4] = [ESeries::E12, ESeries::E24, ESeries::E48, ESeries::E96];

    /// Significand table for this series (decade-normalized, [1.0, 10.0)).
    pub fn values(self) -> &'static [f64] {
        match self {
            ESeries::E12 => &E12_VALUES,
            ESeries::E24 => &E24_VALUES,
            ESeries::E48 => &E48_VALUES,
            ESeries::E96 => &E96_VALUES,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ESeries::E12 => "E12",
            ESeries::E24 => "E24",
            ESeries::E48 => "E48",
            ESeries::E96 => "E96",
        }
    }
}

impl Display for ESeries {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Check which E-series (if any) contains this ohm value.
///
/// Returns `(Some(series), None)` on an exact match (to within rounding of
/// the series' logarithmic steps), or `(None, Some(nearest))` with the
/// closest E96 value otherwise. Non-positive input returns `(None, None)`.
pub fn e_series_match(ohms: f64) -> (Option<ESeries>, Option<f64>) {
    if ohms <= 0.0 || !ohms.is_finite() {
        return (None, None);
    }

    let mut decade = 10f64.powf(ohms.log10().floor());
    // log10 of an exact power of ten can land a hair under the integer.
    if ohms / decade >= 10.0 {
        decade *= 10.0;
    }
    let significand = ohms / decade;
    // Two decimal places absorbs float noise from the decade division.
    let sig_rounded = (significand * 100.0).round() / 100.0;

    for series in ESeries::ALL {
        let hit = series
            .values()
            .iter()
            .any(|v| (v - sig_rounded).abs() < 0.005);
        if hit {
            return (Some(series), None);
        }
    }

    let nearest = E96_VALUES
        .iter()
        .map(|v| v * decade)
        .min_by(|a, b| {
            let da = (a - ohms).abs();
            let db = (b - ohms).abs();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        });
    (None, nearest)
}

// ---------------------------------------------------------------------------
// Decoded / encoded value types
// ---------------------------------------------------------------------------

/// Decoded resistor value. Pure result of a band decode; carries no
/// formatting from the input beyond the normalized band colors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedResistor {
    pub ohms: f64,
    /// Tolerance in percent from the last band.
    pub tolerance: Option<f64>,
    /// Normalized bands (aliases folded to canonical colors).
    pub bands: Vec<BandColor>,
    /// Advisory: which standard series this value sits on, if any.
    pub series: Option<ESeries>,
    /// Advisory: nearest E96 value when `series` is `None`.
    pub nearest_standard: Option<f64>,
}

impl DecodedResistor {
    /// `"47 kΩ ±1%"` style display string.
    pub fn pretty(&self) -> String {
        match self.tolerance {
            Some(t) => format!("{} ±{}%", format_ohms(self.ohms), trim_float(t)),
            None => format_ohms(self.ohms),
        }
    }
}

/// Result of encoding an ohm value to color bands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodedResistor {
    pub ohms: f64,
    /// 5-band form: three digits, multiplier, tolerance. Always present.
    pub bands_5: [BandColor; 5],
    /// 4-band form: two digits, multiplier, tolerance. `None` when the value
    /// needs three significant digits.
    pub bands_4: Option<[BandColor; 4]>,
    pub tolerance_color: BandColor,
    pub tolerance_percent: f64,
}

impl EncodedResistor {
    pub fn pretty_5band(&self) -> String {
        self.bands_5.map(|b| b.name()).join(" / ")
    }

    pub fn pretty_4band(&self) -> Option<String> {
        self.bands_4.map(|bands| bands.map(|b| b.name()).join(" / "))
    }
}

// ---------------------------------------------------------------------------
// Decoder (bands -> value)
// ---------------------------------------------------------------------------

/// Decode a resistor from its color bands, left to right.
///
/// 5-band: `[d1, d2, d3, multiplier, tolerance]`; 4-band drops `d3`. Any
/// other band count is rejected, as is an unknown color name, a non-digit
/// color in a digit position, or a non-tolerance color in the tolerance
/// position. The `violet`/`purple` and `gray`/`grey` aliases decode
/// identically.
pub fn decode_bands<S: AsRef<str>>(bands: &[S]) -> Result<DecodedResistor, ResistorError> {
    let colors: Vec<BandColor> = bands
        .iter()
        .map(|s| s.as_ref().parse())
        .collect::<Result<_, _>>()?;

    let (digits, mult_color, tol_color) = match colors.as_slice() {
        [d1, d2, d3, m, t] => {
            let value = digit_at(*d1, 1)? * 100 + digit_at(*d2, 2)? * 10 + digit_at(*d3, 3)?;
            (value, *m, *t)
        }
        [d1, d2, m, t] => {
            let value = digit_at(*d1, 1)? * 10 + digit_at(*d2, 2)?;
            (value, *m, *t)
        }
        other => return Err(ResistorError::BandCount(other.len())),
    };

    let tolerance = tol_color
        .tolerance()
        .ok_or(ResistorError::ToleranceBand(tol_color))?;
    let ohms = digits as f64 * mult_color.multiplier();
    let (series, nearest_standard) = e_series_match(ohms);

    Ok(DecodedResistor {
        ohms,
        tolerance: Some(tolerance),
        bands: colors,
        series,
        nearest_standard,
    })
}

fn digit_at(color: BandColor, position: usize) -> Result<u32, ResistorError> {
    color
        .digit()
        .ok_or(ResistorError::DigitBand { position, color })
}

// ---------------------------------------------------------------------------
// Encoder (value -> bands)
// ---------------------------------------------------------------------------

/// Encode an ohm value into color bands.
///
/// The 5-band form always exists for representable values (three-digit
/// significand over the full multiplier table, gold/silver included); the
/// 4-band form exists only when two significant digits suffice. Tolerance
/// must match a band color exactly.
pub fn encode_ohms(ohms: f64, tolerance_percent: f64) -> Result<EncodedResistor, ResistorError> {
    if !(ohms > 0.0) || !ohms.is_finite() {
        return Err(ResistorError::NonPositive(ohms));
    }
    let tolerance_color = tolerance_color_for(tolerance_percent)
        .ok_or(ResistorError::UnsupportedTolerance(tolerance_percent))?;

    let bands_5 = encode_significand(ohms, 100, 999)
        .map(|(sig, mult)| {
            [
                BandColor::from_digit(sig / 100),
                BandColor::from_digit((sig / 10) % 10),
                BandColor::from_digit(sig % 10),
                mult,
                tolerance_color,
            ]
        })
        .ok_or(ResistorError::Unencodable(ohms))?;

    let bands_4 = encode_significand(ohms, 10, 99).map(|(sig, mult)| {
        [
            BandColor::from_digit(sig / 10),
            BandColor::from_digit(sig % 10),
            mult,
            tolerance_color,
        ]
    });

    Ok(EncodedResistor {
        ohms,
        bands_5,
        bands_4,
        tolerance_color,
        tolerance_percent,
    })
}

/// Exact reverse lookup into the tolerance table.
fn tolerance_color_for(percent: f64) -> Option<BandColor> {
    const TOLERANCE_COLORS: [BandColor; 8] = [
        BandColor::Gray,
        BandColor::Violet,
        BandColor::Blue,
        BandColor::Green,
        BandColor::Brown,
        BandColor::Red,
        BandColor::Gold,
        BandColor::Silver,
    ];
    TOLERANCE_COLORS
        .into_iter()
        .find(|c| matches!(c.tolerance(), Some(t) if (t - percent).abs() < 1e-9))
}

/// Find `(significand, multiplier_color)` with the significand in
/// `[lo, hi]`, trying multipliers smallest-first. The fractional multipliers
/// get a looser round-trip check because 0.1 and 0.01 are not exact in
/// binary.
fn encode_significand(ohms: f64, lo: u32, hi: u32) -> Option<(u32, BandColor)> {
    for (mult, color) in MULTIPLIERS {
        let candidate = ohms / mult;
        if candidate < lo as f64 - 0.5 || candidate > hi as f64 + 0.5 {
            continue;
        }
        let sig = candidate.round() as u32;
        if sig < lo || sig > hi {
            continue;
        }
        let rel_err = (sig as f64 * mult - ohms).abs() / ohms.max(1e-12);
        let limit = if mult < 1.0 { 0.01 } else { 0.001 };
        if rel_err < limit {
            return Some((sig, color));
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Value-string shorthand ("47k", "4k7", "560R")
// ---------------------------------------------------------------------------

fn ohm_multiplier(c: char) -> f64 {
    match c.to_ascii_lowercase() {
        'k' => 1e3,
        'm' => 1e6,
        _ => 1.0, // 'r'
    }
}

/// Mid-fix form where the multiplier letter is the decimal point: `4k7`.
fn midfix_ohms(input: &str) -> IResult<&str, f64> {
    map(
        tuple((digit1, one_of("kKmMrR"), digit1)),
        |(int_part, mult, frac_part): (&str, char, &str)| {
            let value: f64 = format!("{int_part}.{frac_part}").parse().unwrap_or(0.0);
            value * ohm_multiplier(mult)
        },
    )(input)
}

/// Plain form with an optional trailing multiplier letter: `47k`, `2.2M`,
/// `560R`, `470`.
fn plain_ohms(input: &str) -> IResult<&str, f64> {
    map(tuple((double, opt(one_of("kKmMrR")))), |(num, mult)| {
        num * mult.map(ohm_multiplier).unwrap_or(1.0)
    })(input)
}

/// Parse the resistance shorthand found in BOM value columns.
///
/// Accepts `"470"`, `"47k"`, `"2.2M"`, `"560R"` and the mid-fix `"4k7"` /
/// `"2M2"` notation, case-insensitive, with an optional trailing ohm symbol
/// or `ohm`/`ohms` word. `M` always means megaohms here: milliohm resistors
/// do not exist in this domain.
pub fn parse_ohms(value: &str) -> Result<f64, ResistorError> {
    let mut cleaned = value.trim();
    let lower = cleaned.to_ascii_lowercase();
    if let Some(stripped) = lower.strip_suffix("ohms").or_else(|| lower.strip_suffix("ohm")) {
        cleaned = &cleaned[..stripped.len()];
    } else if let Some(stripped) = cleaned.strip_suffix('Ω') {
        cleaned = stripped;
    }
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(ResistorError::InvalidValue(value.to_string()));
    }

    all_consuming(alt((midfix_ohms, plain_ohms)))(cleaned)
        .map(|(_, ohms)| ohms)
        .map_err(|_: nom::Err<nom::error::Error<&str>>| {
            ResistorError::InvalidValue(value.to_string())
        })
        .and_then(|ohms| {
            if ohms > 0.0 && ohms.is_finite() {
                Ok(ohms)
            } else {
                Err(ResistorError::NonPositive(ohms))
            }
        })
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

fn trim_float(v: f64) -> String {
    if v == v.trunc() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{v:.3}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Format an ohm value with SI prefix and ohm symbol: `47 kΩ`, `2.2 MΩ`.
pub fn format_ohms(ohms: f64) -> String {
    const UNITS: [(f64, &str); 4] = [
        (1e9, "GΩ"),
        (1e6, "MΩ"),
        (1e3, "kΩ"),
        (1.0, "Ω"),
    ];
    for (scale, unit) in UNITS {
        if ohms >= scale {
            return format!("{} {}", trim_float(round_sig(ohms / scale, 3)), unit);
        }
    }
    if ohms > 0.0 {
        format!("{} Ω", trim_float(round_sig(ohms, 3)))
    } else {
        "0 Ω".to_string()
    }
}

/// Round to `digits` significant figures.
fn round_sig(v: f64, digits: i32) -> f64 {
    if v == 0.0 {
        return 0.0;
    }
    let scale = 10f64.powi(digits - 1 - v.abs().log10().floor() as i32);
    (v * scale).round() / scale
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
