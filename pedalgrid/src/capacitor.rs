//! Capacitor marking decoder and encoder.
//!
//! Four marking dialects show up on the parts a pedal BOM calls for:
//!
//! - EIA 3-digit codes on film boxes and ceramic discs: `473`, `104`,
//!   `223K100`
//! - alphanumeric with an explicit unit letter: `47n`, `0.047uF`, `47nK100`
//! - R-decimal, where the unit letter doubles as the decimal point: `4n7`,
//!   `2u2`, `1n5K100`
//! - electrolytic value + voltage prints: `47uF 25V`, `100uF/16V`
//!
//! Each dialect is its own nom parser returning a tagged result; decode tries
//! them most-specific-first so `4n7` never half-matches as `4 nF`. The
//! decoded value always carries pF, nF and µF simultaneously so no caller
//! has to re-derive units and lose precision doing it.

use std::fmt::{self, Display, Formatter};

use nom::character::complete::{char, digit0, digit1, multispace0, one_of};
use nom::combinator::{all_consuming, map, map_res, opt, recognize, verify};
use nom::sequence::tuple;
use nom::IResult;
use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Units and lookup tables
// ---------------------------------------------------------------------------

/// Capacitance expressed in all three working units at once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CapUnit {
    pub pf: f64,
    pub nf: f64,
    pub uf: f64,
}

impl CapUnit {
    pub fn from_pf(pf: f64) -> Self {
        CapUnit {
            pf,
            nf: pf / 1e3,
            uf: pf / 1e6,
        }
    }

    /// Most natural single-unit rendering: `47 nF`, `0.047 µF`, `100 pF`.
    pub fn pretty(&self) -> String {
        if self.uf >= 1.0 {
            format!("{} µF", trim_float(self.uf))
        } else if self.nf >= 1.0 {
            format!("{} nF", trim_float(self.nf))
        } else {
            format!("{} pF", trim_float(self.pf))
        }
    }

    /// All three units on one line, for detail views.
    pub fn all_units(&self) -> String {
        format!(
            "{} pF / {} nF / {} µF",
            trim_float(self.pf),
            trim_float(self.nf),
            trim_float(self.uf)
        )
    }
}

/// Construction/dielectric classification derived from magnitude and dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapKind {
    /// Box film (polyester/polypropylene). The audio-path workhorse.
    FilmBox,
    Ceramic,
    Electrolytic,
    Tantalum,
    Unknown,
}

impl CapKind {
    pub fn is_polarized(self) -> bool {
        matches!(self, CapKind::Electrolytic | CapKind::Tantalum)
    }
}

/// Which grammar matched a marking. Dialects are tried in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkingDialect {
    Electrolytic,
    RDecimal,
    Alphanumeric,
    Eia3Digit,
}

impl MarkingDialect {
    fn name(self) -> &'static str {
        match self {
            MarkingDialect::Electrolytic => "electrolytic",
            MarkingDialect::RDecimal => "R-decimal",
            MarkingDialect::Alphanumeric => "alphanumeric",
            MarkingDialect::Eia3Digit => "EIA 3-digit",
        }
    }
}

impl Display for MarkingDialect {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// IEC/EIA tolerance letter to percent. `Z` is the asymmetric +80/-20%
/// electrolytic code, stored as -20 to keep it distinguishable.
pub fn tolerance_percent(letter: char) -> Option<f64> {
    let pct = match letter.to_ascii_uppercase() {
        'B' => 0.1,
        'C' => 0.25,
        'D' => 0.5,
        'F' => 1.0,
        'G' => 2.0,
        'J' => 5.0,
        'K' => 10.0,
        'M' => 20.0,
        'Z' => -20.0,
        _ => return None,
    };
    Some(pct)
}

/// Reverse lookup for the letters worth printing (the symmetric ones).
pub fn tolerance_letter(percent: f64) -> Option<char> {
    let letter = match percent {
        p if (p - 1.0).abs() < 1e-9 => 'F',
        p if (p - 2.0).abs() < 1e-9 => 'G',
        p if (p - 5.0).abs() < 1e-9 => 'J',
        p if (p - 10.0).abs() < 1e-9 => 'K',
        p if (p - 20.0).abs() < 1e-9 => 'M',
        _ => return None,
    };
    Some(letter)
}

fn unit_pf(c: char) -> f64 {
    match c.to_ascii_lowercase() {
        'p' => 1.0,
        'n' => 1e3,
        _ => 1e6, // 'u' or 'µ'
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum CapacitorError {
    #[error("empty capacitor marking")]
    Empty,
    #[error(
        "cannot decode \"{0}\": tried electrolytic, R-decimal, alphanumeric, \
         and EIA 3-digit marking grammars"
    )]
    Unrecognized(String),
    #[error("tolerance {0}% has no letter code (valid: 1, 2, 5, 10, 20)")]
    UnsupportedTolerance(f64),
    #[error("{0} pF cannot be written as an EIA 3-digit code")]
    NotRepresentable(f64),
    #[error("capacitance must be positive, got {0}")]
    NonPositive(f64),
}

// ---------------------------------------------------------------------------
// Decoded / encoded value types
// ---------------------------------------------------------------------------

/// Result of decoding a capacitor marking. Pure value; holds nothing of the
/// input string's formatting beyond which dialect matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedCapacitor {
    pub value: CapUnit,
    /// Tolerance in percent, when a letter was present (or implied, for
    /// electrolytics).
    pub tolerance: Option<f64>,
    pub tolerance_letter: Option<char>,
    /// Maximum rated voltage, when marked.
    pub voltage: Option<u32>,
    pub kind: CapKind,
    pub dialect: MarkingDialect,
}

impl DecodedCapacitor {
    pub fn is_polarized(&self) -> bool {
        self.kind.is_polarized()
    }

    /// `"47 nF ±10% 100V"` style display string.
    pub fn pretty(&self) -> String {
        let mut out = self.value.pretty();
        if let Some(t) = self.tolerance {
            out.push_str(&format!(" ±{}%", trim_float(t)));
        }
        if let Some(v) = self.voltage {
            out.push_str(&format!(" {v}V"));
        }
        out
    }
}

/// Result of encoding a capacitance into marking strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodedCapacitor {
    pub value: CapUnit,
    /// Bare EIA 3-digit code: `"473"`.
    pub eia_code: String,
    /// Bare alphanumeric code: `"47n"`, `"4n7"`.
    pub alpha_code: String,
    /// EIA code with tolerance letter and voltage: `"473K100"`.
    pub film_code: String,
    /// Alphanumeric code with tolerance letter and voltage: `"47nK100"`.
    pub alpha_full_code: String,
    pub tolerance_letter: char,
    pub voltage: Option<u32>,
}

/// Input value for [`encode`], tagged with its unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CapValue {
    Pf(f64),
    Nf(f64),
    Uf(f64),
}

impl CapValue {
    pub fn as_pf(self) -> f64 {
        match self {
            CapValue::Pf(v) => v,
            CapValue::Nf(v) => v * 1e3,
            CapValue::Uf(v) => v * 1e6,
        }
    }
}

// ---------------------------------------------------------------------------
// Dialect parsers
// ---------------------------------------------------------------------------

/// Intermediate parse result shared by all four dialect parsers.
struct RawMarking {
    pf: f64,
    tolerance_letter: Option<char>,
    voltage: Option<u32>,
    dialect: MarkingDialect,
}

/// `\d+(\.\d*)?` with no sign or exponent; marking values are plain decimals.
fn decimal_number(input: &str) -> IResult<&str, f64> {
    map(
        recognize(tuple((digit1, opt(tuple((char('.'), digit0)))))),
        |s: &str| s.parse().unwrap_or(0.0),
    )(input)
}

fn unit_letter(input: &str) -> IResult<&str, char> {
    one_of("pnuPNUµ")(input)
}

fn tol_letter(input: &str) -> IResult<&str, char> {
    map(one_of("bcdfgjkmzBCDFGJKMZ"), |c: char| c.to_ascii_uppercase())(input)
}

/// Voltage rating as a bare 2-4 digit integer (the `100` in `473K100`).
fn voltage_field(input: &str) -> IResult<&str, u32> {
    map_res(
        verify(digit1, |d: &str| d.len() >= 2 && d.len() <= 4),
        str::parse,
    )(input)
}

/// `47uF 25V`, `100uF/16V`, `10u 50V`. The mandatory `V` suffix makes this
/// the most specific dialect, so it is tried first.
fn electrolytic(input: &str) -> IResult<&str, RawMarking> {
    let (input, value) = decimal_number(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = one_of("uUµ")(input)?;
    let (input, _) = opt(one_of("fF"))(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = opt(one_of("/,"))(input)?;
    let (input, _) = multispace0(input)?;
    let (input, volts) = map_res(
        verify(digit1, |d: &str| d.len() <= 4),
        str::parse::<u32>,
    )(input)?;
    let (input, _) = one_of("vV")(input)?;
    Ok((
        input,
        RawMarking {
            pf: value * 1e6,
            // Electrolytics are ±20% unless marked otherwise, which they
            // never are.
            tolerance_letter: Some('M'),
            voltage: Some(volts),
            dialect: MarkingDialect::Electrolytic,
        },
    ))
}

/// `4n7`, `2u2`, `1n5K100`: the unit letter is the decimal separator.
fn rdecimal(input: &str) -> IResult<&str, RawMarking> {
    let (input, int_part) = digit1(input)?;
    let (input, unit) = unit_letter(input)?;
    let (input, frac_part) = digit1(input)?;
    let (input, _) = multispace0(input)?;
    let (input, tol) = opt(tol_letter)(input)?;
    let (input, _) = multispace0(input)?;
    let (input, voltage) = opt(voltage_field)(input)?;

    let value: f64 = format!("{int_part}.{frac_part}").parse().unwrap_or(0.0);
    Ok((
        input,
        RawMarking {
            pf: value * unit_pf(unit),
            tolerance_letter: tol,
            voltage,
            dialect: MarkingDialect::RDecimal,
        },
    ))
}

/// `47n`, `0.047uF`, `47nK100`, `100p`: value then explicit unit letter.
fn alphanumeric(input: &str) -> IResult<&str, RawMarking> {
    let (input, value) = decimal_number(input)?;
    let (input, _) = multispace0(input)?;
    let (input, unit) = unit_letter(input)?;
    let (input, _) = opt(one_of("fF"))(input)?;
    let (input, _) = multispace0(input)?;
    let (input, tol) = opt(tol_letter)(input)?;
    let (input, _) = multispace0(input)?;
    let (input, voltage) = opt(voltage_field)(input)?;
    Ok((
        input,
        RawMarking {
            pf: value * unit_pf(unit),
            tolerance_letter: tol,
            voltage,
            dialect: MarkingDialect::Alphanumeric,
        },
    ))
}

/// `473`, `104`, `223K100`: two significant digits and a power-of-ten
/// multiplier in picofarads. Multiplier digits 8 and 9 are the rare
/// sub-decade codes (x0.01 and x0.1).
fn eia_3digit(input: &str) -> IResult<&str, RawMarking> {
    use nom::bytes::complete::take_while_m_n;

    let (input, code) = take_while_m_n(3, 3, |c: char| c.is_ascii_digit())(input)?;
    let (input, tol) = opt(tol_letter)(input)?;
    let (input, voltage) = opt(voltage_field)(input)?;

    let significand: f64 = code[..2].parse().unwrap_or(0.0);
    let mult_digit: u32 = code[2..].parse().unwrap_or(0);
    let pf = match mult_digit {
        8 => significand * 0.01,
        9 => significand * 0.1,
        m => significand * 10f64.powi(m as i32),
    };

    Ok((
        input,
        RawMarking {
            pf,
            tolerance_letter: tol,
            voltage,
            dialect: MarkingDialect::Eia3Digit,
        },
    ))
}

// ---------------------------------------------------------------------------
// Decoder (marking -> value)
// ---------------------------------------------------------------------------

/// Decode a capacitor marking string.
///
/// Dialects are tried in priority order: electrolytic, R-decimal,
/// alphanumeric, EIA 3-digit. A string matching none of the four is an
/// error naming all attempted grammars; nothing is ever best-effort guessed.
pub fn decode_marking(marking: &str) -> Result<DecodedCapacitor, CapacitorError> {
    let cleaned = marking.trim();
    if cleaned.is_empty() {
        return Err(CapacitorError::Empty);
    }

    let parsers: [fn(&str) -> IResult<&str, RawMarking>; 4] =
        [electrolytic, rdecimal, alphanumeric, eia_3digit];

    for parser in parsers {
        if let Ok((_, raw)) = all_consuming(parser)(cleaned) {
            return Ok(finish(raw));
        }
    }
    Err(CapacitorError::Unrecognized(cleaned.to_string()))
}

/// Decode with a caller-supplied type override, for when the builder can see
/// the part and the heuristic would guess wrong (e.g. a tantalum bead
/// marked like a ceramic).
pub fn decode_marking_as(
    marking: &str,
    kind: CapKind,
) -> Result<DecodedCapacitor, CapacitorError> {
    let mut decoded = decode_marking(marking)?;
    decoded.kind = kind;
    Ok(decoded)
}

fn finish(raw: RawMarking) -> DecodedCapacitor {
    let kind = if raw.dialect == MarkingDialect::Electrolytic {
        CapKind::Electrolytic
    } else {
        classify(raw.pf, raw.voltage)
    };
    DecodedCapacitor {
        value: CapUnit::from_pf(raw.pf),
        tolerance: raw.tolerance_letter.and_then(tolerance_percent),
        tolerance_letter: raw.tolerance_letter,
        voltage: raw.voltage,
        kind,
        dialect: raw.dialect,
    }
}

/// Magnitude heuristic: >= 1 µF is electrolytic territory, < 1 nF is
/// ceramic, and the 1 nF to 1 µF band is film (the audio-path range in
/// pedal circuits).
fn classify(pf: f64, _voltage: Option<u32>) -> CapKind {
    if pf >= 1e6 {
        CapKind::Electrolytic
    } else if pf < 1e3 {
        CapKind::Ceramic
    } else {
        CapKind::FilmBox
    }
}

// ---------------------------------------------------------------------------
// Encoder (value -> markings)
// ---------------------------------------------------------------------------

/// Encode a capacitance into the two standard marking forms.
///
/// Produces the bare EIA 3-digit and alphanumeric codes plus both full codes
/// with the tolerance letter and voltage appended, so
/// `decode(encode(v))` reproduces the magnitude within EIA 3-digit precision
/// and tolerance/voltage exactly.
pub fn encode(
    value: CapValue,
    tolerance_percent: f64,
    voltage: Option<u32>,
) -> Result<EncodedCapacitor, CapacitorError> {
    let pf = value.as_pf();
    if !(pf > 0.0) || !pf.is_finite() {
        return Err(CapacitorError::NonPositive(pf));
    }

    let letter = tolerance_letter(tolerance_percent)
        .ok_or(CapacitorError::UnsupportedTolerance(tolerance_percent))?;

    let eia = eia_code(pf)?;
    let alpha = alpha_code(pf);

    let voltage_str = voltage.map(|v| v.to_string()).unwrap_or_default();
    let film_code = format!("{eia}{letter}{voltage_str}");
    let alpha_full_code = format!("{alpha}{letter}{voltage_str}");

    Ok(EncodedCapacitor {
        value: CapUnit::from_pf(pf),
        eia_code: eia,
        alpha_code: alpha,
        film_code,
        alpha_full_code,
        tolerance_letter: letter,
        voltage,
    })
}

/// EIA 3-digit code: two significand digits plus a power-of-ten multiplier.
/// `47000 pF` becomes `473`.
fn eia_code(pf: f64) -> Result<String, CapacitorError> {
    if pf < 10.0 {
        // Sub-10 pF parts round to a leading-zero significand with
        // multiplier 0 (`4 pF` -> `040`); anything that rounds to zero has
        // no code.
        let sig = pf.round() as u32;
        return match sig {
            0 => Err(CapacitorError::NotRepresentable(pf)),
            s if s < 10 => Ok(format!("{s:02}0")),
            _ => Ok("100".to_string()),
        };
    }

    for mult in 0..10i32 {
        let divisor = 10f64.powi(mult);
        let sig = pf / divisor;
        if !(9.95..=99.5).contains(&sig) {
            continue;
        }
        let sig_int = sig.round() as u32;
        if sig_int > 99 {
            continue;
        }
        if (sig_int as f64 * divisor - pf).abs() / pf < 0.001 {
            return Ok(format!("{sig_int}{mult}"));
        }
    }
    Err(CapacitorError::NotRepresentable(pf))
}

/// Alphanumeric code in the most natural unit, R-style decimals:
/// `47000 pF` -> `47n`, `4700 pF` -> `4n7`, `0.47 µF` -> `0u47`.
fn alpha_code(pf: f64) -> String {
    let uf = pf / 1e6;
    let nf = pf / 1e3;
    if uf >= 0.1 {
        alpha_fmt(uf, 'u')
    } else if nf >= 0.1 {
        alpha_fmt(nf, 'n')
    } else {
        alpha_fmt(pf, 'p')
    }
}

fn alpha_fmt(value: f64, unit: char) -> String {
    // Work in thousandths to sidestep float formatting; three fractional
    // digits is already finer than any real marking.
    let milli = (value * 1000.0).round() as u64;
    let int_part = milli / 1000;
    let frac = milli % 1000;
    if frac == 0 {
        format!("{int_part}{unit}")
    } else {
        let frac_str = format!("{frac:03}");
        let frac_str = frac_str.trim_end_matches('0');
        format!("{int_part}{unit}{frac_str}")
    }
}

fn trim_float(v: f64) -> String {
    if v == v.trunc() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{v:.4}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
