//! Breadboard hole identifiers.
//!
//! Two grammars, nothing else:
//!
//! - terminal holes: a lowercase row letter `a`-`j` followed by a 1-based
//!   column number (`a15`, `j63`)
//! - power-rail holes: `+` or `-` followed by a column number (`+10`, `-1`)
//!
//! Parsing is strict. Uppercase rows, leading zeros, column 0, and any
//! leading or trailing garbage are rejected rather than coerced, because a
//! mis-parsed hole would silently place a lead in the wrong group. Hole IDs
//! travel as opaque strings over the wire; serde goes through the
//! `Display`/`FromStr` pair.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

/// Largest column on any supported board (the 830-point board).
pub const MAX_COLUMN: u8 = 63;

// ---------------------------------------------------------------------------
// Rows and sections
// ---------------------------------------------------------------------------

/// Terminal row letter. The center gap splits `a`-`e` from `f`-`j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Row {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
}

impl Row {
    /// All rows in letter order.
    pub const ALL: [Row; 10] = [
        Row::A,
        Row::B,
        Row::C,
        Row::D,
        Row::E,
        Row::F,
        Row::G,
        Row::H,
        Row::I,
        Row::J,
    ];

    /// 0-based position in the row alphabet.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn letter(self) -> char {
        (b'a' + self.index() as u8) as char
    }

    pub fn from_letter(c: char) -> Option<Row> {
        match c {
            'a'..='j' => Some(Row::ALL[(c as u8 - b'a') as usize]),
            _ => None,
        }
    }

    /// Which side of the center gap this row sits on.
    pub fn section(self) -> Section {
        if self.index() < 5 {
            Section::Upper
        } else {
            Section::Lower
        }
    }
}

/// One electrically contiguous 5-row half of the terminal area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Rows a-e, above the center gap.
    Upper,
    /// Rows f-j, below the center gap.
    Lower,
}

impl Section {
    /// The five rows of this section, in letter order.
    pub fn rows(self) -> [Row; 5] {
        match self {
            Section::Upper => [Row::A, Row::B, Row::C, Row::D, Row::E],
            Section::Lower => [Row::F, Row::G, Row::H, Row::I, Row::J],
        }
    }
}

/// Power rail polarity. Rails run the full board width and never connect to
/// each other or to terminal rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RailId {
    Positive,
    Ground,
}

impl RailId {
    pub fn sign(self) -> char {
        match self {
            RailId::Positive => '+',
            RailId::Ground => '-',
        }
    }
}

// ---------------------------------------------------------------------------
// Hole IDs
// ---------------------------------------------------------------------------

/// One hole on the board, terminal or rail.
///
/// Programmatic construction is trusted (the allocator bounds-checks its own
/// columns); strings always go through [`FromStr`], which enforces the
/// grammar and the global column bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum HoleId {
    Terminal { row: Row, column: u8 },
    Rail { rail: RailId, column: u8 },
}

impl HoleId {
    pub fn column(self) -> u8 {
        match self {
            HoleId::Terminal { column, .. } | HoleId::Rail { column, .. } => column,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, HoleId::Terminal { .. })
    }

    pub fn is_rail(self) -> bool {
        matches!(self, HoleId::Rail { .. })
    }
}

impl Display for HoleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            HoleId::Terminal { row, column } => write!(f, "{}{}", row.letter(), column),
            HoleId::Rail { rail, column } => write!(f, "{}{}", rail.sign(), column),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HoleIdError {
    #[error("empty hole id")]
    Empty,
    #[error("'{0}' is not a row letter a-j or a rail sign +/-")]
    UnknownRow(char),
    #[error("invalid column \"{0}\" (expected digits with no leading zero)")]
    InvalidColumn(String),
    #[error("column {0} out of range (1-{MAX_COLUMN})")]
    ColumnOutOfRange(u32),
}

impl FromStr for HoleId {
    type Err = HoleIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let head = s.chars().next().ok_or(HoleIdError::Empty)?;
        let rest = &s[head.len_utf8()..];

        let column = parse_column(rest)?;
        match head {
            '+' => Ok(HoleId::Rail {
                rail: RailId::Positive,
                column,
            }),
            '-' => Ok(HoleId::Rail {
                rail: RailId::Ground,
                column,
            }),
            c => {
                let row = Row::from_letter(c).ok_or(HoleIdError::UnknownRow(c))?;
                Ok(HoleId::Terminal { row, column })
            }
        }
    }
}

fn parse_column(digits: &str) -> Result<u8, HoleIdError> {
    if digits.is_empty()
        || digits.starts_with('0')
        || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(HoleIdError::InvalidColumn(digits.to_string()));
    }
    let column: u32 = digits
        .parse()
        .map_err(|_| HoleIdError::InvalidColumn(digits.to_string()))?;
    if !(1..=MAX_COLUMN as u32).contains(&column) {
        return Err(HoleIdError::ColumnOutOfRange(column));
    }
    Ok(column as u8)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a1", HoleId::Terminal { row: Row::A, column: 1 })]
    #[case("e30", HoleId::Terminal { row: Row::E, column: 30 })]
    #[case("f15", HoleId::Terminal { row: Row::F, column: 15 })]
    #[case("j63", HoleId::Terminal { row: Row::J, column: 63 })]
    #[case("+10", HoleId::Rail { rail: RailId::Positive, column: 10 })]
    #[case("-1", HoleId::Rail { rail: RailId::Ground, column: 1 })]
    fn parse_valid(#[case] input: &str, #[case] expected: HoleId) {
        assert_eq!(input.parse::<HoleId>().unwrap(), expected);
    }

    #[test]
    fn display_round_trips() {
        for id in ["a1", "e30", "j63", "+10", "-63", "b2"] {
            let hole: HoleId = id.parse().unwrap();
            assert_eq!(hole.to_string(), id);
        }
    }

    #[test]
    fn rejects_uppercase_rows() {
        assert_eq!(
            "A15".parse::<HoleId>(),
            Err(HoleIdError::UnknownRow('A'))
        );
    }

    #[test]
    fn rejects_unknown_rows() {
        assert_eq!("k5".parse::<HoleId>(), Err(HoleIdError::UnknownRow('k')));
        assert_eq!("z1".parse::<HoleId>(), Err(HoleIdError::UnknownRow('z')));
    }

    #[test]
    fn rejects_bad_columns() {
        assert_eq!(
            "a0".parse::<HoleId>(),
            Err(HoleIdError::InvalidColumn("0".into()))
        );
        assert!(matches!("a".parse::<HoleId>(), Err(HoleIdError::InvalidColumn(_))));
        assert!(matches!("a01".parse::<HoleId>(), Err(HoleIdError::InvalidColumn(_))));
        assert!(matches!("a1x".parse::<HoleId>(), Err(HoleIdError::InvalidColumn(_))));
        assert!(matches!("a 1".parse::<HoleId>(), Err(HoleIdError::InvalidColumn(_))));
        assert_eq!("a64".parse::<HoleId>(), Err(HoleIdError::ColumnOutOfRange(64)));
        assert_eq!("".parse::<HoleId>(), Err(HoleIdError::Empty));
    }

    #[test]
    fn rejects_garbage() {
        assert!("15a".parse::<HoleId>().is_err());
        assert!("++1".parse::<HoleId>().is_err());
        assert!(" a1".parse::<HoleId>().is_err());
    }

    #[test]
    fn sections_split_at_the_gap() {
        assert_eq!(Row::E.section(), Section::Upper);
        assert_eq!(Row::F.section(), Section::Lower);
        assert_eq!(Section::Upper.rows()[0], Row::A);
        assert_eq!(Section::Lower.rows()[4], Row::J);
    }

    #[test]
    fn serde_as_opaque_strings() {
        let hole: HoleId = "f15".parse().unwrap();
        let json = serde_json::to_string(&hole).unwrap();
        assert_eq!(json, "\"f15\"");
        let back: HoleId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hole);
        assert!(serde_json::from_str::<HoleId>("\"A15\"").is_err());
    }
}
