//! Board geometry: the two standard solderless breadboard sizes, hole
//! coordinates, and electrical connectivity groups.
//!
//! Layouts are immutable configuration values in abstract layout units
//! (one unit = 0.254 mm, so the 0.1 inch hole pitch is 10 units). Renderers
//! scale from here; nothing downstream re-derives geometry.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::Serialize;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

use crate::hole::{HoleId, RailId, Section};

// ---------------------------------------------------------------------------
// Board sizes
// ---------------------------------------------------------------------------

/// The two supported board sizes, keyed by their common point-count names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum BoardSize {
    /// Full-size 830-point board, 63 terminal columns.
    Full830,
    /// Half-size 400-point board, 30 terminal columns.
    Half400,
}

impl BoardSize {
    pub fn columns(self) -> u8 {
        match self {
            BoardSize::Full830 => 63,
            BoardSize::Half400 => 30,
        }
    }

    /// The canonical layout for this size. Never mutated, never cloned per
    /// call.
    pub fn layout(self) -> &'static BoardLayout {
        match self {
            BoardSize::Full830 => &FULL_830,
            BoardSize::Half400 => &HALF_400,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            BoardSize::Full830 => "830",
            BoardSize::Half400 => "400",
        }
    }
}

impl Display for BoardSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("unknown board size \"{0}\" (expected \"830\" or \"400\")")]
    UnknownSize(String),
    #[error("hole {0} is out of bounds for the {1}-point board")]
    OutOfBounds(HoleId, BoardSize),
}

impl FromStr for BoardSize {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "830" => Ok(BoardSize::Full830),
            "400" => Ok(BoardSize::Half400),
            other => Err(BoardError::UnknownSize(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Layout geometry
// ---------------------------------------------------------------------------

/// Y offsets of the four power-rail strips. Each board has a +/- pair above
/// row `a` and another below row `j`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RailYOffsets {
    pub top_positive: f32,
    pub top_ground: f32,
    pub bottom_positive: f32,
    pub bottom_ground: f32,
}

/// Immutable geometry of one board size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoardLayout {
    /// Terminal column count (63 or 30).
    pub columns: u8,
    /// Hole pitch in layout units (0.1 inch).
    pub pitch: f32,
    /// X of column 1.
    pub origin_x: f32,
    /// Y of row `a`.
    pub origin_y: f32,
    /// Extra offset between rows `e` and `f` for the physical center break.
    pub center_gap: f32,
    pub rail_y: RailYOffsets,
    pub width: f32,
    pub height: f32,
}

pub const FULL_830: BoardLayout = BoardLayout {
    columns: 63,
    pitch: 10.0,
    origin_x: 25.0,
    origin_y: 45.0,
    center_gap: 10.0,
    rail_y: RailYOffsets {
        top_positive: 10.0,
        top_ground: 20.0,
        bottom_positive: 160.0,
        bottom_ground: 170.0,
    },
    width: 670.0,
    height: 180.0,
};

pub const HALF_400: BoardLayout = BoardLayout {
    columns: 30,
    pitch: 10.0,
    origin_x: 25.0,
    origin_y: 45.0,
    center_gap: 10.0,
    rail_y: RailYOffsets {
        top_positive: 10.0,
        top_ground: 20.0,
        bottom_positive: 160.0,
        bottom_ground: 170.0,
    },
    width: 340.0,
    height: 180.0,
};

/// Physical (x, y) of a hole in layout units.
///
/// Rows `f`-`j` sit one `center_gap` lower than their row index alone would
/// give, matching the physical break between sections. Rail IDs resolve to
/// the strip nearest the rows they conventionally feed: `+` to the bottom
/// strip beside row `j`, `-` to the top strip beside row `a`; the other two
/// offsets are exposed on the layout for renderers drawing both pairs.
pub fn coordinates(hole: &HoleId, layout: &BoardLayout) -> (f32, f32) {
    let x = layout.origin_x + (hole.column() as f32 - 1.0) * layout.pitch;
    let y = match hole {
        HoleId::Terminal { row, .. } => {
            let gap = match row.section() {
                Section::Upper => 0.0,
                Section::Lower => layout.center_gap,
            };
            layout.origin_y + row.index() as f32 * layout.pitch + gap
        }
        HoleId::Rail { rail, .. } => match rail {
            RailId::Positive => layout.rail_y.bottom_positive,
            RailId::Ground => layout.rail_y.top_ground,
        },
    };
    (x, y)
}

// ---------------------------------------------------------------------------
// Connectivity
// ---------------------------------------------------------------------------

/// Every hole electrically common with the given one, in deterministic
/// order.
///
/// Terminal holes: the five holes of the column-section, row order, never
/// crossing the center gap. Rail holes: every column of that rail, columns
/// ascending, never the other rail. A column beyond the board bound is an
/// error, not an empty set.
pub fn connected_holes(hole: &HoleId, board: BoardSize) -> Result<Vec<HoleId>, BoardError> {
    if hole.column() > board.columns() {
        return Err(BoardError::OutOfBounds(*hole, board));
    }
    let group = match *hole {
        HoleId::Terminal { row, column } => row
            .section()
            .rows()
            .iter()
            .map(|r| HoleId::Terminal { row: *r, column })
            .collect(),
        HoleId::Rail { rail, .. } => (1..=board.columns())
            .map(|column| HoleId::Rail { rail, column })
            .collect(),
    };
    Ok(group)
}

/// Grammar check plus the board's column bound, for callers holding a raw
/// string.
pub fn is_valid_hole(id: &str, board: BoardSize) -> bool {
    id.parse::<HoleId>()
        .map(|hole| hole.column() <= board.columns())
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
