//! Breadboard placement engine for PedalGrid bills of materials.
//!
//! Turns a parsed BOM into a concrete physical layout on a standard
//! solderless breadboard:
//!
//! ```text
//! BOM + power descriptor
//!   -> value codecs        (marking sanity, per-instance failures)
//!   -> column cursor       (non-overlapping hole ranges, row by type)
//!   -> power jumpers       (rail feeds for active devices)
//!   -> BoardPlan           (JSON-serializable placements + failures)
//! ```
//!
//! The geometry side is deliberately dumb: two fixed board layouts, a strict
//! hole-ID grammar, and a connectivity model of 5-hole column sections and
//! full-width rails. Renderers call [`board::coordinates`] rather than
//! re-deriving pixel positions.
//!
//! Everything is a pure per-call computation; the column cursor lives on the
//! stack of [`plan_board`] and nothing is shared between invocations.

pub mod allocator;
pub mod board;
pub mod hole;
pub mod types;

use pedalgrid::bom::{ComponentSpec, PowerDescriptor};

pub use allocator::{allocate, pin_count_for, DEFAULT_IC_PINS};
pub use board::{
    connected_holes, coordinates, is_valid_hole, BoardError, BoardLayout, BoardSize,
};
pub use hole::{HoleId, HoleIdError, RailId, Row, Section};
pub use types::{BoardPlan, JumperColor, Placement, PlacementFailure, PlacementWarning};

/// Allocate a whole BOM onto a board. Main entry point; equivalent to
/// [`allocator::allocate`].
pub fn plan_board(
    bom: &[ComponentSpec],
    power: Option<&PowerDescriptor>,
    board: BoardSize,
) -> BoardPlan {
    allocator::allocate(bom, power, board)
}

/// Serialize a plan to pretty JSON for the rendering layer.
pub fn to_json(plan: &BoardPlan) -> serde_json::Result<String> {
    serde_json::to_string_pretty(plan)
}
