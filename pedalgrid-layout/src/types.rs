//! Output types for the placement engine.
//!
//! Everything here derives [`serde::Serialize`]/[`serde::Deserialize`] so a
//! plan can be written to JSON and consumed by the rendering layer, which
//! treats hole IDs as opaque strings and calls back into
//! [`crate::board::coordinates`] for pixels.

use serde::{Deserialize, Serialize};

use pedalgrid::bom::ComponentType;

use crate::board::BoardSize;
use crate::hole::HoleId;

/// One placed component instance or jumper wire.
///
/// Labels are the exact reference designator strings from the BOM; jumper
/// labels are synthesized from the power descriptor (`"+9V"`, `"GND"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
    /// A two-lead part spanning columns of one row: resistor, capacitor,
    /// diode, LED.
    TwoTerminal {
        label: String,
        component: ComponentType,
        start: HoleId,
        end: HoleId,
    },
    /// A DIP device straddling the center gap, pin 1 in row `e` and its
    /// mirror across the gap in row `f`.
    MultiPin {
        label: String,
        component: ComponentType,
        pin_one: HoleId,
        mirror: HoleId,
        pin_count: u8,
    },
    /// A power-rail feed wire: rail hole to terminal hole.
    Jumper {
        label: String,
        color: JumperColor,
        start: HoleId,
        end: HoleId,
    },
}

impl Placement {
    pub fn label(&self) -> &str {
        match self {
            Placement::TwoTerminal { label, .. }
            | Placement::MultiPin { label, .. }
            | Placement::Jumper { label, .. } => label,
        }
    }
}

/// Jumper wire color convention: red feeds the positive rail, black ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JumperColor {
    Red,
    Black,
}

/// A BOM instance the allocator could not place. Allocation always continues
/// past these; the rest of the plan is still valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementFailure {
    /// Reference designator (or the marking, when designators were missing).
    pub label: String,
    pub reason: String,
}

/// Non-fatal observation made during allocation, e.g. an unknown IC marking
/// falling back to the 8-pin default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementWarning {
    pub label: String,
    pub message: String,
}

/// Complete result of one allocation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardPlan {
    pub board: BoardSize,
    /// Stable order: BOM order, then designator order within an entry.
    pub placements: Vec<Placement>,
    pub failures: Vec<PlacementFailure>,
    pub warnings: Vec<PlacementWarning>,
}

impl BoardPlan {
    /// Placements carrying a given designator label.
    pub fn find(&self, label: &str) -> Option<&Placement> {
        self.placements.iter().find(|p| p.label() == label)
    }

    pub fn jumpers(&self) -> impl Iterator<Item = &Placement> {
        self.placements
            .iter()
            .filter(|p| matches!(p, Placement::Jumper { .. }))
    }
}
