//! Bill-of-materials types shared by the codecs and the layout engine.
//!
//! A BOM entry carries the component type, the raw marking string exactly as
//! it appears on the part or schematic, and one reference designator per
//! physical instance. Everything serializes to JSON for the CLI interchange
//! format.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed set of component types a pedal BOM can contain.
///
/// Per-operation lookup tables (placement row, lead span, pin count) match
/// exhaustively on this enum, so adding a variant forces every table to be
/// revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    Resistor,
    Capacitor,
    Diode,
    Led,
    Transistor,
    /// Dual/quad op-amps and other DIP devices (TL072, PT2399, ...).
    Ic,
    Switch,
    Jack,
    Footswitch,
    Potentiometer,
    Other,
}

impl ComponentType {
    /// Active devices need a supply; their presence gates power-jumper
    /// generation during allocation.
    pub fn is_active(self) -> bool {
        matches!(self, ComponentType::Ic | ComponentType::Transistor)
    }

    fn name(self) -> &'static str {
        match self {
            ComponentType::Resistor => "resistor",
            ComponentType::Capacitor => "capacitor",
            ComponentType::Diode => "diode",
            ComponentType::Led => "led",
            ComponentType::Transistor => "transistor",
            ComponentType::Ic => "ic",
            ComponentType::Switch => "switch",
            ComponentType::Jack => "jack",
            ComponentType::Footswitch => "footswitch",
            ComponentType::Potentiometer => "potentiometer",
            ComponentType::Other => "other",
        }
    }
}

impl Display for ComponentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown component type \"{0}\"")]
pub struct UnknownComponentType(pub String);

impl FromStr for ComponentType {
    type Err = UnknownComponentType;

    /// Accepts the spellings that show up in hand-written BOMs. Matching is
    /// case-insensitive; `"op-amp"`, `"opamp"` and `"ic"` are equivalent.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ct = match s.trim().to_ascii_lowercase().as_str() {
            "resistor" | "res" => ComponentType::Resistor,
            "capacitor" | "cap" => ComponentType::Capacitor,
            "diode" => ComponentType::Diode,
            "led" => ComponentType::Led,
            "transistor" | "bjt" | "fet" | "jfet" => ComponentType::Transistor,
            "ic" | "opamp" | "op-amp" | "op amp" | "chip" => ComponentType::Ic,
            "switch" => ComponentType::Switch,
            "jack" => ComponentType::Jack,
            "footswitch" | "stomp" => ComponentType::Footswitch,
            "potentiometer" | "pot" => ComponentType::Potentiometer,
            "other" => ComponentType::Other,
            _ => return Err(UnknownComponentType(s.to_string())),
        };
        Ok(ct)
    }
}

/// One BOM line: a component type, its marking, and the designators of every
/// physical instance.
///
/// `quantity` must equal `reference_designators.len()`; the allocator turns a
/// mismatch into a per-line failure rather than guessing which designators
/// are real.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    pub component_type: ComponentType,
    /// Raw marking or value string: `"47k"`, `"473K100"`, `"TL072"`, ...
    pub marking: String,
    pub quantity: u32,
    /// One designator per instance, in placement order (`["R1", "R2"]`).
    pub reference_designators: Vec<String>,
}

impl ComponentSpec {
    /// Convenience constructor for the common single-instance case.
    pub fn single(
        component_type: ComponentType,
        marking: impl Into<String>,
        designator: impl Into<String>,
    ) -> Self {
        ComponentSpec {
            component_type,
            marking: marking.into(),
            quantity: 1,
            reference_designators: vec![designator.into()],
        }
    }
}

/// Supply polarity of the DC jack, pedal-world convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Polarity {
    /// Barrel negative, tip positive on the board. The Boss-style default.
    CenterNegative,
    CenterPositive,
}

/// Optional power supply descriptor attached to a BOM.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerDescriptor {
    pub volts: f64,
    pub polarity: Polarity,
}

impl PowerDescriptor {
    /// The ubiquitous 9V center-negative pedal supply.
    pub fn nine_volt() -> Self {
        PowerDescriptor {
            volts: 9.0,
            polarity: Polarity::CenterNegative,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
