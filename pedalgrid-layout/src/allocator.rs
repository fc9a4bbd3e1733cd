//! BOM-to-breadboard placement.
//!
//! A single column cursor walks left to right, handing each component
//! instance a non-overlapping column range in its type-determined row.
//! When the cursor runs off the right edge it wraps once into the lower
//! row section; ICs straddle the center gap and only exist in the first
//! band. Per-instance problems (bad markings, no room) are collected as
//! failures and never abort the rest of the BOM.

use pedalgrid::bom::{ComponentSpec, ComponentType, PowerDescriptor};
use pedalgrid::{capacitor, resistor};

use crate::board::BoardSize;
use crate::hole::{HoleId, RailId, Row};
use crate::types::{BoardPlan, JumperColor, Placement, PlacementFailure, PlacementWarning};

/// First usable column. Column 1 stays clear as lead margin.
const START_COLUMN: u8 = 2;

/// Pin count assumed for DIP devices whose marking is not in the table.
pub const DEFAULT_IC_PINS: u8 = 8;

// ---------------------------------------------------------------------------
// Per-type tables
// ---------------------------------------------------------------------------

/// Lead span in columns for two-terminal parts (end column = start + span).
fn span_for(component: ComponentType) -> Option<u8> {
    match component {
        ComponentType::Resistor => Some(3),
        ComponentType::Capacitor => Some(2),
        ComponentType::Diode => Some(3),
        ComponentType::Led => Some(1),
        _ => None,
    }
}

/// Placement row for two-terminal parts, per wrap band. Band 1 rows live in
/// the lower section and deliberately avoid `f`, which band-0 ICs occupy.
fn row_for(component: ComponentType, band: u8) -> Row {
    match (component, band) {
        (ComponentType::Resistor, 0) => Row::A,
        (ComponentType::Capacitor, 0) => Row::C,
        (ComponentType::Diode | ComponentType::Led, 0) => Row::D,
        (ComponentType::Resistor, _) => Row::G,
        (ComponentType::Capacitor, _) => Row::H,
        _ => Row::I,
    }
}

/// DIP pin counts for the device markings seen in pedal BOMs. Lookup is
/// case-insensitive; unknown markings fall back to [`DEFAULT_IC_PINS`] with
/// a warning.
pub fn pin_count_for(marking: &str) -> Option<u8> {
    match marking.trim().to_ascii_uppercase().as_str() {
        "TL072" | "TL082" | "JRC4558" | "RC4558" | "NE5532" | "LM308" | "LM741" => Some(8),
        "TL074" | "LM324" => Some(14),
        "PT2399" => Some(16),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Allocation
// ---------------------------------------------------------------------------

/// Cursor state threaded through one allocation call. Never global.
struct Cursor {
    column: u8,
    /// 0 = nominal rows (upper section), 1 = wrapped (lower section).
    band: u8,
}

/// Place every BOM instance on the given board.
///
/// Components are processed in BOM order; within one entry, designators in
/// listed order. Power jumpers are appended last, and only when a power
/// descriptor is present and the BOM contains at least one active device.
pub fn allocate(
    bom: &[ComponentSpec],
    power: Option<&PowerDescriptor>,
    board: BoardSize,
) -> BoardPlan {
    let columns = board.columns();
    let mut placements = Vec::new();
    let mut failures = Vec::new();
    let mut warnings = Vec::new();
    let mut cursor = Cursor {
        column: START_COLUMN,
        band: 0,
    };
    // Pin-1 column and width of the first placed IC, anchoring the power
    // jumpers.
    let mut first_ic: Option<(u8, u8)> = None;
    let mut has_active = false;

    for spec in bom {
        if spec.component_type.is_active() {
            has_active = true;
        }

        if spec.reference_designators.len() != spec.quantity as usize {
            failures.push(PlacementFailure {
                label: spec
                    .reference_designators
                    .first()
                    .cloned()
                    .unwrap_or_else(|| spec.marking.clone()),
                reason: format!(
                    "quantity {} does not match {} reference designators",
                    spec.quantity,
                    spec.reference_designators.len()
                ),
            });
            continue;
        }

        for label in &spec.reference_designators {
            match spec.component_type {
                ComponentType::Resistor
                | ComponentType::Capacitor
                | ComponentType::Diode
                | ComponentType::Led => {
                    if let Some(reason) = marking_problem(spec) {
                        failures.push(PlacementFailure {
                            label: label.clone(),
                            reason,
                        });
                        continue;
                    }
                    place_two_terminal(
                        spec.component_type,
                        label,
                        columns,
                        &mut cursor,
                        &mut placements,
                        &mut failures,
                    );
                }
                ComponentType::Ic => {
                    place_ic(
                        spec,
                        label,
                        columns,
                        &mut cursor,
                        &mut first_ic,
                        &mut placements,
                        &mut failures,
                        &mut warnings,
                    );
                }
                other => {
                    warnings.push(PlacementWarning {
                        label: label.clone(),
                        message: format!(
                            "no breadboard placement rule for {other} \"{}\"; skipped",
                            spec.marking
                        ),
                    });
                }
            }
        }
    }

    if let Some(power) = power {
        if has_active {
            emit_power_jumpers(power, first_ic, &mut placements);
        }
    }

    BoardPlan {
        board,
        placements,
        failures,
        warnings,
    }
}

/// Run the value codec appropriate to the component type, reporting any
/// decode problem. The decoded value itself is not used for geometry.
fn marking_problem(spec: &ComponentSpec) -> Option<String> {
    match spec.component_type {
        ComponentType::Resistor => resistor::parse_ohms(&spec.marking)
            .err()
            .map(|e| e.to_string()),
        ComponentType::Capacitor => capacitor::decode_marking(&spec.marking)
            .err()
            .map(|e| e.to_string()),
        _ => None,
    }
}

fn place_two_terminal(
    component: ComponentType,
    label: &str,
    columns: u8,
    cursor: &mut Cursor,
    placements: &mut Vec<Placement>,
    failures: &mut Vec<PlacementFailure>,
) {
    // Spans exist for exactly the four types routed here.
    let Some(span) = span_for(component) else {
        return;
    };

    loop {
        if cursor.column.saturating_add(span) <= columns {
            let row = row_for(component, cursor.band);
            placements.push(Placement::TwoTerminal {
                label: label.to_string(),
                component,
                start: HoleId::Terminal {
                    row,
                    column: cursor.column,
                },
                end: HoleId::Terminal {
                    row,
                    column: cursor.column + span,
                },
            });
            cursor.column += span + 1;
            return;
        }
        if cursor.band == 0 {
            cursor.band = 1;
            cursor.column = START_COLUMN;
        } else {
            failures.push(PlacementFailure {
                label: label.to_string(),
                reason: format!("no room left on the {columns}-column board"),
            });
            return;
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn place_ic(
    spec: &ComponentSpec,
    label: &str,
    columns: u8,
    cursor: &mut Cursor,
    first_ic: &mut Option<(u8, u8)>,
    placements: &mut Vec<Placement>,
    failures: &mut Vec<PlacementFailure>,
    warnings: &mut Vec<PlacementWarning>,
) {
    let pin_count = match pin_count_for(&spec.marking) {
        Some(n) => n,
        None => {
            warnings.push(PlacementWarning {
                label: label.to_string(),
                message: format!(
                    "unknown device marking \"{}\"; assuming {DEFAULT_IC_PINS}-pin DIP",
                    spec.marking
                ),
            });
            DEFAULT_IC_PINS
        }
    };
    let width = pin_count / 2;

    // ICs straddle rows e/f and exist only in the first band: a wrapped IC
    // could land on pins of one already placed.
    if cursor.band != 0 {
        failures.push(PlacementFailure {
            label: label.to_string(),
            reason: format!("no room for a {pin_count}-pin device after row wrap"),
        });
        return;
    }
    if cursor.column.saturating_add(width - 1) > columns {
        failures.push(PlacementFailure {
            label: label.to_string(),
            reason: format!(
                "{pin_count}-pin device needs {width} columns, only {} left",
                columns.saturating_sub(cursor.column) + 1
            ),
        });
        return;
    }

    placements.push(Placement::MultiPin {
        label: label.to_string(),
        component: ComponentType::Ic,
        pin_one: HoleId::Terminal {
            row: Row::E,
            column: cursor.column,
        },
        mirror: HoleId::Terminal {
            row: Row::F,
            column: cursor.column,
        },
        pin_count,
    });
    if first_ic.is_none() {
        *first_ic = Some((cursor.column, width));
    }
    cursor.column += width;
}

/// Exactly two feed wires: red from the positive rail into the section
/// carrying the supply pin, black from the ground rail into the section
/// carrying the ground pin. Anchored on the first placed IC; when active
/// devices exist but none placed as a DIP (discrete transistors), the
/// conventional entry columns are used.
fn emit_power_jumpers(
    power: &PowerDescriptor,
    first_ic: Option<(u8, u8)>,
    placements: &mut Vec<Placement>,
) {
    let (positive_column, ground_column) = match first_ic {
        // Supply pin mirrors pin 1 across the gap; ground pin ends the
        // pin-1 row.
        Some((pin_one, width)) => (pin_one, pin_one + width - 1),
        None => (START_COLUMN, START_COLUMN + 1),
    };

    placements.push(Placement::Jumper {
        label: format!("+{}V", trim_volts(power.volts)),
        color: JumperColor::Red,
        start: HoleId::Rail {
            rail: RailId::Positive,
            column: positive_column,
        },
        end: HoleId::Terminal {
            row: Row::J,
            column: positive_column,
        },
    });
    placements.push(Placement::Jumper {
        label: "GND".to_string(),
        color: JumperColor::Black,
        start: HoleId::Rail {
            rail: RailId::Ground,
            column: ground_column,
        },
        end: HoleId::Terminal {
            row: Row::A,
            column: ground_column,
        },
    });
}

fn trim_volts(volts: f64) -> String {
    if volts == volts.trunc() {
        format!("{}", volts as i64)
    } else {
        format!("{volts}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pedalgrid::bom::Polarity;

    fn resistor(label: &str, marking: &str) -> ComponentSpec {
        ComponentSpec::single(ComponentType::Resistor, marking, label)
    }

    fn capacitor(label: &str, marking: &str) -> ComponentSpec {
        ComponentSpec::single(ComponentType::Capacitor, marking, label)
    }

    #[test]
    fn single_resistor_on_full_board() {
        let plan = allocate(&[resistor("R1", "10k")], None, BoardSize::Full830);
        assert_eq!(plan.placements.len(), 1);
        assert!(plan.failures.is_empty());

        match &plan.placements[0] {
            Placement::TwoTerminal {
                label,
                component,
                start,
                end,
            } => {
                assert_eq!(label, "R1");
                assert_eq!(*component, ComponentType::Resistor);
                assert!(matches!(start, HoleId::Terminal { row: Row::A, .. }));
                assert!(matches!(end, HoleId::Terminal { row: Row::A, .. }));
                assert!(end.column() > start.column());
            }
            other => panic!("expected two-terminal placement, got {other:?}"),
        }
    }

    #[test]
    fn rows_follow_component_type() {
        let bom = [
            resistor("R1", "10k"),
            capacitor("C1", "473"),
            ComponentSpec::single(ComponentType::Diode, "1N4148", "D1"),
            ComponentSpec::single(ComponentType::Led, "red", "LED1"),
        ];
        let plan = allocate(&bom, None, BoardSize::Full830);
        assert_eq!(plan.placements.len(), 4);

        let rows: Vec<Row> = plan
            .placements
            .iter()
            .map(|p| match p {
                Placement::TwoTerminal { start, .. } => match start {
                    HoleId::Terminal { row, .. } => *row,
                    _ => panic!("two-terminal start must be a terminal hole"),
                },
                other => panic!("unexpected placement {other:?}"),
            })
            .collect();
        assert_eq!(rows, [Row::A, Row::C, Row::D, Row::D]);
    }

    #[test]
    fn cursor_never_overlaps_columns() {
        let bom: Vec<ComponentSpec> = (1..=5).map(|i| resistor(&format!("R{i}"), "1k")).collect();
        let plan = allocate(&bom, None, BoardSize::Full830);
        assert_eq!(plan.placements.len(), 5);

        let mut last_end = 0;
        for p in &plan.placements {
            if let Placement::TwoTerminal { start, end, .. } = p {
                assert!(start.column() > last_end, "columns must not overlap");
                last_end = end.column();
            }
        }
    }

    #[test]
    fn order_is_stable() {
        let bom = [
            ComponentSpec {
                component_type: ComponentType::Resistor,
                marking: "4k7".into(),
                quantity: 2,
                reference_designators: vec!["R2".into(), "R1".into()],
            },
            capacitor("C1", "47n"),
        ];
        let plan = allocate(&bom, None, BoardSize::Full830);
        let labels: Vec<&str> = plan.placements.iter().map(|p| p.label()).collect();
        // Listed designator order, not sorted.
        assert_eq!(labels, ["R2", "R1", "C1"]);
    }

    #[test]
    fn ic_straddles_center_gap() {
        let bom = [ComponentSpec::single(ComponentType::Ic, "TL072", "U1")];
        let plan = allocate(
            &bom,
            Some(&PowerDescriptor::nine_volt()),
            BoardSize::Full830,
        );

        let ic = plan.find("U1").expect("IC placed");
        match ic {
            Placement::MultiPin {
                pin_one,
                mirror,
                pin_count,
                ..
            } => {
                assert_eq!(*pin_count, 8);
                assert!(matches!(pin_one, HoleId::Terminal { row: Row::E, .. }));
                assert!(matches!(mirror, HoleId::Terminal { row: Row::F, .. }));
                assert_eq!(pin_one.column(), mirror.column());
            }
            other => panic!("expected multi-pin placement, got {other:?}"),
        }

        let jumpers: Vec<&Placement> = plan.jumpers().collect();
        assert_eq!(jumpers.len(), 2);
        let colors: Vec<JumperColor> = jumpers
            .iter()
            .map(|j| match j {
                Placement::Jumper { color, start, end, .. } => {
                    assert!(start.is_rail());
                    assert!(end.is_terminal());
                    *color
                }
                other => panic!("expected jumper, got {other:?}"),
            })
            .collect();
        assert_eq!(colors, [JumperColor::Red, JumperColor::Black]);
    }

    #[test]
    fn pin_counts_from_device_table() {
        for (marking, pins) in [("TL072", 8), ("tl074", 14), ("PT2399", 16), ("NE5532", 8)] {
            let bom = [ComponentSpec::single(ComponentType::Ic, marking, "U1")];
            let plan = allocate(&bom, None, BoardSize::Full830);
            match plan.find("U1") {
                Some(Placement::MultiPin { pin_count, .. }) => {
                    assert_eq!(*pin_count, pins, "{marking}")
                }
                other => panic!("expected IC placement, got {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_ic_marking_defaults_with_warning() {
        let bom = [ComponentSpec::single(ComponentType::Ic, "XR9999", "U1")];
        let plan = allocate(&bom, None, BoardSize::Full830);
        assert!(plan.failures.is_empty());
        match plan.find("U1") {
            Some(Placement::MultiPin { pin_count, .. }) => assert_eq!(*pin_count, 8),
            other => panic!("expected IC placement, got {other:?}"),
        }
        assert_eq!(plan.warnings.len(), 1);
        assert!(plan.warnings[0].message.contains("XR9999"));
    }

    #[test]
    fn passive_bom_gets_no_jumpers() {
        let bom = [resistor("R1", "10k"), capacitor("C1", "47n")];
        let plan = allocate(
            &bom,
            Some(&PowerDescriptor::nine_volt()),
            BoardSize::Full830,
        );
        assert_eq!(plan.jumpers().count(), 0);
    }

    #[test]
    fn transistor_counts_as_active_without_placement() {
        let bom = [ComponentSpec::single(
            ComponentType::Transistor,
            "2N5088",
            "Q1",
        )];
        let plan = allocate(
            &bom,
            Some(&PowerDescriptor::nine_volt()),
            BoardSize::Full830,
        );
        // Skipped with a warning, but still powers the board.
        assert!(plan.find("Q1").is_none());
        assert_eq!(plan.warnings.len(), 1);
        assert_eq!(plan.jumpers().count(), 2);
    }

    #[test]
    fn no_power_descriptor_no_jumpers() {
        let bom = [ComponentSpec::single(ComponentType::Ic, "TL072", "U1")];
        let plan = allocate(&bom, None, BoardSize::Full830);
        assert_eq!(plan.jumpers().count(), 0);
    }

    #[test]
    fn jumper_labels_from_descriptor() {
        let bom = [ComponentSpec::single(ComponentType::Ic, "TL072", "U1")];
        let power = PowerDescriptor {
            volts: 18.0,
            polarity: Polarity::CenterNegative,
        };
        let plan = allocate(&bom, Some(&power), BoardSize::Full830);
        let labels: Vec<&str> = plan.jumpers().map(|j| j.label()).collect();
        assert_eq!(labels, ["+18V", "GND"]);
    }

    #[test]
    fn bad_marking_fails_instance_and_continues() {
        let bom = [
            resistor("R1", "not-a-value"),
            resistor("R2", "10k"),
            capacitor("C1", "bogus"),
            capacitor("C2", "473"),
        ];
        let plan = allocate(&bom, None, BoardSize::Full830);

        assert_eq!(plan.placements.len(), 2);
        assert_eq!(plan.failures.len(), 2);
        assert_eq!(plan.failures[0].label, "R1");
        assert_eq!(plan.failures[1].label, "C1");
        assert!(plan.find("R2").is_some());
        assert!(plan.find("C2").is_some());
    }

    #[test]
    fn quantity_mismatch_is_a_failure() {
        let bom = [ComponentSpec {
            component_type: ComponentType::Resistor,
            marking: "10k".into(),
            quantity: 3,
            reference_designators: vec!["R1".into(), "R2".into()],
        }];
        let plan = allocate(&bom, None, BoardSize::Full830);
        assert!(plan.placements.is_empty());
        assert_eq!(plan.failures.len(), 1);
        assert!(plan.failures[0].reason.contains("quantity 3"));
    }

    #[test]
    fn overflow_wraps_to_lower_section_within_bounds() {
        // 10 resistors at 4 columns each overflow a 30-column board once.
        let bom: Vec<ComponentSpec> =
            (1..=10).map(|i| resistor(&format!("R{i}"), "1k")).collect();
        let plan = allocate(&bom, None, BoardSize::Half400);

        assert_eq!(plan.placements.len(), 10);
        assert!(plan.failures.is_empty());

        let columns = BoardSize::Half400.columns();
        let mut wrapped = 0;
        for p in &plan.placements {
            if let Placement::TwoTerminal { start, end, .. } = p {
                assert!(end.column() <= columns, "{p:?} out of bounds");
                assert!(start.column() >= START_COLUMN);
                if matches!(start, HoleId::Terminal { row: Row::G, .. }) {
                    wrapped += 1;
                }
            }
        }
        assert!(wrapped > 0, "some resistors should wrap to row g");
    }

    #[test]
    fn exhausted_board_fails_remaining_instances() {
        // 30 resistors cannot fit on a 30-column board even with the wrap.
        let bom: Vec<ComponentSpec> =
            (1..=30).map(|i| resistor(&format!("R{i}"), "1k")).collect();
        let plan = allocate(&bom, None, BoardSize::Half400);

        assert!(!plan.failures.is_empty());
        assert_eq!(plan.placements.len() + plan.failures.len(), 30);
        // Whatever was placed is in bounds.
        for p in &plan.placements {
            if let Placement::TwoTerminal { end, .. } = p {
                assert!(end.column() <= 30);
            }
        }
    }

    #[test]
    fn wrapped_rows_avoid_ic_rows() {
        // An IC first, then enough resistors to force a wrap: wrapped parts
        // must land in row g, never e or f.
        let mut bom = vec![ComponentSpec::single(ComponentType::Ic, "PT2399", "U1")];
        bom.extend((1..=8).map(|i| resistor(&format!("R{i}"), "1k")));
        let plan = allocate(&bom, None, BoardSize::Half400);

        for p in &plan.placements {
            if let Placement::TwoTerminal { start, .. } = p {
                if let HoleId::Terminal { row, .. } = start {
                    assert!(
                        !matches!(row, Row::E | Row::F),
                        "two-terminal part placed in an IC row: {p:?}"
                    );
                }
            }
        }
    }
}
