//! Integration tests for the placement engine.
//!
//! Exercises the full pipeline: BOM -> allocation -> plan JSON, plus the
//! hole-grid properties the rendering layer depends on.

use pedalgrid::bom::{ComponentSpec, ComponentType, Polarity, PowerDescriptor};
use pedalgrid_layout::{
    connected_holes, coordinates, is_valid_hole, plan_board, to_json, BoardPlan, BoardSize,
    HoleId, JumperColor, Placement, Row,
};

/// BOM for a Tube Screamer-style overdrive, the canonical first build.
fn overdrive_bom() -> Vec<ComponentSpec> {
    vec![
        ComponentSpec {
            component_type: ComponentType::Resistor,
            marking: "4k7".into(),
            quantity: 2,
            reference_designators: vec!["R1".into(), "R2".into()],
        },
        ComponentSpec::single(ComponentType::Resistor, "510k", "R3"),
        ComponentSpec::single(ComponentType::Capacitor, "47n", "C1"),
        ComponentSpec::single(ComponentType::Capacitor, "1uF 25V", "C2"),
        ComponentSpec {
            component_type: ComponentType::Diode,
            marking: "1N914".into(),
            quantity: 2,
            reference_designators: vec!["D1".into(), "D2".into()],
        },
        ComponentSpec::single(ComponentType::Ic, "JRC4558", "U1"),
        ComponentSpec::single(ComponentType::Potentiometer, "500k", "VR1"),
    ]
}

#[test]
fn overdrive_bom_places_cleanly() {
    let plan = plan_board(
        &overdrive_bom(),
        Some(&PowerDescriptor::nine_volt()),
        BoardSize::Full830,
    );

    assert!(plan.failures.is_empty(), "failures: {:?}", plan.failures);
    // 8 parts placed (pot skipped) plus two power jumpers.
    assert_eq!(plan.placements.len(), 10);
    // The pot shows up as a warning, not a failure.
    assert_eq!(plan.warnings.len(), 1);
    assert_eq!(plan.warnings[0].label, "VR1");

    // Every designator keeps its exact label.
    for label in ["R1", "R2", "R3", "C1", "C2", "D1", "D2", "U1"] {
        assert!(plan.find(label).is_some(), "missing {label}");
    }
}

#[test]
fn all_emitted_holes_are_valid_for_the_board() {
    for board in [BoardSize::Full830, BoardSize::Half400] {
        let plan = plan_board(
            &overdrive_bom(),
            Some(&PowerDescriptor::nine_volt()),
            board,
        );
        for placement in &plan.placements {
            let holes: Vec<HoleId> = match placement {
                Placement::TwoTerminal { start, end, .. } => vec![*start, *end],
                Placement::MultiPin { pin_one, mirror, .. } => vec![*pin_one, *mirror],
                Placement::Jumper { start, end, .. } => vec![*start, *end],
            };
            for hole in holes {
                assert!(
                    is_valid_hole(&hole.to_string(), board),
                    "{hole} invalid on {board}-point board"
                );
            }
        }
    }
}

#[test]
fn plan_serializes_and_round_trips() {
    let plan = plan_board(
        &overdrive_bom(),
        Some(&PowerDescriptor::nine_volt()),
        BoardSize::Full830,
    );
    let json = to_json(&plan).unwrap();

    // Hole IDs travel as opaque grammar strings.
    assert!(json.contains("\"a2\""));
    assert!(json.contains("\"830\""));

    let back: BoardPlan = serde_json::from_str(&json).unwrap();
    assert_eq!(back, plan);
}

#[test]
fn bom_json_is_the_interchange_format() {
    let json = r#"[
        {
            "component_type": "resistor",
            "marking": "10k",
            "quantity": 1,
            "reference_designators": ["R1"]
        },
        {
            "component_type": "ic",
            "marking": "TL072",
            "quantity": 1,
            "reference_designators": ["U1"]
        }
    ]"#;
    let bom: Vec<ComponentSpec> = serde_json::from_str(json).unwrap();
    let power = PowerDescriptor {
        volts: 9.0,
        polarity: Polarity::CenterNegative,
    };
    let plan = plan_board(&bom, Some(&power), BoardSize::Full830);

    assert!(plan.failures.is_empty());
    assert_eq!(plan.placements.len(), 4); // R1, U1, two jumpers

    let jumper_colors: Vec<JumperColor> = plan
        .placements
        .iter()
        .filter_map(|p| match p {
            Placement::Jumper { color, .. } => Some(*color),
            _ => None,
        })
        .collect();
    assert_eq!(jumper_colors, [JumperColor::Red, JumperColor::Black]);
}

#[test]
fn connectivity_matches_the_rendering_contract() {
    let a15: HoleId = "a15".parse().unwrap();
    let group = connected_holes(&a15, BoardSize::Full830).unwrap();
    let ids: Vec<String> = group.iter().map(|h| h.to_string()).collect();
    assert_eq!(ids, ["a15", "b15", "c15", "d15", "e15"]);

    let plus10: HoleId = "+10".parse().unwrap();
    let rail = connected_holes(&plus10, BoardSize::Full830).unwrap();
    assert_eq!(rail.len(), 63);
    assert!(rail.iter().any(|h| h.to_string() == "+1"));
    assert!(rail.iter().any(|h| h.to_string() == "+63"));
    assert!(rail.iter().all(|h| !h.to_string().starts_with('-')));
}

#[test]
fn renderer_gets_coordinates_not_math() {
    let layout = BoardSize::Full830.layout();
    // Neighboring holes in a column section are one pitch apart.
    let (xa, ya) = coordinates(&"b7".parse().unwrap(), layout);
    let (xb, yb) = coordinates(&"c7".parse().unwrap(), layout);
    assert_eq!(xa, xb);
    assert_eq!(yb - ya, layout.pitch);
}

#[test]
fn placed_two_terminal_parts_land_in_their_group_rows() {
    let bom = vec![
        ComponentSpec::single(ComponentType::Resistor, "10k", "R1"),
        ComponentSpec::single(ComponentType::Capacitor, "104", "C1"),
    ];
    let plan = plan_board(&bom, None, BoardSize::Half400);

    match plan.find("R1") {
        Some(Placement::TwoTerminal { start, .. }) => {
            assert!(matches!(start, HoleId::Terminal { row: Row::A, .. }));
        }
        other => panic!("R1 missing: {other:?}"),
    }
    match plan.find("C1") {
        Some(Placement::TwoTerminal { start, .. }) => {
            assert!(matches!(start, HoleId::Terminal { row: Row::C, .. }));
        }
        other => panic!("C1 missing: {other:?}"),
    }
}
