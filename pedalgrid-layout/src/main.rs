use std::process;

use clap::{Parser, Subcommand};

use pedalgrid::bom::{ComponentSpec, Polarity, PowerDescriptor};
use pedalgrid::capacitor::{self, CapValue};
use pedalgrid::resistor;
use pedalgrid_layout::{plan_board, to_json, BoardSize};

#[derive(Parser)]
#[command(name = "pedalgrid", about = "Component value codecs and breadboard placement")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode resistor color bands, or encode an ohm value to bands.
    Resistor {
        /// Color bands left to right (e.g. brown black orange gold).
        #[arg(long, num_args = 4..=5, conflicts_with = "ohms")]
        bands: Vec<String>,
        /// Value to encode (e.g. 47k, 4k7, 560R).
        #[arg(long)]
        ohms: Option<String>,
        /// Tolerance percent for encoding.
        #[arg(long, default_value_t = 1.0)]
        tolerance: f64,
    },
    /// Decode a capacitor marking, or encode a value to markings.
    Capacitor {
        /// Marking to decode (e.g. 473K100, 4n7, "47uF 25V").
        #[arg(long, conflicts_with_all = ["nf", "pf", "uf"])]
        marking: Option<String>,
        #[arg(long)]
        pf: Option<f64>,
        #[arg(long)]
        nf: Option<f64>,
        #[arg(long)]
        uf: Option<f64>,
        #[arg(long, default_value_t = 10.0)]
        tolerance: f64,
        #[arg(long)]
        voltage: Option<u32>,
    },
    /// Place a BOM JSON file onto a board and print the plan as JSON.
    Place {
        /// Path to a JSON array of component specs.
        bom: String,
        /// Board size: 830 or 400.
        #[arg(long, default_value = "830")]
        board: String,
        /// Supply voltage; enables power jumpers for active devices.
        #[arg(long)]
        volts: Option<f64>,
        /// Supply polarity.
        #[arg(long, value_enum, default_value = "center-negative")]
        polarity: CliPolarity,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum CliPolarity {
    CenterNegative,
    CenterPositive,
}

impl From<CliPolarity> for Polarity {
    fn from(p: CliPolarity) -> Self {
        match p {
            CliPolarity::CenterNegative => Polarity::CenterNegative,
            CliPolarity::CenterPositive => Polarity::CenterPositive,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Command::Resistor {
            bands,
            ohms,
            tolerance,
        } => run_resistor(&bands, ohms.as_deref(), tolerance),
        Command::Capacitor {
            marking,
            pf,
            nf,
            uf,
            tolerance,
            voltage,
        } => run_capacitor(marking.as_deref(), pf, nf, uf, tolerance, voltage),
        Command::Place {
            bom,
            board,
            volts,
            polarity,
        } => run_place(&bom, &board, volts, polarity.into()),
    }
}

fn run_resistor(bands: &[String], ohms: Option<&str>, tolerance: f64) {
    if !bands.is_empty() {
        let decoded = resistor::decode_bands(bands).unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            process::exit(1);
        });
        println!("{}", decoded.pretty());
        match (decoded.series, decoded.nearest_standard) {
            (Some(series), _) => println!("standard {series} value"),
            (None, Some(nearest)) => println!(
                "non-standard value (nearest E96: {})",
                resistor::format_ohms(nearest)
            ),
            _ => {}
        }
        return;
    }

    let Some(value) = ohms else {
        eprintln!("Error: pass either --bands or --ohms");
        process::exit(1);
    };
    let parsed = resistor::parse_ohms(value).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });
    let encoded = resistor::encode_ohms(parsed, tolerance).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });
    println!("{} ±{}%", resistor::format_ohms(parsed), tolerance);
    println!("5-band: {}", encoded.pretty_5band());
    match encoded.pretty_4band() {
        Some(bands) => println!("4-band: {bands}"),
        None => println!("4-band: (needs three significant digits)"),
    }
}

fn run_capacitor(
    marking: Option<&str>,
    pf: Option<f64>,
    nf: Option<f64>,
    uf: Option<f64>,
    tolerance: f64,
    voltage: Option<u32>,
) {
    if let Some(marking) = marking {
        let decoded = capacitor::decode_marking(marking).unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            process::exit(1);
        });
        println!("{}", decoded.pretty());
        println!("{}", decoded.value.all_units());
        println!("type: {:?}, dialect: {}", decoded.kind, decoded.dialect);
        return;
    }

    let value = match (pf, nf, uf) {
        (Some(v), None, None) => CapValue::Pf(v),
        (None, Some(v), None) => CapValue::Nf(v),
        (None, None, Some(v)) => CapValue::Uf(v),
        _ => {
            eprintln!("Error: pass --marking, or exactly one of --pf/--nf/--uf");
            process::exit(1);
        }
    };
    let encoded = capacitor::encode(value, tolerance, voltage).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });
    println!("{}", encoded.value.pretty());
    println!("EIA code:   {}", encoded.film_code);
    println!("alpha code: {}", encoded.alpha_full_code);
}

fn run_place(bom_path: &str, board: &str, volts: Option<f64>, polarity: Polarity) {
    let board: BoardSize = board.parse().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });
    let source = std::fs::read_to_string(bom_path).unwrap_or_else(|e| {
        eprintln!("Error reading {bom_path}: {e}");
        process::exit(1);
    });
    let bom: Vec<ComponentSpec> = serde_json::from_str(&source).unwrap_or_else(|e| {
        eprintln!("Error parsing {bom_path}: {e}");
        process::exit(1);
    });

    let power = volts.map(|volts| PowerDescriptor { volts, polarity });
    let plan = plan_board(&bom, power.as_ref(), board);

    for warning in &plan.warnings {
        eprintln!("warning [{}]: {}", warning.label, warning.message);
    }
    for failure in &plan.failures {
        eprintln!("failed  [{}]: {}", failure.label, failure.reason);
    }

    match to_json(&plan) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
