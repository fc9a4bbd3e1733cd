//! PedalGrid: decode and encode the value markings printed on (or painted
//! around) the components of a guitar pedal circuit.
//!
//! A bill of materials says `R3: 47k` or `C2: 473K100`; the builder holding a
//! bag of parts needs the reverse mapping, and the layout engine needs both.
//! This crate is the bidirectional codec between manufacturer notations and
//! canonical SI values:
//!
//! - [`resistor`]: IEC 60062 color bands (4- and 5-band), E-series
//!   validation, and the `47k`/`4k7`/`560R` value shorthand found in BOMs
//! - [`capacitor`]: EIA 3-digit codes (`473`), alphanumeric (`47nK100`),
//!   R-decimal (`4n7`), and electrolytic (`47uF 25V`) markings
//! - [`bom`]: the component list types shared with the layout engine
//!
//! Everything here is a pure value-in/value-out computation: no I/O, no
//! shared state, safe to call from any number of threads.

pub mod bom;
pub mod capacitor;
pub mod resistor;
